use crate::core::models::Chapter;

const SEPARATOR: &str = " - ";

/// Turns a raw chapter title into the `"N - Title"` label shown in the
/// chapter selector.
///
/// Only a single leading `'0'` is cut, so `"01 Intro"` and `"1 Intro"` both
/// end up as `"1 - Intro"` while `"001"` keeps one zero. When the title
/// already begins with the number, the remainder is taken after the *first
/// occurrence* of the number in the title.
///
/// Total and idempotent for every `one_based_index >= 1`.
pub fn normalize_chapter_title(raw: &str, one_based_index: usize) -> String {
    let title = raw.strip_prefix('0').unwrap_or(raw);
    let number = one_based_index.to_string();

    if title.starts_with(&format!("{}{}", number, SEPARATOR)) {
        return title.to_string();
    }

    if title.starts_with(&number) {
        // Known quirk: searches for the number instead of slicing the prefix
        let rest = title
            .find(&number)
            .map(|at| &title[at + number.len()..])
            .unwrap_or(title);
        return format!("{}{}{}", number, SEPARATOR, rest.trim_start());
    }

    format!("{}{}{}", number, SEPARATOR, title)
}

/// Labels for every chapter of a book, in order
pub fn chapter_labels(chapters: &[Chapter]) -> Vec<String> {
    chapters
        .iter()
        .enumerate()
        .map(|(i, chapter)| normalize_chapter_title(&chapter.title, i + 1))
        .collect()
}
