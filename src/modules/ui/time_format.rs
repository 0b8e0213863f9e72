const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;

/// Formats `position_ms` as `M:SS` or `H:MM:SS`.
///
/// The width is picked from `reference_ms` (usually the chapter duration) so
/// that the played and total labels of one seek bar line up. The figures
/// themselves always come from `position_ms`, truncated to whole seconds.
///
/// ```text
/// format_time(65_000, 65_000)       -> "1:05"
/// format_time(3_725_000, 3_725_000) -> "1:02:05"
/// format_time(65_000, 3_725_000)    -> "0:01:05"
/// ```
pub fn format_time(position_ms: u64, reference_ms: u64) -> String {
    let seconds = (position_ms / MS_PER_SECOND) % 60;

    if reference_ms / MS_PER_HOUR == 0 {
        let minutes = position_ms / MS_PER_MINUTE;
        format!("{}:{:02}", minutes, seconds)
    } else {
        let hours = position_ms / MS_PER_HOUR;
        let minutes = (position_ms / MS_PER_MINUTE) % 60;
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    }
}
