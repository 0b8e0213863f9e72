use std::fmt;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use lofty::probe::Probe;
use lofty::file::{AudioFile, TaggedFileExt};
use lofty::tag::Accessor;

/// Identifier of a book inside the library
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct BookId(pub u64);

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A titled, timed segment of an audiobook. One audio file per chapter.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Chapter {
    /// 0-based position inside the owning book
    pub index: usize,
    pub title: String,
    pub duration_ms: u64,
    pub path: PathBuf,
}

impl Chapter {
    pub fn from_path(index: usize, path: &Path) -> Self {
        match Self::extract_metadata(index, path) {
            Ok(chapter) => chapter,
            Err(_) => Self::fallback(index, path),
        }
    }

    fn extract_metadata(index: usize, path: &Path) -> anyhow::Result<Self> {
        let tagged_file = Probe::open(path)?.read()?;
        let tag = tagged_file.primary_tag().or_else(|| tagged_file.first_tag());
        let title = tag.and_then(|t| t.title().map(|s| s.into_owned()))
            .unwrap_or_else(|| Self::extract_filename(path));
        let duration_ms = tagged_file.properties().duration().as_millis() as u64;

        Ok(Chapter {
            index,
            title,
            duration_ms,
            path: path.to_path_buf(),
        })
    }

    fn fallback(index: usize, path: &Path) -> Self {
        Chapter {
            index,
            title: Self::extract_filename(path),
            duration_ms: 0,
            path: path.to_path_buf(),
        }
    }

    fn extract_filename(path: &Path) -> String {
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Unknown")
            .to_string()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Book {
    pub id: BookId,
    pub name: String,
    pub chapters: Vec<Chapter>,

    /// Index into `chapters` of the chapter being played
    pub current_chapter: usize,

    /// Position inside the current chapter
    pub position_ms: u64,

    #[serde(default)]
    pub cover_path: Option<PathBuf>,

    #[serde(default)]
    pub use_cover_replacement: bool,
}

impl Book {
    /// The chapter at `current_chapter`, or `None` when the index is out of range.
    pub fn current_chapter(&self) -> Option<&Chapter> {
        self.chapters.get(self.current_chapter)
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.chapters.iter().map(|c| c.duration_ms).sum()
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({} chapters)",
            self.id,
            self.name,
            self.chapters.len()
        )
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Bookmark {
    pub book_id: BookId,
    pub title: String,
    pub chapter_path: PathBuf,
    pub position_ms: u64,
}

/// Global play state as reported by the playback controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Playing,
    Paused,
}

impl PlayState {
    pub fn from_playing(is_playing: bool) -> Self {
        if is_playing { PlayState::Playing } else { PlayState::Paused }
    }
}
