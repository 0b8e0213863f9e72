use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use crate::application::state::ScreenState;
use crate::core::events::{ScreenRoute, UiEvent};
use crate::core::models::{Book, BookId, Bookmark};
use anyhow::Result;

/// Commands and state queries of the playback engine.
///
/// Commands are fire-and-forget: failures are the controller's business and
/// never reach the screen.
pub trait PlaybackController: Send + Sync {
    /// Seek to `position_ms` inside the chapter stored at `chapter_path`
    fn seek_to(&self, position_ms: u64, chapter_path: &Path);

    fn play_pause(&self);

    fn rewind(&self);

    fn fast_forward(&self);

    /// Skip to the next chapter
    fn next(&self);

    /// Skip to the previous chapter
    fn previous(&self);

    /// Arm or disarm the sleep timer
    fn toggle_sleep_timer(&self);

    fn set_playback_speed(&self, speed: f32);

    fn is_playing(&self) -> bool;

    fn is_sleep_timer_active(&self) -> bool;

    /// Wall clock time (ms since epoch) the sleep timer was armed at.
    /// Meaningless while the timer is inactive.
    fn sleep_timer_started_at_ms(&self) -> u64;

    fn can_adjust_speed(&self) -> bool;
}

/// Read/write access to the book library
pub trait BookRepository: Send + Sync {
    /// Fetch a book by id, `None` if it does not exist
    fn book(&self, id: BookId) -> Option<Book>;

    /// All books, ordered by id
    fn books(&self) -> Vec<Book>;

    /// Insert or replace a book
    fn save_book(&self, book: &Book) -> Result<()>;
}

pub trait BookmarkStore: Send + Sync {
    fn add_bookmark(&self, bookmark: Bookmark) -> Result<()>;

    fn bookmarks(&self, id: BookId) -> Vec<Bookmark>;
}

/// User preferences the play screen reads
pub trait Preferences: Send + Sync {
    /// Configured sleep timer duration in minutes
    fn sleep_timer_minutes(&self) -> u32;

    /// Whether arming the sleep timer drops a bookmark
    fn bookmark_on_sleep_timer(&self) -> bool;
}

/// Source of wall clock time in milliseconds
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Abstraction for drawing the play screen
pub trait ScreenRenderer {
    /// Initialize the UI (setup terminal, etc.)
    fn init(&mut self) -> Result<()>;

    /// Cleanup the UI (restore terminal, etc.)
    fn cleanup(&mut self) -> Result<()>;

    /// Render current widget state
    fn render(&mut self, state: &ScreenState) -> Result<()>;

    /// Poll for user input (non-blocking)
    fn poll_input(&mut self) -> Result<Vec<UiEvent>>;

    /// Present a route the screen asked for (dialog, other screen).
    /// Default implementation does nothing
    fn show_route(&mut self, _route: &ScreenRoute) -> Result<()> {
        Ok(())
    }
}
