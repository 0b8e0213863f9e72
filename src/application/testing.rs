//! In-memory stand-ins for the collaborators of the play screen

use crate::core::models::{Book, BookId, Bookmark, Chapter};
use crate::core::traits::{BookRepository, BookmarkStore, Clock, PlaybackController, Preferences};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

// ── Builders ──────────────────────────────────────────────────────────────────

pub fn chapter(index: usize, title: &str, duration_ms: u64) -> Chapter {
    Chapter {
        index,
        title: title.to_string(),
        duration_ms,
        path: PathBuf::from(format!("/books/{}.mp3", index)),
    }
}

pub fn book(id: u64, chapter_count: usize) -> Book {
    Book {
        id: BookId(id),
        name: format!("Book {}", id),
        chapters: (0..chapter_count)
            .map(|i| chapter(i, &format!("Part {}", i + 1), 600_000))
            .collect(),
        current_chapter: 0,
        position_ms: 0,
        cover_path: None,
        use_cover_replacement: false,
    }
}

// ── Repository ────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryLibrary {
    books: Mutex<Vec<Book>>,
    bookmarks: Mutex<Vec<Bookmark>>,
}

impl MemoryLibrary {
    pub fn with_books(books: Vec<Book>) -> Self {
        Self {
            books: Mutex::new(books),
            bookmarks: Mutex::new(Vec::new()),
        }
    }

    pub fn all_bookmarks(&self) -> Vec<Bookmark> {
        self.bookmarks.lock().unwrap().clone()
    }
}

impl BookRepository for MemoryLibrary {
    fn book(&self, id: BookId) -> Option<Book> {
        self.books.lock().unwrap().iter().find(|b| b.id == id).cloned()
    }

    fn books(&self) -> Vec<Book> {
        self.books.lock().unwrap().clone()
    }

    fn save_book(&self, book: &Book) -> Result<()> {
        let mut books = self.books.lock().unwrap();
        match books.iter_mut().find(|b| b.id == book.id) {
            Some(existing) => *existing = book.clone(),
            None => books.push(book.clone()),
        }
        Ok(())
    }
}

impl BookmarkStore for MemoryLibrary {
    fn add_bookmark(&self, bookmark: Bookmark) -> Result<()> {
        self.bookmarks.lock().unwrap().push(bookmark);
        Ok(())
    }

    fn bookmarks(&self, id: BookId) -> Vec<Bookmark> {
        self.bookmarks
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.book_id == id)
            .cloned()
            .collect()
    }
}

// ── Controller ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SeekTo(u64, PathBuf),
    PlayPause,
    Rewind,
    FastForward,
    Next,
    Previous,
    ToggleSleepTimer,
    SetSpeed(f32),
}

/// Records every command and reports whatever state the test sets
#[derive(Default)]
pub struct RecordingController {
    commands: Mutex<Vec<Command>>,
    playing: AtomicBool,
    sleep_active: AtomicBool,
    sleep_started_at: AtomicU64,
    speed_adjustable: AtomicBool,
}

impl RecordingController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<Command> {
        self.commands.lock().unwrap().clone()
    }

    pub fn set_playing(&self, playing: bool) {
        self.playing.store(playing, Ordering::SeqCst);
    }

    pub fn set_sleep_timer(&self, active: bool, started_at_ms: u64) {
        self.sleep_active.store(active, Ordering::SeqCst);
        self.sleep_started_at.store(started_at_ms, Ordering::SeqCst);
    }

    pub fn set_speed_adjustable(&self, adjustable: bool) {
        self.speed_adjustable.store(adjustable, Ordering::SeqCst);
    }

    fn record(&self, command: Command) {
        self.commands.lock().unwrap().push(command);
    }
}

impl PlaybackController for RecordingController {
    fn seek_to(&self, position_ms: u64, chapter_path: &Path) {
        self.record(Command::SeekTo(position_ms, chapter_path.to_path_buf()));
    }

    fn play_pause(&self) {
        self.record(Command::PlayPause);
    }

    fn rewind(&self) {
        self.record(Command::Rewind);
    }

    fn fast_forward(&self) {
        self.record(Command::FastForward);
    }

    fn next(&self) {
        self.record(Command::Next);
    }

    fn previous(&self) {
        self.record(Command::Previous);
    }

    fn toggle_sleep_timer(&self) {
        self.record(Command::ToggleSleepTimer);
    }

    fn set_playback_speed(&self, speed: f32) {
        self.record(Command::SetSpeed(speed));
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    fn is_sleep_timer_active(&self) -> bool {
        self.sleep_active.load(Ordering::SeqCst)
    }

    fn sleep_timer_started_at_ms(&self) -> u64 {
        self.sleep_started_at.load(Ordering::SeqCst)
    }

    fn can_adjust_speed(&self) -> bool {
        self.speed_adjustable.load(Ordering::SeqCst)
    }
}

// ── Preferences & clock ───────────────────────────────────────────────────────

pub struct FixedPreferences {
    pub sleep_timer_minutes: u32,
    pub bookmark_on_sleep_timer: bool,
}

impl Preferences for FixedPreferences {
    fn sleep_timer_minutes(&self) -> u32 {
        self.sleep_timer_minutes
    }

    fn bookmark_on_sleep_timer(&self) -> bool {
        self.bookmark_on_sleep_timer
    }
}

#[derive(Default)]
pub struct ManualClock {
    now_ms: AtomicU64,
}

impl ManualClock {
    pub fn at(now_ms: u64) -> Self {
        Self {
            now_ms: AtomicU64::new(now_ms),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}
