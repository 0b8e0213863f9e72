use crate::application::countdown::{CountdownTick, SleepCountdown};
use crate::application::selection::{ChapterSelection, SelectionChange};
use crate::application::state::{Cover, IconTransition, ScreenState};
use crate::core::bus::{NotificationBus, Subscription};
use crate::core::events::{BusEvent, EventSender, ScreenRoute, UiEvent};
use crate::core::models::{Book, BookId, Bookmark, PlayState};
use crate::core::traits::{BookRepository, BookmarkStore, Clock, PlaybackController, Preferences};
use crate::modules::ui::chapter_title::chapter_labels;
use crate::modules::ui::time_format::format_time;
use chrono::{Local, TimeZone};
use crossbeam_channel::Receiver;
use log::{debug, info, warn};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

const MS_PER_MINUTE: u64 = 60_000;

/// Collaborators the play screen talks to
#[derive(Clone)]
pub struct ScreenServices {
    pub repository: Arc<dyn BookRepository>,
    pub bookmarks: Arc<dyn BookmarkStore>,
    pub controller: Arc<dyn PlaybackController>,
    pub preferences: Arc<dyn Preferences>,
    pub bus: NotificationBus,
    pub clock: Arc<dyn Clock>,
}

/// Result of opening the play screen for a book
pub enum ScreenEntry {
    Ready(Box<PlaybackScreen>),

    /// Initialization was aborted, the user belongs somewhere else
    Redirect(ScreenRoute),
}

/// Play screen controller.
///
/// Keeps [`ScreenState`] in sync with the playback layer. Every method must be
/// called from the thread that owns the screen; notifications from other
/// threads reach it through the queue registered in [`on_start`](Self::on_start).
pub struct PlaybackScreen {
    services: ScreenServices,
    book_id: BookId,

    /// Snapshot of the bound book, replaced on every content change
    book: Book,

    state: ScreenState,
    selection: ChapterSelection,
    seek_dragging: bool,
    countdown: SleepCountdown,
    subscription: Option<Subscription>,
}

impl PlaybackScreen {
    pub fn open(book_id: BookId, services: ScreenServices) -> ScreenEntry {
        let book = match services.repository.book(book_id) {
            Some(book) if book.current_chapter().is_some() => book,
            Some(book) => {
                warn!(
                    "Book {} points at chapter {} of {}, treating it as absent",
                    book_id,
                    book.current_chapter,
                    book.chapters.len()
                );
                return ScreenEntry::Redirect(ScreenRoute::BookList);
            }
            None => {
                info!("Book {} not found, redirecting to the book list", book_id);
                return ScreenEntry::Redirect(ScreenRoute::BookList);
            }
        };

        let state = ScreenState::new(
            book.name.clone(),
            cover_for(&book),
            chapter_labels(&book.chapters),
        );

        ScreenEntry::Ready(Box::new(Self {
            services,
            book_id,
            book,
            state,
            selection: ChapterSelection::new(),
            seek_dragging: false,
            countdown: SleepCountdown::new(),
            subscription: None,
        }))
    }

    pub fn state(&self) -> &ScreenState {
        &self.state
    }

    /// Tick channel of the sleep countdown, if one runs
    pub fn countdown_ticker(&self) -> Option<Receiver<Instant>> {
        self.countdown.ticker()
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    /// Screen became visible. Bus notifications are delivered to `sender`.
    pub fn on_start(&mut self, sender: EventSender) {
        self.set_play_state(false);

        if let Some(book) = self.services.repository.book(self.book_id) {
            self.on_book_content_changed(&book);
        }

        self.refresh_menu();

        if self.subscription.is_none() {
            self.subscription = Some(self.services.bus.subscribe(sender));
            info!("Play screen for book {} subscribed", self.book_id);
        }

        self.initialize_countdown();
    }

    /// Screen got hidden
    pub fn on_stop(&mut self) {
        if self.subscription.take().is_some() {
            info!("Play screen for book {} unsubscribed", self.book_id);
        }
        self.countdown.cancel();
    }

    // ── Bus notifications ─────────────────────────────────────────────────────

    pub fn handle_bus_event(&mut self, event: &BusEvent) {
        match event {
            BusEvent::BookContentChanged { book } => self.on_book_content_changed(book),
            BusEvent::PlayStateChanged => self.on_play_state_changed(),
            BusEvent::SleepStateChanged => self.on_sleep_state_changed(),
        }
    }

    pub fn on_book_content_changed(&mut self, book: &Book) {
        if book.id != self.book_id {
            debug!("Ignoring content change of book {}", book.id);
            return;
        }

        let Some(chapter) = book.current_chapter() else {
            debug!("Ignoring content change with chapter {} out of range", book.current_chapter);
            return;
        };
        let duration = chapter.duration_ms;

        // Recorded before the widget moves so the selector callback reads as an echo
        self.selection.set_programmatic(book.current_chapter);
        self.state.selected_chapter = Some(book.current_chapter);

        self.state.seek.max_ms = duration;
        self.state.max_text = format_time(duration, duration);

        if !self.seek_dragging {
            let progress = book.position_ms;
            self.state.seek.progress_ms = progress;
            self.state.played_text = format_time(progress, duration);
        }

        self.book = book.clone();
    }

    pub fn on_play_state_changed(&mut self) {
        self.set_play_state(true);
    }

    pub fn on_sleep_state_changed(&mut self) {
        self.refresh_menu();
        self.initialize_countdown();
    }

    /// One tick of the sleep countdown ticker
    pub fn on_countdown_tick(&mut self) {
        match self.countdown.on_tick(self.services.clock.now_ms()) {
            Some(CountdownTick::Remaining(remaining)) => {
                self.state.countdown_text = format_time(remaining, remaining);
            }
            Some(CountdownTick::Finished) => {
                self.state.countdown_visible = false;
            }
            None => {}
        }
    }

    // ── User input ────────────────────────────────────────────────────────────

    /// Apply a user action. Returns the route to present when the action
    /// leaves the screen or opens a dialog.
    pub fn handle_ui_event(&mut self, event: &UiEvent) -> Option<ScreenRoute> {
        let controller = Arc::clone(&self.services.controller);

        match event {
            UiEvent::PlayPauseRequested => controller.play_pause(),
            UiEvent::RewindRequested => controller.rewind(),
            UiEvent::FastForwardRequested => controller.fast_forward(),

            UiEvent::NextChapterRequested | UiEvent::PreviousChapterRequested
                if !self.state.chapter_nav_visible =>
            {
                debug!("Chapter navigation is hidden for single chapter books");
            }
            UiEvent::NextChapterRequested => controller.next(),
            UiEvent::PreviousChapterRequested => controller.previous(),

            UiEvent::ChapterSelected { index } => self.on_chapter_selected(*index),

            UiEvent::SeekDragStarted => self.seek_dragging = true,
            UiEvent::SeekDragMoved { position_ms } => self.on_seek_moved(*position_ms),
            UiEvent::SeekReleased => self.on_seek_released(),

            UiEvent::SleepTimerToggled => self.toggle_sleep_timer(),

            UiEvent::PlaybackSpeedRequested => {
                if controller.can_adjust_speed() {
                    return Some(ScreenRoute::PlaybackSpeed);
                }
                debug!("Playback speed is not adjustable");
            }
            UiEvent::SpeedChangeRequested { speed } => {
                if controller.can_adjust_speed() {
                    controller.set_playback_speed(*speed);
                } else {
                    debug!("Dropping speed change to {}", speed);
                }
            }

            UiEvent::JumpToPositionRequested => return Some(ScreenRoute::JumpToPosition),
            UiEvent::BookmarksRequested => {
                return Some(ScreenRoute::Bookmarks {
                    book_id: self.book_id,
                });
            }
            UiEvent::SettingsRequested => return Some(ScreenRoute::Settings),
            UiEvent::CloseRequested => return Some(ScreenRoute::Back),
        }

        None
    }

    fn on_chapter_selected(&mut self, index: usize) {
        let Some(chapter) = self.book.chapters.get(index) else {
            debug!("Selector reported chapter {} out of range", index);
            return;
        };
        let path = chapter.path.clone();

        match self.selection.on_selected(index) {
            SelectionChange::UserChanged(index) => {
                info!("Chapter {} selected, seeking to its start", index);
                self.services.controller.seek_to(0, &path);
                self.state.selected_chapter = Some(index);
            }
            SelectionChange::Echo | SelectionChange::Uninitialized => {
                debug!("Selector echo for chapter {}", index);
            }
        }
    }

    fn on_seek_moved(&mut self, position_ms: u64) {
        if !self.seek_dragging {
            return;
        }

        let max = self.state.seek.max_ms;
        let progress = position_ms.min(max);
        self.state.seek.progress_ms = progress;
        self.state.played_text = format_time(progress, max);
    }

    fn on_seek_released(&mut self) {
        if !self.seek_dragging {
            return;
        }
        self.seek_dragging = false;

        let progress = self.state.seek.progress_ms;
        let Some(book) = self.services.repository.book(self.book_id) else {
            warn!("Book {} vanished while seeking", self.book_id);
            return;
        };

        let index = self.selection.current().unwrap_or(book.current_chapter);
        if let Some(chapter) = book.chapters.get(index) {
            self.services.controller.seek_to(progress, &chapter.path);
        }
        self.state.played_text = format_time(progress, self.state.seek.max_ms);
    }

    fn toggle_sleep_timer(&mut self) {
        let arming = !self.services.controller.is_sleep_timer_active();
        self.services.controller.toggle_sleep_timer();

        if arming && self.services.preferences.bookmark_on_sleep_timer() {
            self.add_sleep_bookmark();
        }
    }

    /// Bookmark at the position the screen shows. The repository copy may
    /// lag behind while playing.
    fn add_sleep_bookmark(&self) {
        let Some(chapter) = self.book.current_chapter() else {
            return;
        };

        let bookmark = Bookmark {
            book_id: self.book_id,
            title: format!("{}: Sleep timer", local_timestamp(self.services.clock.now_ms())),
            chapter_path: chapter.path.clone(),
            position_ms: self.book.position_ms,
        };

        if let Err(e) = self.services.bookmarks.add_bookmark(bookmark) {
            warn!("Could not add sleep timer bookmark: {:#}", e);
        }
    }

    // ── Widget refresh ────────────────────────────────────────────────────────

    fn set_play_state(&mut self, animated: bool) {
        let target = PlayState::from_playing(self.services.controller.is_playing());
        if self.state.play_icon == target && self.state.last_icon_transition.is_some() {
            return;
        }

        self.state.play_icon = target;
        self.state.last_icon_transition = Some(IconTransition { to: target, animated });
    }

    fn refresh_menu(&mut self) {
        let controller = &self.services.controller;
        self.state.menu.speed_item_visible = controller.can_adjust_speed();
        self.state.menu.sleep_timer_armed = controller.is_sleep_timer_active();
    }

    fn initialize_countdown(&mut self) {
        self.countdown.cancel();

        let controller = &self.services.controller;
        if controller.is_sleep_timer_active() {
            let duration = u64::from(self.services.preferences.sleep_timer_minutes()) * MS_PER_MINUTE;
            let now = self.services.clock.now_ms();
            let elapsed = now.saturating_sub(controller.sleep_timer_started_at_ms());
            let remaining = duration.saturating_sub(elapsed);

            if remaining > 0 {
                self.state.countdown_visible = true;
                self.state.countdown_text = format_time(remaining, remaining);
                self.countdown.start(remaining, now);
                return;
            }
        }

        self.state.countdown_visible = false;
    }
}

#[cfg(test)]
impl PlaybackScreen {
    pub fn book(&self) -> &Book {
        &self.book
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn is_seek_dragging(&self) -> bool {
        self.seek_dragging
    }
}

fn cover_for(book: &Book) -> Cover {
    match &book.cover_path {
        Some(path) if !book.use_cover_replacement && is_readable(path) => Cover::File(path.clone()),
        _ => Cover::Replacement {
            name: book.name.clone(),
        },
    }
}

fn is_readable(path: &Path) -> bool {
    path.is_file() && File::open(path).is_ok()
}

fn local_timestamp(now_ms: u64) -> String {
    Local
        .timestamp_millis_opt(now_ms as i64)
        .single()
        .map(|time| time.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| now_ms.to_string())
}
