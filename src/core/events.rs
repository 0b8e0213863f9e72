use crate::core::models::{Book, BookId};

/// Everything the screen loop can receive on its queue
#[derive(Debug, Clone)]
pub enum ScreenEvent {
    // Notifications published by the playback layer
    Bus(BusEvent),

    // Input produced by the renderer
    Ui(UiEvent),
}

/// Notifications fanned out by the [`NotificationBus`](crate::core::bus::NotificationBus)
#[derive(Debug, Clone)]
pub enum BusEvent {
    /// A book's chapter or position changed
    BookContentChanged { book: Book },

    /// Playing/paused flipped. Carries no payload; receivers re-query.
    PlayStateChanged,

    /// Sleep timer armed or disarmed. Carries no payload; receivers re-query.
    SleepStateChanged,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// User requested pause/resume toggle
    PlayPauseRequested,

    RewindRequested,

    FastForwardRequested,

    NextChapterRequested,

    PreviousChapterRequested,

    /// The chapter selector reported a selection. May be an echo of a
    /// programmatic selection.
    ChapterSelected { index: usize },

    /// User put a finger on the seek bar
    SeekDragStarted,

    /// Seek bar moved while dragging
    SeekDragMoved { position_ms: u64 },

    /// User let go of the seek bar
    SeekReleased,

    SleepTimerToggled,

    /// Open the playback speed dialog
    PlaybackSpeedRequested,

    /// Playback speed picked in the speed dialog
    SpeedChangeRequested { speed: f32 },

    JumpToPositionRequested,

    BookmarksRequested,

    SettingsRequested,

    /// Leave the screen
    CloseRequested,
}

/// Where the screen wants the user to go next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenRoute {
    /// The bound book does not exist (anymore)
    BookList,
    JumpToPosition,
    PlaybackSpeed,
    Bookmarks { book_id: BookId },
    Settings,
    Back,
}

/// Type alias for event sender
pub type EventSender = crossbeam_channel::Sender<ScreenEvent>;

/// Type alias for event receiver
pub type EventReceiver = crossbeam_channel::Receiver<ScreenEvent>;
