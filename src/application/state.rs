use crate::core::models::PlayState;
use std::path::PathBuf;

/// Visible widget state of the play screen (single source of truth for rendering)
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenState {
    pub title: String,
    pub cover: Cover,
    pub chapter_labels: Vec<String>,
    pub selected_chapter: Option<usize>,

    /// Next/previous buttons and the chapter selector
    pub chapter_nav_visible: bool,

    pub seek: SeekBarState,
    pub played_text: String,
    pub max_text: String,

    pub play_icon: PlayState,
    pub last_icon_transition: Option<IconTransition>,

    pub countdown_visible: bool,
    pub countdown_text: String,

    pub menu: MenuState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeekBarState {
    pub max_ms: u64,
    pub progress_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconTransition {
    pub to: PlayState,
    pub animated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MenuState {
    pub speed_item_visible: bool,

    /// Sleep timer icon shows the armed variant
    pub sleep_timer_armed: bool,
}

/// What the cover view displays
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cover {
    File(PathBuf),
    /// Generated placeholder built from the book name
    Replacement { name: String },
}

impl ScreenState {
    pub fn new(title: String, cover: Cover, chapter_labels: Vec<String>) -> Self {
        let chapter_nav_visible = chapter_labels.len() > 1;
        Self {
            title,
            cover,
            chapter_labels,
            selected_chapter: None,
            chapter_nav_visible,
            seek: SeekBarState::default(),
            played_text: String::new(),
            max_text: String::new(),
            play_icon: PlayState::Paused,
            last_icon_transition: None,
            countdown_visible: false,
            countdown_text: String::new(),
            menu: MenuState::default(),
        }
    }

    /// Label of the selected chapter, if any
    pub fn selected_label(&self) -> Option<&str> {
        self.selected_chapter
            .and_then(|i| self.chapter_labels.get(i))
            .map(String::as_str)
    }
}
