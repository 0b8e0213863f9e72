pub mod chapter_title;
pub mod terminal;
pub mod time_format;
pub mod tui;
