use crate::application::state::ScreenState;
use crate::core::events::{ScreenRoute, UiEvent};
use crate::core::models::{Book, Bookmark, PlayState};
use crate::core::traits::ScreenRenderer;
use crate::modules::ui::time_format::format_time;
use anyhow::Result;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    terminal::{self, ClearType},
    ExecutableCommand,
};
use std::io::{stdout, Write};
use std::time::Duration;

/// Plain output for one-off commands, plus a single status line play screen
pub struct TerminalRenderer {
    initialized: bool,
    message: Option<String>,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            initialized: false,
            message: None,
        }
    }

    pub fn print_message(&self, message: &str) {
        println!("{}", message);
    }

    pub fn print_error(&self, message: &str) {
        eprintln!("Error: {}", message);
    }

    pub fn print_book_list(&self, books: &[Book]) {
        for book in books {
            let progress = book
                .current_chapter()
                .map(|chapter| {
                    format!(
                        "chapter {}/{} at {}",
                        book.current_chapter + 1,
                        book.chapters.len(),
                        format_time(book.position_ms, chapter.duration_ms)
                    )
                })
                .unwrap_or_else(|| "no chapters".to_string());
            let total = book.total_duration_ms();
            println!("{} [{}] - {}", book, format_time(total, total), progress);
        }
    }

    pub fn print_bookmarks(&self, book: &Book, bookmarks: &[Bookmark]) {
        if bookmarks.is_empty() {
            println!("No bookmarks for {}", book.name);
            return;
        }

        println!("Bookmarks of {}:", book.name);
        for bookmark in bookmarks {
            let chapter = book.chapters.iter().find(|c| c.path == bookmark.chapter_path);
            let (number, duration) = chapter
                .map(|c| ((c.index + 1).to_string(), c.duration_ms))
                .unwrap_or_else(|| ("?".to_string(), bookmark.position_ms));
            println!(
                "  {} (chapter {}, {})",
                bookmark.title,
                number,
                format_time(bookmark.position_ms, duration)
            );
        }
    }

    fn status_line(state: &ScreenState) -> String {
        let icon = match state.play_icon {
            PlayState::Playing => "▶",
            PlayState::Paused => "⏸",
        };

        let mut line = format!(
            "{} {} | {} / {}",
            icon,
            state.selected_label().unwrap_or(&state.title),
            state.played_text,
            state.max_text
        );
        if state.countdown_visible {
            line.push_str(&format!(" | sleep in {}", state.countdown_text));
        }
        line
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenRenderer for TerminalRenderer {
    fn init(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.initialized = true;
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        if self.initialized {
            terminal::disable_raw_mode()?;
            self.initialized = false;
            println!();
        }
        Ok(())
    }

    fn render(&mut self, state: &ScreenState) -> Result<()> {
        let mut stdout = stdout();

        stdout.execute(cursor::MoveToColumn(0))?;
        stdout.execute(terminal::Clear(ClearType::CurrentLine))?;

        print!("{}", Self::status_line(state));

        if let Some(message) = &self.message {
            print!(" | {}", message);
        }

        print!(" | [Space: Pause | N/B: Chapter | R/F: Seek | T: Sleep | Q: Quit]");

        stdout.flush()?;
        Ok(())
    }

    fn poll_input(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        if event::poll(Duration::from_millis(0))? {
            if let Event::Key(KeyEvent { code, .. }) = event::read()? {
                match code {
                    KeyCode::Char(' ') | KeyCode::Char('p') | KeyCode::Char('P') => {
                        events.push(UiEvent::PlayPauseRequested);
                    }
                    KeyCode::Char('n') | KeyCode::Char('N') => {
                        events.push(UiEvent::NextChapterRequested);
                    }
                    KeyCode::Char('b') | KeyCode::Char('B') => {
                        events.push(UiEvent::PreviousChapterRequested);
                    }
                    KeyCode::Char('r') | KeyCode::Char('R') | KeyCode::Left => {
                        events.push(UiEvent::RewindRequested);
                    }
                    KeyCode::Char('f') | KeyCode::Char('F') | KeyCode::Right => {
                        events.push(UiEvent::FastForwardRequested);
                    }
                    KeyCode::Char('t') | KeyCode::Char('T') => {
                        events.push(UiEvent::SleepTimerToggled);
                    }
                    KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                        events.push(UiEvent::CloseRequested);
                    }
                    _ => {}
                }
            }
        }

        Ok(events)
    }

    fn show_route(&mut self, route: &ScreenRoute) -> Result<()> {
        self.message = route_hint(route);
        Ok(())
    }
}

/// What to tell the user when the screen asks for a dialog the plain
/// renderer cannot show
fn route_hint(route: &ScreenRoute) -> Option<String> {
    match route {
        ScreenRoute::Bookmarks { book_id } => {
            Some(format!("Bookmarks: run '{} bookmarks {}'", crate::utils::APP_NAME, book_id))
        }
        ScreenRoute::Settings => Some(format!("Settings: run '{} sleep'", crate::utils::APP_NAME)),
        ScreenRoute::JumpToPosition | ScreenRoute::PlaybackSpeed => {
            Some("Not available in plain mode".to_string())
        }
        ScreenRoute::Back | ScreenRoute::BookList => None,
    }
}
