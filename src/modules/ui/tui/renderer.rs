use crate::application::state::{Cover, ScreenState};
use crate::core::events::{ScreenRoute, UiEvent};
use crate::core::models::PlayState;
use crate::core::traits::ScreenRenderer;
use crate::modules::playback::local_controller::{MAX_SPEED, MIN_SPEED};
use crate::modules::ui::time_format::format_time;
use crate::utils::APP_NAME;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};
use std::cell::RefCell;
use std::io::{stdout, Stdout};
use std::time::Duration;

/// Seek bar step while scrubbing with the arrow keys
const SCRUB_STEP_MS: u64 = 10_000;
/// Step of the jump-to-position dialog
const JUMP_STEP_MS: u64 = 60_000;
const SPEED_STEP: f32 = 0.1;

/// Input mode of the renderer. Dialogs are local to the renderer until
/// confirmed.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Normal,
    /// Seek bar held, `position_ms` is where it would be released
    Scrubbing { position_ms: u64 },
    SpeedDialog { speed: f32 },
    JumpDialog { position_ms: u64 },
}

/// Full screen play view
pub struct TuiRenderer {
    terminal: Option<Terminal<CrosstermBackend<Stdout>>>,
    list_state: RefCell<ListState>,

    // Last state handed to `render`
    view: Option<ScreenState>,
    followed_chapter: Option<usize>,

    mode: Mode,
    message: Option<String>,
}

impl TuiRenderer {
    pub fn new() -> Self {
        Self {
            terminal: None,
            list_state: RefCell::new(ListState::default()),
            view: None,
            followed_chapter: None,
            mode: Mode::Normal,
            message: None,
        }
    }

    /// Keep the chapter cursor on the playing chapter whenever that changes
    fn sync_view(&mut self, state: &ScreenState) {
        if state.selected_chapter != self.followed_chapter {
            self.followed_chapter = state.selected_chapter;
            self.list_state.borrow_mut().select(state.selected_chapter);
        }
        self.view = Some(state.clone());
    }

    fn progress_ms(&self) -> u64 {
        self.view.as_ref().map_or(0, |v| v.seek.progress_ms)
    }

    fn max_ms(&self) -> u64 {
        self.view.as_ref().map_or(0, |v| v.seek.max_ms)
    }

    fn chapter_count(&self) -> usize {
        self.view.as_ref().map_or(0, |v| v.chapter_labels.len())
    }

    fn draw_ui(&self, f: &mut Frame, state: &ScreenState) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Chapters, or the cover for single chapter books
                Constraint::Length(3), // Seek bar
                Constraint::Length(3), // Status
                Constraint::Length(3), // Controls
            ])
            .split(f.area());

        self.draw_header(f, chunks[0], state);
        if state.chapter_nav_visible {
            self.draw_chapters(f, chunks[1], state);
        } else {
            self.draw_cover(f, chunks[1], state);
        }
        self.draw_seek_bar(f, chunks[2], state);
        self.draw_status(f, chunks[3], state);
        self.draw_controls(f, chunks[4], state);

        match self.mode {
            Mode::SpeedDialog { speed } => self.draw_speed_dialog(f, speed),
            Mode::JumpDialog { position_ms } => self.draw_jump_dialog(f, position_ms),
            Mode::Normal | Mode::Scrubbing { .. } => {}
        }
    }

    fn draw_header(&self, f: &mut Frame, area: Rect, state: &ScreenState) {
        let title = Paragraph::new(format!("♪ {} ♪  {}", APP_NAME, state.title))
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(title, area);
    }

    fn draw_cover(&self, f: &mut Frame, area: Rect, state: &ScreenState) {
        let text = match &state.cover {
            Cover::File(path) => format!("Cover: {}", path.display()),
            Cover::Replacement { name } => name
                .chars()
                .next()
                .map(|c| c.to_uppercase().to_string())
                .unwrap_or_default(),
        };

        let cover = Paragraph::new(text)
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title(" Cover "));
        f.render_widget(cover, area);
    }

    fn draw_chapters(&self, f: &mut Frame, area: Rect, state: &ScreenState) {
        let items: Vec<ListItem> = state
            .chapter_labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let style = if Some(i) == state.selected_chapter {
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                ListItem::new(label.as_str()).style(style)
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" Chapters ({}) ", state.chapter_labels.len())),
            )
            .highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol("> ");

        f.render_stateful_widget(list, area, &mut *self.list_state.borrow_mut());
    }

    fn draw_seek_bar(&self, f: &mut Frame, area: Rect, state: &ScreenState) {
        let ratio = if state.seek.max_ms == 0 {
            0.0
        } else {
            (state.seek.progress_ms as f64 / state.seek.max_ms as f64).clamp(0.0, 1.0)
        };

        let title = match self.mode {
            Mode::Scrubbing { .. } => " Seeking (Enter: release) ",
            _ => " Position ",
        };

        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(title))
            .gauge_style(Style::default().fg(Color::Cyan))
            .ratio(ratio)
            .label(format!("{} / {}", state.played_text, state.max_text));
        f.render_widget(gauge, area);
    }

    fn draw_status(&self, f: &mut Frame, area: Rect, state: &ScreenState) {
        let (icon, color) = match state.play_icon {
            PlayState::Playing => ("▶ PLAYING", Color::Green),
            PlayState::Paused => ("⏸ PAUSED", Color::Gray),
        };

        let mut spans = vec![Span::styled(
            icon,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )];

        if state.countdown_visible {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                format!("⏾ {}", state.countdown_text),
                Style::default().fg(Color::Magenta),
            ));
        }

        if let Some(message) = &self.message {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(message.as_str(), Style::default().fg(Color::Yellow)));
        }

        let paragraph = Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::ALL).title(" Now Playing "));
        f.render_widget(paragraph, area);
    }

    fn draw_controls(&self, f: &mut Frame, area: Rect, state: &ScreenState) {
        let mut spans = vec![
            Span::raw("Space: Play/Pause • "),
            Span::raw("r/f: Rewind/Forward • "),
            Span::raw("←/→: Seek • "),
        ];
        if state.chapter_nav_visible {
            spans.push(Span::raw("n/b: Next/Prev • ↑/↓ Enter: Chapter • "));
        }

        let sleep_label = if state.menu.sleep_timer_armed { "t: Sleep (on) • " } else { "t: Sleep • " };
        spans.push(Span::styled(sleep_label, Style::default().fg(Color::Magenta)));
        if state.menu.speed_item_visible {
            spans.push(Span::styled("x: Speed • ", Style::default().fg(Color::Cyan)));
        }
        spans.push(Span::raw("g: Jump • m: Bookmarks • s: Settings • q: Quit"));

        let controls = Paragraph::new(Line::from(spans))
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL).title(" Controls "));
        f.render_widget(controls, area);
    }

    fn draw_speed_dialog(&self, f: &mut Frame, speed: f32) {
        let area = centered_rect(40, 20, f.area());
        let text = vec![
            Line::from(Span::styled(
                format!("{:.1}x", speed),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
            Line::from("←/→: Adjust • Enter: Apply • Esc: Cancel"),
        ];

        f.render_widget(Clear, area);
        f.render_widget(
            Paragraph::new(text).block(Block::default().borders(Borders::ALL).title(" Playback Speed ")),
            area,
        );
    }

    fn draw_jump_dialog(&self, f: &mut Frame, position_ms: u64) {
        let area = centered_rect(40, 20, f.area());
        let text = vec![
            Line::from(Span::styled(
                format_time(position_ms, self.max_ms()),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
            Line::from("←/→: ±1 min • Enter: Jump • Esc: Cancel"),
        ];

        f.render_widget(Clear, area);
        f.render_widget(
            Paragraph::new(text).block(Block::default().borders(Borders::ALL).title(" Jump To Position ")),
            area,
        );
    }

    fn navigate_up(&mut self) {
        let mut list_state = self.list_state.borrow_mut();
        let index = match list_state.selected() {
            Some(0) | None => 0,
            Some(i) => i - 1,
        };
        list_state.select(Some(index));
    }

    fn navigate_down(&mut self) {
        let count = self.chapter_count();
        if count == 0 {
            return;
        }
        let mut list_state = self.list_state.borrow_mut();
        let index = match list_state.selected() {
            Some(i) if i + 1 < count => i + 1,
            Some(i) => i,
            None => 0,
        };
        list_state.select(Some(index));
    }

    /// Translate one key press into screen events, updating local dialog state
    fn handle_key(&mut self, key: KeyEvent) -> Vec<UiEvent> {
        let mut events = Vec::new();

        match self.mode {
            Mode::Scrubbing { position_ms } => match key.code {
                KeyCode::Left | KeyCode::Right => {
                    let position_ms = self.step(position_ms, key.code, SCRUB_STEP_MS);
                    self.mode = Mode::Scrubbing { position_ms };
                    events.push(UiEvent::SeekDragMoved { position_ms });
                }
                KeyCode::Enter | KeyCode::Esc => {
                    self.mode = Mode::Normal;
                    events.push(UiEvent::SeekReleased);
                }
                _ => {}
            },

            Mode::SpeedDialog { speed } => match key.code {
                KeyCode::Left | KeyCode::Char('-') => {
                    self.mode = Mode::SpeedDialog {
                        speed: (speed - SPEED_STEP).max(MIN_SPEED),
                    };
                }
                KeyCode::Right | KeyCode::Char('+') => {
                    self.mode = Mode::SpeedDialog {
                        speed: (speed + SPEED_STEP).min(MAX_SPEED),
                    };
                }
                KeyCode::Enter => {
                    self.mode = Mode::Normal;
                    events.push(UiEvent::SpeedChangeRequested { speed });
                }
                KeyCode::Esc => self.mode = Mode::Normal,
                _ => {}
            },

            Mode::JumpDialog { position_ms } => match key.code {
                KeyCode::Left | KeyCode::Right => {
                    self.mode = Mode::JumpDialog {
                        position_ms: self.step(position_ms, key.code, JUMP_STEP_MS),
                    };
                }
                KeyCode::Enter => {
                    self.mode = Mode::Normal;
                    events.push(UiEvent::SeekDragStarted);
                    events.push(UiEvent::SeekDragMoved { position_ms });
                    events.push(UiEvent::SeekReleased);
                }
                KeyCode::Esc => self.mode = Mode::Normal,
                _ => {}
            },

            Mode::Normal => {
                self.message = None;
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => events.push(UiEvent::CloseRequested),
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        events.push(UiEvent::CloseRequested);
                    }
                    KeyCode::Char(' ') | KeyCode::Char('p') => events.push(UiEvent::PlayPauseRequested),
                    KeyCode::Char('r') => events.push(UiEvent::RewindRequested),
                    KeyCode::Char('f') => events.push(UiEvent::FastForwardRequested),
                    KeyCode::Char('n') => events.push(UiEvent::NextChapterRequested),
                    KeyCode::Char('b') => events.push(UiEvent::PreviousChapterRequested),
                    KeyCode::Up | KeyCode::Char('k') => self.navigate_up(),
                    KeyCode::Down | KeyCode::Char('j') => self.navigate_down(),
                    KeyCode::Enter => {
                        if let Some(index) = self.list_state.borrow().selected() {
                            events.push(UiEvent::ChapterSelected { index });
                        }
                    }
                    KeyCode::Left | KeyCode::Right => {
                        let position_ms = self.step(self.progress_ms(), key.code, SCRUB_STEP_MS);
                        self.mode = Mode::Scrubbing { position_ms };
                        events.push(UiEvent::SeekDragStarted);
                        events.push(UiEvent::SeekDragMoved { position_ms });
                    }
                    KeyCode::Char('t') => events.push(UiEvent::SleepTimerToggled),
                    KeyCode::Char('x') => events.push(UiEvent::PlaybackSpeedRequested),
                    KeyCode::Char('g') => events.push(UiEvent::JumpToPositionRequested),
                    KeyCode::Char('m') => events.push(UiEvent::BookmarksRequested),
                    KeyCode::Char('s') => events.push(UiEvent::SettingsRequested),
                    _ => {}
                }
            }
        }

        events
    }

    fn step(&self, position_ms: u64, code: KeyCode, step_ms: u64) -> u64 {
        match code {
            KeyCode::Left => position_ms.saturating_sub(step_ms),
            _ => (position_ms + step_ms).min(self.max_ms()),
        }
    }
}

impl Default for TuiRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenRenderer for TuiRenderer {
    fn init(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        self.terminal = Some(Terminal::new(backend)?);
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        disable_raw_mode()?;
        if let Some(mut terminal) = self.terminal.take() {
            execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
            terminal.show_cursor()?;
        }
        Ok(())
    }

    fn render(&mut self, state: &ScreenState) -> Result<()> {
        self.sync_view(state);

        let mut terminal = match self.terminal.take() {
            Some(t) => t,
            None => return Ok(()),
        };

        terminal.draw(|f| self.draw_ui(f, state))?;
        self.terminal = Some(terminal);
        Ok(())
    }

    fn poll_input(&mut self) -> Result<Vec<UiEvent>> {
        if event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                return Ok(self.handle_key(key));
            }
        }

        Ok(Vec::new())
    }

    fn show_route(&mut self, route: &ScreenRoute) -> Result<()> {
        match route {
            ScreenRoute::PlaybackSpeed => self.mode = Mode::SpeedDialog { speed: 1.0 },
            ScreenRoute::JumpToPosition => {
                self.mode = Mode::JumpDialog {
                    position_ms: self.progress_ms(),
                }
            }
            ScreenRoute::Bookmarks { book_id } => {
                self.message = Some(format!("Bookmarks: run '{} bookmarks {}'", APP_NAME, book_id));
            }
            ScreenRoute::Settings => {
                self.message = Some(format!("Settings: run '{} sleep' or '{} sleep-bookmark'", APP_NAME, APP_NAME));
            }
            ScreenRoute::Back | ScreenRoute::BookList => {}
        }
        Ok(())
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn renderer_at(progress_ms: u64, selected: usize) -> TuiRenderer {
        let mut state = ScreenState::new(
            "Dune".into(),
            Cover::Replacement { name: "Dune".into() },
            vec!["1 - A".into(), "2 - B".into(), "3 - C".into()],
        );
        state.seek.max_ms = 600_000;
        state.seek.progress_ms = progress_ms;
        state.selected_chapter = Some(selected);

        let mut renderer = TuiRenderer::new();
        renderer.sync_view(&state);
        renderer
    }

    // ── Normal mode ───────────────────────────────────────────────────────────

    #[test]
    fn cursor_starts_on_playing_chapter_and_enter_selects() {
        let mut renderer = renderer_at(0, 1);
        assert!(renderer.handle_key(key(KeyCode::Down)).is_empty());
        assert_eq!(
            renderer.handle_key(key(KeyCode::Enter)),
            vec![UiEvent::ChapterSelected { index: 2 }]
        );

        // Cursor stops at the last chapter
        renderer.handle_key(key(KeyCode::Down));
        assert_eq!(
            renderer.handle_key(key(KeyCode::Enter)),
            vec![UiEvent::ChapterSelected { index: 2 }]
        );
    }

    #[test]
    fn letters_map_to_commands() {
        let mut renderer = renderer_at(0, 0);
        assert_eq!(renderer.handle_key(key(KeyCode::Char(' '))), vec![UiEvent::PlayPauseRequested]);
        assert_eq!(renderer.handle_key(key(KeyCode::Char('t'))), vec![UiEvent::SleepTimerToggled]);
        assert_eq!(renderer.handle_key(key(KeyCode::Char('q'))), vec![UiEvent::CloseRequested]);
    }

    // ── Scrubbing ─────────────────────────────────────────────────────────────

    #[test]
    fn arrows_drag_the_seek_bar_until_enter() {
        let mut renderer = renderer_at(595_000, 0);

        assert_eq!(
            renderer.handle_key(key(KeyCode::Right)),
            vec![
                UiEvent::SeekDragStarted,
                UiEvent::SeekDragMoved { position_ms: 600_000 }
            ]
        );
        assert_eq!(
            renderer.handle_key(key(KeyCode::Left)),
            vec![UiEvent::SeekDragMoved { position_ms: 590_000 }]
        );
        assert_eq!(renderer.handle_key(key(KeyCode::Enter)), vec![UiEvent::SeekReleased]);
        assert_eq!(renderer.mode, Mode::Normal);
    }

    // ── Dialogs ───────────────────────────────────────────────────────────────

    #[test]
    fn speed_dialog_applies_on_enter() {
        let mut renderer = renderer_at(0, 0);
        renderer.show_route(&ScreenRoute::PlaybackSpeed).unwrap();

        for _ in 0..20 {
            renderer.handle_key(key(KeyCode::Right));
        }
        assert_eq!(
            renderer.handle_key(key(KeyCode::Enter)),
            vec![UiEvent::SpeedChangeRequested { speed: MAX_SPEED }]
        );
    }

    #[test]
    fn jump_dialog_seeks_through_the_seek_bar() {
        let mut renderer = renderer_at(30_000, 0);
        renderer.show_route(&ScreenRoute::JumpToPosition).unwrap();

        renderer.handle_key(key(KeyCode::Right));
        assert_eq!(
            renderer.handle_key(key(KeyCode::Enter)),
            vec![
                UiEvent::SeekDragStarted,
                UiEvent::SeekDragMoved { position_ms: 90_000 },
                UiEvent::SeekReleased,
            ]
        );
    }

    #[test]
    fn escape_closes_dialog_without_events() {
        let mut renderer = renderer_at(0, 0);
        renderer.show_route(&ScreenRoute::JumpToPosition).unwrap();

        assert!(renderer.handle_key(key(KeyCode::Esc)).is_empty());
        assert_eq!(renderer.mode, Mode::Normal);
    }

    #[test]
    fn bookmarks_route_leaves_a_hint() {
        let mut renderer = renderer_at(0, 0);
        renderer
            .show_route(&ScreenRoute::Bookmarks { book_id: crate::core::models::BookId(7) })
            .unwrap();

        assert_eq!(
            renderer.message.as_deref(),
            Some("Bookmarks: run 'shelf-player bookmarks 7'")
        );
    }
}
