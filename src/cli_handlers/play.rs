use crate::application::app::Application;
use crate::application::screen::{PlaybackScreen, ScreenEntry, ScreenServices};
use crate::cli_handlers::CliCommand;
use crate::core::bus::NotificationBus;
use crate::core::events::ScreenRoute;
use crate::core::models::BookId;
use crate::core::traits::{BookRepository, ScreenRenderer, SystemClock};
use crate::modules::playback::local_controller::{ControllerSettings, LocalController};
use crate::modules::storage::config::PlayerConfig;
use crate::modules::storage::json_library::JsonLibrary;
use crate::modules::ui::terminal::renderer::TerminalRenderer;
use crate::modules::ui::tui::renderer::TuiRenderer;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

/// How often the local controller advances the position
const ENGINE_TICK: Duration = Duration::from_millis(250);

pub struct PlayCommand {
    pub id: u64,
    pub plain: bool,
}

impl CliCommand for PlayCommand {
    fn execute(self: Box<Self>) -> Result<()> {
        let config = PlayerConfig::load()?;
        let library = Arc::new(JsonLibrary::new()?);
        let preferences = Arc::new(config.clone());
        let clock = Arc::new(SystemClock);
        let bus = NotificationBus::new();
        let ui = TerminalRenderer::new();

        let id = BookId(self.id);
        let Some(book) = library.book(id) else {
            ui.print_error(&format!("No book with id {}", id));
            return show_book_list(&ui, &*library);
        };

        let controller = Arc::new(LocalController::new(
            book,
            library.clone(),
            preferences.clone(),
            clock.clone(),
            bus.clone(),
            ControllerSettings {
                seek_step_ms: config.seek_step_ms(),
                speed_adjustable: config.speed_adjustable,
            },
        ));

        let services = ScreenServices {
            repository: library.clone(),
            bookmarks: library.clone(),
            controller: controller.clone(),
            preferences,
            bus,
            clock,
        };

        let screen = match PlaybackScreen::open(id, services) {
            ScreenEntry::Ready(screen) => *screen,
            ScreenEntry::Redirect(route) => {
                ui.print_error(&format!("Book {} cannot be played", id));
                return match route {
                    ScreenRoute::BookList => show_book_list(&ui, &*library),
                    _ => Ok(()),
                };
            }
        };

        let renderer: Box<dyn ScreenRenderer> = if self.plain {
            Box::new(TerminalRenderer::new())
        } else {
            Box::new(TuiRenderer::new())
        };

        let _engine = controller.spawn_engine(ENGINE_TICK);
        let mut app = Application::new(screen).with_ui_renderer(renderer);

        app.init()?;
        let outcome = app.run();
        app.cleanup()?;
        outcome?;

        if let Some(ScreenRoute::BookList) = app.last_route() {
            show_book_list(&ui, &*library)?;
        }

        Ok(())
    }
}

/// Where the user lands when the book cannot be shown
fn show_book_list(ui: &TerminalRenderer, library: &dyn BookRepository) -> Result<()> {
    let books = library.books();
    if !books.is_empty() {
        ui.print_message("Available books:");
        ui.print_book_list(&books);
    }
    Ok(())
}
