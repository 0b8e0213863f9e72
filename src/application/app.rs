use crate::application::screen::PlaybackScreen;
use crate::core::events::*;
use crate::core::traits::ScreenRenderer;
use anyhow::Result;
use crossbeam_channel::{never, select, unbounded};
use log::info;
use std::time::Duration;

/// Longest wait between two frames when nothing happens
const FRAME_INTERVAL: Duration = Duration::from_millis(50);

/// Single-threaded screen loop.
///
/// Owns the play screen and its queue. Bus notifications and renderer input
/// are both turned into [`ScreenEvent`]s and applied one at a time, so the
/// screen state is only ever touched from the thread running the loop.
pub struct Application {
    screen: PlaybackScreen,
    event_tx: EventSender,
    event_rx: EventReceiver,

    ui_renderer: Option<Box<dyn ScreenRenderer>>,

    running: bool,
    last_route: Option<ScreenRoute>,
}

impl Application {
    pub fn new(screen: PlaybackScreen) -> Self {
        let (tx, rx) = unbounded();

        Self {
            screen,
            event_tx: tx,
            event_rx: rx,
            ui_renderer: None,
            running: false,
            last_route: None,
        }
    }

    /// Set the UI renderer
    pub fn with_ui_renderer(mut self, renderer: Box<dyn ScreenRenderer>) -> Self {
        self.ui_renderer = Some(renderer);
        self
    }

    /// Route that ended the loop or the last dialog asked for
    pub fn last_route(&self) -> Option<&ScreenRoute> {
        self.last_route.as_ref()
    }

    /// Bring up the UI and make the screen visible
    pub fn init(&mut self) -> Result<()> {
        if let Some(ui) = &mut self.ui_renderer {
            ui.init()?;
        }

        self.screen.on_start(self.event_tx.clone());
        Ok(())
    }

    /// Run the main event loop
    pub fn run(&mut self) -> Result<()> {
        self.running = true;

        while self.running {
            self.wait_for_activity()?;
            self.process_events()?;

            // Poll UI for input
            if let Some(ui) = &mut self.ui_renderer {
                for event in ui.poll_input()? {
                    self.event_tx.send(ScreenEvent::Ui(event))?;
                }
            }
            self.process_events()?;

            if let Some(ui) = &mut self.ui_renderer {
                ui.render(self.screen.state())?;
            }
        }

        Ok(())
    }

    /// Block until an event, a countdown tick or the next frame is due
    fn wait_for_activity(&mut self) -> Result<()> {
        let events = self.event_rx.clone();
        let ticker = self.screen.countdown_ticker().unwrap_or_else(never);

        select! {
            recv(events) -> event => {
                if let Ok(event) = event {
                    self.handle_event(event)?;
                }
            }
            recv(ticker) -> _ => self.screen.on_countdown_tick(),
            default(FRAME_INTERVAL) => {}
        }

        Ok(())
    }

    /// Drain all events currently in queue
    fn process_events(&mut self) -> Result<()> {
        while let Ok(event) = self.event_rx.try_recv() {
            self.handle_event(event)?;
        }
        Ok(())
    }

    fn handle_event(&mut self, event: ScreenEvent) -> Result<()> {
        match event {
            ScreenEvent::Bus(event) => self.screen.handle_bus_event(&event),
            ScreenEvent::Ui(event) => {
                if let Some(route) = self.screen.handle_ui_event(&event) {
                    self.show_route(route)?;
                }
            }
        }

        Ok(())
    }

    fn show_route(&mut self, route: ScreenRoute) -> Result<()> {
        if let Some(ui) = &mut self.ui_renderer {
            ui.show_route(&route)?;
        }

        if matches!(route, ScreenRoute::Back | ScreenRoute::BookList) {
            info!("Leaving play screen: {:?}", route);
            self.running = false;
        }

        self.last_route = Some(route);
        Ok(())
    }

    /// Hide the screen and restore the terminal
    pub fn cleanup(&mut self) -> Result<()> {
        self.screen.on_stop();

        if let Some(ui) = &mut self.ui_renderer {
            ui.cleanup()?;
        }

        Ok(())
    }
}

#[cfg(test)]
impl Application {
    /// Sender half of the queue, for tests standing in for other threads
    pub fn event_sender(&self) -> EventSender {
        self.event_tx.clone()
    }

    pub fn screen(&self) -> &PlaybackScreen {
        &self.screen
    }

    /// Drain the queue once without entering the main loop
    pub fn run_once(&mut self) -> Result<()> {
        self.process_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::screen::{ScreenEntry, ScreenServices};
    use crate::application::state::ScreenState;
    use crate::application::testing::*;
    use crate::core::bus::NotificationBus;
    use crate::core::models::{BookId, PlayState};
    use std::sync::{Arc, Mutex};

    // ── Helpers ───────────────────────────────────────────────────────────────

    #[derive(Default)]
    struct Recorded {
        inputs: Vec<Vec<UiEvent>>,
        routes: Vec<ScreenRoute>,
        frames: usize,
        cleaned_up: bool,
    }

    /// Renderer replaying scripted input batches
    struct ScriptedRenderer(Arc<Mutex<Recorded>>);

    impl ScreenRenderer for ScriptedRenderer {
        fn init(&mut self) -> Result<()> {
            Ok(())
        }

        fn cleanup(&mut self) -> Result<()> {
            self.0.lock().unwrap().cleaned_up = true;
            Ok(())
        }

        fn render(&mut self, _state: &ScreenState) -> Result<()> {
            self.0.lock().unwrap().frames += 1;
            Ok(())
        }

        fn poll_input(&mut self) -> Result<Vec<UiEvent>> {
            let mut recorded = self.0.lock().unwrap();
            if recorded.inputs.is_empty() {
                Ok(Vec::new())
            } else {
                Ok(recorded.inputs.remove(0))
            }
        }

        fn show_route(&mut self, route: &ScreenRoute) -> Result<()> {
            self.0.lock().unwrap().routes.push(route.clone());
            Ok(())
        }
    }

    struct Setup {
        app: Application,
        bus: NotificationBus,
        controller: Arc<RecordingController>,
    }

    fn setup() -> Setup {
        let library = Arc::new(MemoryLibrary::with_books(vec![book(1, 3)]));
        let controller = Arc::new(RecordingController::new());
        let bus = NotificationBus::new();
        let services = ScreenServices {
            repository: library.clone(),
            bookmarks: library,
            controller: controller.clone(),
            preferences: Arc::new(FixedPreferences {
                sleep_timer_minutes: 20,
                bookmark_on_sleep_timer: false,
            }),
            bus: bus.clone(),
            clock: Arc::new(ManualClock::at(0)),
        };

        let screen = match PlaybackScreen::open(BookId(1), services) {
            ScreenEntry::Ready(screen) => *screen,
            ScreenEntry::Redirect(route) => panic!("unexpected redirect to {:?}", route),
        };

        Setup {
            app: Application::new(screen),
            bus,
            controller,
        }
    }

    // ── Tests ─────────────────────────────────────────────────────────────────

    #[test]
    fn notifications_from_other_threads_are_applied_on_the_loop() {
        let mut s = setup();
        s.app.init().unwrap();

        s.controller.set_playing(true);
        let bus = s.bus.clone();
        let mut moved = book(1, 3);
        moved.current_chapter = 2;
        std::thread::spawn(move || {
            bus.publish(BusEvent::BookContentChanged { book: moved });
            bus.publish(BusEvent::PlayStateChanged);
        })
        .join()
        .unwrap();

        // Nothing changes until the loop drains its queue
        assert_eq!(s.app.screen().state().selected_chapter, Some(0));

        s.app.run_once().unwrap();
        assert_eq!(s.app.screen().state().selected_chapter, Some(2));
        assert_eq!(s.app.screen().state().play_icon, PlayState::Playing);
    }

    #[test]
    fn input_is_routed_to_the_screen() {
        let mut s = setup();
        s.app.init().unwrap();

        s.app
            .event_sender()
            .send(ScreenEvent::Ui(UiEvent::ChapterSelected { index: 1 }))
            .unwrap();
        s.app.run_once().unwrap();

        assert_eq!(
            s.controller.commands(),
            vec![Command::SeekTo(0, "/books/1.mp3".into())]
        );
    }

    #[test]
    fn close_request_ends_the_loop() {
        let recorded = Arc::new(Mutex::new(Recorded {
            inputs: vec![vec![UiEvent::PlayPauseRequested], vec![UiEvent::CloseRequested]],
            ..Recorded::default()
        }));
        let mut s = setup();
        s.app = s.app.with_ui_renderer(Box::new(ScriptedRenderer(recorded.clone())));

        s.app.init().unwrap();
        s.app.run().unwrap();
        s.app.cleanup().unwrap();

        let recorded = recorded.lock().unwrap();
        assert_eq!(recorded.routes, vec![ScreenRoute::Back]);
        assert!(recorded.frames >= 1);
        assert!(recorded.cleaned_up);
        assert_eq!(s.app.last_route(), Some(&ScreenRoute::Back));
        assert_eq!(s.controller.commands(), vec![Command::PlayPause]);
        assert!(!s.app.screen().is_subscribed());
    }

    #[test]
    fn dialogs_do_not_end_the_loop() {
        let recorded = Arc::new(Mutex::new(Recorded {
            inputs: vec![vec![UiEvent::BookmarksRequested, UiEvent::CloseRequested]],
            ..Recorded::default()
        }));
        let mut s = setup();
        s.app = s.app.with_ui_renderer(Box::new(ScriptedRenderer(recorded.clone())));

        s.app.init().unwrap();
        s.app.run().unwrap();

        assert_eq!(
            recorded.lock().unwrap().routes,
            vec![ScreenRoute::Bookmarks { book_id: BookId(1) }, ScreenRoute::Back]
        );
    }
}
