use crate::core::bus::NotificationBus;
use crate::core::events::BusEvent;
use crate::core::models::Book;
use crate::core::traits::{BookRepository, Clock, PlaybackController, Preferences};
use crossbeam_channel::{bounded, select, Sender};
use log::{debug, info, warn};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const MS_PER_MINUTE: u64 = 60_000;

/// Position is written back to the repository at least this often while playing
const PERSIST_INTERVAL_MS: u64 = 5_000;

pub const MIN_SPEED: f32 = 0.5;
pub const MAX_SPEED: f32 = 2.0;

/// Settings of the local controller that come from the player config
#[derive(Debug, Clone, Copy)]
pub struct ControllerSettings {
    pub seek_step_ms: u64,
    pub speed_adjustable: bool,
}

#[derive(Debug)]
struct EngineState {
    book: Book,
    playing: bool,
    speed: f32,
    sleep_started_at: Option<u64>,
    last_tick_ms: u64,
    last_persist_ms: u64,
}

/// Playback controller for one book.
///
/// Models the engine closely enough to drive the play screen: position
/// bookkeeping, chapter navigation, speed and the sleep timer. Audio output
/// is not produced here. Every change is published on the notification bus
/// once the internal lock is released.
pub struct LocalController {
    state: Mutex<EngineState>,
    repository: Arc<dyn BookRepository>,
    preferences: Arc<dyn Preferences>,
    clock: Arc<dyn Clock>,
    bus: NotificationBus,
    settings: ControllerSettings,
}

impl LocalController {
    pub fn new(
        book: Book,
        repository: Arc<dyn BookRepository>,
        preferences: Arc<dyn Preferences>,
        clock: Arc<dyn Clock>,
        bus: NotificationBus,
        settings: ControllerSettings,
    ) -> Self {
        let now = clock.now_ms();
        Self {
            state: Mutex::new(EngineState {
                book,
                playing: false,
                speed: 1.0,
                sleep_started_at: None,
                last_tick_ms: now,
                last_persist_ms: now,
            }),
            repository,
            preferences,
            clock,
            bus,
            settings,
        }
    }

    /// Advance the position by the wall time since the previous tick, move
    /// across chapter boundaries and fire the sleep timer.
    pub fn tick(&self) {
        let now = self.clock.now_ms();
        let mut events = Vec::new();

        let mut state = self.lock();
        let elapsed = now.saturating_sub(state.last_tick_ms);
        state.last_tick_ms = now;

        if state.playing && elapsed > 0 {
            let advanced = (elapsed as f64 * f64::from(state.speed)) as u64;
            self.advance(&mut state, advanced, &mut events);
        }

        if let Some(started_at) = state.sleep_started_at {
            let duration = u64::from(self.preferences.sleep_timer_minutes()) * MS_PER_MINUTE;
            if now.saturating_sub(started_at) >= duration {
                info!("Sleep timer expired, pausing");
                state.sleep_started_at = None;
                events.push(BusEvent::SleepStateChanged);
                if state.playing {
                    state.playing = false;
                    events.push(BusEvent::PlayStateChanged);
                }
                self.persist(&mut state, now);
            }
        }

        if state.playing && now.saturating_sub(state.last_persist_ms) >= PERSIST_INTERVAL_MS {
            self.persist(&mut state, now);
        }

        // Still locked: a command cannot publish between this snapshot and its delivery
        self.publish(events);
        drop(state);
    }

    /// Account for the time since the last tick and write the position back
    pub fn save_position(&self) {
        self.tick();
        let now = self.clock.now_ms();
        self.persist(&mut self.lock(), now);
    }

    /// Run [`tick`](Self::tick) on a background thread until the handle is dropped
    pub fn spawn_engine(self: &Arc<Self>, interval: Duration) -> EngineHandle {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let controller = Arc::clone(self);

        let join = thread::spawn(move || {
            loop {
                select! {
                    recv(stop_rx) -> _ => break,
                    default(interval) => controller.tick(),
                }
            }
            controller.save_position();
            debug!("engine: ticker stopped");
        });

        EngineHandle {
            stop_tx,
            join: Some(join),
        }
    }

    fn advance(&self, state: &mut EngineState, mut amount_ms: u64, events: &mut Vec<BusEvent>) {
        loop {
            let index = state.book.current_chapter;
            let Some(duration) = state.book.chapters.get(index).map(|c| c.duration_ms) else {
                return;
            };

            let target = state.book.position_ms + amount_ms;
            if target < duration {
                state.book.position_ms = target;
                break;
            }

            if index + 1 < state.book.chapters.len() {
                amount_ms = target - duration;
                state.book.current_chapter = index + 1;
                state.book.position_ms = 0;
                debug!("engine: moved on to chapter {}", index + 1);
            } else {
                info!("Reached the end of {}", state.book.name);
                state.book.position_ms = duration;
                state.playing = false;
                events.push(BusEvent::PlayStateChanged);
                break;
            }
        }

        events.push(BusEvent::BookContentChanged {
            book: state.book.clone(),
        });
    }

    /// Apply a position change made by a command, persist it and publish it
    fn reposition(&self, change: impl FnOnce(&mut Book)) {
        let now = self.clock.now_ms();
        let mut state = self.lock();
        change(&mut state.book);

        let duration = state.book.current_chapter().map(|c| c.duration_ms).unwrap_or(0);
        state.book.position_ms = state.book.position_ms.min(duration);
        state.last_tick_ms = now;
        self.persist(&mut state, now);

        self.publish(vec![BusEvent::BookContentChanged {
            book: state.book.clone(),
        }]);
    }

    fn persist(&self, state: &mut EngineState, now: u64) {
        state.last_persist_ms = now;
        if let Err(e) = self.repository.save_book(&state.book) {
            warn!("Could not save position of {}: {:#}", state.book.name, e);
        }
    }

    fn publish(&self, events: Vec<BusEvent>) {
        for event in events {
            self.bus.publish(event);
        }
    }

    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PlaybackController for LocalController {
    fn seek_to(&self, position_ms: u64, chapter_path: &Path) {
        let index = self
            .lock()
            .book
            .chapters
            .iter()
            .position(|c| c.path == chapter_path);

        match index {
            Some(index) => self.reposition(|book| {
                book.current_chapter = index;
                book.position_ms = position_ms;
            }),
            None => warn!("No chapter at {}", chapter_path.display()),
        }
    }

    fn play_pause(&self) {
        let now = self.clock.now_ms();
        {
            let mut state = self.lock();
            state.playing = !state.playing;
            state.last_tick_ms = now;
            if !state.playing {
                self.persist(&mut state, now);
            }
            debug!("engine: playing={}", state.playing);
            self.bus.publish(BusEvent::PlayStateChanged);
        }
    }

    fn rewind(&self) {
        let step = self.settings.seek_step_ms;
        self.reposition(|book| book.position_ms = book.position_ms.saturating_sub(step));
    }

    fn fast_forward(&self) {
        let step = self.settings.seek_step_ms;
        self.reposition(|book| {
            let duration = book.current_chapter().map(|c| c.duration_ms).unwrap_or(0);
            let target = book.position_ms.saturating_add(step);
            if target >= duration && book.current_chapter + 1 < book.chapters.len() {
                book.current_chapter += 1;
                book.position_ms = target - duration;
            } else {
                book.position_ms = target;
            }
        });
    }

    fn next(&self) {
        self.reposition(|book| {
            if book.current_chapter + 1 < book.chapters.len() {
                book.current_chapter += 1;
                book.position_ms = 0;
            }
        });
    }

    fn previous(&self) {
        self.reposition(|book| {
            // A chapter already underway restarts first
            if book.position_ms < 2_000 && book.current_chapter > 0 {
                book.current_chapter -= 1;
            }
            book.position_ms = 0;
        });
    }

    fn toggle_sleep_timer(&self) {
        let now = self.clock.now_ms();
        {
            let mut state = self.lock();
            state.sleep_started_at = match state.sleep_started_at {
                Some(_) => None,
                None => Some(now),
            };
            info!("Sleep timer {}", if state.sleep_started_at.is_some() { "armed" } else { "disarmed" });
            self.bus.publish(BusEvent::SleepStateChanged);
        }
    }

    fn set_playback_speed(&self, speed: f32) {
        if !self.settings.speed_adjustable {
            return;
        }
        self.lock().speed = speed.clamp(MIN_SPEED, MAX_SPEED);
    }

    fn is_playing(&self) -> bool {
        self.lock().playing
    }

    fn is_sleep_timer_active(&self) -> bool {
        self.lock().sleep_started_at.is_some()
    }

    fn sleep_timer_started_at_ms(&self) -> u64 {
        self.lock().sleep_started_at.unwrap_or(0)
    }

    fn can_adjust_speed(&self) -> bool {
        self.settings.speed_adjustable
    }
}

#[cfg(test)]
impl LocalController {
    pub fn book(&self) -> Book {
        self.lock().book.clone()
    }

    pub fn speed(&self) -> f32 {
        self.lock().speed
    }
}

/// Stops the engine ticker thread when dropped. The position is saved on
/// the way out.
pub struct EngineHandle {
    stop_tx: Sender<()>,
    join: Option<JoinHandle<()>>,
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(());
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}
