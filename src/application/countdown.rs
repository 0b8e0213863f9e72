use crossbeam_channel::{tick, Receiver};
use log::{debug, info};
use std::time::{Duration, Instant};

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// What a countdown tick means for the countdown label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    Remaining(u64),
    Finished,
}

/// The one sleep timer countdown a screen may run.
///
/// The countdown itself does not own a thread: [`ticker`](Self::ticker)
/// hands out a 1 s tick channel the screen loop selects on, and every tick
/// is turned into the remaining time with [`on_tick`](Self::on_tick).
/// Starting again replaces the previous ticker, so two countdowns never
/// overlap.
#[derive(Debug, Default)]
pub struct SleepCountdown {
    ticker: Option<Receiver<Instant>>,
    ends_at_ms: u64,
}

impl SleepCountdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting `remaining_ms` down from `now_ms`, cancelling any
    /// running countdown first.
    pub fn start(&mut self, remaining_ms: u64, now_ms: u64) {
        self.cancel();
        self.ends_at_ms = now_ms.saturating_add(remaining_ms);
        self.ticker = Some(tick(TICK_INTERVAL));
        debug!("countdown: started with {} ms left", remaining_ms);
    }

    /// Safe to call when nothing runs
    pub fn cancel(&mut self) {
        if self.ticker.take().is_some() {
            debug!("countdown: cancelled");
        }
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    /// Tick channel of the running countdown
    pub fn ticker(&self) -> Option<Receiver<Instant>> {
        self.ticker.clone()
    }

    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        self.ends_at_ms.saturating_sub(now_ms)
    }

    /// Advance the countdown. Returns `None` when no countdown is running.
    pub fn on_tick(&mut self, now_ms: u64) -> Option<CountdownTick> {
        if !self.is_running() {
            return None;
        }

        match self.remaining_ms(now_ms) {
            0 => {
                self.ticker = None;
                info!("Countdown timer finished");
                Some(CountdownTick::Finished)
            }
            remaining => Some(CountdownTick::Remaining(remaining)),
        }
    }
}
