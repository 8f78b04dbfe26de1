use std::time::{Duration, Instant};

/// the timers count down at 60Hz no matter how fast instructions run
pub const TIMER_PERIOD: Duration = Duration::from_nanos(1_000_000_000 / 60);

/// Delay and sound timers. Decay is driven by the wall clock: whoever calls
/// `update` passes in "now" and, if a full period has gone by since the last
/// decay, both timers drop by one (never below zero).
#[derive(Debug)]
pub struct Timers {
    pub delay: u8,
    pub sound: u8,
    last_update: Instant,
}

impl Timers {
    pub fn new(now: Instant) -> Self {
        Timers {
            delay: 0,
            sound: 0,
            last_update: now,
        }
    }

    /// decay both timers if a period has elapsed; returns whether it did
    pub fn update(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last_update) < TIMER_PERIOD {
            return false;
        }
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
        self.last_update = now;
        true
    }
}
