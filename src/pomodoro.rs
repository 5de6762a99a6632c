//! # Pomodoro — Local Countdown Timer
//!
//! A 25-minute countdown driven by one `tick()` per second while running. The
//! timer is purely local state: nothing here touches the store or the API.
//!
//! On reaching zero the timer stops, reports a single [`Completed`] event and
//! rewinds to the full duration, ready for the next session.

use std::fmt;

/// Length of one focus session, in seconds.
pub const SESSION_SECS: u32 = 25 * 60;

/// Emitted once when a running session reaches zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Completed;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pomodoro {
    remaining: u32,
    running: bool,
}

impl Pomodoro {
    pub fn new() -> Self {
        Pomodoro {
            remaining: SESSION_SECS,
            running: false,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Pause if running, start or resume otherwise.
    pub fn toggle(&mut self) {
        self.running = !self.running;
    }

    /// Stop and rewind to the full session length.
    pub fn reset(&mut self) {
        self.remaining = SESSION_SECS;
        self.running = false;
    }

    /// Advance by one second. A paused timer ignores ticks.
    pub fn tick(&mut self) -> Option<Completed> {
        if !self.running {
            return None;
        }
        if self.remaining <= 1 {
            self.reset();
            return Some(Completed);
        }
        self.remaining -= 1;
        None
    }

    /// Fraction of the session still remaining, `0.0..=1.0`.
    pub fn fraction_left(&self) -> f64 {
        f64::from(self.remaining) / f64::from(SESSION_SECS)
    }

    /// Remaining time as `M:SS`.
    pub fn display(&self) -> String {
        format!("{}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}

impl Default for Pomodoro {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Pomodoro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}
