// src/report/tracker.rs
//! Time since the last block found by the pool
//!
//! The timer starts when the bot starts and is reset by any message in the
//! block notification channel. Message handlers run as separate tasks, so
//! the timestamp sits behind a mutex; the last reset wins.

use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

use crate::report::format;

/// Shared "last block" timestamp
#[derive(Debug)]
pub struct BlockTimer {
    state: Mutex<TimerState>,
}

#[derive(Debug, Clone, Copy)]
struct TimerState {
    last_block: Instant,
    reset_seen: bool,
}

impl BlockTimer {
    /// Creates a timer starting now
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Creates a timer starting at `start`
    pub fn starting_at(start: Instant) -> Self {
        BlockTimer {
            state: Mutex::new(TimerState {
                last_block: start,
                reset_seen: false,
            }),
        }
    }

    /// Records a block found now
    pub fn reset(&self) {
        self.reset_at(Instant::now());
    }

    /// Records a block found at `at`
    pub fn reset_at(&self, at: Instant) {
        let mut state = self.lock();
        state.last_block = at;
        state.reset_seen = true;
    }

    /// Time elapsed since the last block, measured now
    pub fn elapsed(&self) -> Duration {
        self.elapsed_at(Instant::now())
    }

    /// Time elapsed since the last block, measured at `now`
    ///
    /// Saturates to zero if `now` precedes the recorded block.
    pub fn elapsed_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.lock().last_block)
    }

    /// `HH:MM:SS` since the last block
    pub fn time_since(&self) -> String {
        format::elapsed(self.elapsed())
    }

    /// False until the first reset arrives
    pub fn has_reset(&self) -> bool {
        self.lock().reset_seen
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TimerState> {
        // The state is plain data, so a poisoned lock still holds a valid value.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for BlockTimer {
    fn default() -> Self {
        Self::new()
    }
}
