//! Wall clock and countdown formatting.
//!
//! Timer-driven loops in this crate never call `std::thread::sleep` or
//! `Utc::now()` directly — they go through the [`Clock`] trait so tests can
//! drive them with simulated time instead of waiting on real clocks.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Time source + sleeper used by the watch loops.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
    fn sleep(&self, duration: Duration);

    /// Current wall-clock time in Unix milliseconds.
    fn now_ms(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// The real thing: `chrono::Utc` + `std::thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Format remaining whole seconds as `HH:MM:SS`.
///
/// Every field is zero-padded to at least two digits. Hours are unbounded —
/// a run 25 hours out renders as `25:00:00`, not wrapped at 24.
pub fn format_countdown(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
