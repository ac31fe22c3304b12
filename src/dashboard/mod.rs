//! Dashboard refresher — the control panel watch behavior.
//!
//! The control panel page carries a refresh countdown (`COUNT_DOWN` seconds)
//! and a grid of monitor blocks. This module owns the countdown state
//! machine and the navigation binding: every block not flagged `no-page`
//! becomes a navigation target.
//!
//! The countdown is a plain local decrement at one-second granularity (the
//! task page countdown, by contrast, recomputes from wall clock — see
//! [`crate::task`]).

use std::time::Duration;

use crate::clock::Clock;
use crate::context::MonitorBlock;

// ---------------------------------------------------------------------------
// Countdown state machine
// ---------------------------------------------------------------------------

/// Directive produced by one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTick {
    /// Show the remaining seconds.
    Display(u32),
    /// Countdown expired: stop ticking and reload the page.
    Reload,
}

/// Decrementing auto-refresh countdown. One instance per page load; the
/// caller stops ticking after the first [`RefreshTick::Reload`].
#[derive(Debug)]
pub struct RefreshCountdown {
    remaining: u32,
}

impl RefreshCountdown {
    pub fn new(count_down: u32) -> Self {
        Self {
            remaining: count_down,
        }
    }

    /// Advance by one second. Decrements while time remains, then yields
    /// exactly one `Reload`. The displayed value is never negative.
    pub fn tick(&mut self) -> RefreshTick {
        if self.remaining > 0 {
            self.remaining -= 1;
            RefreshTick::Display(self.remaining)
        } else {
            RefreshTick::Reload
        }
    }
}

/// Drive a full countdown against a real (or simulated) clock, invoking
/// `display` with each remaining value. Returns when the page is due for a
/// reload; the timer is already stopped at that point.
pub fn run_refresh_countdown<C: Clock>(clock: &C, count_down: u32, mut display: impl FnMut(u32)) {
    let mut countdown = RefreshCountdown::new(count_down);
    loop {
        clock.sleep(Duration::from_secs(1));
        match countdown.tick() {
            RefreshTick::Display(remaining) => display(remaining),
            RefreshTick::Reload => return,
        }
    }
}

// ---------------------------------------------------------------------------
// Navigation binding
// ---------------------------------------------------------------------------

/// Bind navigation targets: every monitor block that is not flagged
/// `no-page` and carries a URL. Mirrors the panel's
/// `.monitor-block:not(.no-page)` click binding, preserving document order.
pub fn navigation_targets(blocks: &[MonitorBlock]) -> Vec<&MonitorBlock> {
    blocks.iter().filter(|b| b.navigable()).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
