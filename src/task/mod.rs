//! Task page controller — the single-job watch behavior.
//!
//! On each load exactly one refresh plan is chosen from the page context;
//! the three states are mutually exclusive and the plan enum makes two live
//! timers unrepresentable:
//!
//! - [`RefreshPlan::Poll`] — the job is running: one delayed reload after
//!   the task page refresh interval (one-shot; the reload re-evaluates).
//! - [`RefreshPlan::Static`] — no numeric next run: the injected text
//!   (`Never`, `Disabled`) is displayed verbatim, no timer.
//! - [`RefreshPlan::Countdown`] — count down to the next scheduled run,
//!   recomputing remaining time against wall clock on every tick so the
//!   display survives suspension drift.
//!
//! Also owns the error-line highlight request derived from `ERR_LINE`.

use std::time::Duration;

use crate::clock::{Clock, format_countdown};
use crate::context::{NextRun, TaskContext};

/// Delay before the reload once a countdown reaches zero. Keeps a fleet of
/// clients that hit the same schedule boundary from reloading in lockstep
/// storms.
pub const RELOAD_DAMPING: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// Refresh plan
// ---------------------------------------------------------------------------

/// The refresh behavior for one task page load.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshPlan {
    /// Job is running: reload once after `delay`.
    Poll { delay: Duration },
    /// Next run is a pre-formatted string: display it and stop.
    Static { text: String },
    /// Next run is scheduled: countdown target in Unix milliseconds.
    Countdown { next_run_ms: i64 },
}

impl RefreshPlan {
    /// Choose the plan. Called exactly once per load; `running` wins over a
    /// numeric next-run timestamp.
    pub fn from_context(ctx: &TaskContext) -> Self {
        if ctx.running {
            return Self::Poll {
                delay: Duration::from_secs(ctx.refresh_secs),
            };
        }
        match &ctx.next_run {
            NextRun::Text(text) => Self::Static { text: text.clone() },
            NextRun::At(secs) => Self::Countdown {
                next_run_ms: (secs * 1000.0) as i64,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Countdown ticks
// ---------------------------------------------------------------------------

/// Directive produced by one countdown evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum CountdownStep {
    /// Render the remaining time as `HH:MM:SS`.
    Render(String),
    /// Deadline reached: stop ticking, reload after the given delay.
    ReloadAfter(Duration),
}

/// Evaluate the countdown against the current wall clock.
///
/// Remaining time is recomputed from `now_ms` rather than decremented, so a
/// suspended client renders the true remaining time on its next tick.
pub fn countdown_step(next_run_ms: i64, now_ms: i64) -> CountdownStep {
    let remaining_ms = next_run_ms - now_ms;
    if remaining_ms <= 0 {
        CountdownStep::ReloadAfter(RELOAD_DAMPING)
    } else {
        CountdownStep::Render(format_countdown((remaining_ms / 1000) as u64))
    }
}

/// Drive the countdown to completion: render once immediately, then tick at
/// one-second granularity. Returns the reload delay once the deadline
/// passes — the tick loop has already stopped when the caller sleeps it off,
/// so the countdown timer and the pending reload are never alive together.
pub fn run_countdown<C: Clock>(
    clock: &C,
    next_run_ms: i64,
    mut render: impl FnMut(&str),
) -> Duration {
    loop {
        match countdown_step(next_run_ms, clock.now_ms()) {
            CountdownStep::Render(text) => render(&text),
            CountdownStep::ReloadAfter(delay) => return delay,
        }
        clock.sleep(Duration::from_secs(1));
    }
}

// ---------------------------------------------------------------------------
// Error line highlight
// ---------------------------------------------------------------------------

/// A single-range line highlight request against the source renderer,
/// marking the line implicated by the job's last traceback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineHighlight {
    pub start: i64,
    pub end: i64,
}

/// Build highlight requests from the injected `ERR_LINE`. Negative means
/// no line is flagged; otherwise exactly one request with
/// `start == end == err_line`.
pub fn highlight_requests(err_line: i64) -> Vec<LineHighlight> {
    if err_line >= 0 {
        vec![LineHighlight {
            start: err_line,
            end: err_line,
        }]
    } else {
        Vec::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
