//! Page context extraction.
//!
//! The panel server renders its pages with a small block of script globals
//! (`let COUNT_DOWN = 30;`, `let NEXT_RUN = 1693229400.0;`, ...) and, on the
//! control panel, a grid of `monitor-block` divs. The markup is
//! machine-generated and regular, so the values are pulled out with regexes
//! rather than a full HTML parser.
//!
//! Extraction happens exactly once per page load; the resulting
//! [`TaskContext`] / [`DashboardContext`] values are immutable thereafter.

use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;

// ---------------------------------------------------------------------------
// Compiled regexes (compiled once, reused)
// ---------------------------------------------------------------------------

static COUNT_DOWN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"let\s+COUNT_DOWN\s*=\s*(\d+)").expect("COUNT_DOWN regex must compile")
});

static RUNNING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"let\s+RUNNING\s*=\s*(\d+)").expect("RUNNING regex must compile")
});

/// `NEXT_RUN` is either a bare number (Unix seconds, int or float) or a
/// double-quoted display string such as `"Never"` or `"Disabled"`.
static NEXT_RUN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"let\s+NEXT_RUN\s*=\s*(?:"([^"]*)"|([0-9]+(?:\.[0-9]+)?))"#)
        .expect("NEXT_RUN regex must compile")
});

static ERR_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"let\s+ERR_LINE\s*=\s*(-?\d+)").expect("ERR_LINE regex must compile")
});

static TASKPAGE_REFRESH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"let\s+TASKPAGE_REFRESH\s*=\s*(\d+)").expect("TASKPAGE_REFRESH regex must compile")
});

static API_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"let\s+API_TOKEN\s*=\s*'([^']*)'").expect("API_TOKEN regex must compile")
});

/// A monitor block div. Attributes come first, `class` is rendered last, all
/// single-quoted.
static MONITOR_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<div\s+([^>]*?)class='([^']*\bmonitor-block\b[^']*)'[^>]*>")
        .expect("monitor block regex must compile")
});

static DATA_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"data-url='([^']*)'").expect("data-url regex must compile")
});

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"title='([^']*)'").expect("title regex must compile"));

// ---------------------------------------------------------------------------
// Context types
// ---------------------------------------------------------------------------

/// The job's next scheduled run, as injected into the task page.
#[derive(Debug, Clone, PartialEq)]
pub enum NextRun {
    /// Unix timestamp (seconds, possibly fractional).
    At(f64),
    /// Pre-formatted display text when no schedule exists (`Never`,
    /// `Disabled`). Rendered verbatim.
    Text(String),
}

/// Script globals injected into a task detail page. Read once at load;
/// never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskContext {
    pub running: bool,
    pub next_run: NextRun,
    /// Zero-based line index of the source line implicated by the last
    /// traceback; -1 means none.
    pub err_line: i64,
    /// Reload interval (seconds) while the job is running.
    pub refresh_secs: u64,
    /// Per-process token guarding the rerun/enable-disable endpoints.
    pub api_token: String,
}

/// Script globals injected into the control panel page.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardContext {
    /// Auto-refresh countdown start value (seconds).
    pub count_down: u32,
}

/// One `monitor-block` div on the control panel: a monitored application's
/// summary card.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorBlock {
    /// Display title. For reachable monitors this is the application name
    /// (first line of the block's `title` attribute); for unreachable ones
    /// it is the error message.
    pub title: String,
    /// Navigation target from `data-url`, absent on error blocks.
    pub url: Option<String>,
    /// `no-page` flag: block opted out of navigation.
    pub no_page: bool,
    /// `error-border` flag: the monitor is unreachable or has failing jobs.
    pub error: bool,
}

impl MonitorBlock {
    /// Whether a click on this block navigates anywhere. Mirrors the panel's
    /// `.monitor-block:not(.no-page)` selector.
    pub fn navigable(&self) -> bool {
        !self.no_page && self.url.is_some()
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Extract the task page context from served HTML.
///
/// All five globals must be present — the page is assumed server-rendered
/// consistently, so a missing value is a hard error, not a default.
pub fn extract_task_context(html: &str) -> Result<TaskContext> {
    let running = capture_u64(&RUNNING_RE, html).context("RUNNING missing from task page")? != 0;

    let caps = NEXT_RUN_RE
        .captures(html)
        .context("NEXT_RUN missing from task page")?;
    let next_run = if let Some(text) = caps.get(1) {
        NextRun::Text(text.as_str().to_string())
    } else {
        let raw = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        NextRun::At(raw.parse::<f64>().context("NEXT_RUN is not a number")?)
    };

    let err_line = ERR_LINE_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .context("ERR_LINE missing from task page")?
        .as_str()
        .parse::<i64>()
        .context("ERR_LINE is not an integer")?;

    let refresh_secs =
        capture_u64(&TASKPAGE_REFRESH_RE, html).context("TASKPAGE_REFRESH missing from task page")?;

    let api_token = API_TOKEN_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .context("API_TOKEN missing from task page")?
        .as_str()
        .to_string();

    Ok(TaskContext {
        running,
        next_run,
        err_line,
        refresh_secs,
        api_token,
    })
}

/// Extract the control panel context (the refresh countdown start).
pub fn extract_dashboard_context(html: &str) -> Result<DashboardContext> {
    let count_down =
        capture_u64(&COUNT_DOWN_RE, html).context("COUNT_DOWN missing from control panel page")?;
    Ok(DashboardContext {
        count_down: count_down as u32,
    })
}

/// Extract all monitor blocks from the control panel page, in document order.
///
/// Reachable monitors render `title='<name>\n<url>'` plus a `data-url`;
/// unreachable ones carry the error message as their title and the
/// `no-page` class.
pub fn extract_monitor_blocks(html: &str) -> Vec<MonitorBlock> {
    MONITOR_BLOCK_RE
        .captures_iter(html)
        .map(|caps| {
            let attrs = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            let classes = caps.get(2).map(|m| m.as_str()).unwrap_or_default();

            let url = DATA_URL_RE
                .captures(attrs)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string());
            let title = TITLE_RE
                .captures(attrs)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().lines().next().unwrap_or_default().to_string())
                .unwrap_or_default();

            MonitorBlock {
                title,
                url,
                no_page: has_class(classes, "no-page"),
                error: has_class(classes, "error-border"),
            }
        })
        .collect()
}

fn capture_u64(re: &Regex, html: &str) -> Option<u64> {
    re.captures(html)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn has_class(classes: &str, wanted: &str) -> bool {
    classes.split_whitespace().any(|c| c == wanted)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
