//! Job data model — the JSON shapes served by the panel plus the display
//! derivations the panel applies when rendering them.
//!
//! The panel serializes datetimes with `str()`, so every timestamp arrives
//! as a plain string (`2023-08-28 10:30:00.123456+05:30`, sometimes naive).
//! Parsing is tolerant of the observed variants and nothing else.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Full job detail from `GET <panel>/json/<id>`.
#[derive(Debug, Clone, Deserialize)]
pub struct JobDetail {
    pub jobid: i64,
    pub func: String,
    #[serde(default)]
    pub signature: String,
    #[serde(default)]
    pub src: String,
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub every: Option<Every>,
    #[serde(default)]
    pub at: Option<At>,
    #[serde(default)]
    pub tzname: Option<String>,
    #[serde(default)]
    pub is_running: bool,
    #[serde(default)]
    pub is_disabled: bool,
    #[serde(default)]
    pub next_run: Option<String>,
    #[serde(default)]
    pub logs: JobLogs,
}

/// Captured run output and timing from the job's last execution.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobLogs {
    #[serde(default)]
    pub log: String,
    #[serde(default)]
    pub err: String,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

/// Interval component of a schedule: a repeat period in seconds or a
/// calendar unit name (`day`, `monday`, ...).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Every {
    Seconds(u64),
    Unit(String),
}

/// Time-of-day component of a schedule: one `HH:MM` string or several.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum At {
    One(String),
    Many(Vec<String>),
}

/// Panel-wide summary from `GET <panel>/json/summary`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PanelSummary {
    pub name: String,
    pub summary: SummaryCounts,
    #[serde(default)]
    pub details: Vec<SummaryDetail>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SummaryCounts {
    pub count: u64,
    pub running: u64,
    pub errors: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SummaryDetail {
    pub id: i64,
    pub state: String,
    #[serde(default)]
    pub signature: String,
    #[serde(default)]
    pub prev_run: Option<String>,
    #[serde(default)]
    pub next_run: Option<String>,
}

// ---------------------------------------------------------------------------
// State classification
// ---------------------------------------------------------------------------

/// Display state of a job, derived the same way the panel derives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Ready,
    Running,
    Error,
    Success,
    Disabled,
}

impl JobState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ready => "READY",
            Self::Running => "RUNNING",
            Self::Error => "ERROR",
            Self::Success => "SUCCESS",
            Self::Disabled => "DISABLED",
        }
    }
}

/// Classified state plus its hover detail (the last traceback line for
/// errored jobs).
#[derive(Debug, Clone, PartialEq)]
pub struct StateInfo {
    pub state: JobState,
    pub detail: Option<String>,
}

/// Classify a job for display. Disabled wins outright; otherwise running,
/// then errored (non-empty traceback), then succeeded (finished with
/// output), then ready.
pub fn classify(job: &JobDetail) -> StateInfo {
    if job.is_disabled {
        return StateInfo {
            state: JobState::Disabled,
            detail: None,
        };
    }
    if job.is_running {
        return StateInfo {
            state: JobState::Running,
            detail: None,
        };
    }
    let err = job.logs.err.trim();
    if !err.is_empty() {
        return StateInfo {
            state: JobState::Error,
            detail: err.lines().last().map(str::to_string),
        };
    }
    if job.logs.end.is_some() && !job.logs.log.trim().is_empty() {
        return StateInfo {
            state: JobState::Success,
            detail: None,
        };
    }
    StateInfo {
        state: JobState::Ready,
        detail: None,
    }
}

// ---------------------------------------------------------------------------
// Display derivations
// ---------------------------------------------------------------------------

/// Human duration of the last run, if it both started and ended.
///
/// `M:SS minutes` at a minute or more, otherwise `1 second` / `N seconds`.
pub fn run_duration(logs: &JobLogs) -> Option<String> {
    let start = parse_panel_datetime(logs.start.as_deref()?)?;
    let end = parse_panel_datetime(logs.end.as_deref()?)?;
    let seconds = (end - start).num_seconds().max(0);

    Some(if seconds >= 60 {
        format!("{}:{:02} minutes", seconds / 60, seconds % 60)
    } else if seconds == 1 {
        "1 second".to_string()
    } else {
        format!("{seconds} seconds")
    })
}

/// One-line schedule description, mirroring the panel's rendering:
/// `every 30 seconds`, `on 2023-12-25 at 09:00`, `on-demand`,
/// `every monday at 09:00, 12:00`, with long time lists elided after three
/// entries.
///
/// The timezone suffix renders the full zone name (`[America/New_York]`)
/// rather than the panel's current abbreviation (`[EST]`): resolving the
/// abbreviation needs a tz database lookup, and the full name is
/// unambiguous where abbreviations are not.
pub fn schedule_description(job: &JobDetail) -> String {
    let tz_suffix = job
        .tzname
        .as_deref()
        .map(|tz| format!(" [{tz}]"))
        .unwrap_or_default();

    if let Some(Every::Seconds(n)) = &job.every {
        return format!("every {n} seconds{tz_suffix}");
    }

    let every = match &job.every {
        Some(Every::Unit(u)) => u.as_str(),
        _ => "",
    };

    match job.kind.as_str() {
        "OneTimeJob" => {
            let at = match &job.at {
                Some(At::One(t)) => t.as_str(),
                _ => "",
            };
            format!("on {every} at {at}{tz_suffix}")
        }
        "NeverJob" => "on-demand".to_string(),
        _ => match &job.at {
            Some(At::Many(times)) if times.len() >= 5 => {
                // First three, then the last — the middle is elided.
                let head = times[..3].join(", ");
                let last = times.last().map(String::as_str).unwrap_or_default();
                format!("every {every} at {head}, ...{last}{tz_suffix}")
            }
            Some(At::Many(times)) => {
                format!("every {every} at {}{tz_suffix}", times.join(", "))
            }
            Some(At::One(t)) => format!("every {every} at {t}{tz_suffix}"),
            None => format!("every {every}{tz_suffix}"),
        },
    }
}

/// Parse a panel-serialized datetime string.
///
/// Accepts fractional seconds and UTC offsets in any combination; naive
/// values are taken as UTC.
pub fn parse_panel_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%:z"];
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::<FixedOffset>::parse_from_str(raw, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(Utc.from_utc_datetime(&dt));
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
