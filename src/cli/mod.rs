//! CLI command implementations.
//!
//! - `jobwatch watch` — follow the control panel with its auto-refresh
//!   countdown
//! - `jobwatch task N` — follow one job page (poll / countdown / static)
//! - `jobwatch rerun N`, `enable N`, `disable N` — confirm-gated actions
//! - `jobwatch summary` — one-shot panel summary, table or JSON

use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::actions::{self, ActionKind, StdinPrompt};
use crate::clock::{Clock, SystemClock};
use crate::config::JobwatchConfig;
use crate::context;
use crate::dashboard;
use crate::panel::PanelClient;
use crate::task::{self, RefreshPlan};
use crate::view;

/// Output format for `summary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            _ => Self::Table,
        }
    }
}

/// One-time process setup from config (color toggle).
pub fn init(config: &JobwatchConfig) {
    if !config.display.color {
        colored::control::set_override(false);
    }
}

fn client_for(config: &JobwatchConfig, url_override: Option<&str>) -> PanelClient {
    let base = url_override.unwrap_or(&config.panel.url);
    PanelClient::new(base, Duration::from_millis(config.http.timeout_ms))
}

// ---------------------------------------------------------------------------
// jobwatch watch
// ---------------------------------------------------------------------------

/// Follow the control panel page: render its monitor blocks, run the
/// embedded refresh countdown, reload when it expires.
pub fn run_watch(config: &JobwatchConfig, url: Option<&str>) -> Result<()> {
    let client = client_for(config, None);
    let clock = SystemClock;
    let url = url.unwrap_or(&config.panel.dashboard_url);

    loop {
        let html = client
            .fetch_page(url)
            .with_context(|| format!("control panel {url} is unreachable"))?;
        let ctx = context::extract_dashboard_context(&html)?;
        let blocks = context::extract_monitor_blocks(&html);

        view::render_dashboard(&blocks);
        println!();

        dashboard::run_refresh_countdown(&clock, ctx.count_down, view::show_refresh_line);
        view::end_live_line();
        view::reload_marker();
    }
}

// ---------------------------------------------------------------------------
// jobwatch task
// ---------------------------------------------------------------------------

/// Follow one job's detail page until it settles into an unscheduled state.
pub fn run_task(config: &JobwatchConfig, jobid: i64, url: Option<&str>) -> Result<()> {
    let client = client_for(config, url);
    let clock = SystemClock;

    loop {
        let ctx = fetch_and_render(&client, config, jobid)?;

        match RefreshPlan::from_context(&ctx) {
            RefreshPlan::Poll { delay } => {
                println!(
                    "{}",
                    format!("running — refreshing in {}s", delay.as_secs()).yellow()
                );
                clock.sleep(delay);
            }
            RefreshPlan::Static { text } => {
                view::show_next_run_line(&text);
                view::end_live_line();
                return Ok(());
            }
            RefreshPlan::Countdown { next_run_ms } => {
                let delay = task::run_countdown(&clock, next_run_ms, view::show_next_run_line);
                view::end_live_line();
                clock.sleep(delay);
            }
        }
        view::reload_marker();
    }
}

/// Fetch page context + job detail and render one full view of the job.
fn fetch_and_render(
    client: &PanelClient,
    config: &JobwatchConfig,
    jobid: i64,
) -> Result<context::TaskContext> {
    let html = client
        .fetch_task_page(jobid)
        .with_context(|| format!("task page for job {jobid} is unreachable"))?;
    let ctx = context::extract_task_context(&html)
        .with_context(|| format!("task page for job {jobid} is missing its context"))?;
    let job = client.fetch_job(jobid)?;

    let highlights = task::highlight_requests(ctx.err_line);
    view::render_job(&job, &highlights, config.display.log_tail);
    Ok(ctx)
}

// ---------------------------------------------------------------------------
// jobwatch rerun / enable / disable
// ---------------------------------------------------------------------------

/// Run a confirm-gated action against a job, then reload its view on
/// success. All failures surface as alerts; nothing is retried.
pub fn run_action(
    config: &JobwatchConfig,
    kind: ActionKind,
    jobid: i64,
    url: Option<&str>,
) -> Result<()> {
    let client = client_for(config, url);

    let html = client
        .fetch_task_page(jobid)
        .with_context(|| format!("task page for job {jobid} is unreachable"))?;
    let ctx = context::extract_task_context(&html)
        .with_context(|| format!("task page for job {jobid} is missing its context"))?;
    let job = client.fetch_job(jobid)?;

    match actions::confirm_and_run(&client, kind, &job.func, jobid, &ctx.api_token, &StdinPrompt) {
        Ok(actions::ActionOutcome::Aborted) => {
            view::notice(kind.abort_notice());
        }
        Ok(actions::ActionOutcome::Completed) => {
            // State is only believed once the server re-serves it.
            view::reload_marker();
            fetch_and_render(&client, config, jobid)?;
        }
        Ok(actions::ActionOutcome::Failed(message)) => {
            view::alert(&message);
        }
        Err(e) => {
            view::alert(&format!("{e:#}"));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// jobwatch summary
// ---------------------------------------------------------------------------

/// One-shot panel summary.
pub fn run_summary(config: &JobwatchConfig, format: OutputFormat, url: Option<&str>) -> Result<()> {
    let client = client_for(config, url);
    let summary = client.fetch_summary()?;

    match format {
        OutputFormat::Table => view::render_summary(&summary),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }
    Ok(())
}
