//! Terminal rendering for the watch and action commands.
//!
//! The browser panel's display surface maps onto the terminal as follows:
//! in-place countdown lines stand in for the live display elements, a
//! re-render with a timestamp separator stands in for a page reload, log
//! panes render from their tail (the page scrolls them to the bottom), and
//! the error-line highlight becomes a red-background source line.

use std::io::Write;

use colored::Colorize;

use crate::context::MonitorBlock;
use crate::jobs::{self, JobDetail, JobState, PanelSummary, StateInfo};
use crate::task::LineHighlight;

// ---------------------------------------------------------------------------
// Notices and alerts
// ---------------------------------------------------------------------------

/// Dismissable notice (aborted confirmations and the like).
pub fn notice(message: &str) {
    println!("{}", message.yellow());
}

/// Blocking alert analogue: failures the operator must see.
pub fn alert(message: &str) {
    eprintln!("{}", message.red().bold());
}

/// Separator printed when a watched page reloads.
pub fn reload_marker() {
    println!(
        "{}",
        format!(
            "---- reloaded {} ----",
            chrono::Local::now().format("%H:%M:%S")
        )
        .dimmed()
    );
}

// ---------------------------------------------------------------------------
// Live lines (overwritten in place each tick)
// ---------------------------------------------------------------------------

/// Dashboard refresh countdown line.
pub fn show_refresh_line(remaining: u32) {
    print!("\rAuto-refresh in {} seconds   ", remaining);
    let _ = std::io::stdout().flush();
}

/// Task page "next run in" line. `text` is either a `HH:MM:SS` countdown or
/// the pre-formatted static string.
pub fn show_next_run_line(text: &str) {
    print!("\rNext run in: {}   ", text.bold());
    let _ = std::io::stdout().flush();
}

/// Terminate an in-place line before printing anything else.
pub fn end_live_line() {
    println!();
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// Render the control panel's monitor blocks. Navigable blocks are numbered
/// so the operator can jump to one with `jobwatch watch <url>` /
/// `jobwatch task`.
pub fn render_dashboard(blocks: &[MonitorBlock]) {
    println!("{}", "Control Panel".bold().cyan());
    println!("{}", "=".repeat(60));

    if blocks.is_empty() {
        println!("{}", "No monitors found.".dimmed());
        return;
    }

    let mut nav_index = 0usize;
    for block in blocks {
        if block.navigable() {
            nav_index += 1;
            let marker = if block.error { "!".red().bold() } else { "*".green() };
            println!(
                " {marker} [{nav_index}] {:<24} {}",
                block.title.bold(),
                block.url.as_deref().unwrap_or_default().underline()
            );
        } else {
            println!(
                " {} {:<28} {}",
                "x".red(),
                block.title,
                "(unreachable)".dimmed()
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Render the panel summary as a table.
pub fn render_summary(summary: &PanelSummary) {
    println!(
        "{} — {} tasks, {} running, {} errors",
        summary.name.bold().cyan(),
        summary.summary.count,
        summary.summary.running,
        if summary.summary.errors > 0 {
            summary.summary.errors.to_string().red().bold().to_string()
        } else {
            summary.summary.errors.to_string()
        }
    );
    println!();
    println!(
        "  {:>4} {:<10} {:<28} {:<20} {}",
        "Id", "State", "Signature", "Last Run", "Next Run"
    );
    println!("  {}", "-".repeat(78));

    for d in &summary.details {
        let state = paint_state_label(&d.state);
        println!(
            "  {:>4} {:<10} {:<28} {:<20} {}",
            d.id,
            state,
            truncate(&d.signature, 28),
            d.prev_run.as_deref().unwrap_or("-"),
            d.next_run.as_deref().unwrap_or("-"),
        );
    }
}

// ---------------------------------------------------------------------------
// Job detail
// ---------------------------------------------------------------------------

/// Render the job detail page: header, info table, source (with any
/// error-line highlight), and both log panes scrolled to their tail.
pub fn render_job(job: &JobDetail, highlights: &[LineHighlight], log_tail: usize) {
    let info = jobs::classify(job);

    println!("{}", job.func.bold().cyan());
    if !job.signature.is_empty() {
        println!("{}", job.signature.dimmed());
    }
    println!();

    println!("  {} {}", "Schedule:".bold(), jobs::schedule_description(job));
    println!("  {} {}", "State:   ".bold(), paint_state(&info));
    if let Some(detail) = &info.detail {
        println!("  {} {}", "         ".bold(), detail.red());
    }
    println!(
        "  {} {}",
        "Start:   ".bold(),
        job.logs.start.as_deref().unwrap_or("-")
    );
    println!(
        "  {} {}",
        "End:     ".bold(),
        job.logs.end.as_deref().unwrap_or("-")
    );
    if let Some(duration) = jobs::run_duration(&job.logs) {
        println!("  {} {}", "Took:    ".bold(), duration);
    }
    println!();

    if !job.src.is_empty() {
        println!("{}", "Source".bold());
        render_source(&job.src, highlights);
        println!();
    }

    render_log_pane("Logs", &job.logs.log, log_tail);
    render_log_pane("Traceback", &job.logs.err, log_tail);
}

/// Print source lines, marking any highlighted range with a red background
/// (the terminal analogue of the page's translucent warning overlay).
pub fn render_source(src: &str, highlights: &[LineHighlight]) {
    for (idx, line) in src.lines().enumerate() {
        let flagged = highlights
            .iter()
            .any(|h| (h.start..=h.end).contains(&(idx as i64)));
        if flagged {
            println!("  {:>3} {}", idx + 1, line.black().on_red());
        } else {
            println!("  {:>3} {}", (idx + 1).to_string().dimmed(), line);
        }
    }
}

/// Print the last `tail` lines of a log pane — the page scrolls each pane
/// to its maximum offset, so only the most recent lines are shown.
fn render_log_pane(title: &str, text: &str, tail: usize) {
    let trimmed = text.trim_end();
    if trimmed.is_empty() {
        return;
    }
    println!("{}", title.bold());
    let total = trimmed.lines().count();
    if total > tail {
        println!("  {}", format!("... {} earlier lines", total - tail).dimmed());
    }
    for line in tail_lines(trimmed, tail) {
        println!("  {line}");
    }
    println!();
}

/// Last `n` lines of `text`, in order.
pub fn tail_lines(text: &str, n: usize) -> Vec<&str> {
    let lines: Vec<&str> = text.lines().collect();
    let skip = lines.len().saturating_sub(n);
    lines[skip..].to_vec()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn paint_state(info: &StateInfo) -> String {
    let label = info.state.label();
    match info.state {
        JobState::Ready => label.normal(),
        JobState::Running => label.yellow().bold(),
        JobState::Error => label.red().bold(),
        JobState::Success => label.green(),
        JobState::Disabled => label.blue(),
    }
    .to_string()
}

fn paint_state_label(state: &str) -> String {
    match state {
        "RUNNING" => state.yellow().bold().to_string(),
        "ERROR" => state.red().bold().to_string(),
        "SUCCESS" => state.green().to_string(),
        "DISABLED" => state.blue().to_string(),
        _ => state.to_string(),
    }
}

/// Counts chars, not bytes: signatures may carry non-ASCII identifiers and a
/// byte-offset slice could land inside a multibyte char.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        s.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tail_keeps_last_lines_in_order() {
        let text = "a\nb\nc\nd";
        assert_eq!(tail_lines(text, 2), vec!["c", "d"]);
    }

    #[test]
    fn tail_shorter_than_limit_is_unchanged() {
        assert_eq!(tail_lines("a\nb", 10), vec!["a", "b"]);
    }

    #[test]
    fn truncate_respects_short_strings() {
        assert_eq!(truncate("short", 28), "short");
        assert_eq!(truncate("abcdefghij", 8), "abcde...");
    }

    #[test]
    fn truncate_cuts_multibyte_signatures_on_char_boundaries() {
        let signature = format!("{}{}", "a".repeat(24), "é".repeat(8));
        assert_eq!(
            truncate(&signature, 28),
            format!("{}{}...", "a".repeat(24), "é")
        );
        assert_eq!(truncate("日本語のジョブ名", 28), "日本語のジョブ名");
    }
}
