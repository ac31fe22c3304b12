//! Confirm-gated panel actions: rerun and enable/disable.
//!
//! Both actions are gated behind a retype-to-confirm prompt: the operator
//! must type the exact job name (case-sensitive) before any network call is
//! made. A mismatch or a cancelled prompt aborts with zero requests — the
//! gate is a deliberate manual step, not a retryable error.
//!
//! The prompt itself is an injected [`ConfirmGate`] capability so the flow
//! runs headless under test.

use std::io::{BufRead, Write};

use anyhow::Result;
use colored::Colorize;

use crate::panel::{ActionResult, PanelClient};

// ---------------------------------------------------------------------------
// Confirmation gate
// ---------------------------------------------------------------------------

/// Source of the operator's typed confirmation. `None` means the prompt was
/// cancelled (EOF), which aborts like a mismatch.
pub trait ConfirmGate {
    fn ask(&self, prompt: &str) -> Option<String>;
}

/// Interactive gate reading one line from stdin.
pub struct StdinPrompt;

impl ConfirmGate for StdinPrompt {
    fn ask(&self, prompt: &str) -> Option<String> {
        print!("{prompt}: ");
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        match std::io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }
}

/// Exact, case-sensitive comparison of the typed text against the job name.
pub fn confirmation_matches(input: Option<&str>, job_name: &str) -> bool {
    input == Some(job_name)
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// The two state-changing panel actions (enable and disable share an
/// endpoint, distinguished by the `disable` flag).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Rerun,
    Enable,
    Disable,
}

impl ActionKind {
    /// Prompt wording varies by target action.
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::Rerun => "Please type in the job name to confirm rerun",
            Self::Enable => "Please type in the job name to confirm enable",
            Self::Disable => "Please type in the job name to confirm disable",
        }
    }

    /// Notice shown when the confirmation gate rejects the input.
    pub fn abort_notice(&self) -> &'static str {
        match self {
            Self::Rerun => "Rerun aborted",
            Self::Enable | Self::Disable => "Action aborted",
        }
    }
}

/// How a gated action ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Confirmation mismatch or cancelled prompt; no request was made.
    Aborted,
    /// Server confirmed; caller reloads to reflect the new state.
    Completed,
    /// Server answered with a failure message to surface.
    Failed(String),
}

/// Run one confirm-gated action end to end.
///
/// Order is fixed: prompt, compare, and only on an exact match build the
/// payload and issue a single POST. Transport and parse failures propagate
/// as errors for the caller to surface; they are never retried here.
pub fn confirm_and_run(
    client: &PanelClient,
    kind: ActionKind,
    job_name: &str,
    jobid: i64,
    api_token: &str,
    gate: &dyn ConfirmGate,
) -> Result<ActionOutcome> {
    let input = gate.ask(kind.prompt());
    println!("{}", format!("> jobid {jobid}").dimmed());

    if !confirmation_matches(input.as_deref(), job_name) {
        return Ok(ActionOutcome::Aborted);
    }

    let result = match kind {
        ActionKind::Rerun => client.rerun(jobid, api_token)?,
        ActionKind::Enable => client.enable_disable(jobid, false, api_token)?,
        ActionKind::Disable => client.enable_disable(jobid, true, api_token)?,
    };

    Ok(match result {
        ActionResult::Success => ActionOutcome::Completed,
        ActionResult::Failed(message) => ActionOutcome::Failed(message),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
