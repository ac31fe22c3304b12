//! Synchronous HTTP client for a task monitor panel.
//!
//! Wraps the panel's server-rendered pages and JSON endpoints behind typed
//! calls. GET endpoints wrap their payload in a `{"success": ...}` /
//! `{"error": ...}` envelope; the POST action endpoints answer
//! `{"success": true}` or `{"error": "<message>"}` and always with HTTP 200,
//! so failures are carried in the body, not the status line.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::jobs::{JobDetail, PanelSummary};

// ---------------------------------------------------------------------------
// Action results
// ---------------------------------------------------------------------------

/// Raw shape of an action endpoint response.
#[derive(Debug, Deserialize)]
struct ActionResponse {
    #[serde(default)]
    success: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

/// Outcome of a rerun / enable-disable POST, after body interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult {
    /// Server confirmed the action; the caller reloads to pick up new state.
    Success,
    /// Server answered but refused: the message to surface to the operator.
    Failed(String),
}

/// Interpret an action response body the way the page script does:
/// truthy `success` wins, then a present `error`, then the generic
/// per-action failure message.
fn interpret_action(body: &str, generic_failure: &str) -> Result<ActionResult> {
    let resp: ActionResponse =
        serde_json::from_str(body).context("failed to parse action response")?;

    if resp.success.as_ref().is_some_and(is_truthy) {
        return Ok(ActionResult::Success);
    }
    match resp.error {
        Some(message) => Ok(ActionResult::Failed(message)),
        None => Ok(ActionResult::Failed(generic_failure.to_string())),
    }
}

/// JS truthiness: `false`, `0`, `""`, and `null` are falsy; arrays and
/// objects are truthy even when empty.
fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().unwrap_or(0.0) != 0.0,
        Value::String(s) => !s.is_empty(),
        Value::Null => false,
        Value::Array(_) | Value::Object(_) => true,
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for one task monitor panel, rooted at its endpoint base
/// (e.g. `http://127.0.0.1:5000/@taskmonitor`).
#[derive(Debug, Clone)]
pub struct PanelClient {
    base_url: String,
    timeout: Duration,
}

impl PanelClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the task detail page for a job.
    pub fn task_page_url(&self, jobid: i64) -> String {
        format!("{}/{jobid}", self.base_url)
    }

    /// Fetch an arbitrary panel page as HTML (control panel root or a task
    /// page by full URL).
    pub fn fetch_page(&self, url: &str) -> Result<String> {
        ureq::get(url)
            .timeout(self.timeout)
            .call()
            .with_context(|| format!("failed to fetch {url}"))?
            .into_string()
            .with_context(|| format!("failed to read body of {url}"))
    }

    /// Fetch the server-rendered task page for a job.
    pub fn fetch_task_page(&self, jobid: i64) -> Result<String> {
        self.fetch_page(&self.task_page_url(jobid))
    }

    /// `GET <base>/json/<id>` — full job detail.
    pub fn fetch_job(&self, jobid: i64) -> Result<JobDetail> {
        let url = format!("{}/json/{jobid}", self.base_url);
        let body = self.fetch_page(&url)?;
        parse_envelope(&body).with_context(|| format!("job {jobid} lookup failed"))
    }

    /// `GET <base>/json/summary` — panel-wide job summary.
    pub fn fetch_summary(&self) -> Result<PanelSummary> {
        let url = format!("{}/json/summary", self.base_url);
        let body = self.fetch_page(&url)?;
        parse_envelope(&body).context("summary lookup failed")
    }

    /// `POST <base>/rerun` with `{jobid, api_token}`.
    pub fn rerun(&self, jobid: i64, api_token: &str) -> Result<ActionResult> {
        let payload = serde_json::json!({ "jobid": jobid, "api_token": api_token });
        let body = self.post_action("rerun", &payload)?;
        interpret_action(&body, "Rerun failed")
    }

    /// `POST <base>/enable_disable` with `{jobid, disable, api_token}`.
    pub fn enable_disable(
        &self,
        jobid: i64,
        disable: bool,
        api_token: &str,
    ) -> Result<ActionResult> {
        let payload =
            serde_json::json!({ "jobid": jobid, "disable": disable, "api_token": api_token });
        let body = self.post_action("enable_disable", &payload)?;
        interpret_action(&body, "Action failed")
    }

    fn post_action(&self, endpoint: &str, payload: &Value) -> Result<String> {
        let url = format!("{}/{endpoint}", self.base_url);
        ureq::post(&url)
            .timeout(self.timeout)
            .send_json(payload)
            .with_context(|| format!("POST {url} failed"))?
            .into_string()
            .with_context(|| format!("failed to read response of {url}"))
    }
}

/// Unwrap a `{"success": T}` / `{"error": "..."}` envelope.
fn parse_envelope<T: DeserializeOwned>(body: &str) -> Result<T> {
    #[derive(Deserialize)]
    #[serde(bound = "T: DeserializeOwned")]
    struct Envelope<T> {
        #[serde(default)]
        success: Option<T>,
        #[serde(default)]
        error: Option<String>,
    }

    let envelope: Envelope<T> =
        serde_json::from_str(body).context("malformed panel JSON response")?;
    if let Some(error) = envelope.error {
        anyhow::bail!("panel reported: {error}");
    }
    envelope
        .success
        .context("panel response carried neither success nor error")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_success_true_is_success() {
        assert_eq!(
            interpret_action(r#"{"success": true}"#, "Rerun failed").unwrap(),
            ActionResult::Success
        );
    }

    #[test]
    fn action_error_message_is_surfaced_verbatim() {
        assert_eq!(
            interpret_action(r#"{"error": "locked"}"#, "Rerun failed").unwrap(),
            ActionResult::Failed("locked".to_string())
        );
    }

    #[test]
    fn action_empty_body_falls_back_to_generic_message() {
        assert_eq!(
            interpret_action("{}", "Action failed").unwrap(),
            ActionResult::Failed("Action failed".to_string())
        );
    }

    #[test]
    fn action_empty_collection_success_is_still_success() {
        assert_eq!(
            interpret_action(r#"{"success": []}"#, "Rerun failed").unwrap(),
            ActionResult::Success
        );
        assert_eq!(
            interpret_action(r#"{"success": {}}"#, "Rerun failed").unwrap(),
            ActionResult::Success
        );
    }

    #[test]
    fn action_false_success_with_error_prefers_error() {
        assert_eq!(
            interpret_action(r#"{"success": false, "error": "nope"}"#, "Rerun failed").unwrap(),
            ActionResult::Failed("nope".to_string())
        );
    }

    #[test]
    fn action_garbage_body_is_a_parse_error() {
        assert!(interpret_action("<html>boom</html>", "Rerun failed").is_err());
    }

    #[test]
    fn envelope_unwraps_success() {
        let v: Vec<u32> = parse_envelope(r#"{"success": [1, 2, 3]}"#).unwrap();
        assert_eq!(v, vec![1, 2, 3]);
    }

    #[test]
    fn envelope_surfaces_error() {
        let err = parse_envelope::<Vec<u32>>(r#"{"error": "Invalid job id"}"#).unwrap_err();
        assert!(err.to_string().contains("Invalid job id"));
    }

    #[test]
    fn envelope_rejects_empty_object() {
        assert!(parse_envelope::<Vec<u32>>("{}").is_err());
    }

    #[test]
    fn client_strips_trailing_slash() {
        let client = PanelClient::new("http://127.0.0.1:5000/@taskmonitor/", Duration::ZERO);
        assert_eq!(client.base_url(), "http://127.0.0.1:5000/@taskmonitor");
        assert_eq!(
            client.task_page_url(4),
            "http://127.0.0.1:5000/@taskmonitor/4"
        );
    }
}
