//! End-to-end action flow tests against an in-process stub panel.
//!
//! The stub serves a task page (with its injected script globals), the job
//! JSON endpoint, and scripted action responses, and records every request
//! so tests can assert on call counts and payloads.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use jobwatch::actions::{ActionKind, ActionOutcome, ConfirmGate, confirm_and_run};
use jobwatch::context::extract_task_context;
use jobwatch::panel::PanelClient;

// ---------------------------------------------------------------------------
// Stub panel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    path: String,
    body: String,
}

/// Spawn a stub panel serving fixed bodies per path. Unknown paths answer
/// `{"error": "not found"}`. Returns the base URL and the request log.
fn spawn_stub(routes: HashMap<String, String>) -> (String, Arc<Mutex<Vec<Recorded>>>) {
    let server = tiny_http::Server::http("127.0.0.1:0").expect("stub server must bind");
    let addr = server.server_addr().to_ip().expect("stub has an ip addr");
    let log: Arc<Mutex<Vec<Recorded>>> = Arc::new(Mutex::new(Vec::new()));

    let thread_log = Arc::clone(&log);
    std::thread::spawn(move || {
        for mut request in server.incoming_requests() {
            let mut body = String::new();
            let _ = request.as_reader().read_to_string(&mut body);
            let path = request.url().to_string();

            thread_log.lock().unwrap().push(Recorded {
                method: request.method().as_str().to_string(),
                path: path.clone(),
                body,
            });

            let response_body = routes
                .get(&path)
                .cloned()
                .unwrap_or_else(|| r#"{"error": "not found"}"#.to_string());
            let _ = request.respond(tiny_http::Response::from_string(response_body));
        }
    });

    (format!("http://{addr}"), log)
}

fn task_page_html(token: &str) -> String {
    format!(
        "<html><body><div class='container'>...</div><script>\n\
         let RUNNING = 0;\n\
         let NEXT_RUN = \"Never\";\n\
         let ERR_LINE = -1;\n\
         let TASKPAGE_REFRESH = 5;\n\
         let API_TOKEN = '{token}';\n\
         </script></body></html>"
    )
}

fn job_json(name: &str) -> String {
    format!(
        r#"{{"success": {{"jobid": 3, "func": "{name}", "signature": "{name}()",
            "type": "NeverJob", "is_running": false,
            "logs": {{"log": "", "err": "", "start": null, "end": null}}}}}}"#
    )
}

fn routes(action_path: &str, action_body: &str) -> HashMap<String, String> {
    HashMap::from([
        ("/3".to_string(), task_page_html("sEcReTtOkEnAbCdEfGhIj")),
        ("/json/3".to_string(), job_json("nightly_report")),
        (action_path.to_string(), action_body.to_string()),
    ])
}

struct ScriptedGate(Option<String>);

impl ConfirmGate for ScriptedGate {
    fn ask(&self, _prompt: &str) -> Option<String> {
        self.0.clone()
    }
}

fn posts(log: &Arc<Mutex<Vec<Recorded>>>) -> Vec<Recorded> {
    log.lock()
        .unwrap()
        .iter()
        .filter(|r| r.method == "POST")
        .cloned()
        .collect()
}

/// Full pre-action resolution: task page for the token, job JSON for the
/// name — the same steps the CLI performs.
fn resolve(client: &PanelClient) -> (String, String) {
    let html = client.fetch_task_page(3).unwrap();
    let ctx = extract_task_context(&html).unwrap();
    let job = client.fetch_job(3).unwrap();
    (job.func, ctx.api_token)
}

fn client_for(base: &str) -> PanelClient {
    PanelClient::new(base, Duration::from_secs(5))
}

// ---------------------------------------------------------------------------
// Rerun
// ---------------------------------------------------------------------------

#[test]
fn confirmed_rerun_posts_exactly_once_with_payload() {
    let (base, log) = spawn_stub(routes("/rerun", r#"{"success": true}"#));
    let client = client_for(&base);
    let (name, token) = resolve(&client);

    let gate = ScriptedGate(Some("nightly_report".to_string()));
    let outcome =
        confirm_and_run(&client, ActionKind::Rerun, &name, 3, &token, &gate).unwrap();

    assert_eq!(outcome, ActionOutcome::Completed);

    let posts = posts(&log);
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].path, "/rerun");

    let payload: serde_json::Value = serde_json::from_str(&posts[0].body).unwrap();
    assert_eq!(payload["jobid"], 3);
    assert_eq!(payload["api_token"], "sEcReTtOkEnAbCdEfGhIj");
    assert!(payload.get("disable").is_none());
}

#[test]
fn case_mismatched_confirmation_makes_no_network_call() {
    let (base, log) = spawn_stub(routes("/rerun", r#"{"success": true}"#));
    let client = client_for(&base);
    let (name, token) = resolve(&client);

    let gate = ScriptedGate(Some("Nightly_Report".to_string()));
    let outcome =
        confirm_and_run(&client, ActionKind::Rerun, &name, 3, &token, &gate).unwrap();

    assert_eq!(outcome, ActionOutcome::Aborted);
    assert!(posts(&log).is_empty());
}

#[test]
fn cancelled_prompt_aborts_without_network_call() {
    let (base, log) = spawn_stub(routes("/rerun", r#"{"success": true}"#));
    let client = client_for(&base);
    let (name, token) = resolve(&client);

    let outcome = confirm_and_run(
        &client,
        ActionKind::Rerun,
        &name,
        3,
        &token,
        &ScriptedGate(None),
    )
    .unwrap();

    assert_eq!(outcome, ActionOutcome::Aborted);
    assert!(posts(&log).is_empty());
}

#[test]
fn server_error_message_is_surfaced_without_reload() {
    let (base, log) = spawn_stub(routes("/rerun", r#"{"error": "locked"}"#));
    let client = client_for(&base);
    let (name, token) = resolve(&client);

    let gate = ScriptedGate(Some("nightly_report".to_string()));
    let outcome =
        confirm_and_run(&client, ActionKind::Rerun, &name, 3, &token, &gate).unwrap();

    assert_eq!(outcome, ActionOutcome::Failed("locked".to_string()));
    assert_eq!(posts(&log).len(), 1);
}

#[test]
fn empty_response_falls_back_to_generic_failure() {
    let (base, _log) = spawn_stub(routes("/rerun", "{}"));
    let client = client_for(&base);
    let (name, token) = resolve(&client);

    let gate = ScriptedGate(Some("nightly_report".to_string()));
    let outcome =
        confirm_and_run(&client, ActionKind::Rerun, &name, 3, &token, &gate).unwrap();

    assert_eq!(outcome, ActionOutcome::Failed("Rerun failed".to_string()));
}

// ---------------------------------------------------------------------------
// Enable / disable
// ---------------------------------------------------------------------------

#[test]
fn disable_posts_the_disable_flag() {
    let (base, log) = spawn_stub(routes("/enable_disable", r#"{"success": true}"#));
    let client = client_for(&base);
    let (name, token) = resolve(&client);

    let gate = ScriptedGate(Some("nightly_report".to_string()));
    let outcome =
        confirm_and_run(&client, ActionKind::Disable, &name, 3, &token, &gate).unwrap();

    assert_eq!(outcome, ActionOutcome::Completed);

    let posts = posts(&log);
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].path, "/enable_disable");

    let payload: serde_json::Value = serde_json::from_str(&posts[0].body).unwrap();
    assert_eq!(payload["jobid"], 3);
    assert_eq!(payload["disable"], true);
    assert_eq!(payload["api_token"], "sEcReTtOkEnAbCdEfGhIj");
}

#[test]
fn enable_posts_disable_false() {
    let (base, log) = spawn_stub(routes("/enable_disable", r#"{"success": true}"#));
    let client = client_for(&base);
    let (name, token) = resolve(&client);

    let gate = ScriptedGate(Some("nightly_report".to_string()));
    confirm_and_run(&client, ActionKind::Enable, &name, 3, &token, &gate).unwrap();

    let payload: serde_json::Value = serde_json::from_str(&posts(&log)[0].body).unwrap();
    assert_eq!(payload["disable"], false);
}

// ---------------------------------------------------------------------------
// Transport failures
// ---------------------------------------------------------------------------

#[test]
fn unreachable_panel_is_an_error_not_an_outcome() {
    // Nothing listens on port 1.
    let client = PanelClient::new("http://127.0.0.1:1", Duration::from_millis(300));
    let gate = ScriptedGate(Some("nightly_report".to_string()));

    let result = confirm_and_run(&client, ActionKind::Rerun, "nightly_report", 3, "t", &gate);
    assert!(result.is_err());
}
