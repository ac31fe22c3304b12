//! Configuration loading.
//!
//! Layered, later layers override earlier ones at the key level:
//!
//! 1. Built-in defaults — [`schema::JobwatchConfig::default()`]
//! 2. User global config — `~/.jobwatch/config.toml`
//! 3. Project local config — `.jobwatch.toml` in the current directory
//! 4. `JOBWATCH_*` environment variables (highest precedence)
//!
//! Malformed or missing files are skipped silently; the watch commands must
//! keep working with nothing but defaults.

pub mod schema;

use std::fs;
use std::path::PathBuf;

pub use schema::JobwatchConfig;
use schema::ConfigOverlay;

/// Load the fully resolved configuration.
pub fn load() -> JobwatchConfig {
    let mut config = JobwatchConfig::default();

    if let Some(overlay) = load_toml_file(global_config_path()) {
        overlay.apply(&mut config);
    }
    if let Some(overlay) = load_toml_file(project_config_path()) {
        overlay.apply(&mut config);
    }
    apply_env_overrides(&mut config);

    config
}

fn load_toml_file(path: Option<PathBuf>) -> Option<ConfigOverlay> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    toml::from_str(&content).ok()
}

/// Path to the user global config: `~/.jobwatch/config.toml`.
pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".jobwatch").join("config.toml"))
}

/// Path to the project local config: `.jobwatch.toml` in the current
/// directory.
pub fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".jobwatch.toml"))
}

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `JOBWATCH_PANEL_URL` — task monitor endpoint base
/// - `JOBWATCH_DASHBOARD_URL` — control panel page
/// - `JOBWATCH_TIMEOUT_MS` — HTTP request timeout
/// - `JOBWATCH_LOG_TAIL` — trailing log lines per pane
/// - `JOBWATCH_COLOR` — colored output (`1`/`true`/`yes`/`on`)
fn apply_env_overrides(config: &mut JobwatchConfig) {
    if let Ok(val) = std::env::var("JOBWATCH_PANEL_URL")
        && !val.is_empty()
    {
        config.panel.url = val;
    }
    if let Ok(val) = std::env::var("JOBWATCH_DASHBOARD_URL")
        && !val.is_empty()
    {
        config.panel.dashboard_url = val;
    }
    if let Ok(val) = std::env::var("JOBWATCH_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.http.timeout_ms = ms;
    }
    if let Ok(val) = std::env::var("JOBWATCH_LOG_TAIL")
        && let Ok(n) = val.parse::<usize>()
    {
        config.display.log_tail = n;
    }
    if let Ok(val) = std::env::var("JOBWATCH_COLOR") {
        config.display.color = is_truthy(&val);
    }
}

fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
