//! Configuration schema and defaults.

use serde::{Deserialize, Serialize};

/// Fully resolved jobwatch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JobwatchConfig {
    pub panel: PanelConfig,
    pub http: HttpConfig,
    pub display: DisplayConfig,
}

impl Default for JobwatchConfig {
    fn default() -> Self {
        Self {
            panel: PanelConfig::default(),
            http: HttpConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

/// Where the panel lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Task monitor endpoint base, e.g. `http://127.0.0.1:5000/@taskmonitor`.
    pub url: String,
    /// Consolidated control panel page (the dashboard `watch` default).
    pub dashboard_url: String,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:5000/@taskmonitor".to_string(),
            dashboard_url: "http://127.0.0.1:5000/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_ms: 10_000 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// How many trailing log lines to show per pane.
    pub log_tail: usize,
    /// Colored output toggle.
    pub color: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            log_tail: 20,
            color: true,
        }
    }
}

/// Partial configuration as read from a single TOML file. Only the keys the
/// file actually sets are present; [`apply`](ConfigOverlay::apply) lays them
/// over the previous layer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigOverlay {
    pub panel: PanelOverlay,
    pub http: HttpOverlay,
    pub display: DisplayOverlay,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PanelOverlay {
    pub url: Option<String>,
    pub dashboard_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HttpOverlay {
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DisplayOverlay {
    pub log_tail: Option<usize>,
    pub color: Option<bool>,
}

impl ConfigOverlay {
    /// Apply every key this overlay sets onto `config`.
    pub fn apply(&self, config: &mut JobwatchConfig) {
        if let Some(url) = &self.panel.url {
            config.panel.url = url.clone();
        }
        if let Some(url) = &self.panel.dashboard_url {
            config.panel.dashboard_url = url.clone();
        }
        if let Some(ms) = self.http.timeout_ms {
            config.http.timeout_ms = ms;
        }
        if let Some(n) = self.display.log_tail {
            config.display.log_tail = n;
        }
        if let Some(color) = self.display.color {
            config.display.color = color;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_localhost() {
        let cfg = JobwatchConfig::default();
        assert_eq!(cfg.panel.url, "http://127.0.0.1:5000/@taskmonitor");
        assert_eq!(cfg.http.timeout_ms, 10_000);
        assert!(cfg.display.color);
    }

    #[test]
    fn overlay_applies_only_present_keys() {
        let overlay: ConfigOverlay = toml::from_str(
            r#"
            [panel]
            url = "http://10.0.0.9:8080/@taskmonitor"

            [display]
            log_tail = 50
            "#,
        )
        .unwrap();

        let mut cfg = JobwatchConfig::default();
        overlay.apply(&mut cfg);

        assert_eq!(cfg.panel.url, "http://10.0.0.9:8080/@taskmonitor");
        assert_eq!(cfg.display.log_tail, 50);
        // untouched keys keep their defaults
        assert_eq!(cfg.http.timeout_ms, 10_000);
        assert_eq!(cfg.panel.dashboard_url, "http://127.0.0.1:5000/");
    }
}
