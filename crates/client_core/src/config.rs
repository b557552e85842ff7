use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;
use url::Url;

pub const DEFAULT_SETTINGS_FILE: &str = "shiritori.toml";

const DEFAULT_OPPONENT_DELAY_MS: u64 = 1_000;
const DEFAULT_RESULTS_DELAY_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub bootstrap: String,
    pub submit_move: String,
    pub opponent_move: String,
    pub reset: String,
    pub select_level: String,
    pub results: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            bootstrap: "/get_game_status".into(),
            submit_move: "/submit_word".into(),
            opponent_move: "/get_gemini_word".into(),
            reset: "/reset_game".into(),
            select_level: "/select_level".into(),
            results: "/result".into(),
        }
    }
}

/// Fixed strings the controller writes on its own, as opposed to text
/// relayed from the oracle.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PresentationTexts {
    pub fallback_word: String,
    pub no_prior_word: String,
    pub thinking: String,
    pub fault_message: String,
    pub communication_error: String,
}

impl Default for PresentationTexts {
    fn default() -> Self {
        Self {
            fallback_word: "しりとり".into(),
            no_prior_word: "（なし）".into(),
            thinking: "Geminiが単語を考え中...".into(),
            fault_message: "エラー".into(),
            communication_error: "通信エラーが発生しました。".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server_url: String,
    pub opponent_delay_ms: u64,
    pub results_delay_ms: u64,
    pub endpoints: Endpoints,
    pub texts: PresentationTexts,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".into(),
            opponent_delay_ms: DEFAULT_OPPONENT_DELAY_MS,
            results_delay_ms: DEFAULT_RESULTS_DELAY_MS,
            endpoints: Endpoints::default(),
            texts: PresentationTexts::default(),
        }
    }
}

/// Timings and texts the session state machine runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSettings {
    pub opponent_delay: Duration,
    pub results_delay: Duration,
    pub texts: PresentationTexts,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Settings::default().controller_settings()
    }
}

impl Settings {
    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            opponent_delay: Duration::from_millis(self.opponent_delay_ms),
            results_delay: Duration::from_millis(self.results_delay_ms),
            texts: self.texts.clone(),
        }
    }

    /// Joins an endpoint path onto the configured server url. Endpoint paths
    /// always stay below the server url's own path, leading `/` or not.
    pub fn resolve(&self, path: &str) -> Result<Url> {
        let mut base = Url::parse(self.server_url.trim())
            .with_context(|| format!("invalid server url '{}'", self.server_url))?;
        if !base.path().ends_with('/') {
            let directory = format!("{}/", base.path());
            base.set_path(&directory);
        }
        base.join(path.trim_start_matches('/'))
            .with_context(|| format!("invalid endpoint path '{path}' for '{}'", self.server_url))
    }

    pub fn results_url(&self) -> Result<Url> {
        self.resolve(&self.endpoints.results)
    }
}

/// Loads settings from defaults, then `path` (or `shiritori.toml` when it
/// exists), then environment overrides.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    load_settings_with(path, |key| std::env::var(key).ok())
}

fn load_settings_with(
    path: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Settings> {
    let mut settings = match path {
        Some(path) => read_settings_file(path)?,
        None if Path::new(DEFAULT_SETTINGS_FILE).exists() => {
            read_settings_file(Path::new(DEFAULT_SETTINGS_FILE))?
        }
        None => Settings::default(),
    };

    apply_env_overrides(&mut settings, lookup);
    sanitize_delays(&mut settings);
    Ok(settings)
}

fn read_settings_file(path: &Path) -> Result<Settings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
    toml::from_str(&raw)
        .with_context(|| format!("failed to parse settings file '{}'", path.display()))
}

fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("SHIRITORI_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = lookup("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = lookup("APP__OPPONENT_DELAY_MS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.opponent_delay_ms = parsed,
            Err(err) => warn!("ignoring APP__OPPONENT_DELAY_MS='{v}': {err}"),
        }
    }
    if let Some(v) = lookup("APP__RESULTS_DELAY_MS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.results_delay_ms = parsed,
            Err(err) => warn!("ignoring APP__RESULTS_DELAY_MS='{v}': {err}"),
        }
    }

    let endpoints = &mut settings.endpoints;
    for (key, slot) in [
        ("APP__BOOTSTRAP_PATH", &mut endpoints.bootstrap),
        ("APP__SUBMIT_PATH", &mut endpoints.submit_move),
        ("APP__OPPONENT_MOVE_PATH", &mut endpoints.opponent_move),
        ("APP__RESET_PATH", &mut endpoints.reset),
        ("APP__SELECT_LEVEL_PATH", &mut endpoints.select_level),
        ("APP__RESULTS_PATH", &mut endpoints.results),
    ] {
        if let Some(v) = lookup(key) {
            *slot = v;
        }
    }
}

// Neither delay may be zero.
fn sanitize_delays(settings: &mut Settings) {
    if settings.opponent_delay_ms == 0 {
        warn!("opponent_delay_ms must be non-zero; using {DEFAULT_OPPONENT_DELAY_MS}");
        settings.opponent_delay_ms = DEFAULT_OPPONENT_DELAY_MS;
    }
    if settings.results_delay_ms == 0 {
        warn!("results_delay_ms must be non-zero; using {DEFAULT_RESULTS_DELAY_MS}");
        settings.results_delay_ms = DEFAULT_RESULTS_DELAY_MS;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
