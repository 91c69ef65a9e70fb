//! Demo client configuration.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use ui_runtime::UiConfig;

/// Configuration required to bootstrap the demo client.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub ui: UiConfig,
    /// Directory holding `windows.ron` and friends.
    pub data_dir: PathBuf,
    pub session_id: Option<String>,
    /// Simulated latency of an ordinary window load.
    pub load_latency: Duration,
    /// Simulated latency of the deliberately slow world map.
    pub slow_load_latency: Duration,
    /// Also log to stderr, not only to the session file.
    pub log_to_stderr: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            ui: UiConfig::default(),
            data_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../ui/content/data")),
            session_id: None,
            load_latency: Duration::from_millis(150),
            slow_load_latency: Duration::from_secs(6),
            log_to_stderr: true,
        }
    }
}

impl ClientConfig {
    /// Construct configuration from process environment variables.
    ///
    /// - `UI_DATA_DIR`
    /// - `UI_SESSION_ID`
    /// - `UI_DEMO_LATENCY_MS` / `UI_DEMO_SLOW_LATENCY_MS`
    /// - `UI_LOG_STDERR`
    /// - every `UI_*` variable read by [`UiConfig::from_env`]
    pub fn from_env() -> Self {
        let mut config = Self {
            ui: UiConfig::from_env(),
            ..Self::default()
        };

        if let Some(dir) = read_env::<PathBuf>("UI_DATA_DIR") {
            config.data_dir = dir;
        }
        config.session_id = env::var("UI_SESSION_ID").ok().filter(|id| !id.is_empty());
        if let Some(ms) = read_env::<u64>("UI_DEMO_LATENCY_MS") {
            config.load_latency = Duration::from_millis(ms);
        }
        if let Some(ms) = read_env::<u64>("UI_DEMO_SLOW_LATENCY_MS") {
            config.slow_load_latency = Duration::from_millis(ms);
        }
        if let Some(enabled) = read_env_bool("UI_LOG_STDERR") {
            config.log_to_stderr = enabled;
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

fn read_env_bool(key: &str) -> Option<bool> {
    match env::var(key).ok()?.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
