//! Configuration — YAML config + env var overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "pokedash.yaml";

/// Env var overrides: (variable, field).
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("POKEDASH_API_BASE", "api_base"),
    ("POKEDASH_WS_URL", "ws_url"),
    ("POKEDASH_STREAM_URL", "stream_url"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the evaluator REST API (`/initialize` lives here)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// WebSocket endpoint pushing state updates
    #[serde(default = "default_ws_url")]
    pub ws_url: String,

    /// Optional live video stream shown instead of screenshots
    #[serde(default)]
    pub stream_url: Option<String>,

    /// Sent to `/initialize`
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Sent to `/initialize`
    #[serde(default)]
    pub sound: bool,

    /// Fixed delay before each reconnection attempt
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    /// Give up after this many reconnects without a successful open (unset = never).
    /// The initial connect does not count.
    #[serde(default)]
    pub max_reconnect_attempts: Option<u32>,

    /// Timeout for the `/initialize` request
    #[serde(default = "default_init_timeout")]
    pub init_timeout_secs: u64,

    /// Max entries kept in the action log
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,
}

fn default_api_base() -> String {
    "http://localhost:8080".into()
}
fn default_ws_url() -> String {
    "ws://localhost:8080/ws".into()
}
fn default_headless() -> bool {
    true
}
fn default_reconnect_delay_ms() -> u64 {
    5000
}
fn default_init_timeout() -> u64 {
    30
}
fn default_log_capacity() -> usize {
    50
}

impl Config {
    /// Load config from a YAML file with env var overrides.
    pub fn load(config_path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config: {}", config_path.display()))?;

        let mut config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Load `pokedash.yaml` from `dir` if present, otherwise defaults.
    /// Env overrides apply either way.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.is_file() {
            return Self::load(&config_path);
        }
        let mut config = Config::default();
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        for (var, field) in ENV_OVERRIDES {
            let Ok(value) = std::env::var(var) else {
                continue;
            };
            match *field {
                "api_base" => self.api_base = value,
                "ws_url" => self.ws_url = value,
                "stream_url" => self.stream_url = Some(value).filter(|v| !v.is_empty()),
                _ => {}
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.ws_url.starts_with("ws://") || self.ws_url.starts_with("wss://")) {
            anyhow::bail!("ws_url must start with ws:// or wss://, got '{}'", self.ws_url);
        }
        if !(self.api_base.starts_with("http://") || self.api_base.starts_with("https://")) {
            anyhow::bail!(
                "api_base must start with http:// or https://, got '{}'",
                self.api_base
            );
        }
        if self.log_capacity == 0 {
            anyhow::bail!("log_capacity must be at least 1");
        }
        Ok(())
    }

    pub fn initialize_url(&self) -> String {
        format!("{}/initialize", self.api_base.trim_end_matches('/'))
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn init_timeout(&self) -> Duration {
        Duration::from_secs(self.init_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            ws_url: default_ws_url(),
            stream_url: None,
            headless: default_headless(),
            sound: false,
            reconnect_delay_ms: default_reconnect_delay_ms(),
            max_reconnect_attempts: None,
            init_timeout_secs: default_init_timeout(),
            log_capacity: default_log_capacity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_defaults() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(tmp, "headless: true").unwrap();

        let config = Config::load(tmp.path()).unwrap();
        assert_eq!(config.reconnect_delay_ms, 5000);
        assert_eq!(config.log_capacity, 50);
        assert_eq!(config.max_reconnect_attempts, None);
        assert!(!config.sound);
        assert_eq!(config.initialize_url(), "http://localhost:8080/initialize");
    }

    #[test]
    fn test_load_config_custom_values() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(
            tmp,
            "api_base: http://10.0.0.2:9000/\nws_url: wss://gym.example/ws\nreconnect_delay_ms: 250\nmax_reconnect_attempts: 3\nlog_capacity: 10"
        )
        .unwrap();

        let config = Config::load(tmp.path()).unwrap();
        assert_eq!(config.initialize_url(), "http://10.0.0.2:9000/initialize");
        assert_eq!(config.ws_url, "wss://gym.example/ws");
        assert_eq!(config.reconnect_delay(), Duration::from_millis(250));
        assert_eq!(config.max_reconnect_attempts, Some(3));
        assert_eq!(config.log_capacity, 10);
    }

    #[test]
    fn test_bad_ws_url_fails() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(tmp, "ws_url: http://localhost:8080/ws").unwrap();
        assert!(Config::load(tmp.path()).is_err());
    }

    #[test]
    fn test_zero_log_capacity_fails() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(tmp, "log_capacity: 0").unwrap();
        assert!(Config::load(tmp.path()).is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap();
        assert_eq!(config.log_capacity, 50);
        assert!(config.headless);
    }
}
