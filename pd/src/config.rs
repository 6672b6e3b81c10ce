//! Plannerd configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main plannerd configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Agent call limits
    pub agent: AgentConfig,

    /// Session actor channel sizing
    pub session: SessionConfig,

    /// Realtime delivery tuning
    pub delivery: DeliveryConfig,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .plannerd.yml
        let local_config = PathBuf::from(".plannerd.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/plannerd/plannerd.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("plannerd").join("plannerd.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Agent call limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Per-turn agent timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Retry a failed specialist call once with the coordinator
    #[serde(rename = "coordinator-fallback")]
    pub coordinator_fallback: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            coordinator_fallback: true,
        }
    }
}

/// Session actor channel sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Request channel depth per session actor
    #[serde(rename = "request-buffer")]
    pub request_buffer: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { request_buffer: 32 }
    }
}

/// Realtime delivery tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Deltas buffered per disconnected channel before resync
    #[serde(rename = "queue-bound")]
    pub queue_bound: usize,

    /// Initial reconnect backoff in milliseconds
    #[serde(rename = "backoff-initial-ms")]
    pub backoff_initial_ms: u64,

    /// Reconnect backoff ceiling in milliseconds
    #[serde(rename = "backoff-max-ms")]
    pub backoff_max_ms: u64,

    /// Signal channel depth per delivery channel
    #[serde(rename = "signal-buffer")]
    pub signal_buffer: usize,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            queue_bound: 64,
            backoff_initial_ms: 500,
            backoff_max_ms: 30_000,
            signal_buffer: 128,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.agent.timeout_ms, 30_000);
        assert_eq!(config.session.request_buffer, 32);
        assert_eq!(config.delivery.queue_bound, 64);
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
agent:
  timeout-ms: 5000

session:
  request-buffer: 8

delivery:
  queue-bound: 16
  backoff-initial-ms: 100
  backoff-max-ms: 2000
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.agent.timeout_ms, 5000);
        assert_eq!(config.session.request_buffer, 8);
        assert_eq!(config.delivery.queue_bound, 16);
        assert_eq!(config.delivery.backoff_initial_ms, 100);
        assert_eq!(config.delivery.backoff_max_ms, 2000);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
delivery:
  queue-bound: 4
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        // Specified value
        assert_eq!(config.delivery.queue_bound, 4);

        // Defaults for unspecified
        assert_eq!(config.delivery.backoff_initial_ms, 500);
        assert_eq!(config.agent.timeout_ms, 30_000);
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let path = PathBuf::from("/nonexistent/plannerd.yml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("plannerd.yml");
        fs::write(&path, "agent:\n  timeout-ms: 1234\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.agent.timeout_ms, 1234);
    }
}
