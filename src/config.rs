//! Configuration.
//!
//! One [`Settings`] value is loaded at startup and passed to everything
//! that needs an endpoint, interval or timeout. Sources, lowest to highest
//! precedence:
//!
//! 1. built-in defaults
//! 2. an optional TOML file (`--config`)
//! 3. `VITALWATCH__SECTION__KEY` environment variables
//! 4. command-line flags (applied by the binary)
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:5000"
//! notification_url = "http://localhost:3001"
//! request_timeout = "5s"
//! predict_paths = ["ml/predict", "api/predict", "predict", "vitals"]
//!
//! [poll]
//! patient_id = "P001"
//! interval = "30s"
//! history_hours = 6
//!
//! [logging]
//! level = "info"
//! file = "vitalwatch.log"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Deserializer};

use crate::data::duration::parse_duration;

/// Default Health API endpoint.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
/// Default notification service endpoint.
pub const DEFAULT_NOTIFICATION_URL: &str = "http://localhost:3001";
/// Per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
/// Time between poll ticks.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);
/// Prediction endpoints probed in order.
pub const DEFAULT_PREDICT_PATHS: [&str; 4] = ["ml/predict", "api/predict", "predict", "vitals"];
pub const DEFAULT_PATIENT_ID: &str = "P001";
/// Hours of history requested per tick.
pub const DEFAULT_HISTORY_HOURS: u32 = 6;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "VITALWATCH";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub poll: PollSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// `[api]`: where the Health API and notification service live.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_notification_url")]
    pub notification_url: String,

    #[serde(
        default = "default_request_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub request_timeout: Duration,

    #[serde(default = "default_predict_paths")]
    pub predict_paths: Vec<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_notification_url() -> String {
    DEFAULT_NOTIFICATION_URL.to_string()
}

fn default_request_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}

fn default_predict_paths() -> Vec<String> {
    DEFAULT_PREDICT_PATHS.iter().map(|p| p.to_string()).collect()
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            notification_url: default_notification_url(),
            request_timeout: default_request_timeout(),
            predict_paths: default_predict_paths(),
        }
    }
}

/// `[poll]`: which patient, and how often.
#[derive(Debug, Clone, Deserialize)]
pub struct PollSettings {
    #[serde(default = "default_patient_id")]
    pub patient_id: String,

    #[serde(
        default = "default_interval",
        deserialize_with = "deserialize_duration"
    )]
    pub interval: Duration,

    #[serde(default = "default_history_hours")]
    pub history_hours: u32,
}

fn default_patient_id() -> String {
    DEFAULT_PATIENT_ID.to_string()
}

fn default_interval() -> Duration {
    DEFAULT_REFRESH_INTERVAL
}

fn default_history_hours() -> u32 {
    DEFAULT_HISTORY_HOURS
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            patient_id: default_patient_id(),
            interval: default_interval(),
            history_hours: default_history_hours(),
        }
    }
}

/// `[logging]`
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` wins when set.
    #[serde(default = "default_level")]
    pub level: String,

    /// Log file. The terminal belongs to the dashboard, so logs never go
    /// to stdout/stderr while it runs.
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from("vitalwatch.log")
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: default_log_file(),
        }
    }
}

impl Settings {
    /// Load defaults, the optional file and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, environment())
    }

    fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            let name = path
                .to_str()
                .with_context(|| format!("config path is not UTF-8: {}", path.display()))?;
            builder = builder.add_source(File::new(name, FileFormat::Toml).required(true));
        }

        let settings: Settings = builder
            .add_source(env)
            .build()
            .context("failed to load configuration")?
            .try_deserialize()
            .context("invalid configuration")?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.poll.interval.is_zero() {
            anyhow::bail!("poll.interval must be greater than zero");
        }
        if self.api.request_timeout.is_zero() {
            anyhow::bail!("api.request_timeout must be greater than zero");
        }
        if self.poll.patient_id.trim().is_empty() {
            anyhow::bail!("poll.patient_id must not be empty");
        }
        Ok(())
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("api.predict_paths")
}

fn deserialize_duration<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_duration(&raw).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        environment().source(Some(map))
    }

    #[test]
    fn test_defaults() {
        let s = Settings::load_with_env(None, env(&[])).unwrap();
        assert_eq!(s.api.base_url, "http://localhost:5000");
        assert_eq!(s.api.request_timeout, Duration::from_secs(5));
        assert_eq!(s.api.predict_paths.len(), 4);
        assert_eq!(s.poll.patient_id, "P001");
        assert_eq!(s.poll.interval, Duration::from_secs(30));
        assert_eq!(s.poll.history_hours, 6);
        assert_eq!(s.logging.level, "info");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[api]
base_url = "http://health.local:8000"
request_timeout = "3s"

[poll]
patient_id = "P042"
interval = "10s"
"#
        )
        .unwrap();

        let s = Settings::load_with_env(Some(file.path()), env(&[])).unwrap();
        assert_eq!(s.api.base_url, "http://health.local:8000");
        assert_eq!(s.api.request_timeout, Duration::from_secs(3));
        assert_eq!(s.poll.patient_id, "P042");
        assert_eq!(s.poll.interval, Duration::from_secs(10));
        // Untouched keys keep their defaults
        assert_eq!(s.api.notification_url, "http://localhost:3001");
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[poll]\npatient_id = \"P042\"").unwrap();

        let s = Settings::load_with_env(
            Some(file.path()),
            env(&[
                ("VITALWATCH__POLL__PATIENT_ID", "P777"),
                ("VITALWATCH__API__PREDICT_PATHS", "v2/predict,predict"),
            ]),
        )
        .unwrap();
        assert_eq!(s.poll.patient_id, "P777");
        assert_eq!(s.api.predict_paths, vec!["v2/predict", "predict"]);
    }

    #[test]
    fn test_numeric_env_values_stay_strings() {
        let s = Settings::load_with_env(
            None,
            env(&[
                ("VITALWATCH__POLL__PATIENT_ID", "123"),
                ("VITALWATCH__POLL__HISTORY_HOURS", "2"),
            ]),
        )
        .unwrap();
        assert_eq!(s.poll.patient_id, "123");
        assert_eq!(s.poll.history_hours, 2);
        assert_eq!(s.api.predict_paths.len(), 4);
    }

    #[test]
    fn test_bad_duration_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[poll]\ninterval = \"soon\"").unwrap();
        assert!(Settings::load_with_env(Some(file.path()), env(&[])).is_err());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[poll]\ninterval = \"0s\"").unwrap();
        assert!(Settings::load_with_env(Some(file.path()), env(&[])).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let path = Path::new("/nonexistent/vitalwatch.toml");
        assert!(Settings::load_with_env(Some(path), env(&[])).is_err());
    }
}
