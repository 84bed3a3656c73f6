//! Configuration management for roadreport.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::assistant::DEFAULT_SYSTEM_PROMPT;
use crate::error::{Error, Result};
use crate::report::ReportStatus;
use crate::storage::DEFAULT_BACKING_KEY;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "roadreport";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "reports.db";

/// Environment variable prefix.
const ENV_PREFIX: &str = "ROADREPORT_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `ROADREPORT_`, nested keys split on `__`)
/// 2. TOML config file at `~/.config/roadreport/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Submission configuration.
    pub submission: SubmissionConfig,
    /// Traffic-rules assistant configuration.
    pub assistant: AssistantConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/roadreport/reports.db`
    pub database_path: Option<PathBuf>,
    /// Key under which the whole report collection is stored.
    pub backing_key: String,
}

/// Settings for uploading media to the classification endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    /// URL receiving the multipart upload.
    pub endpoint: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Interval between simulated progress steps in milliseconds.
    pub progress_interval_ms: u64,
    /// Fraction added to the progress value on every step.
    pub progress_step: f64,
    /// Ceiling the simulated progress never passes before the response arrives.
    pub progress_cap: f64,
    /// Values used when the classifier leaves a field out.
    pub defaults: ReportDefaults,
}

/// Fallback values for fields missing from a classifier response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportDefaults {
    /// Location when none is returned.
    pub location: String,
    /// Violation type when none is returned.
    pub violation_type: String,
    /// Confidence when none is returned.
    pub confidence: f64,
    /// Status when none is returned.
    pub status: ReportStatus,
}

/// Settings for the traffic-rules assistant.
///
/// The API key is never written back out; it is expected to come from
/// `ROADREPORT_ASSISTANT__API_KEY`.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// OpenAI-compatible chat-completions endpoint.
    pub endpoint: String,
    /// Model name sent with each request.
    pub model: String,
    /// Bearer token for the endpoint.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Upper bound on the answer length.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Instructions sent ahead of every question.
    pub system_prompt: String,
}

impl std::fmt::Debug for AssistantConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistantConfig")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            model: "llama3-8b-8192".to_string(),
            api_key: None,
            max_tokens: 500,
            temperature: 0.7,
            timeout_secs: 60,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None, // Will be resolved to default at runtime
            backing_key: DEFAULT_BACKING_KEY.to_string(),
        }
    }
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:5000/traffic_violation".to_string(),
            timeout_secs: 120,
            progress_interval_ms: 300,
            progress_step: 0.05,
            progress_cap: 0.95,
            defaults: ReportDefaults::default(),
        }
    }
}

impl Default for ReportDefaults {
    fn default() -> Self {
        Self {
            location: "Mianwali".to_string(),
            violation_type: "Traffic violation".to_string(),
            confidence: 85.0,
            status: ReportStatus::Submitted,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing, or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.storage.backing_key.trim().is_empty() {
            return Err(Error::config_validation("backing_key must not be empty"));
        }

        let submission = &self.submission;
        match reqwest::Url::parse(&submission.endpoint) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(Error::config_validation(format!(
                    "endpoint must use http or https, got scheme '{}'",
                    url.scheme()
                )));
            }
            Err(e) => {
                return Err(Error::config_validation(format!(
                    "invalid endpoint '{}': {e}",
                    submission.endpoint
                )));
            }
        }

        if submission.timeout_secs == 0 {
            return Err(Error::config_validation(
                "timeout_secs must be greater than 0",
            ));
        }

        if submission.progress_interval_ms == 0 {
            return Err(Error::config_validation(
                "progress_interval_ms must be greater than 0",
            ));
        }

        if !(submission.progress_step > 0.0 && submission.progress_step <= 1.0) {
            return Err(Error::config_validation(format!(
                "progress_step ({}) must be in (0, 1]",
                submission.progress_step
            )));
        }

        if !(submission.progress_cap > 0.0 && submission.progress_cap < 1.0) {
            return Err(Error::config_validation(format!(
                "progress_cap ({}) must be in (0, 1)",
                submission.progress_cap
            )));
        }

        if !submission.defaults.confidence.is_finite() {
            return Err(Error::config_validation(
                "defaults.confidence must be a finite number",
            ));
        }

        self.validate_assistant()
    }

    fn validate_assistant(&self) -> Result<()> {
        let assistant = &self.assistant;
        match reqwest::Url::parse(&assistant.endpoint) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => {
                return Err(Error::config_validation(format!(
                    "assistant.endpoint '{}' must be an http or https URL",
                    assistant.endpoint
                )));
            }
        }

        if assistant.model.trim().is_empty() {
            return Err(Error::config_validation("assistant.model must not be empty"));
        }

        if assistant.max_tokens == 0 {
            return Err(Error::config_validation(
                "assistant.max_tokens must be greater than 0",
            ));
        }

        if !(0.0..=2.0).contains(&assistant.temperature) {
            return Err(Error::config_validation(format!(
                "assistant.temperature ({}) must be in [0, 2]",
                assistant.temperature
            )));
        }

        if assistant.timeout_secs == 0 {
            return Err(Error::config_validation(
                "assistant.timeout_secs must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.submission.timeout_secs)
    }

    /// Get the assistant request timeout as a Duration.
    #[must_use]
    pub fn assistant_timeout(&self) -> Duration {
        Duration::from_secs(self.assistant.timeout_secs)
    }

    /// Get the progress interval as a Duration.
    #[must_use]
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.submission.progress_interval_ms)
    }
}
