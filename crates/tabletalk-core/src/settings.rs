//! Engine settings (tabletalk.toml)

use serde::{Deserialize, Serialize};

/// Default character budget for skill digests
pub const DEFAULT_DIGEST_MAX_CHARS: usize = 1200;

/// Default number of filters shown per digest section
pub const DEFAULT_DIGEST_MAX_FILTERS: usize = 5;

/// Default number of metrics shown per digest section
pub const DEFAULT_DIGEST_MAX_METRICS: usize = 5;

/// Default row cap applied to row-level queries
pub const DEFAULT_ROW_CAP: usize = 200;

/// Default timeout for the model-client classification fallback
pub const DEFAULT_MODEL_TIMEOUT_MS: u64 = 3000;

/// Rule-classifier confidence below which the model fallback is consulted
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.6;

/// Digest rendering budgets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigestSettings {
    /// Hard character budget for a rendered digest
    #[serde(default = "default_digest_max_chars")]
    pub max_chars: usize,

    /// Filters kept per section before the `+K more` marker
    #[serde(default = "default_digest_max_filters")]
    pub max_filters: usize,

    /// Metrics kept per section before the `+K more` marker
    #[serde(default = "default_digest_max_metrics")]
    pub max_metrics: usize,
}

impl Default for DigestSettings {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_DIGEST_MAX_CHARS,
            max_filters: DEFAULT_DIGEST_MAX_FILTERS,
            max_metrics: DEFAULT_DIGEST_MAX_METRICS,
        }
    }
}

/// Main settings structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Digest budgets
    #[serde(default)]
    pub digest: DigestSettings,

    /// Row cap for row-level (non-aggregate) queries
    #[serde(default = "default_row_cap")]
    pub row_cap: usize,

    /// Timeout for the model classification fallback, in milliseconds
    #[serde(default = "default_model_timeout_ms")]
    pub model_timeout_ms: u64,

    /// Rule-classifier confidence below which the model fallback runs
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,
}

fn default_digest_max_chars() -> usize {
    DEFAULT_DIGEST_MAX_CHARS
}

fn default_digest_max_filters() -> usize {
    DEFAULT_DIGEST_MAX_FILTERS
}

fn default_digest_max_metrics() -> usize {
    DEFAULT_DIGEST_MAX_METRICS
}

fn default_row_cap() -> usize {
    DEFAULT_ROW_CAP
}

fn default_model_timeout_ms() -> u64 {
    DEFAULT_MODEL_TIMEOUT_MS
}

fn default_confidence_threshold() -> f32 {
    DEFAULT_CONFIDENCE_THRESHOLD
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            digest: DigestSettings::default(),
            row_cap: DEFAULT_ROW_CAP,
            model_timeout_ms: DEFAULT_MODEL_TIMEOUT_MS,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, SettingsError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| SettingsError::IoError(e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load settings from a TOML string
    pub fn from_toml(toml: &str) -> Result<Self, SettingsError> {
        toml::from_str(toml).map_err(|e| SettingsError::ParseError(e.to_string()))
    }

    /// Save settings to a TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), SettingsError> {
        let toml =
            toml::to_string_pretty(self).map_err(|e| SettingsError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml).map_err(|e| SettingsError::IoError(e.to_string()))?;

        Ok(())
    }
}

/// Settings error types
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
