//! Engine configuration with TOML file support.
//!
//! These are node-local settings. Consensus-relevant values live in
//! [`Params`](crate::params::Params) and change only through proposals.

use serde::{Deserialize, Serialize};

use agora_utils::LogFormat;

use crate::GovernanceError;

/// Configuration for the governance engine.
///
/// Can be loaded from a TOML file via [`GovConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovConfig {
    /// Maximum length of proposal, vote and governor metadata.
    #[serde(default = "default_max_metadata_len")]
    pub max_metadata_len: usize,

    /// Maximum length of a proposal title.
    #[serde(default = "default_max_title_len")]
    pub max_title_len: usize,

    /// Maximum length of a proposal summary.
    #[serde(default = "default_max_summary_len")]
    pub max_summary_len: usize,

    /// Let a validator's vote carry the shares of delegators who neither
    /// voted nor are represented by a voting governor.
    #[serde(default)]
    pub validator_inheritance: bool,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_max_metadata_len() -> usize {
    255
}

fn default_max_title_len() -> usize {
    140
}

fn default_max_summary_len() -> usize {
    10_000
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl GovConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, GovernanceError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| GovernanceError::InvalidConfig(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, GovernanceError> {
        let config: Self =
            toml::from_str(s).map_err(|e| GovernanceError::InvalidConfig(e.to_string()))?;
        config.log_format()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, GovernanceError> {
        toml::to_string_pretty(self).map_err(|e| GovernanceError::InvalidConfig(e.to_string()))
    }

    /// The parsed log format.
    pub fn log_format(&self) -> Result<LogFormat, GovernanceError> {
        self.log_format
            .parse()
            .map_err(|e: agora_utils::LoggingError| GovernanceError::InvalidConfig(e.to_string()))
    }

    /// Install the global tracing subscriber with the configured format
    /// and level.
    pub fn init_logging(&self) -> Result<(), GovernanceError> {
        agora_utils::init_logging(self.log_format()?, &self.log_level)
            .map_err(|e| GovernanceError::InvalidConfig(e.to_string()))
    }
}

impl Default for GovConfig {
    fn default() -> Self {
        Self {
            max_metadata_len: default_max_metadata_len(),
            max_title_len: default_max_title_len(),
            max_summary_len: default_max_summary_len(),
            validator_inheritance: false,
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}
