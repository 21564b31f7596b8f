//! Configuration for the Lispy front end
//!
//! Settings are read from a TOML file; every field is optional and falls back
//! to its default.
//!
//! ```toml
//! prompt = "lispy> "
//! show_timing = true
//! float_digits = 20
//! log_filter = "lispy=debug"
//! history_file = ".lispy_history"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplConfig {
    /// Prompt shown before each interactive input
    pub prompt: String,
    /// Print elapsed time after each evaluated form
    pub show_timing: bool,
    /// Fractional digits used when printing floats
    pub float_digits: usize,
    /// `tracing` filter directive, used when `RUST_LOG` is unset
    pub log_filter: String,
    pub history_file: Option<PathBuf>,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            prompt: "lispy> ".to_string(),
            show_timing: false,
            float_digits: crate::runtime::values::DEFAULT_FLOAT_DIGITS,
            log_filter: "warn".to_string(),
            history_file: None,
        }
    }
}

impl ReplConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Create a configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}
