//! Form configuration, read from TOML.
//!
//! ```toml
//! min_word_count = 3
//! assume_page_like = false
//! slug_suffix_limit = 100
//! ```
//!
//! Every key is optional; missing keys take their defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

///
/// FormConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormConfig {
    /// Minimum words required by long-text rules.
    pub min_word_count: usize,

    /// Treat a fresh submission as having liked the page.
    pub assume_page_like: bool,

    /// Highest numeric suffix tried when making a slug unique.
    pub slug_suffix_limit: u32,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            min_word_count: 3,
            assume_page_like: false,
            slug_suffix_limit: 100,
        }
    }
}

impl FormConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;

        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_word_count == 0 {
            return Err(ConfigError::Invalid(
                "min_word_count must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

///
/// TESTS
///
