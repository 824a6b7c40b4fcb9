//! Scanner configuration.
//!
//! Loaded from an optional TOML file; every key may be omitted.
//!
//! ```toml
//! display_limit = 32
//! converge_at = 1
//! max_rounds = 0
//! min_string_len = 4
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Addresses are listed once the surviving count drops to this many
    pub display_limit: usize,
    /// A session converges when at most this many candidates remain
    pub converge_at: usize,
    /// Stop prompting after this many rounds (0 = unlimited)
    pub max_rounds: u32,
    /// Minimum run length for printable-string extraction
    pub min_string_len: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            display_limit: 32,
            converge_at: 1,
            max_rounds: 0,
            min_string_len: 4,
        }
    }
}

impl ScanConfig {
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_toml(&text)?;
        debug!("Loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: ScanConfig = toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.min_string_len == 0 {
            return Err(Error::Config("min_string_len must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Builder for [`ScanConfig`]
#[derive(Debug, Clone, Default)]
pub struct ScanConfigBuilder {
    display_limit: Option<usize>,
    converge_at: Option<usize>,
    max_rounds: Option<u32>,
    min_string_len: Option<usize>,
}

impl ScanConfigBuilder {
    pub fn display_limit(mut self, limit: usize) -> Self {
        self.display_limit = Some(limit);
        self
    }

    pub fn converge_at(mut self, count: usize) -> Self {
        self.converge_at = Some(count);
        self
    }

    pub fn max_rounds(mut self, rounds: u32) -> Self {
        self.max_rounds = Some(rounds);
        self
    }

    pub fn min_string_len(mut self, len: usize) -> Self {
        self.min_string_len = Some(len);
        self
    }

    pub fn build(self) -> ScanConfig {
        let default = ScanConfig::default();
        ScanConfig {
            display_limit: self.display_limit.unwrap_or(default.display_limit),
            converge_at: self.converge_at.unwrap_or(default.converge_at),
            max_rounds: self.max_rounds.unwrap_or(default.max_rounds),
            min_string_len: self
                .min_string_len
                .unwrap_or(default.min_string_len)
                .max(1),
        }
    }
}
