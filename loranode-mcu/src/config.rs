//! Deployment constants
//!
//! Defaults match the field deployment (EU868, SF7 uplinks, one minute
//! polling). Board crates can override any subset from JSON, typically
//! embedded with `include_str!`.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::radio::Band;

/// Shortest line that still fits `AT+K=` and a 32 digit key
pub const MIN_LINE_LEN: usize = 37;
pub const MAX_LINE_LEN: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Wait between a modem request and reading its reply
    pub nvm_settle_ms: u32,
    /// Console poll interval while provisioning
    pub console_poll_ms: u32,
    /// Longest accepted console line, terminator excluded
    pub max_line_len: usize,
    /// Consecutive send failures tolerated before the link is dropped
    pub failure_threshold: u32,
    /// Pause after a failed send
    pub failure_backoff_ms: u32,
    /// Pause after a successful join, before the first uplink
    pub join_settle_ms: u32,
    pub poll_interval_secs: u32,
    pub data_rate: u8,
    pub band: Band,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            nvm_settle_ms: 100,
            console_poll_ms: 100,
            max_line_len: 200,
            failure_threshold: 50,
            failure_backoff_ms: 1000,
            join_settle_ms: 100,
            poll_interval_secs: 60,
            data_rate: 5,
            band: Band::Eu868,
        }
    }
}

impl NodeConfig {
    /// Parse a JSON document; absent fields keep their defaults
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_LINE_LEN..=MAX_LINE_LEN).contains(&self.max_line_len) {
            return Err(ConfigError::LineLength {
                value: self.max_line_len,
                min: MIN_LINE_LEN,
                max: MAX_LINE_LEN,
            });
        }
        Ok(())
    }
}
