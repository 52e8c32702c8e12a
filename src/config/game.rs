//! Game connection timing configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Deadlines and keep-alive period for player connections
///
/// The read deadline is long so players can think between moves; the write
/// deadline is short so a dead peer is noticed without stalling a broadcast.
#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    /// Maximum idle time between inbound messages, in seconds
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,

    /// Maximum time a single outbound write may take, in seconds
    #[serde(default = "default_write_timeout")]
    pub write_timeout_secs: u64,

    /// Period between keep-alive pings, in seconds
    #[serde(default = "default_keepalive_interval")]
    pub keepalive_interval_secs: u64,
}

impl GameConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }

    pub fn keepalive_interval(&self) -> Duration {
        Duration::from_secs(self.keepalive_interval_secs)
    }

    /// Validate game configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.read_timeout_secs == 0 {
            return Err(ValidationError::ZeroTimeout("read_timeout_secs"));
        }
        if self.write_timeout_secs == 0 {
            return Err(ValidationError::ZeroTimeout("write_timeout_secs"));
        }
        if self.keepalive_interval_secs == 0 {
            return Err(ValidationError::ZeroTimeout("keepalive_interval_secs"));
        }
        if self.write_timeout_secs >= self.read_timeout_secs {
            return Err(ValidationError::WriteTimeoutTooLong);
        }
        if self.keepalive_interval_secs >= self.read_timeout_secs {
            return Err(ValidationError::KeepaliveTooSlow);
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            read_timeout_secs: default_read_timeout(),
            write_timeout_secs: default_write_timeout(),
            keepalive_interval_secs: default_keepalive_interval(),
        }
    }
}

fn default_read_timeout() -> u64 {
    300
}

fn default_write_timeout() -> u64 {
    10
}

fn default_keepalive_interval() -> u64 {
    30
}
