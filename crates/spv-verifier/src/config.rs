//! # Verifier Configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Headers at or below the checkpoint boundary are only obtainable in bulk
/// chunks of this many blocks.
pub const HEADER_CHUNK_SIZE: u64 = 2016;

/// SPV verifier configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpvConfig {
    /// Height of the network's checkpoint boundary. A missing header at or
    /// below this height triggers a chunk fetch instead of waiting for
    /// normal sync.
    pub checkpoint_height: u64,

    /// Interval between scheduler ticks, in seconds.
    pub tick_interval_secs: u64,

    /// Capacity of the proof-response completion channel.
    pub response_queue_depth: usize,
}

impl Default for SpvConfig {
    fn default() -> Self {
        Self {
            checkpoint_height: 0,
            tick_interval_secs: 1,
            response_queue_depth: 64,
        }
    }
}

impl SpvConfig {
    /// Create a config for testing (small values, a checkpoint region).
    pub fn for_testing() -> Self {
        Self {
            checkpoint_height: 2 * HEADER_CHUNK_SIZE,
            tick_interval_secs: 1,
            response_queue_depth: 8,
        }
    }

    /// Tick interval as a [`Duration`].
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SpvConfig::default();
        assert_eq!(config.checkpoint_height, 0);
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_testing_config() {
        let config = SpvConfig::for_testing();
        assert_eq!(config.checkpoint_height, 4032);
        assert_eq!(config.response_queue_depth, 8);
    }
}
