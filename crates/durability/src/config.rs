//! Logger configuration.

use segwal_core::{Error, Result, DEFAULT_SEGMENT_CAPACITY};

/// Logger configuration parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    /// Capacity of each segment in raw bytes (default: 16MB).
    ///
    /// When the active segment cannot take another payload it is flushed to
    /// the sink and a new one with this capacity takes its place. A single
    /// payload larger than this is rejected outright.
    pub segment_capacity: u64,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        LoggerConfig {
            segment_capacity: DEFAULT_SEGMENT_CAPACITY,
        }
    }
}

impl LoggerConfig {
    /// Create a new logger configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set segment capacity (builder pattern).
    pub fn with_segment_capacity(mut self, capacity: u64) -> Self {
        self.segment_capacity = capacity;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.segment_capacity == 0 {
            return Err(Error::InvalidConfig(
                "segment capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Create a configuration for testing (small segments).
    pub fn for_testing() -> Self {
        LoggerConfig {
            segment_capacity: 4 * 1024, // 4KB for frequent rotation in tests
        }
    }
}
