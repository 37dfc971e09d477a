use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Option texts longer than this are cut and marked with "...".
    pub max_option_words: usize,
    /// (activity, axis) units in flight at once; 1 is strictly sequential.
    pub max_concurrent_units: usize,
    pub unit_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_option_words: 10,
            max_concurrent_units: 3,
            unit_timeout_secs: 120,
        }
    }
}

impl PipelineConfig {
    pub fn sequential() -> Self {
        Self {
            max_concurrent_units: 1,
            ..Self::default()
        }
    }

    /// Shorter options, for respondents on small screens.
    pub fn concise() -> Self {
        Self {
            max_option_words: 5,
            ..Self::default()
        }
    }

    pub fn unit_timeout(&self) -> Duration {
        Duration::from_secs(self.unit_timeout_secs)
    }

    pub fn concurrency(&self) -> usize {
        self.max_concurrent_units.max(1)
    }
}
