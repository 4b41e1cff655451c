use crate::error::ConfigError;
use crate::partition::Partitioning;

pub const DEFAULT_TOP_N: usize = 5;

/// Validated settings for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub top_n: usize,
    pub workers: usize,
    pub partitioning: Partitioning,
}

impl Config {
    /// Values arrive signed so that zero and negative input is reported here
    /// rather than as an opaque parse failure.
    pub fn new(top_n: i64, workers: i64) -> Result<Self, ConfigError> {
        if workers <= 0 {
            return Err(ConfigError::Workers(workers));
        }
        if top_n <= 0 {
            return Err(ConfigError::TopN(top_n));
        }
        Ok(Self {
            top_n: top_n as usize,
            workers: workers as usize,
            partitioning: Partitioning::default(),
        })
    }

    pub fn with_partitioning(mut self, partitioning: Partitioning) -> Self {
        self.partitioning = partitioning;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            workers: rayon::current_num_threads().max(1),
            partitioning: Partitioning::default(),
        }
    }
}
