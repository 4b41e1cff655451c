//! Assignment of events to workers.
//!
//! Every policy hands each event to exactly one worker, so the per-worker
//! subsets are pairwise disjoint and their union is the full input.

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Partitioning {
    /// Worker `i` takes the `i`-th block of `ceil(M / W)` consecutive events.
    #[default]
    Contiguous,
    /// Event `k` goes to worker `k % W`.
    RoundRobin,
}

/// Splits `items` into `workers` subsets. Some subsets may be empty when
/// there are fewer events than workers.
pub fn partition<T>(
    items: Vec<T>,
    workers: usize,
    policy: Partitioning,
) -> Result<Vec<Vec<T>>, ConfigError> {
    if workers == 0 {
        return Err(ConfigError::Workers(0));
    }

    let total = items.len();
    let mut parts: Vec<Vec<T>> = Vec::with_capacity(workers);
    match policy {
        Partitioning::Contiguous => {
            let block = total.div_ceil(workers).max(1);
            let mut items = items.into_iter();
            for _ in 0..workers {
                parts.push(items.by_ref().take(block).collect());
            }
        }
        Partitioning::RoundRobin => {
            parts.resize_with(workers, || Vec::with_capacity(total / workers + 1));
            for (index, item) in items.into_iter().enumerate() {
                parts[index % workers].push(item);
            }
        }
    }
    Ok(parts)
}
