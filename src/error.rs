//! Error taxonomy.
//!
//! Only [`ParseError`] is recovered from: a malformed line is logged and
//! skipped. Every other kind aborts the run.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors surfaced by a run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot read input file {path}: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write output {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error("global merge failed: {0}")]
    Overflow(#[from] OverflowError),

    #[error("worker {rank} failed: {source}")]
    Worker {
        rank: usize,
        #[source]
        source: WorkerError,
    },

    #[error("workers exited after {received} of {expected} submissions")]
    WorkersGone { received: usize, expected: usize },

    #[error("cannot start worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// One input line that could not be turned into an event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {reason}")]
pub struct ParseError {
    /// 1-based line number in the input.
    pub line: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("worker count must be positive, got {0}")]
    Workers(i64),

    #[error("top-N size must be positive, got {0}")]
    TopN(i64),
}

/// Misuse of the coordinator's submission protocol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("rank {rank} is outside the fleet of {workers} workers")]
    UnknownRank { rank: usize, workers: usize },

    #[error("rank {0} submitted twice")]
    DuplicateSubmission(usize),

    #[error("submission from rank {0} arrived after the merge barrier")]
    LateSubmission(usize),

    #[error("result requested while still collecting ({received} of {expected} submissions)")]
    NotReady { received: usize, expected: usize },

    #[error("result already reported")]
    AlreadyReported,
}

/// A car total that no longer fits in a `u64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("car total for traffic light {light_id} exceeds {}", u64::MAX)]
pub struct OverflowError {
    pub light_id: i64,
}

#[derive(Debug, Error)]
pub enum WireError {
    #[error("cannot encode frame: {0}")]
    Encode(#[source] bincode::Error),

    #[error("cannot decode frame: {0}")]
    Decode(#[source] bincode::Error),
}

/// Why a worker could not produce its submission.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error(transparent)]
    Wire(#[from] WireError),

    #[error(transparent)]
    Overflow(#[from] OverflowError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
