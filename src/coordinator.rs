//! Global merge of local aggregates behind a full barrier.
//!
//! ```text
//! Collecting(k) --submit--> Collecting(k + 1) --...--> Ready --finish--> Reported
//! ```
//!
//! The selector runs exactly once, on the W-th submission. Submissions after
//! that point, duplicate ranks, and unknown ranks are protocol errors. A
//! submission whose merge would overflow a light's total is refused whole.

use tracing::debug;

use crate::aggregate::{AggregateMap, LocalAggregate};
use crate::error::{Error, OverflowError, ProtocolError};
use crate::report::Report;
use crate::topn::{top_n, TopNList};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Collecting { received: usize },
    Ready,
    Reported,
}

#[derive(Debug)]
pub struct Coordinator {
    workers: usize,
    top_n: usize,
    phase: Phase,
    global: AggregateMap,
    submitted: Vec<bool>,
    per_worker: Vec<TopNList>,
    rejected: u64,
    result: TopNList,
}

impl Coordinator {
    pub fn new(workers: usize, top_n: usize) -> Self {
        Self {
            workers,
            top_n,
            phase: Phase::Collecting { received: 0 },
            global: AggregateMap::new(),
            submitted: vec![false; workers],
            per_worker: vec![Vec::new(); workers],
            rejected: 0,
            result: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The merged map. Complete only once the phase is `Ready`.
    pub fn global(&self) -> &AggregateMap {
        &self.global
    }

    /// Folds one worker's local aggregate into the global map.
    pub fn submit(&mut self, rank: usize, local: LocalAggregate) -> Result<(), Error> {
        let Phase::Collecting { received } = self.phase else {
            return Err(ProtocolError::LateSubmission(rank).into());
        };
        if rank >= self.workers {
            return Err(ProtocolError::UnknownRank {
                rank,
                workers: self.workers,
            }
            .into());
        }
        if self.submitted[rank] {
            return Err(ProtocolError::DuplicateSubmission(rank).into());
        }

        self.global.merge(&local.map)?;
        self.submitted[rank] = true;
        self.per_worker[rank] = top_n(&local.map, self.top_n);
        self.rejected += local.rejected;

        let received = received + 1;
        debug!(
            rank,
            received,
            expected = self.workers,
            lights = local.map.len(),
            "merged local aggregate"
        );

        if received == self.workers {
            self.result = top_n(&self.global, self.top_n);
            self.phase = Phase::Ready;
        } else {
            self.phase = Phase::Collecting { received };
        }
        Ok(())
    }

    /// Hands out the final result. Valid exactly once, after the barrier.
    pub fn finish(&mut self) -> Result<Report, ProtocolError> {
        match self.phase {
            Phase::Collecting { received } => Err(ProtocolError::NotReady {
                received,
                expected: self.workers,
            }),
            Phase::Reported => Err(ProtocolError::AlreadyReported),
            Phase::Ready => {
                self.phase = Phase::Reported;
                Ok(Report {
                    global: std::mem::take(&mut self.result),
                    per_worker: std::mem::take(&mut self.per_worker),
                    total_cars: self.global.total_cars(),
                    rejected: self.rejected,
                })
            }
        }
    }
}

/// Collective reduce over local maps, in whatever order they are given.
pub fn merge_maps<'a, I>(locals: I) -> Result<AggregateMap, OverflowError>
where
    I: IntoIterator<Item = &'a AggregateMap>,
{
    let mut global = AggregateMap::new();
    for local in locals {
        global.merge(local)?;
    }
    Ok(global)
}
