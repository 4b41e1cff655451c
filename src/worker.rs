//! The worker fleet: scatter partitions, aggregate locally, gather at the
//! coordinator.
//!
//! Workers only ever see encoded frames. Submissions travel over a
//! rendezvous channel, so a worker's `send` returns once the coordinator has
//! taken its frame.

use crossbeam_channel::{bounded, Sender};
use rayon::ThreadPoolBuilder;
use tracing::{debug, error, info, warn};

use crate::aggregate::aggregate;
use crate::config::Config;
use crate::coordinator::Coordinator;
use crate::error::{Error, WorkerError};
use crate::event::parse_events;
use crate::partition::partition;
use crate::report::Report;
use crate::wire::{self, Partition, Submission};

/// What a worker hands back: its rank and either a submission frame or the
/// reason it has none.
type WorkerMessage = (usize, Result<Vec<u8>, WorkerError>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub report: Report,
    /// Well-formed events read from the input.
    pub events: usize,
    /// Malformed lines dropped by the parser.
    pub skipped: usize,
}

/// Turns one partition frame into the matching submission frame.
pub fn process_partition(frame: &[u8]) -> Result<Vec<u8>, WorkerError> {
    let partition = wire::decode_partition(frame)?;
    let rank = partition.rank;
    let events = partition.events.len();

    let local = aggregate(partition.events)?;
    debug!(
        rank,
        events,
        lights = local.map.len(),
        rejected = local.rejected,
        "local aggregation finished"
    );
    Ok(wire::encode_submission(&Submission { rank, local })?)
}

fn worker_main(rank: usize, frame: Vec<u8>, submissions: Sender<WorkerMessage>) {
    let result = process_partition(&frame);
    if let Err(err) = &result {
        error!(rank, %err, "worker failed");
    }
    if submissions.send((rank, result)).is_err() {
        warn!(rank, "coordinator stopped before accepting submission");
    }
}

/// Runs the full pipeline over `input` with `config.workers` workers.
pub fn run(config: &Config, input: &[u8]) -> Result<RunOutcome, Error> {
    let batch = parse_events(input);
    let events = batch.events.len();
    info!(events, skipped = batch.skipped, "parsed input");

    let parts = partition(batch.events, config.workers, config.partitioning)?;
    let frames = parts
        .into_iter()
        .enumerate()
        .map(|(rank, events)| wire::encode_partition(&Partition { rank, events }))
        .collect::<Result<Vec<_>, _>>()?;

    let pool = ThreadPoolBuilder::new()
        .num_threads(config.workers)
        .thread_name(|i| format!("worker-{i}"))
        .panic_handler(|_| error!("worker panicked"))
        .build()?;

    let (tx, rx) = bounded::<WorkerMessage>(0);
    for (rank, frame) in frames.into_iter().enumerate() {
        let tx = tx.clone();
        pool.spawn(move || worker_main(rank, frame, tx));
    }
    // Only workers hold senders now; `recv` fails once they are all gone.
    drop(tx);

    let mut coordinator = Coordinator::new(config.workers, config.top_n);
    for received in 0..config.workers {
        let (rank, result) = rx.recv().map_err(|_| Error::WorkersGone {
            received,
            expected: config.workers,
        })?;
        let frame = result.map_err(|source| Error::Worker { rank, source })?;
        let submission = wire::decode_submission(&frame)?;
        coordinator.submit(submission.rank, submission.local)?;
    }
    let report = coordinator.finish()?;

    info!(
        workers = config.workers,
        lights = coordinator.global().len(),
        total_cars = %report.total_cars,
        rejected = report.rejected,
        "global merge complete"
    );

    Ok(RunOutcome {
        report,
        events,
        skipped: batch.skipped,
    })
}
