//! Partitioned aggregation of traffic-light sensor readings.
//!
//! Input lines (`<timestamp> <light_id> <cars_passed>`) are parsed, split
//! into disjoint partitions, aggregated per worker, merged on a coordinator
//! behind a full barrier, and reduced to the N busiest lights.

pub mod aggregate;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod event;
pub mod partition;
pub mod report;
pub mod source;
pub mod topn;
pub mod wire;
pub mod worker;

pub use aggregate::{aggregate, AggregateMap, LocalAggregate};
pub use config::Config;
pub use coordinator::{merge_maps, Coordinator, Phase};
pub use error::{
    ConfigError, Error, OverflowError, ParseError, ProtocolError, Result, WireError, WorkerError,
};
pub use event::{parse_events, ParsedBatch, TrafficEvent};
pub use partition::{partition, Partitioning};
pub use report::{Report, Sink, View};
pub use topn::{top_n, RankedEntry, TopNList};
pub use worker::{run, RunOutcome};
