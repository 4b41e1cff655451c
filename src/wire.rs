//! Byte frames exchanged between the coordinator and the workers.
//!
//! Frames are bincode with fixed-width little-endian integers; strings and
//! sequences carry a `u64` length prefix. Trailing bytes are rejected.

use bincode::Options;
use serde::{Deserialize, Serialize};

use crate::aggregate::LocalAggregate;
use crate::error::WireError;
use crate::event::TrafficEvent;

/// A worker's share of the input, as sent to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    pub rank: usize,
    pub events: Vec<TrafficEvent>,
}

/// A worker's local result, as sent back to the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub rank: usize,
    pub local: LocalAggregate,
}

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .reject_trailing_bytes()
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, WireError> {
    options().serialize(value).map_err(WireError::Encode)
}

fn decode<'a, T: Deserialize<'a>>(frame: &'a [u8]) -> Result<T, WireError> {
    options().deserialize(frame).map_err(WireError::Decode)
}

pub fn encode_partition(partition: &Partition) -> Result<Vec<u8>, WireError> {
    encode(partition)
}

pub fn decode_partition(frame: &[u8]) -> Result<Partition, WireError> {
    decode(frame)
}

pub fn encode_submission(submission: &Submission) -> Result<Vec<u8>, WireError> {
    encode(submission)
}

pub fn decode_submission(frame: &[u8]) -> Result<Submission, WireError> {
    decode(frame)
}
