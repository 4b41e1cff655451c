//! Sensor events and the line parser that produces them.

use memchr::memchr_iter;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ParseError;

/// One sensor reading: how many cars passed a light at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficEvent {
    pub timestamp: String,
    pub light_id: i64,
    /// Signed as read; the aggregator rejects negative readings.
    pub cars_passed: i64,
}

impl TrafficEvent {
    pub fn new(timestamp: impl Into<String>, light_id: i64, cars_passed: i64) -> Self {
        Self {
            timestamp: timestamp.into(),
            light_id,
            cars_passed,
        }
    }
}

/// Result of parsing a whole input buffer.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedBatch {
    pub events: Vec<TrafficEvent>,
    /// Malformed lines that were dropped.
    pub skipped: usize,
}

/// Parses a single line. `line_no` is only used for diagnostics.
///
/// Returns `Ok(None)` for blank lines. Tokens past the third are ignored.
pub fn parse_line(line: &[u8], line_no: usize) -> Result<Option<TrafficEvent>, ParseError> {
    let mut fields = line
        .split(|b| b.is_ascii_whitespace())
        .filter(|field| !field.is_empty());

    let Some(timestamp) = fields.next() else {
        return Ok(None);
    };
    let timestamp = std::str::from_utf8(timestamp).map_err(|_| ParseError {
        line: line_no,
        reason: "timestamp is not valid UTF-8".to_string(),
    })?;
    let light_id = parse_int(fields.next(), "light id", line_no)?;
    let cars_passed = parse_int(fields.next(), "cars passed", line_no)?;

    Ok(Some(TrafficEvent::new(timestamp, light_id, cars_passed)))
}

fn parse_int(field: Option<&[u8]>, name: &str, line_no: usize) -> Result<i64, ParseError> {
    let field = field.ok_or_else(|| ParseError {
        line: line_no,
        reason: format!("missing {name}"),
    })?;
    lexical_core::parse::<i64>(field).map_err(|_| ParseError {
        line: line_no,
        reason: format!("invalid {name} '{}'", String::from_utf8_lossy(field)),
    })
}

/// Parses every line of `input`, skipping (and logging) malformed ones.
pub fn parse_events(input: &[u8]) -> ParsedBatch {
    let mut batch = ParsedBatch::default();
    let mut start = 0;
    let mut line_no = 0;

    let ends = memchr_iter(b'\n', input).chain(std::iter::once(input.len()));
    for end in ends {
        line_no += 1;
        let line = &input[start..end];
        start = end + 1;

        match parse_line(line, line_no) {
            Ok(Some(event)) => batch.events.push(event),
            Ok(None) => {}
            Err(err) => {
                warn!(%err, "skipping malformed line");
                batch.skipped += 1;
            }
        }
    }
    batch
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_line() {
        let event = parse_line(b"2024-01-01T08:00 7 42", 1).unwrap().unwrap();
        assert_eq!(event, TrafficEvent::new("2024-01-01T08:00", 7, 42));
    }

    #[test]
    fn ignores_extra_tokens_and_carriage_return() {
        let event = parse_line(b"t1\t3   9 trailing junk\r", 1).unwrap().unwrap();
        assert_eq!(event, TrafficEvent::new("t1", 3, 9));
    }

    #[test]
    fn blank_line_is_not_an_event() {
        assert_eq!(parse_line(b"   \r", 4), Ok(None));
        assert_eq!(parse_line(b"", 4), Ok(None));
    }

    #[test]
    fn negative_cars_still_parse() {
        let event = parse_line(b"t 1 -4", 1).unwrap().unwrap();
        assert_eq!(event.cars_passed, -4);
    }

    #[test]
    fn reports_missing_and_invalid_fields() {
        let err = parse_line(b"t1 5", 9).unwrap_err();
        assert_eq!(err.line, 9);
        assert!(err.reason.contains("cars passed"));

        let err = parse_line(b"t1 five 3", 2).unwrap_err();
        assert!(err.reason.contains("light id"));
    }

    #[test]
    fn batch_counts_skipped_lines() {
        let input = b"t1 1 10\nbroken\n\nt2 2 30\nt3 x 1\nt4 3 5";
        let batch = parse_events(input);
        assert_eq!(batch.skipped, 2);
        assert_eq!(
            batch.events,
            vec![
                TrafficEvent::new("t1", 1, 10),
                TrafficEvent::new("t2", 2, 30),
                TrafficEvent::new("t4", 3, 5),
            ]
        );
    }

    #[test]
    fn trailing_newline_adds_nothing() {
        let batch = parse_events(b"t1 1 10\n");
        assert_eq!(batch.events.len(), 1);
        assert_eq!(batch.skipped, 0);
    }

    #[test]
    fn empty_input_is_empty_batch() {
        assert_eq!(parse_events(b""), ParsedBatch::default());
    }
}
