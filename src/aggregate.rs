//! Per-light car totals and the fold that builds them.

use ahash::AHashMap;
use serde::{Deserialize, Serialize, Serializer};
use tracing::warn;

use crate::error::OverflowError;
use crate::event::TrafficEvent;

/// Cumulative cars per light id.
///
/// On the wire this is a sequence of `(light_id, total)` pairs; repeated ids
/// are summed when decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<(i64, u64)>")]
pub struct AggregateMap {
    totals: AHashMap<i64, u64>,
}

impl AggregateMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from `(light_id, cars)` pairs, summing repeated ids.
    pub fn from_entries<I>(entries: I) -> Result<Self, OverflowError>
    where
        I: IntoIterator<Item = (i64, u64)>,
    {
        let mut map = AggregateMap::new();
        for (light_id, cars) in entries {
            map.add(light_id, cars)?;
        }
        Ok(map)
    }

    /// Adds `cars` to the running total for `light_id`, starting from zero.
    /// The map is left unchanged if the total would not fit in a `u64`.
    pub fn add(&mut self, light_id: i64, cars: u64) -> Result<(), OverflowError> {
        let total = self.totals.entry(light_id).or_insert(0);
        *total = total
            .checked_add(cars)
            .ok_or(OverflowError { light_id })?;
        Ok(())
    }

    /// Folds every entry of `other` into `self`. Either every entry is
    /// merged or, on overflow, none is.
    pub fn merge(&mut self, other: &AggregateMap) -> Result<(), OverflowError> {
        for (&light_id, &cars) in &other.totals {
            let current = self.get(light_id).unwrap_or(0);
            if current.checked_add(cars).is_none() {
                return Err(OverflowError { light_id });
            }
        }
        for (&light_id, &cars) in &other.totals {
            *self.totals.entry(light_id).or_insert(0) += cars;
        }
        Ok(())
    }

    pub fn get(&self, light_id: i64) -> Option<u64> {
        self.totals.get(&light_id).copied()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Sum of all totals. Widened so that many large per-light totals
    /// cannot overflow.
    pub fn total_cars(&self) -> u128 {
        self.totals.values().map(|&cars| u128::from(cars)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, u64)> + '_ {
        self.totals.iter().map(|(&id, &cars)| (id, cars))
    }
}

impl Serialize for AggregateMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl TryFrom<Vec<(i64, u64)>> for AggregateMap {
    type Error = OverflowError;

    fn try_from(entries: Vec<(i64, u64)>) -> Result<Self, Self::Error> {
        AggregateMap::from_entries(entries)
    }
}

/// What one worker produced from its partition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalAggregate {
    pub map: AggregateMap,
    /// Events dropped for carrying a negative car count.
    pub rejected: u64,
}

/// Folds a worker's events into its local map.
///
/// Negative readings are logged and skipped; a light whose total no longer
/// fits in a `u64` aborts the fold.
pub fn aggregate<I>(events: I) -> Result<LocalAggregate, OverflowError>
where
    I: IntoIterator<Item = TrafficEvent>,
{
    let mut local = LocalAggregate::default();
    for event in events {
        match u64::try_from(event.cars_passed) {
            Ok(cars) => local.map.add(event.light_id, cars)?,
            Err(_) => {
                warn!(
                    timestamp = %event.timestamp,
                    light_id = event.light_id,
                    cars_passed = event.cars_passed,
                    "rejecting event with negative car count"
                );
                local.rejected += 1;
            }
        }
    }
    Ok(local)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(i64, u64)]) -> AggregateMap {
        AggregateMap::from_entries(entries.iter().copied()).unwrap()
    }

    #[test]
    fn sums_per_light() {
        let local = aggregate(vec![
            TrafficEvent::new("t1", 1, 10),
            TrafficEvent::new("t2", 2, 30),
            TrafficEvent::new("t3", 1, 5),
        ])
        .unwrap();
        assert_eq!(local.map.get(1), Some(15));
        assert_eq!(local.map.get(2), Some(30));
        assert_eq!(local.map.get(3), None);
        assert_eq!(local.rejected, 0);
    }

    #[test]
    fn zero_count_still_creates_key() {
        let local = aggregate(vec![TrafficEvent::new("t", 4, 0)]).unwrap();
        assert_eq!(local.map.get(4), Some(0));
        assert_eq!(local.map.len(), 1);
    }

    #[test]
    fn negative_counts_are_rejected_not_fatal() {
        let local = aggregate(vec![
            TrafficEvent::new("t1", 1, -3),
            TrafficEvent::new("t2", 1, 8),
        ])
        .unwrap();
        assert_eq!(local.rejected, 1);
        assert_eq!(local.map.get(1), Some(8));
    }

    #[test]
    fn order_does_not_matter() {
        let events = vec![
            TrafficEvent::new("a", 1, 1),
            TrafficEvent::new("b", 2, 2),
            TrafficEvent::new("c", 1, 3),
        ];
        let forward = aggregate(events.clone()).unwrap();
        let backward = aggregate(events.into_iter().rev()).unwrap();
        assert_eq!(forward, backward);
    }

    #[test]
    fn merge_adds_overlapping_keys() {
        let mut left = map(&[(1, 10), (2, 30)]);
        left.merge(&map(&[(1, 5), (3, 30)])).unwrap();
        assert_eq!(left, map(&[(1, 15), (2, 30), (3, 30)]));
        assert_eq!(left.total_cars(), 75);
    }

    #[test]
    fn two_max_readings_fit_in_one_light() {
        let local = aggregate(vec![
            TrafficEvent::new("a", 1, i64::MAX),
            TrafficEvent::new("b", 1, i64::MAX),
        ])
        .unwrap();
        assert_eq!(local.map.get(1), Some(2 * i64::MAX as u64));
    }

    #[test]
    fn light_total_overflow_is_an_error() {
        let err = aggregate(vec![
            TrafficEvent::new("a", 7, i64::MAX),
            TrafficEvent::new("b", 7, i64::MAX),
            TrafficEvent::new("c", 7, i64::MAX),
        ])
        .unwrap_err();
        assert_eq!(err, OverflowError { light_id: 7 });
    }

    #[test]
    fn add_leaves_total_untouched_on_overflow() {
        let mut totals = map(&[(1, u64::MAX - 1)]);
        assert_eq!(totals.add(1, 2), Err(OverflowError { light_id: 1 }));
        assert_eq!(totals.get(1), Some(u64::MAX - 1));
    }

    #[test]
    fn merge_overflow_changes_nothing() {
        let mut left = map(&[(1, 5), (2, u64::MAX)]);
        let before = left.clone();
        let err = left.merge(&map(&[(1, 5), (2, 1)])).unwrap_err();
        assert_eq!(err, OverflowError { light_id: 2 });
        assert_eq!(left, before);
    }

    #[test]
    fn grand_total_exceeds_u64_without_wrapping() {
        let totals = map(&[(1, u64::MAX), (2, u64::MAX), (3, u64::MAX)]);
        assert_eq!(totals.total_cars(), 3 * u128::from(u64::MAX));
    }

    #[test]
    fn from_entries_sums_repeated_ids() {
        let totals = map(&[(4, 1), (4, 2)]);
        assert_eq!(totals.get(4), Some(3));
        assert_eq!(
            AggregateMap::from_entries([(4, u64::MAX), (4, 1)]),
            Err(OverflowError { light_id: 4 })
        );
    }
}
