//! Deterministic selection of the busiest lights.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::aggregate::AggregateMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedEntry {
    pub light_id: i64,
    pub total_cars: u64,
}

impl RankedEntry {
    pub fn new(light_id: i64, total_cars: u64) -> Self {
        Self {
            light_id,
            total_cars,
        }
    }
}

// Greater means ranked earlier: more cars first, then the lower light id.
impl Ord for RankedEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.total_cars
            .cmp(&other.total_cars)
            .then_with(|| other.light_id.cmp(&self.light_id))
    }
}

impl PartialOrd for RankedEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Ranked entries, best first.
pub type TopNList = Vec<RankedEntry>;

/// Returns at most `n` entries of `map` ordered by total cars descending,
/// ties broken by ascending light id.
///
/// Keeps a min-heap bounded to `n`, so the work is `O(len * log n)`.
pub fn top_n(map: &AggregateMap, n: usize) -> TopNList {
    if n == 0 {
        return Vec::new();
    }

    let mut heap = BinaryHeap::with_capacity(n.min(map.len()) + 1);
    for (light_id, total_cars) in map.iter() {
        heap.push(Reverse(RankedEntry::new(light_id, total_cars)));
        if heap.len() > n {
            heap.pop();
        }
    }

    // Ascending order of Reverse is descending rank.
    heap.into_sorted_vec()
        .into_iter()
        .map(|Reverse(entry)| entry)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn map(entries: &[(i64, u64)]) -> AggregateMap {
        AggregateMap::from_entries(entries.iter().copied()).unwrap()
    }

    #[test]
    fn orders_by_count_then_id() {
        let list = top_n(&map(&[(1, 15), (3, 30), (2, 30)]), 2);
        assert_eq!(list, vec![RankedEntry::new(2, 30), RankedEntry::new(3, 30)]);
    }

    #[test]
    fn n_larger_than_map_returns_everything() {
        let list = top_n(&map(&[(9, 1), (4, 7)]), 10);
        assert_eq!(list, vec![RankedEntry::new(4, 7), RankedEntry::new(9, 1)]);
    }

    #[test]
    fn empty_map_gives_empty_list() {
        assert!(top_n(&AggregateMap::new(), 5).is_empty());
    }

    #[test]
    fn negative_ids_sort_before_positive_on_ties() {
        let list = top_n(&map(&[(5, 2), (-5, 2), (0, 2)]), 3);
        let ids: Vec<i64> = list.iter().map(|e| e.light_id).collect();
        assert_eq!(ids, vec![-5, 0, 5]);
    }

    proptest! {
        #[test]
        fn matches_full_sort(
            entries in prop::collection::vec((-50i64..50, 0u64..20), 0..100),
            n in 1usize..12,
        ) {
            let map = map(&entries);
            let mut expected: Vec<RankedEntry> =
                map.iter().map(|(id, cars)| RankedEntry::new(id, cars)).collect();
            expected.sort_by(|a, b| b.cmp(a));
            expected.truncate(n);

            let list = top_n(&map, n);
            prop_assert_eq!(list.len(), n.min(map.len()));
            prop_assert_eq!(&list, &expected);
            prop_assert_eq!(list, top_n(&map, n));
        }
    }
}
