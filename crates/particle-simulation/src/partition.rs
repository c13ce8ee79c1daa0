//! Static assignment of particle index ranges to workers

use std::ops::Range;

/// Contiguous, half-open slice `[start, end)` of the particle array
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Partition {
    pub start: usize,
    pub end: usize,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Split `total` particles across `workers` ranges
///
/// Every worker gets `total / workers` particles; the last one also takes the
/// remainder so the union is exactly `[0, total)`. When there are more workers
/// than particles the leading ranges are empty.
pub fn partition(total: usize, workers: usize) -> Vec<Partition> {
    if workers == 0 {
        return Vec::new();
    }

    let chunk = total / workers;
    (0..workers)
        .map(|i| {
            let start = chunk * i;
            let end = if i + 1 == workers { total } else { start + chunk };
            Partition { start, end }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_even_split() {
        let parts = partition(4, 2);
        assert_eq!(parts, vec![Partition { start: 0, end: 2 }, Partition { start: 2, end: 4 }]);
    }

    #[test]
    fn test_last_worker_takes_remainder() {
        let parts = partition(10, 3);
        assert_eq!(parts[0].range(), 0..3);
        assert_eq!(parts[1].range(), 3..6);
        assert_eq!(parts[2].range(), 6..10);
    }

    #[test]
    fn test_more_workers_than_particles() {
        let parts = partition(2, 5);
        assert!(parts[..4].iter().all(Partition::is_empty));
        assert_eq!(parts[4].range(), 0..2);
    }

    proptest! {
        #[test]
        fn partitions_cover_every_index_once(total in 1usize..20_000, workers in 1usize..64) {
            let parts = partition(total, workers);
            prop_assert_eq!(parts.len(), workers);

            let mut next = 0;
            for part in &parts {
                prop_assert_eq!(part.start, next);
                prop_assert!(part.start <= part.end);
                next = part.end;
            }
            prop_assert_eq!(next, total);
            prop_assert_eq!(parts.iter().map(Partition::len).sum::<usize>(), total);
        }
    }
}
