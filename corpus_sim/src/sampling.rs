use rand::{rngs::SmallRng, Rng};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("weighted table has no entries")]
    EmptyTable,
    #[error("negative weight {weight} for entry {index}")]
    NegativeWeight { index: usize, weight: f64 },
}

/// Cumulative-sum categorical sampler.
///
/// Entries are walked in insertion order; a single uniform draw in
/// `[0, 1)` selects the first entry whose running weight sum exceeds it.
/// Weights are used as given — no normalization. Probability tables
/// (summing to ~1) and raw importance tables both go through here, and
/// the caller owns that distinction. When the cumulative total never
/// reaches the draw (weights summing below 1, or rounding at the tail),
/// the explicit fallback category is returned.
#[derive(Debug, Clone)]
pub struct WeightedTable<T: Copy> {
    entries: Vec<(T, f64)>,
    fallback: T,
}

impl<T: Copy> WeightedTable<T> {
    /// Build a table whose fallback is its first entry.
    pub fn new(entries: Vec<(T, f64)>) -> Result<Self, SampleError> {
        let fallback = entries.first().map(|(category, _)| *category);
        match fallback {
            Some(fallback) => Self::with_fallback(entries, fallback),
            None => Err(SampleError::EmptyTable),
        }
    }

    pub fn with_fallback(entries: Vec<(T, f64)>, fallback: T) -> Result<Self, SampleError> {
        if entries.is_empty() {
            return Err(SampleError::EmptyTable);
        }
        for (index, (_, weight)) in entries.iter().enumerate() {
            if *weight < 0.0 || !weight.is_finite() {
                return Err(SampleError::NegativeWeight {
                    index,
                    weight: *weight,
                });
            }
        }
        Ok(Self { entries, fallback })
    }

    pub fn sample(&self, rng: &mut SmallRng) -> T {
        let draw: f64 = rng.gen();
        let mut cumulative = 0.0;
        for (category, weight) in &self.entries {
            cumulative += weight;
            if draw < cumulative {
                return *category;
            }
        }
        self.fallback
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn empty_table_is_rejected() {
        let err = WeightedTable::<u8>::new(Vec::new()).unwrap_err();
        assert!(matches!(err, SampleError::EmptyTable));
    }

    #[test]
    fn negative_weight_is_rejected() {
        let err = WeightedTable::new(vec![(0u8, 0.5), (1u8, -0.5)]).unwrap_err();
        assert!(matches!(err, SampleError::NegativeWeight { index: 1, .. }));
    }

    #[test]
    fn single_entry_always_selected() {
        let table = WeightedTable::new(vec![("only", 1.0)]).unwrap();
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..100 {
            assert_eq!(table.sample(&mut rng), "only");
        }
    }

    #[test]
    fn zero_weight_entry_falls_through() {
        let table = WeightedTable::new(vec![("never", 0.0), ("always", 1.0)]).unwrap();
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..1000 {
            assert_eq!(table.sample(&mut rng), "always");
        }
    }

    #[test]
    fn underweight_table_uses_fallback() {
        // Total weight 0.0 means every draw exceeds the cumulative sum.
        let table = WeightedTable::with_fallback(vec![("a", 0.0), ("b", 0.0)], "b").unwrap();
        let mut rng = SmallRng::seed_from_u64(13);
        for _ in 0..100 {
            assert_eq!(table.sample(&mut rng), "b");
        }
    }

    #[test]
    fn distribution_matches_weights_within_one_percent() {
        let table =
            WeightedTable::new(vec![(0usize, 0.45), (1usize, 0.30), (2usize, 0.20), (3usize, 0.05)])
                .unwrap();
        let mut rng = SmallRng::seed_from_u64(0xC0FFEE);
        let draws = 100_000usize;
        let mut counts = [0usize; 4];
        for _ in 0..draws {
            counts[table.sample(&mut rng)] += 1;
        }
        let expected = [0.45, 0.30, 0.20, 0.05];
        for (count, expected) in counts.iter().zip(expected) {
            let observed = *count as f64 / draws as f64;
            assert!(
                (observed - expected).abs() < 0.01,
                "observed {observed}, expected {expected}"
            );
        }
    }
}
