//! Entity-level train/test partitioning.
//!
//! Entities, not rows, are sampled: every row of an option lands in exactly
//! one partition, so no contract leaks between train and test.

use std::collections::HashSet;

use iv_forecast_core::SplitConfig;
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{PrepError, Result};
use crate::schema;

/// Entity and row counts per partition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SplitSummary {
    pub train_entities: usize,
    pub test_entities: usize,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Result of an entity-level split. Both frames keep the input's row order.
#[derive(Debug, Clone)]
pub struct EntitySplit {
    pub train: DataFrame,
    pub test: DataFrame,
    summary: SplitSummary,
}

impl EntitySplit {
    #[must_use]
    pub fn summary(&self) -> SplitSummary {
        self.summary
    }

    #[must_use]
    pub fn into_parts(self) -> (DataFrame, DataFrame) {
        (self.train, self.test)
    }
}

/// Splits processed tables by sampling entity ids with a seeded generator.
#[derive(Debug, Clone)]
pub struct EntitySplitter {
    train_fraction: f64,
    seed: u64,
}

impl Default for EntitySplitter {
    fn default() -> Self {
        Self::from_config(&SplitConfig::default())
    }
}

impl EntitySplitter {
    #[must_use]
    pub fn new(train_fraction: f64, seed: u64) -> Self {
        Self {
            train_fraction,
            seed,
        }
    }

    #[must_use]
    pub fn from_config(config: &SplitConfig) -> Self {
        Self::new(config.train_fraction, config.seed)
    }

    /// Splits `table` with a generator freshly seeded from the configured seed.
    ///
    /// # Errors
    /// See [`split_with_rng`].
    pub fn split(&self, table: &DataFrame) -> Result<EntitySplit> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        split_with_rng(table, self.train_fraction, &mut rng)
    }
}

/// Splits `table` into train/test by drawing `floor(train_fraction * n_entities)`
/// entity ids uniformly without replacement from `rng`.
///
/// Entity ids are enumerated in first-appearance order, so the draw depends
/// only on the table and the generator state.
///
/// # Errors
/// - [`PrepError::InvalidTrainFraction`] if `train_fraction` is not in (0, 1]
/// - [`PrepError::EmptyEntitySet`] if the table has no rows
/// - [`PrepError::MissingColumn`] if `optionid` is absent
pub fn split_with_rng(
    table: &DataFrame,
    train_fraction: f64,
    rng: &mut ChaCha8Rng,
) -> Result<EntitySplit> {
    if !(train_fraction > 0.0 && train_fraction <= 1.0) {
        return Err(PrepError::InvalidTrainFraction(train_fraction));
    }

    let keys = schema::entity_keys(table)?;
    let mut seen = HashSet::new();
    let entities: Vec<&Option<String>> = keys.iter().filter(|key| seen.insert(*key)).collect();
    if entities.is_empty() {
        return Err(PrepError::EmptyEntitySet);
    }

    let n_train = (train_fraction * entities.len() as f64).floor() as usize;
    if n_train == 0 {
        warn!(
            entities = entities.len(),
            train_fraction, "Train fraction selects no entities; every row goes to test"
        );
    }

    let train_ids: HashSet<&Option<String>> =
        entities.choose_multiple(rng, n_train).copied().collect();

    let in_train: Vec<bool> = keys.iter().map(|key| train_ids.contains(key)).collect();
    let in_test: Vec<bool> = in_train.iter().map(|flag| !flag).collect();

    let train = table.filter(&BooleanChunked::from_slice("train".into(), &in_train))?;
    let test = table.filter(&BooleanChunked::from_slice("test".into(), &in_test))?;

    let summary = SplitSummary {
        train_entities: train_ids.len(),
        test_entities: entities.len() - train_ids.len(),
        train_rows: train.height(),
        test_rows: test.height(),
    };
    info!(
        train_entities = summary.train_entities,
        test_entities = summary.test_entities,
        train_rows = summary.train_rows,
        test_rows = summary.test_rows,
        "Entity split complete"
    );

    Ok(EntitySplit {
        train,
        test,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::i64_values;

    /// `rows_per_entity` rows for each of `n` entities, interleaved by day.
    fn processed(n: i64, rows_per_entity: i32) -> DataFrame {
        let mut ids = Vec::new();
        let mut dates = Vec::new();
        for day in 1..=rows_per_entity {
            for id in 0..n {
                ids.push(100 + id);
                dates.push(day);
            }
        }
        let iv: Vec<f64> = (0..ids.len()).map(|i| 0.2 + i as f64 * 0.001).collect();
        df! {
            "date" => dates,
            "optionid" => ids,
            "iv" => iv,
        }
        .unwrap()
    }

    fn entity_set(df: &DataFrame) -> HashSet<i64> {
        i64_values(df, "optionid").into_iter().collect()
    }

    #[test]
    fn test_ten_entities_seventy_percent() {
        let table = processed(10, 3);
        let split = EntitySplitter::new(0.7, 42).split(&table).unwrap();

        let train = entity_set(&split.train);
        let test = entity_set(&split.test);
        assert_eq!(train.len(), 7);
        assert_eq!(test.len(), 3);
        assert!(train.is_disjoint(&test));
        assert_eq!(train.union(&test).count(), 10);

        assert_eq!(split.train.height(), 21);
        assert_eq!(split.test.height(), 9);
        assert_eq!(
            split.summary(),
            SplitSummary {
                train_entities: 7,
                test_entities: 3,
                train_rows: 21,
                test_rows: 9,
            }
        );
    }

    #[test]
    fn test_rows_follow_entity_membership_in_order() {
        let table = processed(6, 4);
        let split = EntitySplitter::new(0.5, 3).split(&table).unwrap();
        let train = entity_set(&split.train);

        let ids = i64_values(&table, "optionid");
        let expected_train: Vec<i64> = ids.iter().copied().filter(|id| train.contains(id)).collect();
        let expected_test: Vec<i64> = ids.iter().copied().filter(|id| !train.contains(id)).collect();
        assert_eq!(i64_values(&split.train, "optionid"), expected_train);
        assert_eq!(i64_values(&split.test, "optionid"), expected_test);
    }

    #[test]
    fn test_same_seed_same_partition() {
        let table = processed(20, 2);
        let a = EntitySplitter::new(0.6, 9).split(&table).unwrap();
        let b = EntitySplitter::new(0.6, 9).split(&table).unwrap();
        assert!(a.train.equals(&b.train));
        assert!(a.test.equals(&b.test));
    }

    #[test]
    fn test_different_seeds_vary_partition() {
        let table = processed(20, 1);
        let base = entity_set(&EntitySplitter::new(0.5, 0).split(&table).unwrap().train);
        let differs = (1..=5).any(|seed| {
            let other = EntitySplitter::new(0.5, seed).split(&table).unwrap();
            entity_set(&other.train) != base
        });
        assert!(differs);
    }

    #[test]
    fn test_caller_owned_rng_is_deterministic() {
        let table = processed(20, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let first = split_with_rng(&table, 0.5, &mut rng).unwrap();
        let mut fresh = ChaCha8Rng::seed_from_u64(5);
        let replay = split_with_rng(&table, 0.5, &mut fresh).unwrap();
        assert!(first.train.equals(&replay.train));
        assert_eq!(first.summary().train_entities, 10);
    }

    #[test]
    fn test_full_fraction_puts_everything_in_train() {
        let table = processed(4, 2);
        let split = EntitySplitter::new(1.0, 1).split(&table).unwrap();
        assert_eq!(split.train.height(), 8);
        assert_eq!(split.test.height(), 0);
    }

    #[test]
    fn test_small_fraction_puts_everything_in_test() {
        let table = processed(3, 2);
        let split = EntitySplitter::new(0.2, 1).split(&table).unwrap();
        assert_eq!(split.train.height(), 0);
        assert_eq!(split.test.height(), 6);
    }

    #[test]
    fn test_empty_table_is_an_error() {
        let table = processed(0, 3);
        assert!(matches!(
            EntitySplitter::default().split(&table),
            Err(PrepError::EmptyEntitySet)
        ));
    }

    #[test]
    fn test_invalid_fraction_is_an_error() {
        let table = processed(3, 1);
        for fraction in [0.0, 1.01, -1.0, f64::NAN] {
            assert!(matches!(
                EntitySplitter::new(fraction, 1).split(&table),
                Err(PrepError::InvalidTrainFraction(_))
            ));
        }
    }
}
