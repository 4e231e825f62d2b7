//! Per-entity row grouping for sequential (order-dependent) computations.
//!
//! Rows are expected to be sorted by entity then date, so each entity occupies
//! one contiguous run. Folds and lags run independently inside every run and
//! write their results back at the original row positions.

use std::ops::Range;

/// Contiguous row ranges, one per entity run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityGroups {
    ranges: Vec<Range<usize>>,
    rows: usize,
}

impl EntityGroups {
    /// Builds groups from entity keys of a table already sorted by entity.
    #[must_use]
    pub fn from_sorted_keys<K: PartialEq>(keys: &[K]) -> Self {
        let mut ranges = Vec::new();
        let mut start = 0;
        for i in 1..=keys.len() {
            if i == keys.len() || keys[i] != keys[start] {
                ranges.push(start..i);
                start = i;
            }
        }
        Self {
            ranges,
            rows: keys.len(),
        }
    }

    /// Number of entity runs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Total rows covered.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        self.ranges.iter().cloned()
    }

    /// Runs a stateful fold over each group, restarting the state at every
    /// group's first row.
    pub fn scan<S, T, F>(&self, values: &[T], init: impl Fn() -> S, mut step: F) -> Vec<T>
    where
        T: Copy,
        F: FnMut(&mut S, T) -> T,
    {
        debug_assert_eq!(values.len(), self.rows);
        let mut out = Vec::with_capacity(values.len());
        for range in self.iter() {
            let mut state = init();
            out.extend(values[range].iter().map(|&value| step(&mut state, value)));
        }
        out
    }

    /// Shifts values down by one row inside each group; each group's first
    /// row becomes `None`.
    #[must_use]
    pub fn lag<T: Copy>(&self, values: &[Option<T>]) -> Vec<Option<T>> {
        debug_assert_eq!(values.len(), self.rows);
        let mut out = vec![None; values.len()];
        for range in self.iter() {
            for i in (range.start + 1)..range.end {
                out[i] = values[i - 1];
            }
        }
        out
    }
}
