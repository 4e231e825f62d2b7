//! Model-ready (features, target) containers.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use polars::prelude::*;

use crate::error::{PrepError, Result};
use crate::schema;

/// Minimal indexable dataset protocol consumed by a training loop.
pub trait Dataset {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the feature vector and target of row `index`.
    ///
    /// # Errors
    /// Returns [`PrepError::IndexOutOfBounds`] when `index >= len()`.
    fn get(&self, index: usize) -> Result<(ArrayView1<'_, f64>, f64)>;
}

/// Dense view of a processed table: every column except `date`, `optionid`
/// and `iv` becomes a feature, in table order; `iv` is the target.
#[derive(Debug, Clone)]
pub struct OptionDataset {
    feature_names: Vec<String>,
    features: Array2<f64>,
    targets: Array1<f64>,
}

impl OptionDataset {
    /// Copies a processed table into a feature matrix and target vector.
    /// Null cells become NaN.
    ///
    /// # Errors
    /// Returns an error if `iv` is absent or a feature column is not castable to `f64`.
    pub fn from_frame(table: &DataFrame) -> Result<Self> {
        schema::require_columns(table, &[schema::TARGET])?;

        let feature_names: Vec<String> = table
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .filter(|name| !schema::NON_FEATURE_COLUMNS.contains(&name.as_str()))
            .collect();

        let columns = feature_names
            .iter()
            .map(|name| dense_column(table, name))
            .collect::<Result<Vec<_>>>()?;
        let targets = Array1::from(dense_column(table, schema::TARGET)?);

        let features = Array2::from_shape_fn((table.height(), columns.len()), |(row, col)| {
            columns[col][row]
        });

        Ok(Self {
            feature_names,
            features,
            targets,
        })
    }

    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Feature matrix, one row per sample.
    #[must_use]
    pub fn features(&self) -> ArrayView2<'_, f64> {
        self.features.view()
    }

    #[must_use]
    pub fn targets(&self) -> ArrayView1<'_, f64> {
        self.targets.view()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ArrayView1<'_, f64>, f64)> + '_ {
        self.features.rows().into_iter().zip(self.targets.iter().copied())
    }
}

impl Dataset for OptionDataset {
    fn len(&self) -> usize {
        self.targets.len()
    }

    fn get(&self, index: usize) -> Result<(ArrayView1<'_, f64>, f64)> {
        if index >= self.len() {
            return Err(PrepError::IndexOutOfBounds {
                index,
                len: self.len(),
            });
        }
        Ok((self.features.row(index), self.targets[index]))
    }
}

fn dense_column(table: &DataFrame, name: &str) -> Result<Vec<f64>> {
    Ok(schema::float_column(table, name)?
        .into_iter()
        .map(|value| value.unwrap_or(f64::NAN))
        .collect())
}
