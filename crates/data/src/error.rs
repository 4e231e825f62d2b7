use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised while preparing model datasets.
#[derive(Error, Debug)]
pub enum PrepError {
    /// A column the pipeline depends on is absent from the input table.
    #[error("Missing required column: {column}")]
    MissingColumn { column: String },

    #[error("Train fraction must be in (0, 1], got {0}")]
    InvalidTrainFraction(f64),

    /// The table handed to the splitter has no entity ids at all.
    #[error("Cannot split a table with no entities")]
    EmptyEntitySet,

    #[error("Index {index} out of bounds for dataset of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    /// Failure inside the dataframe engine (casts, sorts, filters).
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, PrepError>;
