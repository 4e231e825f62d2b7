//! Dataset preparation for implied-volatility models.
//!
//! This crate provides:
//! - Feature engineering with per-entity EMAs and one-step lags
//! - Entity-level train/test splitting with a seeded generator
//! - Dense (features, target) dataset adapters
//! - A pipeline facade that runs the steps in order

pub mod dataset;
pub mod ema;
pub mod error;
pub mod features;
pub mod groups;
pub mod pipeline;
pub mod schema;
pub mod split;

#[cfg(test)]
pub(crate) mod test_support;

pub use dataset::{Dataset, OptionDataset};
pub use error::{PrepError, Result};
pub use features::{FeatureProcessor, ProcessingStats};
pub use groups::EntityGroups;
pub use pipeline::{Pipeline, PreparedData};
pub use split::{split_with_rng, EntitySplit, EntitySplitter, SplitSummary};
