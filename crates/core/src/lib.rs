//! Configuration for the implied-volatility dataset pipeline.
//!
//! Provides the typed [`PipelineConfig`] and a figment-backed [`ConfigLoader`].

pub mod config;
pub mod config_loader;

pub use config::{DegenerateSpread, FeatureConfig, PipelineConfig, SplitConfig};
pub use config_loader::ConfigLoader;
