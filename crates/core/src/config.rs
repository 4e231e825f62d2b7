use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub features: FeatureConfig,
    pub split: SplitConfig,
}

/// How a zero mid-price (and therefore an undefined bid/offer spread) is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegenerateSpread {
    /// Mark the spread as missing so rows carrying it are dropped downstream.
    #[default]
    Drop,
    /// Keep the IEEE result of the division (infinity, or NaN for 0/0).
    Preserve,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// EMA spans; each produces a `<feature>_<span>` column per base feature.
    pub ema_spans: Vec<usize>,
    /// Inclusive lower bound on the lagged delta.
    pub delta_min: f64,
    /// Inclusive upper bound on the lagged delta.
    pub delta_max: f64,
    pub degenerate_spread: DegenerateSpread,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Fraction of entities (not rows) assigned to the training set.
    pub train_fraction: f64,
    pub seed: u64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            ema_spans: vec![5, 20],
            delta_min: 0.05,
            delta_max: 0.95,
            degenerate_spread: DegenerateSpread::Drop,
        }
    }
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            train_fraction: 0.8,
            seed: 1,
        }
    }
}

impl FeatureConfig {
    /// Checks spans and the delta band.
    ///
    /// # Errors
    ///
    /// Returns an error if a span is zero, spans repeat, or the delta band is empty.
    pub fn validate(&self) -> Result<()> {
        if self.ema_spans.iter().any(|&span| span == 0) {
            bail!("EMA spans must be positive, got {:?}", self.ema_spans);
        }
        let mut sorted = self.ema_spans.clone();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() != self.ema_spans.len() {
            bail!("EMA spans must be distinct, got {:?}", self.ema_spans);
        }
        if !(self.delta_min <= self.delta_max) {
            bail!(
                "Delta band is empty: [{}, {}]",
                self.delta_min,
                self.delta_max
            );
        }
        Ok(())
    }
}

impl SplitConfig {
    /// # Errors
    ///
    /// Returns an error if `train_fraction` is not in (0, 1].
    pub fn validate(&self) -> Result<()> {
        if !(self.train_fraction > 0.0 && self.train_fraction <= 1.0) {
            bail!(
                "Train fraction must be in (0, 1], got {}",
                self.train_fraction
            );
        }
        Ok(())
    }
}

impl PipelineConfig {
    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns the first section error encountered.
    pub fn validate(&self) -> Result<()> {
        self.features.validate()?;
        self.split.validate()?;
        Ok(())
    }
}
