use iv_forecast_core::PipelineConfig;
use polars::prelude::DataFrame;
use tracing::info;

use crate::dataset::OptionDataset;
use crate::error::{PrepError, Result};
use crate::features::{FeatureProcessor, ProcessingStats};
use crate::split::{EntitySplitter, SplitSummary};

/// Train/test tables produced by one pipeline run.
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub train: DataFrame,
    pub test: DataFrame,
    pub processing: ProcessingStats,
    pub split: SplitSummary,
}

impl PreparedData {
    /// Wraps both tables as model-ready datasets.
    ///
    /// # Errors
    /// Returns an error if either table cannot be converted.
    pub fn datasets(&self) -> Result<(OptionDataset, OptionDataset)> {
        Ok((
            OptionDataset::from_frame(&self.train)?,
            OptionDataset::from_frame(&self.test)?,
        ))
    }
}

/// Feature processing followed by an entity-level split.
#[derive(Debug, Clone)]
pub struct Pipeline {
    processor: FeatureProcessor,
    splitter: EntitySplitter,
}

impl Pipeline {
    /// # Errors
    /// Returns [`PrepError::InvalidConfig`] if the configuration fails validation.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| PrepError::InvalidConfig(format!("{e:#}")))?;
        Ok(Self {
            splitter: EntitySplitter::from_config(&config.split),
            processor: FeatureProcessor::new(config.features),
        })
    }

    #[must_use]
    pub fn processor(&self) -> &FeatureProcessor {
        &self.processor
    }

    /// Processes `raw` and splits the result into train and test tables.
    ///
    /// # Errors
    /// Propagates schema, dataframe and split errors.
    pub fn run(&self, raw: &DataFrame) -> Result<PreparedData> {
        let (table, processing) = self.processor.process_with_stats(raw)?;
        let split = self.splitter.split(&table)?;
        let summary = split.summary();
        let (train, test) = split.into_parts();

        info!(
            input_rows = processing.input_rows,
            train_rows = summary.train_rows,
            test_rows = summary.test_rows,
            "Pipeline run complete"
        );

        Ok(PreparedData {
            train,
            test,
            processing,
            split: summary,
        })
    }
}
