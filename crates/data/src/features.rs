//! Feature engineering for implied-volatility prediction.
//!
//! Turns a raw option panel into a modeling table:
//!
//! 1. Sort by (`optionid`, `date`)
//! 2. Derive `moneyness`, `mid_price` and `spread`
//! 3. EMA of every base feature for each configured span, per entity
//! 4. Capture the same-day target `iv`
//! 5. Lag every feature column by one row, per entity
//! 6. Keep rows whose lagged `delta` lies in the configured band
//! 7. Project, then drop rows with missing values
//!
//! Step 5 runs before step 6, so the band is applied to the previous day's
//! delta, not the current one.

use iv_forecast_core::{DegenerateSpread, FeatureConfig};
use polars::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::ema::grouped_ema;
use crate::error::Result;
use crate::groups::EntityGroups;
use crate::schema::{self, is_present};

/// Row accounting for one `process` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessingStats {
    pub input_rows: usize,
    pub entities: usize,
    /// Rows whose mid-price was zero.
    pub degenerate_spreads: usize,
    /// Rows removed by the lagged-delta band.
    pub dropped_by_delta: usize,
    /// Rows inside the band removed for missing values.
    pub dropped_missing: usize,
    pub output_rows: usize,
}

impl ProcessingStats {
    /// Formats a one-line summary.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Input: {} rows / {} entities, Degenerate spreads: {}, Dropped by delta: {}, Dropped missing: {}, Output: {} rows",
            self.input_rows,
            self.entities,
            self.degenerate_spreads,
            self.dropped_by_delta,
            self.dropped_missing,
            self.output_rows
        )
    }
}

/// Builds lagged features and the same-day `iv` target from a raw panel.
#[derive(Debug, Clone, Default)]
pub struct FeatureProcessor {
    config: FeatureConfig,
}

impl FeatureProcessor {
    #[must_use]
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Names of the lagged feature columns this processor emits, in order.
    #[must_use]
    pub fn feature_columns(&self) -> Vec<String> {
        schema::feature_columns(&self.config.ema_spans)
    }

    /// Processes a raw panel into a modeling table.
    ///
    /// # Errors
    /// Returns an error if a required column is missing or cannot be read as numeric.
    pub fn process(&self, raw: &DataFrame) -> Result<DataFrame> {
        self.process_with_stats(raw).map(|(table, _)| table)
    }

    /// Same as [`process`](Self::process), also returning row accounting.
    ///
    /// Output columns: `date`, `optionid`, `iv`, `time_to_maturity`, then the
    /// lagged features from [`feature_columns`](Self::feature_columns).
    ///
    /// # Errors
    /// Returns an error if a required column is missing or cannot be read as numeric.
    pub fn process_with_stats(&self, raw: &DataFrame) -> Result<(DataFrame, ProcessingStats)> {
        schema::require_columns(raw, &schema::REQUIRED_COLUMNS)?;

        let sorted = raw
            .clone()
            .lazy()
            .sort(
                [schema::ENTITY, schema::DATE],
                SortMultipleOptions::new().with_maintain_order(true),
            )
            .collect()?;

        let keys = schema::entity_keys(&sorted)?;
        let groups = EntityGroups::from_sorted_keys(&keys);
        let mut stats = ProcessingStats {
            input_rows: sorted.height(),
            entities: groups.len(),
            ..ProcessingStats::default()
        };
        debug!(
            rows = stats.input_rows,
            entities = stats.entities,
            "Sorted raw panel"
        );

        let (base, degenerate) = self.base_features(&sorted)?;
        stats.degenerate_spreads = degenerate;
        if degenerate > 0 {
            warn!(
                rows = degenerate,
                policy = ?self.config.degenerate_spread,
                "Zero mid-price makes the spread undefined"
            );
        }

        // Same-day target, captured before anything is lagged.
        let iv = schema::float_column(&sorted, schema::IMPL_VOLATILITY)?;
        let time_to_maturity = schema::float_column(&sorted, schema::TIME_TO_MATURITY)?;

        let mut features: Vec<(String, Vec<Option<f64>>)> =
            Vec::with_capacity(base.len() * (1 + self.config.ema_spans.len()));
        for (name, values) in &base {
            features.push(((*name).to_string(), groups.lag(values)));
            for &span in &self.config.ema_spans {
                let smoothed = grouped_ema(values, span, &groups);
                features.push((schema::ema_column(name, span), groups.lag(&smoothed)));
            }
        }

        let lagged_delta = groups.lag(&schema::float_column(&sorted, schema::DELTA)?);
        let in_band: Vec<bool> = lagged_delta
            .iter()
            .map(|delta| {
                matches!(delta, Some(d) if *d >= self.config.delta_min && *d <= self.config.delta_max)
            })
            .collect();

        let date = sorted.column(schema::DATE)?.clone();
        let entity = sorted.column(schema::ENTITY)?.clone();
        let date_null = date.is_null();
        let entity_null = entity.is_null();

        let keep: Vec<bool> = (0..sorted.height())
            .map(|i| {
                if !in_band[i] {
                    stats.dropped_by_delta += 1;
                    return false;
                }
                let complete = !date_null.get(i).unwrap_or(true)
                    && !entity_null.get(i).unwrap_or(true)
                    && is_present(iv[i])
                    && is_present(time_to_maturity[i])
                    && features.iter().all(|(_, values)| is_present(values[i]));
                if !complete {
                    stats.dropped_missing += 1;
                }
                complete
            })
            .collect();

        let mut columns = Vec::with_capacity(4 + features.len());
        columns.push(date);
        columns.push(entity);
        columns.push(Series::new(schema::TARGET.into(), iv));
        columns.push(Series::new(schema::TIME_TO_MATURITY.into(), time_to_maturity));
        for (name, values) in features {
            columns.push(Series::new(name.as_str().into(), values));
        }

        let mask = BooleanChunked::from_slice("keep".into(), &keep);
        let table = DataFrame::new(columns)?.filter(&mask)?;
        stats.output_rows = table.height();

        info!("Feature processing complete: {}", stats.summary());
        Ok((table, stats))
    }

    /// Unlagged base features in output order, plus the count of zero mid-prices.
    fn base_features(
        &self,
        sorted: &DataFrame,
    ) -> Result<(Vec<(&'static str, Vec<Option<f64>>)>, usize)> {
        let spot = schema::float_column(sorted, schema::SPOT)?;
        let strike = schema::float_column(sorted, schema::STRIKE_PRICE)?;
        let bid = schema::float_column(sorted, schema::BEST_BID)?;
        let offer = schema::float_column(sorted, schema::BEST_OFFER)?;

        let mut moneyness: Vec<Option<f64>> = spot
            .iter()
            .zip(&strike)
            .map(|(s, k)| Some((*s)? - (*k)?))
            .collect();

        let mut degenerate = 0;
        let mut spread: Vec<Option<f64>> = bid
            .iter()
            .zip(&offer)
            .map(|(b, o)| {
                let (bid, offer) = ((*b)?, (*o)?);
                let mid_price = (bid + offer) / 2.0;
                if mid_price == 0.0 {
                    degenerate += 1;
                    if self.config.degenerate_spread == DegenerateSpread::Drop {
                        return None;
                    }
                }
                Some((offer - bid) / mid_price)
            })
            .collect();

        let mut base = Vec::with_capacity(schema::BASE_FEATURES.len());
        for name in schema::BASE_FEATURES {
            let values = match name {
                schema::MONEYNESS => std::mem::take(&mut moneyness),
                schema::SPREAD => std::mem::take(&mut spread),
                column => schema::float_column(sorted, column)?,
            };
            base.push((name, values));
        }
        Ok((base, degenerate))
    }
}
