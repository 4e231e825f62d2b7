//! Column contract for raw option panels and processed modeling tables.

use polars::prelude::*;

use crate::error::{PrepError, Result};

pub const ENTITY: &str = "optionid";
pub const DATE: &str = "date";
pub const TARGET: &str = "iv";

pub const SPOT: &str = "spot";
pub const STRIKE_PRICE: &str = "strike_price";
pub const BEST_BID: &str = "best_bid";
pub const BEST_OFFER: &str = "best_offer";
pub const VIX: &str = "VIX";
pub const IMPL_VOLATILITY: &str = "impl_volatility";
pub const IMPVOL_CHG: &str = "impvol_chg";
pub const DELTA: &str = "delta";
pub const GAMMA: &str = "gamma";
pub const VEGA: &str = "vega";
pub const THETA: &str = "theta";
pub const TIME_TO_MATURITY: &str = "time_to_maturity";

pub const MONEYNESS: &str = "moneyness";
pub const SPREAD: &str = "spread";

/// Columns a raw panel must carry before processing starts.
pub const REQUIRED_COLUMNS: [&str; 14] = [
    ENTITY,
    DATE,
    SPOT,
    STRIKE_PRICE,
    BEST_BID,
    BEST_OFFER,
    VIX,
    IMPL_VOLATILITY,
    IMPVOL_CHG,
    DELTA,
    GAMMA,
    VEGA,
    THETA,
    TIME_TO_MATURITY,
];

/// Base features, in output order. Each is emitted raw and once per EMA span.
pub const BASE_FEATURES: [&str; 9] = [
    MONEYNESS,
    VIX,
    SPREAD,
    IMPL_VOLATILITY,
    IMPVOL_CHG,
    DELTA,
    GAMMA,
    VEGA,
    THETA,
];

/// Columns of a processed table that are not model inputs.
pub const NON_FEATURE_COLUMNS: [&str; 3] = [DATE, ENTITY, TARGET];

/// Name of the EMA variant of `feature` for the given span, e.g. `delta_5`.
#[must_use]
pub fn ema_column(feature: &str, span: usize) -> String {
    format!("{feature}_{span}")
}

/// Lagged feature column names: for each base feature, raw first, then one per span.
#[must_use]
pub fn feature_columns(spans: &[usize]) -> Vec<String> {
    BASE_FEATURES
        .iter()
        .flat_map(|feature| {
            std::iter::once((*feature).to_string())
                .chain(spans.iter().map(move |&span| ema_column(feature, span)))
        })
        .collect()
}

/// Fails on the first column of `columns` absent from `df`.
///
/// # Errors
/// Returns [`PrepError::MissingColumn`] naming the absent column.
pub fn require_columns(df: &DataFrame, columns: &[&str]) -> Result<()> {
    match columns.iter().find(|name| df.column(name).is_err()) {
        Some(name) => Err(PrepError::MissingColumn {
            column: (*name).to_string(),
        }),
        None => Ok(()),
    }
}

/// Reads a column as `f64` values; nulls become `None`.
///
/// # Errors
/// Returns an error if the column is absent, or if any non-null value cannot
/// be cast to `Float64`.
pub fn float_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = df
        .column(name)
        .map_err(|_| PrepError::MissingColumn {
            column: name.to_string(),
        })?
        .strict_cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().collect())
}

/// Reads the entity id column as string keys, whatever its physical dtype.
///
/// # Errors
/// Returns an error if the column is absent or cannot be cast to a string.
pub fn entity_keys(df: &DataFrame) -> Result<Vec<Option<String>>> {
    let series = df
        .column(ENTITY)
        .map_err(|_| PrepError::MissingColumn {
            column: ENTITY.to_string(),
        })?
        .cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|key| key.map(str::to_owned))
        .collect())
}

/// Null and NaN both count as missing; infinities do not.
#[must_use]
pub fn is_present(value: Option<f64>) -> bool {
    matches!(value, Some(v) if !v.is_nan())
}
