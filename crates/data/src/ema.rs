//! Exponential moving averages over entity groups.
//!
//! Uses the recursive (non-adjusted) form:
//!
//! ```text
//! ema[0] = x[0]
//! ema[t] = alpha * x[t] + (1 - alpha) * ema[t-1],   alpha = 2 / (span + 1)
//! ```
//!
//! Missing observations keep their position: after `k` missing rows the
//! previous average carries weight `(1 - alpha)^(k + 1)` against `alpha` for
//! the new value, and the pair is renormalized.

use crate::groups::EntityGroups;

/// Smoothing factor for a span.
#[must_use]
pub fn alpha(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// Running EMA state for a single series.
#[derive(Debug, Clone, Copy)]
pub struct EmaState {
    alpha: f64,
    value: Option<f64>,
    old_weight: f64,
}

impl EmaState {
    #[must_use]
    pub fn new(span: usize) -> Self {
        Self {
            alpha: alpha(span),
            value: None,
            old_weight: 1.0,
        }
    }

    /// Feeds one observation and returns the current average.
    ///
    /// A missing (null or NaN) observation returns the carried value, or
    /// `None` if nothing has been observed yet, and decays the weight of that
    /// value for the next observation.
    pub fn update(&mut self, x: Option<f64>) -> Option<f64> {
        let decay = 1.0 - self.alpha;
        let x = x.filter(|v| !v.is_nan());
        match (self.value.filter(|v| !v.is_nan()), x) {
            (Some(prev), Some(x)) => {
                let old = self.old_weight * decay;
                self.value = Some((old * prev + self.alpha * x) / (old + self.alpha));
                self.old_weight = 1.0;
            }
            (Some(_), None) => self.old_weight *= decay,
            // Unseeded, or poisoned by inf - inf: restart from the observation.
            (None, Some(x)) => {
                self.value = Some(x);
                self.old_weight = 1.0;
            }
            (None, None) => {}
        }
        self.value
    }

    #[must_use]
    pub fn value(&self) -> Option<f64> {
        self.value
    }
}

/// EMA of `values` computed independently inside each entity group.
#[must_use]
pub fn grouped_ema(values: &[Option<f64>], span: usize, groups: &EntityGroups) -> Vec<Option<f64>> {
    groups.scan(values, || EmaState::new(span), EmaState::update)
}
