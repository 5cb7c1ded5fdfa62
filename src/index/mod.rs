//! Weighted aggregation of closes and normalization against an anchor level.
use std::collections::BTreeMap;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::clock::Date;
use crate::error::IndexError;
use crate::input::weights::WeightTable;
use crate::resolver::{PricePoint, PriceResolver};
use crate::source::PriceSource;

/// Index level on one date.
///
/// `raw_value` is only ever built from tickers that resolved, missing tickers are listed in
/// `missing` and their weight is not redistributed.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct IndexValue {
    pub date: Date,
    pub raw_value: f64,
    pub normalized_value: Option<f64>,
    pub components: BTreeMap<String, PricePoint>,
    pub missing: Vec<String>,
}

impl IndexValue {
    pub fn close(&self, ticker: &str) -> Option<f64> {
        self.components.get(ticker).map(|p| p.close)
    }

    pub fn normalize(&mut self, factor: f64) {
        self.normalized_value = Some(normalize(self.raw_value, factor));
    }

    /// Normalized level when a factor has been applied, otherwise the raw level.
    pub fn value(&self) -> f64 {
        self.normalized_value.unwrap_or(self.raw_value)
    }
}

/// Σ(weight × close) over tickers that resolve on `date`.
///
/// A ticker that fails to resolve is skipped and logged. If nothing resolves the result is
/// [IndexError::InsufficientData] rather than a zero level. A date the resolver cannot build a
/// window for fails the whole computation with [IndexError::InvalidDate].
pub fn weighted_index<S: PriceSource + ?Sized>(
    resolver: &mut PriceResolver<S>,
    date: Date,
    weights: &WeightTable,
) -> Result<IndexValue, IndexError> {
    let mut raw_value = 0.0;
    let mut components = BTreeMap::new();
    let mut missing = Vec::new();

    for (ticker, weight) in weights.iter() {
        match resolver.resolve_price(ticker, date) {
            Ok(point) => {
                raw_value += weight * point.close;
                components.insert(ticker.to_string(), point);
            }
            Err(e @ IndexError::InvalidDate { .. }) => return Err(e),
            Err(e) => {
                warn!("INDEX: skipping {ticker} on {date}: {e}");
                missing.push(ticker.to_string());
            }
        }
    }

    if components.is_empty() {
        return Err(IndexError::InsufficientData { date });
    }

    info!(
        "INDEX: {date} raw value {raw_value:.4} from {} of {} tickers",
        components.len(),
        weights.len()
    );
    Ok(IndexValue {
        date,
        raw_value,
        normalized_value: None,
        components,
        missing,
    })
}

/// `anchor_target_value / raw_value(anchor_date)`.
pub fn normalization_factor<S: PriceSource + ?Sized>(
    resolver: &mut PriceResolver<S>,
    anchor_date: Date,
    anchor_target_value: f64,
    weights: &WeightTable,
) -> Result<f64, IndexError> {
    let anchor = weighted_index(resolver, anchor_date, weights)?;
    //A fully weighted sum of positive closes cannot be zero, treat it as no data
    if anchor.raw_value == 0.0 || !anchor.raw_value.is_finite() {
        return Err(IndexError::InsufficientData { date: anchor_date });
    }
    Ok(anchor_target_value / anchor.raw_value)
}

pub fn normalize(raw_value: f64, factor: f64) -> f64 {
    raw_value * factor
}
