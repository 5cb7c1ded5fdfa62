//! Percentage variation between two dates, for the index and for each component.
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::IndexError;
use crate::index::IndexValue;
use crate::input::weights::WeightTable;

/// `(a - b) / b * 100`. Zero `b` is an error, never an infinite result.
pub fn pct_change(value_a: f64, value_b: f64) -> Result<f64, IndexError> {
    if value_b == 0.0 {
        return Err(IndexError::DivideByZero);
    }
    let res = (value_a - value_b) / value_b * 100.0;
    if !res.is_finite() {
        return Err(IndexError::DivideByZero);
    }
    Ok(res)
}

/// Variation of one ticker between two snapshots.
///
/// `share` is the ticker's weight as a fraction of the weights of all tickers in the same
/// variation set, used to size treemap tiles.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ComponentVariation {
    pub ticker: String,
    pub weight: f64,
    pub share: f64,
    pub pct_change: f64,
}

/// Variation for every ticker present in both snapshots. Tickers missing from either side are left
/// out, there is no carry-forward.
pub fn component_variations(
    selected: &IndexValue,
    previous: &IndexValue,
    weights: &WeightTable,
) -> Vec<ComponentVariation> {
    let mut res = Vec::new();
    for (ticker, weight) in weights.iter() {
        let (Some(price_selected), Some(price_previous)) =
            (selected.close(ticker), previous.close(ticker))
        else {
            continue;
        };

        match pct_change(price_selected, price_previous) {
            Ok(change) => res.push(ComponentVariation {
                ticker: ticker.to_string(),
                weight,
                share: 0.0,
                pct_change: change,
            }),
            Err(e) => warn!("VARIATION: skipping {ticker}: {e}"),
        }
    }

    let included: f64 = res.iter().map(|c| c.weight).sum();
    if included > 0.0 {
        for component in res.iter_mut() {
            component.share = component.weight / included;
        }
    }
    res
}
