use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::IndexError;

/// Divides each weight by the sum of all weights.
///
/// Input can be raw scores (e.g. percentages that do not add up to exactly 100) or fractions that
/// already sum to one, in which case this is the identity.
pub fn normalize_weights(raw: &BTreeMap<String, f64>) -> Result<BTreeMap<String, f64>, IndexError> {
    for (ticker, weight) in raw {
        if !weight.is_finite() || *weight < 0.0 {
            return Err(IndexError::InvalidWeight {
                ticker: ticker.clone(),
                weight: *weight,
            });
        }
    }

    let sum: f64 = raw.values().sum();
    if raw.is_empty() || sum <= 0.0 {
        return Err(IndexError::EmptyWeights);
    }

    Ok(raw
        .iter()
        .map(|(ticker, weight)| (ticker.clone(), weight / sum))
        .collect())
}

/// Static ticker to weight mapping that defines the composition of the index.
///
/// Weights are always stored normalized so they sum to one. The table is immutable once built and
/// iterates in ticker order, which keeps logs and reports stable between requests.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(try_from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct WeightTable {
    inner: BTreeMap<String, f64>,
}

impl WeightTable {
    pub fn new(raw: &BTreeMap<String, f64>) -> Result<Self, IndexError> {
        Ok(Self {
            inner: normalize_weights(raw)?,
        })
    }

    pub fn from_pairs<T: Into<String>>(
        pairs: impl IntoIterator<Item = (T, f64)>,
    ) -> Result<Self, IndexError> {
        let raw: BTreeMap<String, f64> = pairs.into_iter().map(|(t, w)| (t.into(), w)).collect();
        Self::new(&raw)
    }

    pub fn get(&self, ticker: &str) -> Option<f64> {
        self.inner.get(ticker).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.inner.iter().map(|(t, w)| (t.as_str(), *w))
    }

    pub fn tickers(&self) -> Vec<String> {
        self.inner.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    //Construction fails on empty input so this only exists to pair with len
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl TryFrom<BTreeMap<String, f64>> for WeightTable {
    type Error = IndexError;

    fn try_from(value: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        WeightTable::new(&value)
    }
}

impl From<WeightTable> for BTreeMap<String, f64> {
    fn from(value: WeightTable) -> Self {
        value.inner
    }
}
