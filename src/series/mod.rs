use log::info;
use serde::{Deserialize, Serialize};

use crate::clock::{Date, DateRange};
use crate::config::IndexConfig;
use crate::error::IndexError;
use crate::index::{normalization_factor, weighted_index};
use crate::resolver::PriceResolver;
use crate::source::PriceSource;

pub const DEFAULT_MAX_SERIES_DAYS: i64 = 3660;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct TrendPoint {
    pub date: Date,
    pub raw_value: f64,
    pub value: f64,
}

/// Index level over a range of dates, the historical trend line.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct TrendSeries {
    pub points: Vec<TrendPoint>,
    //Weekdays with no resolvable ticker
    pub skipped: Vec<Date>,
    pub normalized: bool,
}

impl TrendSeries {
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn dates(&self) -> Vec<Date> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn count(&self) -> usize {
        self.points.len()
    }

    /// Day-over-day returns as fractions.
    pub fn pct_change(&self) -> Vec<f64> {
        let mut res: Vec<f64> = Vec::new();
        let mut iter = self.points.iter();
        let Some(first) = iter.next() else {
            return res;
        };
        let mut temp = first.value;
        for point in iter {
            res.push((point.value / temp) - 1.0);
            temp = point.value;
        }
        res
    }
}

/// Computes the index on every weekday in `[start, end]` with a single resolver, so each ticker's
/// closes are fetched once per lookback window rather than once per day.
///
/// Fails with [IndexError::InvalidRange] when `start` is after `end` or the range spans more than
/// `config.max_series_days`.
pub fn trend_series<S: PriceSource + ?Sized>(
    source: &S,
    config: &IndexConfig,
    start: Date,
    end: Date,
) -> Result<TrendSeries, IndexError> {
    let range = DateRange::new(start, end)?;
    if start.days_until(&end) > config.max_series_days {
        return Err(IndexError::InvalidRange { start, end });
    }
    let dates = range.weekdays_only().dates();
    let mut resolver = PriceResolver::new(source, config.lookback_days);

    let factor = config.anchor.as_ref().and_then(|anchor| {
        normalization_factor(&mut resolver, anchor.date, anchor.value, &config.weights).ok()
    });

    let mut points = Vec::with_capacity(dates.len());
    let mut skipped = Vec::new();
    for date in dates {
        match weighted_index(&mut resolver, date, &config.weights) {
            Ok(mut value) => {
                if let Some(factor) = factor {
                    value.normalize(factor);
                }
                points.push(TrendPoint {
                    date,
                    raw_value: value.raw_value,
                    value: value.value(),
                });
            }
            Err(_) => skipped.push(date),
        }
    }

    info!(
        "SERIES: {} points between {start} and {end}, {} skipped",
        points.len(),
        skipped.len()
    );
    Ok(TrendSeries {
        points,
        skipped,
        normalized: factor.is_some(),
    })
}
