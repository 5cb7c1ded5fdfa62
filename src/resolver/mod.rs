//! Resolves the close of a ticker on a date, snapping to the nearest prior trading day.
use std::collections::{BTreeMap, HashMap};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::clock::Date;
use crate::error::IndexError;
use crate::source::PriceSource;

pub const DEFAULT_LOOKBACK_DAYS: i64 = 5;

/// Close used for a ticker, `date` is the trading day the price comes from which can be earlier
/// than the date that was requested.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct PricePoint {
    pub ticker: String,
    pub date: Date,
    pub close: f64,
}

#[derive(Debug, Default)]
struct TickerCache {
    //Every non-null close seen for the ticker keyed by trading day
    closes: BTreeMap<Date, f64>,
    //Half-open windows already fetched
    windows: Vec<(Date, Date)>,
}

impl TickerCache {
    //Windows are a handful of days so checking day by day is fine
    fn covers(&self, start: Date, end: Date) -> bool {
        let mut day = start;
        while day < end {
            if !self.windows.iter().any(|(s, e)| *s <= day && day < *e) {
                return false;
            }
            //`day < end` so the next day always exists
            let Some(next) = day.plus_days(1) else {
                return false;
            };
            day = next;
        }
        true
    }

    fn latest_in(&self, start: Date, date: Date) -> Option<(Date, f64)> {
        self.closes
            .range(start..=date)
            .next_back()
            .map(|(d, c)| (*d, *c))
    }
}

/// Request-scoped resolver.
///
/// A resolver should be created per request and dropped with it. It memoizes every lookup so that
/// sibling computations in the same request (selected date, previous date, anchor date) never
/// query the provider twice for the same ticker and window. Nothing is shared across requests.
pub struct PriceResolver<'a, S: PriceSource + ?Sized> {
    source: &'a S,
    lookback_days: i64,
    resolved: HashMap<(String, Date), Option<PricePoint>>,
    cache: HashMap<String, TickerCache>,
}

impl<'a, S: PriceSource + ?Sized> PriceResolver<'a, S> {
    pub fn new(source: &'a S, lookback_days: i64) -> Self {
        Self {
            source,
            lookback_days: lookback_days.max(0),
            resolved: HashMap::new(),
            cache: HashMap::new(),
        }
    }

    pub fn lookback_days(&self) -> i64 {
        self.lookback_days
    }

    /// Close already seen for `ticker` on exactly `date` in this request.
    pub fn cached_close(&self, ticker: &str, date: &Date) -> Option<f64> {
        self.cache.get(ticker)?.closes.get(date).copied()
    }

    /// Looks for the latest close in `[date - lookback, date]`. Never returns a close from after
    /// `date`.
    ///
    /// Fails with [IndexError::InvalidDate] when the window cannot be formed, which only happens at
    /// the ends of the calendar.
    pub fn resolve_price(&mut self, ticker: &str, date: Date) -> Result<PricePoint, IndexError> {
        let key = (ticker.to_string(), date);
        if let Some(hit) = self.resolved.get(&key) {
            debug!("RESOLVER: cache hit for {ticker} on {date}");
            return hit.clone().ok_or_else(|| IndexError::TickerNotFound {
                ticker: ticker.to_string(),
                date,
            });
        }

        let (start, end) = match (date.minus_days(self.lookback_days), date.plus_days(1)) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                return Err(IndexError::InvalidDate {
                    value: date.to_string(),
                })
            }
        };

        let entry = self.cache.entry(ticker.to_string()).or_default();
        if !entry.covers(start, end) {
            let rows = self.source.fetch_closes(ticker, start, end)?;
            for row in rows {
                if let Some(close) = row.close.filter(|c| c.is_finite()) {
                    entry.closes.insert(row.date, close);
                }
            }
            entry.windows.push((start, end));
        }

        let res = entry.latest_in(start, date).map(|(resolved, close)| PricePoint {
            ticker: ticker.to_string(),
            date: resolved,
            close,
        });
        if res.is_none() {
            warn!("RESOLVER: no data for {ticker} between {start} and {date}");
        }

        self.resolved.insert(key, res.clone());
        res.ok_or_else(|| IndexError::TickerNotFound {
            ticker: ticker.to_string(),
            date,
        })
    }
}

/// Single lookup with its own resolver, for callers that only need one price.
pub fn resolve_price<S: PriceSource + ?Sized>(
    source: &S,
    ticker: &str,
    date: Date,
    lookback_days: i64,
) -> Result<PricePoint, IndexError> {
    PriceResolver::new(source, lookback_days).resolve_price(ticker, date)
}
