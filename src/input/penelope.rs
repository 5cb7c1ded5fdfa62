use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use rand::thread_rng;
use rand_distr::{Distribution, Uniform};

use crate::clock::{Date, DateRange};
use crate::error::IndexError;
use crate::source::file::load_closes;
use crate::source::{DailyClose, PriceSource};

// Penelope holds daily closes in memory. Files are loaded into Penelope once and then queried
// like any other provider, tests and the demo server build it directly.
#[derive(Debug, Default)]
pub struct Penelope {
    inner: HashMap<String, BTreeMap<Date, Option<f64>>>,
    //Number of queries served, lets callers check that caching avoids repeat fetches
    requests: AtomicUsize,
}

impl Penelope {
    pub fn get_close(&self, ticker: &str, date: &Date) -> Option<f64> {
        self.inner.get(ticker)?.get(date).copied().flatten()
    }

    pub fn tickers(&self) -> Vec<String> {
        let mut tickers: Vec<String> = self.inner.keys().cloned().collect();
        tickers.sort();
        tickers
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }

    pub fn from_csv(path: &Path) -> anyhow::Result<Self> {
        let mut builder = PenelopeBuilder::new();
        for (ticker, row) in load_closes(path)? {
            builder.add_close(ticker, row.date, row.close);
        }
        Ok(builder.build())
    }

    /// Random walk of closes for every ticker over `length_in_days` days ending on `end`,
    /// weekends are left out as a provider would.
    pub fn random(tickers: &[String], end: Date, length_in_days: i64) -> Self {
        let start_dist = Uniform::new(50.0, 5000.0);
        let move_dist = Uniform::new(-0.03, 0.03);
        let mut rng = thread_rng();

        let mut builder = PenelopeBuilder::new();
        let dates = end
            .minus_days(length_in_days)
            .and_then(|start| DateRange::new(start, end).ok())
            .map(|range| range.weekdays_only().dates())
            .unwrap_or_default();

        for ticker in tickers {
            let mut price: f64 = start_dist.sample(&mut rng);
            for date in &dates {
                price *= 1.0 + move_dist.sample(&mut rng);
                builder.add_close(ticker.clone(), *date, Some(price));
            }
        }
        builder.build()
    }
}

impl PriceSource for Penelope {
    fn fetch_closes(
        &self,
        ticker: &str,
        start: Date,
        end: Date,
    ) -> Result<Vec<DailyClose>, IndexError> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        let mut res = Vec::new();
        if let Some(closes) = self.inner.get(ticker) {
            if start < end {
                for (date, close) in closes.range(start..end) {
                    res.push(DailyClose {
                        date: *date,
                        close: *close,
                    });
                }
            }
        }
        Ok(res)
    }
}

pub struct PenelopeBuilder {
    inner: HashMap<String, BTreeMap<Date, Option<f64>>>,
}

impl PenelopeBuilder {
    pub fn new() -> Self {
        Self {
            inner: HashMap::new(),
        }
    }

    pub fn build(&mut self) -> Penelope {
        let inner = std::mem::take(&mut self.inner);
        Penelope {
            inner,
            requests: AtomicUsize::new(0),
        }
    }

    pub fn add_close(&mut self, ticker: impl Into<String>, date: Date, close: Option<f64>) {
        self.inner
            .entry(ticker.into())
            .or_default()
            .insert(date, close);
    }
}

impl Default for PenelopeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
