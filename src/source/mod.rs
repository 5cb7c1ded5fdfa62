//! Sources are the external market-data providers the pipeline reads closing prices from. The
//! only operation the pipeline depends on is a query by ticker over a half-open date range.
//!
//! Sources that are read once (files) convert into an Input, [Penelope](crate::input::penelope::Penelope),
//! which is also the in-memory source used in tests. Sources that are queried live, such as
//! [YahooSource](crate::source::yahoo::YahooSource), implement [PriceSource] directly.
pub mod file;
pub mod yahoo;

use serde::{Deserialize, Serialize};

use crate::clock::Date;
use crate::error::IndexError;

/// One row returned by a provider. Providers can return rows for holidays or halted sessions with
/// no close, these are kept as `None` so callers can tell them apart from missing rows.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct DailyClose {
    pub date: Date,
    pub close: Option<f64>,
}

pub trait PriceSource {
    /// Closing prices for `ticker` with `start <= date < end`, in any order.
    fn fetch_closes(&self, ticker: &str, start: Date, end: Date)
        -> Result<Vec<DailyClose>, IndexError>;
}

impl<S: PriceSource + ?Sized> PriceSource for Box<S> {
    fn fetch_closes(
        &self,
        ticker: &str,
        start: Date,
        end: Date,
    ) -> Result<Vec<DailyClose>, IndexError> {
        (**self).fetch_closes(ticker, start, end)
    }
}
