use derive_more::{Display, Error};

use crate::clock::Date;

/// Errors produced by the index pipeline.
///
/// Per-ticker failures ([IndexError::TickerNotFound], [IndexError::Provider]) are absorbed by the
/// aggregator and reported alongside the result. The remaining kinds halt the computation that
/// produced them but never the process.
#[derive(Clone, Debug, Display, Error, PartialEq)]
pub enum IndexError {
    #[display("no trading day found for {ticker} on or before {date}")]
    TickerNotFound { ticker: String, date: Date },
    #[display("insufficient data to compute index on {date}")]
    InsufficientData { date: Date },
    #[display("cannot compute variation against a zero value")]
    DivideByZero,
    #[display("weight table is empty or sums to zero")]
    EmptyWeights,
    #[display("invalid weight {weight} for {ticker}")]
    InvalidWeight { ticker: String, weight: f64 },
    #[display("invalid date: {value}")]
    InvalidDate { value: String },
    #[display("invalid range: {start} to {end}")]
    InvalidRange { start: Date, end: Date },
    #[display("provider error: {message}")]
    Provider { message: String },
}

impl IndexError {
    pub fn provider(message: impl ToString) -> Self {
        IndexError::Provider {
            message: message.to_string(),
        }
    }
}
