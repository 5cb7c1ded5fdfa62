//! # What is Pampas?
//!
//! Pampas computes a composite index from a fixed basket of equities: a weighted sum of daily
//! closing prices, calibrated against a reference level on an anchor date, with day-over-day
//! variation for the index and for each component.
//!
//! The library can be used directly or through the JSON server (`pampas_server`). A one-shot
//! command line report is also provided (`pampas_report`).
//!
//! # Implementation
//!
//! A computation is composed of:
//! - A source, [YahooSource](crate::source::yahoo::YahooSource) is an example. Sources implement
//! [PriceSource](crate::source::PriceSource) which is the only interface the pipeline needs from
//! a market-data provider: closes for a ticker over a range of dates.
//! - A [PriceResolver](crate::resolver::PriceResolver) which snaps a date to the nearest prior
//! trading day within a lookback window. A resolver lives for one request and memoizes every
//! lookup.
//! - The [index](crate::index) functions that aggregate resolved closes with a
//! [WeightTable](crate::input::weights::WeightTable) and normalize them against an anchor.
//! - The [variation](crate::variation) functions for percentage changes.
//!
//! [IndexConfig](crate::config::IndexConfig) is loaded once and passed to every call, there is no
//! global state. Everything a request fetches is dropped at the end of the request.
//!
//! ```text
//! cargo run --bin pampas_server [ipv4_address] [port] [yahoo|demo]
//! ```
pub mod clock;
pub mod config;
pub mod error;
pub mod http;
pub mod index;
pub mod input;
pub mod report;
pub mod resolver;
pub mod series;
pub mod source;
pub mod variation;
