//! Yahoo Finance chart API
//!
//! Daily bars are requested with `interval=1d`. Timestamps in the response mark the session open
//! so they are shifted by the exchange offset (`meta.gmtoffset`) before taking the date, otherwise
//! sessions in negative offsets can land on the wrong day.

use std::sync::OnceLock;

use log::{debug, warn};
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::clock::Date;
use crate::error::IndexError;
use crate::source::{DailyClose, PriceSource};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    //Absent when the range has no sessions
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Live provider backed by the Yahoo Finance chart endpoint. Requests are blocking so this must
/// not be called from inside an async task.
///
/// The HTTP client is built on the first fetch and reused for every later one. The blocking client
/// cannot be created on an async thread so it is never built in `new`.
#[derive(Clone, Debug)]
pub struct YahooSource {
    base_url: String,
    client: OnceLock<Client>,
}

impl Default for YahooSource {
    fn default() -> Self {
        Self::new()
    }
}

impl YahooSource {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: OnceLock::new(),
        }
    }

    fn client(&self) -> Result<&Client, IndexError> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(IndexError::provider)?;
        //Another thread may have won the race, either client is fine
        Ok(self.client.get_or_init(|| client))
    }

    fn build_url(&self, ticker: &str, start: Date, end: Date) -> String {
        format!(
            "{}/{}?period1={}&period2={}&interval=1d",
            self.base_url,
            ticker,
            start.unix_timestamp(),
            end.unix_timestamp()
        )
    }

    fn parse_response(
        &self,
        json: &str,
        start: Date,
        end: Date,
    ) -> Result<Vec<DailyClose>, IndexError> {
        let response: ChartResponse = serde_json::from_str(json).map_err(IndexError::provider)?;

        if let Some(error) = response.chart.error {
            return Err(IndexError::provider(format!(
                "[{}] {}",
                error.code, error.description
            )));
        }

        let mut res = Vec::new();
        let Some(data) = response.chart.result.as_ref().and_then(|r| r.first()) else {
            return Ok(res);
        };

        let offset = data.meta.as_ref().and_then(|m| m.gmtoffset).unwrap_or(0);
        let timestamps = data.timestamp.as_deref().unwrap_or_default();
        let closes = data
            .indicators
            .quote
            .first()
            .map(|q| q.close.as_slice())
            .unwrap_or_default();

        for (i, ts) in timestamps.iter().enumerate() {
            let Some(date) = Date::from_unix_timestamp(ts + offset) else {
                warn!("YAHOO: dropping row with invalid timestamp {ts}");
                continue;
            };
            if date < start || date >= end {
                continue;
            }
            let close = closes.get(i).copied().flatten().filter(|c| c.is_finite());
            res.push(DailyClose { date, close });
        }
        Ok(res)
    }
}

impl PriceSource for YahooSource {
    fn fetch_closes(
        &self,
        ticker: &str,
        start: Date,
        end: Date,
    ) -> Result<Vec<DailyClose>, IndexError> {
        let url = self.build_url(ticker, start, end);
        debug!("YAHOO: GET {url}");

        // Chart API returns a json error body with a 404 for unknown tickers, parse it rather
        // than failing on status
        let text = self
            .client()?
            .get(&url)
            .send()
            .and_then(|resp| resp.text())
            .map_err(IndexError::provider)?;

        self.parse_response(&text, start, end)
    }
}
