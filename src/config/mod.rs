//! Index definition loaded once at startup and passed into every computation.
use std::env;
use std::fs::read_to_string;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::clock::{Date, PreviousDate};
use crate::input::weights::WeightTable;
use crate::resolver::DEFAULT_LOOKBACK_DAYS;
use crate::series::DEFAULT_MAX_SERIES_DAYS;

pub const CONFIG_ENV: &str = "PAMPAS_CONFIG";

/// Fixed date and level the raw index is calibrated to.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Anchor {
    pub date: Date,
    pub value: f64,
}

fn default_lookback() -> i64 {
    DEFAULT_LOOKBACK_DAYS
}

fn default_max_series_days() -> i64 {
    DEFAULT_MAX_SERIES_DAYS
}

/// Immutable description of an index. Weights are normalized when the config is deserialized so
/// a loaded config is always valid.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct IndexConfig {
    pub name: String,
    pub weights: WeightTable,
    pub anchor: Option<Anchor>,
    #[serde(default = "default_lookback")]
    pub lookback_days: i64,
    #[serde(default)]
    pub previous_date: PreviousDate,
    //Longest span in calendar days a trend series may cover
    #[serde(default = "default_max_series_days")]
    pub max_series_days: i64,
}

impl IndexConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let contents =
            read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let config =
            Self::from_json(&contents).with_context(|| format!("parsing {}", path.display()))?;
        info!(
            "CONFIG: loaded {} with {} tickers from {}",
            config.name,
            config.weights.len(),
            path.display()
        );
        Ok(config)
    }

    /// Config from the file named by `PAMPAS_CONFIG`, or the built-in index when it is unset.
    pub fn from_env() -> Result<Self> {
        match env::var(CONFIG_ENV) {
            Ok(path) => Self::from_path(Path::new(&path)),
            Err(_) => {
                info!("CONFIG: {CONFIG_ENV} not set, using built-in index");
                Ok(Self::default())
            }
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        let raw = [
            ("BPAT.BA", 12.73),
            ("MOLA.BA", 7.13),
            ("CTIO.BA", 5.47),
            ("MOLI.BA", 6.17),
            ("CGPA2.BA", 5.07),
            ("BHIP.BA", 9.74),
            ("PATA.BA", 3.25),
            ("LEDE.BA", 5.36),
            ("INVJ.BA", 2.92),
            ("METR.BA", 6.92),
            ("CECO2.BA", 5.95),
            ("DGCU2.BA", 6.91),
            ("GBAN.BA", 1.35),
            ("OEST.BA", 1.32),
            ("AUSO.BA", 3.38),
            ("HAVA.BA", 2.64),
            ("MORI.BA", 2.57),
            ("CADO.BA", 0.75),
            ("SAMI.BA", 3.43),
            ("INTR.BA", 0.38),
            ("SEMI.BA", 1.72),
            ("AGRO.BA", 4.82),
        ];

        Self {
            name: "Galpones".to_string(),
            //Constant positive weights, normalizing cannot fail
            weights: WeightTable::from_pairs(raw).unwrap_or_else(|_| unreachable!()),
            anchor: Some(Anchor {
                date: time::macros::date!(2024 - 09 - 05).into(),
                value: 10292.99,
            }),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            previous_date: PreviousDate::CalendarDay,
            max_series_days: DEFAULT_MAX_SERIES_DAYS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::IndexConfig;
    use crate::clock::{Date, PreviousDate};

    #[test]
    fn test_that_default_index_is_normalized() {
        let config = IndexConfig::default();
        assert_eq!(config.weights.len(), 22);
        let sum: f64 = config.weights.iter().map(|(_, w)| w).sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert_eq!(
            config.anchor.unwrap().date,
            Date::from_ymd(2024, 9, 5).unwrap()
        );
    }

    #[test]
    fn test_that_json_config_applies_defaults() {
        let json = r#"{
            "name": "test",
            "weights": {"A": 60, "B": 40},
            "anchor": {"date": "2024-09-05", "value": 1000.0}
        }"#;
        let config = IndexConfig::from_json(json).unwrap();
        assert_eq!(config.lookback_days, 5);
        assert_eq!(config.previous_date, PreviousDate::CalendarDay);
        assert_eq!(config.max_series_days, 3660);
        assert!((config.weights.get("A").unwrap() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_that_trading_day_policy_parses() {
        let json = r#"{"name": "t", "weights": {"A": 1}, "anchor": null, "previous_date": "trading_day"}"#;
        let config = IndexConfig::from_json(json).unwrap();
        assert_eq!(config.previous_date, PreviousDate::TradingDay);
        assert!(config.anchor.is_none());
    }

    #[test]
    fn test_that_invalid_weights_fail_to_load() {
        assert!(IndexConfig::from_json(r#"{"name": "t", "weights": {}, "anchor": null}"#).is_err());
        assert!(
            IndexConfig::from_json(r#"{"name": "t", "weights": {"A": -1}, "anchor": null}"#)
                .is_err()
        );
    }

    #[test]
    fn test_that_config_round_trips_through_json() {
        let config = IndexConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed = IndexConfig::from_json(&json).unwrap();
        assert_eq!(parsed.anchor, config.anchor);
        assert_eq!(parsed.weights.tickers(), config.weights.tickers());
    }
}
