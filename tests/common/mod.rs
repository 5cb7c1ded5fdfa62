use pampas::clock::{Date, PreviousDate};
use pampas::config::{Anchor, IndexConfig};
use pampas::input::penelope::{Penelope, PenelopeBuilder};
use pampas::input::weights::WeightTable;
use pampas::series::DEFAULT_MAX_SERIES_DAYS;

pub fn date(val: &str) -> Date {
    Date::from_date_string(val).unwrap()
}

// Three tickers over two weeks, CCC is suspended from the 10th and has no close on the 12th
pub fn build_source() -> Penelope {
    let rows: Vec<(&str, &str, Option<f64>)> = vec![
        ("AAA", "2024-09-05", Some(100.0)),
        ("BBB", "2024-09-05", Some(40.0)),
        ("CCC", "2024-09-05", Some(10.0)),
        ("AAA", "2024-09-06", Some(102.0)),
        ("BBB", "2024-09-06", Some(41.0)),
        ("CCC", "2024-09-06", Some(10.5)),
        ("AAA", "2024-09-09", Some(101.0)),
        ("BBB", "2024-09-09", Some(42.0)),
        ("CCC", "2024-09-09", Some(11.0)),
        ("AAA", "2024-09-10", Some(104.0)),
        ("BBB", "2024-09-10", Some(44.0)),
        ("AAA", "2024-09-11", Some(105.0)),
        ("BBB", "2024-09-11", Some(43.0)),
        ("AAA", "2024-09-12", Some(107.0)),
        ("BBB", "2024-09-12", Some(45.0)),
        ("CCC", "2024-09-12", None),
    ];

    let mut builder = PenelopeBuilder::new();
    for (ticker, d, close) in rows {
        builder.add_close(ticker, date(d), close);
    }
    builder.build()
}

pub fn build_config(previous_date: PreviousDate) -> IndexConfig {
    IndexConfig {
        name: "Integration".to_string(),
        weights: WeightTable::from_pairs([("AAA", 50.0), ("BBB", 30.0), ("CCC", 20.0)]).unwrap(),
        anchor: Some(Anchor {
            date: date("2024-09-05"),
            value: 10292.99,
        }),
        lookback_days: 5,
        previous_date,
        max_series_days: DEFAULT_MAX_SERIES_DAYS,
    }
}
