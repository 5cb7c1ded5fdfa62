//! Selected date against previous date, the request the dashboards run on every submit.
use std::fmt::Write;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::clock::Date;
use crate::config::IndexConfig;
use crate::error::IndexError;
use crate::index::{normalization_factor, weighted_index, IndexValue};
use crate::resolver::PriceResolver;
use crate::source::PriceSource;
use crate::variation::{component_variations, pct_change, ComponentVariation};

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Report {
    pub name: String,
    pub selected_date: Date,
    pub previous_date: Date,
    pub selected: Option<IndexValue>,
    pub previous: Option<IndexValue>,
    pub factor: Option<f64>,
    pub pct_change: Option<f64>,
    pub components: Vec<ComponentVariation>,
    //True when every common ticker resolved to the same trading day on both dates
    pub same_trading_day: bool,
    pub warnings: Vec<String>,
}

fn same_trading_day(selected: &IndexValue, previous: &IndexValue) -> bool {
    let mut common = 0;
    for (ticker, point) in &selected.components {
        if let Some(prev) = previous.components.get(ticker) {
            if prev.date != point.date {
                return false;
            }
            common += 1;
        }
    }
    common > 0
}

/// Builds the report for `selected_date`. Failures in one branch are kept as warnings so the
/// caller always gets whatever could be computed.
///
/// When the config has an anchor that cannot be resolved no variation is computed, raw values are
/// not compared against each other. Only a previous date that cannot be formed is an error.
pub fn build_report<S: PriceSource + ?Sized>(
    source: &S,
    config: &IndexConfig,
    selected_date: Date,
) -> Result<Report, IndexError> {
    let previous_date = config.previous_date.apply(selected_date)?;
    info!("REPORT: {} for {selected_date} against {previous_date}", config.name);

    let mut resolver = PriceResolver::new(source, config.lookback_days);
    let mut warnings = Vec::new();

    let mut selected = weighted_index(&mut resolver, selected_date, &config.weights)
        .map_err(|e| warnings.push(e.to_string()))
        .ok();
    let mut previous = weighted_index(&mut resolver, previous_date, &config.weights)
        .map_err(|e| warnings.push(e.to_string()))
        .ok();

    let mut anchor_failed = false;
    let factor = config.anchor.as_ref().and_then(|anchor| {
        normalization_factor(&mut resolver, anchor.date, anchor.value, &config.weights)
            .map_err(|e| {
                anchor_failed = true;
                warnings.push(format!("normalization unavailable: {e}"));
            })
            .ok()
    });

    if let Some(factor) = factor {
        for value in [selected.as_mut(), previous.as_mut()].into_iter().flatten() {
            value.normalize(factor);
        }
    }

    let mut change = None;
    let mut components = Vec::new();
    let mut same_day = false;
    match (&selected, &previous) {
        (Some(sel), Some(prev)) if !anchor_failed => {
            change = pct_change(sel.value(), prev.value())
                .map_err(|e| warnings.push(e.to_string()))
                .ok();
            components = component_variations(sel, prev, &config.weights);
            same_day = same_trading_day(sel, prev);
        }
        _ => warnings.push("unable to calculate variation due to missing data".to_string()),
    }

    for warning in &warnings {
        warn!("REPORT: {warning}");
    }

    Ok(Report {
        name: config.name.clone(),
        selected_date,
        previous_date,
        selected,
        previous,
        factor,
        pct_change: change,
        components,
        same_trading_day: same_day,
        warnings,
    })
}

/// Plain text version of a report, one line per figure.
pub fn render_text(report: &Report) -> String {
    let mut out = String::new();
    let label = if report.factor.is_some() {
        " (normalized)"
    } else {
        ""
    };

    //Writing to a String cannot fail
    let _ = writeln!(out, "{}", report.name);
    for (date, value) in [
        (report.selected_date, &report.selected),
        (report.previous_date, &report.previous),
    ] {
        match value {
            Some(v) => {
                let _ = writeln!(out, "Weighted average on {date}{label}: {:.2}", v.value());
                for ticker in &v.missing {
                    let _ = writeln!(out, "  No data available for {ticker} on {date}");
                }
            }
            None => {
                let _ = writeln!(out, "Weighted average on {date}: no data");
            }
        }
    }

    match report.pct_change {
        Some(change) => {
            let _ = writeln!(
                out,
                "Percentage variation between {} and {}: {:.2}%",
                report.selected_date, report.previous_date, change
            );
        }
        None => {
            let _ = writeln!(out, "Unable to calculate percentage variation due to missing data.");
        }
    }
    if report.same_trading_day {
        let _ = writeln!(out, "Both dates resolve to the same trading day.");
    }

    if !report.components.is_empty() {
        let _ = writeln!(out, "Components:");
        for c in &report.components {
            let _ = writeln!(
                out,
                "  {:<10} {:>6.2}% {:>8.2}%",
                c.ticker,
                c.weight * 100.0,
                c.pct_change
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{build_report, render_text};
    use crate::clock::{Date, PreviousDate};
    use crate::config::{Anchor, IndexConfig};
    use crate::input::penelope::{Penelope, PenelopeBuilder};
    use crate::input::weights::WeightTable;
    use crate::series::DEFAULT_MAX_SERIES_DAYS;

    fn date(val: &str) -> Date {
        Date::from_date_string(val).unwrap()
    }

    fn setup() -> (Penelope, IndexConfig) {
        let mut builder = PenelopeBuilder::new();
        //Thursday 5th, Friday 6th, Monday 9th
        builder.add_close("A", date("2024-09-05"), Some(100.0));
        builder.add_close("B", date("2024-09-05"), Some(50.0));
        builder.add_close("A", date("2024-09-06"), Some(110.0));
        builder.add_close("B", date("2024-09-06"), Some(50.0));
        builder.add_close("A", date("2024-09-09"), Some(121.0));
        builder.add_close("B", date("2024-09-09"), Some(55.0));

        let config = IndexConfig {
            name: "Test".to_string(),
            weights: WeightTable::from_pairs([("A", 60.0), ("B", 40.0)]).unwrap(),
            anchor: Some(Anchor {
                date: date("2024-09-05"),
                value: 1000.0,
            }),
            lookback_days: 5,
            previous_date: PreviousDate::CalendarDay,
            max_series_days: DEFAULT_MAX_SERIES_DAYS,
        };
        (builder.build(), config)
    }

    #[test]
    fn test_that_report_normalizes_and_computes_variation() {
        let (source, config) = setup();
        let report = build_report(&source, &config, date("2024-09-06")).unwrap();

        //Anchor raw is 80, selected raw is 86
        assert!((report.factor.unwrap() - 12.5).abs() < 1e-12);
        let selected = report.selected.as_ref().unwrap();
        assert!((selected.normalized_value.unwrap() - 1075.0).abs() < 1e-9);
        assert!((report.pct_change.unwrap() - 7.5).abs() < 1e-9);
        assert_eq!(report.components.len(), 2);
        assert!(!report.same_trading_day);
        assert!(report.warnings.is_empty());
        //Anchor is the previous date so it is served from the resolver cache
        assert_eq!(source.requests(), 4);
    }

    #[test]
    fn test_that_monday_compares_against_friday_under_calendar_policy() {
        let (source, config) = setup();
        let report = build_report(&source, &config, date("2024-09-09")).unwrap();
        assert_eq!(report.previous_date, date("2024-09-08"));
        let previous = report.previous.as_ref().unwrap();
        assert_eq!(previous.components["A"].date, date("2024-09-06"));
        assert!((report.pct_change.unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_that_sunday_against_saturday_is_flagged() {
        let (source, config) = setup();
        let report = build_report(&source, &config, date("2024-09-08")).unwrap();
        assert!(report.same_trading_day);
        assert_eq!(report.pct_change, Some(0.0));
    }

    #[test]
    fn test_that_unresolvable_anchor_stops_variation() {
        let (source, mut config) = setup();
        config.anchor = Some(Anchor {
            date: date("2020-01-01"),
            value: 1000.0,
        });
        let report = build_report(&source, &config, date("2024-09-06")).unwrap();
        assert!(report.factor.is_none());
        assert!(report.selected.as_ref().unwrap().normalized_value.is_none());
        assert!(report.pct_change.is_none());
        assert!(report.components.is_empty());
        assert!(!report.same_trading_day);
        assert_eq!(report.warnings.len(), 2);
        assert!(render_text(&report).contains("Unable to calculate percentage variation"));
    }

    #[test]
    fn test_that_index_without_anchor_compares_raw_values() {
        let (source, mut config) = setup();
        config.anchor = None;
        let report = build_report(&source, &config, date("2024-09-06")).unwrap();
        assert!(report.factor.is_none());
        assert!((report.pct_change.unwrap() - 7.5).abs() < 1e-9);
        assert_eq!(report.components.len(), 2);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_that_last_calendar_date_reports_without_panicking() {
        let (source, config) = setup();
        let report = build_report(&source, &config, date("9999-12-31")).unwrap();
        assert_eq!(report.previous_date, date("9999-12-30"));
        assert!(report.selected.is_none());
        assert!(report.previous.is_none());
        assert!(report.pct_change.is_none());
        assert!(report.warnings.iter().any(|w| w.contains("invalid date: 9999-12-31")));

        let first = Date::from(time::Date::MIN);
        assert!(build_report(&source, &config, first).is_err());
    }

    #[test]
    fn test_that_no_data_gives_no_variation() {
        let (source, config) = setup();
        let report = build_report(&source, &config, date("2023-01-10")).unwrap();
        assert!(report.selected.is_none());
        assert!(report.previous.is_none());
        assert!(report.pct_change.is_none());
        assert!(report.components.is_empty());

        let text = render_text(&report);
        assert!(text.contains("Unable to calculate percentage variation"));
    }

    #[test]
    fn test_that_text_shows_two_decimals() {
        let (source, config) = setup();
        let report = build_report(&source, &config, date("2024-09-06")).unwrap();
        let text = render_text(&report);
        assert!(text.contains("Weighted average on 2024-09-06 (normalized): 1075.00"));
        assert!(text.contains("Percentage variation between 2024-09-06 and 2024-09-05: 7.50%"));
    }
}
