use std::env;

use anyhow::{bail, Result};
use pampas::clock::Date;
use pampas::config::IndexConfig;
use pampas::report::{build_report, render_text};
use pampas::source::yahoo::YahooSource;

fn main() -> Result<()> {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    let date = match args.get(1) {
        Some(val) => Date::from_date_string(val)?,
        None => Date::today(),
    };
    let format = args.get(2).map(String::as_str).unwrap_or("text");

    let config = IndexConfig::from_env()?;
    let report = build_report(&YahooSource::new(), &config, date)?;

    match format {
        "text" => print!("{}", render_text(&report)),
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        other => bail!("unknown format {other}, expected text or json"),
    }
    Ok(())
}
