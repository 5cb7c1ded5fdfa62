use std::env;

use actix_web::{web, App, HttpServer};
use log::info;
use pampas::clock::Date;
use pampas::config::IndexConfig;
use pampas::http::server::{index, info, report, series, AppState, Source};
use pampas::input::penelope::Penelope;
use pampas::source::yahoo::YahooSource;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    let address: String = args.get(1).cloned().unwrap_or_else(|| "127.0.0.1".to_string());
    let port: u16 = match args.get(2) {
        Some(port) => port.parse().map_err(std::io::Error::other)?,
        None => 8080,
    };
    let mode: String = args.get(3).cloned().unwrap_or_else(|| "yahoo".to_string());

    let config = IndexConfig::from_env().map_err(std::io::Error::other)?;

    let source: Source = match mode.as_str() {
        "demo" => {
            // A year of random closes for the configured tickers ending today
            Box::new(Penelope::random(&config.weights.tickers(), Date::today(), 365))
        }
        "yahoo" => Box::new(YahooSource::new()),
        other => {
            return Err(std::io::Error::other(format!(
                "unknown source {other}, expected yahoo or demo"
            )))
        }
    };

    info!("SERVER: serving {} from {mode} on {address}:{port}", config.name);
    let app_state = web::Data::new(AppState::new(config, source));

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .service(info)
            .service(index)
            .service(report)
            .service(series)
    })
    .bind((address, port))?
    .run()
    .await
}
