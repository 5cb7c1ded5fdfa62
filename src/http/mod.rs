pub mod server {
    use actix_web::{get, web, ResponseError};
    use derive_more::{Display, Error};
    use serde::{Deserialize, Serialize};

    use crate::clock::Date;
    use crate::config::{Anchor, IndexConfig};
    use crate::error::IndexError;
    use crate::index::{normalization_factor, weighted_index, IndexValue};
    use crate::report::{build_report, Report};
    use crate::resolver::PriceResolver;
    use crate::series::{trend_series, TrendSeries};
    use crate::source::PriceSource;

    pub type Source = Box<dyn PriceSource + Send + Sync>;

    pub struct AppState {
        pub config: IndexConfig,
        pub source: Source,
    }

    impl AppState {
        pub fn new(config: IndexConfig, source: Source) -> Self {
            Self { config, source }
        }
    }

    pub type PampasState = web::Data<AppState>;

    #[derive(Debug, Display, Error)]
    pub enum PampasError {
        #[display("bad date: {value}")]
        BadDate { value: String },
        #[display("{reason}")]
        Index { reason: IndexError },
        #[display("internal error")]
        Internal,
    }

    impl From<IndexError> for PampasError {
        fn from(value: IndexError) -> Self {
            PampasError::Index { reason: value }
        }
    }

    impl ResponseError for PampasError {
        fn status_code(&self) -> actix_web::http::StatusCode {
            match self {
                PampasError::BadDate { .. } => actix_web::http::StatusCode::BAD_REQUEST,
                PampasError::Index { reason } => match reason {
                    IndexError::InvalidRange { .. } | IndexError::InvalidDate { .. } => {
                        actix_web::http::StatusCode::BAD_REQUEST
                    }
                    IndexError::InsufficientData { .. } | IndexError::DivideByZero => {
                        actix_web::http::StatusCode::UNPROCESSABLE_ENTITY
                    }
                    _ => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                },
                PampasError::Internal => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
            }
        }
    }

    fn parse_date(value: &str) -> Result<Date, PampasError> {
        Date::from_date_string(value).map_err(|_| PampasError::BadDate {
            value: value.to_string(),
        })
    }

    // Providers block on network calls, every computation runs on the blocking pool
    async fn run_blocking<T, F>(app: &PampasState, f: F) -> Result<T, PampasError>
    where
        T: Send + 'static,
        F: FnOnce(&AppState) -> T + Send + 'static,
    {
        let state = app.clone();
        tokio::task::spawn_blocking(move || f(&state))
            .await
            .map_err(|_| PampasError::Internal)
    }

    #[derive(Debug, Deserialize, Serialize)]
    pub struct InfoResponse {
        pub name: String,
        pub tickers: Vec<String>,
        pub anchor: Option<Anchor>,
        pub lookback_days: i64,
    }

    #[get("/info")]
    pub async fn info(app: PampasState) -> Result<web::Json<InfoResponse>, PampasError> {
        Ok(web::Json(InfoResponse {
            name: app.config.name.clone(),
            tickers: app.config.weights.tickers(),
            anchor: app.config.anchor.clone(),
            lookback_days: app.config.lookback_days,
        }))
    }

    #[get("/index/{date}")]
    pub async fn index(
        app: PampasState,
        path: web::Path<(String,)>,
    ) -> Result<web::Json<IndexValue>, PampasError> {
        let (date,) = path.into_inner();
        let date = parse_date(&date)?;

        let value = run_blocking(&app, move |state| {
            let mut resolver = PriceResolver::new(state.source.as_ref(), state.config.lookback_days);
            let mut value = weighted_index(&mut resolver, date, &state.config.weights)?;
            if let Some(anchor) = &state.config.anchor {
                if let Ok(factor) = normalization_factor(
                    &mut resolver,
                    anchor.date,
                    anchor.value,
                    &state.config.weights,
                ) {
                    value.normalize(factor);
                }
            }
            Ok::<IndexValue, IndexError>(value)
        })
        .await??;
        Ok(web::Json(value))
    }

    #[get("/report/{date}")]
    pub async fn report(
        app: PampasState,
        path: web::Path<(String,)>,
    ) -> Result<web::Json<Report>, PampasError> {
        let (date,) = path.into_inner();
        let date = parse_date(&date)?;

        let report = run_blocking(&app, move |state| {
            build_report(state.source.as_ref(), &state.config, date)
        })
        .await??;
        Ok(web::Json(report))
    }

    #[get("/series/{start}/{end}")]
    pub async fn series(
        app: PampasState,
        path: web::Path<(String, String)>,
    ) -> Result<web::Json<TrendSeries>, PampasError> {
        let (start, end) = path.into_inner();
        let start = parse_date(&start)?;
        let end = parse_date(&end)?;

        let series = run_blocking(&app, move |state| {
            trend_series(state.source.as_ref(), &state.config, start, end)
        })
        .await??;
        Ok(web::Json(series))
    }
}
