use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::api::{self, ApiError};
use crate::chart::render_day_svg;
use crate::config::ServerConfig;
use crate::dashboard::{DashboardView, active_day, render_page};
use crate::models::{PresetLocation, WeeklyForecast};
use crate::service::ForecastService;
use crate::{Result, WeatherboardError};

/// Shared state of all handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ForecastService>,
    pub default_location: PresetLocation,
}

#[derive(Debug, Deserialize)]
struct DashboardQuery {
    location: Option<String>,
    day: Option<NaiveDate>,
}

pub fn router(state: AppState, static_dir: &str, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(dashboard))
        .route("/locations/{slug}/refresh", post(refresh_location))
        .route("/charts/{slug}/{file}", get(day_chart))
        .nest("/api", api::router())
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn run(state: AppState, server: &ServerConfig) -> anyhow::Result<()> {
    let app = router(
        state,
        &server.static_dir,
        Duration::from_secs(u64::from(server.request_timeout_seconds)),
    );

    let addr = format!("{}:{}", server.host, server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Dashboard running at http://{}", addr);
    axum::serve(listener, app)
        .await
        .context("Web server terminated")?;
    Ok(())
}

fn render(
    location: PresetLocation,
    forecast: Option<&WeeklyForecast>,
    day: Option<NaiveDate>,
    error: Option<String>,
) -> String {
    let chart_svg = forecast
        .and_then(|f| active_day(f, day))
        .and_then(|d| match render_day_svg(location, d) {
            Ok(svg) => Some(svg),
            Err(e) => {
                tracing::warn!(error = %e, "Chart not rendered");
                None
            }
        });

    render_page(&DashboardView {
        location,
        forecast,
        selected_day: day,
        chart_svg: chart_svg.as_deref(),
        error,
    })
}

async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> std::result::Result<Html<String>, ApiError> {
    let location = match query.location {
        Some(slug) => slug.parse()?,
        None => state.default_location,
    };

    let page = match state.service.load(location, location.today()).await {
        Ok(loaded) => render(
            location,
            Some(&loaded.forecast),
            query.day,
            loaded.refresh_error.map(|e| e.user_message()),
        ),
        Err(e) => render(location, None, query.day, Some(e.user_message())),
    };
    Ok(Html(page))
}

async fn refresh_location(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> std::result::Result<Response, ApiError> {
    let location: PresetLocation = slug.parse()?;

    match state.service.refresh(location, location.today()).await {
        Ok(_) => Ok(Redirect::to(&format!("/?location={}", location.slug())).into_response()),
        Err(refresh_error) => {
            // show whatever is still stored together with the failure
            let stored = match state.service.stored(location).await {
                Ok(forecast) => Some(forecast),
                Err(WeatherboardError::NotFound { .. }) => None,
                Err(e) => return Err(e.into()),
            };
            let page = render(
                location,
                stored.as_ref(),
                None,
                Some(refresh_error.user_message()),
            );
            Ok((StatusCode::BAD_GATEWAY, Html(page)).into_response())
        }
    }
}

fn parse_chart_file(file: &str) -> Result<NaiveDate> {
    file.strip_suffix(".svg")
        .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
        .ok_or_else(|| {
            WeatherboardError::validation(format!("Expected YYYY-MM-DD.svg, got '{file}'"))
        })
}

async fn day_chart(
    State(state): State<AppState>,
    Path((slug, file)): Path<(String, String)>,
) -> std::result::Result<Response, ApiError> {
    let location: PresetLocation = slug.parse()?;
    let date = parse_chart_file(&file)?;

    let forecast = state.service.stored(location).await?;
    let day = forecast.day(date).ok_or_else(|| {
        WeatherboardError::not_found(format!("No forecast stored for {location} on {date}"))
    })?;
    let svg = render_day_svg(location, day)?;

    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response())
}
