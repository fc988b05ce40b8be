//! Integration tests for the weatherboard dashboard and CLI

use std::process::Command;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{Days, NaiveDate, NaiveTime, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use weatherboard::web::{self, AppState};
use weatherboard::{
    ForecastProvider, ForecastService, ForecastStore, HourlyReading, PresetLocation, WeatherCode,
    WeatherboardConfig, WeatherboardError, WeeklyForecast,
};

/// Seven days of hourly data; the code cycles with the hour
struct FakeProvider {
    calls: AtomicUsize,
    failing: AtomicBool,
    hanging: AtomicBool,
}

#[async_trait]
impl ForecastProvider for FakeProvider {
    async fn fetch_week(
        &self,
        location: PresetLocation,
        start: NaiveDate,
    ) -> weatherboard::Result<WeeklyForecast> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.hanging.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(WeatherboardError::api("HTTP error status code: 503"));
        }
        // one extra day past the window to check it is dropped
        let readings = (0..8)
            .flat_map(|d| {
                let date = start + Days::new(d);
                (0..24u32).map(move |h| HourlyReading {
                    timestamp: date.and_time(NaiveTime::from_hms_opt(h, 0, 0).unwrap()),
                    temperature_c: 5.0 + h as f32 / 2.0,
                    precipitation_probability: Some(20),
                    precipitation_mm: 0.1,
                    wind_speed_kmh: 8.0 + d as f32,
                    weather_code: WeatherCode([0, 3, 61, 95][(h % 4) as usize]),
                })
            })
            .collect();
        Ok(WeeklyForecast::from_readings(
            location,
            start,
            7,
            readings,
            Utc::now(),
        ))
    }
}

struct TestApp {
    router: Router,
    provider: Arc<FakeProvider>,
    _dir: tempfile::TempDir,
}

fn test_app() -> TestApp {
    test_app_with(&WeatherboardConfig::default())
}

/// App wired with the timeouts of `config`
fn test_app_with(config: &WeatherboardConfig) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let store = ForecastStore::open(dir.path()).unwrap();
    let provider = Arc::new(FakeProvider {
        calls: AtomicUsize::new(0),
        failing: AtomicBool::new(false),
        hanging: AtomicBool::new(false),
    });
    let deadline = Duration::from_secs(u64::from(config.weather.fetch_deadline_seconds));
    let service = ForecastService::new(provider.clone(), store).with_fetch_deadline(deadline);
    let state = AppState {
        service: Arc::new(service),
        default_location: PresetLocation::London,
    };
    let request_timeout = Duration::from_secs(u64::from(config.server.request_timeout_seconds));
    TestApp {
        router: web::router(state, "static", request_timeout),
        provider,
        _dir: dir,
    }
}

async fn send(router: &Router, method: &str, uri: &str) -> (StatusCode, Vec<(String, String)>, String) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response
        .headers()
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
        .collect();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, String::from_utf8_lossy(&body).into_owned())
}

fn header_value<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

#[tokio::test]
async fn test_dashboard_default_location() {
    let app = test_app();

    let (status, _, html) = send(&app.router, "GET", "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Weather forecast for the week"));
    assert!(html.contains("<h2>London</h2>"));
    assert!(html.contains("<svg"));
    assert_eq!(html.matches("<a class=\"tab").count(), 7);
    assert!(!html.contains("role=\"alert\""));
}

#[tokio::test]
async fn test_dashboard_selected_day() {
    let app = test_app();
    let day = PresetLocation::Vienna.today() + Days::new(2);

    let uri = format!("/?location=vienna&day={}", day.format("%Y-%m-%d"));
    let (status, _, html) = send(&app.router, "GET", &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(&format!("This is the date: {}", day.format("%d/%m"))));
}

#[tokio::test]
async fn test_dashboard_unknown_location() {
    let app = test_app();
    let (status, _, body) = send(&app.router, "GET", "/?location=paris").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Unknown location"));
}

#[tokio::test]
async fn test_selecting_location_twice_fetches_once() {
    let app = test_app();

    send(&app.router, "GET", "/?location=tignes").await;
    send(&app.router, "GET", "/?location=tignes").await;

    assert_eq!(app.provider.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_api_locations() {
    let app = test_app();
    let (status, _, body) = send(&app.router, "GET", "/api/locations").await;

    assert_eq!(status, StatusCode::OK);
    let locations: Value = serde_json::from_str(&body).unwrap();
    let slugs: Vec<&str> = locations
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs, ["london", "tignes", "whistler", "bologna", "vienna"]);
}

#[tokio::test]
async fn test_api_forecast_window_for_every_preset() {
    let app = test_app();

    for location in PresetLocation::ALL {
        let today = location.today();
        let uri = format!("/api/forecast/{}", location.slug());
        let (status, _, body) = send(&app.router, "GET", &uri).await;
        assert_eq!(status, StatusCode::OK, "{body}");

        let forecast: Value = serde_json::from_str(&body).unwrap();
        let days = forecast["days"].as_array().unwrap();
        assert!(!days.is_empty() && days.len() <= 7);
        for day in days {
            let date: NaiveDate = day["date"].as_str().unwrap().parse().unwrap();
            assert!(date >= today && date < today + Days::new(7));
            for hour in day["hours"].as_array().unwrap() {
                let code = WeatherCode(hour["weather_code"].as_u64().unwrap() as u8);
                assert_eq!(hour["icon"].as_str().unwrap(), code.icon().name());
            }
        }
    }
}

#[tokio::test]
async fn test_refresh_redirects_back_to_dashboard() {
    let app = test_app();

    let (status, headers, _) = send(&app.router, "POST", "/locations/bologna/refresh").await;

    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(
        header_value(&headers, header::LOCATION.as_str()),
        Some("/?location=bologna")
    );
    assert_eq!(app.provider.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_data() {
    let app = test_app();

    let (_, _, before) = send(&app.router, "GET", "/api/forecast/whistler").await;
    app.provider.failing.store(true, Ordering::SeqCst);

    let (status, _, html) = send(&app.router, "POST", "/locations/whistler/refresh").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(html.contains("role=\"alert\""));
    assert!(html.contains("503"));
    assert!(html.contains("<svg"));

    let (status, _, body) = send(&app.router, "POST", "/api/forecast/whistler/refresh").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.contains("weather API"));

    let (_, _, after) = send(&app.router, "GET", "/api/forecast/whistler").await;
    assert_eq!(before, after);
}

#[tokio::test(start_paused = true)]
async fn test_hanging_api_still_renders_stored_forecast() {
    let app = test_app_with(&WeatherboardConfig::default());

    let (status, _, _) = send(&app.router, "GET", "/?location=london").await;
    assert_eq!(status, StatusCode::OK);
    app.provider.hanging.store(true, Ordering::SeqCst);

    let (status, _, html) = send(&app.router, "POST", "/locations/london/refresh").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(html.contains("role=\"alert\""));
    assert!(html.contains("did not answer"));
    assert!(html.contains("<svg"));
}

#[tokio::test]
async fn test_failed_first_fetch_shows_error() {
    let app = test_app();
    app.provider.failing.store(true, Ordering::SeqCst);

    let (status, _, html) = send(&app.router, "GET", "/?location=vienna").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("role=\"alert\""));
    assert!(html.contains("No forecast available yet."));
}

#[tokio::test]
async fn test_day_chart() {
    let app = test_app();
    let today = PresetLocation::London.today();
    send(&app.router, "GET", "/").await;

    let uri = format!("/charts/london/{}.svg", today.format("%Y-%m-%d"));
    let (status, headers, svg) = send(&app.router, "GET", &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        header_value(&headers, header::CONTENT_TYPE.as_str()),
        Some("image/svg+xml")
    );
    assert!(svg.contains("<svg"));

    let uri = format!("/charts/london/{}.svg", (today + Days::new(30)).format("%Y-%m-%d"));
    let (status, _, _) = send(&app.router, "GET", &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_chart_without_stored_data() {
    let app = test_app();
    let (status, _, _) = send(&app.router, "GET", "/charts/tignes/2026-10-16.svg").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.provider.calls.load(Ordering::SeqCst), 0);
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_weatherboard"))
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("weatherboard"));
    assert!(stdout.contains("Seven-day weather dashboard"));
}

/// Test that the locations subcommand lists every preset
#[test]
fn test_cli_locations() {
    let output = Command::new(env!("CARGO_BIN_EXE_weatherboard"))
        .arg("locations")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for location in PresetLocation::ALL {
        assert!(stdout.contains(location.slug()));
    }
    assert!(stdout.contains("Europe/London"));
}

/// Test error handling for an unknown location
#[test]
fn test_cli_show_unknown_location() {
    let output = Command::new(env!("CARGO_BIN_EXE_weatherboard"))
        .args(["show", "atlantis"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown location"));
}
