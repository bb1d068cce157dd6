//! Integration tests for the OpenWeather provider against a mock HTTP server.

use std::time::Duration;

use chrono::NaiveDate;
use weather_core::{ErrorKind, OpenWeatherProvider, WeatherProvider, forecast::local_date};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

const NEW_YORK_OFFSET: i32 = -18_000;
// 2024-01-15 15:00 UTC, 10:00 in New York.
const OBSERVED_AT: i64 = 1_705_330_800;

fn current_body() -> serde_json::Value {
    serde_json::json!({
        "coord": { "lon": -74.006, "lat": 40.7143 },
        "weather": [{ "id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d" }],
        "base": "stations",
        "main": { "temp": 5.2, "feels_like": 1.9, "temp_min": 3.9, "temp_max": 6.1, "pressure": 1021, "humidity": 64 },
        "visibility": 10000,
        "wind": { "speed": 4.6, "deg": 300 },
        "dt": OBSERVED_AT,
        "sys": { "type": 2, "id": 2008101, "country": "US", "sunrise": 1_705_320_600, "sunset": 1_705_355_400 },
        "timezone": NEW_YORK_OFFSET,
        "id": 5128581,
        "name": "New York",
        "cod": 200
    })
}

/// 40 three-hourly entries starting 13:00 local on the observation day.
fn forecast_body() -> serde_json::Value {
    let first = OBSERVED_AT + 3 * 3_600;
    let list: Vec<serde_json::Value> = (0..40)
        .map(|i| {
            let icon = if i % 8 < 4 { "01n" } else { "02d" };
            let temp = (i % 8) as f64 - 2.0;
            serde_json::json!({
                "dt": first + i * 3 * 3_600,
                "main": { "temp": temp, "feels_like": -5.0, "humidity": 70 },
                "weather": [{ "id": 800, "main": "Clear", "description": "clear sky", "icon": icon }],
                "dt_txt": ""
            })
        })
        .collect();

    serde_json::json!({
        "cod": "200",
        "message": 0,
        "cnt": list.len(),
        "list": list,
        "city": { "name": "New York", "country": "US", "timezone": NEW_YORK_OFFSET }
    })
}

fn provider(server: &MockServer) -> OpenWeatherProvider {
    OpenWeatherProvider::new("TEST_KEY".to_string(), server.uri())
}

async fn mount_current(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "New York"))
        .and(query_param("units", "metric"))
        .and(query_param("appid", "TEST_KEY"))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn fetch_by_city_returns_current_and_forecast() {
    let server = MockServer::start().await;
    mount_current(&server, ResponseTemplate::new(200).set_body_json(current_body())).await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("lat", "40.7143"))
        .and(query_param("lon", "-74.006"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(1)
        .mount(&server)
        .await;

    let report = provider(&server).fetch_by_city("New York").await.unwrap();

    assert_eq!(report.current.location_name, "New York");
    assert_eq!(report.current.country.as_deref(), Some("US"));
    assert_eq!(report.current.humidity_pct, 64);
    assert_eq!(report.current.icon.as_str(), "04d");
    assert_eq!(report.utc_offset_seconds, NEW_YORK_OFFSET);
    assert_eq!(report.forecast.len(), 40);
    assert!(report.forecast.windows(2).all(|w| w[0].at < w[1].at));
}

#[tokio::test]
async fn summaries_never_include_observation_day() {
    let server = MockServer::start().await;
    mount_current(&server, ResponseTemplate::new(200).set_body_json(current_body())).await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(&server)
        .await;

    let report = provider(&server).fetch_by_city("New York").await.unwrap();
    let today = local_date(report.current.observed_at, report.utc_offset_seconds);
    let days = report.daily_summaries();

    assert_eq!(today, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    assert_eq!(days.len(), 5);
    assert!(days.iter().all(|d| d.date != today));
    assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 1, 16).unwrap());
    assert_eq!(days[0].max_c, 5.0);
    assert_eq!(days[0].min_c, -2.0);
}

#[tokio::test]
async fn unknown_city_is_location_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(serde_json::json!({ "cod": "404", "message": "city not found" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(0)
        .mount(&server)
        .await;

    let err = provider(&server).fetch_by_city("Atlantis").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::LocationNotFound);
    assert_eq!(err.detail(), "Atlantis");
}

#[tokio::test]
async fn forecast_failure_is_forecast_unavailable() {
    let server = MockServer::start().await;
    mount_current(&server, ResponseTemplate::new(200).set_body_json(current_body())).await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream busy"))
        .mount(&server)
        .await;

    let err = provider(&server).fetch_by_city("New York").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ForecastUnavailable);
    assert!(err.detail().contains("503"));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn malformed_forecast_is_forecast_unavailable() {
    let server = MockServer::start().await;
    mount_current(&server, ResponseTemplate::new(200).set_body_json(current_body())).await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = provider(&server).fetch_by_city("New York").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ForecastUnavailable);
}

#[tokio::test]
async fn invalid_api_key_is_unexpected_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({ "cod": 401, "message": "Invalid API key" })),
        )
        .mount(&server)
        .await;

    let err = provider(&server).fetch_by_city("New York").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UnexpectedResponse);
    assert!(err.detail().contains("401"));
}

#[tokio::test]
async fn timeout_is_transport_error_without_api_key() {
    let server = MockServer::start().await;
    mount_current(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(current_body())
            .set_delay(Duration::from_secs(2)),
    )
    .await;

    let provider = OpenWeatherProvider::with_timeout(
        "TEST_KEY".to_string(),
        server.uri(),
        Duration::from_millis(100),
    )
    .unwrap();
    let err = provider.fetch_by_city("New York").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(!err.to_string().contains("TEST_KEY"));
}

#[tokio::test]
async fn forecast_timeout_is_transport_error_without_api_key() {
    let server = MockServer::start().await;
    mount_current(&server, ResponseTemplate::new(200).set_body_json(current_body())).await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(forecast_body())
                .set_delay(Duration::from_secs(2)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenWeatherProvider::with_timeout(
        "TEST_KEY".to_string(),
        server.uri(),
        Duration::from_millis(200),
    )
    .unwrap();
    let err = provider.fetch_by_city("New York").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.detail().contains("forecast request"));
    assert!(!err.to_string().contains("TEST_KEY"));
}
