use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::{
    WeatherError,
    forecast::has_local_time,
    model::{Coordinates, CurrentConditions, ForecastEntry, IconCode, WeatherReport},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Client for the free OpenWeather `/weather` and `/forecast` endpoints.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), api_key, base_url)
    }

    /// Provider whose HTTP transport gives up after `timeout`.
    pub fn with_timeout(
        api_key: String,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WeatherError::Transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self::with_client(http, api_key, base_url))
    }

    pub fn with_client(http: Client, api_key: String, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            api_key,
            base_url,
            http,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// First lookup: resolves the name to coordinates, conditions and UTC offset.
    #[instrument(skip(self))]
    async fn fetch_current(&self, city: &str) -> Result<(CurrentConditions, i32), WeatherError> {
        let url = self.endpoint("weather");
        debug!(url = %url, "Fetching current weather");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|e| transport("current weather request", e))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| transport("reading current weather response", e))?;

        if status == StatusCode::NOT_FOUND {
            return Err(WeatherError::LocationNotFound(city.to_string()));
        }
        if !status.is_success() {
            return Err(WeatherError::UnexpectedResponse(format!(
                "Current weather request failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body).map_err(|e| {
            WeatherError::UnexpectedResponse(format!("Failed to parse current weather JSON: {e}"))
        })?;

        let offset = parsed.timezone;
        let current = parsed
            .into_conditions()
            .map_err(WeatherError::UnexpectedResponse)?;

        Ok((current, offset))
    }

    /// Second lookup: the 3-hourly series for exactly the coordinates resolved above.
    #[instrument(skip(self), fields(lat = %coords.lat, lon = %coords.lon))]
    async fn fetch_forecast(
        &self,
        coords: Coordinates,
        utc_offset_seconds: i32,
    ) -> Result<Vec<ForecastEntry>, WeatherError> {
        let url = self.endpoint("forecast");
        debug!(url = %url, "Fetching 5-day forecast");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", coords.lat.to_string()),
                ("lon", coords.lon.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await
            .map_err(|e| transport("forecast request", e))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| transport("reading forecast response", e))?;

        if !status.is_success() {
            return Err(WeatherError::ForecastUnavailable(format!(
                "Forecast request failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        let parsed: OwForecastResponse = serde_json::from_str(&body).map_err(|e| {
            WeatherError::ForecastUnavailable(format!("Failed to parse forecast JSON: {e}"))
        })?;

        let mut entries = parsed
            .list
            .into_iter()
            .map(|e| e.into_entry(utc_offset_seconds))
            .collect::<Result<Vec<_>, _>>()
            .map_err(WeatherError::ForecastUnavailable)?;

        // Aggregation takes the first entry as "today".
        entries.sort_by_key(|e| e.at);
        debug!(entries = entries.len(), "Forecast received");

        Ok(entries)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch_by_city(&self, city: &str) -> Result<WeatherReport, WeatherError> {
        let (current, utc_offset_seconds) = self.fetch_current(city).await?;
        let forecast = self
            .fetch_forecast(current.coordinates, utc_offset_seconds)
            .await?;

        Ok(WeatherReport {
            current,
            forecast,
            utc_offset_seconds,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: Option<String>,
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    coord: OwCoord,
    dt: i64,
    timezone: i32,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    sys: OwSys,
}

impl OwCurrentResponse {
    fn into_conditions(self) -> Result<CurrentConditions, String> {
        let offset = self.timezone;
        let weather = self
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| "Current weather response contained no condition".to_string())?;

        Ok(CurrentConditions {
            location_name: self.name,
            country: self.sys.country.filter(|c| !c.is_empty()),
            coordinates: Coordinates {
                lat: self.coord.lat,
                lon: self.coord.lon,
            },
            observed_at: timestamp(self.dt, offset, "dt")?,
            temperature_c: self.main.temp,
            feels_like_c: self.main.feels_like,
            humidity_pct: self.main.humidity,
            wind_speed_mps: self.wind.speed,
            pressure_hpa: self.main.pressure,
            sunrise: timestamp(self.sys.sunrise, offset, "sunrise")?,
            sunset: timestamp(self.sys.sunset, offset, "sunset")?,
            condition: weather.description,
            icon: IconCode::new(weather.icon),
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastWeather {
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwForecastMain,
    weather: Vec<OwForecastWeather>,
}

impl OwForecastEntry {
    fn into_entry(self, utc_offset_seconds: i32) -> Result<ForecastEntry, String> {
        let icon = self
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| format!("Forecast entry at {} contained no condition", self.dt))?
            .icon;

        Ok(ForecastEntry {
            at: timestamp(self.dt, utc_offset_seconds, "dt")?,
            temperature_c: self.main.temp,
            icon: IconCode::new(icon),
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

fn transport(what: &str, err: reqwest::Error) -> WeatherError {
    // The URL carries the API key in its query string.
    WeatherError::Transport(format!("{what} failed: {}", err.without_url()))
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

/// Instant for `ts` whose local time at `utc_offset_seconds` is representable.
fn timestamp(ts: i64, utc_offset_seconds: i32, field: &str) -> Result<DateTime<Utc>, String> {
    unix_to_utc(ts)
        .filter(|at| has_local_time(*at, utc_offset_seconds))
        .ok_or_else(|| format!("Invalid timestamp in `{field}`: {ts}"))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
