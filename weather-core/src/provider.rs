use crate::{Config, WeatherError, WeatherReport, provider::openweather::OpenWeatherProvider};
use async_trait::async_trait;
use std::{fmt::Debug, time::Duration};

pub mod openweather;

/// Source of current conditions plus forecast for a named place.
///
/// Implementations perform no caching and no retries. Dropping the returned
/// future abandons any in-flight request.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Resolve `city` and return its current conditions together with the forecast
    /// series for the same coordinates. `city` is expected to be trimmed and non-empty.
    async fn fetch_by_city(&self, city: &str) -> Result<WeatherReport, WeatherError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.require_api_key()?;
    let provider = OpenWeatherProvider::with_timeout(
        api_key,
        config.base_url.clone(),
        Duration::from_secs(config.timeout_secs),
    )?;

    Ok(Box::new(provider))
}
