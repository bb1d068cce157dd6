//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The [`WeatherProvider`] abstraction and its OpenWeather implementation
//! - Shared domain models (current conditions, forecast entries, daily summaries)
//! - Aggregation of the 3-hourly forecast into per-day summaries
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod forecast;
pub mod model;
pub mod provider;

pub use config::Config;
pub use error::{ErrorKind, WeatherError};
pub use forecast::{MAX_FORECAST_DAYS, summarize};
pub use model::{
    Coordinates, CurrentConditions, DailySummary, ForecastEntry, IconCode, WeatherReport,
};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider, provider_from_config};
