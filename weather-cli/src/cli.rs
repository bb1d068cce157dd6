use anyhow::{Context, Result, anyhow, bail};
use clap::{ArgAction, Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use serde::Serialize;
use tracing::{debug, info};
use weather_core::{
    Config, DailySummary, ErrorKind, WeatherError, WeatherReport, provider_from_config,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather CLI")]
pub struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and default city.
    Configure,

    /// Show current weather and the daily forecast for a city.
    Show {
        /// City name; defaults to the configured default city.
        city: Option<String>,

        /// Print the report and daily summaries as JSON.
        #[arg(long)]
        json: bool,

        /// Include condition icon image URLs.
        #[arg(long)]
        icons: bool,
    },
}

#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    #[serde(flatten)]
    report: &'a WeatherReport,
    daily: &'a [DailySummary],
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, json, icons } => show(city.as_deref(), json, icons).await,
        }
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    let api_key = api_key.trim();
    if api_key.is_empty() {
        bail!("API key must not be empty");
    }
    config.set_api_key(api_key.to_string());

    let city = Text::new("Default city:")
        .with_default(&config.default_city)
        .prompt()
        .context("Failed to read default city")?;
    if let Some(city) = normalize_city(Some(&city), "") {
        config.default_city = city;
    }

    config.save()?;
    println!(
        "Configuration saved to {}",
        Config::config_file_path()?.display()
    );

    Ok(())
}

async fn show(city: Option<&str>, json: bool, icons: bool) -> Result<()> {
    let config = Config::load()?;
    let city = normalize_city(city, &config.default_city)
        .ok_or_else(|| anyhow!("City name must not be empty"))?;

    let provider = provider_from_config(&config)?;
    info!(city = %city, "Looking up weather");

    let report = provider.fetch_by_city(&city).await.map_err(|e| {
        debug!(error = %e, retryable = e.is_retryable(), "Weather lookup failed");
        anyhow!(user_message(&city, &e))
    })?;
    let days = report.daily_summaries();

    if json {
        let out = JsonOutput {
            report: &report,
            daily: &days,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        let view =
            render::ReportView::new(&report.current, &days, report.utc_offset_seconds, icons);
        print!("{view}");
    }

    Ok(())
}

/// Trimmed city name, falling back to `default` when no argument is given.
/// Blank input yields `None` so the provider is never called with it.
fn normalize_city(arg: Option<&str>, default: &str) -> Option<String> {
    let name = arg.unwrap_or(default).trim();
    (!name.is_empty()).then(|| name.to_string())
}

fn user_message(city: &str, err: &WeatherError) -> String {
    match err.kind() {
        ErrorKind::LocationNotFound => format!("City not found: {city}"),
        _ => format!("Failed to fetch weather: {}", err.detail()),
    }
}
