//! Plain-text rendering of a weather report.
//!
//! Views borrow the report and implement `Display`; nothing is printed here.

use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};
use weather_core::{CurrentConditions, DailySummary, forecast::local_datetime};

/// Whole degrees, halves rounded up (`-2.5` -> `-2`). Integer output never shows `-0`.
fn degrees(t: f64) -> i64 {
    (t + 0.5).floor() as i64
}

/// Capitalise the first letter of every word: "broken clouds" -> "Broken Clouds".
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if at_word_start && c.is_alphanumeric() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !c.is_alphanumeric();
    }
    out
}

/// Current conditions block, times shown at the location.
#[derive(Debug, Clone, Copy)]
pub struct CurrentView<'a> {
    pub current: &'a CurrentConditions,
    pub utc_offset_seconds: i32,
    pub icons: bool,
}

impl CurrentView<'_> {
    fn local(&self, at: DateTime<Utc>) -> DateTime<FixedOffset> {
        local_datetime(at, self.utc_offset_seconds)
    }
}

impl fmt::Display for CurrentView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.current;

        match &c.country {
            Some(country) => writeln!(f, "{}, {}", c.location_name, country)?,
            None => writeln!(f, "{}", c.location_name)?,
        }
        writeln!(f, "{}", self.local(c.observed_at).format("%a, %b %-d %H:%M"))?;
        writeln!(f, "{}°C  {}", degrees(c.temperature_c), title_case(&c.condition))?;
        if self.icons {
            writeln!(f, "Icon:       {}", c.icon.url())?;
        }
        writeln!(f, "Feels like: {}°C", degrees(c.feels_like_c))?;
        writeln!(f, "Humidity:   {}%", c.humidity_pct)?;
        writeln!(f, "Wind:       {} m/s", c.wind_speed_mps)?;
        writeln!(f, "Pressure:   {} hPa", c.pressure_hpa)?;
        writeln!(f, "Sunrise:    {}", self.local(c.sunrise).format("%H:%M"))?;
        writeln!(f, "Sunset:     {}", self.local(c.sunset).format("%H:%M"))
    }
}

/// One line per day: weekday, rounded max / min, optional icon URL.
#[derive(Debug, Clone, Copy)]
pub struct ForecastView<'a> {
    pub days: &'a [DailySummary],
    pub icons: bool,
}

impl fmt::Display for ForecastView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for day in self.days {
            write!(
                f,
                "{}  {}° / {}°",
                day.date.format("%a"),
                degrees(day.max_c),
                degrees(day.min_c)
            )?;
            if self.icons {
                write!(f, "  {}", day.icon.url())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Full report: current conditions, a blank line, then the forecast lines.
#[derive(Debug, Clone, Copy)]
pub struct ReportView<'a> {
    pub current: CurrentView<'a>,
    pub forecast: ForecastView<'a>,
}

impl<'a> ReportView<'a> {
    pub fn new(
        current: &'a CurrentConditions,
        days: &'a [DailySummary],
        utc_offset_seconds: i32,
        icons: bool,
    ) -> Self {
        Self {
            current: CurrentView {
                current,
                utc_offset_seconds,
                icons,
            },
            forecast: ForecastView { days, icons },
        }
    }
}

impl fmt::Display for ReportView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.current)?;
        if !self.forecast.days.is_empty() {
            write!(f, "\n{}", self.forecast)?;
        }
        Ok(())
    }
}
