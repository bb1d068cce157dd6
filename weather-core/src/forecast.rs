//! Daily aggregation of the 3-hourly forecast series.
//!
//! Entries are bucketed by the location's local calendar day (UTC instant shifted by the
//! provider-supplied offset), the bucket containing the first entry is treated as "today"
//! and dropped, and each remaining day is reduced to min/max temperature plus the most
//! frequent icon.
//!
//! Callers must pass entries in chronological order: the first entry defines "today".

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Offset, Utc};
use std::collections::BTreeMap;

use crate::model::{DailySummary, ForecastEntry, IconCode};

/// Upper bound on the number of days returned by [`summarize`].
pub const MAX_FORECAST_DAYS: usize = 5;

/// Fixed offset for `utc_offset_seconds`, or UTC when the value is out of range (±24h).
pub fn fixed_offset(utc_offset_seconds: i32) -> FixedOffset {
    FixedOffset::east_opt(utc_offset_seconds).unwrap_or_else(|| Utc.fix())
}

/// Whether `at` shifted by the offset still lies inside chrono's date range.
pub fn has_local_time(at: DateTime<Utc>, utc_offset_seconds: i32) -> bool {
    let offset = fixed_offset(utc_offset_seconds);
    at.checked_add_signed(Duration::seconds(i64::from(offset.local_minus_utc())))
        .is_some()
}

/// Wall-clock instant at the location. Instants whose local time falls outside
/// chrono's range are returned in UTC.
pub fn local_datetime(at: DateTime<Utc>, utc_offset_seconds: i32) -> DateTime<FixedOffset> {
    if has_local_time(at, utc_offset_seconds) {
        at.with_timezone(&fixed_offset(utc_offset_seconds))
    } else {
        at.with_timezone(&Utc.fix())
    }
}

/// Calendar day at the location that contains `at`.
pub fn local_date(at: DateTime<Utc>, utc_offset_seconds: i32) -> NaiveDate {
    local_datetime(at, utc_offset_seconds).date_naive()
}

/// Partition entries by local date, keeping arrival order inside each day.
pub fn group_by_local_day(
    entries: &[ForecastEntry],
    utc_offset_seconds: i32,
) -> BTreeMap<NaiveDate, Vec<&ForecastEntry>> {
    let mut groups: BTreeMap<NaiveDate, Vec<&ForecastEntry>> = BTreeMap::new();
    for entry in entries {
        groups
            .entry(local_date(entry.at, utc_offset_seconds))
            .or_default()
            .push(entry);
    }
    groups
}

/// Summarise up to [`MAX_FORECAST_DAYS`] days following the day of `entries[0]`.
pub fn summarize(entries: &[ForecastEntry], utc_offset_seconds: i32) -> Vec<DailySummary> {
    let Some(first) = entries.first() else {
        return Vec::new();
    };
    let today = local_date(first.at, utc_offset_seconds);

    group_by_local_day(entries, utc_offset_seconds)
        .into_iter()
        .filter(|(date, _)| *date != today)
        .take(MAX_FORECAST_DAYS)
        .filter_map(|(date, day)| summarize_day(date, &day))
        .collect()
}

fn summarize_day(date: NaiveDate, day: &[&ForecastEntry]) -> Option<DailySummary> {
    let first = day.first()?;
    let (min_c, max_c) = day.iter().fold(
        (first.temperature_c, first.temperature_c),
        |(min, max), e| (min.min(e.temperature_c), max.max(e.temperature_c)),
    );

    Some(DailySummary {
        date,
        max_c,
        min_c,
        icon: representative_icon(day)?,
    })
}

/// Most frequent icon; on equal counts the one seen first wins.
fn representative_icon(day: &[&ForecastEntry]) -> Option<IconCode> {
    // (icon, count) in first-seen order
    let mut counts: Vec<(&IconCode, usize)> = Vec::new();
    for entry in day {
        match counts.iter_mut().find(|(icon, _)| *icon == &entry.icon) {
            Some((_, n)) => *n += 1,
            None => counts.push((&entry.icon, 1)),
        }
    }

    let mut best: Option<(&IconCode, usize)> = None;
    for (icon, n) in counts {
        if best.is_none_or(|(_, best_n)| n > best_n) {
            best = Some((icon, n));
        }
    }
    best.map(|(icon, _)| icon.clone())
}
