use std::collections::BTreeMap;
use chrono::{DateTime, NaiveDate};
use crate::models::nws_forecast::Period;
use crate::models::snapshot::DailySummary;

#[derive(Default)]
struct DayParts<'a> {
    day: Option<&'a Period>,
    night: Option<&'a Period>,
}

/// Merges the day and night forecast periods into one summary per calendar
/// date, keyed on the first ten characters of the start timestamp. Periods
/// without a parseable start are skipped; summaries come out in date order.
///
/// # Arguments
///
/// * 'periods' - the daily forecast periods in source order
pub fn build_daily(periods: &[Period]) -> Vec<DailySummary> {
    let mut days: BTreeMap<&str, DayParts> = BTreeMap::new();

    for period in periods {
        let Some(start) = period.start_time.as_deref() else { continue };
        if DateTime::parse_from_rfc3339(start).is_err() {
            continue;
        }

        let parts = days.entry(&start[..10]).or_default();
        if period.is_daytime {
            parts.day = Some(period);
        } else {
            parts.night = Some(period);
        }
    }

    days.iter().map(|(date, parts)| summarize(date, parts)).collect()
}

fn summarize(date: &str, parts: &DayParts) -> DailySummary {
    let day = parts.day;
    let night = parts.night;

    let name = day
        .and_then(|p| p.name.clone())
        .filter(|n| !n.is_empty())
        .or_else(|| night.and_then(|p| p.name.clone()).filter(|n| !n.is_empty()))
        .unwrap_or_else(|| weekday_name(date));

    let unit = day
        .and_then(|p| p.temperature_unit.clone())
        .filter(|u| !u.is_empty())
        .or_else(|| night.and_then(|p| p.temperature_unit.clone()).filter(|u| !u.is_empty()))
        .unwrap_or_default();

    let day_prob = day.and_then(|p| p.probability_of_precipitation.as_ref()).and_then(|v| v.value);
    let night_prob = night.and_then(|p| p.probability_of_precipitation.as_ref()).and_then(|v| v.value);
    let precip_prob = match (day_prob, night_prob) {
        (Some(d), Some(n)) => Some(d.max(n)),
        (d, n) => d.or(n),
    };

    DailySummary {
        name,
        high: day.and_then(|p| p.temperature),
        low: night.and_then(|p| p.temperature),
        unit,
        blurb: build_blurb(
            day.and_then(|p| p.short_forecast.as_deref()).filter(|s| !s.is_empty()),
            night.and_then(|p| p.short_forecast.as_deref()).filter(|s| !s.is_empty()),
        ),
        precip_prob,
    }
}

/// Weekday name for dates whose periods carry no name of their own
fn weekday_name(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%A").to_string())
        .unwrap_or_else(|_| date.to_string())
}

/// Combines the day and night narratives as "X then Y" with consecutive
/// duplicate segments collapsed; a single-sided narrative is used verbatim
fn build_blurb(day: Option<&str>, night: Option<&str>) -> String {
    match (day, night) {
        (Some(d), Some(n)) => dedupe_then(&format!("{} then {}", d, n)),
        (Some(d), None) => d.to_string(),
        (None, Some(n)) => n.to_string(),
        (None, None) => String::new(),
    }
}

/// Splits on the literal " then " separator, case-insensitive, trims the
/// segments and collapses consecutive duplicates before rejoining
fn dedupe_then(text: &str) -> String {
    let mut segments = Vec::new();
    let mut pos = 0;
    while let Some(i) = find_separator(text, pos) {
        segments.push(text[pos..i].trim());
        pos = i + 6;
    }
    segments.push(text[pos..].trim());

    let mut deduped: Vec<&str> = Vec::new();
    for segment in segments {
        if segment.is_empty() {
            continue;
        }
        if deduped.last() != Some(&segment) {
            deduped.push(segment);
        }
    }

    deduped.join(" then ")
}

fn find_separator(text: &str, from: usize) -> Option<usize> {
    const SEP: &[u8] = b" then ";
    let bytes = text.as_bytes();

    (from..bytes.len().checked_sub(SEP.len() - 1)?)
        .find(|&i| bytes[i..i + SEP.len()].eq_ignore_ascii_case(SEP))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::nws_forecast::ValueField;

    fn period(start: &str, is_daytime: bool) -> Period {
        Period {
            start_time: Some(start.to_string()),
            is_daytime,
            ..Default::default()
        }
    }

    #[test]
    fn identical_day_and_night_narratives_collapse() {
        let mut day = period("2026-01-01T06:00:00-05:00", true);
        day.short_forecast = Some("Sunny".to_string());
        let mut night = period("2026-01-01T18:00:00-05:00", false);
        night.short_forecast = Some("Sunny".to_string());

        let daily = build_daily(&[day, night]);
        assert_eq!(daily[0].blurb, "Sunny");
    }

    #[test]
    fn distinct_narratives_are_joined_and_inner_duplicates_collapse() {
        let mut day = period("2026-01-01T06:00:00-05:00", true);
        day.short_forecast = Some("Rain then Snow".to_string());
        let mut night = period("2026-01-01T18:00:00-05:00", false);
        night.short_forecast = Some("Snow".to_string());

        let daily = build_daily(&[day, night]);
        assert_eq!(daily[0].blurb, "Rain then Snow");
    }

    #[test]
    fn single_sided_narrative_is_used_verbatim() {
        let mut night = period("2026-01-01T18:00:00-05:00", false);
        night.short_forecast = Some("Partly Cloudy then Patchy Fog".to_string());

        let daily = build_daily(&[night]);
        assert_eq!(daily[0].blurb, "Partly Cloudy then Patchy Fog");
    }

    #[test]
    fn high_low_and_precip_probability_merge_across_day_and_night() {
        let mut day = period("2026-01-01T06:00:00-05:00", true);
        day.name = Some("New Year's Day".to_string());
        day.temperature = Some(43.0);
        day.temperature_unit = Some("F".to_string());
        day.probability_of_precipitation = Some(ValueField { value: Some(30.0) });
        let mut night = period("2026-01-01T18:00:00-05:00", false);
        night.temperature = Some(28.0);
        night.probability_of_precipitation = Some(ValueField { value: Some(60.0) });

        let daily = build_daily(&[day, night]);
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].name, "New Year's Day");
        assert_eq!(daily[0].high, Some(43.0));
        assert_eq!(daily[0].low, Some(28.0));
        assert_eq!(daily[0].unit, "F");
        assert_eq!(daily[0].precip_prob, Some(60.0));
    }

    #[test]
    fn unnamed_days_fall_back_to_the_weekday() {
        // 2026-01-01 is a Thursday
        let mut night = period("2026-01-01T18:00:00-05:00", false);
        night.temperature = Some(30.0);

        let daily = build_daily(&[night]);
        assert_eq!(daily[0].name, "Thursday");
        assert_eq!(daily[0].high, None);
        assert_eq!(daily[0].precip_prob, None);
    }

    #[test]
    fn dates_come_out_in_order_and_bad_starts_are_skipped() {
        let mut a = period("2026-01-02T06:00:00-05:00", true);
        a.name = Some("Friday".to_string());
        let mut b = period("2026-01-01T18:00:00-05:00", false);
        b.name = Some("Thursday Night".to_string());
        let bad = period("not-a-time", true);

        let daily = build_daily(&[a, b, bad]);
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].name, "Thursday Night");
        assert_eq!(daily[1].name, "Friday");
    }
}
