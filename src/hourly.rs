use std::collections::{BTreeMap, HashSet};
use chrono::{DateTime, Utc};
use crate::intervals::{self, MS_PER_HOUR};
use crate::metrics::{self, NormalizedMetric};
use crate::models::nws_forecast::Period;
use crate::models::snapshot::HourlySample;

/// Assumed snow to liquid ratio for the frozen precipitation correction
const SNOW_LIQUID_RATIO: f64 = 10.0;

/// Builds the hourly series by sampling every cataloged metric at each
/// forecast period start. Periods without a parseable start instant are
/// skipped and hours are deduplicated, first period wins. A metric with no
/// interval covering the instant samples to null, never an error.
///
/// # Arguments
///
/// * 'periods' - the hourly forecast periods in source order
/// * 'catalog' - the normalized metric catalog for the location
pub fn build_hourly(periods: &[Period], catalog: &[NormalizedMetric]) -> Vec<HourlySample> {
    let mut samples = Vec::with_capacity(periods.len());
    let mut seen_hours = HashSet::new();

    for period in periods {
        let Some(start) = period.start_time.as_deref() else { continue };
        let Ok(time) = DateTime::parse_from_rfc3339(start) else { continue };

        let time_ms = time.timestamp_millis();
        let hour_ms = time_ms - time_ms.rem_euclid(MS_PER_HOUR);
        if !seen_hours.insert(hour_ms) {
            continue;
        }

        let mut values = BTreeMap::new();
        for metric in catalog {
            let raw = intervals::sample_at(&metric.intervals, time_ms, metrics::is_accumulation(&metric.key));
            values.insert(metric.key.clone(), raw.map(metric.convert).and_then(intervals::sanitize));
        }

        samples.push(HourlySample {
            time,
            short_forecast: period.short_forecast.clone(),
            wind_direction: period.wind_direction.clone(),
            wind_speed_text: period.wind_speed.clone(),
            metrics: values,
        });
    }

    samples
}

/// Applies the post-processing steps to the freshly built hourly series:
/// liquid equivalent correction, past-hour trimming, pruning of metrics that
/// are null across every remaining sample, and label ordering of the catalog.
///
/// # Arguments
///
/// * 'samples' - the hourly series, chronological in source order
/// * 'catalog' - the metric catalog the series was sampled from
/// * 'now' - the processing instant used to trim past hours
pub fn post_process(samples: &mut Vec<HourlySample>, catalog: &mut Vec<NormalizedMetric>, now: DateTime<Utc>) {
    apply_liquid_correction(samples);
    trim_past_hours(samples, now);

    catalog.retain(|m| samples.iter().any(|s| s.metrics.get(&m.key).is_some_and(|v| v.is_some())));
    catalog.sort_by(|a, b| a.label.cmp(&b.label));
}

/// Corrects double counted frozen precipitation in the source accumulation
/// series: where both are present, the liquid equivalent of the snowfall is
/// subtracted from the precipitation amount, floored at zero
fn apply_liquid_correction(samples: &mut [HourlySample]) {
    for sample in samples.iter_mut() {
        let Some(snow) = sample.metrics.get("snowfallAmount").copied().flatten() else { continue };
        if let Some(Some(qpf)) = sample.metrics.get_mut("quantitativePrecipitation") {
            *qpf = (*qpf - snow / SNOW_LIQUID_RATIO).max(0.0);
        }
    }
}

/// Drops every sample strictly before the current top of hour, but only when
/// the series begins in the past
fn trim_past_hours(samples: &mut Vec<HourlySample>, now: DateTime<Utc>) {
    let Some(first) = samples.first() else { return };

    let now_ms = now.timestamp_millis();
    let current_hour_ms = now_ms - now_ms.rem_euclid(MS_PER_HOUR);

    if current_hour_ms > first.time.timestamp_millis() {
        samples.retain(|s| s.time.timestamp_millis() >= current_hour_ms);
    }
}
