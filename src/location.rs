use chrono::{DateTime, Utc};
use crate::config::Location;
use crate::models::nws_forecast::{ForecastDoc, GridDoc};
use crate::models::snapshot::{LocationResult, MetricDescriptor};
use crate::{daily, extents, hourly, metrics};

/// Builds the complete per-location result from the three forecast documents:
/// the metric catalog from the grid, the sampled and post-processed hourly
/// series, metric and group extents and the daily summaries.
///
/// # Arguments
///
/// * 'location' - the configured location the documents were fetched for
/// * 'hourly_doc' - the hourly forecast document
/// * 'daily_doc' - the day/night forecast document
/// * 'grid_doc' - the raw gridded forecast document
/// * 'now' - the current time, used to trim hours already in the past
pub fn assemble(
    location: &Location,
    hourly_doc: &ForecastDoc,
    daily_doc: &ForecastDoc,
    grid_doc: &GridDoc,
    now: DateTime<Utc>,
) -> LocationResult {
    let mut catalog = metrics::build_catalog(&grid_doc.properties);
    let mut samples = hourly::build_hourly(&hourly_doc.properties.periods, &catalog);
    hourly::post_process(&mut samples, &mut catalog, now);

    let descriptors: Vec<MetricDescriptor> = catalog
        .iter()
        .map(|m| MetricDescriptor {
            key: m.key.clone(),
            label: m.label.clone(),
            unit: m.unit.clone(),
            color: metrics::metric_color(&m.key).to_string(),
        })
        .collect();

    let (metric_extents, group_extents) = extents::calculate(&samples, &descriptors);

    LocationResult {
        name: location.name.clone(),
        lat: location.lat,
        lon: location.lon,
        updated: hourly_doc.properties.update_time.clone(),
        error: None,
        metrics: descriptors,
        hourly: samples,
        metric_extents,
        group_extents,
        daily_forecast: daily::build_daily(&daily_doc.properties.periods),
    }
}
