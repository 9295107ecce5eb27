use std::collections::BTreeMap;
use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use crate::config::Location;

/// One hourly sample: every cataloged metric sampled at the top of the hour
#[derive(Serialize, Clone)]
pub struct HourlySample {
    pub time: DateTime<FixedOffset>,
    #[serde(rename = "shortForecast")]
    pub short_forecast: Option<String>,
    #[serde(rename = "windDirection")]
    pub wind_direction: Option<String>,
    #[serde(rename = "windSpeedText")]
    pub wind_speed_text: Option<String>,
    pub metrics: BTreeMap<String, Option<f64>>,
}

/// Legend/chart metadata for one retained metric
#[derive(Serialize, Clone)]
pub struct MetricDescriptor {
    pub key: String,
    pub label: String,
    pub unit: String,
    pub color: String,
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct Extent {
    pub min: f64,
    pub max: f64,
}

/// One merged day/night summary per calendar date
#[derive(Serialize, Clone)]
pub struct DailySummary {
    pub name: String,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub unit: String,
    pub blurb: String,
    #[serde(rename = "precipProb")]
    pub precip_prob: Option<f64>,
}

/// Per-location result. Either the success fields are populated, or the error
/// field is set and every series is empty; never a mixture of the two.
#[derive(Serialize, Clone)]
pub struct LocationResult {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub hourly: Vec<HourlySample>,
    pub metrics: Vec<MetricDescriptor>,
    #[serde(rename = "metricExtents")]
    pub metric_extents: BTreeMap<String, Extent>,
    #[serde(rename = "groupExtents")]
    pub group_extents: BTreeMap<String, Extent>,
    #[serde(rename = "dailyForecast")]
    pub daily_forecast: Vec<DailySummary>,
}

impl LocationResult {
    /// Returns the error shape for a location whose fetch failed: the error
    /// string populated and every series field empty
    ///
    /// # Arguments
    ///
    /// * 'location' - the configured location the fetch was for
    /// * 'error' - what went wrong
    pub fn failed(location: &Location, error: String) -> LocationResult {
        LocationResult {
            name: location.name.clone(),
            lat: location.lat,
            lon: location.lon,
            updated: None,
            error: Some(error),
            hourly: Vec::new(),
            metrics: Vec::new(),
            metric_extents: BTreeMap::new(),
            group_extents: BTreeMap::new(),
            daily_forecast: Vec::new(),
        }
    }
}

/// The unit of publication: one complete result set covering all configured
/// locations for one refresh cycle, in configured order
#[derive(Serialize)]
pub struct Snapshot {
    #[serde(rename = "fetchedAt")]
    pub fetched_at: DateTime<Utc>,
    pub locations: Vec<LocationResult>,
}
