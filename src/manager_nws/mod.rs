pub mod errors;

use std::time::Duration;
use chrono::Utc;
use log::error;
use serde::de::DeserializeOwned;
use ureq::Agent;
use crate::config::Location;
use crate::location;
use crate::manager_nws::errors::NWSError;
use crate::models::nws_forecast::{ForecastDoc, GridDoc, PointDoc};
use crate::models::snapshot::{LocationResult, Snapshot};

const REQUEST_DOMAIN: &str = "https://api.weather.gov";
pub const USER_AGENT: &str = "wxpoint-dashboard";

/// Client for the api.weather.gov forecast API
pub struct NWS {
    agent: Agent,
}

impl NWS {
    /// Returns a new NWS client with a 30 second request timeout
    pub fn new() -> NWS {
        let config = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(30)))
            .build();

        NWS { agent: config.into() }
    }

    /// Fetches and assembles the forecast for every configured location.
    /// A failure for one location is recorded in its result and does not
    /// affect the others.
    ///
    /// # Arguments
    ///
    /// * 'locations' - the configured locations
    pub fn fetch_all(&self, locations: &[Location]) -> Snapshot {
        snapshot_from(locations, |location| self.fetch_location(location))
    }

    /// Resolves the point metadata for a location and fetches its hourly,
    /// daily and gridded forecast documents
    ///
    /// # Arguments
    ///
    /// * 'location' - the location to fetch
    fn fetch_location(&self, location: &Location) -> Result<LocationResult, NWSError> {
        let url = format!("{}/points/{},{}", REQUEST_DOMAIN, location.lat, location.lon);
        let point: PointDoc = self.fetch_json(&url)?;

        let hourly_doc: ForecastDoc = self.fetch_json(&point.properties.forecast_hourly)?;
        let daily_doc: ForecastDoc = self.fetch_json(&point.properties.forecast)?;
        let grid_doc: GridDoc = self.fetch_json(&point.properties.forecast_grid_data)?;

        Ok(location::assemble(location, &hourly_doc, &daily_doc, &grid_doc, Utc::now()))
    }

    /// Fetches a url and deserializes the json response body
    ///
    /// # Arguments
    ///
    /// * 'url' - the url to fetch
    fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, NWSError> {
        let body = self
            .agent
            .get(url)
            .header("User-Agent", USER_AGENT)
            .call()?
            .body_mut()
            .read_to_string()?;

        Ok(serde_json::from_str::<T>(&body)?)
    }
}

/// Builds the snapshot by running a per-location fetch over the configured
/// locations, in order. A location whose fetch fails gets the error shape;
/// the other locations are untouched by the failure.
///
/// # Arguments
///
/// * 'locations' - the configured locations
/// * 'fetch' - the per-location fetch
fn snapshot_from<F>(locations: &[Location], mut fetch: F) -> Snapshot
where
    F: FnMut(&Location) -> Result<LocationResult, NWSError>,
{
    let fetched_at = Utc::now();

    let locations = locations
        .iter()
        .map(|location| match fetch(location) {
            Ok(result) => result,
            Err(e) => {
                error!("error fetching {}: {}", location.name, e);
                LocationResult::failed(location, e.to_string())
            }
        })
        .collect();

    Snapshot { fetched_at, locations }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use crate::models::snapshot::{Extent, HourlySample};

    fn location(name: &str) -> Location {
        Location { name: name.to_string(), lat: 39.0, lon: -77.0 }
    }

    fn populated(location: &Location) -> LocationResult {
        let sample = HourlySample {
            time: chrono::DateTime::parse_from_rfc3339("2026-01-01T15:00:00+00:00").unwrap(),
            short_forecast: Some("Sunny".to_string()),
            wind_direction: None,
            wind_speed_text: None,
            metrics: BTreeMap::from([("temperature".to_string(), Some(50.0))]),
        };

        LocationResult {
            name: location.name.clone(),
            lat: location.lat,
            lon: location.lon,
            updated: Some("2026-01-01T14:30:00+00:00".to_string()),
            error: None,
            hourly: vec![sample],
            metrics: Vec::new(),
            metric_extents: BTreeMap::from([
                ("temperature".to_string(), Extent { min: 50.0, max: 50.0 }),
            ]),
            group_extents: BTreeMap::new(),
            daily_forecast: Vec::new(),
        }
    }

    #[test]
    fn one_failing_location_leaves_the_others_populated() {
        let locations = vec![location("Sterling, VA"), location("Hatteras, NC")];

        let snapshot = snapshot_from(&locations, |location| {
            if location.name.starts_with("Hatteras") {
                Err(NWSError("http request error: connection refused".to_string()))
            } else {
                Ok(populated(location))
            }
        });

        assert_eq!(snapshot.locations.len(), 2);

        let sterling = &snapshot.locations[0];
        assert_eq!(sterling.name, "Sterling, VA");
        assert!(sterling.error.is_none());
        assert_eq!(sterling.hourly.len(), 1);
        assert_eq!(sterling.metric_extents["temperature"].min, 50.0);
        assert!(sterling.updated.is_some());

        let hatteras = &snapshot.locations[1];
        assert_eq!(hatteras.name, "Hatteras, NC");
        assert!(hatteras.error.as_deref().unwrap().contains("connection refused"));
        assert!(hatteras.updated.is_none());
        assert!(hatteras.hourly.is_empty());
        assert!(hatteras.metric_extents.is_empty());
    }
}
