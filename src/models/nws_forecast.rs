use serde::Deserialize;
use serde_json::{Map, Value};

/// Point lookup document resolving the per-location resource urls
#[derive(Deserialize)]
pub struct PointDoc {
    pub properties: PointProperties,
}

#[derive(Deserialize)]
pub struct PointProperties {
    pub forecast: String,
    #[serde(rename = "forecastHourly")]
    pub forecast_hourly: String,
    #[serde(rename = "forecastGridData")]
    pub forecast_grid_data: String,
}

/// Forecast document, used for both the hourly and the daily feed
#[derive(Deserialize)]
pub struct ForecastDoc {
    pub properties: ForecastProperties,
}

#[derive(Deserialize)]
pub struct ForecastProperties {
    #[serde(rename = "updateTime")]
    pub update_time: Option<String>,
    #[serde(default)]
    pub periods: Vec<Period>,
}

/// One forecast period. Every field is optional since upstream documents are
/// only loosely shaped; consumers default or skip what is missing.
#[derive(Deserialize, Default, Clone)]
pub struct Period {
    #[serde(rename = "startTime")]
    pub start_time: Option<String>,
    #[serde(rename = "isDaytime", default)]
    pub is_daytime: bool,
    pub name: Option<String>,
    pub temperature: Option<f64>,
    #[serde(rename = "temperatureUnit")]
    pub temperature_unit: Option<String>,
    #[serde(rename = "shortForecast")]
    pub short_forecast: Option<String>,
    #[serde(rename = "probabilityOfPrecipitation")]
    pub probability_of_precipitation: Option<ValueField>,
    #[serde(rename = "windDirection")]
    pub wind_direction: Option<String>,
    #[serde(rename = "windSpeed")]
    pub wind_speed: Option<String>,
}

#[derive(Deserialize, Default, Clone)]
pub struct ValueField {
    pub value: Option<f64>,
}

/// Gridded metrics document. The properties mapping mixes metric series with
/// scalar metadata, so entries are projected individually through
/// [`GridSeries`] and non-series shapes are discarded.
#[derive(Deserialize)]
pub struct GridDoc {
    pub properties: Map<String, Value>,
}

/// One raw metric series as exposed by the gridded forecast document
#[derive(Deserialize)]
pub struct GridSeries {
    pub uom: Option<String>,
    pub values: Vec<GridEntry>,
}

#[derive(Deserialize)]
pub struct GridEntry {
    #[serde(rename = "validTime", default)]
    pub valid_time: String,
    #[serde(default)]
    pub value: Value,
}
