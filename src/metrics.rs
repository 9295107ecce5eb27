use serde_json::{Map, Value};
use crate::intervals::{self, IntervalRecord};
use crate::models::nws_forecast::GridSeries;
use crate::units::{self, Convert};

/// Non-actionable or derived grid metrics that never enter the catalog
const EXCLUDED_METRICS: [&str; 13] = [
    "mintemperature",
    "maxtemperature",
    "winddirection",
    "transportwinddirection",
    "transportwindspeed",
    "ceilingheight",
    "mixingheight",
    "visibility",
    "lowvisibilityoccurrenceriskindex",
    "atmosphericdispersionindex",
    "windchill",
    "wetbulbglobetemperature",
    "waveheight",
];

const LABEL_OVERRIDES: [(&str, &str); 7] = [
    ("probabilityOfPrecipitation", "Probability of Precipitation"),
    ("quantitativePrecipitation", "Precipitation Amount"),
    ("windSpeed", "Wind Speed"),
    ("windGust", "Wind Gust"),
    ("skyCover", "Sky Cover"),
    ("relativeHumidity", "Relative Humidity"),
    ("apparentTemperature", "Feels Like"),
];

/// Fallback palette, indexed by a stable hash of the metric key so the same
/// key always gets the same color across runs and locations
const COLOR_PALETTE: [&str; 10] = [
    "#ff7b2f", "#0f8ea1", "#5b56f0", "#2f3b52", "#e24a3b",
    "#2f9d55", "#b065f5", "#e6a01a", "#1a6fa8", "#7c4a2a",
];

/// One retained raw series normalized for sampling: labeled, unit converted
/// and with its time intervals decoded
pub struct NormalizedMetric {
    pub key: String,
    pub label: String,
    pub unit: String,
    pub convert: Convert,
    pub intervals: Vec<IntervalRecord>,
}

/// Builds the normalized metric catalog from the gridded forecast document
/// properties. Entries that are not metric series fail projection and are
/// skipped, as are denylisted keys; undecodable interval entries are
/// discarded silently.
///
/// # Arguments
///
/// * 'properties' - the properties mapping of the gridded forecast document
pub fn build_catalog(properties: &Map<String, Value>) -> Vec<NormalizedMetric> {
    let mut catalog = Vec::new();

    for (key, prop) in properties {
        if is_excluded(key) {
            continue;
        }
        let Ok(series) = serde_json::from_value::<GridSeries>(prop.clone()) else { continue };

        let (mut unit, convert) = units::normalize_uom(series.uom.as_deref().unwrap_or(""));
        if unit.is_empty() && key.to_lowercase().contains("probability") {
            unit = "%".to_string();
        }

        let records = series
            .values
            .iter()
            .filter_map(|e| intervals::decode_interval(&e.valid_time, &e.value))
            .collect();

        catalog.push(NormalizedMetric {
            key: key.clone(),
            label: humanize_key(key),
            unit,
            convert,
            intervals: records,
        });
    }

    catalog
}

pub fn is_excluded(key: &str) -> bool {
    EXCLUDED_METRICS.contains(&key.to_lowercase().as_str())
}

/// Derives a human label from a camelCase metric key: overrides first,
/// otherwise a space before every internal capital and an initial capital
pub fn humanize_key(key: &str) -> String {
    if let Some((_, label)) = LABEL_OVERRIDES.iter().find(|(k, _)| *k == key) {
        return label.to_string();
    }

    let mut label = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if i == 0 {
            label.extend(c.to_uppercase());
        } else if c.is_uppercase() {
            label.push(' ');
            label.push(c);
        } else {
            label.push(c);
        }
    }

    label
}

/// True for metrics whose raw value is a total over its interval rather than
/// an instantaneous reading, i.e. precipitation, snow and ice amounts
pub fn is_accumulation(key: &str) -> bool {
    let k = key.to_lowercase();

    (k.contains("precip") && !k.contains("probability"))
        || k.contains("snow")
        || (k.contains("ice") && !k.contains("probability"))
}

/// Returns the chart color for a metric key. Fixed substring rules are
/// checked in order; everything else draws from the palette by stable hash.
pub fn metric_color(key: &str) -> &'static str {
    let k = key.to_lowercase();

    if k.contains("quantitativeprecipitation") {
        return "#118ab2";
    }
    if k.contains("snow") {
        return "#00bcd4";
    }
    if k.contains("ice") {
        return "#8b5cf6";
    }
    if k.contains("rain") || k.contains("liquid") {
        return "#00a676";
    }
    if k.contains("drizzle") {
        return "#f59e0b";
    }
    if k.contains("sleet") || k.contains("freezing") {
        return "#ef4444";
    }
    if k.contains("humidity") {
        return "#06b6d4";
    }
    if k.contains("windgust") {
        return "#7dd3fc";
    }

    COLOR_PALETTE[stable_color_index(key)]
}

/// Base 31 polynomial hash over the character codes, wrapped to 32 bits
fn stable_color_index(key: &str) -> usize {
    let mut h: u32 = 0;
    for c in key.chars() {
        h = h.wrapping_mul(31).wrapping_add(c as u32);
    }

    h as usize % COLOR_PALETTE.len()
}

pub struct MetricGroup {
    pub id: String,
    pub label: String,
}

/// Assigns a metric to exactly one chart-axis group. The category rules are
/// evaluated top to bottom and the first match wins; anything unmatched falls
/// into an "other" bucket keyed by its unit.
///
/// # Arguments
///
/// * 'key' - the metric key
/// * 'unit' - the display unit of the metric
pub fn metric_group(key: &str, unit: &str) -> MetricGroup {
    let k = key.to_lowercase();
    let fixed = |id: &str, label: &str| MetricGroup { id: id.to_string(), label: label.to_string() };

    if k.contains("probabilityofprecipitation") {
        return fixed("precip-prob", "Precipitation");
    }
    if k.contains("probability") && k.contains("thunder") {
        return fixed("precip-prob", "Precipitation");
    }
    if ["temperature", "dewpoint", "heatindex", "windchill"].iter().any(|x| k.contains(x)) {
        return fixed("temperature", "Temperature");
    }
    if k.contains("wind") {
        return fixed("wind", "Wind");
    }
    if ["precip", "snow", "ice"].iter().any(|x| k.contains(x)) {
        return fixed("precip", "Precipitation");
    }
    if ["sky", "cloud"].iter().any(|x| k.contains(x)) {
        return fixed("sky", "Cloud Cover");
    }
    if k.contains("humidity") {
        return fixed("humidity", "Humidity");
    }
    if ["pressure", "barometric"].iter().any(|x| k.contains(x)) {
        return fixed("pressure", "Pressure");
    }
    if k.contains("visibility") {
        return fixed("visibility", "Visibility");
    }

    if unit.is_empty() {
        MetricGroup { id: "other-misc".to_string(), label: "Other".to_string() }
    } else {
        MetricGroup { id: format!("other-{}", unit), label: format!("Other ({})", unit) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn denylisted_keys_are_excluded_case_insensitively() {
        assert!(is_excluded("maxTemperature"));
        assert!(is_excluded("windDirection"));
        assert!(is_excluded("waveHeight"));
        assert!(!is_excluded("temperature"));
        assert!(!is_excluded("windSpeed"));
    }

    #[test]
    fn labels_prefer_overrides_then_humanize() {
        assert_eq!(humanize_key("apparentTemperature"), "Feels Like");
        assert_eq!(humanize_key("quantitativePrecipitation"), "Precipitation Amount");
        assert_eq!(humanize_key("snowfallAmount"), "Snowfall Amount");
        assert_eq!(humanize_key("dewpoint"), "Dewpoint");
    }

    #[test]
    fn accumulation_classification() {
        assert!(is_accumulation("quantitativePrecipitation"));
        assert!(is_accumulation("snowfallAmount"));
        assert!(is_accumulation("iceAccumulation"));
        assert!(!is_accumulation("probabilityOfPrecipitation"));
        assert!(!is_accumulation("probabilityOfIce"));
        assert!(!is_accumulation("temperature"));
    }

    #[test]
    fn fixed_color_rules_take_precedence() {
        assert_eq!(metric_color("quantitativePrecipitation"), "#118ab2");
        assert_eq!(metric_color("snowfallAmount"), "#00bcd4");
        assert_eq!(metric_color("relativeHumidity"), "#06b6d4");
        assert_eq!(metric_color("windGust"), "#7dd3fc");
    }

    #[test]
    fn palette_colors_are_stable_per_key() {
        let first = metric_color("temperature");
        assert_eq!(metric_color("temperature"), first);
        assert!(COLOR_PALETTE.contains(&first));
    }

    #[test]
    fn grouping_rules_first_match_wins() {
        assert_eq!(metric_group("probabilityOfPrecipitation", "%").id, "precip-prob");
        assert_eq!(metric_group("probabilityOfThunder", "%").id, "precip-prob");
        assert_eq!(metric_group("apparentTemperature", "°F").id, "temperature");
        assert_eq!(metric_group("windSpeed", "mph").id, "wind");
        assert_eq!(metric_group("snowfallAmount", "in").id, "precip");
        assert_eq!(metric_group("skyCover", "%").id, "sky");
        assert_eq!(metric_group("pressure", "hPa").id, "pressure");
        assert_eq!(metric_group("solarIrradiance", "W/m2").id, "other-W/m2");
        assert_eq!(metric_group("lightningActivityLevel", "").id, "other-misc");
    }

    #[test]
    fn group_assignment_is_stable() {
        let a = metric_group("relativeHumidity", "%").id;
        let b = metric_group("relativeHumidity", "%").id;
        assert_eq!(a, b);
    }

    #[test]
    fn catalog_skips_non_series_and_excluded_entries() {
        let doc = json!({
            "updateTime": "2026-01-01T00:00:00+00:00",
            "elevation": { "unitCode": "wmoUnit:m", "value": 93.0 },
            "maxTemperature": {
                "uom": "wmoUnit:degC",
                "values": [ { "validTime": "2026-01-01T06:00:00+00:00/PT12H", "value": 9.0 } ]
            },
            "temperature": {
                "uom": "wmoUnit:degC",
                "values": [
                    { "validTime": "2026-01-01T06:00:00+00:00/PT1H", "value": 10.0 },
                    { "validTime": "broken", "value": 11.0 },
                    { "validTime": "2026-01-01T07:00:00+00:00/PT1H", "value": null }
                ]
            }
        });
        let properties = doc.as_object().unwrap();

        let catalog = build_catalog(properties);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].key, "temperature");
        assert_eq!(catalog[0].unit, "°F");
        assert_eq!(catalog[0].intervals.len(), 1);
    }

    #[test]
    fn probability_metrics_without_unit_are_forced_to_percent() {
        let doc = json!({
            "probabilityOfThunder": {
                "uom": "wmoUnit:unknown_tag",
                "values": [ { "validTime": "2026-01-01T06:00:00+00:00/PT1H", "value": 20.0 } ]
            }
        });
        let catalog = build_catalog(doc.as_object().unwrap());
        // unknown tag passes through non-empty, so it is kept as-is
        assert_eq!(catalog[0].unit, "unknown_tag");

        let doc = json!({
            "probabilityOfThunder": {
                "values": [ { "validTime": "2026-01-01T06:00:00+00:00/PT1H", "value": 20.0 } ]
            }
        });
        let catalog = build_catalog(doc.as_object().unwrap());
        assert_eq!(catalog[0].unit, "%");
    }
}
