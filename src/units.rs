/// Scalar conversion from a source unit to its display unit
pub type Convert = fn(f64) -> f64;

/// Maps a raw NWS unit of measure tag to a display unit and a conversion
/// function. Tags come vendor namespaced, e.g. "wmoUnit:degC" or
/// "unit:percent", and the namespace is stripped before lookup.
///
/// Unrecognized tags pass through cleaned with an identity conversion, so
/// this never fails for any string input.
///
/// # Arguments
///
/// * 'uom' - the raw unit of measure tag
pub fn normalize_uom(uom: &str) -> (String, Convert) {
    let cleaned = uom.replace("wmoUnit:", "").replace("unit:", "");

    match cleaned.as_str() {
        "percent" => ("%".to_string(), |v| v),
        "degC" => ("°F".to_string(), |v| v * 1.8 + 32.0),
        "degF" => ("°F".to_string(), |v| v),
        "m_s-1" => ("mph".to_string(), |v| v * 2.23694),
        "km_h-1" => ("mph".to_string(), |v| v * 0.621371),
        "m" => ("mi".to_string(), |v| v / 1609.34),
        "mm" => ("in".to_string(), |v| v / 25.4),
        "cm" => ("in".to_string(), |v| v / 2.54),
        // mass per area treated as liquid depth equivalent
        "kg_m-2" => ("in".to_string(), |v| v / 25.4),
        "Pa" => ("hPa".to_string(), |v| v / 100.0),
        _ => (cleaned, |v| v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn celsius_to_fahrenheit_is_exact() {
        let (unit, convert) = normalize_uom("wmoUnit:degC");
        assert_eq!(unit, "°F");
        assert_eq!(convert(0.0), 32.0);
        assert_eq!(convert(100.0), 212.0);
    }

    #[test]
    fn meters_per_second_to_mph() {
        let (unit, convert) = normalize_uom("wmoUnit:m_s-1");
        assert_eq!(unit, "mph");
        assert!((convert(1.0) - 2.23694).abs() < 1e-12);
        assert!(convert(2.0) > convert(1.0));
    }

    #[test]
    fn pascal_to_hectopascal() {
        let (unit, convert) = normalize_uom("wmoUnit:Pa");
        assert_eq!(unit, "hPa");
        assert_eq!(convert(101325.0), 1013.25);
    }

    #[test]
    fn unrecognized_tag_passes_through_cleaned() {
        let (unit, convert) = normalize_uom("wmoUnit:degree_(angle)");
        assert_eq!(unit, "degree_(angle)");
        assert_eq!(convert(42.0), 42.0);
    }

    #[test]
    fn empty_tag_yields_empty_unit() {
        let (unit, convert) = normalize_uom("");
        assert_eq!(unit, "");
        assert_eq!(convert(-1.5), -1.5);
    }
}
