use chrono::DateTime;
use serde_json::Value;

pub const MS_PER_HOUR: i64 = 3_600_000;

/// A value tagged with a validity window [start, end) rather than a single
/// instant. Always holds start < end and duration_hours > 0.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalRecord {
    pub start_ms: i64,
    pub end_ms: i64,
    pub duration_hours: f64,
    pub value: f64,
}

/// Parses the ISO 8601 duration subset used by the NWS interval encoding,
/// "P[nD][T[nH][nM]]", to whole minutes. Components after a missing 'T' are
/// not counted, and a malformed, empty or arithmetically overflowing duration
/// decodes to zero.
///
/// # Arguments
///
/// * 'duration' - the duration part of a validTime string, e.g. "PT3H"
pub fn parse_duration(duration: &str) -> i64 {
    let Some(rest) = duration.strip_prefix('P') else { return 0 };

    let (days, rest) = take_component(rest, 'D');
    let (hours, minutes) = match rest.strip_prefix('T') {
        Some(time_part) => {
            let (hours, time_part) = take_component(time_part, 'H');
            let (minutes, _) = take_component(time_part, 'M');
            (hours, minutes)
        }
        None => (0, 0),
    };

    days.checked_mul(24)
        .and_then(|h| h.checked_add(hours))
        .and_then(|h| h.checked_mul(60))
        .and_then(|m| m.checked_add(minutes))
        .unwrap_or(0)
}

/// Takes a leading "<digits><marker>" component off the string, returning the
/// parsed number and the remainder, or zero and the input untouched
fn take_component(s: &str, marker: char) -> (i64, &str) {
    let digits = s.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 && s[digits..].starts_with(marker) {
        (s[..digits].parse().unwrap_or(0), &s[digits + 1..])
    } else {
        (0, s)
    }
}

/// Sanitizes a numeric value, rejecting anything outside the open band
/// (-9000, 9000) which filters the NWS missing/invalid sentinel markers
pub fn sanitize(value: f64) -> Option<f64> {
    if value.is_finite() && value > -9000.0 && value < 9000.0 {
        Some(value)
    } else {
        None
    }
}

/// Sanitizes a raw JSON value to a numeric one, accepting numbers and
/// numeric strings and rejecting everything else
pub fn sanitize_raw(value: &Value) -> Option<f64> {
    let num = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    sanitize(num)
}

/// Decodes one raw (validTime, value) pair into an interval record. The
/// validTime encodes "start/duration" where start is an RFC 3339 instant.
/// Returns None when the value fails sanitization, the separator is missing,
/// the start fails to parse, the duration is zero, or the end instant would
/// overflow the millisecond range.
///
/// # Arguments
///
/// * 'valid_time' - the combined start/duration string
/// * 'value' - the raw value for the interval
pub fn decode_interval(valid_time: &str, value: &Value) -> Option<IntervalRecord> {
    let value = sanitize_raw(value)?;

    let (start, duration) = valid_time.split_once('/')?;
    let start_ms = DateTime::parse_from_rfc3339(start).ok()?.timestamp_millis();

    let minutes = parse_duration(duration);
    if minutes <= 0 {
        return None;
    }

    let end_ms = minutes
        .checked_mul(60_000)
        .and_then(|ms| start_ms.checked_add(ms))?;

    Some(IntervalRecord {
        start_ms,
        end_ms,
        duration_hours: minutes as f64 / 60.0,
        value,
    })
}

/// Samples the value valid at a given instant. The first interval in source
/// order whose [start, end) window contains the instant wins; accumulation
/// totals spanning more than one hour are scaled to a per-hour rate.
///
/// # Arguments
///
/// * 'intervals' - decoded interval records in source order
/// * 'time_ms' - the instant to sample at, in epoch milliseconds
/// * 'per_hour' - whether the metric is an accumulation needing rate scaling
pub fn sample_at(intervals: &[IntervalRecord], time_ms: i64, per_hour: bool) -> Option<f64> {
    intervals
        .iter()
        .find(|r| r.start_ms <= time_ms && time_ms < r.end_ms)
        .map(|r| {
            if per_hour && r.duration_hours > 1.0 {
                r.value / r.duration_hours
            } else {
                r.value
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn durations_decode_to_minutes() {
        assert_eq!(parse_duration("PT1H"), 60);
        assert_eq!(parse_duration("PT30M"), 30);
        assert_eq!(parse_duration("P1DT2H30M"), 1590);
        assert_eq!(parse_duration("P2D"), 2880);
        assert_eq!(parse_duration("P"), 0);
        assert_eq!(parse_duration(""), 0);
        assert_eq!(parse_duration("garbage"), 0);
    }

    #[test]
    fn overflowing_durations_decode_to_zero() {
        assert_eq!(parse_duration("P400000000000000000D"), 0);
        assert_eq!(parse_duration("PT9223372036854775807H"), 0);
    }

    #[test]
    fn minutes_without_time_designator_are_ignored() {
        assert_eq!(parse_duration("P5M"), 0);
    }

    #[test]
    fn sanitize_filters_the_sentinel_band() {
        assert_eq!(sanitize(42.5), Some(42.5));
        assert_eq!(sanitize(-9999.0), None);
        assert_eq!(sanitize(9000.0), None);
        assert_eq!(sanitize(-9000.0), None);
        assert_eq!(sanitize(8999.9), Some(8999.9));
        assert_eq!(sanitize(f64::NAN), None);
    }

    #[test]
    fn sanitize_is_idempotent_where_defined() {
        for v in [0.0, -273.15, 1013.25] {
            let once = sanitize(v).unwrap();
            assert_eq!(sanitize(once), Some(once));
        }
    }

    #[test]
    fn sanitize_raw_accepts_numbers_and_numeric_strings() {
        assert_eq!(sanitize_raw(&json!(3.5)), Some(3.5));
        assert_eq!(sanitize_raw(&json!("3.5")), Some(3.5));
        assert_eq!(sanitize_raw(&json!("n/a")), None);
        assert_eq!(sanitize_raw(&json!(null)), None);
        assert_eq!(sanitize_raw(&json!([1.0])), None);
    }

    #[test]
    fn valid_pair_decodes_to_record() {
        let record = decode_interval("2026-01-01T06:00:00+00:00/PT3H", &json!(6.0)).unwrap();
        assert_eq!(record.duration_hours, 3.0);
        assert_eq!(record.end_ms - record.start_ms, 3 * MS_PER_HOUR);
        assert_eq!(record.value, 6.0);
    }

    #[test]
    fn malformed_pairs_decode_to_nothing() {
        // no separator
        assert_eq!(decode_interval("2026-01-01T06:00:00+00:00", &json!(1.0)), None);
        // garbage start time
        assert_eq!(decode_interval("not-a-time/PT1H", &json!(1.0)), None);
        // null value
        assert_eq!(decode_interval("2026-01-01T06:00:00+00:00/PT1H", &json!(null)), None);
        // sentinel value
        assert_eq!(decode_interval("2026-01-01T06:00:00+00:00/PT1H", &json!(-9999.0)), None);
        // zero length window can never contain an instant
        assert_eq!(decode_interval("2026-01-01T06:00:00+00:00/PT0H", &json!(1.0)), None);
        // duration arithmetic past i64 minutes
        assert_eq!(decode_interval("2026-01-01T06:00:00+00:00/P400000000000000000D", &json!(1.0)), None);
        // minutes fit but the end instant does not
        assert_eq!(decode_interval("2026-01-01T06:00:00+00:00/PT100000000000000H", &json!(1.0)), None);
    }

    #[test]
    fn sampling_scales_accumulations_to_per_hour_rates() {
        let record = decode_interval("2026-01-01T06:00:00+00:00/PT3H", &json!(6.0)).unwrap();
        let start = record.start_ms;
        let intervals = vec![record];

        assert_eq!(sample_at(&intervals, start, true), Some(2.0));
        assert_eq!(sample_at(&intervals, start + MS_PER_HOUR, true), Some(2.0));
        assert_eq!(sample_at(&intervals, start, false), Some(6.0));
        // end of window is exclusive
        assert_eq!(sample_at(&intervals, start + 3 * MS_PER_HOUR, true), None);
    }

    #[test]
    fn first_interval_in_source_order_wins_under_overlap() {
        let a = decode_interval("2026-01-01T06:00:00+00:00/PT2H", &json!(1.0)).unwrap();
        let b = decode_interval("2026-01-01T06:00:00+00:00/PT1H", &json!(2.0)).unwrap();
        let time = a.start_ms;

        assert_eq!(sample_at(&[a.clone(), b.clone()], time, false), Some(1.0));
        assert_eq!(sample_at(&[b, a], time, false), Some(2.0));
    }
}
