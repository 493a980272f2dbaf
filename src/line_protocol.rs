//! Line protocol escaping and formatting primitives.
//!
//! https://docs.influxdata.com/influxdb/v1.7/write_protocols/line_protocol_tutorial/
//!
//! These are pure functions shared by every formatter variant; the variants
//! only differ in which primitive they apply to which token.

use chrono::{DateTime, Utc};
use lazy_regex::{lazy_regex, Lazy, Regex};

use crate::point::Precision;

/// Reserved characters inside measurements, field keys and quoted field
/// values. The literal backslash is deliberately not escaped: escaping it
/// is broken server-side in the 0.9.x line and writing `\\` corrupts data.
/// https://github.com/influxdb/influxdb/issues/3070
pub static VALUE_RESERVED: Lazy<Regex> = lazy_regex!(r#"[" =,]"#);

/// Reserved characters inside tag values. Tag values are never quoted, so
/// the quote character passes through untouched.
pub static TAG_RESERVED: Lazy<Regex> = lazy_regex!("[ =,]");

/// Escapes `"`, space, `=` and `,` with a backslash prefix.
pub fn escape_value(s: &str) -> String {
    VALUE_RESERVED.replace_all(s, r"\$0").to_string()
}

/// Escapes space, `=` and `,` with a backslash prefix, leaving quotes alone.
pub fn escape_tag_value(s: &str) -> String {
    TAG_RESERVED.replace_all(s, r"\$0").to_string()
}

/// Wraps a string in double quotes for use as a quoted field value.
pub fn quote(s: &str) -> String {
    format!("\"{}\"", s)
}

/// Formats a float with at least one decimal digit, independent of locale.
/// Mirrors the invariant-culture pattern `0.0###################`: integral
/// values keep a single zero decimal, everything else renders as the
/// shortest string that round-trips to the same value.
pub fn format_float(v: f64) -> String {
    if v.is_finite() && v == v.trunc() {
        return format!("{:.1}", v);
    }
    v.to_string()
}

/// Converts a timestamp to an epoch integer in the requested precision.
///
/// Nanosecond conversion saturates for dates past the year 2262 rather
/// than wrapping.
pub fn unix_timestamp(ts: &DateTime<Utc>, precision: Precision) -> i64 {
    match precision {
        Precision::Nanoseconds => ts.timestamp_nanos_opt().unwrap_or(i64::MAX),
        Precision::Microseconds => ts.timestamp_micros(),
        Precision::Milliseconds => ts.timestamp_millis(),
        Precision::Seconds => ts.timestamp(),
        Precision::Minutes => ts.timestamp() / 60,
        Precision::Hours => ts.timestamp() / 3600,
        Precision::Days => ts.timestamp() / 86_400,
    }
}

/// Epoch milliseconds for datetime-typed field values. Field timestamps are
/// always written in milliseconds regardless of the point precision.
pub fn unix_millis(ts: &DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_escape_value_reserved_characters() {
        assert_eq!(escape_value(r#"wea", ther"#), r#"wea\"\,\ ther"#);
        assert_eq!(escape_value("no_escapes"), "no_escapes");
        assert_eq!(escape_value("a=b"), r"a\=b");
    }

    #[test]
    fn test_escape_value_documented_table() {
        // The escaping table from the protocol docs: every reserved
        // character escaped, the literal backslash passed through.
        assert_eq!(escape_value(r#"\=&,"*" "#), r#"\\=&\,\"*\"\ "#);
    }

    #[test]
    fn test_escape_tag_value_skips_quotes() {
        assert_eq!(escape_tag_value(r#"us, "mid=west"#), r#"us\,\ "mid\=west"#);
        assert_eq!(
            escape_tag_value("this is my special string"),
            r"this\ is\ my\ special\ string"
        );
    }

    #[test]
    fn test_escape_leaves_backslash_alone() {
        assert_eq!(escape_value(r"back\slash"), r"back\slash");
        assert_eq!(escape_tag_value(r"back\slash"), r"back\slash");
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("x"), "\"x\"");
        assert_eq!(quote(""), "\"\"");
    }

    #[test]
    fn test_format_float_always_has_decimals() {
        assert_eq!(format_float(82.0), "82.0");
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(format_float(-0.1), "-0.1");
        assert_eq!(format_float(3.7), "3.7");
        assert_eq!(format_float(-42.0), "-42.0");
    }

    #[test]
    fn test_format_float_is_shortest_round_trip() {
        // Non-dyadic values must not leak their binary expansion.
        assert_eq!(format_float(0.64), "0.64");
        assert_eq!(format_float(3.7), "3.7");
        assert_eq!(format_float(1.5), "1.5");
        assert_eq!(format_float(0.25), "0.25");
        assert_eq!(format_float(0.1 + 0.2), "0.30000000000000004");
    }

    #[test]
    fn test_unix_timestamp_precisions() {
        let ts = Utc.with_ymd_and_hms(2015, 6, 1, 0, 0, 1).single().unwrap();
        let secs = ts.timestamp();
        assert_eq!(unix_timestamp(&ts, Precision::Seconds), secs);
        assert_eq!(unix_timestamp(&ts, Precision::Milliseconds), secs * 1_000);
        assert_eq!(
            unix_timestamp(&ts, Precision::Microseconds),
            secs * 1_000_000
        );
        assert_eq!(
            unix_timestamp(&ts, Precision::Nanoseconds),
            secs * 1_000_000_000
        );
        assert_eq!(unix_timestamp(&ts, Precision::Minutes), secs / 60);
        assert_eq!(unix_timestamp(&ts, Precision::Hours), secs / 3600);
        assert_eq!(unix_timestamp(&ts, Precision::Days), secs / 86_400);
    }
}
