//! Measurement points and write batches.
//!
//! A [`Point`] is one measurement to write; a [`WriteRequest`] is a batch of
//! points bound to one formatter, producing the text body of a write call.
//!
//! # Examples
//!
//! ```rust
//! use influxdb_compat::Point;
//!
//! let point = Point::new("weather")
//!     .tag("location", "us-midwest")
//!     .field("temperature", 82);
//!
//! assert_eq!(point.measurement, "weather");
//! ```

use chrono::{DateTime, Utc};
use std::fmt;

use crate::error::Error;
use crate::formatter::Formatter;
use crate::line_protocol;

/// Time precision of a point timestamp and of the write request carrying it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
    Seconds,
    #[default]
    Milliseconds,
    Microseconds,
    Nanoseconds,
    Minutes,
    Hours,
    Days,
}

impl Precision {
    /// The value of the `precision` query parameter for this unit.
    ///
    /// Days have no wire representation in any supported dialect.
    pub fn query_param(self) -> Result<&'static str, Error> {
        match self {
            Precision::Seconds => Ok("s"),
            Precision::Milliseconds => Ok("ms"),
            Precision::Microseconds => Ok("u"),
            Precision::Nanoseconds => Ok("ns"),
            Precision::Minutes => Ok("m"),
            Precision::Hours => Ok("h"),
            Precision::Days => Err(Error::InvalidPointError {
                error: "days precision cannot be expressed as a query parameter".to_string(),
            }),
        }
    }
}

/// A typed scalar carried by a tag or field.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    Float(f64),
    SignedInteger(i64),
    UnsignedInteger(u64),
    Text(String),
    DateTime(DateTime<Utc>),
}

impl Value {
    /// The JSON representation used when a written point is converted back
    /// to its server-side serie form.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Float(f) => serde_json::json!(f),
            Value::SignedInteger(i) => serde_json::json!(i),
            Value::UnsignedInteger(u) => serde_json::json!(u),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::DateTime(ts) => serde_json::json!(line_protocol::unix_millis(ts)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Float(v) => write!(f, "{}", v),
            Value::SignedInteger(v) => write!(f, "{}", v),
            Value::UnsignedInteger(v) => write!(f, "{}", v),
            Value::Text(text) => write!(f, "{}", text),
            Value::DateTime(ts) => write!(f, "{}", line_protocol::unix_millis(ts)),
        }
    }
}

macro_rules! from_impl {
    ( $variant:ident => $( $typ:ident ),+ ) => (
        $(
            impl From<$typ> for Value {
                fn from(v: $typ) -> Self {
                    Value::$variant(v.into())
                }
            }
        )+
    )
}
from_impl! {Boolean => bool}
from_impl! {Float => f32, f64}
from_impl! {SignedInteger => i8, i16, i32, i64}
from_impl! {UnsignedInteger => u8, u16, u32, u64}
from_impl! {Text => String}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.into())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(ts: DateTime<Utc>) -> Self {
        Value::DateTime(ts)
    }
}

impl<T> From<&T> for Value
where
    T: Copy + Into<Value>,
{
    fn from(t: &T) -> Self {
        (*t).into()
    }
}

/// A single measurement to write.
///
/// Tags and fields keep insertion order; the line protocol makes no ordering
/// promise beyond that. A point without fields fails validation when it is
/// formatted, before any network call.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub measurement: String,
    pub tags: Vec<(String, Value)>,
    pub fields: Vec<(String, Value)>,
    pub timestamp: Option<DateTime<Utc>>,
    pub precision: Precision,
}

impl Point {
    pub fn new<S>(measurement: S) -> Self
    where
        S: Into<String>,
    {
        Point {
            measurement: measurement.into(),
            tags: vec![],
            fields: vec![],
            timestamp: None,
            precision: Precision::default(),
        }
    }

    /// Adds a tag to the point.
    pub fn tag<S, V>(mut self, key: S, value: V) -> Self
    where
        S: Into<String>,
        V: Into<Value>,
    {
        self.tags.push((key.into(), value.into()));
        self
    }

    /// Adds a field to the point. At least one field is required for the
    /// point to be writable.
    pub fn field<S, V>(mut self, key: S, value: V) -> Self
    where
        S: Into<String>,
        V: Into<Value>,
    {
        self.fields.push((key.into(), value.into()));
        self
    }

    /// Sets the point timestamp. Without one the server assigns its own
    /// write time.
    pub fn timestamp(mut self, ts: DateTime<Utc>) -> Self {
        self.timestamp = Some(ts);
        self
    }

    pub fn precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }
}

/// A write batch bound to exactly one formatter.
pub struct WriteRequest<'a> {
    pub database: &'a str,
    pub retention_policy: &'a str,
    pub points: &'a [Point],
    formatter: &'a dyn Formatter,
}

impl<'a> WriteRequest<'a> {
    pub fn new(
        formatter: &'a dyn Formatter,
        database: &'a str,
        retention_policy: &'a str,
        points: &'a [Point],
    ) -> Self {
        WriteRequest {
            database,
            retention_policy,
            points,
            formatter,
        }
    }

    /// The line protocol payload: one line per point, newline-joined with no
    /// trailing separator.
    pub fn lines(&self) -> Result<String, Error> {
        let lines = self
            .points
            .iter()
            .map(|p| self.formatter.point_to_line(p))
            .collect::<Result<Vec<String>, Error>>()?;
        Ok(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::FormatterV09x;
    use chrono::TimeZone;

    #[test]
    fn test_precision_query_params() {
        assert_eq!(Precision::Seconds.query_param().unwrap(), "s");
        assert_eq!(Precision::Milliseconds.query_param().unwrap(), "ms");
        assert_eq!(Precision::Microseconds.query_param().unwrap(), "u");
        assert_eq!(Precision::Nanoseconds.query_param().unwrap(), "ns");
        assert_eq!(Precision::Minutes.query_param().unwrap(), "m");
        assert_eq!(Precision::Hours.query_param().unwrap(), "h");
        assert!(Precision::Days.query_param().is_err());
    }

    #[test]
    fn test_default_precision_is_milliseconds() {
        assert_eq!(Point::new("cpu").precision, Precision::Milliseconds);
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(Value::from(true), Value::Boolean(true));
        assert_eq!(Value::from(82), Value::SignedInteger(82));
        assert_eq!(Value::from(82u64), Value::UnsignedInteger(82));
        assert_eq!(Value::from(3.7), Value::Float(3.7));
        assert_eq!(Value::from("north"), Value::Text("north".into()));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Boolean(true).to_string(), "true");
        assert_eq!(Value::SignedInteger(-3).to_string(), "-3");
        assert_eq!(Value::Text("x".into()).to_string(), "x");
    }

    #[test]
    fn test_write_request_joins_lines() {
        let ts = Utc.with_ymd_and_hms(2015, 6, 1, 0, 0, 0).single().unwrap();
        let points = vec![
            Point::new("cpu").field("value", 0.64).timestamp(ts),
            Point::new("mem").field("free", 42).timestamp(ts),
        ];
        let formatter = FormatterV09x;
        let request = WriteRequest::new(&formatter, "metrics", "default", &points);
        let lines = request.lines().unwrap();
        assert_eq!(lines.lines().count(), 2);
        assert!(!lines.ends_with('\n'));
    }
}
