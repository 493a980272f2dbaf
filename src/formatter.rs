//! The formatter family: one strategy per protocol generation.
//!
//! Every dialect assembles the same `measurement,tags fields timestamp`
//! shape; they differ only in how single tokens are rendered. The trait
//! carries the shared assembly as default methods and each variant
//! overrides the steps its generation changed.

use std::collections::HashMap;

use crate::error::Error;
use crate::line_protocol::{
    escape_tag_value, escape_value, format_float, quote, unix_millis, unix_timestamp,
};
use crate::point::{Point, Value};
use crate::response::Serie;

/// Converts points into line protocol text and into their expected
/// server-side serie representation.
pub trait Formatter: Send + Sync {
    /// The positional template the assembled line follows.
    fn line_template(&self) -> &'static str {
        "{key} {fields} {timestamp}"
    }

    /// Builds one line protocol line for the point.
    ///
    /// Example outputs:
    ///
    /// ```text
    /// cpu,host=serverA,region=us_west value=0.64
    /// payment,device=mobile,product=Notepad billed=33.0,licenses=3i 1434067467100293230
    /// ```
    fn point_to_line(&self, point: &Point) -> Result<String, Error> {
        validate_point(point)?;

        let tags = point
            .tags
            .iter()
            .map(|(key, value)| {
                format!("{}={}", self.format_tag_key(key), self.format_tag_value(value))
            })
            .collect::<Vec<String>>()
            .join(",");
        let fields = point
            .fields
            .iter()
            .map(|(key, value)| self.format_field(key, value))
            .collect::<Vec<String>>()
            .join(",");

        let key = if tags.is_empty() {
            escape_value(&point.measurement)
        } else {
            format!("{},{}", escape_value(&point.measurement), tags)
        };

        Ok(match point.timestamp {
            Some(ts) => format!(
                "{} {} {}",
                key,
                fields,
                unix_timestamp(&ts, point.precision)
            ),
            None => format!("{} {}", key, fields),
        })
    }

    /// Converts the point into the serie the server is expected to report
    /// back for it, for post-write verification.
    fn point_to_serie(&self, point: &Point) -> Result<Serie, Error> {
        validate_point(point)?;

        let tags: HashMap<String, String> = point
            .tags
            .iter()
            .map(|(key, value)| (key.clone(), value.to_string()))
            .collect();

        // TODO: confirm every dialect reports columns in lexicographic
        // order; only verified against 0.9.x so far.
        let mut sorted: Vec<&(String, Value)> = point.fields.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));

        let mut columns = vec!["time".to_string()];
        columns.extend(sorted.iter().map(|(key, _)| key.clone()));

        let time = match point.timestamp {
            Some(ts) => serde_json::json!(unix_timestamp(&ts, point.precision)),
            None => serde_json::Value::Null,
        };
        let mut row = vec![time];
        row.extend(sorted.iter().map(|(_, value)| value.to_json()));

        Ok(Serie {
            name: point.measurement.clone(),
            tags,
            columns,
            values: vec![row],
        })
    }

    /// Renders one `key=value` field pair.
    fn format_field(&self, key: &str, value: &Value) -> String {
        format!(
            "{}={}",
            escape_value(key),
            format_field_value(value, self.integer_suffix())
        )
    }

    /// Renders a tag key. Keys are escaped but not quoted in this
    /// generation.
    fn format_tag_key(&self, key: &str) -> String {
        escape_tag_value(key)
    }

    /// Renders a tag value. Tag values are stored as strings server-side
    /// and are not quoted in this generation.
    fn format_tag_value(&self, value: &Value) -> String {
        match value {
            Value::Text(s) => escape_tag_value(s),
            other => other.to_string(),
        }
    }

    /// The marker appended to integer fields to distinguish them from
    /// floats.
    fn integer_suffix(&self) -> &'static str {
        "i"
    }
}

fn validate_point(point: &Point) -> Result<(), Error> {
    if point.measurement.is_empty() {
        return Err(Error::InvalidPointError {
            error: "measurement name cannot be empty".to_string(),
        });
    }
    if point.fields.is_empty() {
        return Err(Error::InvalidPointError {
            error: "fields cannot be empty".to_string(),
        });
    }
    Ok(())
}

fn format_field_value(value: &Value, integer_suffix: &str) -> String {
    match value {
        Value::Text(s) => quote(&escape_value(s)),
        Value::Boolean(b) => b.to_string(),
        Value::DateTime(ts) => unix_millis(ts).to_string(),
        Value::Float(f) => format_float(*f),
        Value::SignedInteger(i) => format!("{}{}", i, integer_suffix),
        Value::UnsignedInteger(u) => format!("{}{}", u, integer_suffix),
    }
}

/// The 0.9.x-and-later rules: quoted strings, lowercase booleans, `i`
/// suffixed integers, unquoted tag values.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatterV09x;

impl Formatter for FormatterV09x {}

/// The 0.9.2 rules: identical to the family except that integers carry no
/// type suffix.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatterV092;

impl Formatter for FormatterV092 {
    fn integer_suffix(&self) -> &'static str {
        ""
    }
}

/// The earliest dialect: tag and field keys are quoted, every non-numeric
/// value is quoted, tag values included, and integers are not
/// distinguished from floats.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatterV0x;

impl Formatter for FormatterV0x {
    fn format_field(&self, key: &str, value: &Value) -> String {
        let formatted = match value {
            Value::Boolean(b) => quote(&b.to_string()),
            other => format_field_value(other, self.integer_suffix()),
        };
        format!("{}={}", quote(&escape_value(key)), formatted)
    }

    fn format_tag_key(&self, key: &str) -> String {
        quote(&escape_value(key))
    }

    fn format_tag_value(&self, value: &Value) -> String {
        match value {
            Value::Text(s) => quote(&escape_value(s)),
            Value::Boolean(b) => quote(&b.to_string()),
            other => other.to_string(),
        }
    }

    fn integer_suffix(&self) -> &'static str {
        ""
    }
}
