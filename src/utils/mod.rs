//! Common utilities and helper functions
//!
//! Calendar-day handling and lenient readers for upstream JSON fields.

pub mod error;
pub mod retry;

use chrono::{Local, NaiveDate};
use serde_json::Value;

use crate::error::{Error, Result};

/// Date format used by every upstream endpoint
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` calendar day
pub fn parse_day(day: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(day.trim(), DAY_FORMAT)
        .map_err(|_| Error::InvalidDate(day.to_string()))
}

/// Format a calendar day as `YYYY-MM-DD`
pub fn format_day(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

/// Today's date on the local system clock
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Read a JSON scalar as a string; numbers are rendered, anything else is empty
pub fn json_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Read a JSON scalar as an optional non-empty string
pub fn json_opt_string(value: &Value) -> Option<String> {
    let s = json_string(value);
    (!s.is_empty()).then_some(s)
}

/// Read an occurrence count
///
/// Upstream sends counts either as numbers or as numeric strings. Strings are
/// read up to the first non-digit; anything unreadable counts as zero.
pub fn parse_count(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Value::String(s) => {
            let digits: String = s
                .trim()
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse().unwrap_or(0)
        }
        _ => 0,
    }
}

/// Read a coordinate that may arrive as a number or a string
pub fn parse_coordinate(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
