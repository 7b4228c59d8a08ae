//! Date-time formatting and parsing.
//!
//! Formats use `chrono` strftime syntax.

use std::fmt::Write as _;

use chrono::NaiveDateTime;
use tether_convert::{check_pair, Converter};
use tether_core::{EdgeError, Value, ValueType, DEFAULT_DATETIME_FORMAT};

use crate::failed;

/// Formats a date-time with a strftime pattern.
#[derive(Clone, Debug)]
pub struct DateTimeToString {
    /// strftime pattern.
    pub format: String,
}

impl DateTimeToString {
    /// A converter using `format`.
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }
}

impl Default for DateTimeToString {
    fn default() -> Self {
        Self::new(DEFAULT_DATETIME_FORMAT)
    }
}

impl Converter for DateTimeToString {
    declare_pair!("DateTimeToString", DateTime => String);

    fn convert(&self, value: &Value, target: &ValueType) -> Result<Value, EdgeError> {
        check_pair(self, value, target)?;
        let Some(dt) = value.as_datetime() else {
            return Ok(Value::Null);
        };
        let mut out = String::new();
        write!(out, "{}", dt.format(&self.format))
            .map_err(|_| failed(self, format!("invalid format '{}'", self.format)))?;
        Ok(Value::from(out))
    }
}

/// Parses a date-time with a strftime pattern.
#[derive(Clone, Debug)]
pub struct StringToDateTime {
    /// strftime pattern.
    pub format: String,
}

impl StringToDateTime {
    /// A converter using `format`.
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }
}

impl Default for StringToDateTime {
    fn default() -> Self {
        Self::new(DEFAULT_DATETIME_FORMAT)
    }
}

impl Converter for StringToDateTime {
    declare_pair!("StringToDateTime", String => DateTime);

    fn convert(&self, value: &Value, target: &ValueType) -> Result<Value, EdgeError> {
        check_pair(self, value, target)?;
        let Some(s) = value.as_str() else {
            return Ok(Value::Null);
        };
        NaiveDateTime::parse_from_str(s.trim(), &self.format)
            .map(Value::DateTime)
            .map_err(|e| failed(self, format!("'{s}' does not match '{}': {e}", self.format)))
    }
}
