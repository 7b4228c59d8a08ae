//! Conversions between numbers and strings.

use tether_convert::{check_pair, Converter};
use tether_core::{EdgeError, Value, ValueType};

use crate::failed;

/// Decimal representation of an integer.
#[derive(Clone, Copy, Debug, Default)]
pub struct IntToString;

impl Converter for IntToString {
    declare_pair!("IntToString", Int => String);

    fn convert(&self, value: &Value, target: &ValueType) -> Result<Value, EdgeError> {
        check_pair(self, value, target)?;
        Ok(value.as_int().map_or(Value::Null, |i| Value::from(i.to_string())))
    }
}

/// Decimal representation of a float.
///
/// With `precision: None` the shortest representation that round-trips
/// is used (`1.5`, `2`); with `Some(n)` exactly `n` fractional digits.
#[derive(Clone, Copy, Debug, Default)]
pub struct FloatToString {
    /// Fixed number of fractional digits, if any.
    pub precision: Option<usize>,
}

impl FloatToString {
    /// A converter printing exactly `digits` fractional digits.
    pub fn with_precision(digits: usize) -> Self {
        Self {
            precision: Some(digits),
        }
    }
}

impl Converter for FloatToString {
    declare_pair!("FloatToString", Float => String);

    fn convert(&self, value: &Value, target: &ValueType) -> Result<Value, EdgeError> {
        check_pair(self, value, target)?;
        Ok(value.as_float().map_or(Value::Null, |x| match self.precision {
            Some(p) => Value::from(format!("{x:.p$}")),
            None => Value::from(x.to_string()),
        }))
    }
}

/// Parses a decimal integer, ignoring surrounding whitespace.
#[derive(Clone, Copy, Debug, Default)]
pub struct StringToInt;

impl Converter for StringToInt {
    declare_pair!("StringToInt", String => Int);

    fn convert(&self, value: &Value, target: &ValueType) -> Result<Value, EdgeError> {
        check_pair(self, value, target)?;
        let Some(s) = value.as_str() else {
            return Ok(Value::Null);
        };
        s.trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|e| failed(self, format!("'{s}': {e}")))
    }
}

/// Parses a float, ignoring surrounding whitespace.
#[derive(Clone, Copy, Debug, Default)]
pub struct StringToFloat;

impl Converter for StringToFloat {
    declare_pair!("StringToFloat", String => Float);

    fn convert(&self, value: &Value, target: &ValueType) -> Result<Value, EdgeError> {
        check_pair(self, value, target)?;
        let Some(s) = value.as_str() else {
            return Ok(Value::Null);
        };
        s.trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|e| failed(self, format!("'{s}': {e}")))
    }
}
