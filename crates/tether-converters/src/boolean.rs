//! Conversions to and from booleans.

use tether_convert::{check_pair, Converter};
use tether_core::{EdgeError, Value, ValueType};

use crate::failed;

/// `true` → `1`, `false` → `0`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoolToInt;

impl Converter for BoolToInt {
    declare_pair!("BoolToInt", Bool => Int);

    fn convert(&self, value: &Value, target: &ValueType) -> Result<Value, EdgeError> {
        check_pair(self, value, target)?;
        Ok(value
            .as_bool()
            .map_or(Value::Null, |b| Value::Int(i64::from(b))))
    }
}

/// Non-zero → `true`.
#[derive(Clone, Copy, Debug, Default)]
pub struct IntToBool;

impl Converter for IntToBool {
    declare_pair!("IntToBool", Int => Bool);

    fn convert(&self, value: &Value, target: &ValueType) -> Result<Value, EdgeError> {
        check_pair(self, value, target)?;
        Ok(value.as_int().map_or(Value::Null, |i| Value::Bool(i != 0)))
    }
}

/// `true` → `1.0`, `false` → `0.0`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoolToFloat;

impl Converter for BoolToFloat {
    declare_pair!("BoolToFloat", Bool => Float);

    fn convert(&self, value: &Value, target: &ValueType) -> Result<Value, EdgeError> {
        check_pair(self, value, target)?;
        Ok(value
            .as_bool()
            .map_or(Value::Null, |b| Value::Float(if b { 1.0 } else { 0.0 })))
    }
}

/// Non-zero → `true`. NaN has no truth value and fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct FloatToBool;

impl Converter for FloatToBool {
    declare_pair!("FloatToBool", Float => Bool);

    fn convert(&self, value: &Value, target: &ValueType) -> Result<Value, EdgeError> {
        check_pair(self, value, target)?;
        match value.as_float() {
            None => Ok(Value::Null),
            Some(x) if x.is_nan() => Err(failed(self, "NaN has no boolean value")),
            Some(x) => Ok(Value::Bool(x != 0.0)),
        }
    }
}

/// `"true"` / `"false"`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoolToString;

impl Converter for BoolToString {
    declare_pair!("BoolToString", Bool => String);

    fn convert(&self, value: &Value, target: &ValueType) -> Result<Value, EdgeError> {
        check_pair(self, value, target)?;
        Ok(value
            .as_bool()
            .map_or(Value::Null, |b| Value::from(if b { "true" } else { "false" })))
    }
}

/// Parses `true/false`, `1/0`, `yes/no`, `on/off`, ignoring case and
/// surrounding whitespace.
#[derive(Clone, Copy, Debug, Default)]
pub struct StringToBool;

impl Converter for StringToBool {
    declare_pair!("StringToBool", String => Bool);

    fn convert(&self, value: &Value, target: &ValueType) -> Result<Value, EdgeError> {
        check_pair(self, value, target)?;
        let Some(s) = value.as_str() else {
            return Ok(Value::Null);
        };
        match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Value::Bool(true)),
            "false" | "0" | "no" | "off" => Ok(Value::Bool(false)),
            _ => Err(failed(self, format!("'{s}' is not a boolean"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_to_numbers() {
        assert_eq!(BoolToInt.convert(&Value::Bool(true), &ValueType::Int), Ok(Value::Int(1)));
        assert_eq!(
            BoolToFloat.convert(&Value::Bool(false), &ValueType::Float),
            Ok(Value::Float(0.0))
        );
    }

    #[test]
    fn numbers_to_bool() {
        assert_eq!(IntToBool.convert(&Value::Int(-4), &ValueType::Bool), Ok(Value::Bool(true)));
        assert_eq!(IntToBool.convert(&Value::Int(0), &ValueType::Bool), Ok(Value::Bool(false)));
        assert_eq!(
            FloatToBool.convert(&Value::Float(0.25), &ValueType::Bool),
            Ok(Value::Bool(true))
        );
        assert!(matches!(
            FloatToBool.convert(&Value::Float(f64::NAN), &ValueType::Bool),
            Err(EdgeError::ConversionFailed { .. })
        ));
    }

    #[test]
    fn string_round_trip_spellings() {
        for (s, b) in [
            ("true", true),
            (" Yes ", true),
            ("ON", true),
            ("1", true),
            ("false", false),
            ("no", false),
            ("Off", false),
            ("0", false),
        ] {
            assert_eq!(
                StringToBool.convert(&Value::from(s), &ValueType::Bool),
                Ok(Value::Bool(b)),
                "{s}"
            );
        }
        assert!(StringToBool
            .convert(&Value::from("maybe"), &ValueType::Bool)
            .is_err());
        assert_eq!(
            BoolToString.convert(&Value::Bool(true), &ValueType::String),
            Ok(Value::from("true"))
        );
    }
}
