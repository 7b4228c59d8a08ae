//! Conversions between integers and floats.

use tether_convert::{check_pair, Converter};
use tether_core::{EdgeError, Value, ValueType};

use crate::failed;

/// Widens an integer to a float. Magnitudes above 2^53 lose precision.
#[derive(Clone, Copy, Debug, Default)]
pub struct IntToFloat;

impl Converter for IntToFloat {
    declare_pair!("IntToFloat", Int => Float);

    fn convert(&self, value: &Value, target: &ValueType) -> Result<Value, EdgeError> {
        check_pair(self, value, target)?;
        Ok(value.as_int().map_or(Value::Null, |i| Value::Float(i as f64)))
    }
}

/// Rounds a float to the nearest integer, halves away from zero.
///
/// NaN and values outside the `i64` range fail.
#[derive(Clone, Copy, Debug, Default)]
pub struct FloatToInt;

// 2^63 as f64; every finite float below it in magnitude fits in i64
// after rounding, and -2^63 itself is exactly i64::MIN.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

impl Converter for FloatToInt {
    declare_pair!("FloatToInt", Float => Int);

    fn convert(&self, value: &Value, target: &ValueType) -> Result<Value, EdgeError> {
        check_pair(self, value, target)?;
        let Some(x) = value.as_float() else {
            return Ok(Value::Null);
        };
        if x.is_nan() {
            return Err(failed(self, "NaN is not an integer"));
        }
        let r = x.round();
        if r >= I64_BOUND || r < -I64_BOUND {
            return Err(failed(self, format!("{x} is outside the integer range")));
        }
        Ok(Value::Int(r as i64))
    }
}
