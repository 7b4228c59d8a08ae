//! Conversions involving float vectors.

use tether_convert::{check_pair, Converter};
use tether_core::{Components, EdgeError, Value, ValueType};

use crate::failed;

fn target_dims<C: Converter>(c: &C, target: &ValueType) -> Result<usize, EdgeError> {
    target
        .vector_dims()
        .ok_or_else(|| failed(c, format!("target {target} is not a vector")))
}

/// Renders `(x, y, z)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct VectorToString;

impl Converter for VectorToString {
    declare_pair!("VectorToString", Vector => String);

    fn convert(&self, value: &Value, target: &ValueType) -> Result<Value, EdgeError> {
        check_pair(self, value, target)?;
        Ok(match value {
            Value::Vector(_) => Value::from(value.to_string()),
            _ => Value::Null,
        })
    }
}

/// Changes a vector's width: extra components are dropped, missing ones
/// are zero.
#[derive(Clone, Copy, Debug, Default)]
pub struct VectorResize;

impl Converter for VectorResize {
    declare_pair!("VectorResize", Vector => Vector);

    fn convert(&self, value: &Value, target: &ValueType) -> Result<Value, EdgeError> {
        check_pair(self, value, target)?;
        let Some(src) = value.as_vector() else {
            return Ok(Value::Null);
        };
        let dims = target_dims(self, target)?;
        let mut out: Components = src.iter().copied().take(dims).collect();
        out.resize(dims, 0.0);
        Ok(Value::Vector(out))
    }
}

/// Fills every component with the same float.
#[derive(Clone, Copy, Debug, Default)]
pub struct FloatToVector;

impl Converter for FloatToVector {
    declare_pair!("FloatToVector", Float => Vector);

    fn convert(&self, value: &Value, target: &ValueType) -> Result<Value, EdgeError> {
        check_pair(self, value, target)?;
        let Some(x) = value.as_float() else {
            return Ok(Value::Null);
        };
        let dims = target_dims(self, target)?;
        Ok(Value::vector(std::iter::repeat(x).take(dims)))
    }
}
