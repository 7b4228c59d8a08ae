//! Conversions to and from enum values.
//!
//! All of these are polymorphic over enum definitions: the source
//! definition comes from the value, the target definition from the
//! requested [`ValueType`].

use tether_convert::{check_pair, Converter};
use tether_core::{EdgeError, EnumDef, EnumValue, Value, ValueType};

use crate::failed;

fn target_def<'t, C: Converter>(c: &C, target: &'t ValueType) -> Result<&'t EnumDef, EdgeError> {
    target
        .enum_def()
        .ok_or_else(|| failed(c, format!("target {target} is not an enum")))
}

/// Look up `name` in `def`: exact match first, then ASCII case-insensitive.
fn lookup(def: &EnumDef, name: &str) -> Option<EnumValue> {
    def.value_named(name).or_else(|| {
        def.variants()
            .iter()
            .position(|v| v.eq_ignore_ascii_case(name))
            .and_then(|i| def.value(i))
    })
}

/// Variant name.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnumToString;

impl Converter for EnumToString {
    declare_pair!("EnumToString", Enum => String);

    fn convert(&self, value: &Value, target: &ValueType) -> Result<Value, EdgeError> {
        check_pair(self, value, target)?;
        Ok(value.as_enum().map_or(Value::Null, |e| Value::from(e.name())))
    }
}

/// Variant index.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnumToInt;

impl Converter for EnumToInt {
    declare_pair!("EnumToInt", Enum => Int);

    fn convert(&self, value: &Value, target: &ValueType) -> Result<Value, EdgeError> {
        check_pair(self, value, target)?;
        Ok(value
            .as_enum()
            .map_or(Value::Null, |e| Value::Int(e.index() as i64)))
    }
}

/// Variant at the given index of the target definition.
#[derive(Clone, Copy, Debug, Default)]
pub struct IntToEnum;

impl Converter for IntToEnum {
    declare_pair!("IntToEnum", Int => Enum);

    fn convert(&self, value: &Value, target: &ValueType) -> Result<Value, EdgeError> {
        check_pair(self, value, target)?;
        let Some(i) = value.as_int() else {
            return Ok(Value::Null);
        };
        let def = target_def(self, target)?;
        usize::try_from(i)
            .ok()
            .and_then(|i| def.value(i))
            .map(Value::Enum)
            .ok_or_else(|| {
                failed(
                    self,
                    format!("index {i} out of range for {} ({} variants)", def.name(), def.len()),
                )
            })
    }
}

/// Variant of the target definition with the given name.
///
/// Exact match wins; otherwise the first case-insensitive match.
#[derive(Clone, Copy, Debug, Default)]
pub struct StringToEnum;

impl Converter for StringToEnum {
    declare_pair!("StringToEnum", String => Enum);

    fn convert(&self, value: &Value, target: &ValueType) -> Result<Value, EdgeError> {
        check_pair(self, value, target)?;
        let Some(s) = value.as_str() else {
            return Ok(Value::Null);
        };
        let def = target_def(self, target)?;
        lookup(def, s.trim())
            .map(Value::Enum)
            .ok_or_else(|| failed(self, format!("'{s}' is not a variant of {}", def.name())))
    }
}

/// Maps between two enum definitions by variant name.
///
/// Not auto-registered: matching variants across unrelated enums by name
/// is only meaningful when a caller says so.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnumToEnum;

impl Converter for EnumToEnum {
    declare_pair!("EnumToEnum", Enum => Enum);

    fn convert(&self, value: &Value, target: &ValueType) -> Result<Value, EdgeError> {
        check_pair(self, value, target)?;
        let Some(e) = value.as_enum() else {
            return Ok(Value::Null);
        };
        let def = target_def(self, target)?;
        lookup(def, e.name())
            .map(Value::Enum)
            .ok_or_else(|| failed(self, format!("{} has no variant '{}'", def.name(), e.name())))
    }

    fn auto_register(&self) -> bool {
        false
    }
}
