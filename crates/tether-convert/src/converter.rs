//! The [`Converter`] trait.
//!
//! A converter maps values of one kind to another. Converters are
//! stateless apart from configuration fixed at construction, so one
//! instance is shared by every bind that resolves to it.

use tether_core::{EdgeError, Value, ValueKind, ValueType};

/// A typed mapping from one value kind to another.
///
/// # Contract
///
/// - `source_kind()` and `target_kind()` never change for an instance.
/// - `can_convert(from, to)` must accept at least the representative
///   types of the declared kinds and reject every other kind pair. The
///   registry checks this at registration.
/// - `convert()` returns [`EdgeError::TypeMismatch`] when handed a value
///   or target outside the declared pair and passes [`Value::Null`]
///   through unchanged. [`check_pair`] implements both rules.
///
/// # Examples
///
/// ```
/// use tether_convert::{check_pair, Converter};
/// use tether_core::{EdgeError, Value, ValueKind, ValueType};
///
/// struct IntToBool;
///
/// impl Converter for IntToBool {
///     fn name(&self) -> &str { "IntToBool" }
///     fn source_kind(&self) -> ValueKind { ValueKind::Int }
///     fn target_kind(&self) -> ValueKind { ValueKind::Bool }
///
///     fn convert(&self, value: &Value, target: &ValueType) -> Result<Value, EdgeError> {
///         check_pair(self, value, target)?;
///         Ok(value.as_int().map_or(Value::Null, |i| Value::Bool(i != 0)))
///     }
/// }
///
/// let c = IntToBool;
/// assert_eq!(c.convert(&Value::Int(3), &ValueType::Bool), Ok(Value::Bool(true)));
/// assert!(c.convert(&Value::from("3"), &ValueType::Bool).is_err());
/// ```
pub trait Converter: Send + Sync + 'static {
    /// Human-readable name used in errors and logs.
    fn name(&self) -> &str;

    /// Kind of the values this converter accepts.
    fn source_kind(&self) -> ValueKind;

    /// Kind of the values this converter produces.
    fn target_kind(&self) -> ValueKind;

    /// Whether this converter handles `from -> to`.
    ///
    /// Default: kind equality with the declared pair. Override to narrow
    /// a parametric kind, e.g. one specific enum definition.
    fn can_convert(&self, from: &ValueType, to: &ValueType) -> bool {
        from.kind() == self.source_kind() && to.kind() == self.target_kind()
    }

    /// Convert `value` to the concrete `target` type.
    fn convert(&self, value: &Value, target: &ValueType) -> Result<Value, EdgeError>;

    /// Whether the built-in discovery pass should register this converter.
    ///
    /// Converters that need per-use configuration return `false` and are
    /// registered explicitly.
    fn auto_register(&self) -> bool {
        true
    }
}

/// Check a conversion request against `converter`'s declared pair.
///
/// Fails with [`EdgeError::TypeMismatch`] when `target` is not of the
/// declared target kind, or when `value` is non-null and not of the
/// declared source kind. After `Ok(())` the value is either `Null` or of
/// the source kind.
pub fn check_pair<C: Converter + ?Sized>(
    converter: &C,
    value: &Value,
    target: &ValueType,
) -> Result<(), EdgeError> {
    if target.kind() != converter.target_kind() {
        return Err(EdgeError::TypeMismatch {
            converter: converter.name().to_string(),
            expected: converter.target_kind(),
            actual: target.clone(),
        });
    }
    match value.value_type() {
        Some(actual) if actual.kind() != converter.source_kind() => Err(EdgeError::TypeMismatch {
            converter: converter.name().to_string(),
            expected: converter.source_kind(),
            actual,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_core::EnumDef;

    struct EnumToInt;

    impl Converter for EnumToInt {
        fn name(&self) -> &str {
            "EnumToInt"
        }
        fn source_kind(&self) -> ValueKind {
            ValueKind::Enum
        }
        fn target_kind(&self) -> ValueKind {
            ValueKind::Int
        }
        fn convert(&self, value: &Value, target: &ValueType) -> Result<Value, EdgeError> {
            check_pair(self, value, target)?;
            Ok(value
                .as_enum()
                .map_or(Value::Null, |e| Value::Int(e.index() as i64)))
        }
    }

    #[test]
    fn default_can_convert_matches_kinds_only() {
        let a = EnumDef::new("A", ["x"]);
        let b = EnumDef::new("B", ["y", "z"]);
        let c = EnumToInt;
        assert!(c.can_convert(&ValueType::Enum(a), &ValueType::Int));
        assert!(c.can_convert(&ValueType::Enum(b), &ValueType::Int));
        assert!(!c.can_convert(&ValueType::Int, &ValueType::Int));
        assert!(c.auto_register());
    }

    #[test]
    fn check_pair_rejects_wrong_source() {
        let err = EnumToInt
            .convert(&Value::Bool(true), &ValueType::Int)
            .unwrap_err();
        assert_eq!(
            err,
            EdgeError::TypeMismatch {
                converter: "EnumToInt".into(),
                expected: ValueKind::Enum,
                actual: ValueType::Bool,
            }
        );
    }

    #[test]
    fn check_pair_rejects_wrong_target() {
        let def = EnumDef::new("A", ["x"]);
        let v = Value::Enum(def.value(0).unwrap());
        let err = EnumToInt.convert(&v, &ValueType::Float).unwrap_err();
        assert!(matches!(
            err,
            EdgeError::TypeMismatch {
                expected: ValueKind::Int,
                ..
            }
        ));
    }

    #[test]
    fn null_passes_through() {
        assert_eq!(EnumToInt.convert(&Value::Null, &ValueType::Int), Ok(Value::Null));
    }
}
