//! Converter registry and resolution.
//!
//! Converters are kept in registration order. Resolution for a
//! `(from, to)` pair short-circuits identical types to
//! [`Resolution::Identity`]; otherwise the first converter whose
//! `can_convert` accepts the pair wins.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::sync::Arc;

use tether_core::{EdgeError, RegistryError, Value, ValueKind, ValueType};

use crate::converter::Converter;

// ── Resolution ─────────────────────────────────────────────────────

/// Outcome of resolving a type pair.
#[derive(Clone)]
pub enum Resolution {
    /// Source and target types are identical; the value is passed as-is.
    Identity,
    /// The converter selected for the pair.
    Convert(Arc<dyn Converter>),
}

impl Resolution {
    /// Whether no conversion is needed.
    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Identity)
    }

    /// Name of the selected converter, or `None` for identity.
    pub fn converter_name(&self) -> Option<&str> {
        match self {
            Self::Identity => None,
            Self::Convert(c) => Some(c.name()),
        }
    }

    /// Apply the resolution to `value`.
    pub fn apply(&self, value: &Value, target: &ValueType) -> Result<Value, EdgeError> {
        match self {
            Self::Identity => Ok(value.clone()),
            Self::Convert(c) => c.convert(value, target),
        }
    }
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => f.write_str("Identity"),
            Self::Convert(c) => f.debug_tuple("Convert").field(&c.name()).finish(),
        }
    }
}

// ── Validation ─────────────────────────────────────────────────────

/// The single type of a non-parametric kind; `None` for enum and vector.
fn representative(kind: ValueKind) -> Option<ValueType> {
    match kind {
        ValueKind::Bool => Some(ValueType::Bool),
        ValueKind::Int => Some(ValueType::Int),
        ValueKind::Float => Some(ValueType::Float),
        ValueKind::String => Some(ValueType::String),
        ValueKind::DateTime => Some(ValueType::DateTime),
        ValueKind::Enum | ValueKind::Vector => None,
    }
}

/// Check a converter's declared pair against its `can_convert`.
///
/// Rejects:
/// - same-kind converters over a non-parametric kind, which identity
///   resolution would always pre-empt;
/// - converters whose `can_convert` refuses their own declared pair
///   (checked when both kinds are non-parametric);
/// - converters whose `can_convert` accepts a different pair of
///   non-parametric kinds.
pub fn validate_converter(converter: &dyn Converter) -> Result<(), RegistryError> {
    let from = converter.source_kind();
    let to = converter.target_kind();

    if from == to && !from.is_parametric() {
        return Err(RegistryError::UnreachableIdentity {
            converter: converter.name().to_string(),
            kind: from,
        });
    }

    let inconsistent = || RegistryError::InconsistentConverter {
        converter: converter.name().to_string(),
        from,
        to,
    };

    for s in ValueKind::ALL {
        let Some(src) = representative(s) else {
            continue;
        };
        for t in ValueKind::ALL {
            let Some(dst) = representative(t) else {
                continue;
            };
            let declared = s == from && t == to;
            if converter.can_convert(&src, &dst) != declared {
                return Err(inconsistent());
            }
        }
    }
    Ok(())
}

// ── ConverterRegistry ──────────────────────────────────────────────

/// Ordered set of converters, shared by every bind that uses it.
///
/// Registration order is resolution priority. Registering during a
/// lookup is not supported.
///
/// # Examples
///
/// ```
/// use tether_convert::{check_pair, Converter, ConverterRegistry};
/// use tether_core::{EdgeError, Value, ValueKind, ValueType};
///
/// struct BoolToInt;
///
/// impl Converter for BoolToInt {
///     fn name(&self) -> &str { "BoolToInt" }
///     fn source_kind(&self) -> ValueKind { ValueKind::Bool }
///     fn target_kind(&self) -> ValueKind { ValueKind::Int }
///     fn convert(&self, value: &Value, target: &ValueType) -> Result<Value, EdgeError> {
///         check_pair(self, value, target)?;
///         Ok(value.as_bool().map_or(Value::Null, |b| Value::Int(i64::from(b))))
///     }
/// }
///
/// let registry = ConverterRegistry::new();
/// registry.register(BoolToInt).unwrap();
///
/// assert_eq!(registry.convert(&Value::Bool(true), &ValueType::Int), Ok(Value::Int(1)));
/// assert!(registry.resolve(&ValueType::Int, &ValueType::Int).unwrap().is_identity());
/// assert!(registry.resolve(&ValueType::Int, &ValueType::Bool).is_err());
/// ```
#[derive(Default)]
pub struct ConverterRegistry {
    converters: RefCell<Vec<Arc<dyn Converter>>>,
    lookups: Cell<u64>,
}

impl ConverterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append a converter.
    pub fn register(&self, converter: impl Converter) -> Result<(), RegistryError> {
        self.register_arc(Arc::new(converter))
    }

    /// Validate and append an already-shared converter.
    pub fn register_arc(&self, converter: Arc<dyn Converter>) -> Result<(), RegistryError> {
        validate_converter(converter.as_ref())?;
        tracing::debug!(
            converter = converter.name(),
            from = %converter.source_kind(),
            to = %converter.target_kind(),
            priority = self.len(),
            "converter registered"
        );
        self.converters.borrow_mut().push(converter);
        Ok(())
    }

    /// Register every converter in `candidates` whose
    /// [`auto_register`](Converter::auto_register) is `true`, in order.
    ///
    /// Returns the number registered. Stops at the first invalid one.
    pub fn register_auto<I>(&self, candidates: I) -> Result<usize, RegistryError>
    where
        I: IntoIterator<Item = Arc<dyn Converter>>,
    {
        let mut count = 0;
        for converter in candidates {
            if converter.auto_register() {
                self.register_arc(converter)?;
                count += 1;
            }
        }
        Ok(count)
    }

    /// Resolve the conversion for `from -> to`.
    ///
    /// Identical types resolve to [`Resolution::Identity`] without
    /// scanning the converter list.
    pub fn resolve(&self, from: &ValueType, to: &ValueType) -> Result<Resolution, EdgeError> {
        if from == to {
            return Ok(Resolution::Identity);
        }
        self.lookups.set(self.lookups.get() + 1);
        self.converters
            .borrow()
            .iter()
            .find(|c| c.can_convert(from, to))
            .map(|c| Resolution::Convert(Arc::clone(c)))
            .ok_or_else(|| EdgeError::NoConverterFound {
                from: from.clone(),
                to: to.clone(),
            })
    }

    /// Convert `value` to `target` using the resolved converter.
    ///
    /// `Null` is returned unchanged without resolution.
    pub fn convert(&self, value: &Value, target: &ValueType) -> Result<Value, EdgeError> {
        match value.value_type() {
            None => Ok(Value::Null),
            Some(from) => self.resolve(&from, target)?.apply(value, target),
        }
    }

    /// Number of registered converters.
    pub fn len(&self) -> usize {
        self.converters.borrow().len()
    }

    /// Whether no converters are registered.
    pub fn is_empty(&self) -> bool {
        self.converters.borrow().is_empty()
    }

    /// Converter names in priority order.
    pub fn names(&self) -> Vec<String> {
        self.converters
            .borrow()
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    }

    /// How many times the converter list has been scanned.
    ///
    /// Identity resolutions do not count.
    pub fn lookup_count(&self) -> u64 {
        self.lookups.get()
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("converters", &self.names())
            .field("lookups", &self.lookups.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::check_pair;
    use proptest::prelude::*;
    use tether_core::EnumDef;

    /// Int -> String converter tagging its output with `tag`.
    struct Tagged {
        name: String,
        tag: &'static str,
    }

    impl Tagged {
        fn new(name: &str, tag: &'static str) -> Self {
            Self {
                name: name.into(),
                tag,
            }
        }
    }

    impl Converter for Tagged {
        fn name(&self) -> &str {
            &self.name
        }
        fn source_kind(&self) -> ValueKind {
            ValueKind::Int
        }
        fn target_kind(&self) -> ValueKind {
            ValueKind::String
        }
        fn convert(&self, value: &Value, target: &ValueType) -> Result<Value, EdgeError> {
            check_pair(self, value, target)?;
            Ok(Value::from(format!("{}:{value}", self.tag)))
        }
    }

    /// Declares an arbitrary pair with a configurable `can_convert`.
    struct Liar {
        from: ValueKind,
        to: ValueKind,
        accepts: fn(&ValueType, &ValueType) -> bool,
    }

    impl Converter for Liar {
        fn name(&self) -> &str {
            "Liar"
        }
        fn source_kind(&self) -> ValueKind {
            self.from
        }
        fn target_kind(&self) -> ValueKind {
            self.to
        }
        fn can_convert(&self, from: &ValueType, to: &ValueType) -> bool {
            (self.accepts)(from, to)
        }
        fn convert(&self, _: &Value, _: &ValueType) -> Result<Value, EdgeError> {
            Ok(Value::Null)
        }
    }

    /// Enum -> Enum restricted to one source definition.
    struct OnlyColor(EnumDef);

    impl Converter for OnlyColor {
        fn name(&self) -> &str {
            "OnlyColor"
        }
        fn source_kind(&self) -> ValueKind {
            ValueKind::Enum
        }
        fn target_kind(&self) -> ValueKind {
            ValueKind::Enum
        }
        fn can_convert(&self, from: &ValueType, to: &ValueType) -> bool {
            from.enum_def() == Some(&self.0) && to.kind() == ValueKind::Enum
        }
        fn convert(&self, value: &Value, target: &ValueType) -> Result<Value, EdgeError> {
            check_pair(self, value, target)?;
            Ok(value.clone())
        }
    }

    #[test]
    fn first_registered_match_wins() {
        let reg = ConverterRegistry::new();
        reg.register(Tagged::new("first", "a")).unwrap();
        reg.register(Tagged::new("second", "b")).unwrap();

        let res = reg.resolve(&ValueType::Int, &ValueType::String).unwrap();
        assert_eq!(res.converter_name(), Some("first"));
        assert_eq!(
            reg.convert(&Value::Int(5), &ValueType::String),
            Ok(Value::from("a:5"))
        );
        assert_eq!(reg.names(), vec!["first", "second"]);
    }

    #[test]
    fn identity_does_not_scan() {
        let reg = ConverterRegistry::new();
        reg.register(Tagged::new("t", "x")).unwrap();

        let res = reg.resolve(&ValueType::Int, &ValueType::Int).unwrap();
        assert!(res.is_identity());
        assert_eq!(reg.convert(&Value::Int(9), &ValueType::Int), Ok(Value::Int(9)));
        assert_eq!(reg.lookup_count(), 0);

        reg.resolve(&ValueType::Int, &ValueType::String).unwrap();
        assert_eq!(reg.lookup_count(), 1);
    }

    #[test]
    fn missing_pair_is_no_converter_found() {
        let reg = ConverterRegistry::new();
        let err = reg.convert(&Value::Bool(true), &ValueType::Float).unwrap_err();
        assert_eq!(
            err,
            EdgeError::NoConverterFound {
                from: ValueType::Bool,
                to: ValueType::Float,
            }
        );
    }

    #[test]
    fn null_skips_resolution() {
        let reg = ConverterRegistry::new();
        assert_eq!(reg.convert(&Value::Null, &ValueType::DateTime), Ok(Value::Null));
        assert_eq!(reg.lookup_count(), 0);
    }

    #[test]
    fn rejects_same_kind_scalar_converter() {
        let reg = ConverterRegistry::new();
        let err = reg
            .register(Liar {
                from: ValueKind::Int,
                to: ValueKind::Int,
                accepts: |_, _| false,
            })
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::UnreachableIdentity {
                kind: ValueKind::Int,
                ..
            }
        ));
        assert!(reg.is_empty());
    }

    #[test]
    fn rejects_can_convert_refusing_declared_pair() {
        let reg = ConverterRegistry::new();
        let err = reg
            .register(Liar {
                from: ValueKind::Int,
                to: ValueKind::Float,
                accepts: |_, _| false,
            })
            .unwrap_err();
        assert!(matches!(err, RegistryError::InconsistentConverter { .. }));
    }

    #[test]
    fn rejects_can_convert_accepting_other_pairs() {
        let reg = ConverterRegistry::new();
        let err = reg
            .register(Liar {
                from: ValueKind::Int,
                to: ValueKind::Float,
                accepts: |_, to| to.kind() == ValueKind::Float,
            })
            .unwrap_err();
        assert!(matches!(err, RegistryError::InconsistentConverter { .. }));
    }

    #[test]
    fn narrowed_parametric_converter_is_accepted() {
        let color = EnumDef::new("Color", ["Red", "Green"]);
        let shade = EnumDef::new("Shade", ["Red", "Green"]);
        let reg = ConverterRegistry::new();
        reg.register(OnlyColor(color.clone())).unwrap();

        let c = ValueType::Enum(color);
        let s = ValueType::Enum(shade);
        assert!(reg.resolve(&c, &s).is_ok());
        assert!(reg.resolve(&s, &c).is_err());
    }

    #[test]
    fn register_auto_skips_opt_outs() {
        struct Manual;
        impl Converter for Manual {
            fn name(&self) -> &str {
                "Manual"
            }
            fn source_kind(&self) -> ValueKind {
                ValueKind::Bool
            }
            fn target_kind(&self) -> ValueKind {
                ValueKind::String
            }
            fn convert(&self, v: &Value, _: &ValueType) -> Result<Value, EdgeError> {
                Ok(v.clone())
            }
            fn auto_register(&self) -> bool {
                false
            }
        }

        let reg = ConverterRegistry::new();
        let n = reg
            .register_auto([
                Arc::new(Manual) as Arc<dyn Converter>,
                Arc::new(Tagged::new("t", "x")),
            ])
            .unwrap();
        assert_eq!(n, 1);
        assert_eq!(reg.names(), vec!["t"]);
    }

    proptest! {
        #[test]
        fn resolution_picks_earliest_accepting(n in 1usize..8, tags in prop::collection::vec(any::<bool>(), 1..8)) {
            // Each converter accepts enum -> vector only when its flag is set.
            struct Gate { idx: usize, open: bool }
            impl Converter for Gate {
                fn name(&self) -> &str { "gate" }
                fn source_kind(&self) -> ValueKind { ValueKind::Enum }
                fn target_kind(&self) -> ValueKind { ValueKind::Vector }
                fn can_convert(&self, from: &ValueType, to: &ValueType) -> bool {
                    self.open && from.kind() == ValueKind::Enum && to.kind() == ValueKind::Vector
                }
                fn convert(&self, _: &Value, _: &ValueType) -> Result<Value, EdgeError> {
                    Ok(Value::Int(self.idx as i64))
                }
            }

            let reg = ConverterRegistry::new();
            for (idx, open) in tags.iter().copied().take(n).enumerate() {
                reg.register(Gate { idx, open }).unwrap();
            }
            let def = EnumDef::new("E", ["a"]);
            let from = ValueType::Enum(def.clone());
            let to = ValueType::Vector { dims: 2 };
            let expected = tags.iter().take(n).position(|&open| open);
            match reg.resolve(&from, &to) {
                Ok(res) => {
                    let v = res.apply(&Value::Enum(def.value(0).unwrap()), &to).unwrap();
                    prop_assert_eq!(v.as_int().map(|i| i as usize), expected);
                }
                Err(_) => prop_assert!(expected.is_none()),
            }
        }
    }
}
