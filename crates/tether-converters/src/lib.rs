//! Built-in converters and transforms for the Tether binding engine.
//!
//! [`default_registry`] builds a registry holding every auto-registered
//! converter, in this priority order:
//!
//! 1. Booleans: [`BoolToInt`], [`IntToBool`], [`BoolToFloat`],
//!    [`BoolToString`], [`StringToBool`]
//! 2. Numbers: [`IntToFloat`], [`FloatToInt`], [`FloatToBool`]
//! 3. Text: [`IntToString`], [`FloatToString`], [`StringToInt`],
//!    [`StringToFloat`]
//! 4. Enums: [`EnumToString`], [`EnumToInt`], [`IntToEnum`],
//!    [`StringToEnum`]
//! 5. Date-times: [`DateTimeToString`], [`StringToDateTime`]
//! 6. Vectors: [`VectorToString`], [`VectorResize`], [`FloatToVector`]
//!
//! [`EnumToEnum`] opts out of discovery and must be registered by hand.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::Arc;

use tether_convert::{Converter, ConverterRegistry};
use tether_core::{EdgeError, RegistryError};

/// Implements the declared-pair methods of [`Converter`].
macro_rules! declare_pair {
    ($name:literal, $from:ident => $to:ident) => {
        fn name(&self) -> &str {
            $name
        }

        fn source_kind(&self) -> ::tether_core::ValueKind {
            ::tether_core::ValueKind::$from
        }

        fn target_kind(&self) -> ::tether_core::ValueKind {
            ::tether_core::ValueKind::$to
        }
    };
}

pub mod boolean;
pub mod datetime;
pub mod enums;
pub mod numeric;
pub mod text;
pub mod transforms;
pub mod vector;

pub use boolean::{BoolToFloat, BoolToInt, BoolToString, FloatToBool, IntToBool, StringToBool};
pub use datetime::{DateTimeToString, StringToDateTime};
pub use enums::{EnumToEnum, EnumToInt, EnumToString, IntToEnum, StringToEnum};
pub use numeric::{FloatToInt, IntToFloat};
pub use text::{FloatToString, IntToString, StringToFloat, StringToInt};
pub use transforms::{Clamp, Format, MapTransform, Negate, Offset, Round, Scale};
pub use vector::{FloatToVector, VectorResize, VectorToString};

/// Build a [`EdgeError::ConversionFailed`] for `converter`.
pub(crate) fn failed<C: Converter + ?Sized>(converter: &C, reason: impl Into<String>) -> EdgeError {
    EdgeError::ConversionFailed {
        converter: converter.name().to_string(),
        reason: reason.into(),
    }
}

/// Every built-in converter in priority order, including those that opt
/// out of auto-registration.
pub fn builtin_converters() -> Vec<Arc<dyn Converter>> {
    vec![
        Arc::new(BoolToInt),
        Arc::new(IntToBool),
        Arc::new(BoolToFloat),
        Arc::new(BoolToString),
        Arc::new(StringToBool),
        Arc::new(IntToFloat),
        Arc::new(FloatToInt),
        Arc::new(FloatToBool),
        Arc::new(IntToString),
        Arc::new(FloatToString::default()),
        Arc::new(StringToInt),
        Arc::new(StringToFloat),
        Arc::new(EnumToString),
        Arc::new(EnumToInt),
        Arc::new(IntToEnum),
        Arc::new(StringToEnum),
        Arc::new(DateTimeToString::default()),
        Arc::new(StringToDateTime::default()),
        Arc::new(VectorToString),
        Arc::new(VectorResize),
        Arc::new(FloatToVector),
        Arc::new(EnumToEnum),
    ]
}

/// Register every auto-registered built-in converter into `registry`.
///
/// Returns the number registered.
pub fn register_builtins(registry: &ConverterRegistry) -> Result<usize, RegistryError> {
    registry.register_auto(builtin_converters())
}

/// A fresh registry holding every auto-registered built-in converter.
///
/// # Examples
///
/// ```
/// use tether_converters::default_registry;
/// use tether_core::{Value, ValueType};
///
/// let registry = default_registry();
/// assert_eq!(
///     registry.convert(&Value::Int(42), &ValueType::String),
///     Ok(Value::from("42")),
/// );
/// ```
pub fn default_registry() -> ConverterRegistry {
    let registry = ConverterRegistry::new();
    let registered = register_builtins(&registry);
    debug_assert!(registered.is_ok(), "built-in converter rejected: {registered:?}");
    registry
}
