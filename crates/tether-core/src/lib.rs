//! Core types and traits for the Tether binding engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the Tether workspace:
//! dynamically-typed values and their type tags, identifiers, the
//! [`Accessor`] capability, and error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod accessor;
pub mod error;
pub mod id;
pub mod value;

pub use accessor::{Accessor, FnAccessor};
pub use error::{EdgeError, RegistryError, WriteRejected};
pub use id::{BindId, BindableId};
pub use value::{
    Components, EnumDef, EnumValue, Value, ValueKind, ValueType, DEFAULT_DATETIME_FORMAT,
};
