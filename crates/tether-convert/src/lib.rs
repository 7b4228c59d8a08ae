//! Converter trait, converter registry, and transformer pipeline.
//!
//! A [`Converter`] declares one `(source kind, target kind)` pair. The
//! [`ConverterRegistry`] resolves the converter for a transfer by
//! first-match in registration order, short-circuiting identical types to
//! [`Resolution::Identity`]. A [`Transformer`] post-processes converted
//! values before they reach the destination accessor.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod converter;
pub mod registry;
pub mod transformer;

pub use converter::{check_pair, Converter};
pub use registry::{validate_converter, ConverterRegistry, Resolution};
pub use transformer::{Transform, Transformer};
