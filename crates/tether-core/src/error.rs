//! Error types for the Tether binding engine.
//!
//! Organized by where they surface: per-edge propagation failures
//! ([`EdgeError`]), accessor write refusals ([`WriteRejected`]), and
//! registration-time contract violations ([`RegistryError`]).

use thiserror::Error;

use crate::value::{ValueKind, ValueType};

/// An accessor refused a write.
///
/// Returned by [`Accessor::write`](crate::Accessor::write) and surfaced to
/// the bind's observer as [`EdgeError::WriteRejected`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("write rejected: {reason}")]
pub struct WriteRejected {
    /// Human-readable description of why the write was refused.
    pub reason: String,
}

impl WriteRejected {
    /// Create a rejection with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Failure delivering a value along one edge (bind → one bindable).
///
/// Always local to that edge: a failing edge never aborts the remaining
/// edges of the same propagation pass.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EdgeError {
    /// The payload does not match a converter's declared source kind, or
    /// the requested target does not match its declared target kind.
    #[error("converter '{converter}' expected {expected}, got {actual}")]
    TypeMismatch {
        /// Name of the converter that rejected the input.
        converter: String,
        /// The kind the converter declares.
        expected: ValueKind,
        /// The type it was handed.
        actual: ValueType,
    },
    /// No registered converter handles the type pair.
    #[error("no converter from {from} to {to}")]
    NoConverterFound {
        /// Runtime type of the value being delivered.
        from: ValueType,
        /// Declared type of the destination.
        to: ValueType,
    },
    /// The types matched but the value could not be represented in the
    /// target type (unparsable string, out-of-range index, NaN).
    #[error("converter '{converter}' failed: {reason}")]
    ConversionFailed {
        /// Name of the converter.
        converter: String,
        /// Description of the failure.
        reason: String,
    },
    /// The destination accessor refused the write.
    #[error(transparent)]
    WriteRejected(#[from] WriteRejected),
}

/// A converter was rejected at registration time.
///
/// These are caller-contract violations caught before any conversion runs.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// `can_convert` disagrees with the declared pair: it refuses the
    /// declared kinds or accepts a different pair of kinds.
    #[error("converter '{converter}' declares {from} -> {to} but can_convert disagrees")]
    InconsistentConverter {
        /// Name of the converter.
        converter: String,
        /// Declared source kind.
        from: ValueKind,
        /// Declared target kind.
        to: ValueKind,
    },
    /// The converter maps a non-parametric kind onto itself. Identical
    /// types short-circuit to identity, so it could never be selected.
    #[error("converter '{converter}' maps {kind} onto itself and would never be selected")]
    UnreachableIdentity {
        /// Name of the converter.
        converter: String,
        /// The kind on both sides.
        kind: ValueKind,
    },
}
