//! Reusable converter fixtures.
//!
//! - [`FailingConverter`]: declares a pair and always fails.
//! - [`CountingConverter`]: wraps another converter and counts calls.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tether_convert::{check_pair, Converter};
use tether_core::{EdgeError, Value, ValueKind, ValueType};

/// Declares `source -> target` and fails every non-null conversion.
///
/// Useful for exercising per-edge isolation: resolution succeeds, the
/// edge fails, and the rest of the pass must still run.
pub struct FailingConverter {
    pub name: String,
    pub source: ValueKind,
    pub target: ValueKind,
    calls: AtomicUsize,
}

impl FailingConverter {
    pub fn new(name: impl Into<String>, source: ValueKind, target: ValueKind) -> Self {
        Self {
            name: name.into(),
            source,
            target,
            calls: AtomicUsize::new(0),
        }
    }

    /// How many times `convert()` has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl Converter for FailingConverter {
    fn name(&self) -> &str {
        &self.name
    }

    fn source_kind(&self) -> ValueKind {
        self.source
    }

    fn target_kind(&self) -> ValueKind {
        self.target
    }

    fn convert(&self, value: &Value, target: &ValueType) -> Result<Value, EdgeError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        check_pair(self, value, target)?;
        Err(EdgeError::ConversionFailed {
            converter: self.name.clone(),
            reason: "deliberate failure".to_string(),
        })
    }
}

/// Delegates to an inner converter and counts `can_convert` and
/// `convert` calls.
///
/// Register it and then check the counters to prove whether resolution
/// consulted the converter list.
pub struct CountingConverter {
    inner: Arc<dyn Converter>,
    checks: AtomicUsize,
    converts: AtomicUsize,
}

impl CountingConverter {
    pub fn new(inner: impl Converter) -> Self {
        Self::wrap(Arc::new(inner))
    }

    pub fn wrap(inner: Arc<dyn Converter>) -> Self {
        Self {
            inner,
            checks: AtomicUsize::new(0),
            converts: AtomicUsize::new(0),
        }
    }

    /// How many times `can_convert()` has been called.
    pub fn checks(&self) -> usize {
        self.checks.load(Ordering::Relaxed)
    }

    /// How many times `convert()` has been called.
    pub fn converts(&self) -> usize {
        self.converts.load(Ordering::Relaxed)
    }

    /// Reset both counters.
    pub fn reset(&self) {
        self.checks.store(0, Ordering::Relaxed);
        self.converts.store(0, Ordering::Relaxed);
    }
}

impl Converter for CountingConverter {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn source_kind(&self) -> ValueKind {
        self.inner.source_kind()
    }

    fn target_kind(&self) -> ValueKind {
        self.inner.target_kind()
    }

    fn can_convert(&self, from: &ValueType, to: &ValueType) -> bool {
        self.checks.fetch_add(1, Ordering::Relaxed);
        self.inner.can_convert(from, to)
    }

    fn convert(&self, value: &Value, target: &ValueType) -> Result<Value, EdgeError> {
        self.converts.fetch_add(1, Ordering::Relaxed);
        self.inner.convert(value, target)
    }

    fn auto_register(&self) -> bool {
        self.inner.auto_register()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failing_converter_fails_after_pair_check() {
        let c = FailingConverter::new("broken", ValueKind::Int, ValueKind::String);
        assert!(matches!(
            c.convert(&Value::Int(1), &ValueType::String),
            Err(EdgeError::ConversionFailed { .. })
        ));
        assert!(matches!(
            c.convert(&Value::Bool(true), &ValueType::String),
            Err(EdgeError::TypeMismatch { .. })
        ));
        assert_eq!(c.calls(), 2);
    }
}
