//! Test utilities and mock types for Tether development.
//!
//! Provides a [`MockAccessor`] with a shared, inspectable slot, a
//! [`RecordingObserver`] that keeps every propagation event, and
//! converter fixtures in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::cell::RefCell;
use std::rc::Rc;

use tether_core::{Accessor, Value, ValueType, WriteRejected};
use tether_engine::{Bindable, EdgeFailure, PassReport, PropagationObserver, WeakBindable};

pub use fixtures::{CountingConverter, FailingConverter};

// ── MockAccessor ────────────────────────────────────────────────

struct MockSlot {
    declared: ValueType,
    value: Value,
    writes: Vec<Value>,
    reject: Option<String>,
    echo: Option<WeakBindable>,
}

/// Accessor over a shared in-memory slot.
///
/// Clones share the slot, so a test keeps one handle for inspection and
/// hands the other to a [`Bindable`]. Writes are type-checked against the
/// declared type, logged, and optionally echoed back to an endpoint as a
/// change report, the way a host property setter with change
/// notification would behave.
#[derive(Clone)]
pub struct MockAccessor {
    slot: Rc<RefCell<MockSlot>>,
}

impl MockAccessor {
    /// A slot of type `declared` holding `initial`.
    pub fn new(declared: ValueType, initial: impl Into<Value>) -> Self {
        Self {
            slot: Rc::new(RefCell::new(MockSlot {
                declared,
                value: initial.into(),
                writes: Vec::new(),
                reject: None,
                echo: None,
            })),
        }
    }

    /// An empty slot of type `declared`.
    pub fn empty(declared: ValueType) -> Self {
        Self::new(declared, Value::Null)
    }

    /// Current slot value.
    pub fn value(&self) -> Value {
        self.slot.borrow().value.clone()
    }

    /// Change the slot from the host side without notifying anyone.
    pub fn set(&self, value: impl Into<Value>) {
        self.slot.borrow_mut().value = value.into();
    }

    /// Every accepted write, in order.
    pub fn writes(&self) -> Vec<Value> {
        self.slot.borrow().writes.clone()
    }

    /// Number of accepted writes.
    pub fn write_count(&self) -> usize {
        self.slot.borrow().writes.len()
    }

    /// Forget the write log.
    pub fn clear_writes(&self) {
        self.slot.borrow_mut().writes.clear();
    }

    /// Refuse every write with `reason` until [`accept`](Self::accept).
    pub fn reject_with(&self, reason: impl Into<String>) {
        self.slot.borrow_mut().reject = Some(reason.into());
    }

    /// Accept writes again.
    pub fn accept(&self) {
        self.slot.borrow_mut().reject = None;
    }

    /// After each accepted write, report the new value as a change of
    /// `bindable`.
    pub fn echo_to(&self, bindable: &Bindable) {
        self.slot.borrow_mut().echo = Some(bindable.downgrade());
    }
}

impl Accessor for MockAccessor {
    fn declared_type(&self) -> ValueType {
        self.slot.borrow().declared.clone()
    }

    fn read(&self) -> Value {
        self.value()
    }

    fn write(&mut self, value: Value) -> Result<(), WriteRejected> {
        let echo = {
            let mut slot = self.slot.borrow_mut();
            if let Some(reason) = &slot.reject {
                return Err(WriteRejected::new(reason.clone()));
            }
            if !value.is_instance_of(&slot.declared) {
                return Err(WriteRejected::new(format!(
                    "mock slot of type {} refused {value}",
                    slot.declared
                )));
            }
            slot.value = value.clone();
            slot.writes.push(value.clone());
            slot.echo.as_ref().and_then(WeakBindable::upgrade)
        };
        if let Some(bindable) = echo {
            bindable.report_change(value);
        }
        Ok(())
    }
}

impl std::fmt::Debug for MockAccessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slot = self.slot.borrow();
        f.debug_struct("MockAccessor")
            .field("declared", &slot.declared)
            .field("value", &slot.value)
            .field("writes", &slot.writes.len())
            .finish()
    }
}

// ── RecordingObserver ───────────────────────────────────────────

/// Keeps every edge failure and pass report it is told about.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    failures: RefCell<Vec<EdgeFailure>>,
    reports: RefCell<Vec<PassReport>>,
}

impl RecordingObserver {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn failures(&self) -> Vec<EdgeFailure> {
        self.failures.borrow().clone()
    }

    pub fn reports(&self) -> Vec<PassReport> {
        self.reports.borrow().clone()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.borrow().len()
    }

    pub fn pass_count(&self) -> usize {
        self.reports.borrow().len()
    }

    pub fn clear(&self) {
        self.failures.borrow_mut().clear();
        self.reports.borrow_mut().clear();
    }
}

impl PropagationObserver for RecordingObserver {
    fn edge_failed(&self, failure: &EdgeFailure) {
        self.failures.borrow_mut().push(failure.clone());
    }

    fn pass_completed(&self, report: &PassReport) {
        self.reports.borrow_mut().push(report.clone());
    }
}
