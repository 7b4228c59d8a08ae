//! The bind hub and its propagation pass.
//!
//! # Pass protocol
//!
//! A change reported by a member starts a *pass*: the bind records the
//! value as its last value, then visits every other member that can
//! receive, in attach order, converting and writing the value into each.
//! Failures stay on their edge.
//!
//! While a pass is in flight:
//! - a notification from the pass origin, or from the member currently
//!   being written, is an echo of this pass and is dropped;
//! - a notification from any other member is queued and replayed as its
//!   own pass once the current pass finishes, up to
//!   [`BindOptions::max_deferred_passes`] per external change.
//!
//! The member list is snapshotted when the pass starts. Members detached
//! mid-pass are skipped; members attached mid-pass wait for the next pass.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use smallvec::SmallVec;
use tether_convert::ConverterRegistry;
use tether_core::{BindId, BindableId, Value};

use crate::bindable::{AttachOutcome, Bindable, Delivery};
use crate::config::{BindOptions, ConfigError};
use crate::metrics::{BindMetrics, PassReport};
use crate::observer::{EdgeFailure, PropagationObserver, TracingObserver};

// ── Outcomes ───────────────────────────────────────────────────────

/// Why a notification started no pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The origin is not a member of the bind.
    UnknownOrigin,
    /// The origin is a receiver, whose changes never propagate.
    ReceiverOrigin,
    /// The endpoint is not attached to any bind, or its queued change
    /// outlived its membership.
    Detached,
}

/// What a notification did.
#[derive(Clone, Debug, PartialEq)]
pub enum NotifyOutcome {
    /// A pass ran (and any passes it queued ran after it).
    Propagated(PassReport),
    /// A pass was in flight; this change will run after it.
    Deferred,
    /// Echo of the pass in flight; dropped.
    Suppressed,
    /// Not propagated.
    Ignored(IgnoreReason),
}

impl NotifyOutcome {
    /// The pass report, if a pass ran.
    pub fn report(&self) -> Option<&PassReport> {
        match self {
            Self::Propagated(r) => Some(r),
            _ => None,
        }
    }

    /// Whether a pass ran.
    pub fn is_propagated(&self) -> bool {
        matches!(self, Self::Propagated(_))
    }
}

// ── State ──────────────────────────────────────────────────────────

#[derive(Debug)]
struct PassState {
    origin: Option<BindableId>,
    receiving: Option<BindableId>,
}

#[derive(Default)]
struct BindState {
    members: IndexMap<BindableId, Bindable>,
    last_value: Option<Value>,
    version: u64,
    pass: Option<PassState>,
    pending: VecDeque<(Option<BindableId>, Value)>,
    metrics: BindMetrics,
}

pub(crate) struct BindInner {
    id: BindId,
    name: String,
    registry: Rc<ConverterRegistry>,
    observer: Rc<dyn PropagationObserver>,
    options: BindOptions,
    state: RefCell<BindState>,
}

impl Drop for BindInner {
    fn drop(&mut self) {
        for member in self.state.get_mut().members.values() {
            member.orphan();
        }
    }
}

/// Clears the pass in flight when dropped, so a panicking accessor
/// cannot leave the bind stuck in a pass.
struct PassGuard<'a> {
    inner: &'a BindInner,
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut st) = self.inner.state.try_borrow_mut() {
            st.pass = None;
        }
    }
}

/// Marks one member as receiving for the duration of its delivery.
struct ReceivingGuard<'a> {
    inner: &'a BindInner,
    prev: Option<BindableId>,
}

impl<'a> ReceivingGuard<'a> {
    fn enter(inner: &'a BindInner, member: BindableId) -> Self {
        let prev = inner
            .state
            .borrow_mut()
            .pass
            .as_mut()
            .and_then(|p| p.receiving.replace(member));
        Self { inner, prev }
    }
}

impl Drop for ReceivingGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut st) = self.inner.state.try_borrow_mut() {
            if let Some(pass) = st.pass.as_mut() {
                pass.receiving = self.prev;
            }
        }
    }
}

// ── Bind ───────────────────────────────────────────────────────────

/// A named hub keeping its member endpoints in sync.
///
/// Cheap to clone; clones share the same hub. The bind holds its members
/// strongly and each member points back weakly, so dropping every handle
/// to a bind detaches its members.
///
/// # Examples
///
/// ```
/// use std::rc::Rc;
/// use tether_convert::ConverterRegistry;
/// use tether_core::{FnAccessor, Value, ValueType};
/// use tether_engine::{Bind, Bindable};
///
/// let registry = Rc::new(ConverterRegistry::new());
/// let bind = Bind::new("score", registry);
///
/// let source = Bindable::sender(FnAccessor::new(
///     ValueType::Int,
///     || Value::Int(0),
///     |_| Ok(()),
/// ));
/// source.attach(&bind);
///
/// source.report_change(Value::Int(7));
/// assert_eq!(bind.last_value(), Some(Value::Int(7)));
/// ```
#[derive(Clone)]
pub struct Bind {
    pub(crate) inner: Rc<BindInner>,
}

impl Bind {
    /// Create a bind that logs edge failures through `tracing`.
    pub fn new(name: impl Into<String>, registry: Rc<ConverterRegistry>) -> Self {
        Self::build(
            name.into(),
            registry,
            Rc::new(TracingObserver),
            BindOptions::default(),
        )
    }

    /// Create a bind reporting to `observer`.
    pub fn with_observer(
        name: impl Into<String>,
        registry: Rc<ConverterRegistry>,
        observer: Rc<dyn PropagationObserver>,
    ) -> Self {
        Self::build(name.into(), registry, observer, BindOptions::default())
    }

    /// Create a bind with explicit options.
    pub fn with_options(
        name: impl Into<String>,
        registry: Rc<ConverterRegistry>,
        observer: Rc<dyn PropagationObserver>,
        options: BindOptions,
    ) -> Result<Self, ConfigError> {
        options.validate()?;
        Ok(Self::build(name.into(), registry, observer, options))
    }

    pub(crate) fn build(
        name: String,
        registry: Rc<ConverterRegistry>,
        observer: Rc<dyn PropagationObserver>,
        options: BindOptions,
    ) -> Self {
        Self {
            inner: Rc::new(BindInner {
                id: BindId::next(),
                name,
                registry,
                observer,
                options,
                state: RefCell::new(BindState::default()),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Rc<BindInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn downgrade(&self) -> Weak<BindInner> {
        Rc::downgrade(&self.inner)
    }

    /// Stable identifier.
    pub fn id(&self) -> BindId {
        self.inner.id
    }

    /// Name given at construction.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Registry used to convert values for members.
    pub fn registry(&self) -> &Rc<ConverterRegistry> {
        &self.inner.registry
    }

    /// Options given at construction.
    pub fn options(&self) -> BindOptions {
        self.inner.options
    }

    /// The value of the most recent pass, if any.
    pub fn last_value(&self) -> Option<Value> {
        self.inner.state.borrow().last_value.clone()
    }

    /// Number of times the last value has been set.
    pub fn version(&self) -> u64 {
        self.inner.state.borrow().version
    }

    /// Snapshot of the cumulative counters.
    pub fn metrics(&self) -> BindMetrics {
        self.inner.state.borrow().metrics.clone()
    }

    /// Members in attach order.
    pub fn members(&self) -> Vec<Bindable> {
        self.inner.state.borrow().members.values().cloned().collect()
    }

    /// Member ids in attach order.
    pub fn member_ids(&self) -> Vec<BindableId> {
        self.inner.state.borrow().members.keys().copied().collect()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.inner.state.borrow().members.len()
    }

    /// Whether the bind has no members.
    pub fn is_empty(&self) -> bool {
        self.inner.state.borrow().members.is_empty()
    }

    /// Whether `member` is attached to this bind.
    pub fn contains(&self, member: BindableId) -> bool {
        self.inner.state.borrow().members.contains_key(&member)
    }

    /// Whether a pass is in flight.
    pub fn is_propagating(&self) -> bool {
        self.inner.state.borrow().pass.is_some()
    }

    /// Attach `bindable`; see [`Bindable::attach`].
    pub fn attach(&self, bindable: &Bindable) -> AttachOutcome {
        bindable.attach(self)
    }

    /// Detach `bindable` if it is a member. Returns whether it was.
    pub fn detach(&self, bindable: &Bindable) -> bool {
        bindable.bind_id() == Some(self.id()) && bindable.detach()
    }

    /// Detach every member. Returns how many were detached.
    pub fn detach_all(&self) -> usize {
        let members = self.members();
        for member in &members {
            member.detach();
        }
        members.len()
    }

    /// Report that member `origin` changed to `value`.
    ///
    /// Changes from non-members and receivers are ignored.
    pub fn notify(&self, origin: BindableId, value: Value) -> NotifyOutcome {
        let connection = self
            .inner
            .state
            .borrow()
            .members
            .get(&origin)
            .map(Bindable::connection);
        match connection {
            None => self.ignore(Some(origin), IgnoreReason::UnknownOrigin),
            Some(c) if !c.can_send() => self.ignore(Some(origin), IgnoreReason::ReceiverOrigin),
            Some(_) => self.submit(Some(origin), value),
        }
    }

    /// Push `value` to every member that can receive, as if it came from
    /// outside the bind.
    pub fn publish(&self, value: Value) -> NotifyOutcome {
        self.submit(None, value)
    }

    pub(crate) fn insert_member(&self, member: Bindable) {
        self.inner
            .state
            .borrow_mut()
            .members
            .insert(member.id(), member);
    }

    pub(crate) fn remove_member(&self, member: BindableId) -> bool {
        self.inner
            .state
            .borrow_mut()
            .members
            .shift_remove(&member)
            .is_some()
    }

    /// Deliver `value` to one member outside the normal fan-out (pull on
    /// attach, receiver refresh). Echoes from the member are suppressed
    /// as if it were receiving a pass.
    pub(crate) fn receive_into(
        &self,
        member: &Bindable,
        value: &Value,
    ) -> Result<Delivery, EdgeFailure> {
        let opened = {
            let mut st = self.inner.state.borrow_mut();
            let idle = st.pass.is_none();
            if idle {
                st.pass = Some(PassState {
                    origin: None,
                    receiving: None,
                });
            }
            idle
        };
        let guard = opened.then(|| PassGuard { inner: &self.inner });
        let result = self.deliver(member, value);
        drop(guard);
        if opened {
            self.drain_pending();
        }
        result
    }

    fn ignore(&self, origin: Option<BindableId>, reason: IgnoreReason) -> NotifyOutcome {
        self.inner.state.borrow_mut().metrics.ignored_notifications += 1;
        tracing::trace!(bind = %self.inner.id, origin = ?origin, reason = ?reason, "notification ignored");
        NotifyOutcome::Ignored(reason)
    }

    fn submit(&self, origin: Option<BindableId>, value: Value) -> NotifyOutcome {
        {
            let mut st = self.inner.state.borrow_mut();
            let echo = st.pass.as_ref().map(|pass| {
                origin.is_some() && (origin == pass.origin || origin == pass.receiving)
            });
            match echo {
                Some(true) => {
                    st.metrics.suppressed_echoes += 1;
                    tracing::trace!(bind = %self.inner.id, origin = ?origin, "echo suppressed");
                    return NotifyOutcome::Suppressed;
                }
                Some(false) => {
                    st.pending.push_back((origin, value));
                    st.metrics.deferred_passes += 1;
                    tracing::trace!(bind = %self.inner.id, origin = ?origin, "change deferred");
                    return NotifyOutcome::Deferred;
                }
                None => {}
            }
        }
        let report = self.run_pass(origin, value);
        self.drain_pending();
        NotifyOutcome::Propagated(report)
    }

    fn run_pass(&self, origin: Option<BindableId>, value: Value) -> PassReport {
        let targets: SmallVec<[Bindable; 8]> = {
            let mut st = self.inner.state.borrow_mut();
            st.last_value = Some(value.clone());
            st.version += 1;
            st.pass = Some(PassState {
                origin,
                receiving: None,
            });
            st.members
                .values()
                .filter(|m| Some(m.id()) != origin && m.connection().can_receive())
                .cloned()
                .collect()
        };
        let guard = PassGuard { inner: &self.inner };

        let mut report = PassReport::new(self.inner.id, origin);
        for member in &targets {
            if !self.contains(member.id()) {
                continue;
            }
            match self.deliver(member, &value) {
                Ok(Delivery::Written) => report.delivered.push(member.id()),
                Ok(Delivery::Skipped) => {}
                Err(failure) => report.failures.push(failure),
            }
        }

        {
            let mut st = self.inner.state.borrow_mut();
            st.metrics.passes += 1;
            // Edges are done, but the pass stays open for the observer:
            // whatever it reports queues behind this pass.
            st.pass = Some(PassState {
                origin: None,
                receiving: None,
            });
        }
        tracing::debug!(
            bind = %self.inner.id,
            name = %self.inner.name,
            origin = ?origin,
            delivered = report.delivered.len(),
            failed = report.failures.len(),
            "propagation pass"
        );
        self.inner.observer.pass_completed(&report);
        drop(guard);
        report
    }

    fn deliver(&self, member: &Bindable, value: &Value) -> Result<Delivery, EdgeFailure> {
        let receiving = ReceivingGuard::enter(&self.inner, member.id());
        let outcome = member.apply_converted(value, &self.inner.registry);
        drop(receiving);

        match outcome {
            Ok(delivery) => {
                if delivery == Delivery::Written {
                    self.inner.state.borrow_mut().metrics.deliveries += 1;
                    tracing::trace!(bind = %self.inner.id, member = %member.id(), "edge delivered");
                }
                Ok(delivery)
            }
            Err(error) => {
                self.inner.state.borrow_mut().metrics.edge_failures += 1;
                let failure = EdgeFailure {
                    bind: self.inner.id,
                    member: member.id(),
                    error,
                };
                self.inner.observer.edge_failed(&failure);
                Err(failure)
            }
        }
    }

    fn drain_pending(&self) {
        let mut budget = self.inner.options.max_deferred_passes;
        loop {
            let next = self.inner.state.borrow_mut().pending.pop_front();
            let Some((origin, value)) = next else {
                return;
            };
            if budget == 0 {
                let dropped = {
                    let mut st = self.inner.state.borrow_mut();
                    let n = 1 + st.pending.len() as u64;
                    st.pending.clear();
                    st.metrics.dropped_passes += n;
                    n
                };
                tracing::warn!(
                    bind = %self.inner.id,
                    name = %self.inner.name,
                    dropped,
                    budget = self.inner.options.max_deferred_passes,
                    "deferred pass budget exhausted, dropping queued changes"
                );
                return;
            }
            budget -= 1;
            if let Some(id) = origin {
                if !self.contains(id) {
                    self.ignore(origin, IgnoreReason::Detached);
                    continue;
                }
            }
            self.run_pass(origin, value);
        }
    }
}

impl fmt::Debug for Bind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let st = self.inner.state.borrow();
        f.debug_struct("Bind")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("members", &st.members.keys().collect::<Vec<_>>())
            .field("last_value", &st.last_value)
            .finish()
    }
}
