//! Bindable endpoints.
//!
//! A [`Bindable`] wraps one [`Accessor`] with a connection direction, an
//! optional [`Transformer`], and an optional polling [`Ticker`]. It joins
//! at most one [`Bind`] at a time.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tether_convert::{ConverterRegistry, Transformer};
use tether_core::{Accessor, BindId, BindableId, EdgeError, Value, ValueType, WriteRejected};

use crate::bind::{Bind, BindInner, IgnoreReason, NotifyOutcome};
use crate::config::{
    BindableConfig, ConfigError, ConnectionType, OnAttachBehavior, TickerConfig, TickerMode,
};
use crate::ticker::{check_delta, PulseError, Ticker, TickerState};

/// Result of handing a value to an endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// The value was converted, transformed, and written.
    Written,
    /// The endpoint does not receive (sender, or not attached).
    Skipped,
}

/// Result of [`Bindable::attach`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttachOutcome {
    /// Joined the bind (leaving any previous one).
    Attached,
    /// Already a member of that bind; nothing happened.
    AlreadyAttached,
}

pub(crate) struct BindableInner {
    id: BindableId,
    connection: ConnectionType,
    on_attach: OnAttachBehavior,
    /// Cached; an accessor's declared type never changes.
    declared: ValueType,
    accessor: RefCell<Box<dyn Accessor>>,
    transformer: RefCell<Option<Transformer>>,
    ticker: RefCell<Option<Ticker>>,
    bind: RefCell<Weak<BindInner>>,
    /// Last value reported or received, for change detection on poll.
    last_known: RefCell<Option<Value>>,
}

/// An endpoint of a [`Bind`].
///
/// Cheap to clone; clones share the endpoint.
///
/// # Examples
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use tether_core::{FnAccessor, Value, ValueType};
/// use tether_converters::default_registry;
/// use tether_engine::{Bind, Bindable};
///
/// let bind = Bind::new("hp", Rc::new(default_registry()));
///
/// let label = Rc::new(RefCell::new(String::new()));
/// let sink = Rc::clone(&label);
/// let text = Bindable::receiver(FnAccessor::new(
///     ValueType::String,
///     || Value::Null,
///     move |v| {
///         *sink.borrow_mut() = v.to_string();
///         Ok(())
///     },
/// ));
/// let health = Bindable::sender(FnAccessor::new(ValueType::Int, || Value::Int(0), |_| Ok(())));
///
/// text.attach(&bind);
/// health.attach(&bind);
/// health.report_change(Value::Int(80));
/// assert_eq!(*label.borrow(), "80");
/// ```
#[derive(Clone)]
pub struct Bindable {
    inner: Rc<BindableInner>,
}

impl Bindable {
    /// Create an endpoint from a validated config.
    pub fn new(config: BindableConfig, accessor: impl Accessor + 'static) -> Result<Self, ConfigError> {
        config.validate()?;
        let ticker = config.ticker.map(Ticker::new).transpose()?;
        Ok(Self::build(
            config.connection,
            config.on_attach,
            Box::new(accessor),
            ticker,
        ))
    }

    /// A sender with no ticker that does nothing on attach.
    pub fn sender(accessor: impl Accessor + 'static) -> Self {
        Self::build(
            ConnectionType::Sender,
            OnAttachBehavior::DoNothing,
            Box::new(accessor),
            None,
        )
    }

    /// A receiver with no ticker that does nothing on attach.
    pub fn receiver(accessor: impl Accessor + 'static) -> Self {
        Self::build(
            ConnectionType::Receiver,
            OnAttachBehavior::DoNothing,
            Box::new(accessor),
            None,
        )
    }

    /// A bidirectional endpoint with no ticker that does nothing on attach.
    pub fn bidirectional(accessor: impl Accessor + 'static) -> Self {
        Self::build(
            ConnectionType::Bidirectional,
            OnAttachBehavior::DoNothing,
            Box::new(accessor),
            None,
        )
    }

    fn build(
        connection: ConnectionType,
        on_attach: OnAttachBehavior,
        accessor: Box<dyn Accessor>,
        ticker: Option<Ticker>,
    ) -> Self {
        Self {
            inner: Rc::new(BindableInner {
                id: BindableId::next(),
                connection,
                on_attach,
                declared: accessor.declared_type(),
                accessor: RefCell::new(accessor),
                transformer: RefCell::new(None),
                ticker: RefCell::new(ticker),
                bind: RefCell::new(Weak::new()),
                last_known: RefCell::new(None),
            }),
        }
    }

    /// Builder-style [`set_transformer`](Self::set_transformer).
    #[must_use]
    pub fn with_transformer(self, transformer: Transformer) -> Self {
        self.set_transformer(Some(transformer));
        self
    }

    // ── Accessors ──────────────────────────────────────────────────

    /// Stable identifier.
    pub fn id(&self) -> BindableId {
        self.inner.id
    }

    /// Flow direction.
    pub fn connection(&self) -> ConnectionType {
        self.inner.connection
    }

    /// Behavior on attach.
    pub fn on_attach(&self) -> OnAttachBehavior {
        self.inner.on_attach
    }

    /// Declared type of the underlying slot.
    pub fn declared_type(&self) -> ValueType {
        self.inner.declared.clone()
    }

    /// Current value of the underlying slot.
    ///
    /// Called from inside the slot's own write, returns the value being
    /// written.
    pub fn read(&self) -> Value {
        match self.inner.accessor.try_borrow() {
            Ok(accessor) => accessor.read(),
            Err(_) => self.last_known().unwrap_or(Value::Null),
        }
    }

    /// Last value this endpoint reported or received.
    pub fn last_known(&self) -> Option<Value> {
        self.inner.last_known.borrow().clone()
    }

    /// A weak handle that does not keep the endpoint alive.
    pub fn downgrade(&self) -> WeakBindable {
        WeakBindable {
            id: self.inner.id,
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Replace the transformer. Returns the previous one.
    pub fn set_transformer(&self, transformer: Option<Transformer>) -> Option<Transformer> {
        std::mem::replace(&mut *self.inner.transformer.borrow_mut(), transformer)
    }

    /// Enable or disable the transformer. Returns `false` if there is none.
    pub fn set_transformer_enabled(&self, enabled: bool) -> bool {
        match self.inner.transformer.borrow_mut().as_mut() {
            Some(t) => {
                t.set_enabled(enabled);
                true
            }
            None => false,
        }
    }

    // ── Membership ─────────────────────────────────────────────────

    /// The bind this endpoint belongs to.
    pub fn bind(&self) -> Option<Bind> {
        self.inner.bind.borrow().upgrade().map(Bind::from_inner)
    }

    /// Id of the bind this endpoint belongs to.
    pub fn bind_id(&self) -> Option<BindId> {
        self.bind().map(|b| b.id())
    }

    /// Whether the endpoint belongs to a bind.
    pub fn is_attached(&self) -> bool {
        self.inner.bind.borrow().strong_count() > 0
    }

    /// Join `bind`, leaving the current bind first.
    ///
    /// Starts the ticker if there is one, then runs the on-attach
    /// behavior. Attaching to the bind it already belongs to does nothing.
    pub fn attach(&self, bind: &Bind) -> AttachOutcome {
        if self.bind_id() == Some(bind.id()) {
            return AttachOutcome::AlreadyAttached;
        }
        self.detach();
        bind.insert_member(self.clone());
        *self.inner.bind.borrow_mut() = bind.downgrade();
        tracing::debug!(
            bindable = %self.inner.id,
            bind = %bind.id(),
            connection = ?self.inner.connection,
            "attached"
        );
        self.start_ticking();

        match self.inner.on_attach {
            OnAttachBehavior::DoNothing => {}
            OnAttachBehavior::PushValue => {
                self.report_current();
            }
            OnAttachBehavior::PullValue => {
                if self.inner.connection.can_receive() {
                    if let Some(value) = bind.last_value() {
                        // Failures already went to the observer.
                        let _ = bind.receive_into(self, &value);
                    }
                }
            }
        }
        AttachOutcome::Attached
    }

    /// Leave the current bind and stop the ticker. Returns whether the
    /// endpoint was attached.
    pub fn detach(&self) -> bool {
        let previous = std::mem::take(&mut *self.inner.bind.borrow_mut());
        self.stop_ticking();
        let Some(inner) = previous.upgrade() else {
            return false;
        };
        let bind = Bind::from_inner(inner);
        bind.remove_member(self.inner.id);
        tracing::debug!(bindable = %self.inner.id, bind = %bind.id(), "detached");
        true
    }

    /// The bind is gone; forget it.
    pub(crate) fn orphan(&self) {
        *self.inner.bind.borrow_mut() = Weak::new();
        self.stop_ticking();
    }

    // ── Propagation ────────────────────────────────────────────────

    /// Report that the slot changed to `value`.
    ///
    /// Does nothing for receivers; the bind records it as ignored.
    pub fn report_change(&self, value: Value) -> NotifyOutcome {
        let Some(bind) = self.bind() else {
            return NotifyOutcome::Ignored(IgnoreReason::Detached);
        };
        if self.inner.connection.can_send() {
            *self.inner.last_known.borrow_mut() = Some(value.clone());
        }
        bind.notify(self.inner.id, value)
    }

    /// Read the slot and report its value.
    pub fn report_current(&self) -> NotifyOutcome {
        let value = self.read();
        self.report_change(value)
    }

    /// Report the slot's value only if it differs from the last value
    /// reported or received. Returns `None` when nothing changed.
    pub fn poll(&self) -> Option<NotifyOutcome> {
        let current = self.read();
        let changed = !self
            .inner
            .last_known
            .borrow()
            .as_ref()
            .is_some_and(|known| known.same_as(&current));
        changed.then(|| self.report_change(current))
    }

    /// Convert, transform, and write `value` through the bind's registry.
    ///
    /// Senders and detached endpoints skip. Echoes the write causes are
    /// suppressed, and a failure is also reported to the bind's observer.
    pub fn apply_incoming(&self, value: &Value) -> Result<Delivery, EdgeError> {
        match self.bind() {
            Some(bind) if self.inner.connection.can_receive() => {
                bind.receive_into(self, value).map_err(|f| f.error)
            }
            _ => Ok(Delivery::Skipped),
        }
    }

    /// The edge itself: convert to the declared type, transform, write.
    pub(crate) fn apply_converted(
        &self,
        value: &Value,
        registry: &ConverterRegistry,
    ) -> Result<Delivery, EdgeError> {
        if !self.inner.connection.can_receive() {
            return Ok(Delivery::Skipped);
        }
        let converted = registry.convert(value, &self.inner.declared)?;
        let incoming = match self.inner.transformer.borrow().as_ref() {
            Some(t) => t.apply(converted),
            None => converted,
        };
        let Ok(mut accessor) = self.inner.accessor.try_borrow_mut() else {
            return Err(WriteRejected::new("slot is already being written").into());
        };
        // Recorded before the write so the host's change detection can
        // read or poll this endpoint from inside it.
        let previous = self.inner.last_known.replace(Some(incoming.clone()));
        let written = accessor.write(incoming);
        drop(accessor);
        if let Err(rejected) = written {
            *self.inner.last_known.borrow_mut() = previous;
            return Err(rejected.into());
        }
        Ok(Delivery::Written)
    }

    /// What a ticker fire does: receivers re-pull the bind's last value,
    /// others poll their slot.
    fn refresh(&self) {
        match self.inner.connection {
            ConnectionType::Receiver => {
                if let Some(bind) = self.bind() {
                    if let Some(value) = bind.last_value() {
                        let _ = bind.receive_into(self, &value);
                    }
                }
            }
            ConnectionType::Sender | ConnectionType::Bidirectional => {
                self.poll();
            }
        }
    }

    // ── Ticker ─────────────────────────────────────────────────────

    /// Whether the endpoint has a ticker.
    pub fn has_ticker(&self) -> bool {
        self.inner.ticker.borrow().is_some()
    }

    /// Ticker state, if there is a ticker.
    pub fn ticker_state(&self) -> Option<TickerState> {
        self.inner.ticker.borrow().as_ref().map(Ticker::state)
    }

    /// Total ticker fires, or 0 without a ticker.
    pub fn ticker_fires(&self) -> u64 {
        self.inner
            .ticker
            .borrow()
            .as_ref()
            .map_or(0, Ticker::fire_count)
    }

    /// Replace the ticker. A new ticker starts right away when attached.
    pub fn set_ticker(&self, config: Option<TickerConfig>) -> Result<(), ConfigError> {
        let ticker = config.map(Ticker::new).transpose()?;
        *self.inner.ticker.borrow_mut() = ticker;
        if self.is_attached() {
            self.start_ticking();
        }
        Ok(())
    }

    /// Start the ticker from a clean cadence. Returns `false` without one.
    pub fn start_ticking(&self) -> bool {
        let mut ticker = self.inner.ticker.borrow_mut();
        let Some(t) = ticker.as_mut() else {
            return false;
        };
        t.start_ticking();
        tracing::debug!(bindable = %self.inner.id, mode = ?t.mode(), "ticker started");
        true
    }

    /// Stop the ticker, if running.
    pub fn stop_ticking(&self) {
        if let Some(t) = self.inner.ticker.borrow_mut().as_mut() {
            if t.is_running() {
                t.stop_ticking();
                tracing::debug!(bindable = %self.inner.id, "ticker stopped");
            }
        }
    }

    /// Switch the ticker's cadence. Returns `false` without a ticker.
    pub fn set_ticker_mode(&self, mode: TickerMode) -> bool {
        let mut ticker = self.inner.ticker.borrow_mut();
        let Some(t) = ticker.as_mut() else {
            return false;
        };
        t.set_mode(mode);
        tracing::debug!(bindable = %self.inner.id, mode = ?mode, "ticker mode changed");
        true
    }

    /// Deliver a frame pulse. Refreshes and returns `true` if the ticker
    /// fired.
    pub fn on_frame(&self) -> bool {
        let fired = self
            .inner
            .ticker
            .borrow_mut()
            .as_mut()
            .is_some_and(Ticker::on_frame);
        if fired {
            self.refresh();
        }
        fired
    }

    /// Deliver `dt` seconds. Refreshes and returns `true` if the ticker
    /// fired.
    pub fn on_time(&self, dt: f64) -> Result<bool, PulseError> {
        let fired = match self.inner.ticker.borrow_mut().as_mut() {
            Some(t) => t.on_time(dt)?,
            None => {
                check_delta(dt)?;
                false
            }
        };
        if fired {
            self.refresh();
        }
        Ok(fired)
    }
}

impl fmt::Debug for Bindable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bindable")
            .field("id", &self.inner.id)
            .field("connection", &self.inner.connection)
            .field("on_attach", &self.inner.on_attach)
            .field("attached", &self.is_attached())
            .finish()
    }
}

/// A non-owning handle to a [`Bindable`].
#[derive(Clone, Debug)]
pub struct WeakBindable {
    id: BindableId,
    inner: Weak<BindableInner>,
}

impl WeakBindable {
    /// Id of the endpoint, even after it is gone.
    pub fn id(&self) -> BindableId {
        self.id
    }

    /// The endpoint, if still alive.
    pub fn upgrade(&self) -> Option<Bindable> {
        self.inner.upgrade().map(|inner| Bindable { inner })
    }

    /// Whether the endpoint has been dropped.
    pub fn is_dead(&self) -> bool {
        self.inner.strong_count() == 0
    }
}
