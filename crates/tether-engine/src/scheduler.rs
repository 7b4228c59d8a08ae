//! Host pulse fan-out.
//!
//! The host owns the clock. Once per frame it calls [`TickScheduler::step`]
//! (or [`advance`](TickScheduler::advance) and
//! [`frame`](TickScheduler::frame) separately) and the scheduler forwards
//! the pulse to every registered endpoint in registration order.

use crate::bindable::{Bindable, WeakBindable};
use crate::ticker::{check_delta, PulseError};

/// Fires returned by one [`TickScheduler::step`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepFires {
    /// Tickers that fired on the time pulse.
    pub time: usize,
    /// Tickers that fired on the frame pulse.
    pub frame: usize,
}

impl StepFires {
    /// Total fires across both pulses.
    pub fn total(&self) -> usize {
        self.time + self.frame
    }
}

/// Weak registry of ticking endpoints.
///
/// Registration does not keep an endpoint alive; dropped endpoints are
/// pruned on the next pulse.
///
/// # Examples
///
/// ```
/// use tether_core::{FnAccessor, Value, ValueType};
/// use tether_engine::{Bindable, BindableConfig, ConnectionType, TickScheduler, TickerConfig};
///
/// let endpoint = Bindable::new(
///     BindableConfig::new(ConnectionType::Sender).ticker(TickerConfig::frame_based(2)),
///     FnAccessor::new(ValueType::Int, || Value::Int(1), |_| Ok(())),
/// )
/// .unwrap();
/// endpoint.start_ticking();
///
/// let mut scheduler = TickScheduler::new();
/// scheduler.register(&endpoint);
/// assert_eq!(scheduler.frame(), 0);
/// assert_eq!(scheduler.frame(), 1);
/// ```
#[derive(Debug, Default)]
pub struct TickScheduler {
    entries: Vec<WeakBindable>,
    frames: u64,
    elapsed: f64,
}

impl TickScheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bindable`. Returns `false` if it was already registered.
    pub fn register(&mut self, bindable: &Bindable) -> bool {
        let id = bindable.id();
        if self.entries.iter().any(|e| e.id() == id && !e.is_dead()) {
            return false;
        }
        self.entries.push(bindable.downgrade());
        true
    }

    /// Unregister `bindable`. Returns whether it was registered.
    pub fn unregister(&mut self, bindable: &Bindable) -> bool {
        let before = self.entries.len();
        let id = bindable.id();
        self.entries.retain(|e| e.id() != id);
        self.entries.len() != before
    }

    /// Live registrations.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_dead()).count()
    }

    /// Whether no live endpoint is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Frame pulses delivered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Seconds delivered so far.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Deliver one frame pulse. Returns how many tickers fired.
    pub fn frame(&mut self) -> usize {
        self.frames += 1;
        self.live().iter().filter(|b| b.on_frame()).count()
    }

    /// Deliver `dt` seconds. Returns how many tickers fired.
    ///
    /// The delta is checked once up front; a bad delta reaches no one.
    pub fn advance(&mut self, dt: f64) -> Result<usize, PulseError> {
        check_delta(dt)?;
        self.elapsed += dt;
        let mut fired = 0;
        for bindable in self.live() {
            if bindable.on_time(dt)? {
                fired += 1;
            }
        }
        Ok(fired)
    }

    /// [`advance`](Self::advance) by `dt`, then [`frame`](Self::frame).
    pub fn step(&mut self, dt: f64) -> Result<StepFires, PulseError> {
        let time = self.advance(dt)?;
        let frame = self.frame();
        Ok(StepFires { time, frame })
    }

    /// Upgrade live entries and prune the dead ones.
    ///
    /// Endpoints are collected before any is pulsed, so a refresh that
    /// drops another endpoint does not disturb this pulse's order.
    fn live(&mut self) -> Vec<Bindable> {
        let mut live = Vec::with_capacity(self.entries.len());
        self.entries.retain(|e| match e.upgrade() {
            Some(b) => {
                live.push(b);
                true
            }
            None => false,
        });
        live
    }
}
