//! Benchmark profiles and utilities for the Tether binding engine.
//!
//! Provides pre-built bind topologies for benchmarking:
//!
//! - [`fanout_profile`]: one sender, N receivers of one declared type
//! - [`mixed_fanout_profile`]: one sender, N receivers cycling through
//!   types that each need a different converter
//! - [`polling_profile`]: N ticking senders on one bind, registered with
//!   a [`TickScheduler`]

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::cell::Cell;
use std::rc::Rc;

use tether_converters::default_registry;
use tether_core::{FnAccessor, Value, ValueType};
use tether_engine::{
    Bind, Bindable, BindableConfig, ConnectionType, TickScheduler, TickerConfig,
};

/// A bind with one sender and a set of receivers.
pub struct FanoutProfile {
    /// The hub.
    pub bind: Bind,
    /// The member whose changes are propagated.
    pub source: Bindable,
    /// Receiving members, in attach order.
    pub sinks: Vec<Bindable>,
    /// Total accepted writes across all sinks.
    pub writes: Rc<Cell<u64>>,
}

fn counting_sink(declared: ValueType, writes: &Rc<Cell<u64>>) -> Bindable {
    let writes = Rc::clone(writes);
    Bindable::receiver(FnAccessor::new(declared, || Value::Null, move |_| {
        writes.set(writes.get() + 1);
        Ok(())
    }))
}

fn build_fanout<I>(source_type: ValueType, sink_types: I) -> FanoutProfile
where
    I: IntoIterator<Item = ValueType>,
{
    let bind = Bind::new("bench", Rc::new(default_registry()));
    let writes = Rc::new(Cell::new(0));
    let sinks: Vec<Bindable> = sink_types
        .into_iter()
        .map(|ty| counting_sink(ty, &writes))
        .collect();
    for sink in &sinks {
        sink.attach(&bind);
    }
    let source = Bindable::sender(FnAccessor::new(source_type, || Value::Null, |_| Ok(())));
    source.attach(&bind);
    FanoutProfile {
        bind,
        source,
        sinks,
        writes,
    }
}

/// One `Int` sender fanning out to `receivers` `Int` receivers.
///
/// Every edge resolves to the identity shortcut.
pub fn fanout_profile(receivers: usize) -> FanoutProfile {
    build_fanout(
        ValueType::Int,
        std::iter::repeat_n(ValueType::Int, receivers),
    )
}

/// One `Int` sender fanning out to `receivers` receivers cycling through
/// `Float`, `String`, `Bool`, and `Int`.
///
/// Three of every four edges go through a registry lookup.
pub fn mixed_fanout_profile(receivers: usize) -> FanoutProfile {
    let cycle = [
        ValueType::Float,
        ValueType::String,
        ValueType::Bool,
        ValueType::Int,
    ];
    build_fanout(
        ValueType::Int,
        (0..receivers).map(move |i| cycle[i % cycle.len()].clone()),
    )
}

/// A bind with ticking senders polled by a scheduler.
pub struct PollingProfile {
    /// The hub.
    pub bind: Bind,
    /// Ticking members.
    pub pollers: Vec<Bindable>,
    /// Scheduler every poller is registered with.
    pub scheduler: TickScheduler,
    /// Host-side slot value read by every poller.
    pub slot: Rc<Cell<i64>>,
}

/// `endpoints` senders on one bind, each ticking with `ticker` and
/// reading a shared host slot.
pub fn polling_profile(endpoints: usize, ticker: TickerConfig) -> PollingProfile {
    let bind = Bind::new("bench-poll", Rc::new(default_registry()));
    let slot = Rc::new(Cell::new(0i64));
    let mut scheduler = TickScheduler::new();
    let pollers: Vec<Bindable> = (0..endpoints)
        .filter_map(|_| {
            let read = Rc::clone(&slot);
            Bindable::new(
                BindableConfig::new(ConnectionType::Sender).ticker(ticker),
                FnAccessor::new(ValueType::Int, move || Value::Int(read.get()), |_| Ok(())),
            )
            .ok()
        })
        .collect();
    for poller in &pollers {
        poller.attach(&bind);
        scheduler.register(poller);
    }
    PollingProfile {
        bind,
        pollers,
        scheduler,
        slot,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fanout_reaches_every_sink() {
        let p = fanout_profile(16);
        p.source.report_change(Value::Int(1));
        assert_eq!(p.writes.get(), 16);
        assert_eq!(p.bind.len(), 17);
    }

    #[test]
    fn mixed_fanout_converts_every_edge() {
        let p = mixed_fanout_profile(8);
        let report = p.source.report_change(Value::Int(1));
        assert!(report.report().unwrap().is_clean());
        assert_eq!(p.writes.get(), 8);
    }

    #[test]
    fn polling_profile_propagates_slot_changes() {
        let mut p = polling_profile(4, TickerConfig::frame_based(1));
        assert_eq!(p.scheduler.frame(), 4);
        p.slot.set(5);
        p.scheduler.frame();
        assert_eq!(p.bind.last_value(), Some(Value::Int(5)));
        assert_eq!(p.pollers.len(), 4);
    }
}
