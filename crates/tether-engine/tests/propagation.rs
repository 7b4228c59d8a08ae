//! Integration test: propagation passes across members and binds.
//!
//! Exercises the pass protocol end to end with mock accessors that echo
//! their writes back as change reports, the way host properties with
//! change notification do.

use std::rc::Rc;

use tether_converters::default_registry;
use tether_core::{EdgeError, Value, ValueKind, ValueType};
use tether_convert::ConverterRegistry;
use tether_engine::{
    Bind, Bindable, BindableConfig, ConnectionType, NotifyOutcome, OnAttachBehavior,
};
use tether_test_utils::{FailingConverter, MockAccessor, RecordingObserver};

// ── Helpers ──────────────────────────────────────────────────────

fn endpoint(connection: ConnectionType, mock: &MockAccessor) -> Bindable {
    Bindable::new(BindableConfig::new(connection), mock.clone()).unwrap()
}

fn echoing(connection: ConnectionType, mock: &MockAccessor) -> Bindable {
    let b = endpoint(connection, mock);
    mock.echo_to(&b);
    b
}

// ── Re-entrancy ──────────────────────────────────────────────────

#[test]
fn bidirectional_pair_does_not_oscillate() {
    let bind = Bind::new("pair", Rc::new(default_registry()));
    let a_mock = MockAccessor::empty(ValueType::Int);
    let b_mock = MockAccessor::empty(ValueType::Int);
    let a = echoing(ConnectionType::Bidirectional, &a_mock);
    let b = echoing(ConnectionType::Bidirectional, &b_mock);
    a.attach(&bind);
    b.attach(&bind);

    let outcome = a.report_change(Value::Int(7));

    assert!(outcome.is_propagated());
    assert_eq!(b_mock.writes(), vec![Value::Int(7)]);
    assert!(a_mock.writes().is_empty());
    let m = bind.metrics();
    assert_eq!(m.passes, 1);
    assert_eq!(m.suppressed_echoes, 1);
    assert_eq!(bind.last_value(), Some(Value::Int(7)));
}

#[test]
fn echo_through_conversion_does_not_oscillate() {
    let bind = Bind::new("mixed", Rc::new(default_registry()));
    let number = MockAccessor::empty(ValueType::Float);
    let text = MockAccessor::empty(ValueType::String);
    let flag = MockAccessor::empty(ValueType::Bool);
    let members = [
        echoing(ConnectionType::Bidirectional, &number),
        echoing(ConnectionType::Bidirectional, &text),
        echoing(ConnectionType::Bidirectional, &flag),
    ];
    for m in &members {
        m.attach(&bind);
    }

    members[0].report_change(Value::Float(2.0));

    assert!(number.writes().is_empty());
    assert_eq!(text.writes(), vec![Value::from("2")]);
    assert_eq!(flag.writes(), vec![Value::Bool(true)]);
    assert_eq!(bind.metrics().passes, 1);
}

#[test]
fn ring_of_binds_settles() {
    let registry = Rc::new(default_registry());
    let x = Bind::new("x", Rc::clone(&registry));
    let y = Bind::new("y", Rc::clone(&registry));

    // Slot A sits in x (a1) and y (a2); slot B sits in x (b1) and y (b2).
    let a1_mock = MockAccessor::empty(ValueType::Int);
    let b1_mock = MockAccessor::empty(ValueType::Int);
    let b2_mock = MockAccessor::empty(ValueType::Int);
    let a2_mock = MockAccessor::empty(ValueType::Int);
    let a1 = endpoint(ConnectionType::Bidirectional, &a1_mock);
    let b1 = endpoint(ConnectionType::Bidirectional, &b1_mock);
    let b2 = endpoint(ConnectionType::Bidirectional, &b2_mock);
    let a2 = endpoint(ConnectionType::Bidirectional, &a2_mock);
    b1_mock.echo_to(&b2);
    a2_mock.echo_to(&a1);
    a1.attach(&x);
    b1.attach(&x);
    b2.attach(&y);
    a2.attach(&y);

    a1.report_change(Value::Int(3));

    assert_eq!(b1_mock.writes(), vec![Value::Int(3)]);
    assert_eq!(a2_mock.writes(), vec![Value::Int(3)]);
    assert!(a1_mock.writes().is_empty());
    assert!(b2_mock.writes().is_empty());
    assert_eq!(x.metrics().passes, 1);
    assert_eq!(x.metrics().suppressed_echoes, 1);
    assert_eq!(y.metrics().passes, 1);
}

#[test]
fn third_member_change_during_pass_runs_after_it() {
    let bind = Bind::new("chain", Rc::new(default_registry()));
    let a_mock = MockAccessor::empty(ValueType::Int);
    let b_mock = MockAccessor::empty(ValueType::Int);
    let c_mock = MockAccessor::empty(ValueType::Int);
    let a = endpoint(ConnectionType::Bidirectional, &a_mock);
    let b = endpoint(ConnectionType::Bidirectional, &b_mock);
    let c = endpoint(ConnectionType::Sender, &c_mock);
    // Writing b makes the sender c report a change of its own.
    b_mock.echo_to(&c);
    a.attach(&bind);
    b.attach(&bind);
    c.attach(&bind);

    a.report_change(Value::Int(1));

    // c's change waits for the first pass, then reaches a and b. Writing
    // b again makes c echo its own pass, which is dropped.
    assert_eq!(a_mock.writes(), vec![Value::Int(1)]);
    assert_eq!(b_mock.writes(), vec![Value::Int(1), Value::Int(1)]);
    let m = bind.metrics();
    assert_eq!(m.deferred_passes, 1);
    assert_eq!(m.passes, 2);
    assert_eq!(m.suppressed_echoes, 1);
    assert_eq!(m.dropped_passes, 0);
}

// ── Direction ────────────────────────────────────────────────────

#[test]
fn senders_are_never_written() {
    let bind = Bind::new("dir", Rc::new(default_registry()));
    let sender_mock = MockAccessor::new(ValueType::Int, 1i64);
    let other_sender_mock = MockAccessor::new(ValueType::Int, 2i64);
    let receiver_mock = MockAccessor::empty(ValueType::Int);
    let s1 = endpoint(ConnectionType::Sender, &sender_mock);
    let s2 = endpoint(ConnectionType::Sender, &other_sender_mock);
    let r = endpoint(ConnectionType::Receiver, &receiver_mock);
    for m in [&s1, &s2, &r] {
        m.attach(&bind);
    }

    s1.report_change(Value::Int(10));
    bind.publish(Value::Int(20));
    s2.report_change(Value::Int(30));

    assert!(sender_mock.writes().is_empty());
    assert!(other_sender_mock.writes().is_empty());
    assert_eq!(
        receiver_mock.writes(),
        vec![Value::Int(10), Value::Int(20), Value::Int(30)]
    );
}

#[test]
fn receiver_changes_do_not_propagate() {
    let bind = Bind::new("dir", Rc::new(default_registry()));
    let r_mock = MockAccessor::empty(ValueType::Int);
    let b_mock = MockAccessor::empty(ValueType::Int);
    let r = endpoint(ConnectionType::Receiver, &r_mock);
    let b = endpoint(ConnectionType::Bidirectional, &b_mock);
    r.attach(&bind);
    b.attach(&bind);

    let outcome = r.report_change(Value::Int(4));

    assert!(matches!(outcome, NotifyOutcome::Ignored(_)));
    assert!(b_mock.writes().is_empty());
    assert_eq!(bind.last_value(), None);
}

// ── Failure isolation ────────────────────────────────────────────

#[test]
fn missing_converter_fails_only_its_edge() {
    let observer = RecordingObserver::new();
    let bind = Bind::with_observer("iso", Rc::new(default_registry()), observer.clone());
    let source_mock = MockAccessor::empty(ValueType::Int);
    let first = MockAccessor::empty(ValueType::String);
    let unreachable = MockAccessor::empty(ValueType::DateTime);
    let third = MockAccessor::empty(ValueType::Float);
    let source = endpoint(ConnectionType::Sender, &source_mock);
    let receivers = [
        endpoint(ConnectionType::Receiver, &first),
        endpoint(ConnectionType::Receiver, &unreachable),
        endpoint(ConnectionType::Receiver, &third),
    ];
    source.attach(&bind);
    for r in &receivers {
        r.attach(&bind);
    }

    let outcome = source.report_change(Value::Int(5));

    assert_eq!(first.writes(), vec![Value::from("5")]);
    assert!(unreachable.writes().is_empty());
    assert_eq!(third.writes(), vec![Value::Float(5.0)]);

    let report = outcome.report().unwrap();
    assert!(report.delivered_to(receivers[0].id()));
    assert!(report.failed_for(receivers[1].id()));
    assert!(report.delivered_to(receivers[2].id()));

    let failures = observer.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].member, receivers[1].id());
    assert!(matches!(
        failures[0].error,
        EdgeError::NoConverterFound { .. }
    ));
    assert_eq!(observer.pass_count(), 1);
}

#[test]
fn failing_converter_and_rejected_write_are_isolated() {
    let registry = ConverterRegistry::new();
    registry
        .register(FailingConverter::new("broken", ValueKind::Int, ValueKind::Bool))
        .unwrap();
    let observer = RecordingObserver::new();
    let bind = Bind::with_observer("iso", Rc::new(registry), observer.clone());

    let source_mock = MockAccessor::empty(ValueType::Int);
    let broken = MockAccessor::empty(ValueType::Bool);
    let locked = MockAccessor::empty(ValueType::Int);
    let fine = MockAccessor::empty(ValueType::Int);
    locked.reject_with("locked");
    let source = endpoint(ConnectionType::Sender, &source_mock);
    for m in [&broken, &locked, &fine] {
        endpoint(ConnectionType::Receiver, m).attach(&bind);
    }
    source.attach(&bind);

    source.report_change(Value::Int(9));

    assert_eq!(fine.writes(), vec![Value::Int(9)]);
    let errors: Vec<EdgeError> = observer.failures().into_iter().map(|f| f.error).collect();
    assert!(matches!(errors[0], EdgeError::ConversionFailed { .. }));
    assert!(matches!(errors[1], EdgeError::WriteRejected(_)));
    assert_eq!(bind.metrics().edge_failures, 2);
    assert_eq!(bind.metrics().deliveries, 1);
}

// ── Attach behaviors ─────────────────────────────────────────────

#[test]
fn pull_on_attach_converts_last_value() {
    let bind = Bind::new("pull", Rc::new(default_registry()));
    let source_mock = MockAccessor::empty(ValueType::Int);
    let source = endpoint(ConnectionType::Sender, &source_mock);
    source.attach(&bind);
    source.report_change(Value::Int(5));

    let label = MockAccessor::empty(ValueType::String);
    let receiver = Bindable::new(
        BindableConfig::new(ConnectionType::Receiver).on_attach(OnAttachBehavior::PullValue),
        label.clone(),
    )
    .unwrap();
    receiver.attach(&bind);

    assert_eq!(label.writes(), vec![Value::from("5")]);
}

#[test]
fn pull_on_attach_without_value_does_nothing() {
    let bind = Bind::new("pull", Rc::new(default_registry()));
    let label = MockAccessor::empty(ValueType::String);
    let receiver = Bindable::new(
        BindableConfig::new(ConnectionType::Receiver).on_attach(OnAttachBehavior::PullValue),
        label.clone(),
    )
    .unwrap();
    receiver.attach(&bind);
    assert!(label.writes().is_empty());
}

#[test]
fn push_on_attach_reaches_existing_members() {
    let bind = Bind::new("push", Rc::new(default_registry()));
    let existing = MockAccessor::empty(ValueType::String);
    endpoint(ConnectionType::Receiver, &existing).attach(&bind);

    let source_mock = MockAccessor::new(ValueType::Bool, true);
    let source = Bindable::new(
        BindableConfig::new(ConnectionType::Sender).on_attach(OnAttachBehavior::PushValue),
        source_mock,
    )
    .unwrap();
    source.attach(&bind);

    assert_eq!(existing.writes(), vec![Value::from("true")]);
}

#[test]
fn pulled_value_is_not_echoed_back() {
    let bind = Bind::new("pull", Rc::new(default_registry()));
    let other = MockAccessor::empty(ValueType::Int);
    endpoint(ConnectionType::Bidirectional, &other).attach(&bind);
    bind.publish(Value::Int(8));
    other.clear_writes();

    let mock = MockAccessor::empty(ValueType::Int);
    let late = Bindable::new(
        BindableConfig::new(ConnectionType::Bidirectional).on_attach(OnAttachBehavior::PullValue),
        mock.clone(),
    )
    .unwrap();
    mock.echo_to(&late);
    late.attach(&bind);

    assert_eq!(mock.writes(), vec![Value::Int(8)]);
    assert!(other.writes().is_empty());
    assert_eq!(bind.metrics().suppressed_echoes, 1);
}

// ── Membership ───────────────────────────────────────────────────

#[test]
fn detaching_inside_a_write_skips_the_member() {
    let bind = Bind::new("detach", Rc::new(default_registry()));
    let source = endpoint(ConnectionType::Sender, &MockAccessor::empty(ValueType::Int));
    let first_mock = MockAccessor::empty(ValueType::Int);
    let victim_mock = MockAccessor::empty(ValueType::Int);
    let first = endpoint(ConnectionType::Receiver, &first_mock);
    let victim = endpoint(ConnectionType::Receiver, &victim_mock);
    source.attach(&bind);
    first.attach(&bind);
    victim.attach(&bind);

    // Writing `first` detaches `victim` before its turn.
    let target = victim.clone();
    first.set_transformer(Some(tether_convert::Transformer::single(
        tether_converters::MapTransform::new("detach_victim", move |v| {
            target.detach();
            v
        }),
    )));

    let report = source.report_change(Value::Int(1));

    assert_eq!(first_mock.writes(), vec![Value::Int(1)]);
    assert!(victim_mock.writes().is_empty());
    assert!(!report.report().unwrap().delivered_to(victim.id()));
    assert_eq!(bind.len(), 2);
}

#[test]
fn dropped_bindable_stays_attached_until_detached() {
    let bind = Bind::new("own", Rc::new(default_registry()));
    let mock = MockAccessor::empty(ValueType::Int);
    let id = {
        let m = endpoint(ConnectionType::Receiver, &mock);
        m.attach(&bind);
        m.id()
    };
    // The bind holds its members.
    assert!(bind.contains(id));
    bind.publish(Value::Int(2));
    assert_eq!(mock.writes(), vec![Value::Int(2)]);
    assert_eq!(bind.detach_all(), 1);
    assert!(bind.is_empty());
}
