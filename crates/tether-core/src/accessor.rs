//! The [`Accessor`] capability: read/write access to one external slot.
//!
//! How an accessor locates its slot on the host object is outside this
//! crate. The engine only reads, writes, and asks for the declared type.

use crate::error::WriteRejected;
use crate::value::{Value, ValueType};

/// Read/write access to one typed slot on an owning entity.
///
/// Supplied by configuration tooling and owned by a bindable endpoint.
/// The engine converts every incoming value to [`declared_type`] before
/// calling [`write`]; a transformer may still hand over a value of a
/// different type, in which case the accessor should refuse it.
///
/// [`declared_type`]: Accessor::declared_type
/// [`write`]: Accessor::write
pub trait Accessor {
    /// The type of the underlying slot. Must not change over the
    /// accessor's lifetime.
    fn declared_type(&self) -> ValueType;

    /// Read the slot's current value.
    fn read(&self) -> Value;

    /// Write a value into the slot.
    fn write(&mut self, value: Value) -> Result<(), WriteRejected>;
}

/// An [`Accessor`] built from a pair of closures.
///
/// Writes are type-checked against the declared type before the write
/// closure runs, so the closure only ever sees storable values.
///
/// # Examples
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use tether_core::{Accessor, FnAccessor, Value, ValueType};
///
/// let slot = Rc::new(Cell::new(0i64));
/// let (r, w) = (Rc::clone(&slot), Rc::clone(&slot));
/// let mut acc = FnAccessor::new(
///     ValueType::Int,
///     move || Value::Int(r.get()),
///     move |v| {
///         w.set(v.as_int().unwrap_or_default());
///         Ok(())
///     },
/// );
///
/// acc.write(Value::Int(7)).unwrap();
/// assert_eq!(slot.get(), 7);
/// assert!(acc.write(Value::from("seven")).is_err());
/// ```
pub struct FnAccessor<R, W> {
    declared: ValueType,
    read: R,
    write: W,
}

impl<R, W> FnAccessor<R, W>
where
    R: Fn() -> Value,
    W: FnMut(Value) -> Result<(), WriteRejected>,
{
    /// Create an accessor for a slot of type `declared`.
    pub fn new(declared: ValueType, read: R, write: W) -> Self {
        Self {
            declared,
            read,
            write,
        }
    }
}

impl<R, W> Accessor for FnAccessor<R, W>
where
    R: Fn() -> Value,
    W: FnMut(Value) -> Result<(), WriteRejected>,
{
    fn declared_type(&self) -> ValueType {
        self.declared.clone()
    }

    fn read(&self) -> Value {
        (self.read)()
    }

    fn write(&mut self, value: Value) -> Result<(), WriteRejected> {
        if !value.is_instance_of(&self.declared) {
            return Err(WriteRejected::new(format!(
                "slot of type {} cannot hold {}",
                self.declared,
                value
                    .value_type()
                    .map_or_else(|| "null".to_string(), |t| t.to_string()),
            )));
        }
        (self.write)(value)
    }
}

impl<R, W> std::fmt::Debug for FnAccessor<R, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnAccessor")
            .field("declared", &self.declared)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn write_checks_declared_type() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let mut acc = FnAccessor::new(
            ValueType::String,
            || Value::from(""),
            move |v| {
                sink.borrow_mut().push(v);
                Ok(())
            },
        );

        assert!(acc.write(Value::from("ok")).is_ok());
        assert!(acc.write(Value::Null).is_ok());
        let err = acc.write(Value::Int(1)).unwrap_err();
        assert!(err.reason.contains("string"));
        assert_eq!(log.borrow().len(), 2);
    }
}
