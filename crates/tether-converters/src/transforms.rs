//! Built-in [`Transform`] stages.
//!
//! Numeric stages act on ints, floats, and each vector component; any
//! other value passes through unchanged. Integer results are rounded half
//! away from zero so the value keeps its type. Whole-number offsets and
//! factors stay in integer arithmetic (saturating); fractional ones go
//! through `f64` and are approximate beyond 2^53.

use std::fmt;

use tether_convert::Transform;
use tether_core::Value;

/// `x` as an `i64`, when it is a whole number in range.
fn whole(x: f64) -> Option<i64> {
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    (x.fract() == 0.0 && (-LIMIT..LIMIT).contains(&x)).then_some(x as i64)
}

/// Apply `f` to every numeric component of `value`, preserving its type.
fn map_numeric(value: Value, f: impl Fn(f64) -> f64) -> Value {
    match value {
        Value::Int(i) => {
            let x = i as f64;
            let r = f(x);
            // Unchanged (a clamp in range): keep every bit of `i`.
            if r.is_finite() && r != x {
                Value::Int(r.round() as i64)
            } else {
                Value::Int(i)
            }
        }
        Value::Float(x) => Value::Float(f(x)),
        Value::Vector(c) => Value::vector(c.iter().map(|&x| f(x))),
        other => other,
    }
}

/// Multiplies by a constant factor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scale(pub f64);

impl Transform for Scale {
    fn name(&self) -> &str {
        "Scale"
    }

    fn transform(&self, value: Value) -> Value {
        match (value, whole(self.0)) {
            (Value::Int(i), Some(k)) => Value::Int(i.saturating_mul(k)),
            (other, _) => map_numeric(other, |x| x * self.0),
        }
    }
}

/// Adds a constant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Offset(pub f64);

impl Transform for Offset {
    fn name(&self) -> &str {
        "Offset"
    }

    fn transform(&self, value: Value) -> Value {
        match (value, whole(self.0)) {
            (Value::Int(i), Some(k)) => Value::Int(i.saturating_add(k)),
            (other, _) => map_numeric(other, |x| x + self.0),
        }
    }
}

/// Limits values to `[min, max]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Clamp {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl Clamp {
    /// Clamp to `[min, max]`. Swapped bounds are reordered.
    pub fn new(min: f64, max: f64) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }
}

impl Transform for Clamp {
    fn name(&self) -> &str {
        "Clamp"
    }

    fn transform(&self, value: Value) -> Value {
        map_numeric(value, |x| x.max(self.min).min(self.max))
    }
}

/// Rounds floats to a number of decimal places. Ints are unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Round {
    /// Fractional digits to keep.
    pub decimals: u32,
}

impl Transform for Round {
    fn name(&self) -> &str {
        "Round"
    }

    fn transform(&self, value: Value) -> Value {
        let factor = 10f64.powi(self.decimals.min(15) as i32);
        match value {
            Value::Int(_) => value,
            other => map_numeric(other, |x| (x * factor).round() / factor),
        }
    }
}

/// Numeric negation; logical not for booleans.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Negate;

impl Transform for Negate {
    fn name(&self) -> &str {
        "Negate"
    }

    fn transform(&self, value: Value) -> Value {
        match value {
            Value::Bool(b) => Value::Bool(!b),
            Value::Int(i) => Value::Int(i.saturating_neg()),
            other => map_numeric(other, |x| -x),
        }
    }
}

/// Renders the value into a template, replacing every `{}`.
///
/// Produces a string for every non-null input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Format {
    /// Template containing `{}` placeholders.
    pub template: String,
}

impl Format {
    /// A stage rendering into `template`.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }
}

impl Transform for Format {
    fn name(&self) -> &str {
        "Format"
    }

    fn transform(&self, value: Value) -> Value {
        if value.is_null() {
            return value;
        }
        Value::from(self.template.replace("{}", &value.to_string()))
    }
}

/// A named stage backed by a closure.
///
/// # Examples
///
/// ```
/// use tether_convert::Transform;
/// use tether_converters::MapTransform;
/// use tether_core::Value;
///
/// let upper = MapTransform::new("upper", |v: Value| match v.as_str() {
///     Some(s) => Value::from(s.to_uppercase()),
///     None => v,
/// });
/// assert_eq!(upper.transform(Value::from("hi")), Value::from("HI"));
/// ```
pub struct MapTransform<F> {
    name: String,
    f: F,
}

impl<F: Fn(Value) -> Value + 'static> MapTransform<F> {
    /// A stage called `name` applying `f`.
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F: Fn(Value) -> Value + 'static> Transform for MapTransform<F> {
    fn name(&self) -> &str {
        &self.name
    }

    fn transform(&self, value: Value) -> Value {
        (self.f)(value)
    }
}

impl<F> fmt::Debug for MapTransform<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapTransform")
            .field("name", &self.name)
            .finish()
    }
}
