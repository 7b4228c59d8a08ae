//! Value post-processing applied after conversion.
//!
//! A [`Transformer`] is an ordered pipeline of [`Transform`] stages owned
//! by one bindable endpoint. It runs only on values flowing *into* that
//! endpoint, after the registry has converted them to the endpoint's
//! declared type.

use std::fmt;

use tether_core::Value;

/// One stage of a [`Transformer`] pipeline.
///
/// Stages are total: a stage that cannot handle a value returns it
/// unchanged.
pub trait Transform: 'static {
    /// Human-readable name used in logs.
    fn name(&self) -> &str;

    /// Map one value.
    fn transform(&self, value: Value) -> Value;
}

/// An ordered, switchable pipeline of [`Transform`] stages.
///
/// When disabled, or when it has no stages, [`apply`](Self::apply)
/// returns its input untouched.
///
/// # Examples
///
/// ```
/// use tether_convert::{Transform, Transformer};
/// use tether_core::Value;
///
/// struct Double;
///
/// impl Transform for Double {
///     fn name(&self) -> &str { "double" }
///     fn transform(&self, v: Value) -> Value {
///         v.as_int().map_or(v, |i| Value::Int(i * 2))
///     }
/// }
///
/// let mut t = Transformer::new().then(Double).then(Double);
/// assert_eq!(t.apply(Value::Int(3)), Value::Int(12));
///
/// t.set_enabled(false);
/// assert_eq!(t.apply(Value::Int(3)), Value::Int(3));
/// ```
pub struct Transformer {
    enabled: bool,
    stages: Vec<Box<dyn Transform>>,
}

impl Transformer {
    /// Create an enabled, empty pipeline.
    pub fn new() -> Self {
        Self {
            enabled: true,
            stages: Vec::new(),
        }
    }

    /// Create a pipeline with a single stage.
    pub fn single(stage: impl Transform) -> Self {
        Self::new().then(stage)
    }

    /// Append a stage, builder style.
    #[must_use]
    pub fn then(mut self, stage: impl Transform) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Append a boxed stage.
    pub fn push(&mut self, stage: Box<dyn Transform>) {
        self.stages.push(stage);
    }

    /// Whether the pipeline runs.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Switch the pipeline on or off without dropping its stages.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the pipeline has no stages.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage names in execution order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run `value` through every stage in order.
    pub fn apply(&self, value: Value) -> Value {
        if !self.enabled {
            return value;
        }
        self.stages.iter().fold(value, |v, stage| stage.transform(v))
    }
}

impl Default for Transformer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Transformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transformer")
            .field("enabled", &self.enabled)
            .field("stages", &self.stage_names())
            .finish()
    }
}
