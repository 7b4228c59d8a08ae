//! Dynamically-typed values, their type tags, and enum definitions.
//!
//! [`Value`] is a closed sum type over every kind an accessor can expose.
//! Conversion boundaries match on it exhaustively; support for a new
//! `(source, target)` pair is added by registering a converter, not by
//! widening this type at runtime.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use chrono::NaiveDateTime;
use smallvec::SmallVec;

/// Components of a [`Value::Vector`].
///
/// Uses `SmallVec<[f64; 4]>` so vectors up to 4 dimensions (the common
/// 2D/3D/color cases) never touch the heap.
pub type Components = SmallVec<[f64; 4]>;

/// Format used when a date-time is displayed without an explicit format.
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ── ValueKind ──────────────────────────────────────────────────────

/// Parameter-free discriminant of a [`ValueType`].
///
/// Converters declare their supported pair in kinds, which lets one
/// converter cover every enum definition or every vector width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Boolean.
    Bool,
    /// Signed 64-bit integer.
    Int,
    /// 64-bit float.
    Float,
    /// UTF-8 string.
    String,
    /// Variant of a named enum definition.
    Enum,
    /// Naive calendar date-time.
    DateTime,
    /// Fixed-width vector of floats.
    Vector,
}

impl ValueKind {
    /// Every kind, in declaration order.
    pub const ALL: [ValueKind; 7] = [
        ValueKind::Bool,
        ValueKind::Int,
        ValueKind::Float,
        ValueKind::String,
        ValueKind::Enum,
        ValueKind::DateTime,
        ValueKind::Vector,
    ];

    /// Whether types of this kind carry a parameter (enum definition or
    /// vector width), so two types of the same kind may still differ.
    pub fn is_parametric(self) -> bool {
        matches!(self, Self::Enum | Self::Vector)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::Enum => "enum",
            Self::DateTime => "datetime",
            Self::Vector => "vector",
        };
        f.write_str(s)
    }
}

// ── EnumDef / EnumValue ────────────────────────────────────────────

#[derive(Debug)]
struct EnumDefInner {
    name: String,
    variants: Vec<String>,
}

/// A named enum definition: an ordered list of variant names.
///
/// Cheap to clone (shared). Two definitions are equal when they are the
/// same allocation or have the same name and variant list.
#[derive(Clone, Debug)]
pub struct EnumDef(Arc<EnumDefInner>);

impl EnumDef {
    /// Create a definition from a name and its variants, in index order.
    pub fn new<I, S>(name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(Arc::new(EnumDefInner {
            name: name.into(),
            variants: variants.into_iter().map(Into::into).collect(),
        }))
    }

    /// The enum's name.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// All variant names in index order.
    pub fn variants(&self) -> &[String] {
        &self.0.variants
    }

    /// Number of variants.
    pub fn len(&self) -> usize {
        self.0.variants.len()
    }

    /// Whether the definition has no variants.
    pub fn is_empty(&self) -> bool {
        self.0.variants.is_empty()
    }

    /// Variant name at `index`, if in range.
    pub fn variant(&self, index: usize) -> Option<&str> {
        self.0.variants.get(index).map(String::as_str)
    }

    /// Index of the variant called `name` (exact match).
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.0.variants.iter().position(|v| v == name)
    }

    /// Build a value of this enum from a variant index.
    pub fn value(&self, index: usize) -> Option<EnumValue> {
        EnumValue::new(self, index)
    }

    /// Build a value of this enum from a variant name.
    pub fn value_named(&self, name: &str) -> Option<EnumValue> {
        self.index_of(name).and_then(|i| EnumValue::new(self, i))
    }
}

impl PartialEq for EnumDef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
            || (self.0.name == other.0.name && self.0.variants == other.0.variants)
    }
}

impl Eq for EnumDef {}

impl Hash for EnumDef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.name.hash(state);
    }
}

/// A single variant of an [`EnumDef`].
///
/// Constructed only through bounds-checked constructors, so the index is
/// always valid for its definition.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EnumValue {
    def: EnumDef,
    index: usize,
}

impl EnumValue {
    /// Create a value for variant `index`; `None` if out of range.
    pub fn new(def: &EnumDef, index: usize) -> Option<Self> {
        (index < def.len()).then(|| Self {
            def: def.clone(),
            index,
        })
    }

    /// The definition this value belongs to.
    pub fn def(&self) -> &EnumDef {
        &self.def
    }

    /// Variant index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Variant name.
    pub fn name(&self) -> &str {
        self.def.variant(self.index).unwrap_or_default()
    }
}

// ── ValueType ──────────────────────────────────────────────────────

/// Runtime or declared type of a value.
///
/// `Null` has no type; see [`Value::value_type`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Boolean.
    Bool,
    /// Signed 64-bit integer.
    Int,
    /// 64-bit float.
    Float,
    /// UTF-8 string.
    String,
    /// Variant of the given enum definition.
    Enum(EnumDef),
    /// Naive calendar date-time.
    DateTime,
    /// Vector with `dims` float components.
    Vector {
        /// Number of components.
        dims: usize,
    },
}

impl ValueType {
    /// The parameter-free kind of this type.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Bool => ValueKind::Bool,
            Self::Int => ValueKind::Int,
            Self::Float => ValueKind::Float,
            Self::String => ValueKind::String,
            Self::Enum(_) => ValueKind::Enum,
            Self::DateTime => ValueKind::DateTime,
            Self::Vector { .. } => ValueKind::Vector,
        }
    }

    /// The enum definition, for `Enum` types.
    pub fn enum_def(&self) -> Option<&EnumDef> {
        match self {
            Self::Enum(def) => Some(def),
            _ => None,
        }
    }

    /// The component count, for `Vector` types.
    pub fn vector_dims(&self) -> Option<usize> {
        match self {
            Self::Vector { dims } => Some(*dims),
            _ => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enum(def) => write!(f, "enum {}", def.name()),
            Self::Vector { dims } => write!(f, "vector{dims}"),
            other => write!(f, "{}", other.kind()),
        }
    }
}

// ── Value ──────────────────────────────────────────────────────────

/// A dynamically-typed value flowing through a bind.
///
/// The variant is the runtime type tag, so the tag and the payload can
/// never disagree. Values are immutable once built and cheap to clone:
/// strings are shared, vectors up to 4 components are inline.
///
/// # Examples
///
/// ```
/// use tether_core::{Value, ValueType};
///
/// let v = Value::from(42);
/// assert_eq!(v.value_type(), Some(ValueType::Int));
/// assert_eq!(v.as_int(), Some(42));
///
/// let s = Value::from("hello");
/// assert_eq!(s.as_str(), Some("hello"));
/// assert!(Value::Null.value_type().is_none());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Absence of a value. Has no runtime type and passes through every
    /// converter unchanged.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed 64-bit integer.
    Int(i64),
    /// 64-bit float.
    Float(f64),
    /// Shared UTF-8 string.
    String(Arc<str>),
    /// Enum variant.
    Enum(EnumValue),
    /// Naive calendar date-time.
    DateTime(NaiveDateTime),
    /// Float vector.
    Vector(Components),
}

impl Value {
    /// Build a vector value from its components.
    pub fn vector<I: IntoIterator<Item = f64>>(components: I) -> Self {
        Self::Vector(components.into_iter().collect())
    }

    /// Runtime type of the payload; `None` for [`Value::Null`].
    pub fn value_type(&self) -> Option<ValueType> {
        Some(match self {
            Self::Null => return None,
            Self::Bool(_) => ValueType::Bool,
            Self::Int(_) => ValueType::Int,
            Self::Float(_) => ValueType::Float,
            Self::String(_) => ValueType::String,
            Self::Enum(e) => ValueType::Enum(e.def().clone()),
            Self::DateTime(_) => ValueType::DateTime,
            Self::Vector(c) => ValueType::Vector { dims: c.len() },
        })
    }

    /// Kind of the payload; `None` for [`Value::Null`].
    pub fn kind(&self) -> Option<ValueKind> {
        Some(match self {
            Self::Null => return None,
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::String(_) => ValueKind::String,
            Self::Enum(_) => ValueKind::Enum,
            Self::DateTime(_) => ValueKind::DateTime,
            Self::Vector(_) => ValueKind::Vector,
        })
    }

    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether this value can be stored in a slot of type `ty`.
    ///
    /// `Null` is storable everywhere.
    pub fn is_instance_of(&self, ty: &ValueType) -> bool {
        match self.value_type() {
            None => true,
            Some(own) => &own == ty,
        }
    }

    /// The boolean payload.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The integer payload.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The float payload.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// The payload as `f64` for either numeric kind.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// The string payload.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The enum payload.
    pub fn as_enum(&self) -> Option<&EnumValue> {
        match self {
            Self::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// The date-time payload.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Self::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// The vector components.
    pub fn as_vector(&self) -> Option<&[f64]> {
        match self {
            Self::Vector(c) => Some(c),
            _ => None,
        }
    }

    /// Change-detection equality: like `==`, but floats and vector
    /// components compare by bit pattern, so an unchanged `NaN` is the
    /// same value and `0.0` differs from `-0.0`.
    pub fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Vector(a), Self::Vector(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b.iter()).all(|(x, y)| x.to_bits() == y.to_bits())
            }
            _ => self == other,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
            Self::Enum(e) => f.write_str(e.name()),
            Self::DateTime(dt) => write!(f, "{}", dt.format(DEFAULT_DATETIME_FORMAT)),
            Self::Vector(c) => {
                f.write_str("(")?;
                for (i, x) in c.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{x}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(Arc::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(Arc::from(v))
    }
}

impl From<EnumValue> for Value {
    fn from(v: EnumValue) -> Self {
        Self::Enum(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Self::DateTime(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
