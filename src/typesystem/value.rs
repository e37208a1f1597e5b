//! Dynamic runtime values exchanged with intercepted members.
//!
//! Replacement callables, real member bodies and constructor emulation all trade in
//! [`Value`], a small dynamically-typed value modeled on the CIL primitive set.
//! [`ValueKind`] is the corresponding type tag used in member signatures and slot
//! declarations.
//!
//! The set is deliberately small: it covers the primitive kinds that appear in member
//! signatures plus `Object` for instance references. Anything richer lives behind an
//! [`crate::typesystem::Instance`] and its named slots.

use std::fmt;

use crate::typesystem::Instance;

/// Type tag for slots, parameters and return values, following CIL element-type naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
pub enum ValueKind {
    /// No value; the return kind of void methods and setters
    Void,
    /// `bool`
    Boolean,
    /// 32-bit signed integer (`int32`)
    I4,
    /// 64-bit signed integer (`int64`)
    I8,
    /// 64-bit float (`float64`)
    R8,
    /// String
    String,
    /// An object reference
    Object,
}

/// A dynamically-typed runtime value.
///
/// `Null` doubles as the zero value for `Object` slots and as the placeholder result
/// of suppressed void calls. Equality is structural for primitives and referential
/// for `Object` (two values referring to the same instance compare equal).
///
/// # Examples
///
/// ```rust
/// use dotmock::typesystem::{Value, ValueKind};
///
/// let v = Value::I4(42);
/// assert_eq!(v.kind(), ValueKind::I4);
/// assert_eq!(v.as_i4(), Some(42));
/// assert_eq!(Value::default_of(ValueKind::I4), Value::I4(0));
/// assert_eq!(Value::default_of(ValueKind::String), Value::String(String::new()));
/// ```
#[derive(Clone)]
pub enum Value {
    /// The null reference (also the zero value of `Object` slots)
    Null,
    /// A boolean value
    Boolean(bool),
    /// A 32-bit signed integer
    I4(i32),
    /// A 64-bit signed integer
    I8(i64),
    /// A 64-bit float
    R8(f64),
    /// A string value
    String(String),
    /// A reference to an allocated instance
    Object(Instance),
}

impl Value {
    /// Returns the kind tag of this value. `Null` reports as `Object`.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null | Value::Object(_) => ValueKind::Object,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::I4(_) => ValueKind::I4,
            Value::I8(_) => ValueKind::I8,
            Value::R8(_) => ValueKind::R8,
            Value::String(_) => ValueKind::String,
        }
    }

    /// Returns the zero value for a kind, as used by uninitialized allocation.
    #[must_use]
    pub fn default_of(kind: ValueKind) -> Value {
        match kind {
            ValueKind::Void | ValueKind::Object => Value::Null,
            ValueKind::Boolean => Value::Boolean(false),
            ValueKind::I4 => Value::I4(0),
            ValueKind::I8 => Value::I8(0),
            ValueKind::R8 => Value::R8(0.0),
            ValueKind::String => Value::String(String::new()),
        }
    }

    /// Returns the boolean payload, if this is a `Boolean`
    #[must_use]
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the `i32` payload, if this is an `I4`
    #[must_use]
    pub fn as_i4(&self) -> Option<i32> {
        match self {
            Value::I4(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the `i64` payload, if this is an `I8`
    #[must_use]
    pub fn as_i8(&self) -> Option<i64> {
        match self {
            Value::I8(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the `f64` payload, if this is an `R8`
    #[must_use]
    pub fn as_r8(&self) -> Option<f64> {
        match self {
            Value::R8(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the string payload, if this is a `String`
    #[must_use]
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the instance payload, if this is an `Object`
    #[must_use]
    pub fn as_object(&self) -> Option<&Instance> {
        match self {
            Value::Object(instance) => Some(instance),
            _ => None,
        }
    }

    /// Returns true if this value is `Null`
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::I4(a), Value::I4(b)) => a == b,
            (Value::I8(a), Value::I8(b)) => a == b,
            (Value::R8(a), Value::R8(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.same_as(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(value) => write!(f, "{value}"),
            Value::I4(value) => write!(f, "{value}i4"),
            Value::I8(value) => write!(f, "{value}i8"),
            Value::R8(value) => write!(f, "{value}r8"),
            Value::String(value) => write!(f, "{value:?}"),
            Value::Object(instance) => write!(f, "{instance:?}"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::I4(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::I8(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::R8(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Instance> for Value {
    fn from(instance: Instance) -> Self {
        Value::Object(instance)
    }
}
