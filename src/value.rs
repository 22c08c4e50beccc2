//! Typed values exchanged with an instrument.
//!
//! Every attribute slot is declared with a [`Kind`]. Callers hand the codec
//! [`Value`]s, which are coerced to the declared kind before being rendered
//! into a command, and replies are decoded back into a [`Value`] of the
//! attribute's result kind.
//!
//! # Example
//! ```rust
//! use windfreak::{Kind, Value};
//!
//! let v = Value::Str("2441.2976".into()).coerce(Kind::Float).unwrap();
//! assert_eq!(v, Value::Float(2441.2976));
//! ```
use std::fmt;

use thiserror::Error;

/// Primitive kind of a single attribute slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Integer,
    Float,
    Boolean,
    String,
    /// Zero-width slot used by argument-less commands such as `save`.
    Unit,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Integer => "integer",
            Kind::Float => "float",
            Kind::Boolean => "boolean",
            Kind::String => "string",
            Kind::Unit => "unit",
        };
        f.write_str(name)
    }
}

/// A typed value for one attribute slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Unit,
}

/// Raised when a value cannot be represented as the requested kind.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("cannot coerce '{value}' to {kind}")]
pub struct CoercionError {
    pub kind: Kind,
    pub value: String,
}

impl Value {
    /// The kind this value currently holds.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Int(_) => Kind::Integer,
            Value::Float(_) => Kind::Float,
            Value::Bool(_) => Kind::Boolean,
            Value::Str(_) => Kind::String,
            Value::Unit => Kind::Unit,
        }
    }

    /// Converts the value into `kind`.
    ///
    /// Numeric kinds accept numbers and numeric strings. Integer slots reject
    /// floats with a fractional part. Boolean slots accept booleans, the
    /// integers `0`/`1` and the strings `0`, `1`, `true`, `false`.
    pub fn coerce(self, kind: Kind) -> Result<Value, CoercionError> {
        let fail = |v: &Value| CoercionError {
            kind,
            value: v.to_string(),
        };

        match (kind, &self) {
            (Kind::Integer, Value::Int(_)) => Ok(self),
            // i64::MAX as f64 rounds up to 2^63, which is itself out of range.
            (Kind::Integer, Value::Float(f))
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 =>
            {
                Ok(Value::Int(*f as i64))
            }
            (Kind::Integer, Value::Str(s)) => {
                s.trim().parse().map(Value::Int).map_err(|_| fail(&self))
            }

            (Kind::Float, Value::Float(_)) => Ok(self),
            (Kind::Float, Value::Int(i)) => Ok(Value::Float(*i as f64)),
            (Kind::Float, Value::Str(s)) => {
                s.trim().parse().map(Value::Float).map_err(|_| fail(&self))
            }

            (Kind::Boolean, Value::Bool(_)) => Ok(self),
            (Kind::Boolean, Value::Int(0)) => Ok(Value::Bool(false)),
            (Kind::Boolean, Value::Int(1)) => Ok(Value::Bool(true)),
            (Kind::Boolean, Value::Str(s)) => match s.trim().to_lowercase().as_str() {
                "0" | "false" => Ok(Value::Bool(false)),
                "1" | "true" => Ok(Value::Bool(true)),
                _ => Err(fail(&self)),
            },

            (Kind::String, Value::Str(_)) => Ok(self),
            (Kind::String, Value::Int(_) | Value::Float(_)) => Ok(Value::Str(self.to_string())),

            (Kind::Unit, Value::Unit) => Ok(self),

            _ => Err(fail(&self)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => f.write_str(s),
            Value::Unit => Ok(()),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Unit
    }
}

/// Raised when a decoded value is not of the expected Rust type.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("expected {expected} value, found {found}")]
pub struct UnexpectedKind {
    pub expected: Kind,
    pub found: Kind,
}

macro_rules! try_from_value {
    ($ty:ty, $kind:expr, $variant:ident) => {
        impl TryFrom<Value> for $ty {
            type Error = UnexpectedKind;

            fn try_from(value: Value) -> Result<Self, Self::Error> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(UnexpectedKind {
                        expected: $kind,
                        found: other.kind(),
                    }),
                }
            }
        }
    };
}

try_from_value!(i64, Kind::Integer, Int);
try_from_value!(f64, Kind::Float, Float);
try_from_value!(bool, Kind::Boolean, Bool);
try_from_value!(String, Kind::String, Str);
