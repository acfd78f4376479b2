//! Dynamic host value model.
//!
//! [`Value`] stands in for a host-language value whose static type is unknown
//! at the point of parameter binding. The classifier never matches on the
//! variants directly; it probes the value through the fallible conversion
//! methods below, each of which is independent and idempotent.

use chrono::{NaiveDate, NaiveDateTime};
use strum::EnumIs;

/// A dynamically typed host value. Read-only to the binding subsystem.
#[derive(Debug, Clone, PartialEq, EnumIs)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Value {
    /// Runtime type name carried in diagnostics.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "str",
            Value::Bytes(_) => "bytes",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
        }
    }

    /// Exact boolean extraction. Only a `Bool` converts; integers do not
    /// narrow to boolean.
    pub const fn try_as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    /// Lossless conversion to a 64-bit signed integer.
    ///
    /// Host booleans are int-convertible (0/1). Doubles convert only when
    /// finite, integral, and exactly representable in `i64`.
    pub fn try_as_int64(&self) -> Option<i64> {
        match self {
            Value::Bool(flag) => Some(i64::from(*flag)),
            Value::Int(int) => Some(*int),
            Value::Float(float) => {
                let float = *float;
                // `i64::MAX as f64` rounds up to 2^63, which is out of range.
                if float.is_finite()
                    && float.fract() == 0.0
                    && float >= i64::MIN as f64
                    && float < i64::MAX as f64
                {
                    Some(float as i64)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Conversion to a 64-bit IEEE-754 double.
    pub fn try_as_double(&self) -> Option<f64> {
        match self {
            Value::Bool(flag) => Some(f64::from(u8::from(*flag))),
            Value::Int(int) => Some(*int as f64),
            Value::Float(float) => Some(*float),
            _ => None,
        }
    }

    /// Narrow (single-byte) text payload: UTF-8 bytes of a string, or raw
    /// bytes as-is.
    pub fn try_as_narrow(&self) -> Option<&[u8]> {
        match self {
            Value::Text(text) => Some(text.as_bytes()),
            Value::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// UTF-16 code unit sequence of a text value. Raw bytes convert only when
    /// they decode as UTF-8.
    pub fn try_as_wide(&self) -> Option<std::str::EncodeUtf16<'_>> {
        match self {
            Value::Text(text) => Some(text.encode_utf16()),
            Value::Bytes(bytes) => std::str::from_utf8(bytes).ok().map(str::encode_utf16),
            _ => None,
        }
    }

    /// Pure calendar date, without a time-of-day component.
    pub const fn try_as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(date) => Some(*date),
            _ => None,
        }
    }

    /// Date-and-time value.
    pub const fn try_as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(datetime) => Some(*datetime),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::Bool(flag)
    }
}

impl From<i64> for Value {
    fn from(int: i64) -> Self {
        Value::Int(int)
    }
}

impl From<f64> for Value {
    fn from(float: f64) -> Self {
        Value::Float(float)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_owned())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Bytes(bytes)
    }
}

impl From<NaiveDate> for Value {
    fn from(date: NaiveDate) -> Self {
        Value::Date(date)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(datetime: NaiveDateTime) -> Self {
        Value::DateTime(datetime)
    }
}
