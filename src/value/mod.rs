//! Value Module
//!
//! Typed application values and their marshalling into the untyped byte
//! payload of the wire protocol.
//!
//! ## Flag Layout
//!
//! Value-bearing frames carry a 32-bit flags word in the extra field:
//! - low 4 bits: type tag (string=0, integer=1, double=2, boolean=3,
//!   serialized structure=4)
//! - bit 4 (value 16): payload is zlib-compressed
//!
//! The type tag and the compression bit are orthogonal; decompression is
//! applied before type-tag dispatch.

mod codec;

pub use codec::{decode, encode};

/// Mask selecting the type tag from a flags word
pub const TYPE_MASK: u32 = 0x0f;

/// Type tag: UTF-8 text
pub const TYPE_STRING: u32 = 0;

/// Type tag: integer, ASCII decimal payload
pub const TYPE_INTEGER: u32 = 1;

/// Type tag: double, ASCII decimal payload
pub const TYPE_DOUBLE: u32 = 2;

/// Type tag: boolean, non-empty/non-zero payload is true
pub const TYPE_BOOLEAN: u32 = 3;

/// Type tag: structured value, payload produced by the configured serializer
pub const TYPE_SERIALIZED: u32 = 4;

/// Flag bit: payload is compressed
pub const FLAG_COMPRESSED: u32 = 1 << 4;

/// An application value as stored in or fetched from the cache
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Double(f64),
    Boolean(bool),
    /// Any non-primitive value, carried as a dynamic structure and run
    /// through the configured serializer on the wire
    Structured(serde_json::Value),
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Double(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Structured(v)
    }
}
