//! Value codec
//!
//! Encodes an application value into a (flags, payload) pair and decodes it
//! back. Pure functions: the serializer and compression choices are read
//! from the options passed in, never from ambient state.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};
use crate::options::{ClientOptions, Serializer};
use super::{
    Value, FLAG_COMPRESSED, TYPE_BOOLEAN, TYPE_DOUBLE, TYPE_INTEGER, TYPE_MASK, TYPE_SERIALIZED,
    TYPE_STRING,
};

// =============================================================================
// Encoding
// =============================================================================

/// Encode a value into its flags word and byte payload
///
/// Primitives are classified in priority order string, integer, double,
/// boolean; anything else goes through the configured structured serializer.
/// Integers and doubles are written as ASCII decimal text (the arithmetic
/// opcodes require it). If compression is enabled the payload is compressed
/// and the compressed bit ORed into the flags.
pub fn encode(value: &Value, options: &ClientOptions) -> Result<(u32, Vec<u8>)> {
    let (mut flags, mut payload) = match value {
        Value::Text(s) => (TYPE_STRING, s.as_bytes().to_vec()),
        Value::Integer(n) => (TYPE_INTEGER, n.to_string().into_bytes()),
        Value::Double(n) => (TYPE_DOUBLE, n.to_string().into_bytes()),
        Value::Boolean(b) => {
            let payload = if *b { b"1".to_vec() } else { Vec::new() };
            (TYPE_BOOLEAN, payload)
        }
        Value::Structured(v) => (
            TYPE_SERIALIZED,
            serialize_structured(v, options.serializer())?,
        ),
    };

    if options.compression() {
        flags |= FLAG_COMPRESSED;
        payload = compress(&payload)?;
    }

    Ok((flags, payload))
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode a byte payload back into a value using its flags word
///
/// Decompression is applied before type-tag dispatch. The serializer must
/// match the one active at encode time; there is no self-describing marker
/// in the payload.
pub fn decode(flags: u32, payload: &[u8], options: &ClientOptions) -> Result<Value> {
    let body = if flags & FLAG_COMPRESSED != 0 {
        decompress(payload)?
    } else {
        payload.to_vec()
    };

    match flags & TYPE_MASK {
        TYPE_STRING => {
            let text = String::from_utf8(body)
                .map_err(|e| CacheError::Protocol(format!("Invalid UTF-8 in text value: {}", e)))?;
            Ok(Value::Text(text))
        }
        TYPE_INTEGER => {
            let text = std::str::from_utf8(&body)
                .map_err(|e| CacheError::Protocol(format!("Invalid integer payload: {}", e)))?;
            let n = text
                .parse::<i64>()
                .map_err(|e| CacheError::Protocol(format!("Invalid integer payload: {}", e)))?;
            Ok(Value::Integer(n))
        }
        TYPE_DOUBLE => {
            let text = std::str::from_utf8(&body)
                .map_err(|e| CacheError::Protocol(format!("Invalid double payload: {}", e)))?;
            let n = text
                .parse::<f64>()
                .map_err(|e| CacheError::Protocol(format!("Invalid double payload: {}", e)))?;
            Ok(Value::Double(n))
        }
        TYPE_BOOLEAN => Ok(Value::Boolean(!body.is_empty() && body.as_slice() != b"0")),
        TYPE_SERIALIZED => {
            let v = deserialize_structured(&body, options.serializer())?;
            Ok(Value::Structured(v))
        }
        tag => Err(CacheError::Protocol(format!(
            "Unknown value type tag: {}",
            tag
        ))),
    }
}

// =============================================================================
// Structured Serialization
// =============================================================================

/// Bincode-friendly mirror of a dynamic structure
///
/// `serde_json::Value` deserializes through `deserialize_any`, which bincode
/// does not support, so the binary serializer works on this tagged mirror
/// instead.
#[derive(Serialize, Deserialize)]
enum Packed {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Array(Vec<Packed>),
    Map(Vec<(String, Packed)>),
}

impl From<&serde_json::Value> for Packed {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Packed::Null,
            serde_json::Value::Bool(b) => Packed::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Packed::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Packed::UInt(u)
                } else {
                    Packed::Float(n.as_f64().unwrap_or_default())
                }
            }
            serde_json::Value::String(s) => Packed::Str(s.clone()),
            serde_json::Value::Array(items) => {
                Packed::Array(items.iter().map(Packed::from).collect())
            }
            serde_json::Value::Object(map) => Packed::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Packed::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Packed> for serde_json::Value {
    fn from(packed: Packed) -> Self {
        match packed {
            Packed::Null => serde_json::Value::Null,
            Packed::Bool(b) => serde_json::Value::Bool(b),
            Packed::Int(i) => serde_json::Value::from(i),
            Packed::UInt(u) => serde_json::Value::from(u),
            Packed::Float(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Packed::Str(s) => serde_json::Value::String(s),
            Packed::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            Packed::Map(entries) => serde_json::Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

fn serialize_structured(value: &serde_json::Value, serializer: Serializer) -> Result<Vec<u8>> {
    match serializer {
        Serializer::Binary => bincode::serialize(&Packed::from(value))
            .map_err(|e| CacheError::Serialization(e.to_string())),
        Serializer::Json => {
            serde_json::to_vec(value).map_err(|e| CacheError::Serialization(e.to_string()))
        }
    }
}

fn deserialize_structured(bytes: &[u8], serializer: Serializer) -> Result<serde_json::Value> {
    match serializer {
        Serializer::Binary => {
            let packed: Packed = bincode::deserialize(bytes)
                .map_err(|e| CacheError::Serialization(e.to_string()))?;
            Ok(packed.into())
        }
        Serializer::Json => {
            serde_json::from_slice(bytes).map_err(|e| CacheError::Serialization(e.to_string()))
        }
    }
}

// =============================================================================
// Compression
// =============================================================================

fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| CacheError::Compression(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| CacheError::Compression(e.to_string()))
}

fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| CacheError::Compression(e.to_string()))?;
    Ok(out)
}
