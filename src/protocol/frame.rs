//! Frame definitions
//!
//! Request and response frames plus the CAS token split helpers.

use bytes::Bytes;

use super::Opcode;

/// Magic byte identifying a request frame
pub const MAGIC_REQUEST: u8 = 0x80;

/// Magic byte identifying a response frame (not validated on parse)
pub const MAGIC_RESPONSE: u8 = 0x81;

/// Fixed header size for both directions
pub const HEADER_SIZE: usize = 24;

/// Status: operation succeeded
pub const STATUS_OK: u16 = 0x0000;

/// Status: key not found
pub const STATUS_KEY_NOT_FOUND: u16 = 0x0001;

/// Status: key exists (CAS token no longer matches)
pub const STATUS_KEY_EXISTS: u16 = 0x0002;

// =============================================================================
// CAS Token Split
// =============================================================================

/// Split a 64-bit CAS token into its two 32-bit wire fields
pub fn split_cas(token: u64) -> (u32, u32) {
    ((token >> 32) as u32, (token & 0xFFFF_FFFF) as u32)
}

/// Reassemble a 64-bit CAS token from its two 32-bit wire fields
pub fn join_cas(high: u32, low: u32) -> u64 {
    ((high as u64) << 32) | (low as u64)
}

// =============================================================================
// Request Frame
// =============================================================================

/// A request frame to be serialized and written to the wire
///
/// Fields left at their defaults are sent as zero.
#[derive(Debug, Clone)]
pub struct RequestFrame {
    pub opcode: Opcode,
    pub extra: Bytes,
    pub key: Bytes,
    pub value: Bytes,
    pub opaque: u32,
    pub cas: u64,
}

impl RequestFrame {
    /// Create an empty frame for the given opcode
    pub fn new(opcode: Opcode) -> Self {
        Self {
            opcode,
            extra: Bytes::new(),
            key: Bytes::new(),
            value: Bytes::new(),
            opaque: 0,
            cas: 0,
        }
    }

    /// Set the key segment
    pub fn with_key(mut self, key: impl Into<Bytes>) -> Self {
        self.key = key.into();
        self
    }

    /// Set the value segment
    pub fn with_value(mut self, value: impl Into<Bytes>) -> Self {
        self.value = value.into();
        self
    }

    /// Set the extra segment
    pub fn with_extra(mut self, extra: impl Into<Bytes>) -> Self {
        self.extra = extra.into();
        self
    }

    /// Set the CAS token
    pub fn with_cas(mut self, cas: u64) -> Self {
        self.cas = cas;
        self
    }

    /// Total body length: `extra + key + value`
    pub fn body_length(&self) -> u32 {
        (self.extra.len() + self.key.len() + self.value.len()) as u32
    }
}

// =============================================================================
// Response Frame
// =============================================================================

/// Parsed fields of a 24-byte response header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    pub magic: u8,
    pub opcode: u8,
    pub key_length: u16,
    pub extra_length: u8,
    pub data_type: u8,
    pub status: u16,
    pub body_length: u32,
    pub opaque: u32,
    pub cas: u64,
}

/// A fully received response: header plus the body split into its segments
#[derive(Debug, Clone)]
pub struct ResponseFrame {
    pub header: ResponseHeader,
    pub extra: Bytes,
    pub key: Bytes,
    pub value: Bytes,
}

impl ResponseFrame {
    /// Whether the status code reports success
    pub fn is_success(&self) -> bool {
        self.header.status == STATUS_OK
    }

    /// Value flags packed in the first 4 extra bytes of a value-bearing reply
    pub fn value_flags(&self) -> Option<u32> {
        if self.extra.len() < 4 {
            return None;
        }
        Some(u32::from_be_bytes([
            self.extra[0],
            self.extra[1],
            self.extra[2],
            self.extra[3],
        ]))
    }
}
