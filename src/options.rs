//! Client options
//!
//! Session-wide configuration as a mapping from integer option codes to
//! typed values. The codes mirror the libmemcached-compatible numbering so
//! existing configuration can be ported directly. Two codes are load-bearing
//! for the codec: serializer selection and the compression toggle; the
//! timeout codes are consulted by the transport when a connection is opened.

use std::collections::HashMap;
use std::time::Duration;

// =============================================================================
// Option Codes
// =============================================================================

/// Toggle zlib compression of value payloads
pub const OPT_COMPRESSION: i32 = -1001;

/// Structured-value serializer selection
pub const OPT_SERIALIZER: i32 = -1003;

/// Disable Nagle's algorithm on the connection
pub const OPT_TCP_NODELAY: i32 = 1;

/// Key hashing algorithm (multi-server routing surface; not implemented)
pub const OPT_HASH: i32 = 2;

/// Server distribution strategy (multi-server routing surface; not implemented)
pub const OPT_DISTRIBUTION: i32 = 9;

/// Connect timeout in milliseconds (0 = block indefinitely)
pub const OPT_CONNECT_TIMEOUT: i32 = 14;

/// Receive timeout in milliseconds (0 = block indefinitely)
pub const OPT_RECV_TIMEOUT: i32 = 15;

/// Send timeout in milliseconds (0 = block indefinitely)
pub const OPT_SEND_TIMEOUT: i32 = 19;

/// Modula key distribution (routing surface constant)
pub const DISTRIBUTION_MODULA: i64 = 0;

/// Consistent-hash key distribution (routing surface constant)
pub const DISTRIBUTION_CONSISTENT: i64 = 1;

// =============================================================================
// Option Values
// =============================================================================

/// Serializer used for values that are not string/integer/double/boolean
///
/// There is no self-describing marker in the payload: decode must be
/// configured with the same serializer that was active at encode time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Serializer {
    /// Compact binary encoding via bincode
    #[default]
    Binary,

    /// JSON text encoding via serde_json
    Json,
}

/// A single option slot
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Integer(i64),
    Serializer(Serializer),
}

/// Session-wide client options
#[derive(Debug, Clone)]
pub struct ClientOptions {
    values: HashMap<i32, OptionValue>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        let mut values = HashMap::new();
        values.insert(OPT_SERIALIZER, OptionValue::Serializer(Serializer::Binary));
        values.insert(OPT_COMPRESSION, OptionValue::Bool(false));
        Self { values }
    }
}

impl ClientOptions {
    /// Create options with the default serializer and compression off
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a single option, replacing any previous value for the code
    pub fn set(&mut self, code: i32, value: OptionValue) {
        self.values.insert(code, value);
    }

    /// Merge a batch of options into the current set
    pub fn merge<I>(&mut self, options: I)
    where
        I: IntoIterator<Item = (i32, OptionValue)>,
    {
        self.values.extend(options);
    }

    /// Look up a raw option value by code
    pub fn get(&self, code: i32) -> Option<&OptionValue> {
        self.values.get(&code)
    }

    // -------------------------------------------------------------------------
    // Typed accessors for the load-bearing codes
    // -------------------------------------------------------------------------

    /// Configured structured-value serializer
    pub fn serializer(&self) -> Serializer {
        match self.values.get(&OPT_SERIALIZER) {
            Some(OptionValue::Serializer(s)) => *s,
            _ => Serializer::default(),
        }
    }

    /// Whether value payloads should be compressed
    pub fn compression(&self) -> bool {
        matches!(self.values.get(&OPT_COMPRESSION), Some(OptionValue::Bool(true)))
    }

    /// Whether TCP_NODELAY should be set on the connection (default: true)
    pub fn tcp_nodelay(&self) -> bool {
        !matches!(self.values.get(&OPT_TCP_NODELAY), Some(OptionValue::Bool(false)))
    }

    /// Connect deadline, if one is configured
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.timeout_for(OPT_CONNECT_TIMEOUT)
    }

    /// Read deadline, if one is configured
    pub fn recv_timeout(&self) -> Option<Duration> {
        self.timeout_for(OPT_RECV_TIMEOUT)
    }

    /// Write deadline, if one is configured
    pub fn send_timeout(&self) -> Option<Duration> {
        self.timeout_for(OPT_SEND_TIMEOUT)
    }

    fn timeout_for(&self, code: i32) -> Option<Duration> {
        match self.values.get(&code) {
            Some(OptionValue::Integer(ms)) if *ms > 0 => {
                Some(Duration::from_millis(*ms as u64))
            }
            _ => None,
        }
    }
}
