//! Command client
//!
//! The verb-level API of the cache client. Every verb composes the value
//! codec, the frame codec and the transport into one synchronous
//! request-then-blocking-read exchange and records the response status
//! code for later inspection.
//!
//! A client owns exactly one connection, created lazily on first use and
//! never recreated automatically. It is not safe for concurrent use
//! without external serialization: the read loop assumes request/response
//! pairs are never interleaved on the stream.

use std::collections::HashMap;

use bytes::{BufMut, BytesMut};

use crate::error::{CacheError, Result};
use crate::options::{ClientOptions, OptionValue};
use crate::protocol::{
    split_cas, Opcode, RequestFrame, ResponseFrame, STATUS_KEY_EXISTS, STATUS_OK,
};
use crate::routing::{KeyRouter, NoKeyRouting};
use crate::server::{sort_by_weight, ServerDescriptor};
use crate::transport::Connection;
use crate::value::{self, Value};

/// Synchronous client for the binary cache protocol
pub struct CacheClient {
    /// Known servers, ordered by descending weight
    servers: Vec<ServerDescriptor>,

    /// Session-wide options, read on every value encode/decode
    options: ClientOptions,

    /// The single lazily-established connection
    connection: Option<Connection>,

    /// Per-key routing strategy for the `*_by_key` verbs
    router: Box<dyn KeyRouter>,

    /// Status code of the most recent response
    last_status: u16,
}

impl Default for CacheClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheClient {
    /// Create a client with default options and no servers
    pub fn new() -> Self {
        Self {
            servers: Vec::new(),
            options: ClientOptions::default(),
            connection: None,
            router: Box::new(NoKeyRouting),
            last_status: STATUS_OK,
        }
    }

    /// Create a client with a custom per-key routing strategy
    pub fn with_router(router: Box<dyn KeyRouter>) -> Self {
        Self {
            router,
            ..Self::new()
        }
    }

    // =========================================================================
    // Server List Management
    // =========================================================================

    /// Register a server; the list stays sorted by descending weight
    pub fn add_server(&mut self, host: impl Into<String>, port: u16, weight: i32) {
        self.servers.push(ServerDescriptor::new(host, port, weight));
        sort_by_weight(&mut self.servers);
    }

    /// Register a batch of servers
    pub fn add_servers(&mut self, servers: impl IntoIterator<Item = ServerDescriptor>) {
        self.servers.extend(servers);
        sort_by_weight(&mut self.servers);
    }

    /// Current server list in connection-preference order
    pub fn server_list(&self) -> &[ServerDescriptor] {
        &self.servers
    }

    /// Clear the server list (an open connection is unaffected)
    pub fn reset_server_list(&mut self) {
        self.servers.clear();
    }

    // =========================================================================
    // Options
    // =========================================================================

    /// Set a single option
    pub fn set_option(&mut self, code: i32, value: OptionValue) {
        self.options.set(code, value);
    }

    /// Merge a batch of options
    pub fn set_options(&mut self, options: impl IntoIterator<Item = (i32, OptionValue)>) {
        self.options.merge(options);
    }

    /// Look up an option value
    pub fn get_option(&self, code: i32) -> Option<&OptionValue> {
        self.options.get(code)
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Status code of the most recent response (0 = success)
    pub fn last_result_code(&self) -> u16 {
        self.last_status
    }

    /// Whether the client has never opened its connection
    pub fn is_pristine(&self) -> bool {
        self.connection.is_none()
    }

    // =========================================================================
    // Transport Plumbing
    // =========================================================================

    fn ensure_connected(&mut self) -> Result<&mut Connection> {
        if self.connection.is_none() {
            let server = self.servers.first().ok_or_else(|| {
                CacheError::Transport("no servers configured".to_string())
            })?;
            self.connection = Some(Connection::connect(server, &self.options)?);
        }

        match self.connection.as_mut() {
            Some(conn) => Ok(conn),
            None => Err(CacheError::Transport("connection unavailable".to_string())),
        }
    }

    /// Send a frame and block for its response, recording the status code
    fn round_trip(&mut self, frame: &RequestFrame) -> Result<ResponseFrame> {
        let conn = self.ensure_connected()?;
        conn.send(frame)?;
        let response = conn.read_response()?;
        self.last_status = response.header.status;
        Ok(response)
    }

    // =========================================================================
    // Store Verbs
    // =========================================================================

    fn store(
        &mut self,
        opcode: Opcode,
        key: &str,
        value: &Value,
        expiration: u32,
        cas: u64,
    ) -> Result<ResponseFrame> {
        let (flags, payload) = value::encode(value, &self.options)?;

        let mut extra = BytesMut::with_capacity(8);
        extra.put_u32(flags);
        extra.put_u32(expiration);

        let frame = RequestFrame::new(opcode)
            .with_key(key.as_bytes().to_vec())
            .with_value(payload)
            .with_extra(extra.freeze())
            .with_cas(cas);

        self.round_trip(&frame)
    }

    /// Store a value under a key unconditionally
    pub fn set(&mut self, key: &str, value: impl Into<Value>, expiration: u32) -> Result<bool> {
        let response = self.store(Opcode::Set, key, &value.into(), expiration, 0)?;
        Ok(response.is_success())
    }

    /// Store a value only if the key does not exist yet
    pub fn add(&mut self, key: &str, value: impl Into<Value>, expiration: u32) -> Result<bool> {
        let response = self.store(Opcode::Add, key, &value.into(), expiration, 0)?;
        Ok(response.is_success())
    }

    /// Store a value only if the key already exists
    pub fn replace(&mut self, key: &str, value: impl Into<Value>, expiration: u32) -> Result<bool> {
        let response = self.store(Opcode::Replace, key, &value.into(), expiration, 0)?;
        Ok(response.is_success())
    }

    /// Compare-and-swap store: succeeds only while the stored item still
    /// matches `cas_token`
    ///
    /// A key-exists status (the server's CAS-mismatch signal) is surfaced
    /// as [`CacheError::CasMismatch`]; other failure statuses return
    /// `Ok(false)` like the plain stores.
    pub fn cas(
        &mut self,
        cas_token: u64,
        key: &str,
        value: impl Into<Value>,
        expiration: u32,
    ) -> Result<bool> {
        let response = self.store(Opcode::Set, key, &value.into(), expiration, cas_token)?;
        match response.header.status {
            STATUS_OK => Ok(true),
            STATUS_KEY_EXISTS => Err(CacheError::CasMismatch),
            _ => Ok(false),
        }
    }

    /// Store a batch of items; overall success is the AND of each store.
    /// Not atomic: a failure leaves earlier stores in place.
    pub fn set_multi(&mut self, items: &[(&str, Value)], expiration: u32) -> Result<bool> {
        let mut success = true;
        for (key, value) in items {
            if !self.set(key, value.clone(), expiration)? {
                success = false;
            }
        }
        Ok(success)
    }

    // =========================================================================
    // Fetch Verbs
    // =========================================================================

    /// Fetch a value by key
    ///
    /// Returns `Ok(None)` for any non-zero status: not-found and the other
    /// failure statuses deliberately collapse, matching the legacy client.
    /// The raw code stays readable via [`CacheClient::last_result_code`].
    /// Transport and protocol failures are errors, so a missing key and a
    /// broken connection remain distinguishable by kind.
    pub fn get(&mut self, key: &str) -> Result<Option<Value>> {
        Ok(self.get_with_cas(key)?.map(|(value, _)| value))
    }

    /// Fetch a value together with its current CAS token
    pub fn get_with_cas(&mut self, key: &str) -> Result<Option<(Value, u64)>> {
        let frame = RequestFrame::new(Opcode::Get).with_key(key.as_bytes().to_vec());
        let response = self.round_trip(&frame)?;

        if !response.is_success() {
            return Ok(None);
        }

        let flags = response.value_flags().ok_or_else(|| {
            CacheError::Protocol("not a recognized response shape: missing value flags".to_string())
        })?;
        let value = value::decode(flags, &response.value, &self.options)?;

        Ok(Some((value, response.header.cas)))
    }

    /// Fetch a batch of keys; missing keys are omitted from the result
    pub fn get_multi(&mut self, keys: &[&str]) -> Result<HashMap<String, Value>> {
        let mut results = HashMap::new();
        for key in keys {
            if let Some(value) = self.get(key)? {
                results.insert((*key).to_string(), value);
            }
        }
        Ok(results)
    }

    // =========================================================================
    // Concatenation Verbs
    // =========================================================================

    fn concat(&mut self, opcode: Opcode, key: &str, value: &[u8]) -> Result<bool> {
        // Concat frames carry no flags extra, so a compressed fragment would
        // corrupt the stored value on concatenation. Refuse before sending.
        if self.options.compression() {
            tracing::debug!(
                "Refusing {:?} for key {:?}: compression is enabled",
                opcode,
                key
            );
            return Ok(false);
        }

        let frame = RequestFrame::new(opcode)
            .with_key(key.as_bytes().to_vec())
            .with_value(value.to_vec());
        let response = self.round_trip(&frame)?;
        Ok(response.is_success())
    }

    /// Append raw bytes to an existing value
    pub fn append(&mut self, key: &str, value: &[u8]) -> Result<bool> {
        self.concat(Opcode::Append, key, value)
    }

    /// Prepend raw bytes to an existing value
    pub fn prepend(&mut self, key: &str, value: &[u8]) -> Result<bool> {
        self.concat(Opcode::Prepend, key, value)
    }

    // =========================================================================
    // Arithmetic Verbs
    // =========================================================================

    /// Shared arithmetic helper: a negative offset routes to the decrement
    /// opcode with the offset negated.
    fn shift(&mut self, key: &str, offset: i64, initial_value: u64, expiry: u32) -> Result<bool> {
        let (opcode, magnitude) = if offset < 0 {
            (Opcode::Decrement, offset.unsigned_abs())
        } else {
            (Opcode::Increment, offset as u64)
        };

        // Offset and initial value use the same 64-over-32 split as CAS.
        let (offset_high, offset_low) = split_cas(magnitude);
        let (initial_high, initial_low) = split_cas(initial_value);

        let mut extra = BytesMut::with_capacity(20);
        extra.put_u32(offset_high);
        extra.put_u32(offset_low);
        extra.put_u32(initial_high);
        extra.put_u32(initial_low);
        extra.put_u32(expiry);

        let frame = RequestFrame::new(opcode)
            .with_key(key.as_bytes().to_vec())
            .with_extra(extra.freeze());
        let response = self.round_trip(&frame)?;
        Ok(response.is_success())
    }

    /// Increment a numeric value by `offset`
    pub fn increment(
        &mut self,
        key: &str,
        offset: i64,
        initial_value: u64,
        expiry: u32,
    ) -> Result<bool> {
        self.shift(key, offset, initial_value, expiry)
    }

    /// Decrement a numeric value by `offset`
    ///
    /// Delegates with the offset negated; [`shift`](Self::shift) then flips
    /// negative offsets back to a positive magnitude on the decrement
    /// opcode, so `decrement(k, 5, ..)` always shrinks the value by 5.
    pub fn decrement(
        &mut self,
        key: &str,
        offset: i64,
        initial_value: u64,
        expiry: u32,
    ) -> Result<bool> {
        self.shift(key, offset.wrapping_neg(), initial_value, expiry)
    }

    // =========================================================================
    // Key Lifecycle Verbs
    // =========================================================================

    /// Delete a key
    pub fn delete(&mut self, key: &str) -> Result<bool> {
        let frame = RequestFrame::new(Opcode::Delete).with_key(key.as_bytes().to_vec());
        let response = self.round_trip(&frame)?;
        Ok(response.is_success())
    }

    /// Delete a batch of keys; overall success is the AND of each delete.
    /// Not atomic: keys deleted before a failure stay deleted.
    pub fn delete_multi(&mut self, keys: &[&str]) -> Result<bool> {
        let mut success = true;
        for key in keys {
            if !self.delete(key)? {
                success = false;
            }
        }
        Ok(success)
    }

    /// Update a key's expiration without touching its value
    pub fn touch(&mut self, key: &str, expiration: u32) -> Result<bool> {
        let frame = RequestFrame::new(Opcode::Touch)
            .with_key(key.as_bytes().to_vec())
            .with_extra(expiration.to_be_bytes().to_vec());
        let response = self.round_trip(&frame)?;
        Ok(response.is_success())
    }

    /// Invalidate all cached items, optionally after `delay` seconds
    pub fn flush(&mut self, delay: u32) -> Result<bool> {
        let mut frame = RequestFrame::new(Opcode::Flush);
        if delay > 0 {
            frame = frame.with_extra(delay.to_be_bytes().to_vec());
        }
        let response = self.round_trip(&frame)?;
        Ok(response.is_success())
    }

    // =========================================================================
    // Session Verbs
    // =========================================================================

    /// Ask the server for its version string
    pub fn version(&mut self) -> Result<Option<String>> {
        let frame = RequestFrame::new(Opcode::Version);
        let response = self.round_trip(&frame)?;

        if !response.is_success() {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&response.value).into_owned()))
    }

    /// Tell the server we are leaving, then drop the connection
    pub fn quit(&mut self) -> Result<bool> {
        let frame = RequestFrame::new(Opcode::Quit);
        let response = self.round_trip(&frame)?;
        self.connection = None;
        Ok(response.is_success())
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// List the SASL mechanisms the server offers
    pub fn list_auth_mechanisms(&mut self) -> Result<Vec<String>> {
        let frame = RequestFrame::new(Opcode::SaslListMechanisms);
        let response = self.round_trip(&frame)?;

        let body = String::from_utf8_lossy(&response.value);
        Ok(body
            .split(' ')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Authenticate with SASL PLAIN credentials
    pub fn authenticate_plain(&mut self, user: &str, password: &str) -> Result<bool> {
        let mut value = Vec::with_capacity(user.len() + password.len() + 2);
        value.push(0);
        value.extend_from_slice(user.as_bytes());
        value.push(0);
        value.extend_from_slice(password.as_bytes());

        let frame = RequestFrame::new(Opcode::SaslAuth)
            .with_key(&b"PLAIN"[..])
            .with_value(value);
        let response = self.round_trip(&frame)?;
        Ok(response.is_success())
    }

    // =========================================================================
    // Per-key Routed Variants
    // =========================================================================
    //
    // Routing resolves a server index through the configured KeyRouter.
    // The default router rejects every call; a router that resolves to the
    // primary server delegates to the non-keyed verb, and any other index
    // is refused because multi-connection dispatch does not exist.

    fn route(&self, server_key: &str, key: &str) -> Result<()> {
        let index = self.router.route(&self.servers, server_key, key)?;
        if index != 0 {
            return Err(CacheError::Unsupported(format!(
                "dispatch to routed server {} (single-connection client)",
                index
            )));
        }
        Ok(())
    }

    /// Routed variant of [`get`](Self::get)
    pub fn get_by_key(&mut self, server_key: &str, key: &str) -> Result<Option<Value>> {
        self.route(server_key, key)?;
        self.get(key)
    }

    /// Routed variant of [`set`](Self::set)
    pub fn set_by_key(
        &mut self,
        server_key: &str,
        key: &str,
        value: impl Into<Value>,
        expiration: u32,
    ) -> Result<bool> {
        self.route(server_key, key)?;
        self.set(key, value, expiration)
    }

    /// Routed variant of [`add`](Self::add)
    pub fn add_by_key(
        &mut self,
        server_key: &str,
        key: &str,
        value: impl Into<Value>,
        expiration: u32,
    ) -> Result<bool> {
        self.route(server_key, key)?;
        self.add(key, value, expiration)
    }

    /// Routed variant of [`replace`](Self::replace)
    pub fn replace_by_key(
        &mut self,
        server_key: &str,
        key: &str,
        value: impl Into<Value>,
        expiration: u32,
    ) -> Result<bool> {
        self.route(server_key, key)?;
        self.replace(key, value, expiration)
    }

    /// Routed variant of [`cas`](Self::cas)
    pub fn cas_by_key(
        &mut self,
        cas_token: u64,
        server_key: &str,
        key: &str,
        value: impl Into<Value>,
        expiration: u32,
    ) -> Result<bool> {
        self.route(server_key, key)?;
        self.cas(cas_token, key, value, expiration)
    }

    /// Routed variant of [`delete`](Self::delete)
    pub fn delete_by_key(&mut self, server_key: &str, key: &str) -> Result<bool> {
        self.route(server_key, key)?;
        self.delete(key)
    }

    /// Routed variant of [`delete_multi`](Self::delete_multi)
    pub fn delete_multi_by_key(&mut self, server_key: &str, keys: &[&str]) -> Result<bool> {
        for key in keys {
            self.route(server_key, key)?;
        }
        self.delete_multi(keys)
    }

    /// Routed variant of [`set_multi`](Self::set_multi)
    pub fn set_multi_by_key(
        &mut self,
        server_key: &str,
        items: &[(&str, Value)],
        expiration: u32,
    ) -> Result<bool> {
        for (key, _) in items {
            self.route(server_key, key)?;
        }
        self.set_multi(items, expiration)
    }

    /// Routed variant of [`increment`](Self::increment)
    pub fn increment_by_key(
        &mut self,
        server_key: &str,
        key: &str,
        offset: i64,
        initial_value: u64,
        expiry: u32,
    ) -> Result<bool> {
        self.route(server_key, key)?;
        self.increment(key, offset, initial_value, expiry)
    }

    /// Routed variant of [`decrement`](Self::decrement)
    pub fn decrement_by_key(
        &mut self,
        server_key: &str,
        key: &str,
        offset: i64,
        initial_value: u64,
        expiry: u32,
    ) -> Result<bool> {
        self.route(server_key, key)?;
        self.decrement(key, offset, initial_value, expiry)
    }

    /// Routed variant of [`append`](Self::append)
    pub fn append_by_key(&mut self, server_key: &str, key: &str, value: &[u8]) -> Result<bool> {
        self.route(server_key, key)?;
        self.append(key, value)
    }

    /// Routed variant of [`prepend`](Self::prepend)
    pub fn prepend_by_key(&mut self, server_key: &str, key: &str, value: &[u8]) -> Result<bool> {
        self.route(server_key, key)?;
        self.prepend(key, value)
    }

    /// Routed variant of [`touch`](Self::touch)
    pub fn touch_by_key(&mut self, server_key: &str, key: &str, expiration: u32) -> Result<bool> {
        self.route(server_key, key)?;
        self.touch(key, expiration)
    }
}
