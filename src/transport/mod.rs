//! Transport Module
//!
//! Owns the single TCP connection to the cache server. The connection is
//! established lazily on first use and held for the client's lifetime;
//! every request is a blocking write followed by a blocking, length-directed
//! read of the response. Any I/O failure leaves the stream's framing state
//! undefined, so callers must treat it as connection-invalidating.

mod connection;

pub use connection::Connection;
