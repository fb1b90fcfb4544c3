//! # cachewire
//!
//! A synchronous client for the memcached binary protocol with:
//! - Fixed 24-byte header framing over a single TCP connection
//! - Typed value marshalling (string, integer, double, boolean, structured)
//! - Optional zlib payload compression
//! - 64-bit compare-and-swap tokens carried as two 32-bit wire fields
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      CacheClient                             │
//! │          (get / set / delete / incr / touch / ...)           │
//! └──────────┬──────────────────────────────────────┬───────────┘
//!            │                                      │
//!            ▼                                      ▼
//!   ┌─────────────────┐                   ┌─────────────────┐
//!   │   ValueCodec    │                   │   FrameCodec    │
//!   │ (flags+payload) │                   │ (24-byte header)│
//!   └─────────────────┘                   └────────┬────────┘
//!                                                  │
//!                                                  ▼
//!                                         ┌─────────────────┐
//!                                         │    Transport    │
//!                                         │ (lazy TCP conn) │
//!                                         └─────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod options;

pub mod protocol;
pub mod routing;
pub mod server;
pub mod transport;
pub mod value;

pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use client::CacheClient;
pub use error::{CacheError, Result};
pub use options::{ClientOptions, Serializer};
pub use server::ServerDescriptor;
pub use value::Value;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of cachewire
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
