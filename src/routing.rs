//! Per-key server routing
//!
//! The `*_by_key` verb variants route a request to a specific server chosen
//! by hashing a caller-supplied server key. This client carries the surface
//! but ships no functional routing strategy: the default router rejects
//! every call so the unsupported path stays explicit instead of silently
//! degrading to single-server behavior.

use crate::error::{CacheError, Result};
use crate::server::ServerDescriptor;

/// Strategy for mapping a server key onto an entry in the server list
pub trait KeyRouter {
    /// Resolve `server_key` to an index into `servers`.
    ///
    /// `key` is the item key of the operation being routed, available to
    /// strategies that hash the item key rather than the server key.
    fn route(&self, servers: &[ServerDescriptor], server_key: &str, key: &str) -> Result<usize>;
}

/// Default router: per-key routing is not implemented
#[derive(Debug, Default, Clone, Copy)]
pub struct NoKeyRouting;

impl KeyRouter for NoKeyRouting {
    fn route(&self, _servers: &[ServerDescriptor], _server_key: &str, _key: &str) -> Result<usize> {
        Err(CacheError::Unsupported(
            "per-key server routing".to_string(),
        ))
    }
}
