//! Server descriptors
//!
//! The client keeps a weight-ordered list of cache servers. Only the first
//! (highest-weight) entry is ever dialed; the rest of the list is carried
//! for the routing surface, which is not implemented (see [`crate::routing`]).

/// A single cache server endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerDescriptor {
    /// Hostname or IP address
    pub host: String,

    /// TCP port
    pub port: u16,

    /// Relative weight; higher weights sort first
    pub weight: i32,
}

impl ServerDescriptor {
    /// Create a descriptor for `host:port` with the given weight
    pub fn new(host: impl Into<String>, port: u16, weight: i32) -> Self {
        Self {
            host: host.into(),
            port,
            weight,
        }
    }

    /// The dialable `host:port` address string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Sort a server list by descending weight.
///
/// The sort is stable: servers with equal weight keep their insertion order.
pub fn sort_by_weight(servers: &mut [ServerDescriptor]) {
    servers.sort_by(|a, b| b.weight.cmp(&a.weight));
}
