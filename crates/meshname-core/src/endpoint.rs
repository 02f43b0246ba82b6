//! Resolved network endpoints.

use std::fmt;
use std::net::{IpAddr, SocketAddr};

use serde::{Deserialize, Serialize};

/// Metadata the naming service attaches to an endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,
}

impl EndpointMeta {
    pub fn is_empty(&self) -> bool {
        self.authority.is_none() && self.node_name.is_none()
    }
}

/// A concrete reachable target backing a bound identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub address: IpAddr,
    pub port: u16,
    #[serde(default, skip_serializing_if = "EndpointMeta::is_empty")]
    pub meta: EndpointMeta,
}

impl Endpoint {
    pub fn new(address: IpAddr, port: u16) -> Self {
        Self {
            address,
            port,
            meta: EndpointMeta::default(),
        }
    }

    pub fn with_meta(mut self, meta: EndpointMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }
}

impl From<SocketAddr> for Endpoint {
    fn from(addr: SocketAddr) -> Self {
        Self::new(addr.ip(), addr.port())
    }
}

/// Renders as `ip:port`, with IPv6 addresses bracketed.
impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.socket_addr().fmt(f)
    }
}
