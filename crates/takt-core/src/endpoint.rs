//! Network endpoint addressing
//!
//! A publisher exposes two planes: the data plane events arrive on and the
//! sync plane the rendezvous runs over. Both are plain socket addresses; the
//! wrapper exists so APIs name which plane they expect.

use std::fmt;
use std::net::{AddrParseError, IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

/// A publisher-facing network address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint(SocketAddr);

impl Endpoint {
    pub fn new(ip: IpAddr, port: u16) -> Self {
        Endpoint(SocketAddr::new(ip, port))
    }

    /// Loopback endpoint, used by tests and single-host setups.
    pub fn localhost(port: u16) -> Self {
        Endpoint(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port))
    }

    /// Wildcard endpoint (0.0.0.0).
    pub fn any(port: u16) -> Self {
        Endpoint(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port))
    }

    #[inline]
    pub fn ip(&self) -> IpAddr {
        self.0.ip()
    }

    #[inline]
    pub fn port(&self) -> u16 {
        self.0.port()
    }

    #[inline]
    pub fn as_socket_addr(&self) -> SocketAddr {
        self.0
    }
}

impl From<SocketAddr> for Endpoint {
    fn from(addr: SocketAddr) -> Self {
        Endpoint(addr)
    }
}

impl FromStr for Endpoint {
    type Err = AddrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<SocketAddr>().map(Endpoint)
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Endpoint({})", self.0)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
