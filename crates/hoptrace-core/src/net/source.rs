use crate::error::{Error, Result};
use crate::net::socket::Socket;
use crate::types::Destination;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, SocketAddrV4};
use tracing::instrument;

/// The port used for local address discovery.
const DISCOVERY_PORT: u16 = 80;

/// Discover a source address.
pub struct SourceAddr;

impl SourceAddr {
    /// Discover the local `Ipv4Addr` which routes to `destination`.
    ///
    /// A datagram socket is connected to the destination and its local address
    /// read back. Note that no packets are transmitted by this method.
    #[instrument(ret, level = "trace")]
    pub fn discover<S: Socket>(destination: Destination) -> Result<Ipv4Addr> {
        let mut socket = S::new_udp_dgram_socket_ipv4()?;
        socket.connect(SocketAddr::V4(SocketAddrV4::new(
            destination.addr(),
            DISCOVERY_PORT,
        )))?;
        match socket.local_addr()?.map(|addr| addr.ip()) {
            Some(IpAddr::V4(addr)) => Ok(addr),
            _ => Err(Error::MissingAddr),
        }
    }
}
