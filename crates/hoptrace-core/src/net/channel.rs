use crate::config::{ChannelConfig, HeaderMode};
use crate::error::{Error, IoResult, Result};
use crate::net::socket::Socket;
use crate::net::Network;
use crate::types::TimeToLive;
use std::io;
use std::net::{SocketAddr, SocketAddrV4};
use std::time::Duration;
use tracing::instrument;

/// A channel for sending probes and receiving `ICMP` datagrams.
///
/// Probes go out on one raw socket and every incoming `ICMP` datagram is read
/// from a second raw socket.
pub struct Channel<S: Socket> {
    destination: SocketAddr,
    header_mode: HeaderMode,
    send_socket: S,
    recv_socket: S,
}

impl<S: Socket> Channel<S> {
    /// Create a `Channel`.
    ///
    /// This operation requires the `CAP_NET_RAW` capability on Linux.
    #[instrument(skip_all, level = "trace")]
    pub fn connect(config: &ChannelConfig) -> Result<Self> {
        tracing::debug!(?config);
        let send_socket = S::new_icmp_send_socket_ipv4(config.header_mode.is_included())
            .map_err(Error::SocketUnavailable)?;
        let recv_socket = S::new_recv_socket_ipv4().map_err(Error::SocketUnavailable)?;
        Ok(Self::new(config, send_socket, recv_socket))
    }

    fn new(config: &ChannelConfig, send_socket: S, recv_socket: S) -> Self {
        Self {
            destination: SocketAddr::V4(SocketAddrV4::new(config.destination.addr(), 0)),
            header_mode: config.header_mode,
            send_socket,
            recv_socket,
        }
    }
}

impl<S: Socket> Network for Channel<S> {
    #[instrument(skip(self, packet), level = "trace")]
    fn send(&mut self, ttl: TimeToLive, packet: &[u8]) -> IoResult<()> {
        if self.header_mode == HeaderMode::Kernel {
            self.send_socket.set_ttl(u32::from(ttl.0))?;
        }
        self.send_socket.send_to(packet, self.destination)
    }

    fn is_readable(&mut self, timeout: Duration) -> IoResult<bool> {
        self.recv_socket.is_readable(timeout)
    }

    /// A readable socket with nothing to read yields an empty datagram.
    fn recv(&mut self, buf: &mut [u8]) -> IoResult<usize> {
        match self.recv_socket.read(buf) {
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => Ok(0),
            res => res,
        }
    }
}
