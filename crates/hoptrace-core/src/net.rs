use crate::error::IoResult;
use crate::types::TimeToLive;
use std::time::Duration;

/// Platform specific network code.
mod platform;

/// A network socket.
mod socket;

/// A channel for sending probes and receiving replies.
pub mod channel;

/// Determine the source address.
pub mod source;

pub use platform::SocketImpl;

/// An abstraction over the transport used for tracing.
///
/// Implementations send one probe at a time and hand back raw incoming
/// datagrams, `IPv4` header included.
#[cfg_attr(test, mockall::automock)]
pub trait Network {
    /// Send a probe built for `ttl`.
    fn send(&mut self, ttl: TimeToLive, packet: &[u8]) -> IoResult<()>;

    /// Returns true if a datagram can be read before the timeout, false otherwise.
    fn is_readable(&mut self, timeout: Duration) -> IoResult<bool>;

    /// Read the next datagram into `buf`, returning the number of bytes read.
    fn recv(&mut self, buf: &mut [u8]) -> IoResult<usize>;
}
