use std::fmt::{Display, Formatter};
use std::io;
use std::net::SocketAddr;
use thiserror::Error;

/// A tracer error result.
pub type Result<T> = std::result::Result<T, Error>;

/// A tracer error.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid destination: {0}")]
    InvalidDestination(String),
    #[error("socket unavailable: {0}")]
    SocketUnavailable(IoError),
    #[error("probe with ttl {ttl} failed to send: {source}")]
    SendFailed { ttl: u8, source: IoError },
    #[error("malformed packet: {0}")]
    MalformedPacket(#[from] hoptrace_packet::error::Error),
    #[error("invalid config: {0}")]
    BadConfig(String),
    #[error("invalid packet size: {0}")]
    InvalidPacketSize(usize),
    #[error("IO error: {0}")]
    IoError(#[from] IoError),
    #[error("missing address from socket call")]
    MissingAddr,
}

/// Custom IO error result.
pub type IoResult<T> = std::result::Result<T, IoError>;

/// Custom IO error.
#[derive(Error, Debug)]
pub enum IoError {
    #[error("Connect error for {1}: {0}")]
    Connect(io::Error, SocketAddr),
    #[error("Sendto error for {1}: {0}")]
    SendTo(io::Error, SocketAddr),
    #[error("Failed to {1}: {0}")]
    Other(io::Error, IoOperation),
}

impl IoError {
    /// The kind of the underlying [`io::Error`].
    #[must_use]
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            Self::Connect(e, _) | Self::SendTo(e, _) | Self::Other(e, _) => e.kind(),
        }
    }
}

/// Io operation.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum IoOperation {
    NewSocket,
    SetNonBlocking,
    SetHeaderIncluded,
    SetTtl,
    Select,
    Read,
    LocalAddr,
}

impl Display for IoOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NewSocket => write!(f, "create new socket"),
            Self::SetNonBlocking => write!(f, "set non-blocking"),
            Self::SetHeaderIncluded => write!(f, "set header included"),
            Self::SetTtl => write!(f, "set TTL"),
            Self::Select => write!(f, "select"),
            Self::Read => write!(f, "read"),
            Self::LocalAddr => write!(f, "local addr"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, SocketAddrV4};

    #[test]
    fn test_send_failed_display() {
        let addr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(1, 2, 3, 4), 0));
        let err = Error::SendFailed {
            ttl: 7,
            source: IoError::SendTo(io::Error::from(io::ErrorKind::PermissionDenied), addr),
        };
        assert_eq!(
            "probe with ttl 7 failed to send: Sendto error for 1.2.3.4:0: permission denied",
            err.to_string()
        );
    }

    #[test]
    fn test_io_error_kind() {
        let err = IoError::Other(
            io::Error::from(io::ErrorKind::WouldBlock),
            IoOperation::Read,
        );
        assert_eq!(io::ErrorKind::WouldBlock, err.kind());
        assert_eq!("Failed to read: operation would block", err.to_string());
    }
}
