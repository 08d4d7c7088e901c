use crate::types::{Destination, PacketSize, PayloadPattern, ProbeIdentity, TimeToLive};
use std::fmt::{Display, Formatter};
use std::net::Ipv4Addr;
use std::time::Duration;

/// Default values for configuration.
pub mod defaults {
    use crate::config::{HeaderMode, ProbeMatching};
    use std::time::Duration;

    /// The default value for `first-ttl`.
    pub const DEFAULT_FIRST_TTL: u8 = 2;

    /// The default value for `max-ttl`.
    pub const DEFAULT_MAX_TTL: u8 = 31;

    /// The default time to wait for a reply to a single probe.
    pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(15);

    /// The default longest single wait for the receive socket to become readable.
    pub const DEFAULT_POLL_SLICE: Duration = Duration::from_secs(5);

    /// The default value for `packet-size`.
    pub const DEFAULT_PACKET_SIZE: u16 = 64;

    /// The default value for `payload-pattern`.
    pub const DEFAULT_PAYLOAD_PATTERN: u8 = b'a';

    /// The default echo sequence number.
    pub const DEFAULT_SEQUENCE: u16 = 1;

    /// The default header mode.
    ///
    /// Only Linux accepts a caller built `IPv4` header in network byte order.
    #[cfg(target_os = "linux")]
    pub const DEFAULT_HEADER_MODE: HeaderMode = HeaderMode::Included;

    /// The default header mode.
    ///
    /// Only Linux accepts a caller built `IPv4` header in network byte order.
    #[cfg(not(target_os = "linux"))]
    pub const DEFAULT_HEADER_MODE: HeaderMode = HeaderMode::Kernel;

    /// The default probe matching mode.
    pub const DEFAULT_PROBE_MATCHING: ProbeMatching = ProbeMatching::Strict;
}

/// Who builds the `IPv4` header of a probe.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum HeaderMode {
    /// The probe is a complete `IPv4` datagram, the TTL is written into the header.
    Included,
    /// The probe is an `ICMP` message only, the kernel adds the `IPv4` header and
    /// the TTL is set as a socket option.
    Kernel,
}

impl HeaderMode {
    #[must_use]
    pub const fn is_included(self) -> bool {
        match self {
            Self::Included => true,
            Self::Kernel => false,
        }
    }
}

impl Display for HeaderMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Included => write!(f, "included"),
            Self::Kernel => write!(f, "kernel"),
        }
    }
}

/// How replies are matched against the probe in flight.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ProbeMatching {
    /// A reply must carry the identifier and sequence of the probe in flight.
    Strict,
    /// Any echo reply or time exceeded message belongs to the probe in flight.
    Lenient,
}

impl Display for ProbeMatching {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Lenient => write!(f, "lenient"),
        }
    }
}

/// Channel configuration.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ChannelConfig {
    pub destination: Destination,
    pub header_mode: HeaderMode,
}

/// Probe building configuration.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CodecConfig {
    pub source_addr: Ipv4Addr,
    pub destination: Destination,
    pub packet_size: PacketSize,
    pub payload_pattern: PayloadPattern,
    pub header_mode: HeaderMode,
}

/// Engine configuration.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct EngineConfig {
    pub destination: Destination,
    pub identity: ProbeIdentity,
    pub first_ttl: TimeToLive,
    pub max_ttl: TimeToLive,
    pub probe_timeout: Duration,
    pub poll_slice: Duration,
    pub probe_matching: ProbeMatching,
}
