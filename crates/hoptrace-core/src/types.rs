use crate::error::Error;
use derive_more::{Add, AddAssign, Display};
use std::net::Ipv4Addr;
use std::str::FromStr;

/// `TimeToLive` (ttl) newtype.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd, Hash, Add, AddAssign, Display,
)]
pub struct TimeToLive(pub u8);

/// `Sequence` number newtype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd, Display)]
pub struct Sequence(pub u16);

/// `TraceId` newtype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd, Display)]
pub struct TraceId(pub u16);

/// `PacketSize` newtype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd, Display)]
pub struct PacketSize(pub u16);

/// `PayloadPattern` newtype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd)]
pub struct PayloadPattern(pub u8);

/// The identity of an echo probe, its identifier and sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeIdentity {
    pub identifier: TraceId,
    pub sequence: Sequence,
}

impl ProbeIdentity {
    #[must_use]
    pub const fn new(identifier: TraceId, sequence: Sequence) -> Self {
        Self {
            identifier,
            sequence,
        }
    }
}

/// A validated `IPv4` trace destination.
///
/// Only dotted-quad addresses are accepted, hostnames are never resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub struct Destination(Ipv4Addr);

impl Destination {
    #[must_use]
    pub const fn new(addr: Ipv4Addr) -> Self {
        Self(addr)
    }

    #[must_use]
    pub const fn addr(self) -> Ipv4Addr {
        self.0
    }
}

impl From<Ipv4Addr> for Destination {
    fn from(addr: Ipv4Addr) -> Self {
        Self(addr)
    }
}

impl FromStr for Destination {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ipv4Addr::from_str(s.trim())
            .map(Self)
            .map_err(|_| Error::InvalidDestination(s.to_string()))
    }
}
