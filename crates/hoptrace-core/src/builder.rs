use crate::config::defaults;
use crate::constants::{MAX_PACKET_SIZE, MIN_PACKET_SIZE};
use crate::error::{Error, Result};
use crate::{
    Destination, HeaderMode, PacketSize, PayloadPattern, ProbeMatching, Sequence, TimeToLive,
    TraceId, Tracer,
};
use std::net::Ipv4Addr;
use std::time::Duration;

/// Build a tracer.
///
/// # Examples
///
/// ```no_run
/// # fn main() -> anyhow::Result<()> {
/// use hoptrace_core::{Builder, ProbeMatching};
/// use std::time::Duration;
///
/// let tracer = Builder::new("1.1.1.1".parse()?)
///     .max_ttl(16)
///     .probe_timeout(Duration::from_secs(3))
///     .probe_matching(ProbeMatching::Lenient)
///     .build()?;
/// # Ok(())
/// # }
/// ```
///
/// # See Also
///
/// - [`Tracer`] - An ICMP echo traceroute.
#[derive(Debug, Clone)]
pub struct Builder {
    destination: Destination,
    source_addr: Option<Ipv4Addr>,
    trace_identifier: TraceId,
    sequence: Sequence,
    first_ttl: TimeToLive,
    max_ttl: TimeToLive,
    probe_timeout: Duration,
    poll_slice: Duration,
    packet_size: PacketSize,
    payload_pattern: PayloadPattern,
    header_mode: HeaderMode,
    probe_matching: ProbeMatching,
}

impl Builder {
    /// Build a tracer builder for a given destination.
    ///
    /// The trace identifier defaults to one derived from the process id.
    #[must_use]
    pub fn new(destination: Destination) -> Self {
        Self {
            destination,
            source_addr: None,
            trace_identifier: TraceId((std::process::id() % u32::from(u16::MAX)) as u16),
            sequence: Sequence(defaults::DEFAULT_SEQUENCE),
            first_ttl: TimeToLive(defaults::DEFAULT_FIRST_TTL),
            max_ttl: TimeToLive(defaults::DEFAULT_MAX_TTL),
            probe_timeout: defaults::DEFAULT_PROBE_TIMEOUT,
            poll_slice: defaults::DEFAULT_POLL_SLICE,
            packet_size: PacketSize(defaults::DEFAULT_PACKET_SIZE),
            payload_pattern: PayloadPattern(defaults::DEFAULT_PAYLOAD_PATTERN),
            header_mode: defaults::DEFAULT_HEADER_MODE,
            probe_matching: defaults::DEFAULT_PROBE_MATCHING,
        }
    }

    /// Set the source address.
    ///
    /// If not set then the source address will be discovered from the route
    /// to the destination.
    #[must_use]
    pub fn source_addr(self, source_addr: Option<Ipv4Addr>) -> Self {
        Self {
            source_addr,
            ..self
        }
    }

    /// Set the echo identifier used for every probe.
    #[must_use]
    pub fn trace_identifier(self, trace_id: u16) -> Self {
        Self {
            trace_identifier: TraceId(trace_id),
            ..self
        }
    }

    /// Set the echo sequence number used for every probe.
    #[must_use]
    pub fn sequence(self, sequence: u16) -> Self {
        Self {
            sequence: Sequence(sequence),
            ..self
        }
    }

    #[must_use]
    pub fn first_ttl(self, first_ttl: u8) -> Self {
        Self {
            first_ttl: TimeToLive(first_ttl),
            ..self
        }
    }

    #[must_use]
    pub fn max_ttl(self, max_ttl: u8) -> Self {
        Self {
            max_ttl: TimeToLive(max_ttl),
            ..self
        }
    }

    /// Set how long to wait for a reply to each probe.
    #[must_use]
    pub fn probe_timeout(self, probe_timeout: Duration) -> Self {
        Self {
            probe_timeout,
            ..self
        }
    }

    /// Set the longest single wait for incoming data.
    ///
    /// A probe timeout longer than the poll slice is waited for in several
    /// slices.
    #[must_use]
    pub fn poll_slice(self, poll_slice: Duration) -> Self {
        Self { poll_slice, ..self }
    }

    /// Set the probe size in bytes, `IPv4` header included.
    #[must_use]
    pub fn packet_size(self, packet_size: u16) -> Self {
        Self {
            packet_size: PacketSize(packet_size),
            ..self
        }
    }

    #[must_use]
    pub fn payload_pattern(self, payload_pattern: u8) -> Self {
        Self {
            payload_pattern: PayloadPattern(payload_pattern),
            ..self
        }
    }

    #[must_use]
    pub fn header_mode(self, header_mode: HeaderMode) -> Self {
        Self {
            header_mode,
            ..self
        }
    }

    #[must_use]
    pub fn probe_matching(self, probe_matching: ProbeMatching) -> Self {
        Self {
            probe_matching,
            ..self
        }
    }

    /// Build the `Tracer`.
    pub fn build(self) -> Result<Tracer> {
        if self.first_ttl.0 == 0 {
            return Err(Error::BadConfig("first_ttl must be at least 1".to_string()));
        }
        if self.first_ttl > self.max_ttl {
            return Err(Error::BadConfig(format!(
                "first_ttl {} > max_ttl {}",
                self.first_ttl, self.max_ttl
            )));
        }
        if self.probe_timeout.is_zero() {
            return Err(Error::BadConfig("probe_timeout must be non-zero".to_string()));
        }
        if self.poll_slice.is_zero() {
            return Err(Error::BadConfig("poll_slice must be non-zero".to_string()));
        }
        let packet_size = usize::from(self.packet_size.0);
        if !(MIN_PACKET_SIZE..=MAX_PACKET_SIZE).contains(&packet_size) {
            return Err(Error::InvalidPacketSize(packet_size));
        }
        Ok(Tracer::new(
            self.destination,
            self.source_addr,
            self.trace_identifier,
            self.sequence,
            self.first_ttl,
            self.max_ttl,
            self.probe_timeout,
            self.poll_slice,
            self.packet_size,
            self.payload_pattern,
            self.header_mode,
            self.probe_matching,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use test_case::test_case;

    fn builder() -> Builder {
        Builder::new(Destination::from_str("1.2.3.4").unwrap())
    }

    #[test]
    fn test_defaults() -> anyhow::Result<()> {
        let tracer = builder().build()?;
        assert_eq!(Ipv4Addr::new(1, 2, 3, 4), tracer.destination().addr());
        assert_eq!(None, tracer.source_addr());
        assert_eq!(TimeToLive(2), tracer.first_ttl());
        assert_eq!(TimeToLive(31), tracer.max_ttl());
        assert_eq!(Duration::from_secs(15), tracer.probe_timeout());
        assert_eq!(Duration::from_secs(5), tracer.poll_slice());
        assert_eq!(PacketSize(64), tracer.packet_size());
        assert_eq!(PayloadPattern(b'a'), tracer.payload_pattern());
        assert_eq!(Sequence(1), tracer.sequence());
        assert_eq!(
            TraceId((std::process::id() % u32::from(u16::MAX)) as u16),
            tracer.trace_identifier()
        );
        assert_eq!(ProbeMatching::Strict, tracer.probe_matching());
        assert_eq!(defaults::DEFAULT_HEADER_MODE, tracer.header_mode());
        Ok(())
    }

    #[test]
    fn test_setters() -> anyhow::Result<()> {
        let tracer = builder()
            .source_addr(Some(Ipv4Addr::new(192, 168, 0, 1)))
            .trace_identifier(99)
            .sequence(7)
            .first_ttl(1)
            .max_ttl(64)
            .probe_timeout(Duration::from_secs(2))
            .poll_slice(Duration::from_millis(500))
            .packet_size(128)
            .payload_pattern(0xff)
            .header_mode(HeaderMode::Kernel)
            .probe_matching(ProbeMatching::Lenient)
            .build()?;
        assert_eq!(Some(Ipv4Addr::new(192, 168, 0, 1)), tracer.source_addr());
        assert_eq!(TraceId(99), tracer.trace_identifier());
        assert_eq!(Sequence(7), tracer.sequence());
        assert_eq!(TimeToLive(1), tracer.first_ttl());
        assert_eq!(TimeToLive(64), tracer.max_ttl());
        assert_eq!(Duration::from_secs(2), tracer.probe_timeout());
        assert_eq!(Duration::from_millis(500), tracer.poll_slice());
        assert_eq!(PacketSize(128), tracer.packet_size());
        assert_eq!(PayloadPattern(0xff), tracer.payload_pattern());
        assert_eq!(HeaderMode::Kernel, tracer.header_mode());
        assert_eq!(ProbeMatching::Lenient, tracer.probe_matching());
        Ok(())
    }

    #[test_case(builder().first_ttl(0); "zero first ttl")]
    #[test_case(builder().first_ttl(10).max_ttl(9); "first ttl above max ttl")]
    #[test_case(builder().probe_timeout(Duration::ZERO); "zero probe timeout")]
    #[test_case(builder().poll_slice(Duration::ZERO); "zero poll slice")]
    fn test_bad_config(builder: Builder) {
        assert!(matches!(builder.build(), Err(Error::BadConfig(_))));
    }

    #[test_case(27)]
    #[test_case(1025)]
    fn test_invalid_packet_size(packet_size: u16) {
        let res = builder().packet_size(packet_size).build();
        assert!(matches!(res, Err(Error::InvalidPacketSize(size)) if size == usize::from(packet_size)));
    }

    #[test_case(28)]
    #[test_case(1024)]
    fn test_packet_size_bounds(packet_size: u16) {
        assert!(builder().packet_size(packet_size).build().is_ok());
    }
}
