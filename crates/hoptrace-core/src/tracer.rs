use crate::codec::ProbeCodec;
use crate::config::{ChannelConfig, CodecConfig, EngineConfig, HeaderMode, ProbeMatching};
use crate::engine::{Engine, Event, Trace};
use crate::error::Result;
use crate::net::channel::Channel;
use crate::net::source::SourceAddr;
use crate::net::{Network, SocketImpl};
use crate::types::{
    Destination, PacketSize, PayloadPattern, ProbeIdentity, Sequence, TimeToLive, TraceId,
};
use crate::wait::{Clock, SystemClock};
use std::net::Ipv4Addr;
use std::time::Duration;
use tracing::instrument;

/// An ICMP echo traceroute.
///
/// Build with [`Builder`](crate::Builder).
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Tracer {
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

impl Tracer {
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub(crate) const fn new(
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
    ) -> Self {
        Self {
            destination,
            source_addr,
            trace_identifier,
            sequence,
            first_ttl,
            max_ttl,
            probe_timeout,
            poll_slice,
            packet_size,
            payload_pattern,
            header_mode,
            probe_matching,
        }
    }

    /// Run the trace over raw sockets, calling `handler` for every [`Event`].
    ///
    /// This blocks until the destination replies or every ttl has been
    /// probed. Opening raw sockets needs elevated privileges.
    #[instrument(skip_all, level = "trace")]
    pub fn run_with<F: Fn(&Event)>(&self, handler: F) -> Result<Trace> {
        let source_addr = match self.source_addr {
            Some(addr) => addr,
            None => SourceAddr::discover::<SocketImpl>(self.destination)?,
        };
        tracing::debug!(%source_addr, destination = %self.destination);
        let mut channel = Channel::<SocketImpl>::connect(&self.channel_config())?;
        self.run_engine(source_addr, &mut channel, &SystemClock, handler)
    }

    /// Run the trace over the given network and clock.
    ///
    /// No source address is discovered. If none was configured the probe
    /// carries `0.0.0.0` and the kernel fills in the source.
    #[instrument(skip_all, level = "trace")]
    pub fn run_on<N: Network, C: Clock, F: Fn(&Event)>(
        &self,
        network: &mut N,
        clock: &C,
        handler: F,
    ) -> Result<Trace> {
        let source_addr = self.source_addr.unwrap_or(Ipv4Addr::UNSPECIFIED);
        self.run_engine(source_addr, network, clock, handler)
    }

    fn run_engine<N: Network, C: Clock, F: Fn(&Event)>(
        &self,
        source_addr: Ipv4Addr,
        network: &mut N,
        clock: &C,
        handler: F,
    ) -> Result<Trace> {
        let codec = ProbeCodec::new(self.codec_config(source_addr))?;
        Engine::new(self.engine_config(), codec, handler).run(network, clock)
    }

    #[must_use]
    pub const fn destination(&self) -> Destination {
        self.destination
    }

    #[must_use]
    pub const fn source_addr(&self) -> Option<Ipv4Addr> {
        self.source_addr
    }

    #[must_use]
    pub const fn trace_identifier(&self) -> TraceId {
        self.trace_identifier
    }

    #[must_use]
    pub const fn sequence(&self) -> Sequence {
        self.sequence
    }

    #[must_use]
    pub const fn first_ttl(&self) -> TimeToLive {
        self.first_ttl
    }

    #[must_use]
    pub const fn max_ttl(&self) -> TimeToLive {
        self.max_ttl
    }

    #[must_use]
    pub const fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    #[must_use]
    pub const fn poll_slice(&self) -> Duration {
        self.poll_slice
    }

    #[must_use]
    pub const fn packet_size(&self) -> PacketSize {
        self.packet_size
    }

    #[must_use]
    pub const fn payload_pattern(&self) -> PayloadPattern {
        self.payload_pattern
    }

    #[must_use]
    pub const fn header_mode(&self) -> HeaderMode {
        self.header_mode
    }

    #[must_use]
    pub const fn probe_matching(&self) -> ProbeMatching {
        self.probe_matching
    }

    const fn channel_config(&self) -> ChannelConfig {
        ChannelConfig {
            destination: self.destination,
            header_mode: self.header_mode,
        }
    }

    const fn codec_config(&self, source_addr: Ipv4Addr) -> CodecConfig {
        CodecConfig {
            source_addr,
            destination: self.destination,
            packet_size: self.packet_size,
            payload_pattern: self.payload_pattern,
            header_mode: self.header_mode,
        }
    }

    const fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            destination: self.destination,
            identity: ProbeIdentity::new(self.trace_identifier, self.sequence),
            first_ttl: self.first_ttl,
            max_ttl: self.max_ttl,
            probe_timeout: self.probe_timeout,
            poll_slice: self.poll_slice,
            probe_matching: self.probe_matching,
        }
    }
}
