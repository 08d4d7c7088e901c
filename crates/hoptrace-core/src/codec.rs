use crate::config::{CodecConfig, HeaderMode};
use crate::constants::{IPV4_HEADER_SIZE, MAX_PACKET_SIZE, MIN_PACKET_SIZE};
use crate::error::{Error, Result};
use crate::types::{ProbeIdentity, Sequence, TimeToLive, TraceId};
use hoptrace_packet::checksum::icmp_ipv4_checksum;
use hoptrace_packet::icmpv4::echo::EchoPacket;
use hoptrace_packet::icmpv4::time_exceeded::TimeExceededPacket;
use hoptrace_packet::icmpv4::{IcmpCode, IcmpPacket, IcmpType};
use hoptrace_packet::ipv4::{Ipv4Packet, DONT_FRAGMENT};
use hoptrace_packet::IpProtocol;
use std::net::Ipv4Addr;
use tracing::instrument;

/// A decoded incoming `ICMP` datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedReply {
    /// The address which sent the datagram.
    pub source: Ipv4Addr,
    /// The length of the outer `IPv4` header in bytes.
    pub ip_header_length: usize,
    pub icmp_type: IcmpType,
    pub icmp_code: IcmpCode,
    /// The identity of the echo request this datagram refers to, when it can
    /// be recovered.
    pub identity: Option<ProbeIdentity>,
}

/// Builds outgoing probes and decodes incoming datagrams.
#[derive(Debug, Clone, Copy)]
pub struct ProbeCodec {
    config: CodecConfig,
}

impl ProbeCodec {
    /// Create a codec, validating the configured packet size.
    pub fn new(config: CodecConfig) -> Result<Self> {
        let packet_size = usize::from(config.packet_size.0);
        if (MIN_PACKET_SIZE..=MAX_PACKET_SIZE).contains(&packet_size) {
            Ok(Self { config })
        } else {
            Err(Error::InvalidPacketSize(packet_size))
        }
    }

    #[must_use]
    pub const fn header_mode(&self) -> HeaderMode {
        self.config.header_mode
    }

    /// The number of bytes handed to the transport for each probe.
    #[must_use]
    pub fn probe_len(&self) -> usize {
        match self.config.header_mode {
            HeaderMode::Included => usize::from(self.config.packet_size.0),
            HeaderMode::Kernel => usize::from(self.config.packet_size.0) - IPV4_HEADER_SIZE,
        }
    }

    /// Build the probe for `ttl` into `buf`.
    ///
    /// In [`HeaderMode::Included`] the probe is a complete `IPv4` datagram,
    /// otherwise it is the `ICMP` echo request alone.
    #[instrument(skip(self, buf), level = "trace")]
    pub fn build_probe<'a>(
        &self,
        buf: &'a mut [u8],
        ttl: TimeToLive,
        identity: ProbeIdentity,
    ) -> Result<&'a [u8]> {
        let probe_len = self.probe_len();
        if buf.len() < probe_len {
            return Err(Error::InvalidPacketSize(probe_len));
        }
        let probe = &mut buf[..probe_len];
        probe.fill(0);
        match self.config.header_mode {
            HeaderMode::Included => {
                let mut icmp_buf = [0_u8; MAX_PACKET_SIZE];
                let icmp = self.make_echo_request_icmp_packet(
                    &mut icmp_buf[..probe_len - IPV4_HEADER_SIZE],
                    identity.identifier,
                    identity.sequence,
                )?;
                self.make_ipv4_packet(probe, ttl, icmp.packet())?;
            }
            HeaderMode::Kernel => {
                self.make_echo_request_icmp_packet(probe, identity.identifier, identity.sequence)?;
            }
        }
        Ok(probe)
    }

    /// Decode an incoming datagram, including its `IPv4` header.
    ///
    /// The `ICMP` message is located from the IHL field. Datagrams too short
    /// to hold an `IPv4` header and an `ICMP` header fail with
    /// [`Error::MalformedPacket`].
    pub fn parse_reply(buf: &[u8]) -> Result<ParsedReply> {
        let ipv4 = Ipv4Packet::new_view(buf)?;
        let ip_header_length = ipv4.header_len_bytes()?;
        let icmp = IcmpPacket::new_view(ipv4.payload())?;
        let icmp_type = icmp.get_icmp_type();
        let identity = match icmp_type {
            IcmpType::EchoReply => {
                let echo = EchoPacket::new_view(icmp.packet())?;
                Some(ProbeIdentity::new(
                    TraceId(echo.get_identifier()),
                    Sequence(echo.get_sequence()),
                ))
            }
            IcmpType::TimeExceeded | IcmpType::DestinationUnreachable => {
                embedded_identity(icmp.packet())
            }
            _ => None,
        };
        Ok(ParsedReply {
            source: ipv4.get_source(),
            ip_header_length,
            icmp_type,
            icmp_code: icmp.get_icmp_code(),
            identity,
        })
    }

    /// Create an ICMP `EchoRequest` packet filling the whole of `icmp_buf`.
    fn make_echo_request_icmp_packet<'a>(
        &self,
        icmp_buf: &'a mut [u8],
        identifier: TraceId,
        sequence: Sequence,
    ) -> Result<EchoPacket<'a>> {
        let mut icmp = EchoPacket::new(icmp_buf)?;
        icmp.set_icmp_type(IcmpType::EchoRequest);
        icmp.set_icmp_code(IcmpCode(0));
        icmp.set_identifier(identifier.0);
        icmp.set_sequence(sequence.0);
        icmp.fill_payload(self.config.payload_pattern.0);
        icmp.set_checksum(icmp_ipv4_checksum(icmp.packet()));
        Ok(icmp)
    }

    /// Create an `Ipv4Packet` filling the whole of `ipv4_buf`.
    ///
    /// The header checksum is left zero for the kernel to fill.
    fn make_ipv4_packet<'a>(
        &self,
        ipv4_buf: &'a mut [u8],
        ttl: TimeToLive,
        payload: &[u8],
    ) -> Result<Ipv4Packet<'a>> {
        let total_length = ipv4_buf.len() as u16;
        let mut ipv4 = Ipv4Packet::new(ipv4_buf)?;
        ipv4.set_version(4);
        ipv4.set_header_length(5);
        ipv4.set_total_length(total_length);
        ipv4.set_ttl(ttl.0);
        ipv4.set_protocol(IpProtocol::Icmp);
        ipv4.set_source(self.config.source_addr);
        ipv4.set_destination(self.config.destination.addr());
        ipv4.set_flags_and_fragment_offset(DONT_FRAGMENT);
        ipv4.set_payload(payload);
        Ok(ipv4)
    }
}

/// Recover the identity of the echo request embedded in an `ICMP` error message.
fn embedded_identity(icmp_buf: &[u8]) -> Option<ProbeIdentity> {
    let packet = TimeExceededPacket::new_view(icmp_buf).ok()?;
    let nested_ipv4 = Ipv4Packet::new_view(packet.payload()).ok()?;
    if nested_ipv4.get_protocol() != IpProtocol::Icmp {
        return None;
    }
    nested_ipv4.header_len_bytes().ok()?;
    let echo = EchoPacket::new_view(nested_ipv4.payload()).ok()?;
    (echo.get_icmp_type() == IcmpType::EchoRequest).then(|| {
        ProbeIdentity::new(
            TraceId(echo.get_identifier()),
            Sequence(echo.get_sequence()),
        )
    })
}
