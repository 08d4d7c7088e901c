use crate::clock::SimClock;
use hoptrace_core::{Clock, IoError, IoResult, Network, TimeToLive};
use hoptrace_packet::checksum::{icmp_ipv4_checksum, ipv4_header_checksum};
use hoptrace_packet::icmpv4::echo::EchoPacket;
use hoptrace_packet::icmpv4::time_exceeded::TimeExceededPacket;
use hoptrace_packet::icmpv4::{IcmpCode, IcmpType};
use hoptrace_packet::ipv4::Ipv4Packet;
use hoptrace_packet::IpProtocol;
use std::collections::VecDeque;
use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::{Duration, Instant};
use tracing::debug;

const IPV4_HEADER_LEN: usize = 20;
const ICMP_HEADER_LEN: usize = 8;

/// The path between the tracer and a destination.
#[derive(Debug, Clone, Default)]
pub struct Route {
    /// The router which answers each ttl, starting from ttl 1.
    ///
    /// `None` is a router which never answers.
    pub hops: Vec<Option<Ipv4Addr>>,
    /// The smallest ttl which reaches the destination, if any.
    pub destination_ttl: Option<u8>,
    /// How long every reply takes to arrive.
    pub latency: Duration,
    /// Datagrams delivered ahead of the reply to every probe.
    pub noise: Vec<Vec<u8>>,
    /// Fail to send the probe for this ttl.
    pub fail_send_ttl: Option<u8>,
}

/// A probe seen by the simulated network.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct SentProbe {
    pub ttl: u8,
    pub identifier: u16,
    pub sequence: u16,
    pub len: usize,
}

/// A network which answers probes from a [`Route`] and moves a [`SimClock`]
/// forward instead of sleeping.
pub struct SimNetwork {
    route: Route,
    clock: SimClock,
    pending: VecDeque<(Instant, Vec<u8>)>,
    sent: Vec<SentProbe>,
}

impl SimNetwork {
    pub fn new(route: Route, clock: SimClock) -> Self {
        Self {
            route,
            clock,
            pending: VecDeque::new(),
            sent: vec![],
        }
    }

    pub fn sent(&self) -> &[SentProbe] {
        &self.sent
    }

    fn respond(&mut self, ttl: u8, probe: &Ipv4Packet<'_>, echo: &EchoPacket<'_>) {
        let now = self.clock.now();
        for datagram in &self.route.noise {
            self.pending.push_back((now, datagram.clone()));
        }
        let source = probe.get_source();
        let destination = probe.get_destination();
        let reply = if self
            .route
            .destination_ttl
            .is_some_and(|destination_ttl| ttl >= destination_ttl)
        {
            Some(echo_reply(
                destination,
                source,
                echo.get_identifier(),
                echo.get_sequence(),
            ))
        } else {
            self.route
                .hops
                .get(usize::from(ttl).saturating_sub(1))
                .copied()
                .flatten()
                .map(|router| time_exceeded(router, source, probe.packet()))
        };
        if let Some(reply) = reply {
            self.pending.push_back((now + self.route.latency, reply));
        }
    }
}

impl Network for SimNetwork {
    fn send(&mut self, ttl: TimeToLive, packet: &[u8]) -> IoResult<()> {
        let ipv4 = Ipv4Packet::new_view(packet).map_err(invalid_probe)?;
        let echo = EchoPacket::new_view(ipv4.payload()).map_err(invalid_probe)?;
        debug!(ttl = ttl.0, id = echo.get_identifier(), "probe sent");
        if self.route.fail_send_ttl == Some(ttl.0) {
            let addr = SocketAddr::V4(SocketAddrV4::new(ipv4.get_destination(), 0));
            return Err(IoError::SendTo(
                io::Error::from(io::ErrorKind::PermissionDenied),
                addr,
            ));
        }
        self.sent.push(SentProbe {
            ttl: ipv4.get_ttl(),
            identifier: echo.get_identifier(),
            sequence: echo.get_sequence(),
            len: packet.len(),
        });
        self.respond(ttl.0, &ipv4, &echo);
        Ok(())
    }

    fn is_readable(&mut self, timeout: Duration) -> IoResult<bool> {
        let now = self.clock.now();
        match self.pending.front() {
            Some((ready_at, _)) if *ready_at <= now + timeout => {
                self.clock.advance_to(*ready_at);
                Ok(true)
            }
            _ => {
                self.clock.advance(timeout);
                Ok(false)
            }
        }
    }

    fn recv(&mut self, buf: &mut [u8]) -> IoResult<usize> {
        match self.pending.pop_front() {
            Some((_, datagram)) => {
                buf[..datagram.len()].copy_from_slice(&datagram);
                Ok(datagram.len())
            }
            None => Ok(0),
        }
    }
}

fn invalid_probe(err: hoptrace_packet::error::Error) -> IoError {
    IoError::SendTo(
        io::Error::new(io::ErrorKind::InvalidInput, err),
        SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0)),
    )
}

/// Wrap an `ICMP` message in an `IPv4` header.
pub fn ipv4_datagram(source: Ipv4Addr, destination: Ipv4Addr, icmp: &[u8]) -> Vec<u8> {
    let mut buf = vec![0_u8; IPV4_HEADER_LEN + icmp.len()];
    let total_length = buf.len() as u16;
    let mut ipv4 = Ipv4Packet::new(&mut buf).unwrap();
    ipv4.set_version(4);
    ipv4.set_header_length(5);
    ipv4.set_total_length(total_length);
    ipv4.set_ttl(64);
    ipv4.set_protocol(IpProtocol::Icmp);
    ipv4.set_source(source);
    ipv4.set_destination(destination);
    ipv4.set_payload(icmp);
    let checksum = ipv4_header_checksum(&ipv4.packet()[..IPV4_HEADER_LEN]);
    ipv4.set_checksum(checksum);
    buf
}

pub fn echo_reply(
    source: Ipv4Addr,
    destination: Ipv4Addr,
    identifier: u16,
    sequence: u16,
) -> Vec<u8> {
    let mut icmp_buf = [0_u8; ICMP_HEADER_LEN];
    let mut echo = EchoPacket::new(&mut icmp_buf).unwrap();
    echo.set_icmp_type(IcmpType::EchoReply);
    echo.set_icmp_code(IcmpCode(0));
    echo.set_identifier(identifier);
    echo.set_sequence(sequence);
    let checksum = icmp_ipv4_checksum(echo.packet());
    echo.set_checksum(checksum);
    ipv4_datagram(source, destination, &icmp_buf)
}

/// A time exceeded message quoting the header and first eight payload bytes
/// of `expired`.
pub fn time_exceeded(source: Ipv4Addr, destination: Ipv4Addr, expired: &[u8]) -> Vec<u8> {
    icmp_error(IcmpType::TimeExceeded, source, destination, expired)
}

pub fn destination_unreachable(
    source: Ipv4Addr,
    destination: Ipv4Addr,
    expired: &[u8],
) -> Vec<u8> {
    icmp_error(IcmpType::DestinationUnreachable, source, destination, expired)
}

fn icmp_error(
    icmp_type: IcmpType,
    source: Ipv4Addr,
    destination: Ipv4Addr,
    expired: &[u8],
) -> Vec<u8> {
    let quoted = &expired[..expired.len().min(IPV4_HEADER_LEN + ICMP_HEADER_LEN)];
    let mut icmp_buf = vec![0_u8; ICMP_HEADER_LEN + quoted.len()];
    let mut icmp = TimeExceededPacket::new(&mut icmp_buf).unwrap();
    icmp.set_icmp_type(icmp_type);
    icmp.set_icmp_code(IcmpCode(0));
    icmp.set_payload(quoted);
    let checksum = icmp_ipv4_checksum(icmp.packet());
    icmp.set_checksum(checksum);
    ipv4_datagram(source, destination, &icmp_buf)
}
