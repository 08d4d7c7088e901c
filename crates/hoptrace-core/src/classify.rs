use crate::codec::ParsedReply;
use crate::config::ProbeMatching;
use crate::types::ProbeIdentity;
use hoptrace_packet::icmpv4::IcmpType;

/// What an incoming datagram means for the probe in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The destination answered the probe.
    DestinationReached,
    /// A router on the path reported the probe expired.
    IntermediateHop,
    /// Unrelated traffic, keep waiting.
    Irrelevant,
}

/// Classify a decoded datagram against the probe in flight.
///
/// Any `TimeExceeded` code counts as an intermediate hop. With
/// [`ProbeMatching::Strict`] the datagram must also carry the identity of the
/// probe in flight.
#[must_use]
pub fn classify(
    parsed: &ParsedReply,
    expected: ProbeIdentity,
    matching: ProbeMatching,
) -> Classification {
    let candidate = match parsed.icmp_type {
        IcmpType::EchoReply => Classification::DestinationReached,
        IcmpType::TimeExceeded => Classification::IntermediateHop,
        _ => return Classification::Irrelevant,
    };
    match matching {
        ProbeMatching::Lenient => candidate,
        ProbeMatching::Strict if parsed.identity == Some(expected) => candidate,
        ProbeMatching::Strict => Classification::Irrelevant,
    }
}
