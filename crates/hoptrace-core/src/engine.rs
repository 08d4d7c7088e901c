use crate::classify::{classify, Classification};
use crate::codec::ProbeCodec;
use crate::config::EngineConfig;
use crate::constants::{MAX_PACKET_SIZE, RECV_BUFFER_SIZE};
use crate::error::{Error, Result};
use crate::net::Network;
use crate::types::{Destination, TimeToLive};
use crate::wait::{bounded_wait, Clock, WaitOutcome};
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};
use tracing::instrument;

/// A notification published as the trace progresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A router replied that the probe for `ttl` expired.
    Hop {
        ttl: TimeToLive,
        addr: Ipv4Addr,
        rtt: Duration,
    },
    /// No reply arrived for `ttl` before the probe timeout.
    NoReply { ttl: TimeToLive },
    /// The destination replied to the probe for `ttl`.
    Reached {
        ttl: TimeToLive,
        addr: Ipv4Addr,
        rtt: Duration,
    },
    /// Every ttl up to `max_ttl` was probed without reaching the destination.
    Exhausted {
        destination: Destination,
        max_ttl: TimeToLive,
    },
}

/// How a trace ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Reached,
    Exhausted,
}

/// The result of probing a single ttl.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HopResult {
    pub ttl: TimeToLive,
    /// The address which replied, if any.
    pub responder: Option<Ipv4Addr>,
    pub rtt: Option<Duration>,
}

/// A summary of a completed trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    pub destination: Destination,
    pub outcome: Outcome,
    /// One entry per ttl probed, in ttl order.
    pub hops: Vec<HopResult>,
    pub probes_sent: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitingTtl(TimeToLive),
    Reached,
    Exhausted,
}

/// The reply, if any, to a single probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reply {
    Hop(Ipv4Addr, Duration),
    Reached(Ipv4Addr, Duration),
    Timeout,
}

/// Probe one ttl at a time until the destination replies or the ttl range is
/// exhausted.
#[derive(Debug, Clone)]
pub struct Engine<F> {
    config: EngineConfig,
    codec: ProbeCodec,
    publish: F,
}

impl<F: Fn(&Event)> Engine<F> {
    #[instrument(skip_all, level = "trace")]
    pub fn new(config: EngineConfig, codec: ProbeCodec, publish: F) -> Self {
        tracing::debug!(?config);
        Self {
            config,
            codec,
            publish,
        }
    }

    /// Run the trace to completion.
    ///
    /// Only a failure to send a probe, or of the transport itself, ends the
    /// trace early.
    #[instrument(skip(self, network, clock), level = "trace")]
    pub fn run<N: Network, C: Clock>(&self, network: &mut N, clock: &C) -> Result<Trace> {
        let mut hops = Vec::new();
        let mut state = self.initial_state();
        let outcome = loop {
            state = match state {
                State::AwaitingTtl(ttl) => {
                    let reply = self.probe(network, clock, ttl)?;
                    hops.push(hop_result(ttl, reply));
                    self.transition(ttl, reply)
                }
                State::Reached => break Outcome::Reached,
                State::Exhausted => break Outcome::Exhausted,
            };
        };
        Ok(Trace {
            destination: self.config.destination,
            outcome,
            probes_sent: hops.len(),
            hops,
        })
    }

    fn initial_state(&self) -> State {
        if self.config.first_ttl > self.config.max_ttl {
            self.exhaust()
        } else {
            State::AwaitingTtl(self.config.first_ttl)
        }
    }

    fn transition(&self, ttl: TimeToLive, reply: Reply) -> State {
        match reply {
            Reply::Reached(addr, rtt) => {
                (self.publish)(&Event::Reached { ttl, addr, rtt });
                State::Reached
            }
            Reply::Hop(addr, rtt) => {
                (self.publish)(&Event::Hop { ttl, addr, rtt });
                self.advance(ttl)
            }
            Reply::Timeout => {
                (self.publish)(&Event::NoReply { ttl });
                self.advance(ttl)
            }
        }
    }

    fn advance(&self, ttl: TimeToLive) -> State {
        if ttl >= self.config.max_ttl {
            self.exhaust()
        } else {
            State::AwaitingTtl(ttl + TimeToLive(1))
        }
    }

    fn exhaust(&self) -> State {
        (self.publish)(&Event::Exhausted {
            destination: self.config.destination,
            max_ttl: self.config.max_ttl,
        });
        State::Exhausted
    }

    /// Send the probe for `ttl` and wait for a reply or the probe timeout.
    #[instrument(skip(self, network, clock), level = "trace")]
    fn probe<N: Network, C: Clock>(
        &self,
        network: &mut N,
        clock: &C,
        ttl: TimeToLive,
    ) -> Result<Reply> {
        let mut probe_buf = [0_u8; MAX_PACKET_SIZE];
        let packet = self
            .codec
            .build_probe(&mut probe_buf, ttl, self.config.identity)?;
        network
            .send(ttl, packet)
            .map_err(|source| Error::SendFailed { ttl: ttl.0, source })?;
        let sent = clock.now();
        let deadline = sent + self.config.probe_timeout;
        loop {
            match bounded_wait(network, clock, deadline, self.config.poll_slice)? {
                WaitOutcome::DataReady => {
                    if let Some(reply) = self.recv_reply(network, clock, sent) {
                        return Ok(reply);
                    }
                }
                WaitOutcome::SliceTimeout => {}
                WaitOutcome::DeadlineExceeded => {
                    tracing::debug!(ttl = ttl.0, "no reply before deadline");
                    return Ok(Reply::Timeout);
                }
            }
        }
    }

    /// Read and classify one datagram.
    ///
    /// Returns `None` for anything which does not answer the probe in flight,
    /// including datagrams which cannot be read or decoded.
    fn recv_reply<N: Network, C: Clock>(
        &self,
        network: &mut N,
        clock: &C,
        sent: Instant,
    ) -> Option<Reply> {
        let mut buf = [0_u8; RECV_BUFFER_SIZE];
        let bytes_read = match network.recv(&mut buf) {
            Ok(bytes_read) => bytes_read,
            Err(err) => {
                tracing::warn!(%err, "failed to read datagram");
                return None;
            }
        };
        let parsed = match ProbeCodec::parse_reply(&buf[..bytes_read]) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::warn!(%err, bytes_read, "discarding malformed datagram");
                return None;
            }
        };
        let rtt = clock.now().saturating_duration_since(sent);
        match classify(&parsed, self.config.identity, self.config.probe_matching) {
            Classification::DestinationReached => Some(Reply::Reached(parsed.source, rtt)),
            Classification::IntermediateHop => Some(Reply::Hop(parsed.source, rtt)),
            Classification::Irrelevant => {
                tracing::debug!(?parsed, "ignoring irrelevant datagram");
                None
            }
        }
    }
}

const fn hop_result(ttl: TimeToLive, reply: Reply) -> HopResult {
    match reply {
        Reply::Hop(addr, rtt) | Reply::Reached(addr, rtt) => HopResult {
            ttl,
            responder: Some(addr),
            rtt: Some(rtt),
        },
        Reply::Timeout => HopResult {
            ttl,
            responder: None,
            rtt: None,
        },
    }
}
