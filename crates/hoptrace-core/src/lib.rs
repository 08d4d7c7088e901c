//! Hoptrace - an ICMP echo traceroute for `IPv4`.
//!
//! This crate provides the tracing engine used by the `hoptrace` command line
//! tool. A single echo request probe is sent per ttl, starting from the first
//! ttl, and the trace ends as soon as the destination replies or every ttl up
//! to the maximum has been probed.
//!
//! # Example
//!
//! The following example builds and runs a tracer with default configuration
//! and prints every event as it happens:
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use hoptrace_core::Builder;
//!
//! let trace = Builder::new("1.1.1.1".parse()?)
//!     .build()?
//!     .run_with(|event| println!("{event:?}"))?;
//! println!("{:?} after {} probes", trace.outcome, trace.probes_sent);
//! # Ok(())
//! # }
//! ```
//!
//! A tracer can also be run over any [`Network`] with any [`Clock`], see
//! [`Tracer::run_on`].
//!
//! # See Also
//!
//! - [`Builder`] - Build a [`Tracer`].
//! - [`Tracer::run_with`] - Run the tracer over raw sockets.
//! - [`Tracer::run_on`] - Run the tracer over a custom network.
#![deny(unsafe_code)]

mod builder;
mod classify;
mod codec;
mod config;
mod constants;
mod engine;
mod error;
mod net;
mod tracer;
mod types;
mod wait;

pub use builder::Builder;
pub use classify::{classify, Classification};
pub use codec::{ParsedReply, ProbeCodec};
pub use config::{defaults, CodecConfig, HeaderMode, ProbeMatching};
pub use constants::{IPV4_HEADER_SIZE, MAX_PACKET_SIZE, MIN_PACKET_SIZE, RECV_BUFFER_SIZE};
pub use engine::{Event, HopResult, Outcome, Trace};
pub use error::{Error, IoError, IoOperation, IoResult, Result};
pub use net::Network;
pub use tracer::Tracer;
pub use types::{
    Destination, PacketSize, PayloadPattern, ProbeIdentity, Sequence, TimeToLive, TraceId,
};
pub use wait::{bounded_wait, Clock, SystemClock, WaitOutcome};
