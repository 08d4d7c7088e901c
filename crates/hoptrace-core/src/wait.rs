use crate::error::Result;
use crate::net::Network;
use std::time::{Duration, Instant};
use tracing::instrument;

/// A source of the current time.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// The system monotonic clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// The result of a single bounded wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// A datagram is ready to be read.
    DataReady,
    /// Nothing arrived within the slice but the deadline has not passed.
    SliceTimeout,
    /// The deadline has passed.
    DeadlineExceeded,
}

/// Wait for the network to become readable for at most `slice`, never
/// waiting past `deadline`.
#[instrument(skip(network, clock), level = "trace")]
pub fn bounded_wait<N: Network, C: Clock>(
    network: &mut N,
    clock: &C,
    deadline: Instant,
    slice: Duration,
) -> Result<WaitOutcome> {
    let remaining = deadline.saturating_duration_since(clock.now());
    if remaining.is_zero() {
        return Ok(WaitOutcome::DeadlineExceeded);
    }
    if network.is_readable(slice.min(remaining))? {
        Ok(WaitOutcome::DataReady)
    } else {
        Ok(WaitOutcome::SliceTimeout)
    }
}
