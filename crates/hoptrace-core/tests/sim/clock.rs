use hoptrace_core::Clock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A clock which only moves when told to.
///
/// Clones share the same time.
#[derive(Debug, Clone)]
pub struct SimClock {
    start: Instant,
    elapsed_micros: Arc<AtomicU64>,
}

impl SimClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            elapsed_micros: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_micros(self.elapsed_micros.load(Ordering::SeqCst))
    }

    pub fn advance(&self, duration: Duration) {
        self.elapsed_micros
            .fetch_add(duration.as_micros() as u64, Ordering::SeqCst);
    }

    pub fn advance_to(&self, instant: Instant) {
        let target = instant.saturating_duration_since(self.start).as_micros() as u64;
        self.elapsed_micros.fetch_max(target, Ordering::SeqCst);
    }
}

impl Clock for SimClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed()
    }
}
