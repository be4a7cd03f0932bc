//! Concurrency limiter for in-flight HTTP attempts
//!
//! One limiter per executor. Every attempt holds a slot while it is on the
//! network; the slot is released when the guard drops, on every exit path.

use super::config::ConcurrencyConfig;
use log::trace;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tokio::sync::{AcquireError, Semaphore, SemaphorePermit};

/// Semaphore-backed ceiling on simultaneously in-flight attempts
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    counters: Arc<LimiterCounters>,
    max_in_flight: usize,
}

#[derive(Debug, Default)]
struct LimiterCounters {
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    acquisitions: AtomicU64,
}

/// Held for the duration of one attempt
#[derive(Debug)]
pub struct InFlight<'a> {
    _permit: SemaphorePermit<'a>,
    counters: &'a LimiterCounters,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.counters.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ConcurrencyLimiter {
    pub fn new(config: &ConcurrencyConfig) -> Self {
        let max_in_flight = config.max_in_flight.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(max_in_flight)),
            counters: Arc::new(LimiterCounters::default()),
            max_in_flight,
        }
    }

    /// Wait for a free slot
    pub async fn acquire(&self) -> Result<InFlight<'_>, AcquireError> {
        let permit = self.semaphore.acquire().await?;

        let now = self.counters.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        self.counters.acquisitions.fetch_add(1, Ordering::SeqCst);
        trace!("Concurrency limiter: slot acquired, {}/{} in flight", now, self.max_in_flight);

        Ok(InFlight {
            _permit: permit,
            counters: &self.counters,
        })
    }

    pub fn stats(&self) -> LimiterStats {
        LimiterStats {
            max_in_flight: self.max_in_flight,
            in_flight: self.counters.in_flight.load(Ordering::SeqCst),
            peak_in_flight: self.counters.peak_in_flight.load(Ordering::SeqCst),
            acquisitions: self.counters.acquisitions.load(Ordering::SeqCst),
        }
    }
}

/// Limiter statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimiterStats {
    /// Configured ceiling
    pub max_in_flight: usize,
    /// Slots held right now
    pub in_flight: usize,
    /// Highest number of slots ever held at once
    pub peak_in_flight: usize,
    /// Total slots handed out
    pub acquisitions: u64,
}
