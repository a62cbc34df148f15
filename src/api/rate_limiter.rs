//! Request pacing for the directory API
//!
//! The remote API enforces a small requests-per-second quota shared by every
//! call in a session, token exchanges included. All traffic passes through a
//! single [`RateLimiter`] that spaces admissions at least one interval apart
//! and bounds how many callers may be waiting for admission at once.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use log::debug;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::error::ApiError;

/// Paces requests so at most `requests_per_second` admissions happen per second.
#[derive(Debug)]
pub struct RateLimiter {
    gate: Semaphore,
    interval: Duration,
    last_scheduled: Mutex<Option<Instant>>,
    max_slots: usize,
    admitted: AtomicU64,
}

/// Snapshot of limiter activity.
#[derive(Debug, Clone)]
pub struct RateLimiterStats {
    pub interval: Duration,
    pub available_slots: usize,
    pub max_slots: usize,
    pub total_admitted: u64,
}

impl RateLimiter {
    /// Create a limiter for the given per-second budget.
    ///
    /// A zero budget is a configuration error, not a blocked limiter.
    pub fn new(requests_per_second: u32) -> Result<Self, ApiError> {
        if requests_per_second == 0 {
            return Err(ApiError::InvalidRate);
        }

        Ok(Self {
            gate: Semaphore::new(requests_per_second as usize),
            interval: Duration::from_secs_f64(1.0 / f64::from(requests_per_second)),
            last_scheduled: Mutex::new(None),
            max_slots: requests_per_second as usize,
            admitted: AtomicU64::new(0),
        })
    }

    /// Wait until the caller may send one request.
    ///
    /// Admission takes a gate slot, then sleeps until one pacing interval has
    /// passed since the previous admission. Cancellation aborts either wait
    /// with [`ApiError::Canceled`]; the slot is returned on every exit path.
    pub async fn admit(&self, cancel: &CancellationToken) -> Result<(), ApiError> {
        let _slot = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ApiError::Canceled),
            permit = self.gate.acquire() => permit.expect("admission gate is never closed"),
        };

        let wake_at = self.reserve_slot();
        let now = Instant::now();
        if wake_at > now {
            debug!("Admission paced, waiting {:?} for the next slot", wake_at - now);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ApiError::Canceled),
                _ = tokio::time::sleep_until(wake_at) => {}
            }
        }

        self.admitted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Claim the next pacing slot and return the instant the caller may proceed.
    fn reserve_slot(&self) -> Instant {
        let mut last = self.last_scheduled.lock().unwrap();
        let now = Instant::now();
        let slot = match *last {
            Some(previous) => (previous + self.interval).max(now),
            None => now,
        };
        *last = Some(slot);
        slot
    }

    /// Current number of free admission slots.
    pub fn available_slots(&self) -> usize {
        self.gate.available_permits()
    }

    pub fn stats(&self) -> RateLimiterStats {
        RateLimiterStats {
            interval: self.interval,
            available_slots: self.gate.available_permits(),
            max_slots: self.max_slots,
            total_admitted: self.admitted.load(Ordering::Relaxed),
        }
    }
}
