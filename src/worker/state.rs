//! Counters and stop signal shared by every thread of one search.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Outcome of registering a match against the limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The match is within the limit and must be reported.
    Accepted,
    /// This match pushed the found count past the limit. The stop signal has
    /// been raised and the match is dropped.
    LimitExceeded,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub generated: u64,
    pub found: u64,
    pub elapsed: Duration,
}

impl Snapshot {
    /// Average derivations per second since the search started.
    pub fn keys_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.generated as f64 / secs
        } else {
            0.0
        }
    }
}

/// Shared search state, passed to every thread behind an `Arc`.
///
/// Each field is updated with a single atomic read-modify-write; no invariant
/// spans two fields. `found` may therefore run past `limit` by one per
/// thread that was racing when the limit was hit, but only increments that
/// land at or below `limit` are ever reported.
#[derive(Debug)]
pub struct SearchState {
    generated: AtomicU64,
    found: AtomicU64,
    limit: u64,
    stopped: AtomicBool,
    start_time: Instant,
}

impl SearchState {
    pub fn new(limit: u64) -> Self {
        Self {
            generated: AtomicU64::new(0),
            found: AtomicU64::new(0),
            limit,
            stopped: AtomicBool::new(false),
            start_time: Instant::now(),
        }
    }

    #[inline]
    pub fn add_generated(&self, count: u64) {
        self.generated.fetch_add(count, Ordering::Relaxed);
    }

    /// Counts a match and decides whether it may be reported.
    ///
    /// The increment and the limit check use the value returned by the same
    /// `fetch_add`, so at most `limit` callers ever see `Accepted`.
    #[inline]
    pub fn record_match(&self) -> Admission {
        let found = self.found.fetch_add(1, Ordering::AcqRel) + 1;
        if found > self.limit {
            self.stop();
            Admission::LimitExceeded
        } else {
            Admission::Accepted
        }
    }

    /// Raises the one-shot stop signal. Calling it again has no effect.
    #[inline]
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    pub fn total_generated(&self) -> u64 {
        self.generated.load(Ordering::Relaxed)
    }

    pub fn total_found(&self) -> u64 {
        self.found.load(Ordering::Relaxed)
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            generated: self.total_generated(),
            found: self.total_found(),
            elapsed: self.elapsed(),
        }
    }
}
