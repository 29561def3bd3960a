//! This module contains the deadline capability that bounds all long-running
//! generation steps.
//!
//! A [Deadline] combines a time budget with a [Clock] that measures elapsed
//! time. It is created once per request and handed down to every component
//! that can do unbounded work. Those components poll it cooperatively before
//! starting a unit of work; there is no preemptive cancellation. Once the
//! budget is exhausted, the deadline stays breached for the rest of the
//! request, it is never reset.
//!
//! The clock is an explicit trait so that tests can simulate an already
//! expired deadline without real wall-clock waits.

use crate::error::{GenerationError, GenerationResult};

use std::time::{Duration, Instant};

/// A trait for types that measure the time elapsed since the start of a
/// request. The default implementation is [MonotonicClock]; tests may provide
/// a fake that reports any elapsed time they like.
pub trait Clock {

    /// The time elapsed since the reference point of this clock, typically
    /// the moment the request started.
    fn elapsed(&self) -> Duration;
}

/// A [Clock] backed by [Instant], measuring real monotonic time since its
/// creation.
pub struct MonotonicClock {
    start: Instant
}

impl MonotonicClock {

    /// Creates a new monotonic clock whose reference point is the moment of
    /// this call.
    pub fn start() -> MonotonicClock {
        MonotonicClock {
            start: Instant::now()
        }
    }
}

impl Clock for MonotonicClock {
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// A single wall-clock budget established at request start. All components
/// that can do unbounded work consult it via [Deadline::check] before each
/// unit of work and abort with [GenerationError::Timeout] on breach.
pub struct Deadline<'clock> {
    clock: &'clock dyn Clock,
    budget: Duration
}

impl<'clock> Deadline<'clock> {

    /// Creates a new deadline with the given time budget, measured by the
    /// given clock.
    pub fn new(clock: &'clock dyn Clock, budget: Duration)
            -> Deadline<'clock> {
        Deadline {
            clock,
            budget
        }
    }

    /// Creates a new deadline with a budget given in milliseconds, measured
    /// by the given clock.
    pub fn from_millis(clock: &'clock dyn Clock, budget_ms: u64)
            -> Deadline<'clock> {
        Deadline::new(clock, Duration::from_millis(budget_ms))
    }

    /// Indicates whether the budget has been exhausted.
    pub fn is_breached(&self) -> bool {
        self.clock.elapsed() >= self.budget
    }

    /// Returns an error if the budget has been exhausted and `Ok(())`
    /// otherwise. Components call this before starting a unit of work.
    ///
    /// # Errors
    ///
    /// `GenerationError::Timeout` if the budget has been exhausted.
    pub fn check(&self) -> GenerationResult<()> {
        if self.is_breached() {
            Err(GenerationError::Timeout)
        }
        else {
            Ok(())
        }
    }
}
