//! Per-turn deadlines.

use std::future::Future;
use std::time::Duration;

use tokio::time::{timeout_at, Instant};

use crate::error::BrainError;

/// An absolute point in time by which a turn must finish.
///
/// Created once per turn and passed by value to every downstream call so a
/// hung service cannot hold the turn open indefinitely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    /// A deadline `duration` from now.
    pub fn after(duration: Duration) -> Self {
        Self {
            at: Instant::now() + duration,
        }
    }

    /// Whether the deadline has already passed.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.at
    }

    /// Run `future` until it completes or the deadline passes.
    ///
    /// An expired deadline fails without polling `future`, so no request is
    /// sent once the turn is out of time.
    pub async fn run<F>(&self, future: F) -> Result<F::Output, BrainError>
    where
        F: Future,
    {
        if self.is_expired() {
            return Err(BrainError::Timeout);
        }

        timeout_at(self.at, future)
            .await
            .map_err(|_| BrainError::Timeout)
    }
}
