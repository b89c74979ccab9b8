//! Shared polling arithmetic for every wait.
//!
//! A [`Deadline`] is fixed when a wait starts. Chained sub-waits get a slice
//! of what is left at the moment they start, never a fresh full timeout, so
//! the outer bound holds no matter how slow the earlier steps were.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone, Copy)]
pub struct Deadline {
	started: Instant,
	budget: Duration,
}

impl Deadline {
	pub fn after(budget: Duration) -> Self {
		Self {
			started: Instant::now(),
			budget,
		}
	}

	pub fn budget(&self) -> Duration {
		self.budget
	}

	pub fn elapsed(&self) -> Duration {
		self.started.elapsed()
	}

	pub fn remaining(&self) -> Duration {
		self.budget.saturating_sub(self.elapsed())
	}

	pub fn is_expired(&self) -> bool {
		self.remaining().is_zero()
	}

	/// Deadline for a chained sub-wait: half of the time left right now.
	pub fn half(&self) -> Deadline {
		Deadline::after(self.remaining() / 2)
	}

	/// Deadline for a sub-step that wants `limit` but must fit in what is left.
	pub fn capped(&self, limit: Duration) -> Deadline {
		Deadline::after(limit.min(self.remaining()))
	}

	/// Deadline covering everything that is left.
	pub fn rest(&self) -> Deadline {
		Deadline::after(self.remaining())
	}
}

/// Runs `check` every `interval` until it yields a value or `deadline` passes.
///
/// The check always runs at least once, and `None` is only returned once the
/// deadline has fully elapsed.
pub async fn poll_until<F, Fut, T>(interval: Duration, deadline: &Deadline, mut check: F) -> Option<T>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Option<T>>,
{
	loop {
		if let Some(value) = check().await {
			return Some(value);
		}
		let remaining = deadline.remaining();
		if remaining.is_zero() {
			return None;
		}
		tokio::time::sleep(interval.min(remaining)).await;
	}
}

/// Fixed settle delay for UI that has no readiness marker.
pub async fn settle(delay: Duration) {
	if !delay.is_zero() {
		tokio::time::sleep(delay).await;
	}
}
