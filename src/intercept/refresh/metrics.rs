// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for refresh coordination activity.
#[derive(Debug, Default)]
pub struct RefreshMetrics {
	attempts: AtomicU64,
	successes: AtomicU64,
	failures: AtomicU64,
	gated: AtomicU64,
	queue_rejections: AtomicU64,
}
impl RefreshMetrics {
	/// Returns the total number of refresh requests received by the coordinator.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of waiters that resolved with a refreshed credential. Gated
	/// short-circuits are counted separately.
	pub fn successes(&self) -> u64 {
		self.successes.load(Ordering::Relaxed)
	}

	/// Returns the number of requests that observed a failed refresh.
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	/// Returns the number of requests short-circuited by generation gating.
	pub fn gated(&self) -> u64 {
		self.gated.load(Ordering::Relaxed)
	}

	/// Returns the number of requests refused because the waiter queue was at capacity.
	pub fn queue_rejections(&self) -> u64 {
		self.queue_rejections.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.successes.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failures.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_gated(&self) {
		self.gated.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_queue_rejection(&self) {
		self.queue_rejections.fetch_add(1, Ordering::Relaxed);
	}
}
