// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::obs::DecisionLabel;

/// Thread-safe counters for engine decisions.
#[derive(Debug, Default)]
pub struct DecisionMetrics {
	delegations: AtomicU64,
	forced: AtomicU64,
	cache_hits: AtomicU64,
	completions: AtomicU64,
	rejections: AtomicU64,
}
impl DecisionMetrics {
	/// Returns the number of delegations emitted for cache misses.
	pub fn delegations(&self) -> u64 {
		self.delegations.load(Ordering::Relaxed)
	}

	/// Returns the number of delegations emitted because the caller forced looping.
	pub fn forced_delegations(&self) -> u64 {
		self.forced.load(Ordering::Relaxed)
	}

	/// Returns the number of calls answered from the session cache.
	pub fn cache_hits(&self) -> u64 {
		self.cache_hits.load(Ordering::Relaxed)
	}

	/// Returns the number of completed round trips.
	pub fn completions(&self) -> u64 {
		self.completions.load(Ordering::Relaxed)
	}

	/// Returns the number of rejected calls.
	pub fn rejections(&self) -> u64 {
		self.rejections.load(Ordering::Relaxed)
	}

	pub(crate) fn record(&self, label: DecisionLabel) {
		let counter = match label {
			DecisionLabel::Delegate => &self.delegations,
			DecisionLabel::ForcedDelegate => &self.forced,
			DecisionLabel::CacheHit => &self.cache_hits,
			DecisionLabel::Completed => &self.completions,
			DecisionLabel::Rejected => &self.rejections,
		};

		counter.fetch_add(1, Ordering::Relaxed);
	}
}
