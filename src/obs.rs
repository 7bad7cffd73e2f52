//! Optional observability helpers for the handshake.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `delegated_auth.handshake` with the `stage`
//!   field, plus debug events for every decision and cache eviction.
//! - Enable `metrics` to increment the `delegated_auth_decision_total` counter for every decision,
//!   labeled by `decision`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

pub(crate) use self::tracing::debug_event;

// self
use crate::_prelude::*;

/// Call sites that open a handshake span.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandshakeStage {
	/// Decision engine evaluation.
	Decide,
	/// Coordinator invocation.
	Handle,
	/// Host-side driver loop.
	Drive,
}
impl HandshakeStage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			HandshakeStage::Decide => "decide",
			HandshakeStage::Handle => "handle",
			HandshakeStage::Drive => "drive",
		}
	}
}
impl Display for HandshakeStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Decision labels recorded for each engine evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DecisionLabel {
	/// Delegation emitted because no live cache entry existed.
	Delegate,
	/// Delegation emitted because the caller forced looping.
	ForcedDelegate,
	/// Answered from a live cache entry.
	CacheHit,
	/// Answered after a completed round trip; the cache was refreshed.
	Completed,
	/// Call rejected before any decision was made.
	Rejected,
}
impl DecisionLabel {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			DecisionLabel::Delegate => "delegate",
			DecisionLabel::ForcedDelegate => "forced_delegate",
			DecisionLabel::CacheHit => "cache_hit",
			DecisionLabel::Completed => "completed",
			DecisionLabel::Rejected => "rejected",
		}
	}
}
impl Display for DecisionLabel {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
