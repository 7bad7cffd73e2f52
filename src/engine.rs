//! Delegation decision engine.
//!
//! [`DecisionEngine::decide`] inspects a call's force flag and provenance, consults the session
//! cache, and either answers immediately or emits a [`DelegationDescriptor`]. A non-forced call
//! sequence settles in at most two decisions: delegate, then terminal. Forced looping never
//! settles on its own and must be bounded by the caller.

mod call;
mod metrics;

pub use call::DelegationCall;
pub use metrics::DecisionMetrics;

// self
use crate::{
	_prelude::*,
	auth::{ExternalOutcome, Provenance},
	cache::{CacheEntry, MemorySessionCache, SessionCache, SessionKey},
	config::HandshakeConfig,
	delegation::DelegationDescriptor,
	error::ConfigError,
	obs::{self, DecisionLabel, HandshakeSpan, HandshakeStage},
};

/// Result of one engine evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecisionOutcome {
	/// The call is answered; no external round trip is needed.
	Terminal(TerminalResult),
	/// The host must authenticate the caller with the named authenticator and resubmit.
	Delegate(DelegationDescriptor),
}
impl DecisionOutcome {
	/// Returns `true` for [`DecisionOutcome::Delegate`].
	pub fn is_delegate(&self) -> bool {
		matches!(self, Self::Delegate(_))
	}
}

/// Why a call terminated successfully.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalBasis {
	/// A live session entry already covered the caller.
	CacheHit,
	/// The external authenticator vouched for the caller in the current round trip.
	DelegationCompleted,
}

/// Successful terminal answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerminalResult {
	/// Why the call terminated.
	pub basis: TerminalBasis,
	/// Session entry that backs the answer, when one was read or written.
	pub entry: Option<CacheEntry>,
}

/// Decides between answering a call and delegating it.
///
/// The engine holds no per-handshake state; continuity between the two invocations of a
/// handshake lives in the session cache and the host-supplied provenance.
#[derive(Clone)]
pub struct DecisionEngine {
	cache: Arc<dyn SessionCache>,
	ttl: Duration,
	metrics: Arc<DecisionMetrics>,
}
impl DecisionEngine {
	/// Creates an engine over the provided cache, storing validated sessions for `ttl`.
	pub fn new(cache: Arc<dyn SessionCache>, ttl: Duration) -> Result<Self> {
		if !ttl.is_positive() {
			return Err(ConfigError::NonPositiveTtl.into());
		}

		Ok(Self { cache, ttl, metrics: Default::default() })
	}

	/// Creates an engine backed by a [`MemorySessionCache`] sized from `config`.
	pub fn from_config(config: &HandshakeConfig) -> Result<Self> {
		config.validate()?;

		Self::new(Arc::new(MemorySessionCache::new(config.cache_capacity)), config.cache_ttl)
	}

	/// Session cache consulted by the engine.
	pub fn cache(&self) -> &Arc<dyn SessionCache> {
		&self.cache
	}

	/// Lifetime of the entries the engine writes.
	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	/// Decision counters.
	pub fn metrics(&self) -> &DecisionMetrics {
		&self.metrics
	}

	/// [`decide_at`](Self::decide_at) using the current UTC instant.
	pub fn decide(&self, call: &DelegationCall) -> Result<DecisionOutcome> {
		self.decide_at(call, OffsetDateTime::now_utc())
	}

	/// Produces exactly one outcome for `call`.
	///
	/// Fails with [`Error::InvalidRequest`] when the accessor or base path is empty, or when a
	/// delegated call arrives with a rejected external outcome. Failures never touch the cache.
	pub fn decide_at(&self, call: &DelegationCall, now: OffsetDateTime) -> Result<DecisionOutcome> {
		let _span = HandshakeSpan::new(HandshakeStage::Decide, &call.accessor).entered();
		let descriptor = call.descriptor().map_err(|err| self.reject(err.into()))?;

		if call.force_loop {
			return Ok(self.delegate(descriptor, DecisionLabel::ForcedDelegate));
		}

		let key =
			SessionKey::new(descriptor.accessor(), descriptor.target_path(), call.caller_identity());

		match call.provenance {
			Provenance::Internal => match self.cache.get_at(&key, now) {
				Some(entry) => Ok(self.terminal(TerminalBasis::CacheHit, Some(entry), now)),
				None => Ok(self.delegate(descriptor, DecisionLabel::Delegate)),
			},
			Provenance::Delegated => {
				if let Some(ExternalOutcome::Rejected { reason }) = &call.external_outcome {
					return Err(self.reject(Error::invalid_request(format!(
						"delegated provenance reported after a rejected external authentication ({reason})"
					))));
				}

				let entry = self.cache.put_at(key, self.ttl, now);

				Ok(self.terminal(TerminalBasis::DelegationCompleted, entry, now))
			},
		}
	}

	fn delegate(&self, descriptor: DelegationDescriptor, label: DecisionLabel) -> DecisionOutcome {
		self.record(label);

		obs::debug_event!(
			decision = %label,
			accessor = %descriptor.accessor(),
			target_path = descriptor.target_path(),
			"Delegating authentication."
		);

		DecisionOutcome::Delegate(descriptor)
	}

	#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
	fn terminal(
		&self,
		basis: TerminalBasis,
		entry: Option<CacheEntry>,
		now: OffsetDateTime,
	) -> DecisionOutcome {
		let label = match basis {
			TerminalBasis::CacheHit => DecisionLabel::CacheHit,
			TerminalBasis::DelegationCompleted => DecisionLabel::Completed,
		};

		self.record(label);

		let remaining = entry.as_ref().map(|entry| entry.remaining_at(now));

		obs::debug_event!(
			decision = %label,
			remaining = ?remaining,
			"Answering without delegation."
		);

		DecisionOutcome::Terminal(TerminalResult { basis, entry })
	}

	fn reject(&self, err: Error) -> Error {
		self.record(DecisionLabel::Rejected);

		obs::debug_event!(decision = %DecisionLabel::Rejected, error = %err, "Rejecting call.");

		err
	}

	fn record(&self, label: DecisionLabel) {
		self.metrics.record(label);
		obs::record_decision(label);
	}
}
impl Debug for DecisionEngine {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("DecisionEngine")
			.field("ttl", &self.ttl)
			.field("cache_capacity", &self.cache.capacity())
			.finish()
	}
}
