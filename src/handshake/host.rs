//! Reference host driver that runs both phases of the handshake.
//!
//! Hosts that embed the coordinator directly can use [`HandshakeDriver`] as-is, or read it as
//! the canonical sequencing: handle, authenticate on delegation, resubmit with delegated
//! provenance, and never resubmit after a rejection.

// self
use crate::{
	_prelude::*,
	auth::AccessorId,
	engine::DelegationCall,
	handshake::{DelegationInstruction, FinalResponse, HandshakeCoordinator, HandshakeResponse},
	obs::{HandshakeSpan, HandshakeStage},
};

/// Boxed future returned by [`ExternalAuthenticator::authenticate`].
pub type AuthenticatorFuture<'a> =
	Pin<Box<dyn Future<Output = Result<(), AuthenticatorRejection>> + 'a + Send>>;

/// External authentication method invoked by the host between handshake phases.
pub trait ExternalAuthenticator
where
	Self: Send + Sync,
{
	/// Checks the instruction's credential against the authenticator at `instruction.path`.
	fn authenticate<'a>(
		&'a self,
		instruction: &'a DelegationInstruction,
	) -> AuthenticatorFuture<'a>;
}

/// Rejection reported by an [`ExternalAuthenticator`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("{reason}")]
pub struct AuthenticatorRejection {
	/// Authenticator-supplied reason string.
	pub reason: String,
}
impl AuthenticatorRejection {
	/// Creates a rejection with the provided reason.
	pub fn new(reason: impl Into<String>) -> Self {
		Self { reason: reason.into() }
	}
}

/// Authenticators keyed by accessor.
#[derive(Clone, Default)]
pub struct AuthenticatorRegistry(HashMap<AccessorId, Arc<dyn ExternalAuthenticator>>);
impl AuthenticatorRegistry {
	/// Registers (or replaces) the authenticator behind `accessor`.
	pub fn register(
		mut self,
		accessor: AccessorId,
		authenticator: Arc<dyn ExternalAuthenticator>,
	) -> Self {
		self.0.insert(accessor, authenticator);

		self
	}

	/// Looks up the authenticator behind `accessor`.
	pub fn get(&self, accessor: &str) -> Option<&Arc<dyn ExternalAuthenticator>> {
		self.0.get(accessor)
	}
}
impl Debug for AuthenticatorRegistry {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("AuthenticatorRegistry").field(&self.0.keys().collect::<Vec<_>>()).finish()
	}
}

/// Drives calls through the coordinator until they settle.
#[derive(Clone, Debug)]
pub struct HandshakeDriver {
	coordinator: Arc<HandshakeCoordinator>,
	registry: AuthenticatorRegistry,
	max_rounds: usize,
}
impl HandshakeDriver {
	/// Default bound on delegation rounds per call.
	pub const DEFAULT_MAX_ROUNDS: usize = 2;

	/// Creates a driver over the coordinator and registered authenticators.
	pub fn new(coordinator: Arc<HandshakeCoordinator>, registry: AuthenticatorRegistry) -> Self {
		Self { coordinator, registry, max_rounds: Self::DEFAULT_MAX_ROUNDS }
	}

	/// Overrides the bound on delegation rounds; forced loops stop here.
	pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
		self.max_rounds = max_rounds;

		self
	}

	/// Coordinator the driver submits to.
	pub fn coordinator(&self) -> &HandshakeCoordinator {
		&self.coordinator
	}

	/// Runs the handshake for `call` and returns the final response.
	///
	/// Fails with [`Error::UnknownAccessor`] or [`Error::DelegationFailed`] without resubmitting,
	/// and with [`Error::RoundLimitExceeded`] once more than the configured number of
	/// delegations would be needed.
	pub async fn drive(&self, call: DelegationCall) -> Result<FinalResponse> {
		let span = HandshakeSpan::new(HandshakeStage::Drive, &call.accessor);

		span.instrument(async move {
			let mut call = call;
			let mut rounds = 0;

			loop {
				let instruction = match self.coordinator.handle(&call)? {
					HandshakeResponse::Final(response) => return Ok(response),
					HandshakeResponse::Delegate(instruction) => instruction,
				};

				if rounds >= self.max_rounds {
					return Err(Error::RoundLimitExceeded { rounds });
				}

				rounds += 1;

				let authenticator = self.registry.get(&instruction.accessor).ok_or_else(|| {
					Error::UnknownAccessor { accessor: instruction.accessor.to_string() }
				})?;

				authenticator.authenticate(&instruction).await.map_err(|rejection| {
					Error::DelegationFailed {
						accessor: instruction.accessor.to_string(),
						reason: rejection.reason,
					}
				})?;

				call = call.delegated();
			}
		})
		.await
	}
}
