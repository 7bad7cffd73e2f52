//! Handshake coordinator: the contract exposed to the host.
//!
//! [`HandshakeCoordinator::handle`] returns either a [`FinalResponse`] or a
//! [`DelegationInstruction`]. After an instruction the core is done with that invocation; the
//! host runs the named authenticator and, on success, resubmits the original call with
//! [`Provenance::Delegated`]. Nothing is kept between the two invocations besides the session
//! cache, so each invocation can be retried on its own and a host that disappears mid-handshake
//! leaves nothing behind.

pub mod host;
pub mod request;

pub use host::*;
pub use request::*;

// self
use crate::{
	_prelude::*,
	auth::{AccessorId, Provenance},
	config::HandshakeConfig,
	delegation::{CredentialPayload, DelegationMetadata},
	engine::{DecisionEngine, DecisionOutcome, DelegationCall},
	obs::{HandshakeSpan, HandshakeStage},
};

/// Either a terminal answer or a delegation instruction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "data")]
pub enum HandshakeResponse {
	/// The call is answered.
	Final(FinalResponse),
	/// The host must run the named authenticator and resubmit.
	Delegate(DelegationInstruction),
}
impl HandshakeResponse {
	/// Returns the final response, if any.
	pub fn as_final(&self) -> Option<&FinalResponse> {
		match self {
			Self::Final(response) => Some(response),
			Self::Delegate(_) => None,
		}
	}

	/// Returns the delegation instruction, if any.
	pub fn as_delegation(&self) -> Option<&DelegationInstruction> {
		match self {
			Self::Final(_) => None,
			Self::Delegate(instruction) => Some(instruction),
		}
	}
}

/// Terminal response body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalResponse {
	/// Success indicator.
	pub success: bool,
	/// Live session cache size; present when introspection is enabled.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub cache_size: Option<usize>,
}

/// Outbound instruction naming the authenticator the host must call.
///
/// Credential values serialize in the clear because the authenticator needs them; `Debug`
/// output stays redacted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationInstruction {
	/// Accessor of the external authenticator.
	pub accessor: AccessorId,
	/// Path to invoke on the authenticator.
	pub path: String,
	/// Credential payload to forward.
	pub credential: CredentialPayload,
	/// Metadata forwarded unchanged.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub metadata: Option<DelegationMetadata>,
}

/// Stateless front door over the [`DecisionEngine`].
#[derive(Clone, Debug)]
pub struct HandshakeCoordinator {
	engine: DecisionEngine,
	report_cache_size: bool,
}
impl HandshakeCoordinator {
	/// Wraps an engine; `report_cache_size` selects the introspection response variant.
	pub fn new(engine: DecisionEngine, report_cache_size: bool) -> Self {
		Self { engine, report_cache_size }
	}

	/// Builds a coordinator and its in-memory cache from `config`.
	pub fn from_config(config: &HandshakeConfig) -> Result<Self> {
		Ok(Self::new(DecisionEngine::from_config(config)?, config.report_cache_size))
	}

	/// Engine driving the decisions.
	pub fn engine(&self) -> &DecisionEngine {
		&self.engine
	}

	/// Live session cache size.
	pub fn cache_size(&self) -> usize {
		self.engine.cache().size()
	}

	/// [`handle_at`](Self::handle_at) using the current UTC instant.
	pub fn handle(&self, call: &DelegationCall) -> Result<HandshakeResponse> {
		self.handle_at(call, OffsetDateTime::now_utc())
	}

	/// Runs one decision and shapes it for the host.
	pub fn handle_at(
		&self,
		call: &DelegationCall,
		now: OffsetDateTime,
	) -> Result<HandshakeResponse> {
		let _span = HandshakeSpan::new(HandshakeStage::Handle, &call.accessor).entered();

		match self.engine.decide_at(call, now)? {
			DecisionOutcome::Terminal(_) => {
				let cache_size = self.report_cache_size.then(|| self.engine.cache().size_at(now));

				Ok(HandshakeResponse::Final(FinalResponse { success: true, cache_size }))
			},
			DecisionOutcome::Delegate(descriptor) =>
				Ok(HandshakeResponse::Delegate(descriptor.into_instruction())),
		}
	}

	/// Handles a raw inbound request with host-supplied provenance.
	pub fn handle_request(
		&self,
		request: PreauthRequest,
		provenance: Provenance,
	) -> Result<HandshakeResponse> {
		self.handle(&request.into_call(provenance))
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;

	fn coordinator(report_cache_size: bool) -> HandshakeCoordinator {
		HandshakeCoordinator::from_config(
			&HandshakeConfig::default().with_report_cache_size(report_cache_size),
		)
		.expect("Coordinator fixture should build.")
	}

	fn call() -> DelegationCall {
		DelegationCall::new("auth_userpass_123", "login", "alice")
			.with_credential([("password", "x")])
	}

	#[test]
	fn delegation_response_carries_instruction() {
		let now = datetime!(2025-11-10 12:00 UTC);
		let response = coordinator(false).handle_at(&call(), now).expect("Call should be handled.");
		let instruction = response.as_delegation().expect("Cache miss must delegate.");

		assert_eq!(instruction.accessor.as_ref(), "auth_userpass_123");
		assert_eq!(instruction.path, "login/alice");
		assert!(response.as_final().is_none());
		assert_eq!(
			serde_json::to_value(&response).expect("Response should serialize to JSON."),
			serde_json::json!({
				"type": "delegate",
				"data": {
					"accessor": "auth_userpass_123",
					"path": "login/alice",
					"credential": { "password": "x" }
				}
			})
		);
	}

	#[test]
	fn introspection_reports_live_cache_size() {
		let now = datetime!(2025-11-10 12:00 UTC);
		let coordinator = coordinator(true);
		let response =
			coordinator.handle_at(&call().delegated(), now).expect("Call should be handled.");

		assert_eq!(response.as_final(), Some(&FinalResponse { success: true, cache_size: Some(1) }));
		assert_eq!(
			serde_json::to_value(response.as_final()).expect("Response should serialize to JSON."),
			serde_json::json!({ "success": true, "cache_size": 1 })
		);
	}

	#[test]
	fn plain_final_response_omits_cache_size() {
		let now = datetime!(2025-11-10 12:00 UTC);
		let response =
			coordinator(false).handle_at(&call().delegated(), now).expect("Call should be handled.");

		assert_eq!(
			serde_json::to_value(response.as_final()).expect("Response should serialize to JSON."),
			serde_json::json!({ "success": true })
		);
	}
}
