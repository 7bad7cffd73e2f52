//! Inbound request fields as delivered by the host's dispatch layer.

// self
use crate::{
	_prelude::*,
	auth::{CredentialSecret, Provenance},
	engine::DelegationCall,
};

/// Credential field name forwarded to the external authenticator.
pub const PASSWORD_FIELD: &str = "password";

/// Caller-settable fields of a pre-authentication request.
///
/// Missing fields take empty defaults; required fields are enforced by the decision engine so
/// that an absent accessor and an empty one fail the same way.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreauthRequest {
	/// Accessor of the external authenticator.
	#[serde(default)]
	pub accessor: String,
	/// Base path on the authenticator.
	#[serde(default)]
	pub path: String,
	/// Identity segment joined onto `path`.
	#[serde(default)]
	pub username: String,
	/// Secret forwarded as the `password` credential field.
	#[serde(default)]
	pub password: CredentialSecret,
	/// Delegate on every invocation.
	#[serde(default, rename = "loop")]
	pub force_loop: bool,
}
impl PreauthRequest {
	/// Parses request fields from a JSON document.
	pub fn from_json(payload: &str) -> Result<Self> {
		let mut de = serde_json::Deserializer::from_str(payload);

		serde_path_to_error::deserialize(&mut de).map_err(malformed)
	}

	/// Parses request fields from an already-decoded JSON value.
	pub fn from_value(value: Value) -> Result<Self> {
		serde_path_to_error::deserialize(value).map_err(malformed)
	}

	/// Converts the fields into an engine call carrying host-supplied provenance.
	pub fn into_call(self, provenance: Provenance) -> DelegationCall {
		DelegationCall::new(self.accessor, self.path, self.username)
			.with_credential([(PASSWORD_FIELD, self.password)])
			.with_force_loop(self.force_loop)
			.with_provenance(provenance)
	}
}

fn malformed(err: serde_path_to_error::Error<serde_json::Error>) -> Error {
	Error::invalid_request(format!("field `{}` is malformed", err.path()))
}
