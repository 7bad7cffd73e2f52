//! Structured call handed to the decision engine.

// self
use crate::{
	_prelude::*,
	auth::{CallerId, CredentialSecret, ExternalOutcome, Provenance},
	delegation::{CredentialPayload, DelegationDescriptor, DelegationMetadata, DescriptorError},
};

/// One invocation's worth of delegation inputs.
///
/// `provenance`, `caller`, and `external_outcome` come from the host; the remaining fields come
/// from the caller's request.
#[derive(Clone, Debug)]
pub struct DelegationCall {
	/// Accessor of the external authenticator; required.
	pub accessor: String,
	/// Base path on the external authenticator; required.
	pub base_path: String,
	/// Sub-identifier joined onto the base path (e.g. a username).
	pub identity_segment: String,
	/// Credential fields forwarded on delegation.
	pub credential: CredentialPayload,
	/// Optional metadata forwarded unchanged on delegation.
	pub metadata: Option<DelegationMetadata>,
	/// Delegate on every invocation, ignoring provenance and the cache.
	pub force_loop: bool,
	/// How the caller's current credential was obtained.
	pub provenance: Provenance,
	/// Host-supplied caller identity; the identity segment stands in when absent.
	pub caller: Option<CallerId>,
	/// Host report on the preceding external authentication, if any.
	pub external_outcome: Option<ExternalOutcome>,
}
impl DelegationCall {
	/// Creates an internal-provenance call for the provided delegation target.
	pub fn new(
		accessor: impl Into<String>,
		base_path: impl Into<String>,
		identity_segment: impl Into<String>,
	) -> Self {
		Self {
			accessor: accessor.into(),
			base_path: base_path.into(),
			identity_segment: identity_segment.into(),
			credential: CredentialPayload::new(),
			metadata: None,
			force_loop: false,
			provenance: Provenance::Internal,
			caller: None,
			external_outcome: None,
		}
	}

	/// Adds credential fields to forward.
	pub fn with_credential<I, K, V>(mut self, fields: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<CredentialSecret>,
	{
		self.credential.extend(fields.into_iter().map(|(key, value)| (key.into(), value.into())));

		self
	}

	/// Attaches metadata forwarded unchanged.
	pub fn with_metadata(mut self, metadata: DelegationMetadata) -> Self {
		self.metadata = Some(metadata);

		self
	}

	/// Overrides the force-loop flag.
	pub fn with_force_loop(mut self, force_loop: bool) -> Self {
		self.force_loop = force_loop;

		self
	}

	/// Overrides the provenance.
	pub fn with_provenance(mut self, provenance: Provenance) -> Self {
		self.provenance = provenance;

		self
	}

	/// Marks the call as resubmitted after an accepted external authentication.
	pub fn delegated(self) -> Self {
		self.with_provenance(Provenance::Delegated).with_external_outcome(ExternalOutcome::Accepted)
	}

	/// Sets the host-supplied caller identity.
	pub fn with_caller(mut self, caller: CallerId) -> Self {
		self.caller = Some(caller);

		self
	}

	/// Records the host's report on the preceding external authentication.
	pub fn with_external_outcome(mut self, outcome: ExternalOutcome) -> Self {
		self.external_outcome = Some(outcome);

		self
	}

	/// Identity the session cache remembers this caller under.
	pub fn caller_identity(&self) -> &str {
		self.caller.as_deref().unwrap_or(&self.identity_segment)
	}

	/// Builds the delegation descriptor for this call, copying the credential payload.
	pub fn descriptor(&self) -> Result<DelegationDescriptor, DescriptorError> {
		let mut builder = DelegationDescriptor::builder(self.accessor.as_str())
			.base_path(self.base_path.as_str())
			.identity_segment(self.identity_segment.as_str())
			.credential(self.credential.clone());

		if let Some(metadata) = &self.metadata {
			builder = builder.metadata(metadata.clone());
		}

		builder.build()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn caller_identity_prefers_host_supplied_caller() {
		let call = DelegationCall::new("auth_userpass_123", "login", "alice");

		assert_eq!(call.caller_identity(), "alice");

		let call = call.with_caller(CallerId::new("entity-42").expect("Caller should be valid."));

		assert_eq!(call.caller_identity(), "entity-42");
	}

	#[test]
	fn delegated_marks_provenance_and_outcome() {
		let call = DelegationCall::new("auth_userpass_123", "login", "alice").delegated();

		assert_eq!(call.provenance, Provenance::Delegated);
		assert_eq!(call.external_outcome, Some(ExternalOutcome::Accepted));
	}
}
