//! Delegation descriptors: the instruction naming one external authenticator, the path to
//! call on it, and the credential payload to forward.
//!
//! Descriptors are immutable once built. The host consumes each one exactly once via
//! [`DelegationDescriptor::into_instruction`].

/// Builder API and path joining for delegation descriptors.
pub mod builder;

pub use builder::*;

// self
use crate::{
	_prelude::*,
	auth::{AccessorId, CredentialSecret},
	handshake::DelegationInstruction,
};

/// Separator placed between path segments.
pub const PATH_SEPARATOR: char = '/';

/// Credential fields forwarded to the external authenticator.
pub type CredentialPayload = BTreeMap<String, CredentialSecret>;

/// Free-form metadata forwarded to the host unchanged.
pub type DelegationMetadata = BTreeMap<String, Value>;

/// Immutable instruction asking the host to authenticate the caller elsewhere.
#[derive(Clone, PartialEq, Eq)]
pub struct DelegationDescriptor {
	accessor: AccessorId,
	target_path: String,
	credential: CredentialPayload,
	metadata: Option<DelegationMetadata>,
}
impl DelegationDescriptor {
	/// Creates a new builder for the provided accessor.
	pub fn builder(accessor: impl Into<String>) -> DelegationDescriptorBuilder {
		DelegationDescriptorBuilder::new(accessor)
	}

	/// Builds a descriptor in one step from the call's delegation fields.
	pub fn build<I, K, V>(
		accessor: impl Into<String>,
		base_path: impl Into<String>,
		identity_segment: impl Into<String>,
		credential: I,
	) -> Result<Self, DescriptorError>
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<CredentialSecret>,
	{
		Self::builder(accessor)
			.base_path(base_path)
			.identity_segment(identity_segment)
			.credential(credential)
			.build()
	}

	/// Accessor of the external authenticator.
	pub fn accessor(&self) -> &AccessorId {
		&self.accessor
	}

	/// Path to invoke on the external authenticator.
	pub fn target_path(&self) -> &str {
		&self.target_path
	}

	/// Credential payload to forward.
	pub fn credential(&self) -> &CredentialPayload {
		&self.credential
	}

	/// Optional metadata forwarded unchanged.
	pub fn metadata(&self) -> Option<&DelegationMetadata> {
		self.metadata.as_ref()
	}

	/// Consumes the descriptor and produces the outbound instruction for the host.
	pub fn into_instruction(self) -> DelegationInstruction {
		DelegationInstruction {
			accessor: self.accessor,
			path: self.target_path,
			credential: self.credential,
			metadata: self.metadata,
		}
	}
}
impl Debug for DelegationDescriptor {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("DelegationDescriptor")
			.field("accessor", &self.accessor)
			.field("target_path", &self.target_path)
			.field("credential_fields", &self.credential.keys().collect::<Vec<_>>())
			.field("metadata", &self.metadata)
			.finish()
	}
}
