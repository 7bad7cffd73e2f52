// self
use crate::{
	_prelude::*,
	auth::{AccessorId, CredentialSecret},
	delegation::{CredentialPayload, DelegationDescriptor, DelegationMetadata, PATH_SEPARATOR},
};

/// Errors raised while constructing descriptors.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum DescriptorError {
	/// Accessor is required.
	#[error("Accessor cannot be empty.")]
	EmptyAccessor,
	/// Base path is required.
	#[error("Base path cannot be empty.")]
	EmptyBasePath,
	/// Base path holds nothing but separators.
	#[error("Base path `{path}` has no segments.")]
	BasePathWithoutSegments {
		/// Base path that failed validation.
		path: String,
	},
}

/// Builder for [`DelegationDescriptor`] values.
#[derive(Debug)]
pub struct DelegationDescriptorBuilder {
	/// Raw accessor; validated on build.
	pub accessor: String,
	/// Base path on the external authenticator (e.g. `login`).
	pub base_path: String,
	/// Sub-identifier appended to the base path (e.g. a username).
	pub identity_segment: String,
	/// Credential fields to forward.
	pub credential: CredentialPayload,
	/// Optional metadata forwarded unchanged.
	pub metadata: Option<DelegationMetadata>,
}
impl DelegationDescriptorBuilder {
	/// Creates a new builder seeded with the provided accessor.
	pub fn new(accessor: impl Into<String>) -> Self {
		Self {
			accessor: accessor.into(),
			base_path: String::new(),
			identity_segment: String::new(),
			credential: CredentialPayload::new(),
			metadata: None,
		}
	}

	/// Sets the base path.
	pub fn base_path(mut self, path: impl Into<String>) -> Self {
		self.base_path = path.into();

		self
	}

	/// Sets the identity segment joined onto the base path.
	pub fn identity_segment(mut self, segment: impl Into<String>) -> Self {
		self.identity_segment = segment.into();

		self
	}

	/// Copies the provided credential fields into the payload.
	pub fn credential<I, K, V>(mut self, fields: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<CredentialSecret>,
	{
		for (key, value) in fields {
			self.credential.insert(key.into(), value.into());
		}

		self
	}

	/// Attaches metadata forwarded unchanged to the host.
	pub fn metadata(mut self, metadata: DelegationMetadata) -> Self {
		self.metadata = Some(metadata);

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<DelegationDescriptor, DescriptorError> {
		// Accessors are opaque, so emptiness is the only way construction can fail.
		let accessor =
			AccessorId::new(&self.accessor).map_err(|_| DescriptorError::EmptyAccessor)?;

		if self.base_path.is_empty() {
			return Err(DescriptorError::EmptyBasePath);
		}
		if !self.base_path.split(PATH_SEPARATOR).any(|segment| !segment.is_empty()) {
			return Err(DescriptorError::BasePathWithoutSegments { path: self.base_path });
		}

		let target_path = join_path(&self.base_path, &self.identity_segment);

		Ok(DelegationDescriptor {
			accessor,
			target_path,
			credential: self.credential,
			metadata: self.metadata,
		})
	}
}

/// Joins `base` and `segment` with exactly one separator.
///
/// Empty segments are dropped, so redundant and trailing separators disappear. A leading
/// separator on `base` is kept, making absolute base paths stay absolute. Every other character
/// is kept verbatim; `.` and `..` are not interpreted.
pub fn join_path(base: &str, segment: &str) -> String {
	let mut joined = String::with_capacity(base.len() + segment.len() + 1);
	let mut first = true;

	if base.starts_with(PATH_SEPARATOR) {
		joined.push(PATH_SEPARATOR);
	}

	for part in base
		.split(PATH_SEPARATOR)
		.chain(segment.split(PATH_SEPARATOR))
		.filter(|part| !part.is_empty())
	{
		if !first {
			joined.push(PATH_SEPARATOR);
		}

		joined.push_str(part);

		first = false;
	}

	joined
}
