//! Handshake-level error types shared by the engine, coordinator, and host driver.

// self
use crate::{_prelude::*, auth::IdentifierError, delegation::DescriptorError};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// The call is missing required fields or carries inconsistent provenance.
	#[error("Invalid request: {reason}.")]
	InvalidRequest {
		/// Human-readable reason; never contains credential material.
		reason: String,
	},
	/// The external authenticator rejected the delegated credential.
	#[error("Delegated authentication via `{accessor}` failed: {reason}.")]
	DelegationFailed {
		/// Accessor of the authenticator that rejected the caller.
		accessor: String,
		/// Authenticator-supplied reason string.
		reason: String,
	},
	/// No authenticator is registered for the requested accessor.
	#[error("No authenticator is registered for accessor `{accessor}`.")]
	UnknownAccessor {
		/// Accessor named by the delegation instruction.
		accessor: String,
	},
	/// The host stopped a handshake that kept delegating.
	#[error("Handshake did not settle after {rounds} delegation rounds.")]
	RoundLimitExceeded {
		/// Number of delegation rounds performed before giving up.
		rounds: usize,
	},
}
impl Error {
	/// Builds an [`Error::InvalidRequest`] from any displayable reason.
	pub fn invalid_request(reason: impl Into<String>) -> Self {
		Self::InvalidRequest { reason: reason.into() }
	}
}
impl From<IdentifierError> for Error {
	fn from(e: IdentifierError) -> Self {
		Self::invalid_request(e.to_string().trim_end_matches('.'))
	}
}
impl From<DescriptorError> for Error {
	fn from(e: DescriptorError) -> Self {
		Self::invalid_request(e.to_string().trim_end_matches('.'))
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Configuration document could not be parsed.
	#[error("Configuration is malformed at `{path}`.")]
	Parse {
		/// Path to the offending field.
		path: String,
		/// Structured parsing failure.
		#[source]
		source: serde_json::Error,
	},
	/// Cache capacity must admit at least one entry.
	#[error("The cache capacity must be at least 1.")]
	ZeroCapacity,
	/// Cache TTL must be strictly positive.
	#[error("The cache TTL must be positive.")]
	NonPositiveTtl,
}
impl From<serde_path_to_error::Error<serde_json::Error>> for ConfigError {
	fn from(e: serde_path_to_error::Error<serde_json::Error>) -> Self {
		let path = e.path().to_string();

		Self::Parse { path, source: e.into_inner() }
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;

	#[test]
	fn invalid_request_message_is_terminated_once() {
		let err: Error = DescriptorError::EmptyAccessor.into();

		assert!(matches!(err, Error::InvalidRequest { .. }));
		assert_eq!(err.to_string(), "Invalid request: Accessor cannot be empty.");
	}

	#[test]
	fn config_parse_error_keeps_path_and_source() {
		let mut de = serde_json::Deserializer::from_str(r#"{"cacheCapacity":"many"}"#);
		let parsed: std::result::Result<crate::config::HandshakeConfig, _> =
			serde_path_to_error::deserialize(&mut de);
		let err = ConfigError::from(parsed.expect_err("String capacity must be rejected."));

		assert!(matches!(&err, ConfigError::Parse { path, .. } if path == "cacheCapacity"));
		assert!(StdError::source(&err).is_some());
	}
}
