//! Host-supplied provenance of the credential presented with a call.

// self
use crate::_prelude::*;

/// How the caller's current credential was obtained.
///
/// The host sets this out-of-band for every call; callers cannot influence it through request
/// fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
	/// Credential issued through the backend's ordinary token path.
	Internal,
	/// Credential produced by completing a delegation round trip.
	Delegated,
}
impl Provenance {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Provenance::Internal => "internal",
			Provenance::Delegated => "delegated",
		}
	}

	/// Returns `true` when the credential came back from an external authenticator.
	pub const fn is_delegated(self) -> bool {
		matches!(self, Provenance::Delegated)
	}
}
impl Display for Provenance {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Host report on the external authentication that preceded a [`Provenance::Delegated`] call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum ExternalOutcome {
	/// The authenticator vouched for the caller.
	Accepted,
	/// The authenticator rejected the caller.
	Rejected {
		/// Authenticator-supplied reason string.
		reason: String,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn provenance_labels_are_stable() {
		assert_eq!(Provenance::Internal.to_string(), "internal");
		assert_eq!(
			serde_json::to_string(&Provenance::Delegated)
				.expect("Provenance should serialize to JSON."),
			"\"delegated\""
		);
		assert!(Provenance::Delegated.is_delegated());
		assert!(!Provenance::Internal.is_delegated());
	}

	#[test]
	fn rejected_outcome_is_tagged() {
		let payload = serde_json::to_value(ExternalOutcome::Rejected { reason: "bad".into() })
			.expect("Outcome should serialize to JSON.");

		assert_eq!(payload, serde_json::json!({ "status": "rejected", "reason": "bad" }));
	}
}
