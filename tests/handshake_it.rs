// std
use std::collections::BTreeMap;
// crates.io
use serde_json::{Value, json};
use time::{Duration, OffsetDateTime, macros::datetime};
// self
use delegated_auth::{
	auth::Provenance,
	cache::SessionCache,
	config::HandshakeConfig,
	engine::{DecisionOutcome, DelegationCall, TerminalBasis},
	error::Error,
	handshake::{FinalResponse, HandshakeCoordinator, HandshakeResponse, PreauthRequest},
};

const ACCESSOR: &str = "auth_userpass_123";

fn coordinator(capacity: usize, ttl: Duration) -> HandshakeCoordinator {
	let config = HandshakeConfig::from_json(&format!(
		r#"{{"cacheCapacity":{capacity},"cacheTTL":{},"reportCacheSize":true}}"#,
		ttl.whole_seconds()
	))
	.expect("Config fixture should parse.");

	HandshakeCoordinator::from_config(&config).expect("Coordinator fixture should build.")
}

fn alice() -> DelegationCall {
	DelegationCall::new(ACCESSOR, "login", "alice").with_credential([("password", "x")])
}

fn start() -> OffsetDateTime {
	datetime!(2025-11-10 12:00 UTC)
}

#[test]
fn first_phase_delegates_to_joined_path() {
	let coordinator = coordinator(8, Duration::minutes(5));
	let response = coordinator.handle_at(&alice(), start()).expect("Call should be handled.");
	let HandshakeResponse::Delegate(instruction) = response else {
		panic!("First phase must delegate.");
	};

	assert_eq!(instruction.accessor.as_ref(), ACCESSOR);
	assert_eq!(instruction.path, "login/alice");
	assert_eq!(instruction.credential.len(), 1);
	assert_eq!(instruction.credential["password"].expose(), "x");
	assert_eq!(coordinator.engine().cache().size_at(start()), 0);
}

#[test]
fn metadata_reaches_the_serialized_instruction_unchanged() {
	let metadata = BTreeMap::from([
		("origin".to_string(), json!("preauth")),
		("attempt".to_string(), json!(3)),
		("hints".to_string(), json!({ "mfa": [true, null], "locale": "en-US" })),
	]);
	let expected = Value::Object(metadata.clone().into_iter().collect());
	let call = alice().with_metadata(metadata.clone());
	let coordinator = coordinator(8, Duration::minutes(5));
	let DecisionOutcome::Delegate(descriptor) =
		coordinator.engine().decide(&call).expect("Call should be decided.")
	else {
		panic!("First phase must delegate.");
	};

	assert_eq!(descriptor.metadata(), Some(&metadata));

	let decided = serde_json::to_value(descriptor.into_instruction())
		.expect("Instruction should serialize.");

	assert_eq!(decided["metadata"], expected);

	let handled = coordinator.handle(&call).expect("Call should be handled.");
	let serialized = serde_json::to_value(&handled).expect("Response should serialize.");

	assert_eq!(serialized["type"], "delegate");
	assert_eq!(serialized["data"]["metadata"], expected);
	assert_eq!(
		handled.as_delegation().and_then(|instruction| instruction.metadata.as_ref()),
		Some(&metadata)
	);
}

#[test]
fn instruction_omits_metadata_when_none_was_supplied() {
	let coordinator = coordinator(8, Duration::minutes(5));
	let response = coordinator.handle_at(&alice(), start()).expect("Call should be handled.");
	let serialized = serde_json::to_value(&response).expect("Response should serialize.");

	assert!(serialized["data"].get("metadata").is_none());
}

#[test]
fn completed_handshake_is_remembered_within_ttl() {
	let coordinator = coordinator(8, Duration::minutes(5));
	let completed = coordinator
		.handle_at(&alice().delegated(), start())
		.expect("Second phase should be handled.");

	assert_eq!(
		completed,
		HandshakeResponse::Final(FinalResponse { success: true, cache_size: Some(1) })
	);

	let resubmitted = coordinator
		.handle_at(&alice(), start() + Duration::seconds(1))
		.expect("Resubmitted call should be handled.");

	assert_eq!(
		resubmitted,
		HandshakeResponse::Final(FinalResponse { success: true, cache_size: Some(1) })
	);
	assert_eq!(coordinator.engine().metrics().cache_hits(), 1);
	assert_eq!(coordinator.engine().metrics().delegations(), 0);
}

#[test]
fn session_expires_after_ttl() {
	let coordinator = coordinator(8, Duration::seconds(60));

	coordinator.handle_at(&alice().delegated(), start()).expect("Second phase should be handled.");

	let within = coordinator
		.handle_at(&alice(), start() + Duration::seconds(60))
		.expect("Call at the expiry instant should be handled.");

	assert!(within.as_final().is_some(), "Entries are live up to and including expiry.");

	let after = coordinator
		.handle_at(&alice(), start() + Duration::seconds(61))
		.expect("Call after expiry should be handled.");

	assert!(after.as_delegation().is_some());
	assert_eq!(coordinator.engine().cache().size_at(start() + Duration::seconds(61)), 0);
}

#[test]
fn sessions_are_scoped_to_accessor_path_and_caller() {
	let coordinator = coordinator(8, Duration::minutes(5));

	coordinator.handle_at(&alice().delegated(), start()).expect("Second phase should be handled.");

	for call in [
		DelegationCall::new("auth_userpass_456", "login", "alice"),
		DelegationCall::new(ACCESSOR, "login", "bob"),
		DelegationCall::new(ACCESSOR, "signin", "alice"),
	] {
		let response = coordinator.handle_at(&call, start()).expect("Call should be handled.");

		assert!(response.as_delegation().is_some(), "{call:?} must not reuse alice's session.");
	}
}

#[test]
fn forced_loop_never_settles() {
	let coordinator = coordinator(8, Duration::minutes(5));

	coordinator.handle_at(&alice().delegated(), start()).expect("Second phase should be handled.");

	for provenance in [Provenance::Internal, Provenance::Delegated, Provenance::Delegated] {
		let call = alice().with_force_loop(true).with_provenance(provenance);
		let outcome =
			coordinator.engine().decide_at(&call, start()).expect("Forced call should decide.");

		assert!(matches!(outcome, DecisionOutcome::Delegate(_)));
	}
}

#[test]
fn empty_accessor_is_rejected_without_cache_mutation() {
	let coordinator = coordinator(8, Duration::minutes(5));
	let request = PreauthRequest::from_value(serde_json::json!({
		"accessor": "",
		"path": "login",
		"username": "alice",
		"password": "x"
	}))
	.expect("Request fixture should parse.");
	let err = coordinator
		.handle_request(request, Provenance::Delegated)
		.expect_err("Empty accessor must be rejected.");

	assert!(matches!(err, Error::InvalidRequest { .. }));
	assert_eq!(coordinator.cache_size(), 0);
}

#[test]
fn missing_path_is_rejected() {
	let coordinator = coordinator(8, Duration::minutes(5));
	let request = PreauthRequest::from_json(r#"{"accessor":"auth_userpass_123"}"#)
		.expect("Request fixture should parse.");
	let err = coordinator
		.handle_request(request, Provenance::Internal)
		.expect_err("Missing path must be rejected.");

	assert!(err.to_string().contains("Base path"));
}

#[test]
fn capacity_bounds_live_sessions() {
	let coordinator = coordinator(3, Duration::minutes(5));
	let users = ["u0", "u1", "u2", "u3", "u4"];

	for (idx, user) in users.iter().enumerate() {
		let call = DelegationCall::new(ACCESSOR, "login", *user).delegated();
		let now = start() + Duration::seconds(idx as i64);

		coordinator.handle_at(&call, now).expect("Second phase should be handled.");

		assert!(coordinator.engine().cache().size_at(now) <= 3);
	}

	let now = start() + Duration::seconds(10);

	for (user, remembered) in [("u0", false), ("u1", false), ("u2", true), ("u3", true), ("u4", true)]
	{
		let outcome = coordinator
			.engine()
			.decide_at(&DelegationCall::new(ACCESSOR, "login", user), now)
			.expect("Internal call should decide.");
		let hit = matches!(
			outcome,
			DecisionOutcome::Terminal(ref result) if result.basis == TerminalBasis::CacheHit
		);

		assert_eq!(hit, remembered, "Unexpected cache state for {user}.");
	}
}
