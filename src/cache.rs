//! Session cache contract and the built-in bounded in-memory implementation.
//!
//! The cache remembers which accessor/path/caller triples were validated recently so the
//! decision engine can answer without another external round trip. Misses are never errors;
//! they simply route the caller through delegation again.

pub mod memory;

pub use memory::MemorySessionCache;

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, auth::AccessorId};

/// Bounded, concurrency-safe store of validated delegation outcomes.
///
/// Implementations evaluate expiry lazily: an expired entry is reported as absent by
/// [`get_at`](Self::get_at) and excluded from [`size_at`](Self::size_at). No operation fails.
pub trait SessionCache
where
	Self: Send + Sync,
{
	/// Returns the live entry for `key`, refreshing its recency, or `None` if absent/expired.
	fn get_at(&self, key: &SessionKey, now: OffsetDateTime) -> Option<CacheEntry>;

	/// Inserts or refreshes the entry for `key`, valid for `ttl` from `now`.
	///
	/// Returns the stored entry, or `None` when `ttl` cannot produce a live entry.
	fn put_at(&self, key: SessionKey, ttl: Duration, now: OffsetDateTime) -> Option<CacheEntry>;

	/// Number of live entries at `now`, taken from a consistent snapshot.
	fn size_at(&self, now: OffsetDateTime) -> usize;

	/// Maximum number of entries the cache holds.
	fn capacity(&self) -> usize;

	/// [`get_at`](Self::get_at) using the current UTC instant.
	fn get(&self, key: &SessionKey) -> Option<CacheEntry> {
		self.get_at(key, OffsetDateTime::now_utc())
	}

	/// [`put_at`](Self::put_at) using the current UTC instant.
	fn put(&self, key: SessionKey, ttl: Duration) -> Option<CacheEntry> {
		self.put_at(key, ttl, OffsetDateTime::now_utc())
	}

	/// [`size_at`](Self::size_at) using the current UTC instant.
	fn size(&self) -> usize {
		self.size_at(OffsetDateTime::now_utc())
	}
}

/// Deterministic lookup key for an accessor/target-path/caller triple.
///
/// The key is a base64 (no padding) SHA-256 digest over the length-prefixed components, so
/// distinct triples cannot collide through concatenation and raw identities never sit in the
/// cache's key space.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionKey(String);
impl SessionKey {
	/// Derives the key for the provided triple.
	pub fn new(accessor: &AccessorId, target_path: &str, caller: &str) -> Self {
		let mut hasher = Sha256::new();

		for part in [accessor.as_ref(), target_path, caller] {
			hasher.update((part.len() as u64).to_be_bytes());
			hasher.update(part.as_bytes());
		}

		Self(STANDARD_NO_PAD.encode(hasher.finalize()))
	}

	/// Returns the encoded digest.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Debug for SessionKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "SessionKey({})", self.0)
	}
}
impl Display for SessionKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Record of a validated delegation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheEntry {
	/// Key the entry is stored under.
	pub key: SessionKey,
	/// Instant the external authenticator vouched for the caller.
	pub validated_at: OffsetDateTime,
	/// Instant after which the entry no longer counts; always later than `validated_at`.
	pub expires_at: OffsetDateTime,
}
impl CacheEntry {
	/// Creates an entry valid for `ttl` from `validated_at`.
	///
	/// Returns `None` for non-positive TTLs or when the expiry is not representable.
	pub fn new(key: SessionKey, validated_at: OffsetDateTime, ttl: Duration) -> Option<Self> {
		if !ttl.is_positive() {
			return None;
		}

		let expires_at = validated_at.checked_add(ttl)?;

		Some(Self { key, validated_at, expires_at })
	}

	/// Returns `true` once `instant` is past the expiry.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant > self.expires_at
	}

	/// Time left before expiry at `instant`, clamped to zero.
	pub fn remaining_at(&self, instant: OffsetDateTime) -> Duration {
		let remaining = self.expires_at - instant;

		if remaining.is_negative() { Duration::ZERO } else { remaining }
	}
}
