//! Handshake configuration: session cache bounds and response introspection.

// self
use crate::{_prelude::*, error::ConfigError};

/// Recognized handshake options.
///
/// Deserializes from `{"cacheCapacity": 1024, "cacheTTL": 300, "reportCacheSize": false}` with
/// the TTL in whole seconds; omitted fields take their defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawHandshakeConfig", into = "RawHandshakeConfig")]
pub struct HandshakeConfig {
	/// Maximum number of live session entries.
	pub cache_capacity: NonZeroUsize,
	/// Lifetime of a session entry.
	pub cache_ttl: Duration,
	/// Whether final responses report the live cache size.
	pub report_cache_size: bool,
}
impl HandshakeConfig {
	/// Default cache capacity.
	pub const DEFAULT_CACHE_CAPACITY: NonZeroUsize = NonZeroUsize::new(1024).unwrap();
	/// Default entry lifetime.
	pub const DEFAULT_CACHE_TTL: Duration = Duration::minutes(5);

	/// Parses and validates a JSON configuration document.
	pub fn from_json(payload: &str) -> Result<Self, ConfigError> {
		let mut de = serde_json::Deserializer::from_str(payload);
		let config = serde_path_to_error::deserialize(&mut de)?;

		Ok(config)
	}

	/// Overrides the cache capacity.
	pub fn with_cache_capacity(mut self, capacity: NonZeroUsize) -> Self {
		self.cache_capacity = capacity;

		self
	}

	/// Overrides the entry lifetime.
	pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
		self.cache_ttl = ttl;

		self
	}

	/// Enables or disables cache size reporting on final responses.
	pub fn with_report_cache_size(mut self, report: bool) -> Self {
		self.report_cache_size = report;

		self
	}

	/// Checks invariants that the typed setters cannot enforce.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.cache_ttl.is_positive() { Ok(()) } else { Err(ConfigError::NonPositiveTtl) }
	}
}
impl Default for HandshakeConfig {
	fn default() -> Self {
		Self {
			cache_capacity: Self::DEFAULT_CACHE_CAPACITY,
			cache_ttl: Self::DEFAULT_CACHE_TTL,
			report_cache_size: false,
		}
	}
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawHandshakeConfig {
	#[serde(default = "default_capacity")]
	cache_capacity: usize,
	#[serde(rename = "cacheTTL", default = "default_ttl_secs")]
	cache_ttl: i64,
	#[serde(default)]
	report_cache_size: bool,
}
impl TryFrom<RawHandshakeConfig> for HandshakeConfig {
	type Error = ConfigError;

	fn try_from(raw: RawHandshakeConfig) -> Result<Self, Self::Error> {
		let cache_capacity = NonZeroUsize::new(raw.cache_capacity).ok_or(ConfigError::ZeroCapacity)?;
		let config = Self {
			cache_capacity,
			cache_ttl: Duration::seconds(raw.cache_ttl),
			report_cache_size: raw.report_cache_size,
		};

		config.validate()?;

		Ok(config)
	}
}
impl From<HandshakeConfig> for RawHandshakeConfig {
	fn from(config: HandshakeConfig) -> Self {
		Self {
			cache_capacity: config.cache_capacity.get(),
			cache_ttl: config.cache_ttl.whole_seconds(),
			report_cache_size: config.report_cache_size,
		}
	}
}

fn default_capacity() -> usize {
	HandshakeConfig::DEFAULT_CACHE_CAPACITY.get()
}

fn default_ttl_secs() -> i64 {
	HandshakeConfig::DEFAULT_CACHE_TTL.whole_seconds()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn empty_document_uses_defaults() {
		let config = HandshakeConfig::from_json("{}").expect("Empty config should parse.");

		assert_eq!(config, HandshakeConfig::default());
		assert_eq!(config.cache_capacity.get(), 1024);
		assert_eq!(config.cache_ttl, Duration::minutes(5));
	}

	#[test]
	fn recognized_options_are_applied() {
		let config = HandshakeConfig::from_json(
			r#"{"cacheCapacity":8,"cacheTTL":30,"reportCacheSize":true}"#,
		)
		.expect("Config fixture should parse.");

		assert_eq!(config.cache_capacity.get(), 8);
		assert_eq!(config.cache_ttl, Duration::seconds(30));
		assert!(config.report_cache_size);
	}

	#[test]
	fn invalid_bounds_are_rejected() {
		let err = HandshakeConfig::from_json(r#"{"cacheCapacity":0}"#)
			.expect_err("Zero capacity must be rejected.");

		assert!(matches!(err, ConfigError::Parse { .. }));
		assert!(err.to_string().contains("malformed"));

		let err = HandshakeConfig::default()
			.with_cache_ttl(Duration::ZERO)
			.validate()
			.expect_err("Zero TTL must be rejected.");

		assert!(matches!(err, ConfigError::NonPositiveTtl));
	}

	#[test]
	fn serializes_with_recognized_names() {
		let payload = serde_json::to_value(HandshakeConfig::default().with_report_cache_size(true))
			.expect("Config should serialize to JSON.");

		assert_eq!(
			payload,
			serde_json::json!({ "cacheCapacity": 1024, "cacheTTL": 300, "reportCacheSize": true })
		);
	}
}
