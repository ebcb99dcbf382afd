//! Environment-style configuration for the relay.
//!
//! The three exchange fields (`client_id`, `client_secret`, `redirect_uri`) may be
//! empty: construction never fails on their absence so
//! [`missing_fields`](RelayConfig::missing_fields) can drive both the engine's
//! fail-fast completeness check and the health endpoint's presence booleans.

// std
use std::{env, time::Duration as StdDuration};
// self
use crate::{_prelude::*, auth::TokenSecret, error::BoxError};

/// Default timeout applied to the token request when none is configured.
pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(10);

/// Configuration and validation failures raised by the relay.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Required configuration fields are absent or empty.
	#[error("Provider configuration is incomplete: missing {}.", .missing.join(", "))]
	Missing {
		/// Names of the absent fields.
		missing: Vec<&'static str>,
	},
	/// A URL-valued setting cannot be parsed.
	#[error("`{value}` is not a valid URL for `{field}`.")]
	InvalidUrl {
		/// Name of the offending setting.
		field: &'static str,
		/// The rejected raw value.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Static provider configuration required by the exchange engine.
#[derive(Clone, Debug)]
pub struct RelayConfig {
	/// OAuth client identifier registered with the provider.
	pub client_id: String,
	/// Confidential client secret; never logged or echoed.
	pub client_secret: TokenSecret,
	/// Redirect URI registered with the provider. Public by nature.
	pub redirect_uri: String,
	/// Provider token endpoint receiving the exchange POST.
	pub token_endpoint: Url,
	/// Timeout applied to the token request.
	pub timeout: StdDuration,
}
impl RelayConfig {
	/// Creates a configuration with the default token-request timeout.
	pub fn new(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		redirect_uri: impl Into<String>,
		token_endpoint: Url,
	) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: TokenSecret::new(client_secret),
			redirect_uri: redirect_uri.into(),
			token_endpoint,
			timeout: DEFAULT_TIMEOUT,
		}
	}

	/// Overrides the token-request timeout.
	pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Names of the required exchange fields that are currently absent or empty.
	///
	/// Shared by the engine's first validation step and the health endpoint.
	pub fn missing_fields(&self) -> Vec<&'static str> {
		let mut missing = Vec::new();

		if self.client_id.is_empty() {
			missing.push("client_id");
		}
		if self.client_secret.is_empty() {
			missing.push("client_secret");
		}
		if self.redirect_uri.is_empty() {
			missing.push("redirect_uri");
		}

		missing
	}

	/// Loads the configuration from `CLIENT_ID`, `CLIENT_SECRET`, `REDIRECT_URI`, and
	/// `TOKEN_ENDPOINT`.
	///
	/// Absent exchange fields load as empty strings rather than failing; the engine
	/// reports on them per call and the health endpoint exposes their presence. The
	/// token endpoint itself is a hard requirement because nothing useful can be done
	/// without one.
	pub fn from_env() -> Result<Self, ConfigError> {
		let var = |key: &str| env::var(key).unwrap_or_default();
		let raw_endpoint = var("TOKEN_ENDPOINT");

		if raw_endpoint.is_empty() {
			return Err(ConfigError::Missing { missing: vec!["token_endpoint"] });
		}

		let token_endpoint = Url::parse(&raw_endpoint).map_err(|source| ConfigError::InvalidUrl {
			field: "token_endpoint",
			value: raw_endpoint,
			source,
		})?;

		Ok(Self::new(var("CLIENT_ID"), var("CLIENT_SECRET"), var("REDIRECT_URI"), token_endpoint))
	}
}
