//! Relay-level error types shared across the engine, the stores, and the HTTP layer.

// self
use crate::{_prelude::*, auth::Credential, config::ConfigError, store::StoreError};

/// Relay-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical relay error exposed by public APIs.
///
/// Every variant is terminal for the authorization code that produced it: codes are
/// single-use, so no variant is retried inside the engine. [`Error::Transport`] is the
/// only class a caller may reasonably retry, and only by restarting the OAuth flow to
/// obtain a fresh code.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem; never the caller's fault.
	#[error(transparent)]
	Configuration(#[from] ConfigError),
	/// The callback carried no authorization code.
	#[error("Missing authorization code.")]
	MissingCode,
	/// The callback carried no state value to key the credential by.
	///
	/// An empty state must never become a storage key, otherwise every anonymous
	/// callback would silently overwrite the same sentinel entry.
	#[error("Missing state parameter.")]
	MissingState,
	/// The token endpoint answered the exchange with a non-2xx status.
	#[error("Provider rejected the exchange (HTTP {status}): {body}")]
	ProviderRejected {
		/// HTTP status code returned by the token endpoint.
		status: u16,
		/// Raw error body, carried verbatim for diagnostics.
		body: String,
	},
	/// The token endpoint answered 2xx but the body was unusable.
	#[error("Token endpoint returned an unusable body: {reason}.")]
	MalformedResponse {
		/// What was wrong with the body.
		reason: String,
		/// Structured parse failure, when the body was not valid JSON at all.
		#[source]
		source: Option<serde_path_to_error::Error<serde_json::Error>>,
	},
	/// Network-level failure (timeout, DNS, connection reset) reaching the token endpoint.
	#[error("Network error occurred while calling the token endpoint.")]
	Transport {
		/// Transport-specific failure.
		#[source]
		source: BoxError,
	},
	/// The exchange succeeded but the credential could not be persisted.
	#[error("Credential for `{}` could not be persisted.", .credential.user_id)]
	Persistence {
		/// The credential obtained from the provider. The authorization code is already
		/// spent, so callers retry persistence with this value instead of re-running the
		/// exchange.
		credential: Box<Credential>,
		/// Underlying store failure.
		#[source]
		source: StoreError,
	},
}
impl Error {
	/// Wraps a transport-level failure.
	pub fn transport(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Transport { source: Box::new(src) }
	}
}
impl From<ReqwestError> for Error {
	fn from(e: ReqwestError) -> Self {
		Self::transport(e)
	}
}
