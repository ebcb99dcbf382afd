//! Credential records produced by successful exchanges, plus the redacting secret wrapper.

// self
use crate::{_prelude::*, auth::UserId};

/// Redacted secret wrapper keeping token material out of logs.
///
/// Used for access tokens, refresh tokens, the client secret, and the privileged bot
/// token. Serialization is transparent because the durable store persists cleartext;
/// encryption at rest is a non-goal.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns `true` when no secret material is present.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Error raised when a provider response cannot yield a credential.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum CredentialError {
	/// The response body carried no `access_token` string field.
	#[error("Response body has no `access_token` string field.")]
	MissingAccessToken,
}

/// Credential record obtained from one successful token exchange.
///
/// Exactly one record exists per [`UserId`]; a newer exchange for the same user fully
/// replaces the older record with no field merging.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credential {
	/// Storage key: the user identifier claimed by the `state` parameter.
	pub user_id: UserId,
	/// Bearer access token; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Token type reported by the provider (usually `Bearer`).
	pub token_type: Option<String>,
	/// Scope string granted by the provider.
	pub scope: Option<String>,
	/// Relative expiry in seconds, when the provider reported one.
	pub expires_in: Option<u64>,
	/// Refresh token, when the provider issued one. Stored for completeness only;
	/// refreshing is out of the relay's scope.
	pub refresh_token: Option<TokenSecret>,
	/// Instant the relay parsed the provider response.
	#[serde(with = "time::serde::rfc3339")]
	pub obtained_at: OffsetDateTime,
	/// Entire parsed provider response, kept verbatim for forward-compatibility.
	pub raw_response: JsonMap<String, JsonValue>,
}
impl Credential {
	/// Builds a credential from the parsed token-endpoint response body.
	///
	/// `access_token` is mandatory; the remaining fields are extracted when present and
	/// the full body is retained as [`raw_response`](Self::raw_response) either way.
	pub fn from_provider_response(
		user_id: UserId,
		raw_response: JsonMap<String, JsonValue>,
		obtained_at: OffsetDateTime,
	) -> Result<Self, CredentialError> {
		fn string_field(raw: &JsonMap<String, JsonValue>, key: &str) -> Option<String> {
			raw.get(key).and_then(JsonValue::as_str).map(str::to_owned)
		}

		let access_token = string_field(&raw_response, "access_token")
			.ok_or(CredentialError::MissingAccessToken)?;
		let token_type = string_field(&raw_response, "token_type");
		let scope = string_field(&raw_response, "scope");
		let expires_in = raw_response.get("expires_in").and_then(JsonValue::as_u64);
		let refresh_token = string_field(&raw_response, "refresh_token").map(TokenSecret::new);

		Ok(Self {
			user_id,
			access_token: TokenSecret::new(access_token),
			token_type,
			scope,
			expires_in,
			refresh_token,
			obtained_at,
			raw_response,
		})
	}

	/// Builds a minimal bearer credential, used by fixtures and demos.
	pub fn bearer(user_id: UserId, access_token: impl Into<String>) -> Self {
		Self {
			user_id,
			access_token: TokenSecret::new(access_token),
			token_type: Some("Bearer".into()),
			scope: None,
			expires_in: None,
			refresh_token: None,
			obtained_at: OffsetDateTime::now_utc(),
			raw_response: JsonMap::new(),
		}
	}

	/// Absolute expiry instant, when the provider reported a relative one.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		self.expires_in
			.and_then(|secs| i64::try_from(secs).ok())
			.map(|secs| self.obtained_at + Duration::seconds(secs))
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credential")
			.field("user_id", &self.user_id)
			.field("access_token", &"<redacted>")
			.field("token_type", &self.token_type)
			.field("scope", &self.scope)
			.field("expires_in", &self.expires_in)
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("obtained_at", &self.obtained_at)
			.field("raw_response_keys", &self.raw_response.keys().collect::<Vec<_>>())
			.finish()
	}
}
