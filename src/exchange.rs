//! The exchange engine: turn `(code, state)` plus provider configuration into a
//! persisted credential or a typed failure.

// self
use crate::{
	_prelude::*,
	auth::{Credential, UserId},
	config::{ConfigError, RelayConfig},
	hook::MembershipHook,
	obs::{self, ExchangeOutcome, ExchangeSpan},
	store::CredentialStore,
};

/// Coordinates the token-exchange-and-persistence protocol for one provider.
///
/// The relay owns the HTTP client, the provider configuration, the credential store,
/// and the optional membership hook; [`exchange`](Relay::exchange) is its single entry
/// point. The engine is stateless between calls and safe to invoke concurrently for
/// different `(code, state)` pairs; the store provides the only write serialization.
#[derive(Clone)]
pub struct Relay {
	http_client: ReqwestClient,
	config: RelayConfig,
	store: Arc<dyn CredentialStore>,
	hook: Option<Arc<dyn MembershipHook>>,
}
impl Relay {
	/// Creates a relay over the provided store and configuration.
	///
	/// The relay provisions its own HTTP client with the configured timeout and with
	/// redirect following disabled, matching OAuth 2.0 guidance that token endpoints
	/// answer directly instead of delegating to another URI.
	pub fn new(store: Arc<dyn CredentialStore>, config: RelayConfig) -> Result<Self> {
		let http_client = ReqwestClient::builder()
			.timeout(config.timeout)
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.map_err(ConfigError::http_client_build)?;

		Ok(Self::with_http_client(store, config, http_client))
	}

	/// Creates a relay that reuses a caller-provided HTTP client.
	pub fn with_http_client(
		store: Arc<dyn CredentialStore>,
		config: RelayConfig,
		http_client: ReqwestClient,
	) -> Self {
		Self { http_client, config, store, hook: None }
	}

	/// Attaches the optional post-exchange membership hook.
	pub fn with_hook(mut self, hook: Arc<dyn MembershipHook>) -> Self {
		self.hook = Some(hook);

		self
	}

	/// Provider configuration backing this relay.
	pub fn config(&self) -> &RelayConfig {
		&self.config
	}

	/// Credential store backing this relay.
	pub fn store(&self) -> &Arc<dyn CredentialStore> {
		&self.store
	}

	/// Exchanges an authorization code for a credential and persists it under the user
	/// identifier carried by `state`.
	///
	/// Validation is fail-fast in a fixed order: configuration completeness, then
	/// `code`, then `state`. The token request is a single attempt; authorization codes
	/// are single-use, so nothing is ever retried here and a failed exchange is
	/// terminal for that code. Success is only reported after the credential has been
	/// persisted; a store failure surfaces as [`Error::Persistence`] still carrying the
	/// obtained credential. The membership hook, when configured, runs on a detached
	/// task after persistence and cannot affect the result.
	pub async fn exchange(&self, code: &str, state: &str) -> Result<Credential> {
		obs::record_exchange(ExchangeOutcome::Attempt);

		let span = ExchangeSpan::new("exchange");
		let result = span.instrument(self.exchange_inner(code, state)).await;

		match &result {
			Ok(_) => obs::record_exchange(ExchangeOutcome::Success),
			Err(_) => obs::record_exchange(ExchangeOutcome::Failure),
		}

		result
	}

	async fn exchange_inner(&self, code: &str, state: &str) -> Result<Credential> {
		let missing = self.config.missing_fields();

		if !missing.is_empty() {
			return Err(ConfigError::Missing { missing }.into());
		}
		if code.is_empty() {
			return Err(Error::MissingCode);
		}

		let user_id = UserId::new(state).map_err(|_| Error::MissingState)?;
		let form = [
			("client_id", self.config.client_id.as_str()),
			("client_secret", self.config.client_secret.expose()),
			("grant_type", "authorization_code"),
			("code", code),
			("redirect_uri", self.config.redirect_uri.as_str()),
		];
		let response = self
			.http_client
			.post(self.config.token_endpoint.clone())
			.form(&form)
			.send()
			.await?;
		let status = response.status();
		let bytes = response.bytes().await?;

		if !status.is_success() {
			return Err(Error::ProviderRejected {
				status: status.as_u16(),
				body: String::from_utf8_lossy(&bytes).into_owned(),
			});
		}

		let raw_response = parse_token_body(&bytes)?;
		let credential =
			Credential::from_provider_response(user_id, raw_response, OffsetDateTime::now_utc())
				.map_err(|e| Error::MalformedResponse { reason: e.to_string(), source: None })?;

		if let Err(source) = self.store.put(credential.clone()).await {
			return Err(Error::Persistence { credential: Box::new(credential), source });
		}

		self.spawn_hook(&credential);

		Ok(credential)
	}

	fn spawn_hook(&self, credential: &Credential) {
		let Some(hook) = self.hook.clone() else {
			return;
		};
		let user_id = credential.user_id.clone();
		let access_token = credential.access_token.clone();

		tokio::spawn(async move {
			if let Err(e) = hook.add_member(&user_id, &access_token).await {
				obs::warn(format!("Membership hook failed for `{user_id}`: {e}"));
			}
		});
	}
}
impl Debug for Relay {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Relay")
			.field("config", &self.config)
			.field("hook_set", &self.hook.is_some())
			.finish()
	}
}

fn parse_token_body(bytes: &[u8]) -> Result<JsonMap<String, JsonValue>> {
	let deserializer = &mut serde_json::Deserializer::from_slice(bytes);

	match serde_path_to_error::deserialize::<_, JsonValue>(deserializer) {
		Ok(JsonValue::Object(map)) => Ok(map),
		Ok(_) => Err(Error::MalformedResponse {
			reason: "body is not a JSON object".into(),
			source: None,
		}),
		Err(e) => Err(Error::MalformedResponse {
			reason: "body is not valid JSON".into(),
			source: Some(e),
		}),
	}
}
