//! Optional post-exchange group-membership side effect.
//!
//! Some deployments auto-join freshly authorized users into a group using a separate,
//! privileged, process-level credential. The action is modeled as a decoupled hook
//! because its presence varies across deployments and its outcome must never affect
//! the exchange result: the engine fires it after persistence on a detached task and
//! only logs failures.

// std
use std::env;
// crates.io
use reqwest::header::AUTHORIZATION;
// self
use crate::{
	_prelude::*,
	auth::{TokenSecret, UserId},
	config::ConfigError,
};

/// Future type returned by [`MembershipHook`] implementations.
pub type HookFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, HookError>> + 'a + Send>>;

/// Error type produced by membership hooks.
#[derive(Debug, ThisError)]
pub enum HookError {
	/// The configured endpoint cannot carry additional path segments.
	#[error("Membership endpoint cannot be extended with path segments.")]
	InvalidEndpoint,
	/// The membership endpoint rejected the request.
	#[error("Membership endpoint rejected the request (HTTP {status}): {body}")]
	Rejected {
		/// HTTP status code returned by the membership endpoint.
		status: u16,
		/// Raw error body for diagnostics.
		body: String,
	},
	/// Network-level failure reaching the membership endpoint.
	#[error("Network error occurred while calling the membership endpoint.")]
	Transport {
		/// Transport-specific failure.
		#[source]
		source: ReqwestError,
	},
}

/// Fire-and-forget contract for adding an authorized user to a group.
pub trait MembershipHook
where
	Self: Send + Sync,
{
	/// Adds the user to the configured group using their freshly obtained access token.
	fn add_member<'a>(
		&'a self,
		user_id: &'a UserId,
		access_token: &'a TokenSecret,
	) -> HookFuture<'a, ()>;
}

/// Configuration for the HTTP membership hook.
#[derive(Clone, Debug)]
pub struct MembershipConfig {
	/// Membership API base endpoint.
	pub endpoint: Url,
	/// Group the relay auto-joins users into.
	pub group_id: String,
	/// Privileged process-level credential, distinct from any user token.
	pub bot_token: TokenSecret,
}
impl MembershipConfig {
	/// Assembles the hook configuration from `MEMBERSHIP_ENDPOINT`, `GROUP_ID`, and
	/// `BOT_TOKEN`.
	///
	/// Returns `None` unless all three are present: a partially configured hook is
	/// treated as no hook at all.
	pub fn from_env() -> Result<Option<Self>, ConfigError> {
		let endpoint = env::var("MEMBERSHIP_ENDPOINT").unwrap_or_default();
		let group_id = env::var("GROUP_ID").unwrap_or_default();
		let bot_token = env::var("BOT_TOKEN").unwrap_or_default();

		if endpoint.is_empty() || group_id.is_empty() || bot_token.is_empty() {
			return Ok(None);
		}

		let endpoint = Url::parse(&endpoint).map_err(|source| ConfigError::InvalidUrl {
			field: "membership_endpoint",
			value: endpoint,
			source,
		})?;

		Ok(Some(Self { endpoint, group_id, bot_token: TokenSecret::new(bot_token) }))
	}
}

/// Membership hook that PUTs the user into a group over HTTP.
///
/// Request shape: `PUT {endpoint}/{group_id}/members/{user_id}` with
/// `Authorization: Bot <bot_token>` and body `{"access_token": "..."}`.
#[derive(Clone, Debug)]
pub struct HttpMembershipHook {
	http_client: ReqwestClient,
	config: MembershipConfig,
}
impl HttpMembershipHook {
	/// Creates a hook with its own HTTP client.
	pub fn new(config: MembershipConfig) -> Result<Self, ConfigError> {
		let http_client =
			ReqwestClient::builder().build().map_err(ConfigError::http_client_build)?;

		Ok(Self::with_client(http_client, config))
	}

	/// Wraps an existing HTTP client.
	pub fn with_client(http_client: ReqwestClient, config: MembershipConfig) -> Self {
		Self { http_client, config }
	}

	fn member_url(&self, user_id: &UserId) -> Result<Url, HookError> {
		let mut url = self.config.endpoint.clone();

		url.path_segments_mut()
			.map_err(|_| HookError::InvalidEndpoint)?
			.pop_if_empty()
			.push(&self.config.group_id)
			.push("members")
			.push(user_id);

		Ok(url)
	}
}
impl MembershipHook for HttpMembershipHook {
	fn add_member<'a>(
		&'a self,
		user_id: &'a UserId,
		access_token: &'a TokenSecret,
	) -> HookFuture<'a, ()> {
		Box::pin(async move {
			let url = self.member_url(user_id)?;
			let response = self
				.http_client
				.put(url)
				.header(AUTHORIZATION, format!("Bot {}", self.config.bot_token.expose()))
				.json(&serde_json::json!({ "access_token": access_token.expose() }))
				.send()
				.await
				.map_err(|source| HookError::Transport { source })?;
			let status = response.status();

			if status.is_success() {
				return Ok(());
			}

			let body = response.text().await.unwrap_or_default();

			Err(HookError::Rejected { status: status.as_u16(), body })
		})
	}
}
