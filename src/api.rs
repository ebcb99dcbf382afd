//! HTTP contract over the relay core: callback, read-back, and health routes.
//!
//! The routing layer stays deliberately thin: it extracts two strings from the
//! callback, hands them to [`Relay::exchange`], and renders whatever typed result
//! comes back. Status mapping lives here and nowhere else.

// crates.io
use axum::{
	Json, Router,
	extract::{Path, Query, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::get,
};
use serde_json::json;
// self
use crate::{_prelude::*, auth::UserId, exchange::Relay};

/// Query parameters accepted by the OAuth redirect callback.
///
/// Both fields default to empty so the engine's own validation produces the error,
/// keeping "absent" and "empty" indistinguishable as the contract requires.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
	/// Single-use authorization code issued by the provider.
	#[serde(default)]
	pub code: String,
	/// Opaque caller-chosen state doubling as the user identifier.
	#[serde(default)]
	pub state: String,
}

/// Builds the relay's HTTP surface over a shared engine.
pub fn router(relay: Arc<Relay>) -> Router {
	Router::new()
		.route("/", get(home))
		.route("/callback", get(callback))
		.route("/token/{user_id}", get(lookup))
		.route("/tokens", get(enumerate))
		.route("/health", get(health))
		.with_state(relay)
}

async fn home() -> &'static str {
	"OAuth callback relay is running!"
}

async fn callback(
	State(relay): State<Arc<Relay>>,
	Query(params): Query<CallbackParams>,
) -> Response {
	match relay.exchange(&params.code, &params.state).await {
		Ok(credential) => (
			StatusCode::OK,
			format!("Authorization successful! Credential stored for `{}`.", credential.user_id),
		)
			.into_response(),
		Err(e) => error_response(&e),
	}
}

async fn lookup(State(relay): State<Arc<Relay>>, Path(user_id): Path<String>) -> Response {
	let Ok(user_id) = UserId::new(&user_id) else {
		return not_authorized();
	};

	match relay.store().get(&user_id).await {
		Ok(Some(credential)) => (
			StatusCode::OK,
			Json(json!({ "success": true, "token": credential.access_token.expose() })),
		)
			.into_response(),
		// An unreadable store reads as absent, per the store contract.
		Ok(None) | Err(_) => not_authorized(),
	}
}

async fn enumerate(State(relay): State<Arc<Relay>>) -> Response {
	let entries = relay.store().list().await.unwrap_or_default();
	let users = entries
		.into_iter()
		.map(|(user_id, credential)| {
			json!({ "user_id": user_id, "token": credential.access_token.expose() })
		})
		.collect::<Vec<_>>();

	(StatusCode::OK, Json(json!({ "users": users }))).into_response()
}

async fn health(State(relay): State<Arc<Relay>>) -> Response {
	let config = relay.config();

	// Presence booleans only; the values themselves are never echoed back.
	(
		StatusCode::OK,
		Json(json!({
			"client_id": !config.client_id.is_empty(),
			"client_secret": !config.client_secret.is_empty(),
			"redirect_uri": !config.redirect_uri.is_empty(),
		})),
	)
		.into_response()
}

fn not_authorized() -> Response {
	(StatusCode::NOT_FOUND, Json(json!({ "success": false, "error": "User not authorized" })))
		.into_response()
}

fn error_response(error: &Error) -> Response {
	let status = match error {
		Error::MissingCode
		| Error::MissingState
		| Error::ProviderRejected { .. }
		| Error::MalformedResponse { .. } => StatusCode::BAD_REQUEST,
		Error::Configuration(_) | Error::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
		// The provider being unreachable is not the caller's fault nor ours.
		Error::Transport { .. } => StatusCode::BAD_GATEWAY,
	};

	(status, error.to_string()).into_response()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{config::ConfigError, store::StoreError};

	#[test]
	fn engine_errors_map_to_the_contract_statuses() {
		let cases = [
			(Error::MissingCode, StatusCode::BAD_REQUEST),
			(Error::MissingState, StatusCode::BAD_REQUEST),
			(
				Error::ProviderRejected { status: 400, body: "invalid_grant".into() },
				StatusCode::BAD_REQUEST,
			),
			(
				Error::MalformedResponse { reason: "body is not a JSON object".into(), source: None },
				StatusCode::BAD_REQUEST,
			),
			(
				Error::Configuration(ConfigError::Missing { missing: vec!["client_id"] }),
				StatusCode::INTERNAL_SERVER_ERROR,
			),
			(
				Error::Persistence {
					credential: Box::new(crate::auth::Credential::bearer(
						UserId::new("user-42").expect("User fixture should be valid."),
						"tok-xyz",
					)),
					source: StoreError::WriteFailed { message: "disk full".into() },
				},
				StatusCode::INTERNAL_SERVER_ERROR,
			),
			(
				Error::Transport { source: "connection reset".into() },
				StatusCode::BAD_GATEWAY,
			),
		];

		for (error, expected) in cases {
			assert_eq!(error_response(&error).status(), expected, "mapping for {error:?}");
		}
	}
}
