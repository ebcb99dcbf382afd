// std
use std::sync::Arc;
// crates.io
use axum::{
	Router,
	body::Body,
	http::{Request, StatusCode},
};
use httpmock::prelude::*;
use tower::ServiceExt;
use url::Url;
// self
use oauth2_relay::{
	api,
	auth::{Credential, UserId},
	config::RelayConfig,
	exchange::Relay,
	store::{CredentialStore, MemoryStore},
};

fn build_router(server: &MockServer) -> (Router, Arc<MemoryStore>) {
	let backend = Arc::new(MemoryStore::default());
	let config = RelayConfig::new(
		"client-it",
		"secret-it",
		"https://app.example.com/callback",
		Url::parse(&server.url("/token")).expect("Mock token endpoint should parse successfully."),
	);

	(build_router_with(backend.clone(), config), backend)
}

fn build_router_with(backend: Arc<MemoryStore>, config: RelayConfig) -> Router {
	let store: Arc<dyn CredentialStore> = backend;
	let relay = Relay::new(store, config).expect("Relay construction should succeed.");

	api::router(Arc::new(relay))
}

async fn send(router: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
	let response = router
		.clone()
		.oneshot(Request::builder().uri(uri).body(Body::empty()).expect("Request should build."))
		.await
		.expect("Router call should succeed.");
	let status = response.status();
	let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
		.await
		.expect("Body should collect.");

	(status, bytes.to_vec())
}

fn as_json(bytes: &[u8]) -> serde_json::Value {
	serde_json::from_slice(bytes).expect("Response body should be JSON.")
}

#[tokio::test]
async fn root_reports_liveness() {
	let server = MockServer::start_async().await;
	let (router, _) = build_router(&server);
	let (status, body) = send(&router, "/").await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body, b"OAuth callback relay is running!");
}

#[tokio::test]
async fn callback_exchange_then_lookup_round_trip() {
	let server = MockServer::start_async().await;
	let (router, _) = build_router(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"tok-xyz\",\"token_type\":\"Bearer\"}");
		})
		.await;
	let (status, body) = send(&router, "/callback?code=abc123&state=user-42").await;

	mock.assert_async().await;

	assert_eq!(status, StatusCode::OK);
	assert!(String::from_utf8_lossy(&body).contains("Authorization successful!"));

	let (status, body) = send(&router, "/token/user-42").await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(as_json(&body), serde_json::json!({ "success": true, "token": "tok-xyz" }));

	let (status, body) = send(&router, "/token/user-99").await;

	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(
		as_json(&body),
		serde_json::json!({ "success": false, "error": "User not authorized" }),
	);
}

#[tokio::test]
async fn missing_callback_parameters_name_the_missing_field() {
	let server = MockServer::start_async().await;
	let (router, _) = build_router(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).body("{\"access_token\":\"never\"}");
		})
		.await;
	let (status, body) = send(&router, "/callback?state=user-42").await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body, b"Missing authorization code.");

	let (status, body) = send(&router, "/callback?code=abc123").await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body, b"Missing state parameter.");
	assert_eq!(mock.hits_async().await, 0, "The provider must not be contacted.");
}

#[tokio::test]
async fn provider_rejections_surface_as_bad_request_with_detail() {
	let server = MockServer::start_async().await;
	let (router, _) = build_router(&server);
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error_description\":\"invalid_grant\"}");
		})
		.await;
	let (status, body) = send(&router, "/callback?code=stale&state=user-42").await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert!(String::from_utf8_lossy(&body).contains("invalid_grant"));
}

#[tokio::test]
async fn misconfiguration_is_a_server_error_that_leaks_no_secret() {
	let server = MockServer::start_async().await;
	let backend = Arc::new(MemoryStore::default());
	let config = RelayConfig::new(
		"client-it",
		"",
		"https://app.example.com/callback",
		Url::parse(&server.url("/token")).expect("Mock token endpoint should parse successfully."),
	);
	let router = build_router_with(backend, config);
	let (status, body) = send(&router, "/callback?code=abc123&state=user-42").await;
	let text = String::from_utf8_lossy(&body).into_owned();

	assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
	assert!(text.contains("client_secret"));
	assert!(!text.contains("secret-it"));
}

#[tokio::test]
async fn unreachable_provider_is_a_bad_gateway() {
	let backend = Arc::new(MemoryStore::default());
	let config = RelayConfig::new(
		"client-it",
		"secret-it",
		"https://app.example.com/callback",
		Url::parse("http://127.0.0.1:9/token").expect("Unreachable endpoint should parse."),
	);
	let router = build_router_with(backend, config);
	let (status, _) = send(&router, "/callback?code=abc123&state=user-42").await;

	assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn enumerate_lists_every_stored_user() {
	let server = MockServer::start_async().await;
	let (router, backend) = build_router(&server);

	backend
		.put(Credential::bearer(
			UserId::new("user-a").expect("User fixture should be valid."),
			"tok-a",
		))
		.await
		.expect("Seeding the store should succeed.");
	backend
		.put(Credential::bearer(
			UserId::new("user-b").expect("User fixture should be valid."),
			"tok-b",
		))
		.await
		.expect("Seeding the store should succeed.");

	let (status, body) = send(&router, "/tokens").await;

	assert_eq!(status, StatusCode::OK);

	let json = as_json(&body);
	let mut users = json["users"]
		.as_array()
		.expect("`users` should be an array.")
		.iter()
		.map(|entry| {
			(
				entry["user_id"].as_str().expect("`user_id` should be a string.").to_owned(),
				entry["token"].as_str().expect("`token` should be a string.").to_owned(),
			)
		})
		.collect::<Vec<_>>();

	users.sort();

	assert_eq!(
		users,
		vec![("user-a".to_owned(), "tok-a".to_owned()), ("user-b".to_owned(), "tok-b".to_owned())],
	);
}

#[tokio::test]
async fn health_reports_presence_booleans_without_values() {
	let server = MockServer::start_async().await;
	let backend = Arc::new(MemoryStore::default());
	let config = RelayConfig::new(
		"client-it",
		"",
		"https://app.example.com/callback",
		Url::parse(&server.url("/token")).expect("Mock token endpoint should parse successfully."),
	);
	let router = build_router_with(backend, config);
	let (status, body) = send(&router, "/health").await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(
		as_json(&body),
		serde_json::json!({ "client_id": true, "client_secret": false, "redirect_uri": true }),
	);
	assert!(!String::from_utf8_lossy(&body).contains("client-it"));
}
