// std
use std::{sync::Arc, time::Duration};
// crates.io
use httpmock::prelude::*;
use url::Url;
// self
use oauth2_relay::{
	auth::TokenSecret,
	config::RelayConfig,
	error::Error,
	exchange::Relay,
	hook::{HttpMembershipHook, MembershipConfig, MembershipHook},
	store::{CredentialStore, MemoryStore},
};

fn build_membership(server: &MockServer) -> MembershipConfig {
	MembershipConfig {
		endpoint: Url::parse(&server.url("/guilds"))
			.expect("Mock membership endpoint should parse successfully."),
		group_id: "group-1".into(),
		bot_token: TokenSecret::new("bot-secret"),
	}
}

fn build_relay(provider: &MockServer, membership: &MockServer) -> Relay {
	let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::default());
	let config = RelayConfig::new(
		"client-it",
		"secret-it",
		"https://app.example.com/callback",
		Url::parse(&provider.url("/token")).expect("Mock token endpoint should parse successfully."),
	);
	let hook: Arc<dyn MembershipHook> = Arc::new(
		HttpMembershipHook::new(build_membership(membership))
			.expect("Hook construction should succeed."),
	);

	Relay::new(store, config).expect("Relay construction should succeed.").with_hook(hook)
}

/// The hook runs on a detached task; poll briefly instead of racing it.
async fn wait_for_hits(mock: &httpmock::Mock<'_>, expected: usize) -> usize {
	for _ in 0..100 {
		let hits = mock.hits_async().await;

		if hits >= expected {
			return hits;
		}

		tokio::time::sleep(Duration::from_millis(10)).await;
	}

	mock.hits_async().await
}

#[tokio::test]
async fn successful_exchange_fires_the_membership_hook() {
	let provider = MockServer::start_async().await;
	let membership = MockServer::start_async().await;
	let relay = build_relay(&provider, &membership);
	let _token_mock = provider
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).body("{\"access_token\":\"tok-xyz\"}");
		})
		.await;
	let member_mock = membership
		.mock_async(|when, then| {
			when.method(PUT)
				.path("/guilds/group-1/members/user-42")
				.header("authorization", "Bot bot-secret")
				.json_body(serde_json::json!({ "access_token": "tok-xyz" }));
			then.status(201);
		})
		.await;

	relay.exchange("abc123", "user-42").await.expect("Exchange should succeed.");

	assert_eq!(wait_for_hits(&member_mock, 1).await, 1);
}

#[tokio::test]
async fn hook_failure_never_affects_the_exchange_result() {
	let provider = MockServer::start_async().await;
	let membership = MockServer::start_async().await;
	let relay = build_relay(&provider, &membership);
	let _token_mock = provider
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).body("{\"access_token\":\"tok-xyz\"}");
		})
		.await;
	let member_mock = membership
		.mock_async(|when, then| {
			when.method(PUT).path("/guilds/group-1/members/user-42");
			then.status(403).body("{\"message\":\"Missing Permissions\"}");
		})
		.await;
	let credential = relay
		.exchange("abc123", "user-42")
		.await
		.expect("A rejected membership call must not fail the exchange.");

	assert_eq!(credential.access_token.expose(), "tok-xyz");
	assert_eq!(wait_for_hits(&member_mock, 1).await, 1);
}

#[tokio::test]
async fn failed_exchanges_never_reach_the_membership_endpoint() {
	let provider = MockServer::start_async().await;
	let membership = MockServer::start_async().await;
	let relay = build_relay(&provider, &membership);
	let _token_mock = provider
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(400).body("{\"error_description\":\"invalid_grant\"}");
		})
		.await;
	let member_mock = membership
		.mock_async(|when, then| {
			when.method(PUT).path_includes("/members/");
			then.status(201);
		})
		.await;
	let err = relay
		.exchange("stale-code", "user-42")
		.await
		.expect_err("A rejected grant should fail the exchange.");

	assert!(matches!(err, Error::ProviderRejected { .. }));

	// Give a hypothetical stray task a moment to run before asserting silence.
	tokio::time::sleep(Duration::from_millis(50)).await;

	assert_eq!(member_mock.hits_async().await, 0);
}

#[tokio::test]
async fn direct_hook_call_reports_rejections() {
	let membership = MockServer::start_async().await;
	let _member_mock = membership
		.mock_async(|when, then| {
			when.method(PUT).path("/guilds/group-1/members/user-42");
			then.status(403).body("Missing Permissions");
		})
		.await;
	let hook = HttpMembershipHook::new(build_membership(&membership))
		.expect("Hook construction should succeed.");
	let user = oauth2_relay::auth::UserId::new("user-42").expect("User fixture should be valid.");
	let token = TokenSecret::new("tok-xyz");
	let err = hook
		.add_member(&user, &token)
		.await
		.expect_err("A 403 from the membership endpoint should surface as a rejection.");

	assert!(err.to_string().contains("403"));
}
