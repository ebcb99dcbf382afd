//! Runs the full relay as a standalone HTTP service: environment configuration, a
//! file-backed credential store, and the callback + read-back routes.

// std
use std::{env, sync::Arc};
// crates.io
use color_eyre::Result;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
// self
use oauth2_relay::{
	api,
	config::RelayConfig,
	exchange::Relay,
	hook::{HttpMembershipHook, MembershipConfig, MembershipHook},
	store::{CredentialStore, FileStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let config = RelayConfig::from_env()?;
	let snapshot_path = env::var("CREDENTIALS_FILE").unwrap_or_else(|_| "users.json".into());
	let store: Arc<dyn CredentialStore> = Arc::new(FileStore::open(snapshot_path)?);
	let mut relay = Relay::new(store, config)?;

	if let Some(membership) = MembershipConfig::from_env()? {
		let hook: Arc<dyn MembershipHook> = Arc::new(HttpMembershipHook::new(membership)?);

		relay = relay.with_hook(hook);
	}

	let port = env::var("PORT").ok().and_then(|raw| raw.parse::<u16>().ok()).unwrap_or(3000);
	let listener = TcpListener::bind(("0.0.0.0", port)).await?;

	println!("OAuth callback relay listening on port {port}.");

	axum::serve(listener, api::router(Arc::new(relay))).await?;

	Ok(())
}
