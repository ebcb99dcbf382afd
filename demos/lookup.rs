//! Reads credentials back from a relay snapshot file: look one user up, then list all.

// std
use std::{env, sync::Arc};
// crates.io
use color_eyre::Result;
// self
use oauth2_relay::{
	auth::UserId,
	store::{CredentialStore, FileStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let snapshot_path = env::var("CREDENTIALS_FILE").unwrap_or_else(|_| "users.json".into());
	let store: Arc<dyn CredentialStore> = Arc::new(FileStore::open(snapshot_path)?);

	if let Some(raw) = env::args().nth(1) {
		let user_id = UserId::new(&raw)?;

		match store.get(&user_id).await? {
			Some(credential) =>
				println!("`{user_id}` authorized at {}.", credential.obtained_at),
			None => println!("`{user_id}` is not authorized."),
		}

		return Ok(());
	}

	let entries = store.list().await?;

	println!("{} credential(s) stored.", entries.len());

	for (user_id, credential) in entries {
		println!("- {user_id} (obtained {})", credential.obtained_at);
	}

	Ok(())
}
