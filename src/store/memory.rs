//! Thread-safe in-memory [`CredentialStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{Credential, UserId},
	store::{CredentialMap, CredentialStore, StoreError, StoreFuture},
};

type StoreMap = Arc<RwLock<CredentialMap>>;

/// Thread-safe storage backend that keeps records in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	fn put_now(map: StoreMap, credential: Credential) -> Result<(), StoreError> {
		map.write().insert(credential.user_id.clone(), credential);

		Ok(())
	}

	fn get_now(map: StoreMap, user_id: UserId) -> Option<Credential> {
		map.read().get(&user_id).cloned()
	}

	fn list_now(map: StoreMap) -> Vec<(UserId, Credential)> {
		map.read().iter().map(|(user_id, credential)| (user_id.clone(), credential.clone())).collect()
	}
}
impl CredentialStore for MemoryStore {
	fn get<'a>(&'a self, user_id: &'a UserId) -> StoreFuture<'a, Option<Credential>> {
		let map = self.0.clone();
		let user_id = user_id.to_owned();

		Box::pin(async move { Ok(Self::get_now(map, user_id)) })
	}

	fn put(&self, credential: Credential) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move { Self::put_now(map, credential) })
	}

	fn list(&self) -> StoreFuture<'_, Vec<(UserId, Credential)>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::list_now(map)) })
	}
}
