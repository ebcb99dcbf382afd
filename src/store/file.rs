//! JSON-file-backed [`CredentialStore`] holding one `users.json`-style snapshot.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::{Credential, UserId},
	obs,
	store::{CredentialMap, CredentialStore, StoreError, StoreFuture},
};

/// Outcome of reading the durable snapshot.
///
/// Corruption never propagates to callers: the public contract recovers to an empty
/// set and the next successful write regenerates the whole snapshot. The tag keeps
/// the recovery path observable.
#[derive(Debug)]
pub enum Loaded {
	/// Snapshot parsed cleanly, or did not exist yet (a fresh deployment starts clean).
	Intact(CredentialMap),
	/// Snapshot was unreadable or unparseable; the store starts empty.
	RecoveredToEmpty {
		/// Why the snapshot was discarded.
		reason: String,
	},
}
impl Loaded {
	/// Unwraps the usable record set; empty after a recovery.
	pub fn into_map(self) -> CredentialMap {
		match self {
			Loaded::Intact(map) => map,
			Loaded::RecoveredToEmpty { .. } => CredentialMap::new(),
		}
	}
}

/// Persists relay credentials to a single JSON object after each mutation.
///
/// The snapshot is loaded lazily on first read access. Mutations are serialized
/// through one in-process async mutex around the whole load-modify-persist cycle and
/// reload the set from disk first, so external writers are tolerated best-effort;
/// cross-process races remain out of scope. The snapshot is replaced via temp file +
/// fsync + atomic rename, so readers never observe a partially-written file.
#[derive(Debug)]
pub struct FileStore {
	path: PathBuf,
	cache: RwLock<Option<CredentialMap>>,
	write_guard: AsyncMutex<()>,
}
impl FileStore {
	/// Creates a store over the provided snapshot path.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		Ok(Self { path, cache: RwLock::new(None), write_guard: AsyncMutex::new(()) })
	}

	/// Reads and tags the current durable snapshot without touching the cache.
	pub fn load(&self) -> Loaded {
		Self::load_snapshot(&self.path)
	}

	fn load_snapshot(path: &Path) -> Loaded {
		if !path.exists() {
			return Loaded::Intact(CredentialMap::new());
		}

		let bytes = match fs::read(path) {
			Ok(bytes) => bytes,
			Err(e) =>
				return Self::recovered(format!("Failed to read {}: {e}", path.display())),
		};

		if bytes.is_empty() {
			return Loaded::Intact(CredentialMap::new());
		}

		match serde_json::from_slice::<CredentialMap>(&bytes) {
			Ok(map) => Loaded::Intact(map),
			Err(e) => Self::recovered(format!("Failed to parse {}: {e}", path.display())),
		}
	}

	fn recovered(reason: String) -> Loaded {
		obs::warn(format!("Credential snapshot recovered to empty: {reason}"));

		Loaded::RecoveredToEmpty { reason }
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::WriteFailed {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist(&self, contents: &CredentialMap) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized =
			serde_json::to_vec_pretty(contents).map_err(|e| StoreError::WriteFailed {
				message: format!("Failed to serialize store snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::WriteFailed {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::WriteFailed {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::WriteFailed {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::WriteFailed {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}

	fn snapshot(&self) -> CredentialMap {
		if let Some(map) = self.cache.read().as_ref() {
			return map.clone();
		}

		let loaded = self.load().into_map();

		*self.cache.write() = Some(loaded.clone());

		loaded
	}
}
impl CredentialStore for FileStore {
	fn get<'a>(&'a self, user_id: &'a UserId) -> StoreFuture<'a, Option<Credential>> {
		Box::pin(async move { Ok(self.snapshot().get(user_id).cloned()) })
	}

	fn put(&self, credential: Credential) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let _writer = self.write_guard.lock().await;
			// Reload inside the critical section so a concurrent external writer's
			// entries survive this mutation.
			let mut map = self.load().into_map();

			map.insert(credential.user_id.clone(), credential);
			self.persist(&map)?;
			*self.cache.write() = Some(map);

			Ok(())
		})
	}

	fn list(&self) -> StoreFuture<'_, Vec<(UserId, Credential)>> {
		Box::pin(async move { Ok(self.snapshot().into_iter().collect()) })
	}
}
