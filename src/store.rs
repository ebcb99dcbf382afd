//! Storage contracts and built-in credential store implementations.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{Credential, UserId},
};

/// Future type returned by [`CredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Alias for the full keyed record set held in memory and on disk.
pub type CredentialMap = HashMap<UserId, Credential>;

/// Keyed persistence contract for relay credentials.
///
/// Exactly one record exists per user; `put` fully replaces any prior record for the
/// same key (last-write-wins, no field merge).
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Fetches the record for the user, if present.
	///
	/// Absence is not an error, and an unreadable backing store reads as absent.
	fn get<'a>(&'a self, user_id: &'a UserId) -> StoreFuture<'a, Option<Credential>>;

	/// Persists or replaces the record keyed by `credential.user_id`.
	///
	/// Atomic from the caller's perspective: the full current set is loaded, the one
	/// key is set, and the full set is written back.
	fn put(&self, credential: Credential) -> StoreFuture<'_, ()>;

	/// Returns every stored record. Order is unspecified.
	fn list(&self) -> StoreFuture<'_, Vec<(UserId, Credential)>>;
}

/// Error type produced by [`CredentialStore`] implementations.
///
/// Only the durable write itself can fail; load-time corruption is recovered to an
/// empty set instead of propagating, because the all-keys snapshot is regenerated on
/// every successful write anyway.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// The durable write failed; the previous snapshot on disk is intact.
	#[error("Failed to write the credential store: {message}.")]
	WriteFailed {
		/// Human-readable error payload.
		message: String,
	},
}
