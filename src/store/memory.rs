//! Thread-safe in-memory [`CredentialStore`] implementation.
//!
//! Process-lifetime storage: a restart clears every connection and the affected accounts must
//! re-consent. `put` and `get` for the same key are linearizable through the write lock.

// self
use crate::{
	_prelude::*,
	connection::CredentialRecord,
	store::{CredentialStore, StoreError, StoreFuture, StoreKey},
};

type StoreMap = Arc<RwLock<HashMap<StoreKey, CredentialRecord>>>;

/// Thread-safe storage backend that keeps credential records in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	fn put_now(map: StoreMap, key: StoreKey, record: CredentialRecord) -> Result<(), StoreError> {
		map.write().insert(key, record);

		Ok(())
	}

	fn get_now(map: StoreMap, key: StoreKey) -> Option<CredentialRecord> {
		map.read().get(&key).cloned()
	}
}
impl CredentialStore for MemoryStore {
	fn put(&self, key: StoreKey, record: CredentialRecord) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move { Self::put_now(map, key, record) })
	}

	fn get<'a>(&'a self, key: &'a StoreKey) -> StoreFuture<'a, Option<CredentialRecord>> {
		let map = self.0.clone();
		let key = key.clone();

		Box::pin(async move { Ok(Self::get_now(map, key)) })
	}
}
