//! Storage contract and built-in store implementation for connection credentials.

pub mod memory;

pub use memory::MemoryStore;

// self
use crate::{_prelude::*, connection::{ConnectionId, CredentialRecord}, provider::ProviderKind};

/// Persistence contract future for credential stores.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract implemented by credential stores.
///
/// The in-memory backend never fails; the error channel exists so a durable backend can slot in
/// without changing any caller.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Persists or replaces the credential record stored under the provided key.
	fn put(&self, key: StoreKey, record: CredentialRecord) -> StoreFuture<'_, ()>;

	/// Fetches the record stored under the key, if present.
	fn get<'a>(&'a self, key: &'a StoreKey) -> StoreFuture<'a, Option<CredentialRecord>>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum StoreError {
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Unique key identifying a stored credential record.
///
/// Identities are unique per (provider, external account), so the provider tag participates in
/// the key; the analytics placeholder identity cannot collide with a payments account id.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StoreKey {
	/// Provider the connection belongs to.
	pub provider: ProviderKind,
	/// Connection identity component.
	pub identity: ConnectionId,
}
impl StoreKey {
	/// Builds a key for the provided provider and identity.
	pub fn new(provider: ProviderKind, identity: &ConnectionId) -> Self {
		Self { provider, identity: identity.clone() }
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;
	use crate::error::Error;

	#[test]
	fn store_error_converts_into_broker_error_with_source() {
		let store_error = StoreError::Backend { message: "database unreachable".into() };
		let broker_error: Error = store_error.clone().into();

		assert!(matches!(broker_error, Error::Storage(_)));
		assert!(broker_error.to_string().contains("database unreachable"));

		let source = StdError::source(&broker_error)
			.expect("Broker error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn store_key_separates_providers() {
		let identity = ConnectionId::new("default").expect("Identity fixture should be valid.");
		let payments = StoreKey::new(ProviderKind::Stripe, &identity);
		let analytics = StoreKey::new(ProviderKind::Ga, &identity);

		assert_ne!(payments, analytics);
		assert_eq!(payments, StoreKey::new(ProviderKind::Stripe, &identity));
	}
}
