//! Connection broker: a uniform begin-connect / complete-connect / call-on-behalf-of contract.

// self
use crate::{
	_prelude::*,
	config::AppConfig,
	connection::{ConnectionId, CredentialRecord},
	error::ConfigError,
	http::HttpClient,
	obs::{self, OperationKind, OperationOutcome},
	provider::{GaAdapter, ProviderAdapter, ProviderKind, ResourceRequest, StripeAdapter},
	store::{CredentialStore, StoreKey},
};

/// Query parameters delivered to an OAuth callback route.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CallbackParams {
	/// Authorization code issued by the provider on success.
	pub code: Option<String>,
	/// CSRF state echoed back by the provider; carried but not verified in this scope.
	pub state: Option<String>,
	/// Provider-reported error (e.g. `access_denied`) when the end-user declined consent.
	pub error: Option<String>,
}
impl CallbackParams {
	/// Resolves the authorization code from the callback.
	///
	/// A provider-reported `error` takes precedence over a missing `code`; empty parameter
	/// values count as absent.
	pub fn require_code(&self, provider: ProviderKind) -> Result<&str> {
		if let Some(error) = self.error.as_deref().filter(|error| !error.is_empty()) {
			return Err(Error::AuthorizationDenied { provider, detail: error.to_owned() });
		}

		self.code
			.as_deref()
			.filter(|code| !code.is_empty())
			.ok_or(Error::MissingCode { provider })
	}
}

/// Coordinates the two provider adapters and the credential store.
///
/// Every operation is uniform across providers; the concrete adapter is selected by
/// [`ProviderKind`]. The broker holds no state of its own beyond the shared collaborators, and
/// all credential mutation goes through the store contract.
#[derive(Clone)]
pub struct ConnectionBroker {
	store: Arc<dyn CredentialStore>,
	stripe: Arc<dyn ProviderAdapter>,
	ga: Arc<dyn ProviderAdapter>,
}
impl ConnectionBroker {
	/// Builds a broker wired to the configured Stripe and GA4 adapters.
	pub fn new(
		config: &AppConfig,
		http: HttpClient,
		store: Arc<dyn CredentialStore>,
	) -> Result<Self, ConfigError> {
		let stripe = StripeAdapter::new(config.stripe.clone(), http.clone())?;
		let ga = GaAdapter::new(config.ga.clone(), http)?;

		Ok(Self::with_adapters(store, Arc::new(stripe), Arc::new(ga)))
	}

	/// Builds a broker from caller-provided adapters.
	pub fn with_adapters(
		store: Arc<dyn CredentialStore>,
		stripe: Arc<dyn ProviderAdapter>,
		ga: Arc<dyn ProviderAdapter>,
	) -> Self {
		Self { store, stripe, ga }
	}

	fn adapter(&self, provider: ProviderKind) -> &dyn ProviderAdapter {
		match provider {
			ProviderKind::Stripe => self.stripe.as_ref(),
			ProviderKind::Ga => self.ga.as_ref(),
		}
	}

	/// Returns the provider authorization URL for the given CSRF state.
	pub fn begin_connect(&self, provider: ProviderKind, state: &str) -> Url {
		self.adapter(provider).build_authorize_url(state)
	}

	/// Exchanges the callback code and stores the resulting credential record.
	///
	/// The store write happens only after a successful exchange, so a rejected code never
	/// leaves a partial record behind.
	pub async fn complete_connect(
		&self,
		provider: ProviderKind,
		code: &str,
	) -> Result<ConnectionId> {
		const KIND: OperationKind = OperationKind::CompleteConnect;

		obs::record_operation(KIND, provider, OperationOutcome::Attempt);

		let result = async {
			let (identity, record) = self.adapter(provider).exchange_code(code).await?;
			let key = StoreKey::new(provider, &identity);

			<dyn CredentialStore>::put(self.store.as_ref(), key, record)
				.await
				.map_err(Error::from)?;

			Ok(identity)
		}
		.await;

		match &result {
			Ok(identity) => {
				obs::record_operation(KIND, provider, OperationOutcome::Success);
				tracing::info!(
					provider = provider.tag(),
					identity = %identity,
					"connection established",
				);
			},
			Err(error) => {
				obs::record_operation(KIND, provider, OperationOutcome::Failure);
				tracing::warn!(provider = provider.tag(), %error, "connection attempt failed");
			},
		}

		result
	}

	/// Resolves the stored access token for `identity` and forwards the resource request.
	///
	/// A miss is [`Error::UnknownConnection`]: a bookkeeping gap rather than a permissions
	/// problem, surfaced as not-found at the boundary.
	pub async fn resource_call(
		&self,
		provider: ProviderKind,
		identity: &ConnectionId,
		request: &ResourceRequest,
	) -> Result<serde_json::Value> {
		const KIND: OperationKind = OperationKind::ResourceCall;

		obs::record_operation(KIND, provider, OperationOutcome::Attempt);

		let result = async {
			let key = StoreKey::new(provider, identity);
			let record: CredentialRecord =
				<dyn CredentialStore>::get(self.store.as_ref(), &key)
					.await
					.map_err(Error::from)?
					.ok_or_else(|| Error::UnknownConnection {
						provider,
						identity: identity.clone(),
					})?;

			self.adapter(provider).call_resource(record.access_token.expose(), request).await
		}
		.await;

		match &result {
			Ok(_) => obs::record_operation(KIND, provider, OperationOutcome::Success),
			Err(error) => {
				obs::record_operation(KIND, provider, OperationOutcome::Failure);
				tracing::debug!(
					provider = provider.tag(),
					identity = %identity,
					%error,
					"resource call failed",
				);
			},
		}

		result
	}
}
impl Debug for ConnectionBroker {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ConnectionBroker")
			.field("stripe", &self.stripe.kind())
			.field("ga", &self.ga.kind())
			.finish()
	}
}
