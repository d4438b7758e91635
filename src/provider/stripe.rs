//! Stripe Connect adapter: authorize URL, code exchange, charges resource.

// self
use crate::{
	_prelude::*,
	config::StripeConfig,
	connection::{ConnectionId, CredentialRecord, IssuedMetadata, TokenSecret},
	error::ConfigError,
	http::HttpClient,
	provider::{self, AdapterFuture, ProviderAdapter, ProviderKind, ResourceRequest},
};

/// Payments adapter speaking Stripe Connect OAuth.
///
/// The exchange authenticates with the platform secret key as the client secret; the connection
/// identity is the `stripe_user_id` (connected account id) returned in the token payload, and
/// resource calls authenticate with the connected account's access token.
#[derive(Clone, Debug)]
pub struct StripeAdapter {
	config: StripeConfig,
	http: HttpClient,
	charges_endpoint: Url,
}
impl StripeAdapter {
	/// Builds the adapter, resolving resource endpoints from the configured API base.
	pub fn new(config: StripeConfig, http: HttpClient) -> Result<Self, ConfigError> {
		let charges_endpoint = config
			.api_base
			.join("v1/charges")
			.map_err(|source| ConfigError::InvalidUrl { key: "STRIPE_API_BASE", source })?;

		Ok(Self { config, http, charges_endpoint })
	}
}
impl ProviderAdapter for StripeAdapter {
	fn kind(&self) -> ProviderKind {
		ProviderKind::Stripe
	}

	fn build_authorize_url(&self, state: &str) -> Url {
		let oauth = &self.config.oauth;
		let mut url = oauth.authorize_endpoint.clone();
		let mut pairs = url.query_pairs_mut();

		pairs.append_pair("response_type", "code");
		pairs.append_pair("client_id", &oauth.client_id);
		pairs.append_pair("redirect_uri", oauth.redirect_uri.as_str());
		pairs.append_pair("scope", &oauth.scope);
		pairs.append_pair("state", state);

		drop(pairs);

		url
	}

	fn exchange_code<'a>(
		&'a self,
		code: &'a str,
	) -> AdapterFuture<'a, (ConnectionId, CredentialRecord)> {
		Box::pin(async move {
			let body =
				provider::post_exchange(ProviderKind::Stripe, &self.http, &self.config.oauth, code)
					.await?;
			let payload =
				provider::parse_token_payload::<StripeTokenResponse>(ProviderKind::Stripe, &body)?;
			let identity = ConnectionId::new(&payload.stripe_user_id).map_err(|e| {
				Error::OAuthExchangeFailed {
					provider: ProviderKind::Stripe,
					status: None,
					detail: format!("token payload carried an unusable account id: {e}"),
				}
			})?;
			let mut issued = IssuedMetadata::issued_now();

			issued.livemode = payload.livemode;
			issued.publishable_key = payload.stripe_publishable_key;

			let record = CredentialRecord {
				access_token: TokenSecret::new(payload.access_token),
				refresh_token: payload.refresh_token.map(TokenSecret::new),
				token_type: payload.token_type,
				scope: payload.scope,
				issued,
			};

			Ok((identity, record))
		})
	}

	fn call_resource<'a>(
		&'a self,
		access_token: &'a str,
		request: &'a ResourceRequest,
	) -> AdapterFuture<'a, serde_json::Value> {
		Box::pin(async move {
			let ResourceRequest::Charges { limit } = *request else {
				return Err(Error::UnsupportedResource { provider: ProviderKind::Stripe });
			};
			let mut url = self.charges_endpoint.clone();

			url.query_pairs_mut().append_pair("limit", &limit.to_string());

			let response = self
				.http
				.get(url)
				.bearer_auth(access_token)
				.send()
				.await
				.map_err(|source| Error::Transport { provider: ProviderKind::Stripe, source })?;

			provider::read_resource_response(ProviderKind::Stripe, response).await
		})
	}
}

/// Token payload returned by the Stripe Connect token endpoint.
#[derive(Debug, Deserialize)]
struct StripeTokenResponse {
	access_token: String,
	stripe_user_id: String,
	#[serde(default)]
	refresh_token: Option<String>,
	#[serde(default)]
	token_type: Option<String>,
	#[serde(default)]
	scope: Option<String>,
	#[serde(default)]
	livemode: Option<bool>,
	#[serde(default)]
	stripe_publishable_key: Option<String>,
}
