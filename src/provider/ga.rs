//! Google Analytics 4 adapter: authorize URL, code exchange, basic-report resource.

// self
use crate::{
	_prelude::*,
	config::GaConfig,
	connection::{ConnectionId, CredentialRecord, IssuedMetadata, TokenSecret},
	error::ConfigError,
	http::HttpClient,
	provider::{self, AdapterFuture, ProviderAdapter, ProviderKind, ResourceRequest},
};

/// Analytics adapter speaking Google OAuth and the GA4 Data API.
///
/// Connections share one fixed identity until per-account scoping exists, so a new consent
/// overwrites the previous analytics connection. The authorize URL requests offline access with
/// a forced consent screen because Google only issues a refresh token on a consenting grant.
#[derive(Clone, Debug)]
pub struct GaAdapter {
	config: GaConfig,
	http: HttpClient,
	report_endpoint: Url,
}
impl GaAdapter {
	/// Fixed identity shared by every analytics connection.
	pub const DEFAULT_CONNECTION: &'static str = "default";

	/// Builds the adapter, resolving the report endpoint for the configured property.
	pub fn new(config: GaConfig, http: HttpClient) -> Result<Self, ConfigError> {
		let report_endpoint = config
			.api_base
			.join(&format!("v1beta/properties/{}:runReport", config.property_id))
			.map_err(|source| ConfigError::InvalidUrl { key: "GA_API_BASE", source })?;

		Ok(Self { config, http, report_endpoint })
	}

	fn report_body(days: u16) -> serde_json::Value {
		serde_json::json!({
			"dateRanges": [{ "startDate": format!("{days}daysAgo"), "endDate": "today" }],
			"dimensions": [{ "name": "sessionDefaultChannelGroup" }],
			"metrics": [{ "name": "activeUsers" }],
			"limit": 10,
		})
	}
}
impl ProviderAdapter for GaAdapter {
	fn kind(&self) -> ProviderKind {
		ProviderKind::Ga
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
		pairs.append_pair("access_type", "offline");
		pairs.append_pair("include_granted_scopes", "true");
		pairs.append_pair("prompt", "consent");

		drop(pairs);

		url
	}

	fn exchange_code<'a>(
		&'a self,
		code: &'a str,
	) -> AdapterFuture<'a, (ConnectionId, CredentialRecord)> {
		Box::pin(async move {
			let body =
				provider::post_exchange(ProviderKind::Ga, &self.http, &self.config.oauth, code)
					.await?;
			let payload =
				provider::parse_token_payload::<GaTokenResponse>(ProviderKind::Ga, &body)?;
			let identity = ConnectionId::new(Self::DEFAULT_CONNECTION).map_err(|e| {
				Error::OAuthExchangeFailed {
					provider: ProviderKind::Ga,
					status: None,
					detail: format!("default connection identity is unusable: {e}"),
				}
			})?;
			let mut issued = IssuedMetadata::issued_now();

			if let Some(lifetime) = payload.expires_in {
				issued = issued.expires_in(Duration::seconds(lifetime)).ok_or(
					Error::ExpiresInOutOfRange { provider: ProviderKind::Ga, seconds: lifetime },
				)?;
			}

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
			let ResourceRequest::BasicReport { days } = *request else {
				return Err(Error::UnsupportedResource { provider: ProviderKind::Ga });
			};
			let response = self
				.http
				.post(self.report_endpoint.clone())
				.bearer_auth(access_token)
				.json(&Self::report_body(days))
				.send()
				.await
				.map_err(|source| Error::Transport { provider: ProviderKind::Ga, source })?;

			provider::read_resource_response(ProviderKind::Ga, response).await
		})
	}
}

/// Token payload returned by Google's token endpoint.
#[derive(Debug, Deserialize)]
struct GaTokenResponse {
	access_token: String,
	#[serde(default)]
	expires_in: Option<i64>,
	#[serde(default)]
	refresh_token: Option<String>,
	#[serde(default)]
	scope: Option<String>,
	#[serde(default)]
	token_type: Option<String>,
}
