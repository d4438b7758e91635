//! Provider adapters: one generic capability set, two concrete variants.
//!
//! Every adapter implements the same three operations - compose the authorization URL, exchange
//! an authorization code, call the resource API - and the broker selects a variant by
//! [`ProviderKind`]. Per-provider differences (token payload shape, identity derivation,
//! resource verbs) stay inside the variant modules.

pub mod ga;
pub mod stripe;

pub use ga::GaAdapter;
pub use stripe::StripeAdapter;

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	config::OAuthConfig,
	connection::{ConnectionId, CredentialRecord},
	http::HttpClient,
};

/// Adapter operation future alias.
pub type AdapterFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Tag selecting one concrete adapter variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProviderKind {
	/// Stripe Connect, the payments provider.
	Stripe,
	/// Google Analytics 4, the web-analytics provider.
	Ga,
}
impl ProviderKind {
	/// Stable machine tag used for route prefixes and metric labels.
	pub fn tag(self) -> &'static str {
		match self {
			Self::Stripe => "stripe",
			Self::Ga => "ga",
		}
	}

	/// Slug used in the post-auth frontend redirect path.
	pub fn success_slug(self) -> &'static str {
		match self {
			Self::Stripe => "stripe",
			Self::Ga => "ga4",
		}
	}

	/// Query-parameter name carrying the identity on the success redirect.
	pub fn identity_param(self) -> &'static str {
		match self {
			Self::Stripe => "account_id",
			Self::Ga => "connection_id",
		}
	}
}
impl Display for ProviderKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(match self {
			Self::Stripe => "Stripe",
			Self::Ga => "GA4",
		})
	}
}

/// Resource request carried from the proxy to an adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceRequest {
	/// Most recent charges with a page-size limit (payments provider).
	Charges {
		/// Page size, 1..=100.
		limit: u8,
	},
	/// Active-users report grouped by default channel over a trailing window (analytics
	/// provider).
	BasicReport {
		/// Trailing window in days, 1..=30.
		days: u16,
	},
}

/// Per-provider implementation of the OAuth + resource-call contract.
pub trait ProviderAdapter
where
	Self: Send + Sync,
{
	/// Tag identifying the concrete variant.
	fn kind(&self) -> ProviderKind;

	/// Composes the provider authorization URL for the given CSRF state.
	///
	/// Pure function of configuration plus `state`: no side effects, no network call, and
	/// identical inputs produce an identical URL.
	fn build_authorize_url(&self, state: &str) -> Url;

	/// Exchanges an authorization code for the connection identity and its credential record.
	///
	/// Performs exactly one call to the provider token endpoint. The failure carries the
	/// provider's raw response text.
	fn exchange_code<'a>(
		&'a self,
		code: &'a str,
	) -> AdapterFuture<'a, (ConnectionId, CredentialRecord)>;

	/// Issues one authorized call to the provider resource endpoint.
	fn call_resource<'a>(
		&'a self,
		access_token: &'a str,
		request: &'a ResourceRequest,
	) -> AdapterFuture<'a, serde_json::Value>;
}

/// Form parameters shared by both providers' code exchanges.
///
/// Both providers take their credentials in the body (`client_secret_post` style) and validate
/// that the redirect URI matches the one used on the authorize URL.
fn exchange_form<'a>(oauth: &'a OAuthConfig, code: &'a str) -> [(&'static str, &'a str); 5] {
	[
		("grant_type", "authorization_code"),
		("code", code),
		("redirect_uri", oauth.redirect_uri.as_str()),
		("client_id", &oauth.client_id),
		("client_secret", oauth.client_secret.expose()),
	]
}

/// Posts the code exchange and returns the raw success body.
///
/// A non-success status maps to [`Error::OAuthExchangeFailed`] carrying the provider's text.
pub(crate) async fn post_exchange(
	provider: ProviderKind,
	http: &HttpClient,
	oauth: &OAuthConfig,
	code: &str,
) -> Result<String> {
	let response = http
		.post(oauth.token_endpoint.clone())
		.header(reqwest::header::ACCEPT, "application/json")
		.form(&exchange_form(oauth, code))
		.send()
		.await
		.map_err(|source| Error::Transport { provider, source })?;
	let status = response.status();
	let body = response.text().await.map_err(|source| Error::Transport { provider, source })?;

	if !status.is_success() {
		return Err(Error::OAuthExchangeFailed {
			provider,
			status: Some(status.as_u16()),
			detail: body,
		});
	}

	Ok(body)
}

/// Deserializes a 2xx token body, naming the offending JSON path on failure.
pub(crate) fn parse_token_payload<T>(provider: ProviderKind, body: &str) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_str(body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| Error::TokenResponseParse { provider, source })
}

/// Maps a resource response to its JSON body or a [`Error::ProviderApi`] with the raw text.
pub(crate) async fn read_resource_response(
	provider: ProviderKind,
	response: reqwest::Response,
) -> Result<serde_json::Value> {
	let status = response.status();

	if !status.is_success() {
		let detail =
			response.text().await.map_err(|source| Error::Transport { provider, source })?;

		return Err(Error::ProviderApi { provider, status: status.as_u16(), detail });
	}

	response.json().await.map_err(|source| Error::Transport { provider, source })
}
