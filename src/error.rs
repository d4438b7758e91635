//! Broker-level error types shared across adapters, the store, and the HTTP boundary.

// self
use crate::{_prelude::*, connection::ConnectionId, provider::ProviderKind};

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical broker error exposed by every connection operation.
///
/// Adapter failures propagate through the broker and proxy unmodified; translation to HTTP
/// status codes happens only at the boundary layer.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),

	/// The end-user declined consent; the provider reported an explicit error on the callback.
	#[error("{provider} reported an authorization error: {detail}.")]
	AuthorizationDenied {
		/// Provider the callback came from.
		provider: ProviderKind,
		/// Raw error text reported by the provider.
		detail: String,
	},
	/// The authorization callback carried neither a code nor a provider error.
	#[error("Authorization callback from {provider} is missing the code parameter.")]
	MissingCode {
		/// Provider the callback came from.
		provider: ProviderKind,
	},
	/// The provider rejected the authorization-code exchange.
	#[error("{provider} rejected the authorization code exchange: {detail}.")]
	OAuthExchangeFailed {
		/// Provider whose token endpoint rejected the exchange.
		provider: ProviderKind,
		/// HTTP status returned by the token endpoint, when available.
		status: Option<u16>,
		/// Raw response text from the provider for diagnostics.
		detail: String,
	},
	/// The token endpoint answered 2xx with a body that does not parse as a token payload.
	#[error("{provider} token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Provider whose token endpoint produced the payload.
		provider: ProviderKind,
		/// Structured parsing failure naming the offending JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// The token payload carried a lifetime whose expiry cannot be represented.
	#[error("{provider} token endpoint returned an expires_in outside the supported range.")]
	ExpiresInOutOfRange {
		/// Provider whose token endpoint produced the payload.
		provider: ProviderKind,
		/// Offending lifetime in seconds.
		seconds: i64,
	},
	/// No credential record is stored for the requested identity.
	#[error("No {provider} connection is stored for identity `{identity}`.")]
	UnknownConnection {
		/// Provider the caller addressed.
		provider: ProviderKind,
		/// Identity that was never connected (or whose process-lifetime record is gone).
		identity: ConnectionId,
	},
	/// The provider resource endpoint answered with a non-success status.
	#[error("{provider} API call failed with status {status}: {detail}.")]
	ProviderApi {
		/// Provider whose resource endpoint failed.
		provider: ProviderKind,
		/// HTTP status returned by the resource endpoint.
		status: u16,
		/// Raw response body from the provider for diagnostics.
		detail: String,
	},
	/// The network call itself failed (DNS, TCP, TLS, timeout, body decode).
	#[error("Network error occurred while calling {provider}.")]
	Transport {
		/// Provider being called when the transport failed.
		provider: ProviderKind,
		/// Underlying HTTP client failure.
		#[source]
		source: reqwest::Error,
	},
	/// The requested resource belongs to the other provider.
	#[error("{provider} does not serve the requested resource.")]
	UnsupportedResource {
		/// Provider the caller addressed.
		provider: ProviderKind,
	},
}

/// Fatal configuration failures raised at startup; the process must not serve traffic.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// One or more required environment variables are absent or empty.
	#[error("Missing required environment variables: {}.", .keys.join(", "))]
	MissingVars {
		/// Names of every variable that failed validation.
		keys: Vec<&'static str>,
	},
	/// A configured value does not parse as a URL.
	#[error("Configuration value `{key}` does not hold a valid URL.")]
	InvalidUrl {
		/// Name of the offending value.
		key: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The listen address does not parse as a socket address.
	#[error("Listen address `{value}` is invalid.")]
	InvalidListenAddr {
		/// Offending address string.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: std::net::AddrParseError,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying client builder failure.
		#[source]
		source: reqwest::Error,
	},
}
impl From<reqwest::Error> for ConfigError {
	fn from(e: reqwest::Error) -> Self {
		Self::HttpClientBuild { source: e }
	}
}
