//! Environment-supplied configuration, validated before the broker serves traffic.
//!
//! Every required value is checked up front and reported in one batch; a missing variable is a
//! fatal startup condition, never a per-request error. Endpoint URLs default to the live
//! provider hosts but stay plain config fields so tests can point an adapter at a mock server.

// std
use std::net::SocketAddr;
// self
use crate::{
	_prelude::*,
	connection::{ConnectionId, TokenSecret},
	error::ConfigError,
	provider::ProviderKind,
};

const STRIPE_AUTHORIZE_ENDPOINT: &str = "https://connect.stripe.com/oauth/authorize";
const STRIPE_TOKEN_ENDPOINT: &str = "https://connect.stripe.com/oauth/token";
const STRIPE_API_BASE: &str = "https://api.stripe.com";
const STRIPE_SCOPE: &str = "read_write";
const GA_AUTHORIZE_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GA_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const GA_API_BASE: &str = "https://analyticsdata.googleapis.com";
const GA_SCOPE: &str = "https://www.googleapis.com/auth/analytics.readonly";
const DEFAULT_STRIPE_REDIRECT_URI: &str = "http://localhost:8000/stripe/oauth/callback";
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_CORS_ORIGINS: [&str; 3] =
	["http://localhost:3000", "http://localhost:5173", "http://localhost:8080"];

/// OAuth application settings shared by both provider variants.
#[derive(Clone, Debug)]
pub struct OAuthConfig {
	/// OAuth client id registered with the provider.
	pub client_id: String,
	/// OAuth client secret; for the payments provider this is the platform secret key.
	pub client_secret: TokenSecret,
	/// Redirect URI registered with the provider; the exchange must send the same value.
	pub redirect_uri: Url,
	/// Scope string requested on the authorize URL.
	pub scope: String,
	/// Provider authorization endpoint.
	pub authorize_endpoint: Url,
	/// Provider token endpoint.
	pub token_endpoint: Url,
}

/// Payments-provider settings.
#[derive(Clone, Debug)]
pub struct StripeConfig {
	/// OAuth application settings.
	pub oauth: OAuthConfig,
	/// Base URL of the payments resource API.
	pub api_base: Url,
}

/// Analytics-provider settings.
#[derive(Clone, Debug)]
pub struct GaConfig {
	/// OAuth application settings.
	pub oauth: OAuthConfig,
	/// GA4 property the basic report runs against.
	pub property_id: String,
	/// Base URL of the analytics data API.
	pub api_base: Url,
}

/// Complete service configuration.
#[derive(Clone, Debug)]
pub struct AppConfig {
	/// Payments-provider settings.
	pub stripe: StripeConfig,
	/// Analytics-provider settings.
	pub ga: GaConfig,
	/// Frontend base URL for post-auth redirects, stored without a trailing slash.
	pub frontend_url: String,
	/// Socket address the HTTP listener binds.
	pub listen: SocketAddr,
	/// Origins allowed by the CORS layer.
	pub cors_origins: Vec<String>,
}
impl AppConfig {
	/// Reads and validates configuration from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let mut missing = Vec::new();
		let mut required = |key: &'static str| match lookup(key) {
			Some(value) if !value.is_empty() => value,
			_ => {
				missing.push(key);

				String::new()
			},
		};
		let stripe_secret_key = required("STRIPE_SECRET_KEY");
		let stripe_client_id = required("STRIPE_CLIENT_ID");
		let google_client_id = required("GOOGLE_CLIENT_ID");
		let google_client_secret = required("GOOGLE_CLIENT_SECRET");
		let google_redirect_uri = required("GOOGLE_REDIRECT_URI");
		let property_id = required("GA4_PROPERTY_ID");
		let frontend_url = required("FRONTEND_URL");

		if !missing.is_empty() {
			return Err(ConfigError::MissingVars { keys: missing });
		}

		// Validates the frontend base even though only the string is kept for redirects.
		parse_url("FRONTEND_URL", &frontend_url)?;

		let stripe_redirect_uri = lookup("STRIPE_REDIRECT_URI")
			.filter(|value| !value.is_empty())
			.unwrap_or_else(|| DEFAULT_STRIPE_REDIRECT_URI.into());
		let listen_addr = lookup("LISTEN_ADDR")
			.filter(|value| !value.is_empty())
			.unwrap_or_else(|| DEFAULT_LISTEN_ADDR.into());
		let listen = listen_addr.parse::<SocketAddr>().map_err(|source| {
			ConfigError::InvalidListenAddr { value: listen_addr.clone(), source }
		})?;
		let cors_origins = match lookup("CORS_ORIGINS").filter(|value| !value.is_empty()) {
			Some(raw) => raw
				.split(',')
				.map(|origin| origin.trim().to_owned())
				.filter(|origin| !origin.is_empty())
				.collect(),
			None => DEFAULT_CORS_ORIGINS.iter().map(|origin| (*origin).to_owned()).collect(),
		};
		let stripe = StripeConfig {
			oauth: OAuthConfig {
				client_id: stripe_client_id,
				client_secret: TokenSecret::new(stripe_secret_key),
				redirect_uri: parse_url("STRIPE_REDIRECT_URI", &stripe_redirect_uri)?,
				scope: STRIPE_SCOPE.into(),
				authorize_endpoint: parse_url(
					"STRIPE_AUTHORIZE_ENDPOINT",
					STRIPE_AUTHORIZE_ENDPOINT,
				)?,
				token_endpoint: parse_url("STRIPE_TOKEN_ENDPOINT", STRIPE_TOKEN_ENDPOINT)?,
			},
			api_base: parse_url("STRIPE_API_BASE", STRIPE_API_BASE)?,
		};
		let ga = GaConfig {
			oauth: OAuthConfig {
				client_id: google_client_id,
				client_secret: TokenSecret::new(google_client_secret),
				redirect_uri: parse_url("GOOGLE_REDIRECT_URI", &google_redirect_uri)?,
				scope: GA_SCOPE.into(),
				authorize_endpoint: parse_url("GA_AUTHORIZE_ENDPOINT", GA_AUTHORIZE_ENDPOINT)?,
				token_endpoint: parse_url("GA_TOKEN_ENDPOINT", GA_TOKEN_ENDPOINT)?,
			},
			property_id,
			api_base: parse_url("GA_API_BASE", GA_API_BASE)?,
		};

		Ok(Self {
			stripe,
			ga,
			frontend_url: frontend_url.trim_end_matches('/').to_owned(),
			listen,
			cors_origins,
		})
	}

	/// Builds the frontend URL the callback redirects to after a successful connection.
	pub fn success_redirect(&self, provider: ProviderKind, identity: &ConnectionId) -> String {
		format!(
			"{}/integrations/{}/success?{}={}",
			self.frontend_url,
			provider.success_slug(),
			provider.identity_param(),
			identity,
		)
	}
}

fn parse_url(key: &'static str, value: &str) -> Result<Url, ConfigError> {
	Url::parse(value).map_err(|source| ConfigError::InvalidUrl { key, source })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn full_env() -> HashMap<&'static str, &'static str> {
		HashMap::from_iter([
			("STRIPE_SECRET_KEY", "sk_test_123"),
			("STRIPE_CLIENT_ID", "ca_123"),
			("GOOGLE_CLIENT_ID", "google-client"),
			("GOOGLE_CLIENT_SECRET", "google-secret"),
			("GOOGLE_REDIRECT_URI", "http://localhost:8000/ga/oauth/callback"),
			("GA4_PROPERTY_ID", "987654321"),
			("FRONTEND_URL", "http://localhost:5173/"),
		])
	}

	fn from_map(map: &HashMap<&'static str, &'static str>) -> Result<AppConfig, ConfigError> {
		AppConfig::from_lookup(|key| map.get(key).map(|value| (*value).to_owned()))
	}

	#[test]
	fn full_environment_loads_with_defaults() {
		let config = from_map(&full_env()).expect("Full environment should validate.");

		assert_eq!(config.stripe.oauth.client_id, "ca_123");
		assert_eq!(config.stripe.oauth.client_secret.expose(), "sk_test_123");
		assert_eq!(config.stripe.oauth.scope, "read_write");
		assert_eq!(
			config.stripe.oauth.redirect_uri.as_str(),
			"http://localhost:8000/stripe/oauth/callback",
		);
		assert_eq!(config.ga.property_id, "987654321");
		assert_eq!(config.ga.oauth.scope, "https://www.googleapis.com/auth/analytics.readonly");
		assert_eq!(config.frontend_url, "http://localhost:5173");
		assert_eq!(config.listen.to_string(), "0.0.0.0:8000");
		assert_eq!(config.cors_origins.len(), 3);
	}

	#[test]
	fn missing_variables_are_reported_in_one_batch() {
		let err = from_map(&HashMap::new()).expect_err("Empty environment should fail.");

		match err {
			ConfigError::MissingVars { keys } => {
				assert_eq!(keys.len(), 7);
				assert!(keys.contains(&"STRIPE_SECRET_KEY"));
				assert!(keys.contains(&"FRONTEND_URL"));
			},
			other => panic!("Unexpected error variant: {other:?}"),
		}
	}

	#[test]
	fn empty_values_count_as_missing() {
		let mut env = full_env();

		env.insert("GOOGLE_CLIENT_ID", "");

		let err = from_map(&env).expect_err("Empty client id should fail.");

		match err {
			ConfigError::MissingVars { keys } => assert_eq!(keys, vec!["GOOGLE_CLIENT_ID"]),
			other => panic!("Unexpected error variant: {other:?}"),
		}
	}

	#[test]
	fn malformed_redirect_uri_is_rejected() {
		let mut env = full_env();

		env.insert("GOOGLE_REDIRECT_URI", "not a url");

		let err = from_map(&env).expect_err("Malformed redirect URI should fail.");

		assert!(matches!(err, ConfigError::InvalidUrl { key: "GOOGLE_REDIRECT_URI", .. }));
	}

	#[test]
	fn listen_and_cors_overrides_apply() {
		let mut env = full_env();

		env.insert("LISTEN_ADDR", "127.0.0.1:9001");
		env.insert("CORS_ORIGINS", "http://a.example, http://b.example");

		let config = from_map(&env).expect("Overridden environment should validate.");

		assert_eq!(config.listen.to_string(), "127.0.0.1:9001");
		assert_eq!(config.cors_origins, vec!["http://a.example", "http://b.example"]);

		env.insert("LISTEN_ADDR", "not-an-addr");

		let err = from_map(&env).expect_err("Malformed listen address should fail.");

		assert!(matches!(err, ConfigError::InvalidListenAddr { .. }));
	}

	#[test]
	fn success_redirect_targets_the_frontend() {
		let config = from_map(&full_env()).expect("Full environment should validate.");
		let account = ConnectionId::new("acct_1").expect("Identity fixture should be valid.");
		let connection = ConnectionId::new("default").expect("Identity fixture should be valid.");

		assert_eq!(
			config.success_redirect(ProviderKind::Stripe, &account),
			"http://localhost:5173/integrations/stripe/success?account_id=acct_1",
		);
		assert_eq!(
			config.success_redirect(ProviderKind::Ga, &connection),
			"http://localhost:5173/integrations/ga4/success?connection_id=default",
		);
	}
}
