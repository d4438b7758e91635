//! OAuth connection broker - link Stripe and GA4 accounts through authorization-code flows and
//! proxy authorized charge and report reads.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod broker;
pub mod config;
pub mod connection;
pub mod error;
pub mod http;
pub mod obs;
pub mod provider;
pub mod store;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience fixtures for integration tests; enabled via `cfg(test)` or the `test` crate
	//! feature.

	pub use crate::_prelude::*;

	// std
	use std::net::SocketAddr;
	// self
	use crate::{
		api::AppState,
		broker::ConnectionBroker,
		config::{AppConfig, GaConfig, OAuthConfig, StripeConfig},
		connection::TokenSecret,
		http::HttpClient,
		store::MemoryStore,
	};

	/// Stripe client id used across test fixtures.
	pub const TEST_STRIPE_CLIENT_ID: &str = "abc";
	/// Stripe redirect URI used across test fixtures.
	pub const TEST_STRIPE_REDIRECT_URI: &str = "http://x/cb";
	/// GA4 property targeted by test fixtures.
	pub const TEST_GA_PROPERTY: &str = "555777";
	/// Mock-server path of the Stripe token endpoint.
	pub const STRIPE_TOKEN_PATH: &str = "/stripe/oauth/token";
	/// Mock-server path of the Google token endpoint.
	pub const GA_TOKEN_PATH: &str = "/google/oauth/token";
	/// Mock-server path of the Stripe charges endpoint.
	pub const STRIPE_CHARGES_PATH: &str = "/stripe-api/v1/charges";

	/// Mock-server path of the GA4 report endpoint for [`TEST_GA_PROPERTY`].
	pub fn ga_report_path() -> String {
		format!("/ga-api/v1beta/properties/{TEST_GA_PROPERTY}:runReport")
	}

	/// Builds an application config whose outbound endpoints all live under `base`, a mock
	/// server root such as `http://127.0.0.1:39999`.
	pub fn test_app_config(base: &str) -> AppConfig {
		let url = |path: &str| {
			Url::parse(&format!("{base}{path}")).expect("Fixture URL should parse successfully.")
		};
		let stripe = StripeConfig {
			oauth: OAuthConfig {
				client_id: TEST_STRIPE_CLIENT_ID.into(),
				client_secret: TokenSecret::new("sk_test_fixture"),
				redirect_uri: Url::parse(TEST_STRIPE_REDIRECT_URI)
					.expect("Fixture redirect URI should parse successfully."),
				scope: "read_write".into(),
				authorize_endpoint: url("/stripe/authorize"),
				token_endpoint: url(STRIPE_TOKEN_PATH),
			},
			api_base: url("/stripe-api/"),
		};
		let ga = GaConfig {
			oauth: OAuthConfig {
				client_id: "ga-client".into(),
				client_secret: TokenSecret::new("ga-secret"),
				redirect_uri: url("/ga/oauth/callback"),
				scope: "https://www.googleapis.com/auth/analytics.readonly".into(),
				authorize_endpoint: url("/google/authorize"),
				token_endpoint: url(GA_TOKEN_PATH),
			},
			property_id: TEST_GA_PROPERTY.into(),
			api_base: url("/ga-api/"),
		};

		AppConfig {
			stripe,
			ga,
			frontend_url: "http://localhost:3000".into(),
			listen: SocketAddr::from(([127, 0, 0, 1], 0)),
			cors_origins: vec!["http://localhost:3000".into()],
		}
	}

	/// Constructs a broker backed by an in-memory store and the default HTTP client, returning
	/// the concrete store handle for direct inspection.
	pub fn build_test_broker(config: &AppConfig) -> (ConnectionBroker, Arc<MemoryStore>) {
		let store = Arc::new(MemoryStore::default());
		let http = HttpClient::new().expect("Fixture HTTP client should build successfully.");
		let broker = ConnectionBroker::new(config, http, store.clone())
			.expect("Fixture broker should build successfully.");

		(broker, store)
	}

	/// Constructs the full route state for boundary tests.
	pub fn build_test_state(config: AppConfig) -> (AppState, Arc<MemoryStore>) {
		let (broker, store) = build_test_broker(&config);

		(AppState { broker: Arc::new(broker), config: Arc::new(config) }, store)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	pub use reqwest::Client as ReqwestClient;
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use serde_json;
pub use url;

// Used by the binary target.
use {anyhow as _, tracing_subscriber as _};
#[cfg(test)] use {connect_broker as _, httpmock as _};
