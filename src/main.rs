//! Service entrypoint: load configuration, wire the broker, serve the HTTP API.

// std
use std::sync::Arc;
// crates.io
use anyhow::Result;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
// self
use connect_broker::{
	api::{self, AppState},
	broker::ConnectionBroker,
	config::AppConfig,
	http::HttpClient,
	store::MemoryStore,
};

#[tokio::main]
async fn main() -> Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| "connect_broker=info,tower_http=info".into()),
		)
		.init();

	let config = AppConfig::from_env()?;
	let http = HttpClient::new()?;
	let broker = ConnectionBroker::new(&config, http, Arc::new(MemoryStore::default()))?;
	let listener = TcpListener::bind(config.listen).await?;
	let state = AppState { broker: Arc::new(broker), config: Arc::new(config) };

	tracing::info!(addr = %state.config.listen, "connection broker listening");

	api::serve(listener, state).await?;

	Ok(())
}
