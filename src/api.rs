//! HTTP surface: route wiring, parameter validation and boundary translation.
//!
//! Routes stay thin. Each handler validates its inbound parameters, hands the work to the
//! [`ConnectionBroker`] and shapes the outbound body; status codes are assigned in
//! [`error::ApiError`] and nowhere else.

pub mod error;
use error::ApiError;

// crates.io
use axum::{
	Router,
	extract::{Path, Query, State},
	http::{HeaderValue, Method, header},
	response::{Json, Redirect},
	routing::get,
};
use tokio::net::TcpListener;
use tower_http::{
	cors::{AllowOrigin, CorsLayer},
	trace::TraceLayer,
};
// self
use crate::{
	_prelude::*,
	broker::{CallbackParams, ConnectionBroker},
	config::AppConfig,
	connection::ConnectionId,
	provider::{ProviderKind, ResourceRequest},
};

const DEFAULT_CSRF_STATE: &str = "demo-state";
const DEFAULT_CHARGE_LIMIT: u8 = 10;
const MAX_CHARGE_LIMIT: u8 = 100;
const DEFAULT_REPORT_DAYS: u16 = 7;
const MAX_REPORT_DAYS: u16 = 30;

/// Shared state handed to every route handler.
#[derive(Clone, Debug)]
pub struct AppState {
	/// Connection broker shared across requests.
	pub broker: Arc<ConnectionBroker>,
	/// Static configuration resolved at startup.
	pub config: Arc<AppConfig>,
}

#[derive(Debug, Deserialize)]
struct AuthorizeQuery {
	state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChargesQuery {
	limit: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReportQuery {
	days: Option<String>,
}

#[derive(Debug, Serialize)]
struct AuthorizeUrlResponse {
	url: String,
}

/// Serves the API on `listener` until the process is stopped.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
	axum::serve(listener, router(state)).await
}

/// Builds the full route tree with request tracing and CORS applied.
pub fn router(state: AppState) -> Router {
	let cors = cors_layer(&state.config);

	Router::new()
		.route("/health", get(health))
		.nest("/stripe", stripe_routes())
		.nest("/ga", ga_routes())
		.layer(TraceLayer::new_for_http())
		.layer(cors)
		.with_state(state)
}

fn stripe_routes() -> Router<AppState> {
	Router::new()
		.route("/oauth/url", get(stripe_oauth_url))
		.route("/oauth/callback", get(stripe_oauth_callback))
		.route("/{account_id}/charges", get(stripe_charges))
}

fn ga_routes() -> Router<AppState> {
	Router::new()
		.route("/oauth/url", get(ga_oauth_url))
		.route("/oauth/callback", get(ga_oauth_callback))
		.route("/{connection_id}/basic-report", get(ga_basic_report))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
	let origins = config
		.cors_origins
		.iter()
		.filter_map(|origin| match origin.parse::<HeaderValue>() {
			Ok(value) => Some(value),
			Err(_) => {
				tracing::warn!(%origin, "ignoring unparseable CORS origin");

				None
			},
		})
		.collect::<Vec<_>>();

	CorsLayer::new()
		.allow_origin(AllowOrigin::list(origins))
		.allow_methods([Method::GET, Method::POST, Method::OPTIONS])
		.allow_headers([header::ACCEPT, header::AUTHORIZATION, header::CONTENT_TYPE])
		.allow_credentials(true)
}

async fn health() -> Json<serde_json::Value> {
	Json(serde_json::json!({ "status": "ok" }))
}

fn begin_connect(
	state: &AppState,
	provider: ProviderKind,
	query: AuthorizeQuery,
) -> Json<AuthorizeUrlResponse> {
	let csrf_state = query.state.as_deref().unwrap_or(DEFAULT_CSRF_STATE);
	let url = state.broker.begin_connect(provider, csrf_state);

	Json(AuthorizeUrlResponse { url: url.into() })
}

async fn complete_connect(
	state: &AppState,
	provider: ProviderKind,
	params: CallbackParams,
) -> Result<Redirect, ApiError> {
	let code = params.require_code(provider)?;
	let identity = state.broker.complete_connect(provider, code).await?;

	Ok(Redirect::temporary(&state.config.success_redirect(provider, &identity)))
}

fn parse_identity(provider: ProviderKind, raw: String) -> Result<ConnectionId, ApiError> {
	ConnectionId::new(raw).map_err(|error| {
		ApiError::InvalidParam(format!(
			"Path parameter `{}` is invalid: {error}",
			provider.identity_param(),
		))
	})
}

/// Parses an optional bounded numeric query parameter.
///
/// Absent and empty values fall back to `default`; anything unparsable or outside `1..=max` maps
/// to [`ApiError::InvalidParam`] so every rejection shares the JSON error body.
fn bounded_param<T>(name: &str, raw: Option<&str>, default: T, max: T) -> Result<T, ApiError>
where
	T: Copy + Display + FromStr + PartialOrd + From<u8>,
{
	let Some(raw) = raw.filter(|raw| !raw.is_empty()) else {
		return Ok(default);
	};

	raw.parse()
		.ok()
		.filter(|value| (T::from(1)..=max).contains(value))
		.ok_or_else(|| {
			ApiError::InvalidParam(format!(
				"Query parameter `{name}` must be an integer between 1 and {max}.",
			))
		})
}

async fn stripe_oauth_url(
	State(state): State<AppState>,
	Query(query): Query<AuthorizeQuery>,
) -> Json<AuthorizeUrlResponse> {
	begin_connect(&state, ProviderKind::Stripe, query)
}

async fn ga_oauth_url(
	State(state): State<AppState>,
	Query(query): Query<AuthorizeQuery>,
) -> Json<AuthorizeUrlResponse> {
	begin_connect(&state, ProviderKind::Ga, query)
}

async fn stripe_oauth_callback(
	State(state): State<AppState>,
	Query(params): Query<CallbackParams>,
) -> Result<Redirect, ApiError> {
	complete_connect(&state, ProviderKind::Stripe, params).await
}

async fn ga_oauth_callback(
	State(state): State<AppState>,
	Query(params): Query<CallbackParams>,
) -> Result<Redirect, ApiError> {
	complete_connect(&state, ProviderKind::Ga, params).await
}

async fn stripe_charges(
	State(state): State<AppState>,
	Path(account_id): Path<String>,
	Query(query): Query<ChargesQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
	let limit =
		bounded_param("limit", query.limit.as_deref(), DEFAULT_CHARGE_LIMIT, MAX_CHARGE_LIMIT)?;
	let identity = parse_identity(ProviderKind::Stripe, account_id)?;
	let charges = state
		.broker
		.resource_call(ProviderKind::Stripe, &identity, &ResourceRequest::Charges { limit })
		.await?;

	Ok(Json(shape_charges(charges)))
}

async fn ga_basic_report(
	State(state): State<AppState>,
	Path(connection_id): Path<String>,
	Query(query): Query<ReportQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
	let days = bounded_param("days", query.days.as_deref(), DEFAULT_REPORT_DAYS, MAX_REPORT_DAYS)?;
	let identity = parse_identity(ProviderKind::Ga, connection_id)?;
	let report = state
		.broker
		.resource_call(ProviderKind::Ga, &identity, &ResourceRequest::BasicReport { days })
		.await?;

	Ok(Json(report))
}

/// Charge listings leave as `{"items": [...]}`, lifted from the provider's `data` array.
fn shape_charges(charges: serde_json::Value) -> serde_json::Value {
	let items =
		charges.get("data").cloned().unwrap_or_else(|| serde_json::Value::Array(Vec::new()));

	serde_json::json!({ "items": items })
}
