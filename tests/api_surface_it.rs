// crates.io
use httpmock::prelude::*;
use reqwest::{Client, Method, StatusCode, redirect::Policy};
use tokio::net::TcpListener;
// self
use connect_broker::{
	_preludet::*,
	api,
	connection::{ConnectionId, CredentialRecord, IssuedMetadata, TokenSecret},
	provider::ProviderKind,
	serde_json::{Value, json},
	store::{CredentialStore, MemoryStore, StoreKey},
};

async fn spawn_api(mock_base: &str) -> (String, Arc<MemoryStore>) {
	let (state, store) = build_test_state(test_app_config(mock_base));
	let listener = TcpListener::bind("127.0.0.1:0")
		.await
		.expect("Binding an ephemeral port should succeed.");
	let addr = listener.local_addr().expect("Listener should report its local address.");

	tokio::spawn(api::serve(listener, state));

	(format!("http://{addr}"), store)
}

fn api_client() -> Client {
	Client::builder()
		.redirect(Policy::none())
		.build()
		.expect("Building the test HTTP client should succeed.")
}

async fn seed(
	store: &Arc<MemoryStore>,
	provider: ProviderKind,
	raw_identity: &str,
	access: &str,
) -> ConnectionId {
	let identity =
		ConnectionId::new(raw_identity).expect("Identity fixture should be valid for API tests.");
	let record = CredentialRecord {
		access_token: TokenSecret::new(access),
		refresh_token: None,
		token_type: Some("bearer".into()),
		scope: None,
		issued: IssuedMetadata::issued_now(),
	};

	store
		.put(StoreKey::new(provider, &identity), record)
		.await
		.expect("Seeding the store should succeed.");

	identity
}

#[tokio::test]
async fn health_reports_ok() {
	let server = MockServer::start_async().await;
	let (base, _store) = spawn_api(&server.base_url()).await;
	let response = api_client()
		.get(format!("{base}/health"))
		.send()
		.await
		.expect("Health request should succeed.");

	assert_eq!(response.status(), StatusCode::OK);

	let body: Value = response.json().await.expect("Health body should be JSON.");

	assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn oauth_url_routes_return_the_authorize_link() {
	let server = MockServer::start_async().await;
	let (base, _store) = spawn_api(&server.base_url()).await;
	let client = api_client();
	let response = client
		.get(format!("{base}/stripe/oauth/url?state=xyz"))
		.send()
		.await
		.expect("Stripe oauth/url request should succeed.");

	assert_eq!(response.status(), StatusCode::OK);

	let body: Value = response.json().await.expect("Stripe oauth/url body should be JSON.");
	let url = body["url"].as_str().expect("Response should carry a url string.");

	assert!(url.contains("client_id=abc"));
	assert!(url.contains("state=xyz"));

	let response = client
		.get(format!("{base}/ga/oauth/url"))
		.send()
		.await
		.expect("GA oauth/url request should succeed.");
	let body: Value = response.json().await.expect("GA oauth/url body should be JSON.");
	let url = body["url"].as_str().expect("Response should carry a url string.");

	assert!(url.contains("state=demo-state"), "a missing state should fall back to the demo value");
	assert!(url.contains("access_type=offline"));
}

#[tokio::test]
async fn denied_callbacks_beat_missing_codes() {
	let server = MockServer::start_async().await;
	let (base, _store) = spawn_api(&server.base_url()).await;
	let response = api_client()
		.get(format!("{base}/stripe/oauth/callback?error=access_denied"))
		.send()
		.await
		.expect("Denied callback request should succeed.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);

	let body: Value = response.json().await.expect("Denied callback body should be JSON.");
	let message = body["error"].as_str().expect("Error body should carry a message.");

	assert!(message.contains("access_denied"));
	assert!(!message.contains("missing the code"));
}

#[tokio::test]
async fn callbacks_without_codes_are_rejected() {
	let server = MockServer::start_async().await;
	let (base, _store) = spawn_api(&server.base_url()).await;
	let response = api_client()
		.get(format!("{base}/ga/oauth/callback"))
		.send()
		.await
		.expect("Empty callback request should succeed.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);

	let body: Value = response.json().await.expect("Empty callback body should be JSON.");

	assert!(
		body["error"]
			.as_str()
			.expect("Error body should carry a message.")
			.contains("missing the code")
	);
}

#[tokio::test]
async fn successful_callbacks_redirect_to_the_frontend() {
	let server = MockServer::start_async().await;
	let (base, _store) = spawn_api(&server.base_url()).await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(STRIPE_TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"access_token":"tok9","stripe_user_id":"acct_9"}"#);
		})
		.await;
	let response = api_client()
		.get(format!("{base}/stripe/oauth/callback?code=ok&state=s"))
		.send()
		.await
		.expect("Successful callback request should succeed.");

	assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);

	let location = response
		.headers()
		.get("location")
		.expect("Redirect should carry a location header.")
		.to_str()
		.expect("Location header should be valid text.");

	assert_eq!(location, "http://localhost:3000/integrations/stripe/success?account_id=acct_9");

	mock.assert_async().await;
}

#[tokio::test]
async fn failed_exchanges_map_to_bad_gateway() {
	let server = MockServer::start_async().await;
	let (base, _store) = spawn_api(&server.base_url()).await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(GA_TOKEN_PATH);
			then.status(401)
				.header("content-type", "application/json")
				.body(r#"{"error":"invalid_grant"}"#);
		})
		.await;
	let response = api_client()
		.get(format!("{base}/ga/oauth/callback?code=stale"))
		.send()
		.await
		.expect("Callback request should succeed.");

	assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

	let body: Value = response.json().await.expect("Exchange failure body should be JSON.");

	assert!(
		body["error"]
			.as_str()
			.expect("Error body should carry a message.")
			.contains("invalid_grant")
	);

	mock.assert_async().await;
}

#[tokio::test]
async fn charges_route_reshapes_the_provider_listing() {
	let server = MockServer::start_async().await;
	let (base, store) = spawn_api(&server.base_url()).await;

	seed(&store, ProviderKind::Stripe, "acct_7", "tok7").await;

	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(STRIPE_CHARGES_PATH)
				.query_param("limit", "2")
				.header("authorization", "Bearer tok7");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"object":"list","data":[{"id":"ch_1"},{"id":"ch_2"}],"has_more":true}"#);
		})
		.await;
	let response = api_client()
		.get(format!("{base}/stripe/acct_7/charges?limit=2"))
		.send()
		.await
		.expect("Charges request should succeed.");

	assert_eq!(response.status(), StatusCode::OK);

	let body: Value = response.json().await.expect("Charges body should be JSON.");

	assert_eq!(body, json!({ "items": [{ "id": "ch_1" }, { "id": "ch_2" }] }));

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn invalid_parameters_are_rejected_with_the_error_envelope() {
	let server = MockServer::start_async().await;
	let (base, store) = spawn_api(&server.base_url()).await;

	seed(&store, ProviderKind::Stripe, "acct_7", "tok7").await;
	seed(&store, ProviderKind::Ga, "default", "ga-tok").await;

	let client = api_client();

	for query in ["limit=200", "limit=300", "limit=soon"] {
		let response = client
			.get(format!("{base}/stripe/acct_7/charges?{query}"))
			.send()
			.await
			.expect("Invalid limit request should succeed.");

		assert_eq!(response.status(), StatusCode::BAD_REQUEST);

		let body: Value = response.json().await.expect("Invalid limit body should be JSON.");

		assert!(
			body["error"].as_str().expect("Error body should carry a message.").contains("limit")
		);
	}

	let response = client
		.get(format!("{base}/ga/default/basic-report?days=0"))
		.send()
		.await
		.expect("Zero-day report request should succeed.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);

	let body: Value = response.json().await.expect("Zero-day report body should be JSON.");

	assert!(body["error"].as_str().expect("Error body should carry a message.").contains("days"));
}

#[tokio::test]
async fn unknown_identities_map_to_not_found() {
	let server = MockServer::start_async().await;
	let (base, _store) = spawn_api(&server.base_url()).await;
	let response = api_client()
		.get(format!("{base}/stripe/acct_ghost/charges"))
		.send()
		.await
		.expect("Unknown identity request should succeed.");

	assert_eq!(response.status(), StatusCode::NOT_FOUND);

	let body: Value = response.json().await.expect("Not-found body should be JSON.");

	assert!(
		body["error"].as_str().expect("Error body should carry a message.").contains("acct_ghost")
	);
}

#[tokio::test]
async fn unknown_providers_have_no_routes() {
	let server = MockServer::start_async().await;
	let (base, _store) = spawn_api(&server.base_url()).await;
	let response = api_client()
		.get(format!("{base}/facebook/oauth/url"))
		.send()
		.await
		.expect("Unknown provider request should succeed.");

	assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cors_preflight_allows_the_configured_origin() {
	let server = MockServer::start_async().await;
	let (base, _store) = spawn_api(&server.base_url()).await;
	let response = api_client()
		.request(Method::OPTIONS, format!("{base}/stripe/oauth/url"))
		.header("origin", "http://localhost:3000")
		.header("access-control-request-method", "GET")
		.send()
		.await
		.expect("Preflight request should succeed.");
	let allow_origin = response
		.headers()
		.get("access-control-allow-origin")
		.expect("Preflight should answer with an allowed origin.")
		.to_str()
		.expect("Allow-origin header should be valid text.");
	let allow_credentials = response
		.headers()
		.get("access-control-allow-credentials")
		.expect("Preflight should answer the credentials flag.")
		.to_str()
		.expect("Allow-credentials header should be valid text.");

	assert_eq!(allow_origin, "http://localhost:3000");
	assert_eq!(allow_credentials, "true");
}
