mod common;

// std
use std::path::Path;
// crates.io
use axum::{
	Router,
	body::Body,
	http::{Request, StatusCode, header},
	response::Response,
};
use http_body_util::BodyExt;
use tower::ServiceExt;
// self
use common::*;

fn direct_router(server: &MockServer) -> Router {
	let state = AppState::new(static_forwarder(server), Some(authorizer(mock_descriptor(server))));

	make_router(state, None)
}

fn get(uri: &str) -> Request<Body> {
	Request::builder().uri(uri).body(Body::empty()).expect("GET request fixture should build.")
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
	Request::builder()
		.method("POST")
		.uri(uri)
		.header(header::CONTENT_TYPE, "application/json")
		.body(Body::from(body.to_string()))
		.expect("POST request fixture should build.")
}

async fn body_text(response: Response) -> String {
	let bytes = response
		.into_body()
		.collect()
		.await
		.expect("Response body should be readable.")
		.to_bytes();

	String::from_utf8(bytes.to_vec()).expect("Response body should be UTF-8.")
}

async fn body_json(response: Response) -> Value {
	serde_json::from_str(&body_text(response).await).expect("Response body should be JSON.")
}

#[tokio::test]
async fn auth_returns_the_authorization_url() {
	let server = MockServer::start_async().await;
	let response =
		direct_router(&server).oneshot(get("/auth")).await.expect("Router should respond.");

	assert_eq!(response.status(), StatusCode::OK);

	let body = body_json(response).await;
	let auth_url = Url::parse(body["authUrl"].as_str().expect("authUrl should be a string."))
		.expect("authUrl should be a valid URL.");

	assert_eq!(auth_url.path(), "/authorize");
	assert!(auth_url.query_pairs().any(|(key, value)| key == "access_type" && value == "offline"));
}

#[tokio::test]
async fn callback_redirects_after_a_successful_exchange() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"ya29.access\",\"token_type\":\"Bearer\",\"expires_in\":3599}");
		})
		.await;
	let response = direct_router(&server)
		.oneshot(get("/auth/callback?code=4%2F0Ab-valid"))
		.await
		.expect("Router should respond.");

	mock.assert_async().await;

	assert_eq!(response.status(), StatusCode::SEE_OTHER);
	assert_eq!(
		response.headers().get(header::LOCATION).and_then(|value| value.to_str().ok()),
		Some("/?authorized=true")
	);
}

#[tokio::test]
async fn callback_failures_answer_with_a_generic_error() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\",\"error_description\":\"Bad Request\"}");
		})
		.await;

	for uri in ["/auth/callback?code=stale", "/auth/callback?error=access_denied", "/auth/callback"]
	{
		let response =
			direct_router(&server).oneshot(get(uri)).await.expect("Router should respond.");

		assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
		assert_eq!(body_json(response).await, json!({ "error": "Authentication failed" }));
	}

	// Only the request carrying a code reaches the token endpoint.
	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn api_routes_relay_the_remote_body() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(REMOTE_PATH).json_body(json!({
				"action": "exportToSheet",
				"sheetId": "1AbCdEfGhIjK",
				"data": [["page", "clicks"], ["/", 3]],
			}));
			then.status(200).json_body(json!({ "success": true }));
		})
		.await;
	let response = direct_router(&server)
		.oneshot(post_json("/api/exportToSheet", json!({ "data": [["page", "clicks"], ["/", 3]] })))
		.await
		.expect("Router should respond.");

	mock.assert_async().await;

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(body_json(response).await, json!({ "success": true }));
}

#[tokio::test]
async fn api_failures_never_leak_upstream_text() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(REMOTE_PATH);
			then.status(502).body("Exception: quota exceeded for property 314159");
		})
		.await;
	let cases = [
		("/api/fetchAnalytics", "Failed to fetch Analytics data"),
		("/api/fetchSearchConsole", "Failed to fetch Search Console data"),
		("/api/exportToSheet", "Failed to export data to sheet"),
	];

	for (uri, message) in cases {
		let response = direct_router(&server)
			.oneshot(post_json(uri, json!({ "dateRange": "7daysAgo", "dataType": "analytics" })))
			.await
			.expect("Router should respond.");

		assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "{uri}");

		let text = body_text(response).await;

		assert!(!text.contains("quota"), "{uri} leaked upstream detail: {text}");
		assert_eq!(
			serde_json::from_str::<Value>(&text).expect("Error body should be JSON."),
			json!({ "error": message })
		);
	}

	mock.assert_calls_async(3).await;
}

#[tokio::test]
async fn delegated_router_has_no_auth_routes() {
	let server = MockServer::start_async().await;
	let forwarder =
		RequestForwarder::new(remote(&server), Arc::new(CredentialsCache::new(remote(&server))));
	let router = make_router(AppState::new(forwarder, None), None);
	let response = router.oneshot(get("/auth")).await.expect("Router should respond.");

	assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unmatched_paths_fall_back_to_static_assets() {
	let server = MockServer::start_async().await;
	let state = AppState::new(static_forwarder(&server), None);
	let static_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/public");
	let router = make_router(state, Some(static_dir.as_path()));
	let response = router.oneshot(get("/")).await.expect("Router should respond.");

	assert_eq!(response.status(), StatusCode::OK);
	assert!(body_text(response).await.contains("Reporting dashboard"));
}

#[tokio::test]
async fn preflight_requests_are_allowed_from_any_origin() {
	let server = MockServer::start_async().await;
	let request = Request::builder()
		.method("OPTIONS")
		.uri("/api/fetchAnalytics")
		.header(header::ORIGIN, "https://dashboard.example.com")
		.header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
		.header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
		.body(Body::empty())
		.expect("Preflight request fixture should build.");
	let response = direct_router(&server).oneshot(request).await.expect("Router should respond.");

	assert!(response.status().is_success());
	assert_eq!(
		response
			.headers()
			.get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
			.and_then(|value| value.to_str().ok()),
		Some("*")
	);
	assert!(response.headers().contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
}

#[tokio::test]
async fn simple_requests_carry_the_cors_header() {
	let server = MockServer::start_async().await;
	let request = Request::builder()
		.uri("/auth")
		.header(header::ORIGIN, "https://dashboard.example.com")
		.body(Body::empty())
		.expect("Cross-origin request fixture should build.");
	let response = direct_router(&server).oneshot(request).await.expect("Router should respond.");

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(
		response
			.headers()
			.get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
			.and_then(|value| value.to_str().ok()),
		Some("*")
	);
}
