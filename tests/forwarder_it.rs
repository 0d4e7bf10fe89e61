mod common;

// self
use common::*;

#[tokio::test]
async fn fetch_analytics_forwards_property_and_returns_body_verbatim() {
	let server = MockServer::start_async().await;
	let report = json!({
		"rows": [{ "date": "2024-01-01", "sessions": 42 }],
		"totals": { "sessions": 42 },
	});
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(REMOTE_PATH).json_body(json!({
				"action": "fetchAnalytics",
				"propertyId": "properties/314159",
				"dateRange": "2024-01-01,2024-01-31",
			}));
			then.status(200).header("content-type", "application/json").json_body(report.clone());
		})
		.await;
	let body = static_forwarder(&server)
		.fetch_analytics("2024-01-01,2024-01-31")
		.await
		.expect("Analytics fetch should succeed.");

	assert_eq!(body, report);

	mock.assert_async().await;
}

#[tokio::test]
async fn fetch_search_console_forwards_site_url() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(REMOTE_PATH).json_body(json!({
				"action": "fetchSearchConsole",
				"siteUrl": "https://blog.example.com/",
				"dateRange": "last28days",
			}));
			then.status(200).json_body(json!({ "rows": [] }));
		})
		.await;
	let body = static_forwarder(&server)
		.fetch_search_console("last28days")
		.await
		.expect("Search-console fetch should succeed.");

	assert_eq!(body, json!({ "rows": [] }));

	mock.assert_async().await;
}

#[tokio::test]
async fn export_to_sheet_forwards_data_verbatim() {
	let server = MockServer::start_async().await;
	let data = json!([
		{ "page": "/", "clicks": 12, "ctr": 0.031 },
		{ "page": "/about", "clicks": null, "tags": ["a", "b"] },
	]);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(REMOTE_PATH).json_body(json!({
				"action": "exportToSheet",
				"sheetId": "1AbCdEfGhIjK",
				"dataType": "searchConsole",
				"data": data.clone(),
			}));
			then.status(200).json_body(json!({ "success": true, "rowsWritten": 2 }));
		})
		.await;
	let body = static_forwarder(&server)
		.export_to_sheet("searchConsole", data.clone())
		.await
		.expect("Sheet export should succeed.");

	assert_eq!(body["rowsWritten"], 2);

	mock.assert_async().await;
}

#[tokio::test]
async fn non_success_status_surfaces_as_upstream_error() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(REMOTE_PATH);
			then.status(500).body("TypeError: Cannot read properties of undefined");
		})
		.await;
	let err = static_forwarder(&server)
		.fetch_analytics("7daysAgo")
		.await
		.expect_err("Non-2xx answers must fail the forward.");

	assert!(matches!(err, Error::Upstream(RemoteError::Status { status: 500, .. })));

	mock.assert_async().await;
}

#[tokio::test]
async fn unreachable_remote_surfaces_as_upstream_error() {
	let remote = RemoteEndpoint::new(
		Url::parse("http://127.0.0.1:9/exec").expect("Unreachable endpoint fixture should parse."),
	);
	let forwarder = RequestForwarder::new(remote, Arc::new(StaticCredentials::new(credentials())));
	let err = forwarder
		.fetch_search_console("7daysAgo")
		.await
		.expect_err("Connection failures must fail the forward.");

	assert!(matches!(err, Error::Upstream(RemoteError::Transport(_))));
}

#[tokio::test]
async fn remote_redirects_are_followed() {
	let server = MockServer::start_async().await;
	let redirect = server
		.mock_async(|when, then| {
			when.method(POST).path(REMOTE_PATH);
			then.status(302).header("location", server.url("/echo"));
		})
		.await;
	let content = server
		.mock_async(|when, then| {
			when.method(GET).path("/echo");
			then.status(200).json_body(json!({ "rows": [1, 2, 3] }));
		})
		.await;
	let body = static_forwarder(&server)
		.fetch_analytics("yesterday")
		.await
		.expect("Redirected forwards should succeed.");

	assert_eq!(body, json!({ "rows": [1, 2, 3] }));

	redirect.assert_async().await;
	content.assert_async().await;
}

#[tokio::test]
async fn delegated_forwarder_fetches_credentials_once() {
	let server = MockServer::start_async().await;
	let credentials_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(REMOTE_PATH).json_body(json!({ "action": "getCredentials" }));
			then.status(200).json_body(json!({
				"propertyId": "properties/314159",
				"siteUrl": "https://blog.example.com/",
				"sheetId": "1AbCdEfGhIjK",
			}));
		})
		.await;
	let analytics_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(REMOTE_PATH).json_body(json!({
				"action": "fetchAnalytics",
				"propertyId": "properties/314159",
				"dateRange": "30daysAgo",
			}));
			then.status(200).json_body(json!({ "rows": [] }));
		})
		.await;
	let forwarder = RequestForwarder::new(
		remote(&server),
		Arc::new(CredentialsCache::new(remote(&server))),
	);

	for _ in 0..2 {
		forwarder.fetch_analytics("30daysAgo").await.expect("Delegated fetch should succeed.");
	}

	credentials_mock.assert_calls_async(1).await;
	analytics_mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn trailing_garbage_after_the_remote_body_is_rejected() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(REMOTE_PATH);
			then.status(200).header("content-type", "application/json").body("{\"rows\":[]} junk");
		})
		.await;
	let err = static_forwarder(&server)
		.fetch_analytics("7daysAgo")
		.await
		.expect_err("Bodies with trailing data must fail the forward.");

	assert!(matches!(err, Error::Upstream(RemoteError::TrailingData { status: 200, .. })));

	mock.assert_async().await;
}
