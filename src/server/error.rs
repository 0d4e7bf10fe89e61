//! Handler-boundary error that logs the full failure and answers with a generic 500.

// crates.io
use axum::{
	Json,
	http::StatusCode,
	response::{IntoResponse, Response},
};
// self
use crate::_prelude::*;

/// Relay failure paired with the generic message shown to the client.
///
/// The wrapped [`Error`] and its source chain only ever reach the server log; the response
/// body is always `{"error": "<message>"}` with status 500.
#[derive(Debug)]
pub struct ApiError {
	message: &'static str,
	source: Error,
}
impl ApiError {
	/// Wraps `source` behind the client-facing `message`.
	pub fn new(message: &'static str, source: impl Into<Error>) -> Self {
		Self { message, source: source.into() }
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		tracing::error!(error = %error_chain(&self.source), "{}", self.message);

		(StatusCode::INTERNAL_SERVER_ERROR, Json(serde_json::json!({ "error": self.message })))
			.into_response()
	}
}

fn error_chain(err: &dyn StdError) -> String {
	let mut rendered = err.to_string();
	let mut source = err.source();

	while let Some(cause) = source {
		rendered.push_str(": ");
		rendered.push_str(&cause.to_string());

		source = cause.source();
	}

	rendered
}
