//! HTTP surface: shared state, the axum router, and its handlers.
//!
//! Routes:
//! - GET  /auth                  authorization URL (direct variant only)
//! - GET  /auth/callback         code exchange, then redirect to `/?authorized=true`
//! - POST /api/fetchAnalytics    forwarded analytics fetch
//! - POST /api/fetchSearchConsole
//! - POST /api/exportToSheet
//! - GET  anything else          static asset directory, when configured

mod error;

pub use error::ApiError;

// std
use std::path::Path;
// crates.io
use axum::{
	Json, Router,
	extract::{Query, State},
	response::Redirect,
	routing::{get, post},
};
use serde::Deserializer;
use tokio::net::TcpListener;
use tower_http::{
	cors::{Any, CorsLayer},
	services::ServeDir,
	trace::TraceLayer,
};
// self
use crate::{
	_prelude::*,
	config::{Config, Variant},
	error::AuthExchangeError,
	flows::{Authorizer, CredentialsCache, ForwardRequest, RequestForwarder, StaticCredentials},
	provider::ProviderDescriptor,
	remote::RemoteEndpoint,
};

const AUTHORIZED_REDIRECT: &str = "/?authorized=true";

/// Shared application state passed to all route handlers.
#[derive(Debug)]
pub struct AppState {
	/// Forwarder used by every `/api/*` route.
	pub forwarder: RequestForwarder,
	/// OAuth authorizer; present only in the direct variant.
	pub authorizer: Option<Arc<Authorizer>>,
}
impl AppState {
	/// Creates a new shared application state wrapped in an `Arc`.
	pub fn new(forwarder: RequestForwarder, authorizer: Option<Authorizer>) -> Arc<Self> {
		Arc::new(Self { forwarder, authorizer: authorizer.map(Arc::new) })
	}

	/// Wires the credential source and authorizer selected by `config.variant`.
	pub fn from_config(config: &Config) -> Result<Arc<Self>> {
		let remote = RemoteEndpoint::new(config.remote_url()?);

		match config.variant {
			Variant::Direct => {
				let authorizer = Authorizer::new(
					ProviderDescriptor::google(),
					config.oauth_client()?,
					config.redirect_url()?,
				)?;
				let credentials = Arc::new(StaticCredentials::new(config.static_credentials()?));

				Ok(Self::new(RequestForwarder::new(remote, credentials), Some(authorizer)))
			},
			Variant::Delegated => {
				let credentials = Arc::new(CredentialsCache::new(remote.clone()));

				Ok(Self::new(RequestForwarder::new(remote, credentials), None))
			},
		}
	}
}

/// Builds the full axum router.
///
/// The `/auth` routes are mounted only when the state carries an authorizer.
pub fn make_router(state: Arc<AppState>, static_dir: Option<&Path>) -> Router {
	let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
	let mut router: Router = Router::new()
		.route("/api/fetchAnalytics", post(fetch_analytics))
		.route("/api/fetchSearchConsole", post(fetch_search_console))
		.route("/api/exportToSheet", post(export_to_sheet))
		.with_state(state.clone());

	if let Some(authorizer) = state.authorizer.clone() {
		router = router.merge(
			Router::new()
				.route("/auth", get(auth_url))
				.route("/auth/callback", get(auth_callback))
				.with_state(authorizer),
		);
	}
	if let Some(dir) = static_dir {
		router = router.fallback_service(ServeDir::new(dir));
	}

	router.layer(cors).layer(TraceLayer::new_for_http())
}

/// Serves `router` on `listener` until Ctrl-C.
pub async fn serve(listener: TcpListener, router: Router) -> std::io::Result<()> {
	axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		tracing::warn!(error = %e, "Failed to listen for the shutdown signal.");
		std::future::pending::<()>().await;
	}

	tracing::info!("Shutdown signal received.");
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthUrlResponse {
	auth_url: String,
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
	code: Option<String>,
	error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportBody {
	date_range: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportBody {
	data_type: Option<String>,
	#[serde(default, deserialize_with = "present")]
	data: Option<Value>,
}

// Keeps an explicit `null` distinct from an absent field.
fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
	D: Deserializer<'de>,
{
	Value::deserialize(deserializer).map(Some)
}

async fn auth_url(State(authorizer): State<Arc<Authorizer>>) -> Json<AuthUrlResponse> {
	Json(AuthUrlResponse { auth_url: authorizer.build_authorization_url().into() })
}

async fn auth_callback(
	State(authorizer): State<Arc<Authorizer>>,
	Query(params): Query<CallbackParams>,
) -> Result<Redirect, ApiError> {
	const MESSAGE: &str = "Authentication failed";

	if let Some(reason) = params.error {
		return Err(ApiError::new(MESSAGE, AuthExchangeError::Rejected { reason }));
	}

	authorizer
		.complete_authorization(params.code.as_deref().unwrap_or_default())
		.await
		.map_err(|e| ApiError::new(MESSAGE, e))?;

	Ok(Redirect::to(AUTHORIZED_REDIRECT))
}

async fn fetch_analytics(
	State(state): State<Arc<AppState>>,
	Json(body): Json<ReportBody>,
) -> Result<Json<Value>, ApiError> {
	relay(&state, ForwardRequest::analytics(body.date_range), "Failed to fetch Analytics data").await
}

async fn fetch_search_console(
	State(state): State<Arc<AppState>>,
	Json(body): Json<ReportBody>,
) -> Result<Json<Value>, ApiError> {
	relay(
		&state,
		ForwardRequest::search_console(body.date_range),
		"Failed to fetch Search Console data",
	)
	.await
}

async fn export_to_sheet(
	State(state): State<Arc<AppState>>,
	Json(body): Json<ExportBody>,
) -> Result<Json<Value>, ApiError> {
	relay(
		&state,
		ForwardRequest::export(body.data_type, body.data),
		"Failed to export data to sheet",
	)
	.await
}

async fn relay(
	state: &AppState,
	request: ForwardRequest,
	message: &'static str,
) -> Result<Json<Value>, ApiError> {
	state.forwarder.forward(request).await.map(Json).map_err(|e| ApiError::new(message, e))
}
