//! Thin facade over the `oauth2` crate for the authorization-code exchange.

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet, EndpointSet,
	HttpClientError, RedirectUrl, RequestTokenError, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError, BasicTokenResponse},
};
// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, TokenSet},
	error::{AuthExchangeError, ConfigError, TransportError},
	http::{ReqwestHttpClient, ResponseMetadata, ResponseMetadataSlot},
	provider::ProviderDescriptor,
};

type ConfiguredBasicClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Confidential OAuth client bound to one provider, client id, and redirect URI.
pub(crate) struct CodeExchangeClient {
	oauth_client: ConfiguredBasicClient,
	http_client: ReqwestHttpClient,
}
impl CodeExchangeClient {
	pub(crate) fn from_descriptor(
		descriptor: &ProviderDescriptor,
		client_id: &str,
		client_secret: &str,
		redirect_uri: &Url,
		http_client: ReqwestHttpClient,
	) -> Result<Self, ConfigError> {
		let auth_url = AuthUrl::new(descriptor.endpoints.authorization.to_string())
			.map_err(|source| ConfigError::InvalidUrl { field: "authorization_endpoint", source })?;
		let token_url = TokenUrl::new(descriptor.endpoints.token.to_string())
			.map_err(|source| ConfigError::InvalidUrl { field: "token_endpoint", source })?;
		let redirect_url = RedirectUrl::new(redirect_uri.to_string())
			.map_err(|source| ConfigError::InvalidUrl { field: "redirect_uri", source })?;
		let oauth_client = BasicClient::new(ClientId::new(client_id.to_owned()))
			.set_client_secret(ClientSecret::new(client_secret.to_owned()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url)
			.set_redirect_uri(redirect_url)
			.set_auth_type(AuthType::RequestBody);

		Ok(Self { oauth_client, http_client })
	}

	/// Trades `code` for a token set with a single token-endpoint call.
	///
	/// `requested` is recorded as the granted scope when the provider omits `scope` from
	/// its response.
	pub(crate) async fn exchange_code(
		&self,
		code: &str,
		requested: &ScopeSet,
	) -> Result<TokenSet, AuthExchangeError> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.instrumented(meta.clone());
		let response = self
			.oauth_client
			.exchange_code(AuthorizationCode::new(code.to_owned()))
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(meta.take(), err))?;

		map_token_response(requested, response)
	}
}
impl Debug for CodeExchangeClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CodeExchangeClient")
			.field("client_id", &self.oauth_client.client_id().as_str())
			.finish()
	}
}

fn map_token_response(
	requested: &ScopeSet,
	response: BasicTokenResponse,
) -> Result<TokenSet, AuthExchangeError> {
	let expires_in = response
		.expires_in()
		.map(|delta| i64::try_from(delta.as_secs()).map(Duration::seconds))
		.transpose()
		.map_err(|_| AuthExchangeError::Unexpected {
			message: "expires_in exceeds the supported range".into(),
			status: None,
		})?;
	let scope = match response.scopes() {
		Some(scopes) => ScopeSet::new(scopes.iter().map(|scope| scope.as_str())).map_err(|err| {
			AuthExchangeError::Unexpected {
				message: format!("granted scope is invalid: {err}"),
				status: None,
			}
		})?,
		None => requested.clone(),
	};

	if &scope != requested {
		tracing::warn!(
			requested = %requested,
			granted = %scope,
			"Provider granted a different scope set."
		);
	}

	Ok(TokenSet::new(
		response.access_token().secret().to_owned(),
		response.refresh_token().map(|token| token.secret().to_owned()),
		OffsetDateTime::now_utc(),
		expires_in,
		scope,
	))
}

fn map_request_error(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<ReqwestError>>,
) -> AuthExchangeError {
	let status = meta.and_then(|value| value.status);

	match err {
		RequestTokenError::ServerResponse(response) => map_server_response_error(response),
		RequestTokenError::Request(error) => map_transport_error(status, error),
		RequestTokenError::Parse(source, _body) =>
			AuthExchangeError::MalformedResponse { source, status },
		RequestTokenError::Other(message) => AuthExchangeError::Unexpected { message, status },
	}
}

fn map_server_response_error(response: BasicErrorResponse) -> AuthExchangeError {
	let reason = match response.error_description() {
		Some(description) => format!("{}: {description}", response.error().as_ref()),
		None => response.error().as_ref().to_owned(),
	};

	AuthExchangeError::Rejected { reason }
}

fn map_transport_error(
	status: Option<u16>,
	err: HttpClientError<ReqwestError>,
) -> AuthExchangeError {
	match err {
		HttpClientError::Reqwest(inner) => TransportError::from(*inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Http(inner) =>
			AuthExchangeError::Unexpected { message: inner.to_string(), status },
		HttpClientError::Other(message) => AuthExchangeError::Unexpected { message, status },
		_ => AuthExchangeError::Unexpected {
			message: "HTTP client error occurred while calling the token endpoint".into(),
			status,
		},
	}
}
