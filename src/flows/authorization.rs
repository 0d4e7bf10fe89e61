//! Direct OAuth variant: authorization URL construction and the code exchange.

// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, TokenSet},
	error::AuthExchangeError,
	http::ReqwestHttpClient,
	oauth::CodeExchangeClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::{GOOGLE_REPORTING_SCOPES, ProviderDescriptor},
	store::TokenStore,
};

/// OAuth client credentials for the confidential web client.
#[derive(Clone)]
pub struct ClientCredentials {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret.
	pub client_secret: String,
}
impl Debug for ClientCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientCredentials")
			.field("client_id", &self.client_id)
			.field("client_secret", &"<redacted>")
			.finish()
	}
}

/// Runs the authorization-code flow against the identity provider and keeps the resulting
/// token set in process memory.
///
/// The authorization URL always asks for offline access with a forced consent prompt so the
/// provider issues a refresh token on every grant, and always requests the fixed
/// [`GOOGLE_REPORTING_SCOPES`].
pub struct Authorizer {
	descriptor: ProviderDescriptor,
	client_id: String,
	redirect_uri: Url,
	scope: ScopeSet,
	exchange: CodeExchangeClient,
	store: TokenStore,
}
impl Authorizer {
	/// Creates an authorizer with its own redirect-free token client.
	pub fn new(
		descriptor: ProviderDescriptor,
		client: ClientCredentials,
		redirect_uri: Url,
	) -> Result<Self> {
		Self::with_http_client(descriptor, client, redirect_uri, ReqwestHttpClient::new()?)
	}

	/// Creates an authorizer that reuses the caller-provided token client.
	pub fn with_http_client(
		descriptor: ProviderDescriptor,
		client: ClientCredentials,
		redirect_uri: Url,
		http_client: ReqwestHttpClient,
	) -> Result<Self> {
		let scope = ScopeSet::new(GOOGLE_REPORTING_SCOPES).map_err(|err| {
			AuthExchangeError::Unexpected { message: err.to_string(), status: None }
		})?;
		let exchange = CodeExchangeClient::from_descriptor(
			&descriptor,
			&client.client_id,
			&client.client_secret,
			&redirect_uri,
			http_client,
		)?;

		Ok(Self {
			descriptor,
			client_id: client.client_id,
			redirect_uri,
			scope,
			exchange,
			store: TokenStore::default(),
		})
	}

	/// Builds the provider authorization URL users are sent to for consent.
	pub fn build_authorization_url(&self) -> Url {
		let mut url = self.descriptor.endpoints.authorization.clone();
		let mut pairs = url.query_pairs_mut();

		pairs.append_pair("response_type", "code");
		pairs.append_pair("client_id", &self.client_id);
		pairs.append_pair("redirect_uri", self.redirect_uri.as_str());
		pairs.append_pair("scope", &self.scope.normalized());
		pairs.append_pair("access_type", "offline");
		pairs.append_pair("prompt", "consent");

		drop(pairs);

		url
	}

	/// Exchanges an authorization code for a token set and stores it.
	///
	/// The exchange is a single token-endpoint call and is never retried.
	pub async fn complete_authorization(&self, code: &str) -> Result<TokenSet> {
		let span = FlowSpan::new(FlowKind::Authorization, "complete_authorization");

		obs::record_flow_outcome(FlowKind::Authorization, FlowOutcome::Attempt);

		let result = span
			.instrument(async {
				if code.trim().is_empty() {
					return Err(Error::from(AuthExchangeError::MissingCode));
				}

				let tokens = self.exchange.exchange_code(code, &self.scope).await?;

				self.store.save(tokens.clone());
				tracing::info!(
					has_refresh_token = tokens.refresh_token.is_some(),
					"Authorization completed."
				);

				Ok::<_, Error>(tokens)
			})
			.await;

		obs::record_flow_outcome(FlowKind::Authorization, FlowOutcome::of(&result));

		result
	}

	/// Returns the token set granted by the most recent successful exchange.
	pub fn token(&self) -> Option<TokenSet> {
		self.store.fetch()
	}

	/// Token store shared by this authorizer.
	pub fn store(&self) -> &TokenStore {
		&self.store
	}

	/// Scope set requested by every authorization URL.
	pub fn scope(&self) -> &ScopeSet {
		&self.scope
	}
}
impl Debug for Authorizer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Authorizer")
			.field("descriptor", &self.descriptor)
			.field("client_id", &self.client_id)
			.field("redirect_uri", &self.redirect_uri.as_str())
			.field("authorized", &self.store.is_authorized())
			.finish()
	}
}
