//! Token set issued by the authorization-code exchange.

// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, token::secret::TokenSecret},
};

/// Tokens granted by the provider for this deployment.
///
/// Held in process memory only; a restart discards it and requires a fresh consent.
#[derive(Clone)]
pub struct TokenSet {
	/// Access token secret.
	pub access_token: TokenSecret,
	/// Refresh token secret; always requested through `access_type=offline` +
	/// `prompt=consent`, but providers may still omit it.
	pub refresh_token: Option<TokenSecret>,
	/// Instant the exchange completed.
	pub issued_at: OffsetDateTime,
	/// Expiry instant derived from `expires_in`, when the provider reported one.
	pub expires_at: Option<OffsetDateTime>,
	/// Scopes granted by the provider (or the requested set when the response omits them).
	pub scope: ScopeSet,
}
impl TokenSet {
	/// Builds a token set issued at `issued_at`, expiring `expires_in` later when known.
	pub fn new(
		access_token: impl Into<String>,
		refresh_token: Option<String>,
		issued_at: OffsetDateTime,
		expires_in: Option<Duration>,
		scope: ScopeSet,
	) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			refresh_token: refresh_token.map(TokenSecret::new),
			issued_at,
			expires_at: expires_in.map(|delta| issued_at + delta),
			scope,
		}
	}
}
impl Debug for TokenSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenSet")
			.field("access_token", &self.access_token)
			.field("refresh_token", &self.refresh_token)
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.field("scope", &self.scope)
			.finish()
	}
}
