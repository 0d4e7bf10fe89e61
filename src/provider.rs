//! Identity-provider metadata consumed by the authorizer.
//!
//! The relay only ever talks to Google, but endpoints stay data so deployments and tests can
//! point the code exchange at a different token endpoint.

// self
use crate::_prelude::*;

/// Google's OAuth 2.0 authorization endpoint.
pub const GOOGLE_AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
/// Google's OAuth 2.0 token endpoint.
pub const GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

/// Fixed scope set requested by every authorization URL: analytics read-only,
/// search-console read-only, and spreadsheet read/write.
pub const GOOGLE_REPORTING_SCOPES: [&str; 3] = [
	"https://www.googleapis.com/auth/analytics.readonly",
	"https://www.googleapis.com/auth/webmasters.readonly",
	"https://www.googleapis.com/auth/spreadsheets",
];

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderEndpoints {
	/// Authorization endpoint users are sent to for consent.
	pub authorization: Url,
	/// Token endpoint used for the code exchange.
	pub token: Url,
}

/// Immutable provider descriptor consumed by the authorizer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderDescriptor {
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
}
impl ProviderDescriptor {
	/// Creates a descriptor for arbitrary endpoints.
	pub fn new(authorization: Url, token: Url) -> Self {
		Self { endpoints: ProviderEndpoints { authorization, token } }
	}

	/// Descriptor for Google's production endpoints.
	pub fn google() -> Self {
		Self::new(google_url(GOOGLE_AUTHORIZATION_ENDPOINT), google_url(GOOGLE_TOKEN_ENDPOINT))
	}
}

fn google_url(raw: &'static str) -> Url {
	Url::parse(raw).expect("Google endpoint constants are valid URLs.")
}
