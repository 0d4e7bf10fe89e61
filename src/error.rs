//! Relay-level error types shared across the authorizer, credential sources, and forwarder.

// self
use crate::_prelude::*;

/// Relay-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical relay error exposed by public APIs.
///
/// Every variant is caught at the HTTP boundary and rendered as a generic 500 response, so
/// the detail carried here only ever reaches the server log.
#[derive(Debug, ThisError)]
pub enum Error {
	/// OAuth authorization-code exchange failed.
	#[error(transparent)]
	AuthExchange(#[from] AuthExchangeError),
	/// Remote credentials object could not be obtained.
	#[error(transparent)]
	CredentialsFetch(#[from] CredentialsFetchError),
	/// Forwarding call to the remote endpoint failed.
	#[error("Forwarding call to the remote endpoint failed.")]
	Upstream(#[source] RemoteError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
}

/// Failures raised while trading an authorization code for a token set.
#[derive(Debug, ThisError)]
pub enum AuthExchangeError {
	/// Callback arrived without a usable authorization code.
	#[error("Authorization callback did not carry a code.")]
	MissingCode,
	/// Provider (or the user, via the consent screen) rejected the grant.
	#[error("Provider rejected the grant: {reason}.")]
	Rejected {
		/// Provider-supplied reason string.
		reason: String,
	},
	/// Token endpoint could not be reached.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Token endpoint responded with JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint returned an unexpected but well-formed response.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	Unexpected {
		/// Summary of the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Failures raised while fetching the delegated credentials object.
#[derive(Debug, ThisError)]
pub enum CredentialsFetchError {
	/// Remote endpoint answered successfully but reported an error in its payload.
	#[error("Remote endpoint reported an error: {message}.")]
	Remote {
		/// Rendered value of the payload's `error` field.
		message: String,
	},
	/// Remote call itself failed.
	#[error("Credentials request failed.")]
	Call(#[from] RemoteError),
	/// Payload did not have the credentials shape.
	#[error("Credentials payload is malformed.")]
	Parse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

/// Failures of a single POST to the remote script endpoint.
#[derive(Debug, ThisError)]
pub enum RemoteError {
	/// Network-level failure.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Remote endpoint answered with a non-success status.
	#[error("Remote endpoint responded with HTTP {status}: {body_preview}")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Leading slice of the response body.
		body_preview: String,
	},
	/// Remote endpoint answered with a body that is not JSON.
	#[error("Remote endpoint returned malformed JSON.")]
	Parse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code.
		status: u16,
	},
	/// Remote endpoint answered with a JSON document followed by extra bytes.
	#[error("Remote endpoint returned trailing data after the JSON body.")]
	TrailingData {
		/// Underlying JSON failure.
		#[source]
		source: serde_json::Error,
		/// HTTP status code.
		status: u16,
	},
}

/// Configuration and validation failures raised at startup.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Configuration sources could not be merged or extracted.
	#[error("Configuration could not be loaded.")]
	Load(#[source] Box<figment::Error>),
	/// A field required by the selected variant is absent.
	#[error("Configuration is missing `{field}`.")]
	MissingField {
		/// Name of the missing field.
		field: &'static str,
	},
	/// A configured URL cannot be parsed.
	#[error("Configuration field `{field}` is not a valid URL.")]
	InvalidUrl {
		/// Name of the offending field.
		field: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Listen address cannot be parsed.
	#[error("Listen address `{addr}` is invalid.")]
	InvalidListenAddr {
		/// Rendered `host:port` pair.
		addr: String,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<figment::Error> for ConfigError {
	fn from(e: figment::Error) -> Self {
		Self::Load(Box::new(e))
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling a remote endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling a remote endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
