//! Shared fixtures for integration tests.

#![allow(dead_code)]

pub use std::{collections::HashMap, sync::Arc, time::Duration};

pub use analytics_relay::{
	error::{AuthExchangeError, CredentialsFetchError, Error, RemoteError},
	flows::{
		Authorizer, ClientCredentials, CredentialSource, Credentials, CredentialsCache,
		RequestForwarder, StaticCredentials,
	},
	http::ReqwestHttpClient,
	provider::ProviderDescriptor,
	remote::RemoteEndpoint,
	server::{AppState, make_router},
	url::Url,
};
pub use httpmock::prelude::*;
pub use serde_json::{Value, json};

/// Path the mock remote script endpoint listens on.
pub const REMOTE_PATH: &str = "/macros/s/relay/exec";
pub const CLIENT_ID: &str = "client-it";
pub const CLIENT_SECRET: &str = "secret-it";
pub const REDIRECT_URI: &str = "http://localhost:3000/auth/callback";

pub fn remote(server: &MockServer) -> RemoteEndpoint {
	RemoteEndpoint::new(
		Url::parse(&server.url(REMOTE_PATH)).expect("Mock remote endpoint should parse."),
	)
}

pub fn credentials() -> Credentials {
	Credentials {
		property_id: "properties/314159".into(),
		site_url: "https://blog.example.com/".into(),
		sheet_id: "1AbCdEfGhIjK".into(),
	}
}

pub fn static_forwarder(server: &MockServer) -> RequestForwarder {
	RequestForwarder::new(remote(server), Arc::new(StaticCredentials::new(credentials())))
}

pub fn mock_descriptor(server: &MockServer) -> ProviderDescriptor {
	ProviderDescriptor::new(
		Url::parse(&server.url("/authorize")).expect("Mock authorization endpoint should parse."),
		Url::parse(&server.url("/token")).expect("Mock token endpoint should parse."),
	)
}

pub fn authorizer(descriptor: ProviderDescriptor) -> Authorizer {
	Authorizer::with_http_client(
		descriptor,
		ClientCredentials { client_id: CLIENT_ID.into(), client_secret: CLIENT_SECRET.into() },
		Url::parse(REDIRECT_URI).expect("Redirect URI fixture should parse."),
		ReqwestHttpClient::new().expect("Token client should build."),
	)
	.expect("Authorizer should build for the mock descriptor.")
}
