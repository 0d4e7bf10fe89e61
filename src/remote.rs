//! Client for the remote script endpoint that performs the actual data retrieval and export.
//!
//! Every call is a single JSON `POST` of `{action, ...fields}`; the response is parsed as
//! JSON and handed back untouched. Script hosts answer POSTs with a redirect to a content
//! host, so unlike the token client this one keeps reqwest's default redirect policy.

// self
use crate::{
	_prelude::*,
	error::{RemoteError, TransportError},
};

const BODY_PREVIEW_LEN: usize = 256;

/// Handle to the remote script endpoint.
#[derive(Clone)]
pub struct RemoteEndpoint {
	client: ReqwestClient,
	url: Url,
}
impl RemoteEndpoint {
	/// Creates an endpoint handle backed by a default reqwest client.
	pub fn new(url: Url) -> Self {
		Self::with_client(ReqwestClient::new(), url)
	}

	/// Creates an endpoint handle that reuses the caller-provided client.
	pub fn with_client(client: ReqwestClient, url: Url) -> Self {
		Self { client, url }
	}

	/// Posts `payload` and returns the parsed JSON body of a 2xx response.
	pub async fn call(&self, payload: &Value) -> Result<Value, RemoteError> {
		let response = self
			.client
			.post(self.url.clone())
			.json(payload)
			.send()
			.await
			.map_err(TransportError::from)?;
		let status = response.status();
		let body = response.bytes().await.map_err(TransportError::from)?;

		if !status.is_success() {
			return Err(RemoteError::Status {
				status: status.as_u16(),
				body_preview: body_preview(&body),
			});
		}

		parse_body(&body, status.as_u16())
	}
}
impl Debug for RemoteEndpoint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RemoteEndpoint").field("url", &self.url.as_str()).finish()
	}
}

fn parse_body(body: &[u8], status: u16) -> Result<Value, RemoteError> {
	let mut de = serde_json::Deserializer::from_slice(body);
	let value = serde_path_to_error::deserialize(&mut de)
		.map_err(|source| RemoteError::Parse { source, status })?;

	de.end().map_err(|source| RemoteError::TrailingData { source, status })?;

	Ok(value)
}

fn body_preview(body: &[u8]) -> String {
	let text = String::from_utf8_lossy(body);

	match text.char_indices().nth(BODY_PREVIEW_LEN) {
		Some((cut, _)) => format!("{}…", &text[..cut]),
		None => text.into_owned(),
	}
}
