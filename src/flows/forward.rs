//! Request forwarding to the remote script endpoint.

// self
use crate::{
	_prelude::*,
	flows::credentials::{CredentialSource, Credentials},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	remote::RemoteEndpoint,
};

/// Actions understood by the remote endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ForwardAction {
	/// Analytics report fetch, addressed by property id.
	FetchAnalytics,
	/// Search-console report fetch, addressed by site URL.
	FetchSearchConsole,
	/// Sheet export, addressed by sheet id.
	ExportToSheet,
}
impl ForwardAction {
	/// Wire name sent as the payload's `action` field.
	pub const fn as_str(self) -> &'static str {
		match self {
			ForwardAction::FetchAnalytics => "fetchAnalytics",
			ForwardAction::FetchSearchConsole => "fetchSearchConsole",
			ForwardAction::ExportToSheet => "exportToSheet",
		}
	}

	/// Name of the credential field injected for this action.
	pub const fn credential_field(self) -> &'static str {
		match self {
			ForwardAction::FetchAnalytics => "propertyId",
			ForwardAction::FetchSearchConsole => "siteUrl",
			ForwardAction::ExportToSheet => "sheetId",
		}
	}

	fn credential_value(self, credentials: &Credentials) -> &str {
		match self {
			ForwardAction::FetchAnalytics => &credentials.property_id,
			ForwardAction::FetchSearchConsole => &credentials.site_url,
			ForwardAction::ExportToSheet => &credentials.sheet_id,
		}
	}
}
impl Display for ForwardAction {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Action plus the caller-supplied fields to forward alongside it.
#[derive(Clone, Debug, PartialEq)]
pub struct ForwardRequest {
	/// Remote action to invoke.
	pub action: ForwardAction,
	/// Caller fields, forwarded verbatim.
	pub payload: Map<String, Value>,
}
impl ForwardRequest {
	/// Creates a request from an arbitrary caller payload.
	pub fn new(action: ForwardAction, payload: Map<String, Value>) -> Self {
		Self { action, payload }
	}

	/// Analytics fetch for `date_range`; an absent range is left for the remote to default.
	pub fn analytics(date_range: Option<String>) -> Self {
		Self::new(
			ForwardAction::FetchAnalytics,
			fields([("dateRange", date_range.map(Value::from))]),
		)
	}

	/// Search-console fetch for `date_range`.
	pub fn search_console(date_range: Option<String>) -> Self {
		Self::new(
			ForwardAction::FetchSearchConsole,
			fields([("dateRange", date_range.map(Value::from))]),
		)
	}

	/// Sheet export of `data`, labeled with `data_type`.
	pub fn export(data_type: Option<String>, data: Option<Value>) -> Self {
		Self::new(
			ForwardAction::ExportToSheet,
			fields([("dataType", data_type.map(Value::from)), ("data", data)]),
		)
	}

	/// Builds the outbound body `{action, <credential field>, ...payload}`.
	///
	/// `action` and the credential field are owned by the relay; a caller field with either
	/// name is ignored.
	pub fn into_body(self, credentials: &Credentials) -> Value {
		let credential_field = self.action.credential_field();
		let mut body = Map::with_capacity(self.payload.len() + 2);

		body.insert("action".into(), Value::from(self.action.as_str()));
		body.insert(
			credential_field.into(),
			Value::from(self.action.credential_value(credentials)),
		);

		for (key, value) in self.payload {
			if body.contains_key(&key) {
				tracing::debug!(field = %key, "Ignoring caller field that shadows a relay field.");

				continue;
			}

			body.insert(key, value);
		}

		Value::Object(body)
	}
}

/// Attaches the resolved identifiers to each request and relays it to the remote endpoint,
/// returning the remote body verbatim.
///
/// No retries: a transport failure or non-2xx answer is surfaced immediately as
/// [`Error::Upstream`].
#[derive(Clone)]
pub struct RequestForwarder {
	remote: RemoteEndpoint,
	credentials: Arc<dyn CredentialSource>,
}
impl RequestForwarder {
	/// Creates a forwarder posting to `remote` with identifiers from `credentials`.
	pub fn new(remote: RemoteEndpoint, credentials: Arc<dyn CredentialSource>) -> Self {
		Self { remote, credentials }
	}

	/// Forwards an analytics fetch for `date_range`.
	pub async fn fetch_analytics(&self, date_range: &str) -> Result<Value> {
		self.forward(ForwardRequest::analytics(Some(date_range.to_owned()))).await
	}

	/// Forwards a search-console fetch for `date_range`.
	pub async fn fetch_search_console(&self, date_range: &str) -> Result<Value> {
		self.forward(ForwardRequest::search_console(Some(date_range.to_owned()))).await
	}

	/// Forwards a sheet export of `data`, passed through without schema validation.
	pub async fn export_to_sheet(&self, data_type: &str, data: Value) -> Result<Value> {
		self.forward(ForwardRequest::export(Some(data_type.to_owned()), Some(data))).await
	}

	/// Resolves credentials, builds the outbound body, and relays it.
	pub async fn forward(&self, request: ForwardRequest) -> Result<Value> {
		let action = request.action;
		let span = FlowSpan::new(FlowKind::Forward, action.as_str());

		obs::record_flow_outcome(FlowKind::Forward, FlowOutcome::Attempt);

		let result = span
			.instrument(async {
				let credentials = self.credentials.resolve().await?;
				let body = request.into_body(&credentials);

				tracing::debug!(%action, "Forwarding request.");

				self.remote.call(&body).await.map_err(Error::Upstream)
			})
			.await;

		obs::record_flow_outcome(FlowKind::Forward, FlowOutcome::of(&result));

		result
	}
}
impl Debug for RequestForwarder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RequestForwarder").field("remote", &self.remote).finish()
	}
}

fn fields<const N: usize>(entries: [(&str, Option<Value>); N]) -> Map<String, Value> {
	entries
		.into_iter()
		.filter_map(|(key, value)| value.map(|value| (key.to_owned(), value)))
		.collect()
}
