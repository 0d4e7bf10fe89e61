//! Credential sources supplying the deployment identifiers attached to forwarded calls.

// self
use crate::{
	_prelude::*,
	error::CredentialsFetchError,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	remote::RemoteEndpoint,
};

/// Boxed future returned by [`CredentialSource::resolve`].
pub type CredentialsFuture<'a> = Pin<Box<dyn Future<Output = Result<Credentials>> + 'a + Send>>;

/// Deployment identifiers needed to address the right analytics property, site, and sheet.
///
/// These are not secrets; they only tell the remote endpoint which resources to touch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
	/// Analytics property identifier.
	pub property_id: String,
	/// Search-console site URL.
	pub site_url: String,
	/// Spreadsheet identifier used for exports.
	pub sheet_id: String,
}

/// Capability that yields the [`Credentials`] for the current deployment.
///
/// Implementations are selected once at startup; the forwarder never knows which one it
/// holds.
pub trait CredentialSource
where
	Self: Send + Sync,
{
	/// Resolves the credentials, fetching them if necessary.
	fn resolve(&self) -> CredentialsFuture<'_>;
}

/// Credentials fixed by configuration (direct OAuth variant).
#[derive(Clone, Debug)]
pub struct StaticCredentials(Credentials);
impl StaticCredentials {
	/// Wraps a configured credentials object.
	pub fn new(credentials: Credentials) -> Self {
		Self(credentials)
	}
}
impl CredentialSource for StaticCredentials {
	fn resolve(&self) -> CredentialsFuture<'_> {
		let credentials = self.0.clone();

		Box::pin(async move { Ok(credentials) })
	}
}

/// Lazily populated, process-lifetime cache of the delegated credentials object.
///
/// The first resolution posts `{"action":"getCredentials"}` to the remote endpoint. A
/// successful answer is memoized forever (no TTL, no reset); a failed one leaves the slot
/// empty so the next call fetches again. Population is single-flight: concurrent first
/// callers queue on an async guard and all but the first reuse the value it stored.
pub struct CredentialsCache {
	remote: RemoteEndpoint,
	slot: RwLock<Option<Credentials>>,
	flow_guard: AsyncMutex<()>,
}
impl CredentialsCache {
	/// Creates an empty cache backed by `remote`.
	pub fn new(remote: RemoteEndpoint) -> Self {
		Self { remote, slot: RwLock::new(None), flow_guard: AsyncMutex::new(()) }
	}

	/// Returns the memoized credentials, fetching them on first use.
	pub async fn get_credentials(&self) -> Result<Credentials> {
		if let Some(credentials) = self.cached() {
			return Ok(credentials);
		}

		let _guard = self.flow_guard.lock().await;

		// Another caller may have populated the slot while this one waited.
		if let Some(credentials) = self.cached() {
			return Ok(credentials);
		}

		let span = FlowSpan::new(FlowKind::CredentialsFetch, "get_credentials");

		obs::record_flow_outcome(FlowKind::CredentialsFetch, FlowOutcome::Attempt);

		let result = span.instrument(self.fetch()).await;

		obs::record_flow_outcome(FlowKind::CredentialsFetch, FlowOutcome::of(&result));

		let credentials = result?;

		*self.slot.write() = Some(credentials.clone());
		tracing::info!(property_id = %credentials.property_id, "Credentials cached.");

		Ok(credentials)
	}

	/// Returns the memoized credentials without fetching.
	pub fn cached(&self) -> Option<Credentials> {
		self.slot.read().clone()
	}

	async fn fetch(&self) -> Result<Credentials> {
		let payload = serde_json::json!({ "action": "getCredentials" });
		let body = self.remote.call(&payload).await.map_err(CredentialsFetchError::from)?;

		Ok(parse_credentials(body)?)
	}
}
impl CredentialSource for CredentialsCache {
	fn resolve(&self) -> CredentialsFuture<'_> {
		Box::pin(self.get_credentials())
	}
}
impl Debug for CredentialsCache {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialsCache")
			.field("remote", &self.remote)
			.field("populated", &self.slot.read().is_some())
			.finish()
	}
}

fn parse_credentials(body: Value) -> Result<Credentials, CredentialsFetchError> {
	match body.get("error") {
		None | Some(Value::Null) => {},
		Some(Value::String(message)) =>
			return Err(CredentialsFetchError::Remote { message: message.clone() }),
		Some(other) => return Err(CredentialsFetchError::Remote { message: other.to_string() }),
	}

	serde_path_to_error::deserialize(body)
		.map_err(|source| CredentialsFetchError::Parse { source })
}
