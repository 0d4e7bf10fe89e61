//! Startup configuration read from the process environment.
//!
//! Values are extracted with figment: serialized defaults merged with the raw (unprefixed)
//! environment variables the relay understands. Identifiers, URLs, and secrets are taken
//! verbatim so values such as `PROPERTY_ID=0123456` are never reparsed as numbers. The binary
//! loads an optional `.env` file before calling [`Config::load`].

// std
use std::net::{SocketAddr, ToSocketAddrs};
// crates.io
use figment::{
	Figment, Metadata, Profile, Provider,
	providers::{Env, Serialized},
	value::{Dict, Map as FigmentMap, Value as FigmentValue},
};
// self
use crate::{
	_prelude::*,
	error::ConfigError,
	flows::{ClientCredentials, Credentials},
};

// Keys parsed into typed values.
const TYPED_ENV_KEYS: [&str; 1] = ["port"];
// Keys kept as the exact string the environment holds.
const VERBATIM_ENV_KEYS: [&str; 11] = [
	"host",
	"relay_variant",
	"apps_script_url",
	"client_id",
	"client_secret",
	"redirect_uri",
	"property_id",
	"site_url",
	"sheet_id",
	"static_dir",
	"log_format",
];

/// Deployment variant, fixed for the lifetime of the process.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
	/// Direct OAuth: the relay runs the code flow, identifiers come from configuration.
	#[default]
	Direct,
	/// Delegated credentials: identifiers are fetched from the remote endpoint and cached.
	Delegated,
}

/// Log output format for the binary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	/// Human-readable lines.
	#[default]
	Pretty,
	/// One JSON object per event.
	Json,
}

/// Top-level relay configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
	/// Listen address (`HOST`, defaults to every interface, `0.0.0.0`).
	pub host: String,
	/// Listen port (`PORT`, defaults to `3000`).
	pub port: u16,
	/// Deployment variant (`RELAY_VARIANT`, `direct` or `delegated`).
	pub variant: Variant,
	/// Remote script endpoint every call is posted to (`APPS_SCRIPT_URL`).
	pub apps_script_url: Option<String>,
	/// OAuth client identifier (`CLIENT_ID`, direct variant).
	pub client_id: Option<String>,
	/// OAuth client secret (`CLIENT_SECRET`, direct variant).
	pub client_secret: Option<String>,
	/// Redirect URI registered with the provider (`REDIRECT_URI`).
	pub redirect_uri: String,
	/// Analytics property identifier (`PROPERTY_ID`, direct variant).
	pub property_id: Option<String>,
	/// Search-console site URL (`SITE_URL`, direct variant).
	pub site_url: Option<String>,
	/// Spreadsheet identifier (`SHEET_ID`, direct variant).
	pub sheet_id: Option<String>,
	/// Directory served for unmatched GET requests (`STATIC_DIR`); empty disables it.
	pub static_dir: Option<String>,
	/// Log output format (`LOG_FORMAT`).
	pub log_format: LogFormat,
}
impl Config {
	/// Figment merging defaults with the environment.
	pub fn figment() -> Figment {
		Figment::from(Serialized::defaults(Config::default()))
			.merge(Env::raw().only(&TYPED_ENV_KEYS))
			.merge(VerbatimEnv::new(&VERBATIM_ENV_KEYS))
	}

	/// Loads configuration from the environment and validates it for the selected variant.
	pub fn load() -> Result<Self, ConfigError> {
		Self::from_figment(Self::figment())
	}

	/// Extracts and validates configuration from an arbitrary figment.
	pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
		let config: Self = figment.extract()?;

		config.validate()?;

		Ok(config)
	}

	/// Checks that every field required by the selected variant is present and well-formed.
	pub fn validate(&self) -> Result<(), ConfigError> {
		self.listen_addr()?;
		self.remote_url()?;

		if self.variant == Variant::Direct {
			self.oauth_client()?;
			self.redirect_url()?;
			self.static_credentials()?;
		}

		Ok(())
	}

	/// Socket address the server binds to.
	pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
		let addr = format!("{}:{}", self.host, self.port);

		addr.to_socket_addrs()
			.ok()
			.and_then(|mut addrs| addrs.next())
			.ok_or(ConfigError::InvalidListenAddr { addr })
	}

	/// Parsed remote endpoint URL.
	pub fn remote_url(&self) -> Result<Url, ConfigError> {
		parse_url("apps_script_url", required("apps_script_url", &self.apps_script_url)?)
	}

	/// Parsed redirect URI.
	pub fn redirect_url(&self) -> Result<Url, ConfigError> {
		parse_url("redirect_uri", &self.redirect_uri)
	}

	/// OAuth client credentials for the direct variant.
	pub fn oauth_client(&self) -> Result<ClientCredentials, ConfigError> {
		Ok(ClientCredentials {
			client_id: required("client_id", &self.client_id)?.to_owned(),
			client_secret: required("client_secret", &self.client_secret)?.to_owned(),
		})
	}

	/// Identifiers fixed by configuration for the direct variant.
	pub fn static_credentials(&self) -> Result<Credentials, ConfigError> {
		Ok(Credentials {
			property_id: required("property_id", &self.property_id)?.to_owned(),
			site_url: required("site_url", &self.site_url)?.to_owned(),
			sheet_id: required("sheet_id", &self.sheet_id)?.to_owned(),
		})
	}

	/// Static asset directory, if enabled.
	pub fn static_dir(&self) -> Option<&str> {
		self.static_dir.as_deref().map(str::trim).filter(|dir| !dir.is_empty())
	}
}
impl Default for Config {
	fn default() -> Self {
		Self {
			host: "0.0.0.0".into(),
			port: 3000,
			variant: Variant::default(),
			apps_script_url: None,
			client_id: None,
			client_secret: None,
			redirect_uri: "http://localhost:3000/auth/callback".into(),
			property_id: None,
			site_url: None,
			sheet_id: None,
			static_dir: Some("public".into()),
			log_format: LogFormat::default(),
		}
	}
}

/// Environment provider that hands values to figment as plain strings.
///
/// `Env` parses `0123456` into the integer `123456` and `1e5` into a float, which corrupts
/// identifiers; this provider skips that parsing.
struct VerbatimEnv {
	keys: &'static [&'static str],
}
impl VerbatimEnv {
	fn new(keys: &'static [&'static str]) -> Self {
		Self { keys }
	}

	fn field_name(key: &str) -> String {
		let key = key.to_ascii_lowercase();

		if key == "relay_variant" { "variant".into() } else { key }
	}
}
impl Provider for VerbatimEnv {
	fn metadata(&self) -> Metadata {
		Metadata::named("environment variable(s)")
	}

	fn data(&self) -> std::result::Result<FigmentMap<Profile, Dict>, figment::Error> {
		let dict = Env::raw()
			.only(self.keys)
			.iter()
			.map(|(key, value)| (Self::field_name(key.as_str()), FigmentValue::from(value)))
			.collect::<Dict>();

		Ok(Profile::Default.collect(dict))
	}
}

fn required<'a>(field: &'static str, value: &'a Option<String>) -> Result<&'a str, ConfigError> {
	match value.as_deref().map(str::trim) {
		Some(value) if !value.is_empty() => Ok(value),
		_ => Err(ConfigError::MissingField { field }),
	}
}

fn parse_url(field: &'static str, raw: &str) -> Result<Url, ConfigError> {
	Url::parse(raw).map_err(|source| ConfigError::InvalidUrl { field, source })
}
