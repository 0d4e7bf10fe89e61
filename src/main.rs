//! Relay binary: loads configuration, installs logging, and serves the router.

// std
use std::path::Path;
// crates.io
use color_eyre::Result;
use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
// self
use analytics_relay::{
	config::{Config, LogFormat},
	server::{self, AppState},
};

fn init_tracing(format: LogFormat) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

	match format {
		LogFormat::Json => tracing_subscriber::registry()
			.with(filter)
			.with(fmt::layer().json().with_target(true))
			.init(),
		LogFormat::Pretty => tracing_subscriber::registry()
			.with(filter)
			.with(fmt::layer().with_target(false))
			.init(),
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	dotenvy::dotenv().ok();

	let config = Config::load()?;

	init_tracing(config.log_format);

	let state = AppState::from_config(&config)?;
	let router = server::make_router(state, config.static_dir().map(Path::new));
	let addr = config.listen_addr()?;
	let listener = TcpListener::bind(addr).await?;

	tracing::info!(
		%addr,
		variant = ?config.variant,
		version = env!("CARGO_PKG_VERSION"),
		"Relay listening."
	);

	server::serve(listener, router).await?;

	Ok(())
}
