// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{io, sync::Arc, time::Duration};

use clap::Parser;
use livewire_auth::JwtVerifier;
use livewire_catalog::PgOwnershipLookup;
use livewire_cdc::{FeedConfig, PgNotificationChannel};
use livewire_sub_api::{SubsystemError, Subsystems};
use livewire_sub_server_sse::{AppState, SseConfig, SseSubsystem};
use livewire_sub_tracing::{LogFormat, TracingBuilder, TracingError};
use livewire_subscription::{
	AuthorizationResolver, ConnectionManager, Dispatcher, FeedSubsystem, ResolverConfig, StreamConfig,
};
use tokio::signal::unix::{SignalKind, signal};
use tracing::{error, info};

/// Real-time change event streaming server
#[derive(Parser, Debug)]
#[command(name = "livewire-server")]
#[command(version, about, long_about = None)]
struct Args {
	/// Postgres connection string, used for LISTEN and ownership lookups
	#[arg(long, env = "DATABASE_URL", hide_env_values = true)]
	database_url: String,

	/// HS256 secret that signed the bearer tokens
	#[arg(long, env = "JWT_SECRET", hide_env_values = true)]
	jwt_secret: String,

	/// Address to bind to; overrides PORT
	#[arg(long)]
	bind: Option<String>,

	/// Port to listen on all interfaces
	#[arg(long, env = "PORT", default_value_t = 4000)]
	port: u16,

	/// Origin allowed to read the stream cross-origin
	#[arg(long, env = "FRONT_ORIGIN", default_value = "*")]
	front_origin: String,

	/// Upstream notification channel
	#[arg(long, env = "LIVEWIRE_CHANNEL", default_value = "registros_channel")]
	channel: String,

	/// Seconds between keep-alive pings
	#[arg(long, env = "LIVEWIRE_HEARTBEAT_SECS", default_value_t = 25)]
	heartbeat_secs: u64,

	/// Maximum number of simultaneously open streams
	#[arg(long, env = "LIVEWIRE_MAX_CONNECTIONS", default_value_t = 1024)]
	max_connections: usize,

	/// Seconds an ownership lookup may be reused; 0 disables caching
	#[arg(long, env = "LIVEWIRE_OWNER_CACHE_SECS", default_value_t = 2)]
	owner_cache_secs: u64,

	/// Size of the ownership lookup pool
	#[arg(long, default_value_t = 5)]
	db_pool_size: u32,

	/// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
	#[arg(long, default_value = "info")]
	log_level: String,

	/// Log format (compact, pretty, json)
	#[arg(long, default_value = "compact")]
	log_format: LogFormat,
}

#[derive(Debug, thiserror::Error)]
enum ServerError {
	#[error(transparent)]
	Tracing(#[from] TracingError),
	#[error("failed to connect to the database: {0}")]
	Database(#[from] sqlx::Error),
	#[error(transparent)]
	Subsystem(#[from] SubsystemError),
	#[error("failed to install signal handler: {0}")]
	Signal(#[source] io::Error),
}

#[tokio::main]
async fn main() {
	let args = Args::parse();
	if let Err(e) = run(args).await {
		// Tracing may not be installed yet.
		eprintln!("livewire-server: {}", e);
		error!("{}", e);
		std::process::exit(1);
	}
}

async fn run(args: Args) -> Result<(), ServerError> {
	TracingBuilder::new().directive(format!("livewire={}", args.log_level)).format(args.log_format).init()?;

	info!("Starting livewire server {}", env!("CARGO_PKG_VERSION"));

	let verifier = Arc::new(JwtVerifier::new(&args.jwt_secret));
	let connections = ConnectionManager::new(
		verifier,
		StreamConfig::default()
			.heartbeat_interval(Duration::from_secs(args.heartbeat_secs.max(1)))
			.max_connections(args.max_connections),
	);

	let lookup = PgOwnershipLookup::connect(&args.database_url, args.db_pool_size).await?;
	let resolver = AuthorizationResolver::new(
		Arc::new(lookup),
		ResolverConfig::default().cache_ttl(Duration::from_secs(args.owner_cache_secs)),
	);
	let dispatcher = Dispatcher::new(connections.clone(), Arc::new(resolver));

	let feed = FeedSubsystem::new(
		Arc::new(PgNotificationChannel::new(args.database_url.clone())),
		FeedConfig::default().channel(args.channel.clone()),
		dispatcher,
	);

	let bind_addr = args.bind.clone().unwrap_or_else(|| format!("0.0.0.0:{}", args.port));
	let sse = SseSubsystem::new(AppState::new(
		connections,
		SseConfig::default().bind_addr(bind_addr).front_origin(args.front_origin.clone()),
	));

	let mut subsystems = Subsystems::new().with(Box::new(feed)).with(Box::new(sse));
	if let Err(e) = subsystems.start_all().await {
		subsystems.shutdown_all().await;
		return Err(e.into());
	}
	info!("livewire server ready");

	let mut sigterm = signal(SignalKind::terminate()).map_err(ServerError::Signal)?;
	let mut sigint = signal(SignalKind::interrupt()).map_err(ServerError::Signal)?;
	tokio::select! {
		_ = sigterm.recv() => info!("Received SIGTERM"),
		_ = sigint.recv() => info!("Received SIGINT"),
	}

	subsystems.shutdown_all().await;
	info!("livewire server stopped");
	Ok(())
}
