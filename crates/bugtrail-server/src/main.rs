// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bugtrail server binary.

use std::{path::PathBuf, time::Duration};

use bugtrail_server::{create_app_state, create_router, version, SessionCleanupJob};
use clap::{Parser, Subcommand};
use http::HeaderValue;
use tokio_util::sync::CancellationToken;
use tower_http::{
	cors::{AllowOrigin, Any, CorsLayer},
	trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Bugtrail server - bug tracking over HTTP.
#[derive(Parser, Debug)]
#[command(name = "bugtrail-server", about = "Bugtrail bug tracking server", version)]
struct Args {
	/// Path to a TOML config file (defaults to /etc/bugtrail/server.toml)
	#[arg(long, env = "BUGTRAIL_SERVER_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version and build information
	Version,
}

fn cors_layer(origins: &[String]) -> CorsLayer {
	let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
	if origins.is_empty() {
		return layer.allow_origin(Any);
	}

	let allowed: Vec<HeaderValue> = origins
		.iter()
		.filter_map(|origin| match HeaderValue::from_str(origin) {
			Ok(value) => Some(value),
			Err(e) => {
				tracing::warn!(origin = %origin, error = %e, "ignoring invalid CORS origin");
				None
			}
		})
		.collect();
	layer.allow_origin(AllowOrigin::list(allowed))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("{}", version::format_version_info());
		return Ok(());
	}

	version::mark_started();
	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => bugtrail_server_config::load_config_with_file(path)?,
		None => bugtrail_server_config::load_config()?,
	};

	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| config.logging.level.clone().into());
	if config.logging.json {
		tracing_subscriber::registry()
			.with(env_filter)
			.with(tracing_subscriber::fmt::layer().json())
			.init();
	} else {
		tracing_subscriber::registry()
			.with(env_filter)
			.with(tracing_subscriber::fmt::layer())
			.init();
	}

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		database = %config.database.url,
		"starting bugtrail-server"
	);

	let pool =
		bugtrail_server_db::create_pool(&config.database.url, config.database.max_connections).await?;
	bugtrail_server::db::run_migrations(&pool).await?;

	let state = create_app_state(pool, &config);
	let shutdown = CancellationToken::new();

	let cleanup = SessionCleanupJob::new(state.session_repo.clone()).spawn(
		Duration::from_secs(config.auth.session_cleanup_interval_secs),
		shutdown.clone(),
	);

	let app = create_router(state)
		.layer(cors_layer(&config.http.cors_allowed_origins))
		.layer(TraceLayer::new_for_http());

	let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
	tracing::info!(addr = %config.socket_addr(), "listening");

	let signal = shutdown.clone();
	axum::serve(listener, app)
		.with_graceful_shutdown(async move {
			tokio::select! {
				_ = tokio::signal::ctrl_c() => {
					tracing::info!("received Ctrl-C, shutting down");
				}
				_ = signal.cancelled() => {}
			}
			signal.cancel();
		})
		.await?;

	shutdown.cancel();
	if let Err(e) = cleanup.await {
		tracing::warn!(error = %e, "session cleanup task did not stop cleanly");
	}

	let uptime = Duration::from_secs(version::uptime().as_secs());
	tracing::info!(uptime = %humantime::format_duration(uptime), "bugtrail-server stopped");
	Ok(())
}
