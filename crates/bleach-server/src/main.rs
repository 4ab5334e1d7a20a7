// Copyright (c) 2025 bleach.fish. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! bleach.fish CMS backend binary.

use std::sync::Arc;

use bleach_server::{create_router, AppState, ServerConfig};
use bleach_server_github::GithubClient;
use clap::{Parser, Subcommand};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CMS commit backend for bleach.fish.
#[derive(Parser, Debug)]
#[command(name = "bleach-server", about = "bleach.fish CMS commit backend", version)]
struct Args {
	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version information
	Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("bleach-server {}", env!("CARGO_PKG_VERSION"));
		return Ok(());
	}

	// Load .env file if present
	dotenvy::dotenv().ok();

	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| "info".into()),
		)
		.with(tracing_subscriber::fmt::layer())
		.init();

	let config = ServerConfig::from_env()?;
	let addr = config.socket_addr();

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		frontend_origin = %config.frontend_origin,
		repo = %format!("{}/{}", config.github.repo_owner, config.github.repo_name),
		branch = %config.github.repo_branch,
		allowlist_size = config.allowlist.len(),
		"starting bleach-server"
	);

	let github = GithubClient::new(config.github.clone());
	let state = AppState {
		config: Arc::new(config),
		github,
	};

	let app = create_router(state).layer(TraceLayer::new_for_http());

	let listener = tokio::net::TcpListener::bind(&addr).await?;
	tracing::info!("listening on {}", addr);

	tokio::select! {
		result = axum::serve(listener, app) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "server error");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("received shutdown signal");
		}
	}

	tracing::info!("server shutdown complete");
	Ok(())
}
