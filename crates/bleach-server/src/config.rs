// Copyright (c) 2025 bleach.fish. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Server configuration, loaded once at startup from the environment.
//!
//! The resolved config is immutable for the process lifetime and handed to
//! handlers through the shared state; nothing re-reads the environment per
//! request. Required variables fail startup instead of failing requests.

use std::collections::HashSet;
use std::env;

use bleach_server_github::GithubConfig;
use url::Url;

use crate::allowlist;

const DEFAULT_FRONTEND_ORIGIN: &str = "https://bleach.fish";
const DEFAULT_POSTS_BASE_PATH: &str = "site/src/posts";
const DEFAULT_SONGS_BASE_PATH: &str = "site/src/music";
const DEFAULT_ART_BASE_PATH: &str = "site/public/art";
const DEFAULT_MAX_CONTENT_BYTES: usize = 200_000;
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8787;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// A GitHub credential or repo variable is missing or invalid.
	#[error(transparent)]
	Github(#[from] bleach_server_github::ConfigError),

	/// A server configuration value was invalid.
	#[error("invalid configuration: {0}")]
	Invalid(String),
}

/// Listen address settings.
#[derive(Debug, Clone)]
pub struct HttpConfig {
	pub host: String,
	pub port: u16,
}

impl Default for HttpConfig {
	fn default() -> Self {
		Self {
			host: DEFAULT_HOST.to_string(),
			port: DEFAULT_PORT,
		}
	}
}

/// Fully resolved server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
	pub http: HttpConfig,
	/// The exact origin browser traffic must come from (and the only origin
	/// CORS reflects).
	pub frontend_origin: String,
	/// Lowercase GitHub logins permitted to publish.
	pub allowlist: HashSet<String>,
	pub posts_base_path: String,
	pub songs_base_path: String,
	pub art_base_path: String,
	/// Maximum decoded payload size for a single commit.
	pub max_content_bytes: usize,
	/// GitHub OAuth credentials and content repository coordinates.
	pub github: GithubConfig,
}

impl ServerConfig {
	/// Load configuration from environment variables.
	///
	/// Required: the GitHub variables (see [`GithubConfig::from_env`]).
	/// Optional with defaults: `FRONTEND_ORIGIN`, `ALLOWED_GITHUB_USERS`,
	/// `ALLOWED_POSTS_BASE_PATH`, `ALLOWED_SONGS_BASE_PATH`,
	/// `ALLOWED_ART_BASE_PATH`, `MAX_CONTENT_BYTES`, `HTTP_HOST`, `HTTP_PORT`.
	pub fn from_env() -> Result<Self, ConfigError> {
		let frontend_origin = normalize_origin(
			env::var("FRONTEND_ORIGIN")
				.unwrap_or_else(|_| DEFAULT_FRONTEND_ORIGIN.to_string())
				.trim(),
		)?;

		let allowlist = allowlist::load_allowlist(env::var("ALLOWED_GITHUB_USERS").ok().as_deref());

		let max_content_bytes = match env::var("MAX_CONTENT_BYTES") {
			Ok(raw) => raw.trim().parse().map_err(|_| {
				ConfigError::Invalid(format!("MAX_CONTENT_BYTES is not a byte count: {raw}"))
			})?,
			Err(_) => DEFAULT_MAX_CONTENT_BYTES,
		};

		let port = match env::var("HTTP_PORT") {
			Ok(raw) => raw
				.trim()
				.parse()
				.map_err(|_| ConfigError::Invalid(format!("HTTP_PORT is not a port: {raw}")))?,
			Err(_) => DEFAULT_PORT,
		};

		Ok(Self {
			http: HttpConfig {
				host: env::var("HTTP_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
				port,
			},
			frontend_origin,
			allowlist,
			posts_base_path: base_path_env("ALLOWED_POSTS_BASE_PATH", DEFAULT_POSTS_BASE_PATH),
			songs_base_path: base_path_env("ALLOWED_SONGS_BASE_PATH", DEFAULT_SONGS_BASE_PATH),
			art_base_path: base_path_env("ALLOWED_ART_BASE_PATH", DEFAULT_ART_BASE_PATH),
			max_content_bytes,
			github: GithubConfig::from_env()?,
		})
	}

	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

fn base_path_env(name: &str, default: &str) -> String {
	env::var(name)
		.ok()
		.map(|v| v.trim().to_string())
		.filter(|v| !v.is_empty())
		.unwrap_or_else(|| default.to_string())
}

/// Reduce a configured origin to its canonical `scheme://host[:port]` form,
/// the same form `Url::origin` produces for incoming redirect URIs.
pub(crate) fn normalize_origin(raw: &str) -> Result<String, ConfigError> {
	let url = Url::parse(raw)
		.map_err(|e| ConfigError::Invalid(format!("FRONTEND_ORIGIN is not a URL: {e}")))?;

	let origin = url.origin();
	if !origin.is_tuple() {
		return Err(ConfigError::Invalid(
			"FRONTEND_ORIGIN has no usable origin".to_string(),
		));
	}
	Ok(origin.ascii_serialization())
}
