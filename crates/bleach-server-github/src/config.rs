// Copyright (c) 2025 bleach.fish. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for the GitHub client.

use std::env;

use bleach_common_secret::SecretString;

const DEFAULT_BRANCH: &str = "main";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// A required environment variable was not set.
	#[error("missing environment variable: {0}")]
	MissingEnvVar(String),

	/// A configuration value was empty or invalid.
	#[error("invalid configuration: {0}")]
	InvalidConfig(String),
}

/// Credentials and repository coordinates for the GitHub client.
///
/// Sensitive fields are wrapped in [`SecretString`] so the whole struct can
/// be logged with `Debug` without leaking them.
#[derive(Debug, Clone)]
pub struct GithubConfig {
	/// OAuth application client ID.
	pub client_id: String,
	/// OAuth application client secret (never logged, never sent to the browser).
	pub client_secret: SecretString,
	/// Owner of the content repository.
	pub repo_owner: String,
	/// Name of the content repository.
	pub repo_name: String,
	/// Branch that commits land on.
	pub repo_branch: String,
	/// PAT with Contents read/write on the content repository.
	pub repo_token: SecretString,
}

impl GithubConfig {
	/// Load configuration from environment variables.
	///
	/// Required: `GITHUB_CLIENT_ID`, `GITHUB_CLIENT_SECRET`,
	/// `GITHUB_REPO_OWNER`, `GITHUB_REPO_NAME`, `GITHUB_REPO_TOKEN`.
	/// Optional: `GITHUB_REPO_BRANCH` (defaults to `main`).
	pub fn from_env() -> Result<Self, ConfigError> {
		let config = Self {
			client_id: required_env("GITHUB_CLIENT_ID")?,
			client_secret: SecretString::new(required_env("GITHUB_CLIENT_SECRET")?),
			repo_owner: required_env("GITHUB_REPO_OWNER")?,
			repo_name: required_env("GITHUB_REPO_NAME")?,
			repo_branch: env::var("GITHUB_REPO_BRANCH")
				.ok()
				.map(|b| b.trim().to_string())
				.filter(|b| !b.is_empty())
				.unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
			repo_token: SecretString::new(required_env("GITHUB_REPO_TOKEN")?),
		};
		config.validate()?;
		Ok(config)
	}

	/// Validate that all configuration fields are non-empty.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.client_id.is_empty() {
			return Err(ConfigError::InvalidConfig(
				"client_id cannot be empty".to_string(),
			));
		}
		if self.client_secret.expose().is_empty() {
			return Err(ConfigError::InvalidConfig(
				"client_secret cannot be empty".to_string(),
			));
		}
		if self.repo_owner.is_empty() || self.repo_name.is_empty() {
			return Err(ConfigError::InvalidConfig(
				"repo owner and name cannot be empty".to_string(),
			));
		}
		if self.repo_branch.is_empty() {
			return Err(ConfigError::InvalidConfig(
				"repo branch cannot be empty".to_string(),
			));
		}
		if self.repo_token.expose().is_empty() {
			return Err(ConfigError::InvalidConfig(
				"repo_token cannot be empty".to_string(),
			));
		}
		Ok(())
	}
}

fn required_env(name: &str) -> Result<String, ConfigError> {
	env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}
