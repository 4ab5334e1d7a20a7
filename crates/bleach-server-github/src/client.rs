// Copyright (c) 2025 bleach.fish. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The GitHub client: OAuth exchange, identity lookup, Contents API.

use reqwest::StatusCode;
use tracing::warn;
use url::Url;

use crate::config::GithubConfig;
use crate::error::GithubError;
use crate::types::{
	ContentsWriteResponse, ExistingFile, GithubTokenResponse, GithubUser, OAuthErrorResponse,
};

const GITHUB_API_BASE: &str = "https://api.github.com";
const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// Client for the GitHub endpoints the CMS uses.
///
/// One instance is built at startup and shared across requests; it holds the
/// confidential OAuth credentials and the repo PAT, both redacted in `Debug`.
#[derive(Debug, Clone)]
pub struct GithubClient {
	config: GithubConfig,
	http: reqwest::Client,
	api_base: Url,
	token_url: Url,
}

impl GithubClient {
	/// Create a new client with the given configuration.
	///
	/// # Panics
	///
	/// Panics if the HTTP client cannot be built (should never happen in practice).
	pub fn new(config: GithubConfig) -> Self {
		let http = bleach_common_http::builder()
			.build()
			.expect("failed to build HTTP client");

		Self {
			config,
			http,
			api_base: Url::parse(GITHUB_API_BASE).expect("default API base is valid"),
			token_url: Url::parse(GITHUB_TOKEN_URL).expect("default token URL is valid"),
		}
	}

	/// Override the API base URL (GitHub Enterprise, tests).
	///
	/// Must be HTTPS, or HTTP on a loopback host. If validation fails, logs a
	/// warning and keeps the previous value.
	pub fn with_api_base(mut self, url: impl Into<String>) -> Self {
		let raw = url.into();
		match validate_base_url(&raw) {
			Ok(parsed) => self.api_base = parsed,
			Err(e) => warn!(error = %e, url = %raw, "invalid api base, keeping previous value"),
		}
		self
	}

	/// Override the OAuth token endpoint URL (tests).
	///
	/// Same validation rules as [`with_api_base`](Self::with_api_base).
	pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
		let raw = url.into();
		match validate_base_url(&raw) {
			Ok(parsed) => self.token_url = parsed,
			Err(e) => warn!(error = %e, url = %raw, "invalid token URL, keeping previous value"),
		}
		self
	}

	/// The configuration this client was built with.
	pub fn config(&self) -> &GithubConfig {
		&self.config
	}

	/// Exchange an authorization code for an access token.
	///
	/// The client secret rides in the request body to GitHub and nowhere
	/// else. Any rejection from GitHub (error payload, missing token) comes
	/// back as [`GithubError::OAuthRejected`].
	#[tracing::instrument(skip_all, name = "GithubClient::exchange_code")]
	pub async fn exchange_code(
		&self,
		code: &str,
		redirect_uri: &str,
	) -> Result<GithubTokenResponse, GithubError> {
		tracing::debug!("exchanging authorization code for access token");

		let response = self
			.http
			.post(self.token_url.clone())
			.header("Accept", "application/json")
			.json(&serde_json::json!({
				"client_id": self.config.client_id,
				"client_secret": self.config.client_secret.expose(),
				"code": code,
				"redirect_uri": redirect_uri,
			}))
			.send()
			.await?;

		let status = response.status();
		let body = response.text().await?;

		if !status.is_success() {
			return Err(GithubError::api(
				status.as_u16(),
				"token endpoint returned non-success",
			));
		}

		// GitHub reports exchange failures as 200s with an error payload.
		if let Ok(error_response) = serde_json::from_str::<OAuthErrorResponse>(&body) {
			if !error_response.error.is_empty() {
				let message = error_response
					.error_description
					.unwrap_or(error_response.error);
				return Err(GithubError::OAuthRejected(message));
			}
		}

		let token: GithubTokenResponse = serde_json::from_str(&body)
			.map_err(|e| GithubError::Parse(format!("token response: {e}")))?;

		if token.access_token.expose().is_empty() {
			return Err(GithubError::OAuthRejected(
				"token endpoint returned no access token".to_string(),
			));
		}

		Ok(token)
	}

	/// Resolve the authenticated user behind an access token.
	///
	/// Any non-200 from GitHub is an error; callers treat every failure
	/// uniformly as "unauthenticated".
	#[tracing::instrument(skip_all, name = "GithubClient::get_user")]
	pub async fn get_user(&self, access_token: &str) -> Result<GithubUser, GithubError> {
		tracing::debug!("resolving GitHub identity");

		let mut url = self.api_base.clone();
		url
			.path_segments_mut()
			.expect("api base is a valid base URL")
			.pop_if_empty()
			.push("user");

		let response = self
			.http
			.get(url)
			.header("Accept", GITHUB_ACCEPT)
			.header("X-GitHub-Api-Version", GITHUB_API_VERSION)
			.bearer_auth(access_token)
			.send()
			.await?;

		let status = response.status();
		if !status.is_success() {
			return Err(GithubError::api(status.as_u16(), "user lookup failed"));
		}

		response
			.json()
			.await
			.map_err(|e| GithubError::Parse(format!("user response: {e}")))
	}

	/// Fetch the current blob SHA of a repository path on the configured
	/// branch, or `None` if the file does not exist.
	#[tracing::instrument(skip(self), name = "GithubClient::get_existing_sha")]
	pub async fn get_existing_sha(&self, path: &str) -> Result<Option<String>, GithubError> {
		let url = self.contents_url(path, true);

		let response = self
			.http
			.get(url)
			.header("Accept", GITHUB_ACCEPT)
			.header("X-GitHub-Api-Version", GITHUB_API_VERSION)
			.bearer_auth(self.config.repo_token.expose())
			.send()
			.await?;

		match response.status() {
			StatusCode::OK => {
				let existing: ExistingFile = response
					.json()
					.await
					.map_err(|e| GithubError::Parse(format!("contents response: {e}")))?;
				Ok(Some(existing.sha))
			}
			StatusCode::NOT_FOUND => Ok(None),
			status => Err(GithubError::api(
				status.as_u16(),
				"failed to check existing file",
			)),
		}
	}

	/// Create or update a file on the configured branch.
	///
	/// `sha` must be the current blob SHA when the file already exists and
	/// absent when it does not; GitHub distinguishes create from update on
	/// exactly this field. Returns the new commit SHA when GitHub reports one.
	#[tracing::instrument(skip(self, content_base64), name = "GithubClient::put_file")]
	pub async fn put_file(
		&self,
		path: &str,
		message: &str,
		content_base64: &str,
		sha: Option<&str>,
	) -> Result<Option<String>, GithubError> {
		let url = self.contents_url(path, false);

		let mut body = serde_json::json!({
			"message": message,
			"content": content_base64,
			"branch": self.config.repo_branch,
		});
		if let Some(sha) = sha {
			body["sha"] = serde_json::Value::String(sha.to_string());
		}

		let response = self
			.http
			.put(url)
			.header("Accept", GITHUB_ACCEPT)
			.header("X-GitHub-Api-Version", GITHUB_API_VERSION)
			.bearer_auth(self.config.repo_token.expose())
			.json(&body)
			.send()
			.await?;

		let status = response.status();
		if !status.is_success() {
			return Err(GithubError::api(status.as_u16(), "commit failed"));
		}

		// A success without a parseable commit SHA is still a success.
		Ok(response
			.json::<ContentsWriteResponse>()
			.await
			.ok()
			.and_then(ContentsWriteResponse::commit_sha))
	}

	/// Delete a file on the configured branch, keyed by its current blob SHA.
	///
	/// Returns the deletion commit SHA when GitHub reports one.
	#[tracing::instrument(skip(self), name = "GithubClient::delete_file")]
	pub async fn delete_file(
		&self,
		path: &str,
		message: &str,
		sha: &str,
	) -> Result<Option<String>, GithubError> {
		let url = self.contents_url(path, false);

		let response = self
			.http
			.delete(url)
			.header("Accept", GITHUB_ACCEPT)
			.header("X-GitHub-Api-Version", GITHUB_API_VERSION)
			.bearer_auth(self.config.repo_token.expose())
			.json(&serde_json::json!({
				"message": message,
				"sha": sha,
				"branch": self.config.repo_branch,
			}))
			.send()
			.await?;

		let status = response.status();
		if !status.is_success() {
			return Err(GithubError::api(status.as_u16(), "delete failed"));
		}

		Ok(response
			.json::<ContentsWriteResponse>()
			.await
			.ok()
			.and_then(ContentsWriteResponse::commit_sha))
	}

	/// Build a Contents API URL for a repository path.
	///
	/// Each path segment is percent-encoded individually so slashes survive;
	/// reads pin the branch with `?ref=`, writes carry it in the body.
	fn contents_url(&self, path: &str, with_ref: bool) -> Url {
		let mut url = self.api_base.clone();
		{
			let mut segments = url
				.path_segments_mut()
				.expect("api base is a valid base URL");
			segments.pop_if_empty().extend([
				"repos",
				self.config.repo_owner.as_str(),
				self.config.repo_name.as_str(),
				"contents",
			]);
			segments.extend(path.split('/'));
		}
		if with_ref {
			url
				.query_pairs_mut()
				.append_pair("ref", &self.config.repo_branch);
		}
		url
	}
}

fn validate_base_url(raw: &str) -> Result<Url, String> {
	let url = Url::parse(raw).map_err(|e| format!("invalid URL '{raw}': {e}"))?;

	let host = url
		.host_str()
		.ok_or_else(|| "URL must include a host".to_string())?;
	let loopback = host == "localhost" || host == "127.0.0.1" || host == "::1" || host == "[::1]";

	match url.scheme() {
		"https" => Ok(url),
		"http" if loopback => Ok(url),
		scheme => Err(format!("URL must use https, got '{scheme}'")),
	}
}
