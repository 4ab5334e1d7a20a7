// Copyright (c) 2025 bleach.fish. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the GitHub client.

use thiserror::Error;

/// Errors that can occur when talking to GitHub.
#[derive(Debug, Error)]
pub enum GithubError {
	/// Network-level error during HTTP communication.
	#[error("HTTP request failed: {0}")]
	Network(#[from] reqwest::Error),

	/// GitHub returned a non-success status.
	#[error("GitHub API error: {status} - {message}")]
	Api { status: u16, message: String },

	/// GitHub rejected the OAuth code exchange (bad code, bad redirect, ...).
	#[error("OAuth exchange rejected: {0}")]
	OAuthRejected(String),

	/// The response from GitHub could not be parsed as expected.
	#[error("failed to parse response: {0}")]
	Parse(String),
}

impl GithubError {
	/// Create an API error from status code and message.
	pub fn api(status: u16, message: impl Into<String>) -> Self {
		Self::Api {
			status,
			message: message.into(),
		}
	}

	/// Whether this error is GitHub saying the resource does not exist.
	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::Api { status: 404, .. })
	}
}
