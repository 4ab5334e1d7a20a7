// Copyright (c) 2025 bleach.fish. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Response types for the GitHub endpoints the CMS consumes.
//!
//! Each type carries only the fields this system reads; unknown fields in
//! GitHub's responses are dropped during deserialization.

use bleach_common_secret::SecretString;
use serde::{Deserialize, Serialize};

/// Response from GitHub's token endpoint after exchanging an authorization code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubTokenResponse {
	/// The access token for API requests (wrapped to prevent logging).
	pub access_token: SecretString,
}

/// The authenticated user behind an access token, from `GET /user`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubUser {
	/// The GitHub username. Compared case-insensitively against the allowlist.
	pub login: String,
}

/// Error shape GitHub's token endpoint uses for rejected exchanges.
#[derive(Debug, Deserialize)]
pub(crate) struct OAuthErrorResponse {
	pub error: String,
	pub error_description: Option<String>,
}

/// Current file metadata from `GET /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ExistingFile {
	pub sha: String,
}

/// Response from a Contents API write or delete.
#[derive(Debug, Deserialize)]
pub(crate) struct ContentsWriteResponse {
	pub commit: Option<CommitRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitRef {
	pub sha: Option<String>,
}

impl ContentsWriteResponse {
	/// The SHA of the commit GitHub created, when it reported one.
	pub fn commit_sha(self) -> Option<String> {
		self.commit.and_then(|c| c.sha)
	}
}
