// Copyright (c) 2025 bleach.fish. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! `POST /api/cms/commit`: create, update, or delete a content file.
//!
//! The pipeline is a fixed sequence of gates, each terminating the request
//! on failure: validate path → check allowed bases → check payload → extract
//! bearer token → resolve identity fresh against GitHub → allowlist → read
//! existing blob SHA → write or delete. GitHub's per-file SHA precondition
//! provides the optimistic-concurrency guarantee; a stale SHA surfaces as a
//! plain upstream failure.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::{self, HeaderMap};
use axum::Json;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, instrument, warn};

use crate::allowlist;
use crate::api::AppState;
use crate::error::ApiError;
use crate::validation::{self, CommitContent};

const MAX_MESSAGE_CHARS: usize = 120;

#[derive(Debug, Deserialize)]
pub struct CommitRequest {
	pub path: Option<String>,
	pub content: Option<String>,
	#[serde(rename = "contentBase64")]
	pub content_base64: Option<String>,
	pub message: Option<String>,
	#[serde(default, deserialize_with = "deserialize_delete_flag")]
	pub delete: bool,
}

/// The admin frontend has historically sent `delete` as both a boolean and
/// the string `"true"`; accept either.
fn deserialize_delete_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Flag {
		Bool(bool),
		Text(String),
	}

	Ok(match Option::<Flag>::deserialize(deserializer)? {
		Some(Flag::Bool(value)) => value,
		Some(Flag::Text(value)) => value == "true",
		None => false,
	})
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitResponse {
	pub ok: bool,
	pub path: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub committed_by: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub deleted_by: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub already_missing: Option<bool>,
	pub commit_sha: Option<String>,
}

#[instrument(skip_all, name = "commit")]
pub async fn commit(
	State(state): State<AppState>,
	headers: HeaderMap,
	payload: Result<Json<CommitRequest>, JsonRejection>,
) -> Result<Json<CommitResponse>, ApiError> {
	let Json(request) =
		payload.map_err(|_| ApiError::bad_request("bad_request", "Bad request"))?;
	let config = &state.config;

	let path = request
		.path
		.as_deref()
		.and_then(validation::normalize_path)
		.ok_or_else(|| ApiError::bad_request("invalid_path", "Invalid path"))?;

	let path_allowed = validation::is_allowed_markdown_path(&path, &config.posts_base_path)
		|| validation::is_allowed_markdown_path(&path, &config.songs_base_path)
		|| validation::is_allowed_art_path(&path, &config.art_base_path);
	if !path_allowed {
		return Err(ApiError::forbidden(
			"path_not_allowed",
			format!(
				"Path not allowed. Only {}/*.md, {}/*.md, or {}/*.{{png,jpg,jpeg,webp,gif,avif}} is permitted.",
				config.posts_base_path, config.songs_base_path, config.art_base_path
			),
		));
	}

	let is_delete = request.delete;
	let message = commit_message(request.message.as_deref(), is_delete);

	let content = if is_delete {
		None
	} else {
		// Base64 takes precedence, matching the frontend's binary uploads.
		let content = match (request.content, request.content_base64) {
			(_, Some(encoded)) => CommitContent::Base64(encoded),
			(Some(text), None) => CommitContent::Text(text),
			(None, None) => {
				return Err(ApiError::bad_request(
					"missing_content",
					"Missing content or contentBase64",
				));
			}
		};

		let byte_len = content.byte_len().map_err(|_| {
			ApiError::bad_request("invalid_content_base64", "Invalid contentBase64")
		})?;
		if byte_len > config.max_content_bytes {
			return Err(ApiError::payload_too_large(
				"content_too_large",
				format!("Content too large (>{} bytes)", config.max_content_bytes),
			));
		}
		Some(content)
	};

	let access_token = bearer_token(&headers).ok_or_else(|| {
		ApiError::unauthenticated("missing_token", "Missing Authorization Bearer token")
	})?;

	let user = state.github.get_user(access_token).await.map_err(|e| {
		warn!(error = %e, "identity resolution failed");
		ApiError::unauthenticated("invalid_token", "Invalid GitHub access token")
	})?;

	if !allowlist::is_allowed(&user.login, &state.config.allowlist) {
		warn!(login = %user.login, "login not in allowlist");
		return Err(ApiError::forbidden("user_not_allowed", "User not allowed"));
	}

	let existing_sha = state.github.get_existing_sha(&path).await.map_err(|e| {
		warn!(error = %e, path = %path, "existing-file check failed");
		ApiError::upstream("existing_check_failed", "Failed to check existing file")
	})?;

	if is_delete {
		let Some(sha) = existing_sha else {
			// Deleting a file that is already gone is a successful no-op.
			return Ok(Json(CommitResponse {
				ok: true,
				path,
				committed_by: None,
				deleted_by: None,
				already_missing: Some(true),
				commit_sha: None,
			}));
		};

		let commit_sha = state
			.github
			.delete_file(&path, &message, &sha)
			.await
			.map_err(|e| {
				warn!(error = %e, path = %path, "delete failed");
				ApiError::upstream("github_delete_failed", "GitHub delete failed")
			})?;

		info!(login = %user.login, path = %path, "file deleted");
		return Ok(Json(CommitResponse {
			ok: true,
			path,
			committed_by: None,
			deleted_by: Some(user.login),
			already_missing: None,
			commit_sha,
		}));
	}

	let content = content.ok_or_else(|| {
		ApiError::bad_request("missing_content", "Missing content or contentBase64")
	})?;
	let encoded = content
		.into_base64()
		.map_err(|_| ApiError::bad_request("invalid_content_base64", "Invalid contentBase64"))?;

	let commit_sha = state
		.github
		.put_file(&path, &message, &encoded, existing_sha.as_deref())
		.await
		.map_err(|e| {
			warn!(error = %e, path = %path, "commit failed");
			ApiError::upstream("github_commit_failed", "GitHub commit failed")
		})?;

	info!(
		login = %user.login,
		path = %path,
		updated = existing_sha.is_some(),
		"file committed"
	);
	Ok(Json(CommitResponse {
		ok: true,
		path,
		committed_by: Some(user.login),
		deleted_by: None,
		already_missing: None,
		commit_sha,
	}))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
	headers
		.get(header::AUTHORIZATION)?
		.to_str()
		.ok()?
		.strip_prefix("Bearer ")
}

/// Trimmed commit message, capped at 120 chars, with sensible defaults.
fn commit_message(raw: Option<&str>, is_delete: bool) -> String {
	let default = if is_delete { "Delete post" } else { "Add post" };
	let message = raw
		.map(str::trim)
		.filter(|m| !m.is_empty())
		.unwrap_or(default);
	message.chars().take(MAX_MESSAGE_CHARS).collect()
}
