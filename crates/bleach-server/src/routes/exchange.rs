// Copyright (c) 2025 bleach.fish. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! `POST /api/github/exchange`: server-side OAuth code exchange.
//!
//! The browser sends the authorization code it got back from GitHub; this
//! handler exchanges it using the confidential client secret, then checks
//! the resulting identity against the allowlist *before* the token is ever
//! returned. An unauthorized GitHub account never receives a usable token
//! from this service, even though GitHub itself authenticated it.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use bleach_common_secret::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use url::Url;

use crate::allowlist;
use crate::api::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ExchangeRequest {
	pub code: Option<String>,
	#[serde(rename = "redirectUri")]
	pub redirect_uri: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExchangeResponse {
	pub access_token: SecretString,
}

#[instrument(skip_all, name = "exchange")]
pub async fn exchange(
	State(state): State<AppState>,
	payload: Result<Json<ExchangeRequest>, JsonRejection>,
) -> Result<Json<ExchangeResponse>, ApiError> {
	let Json(payload) =
		payload.map_err(|_| ApiError::bad_request("bad_request", "Bad request"))?;

	let (code, redirect_uri) = match (payload.code, payload.redirect_uri) {
		(Some(code), Some(redirect_uri)) if !code.is_empty() && !redirect_uri.is_empty() => {
			(code, redirect_uri)
		}
		_ => {
			return Err(ApiError::bad_request(
				"missing_fields",
				"Missing code or redirectUri",
			));
		}
	};

	// The redirect URI must belong to our frontend, or an attacker could
	// bounce the token through a page they control.
	let redirect_origin = Url::parse(&redirect_uri)
		.map(|url| url.origin().ascii_serialization())
		.map_err(|_| ApiError::bad_request("invalid_redirect_uri", "Invalid redirectUri"))?;
	if redirect_origin != state.config.frontend_origin {
		return Err(ApiError::forbidden(
			"invalid_redirect_origin",
			"Invalid redirectUri origin",
		));
	}

	let token = state
		.github
		.exchange_code(&code, &redirect_uri)
		.await
		.map_err(|e| {
			warn!(error = %e, "OAuth code exchange failed");
			ApiError::unauthenticated("oauth_exchange_failed", "OAuth exchange failed")
		})?;

	let user = state
		.github
		.get_user(token.access_token.expose())
		.await
		.map_err(|e| {
			warn!(error = %e, "identity resolution failed for fresh token");
			ApiError::unauthenticated("invalid_token", "Invalid GitHub access token")
		})?;

	if !allowlist::is_allowed(&user.login, &state.config.allowlist) {
		warn!(login = %user.login, "login not in allowlist, withholding token");
		return Err(ApiError::forbidden("user_not_allowed", "User not allowed"));
	}

	info!(login = %user.login, "OAuth exchange authorized");
	Ok(Json(ExchangeResponse {
		access_token: token.access_token,
	}))
}
