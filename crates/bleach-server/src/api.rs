// Copyright (c) 2025 bleach.fish. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Router construction and the HTTP front door.
//!
//! The front door middleware runs before any handler: it rejects non-GET
//! browser traffic (preflights included) whose `Origin` header is not exactly
//! the configured frontend origin, answers surviving CORS preflights with an
//! empty 204, and stamps the fixed security + CORS headers onto every
//! response that leaves the service (including errors and the 404 fallback).

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::{self, HeaderMap, HeaderValue};
use axum::http::{Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use bleach_server_github::GithubClient;
use tracing::warn;

use crate::config::ServerConfig;
use crate::error::ErrorResponse;
use crate::routes;

/// Shared per-process state: immutable config plus the GitHub client.
#[derive(Clone)]
pub struct AppState {
	pub config: Arc<ServerConfig>,
	pub github: GithubClient,
}

/// Build the service router.
pub fn create_router(state: AppState) -> Router {
	Router::new()
		.route("/api/github/exchange", post(routes::exchange::exchange))
		.route("/api/cms/commit", post(routes::commit::commit))
		.fallback(not_found)
		.layer(middleware::from_fn_with_state(state.clone(), front_door))
		.with_state(state)
}

/// Strict origin check, preflight handling, and response headers.
async fn front_door(State(state): State<AppState>, request: Request, next: Next) -> Response {
	let origin = state.config.frontend_origin.clone();

	// Browser traffic must come from the single configured origin, preflights
	// included. Requests without an Origin header (curl, server-to-server)
	// pass through; the identity checks still gate every write.
	if request.method() != Method::GET {
		if let Some(request_origin) = request.headers().get(header::ORIGIN) {
			if request_origin.as_bytes() != origin.as_bytes() {
				warn!(?request_origin, "rejecting request from foreign origin");
				let mut response = (
					StatusCode::FORBIDDEN,
					Json(ErrorResponse {
						error: "origin_not_allowed".to_string(),
						message: "Origin not allowed".to_string(),
					}),
				)
					.into_response();
				apply_edge_headers(response.headers_mut(), &origin);
				return response;
			}
		}
	}

	if request.method() == Method::OPTIONS {
		let mut response = StatusCode::NO_CONTENT.into_response();
		apply_edge_headers(response.headers_mut(), &origin);
		return response;
	}

	let mut response = next.run(request).await;
	apply_edge_headers(response.headers_mut(), &origin);
	response
}

/// Fixed security headers plus CORS reflecting the single frontend origin.
fn apply_edge_headers(headers: &mut HeaderMap, origin: &str) {
	headers.insert(
		header::X_CONTENT_TYPE_OPTIONS,
		HeaderValue::from_static("nosniff"),
	);
	headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
	headers.insert(
		header::REFERRER_POLICY,
		HeaderValue::from_static("no-referrer"),
	);
	headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));

	if let Ok(value) = HeaderValue::from_str(origin) {
		headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
	}
	headers.insert(
		header::ACCESS_CONTROL_ALLOW_METHODS,
		HeaderValue::from_static("POST, OPTIONS"),
	);
	headers.insert(
		header::ACCESS_CONTROL_ALLOW_HEADERS,
		HeaderValue::from_static("Content-Type, Authorization"),
	);
	headers.insert(header::VARY, HeaderValue::from_static("Origin"));
}

async fn not_found() -> impl IntoResponse {
	(
		StatusCode::NOT_FOUND,
		Json(ErrorResponse {
			error: "not_found".to_string(),
			message: "Not found".to_string(),
		}),
	)
}
