// Copyright (c) 2025 bleach.fish. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The request error taxonomy and its HTTP mapping.
//!
//! Every failure in the request pipeline is one of these kinds; handlers
//! short-circuit with `?` and the `IntoResponse` impl turns the kind into
//! the right status with a `{error, message}` JSON body. GitHub-side detail
//! is logged where the failure is detected but never placed in `message`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// JSON body for every error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
	/// Stable machine-readable code.
	pub error: String,
	/// Human-readable text the frontend displays directly.
	pub message: String,
}

/// A request-terminating failure, tagged with its HTTP status class.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
	/// Malformed or missing fields, invalid path, invalid base64.
	#[error("{message}")]
	BadRequest { error: &'static str, message: String },

	/// Missing or invalid bearer token, failed OAuth exchange.
	#[error("{message}")]
	Unauthenticated { error: &'static str, message: String },

	/// Origin mismatch, disallowed path, disallowed identity.
	#[error("{message}")]
	Forbidden { error: &'static str, message: String },

	/// Payload over the configured byte limit.
	#[error("{message}")]
	PayloadTooLarge { error: &'static str, message: String },

	/// Unexpected GitHub API response; detail stays in the logs.
	#[error("{message}")]
	Upstream { error: &'static str, message: String },
}

impl ApiError {
	pub fn bad_request(error: &'static str, message: impl Into<String>) -> Self {
		Self::BadRequest {
			error,
			message: message.into(),
		}
	}

	pub fn unauthenticated(error: &'static str, message: impl Into<String>) -> Self {
		Self::Unauthenticated {
			error,
			message: message.into(),
		}
	}

	pub fn forbidden(error: &'static str, message: impl Into<String>) -> Self {
		Self::Forbidden {
			error,
			message: message.into(),
		}
	}

	pub fn payload_too_large(error: &'static str, message: impl Into<String>) -> Self {
		Self::PayloadTooLarge {
			error,
			message: message.into(),
		}
	}

	pub fn upstream(error: &'static str, message: impl Into<String>) -> Self {
		Self::Upstream {
			error,
			message: message.into(),
		}
	}

	/// The HTTP status this error maps to.
	pub fn status(&self) -> StatusCode {
		match self {
			Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
			Self::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
			Self::Forbidden { .. } => StatusCode::FORBIDDEN,
			Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
			Self::Upstream { .. } => StatusCode::BAD_GATEWAY,
		}
	}

	fn parts(&self) -> (&'static str, &str) {
		match self {
			Self::BadRequest { error, message }
			| Self::Unauthenticated { error, message }
			| Self::Forbidden { error, message }
			| Self::PayloadTooLarge { error, message }
			| Self::Upstream { error, message } => (error, message),
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let status = self.status();
		let (error, message) = self.parts();
		let body = ErrorResponse {
			error: error.to_string(),
			message: message.to_string(),
		};
		(status, Json(body)).into_response()
	}
}
