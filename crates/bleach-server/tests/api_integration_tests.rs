// Copyright (c) 2025 bleach.fish. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Router-level tests: the front door, request validation, and the error
//! surface. No GitHub traffic happens here, so the client points at an
//! unroutable loopback base.

use std::collections::HashSet;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use bleach_common_secret::SecretString;
use bleach_server::{create_router, AppState, HttpConfig, ServerConfig};
use bleach_server_github::{GithubClient, GithubConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

const FRONTEND: &str = "https://bleach.fish";

fn test_state() -> AppState {
	let github_config = GithubConfig {
		client_id: "test-client-id".to_string(),
		client_secret: SecretString::new("test-client-sekrit".to_string()),
		repo_owner: "bleach2004".to_string(),
		repo_name: "bleach.fish".to_string(),
		repo_branch: "main".to_string(),
		repo_token: SecretString::new("test-repo-token".to_string()),
	};

	let config = ServerConfig {
		http: HttpConfig::default(),
		frontend_origin: FRONTEND.to_string(),
		allowlist: HashSet::from(["bleach2004".to_string()]),
		posts_base_path: "site/src/posts".to_string(),
		songs_base_path: "site/src/music".to_string(),
		art_base_path: "site/public/art".to_string(),
		max_content_bytes: 200_000,
		github: github_config.clone(),
	};

	// Port 9 is discard; nothing in these tests should reach it.
	let github = GithubClient::new(github_config)
		.with_api_base("http://127.0.0.1:9")
		.with_token_url("http://127.0.0.1:9/token");

	AppState {
		config: Arc::new(config),
		github,
	}
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
	Request::builder()
		.method(Method::POST)
		.uri(uri)
		.header(header::CONTENT_TYPE, "application/json")
		.header(header::ORIGIN, FRONTEND)
		.body(Body::from(body.to_string()))
		.unwrap()
}

async fn error_code(response: axum::response::Response) -> String {
	let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
		.await
		.unwrap();
	let value: Value = serde_json::from_slice(&bytes).unwrap();
	value["error"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn preflight_returns_no_content_with_cors_headers() {
	let app = create_router(test_state());

	let request = Request::builder()
		.method(Method::OPTIONS)
		.uri("/api/cms/commit")
		.header(header::ORIGIN, FRONTEND)
		.body(Body::empty())
		.unwrap();

	let response = app.oneshot(request).await.unwrap();
	assert_eq!(response.status(), StatusCode::NO_CONTENT);

	let headers = response.headers();
	assert_eq!(headers["access-control-allow-origin"], FRONTEND);
	assert_eq!(headers["access-control-allow-methods"], "POST, OPTIONS");
	assert_eq!(
		headers["access-control-allow-headers"],
		"Content-Type, Authorization"
	);
	assert_eq!(headers["vary"], "Origin");
}

#[tokio::test]
async fn foreign_origin_preflight_is_rejected() {
	let app = create_router(test_state());

	// The origin check runs before the preflight answer; a foreign-origin
	// OPTIONS gets 403, never 204.
	let request = Request::builder()
		.method(Method::OPTIONS)
		.uri("/api/cms/commit")
		.header(header::ORIGIN, "https://evil.example")
		.body(Body::empty())
		.unwrap();

	let response = app.oneshot(request).await.unwrap();
	assert_eq!(response.status(), StatusCode::FORBIDDEN);
	assert_eq!(error_code(response).await, "origin_not_allowed");
}

#[tokio::test]
async fn foreign_origin_is_rejected_before_handlers() {
	let app = create_router(test_state());

	let request = Request::builder()
		.method(Method::POST)
		.uri("/api/cms/commit")
		.header(header::CONTENT_TYPE, "application/json")
		.header(header::ORIGIN, "https://evil.example")
		.body(Body::from("{}"))
		.unwrap();

	let response = app.oneshot(request).await.unwrap();
	assert_eq!(response.status(), StatusCode::FORBIDDEN);
	assert_eq!(error_code(response).await, "origin_not_allowed");
}

#[tokio::test]
async fn request_without_origin_header_reaches_handlers() {
	let app = create_router(test_state());

	// No Origin header (curl-style). The front door passes it through and
	// the handler's own validation answers.
	let request = Request::builder()
		.method(Method::POST)
		.uri("/api/cms/commit")
		.header(header::CONTENT_TYPE, "application/json")
		.body(Body::from(json!({ "path": "" }).to_string()))
		.unwrap();

	let response = app.oneshot(request).await.unwrap();
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn security_headers_are_stamped_on_every_response() {
	let app = create_router(test_state());

	let request = Request::builder()
		.method(Method::GET)
		.uri("/no/such/route")
		.body(Body::empty())
		.unwrap();

	let response = app.oneshot(request).await.unwrap();
	assert_eq!(response.status(), StatusCode::NOT_FOUND);

	let headers = response.headers();
	assert_eq!(headers["x-content-type-options"], "nosniff");
	assert_eq!(headers["x-frame-options"], "DENY");
	assert_eq!(headers["referrer-policy"], "no-referrer");
	assert_eq!(headers["cache-control"], "no-store");
	assert_eq!(headers["access-control-allow-origin"], FRONTEND);
}

#[tokio::test]
async fn unknown_route_returns_json_404() {
	let app = create_router(test_state());

	let response = app
		.oneshot(post_json("/api/unknown", json!({})))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::NOT_FOUND);
	assert_eq!(error_code(response).await, "not_found");
}

#[tokio::test]
async fn exchange_rejects_missing_fields() {
	let app = create_router(test_state());

	let response = app
		.oneshot(post_json("/api/github/exchange", json!({ "code": "abc" })))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(error_code(response).await, "missing_fields");
}

#[tokio::test]
async fn exchange_rejects_malformed_body() {
	let app = create_router(test_state());

	let request = Request::builder()
		.method(Method::POST)
		.uri("/api/github/exchange")
		.header(header::CONTENT_TYPE, "application/json")
		.header(header::ORIGIN, FRONTEND)
		.body(Body::from("not json"))
		.unwrap();

	let response = app.oneshot(request).await.unwrap();
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn exchange_rejects_redirect_uri_on_foreign_origin() {
	let app = create_router(test_state());

	let response = app
		.oneshot(post_json(
			"/api/github/exchange",
			json!({
				"code": "abc",
				"redirectUri": "https://evil.example/callback"
			}),
		))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::FORBIDDEN);
	assert_eq!(error_code(response).await, "invalid_redirect_origin");
}

#[tokio::test]
async fn exchange_rejects_unparseable_redirect_uri() {
	let app = create_router(test_state());

	let response = app
		.oneshot(post_json(
			"/api/github/exchange",
			json!({ "code": "abc", "redirectUri": "not a url" }),
		))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(error_code(response).await, "invalid_redirect_uri");
}

#[tokio::test]
async fn commit_rejects_path_traversal() {
	let app = create_router(test_state());

	let response = app
		.oneshot(post_json(
			"/api/cms/commit",
			json!({
				"path": "site/src/posts/../../secrets.md",
				"content": "hi"
			}),
		))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(error_code(response).await, "invalid_path");
}

#[tokio::test]
async fn commit_rejects_path_outside_allowed_bases() {
	let app = create_router(test_state());

	let response = app
		.oneshot(post_json(
			"/api/cms/commit",
			json!({ "path": "README.md", "content": "hi" }),
		))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::FORBIDDEN);

	let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
		.await
		.unwrap();
	let value: Value = serde_json::from_slice(&bytes).unwrap();
	assert_eq!(value["error"], "path_not_allowed");
	// The message names every writable pattern so the frontend can show it.
	let message = value["message"].as_str().unwrap();
	assert!(message.contains("site/src/posts/*.md"));
	assert!(message.contains("site/src/music/*.md"));
	assert!(message.contains("site/public/art/*"));
}

#[tokio::test]
async fn commit_rejects_wrong_extension_under_allowed_base() {
	let app = create_router(test_state());

	let response = app
		.oneshot(post_json(
			"/api/cms/commit",
			json!({ "path": "site/src/posts/note.txt", "content": "hi" }),
		))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::FORBIDDEN);
	assert_eq!(error_code(response).await, "path_not_allowed");
}

#[tokio::test]
async fn commit_rejects_missing_content() {
	let app = create_router(test_state());

	let response = app
		.oneshot(post_json(
			"/api/cms/commit",
			json!({ "path": "site/src/posts/hello.md" }),
		))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(error_code(response).await, "missing_content");
}

#[tokio::test]
async fn commit_rejects_invalid_base64() {
	let app = create_router(test_state());

	let response = app
		.oneshot(post_json(
			"/api/cms/commit",
			json!({
				"path": "site/public/art/cat.png",
				"contentBase64": "!!!not-base64!!!"
			}),
		))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(error_code(response).await, "invalid_content_base64");
}

#[tokio::test]
async fn commit_rejects_oversized_content() {
	let app = create_router(test_state());

	let big = "x".repeat(200_001);
	let response = app
		.oneshot(post_json(
			"/api/cms/commit",
			json!({ "path": "site/src/posts/big.md", "content": big }),
		))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
	assert_eq!(error_code(response).await, "content_too_large");
}

#[tokio::test]
async fn commit_requires_bearer_token() {
	let app = create_router(test_state());

	let response = app
		.oneshot(post_json(
			"/api/cms/commit",
			json!({ "path": "site/src/posts/hello.md", "content": "hi" }),
		))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
	assert_eq!(error_code(response).await, "missing_token");
}

#[tokio::test]
async fn size_gate_runs_before_auth_gate() {
	let app = create_router(test_state());

	// Oversized payload with no token: the size check answers first.
	let big = "x".repeat(200_001);
	let response = app
		.oneshot(post_json(
			"/api/cms/commit",
			json!({ "path": "site/src/posts/big.md", "content": big }),
		))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
