// Copyright (c) 2025 bleach.fish. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! CMS commit backend for bleach.fish.
//!
//! A stateless HTTP service that lets the allowlisted site owner publish
//! content (posts, songs, cover art) by committing files into the site's own
//! GitHub repository. GitHub is the content store; there is no database.
//!
//! Two endpoints:
//! - `POST /api/github/exchange`: completes the GitHub OAuth code exchange
//!   server-side and returns the access token only to allowlisted identities.
//! - `POST /api/cms/commit`: validates a target path and payload, re-checks
//!   the caller's GitHub identity against the allowlist, then creates,
//!   updates, or deletes the file via the GitHub Contents API.
//!
//! Every privileged request resolves the caller's identity fresh against
//! GitHub; possession of a token shape alone never reaches a write path.

pub mod allowlist;
pub mod api;
pub mod config;
pub mod error;
pub mod routes;
pub mod validation;

pub use api::{create_router, AppState};
pub use config::{HttpConfig, ServerConfig};
pub use error::{ApiError, ErrorResponse};
