// Copyright (c) 2025 bleach.fish. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Typed GitHub client for the CMS backend.
//!
//! This crate covers the three GitHub surfaces the CMS touches:
//!
//! 1. **OAuth code exchange**: Trade an authorization code for an access
//!    token using the confidential client credentials. The client secret
//!    never leaves the server.
//!
//! 2. **Identity lookup**: Resolve the authenticated login behind an access
//!    token via `GET /user`. Callers re-resolve on every privileged request;
//!    nothing is cached.
//!
//! 3. **Contents API**: Read the current blob SHA of a repository path, then
//!    create, update, or delete it. The SHA is GitHub's optimistic-concurrency
//!    precondition for writes.
//!
//! Response types carry only the fields the CMS consumes (`login`, `sha`,
//! `commit.sha`, `access_token`); everything else GitHub sends is dropped at
//! the boundary.
//!
//! # Security Considerations
//!
//! - The client secret, repo token, and access tokens are wrapped in
//!   [`SecretString`] to prevent accidental logging.
//! - Tracing instrumentation skips sensitive parameters.

mod client;
mod config;
mod error;
mod types;

pub use bleach_common_secret::SecretString;
pub use client::GithubClient;
pub use config::{ConfigError, GithubConfig};
pub use error::GithubError;
pub use types::{GithubTokenResponse, GithubUser};
