// Copyright (c) 2025 bleach.fish. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared HTTP client with consistent User-Agent header.
//!
//! Every outbound request from the CMS backend identifies itself as
//! `bleach-cms/{version}`. GitHub rejects requests without a User-Agent,
//! so all clients must be built through this crate.

mod client;

pub use client::{builder, new_client, new_client_with_timeout, user_agent};
