// Copyright (c) 2025 bleach.fish. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The allowlist gate: which GitHub identities may write.
//!
//! The allowlist is loaded once at startup and held immutably in the server
//! config. An empty or unset configuration value falls back to the single
//! built-in owner; the service must never run with an "everyone allowed"
//! allowlist.

use std::collections::HashSet;

/// The site owner, allowed when no allowlist is configured.
pub const DEFAULT_ALLOWED_USER: &str = "bleach2004";

/// Parse a comma-separated allowlist into a lowercase set.
///
/// Blank entries are dropped; if nothing remains, the set contains exactly
/// the built-in owner.
pub fn load_allowlist(raw: Option<&str>) -> HashSet<String> {
	let from_env: HashSet<String> = raw
		.unwrap_or("")
		.split(',')
		.map(|s| s.trim().to_lowercase())
		.filter(|s| !s.is_empty())
		.collect();

	if from_env.is_empty() {
		HashSet::from([DEFAULT_ALLOWED_USER.to_string()])
	} else {
		from_env
	}
}

/// Case-insensitive membership test against a loaded allowlist.
pub fn is_allowed(login: &str, allowlist: &HashSet<String>) -> bool {
	allowlist.contains(&login.to_lowercase())
}
