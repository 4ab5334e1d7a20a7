// Copyright (c) 2025 bleach.fish. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Pure path and content validation for commit requests.
//!
//! These checks are what keep the commit endpoint from being an open
//! file-write primitive into the repository: a path must normalize cleanly,
//! sit under one of the configured base directories, and match that base's
//! extension rules; payloads are size-capped on their decoded bytes.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

/// Image extensions permitted under the art base path.
const ART_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "webp", "gif", "avif"];

/// Errors from content payload validation.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
	/// The provided base64 payload did not decode.
	#[error("invalid base64 content")]
	InvalidEncoding,
}

/// Normalize a raw request path: trim, strip leading slashes.
///
/// Returns `None` for empty results and for anything containing a `..`
/// segment, so traversal never reaches the Contents API.
pub fn normalize_path(raw: &str) -> Option<String> {
	let trimmed = raw.trim().trim_start_matches('/');
	if trimmed.is_empty() || trimmed.contains("..") {
		return None;
	}
	Some(trimmed.to_string())
}

/// True iff `path` sits under `base` and is a Markdown file.
pub fn is_allowed_markdown_path(path: &str, base: &str) -> bool {
	let base = base.trim_matches('/');
	path.starts_with(&format!("{base}/")) && path.ends_with(".md")
}

/// True iff `path` sits under `base` and carries an allowed image extension
/// (case-insensitive).
pub fn is_allowed_art_path(path: &str, base: &str) -> bool {
	let base = base.trim_matches('/');
	if !path.starts_with(&format!("{base}/")) {
		return false;
	}
	match path.rsplit_once('.') {
		Some((_, ext)) => ART_EXTENSIONS
			.iter()
			.any(|allowed| ext.eq_ignore_ascii_case(allowed)),
		None => false,
	}
}

/// A commit payload, as supplied by the browser.
///
/// Base64 takes precedence when both forms are present, matching the
/// frontend's behavior for binary uploads.
#[derive(Debug, Clone)]
pub enum CommitContent {
	/// UTF-8 text (Markdown); measured and uploaded as its UTF-8 bytes.
	Text(String),
	/// Base64-encoded binary; whitespace is stripped before decoding.
	Base64(String),
}

impl CommitContent {
	/// The decoded byte length of this payload.
	pub fn byte_len(&self) -> Result<usize, ContentError> {
		match self {
			Self::Text(text) => Ok(text.len()),
			Self::Base64(encoded) => {
				let compact = compact_base64(encoded);
				BASE64
					.decode(compact.as_bytes())
					.map(|decoded| decoded.len())
					.map_err(|_| ContentError::InvalidEncoding)
			}
		}
	}

	/// The payload as the base64 string the Contents API expects.
	pub fn into_base64(self) -> Result<String, ContentError> {
		match self {
			Self::Text(text) => Ok(BASE64.encode(text.as_bytes())),
			Self::Base64(encoded) => {
				let compact = compact_base64(&encoded);
				BASE64
					.decode(compact.as_bytes())
					.map_err(|_| ContentError::InvalidEncoding)?;
				Ok(compact)
			}
		}
	}
}

fn compact_base64(encoded: &str) -> String {
	encoded.chars().filter(|c| !c.is_whitespace()).collect()
}


#[cfg(test)]
mod proptests {
	use super::*;
	use proptest::prelude::*;

	proptest! {
		/// Whatever the input, a normalized path never starts with a slash
		/// and never contains a traversal segment.
		#[test]
		fn normalized_paths_are_clean(raw in "[ -~]{0,80}") {
			if let Some(normalized) = normalize_path(&raw) {
				prop_assert!(!normalized.starts_with('/'));
				prop_assert!(!normalized.contains(".."));
				prop_assert!(!normalized.is_empty());
			}
		}

		/// A path passing the markdown check always has the base as a real
		/// directory prefix and the .md extension.
		#[test]
		fn markdown_check_implies_prefix_and_extension(
			name in "[a-z0-9]{1,20}",
			base in "[a-z]{1,8}(/[a-z]{1,8}){0,2}",
		) {
			let path = format!("{base}/{name}.md");
			let longer_base = format!("{base}x");
			let png_path = format!("{base}/{name}.png");
			prop_assert!(is_allowed_markdown_path(&path, &base));
			prop_assert!(!is_allowed_markdown_path(&path, &longer_base));
			prop_assert!(!is_allowed_markdown_path(&png_path, &base));
		}

		/// Text payload length equals its UTF-8 byte count after the base64
		/// round trip.
		#[test]
		fn text_byte_len_matches_encoding(text in "\\PC{0,200}") {
			let expected = text.len();
			let content = CommitContent::Text(text);
			prop_assert_eq!(content.byte_len().unwrap(), expected);
		}
	}
}
