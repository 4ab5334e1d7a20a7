// Copyright (c) 2025 bleach.fish. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Secret wrapper type that prevents accidental logging of sensitive values.
//!
//! [`Secret<T>`] wraps a value so that `Debug` and `Display` render
//! `[REDACTED]` instead of the inner value, and the backing memory is
//! zeroized on drop. Use [`Secret::expose`] at the exact call site where the
//! real value is needed (an HTTP header, a request body) and nowhere else.
//!
//! Serialization intentionally emits the inner value: the CMS exchange
//! endpoint must return the access token to the browser as plain JSON.
//! Deserialization wraps the value immediately so it never exists outside
//! the wrapper.

use std::fmt;

use zeroize::{Zeroize, Zeroizing};

/// The placeholder rendered in place of any secret value.
pub const REDACTED: &str = "[REDACTED]";

/// A wrapper that keeps a sensitive value out of logs and zeroizes it on drop.
pub struct Secret<T: Zeroize>(Zeroizing<T>);

/// Convenience alias for the common case of a secret string.
pub type SecretString = Secret<String>;

impl<T: Zeroize> Secret<T> {
	/// Wrap a sensitive value.
	pub fn new(value: T) -> Self {
		Self(Zeroizing::new(value))
	}

	/// Access the inner value. Call this only where the value is actually
	/// consumed; never in a log statement or error message.
	pub fn expose(&self) -> &T {
		&self.0
	}
}

impl<T: Zeroize + Clone> Clone for Secret<T> {
	fn clone(&self) -> Self {
		Self(self.0.clone())
	}
}

impl<T: Zeroize> fmt::Debug for Secret<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl<T: Zeroize> fmt::Display for Secret<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl<T: Zeroize> From<T> for Secret<T> {
	fn from(value: T) -> Self {
		Self::new(value)
	}
}

#[cfg(feature = "serde")]
impl<T: Zeroize + serde::Serialize> serde::Serialize for Secret<T> {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		self.0.serialize(serializer)
	}
}

#[cfg(feature = "serde")]
impl<'de, T: Zeroize + serde::Deserialize<'de>> serde::Deserialize<'de> for Secret<T> {
	fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		T::deserialize(deserializer).map(Secret::new)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn debug_is_redacted() {
		let secret = SecretString::new("gho_supersecret".to_string());
		let debug = format!("{secret:?}");
		assert_eq!(debug, REDACTED);
		assert!(!debug.contains("gho_supersecret"));
	}

	#[test]
	fn display_is_redacted() {
		let secret = SecretString::new("hunter2".to_string());
		assert_eq!(format!("{secret}"), REDACTED);
	}

	#[test]
	fn expose_returns_inner_value() {
		let secret = SecretString::new("value".to_string());
		assert_eq!(secret.expose(), "value");
	}

	#[test]
	fn clone_preserves_value() {
		let secret = SecretString::new("value".to_string());
		let cloned = secret.clone();
		assert_eq!(cloned.expose(), "value");
	}

	#[cfg(feature = "serde")]
	#[test]
	fn serialize_emits_inner_value() {
		let secret = SecretString::new("token".to_string());
		let json = serde_json::to_string(&secret).unwrap();
		assert_eq!(json, "\"token\"");
	}

	#[cfg(feature = "serde")]
	#[test]
	fn deserialize_wraps_value() {
		let secret: SecretString = serde_json::from_str("\"token\"").unwrap();
		assert_eq!(secret.expose(), "token");
		assert_eq!(format!("{secret:?}"), REDACTED);
	}
}
