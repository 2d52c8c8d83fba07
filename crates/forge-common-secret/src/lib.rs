// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Secret wrapper type that prevents accidental logging of sensitive values.
//!
//! [`SecretString`] holds credentials (OAuth client secrets, access tokens)
//! and renders as `[REDACTED]` in both `Debug` and `Display` output, so a
//! stray `{:?}` in a log line cannot leak the value. The inner string is
//! zeroed on drop.
//!
//! Access to the raw value is always explicit via [`SecretString::expose`].
//!
//! # Example
//!
//! ```
//! use forge_common_secret::SecretString;
//!
//! let secret = SecretString::new("hunter2");
//! assert_eq!(format!("{secret:?}"), "[REDACTED]");
//! assert_eq!(secret.expose(), "hunter2");
//! ```

use std::fmt;
use zeroize::Zeroize;

/// A string wrapper that never appears in `Debug`/`Display` output.
///
/// With the `serde` feature (default), deserializes from a plain JSON
/// string directly into the wrapper, so secrets arriving in provider
/// responses are protected from the moment they are parsed. Serialization
/// writes the raw value; only serialize secrets into stores that are
/// themselves protected.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
	/// Wrap a sensitive value.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Get the raw value. Call sites should be the only places the secret
	/// leaves the wrapper; never pass the result to a logging macro.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Whether the wrapped value is empty.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl Drop for SecretString {
	fn drop(&mut self) {
		self.0.zeroize();
	}
}

impl fmt::Debug for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("[REDACTED]")
	}
}

impl fmt::Display for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("[REDACTED]")
	}
}

impl From<String> for SecretString {
	fn from(value: String) -> Self {
		Self(value)
	}
}

impl From<&str> for SecretString {
	fn from(value: &str) -> Self {
		Self(value.to_string())
	}
}

#[cfg(feature = "serde")]
impl serde::Serialize for SecretString {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_str(&self.0)
	}
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for SecretString {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let value = String::deserialize(deserializer)?;
		Ok(Self(value))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn debug_output_is_redacted() {
		let secret = SecretString::new("super_secret_value");
		let debug = format!("{secret:?}");
		assert_eq!(debug, "[REDACTED]");
		assert!(!debug.contains("super_secret_value"));
	}

	#[test]
	fn display_output_is_redacted() {
		let secret = SecretString::new("super_secret_value");
		assert_eq!(secret.to_string(), "[REDACTED]");
	}

	#[test]
	fn expose_returns_raw_value() {
		let secret = SecretString::new("hunter2");
		assert_eq!(secret.expose(), "hunter2");
	}

	#[test]
	fn is_empty_reflects_inner_value() {
		assert!(SecretString::new("").is_empty());
		assert!(!SecretString::new("x").is_empty());
	}

	#[test]
	fn equality_compares_inner_values() {
		assert_eq!(SecretString::new("a"), SecretString::new("a"));
		assert_ne!(SecretString::new("a"), SecretString::new("b"));
	}

	#[cfg(feature = "serde")]
	#[test]
	fn deserializes_from_plain_string() {
		let secret: SecretString = serde_json::from_str("\"gho_token\"").unwrap();
		assert_eq!(secret.expose(), "gho_token");
	}

	#[cfg(feature = "serde")]
	#[test]
	fn serializes_raw_value() {
		let json = serde_json::to_string(&SecretString::new("gho_token")).unwrap();
		assert_eq!(json, "\"gho_token\"");
	}
}
