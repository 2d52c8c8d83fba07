// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Redaction helpers for diagnostic output.
//!
//! Sensitive values are only ever logged through these functions; none of
//! the wire types render their own loggable form.

use crate::types::{GitHubUser, TokenError};

const TOKEN_PREFIX_LEN: usize = 10;

/// Truncate an access token to a short prefix for logging.
pub fn token(value: &str) -> String {
	if value.chars().count() <= TOKEN_PREFIX_LEN {
		value.to_string()
	} else {
		let prefix: String = value.chars().take(TOKEN_PREFIX_LEN).collect();
		format!("{prefix}...")
	}
}

/// Render a GitHub identity for logging without profile details.
pub fn identity(user: &GitHubUser) -> String {
	format!("{}(id = {})", user.login, user.id)
}

/// Render a token-endpoint error payload for the auth log.
pub fn token_error(err: &TokenError) -> String {
	format!(
		"{} (description: {}, url: {})",
		err.error,
		err.error_description.as_deref().unwrap_or("-"),
		err.error_uri.as_deref().unwrap_or("-")
	)
}
