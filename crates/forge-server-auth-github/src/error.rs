// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Error taxonomy for the GitHub login flow.
//!
//! Guard failures during callback processing are not errors; they become
//! [`AuthOutcome`](crate::AuthOutcome) values. The types here cover the
//! conditions that genuinely abort a request: misconfiguration
//! (administrative), transport failures talking to GitHub, and
//! data-integrity faults in the user directory.

/// Errors resolving the auth module configuration.
///
/// These indicate an administrator problem, not a user one, and are
/// surfaced to the host as request failures rather than 401 rejections.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// No usable GitHub connection is configured.
	#[error("attempt to login via GitHub OAuth while the GitHub connection is not configured")]
	NoConnection,

	/// More than one GitHub connection is configured; the flow cannot
	/// pick one.
	#[error("attempt to login via GitHub OAuth while {0} GitHub connections are configured")]
	AmbiguousConnection(usize),
}

/// Errors that can occur talking to GitHub.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
	/// The HTTP request to GitHub failed (network error, timeout, etc.).
	#[error("HTTP request failed: {0}")]
	HttpRequest(#[from] reqwest::Error),

	/// GitHub returned a non-success status.
	#[error("GitHub API error: {0}")]
	GitHubError(String),

	/// The response from GitHub could not be parsed as expected.
	#[error("failed to parse response: {0}")]
	ParseError(String),
}

/// Errors from reconciling a GitHub identity with the user directory.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
	/// The desired username is already taken by an unrelated account.
	/// Recoverable and user-actionable; the flow turns it into a
	/// rejected login.
	#[error("user with username '{username}' already exists")]
	UsernameConflict { username: String },

	/// More than one local account claims the same GitHub user id.
	/// A data-integrity fault; logging in as an arbitrary one of the
	/// accounts would be a security hazard, so the login fails fast.
	#[error("GitHub user id '{id}' maps to {count} local accounts")]
	AmbiguousIdentity { id: String, count: usize },
}

/// Fatal errors from a login attempt.
///
/// Everything here propagates to the host as a request failure; rejected
/// and not-applicable results never travel through this type.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
	#[error(transparent)]
	Config(#[from] ConfigError),

	#[error("error talking to GitHub: {0}")]
	Transport(#[from] OAuthError),

	#[error("GitHub user id '{id}' maps to {count} local accounts")]
	AmbiguousIdentity { id: String, count: usize },
}
