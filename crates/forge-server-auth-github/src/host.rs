// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Seams to the Forge server.
//!
//! The login flow never touches the server's configuration registry,
//! user model or token storage directly; it consumes these traits. The
//! server implements them, tests substitute in-memory fakes.

use forge_common_secret::SecretString;
use std::collections::HashMap;

use crate::types::GitHubToken;

/// Property key under which a GitHub user id is stored on a local account.
pub const GITHUB_USER_ID_PROPERTY: &str = "auth.github-oauth.userId";

/// A usable GitHub OAuth connection resolved from host configuration.
#[derive(Debug, Clone)]
pub struct Connection {
	/// Host-side identifier of the connection, used when remembering
	/// tokens against it.
	pub id: String,
	pub client_id: String,
	pub client_secret: SecretString,
}

/// Tri-state result of resolving the usable GitHub connection.
///
/// The flow only needs zero/one/many; how the host counts configured
/// instances is its own business.
#[derive(Debug, Clone)]
pub enum ConnectionLookup {
	/// No usable connection is configured.
	Missing,
	/// Exactly one usable connection.
	Found(Connection),
	/// More than one candidate; the flow refuses to pick.
	Ambiguous(usize),
}

/// Opaque handle to an account in the host's user directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRef {
	pub username: String,
}

impl AccountRef {
	pub fn new(username: impl Into<String>) -> Self {
		Self {
			username: username.into(),
		}
	}
}

/// Parameters for creating a local account from a GitHub identity.
#[derive(Debug, Clone)]
pub struct NewAccount {
	pub username: String,
	pub email: Option<String>,
	pub name: Option<String>,
	/// Whether the email should be marked verified on creation.
	/// GitHub-sourced emails are treated as pre-verified unless the
	/// host disables the policy.
	pub email_verified: bool,
	/// Property bag; always carries [`GITHUB_USER_ID_PROPERTY`].
	pub properties: HashMap<String, String>,
}

/// The desired username is already taken by an unrelated account.
#[derive(Debug, thiserror::Error)]
#[error("user with username '{username}' already exists")]
pub struct UsernameConflict {
	pub username: String,
}

/// Host configuration consumed by the flow.
pub trait HostConfig: Send + Sync {
	/// Resolve the usable GitHub connection.
	fn github_connection(&self) -> ConnectionLookup;

	/// The server's externally reachable root URL, without a trailing
	/// slash. The callback path is appended to it verbatim.
	fn root_url(&self) -> String;
}

/// The host's user directory and token store.
///
/// `create_account` must be atomic with respect to duplicate detection;
/// the flow does no double-checking of its own.
pub trait UserDirectory: Send + Sync {
	/// Exact-match lookup of accounts carrying `value` under `key`.
	fn find_by_property(&self, key: &str, value: &str) -> Vec<AccountRef>;

	/// Create a new account, or report that the username is taken.
	fn create_account(&self, account: NewAccount) -> Result<AccountRef, UsernameConflict>;

	/// Remember (or refresh) an access token against an account.
	fn remember_token(
		&self,
		connection_id: &str,
		account: &AccountRef,
		external_login: &str,
		token: &GitHubToken,
	);
}
