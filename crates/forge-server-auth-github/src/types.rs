// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Wire types for GitHub's OAuth and user endpoints.
//!
//! Parsing is deliberately lenient: GitHub's user payload carries dozens
//! of fields and grows new ones over time; only the four consumed here
//! are declared, everything else is ignored.

use forge_common_secret::SecretString;
use serde::Deserialize;

/// User profile from GitHub's `/user` endpoint.
///
/// `id` is GitHub's stable numeric user id and the only field safe to
/// correlate on; `login`, `name` and `email` can all change over time.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubUser {
	/// GitHub's unique numeric user ID (stable across renames).
	pub id: i64,
	/// The GitHub username (may change over time).
	pub login: String,
	/// Display name, if set.
	#[serde(default)]
	pub name: Option<String>,
	/// Public email address, if set.
	#[serde(default)]
	pub email: Option<String>,
}

impl GitHubUser {
	/// The identity key stored in the user directory.
	pub fn identity_key(&self) -> String {
		self.id.to_string()
	}
}

/// A successful response from GitHub's token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubToken {
	/// The access token (wrapped to prevent logging).
	pub access_token: SecretString,
	/// Granted OAuth scopes, comma-separated. May differ from the
	/// requested scopes if the user didn't grant all permissions.
	pub scope: String,
	/// Always "bearer" for GitHub OAuth tokens.
	#[serde(default)]
	pub token_type: Option<String>,
}

/// An error payload from GitHub's token endpoint.
///
/// GitHub reports token-exchange failures as a 200 response carrying
/// this triple instead of a token.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenError {
	pub error: String,
	#[serde(default)]
	pub error_description: Option<String>,
	#[serde(default)]
	pub error_uri: Option<String>,
}

/// Outcome of the code-for-token exchange.
///
/// The two arms are mutually exclusive: an `error` field in the payload
/// always means the token fields are absent.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TokenExchange {
	Error(TokenError),
	Token(GitHubToken),
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn token_response_deserializes() {
		let json = r#"{
            "access_token": "gho_xxxxxxxxxxxx",
            "token_type": "bearer",
            "scope": "user,repo"
        }"#;

		let token: GitHubToken = serde_json::from_str(json).unwrap();
		assert_eq!(token.access_token.expose(), "gho_xxxxxxxxxxxx");
		assert_eq!(token.scope, "user,repo");
		assert_eq!(token.token_type.as_deref(), Some("bearer"));
	}

	#[test]
	fn token_exchange_picks_token_arm() {
		let json = r#"{"access_token": "token1", "scope": "user", "token_type": "bearer"}"#;

		match serde_json::from_str::<TokenExchange>(json).unwrap() {
			TokenExchange::Token(token) => assert_eq!(token.access_token.expose(), "token1"),
			TokenExchange::Error(err) => panic!("unexpected error arm: {}", err.error),
		}
	}

	#[test]
	fn token_exchange_picks_error_arm() {
		let json = r#"{
            "error": "incorrect_client_credentials",
            "error_description": "The client_id and/or client_secret passed are incorrect.",
            "error_uri": "https://developer.github.com/v3/oauth/#incorrect-client-credentials"
        }"#;

		match serde_json::from_str::<TokenExchange>(json).unwrap() {
			TokenExchange::Error(err) => {
				assert_eq!(err.error, "incorrect_client_credentials");
				assert!(err.error_description.unwrap().contains("client_secret"));
			}
			TokenExchange::Token(_) => panic!("unexpected token arm"),
		}
	}

	#[test]
	fn user_deserializes_with_unknown_fields_ignored() {
		// Trimmed-down version of a real /user payload; the full one is
		// exercised in the integration tests.
		let json = r#"{
            "login": "octocat",
            "id": 1,
            "avatar_url": "https://github.com/images/error/octocat_happy.gif",
            "type": "User",
            "site_admin": false,
            "name": "monalisa octocat",
            "email": "octocat@github.com",
            "public_repos": 2
        }"#;

		let user: GitHubUser = serde_json::from_str(json).unwrap();
		assert_eq!(user.id, 1);
		assert_eq!(user.login, "octocat");
		assert_eq!(user.name.as_deref(), Some("monalisa octocat"));
		assert_eq!(user.email.as_deref(), Some("octocat@github.com"));
		assert_eq!(user.identity_key(), "1");
	}

	#[test]
	fn user_deserializes_with_null_and_missing_fields() {
		let json = r#"{"login": "octocat", "id": 1, "name": null}"#;

		let user: GitHubUser = serde_json::from_str(json).unwrap();
		assert!(user.name.is_none());
		assert!(user.email.is_none());
	}

	#[test]
	fn access_token_is_not_debug_printed() {
		let json = r#"{"access_token": "gho_supersecret", "scope": "user"}"#;

		let token: GitHubToken = serde_json::from_str(json).unwrap();
		let debug = format!("{token:?}");
		assert!(!debug.contains("gho_supersecret"));
		assert!(debug.contains("[REDACTED]"));
	}
}
