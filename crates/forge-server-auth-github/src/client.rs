// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! HTTP client for GitHub's OAuth and user endpoints.
//!
//! Two network calls only: the code-for-token exchange and the user
//! fetch. Client credentials are passed per call because they come from
//! the host's connection configuration, which can change at runtime.

use async_trait::async_trait;
use forge_common_secret::SecretString;
use url::Url;

use crate::error::OAuthError;
use crate::types::{GitHubUser, TokenExchange};

const GITHUB_AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const GITHUB_USER_API_URL: &str = "https://api.github.com/user";

/// GitHub's side of the OAuth flow, as consumed by the login state
/// machine. [`GitHubOAuthClient`] is the real implementation; tests
/// substitute a scripted one.
#[async_trait]
pub trait GitHubApi: Send + Sync {
	/// Build the browser-redirect authorization URL. No network call.
	fn authorization_url(
		&self,
		client_id: &str,
		scope: &str,
		redirect_uri: &str,
		state: &str,
	) -> String;

	/// Exchange an authorization code for an access token.
	async fn exchange_code(
		&self,
		code: &str,
		client_id: &str,
		client_secret: &SecretString,
		redirect_uri: &str,
	) -> Result<TokenExchange, OAuthError>;

	/// Fetch the authenticated user's profile.
	async fn get_user(&self, access_token: &str) -> Result<GitHubUser, OAuthError>;
}

/// OAuth client talking to github.com.
#[derive(Debug, Clone)]
pub struct GitHubOAuthClient {
	http_client: reqwest::Client,
	authorize_url: String,
	token_url: String,
	user_api_url: String,
}

impl GitHubOAuthClient {
	/// Create a client against the real GitHub endpoints.
	///
	/// # Panics
	///
	/// Panics if the HTTP client cannot be built (should never happen in
	/// practice).
	pub fn new() -> Self {
		Self::with_http_client(forge_common_http::new_client())
	}

	/// Create a client with a caller-configured [`reqwest::Client`]
	/// (timeouts, proxies).
	pub fn with_http_client(http_client: reqwest::Client) -> Self {
		Self {
			http_client,
			authorize_url: GITHUB_AUTHORIZE_URL.to_string(),
			token_url: GITHUB_TOKEN_URL.to_string(),
			user_api_url: GITHUB_USER_API_URL.to_string(),
		}
	}

	/// Point the client at different endpoints. Used by tests against a
	/// local mock server.
	pub fn with_base_urls(
		mut self,
		authorize_url: impl Into<String>,
		token_url: impl Into<String>,
		user_api_url: impl Into<String>,
	) -> Self {
		self.authorize_url = authorize_url.into();
		self.token_url = token_url.into();
		self.user_api_url = user_api_url.into();
		self
	}
}

impl Default for GitHubOAuthClient {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl GitHubApi for GitHubOAuthClient {
	#[tracing::instrument(skip(self, state))]
	fn authorization_url(
		&self,
		client_id: &str,
		scope: &str,
		redirect_uri: &str,
		state: &str,
	) -> String {
		let mut url = Url::parse(&self.authorize_url).expect("invalid authorize URL");

		url.query_pairs_mut()
			.append_pair("client_id", client_id)
			.append_pair("scope", scope)
			.append_pair("redirect_uri", redirect_uri)
			.append_pair("state", state);

		url.to_string()
	}

	#[tracing::instrument(
		skip(self, code, client_secret),
		name = "GitHubOAuthClient::exchange_code"
	)]
	async fn exchange_code(
		&self,
		code: &str,
		client_id: &str,
		client_secret: &SecretString,
		redirect_uri: &str,
	) -> Result<TokenExchange, OAuthError> {
		tracing::debug!("exchanging authorization code for access token");

		let response = self
			.http_client
			.post(&self.token_url)
			.header("Accept", "application/json")
			.form(&[
				("client_id", client_id),
				("client_secret", client_secret.expose()),
				("code", code),
				("redirect_uri", redirect_uri),
			])
			.send()
			.await?;

		let body = response.text().await?;

		serde_json::from_str(&body)
			.map_err(|e| OAuthError::ParseError(format!("failed to parse token response: {e}")))
	}

	#[tracing::instrument(skip(self, access_token), name = "GitHubOAuthClient::get_user")]
	async fn get_user(&self, access_token: &str) -> Result<GitHubUser, OAuthError> {
		tracing::debug!("fetching GitHub user info");

		let response = self
			.http_client
			.get(&self.user_api_url)
			.header("Accept", "application/vnd.github+json")
			.header("Authorization", format!("Bearer {access_token}"))
			.header("X-GitHub-Api-Version", "2022-11-28")
			.send()
			.await?;

		if !response.status().is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(OAuthError::GitHubError(format!("failed to get user: {body}")));
		}

		response
			.json()
			.await
			.map_err(|e| OAuthError::ParseError(format!("failed to parse user response: {e}")))
	}
}
