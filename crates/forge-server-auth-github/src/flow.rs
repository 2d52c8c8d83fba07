// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! The per-login-attempt state machine.
//!
//! A login attempt moves `Idle -> AwaitingCallback` when the redirect is
//! issued, and ends in one of three terminal outcomes when the callback
//! is processed: `Authenticated`, `Rejected` or `NotApplicable`.
//!
//! Callback processing is an ordered guard sequence; the first failing
//! guard decides the outcome. Cheap, generic guards (path match, query
//! params) run before anything that costs a network round-trip, so
//! foreign or malformed requests never reach GitHub.

use http::StatusCode;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::client::GitHubApi;
use crate::error::{ConfigError, FlowError, ReconcileError};
use crate::host::{Connection, ConnectionLookup, HostConfig, UserDirectory};
use crate::redact;
use crate::reconcile::IdentityReconciler;
use crate::session::{generate_state, LoginSession};
use crate::types::TokenExchange;

/// Host-mounted callback path. Must exactly match the `redirect_uri`
/// registered with GitHub; a mismatch is rejected provider-side.
pub const CALLBACK_PATH: &str = "/oauth/github/accessToken.html";

/// Permissions requested from GitHub, comma-separated.
pub const DEFAULT_SCOPE: &str = "user,public_repo,repo,repo:status,write:repo_hook";

/// Where an authenticated browser lands after login.
pub const LANDING_PAGE: &str = "/overview.html";

const UNEXPECTED_ERROR_REASON: &str =
	"Unexpected GitHub login error (see the auth log for the details).";

/// The callback request as seen by the flow: a path and query parameters.
#[derive(Debug, Clone, Default)]
pub struct AuthRequest {
	path: String,
	params: Vec<(String, String)>,
}

impl AuthRequest {
	pub fn new(path: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			params: Vec::new(),
		}
	}

	pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.params.push((name.into(), value.into()));
		self
	}

	pub fn path(&self) -> &str {
		&self.path
	}

	/// First value of the named query parameter.
	pub fn param(&self, name: &str) -> Option<&str> {
		self.params
			.iter()
			.find(|(n, _)| n == name)
			.map(|(_, v)| v.as_str())
	}
}

/// Terminal outcome of processing one callback request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
	/// The request does not belong to this flow; the host should try its
	/// other auth schemes.
	NotApplicable,
	/// The login was refused. The reason is stable, user-facing and
	/// deliberately generic for provider-side failures.
	Rejected { reason: String, status: StatusCode },
	/// The login succeeded; `username` is the authenticated principal.
	Authenticated { username: String, redirect: String },
}

impl AuthOutcome {
	fn rejected(reason: impl Into<String>) -> Self {
		Self::Rejected {
			reason: reason.into(),
			status: StatusCode::UNAUTHORIZED,
		}
	}

	fn authenticated(username: impl Into<String>) -> Self {
		Self::Authenticated {
			username: username.into(),
			redirect: LANDING_PAGE.to_string(),
		}
	}
}

/// The "Login with GitHub" auth module.
///
/// Owns redirect construction and callback processing; identity
/// reconciliation and all host interaction go through the injected
/// collaborators.
pub struct GitHubOAuth {
	client: Arc<dyn GitHubApi>,
	host: Arc<dyn HostConfig>,
	reconciler: IdentityReconciler,
}

impl GitHubOAuth {
	pub fn new(
		client: Arc<dyn GitHubApi>,
		host: Arc<dyn HostConfig>,
		directory: Arc<dyn UserDirectory>,
	) -> Self {
		Self {
			client,
			host,
			reconciler: IdentityReconciler::new(directory),
		}
	}

	/// Whether GitHub-sourced emails are marked verified on account
	/// creation (default: yes).
	pub fn with_email_verification(mut self, enabled: bool) -> Self {
		self.reconciler = self.reconciler.with_email_verification(enabled);
		self
	}

	/// Stable identifier used by the host's login configuration.
	pub fn name(&self) -> &'static str {
		"github-oauth"
	}

	pub fn display_name(&self) -> &'static str {
		"GitHub OAuth"
	}

	pub fn description(&self) -> &'static str {
		"Allows authentication using GitHub account"
	}

	/// Whether exactly one usable connection is configured.
	pub fn is_configured(&self) -> bool {
		matches!(self.host.github_connection(), ConnectionLookup::Found(_))
	}

	/// Administrator-facing diagnostic for the settings page, if the
	/// module cannot work as configured.
	pub fn validate_configuration(&self) -> Option<String> {
		match self.host.github_connection() {
			ConnectionLookup::Found(_) => None,
			ConnectionLookup::Missing => Some(
				"GitHub authentication is inactive as no GitHub connection is configured"
					.to_string(),
			),
			ConnectionLookup::Ambiguous(count) => Some(format!(
				"GitHub authentication is inactive as {count} GitHub connections are configured"
			)),
		}
	}

	fn suitable_connection(&self) -> Result<Connection, ConfigError> {
		match self.host.github_connection() {
			ConnectionLookup::Found(connection) => Ok(connection),
			ConnectionLookup::Missing => Err(ConfigError::NoConnection),
			ConnectionLookup::Ambiguous(count) => Err(ConfigError::AmbiguousConnection(count)),
		}
	}

	fn redirect_uri(&self) -> String {
		format!("{}{}", self.host.root_url(), CALLBACK_PATH)
	}

	/// Start a login attempt: generate a CSRF state, store it in the
	/// session's pending slot (overwriting any prior attempt) and return
	/// the GitHub authorization URL to redirect the browser to.
	pub fn build_authorization_redirect(
		&self,
		session: &dyn LoginSession,
	) -> Result<String, FlowError> {
		let connection = self.suitable_connection()?;
		let state = generate_state();
		session.set_pending_state(&state);
		Ok(self.client.authorization_url(
			&connection.client_id,
			DEFAULT_SCOPE,
			&self.redirect_uri(),
			&state,
		))
	}

	/// Process a callback request.
	///
	/// Guard failures come back as [`AuthOutcome`] values; configuration
	/// and transport problems are fatal and surface as [`FlowError`].
	pub async fn process_authentication_request(
		&self,
		request: &AuthRequest,
		session: &dyn LoginSession,
	) -> Result<AuthOutcome, FlowError> {
		if let Some(outcome) = self.validate_request(request, session) {
			return Ok(outcome);
		}

		let connection = self.suitable_connection()?;
		let redirect_uri = self.redirect_uri();
		let code = request.param("code").unwrap_or_default();

		let token = match self
			.client
			.exchange_code(code, &connection.client_id, &connection.client_secret, &redirect_uri)
			.await?
		{
			TokenExchange::Token(token) => token,
			TokenExchange::Error(err) => {
				warn!(
					"GitHub login error while obtaining token: {}",
					redact::token_error(&err)
				);
				return Ok(AuthOutcome::rejected(UNEXPECTED_ERROR_REASON));
			}
		};
		debug!(
			"GitHub token obtained: {}",
			redact::token(token.access_token.expose())
		);

		let user = self.client.get_user(token.access_token.expose()).await?;
		debug!("GitHub user obtained: {}", redact::identity(&user));

		match self.reconciler.reconcile(&connection, &user, &token) {
			Ok(account) => Ok(AuthOutcome::authenticated(account.username)),
			Err(ReconcileError::UsernameConflict { username }) => Ok(AuthOutcome::rejected(
				format!("User with username '{username}' already exist"),
			)),
			Err(ReconcileError::AmbiguousIdentity { id, count }) => {
				Err(FlowError::AmbiguousIdentity { id, count })
			}
		}
	}

	/// The cheap guards: path, query parameters, CSRF state. Returns the
	/// terminal outcome of the first failing guard, or `None` when the
	/// request is a well-formed callback for this session.
	fn validate_request(
		&self,
		request: &AuthRequest,
		session: &dyn LoginSession,
	) -> Option<AuthOutcome> {
		if !request.path().ends_with(CALLBACK_PATH) {
			debug!(path = %request.path(), "skip GitHub authentication: path doesn't match");
			return Some(AuthOutcome::NotApplicable);
		}

		if request.param("error").is_some() {
			warn!(
				error = request.param("error"),
				"GitHub login error: user was redirected with an 'error'"
			);
			return Some(AuthOutcome::rejected(
				"GitHub login error: user was redirected with 'error' param.",
			));
		}

		if request.param("code").map_or(true, str::is_empty) {
			warn!("GitHub login error: 'code' parameter is empty");
			return Some(AuthOutcome::rejected(
				"GitHub login error: 'code' parameter is empty",
			));
		}

		let state = match request.param("state") {
			Some(state) => state,
			None => {
				warn!("attempt to login using GitHub with empty 'state' parameter");
				return Some(AuthOutcome::rejected(
					"GitHub login error: 'state' parameter is empty",
				));
			}
		};

		// An absent pending value never matches.
		if session.pending_state().as_deref() != Some(state) {
			warn!("attempt to login using GitHub with invalid 'state' parameter");
			return Some(AuthOutcome::rejected(
				"GitHub login error: 'state' parameter is invalid",
			));
		}

		// The state is single-use: consume it so a replayed callback is
		// rejected even after a successful match.
		session.clear_pending_state();
		None
	}
}
