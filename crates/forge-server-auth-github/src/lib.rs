// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! GitHub OAuth 2.0 login for the Forge build server.
//!
//! This crate implements "Login with GitHub": the OAuth 2.0
//! authorization-code flow against GitHub, mapping of the returned GitHub
//! identity to a local Forge account (creating one if needed), and the
//! authenticated-principal result handed back to the server.
//!
//! # OAuth Flow
//!
//! 1. **Authorization redirect**: [`GitHubOAuth::build_authorization_redirect`]
//!    generates a CSRF `state` nonce, stores it in the browser session's
//!    pending slot and returns the GitHub authorization URL.
//!
//! 2. **User authorization**: the user authorizes in the browser and GitHub
//!    redirects back to the server's callback path with `code` and `state`.
//!
//! 3. **Callback processing**: [`GitHubOAuth::process_authentication_request`]
//!    validates the callback (path, `error`/`code`/`state` params, state
//!    match), exchanges the code for an access token and fetches the GitHub
//!    user.
//!
//! 4. **Reconciliation**: the GitHub user id is matched against the user
//!    directory; an existing account is reused, otherwise one is created.
//!    The access token is remembered against the account either way.
//!
//! The outcome is an [`AuthOutcome`]: `Authenticated` (with a redirect to
//! the landing page), `Rejected` (HTTP 401 with a stable reason string) or
//! `NotApplicable` (the host should try its other auth schemes).
//!
//! # Host integration
//!
//! The server provides the [`HostConfig`], [`UserDirectory`] and
//! [`LoginSession`] implementations; this crate never touches the
//! configuration registry, user model, token storage or session mechanics
//! directly.
//!
//! # Security Considerations
//!
//! - The client secret and access tokens are wrapped in
//!   [`forge_common_secret::SecretString`] and never logged in full;
//!   diagnostic output goes through the [`redact`] helpers.
//! - The `state` nonce is unguessable, bound to one browser session,
//!   overwritten by a new login attempt and consumed on first match.
//! - Provider-side token errors are logged in detail but surface to the
//!   user as a deliberately generic reason string.

mod client;
mod error;
mod flow;
mod host;
pub mod redact;
mod reconcile;
mod session;
mod types;

pub use client::{GitHubApi, GitHubOAuthClient};
pub use error::{ConfigError, FlowError, OAuthError, ReconcileError};
pub use flow::{
	AuthOutcome, AuthRequest, GitHubOAuth, CALLBACK_PATH, DEFAULT_SCOPE, LANDING_PAGE,
};
pub use host::{
	AccountRef, Connection, ConnectionLookup, HostConfig, NewAccount, UserDirectory,
	UsernameConflict, GITHUB_USER_ID_PROPERTY,
};
pub use reconcile::IdentityReconciler;
pub use session::{generate_state, LoginSession, MemorySession};
pub use types::{GitHubToken, GitHubUser, TokenError, TokenExchange};
