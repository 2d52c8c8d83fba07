// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Matching a verified GitHub identity to a local account.
//!
//! The GitHub user id is the only correlation key; logins and emails can
//! change upstream. At most one local account may carry a given id —
//! lookup-before-create keeps that invariant, and the directory's
//! duplicate-username detection covers the create race.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::ReconcileError;
use crate::host::{AccountRef, Connection, NewAccount, UserDirectory, GITHUB_USER_ID_PROPERTY};
use crate::redact;
use crate::types::{GitHubToken, GitHubUser};

/// Finds or creates the local account for a GitHub identity.
pub struct IdentityReconciler {
	directory: Arc<dyn UserDirectory>,
	verify_emails: bool,
}

impl IdentityReconciler {
	pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
		Self {
			directory,
			verify_emails: true,
		}
	}

	/// Whether GitHub-sourced emails are marked verified on account
	/// creation. On by default; GitHub only reports verified addresses.
	pub fn with_email_verification(mut self, enabled: bool) -> Self {
		self.verify_emails = enabled;
		self
	}

	/// Resolve `user` to a local account, creating one if needed, and
	/// remember the access token against it.
	///
	/// A username collision with an unrelated account is reported as
	/// [`ReconcileError::UsernameConflict`]; the token is not remembered
	/// in that case. A lookup matching more than one account fails fast
	/// with [`ReconcileError::AmbiguousIdentity`].
	pub fn reconcile(
		&self,
		connection: &Connection,
		user: &GitHubUser,
		token: &GitHubToken,
	) -> Result<AccountRef, ReconcileError> {
		let github_id = user.identity_key();
		let matches = self
			.directory
			.find_by_property(GITHUB_USER_ID_PROPERTY, &github_id);

		if matches.len() > 1 {
			warn!(
				count = matches.len(),
				"multiple local accounts claim GitHub user {}",
				redact::identity(user)
			);
			return Err(ReconcileError::AmbiguousIdentity {
				id: github_id,
				count: matches.len(),
			});
		}

		if let Some(found) = matches.into_iter().next() {
			self.directory
				.remember_token(&connection.id, &found, &user.login, token);
			debug!(
				username = %found.username,
				"local account found for GitHub user {}",
				redact::identity(user)
			);
			return Ok(found);
		}

		let email = user.email.clone().filter(|e| !e.is_empty());
		let email_verified = self.verify_emails && email.is_some();
		let new_account = NewAccount {
			username: user.login.clone(),
			email,
			name: user.name.clone(),
			email_verified,
			properties: HashMap::from([(GITHUB_USER_ID_PROPERTY.to_string(), github_id)]),
		};

		match self.directory.create_account(new_account) {
			Ok(created) => {
				debug!(
					username = %created.username,
					"new local account created for GitHub user {}",
					redact::identity(user)
				);
				self.directory
					.remember_token(&connection.id, &created, &user.login, token);
				Ok(created)
			}
			Err(conflict) => {
				warn!(
					"GitHub login error: user with username '{}' already exist.",
					conflict.username
				);
				Err(ReconcileError::UsernameConflict {
					username: conflict.username,
				})
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::host::UsernameConflict;
	use forge_common_secret::SecretString;
	use std::sync::Mutex;

	fn connection() -> Connection {
		Connection {
			id: "conn-1".to_string(),
			client_id: "321".to_string(),
			client_secret: SecretString::new("123"),
		}
	}

	fn octocat() -> GitHubUser {
		GitHubUser {
			id: 1,
			login: "octocat".to_string(),
			name: Some("monalisa octocat".to_string()),
			email: Some("octocat@github.com".to_string()),
		}
	}

	fn token() -> GitHubToken {
		GitHubToken {
			access_token: SecretString::new("token1"),
			scope: "user,repo".to_string(),
			token_type: Some("bearer".to_string()),
		}
	}

	#[derive(Default)]
	struct FakeDirectory {
		existing: Vec<AccountRef>,
		conflict: bool,
		created: Mutex<Vec<NewAccount>>,
		remembered: Mutex<Vec<(String, String, String)>>,
	}

	impl FakeDirectory {
		fn with_existing(accounts: Vec<AccountRef>) -> Self {
			Self {
				existing: accounts,
				..Self::default()
			}
		}

		fn with_conflict() -> Self {
			Self {
				conflict: true,
				..Self::default()
			}
		}

		fn created(&self) -> Vec<NewAccount> {
			self.created.lock().unwrap().clone()
		}

		fn remembered(&self) -> Vec<(String, String, String)> {
			self.remembered.lock().unwrap().clone()
		}
	}

	impl UserDirectory for FakeDirectory {
		fn find_by_property(&self, key: &str, value: &str) -> Vec<AccountRef> {
			assert_eq!(key, GITHUB_USER_ID_PROPERTY);
			assert_eq!(value, "1");
			self.existing.clone()
		}

		fn create_account(&self, account: NewAccount) -> Result<AccountRef, UsernameConflict> {
			if self.conflict {
				return Err(UsernameConflict {
					username: account.username,
				});
			}
			let created = AccountRef::new(account.username.clone());
			self.created.lock().unwrap().push(account);
			Ok(created)
		}

		fn remember_token(
			&self,
			connection_id: &str,
			account: &AccountRef,
			external_login: &str,
			_token: &GitHubToken,
		) {
			self.remembered.lock().unwrap().push((
				connection_id.to_string(),
				account.username.clone(),
				external_login.to_string(),
			));
		}
	}

	#[test]
	fn creates_account_when_no_match() {
		let directory = Arc::new(FakeDirectory::default());
		let reconciler = IdentityReconciler::new(directory.clone());

		let account = reconciler
			.reconcile(&connection(), &octocat(), &token())
			.unwrap();

		assert_eq!(account.username, "octocat");
		let created = directory.created();
		assert_eq!(created.len(), 1);
		assert_eq!(created[0].username, "octocat");
		assert_eq!(created[0].email.as_deref(), Some("octocat@github.com"));
		assert_eq!(created[0].name.as_deref(), Some("monalisa octocat"));
		assert!(created[0].email_verified);
		assert_eq!(
			created[0].properties.get(GITHUB_USER_ID_PROPERTY).map(String::as_str),
			Some("1")
		);
		assert_eq!(
			directory.remembered(),
			vec![("conn-1".to_string(), "octocat".to_string(), "octocat".to_string())]
		);
	}

	#[test]
	fn reuses_existing_account_without_creating() {
		let directory = Arc::new(FakeDirectory::with_existing(vec![AccountRef::new(
			"renamed-locally",
		)]));
		let reconciler = IdentityReconciler::new(directory.clone());

		let account = reconciler
			.reconcile(&connection(), &octocat(), &token())
			.unwrap();

		// The local username wins over the GitHub login.
		assert_eq!(account.username, "renamed-locally");
		assert!(directory.created().is_empty());
		assert_eq!(directory.remembered().len(), 1);
		assert_eq!(directory.remembered()[0].1, "renamed-locally");
		assert_eq!(directory.remembered()[0].2, "octocat");
	}

	#[test]
	fn username_conflict_is_reported_and_no_token_remembered() {
		let directory = Arc::new(FakeDirectory::with_conflict());
		let reconciler = IdentityReconciler::new(directory.clone());

		let err = reconciler
			.reconcile(&connection(), &octocat(), &token())
			.unwrap_err();

		match err {
			ReconcileError::UsernameConflict { username } => assert_eq!(username, "octocat"),
			other => panic!("unexpected error: {other}"),
		}
		assert!(directory.remembered().is_empty());
	}

	#[test]
	fn ambiguous_identity_fails_fast() {
		let directory = Arc::new(FakeDirectory::with_existing(vec![
			AccountRef::new("first"),
			AccountRef::new("second"),
		]));
		let reconciler = IdentityReconciler::new(directory.clone());

		let err = reconciler
			.reconcile(&connection(), &octocat(), &token())
			.unwrap_err();

		match err {
			ReconcileError::AmbiguousIdentity { id, count } => {
				assert_eq!(id, "1");
				assert_eq!(count, 2);
			}
			other => panic!("unexpected error: {other}"),
		}
		assert!(directory.remembered().is_empty());
	}

	#[test]
	fn empty_email_is_dropped() {
		let directory = Arc::new(FakeDirectory::default());
		let reconciler = IdentityReconciler::new(directory.clone());
		let mut user = octocat();
		user.email = Some(String::new());

		reconciler.reconcile(&connection(), &user, &token()).unwrap();

		let created = directory.created();
		assert!(created[0].email.is_none());
		assert!(!created[0].email_verified);
	}

	#[test]
	fn email_verification_policy_can_be_disabled() {
		let directory = Arc::new(FakeDirectory::default());
		let reconciler =
			IdentityReconciler::new(directory.clone()).with_email_verification(false);

		reconciler
			.reconcile(&connection(), &octocat(), &token())
			.unwrap();

		let created = directory.created();
		assert_eq!(created[0].email.as_deref(), Some("octocat@github.com"));
		assert!(!created[0].email_verified);
	}
}
