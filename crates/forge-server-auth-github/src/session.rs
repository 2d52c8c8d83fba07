// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! The per-session pending-state slot and state-nonce generation.
//!
//! One browser session holds at most one pending CSRF state at a time:
//! issuing a new authorization redirect overwrites the previous value,
//! invalidating any in-flight callback for it, and a matching callback
//! consumes the value so it cannot be replayed.

use rand::distributions::Alphanumeric;
use rand::Rng;
use std::sync::Mutex;

const STATE_LENGTH: usize = 32;

/// A browser session's single pending-login-state slot.
///
/// Hosts implement this over their real session storage. The contract is
/// a plain key/value slot; the flow owns the overwrite-and-consume
/// lifecycle.
pub trait LoginSession: Send + Sync {
	/// The pending CSRF state, if a redirect has been issued.
	fn pending_state(&self) -> Option<String>;

	/// Store a new pending state, overwriting any prior value.
	fn set_pending_state(&self, state: &str);

	/// Discard the pending state. Called once a callback has matched it.
	fn clear_pending_state(&self);
}

/// In-process [`LoginSession`] backed by a mutex.
#[derive(Debug, Default)]
pub struct MemorySession {
	state: Mutex<Option<String>>,
}

impl MemorySession {
	pub fn new() -> Self {
		Self::default()
	}
}

impl LoginSession for MemorySession {
	fn pending_state(&self) -> Option<String> {
		self.state.lock().expect("session lock poisoned").clone()
	}

	fn set_pending_state(&self, state: &str) {
		*self.state.lock().expect("session lock poisoned") = Some(state.to_string());
	}

	fn clear_pending_state(&self) {
		*self.state.lock().expect("session lock poisoned") = None;
	}
}

/// Generate an unguessable state nonce for CSRF protection.
///
/// 32 alphanumeric characters, ~190 bits of entropy.
pub fn generate_state() -> String {
	let rng = rand::thread_rng();
	rng.sample_iter(&Alphanumeric)
		.take(STATE_LENGTH)
		.map(char::from)
		.collect()
}


#[cfg(test)]
mod proptests {
	use super::*;
	use proptest::prelude::*;

	proptest! {
		/// The slot holds exactly the last value written.
		#[test]
		fn slot_holds_last_write(values in proptest::collection::vec("[a-zA-Z0-9]{1,40}", 1..10)) {
			let session = MemorySession::new();
			for value in &values {
				session.set_pending_state(value);
			}
			let pending = session.pending_state();
			prop_assert_eq!(pending.as_deref(), values.last().map(String::as_str));
		}
	}
}
