// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP utilities for Forge.
//!
//! Provides a pre-configured HTTP client builder with a consistent
//! User-Agent header so all outbound calls are attributable to this
//! server version. Timeouts and retry policy are the caller's concern.

mod client;

pub use client::{builder, new_client, new_client_with_timeout, user_agent};
