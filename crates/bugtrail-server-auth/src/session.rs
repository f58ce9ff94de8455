// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Cookie sessions.
//!
//! A session binds an opaque token to a user reference until `expires_at`.
//! Only the SHA-256 hash of the token is persisted (see [`crate::hash_token`]).
//!
//! The user reference is a string rather than a [`crate::UserId`] because
//! sessions may be minted for identities stored under an internal id, an
//! external provider id or an email address; resolution tries each in turn.

use crate::SessionId;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Default session lifetime (one hour).
pub const DEFAULT_SESSION_TTL_SECS: i64 = 3600;

/// A user session backing the session cookie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
	pub id: SessionId,
	pub user_ref: String,
	pub created_at: DateTime<Utc>,
	pub expires_at: DateTime<Utc>,
}

impl Session {
	/// Create a session for `user_ref` that expires after `ttl`.
	#[instrument(level = "debug", skip(user_ref), fields(ttl_secs = ttl.num_seconds()))]
	pub fn new(user_ref: impl Into<String>, ttl: Duration) -> Self {
		let now = Utc::now();
		Self {
			id: SessionId::generate(),
			user_ref: user_ref.into(),
			created_at: now,
			expires_at: now + ttl,
		}
	}

	/// A session is expired once `now` reaches `expires_at`.
	pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
		now >= self.expires_at
	}
}

/// Generates a cryptographically secure random session token.
pub fn generate_session_token() -> String {
	use rand::Rng;
	let mut rng = rand::thread_rng();
	let bytes: [u8; 32] = rng.gen();
	hex::encode(bytes)
}
