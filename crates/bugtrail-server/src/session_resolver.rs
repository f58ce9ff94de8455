// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Resolves an opaque session token to the user behind it.
//!
//! ```text
//! token ─hash─▶ session ─expiry─▶ user_ref ─┬─ uuid   → users.id
//!                                            ├─ else   → users.external_id
//!                                            └─ then   → users.email
//! ```
//!
//! A session whose user cannot be found is treated as no session at all.

use std::sync::Arc;

use bugtrail_server_auth::{hash_token, normalize_email, SessionId, User, UserId};
use bugtrail_server_db::{DbError, SessionStore, UserStore};
use chrono::Utc;
use uuid::Uuid;

/// The identity behind a live session.
#[derive(Debug, Clone)]
pub struct ResolvedIdentity {
	pub user: User,
	pub session_id: SessionId,
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
	#[error("no valid session")]
	Unauthenticated,

	#[error("session expired")]
	SessionExpired,

	#[error("session lookup failed: {0}")]
	Store(#[from] DbError),
}

pub struct SessionResolver {
	sessions: Arc<dyn SessionStore>,
	users: Arc<dyn UserStore>,
}

impl SessionResolver {
	pub fn new(sessions: Arc<dyn SessionStore>, users: Arc<dyn UserStore>) -> Self {
		Self { sessions, users }
	}

	#[tracing::instrument(name = "SessionResolver::resolve", skip_all)]
	pub async fn resolve(&self, token: Option<&str>) -> Result<ResolvedIdentity, ResolveError> {
		let token = match token.map(str::trim) {
			Some(t) if !t.is_empty() => t,
			_ => return Err(ResolveError::Unauthenticated),
		};

		let session = self
			.sessions
			.get_session_by_token_hash(&hash_token(token))
			.await?
			.ok_or(ResolveError::Unauthenticated)?;

		if session.is_expired_at(Utc::now()) {
			tracing::debug!(session_id = %session.id, "session expired");
			return Err(ResolveError::SessionExpired);
		}

		let user = self
			.find_user(&session.user_ref)
			.await?
			.ok_or_else(|| {
				tracing::warn!(session_id = %session.id, "session references unknown user");
				ResolveError::Unauthenticated
			})?;

		Ok(ResolvedIdentity {
			user,
			session_id: session.id,
		})
	}

	async fn find_user(&self, user_ref: &str) -> Result<Option<User>, DbError> {
		if let Ok(uuid) = Uuid::parse_str(user_ref) {
			if let Some(user) = self.users.get_user_by_id(&UserId::new(uuid)).await? {
				return Ok(Some(user));
			}
		}
		if let Some(user) = self.users.get_user_by_external_id(user_ref).await? {
			return Ok(Some(user));
		}
		self.users.get_user_by_email(&normalize_email(user_ref)).await
	}
}
