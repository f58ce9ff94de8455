// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request-scoped authentication state and session cookie helpers.
//!
//! - [`CurrentUser`] - the resolved identity of the caller
//! - [`AuthContext`] - what the auth middleware attaches to every request
//! - [`AuthConfig`] - cookie name, lifetime and sign-up defaults
//!
//! # Authentication Flow
//!
//! ```text
//! Request → Cookie → hash → Session lookup → User lookup → AuthContext
//!                                  │
//!                                  ├── absent   → AuthFailure::Unauthenticated
//!                                  └── expired  → AuthFailure::SessionExpired
//! ```
//!
//! Token values are never logged.

use std::time::Duration;

use crate::{Role, SessionId, User, UserId};
use http::header::COOKIE;
use http::HeaderMap;
use serde::{Deserialize, Serialize};

/// Default name for the session cookie.
pub const SESSION_COOKIE_NAME: &str = "bugtrail_session";

/// The currently authenticated user, extracted from request context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
	pub user: User,
	/// Session ID if authenticated via session cookie.
	pub session_id: Option<SessionId>,
}

impl CurrentUser {
	pub fn from_session(user: User, session_id: SessionId) -> Self {
		Self {
			user,
			session_id: Some(session_id),
		}
	}

	pub fn id(&self) -> UserId {
		self.user.id
	}

	pub fn role(&self) -> Role {
		self.user.role
	}

	pub fn display_name(&self) -> &str {
		&self.user.display_name
	}
}

/// Why a request carries no identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
	Unauthenticated,
	SessionExpired,
}

/// Authentication context for request processing.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
	pub is_authenticated: bool,
	pub current_user: Option<CurrentUser>,
	/// Set when a cookie was presented but did not resolve.
	pub failure: Option<AuthFailure>,
}

impl AuthContext {
	pub fn unauthenticated() -> Self {
		Self {
			is_authenticated: false,
			current_user: None,
			failure: Some(AuthFailure::Unauthenticated),
		}
	}

	pub fn expired() -> Self {
		Self {
			is_authenticated: false,
			current_user: None,
			failure: Some(AuthFailure::SessionExpired),
		}
	}

	pub fn authenticated(current_user: CurrentUser) -> Self {
		Self {
			is_authenticated: true,
			current_user: Some(current_user),
			failure: None,
		}
	}

	pub fn user(&self) -> Option<&CurrentUser> {
		self.current_user.as_ref()
	}

	/// Require authentication, returning the current user or the reason there is none.
	pub fn require_user(&self) -> Result<&CurrentUser, AuthFailure> {
		self.current_user
			.as_ref()
			.ok_or(self.failure.unwrap_or(AuthFailure::Unauthenticated))
	}
}

/// Configuration for session authentication.
#[derive(Debug, Clone)]
pub struct AuthConfig {
	pub session_cookie_name: String,
	pub session_ttl: Duration,
	/// Adds `Secure` to issued cookies.
	pub secure_cookies: bool,
	/// Role assigned to self-registered users.
	pub default_signup_role: Role,
}

impl Default for AuthConfig {
	fn default() -> Self {
		Self {
			session_cookie_name: SESSION_COOKIE_NAME.to_string(),
			session_ttl: Duration::from_secs(crate::session::DEFAULT_SESSION_TTL_SECS as u64),
			secure_cookies: false,
			default_signup_role: Role::User,
		}
	}
}

impl AuthConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_session_cookie_name(mut self, name: impl Into<String>) -> Self {
		self.session_cookie_name = name.into();
		self
	}

	pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
		self.session_ttl = ttl;
		self
	}

	pub fn with_secure_cookies(mut self, secure: bool) -> Self {
		self.secure_cookies = secure;
		self
	}

	pub fn with_default_signup_role(mut self, role: Role) -> Self {
		self.default_signup_role = role;
		self
	}

	/// Session lifetime as a chrono duration, for computing `expires_at`.
	pub fn session_ttl_chrono(&self) -> chrono::Duration {
		chrono::Duration::from_std(self.session_ttl)
			.unwrap_or_else(|_| chrono::Duration::seconds(crate::session::DEFAULT_SESSION_TTL_SECS))
	}

	/// `Set-Cookie` value issuing `token`.
	pub fn session_cookie(&self, token: &str) -> String {
		let mut cookie = format!(
			"{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
			self.session_cookie_name,
			token,
			self.session_ttl.as_secs()
		);
		if self.secure_cookies {
			cookie.push_str("; Secure");
		}
		cookie
	}

	/// `Set-Cookie` value that clears the session cookie.
	pub fn clear_session_cookie(&self) -> String {
		format!(
			"{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax",
			self.session_cookie_name
		)
	}
}

/// Extract the session token from the Cookie header with a custom cookie name.
///
/// Empty values are treated as absent.
pub fn extract_session_cookie_with_name(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
	headers
		.get_all(COOKIE)
		.iter()
		.filter_map(|value| value.to_str().ok())
		.flat_map(|header| header.split(';'))
		.find_map(|cookie| {
			let (name, value) = cookie.trim().split_once('=')?;
			if name == cookie_name && !value.is_empty() {
				Some(value.to_string())
			} else {
				None
			}
		})
}
