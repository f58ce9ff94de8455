// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication and authorization primitives for the bugtrail server.
//!
//! # Modules
//!
//! - [`types`] - ID newtypes, [`Role`] and [`Permission`]
//! - [`user`] - [`User`] and password hashing
//! - [`session`] - cookie sessions and token generation
//! - [`middleware`] - request-scoped [`AuthContext`] and cookie helpers
//! - [`rbac`] - pure role and permission gates
//!
//! Nothing here touches the database or HTTP framework; the server crate
//! wires these types into axum middleware and repositories.

mod argon2_config;
pub mod error;
pub mod middleware;
pub mod rbac;
pub mod session;
pub mod types;
pub mod user;

pub use error::{AuthError, Result};
pub use middleware::{
	extract_session_cookie_with_name, AuthConfig, AuthContext, AuthFailure, CurrentUser,
	SESSION_COOKIE_NAME,
};
pub use rbac::{
	check_permission, PermissionDenial, PermissionDenialReason, PermissionRecord, RoleDenial,
	RoleRequirement,
};
pub use session::{generate_session_token, Session, DEFAULT_SESSION_TTL_SECS};
pub use types::{Permission, Role, SessionId, UserId};
pub use user::{hash_password, normalize_email, verify_password, User, MIN_PASSWORD_LENGTH};

use sha2::{Digest, Sha256};

/// Hash an opaque token for storage and lookup.
///
/// Raw session tokens are never persisted; the SHA-256 hex digest is.
pub fn hash_token(token: &str) -> String {
	let mut hasher = Sha256::new();
	hasher.update(token.as_bytes());
	hex::encode(hasher.finalize())
}
