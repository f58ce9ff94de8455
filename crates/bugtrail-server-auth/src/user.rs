// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User identity and password handling.
//!
//! The password hash is deliberately not a field of [`User`]: it only travels
//! through the credential lookup used at sign-in, so a `User` can be serialized
//! into responses and logs without leaking it.

use argon2::password_hash::{
	rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::argon2_config::argon2_instance;
use crate::error::{AuthError, Result};
use crate::types::{Role, UserId};

/// Minimum accepted password length at sign-up and password change.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct User {
	pub id: UserId,
	pub email: String,
	pub display_name: String,
	pub role: Role,
	/// Identifier issued by an external identity provider, if any.
	pub external_id: Option<String>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl User {
	/// Create a new user with a generated id.
	pub fn new(email: impl Into<String>, display_name: impl Into<String>, role: Role) -> Self {
		let now = Utc::now();
		Self {
			id: UserId::generate(),
			email: normalize_email(&email.into()),
			display_name: display_name.into(),
			role,
			external_id: None,
			created_at: now,
			updated_at: now,
		}
	}

	pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
		self.external_id = Some(external_id.into());
		self
	}
}

/// Trim and lowercase an email address.
pub fn normalize_email(email: &str) -> String {
	email.trim().to_lowercase()
}

/// Hash a password into an Argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String> {
	let salt = SaltString::generate(&mut OsRng);
	argon2_instance()
		.hash_password(password.as_bytes(), &salt)
		.map(|hash| hash.to_string())
		.map_err(|e| AuthError::PasswordHash(e.to_string()))
}

/// Verify a password against a stored Argon2 hash.
///
/// Returns `false` for malformed hashes instead of erroring.
pub fn verify_password(password: &str, hash: &str) -> bool {
	let parsed_hash = match PasswordHash::new(hash) {
		Ok(h) => h,
		Err(_) => return false,
	};
	argon2_instance()
		.verify_password(password.as_bytes(), &parsed_hash)
		.is_ok()
}
