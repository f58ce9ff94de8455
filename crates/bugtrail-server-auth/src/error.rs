// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication error types.

use thiserror::Error;

/// Errors raised while handling credentials.
#[derive(Debug, Error)]
pub enum AuthError {
	/// Password hashing failed.
	#[error("password hashing failed: {0}")]
	PasswordHash(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;
