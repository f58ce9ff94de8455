// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared validation utilities for API handlers.
//!
//! Each check returns a [`ServerError::Validation`] naming the offending
//! field, so handlers can use `?` directly.

use std::str::FromStr;
use std::sync::LazyLock;

use bugtrail_server_auth::{normalize_email, MIN_PASSWORD_LENGTH};
use regex::Regex;

use crate::error::ServerError;

static EMAIL_REGEX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

pub const MAX_DISPLAY_NAME_LENGTH: usize = 100;
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Validate and normalize an email address.
pub fn validate_email(email: &str) -> Result<String, ServerError> {
	let email = normalize_email(email);
	if email.len() > MAX_EMAIL_LENGTH || !EMAIL_REGEX.is_match(&email) {
		return Err(ServerError::validation("email", "must be a valid email address"));
	}
	Ok(email)
}

/// Validate a display name, returning it trimmed.
pub fn validate_display_name(name: &str) -> Result<String, ServerError> {
	let name = name.trim();
	if name.is_empty() {
		return Err(ServerError::validation("displayName", "must not be empty"));
	}
	if name.chars().count() > MAX_DISPLAY_NAME_LENGTH {
		return Err(ServerError::validation(
			"displayName",
			format!("must be at most {MAX_DISPLAY_NAME_LENGTH} characters"),
		));
	}
	Ok(name.to_string())
}

pub fn validate_password(password: &str) -> Result<(), ServerError> {
	if password.chars().count() < MIN_PASSWORD_LENGTH {
		return Err(ServerError::validation(
			"password",
			format!("must be at least {MIN_PASSWORD_LENGTH} characters"),
		));
	}
	Ok(())
}

/// Parse an id taken from the URL path or a request body.
pub fn parse_id<T: FromStr>(field: &str, raw: &str) -> Result<T, ServerError> {
	raw.parse::<T>()
		.map_err(|_| ServerError::validation(field, format!("'{raw}' is not a valid id")))
}

/// Parse an enum-like value such as a role or classification.
pub fn parse_value<T>(field: &str, raw: &str) -> Result<T, ServerError>
where
	T: FromStr<Err = String>,
{
	raw.parse::<T>().map_err(|e| ServerError::validation(field, e))
}
