// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session and sign-up settings.

use std::time::Duration;

use bugtrail_server_auth::Role;
use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;

const DEFAULT_COOKIE_NAME: &str = "bugtrail_session";
const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(3600);
const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 3600;

#[derive(Debug, Clone, PartialEq)]
pub struct AuthConfig {
	pub session_cookie_name: String,
	pub session_ttl: Duration,
	pub session_cleanup_interval_secs: u64,
	/// Role given to accounts created through `/auth/sign-up`.
	pub default_signup_role: Role,
	pub secure_cookies: bool,
}

impl Default for AuthConfig {
	fn default() -> Self {
		Self {
			session_cookie_name: DEFAULT_COOKIE_NAME.to_string(),
			session_ttl: DEFAULT_SESSION_TTL,
			session_cleanup_interval_secs: DEFAULT_CLEANUP_INTERVAL_SECS,
			default_signup_role: Role::User,
			secure_cookies: false,
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfigLayer {
	#[serde(default)]
	pub session_cookie_name: Option<String>,
	/// Human readable duration such as `1h` or `90m`.
	#[serde(default, deserialize_with = "deserialize_humantime")]
	pub session_ttl: Option<Duration>,
	#[serde(default)]
	pub session_cleanup_interval_secs: Option<u64>,
	#[serde(default)]
	pub default_signup_role: Option<String>,
	#[serde(default)]
	pub secure_cookies: Option<bool>,
}

fn deserialize_humantime<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
	D: Deserializer<'de>,
{
	let raw: Option<String> = Option::deserialize(deserializer)?;
	raw.map(|s| humantime::parse_duration(&s).map_err(serde::de::Error::custom))
		.transpose()
}

impl AuthConfigLayer {
	pub fn merge(&mut self, other: AuthConfigLayer) {
		if other.session_cookie_name.is_some() {
			self.session_cookie_name = other.session_cookie_name;
		}
		if other.session_ttl.is_some() {
			self.session_ttl = other.session_ttl;
		}
		if other.session_cleanup_interval_secs.is_some() {
			self.session_cleanup_interval_secs = other.session_cleanup_interval_secs;
		}
		if other.default_signup_role.is_some() {
			self.default_signup_role = other.default_signup_role;
		}
		if other.secure_cookies.is_some() {
			self.secure_cookies = other.secure_cookies;
		}
	}

	/// Resolve the layer. Fails only when the sign-up role names no known role.
	pub fn finalize(self) -> Result<AuthConfig, ConfigError> {
		let default_signup_role = match self.default_signup_role {
			Some(raw) => raw.parse::<Role>().map_err(|message| ConfigError::InvalidValue {
				key: "auth.default_signup_role".to_string(),
				message,
			})?,
			None => Role::User,
		};

		Ok(AuthConfig {
			session_cookie_name: self
				.session_cookie_name
				.unwrap_or_else(|| DEFAULT_COOKIE_NAME.to_string()),
			session_ttl: self.session_ttl.unwrap_or(DEFAULT_SESSION_TTL),
			session_cleanup_interval_secs: self
				.session_cleanup_interval_secs
				.unwrap_or(DEFAULT_CLEANUP_INTERVAL_SECS),
			default_signup_role,
			secure_cookies: self.secure_cookies.unwrap_or(false),
		})
	}
}
