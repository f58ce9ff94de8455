// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core type definitions for authentication and authorization.
//!
//! - **ID newtypes**: [`UserId`] and [`SessionId`] wrap UUIDs so they cannot be mixed up
//! - **[`Role`]**: the single job-function label carried by every user
//! - **[`Permission`]**: named capabilities granted per role by the permission table
//!
//! ID types serialize transparently as UUID strings. Roles serialize as
//! `snake_case`, permissions as `camelCase` (`canCloseAnyBug`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// =============================================================================
// ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
		#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
		#[serde(transparent)]
		pub struct $name(Uuid);

		impl $name {
			/// Create a new ID from a UUID.
			pub fn new(id: Uuid) -> Self {
				Self(id)
			}

			/// Generate a new random ID.
			pub fn generate() -> Self {
				Self(Uuid::new_v4())
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl FromStr for $name {
			type Err = uuid::Error;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Ok(Self(Uuid::parse_str(s)?))
			}
		}

		impl From<Uuid> for $name {
			fn from(id: Uuid) -> Self {
				Self(id)
			}
		}

		impl From<$name> for Uuid {
			fn from(id: $name) -> Self {
				id.0
			}
		}
	};
}

define_id_type!(UserId, "Unique identifier for a user.");
define_id_type!(SessionId, "Unique identifier for a session.");

// =============================================================================
// Roles
// =============================================================================

/// Job-function role. Every user carries exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum Role {
	#[serde(alias = "dev")]
	Developer,
	#[serde(alias = "business analyst", alias = "ba")]
	BusinessAnalyst,
	#[serde(alias = "quality analyst", alias = "qa")]
	QualityAnalyst,
	#[serde(alias = "product manager", alias = "pm")]
	ProductManager,
	#[serde(alias = "technical manager", alias = "tm")]
	TechnicalManager,
	/// End user reporting bugs.
	#[serde(alias = "end_user", alias = "end user")]
	User,
}

impl Role {
	/// Roles that work on bugs day to day.
	pub const CONTRIBUTORS: &'static [Role] = &[
		Role::Developer,
		Role::BusinessAnalyst,
		Role::QualityAnalyst,
		Role::ProductManager,
		Role::TechnicalManager,
	];

	/// Roles allowed to triage: classify and (re)assign bugs.
	pub const TRIAGE: &'static [Role] = &[
		Role::BusinessAnalyst,
		Role::ProductManager,
		Role::TechnicalManager,
	];

	/// Returns all available roles.
	pub fn all() -> &'static [Role] {
		&[
			Role::Developer,
			Role::BusinessAnalyst,
			Role::QualityAnalyst,
			Role::ProductManager,
			Role::TechnicalManager,
			Role::User,
		]
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Role::Developer => "developer",
			Role::BusinessAnalyst => "business_analyst",
			Role::QualityAnalyst => "quality_analyst",
			Role::ProductManager => "product_manager",
			Role::TechnicalManager => "technical_manager",
			Role::User => "user",
		}
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Role {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
		match normalized.as_str() {
			"developer" | "dev" => Ok(Role::Developer),
			"business_analyst" | "ba" => Ok(Role::BusinessAnalyst),
			"quality_analyst" | "qa" => Ok(Role::QualityAnalyst),
			"product_manager" | "pm" => Ok(Role::ProductManager),
			"technical_manager" | "tm" => Ok(Role::TechnicalManager),
			"user" | "end_user" => Ok(Role::User),
			_ => Err(format!("unknown role: {s}")),
		}
	}
}

// =============================================================================
// Permissions
// =============================================================================

/// Named capability looked up per role from the permission table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub enum Permission {
	CanCreateBug,
	CanEditAnyBug,
	CanClassifyAnyBug,
	CanReassignAnyBug,
	CanCloseAnyBug,
	CanAddComment,
	CanAddTestCase,
	CanEditTestCase,
	CanDeleteTestCase,
	CanViewData,
}

impl Permission {
	/// Returns all known permissions.
	pub fn all() -> &'static [Permission] {
		&[
			Permission::CanCreateBug,
			Permission::CanEditAnyBug,
			Permission::CanClassifyAnyBug,
			Permission::CanReassignAnyBug,
			Permission::CanCloseAnyBug,
			Permission::CanAddComment,
			Permission::CanAddTestCase,
			Permission::CanEditTestCase,
			Permission::CanDeleteTestCase,
			Permission::CanViewData,
		]
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Permission::CanCreateBug => "canCreateBug",
			Permission::CanEditAnyBug => "canEditAnyBug",
			Permission::CanClassifyAnyBug => "canClassifyAnyBug",
			Permission::CanReassignAnyBug => "canReassignAnyBug",
			Permission::CanCloseAnyBug => "canCloseAnyBug",
			Permission::CanAddComment => "canAddComment",
			Permission::CanAddTestCase => "canAddTestCase",
			Permission::CanEditTestCase => "canEditTestCase",
			Permission::CanDeleteTestCase => "canDeleteTestCase",
			Permission::CanViewData => "canViewData",
		}
	}
}

impl fmt::Display for Permission {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Permission {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Permission::all()
			.iter()
			.copied()
			.find(|p| p.as_str() == s)
			.ok_or_else(|| format!("unknown permission: {s}"))
	}
}
