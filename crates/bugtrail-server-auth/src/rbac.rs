// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Pure role and permission checks.
//!
//! Two independent gates guard every protected endpoint:
//!
//! 1. [`RoleRequirement`] - the caller's role must be in an allow-set, or equal one role.
//! 2. [`check_permission`] - the caller's role must hold a named [`Permission`]
//!    in its [`PermissionRecord`].
//!
//! Both fail closed. A missing role, a missing record and an absent flag all deny.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Permission, Role};

/// Endpoint-declared role requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleRequirement {
	/// Caller's role must be a member of the set.
	OneOf(&'static [Role]),
	/// Caller's role must equal this role.
	Exactly(Role),
}

/// A failed role check, echoing required and actual roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDenial {
	pub required: Vec<Role>,
	pub actual: Option<Role>,
}

impl RoleRequirement {
	pub fn check(&self, actual: Option<Role>) -> Result<(), RoleDenial> {
		let allowed = match (self, actual) {
			(_, None) => false,
			(RoleRequirement::OneOf(roles), Some(role)) => roles.contains(&role),
			(RoleRequirement::Exactly(required), Some(role)) => *required == role,
		};
		if allowed {
			Ok(())
		} else {
			Err(RoleDenial {
				required: self.required(),
				actual,
			})
		}
	}

	pub fn required(&self) -> Vec<Role> {
		match self {
			RoleRequirement::OneOf(roles) => roles.to_vec(),
			RoleRequirement::Exactly(role) => vec![*role],
		}
	}
}

impl std::fmt::Display for RoleRequirement {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			RoleRequirement::OneOf(roles) => {
				let names: Vec<&str> = roles.iter().map(Role::as_str).collect();
				write!(f, "one of [{}]", names.join(", "))
			}
			RoleRequirement::Exactly(role) => write!(f, "exactly {role}"),
		}
	}
}

/// The permission flags stored for one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRecord {
	pub role: Role,
	pub grants: BTreeMap<Permission, bool>,
}

impl PermissionRecord {
	pub fn new(role: Role) -> Self {
		Self {
			role,
			grants: BTreeMap::new(),
		}
	}

	pub fn with(mut self, permission: Permission, granted: bool) -> Self {
		self.grants.insert(permission, granted);
		self
	}

	/// An absent flag is treated as not granted.
	pub fn grants(&self, permission: Permission) -> bool {
		self.grants.get(&permission).copied().unwrap_or(false)
	}
}

/// A failed permission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionDenial {
	pub required: Permission,
	pub actual: Role,
	pub reason: PermissionDenialReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionDenialReason {
	RecordMissing,
	RoleMismatch,
	NotGranted,
}

/// Check `permission` for `role` against its record.
pub fn check_permission(
	record: Option<&PermissionRecord>,
	permission: Permission,
	role: Role,
) -> Result<(), PermissionDenial> {
	let deny = |reason| PermissionDenial {
		required: permission,
		actual: role,
		reason,
	};
	let record = record.ok_or_else(|| deny(PermissionDenialReason::RecordMissing))?;
	if record.role != role {
		return Err(deny(PermissionDenialReason::RoleMismatch));
	}
	if record.grants(permission) {
		Ok(())
	} else {
		Err(deny(PermissionDenialReason::NotGranted))
	}
}
