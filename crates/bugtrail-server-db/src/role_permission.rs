// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Role to permission table. Seeded by migration and read-only at runtime.

use async_trait::async_trait;
use bugtrail_server_auth::{Permission, PermissionRecord, Role};
use sqlx::{sqlite::SqlitePool, Row};

use crate::error::DbError;

#[async_trait]
pub trait RolePermissionStore: Send + Sync {
	/// `None` when the role has no rows at all.
	async fn get_permissions_for_role(&self, role: Role) -> Result<Option<PermissionRecord>, DbError>;
}

#[async_trait]
impl RolePermissionStore for RolePermissionRepository {
	async fn get_permissions_for_role(
		&self,
		role: Role,
	) -> Result<Option<PermissionRecord>, DbError> {
		self.get_permissions_for_role(role).await
	}
}

#[derive(Clone)]
pub struct RolePermissionRepository {
	pool: SqlitePool,
}

impl RolePermissionRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Load the permission flags for `role`.
	///
	/// Rows naming a permission this build does not know are skipped.
	#[tracing::instrument(skip(self), fields(role = %role))]
	pub async fn get_permissions_for_role(
		&self,
		role: Role,
	) -> Result<Option<PermissionRecord>, DbError> {
		let rows = sqlx::query("SELECT permission, granted FROM role_permissions WHERE role = ?")
			.bind(role.as_str())
			.fetch_all(&self.pool)
			.await?;

		if rows.is_empty() {
			tracing::debug!(role = %role, "no permission record for role");
			return Ok(None);
		}

		let mut record = PermissionRecord::new(role);
		for row in rows {
			let name: String = row.get("permission");
			let granted: i64 = row.get("granted");
			match name.parse::<Permission>() {
				Ok(permission) => {
					record.grants.insert(permission, granted != 0);
				}
				Err(_) => tracing::warn!(role = %role, permission = %name, "ignoring unknown permission"),
			}
		}

		Ok(Some(record))
	}
}
