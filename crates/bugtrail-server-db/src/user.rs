// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User repository.
//!
//! Besides the user rows this owns the `user_bugs` relation: the set of bugs a
//! user created or is assigned to. Adding to the set is idempotent.

use async_trait::async_trait;
use bugtrail_bugs_core::BugId;
use bugtrail_server_auth::{Role, User, UserId};
use chrono::Utc;
use sqlx::{sqlite::SqlitePool, Row};
use std::fmt;
use std::str::FromStr;

use crate::error::{conflict_on_unique, DbError};
use crate::row::{parse_enum, parse_timestamp, parse_uuid};

/// How a user relates to a bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BugRelation {
	Assigned,
	Created,
}

impl fmt::Display for BugRelation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			BugRelation::Assigned => write!(f, "assigned"),
			BugRelation::Created => write!(f, "created"),
		}
	}
}

impl FromStr for BugRelation {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"assigned" => Ok(BugRelation::Assigned),
			"created" => Ok(BugRelation::Created),
			_ => Err(format!("unknown bug relation: {s}")),
		}
	}
}

/// A user together with the stored password hash, for sign-in only.
#[derive(Debug, Clone)]
pub struct UserCredentials {
	pub user: User,
	pub password_hash: Option<String>,
}

/// Filter for listing users.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
	/// Matched against display name and email.
	pub search: Option<String>,
	pub role: Option<Role>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
	async fn create_user(&self, user: &User, password_hash: Option<&str>) -> Result<(), DbError>;
	async fn get_user_by_id(&self, id: &UserId) -> Result<Option<User>, DbError>;
	async fn get_user_by_external_id(&self, external_id: &str) -> Result<Option<User>, DbError>;
	async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError>;
	async fn get_credentials_by_email(&self, email: &str) -> Result<Option<UserCredentials>, DbError>;
	async fn list_users(
		&self,
		filter: &UserFilter,
		limit: i32,
		offset: i32,
	) -> Result<(Vec<User>, i64), DbError>;
	async fn update_user(&self, user: &User) -> Result<(), DbError>;
	/// Update the profile and, when given, the password hash in one transaction.
	async fn update_profile(&self, user: &User, password_hash: Option<&str>) -> Result<(), DbError>;
	async fn delete_user(&self, id: &UserId) -> Result<bool, DbError>;
	async fn add_bug_relation(
		&self,
		user_id: &UserId,
		bug_id: &BugId,
		relation: BugRelation,
	) -> Result<bool, DbError>;
	async fn list_bug_ids(
		&self,
		user_id: &UserId,
		relation: BugRelation,
	) -> Result<Vec<BugId>, DbError>;
}

#[async_trait]
impl UserStore for UserRepository {
	async fn create_user(&self, user: &User, password_hash: Option<&str>) -> Result<(), DbError> {
		self.create_user(user, password_hash).await
	}

	async fn get_user_by_id(&self, id: &UserId) -> Result<Option<User>, DbError> {
		self.get_user_by_id(id).await
	}

	async fn get_user_by_external_id(&self, external_id: &str) -> Result<Option<User>, DbError> {
		self.get_user_by_external_id(external_id).await
	}

	async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
		self.get_user_by_email(email).await
	}

	async fn get_credentials_by_email(
		&self,
		email: &str,
	) -> Result<Option<UserCredentials>, DbError> {
		self.get_credentials_by_email(email).await
	}

	async fn list_users(
		&self,
		filter: &UserFilter,
		limit: i32,
		offset: i32,
	) -> Result<(Vec<User>, i64), DbError> {
		self.list_users(filter, limit, offset).await
	}

	async fn update_user(&self, user: &User) -> Result<(), DbError> {
		self.update_user(user).await
	}

	async fn update_profile(&self, user: &User, password_hash: Option<&str>) -> Result<(), DbError> {
		self.update_profile(user, password_hash).await
	}

	async fn delete_user(&self, id: &UserId) -> Result<bool, DbError> {
		self.delete_user(id).await
	}

	async fn add_bug_relation(
		&self,
		user_id: &UserId,
		bug_id: &BugId,
		relation: BugRelation,
	) -> Result<bool, DbError> {
		self.add_bug_relation(user_id, bug_id, relation).await
	}

	async fn list_bug_ids(
		&self,
		user_id: &UserId,
		relation: BugRelation,
	) -> Result<Vec<BugId>, DbError> {
		self.list_bug_ids(user_id, relation).await
	}
}

/// Repository for user database operations.
#[derive(Clone)]
pub struct UserRepository {
	pool: SqlitePool,
}

const USER_COLUMNS: &str =
	"id, email, display_name, role, external_id, created_at, updated_at";

impl UserRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Insert a user.
	///
	/// # Errors
	/// Returns `DbError::Conflict` if the email or external id is already taken.
	#[tracing::instrument(skip(self, user, password_hash), fields(user_id = %user.id, role = %user.role))]
	pub async fn create_user(&self, user: &User, password_hash: Option<&str>) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO users (id, email, display_name, role, password_hash, external_id, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(user.id.to_string())
		.bind(&user.email)
		.bind(&user.display_name)
		.bind(user.role.as_str())
		.bind(password_hash)
		.bind(&user.external_id)
		.bind(user.created_at.to_rfc3339())
		.bind(user.updated_at.to_rfc3339())
		.execute(&self.pool)
		.await
		.map_err(conflict_on_unique("User with this email already exists"))?;

		tracing::debug!(user_id = %user.id, "user created");
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(user_id = %id))]
	pub async fn get_user_by_id(&self, id: &UserId) -> Result<Option<User>, DbError> {
		let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
			.bind(id.to_string())
			.fetch_optional(&self.pool)
			.await?;

		row.as_ref().map(row_to_user).transpose()
	}

	#[tracing::instrument(skip(self, external_id))]
	pub async fn get_user_by_external_id(&self, external_id: &str) -> Result<Option<User>, DbError> {
		let row = sqlx::query(&format!(
			"SELECT {USER_COLUMNS} FROM users WHERE external_id = ?"
		))
		.bind(external_id)
		.fetch_optional(&self.pool)
		.await?;

		row.as_ref().map(row_to_user).transpose()
	}

	/// Emails are stored lower-cased; the lookup normalizes its input.
	#[tracing::instrument(skip(self, email))]
	pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
		let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
			.bind(bugtrail_server_auth::normalize_email(email))
			.fetch_optional(&self.pool)
			.await?;

		row.as_ref().map(row_to_user).transpose()
	}

	#[tracing::instrument(skip(self, email))]
	pub async fn get_credentials_by_email(
		&self,
		email: &str,
	) -> Result<Option<UserCredentials>, DbError> {
		let row = sqlx::query(&format!(
			"SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = ?"
		))
		.bind(bugtrail_server_auth::normalize_email(email))
		.fetch_optional(&self.pool)
		.await?;

		match row {
			Some(row) => Ok(Some(UserCredentials {
				user: row_to_user(&row)?,
				password_hash: row.get("password_hash"),
			})),
			None => Ok(None),
		}
	}

	/// List users ordered by display name.
	///
	/// # Returns
	/// Tuple of (users, total_count) for pagination.
	#[tracing::instrument(skip(self, filter), fields(limit, offset))]
	pub async fn list_users(
		&self,
		filter: &UserFilter,
		limit: i32,
		offset: i32,
	) -> Result<(Vec<User>, i64), DbError> {
		let pattern = filter.search.as_ref().map(|s| format!("%{}%", s.trim()));
		let role = filter.role.map(|r| r.as_str());

		let rows = sqlx::query(&format!(
			r#"
			SELECT {USER_COLUMNS}
			FROM users
			WHERE (?1 IS NULL OR display_name LIKE ?1 OR email LIKE ?1)
			  AND (?2 IS NULL OR role = ?2)
			ORDER BY display_name COLLATE NOCASE ASC, created_at ASC
			LIMIT ?3 OFFSET ?4
			"#
		))
		.bind(&pattern)
		.bind(role)
		.bind(limit)
		.bind(offset)
		.fetch_all(&self.pool)
		.await?;

		let count: (i64,) = sqlx::query_as(
			r#"
			SELECT COUNT(*) FROM users
			WHERE (?1 IS NULL OR display_name LIKE ?1 OR email LIKE ?1)
			  AND (?2 IS NULL OR role = ?2)
			"#,
		)
		.bind(&pattern)
		.bind(role)
		.fetch_one(&self.pool)
		.await?;

		let users = rows.iter().map(row_to_user).collect::<Result<Vec<_>, _>>()?;
		tracing::debug!(count = users.len(), total = count.0, "listed users");
		Ok((users, count.0))
	}

	/// Update email, display name, role and external id.
	///
	/// # Errors
	/// - `DbError::NotFound` if the user does not exist
	/// - `DbError::Conflict` if the new email is taken
	#[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
	pub async fn update_user(&self, user: &User) -> Result<(), DbError> {
		self.update_profile(user, None).await
	}

	/// Update the profile fields and optionally the password hash.
	///
	/// Both writes commit together: a conflicting email leaves the stored
	/// password untouched.
	#[tracing::instrument(skip(self, user, password_hash), fields(user_id = %user.id, password = password_hash.is_some()))]
	pub async fn update_profile(
		&self,
		user: &User,
		password_hash: Option<&str>,
	) -> Result<(), DbError> {
		let mut tx = self.pool.begin().await?;
		let now = Utc::now().to_rfc3339();

		let result = sqlx::query(
			r#"
			UPDATE users
			SET email = ?, display_name = ?, role = ?, external_id = ?, updated_at = ?
			WHERE id = ?
			"#,
		)
		.bind(&user.email)
		.bind(&user.display_name)
		.bind(user.role.as_str())
		.bind(&user.external_id)
		.bind(&now)
		.bind(user.id.to_string())
		.execute(&mut *tx)
		.await
		.map_err(conflict_on_unique("User with this email already exists"))?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(format!("User {} not found", user.id)));
		}

		if let Some(hash) = password_hash {
			sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
				.bind(hash)
				.bind(user.id.to_string())
				.execute(&mut *tx)
				.await?;
		}

		tx.commit().await?;

		tracing::debug!(user_id = %user.id, "user updated");
		Ok(())
	}

	/// Delete a user and every session that refers to them.
	#[tracing::instrument(skip(self), fields(user_id = %id))]
	pub async fn delete_user(&self, id: &UserId) -> Result<bool, DbError> {
		let mut tx = self.pool.begin().await?;

		sqlx::query(
			r#"
			DELETE FROM sessions
			WHERE user_ref IN (
				SELECT id FROM users WHERE id = ?1
				UNION SELECT email FROM users WHERE id = ?1
				UNION SELECT external_id FROM users WHERE id = ?1 AND external_id IS NOT NULL
			)
			"#,
		)
		.bind(id.to_string())
		.execute(&mut *tx)
		.await?;

		let result = sqlx::query("DELETE FROM users WHERE id = ?")
			.bind(id.to_string())
			.execute(&mut *tx)
			.await?;

		tx.commit().await?;

		let deleted = result.rows_affected() > 0;
		tracing::debug!(user_id = %id, deleted, "user deleted");
		Ok(deleted)
	}

	/// Add a bug to one of the user's bug sets.
	///
	/// # Returns
	/// `true` if the bug was added, `false` if it was already present.
	#[tracing::instrument(skip(self), fields(user_id = %user_id, bug_id = %bug_id, relation = %relation))]
	pub async fn add_bug_relation(
		&self,
		user_id: &UserId,
		bug_id: &BugId,
		relation: BugRelation,
	) -> Result<bool, DbError> {
		let result = sqlx::query(
			r#"
			INSERT OR IGNORE INTO user_bugs (user_id, bug_id, relation, created_at)
			VALUES (?, ?, ?, ?)
			"#,
		)
		.bind(user_id.to_string())
		.bind(bug_id.to_string())
		.bind(relation.to_string())
		.bind(Utc::now().to_rfc3339())
		.execute(&self.pool)
		.await?;

		let added = result.rows_affected() > 0;
		tracing::debug!(user_id = %user_id, bug_id = %bug_id, added, "bug relation recorded");
		Ok(added)
	}

	#[tracing::instrument(skip(self), fields(user_id = %user_id, relation = %relation))]
	pub async fn list_bug_ids(
		&self,
		user_id: &UserId,
		relation: BugRelation,
	) -> Result<Vec<BugId>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT bug_id FROM user_bugs
			WHERE user_id = ? AND relation = ?
			ORDER BY created_at ASC
			"#,
		)
		.bind(user_id.to_string())
		.bind(relation.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows
			.iter()
			.map(|row| {
				let id: String = row.get("bug_id");
				parse_uuid("bug_id", &id).map(BugId)
			})
			.collect()
	}
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User, DbError> {
	let id: String = row.get("id");
	let role: String = row.get("role");
	let created_at: String = row.get("created_at");
	let updated_at: String = row.get("updated_at");

	Ok(User {
		id: UserId::new(parse_uuid("user id", &id)?),
		email: row.get("email"),
		display_name: row.get("display_name"),
		role: parse_enum("role", &role)?,
		external_id: row.get("external_id"),
		created_at: parse_timestamp("created_at", &created_at)?,
		updated_at: parse_timestamp("updated_at", &updated_at)?,
	})
}
