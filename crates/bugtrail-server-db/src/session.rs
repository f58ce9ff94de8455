// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session repository.
//!
//! Sessions are keyed by the SHA-256 hash of their token. Plaintext tokens
//! never reach this module.

use async_trait::async_trait;
use bugtrail_server_auth::{Session, SessionId, UserId};
use chrono::Utc;
use sqlx::{sqlite::SqlitePool, Row};

use crate::error::DbError;
use crate::row::{parse_timestamp, parse_uuid};

#[async_trait]
pub trait SessionStore: Send + Sync {
	async fn create_session(&self, session: &Session, token_hash: &str) -> Result<(), DbError>;
	async fn get_session_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>, DbError>;
	async fn delete_session(&self, id: &SessionId) -> Result<bool, DbError>;
	async fn delete_all_sessions_for_user(&self, user_id: &UserId) -> Result<u64, DbError>;
	async fn cleanup_expired_sessions(&self) -> Result<u64, DbError>;
}

#[async_trait]
impl SessionStore for SessionRepository {
	async fn create_session(&self, session: &Session, token_hash: &str) -> Result<(), DbError> {
		self.create_session(session, token_hash).await
	}

	async fn get_session_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>, DbError> {
		self.get_session_by_token_hash(token_hash).await
	}

	async fn delete_session(&self, id: &SessionId) -> Result<bool, DbError> {
		self.delete_session(id).await
	}

	async fn delete_all_sessions_for_user(&self, user_id: &UserId) -> Result<u64, DbError> {
		self.delete_all_sessions_for_user(user_id).await
	}

	async fn cleanup_expired_sessions(&self) -> Result<u64, DbError> {
		self.cleanup_expired_sessions().await
	}
}

/// Repository for session database operations.
#[derive(Clone)]
pub struct SessionRepository {
	pool: SqlitePool,
}

impl SessionRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Create a new session.
	///
	/// # Arguments
	/// * `session` - The session metadata
	/// * `token_hash` - SHA-256 hash of the session token (never store plaintext)
	#[tracing::instrument(skip(self, session, token_hash), fields(session_id = %session.id))]
	pub async fn create_session(&self, session: &Session, token_hash: &str) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO sessions (id, user_ref, token_hash, created_at, expires_at)
			VALUES (?, ?, ?, ?, ?)
			"#,
		)
		.bind(session.id.to_string())
		.bind(&session.user_ref)
		.bind(token_hash)
		.bind(session.created_at.to_rfc3339())
		.bind(session.expires_at.to_rfc3339())
		.execute(&self.pool)
		.await?;

		tracing::debug!(session_id = %session.id, "session created");
		Ok(())
	}

	/// Get a session by its token hash.
	///
	/// Does not check expiry; the caller verifies `expires_at`.
	#[tracing::instrument(skip(self, token_hash))]
	pub async fn get_session_by_token_hash(
		&self,
		token_hash: &str,
	) -> Result<Option<Session>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, user_ref, created_at, expires_at
			FROM sessions
			WHERE token_hash = ?
			"#,
		)
		.bind(token_hash)
		.fetch_optional(&self.pool)
		.await?;

		match row {
			Some(row) => {
				let session = parse_session_row(&row)?;
				tracing::debug!(session_id = %session.id, "session found by token hash");
				Ok(Some(session))
			}
			None => Ok(None),
		}
	}

	#[tracing::instrument(skip(self), fields(session_id = %id))]
	pub async fn delete_session(&self, id: &SessionId) -> Result<bool, DbError> {
		let result = sqlx::query("DELETE FROM sessions WHERE id = ?")
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;

		let deleted = result.rows_affected() > 0;
		tracing::debug!(session_id = %id, deleted, "session deleted");
		Ok(deleted)
	}

	/// Delete every session whose user reference is this user's id.
	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn delete_all_sessions_for_user(&self, user_id: &UserId) -> Result<u64, DbError> {
		let result = sqlx::query("DELETE FROM sessions WHERE user_ref = ?")
			.bind(user_id.to_string())
			.execute(&self.pool)
			.await?;

		let count = result.rows_affected();
		tracing::debug!(user_id = %user_id, count, "sessions deleted for user");
		Ok(count)
	}

	/// Delete all sessions past their expiry.
	///
	/// # Returns
	/// Number of sessions removed.
	#[tracing::instrument(skip(self))]
	pub async fn cleanup_expired_sessions(&self) -> Result<u64, DbError> {
		let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
			.bind(Utc::now().to_rfc3339())
			.execute(&self.pool)
			.await?;

		let count = result.rows_affected();
		tracing::debug!(count, "expired sessions cleaned up");
		Ok(count)
	}
}

fn parse_session_row(row: &sqlx::sqlite::SqliteRow) -> Result<Session, DbError> {
	let id: String = row.get("id");
	let created_at: String = row.get("created_at");
	let expires_at: String = row.get("expires_at");

	Ok(Session {
		id: SessionId::new(parse_uuid("session id", &id)?),
		user_ref: row.get("user_ref"),
		created_at: parse_timestamp("created_at", &created_at)?,
		expires_at: parse_timestamp("expires_at", &expires_at)?,
	})
}
