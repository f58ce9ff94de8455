// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Comment repository. Comments are never updated or deleted individually.

use async_trait::async_trait;
use bugtrail_bugs_core::{BugId, Comment, CommentId};
use bugtrail_server_auth::UserId;
use sqlx::{sqlite::SqlitePool, Row};

use crate::error::DbError;
use crate::row::{parse_timestamp, parse_uuid};

#[async_trait]
pub trait CommentStore: Send + Sync {
	async fn create_comment(&self, comment: &Comment) -> Result<(), DbError>;
	async fn list_comments(&self, bug_id: &BugId) -> Result<Vec<Comment>, DbError>;
	async fn get_comment(&self, bug_id: &BugId, id: &CommentId) -> Result<Option<Comment>, DbError>;
}

#[async_trait]
impl CommentStore for CommentRepository {
	async fn create_comment(&self, comment: &Comment) -> Result<(), DbError> {
		self.create_comment(comment).await
	}

	async fn list_comments(&self, bug_id: &BugId) -> Result<Vec<Comment>, DbError> {
		self.list_comments(bug_id).await
	}

	async fn get_comment(&self, bug_id: &BugId, id: &CommentId) -> Result<Option<Comment>, DbError> {
		self.get_comment(bug_id, id).await
	}
}

#[derive(Clone)]
pub struct CommentRepository {
	pool: SqlitePool,
}

impl CommentRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Insert a comment and bump the parent bug's `last_updated` in one transaction.
	///
	/// # Errors
	/// Returns `DbError::NotFound` if the bug does not exist.
	#[tracing::instrument(skip(self, comment), fields(comment_id = %comment.id, bug_id = %comment.bug_id))]
	pub async fn create_comment(&self, comment: &Comment) -> Result<(), DbError> {
		let mut tx = self.pool.begin().await?;

		let touched = sqlx::query("UPDATE bugs SET last_updated = ? WHERE id = ?")
			.bind(comment.created_at.to_rfc3339())
			.bind(comment.bug_id.to_string())
			.execute(&mut *tx)
			.await?;
		if touched.rows_affected() == 0 {
			return Err(DbError::NotFound(format!("Bug {} not found", comment.bug_id)));
		}

		sqlx::query(
			r#"
			INSERT INTO comments (id, bug_id, author_id, author_name, text, created_at)
			VALUES (?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(comment.id.to_string())
		.bind(comment.bug_id.to_string())
		.bind(comment.author_id.to_string())
		.bind(&comment.author_name)
		.bind(&comment.text)
		.bind(comment.created_at.to_rfc3339())
		.execute(&mut *tx)
		.await?;

		tx.commit().await?;

		tracing::debug!(comment_id = %comment.id, "comment created");
		Ok(())
	}

	/// Comments for a bug, oldest first.
	#[tracing::instrument(skip(self), fields(bug_id = %bug_id))]
	pub async fn list_comments(&self, bug_id: &BugId) -> Result<Vec<Comment>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, bug_id, author_id, author_name, text, created_at
			FROM comments
			WHERE bug_id = ?
			ORDER BY created_at ASC
			"#,
		)
		.bind(bug_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(row_to_comment).collect()
	}

	#[tracing::instrument(skip(self), fields(bug_id = %bug_id, comment_id = %id))]
	pub async fn get_comment(
		&self,
		bug_id: &BugId,
		id: &CommentId,
	) -> Result<Option<Comment>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, bug_id, author_id, author_name, text, created_at
			FROM comments
			WHERE id = ? AND bug_id = ?
			"#,
		)
		.bind(id.to_string())
		.bind(bug_id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.as_ref().map(row_to_comment).transpose()
	}
}

fn row_to_comment(row: &sqlx::sqlite::SqliteRow) -> Result<Comment, DbError> {
	let id: String = row.get("id");
	let bug_id: String = row.get("bug_id");
	let author_id: String = row.get("author_id");
	let created_at: String = row.get("created_at");

	Ok(Comment {
		id: CommentId(parse_uuid("comment id", &id)?),
		bug_id: BugId(parse_uuid("bug_id", &bug_id)?),
		author_id: UserId::new(parse_uuid("author_id", &author_id)?),
		author_name: row.get("author_name"),
		text: row.get("text"),
		created_at: parse_timestamp("created_at", &created_at)?,
	})
}
