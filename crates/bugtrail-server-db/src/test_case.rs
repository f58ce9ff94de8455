// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Test case repository.
//!
//! Every write also bumps the parent bug's `last_updated`, inside the same
//! transaction.

use async_trait::async_trait;
use bugtrail_bugs_core::{BugId, TestCase, TestCaseId};
use bugtrail_server_auth::UserId;
use chrono::Utc;
use sqlx::{sqlite::SqlitePool, Row, Sqlite, Transaction};

use crate::error::DbError;
use crate::row::{parse_enum, parse_timestamp, parse_uuid};

#[async_trait]
pub trait TestCaseStore: Send + Sync {
	async fn create_test_case(&self, test_case: &TestCase) -> Result<(), DbError>;
	async fn list_test_cases(&self, bug_id: &BugId) -> Result<Vec<TestCase>, DbError>;
	async fn get_test_case(
		&self,
		bug_id: &BugId,
		id: &TestCaseId,
	) -> Result<Option<TestCase>, DbError>;
	async fn update_test_case(&self, test_case: &TestCase) -> Result<(), DbError>;
	async fn delete_test_case(&self, bug_id: &BugId, id: &TestCaseId) -> Result<bool, DbError>;
}

#[async_trait]
impl TestCaseStore for TestCaseRepository {
	async fn create_test_case(&self, test_case: &TestCase) -> Result<(), DbError> {
		self.create_test_case(test_case).await
	}

	async fn list_test_cases(&self, bug_id: &BugId) -> Result<Vec<TestCase>, DbError> {
		self.list_test_cases(bug_id).await
	}

	async fn get_test_case(
		&self,
		bug_id: &BugId,
		id: &TestCaseId,
	) -> Result<Option<TestCase>, DbError> {
		self.get_test_case(bug_id, id).await
	}

	async fn update_test_case(&self, test_case: &TestCase) -> Result<(), DbError> {
		self.update_test_case(test_case).await
	}

	async fn delete_test_case(&self, bug_id: &BugId, id: &TestCaseId) -> Result<bool, DbError> {
		self.delete_test_case(bug_id, id).await
	}
}

#[derive(Clone)]
pub struct TestCaseRepository {
	pool: SqlitePool,
}

const TEST_CASE_COLUMNS: &str =
	"id, bug_id, title, description, status, author_id, author_name, created_at, last_updated";

async fn touch_parent(tx: &mut Transaction<'_, Sqlite>, bug_id: &BugId) -> Result<(), DbError> {
	let result = sqlx::query("UPDATE bugs SET last_updated = ? WHERE id = ?")
		.bind(Utc::now().to_rfc3339())
		.bind(bug_id.to_string())
		.execute(&mut **tx)
		.await?;
	if result.rows_affected() == 0 {
		return Err(DbError::NotFound(format!("Bug {bug_id} not found")));
	}
	Ok(())
}

impl TestCaseRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	#[tracing::instrument(skip(self, test_case), fields(test_case_id = %test_case.id, bug_id = %test_case.bug_id))]
	pub async fn create_test_case(&self, test_case: &TestCase) -> Result<(), DbError> {
		let mut tx = self.pool.begin().await?;
		touch_parent(&mut tx, &test_case.bug_id).await?;

		sqlx::query(
			r#"
			INSERT INTO test_cases (id, bug_id, title, description, status, author_id, author_name, created_at, last_updated)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(test_case.id.to_string())
		.bind(test_case.bug_id.to_string())
		.bind(&test_case.title)
		.bind(&test_case.description)
		.bind(test_case.status.to_string())
		.bind(test_case.author_id.to_string())
		.bind(&test_case.author_name)
		.bind(test_case.created_at.to_rfc3339())
		.bind(test_case.last_updated.to_rfc3339())
		.execute(&mut *tx)
		.await?;

		tx.commit().await?;
		tracing::debug!(test_case_id = %test_case.id, "test case created");
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(bug_id = %bug_id))]
	pub async fn list_test_cases(&self, bug_id: &BugId) -> Result<Vec<TestCase>, DbError> {
		let rows = sqlx::query(&format!(
			"SELECT {TEST_CASE_COLUMNS} FROM test_cases WHERE bug_id = ? ORDER BY created_at ASC"
		))
		.bind(bug_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(row_to_test_case).collect()
	}

	#[tracing::instrument(skip(self), fields(bug_id = %bug_id, test_case_id = %id))]
	pub async fn get_test_case(
		&self,
		bug_id: &BugId,
		id: &TestCaseId,
	) -> Result<Option<TestCase>, DbError> {
		let row = sqlx::query(&format!(
			"SELECT {TEST_CASE_COLUMNS} FROM test_cases WHERE id = ? AND bug_id = ?"
		))
		.bind(id.to_string())
		.bind(bug_id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.as_ref().map(row_to_test_case).transpose()
	}

	#[tracing::instrument(skip(self, test_case), fields(test_case_id = %test_case.id, status = %test_case.status))]
	pub async fn update_test_case(&self, test_case: &TestCase) -> Result<(), DbError> {
		let mut tx = self.pool.begin().await?;

		let result = sqlx::query(
			r#"
			UPDATE test_cases
			SET title = ?, description = ?, status = ?, last_updated = ?
			WHERE id = ? AND bug_id = ?
			"#,
		)
		.bind(&test_case.title)
		.bind(&test_case.description)
		.bind(test_case.status.to_string())
		.bind(test_case.last_updated.to_rfc3339())
		.bind(test_case.id.to_string())
		.bind(test_case.bug_id.to_string())
		.execute(&mut *tx)
		.await?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(format!("Test case {} not found", test_case.id)));
		}

		touch_parent(&mut tx, &test_case.bug_id).await?;
		tx.commit().await?;

		tracing::debug!(test_case_id = %test_case.id, "test case updated");
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(bug_id = %bug_id, test_case_id = %id))]
	pub async fn delete_test_case(&self, bug_id: &BugId, id: &TestCaseId) -> Result<bool, DbError> {
		let mut tx = self.pool.begin().await?;

		let result = sqlx::query("DELETE FROM test_cases WHERE id = ? AND bug_id = ?")
			.bind(id.to_string())
			.bind(bug_id.to_string())
			.execute(&mut *tx)
			.await?;

		let deleted = result.rows_affected() > 0;
		if deleted {
			touch_parent(&mut tx, bug_id).await?;
		}
		tx.commit().await?;

		tracing::debug!(test_case_id = %id, deleted, "test case deleted");
		Ok(deleted)
	}
}

fn row_to_test_case(row: &sqlx::sqlite::SqliteRow) -> Result<TestCase, DbError> {
	let id: String = row.get("id");
	let bug_id: String = row.get("bug_id");
	let status: String = row.get("status");
	let author_id: String = row.get("author_id");
	let created_at: String = row.get("created_at");
	let last_updated: String = row.get("last_updated");

	Ok(TestCase {
		id: TestCaseId(parse_uuid("test case id", &id)?),
		bug_id: BugId(parse_uuid("bug_id", &bug_id)?),
		title: row.get("title"),
		description: row.get("description"),
		status: parse_enum("status", &status)?,
		author_id: UserId::new(parse_uuid("author_id", &author_id)?),
		author_name: row.get("author_name"),
		created_at: parse_timestamp("created_at", &created_at)?,
		last_updated: parse_timestamp("last_updated", &last_updated)?,
	})
}
