// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bug repository.

use async_trait::async_trait;
use bugtrail_bugs_core::{Bug, BugFilter, BugId, BugSort};
use bugtrail_server_auth::UserId;
use chrono::{DateTime, Duration, Utc};
use sqlx::{sqlite::SqlitePool, QueryBuilder, Row, Sqlite};

use crate::error::DbError;
use crate::row::{parse_enum, parse_optional_timestamp, parse_timestamp, parse_uuid};
use crate::user::BugRelation;

#[async_trait]
pub trait BugStore: Send + Sync {
	async fn create_bug(&self, bug: &Bug) -> Result<(), DbError>;
	async fn get_bug(&self, id: &BugId) -> Result<Option<Bug>, DbError>;
	async fn list_bugs(
		&self,
		filter: &BugFilter,
		limit: i32,
		offset: i32,
	) -> Result<(Vec<Bug>, i64), DbError>;
	async fn update_bug(&self, bug: &Bug) -> Result<(), DbError>;
}

#[async_trait]
impl BugStore for BugRepository {
	async fn create_bug(&self, bug: &Bug) -> Result<(), DbError> {
		self.create_bug(bug).await
	}

	async fn get_bug(&self, id: &BugId) -> Result<Option<Bug>, DbError> {
		self.get_bug(id).await
	}

	async fn list_bugs(
		&self,
		filter: &BugFilter,
		limit: i32,
		offset: i32,
	) -> Result<(Vec<Bug>, i64), DbError> {
		self.list_bugs(filter, limit, offset).await
	}

	async fn update_bug(&self, bug: &Bug) -> Result<(), DbError> {
		self.update_bug(bug).await
	}
}

/// Repository for bug database operations.
#[derive(Clone)]
pub struct BugRepository {
	pool: SqlitePool,
}

const BUG_COLUMNS: &str = "id, title, description, steps_to_reproduce, author_id, author_name, \
	assigned_user_id, assigned_user_name, status_label, classification, priority, hours_worked, \
	created_at, last_updated, closed_at";

impl BugRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Insert a bug and record it in the author's created set, atomically.
	#[tracing::instrument(skip(self, bug), fields(bug_id = %bug.id, author_id = %bug.author_id))]
	pub async fn create_bug(&self, bug: &Bug) -> Result<(), DbError> {
		let mut tx = self.pool.begin().await?;

		sqlx::query(
			r#"
			INSERT INTO bugs (
				id, title, description, steps_to_reproduce, author_id, author_name,
				assigned_user_id, assigned_user_name, status_label, classification, priority,
				hours_worked, created_at, last_updated, closed_at
			) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(bug.id.to_string())
		.bind(&bug.title)
		.bind(&bug.description)
		.bind(&bug.steps_to_reproduce)
		.bind(bug.author_id.to_string())
		.bind(&bug.author_name)
		.bind(bug.assigned_user_id.map(|id| id.to_string()))
		.bind(&bug.assigned_user_name)
		.bind(bug.status_label.to_string())
		.bind(bug.classification.to_string())
		.bind(bug.priority.to_string())
		.bind(bug.hours_worked)
		.bind(bug.created_at.to_rfc3339())
		.bind(bug.last_updated.to_rfc3339())
		.bind(bug.closed_at.map(|t| t.to_rfc3339()))
		.execute(&mut *tx)
		.await?;

		sqlx::query(
			r#"
			INSERT OR IGNORE INTO user_bugs (user_id, bug_id, relation, created_at)
			VALUES (?, ?, ?, ?)
			"#,
		)
		.bind(bug.author_id.to_string())
		.bind(bug.id.to_string())
		.bind(BugRelation::Created.to_string())
		.bind(bug.created_at.to_rfc3339())
		.execute(&mut *tx)
		.await?;

		tx.commit().await?;

		tracing::debug!(bug_id = %bug.id, "bug created");
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(bug_id = %id))]
	pub async fn get_bug(&self, id: &BugId) -> Result<Option<Bug>, DbError> {
		let row = sqlx::query(&format!("SELECT {BUG_COLUMNS} FROM bugs WHERE id = ?"))
			.bind(id.to_string())
			.fetch_optional(&self.pool)
			.await?;

		row.as_ref().map(row_to_bug).transpose()
	}

	/// List bugs matching `filter`.
	///
	/// # Returns
	/// Tuple of (bugs, total_count) for pagination.
	#[tracing::instrument(skip(self, filter), fields(sort = %filter.sort, limit, offset))]
	pub async fn list_bugs(
		&self,
		filter: &BugFilter,
		limit: i32,
		offset: i32,
	) -> Result<(Vec<Bug>, i64), DbError> {
		let mut query =
			QueryBuilder::<Sqlite>::new(format!("SELECT {BUG_COLUMNS} FROM bugs WHERE 1 = 1"));
		push_filters(&mut query, filter);
		query.push(" ORDER BY ").push(order_clause(filter.sort));
		query.push(" LIMIT ").push_bind(limit);
		query.push(" OFFSET ").push_bind(offset);

		let rows = query.build().fetch_all(&self.pool).await?;

		let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM bugs WHERE 1 = 1");
		push_filters(&mut count_query, filter);
		let count: (i64,) = count_query.build_query_as::<(i64,)>().fetch_one(&self.pool).await?;

		let bugs = rows.iter().map(row_to_bug).collect::<Result<Vec<_>, _>>()?;
		tracing::debug!(count = bugs.len(), total = count.0, "listed bugs");
		Ok((bugs, count.0))
	}

	/// Persist every mutable field of `bug`. Last write wins.
	#[tracing::instrument(skip(self, bug), fields(bug_id = %bug.id, status = %bug.status_label))]
	pub async fn update_bug(&self, bug: &Bug) -> Result<(), DbError> {
		let result = sqlx::query(
			r#"
			UPDATE bugs
			SET title = ?, description = ?, steps_to_reproduce = ?,
				assigned_user_id = ?, assigned_user_name = ?,
				status_label = ?, classification = ?, priority = ?, hours_worked = ?,
				last_updated = ?, closed_at = ?
			WHERE id = ?
			"#,
		)
		.bind(&bug.title)
		.bind(&bug.description)
		.bind(&bug.steps_to_reproduce)
		.bind(bug.assigned_user_id.map(|id| id.to_string()))
		.bind(&bug.assigned_user_name)
		.bind(bug.status_label.to_string())
		.bind(bug.classification.to_string())
		.bind(bug.priority.to_string())
		.bind(bug.hours_worked)
		.bind(bug.last_updated.to_rfc3339())
		.bind(bug.closed_at.map(|t| t.to_rfc3339()))
		.bind(bug.id.to_string())
		.execute(&self.pool)
		.await?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(format!("Bug {} not found", bug.id)));
		}

		tracing::debug!(bug_id = %bug.id, "bug updated");
		Ok(())
	}
}

fn escape_like(term: &str) -> String {
	let mut escaped = String::with_capacity(term.len() + 2);
	escaped.push('%');
	for c in term.chars() {
		if matches!(c, '%' | '_' | '\\') {
			escaped.push('\\');
		}
		escaped.push(c);
	}
	escaped.push('%');
	escaped
}

fn push_filters(query: &mut QueryBuilder<'_, Sqlite>, filter: &BugFilter) {
	for keyword in &filter.keywords {
		let pattern = escape_like(keyword);
		query
			.push(" AND (title LIKE ")
			.push_bind(pattern.clone())
			.push(" ESCAPE '\\' OR description LIKE ")
			.push_bind(pattern.clone())
			.push(" ESCAPE '\\' OR steps_to_reproduce LIKE ")
			.push_bind(pattern)
			.push(" ESCAPE '\\')");
	}

	if let Some(classification) = filter.classification {
		query.push(" AND classification = ").push_bind(classification.to_string());
	}

	match filter.closed {
		Some(true) => {
			query.push(" AND status_label = 'closed'");
		}
		Some(false) => {
			query.push(" AND status_label != 'closed'");
		}
		None => {}
	}

	let now = Utc::now();
	if let Some(min_age) = filter.min_age_days {
		match age_cutoff(now, min_age) {
			Some(cutoff) => {
				query.push(" AND created_at <= ").push_bind(cutoff.to_rfc3339());
			}
			// Older than anything representable: nothing qualifies.
			None => {
				query.push(" AND 0");
			}
		}
	}
	if let Some(max_age) = filter.max_age_days {
		if let Some(cutoff) = age_cutoff(now, max_age) {
			query.push(" AND created_at >= ").push_bind(cutoff.to_rfc3339());
		}
	}
}

/// `now` minus `days`, or `None` when that falls outside the calendar.
fn age_cutoff(now: DateTime<Utc>, days: u32) -> Option<DateTime<Utc>> {
	Duration::try_days(i64::from(days)).and_then(|age| now.checked_sub_signed(age))
}

fn order_clause(sort: BugSort) -> &'static str {
	match sort {
		BugSort::Newest => "created_at DESC",
		BugSort::Oldest => "created_at ASC",
		BugSort::Title => "title COLLATE NOCASE ASC, created_at DESC",
		BugSort::Classification => "classification ASC, created_at DESC",
		BugSort::AssignedTo => "assigned_user_name COLLATE NOCASE ASC, created_at DESC",
		BugSort::CreatedBy => "author_name COLLATE NOCASE ASC, created_at DESC",
	}
}

fn row_to_bug(row: &sqlx::sqlite::SqliteRow) -> Result<Bug, DbError> {
	let id: String = row.get("id");
	let author_id: String = row.get("author_id");
	let assigned_user_id: Option<String> = row.get("assigned_user_id");
	let status_label: String = row.get("status_label");
	let classification: String = row.get("classification");
	let priority: String = row.get("priority");
	let created_at: String = row.get("created_at");
	let last_updated: String = row.get("last_updated");

	Ok(Bug {
		id: BugId(parse_uuid("bug id", &id)?),
		title: row.get("title"),
		description: row.get("description"),
		steps_to_reproduce: row.get("steps_to_reproduce"),
		author_id: UserId::new(parse_uuid("author_id", &author_id)?),
		author_name: row.get("author_name"),
		assigned_user_id: assigned_user_id
			.map(|s| parse_uuid("assigned_user_id", &s).map(UserId::new))
			.transpose()?,
		assigned_user_name: row.get("assigned_user_name"),
		status_label: parse_enum("status_label", &status_label)?,
		classification: parse_enum("classification", &classification)?,
		priority: parse_enum("priority", &priority)?,
		hours_worked: row.get("hours_worked"),
		created_at: parse_timestamp("created_at", &created_at)?,
		last_updated: parse_timestamp("last_updated", &last_updated)?,
		closed_at: parse_optional_timestamp("closed_at", row.get("closed_at"))?,
	})
}
