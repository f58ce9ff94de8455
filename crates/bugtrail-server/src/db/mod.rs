// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Server-side schema migrations.
//!
//! Repositories live in `bugtrail-server-db`; this module only owns the SQL
//! that creates their tables and seeds the default permission matrix.

use bugtrail_server_db::DbError;
use sqlx::sqlite::SqlitePool;

use crate::error::ServerError;

const MIGRATIONS: &[(&str, &str)] = &[
	("001_initial_schema", include_str!("../../migrations/001_initial_schema.sql")),
	("002_seed_role_permissions", include_str!("../../migrations/002_seed_role_permissions.sql")),
];

/// Split a migration file into statements, dropping `--` comment lines.
fn statements(sql: &str) -> Vec<String> {
	let body = sql
		.lines()
		.filter(|line| !line.trim_start().starts_with("--"))
		.collect::<Vec<_>>()
		.join("\n");
	body
		.split(';')
		.map(str::trim)
		.filter(|s| !s.is_empty())
		.map(str::to_string)
		.collect()
}

/// Run every migration in order.
///
/// Migrations are idempotent and safe to run on every start.
#[tracing::instrument(skip(pool))]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), ServerError> {
	for (name, sql) in MIGRATIONS {
		for stmt in statements(sql) {
			if let Err(e) = sqlx::query(&stmt).execute(pool).await {
				if !e.to_string().contains("already exists") {
					tracing::error!(migration = %name, error = %e, "migration failed");
					return Err(DbError::from(e).into());
				}
			}
		}
		tracing::debug!(migration = %name, "migration applied");
	}
	Ok(())
}
