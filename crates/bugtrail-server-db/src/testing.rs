// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory SQLite helpers for repository tests.

use bugtrail_server_auth::{Permission, Role};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// A single-connection in-memory pool. One connection keeps every query on the
/// same in-memory database.
pub async fn create_test_pool() -> SqlitePool {
	let options = SqliteConnectOptions::from_str(":memory:")
		.unwrap()
		.foreign_keys(true)
		.create_if_missing(true);

	SqlitePoolOptions::new()
		.max_connections(1)
		.connect_with(options)
		.await
		.expect("Failed to create test pool")
}

pub async fn create_users_table(pool: &SqlitePool) {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS users (
			id TEXT PRIMARY KEY,
			email TEXT NOT NULL UNIQUE,
			display_name TEXT NOT NULL,
			role TEXT NOT NULL,
			password_hash TEXT,
			external_id TEXT UNIQUE,
			created_at TEXT NOT NULL,
			updated_at TEXT NOT NULL
		)
		"#,
	)
	.execute(pool)
	.await
	.unwrap();
}

pub async fn create_sessions_table(pool: &SqlitePool) {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS sessions (
			id TEXT PRIMARY KEY,
			user_ref TEXT NOT NULL,
			token_hash TEXT NOT NULL UNIQUE,
			created_at TEXT NOT NULL,
			expires_at TEXT NOT NULL
		)
		"#,
	)
	.execute(pool)
	.await
	.unwrap();
}

pub async fn create_role_permissions_table(pool: &SqlitePool) {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS role_permissions (
			role TEXT NOT NULL,
			permission TEXT NOT NULL,
			granted INTEGER NOT NULL DEFAULT 0,
			PRIMARY KEY (role, permission)
		)
		"#,
	)
	.execute(pool)
	.await
	.unwrap();
}

pub async fn create_bugs_table(pool: &SqlitePool) {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS bugs (
			id TEXT PRIMARY KEY,
			title TEXT NOT NULL,
			description TEXT NOT NULL,
			steps_to_reproduce TEXT NOT NULL,
			author_id TEXT NOT NULL,
			author_name TEXT NOT NULL,
			assigned_user_id TEXT,
			assigned_user_name TEXT,
			status_label TEXT NOT NULL DEFAULT 'open',
			classification TEXT NOT NULL DEFAULT 'unset',
			priority TEXT NOT NULL DEFAULT 'normal',
			hours_worked REAL NOT NULL DEFAULT 0,
			created_at TEXT NOT NULL,
			last_updated TEXT NOT NULL,
			closed_at TEXT
		)
		"#,
	)
	.execute(pool)
	.await
	.unwrap();

	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS user_bugs (
			user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
			bug_id TEXT NOT NULL REFERENCES bugs(id) ON DELETE CASCADE,
			relation TEXT NOT NULL,
			created_at TEXT NOT NULL,
			PRIMARY KEY (user_id, bug_id, relation)
		)
		"#,
	)
	.execute(pool)
	.await
	.unwrap();
}

pub async fn create_comments_table(pool: &SqlitePool) {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS comments (
			id TEXT PRIMARY KEY,
			bug_id TEXT NOT NULL REFERENCES bugs(id) ON DELETE CASCADE,
			author_id TEXT NOT NULL,
			author_name TEXT NOT NULL,
			text TEXT NOT NULL,
			created_at TEXT NOT NULL
		)
		"#,
	)
	.execute(pool)
	.await
	.unwrap();
}

pub async fn create_test_cases_table(pool: &SqlitePool) {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS test_cases (
			id TEXT PRIMARY KEY,
			bug_id TEXT NOT NULL REFERENCES bugs(id) ON DELETE CASCADE,
			title TEXT NOT NULL,
			description TEXT,
			status TEXT NOT NULL DEFAULT 'pending',
			author_id TEXT NOT NULL,
			author_name TEXT NOT NULL,
			created_at TEXT NOT NULL,
			last_updated TEXT NOT NULL
		)
		"#,
	)
	.execute(pool)
	.await
	.unwrap();
}

/// Grant `permissions` to `role`; every other permission is stored as denied.
pub async fn seed_role(pool: &SqlitePool, role: Role, permissions: &[Permission]) {
	for permission in Permission::all() {
		sqlx::query(
			"INSERT OR REPLACE INTO role_permissions (role, permission, granted) VALUES (?, ?, ?)",
		)
		.bind(role.as_str())
		.bind(permission.as_str())
		.bind(permissions.contains(permission) as i32)
		.execute(pool)
		.await
		.unwrap();
	}
}

/// Pool with every table created.
pub async fn create_full_test_pool() -> SqlitePool {
	let pool = create_test_pool().await;
	create_users_table(&pool).await;
	create_sessions_table(&pool).await;
	create_role_permissions_table(&pool).await;
	create_bugs_table(&pool).await;
	create_comments_table(&pool).await;
	create_test_cases_table(&pool).await;
	pool
}
