// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Database layer for the bugtrail server.
//!
//! Each table family has a `*Store` trait and a `*Repository` that implements
//! it over a [`sqlx::SqlitePool`]. Handlers depend on the traits through
//! `Arc<dyn ...>` so tests can swap in failing or in-memory stores.
//!
//! Identifiers are stored as TEXT and timestamps as RFC 3339 strings.

pub mod bug;
pub mod comment;
pub mod error;
pub mod pool;
pub mod role_permission;
mod row;
pub mod session;
pub mod test_case;
pub mod user;

#[cfg(test)]
pub mod testing;

pub use bug::{BugRepository, BugStore};
pub use comment::{CommentRepository, CommentStore};
pub use error::{DbError, Result};
pub use pool::create_pool;
pub use role_permission::{RolePermissionRepository, RolePermissionStore};
pub use session::{SessionRepository, SessionStore};
pub use test_case::{TestCaseRepository, TestCaseStore};
pub use user::{BugRelation, UserCredentials, UserFilter, UserRepository, UserStore};
