// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bugtrail HTTP server.
//!
//! An axum application over SQLite: session authentication, role and
//! permission gates, and the bug, comment, test case and user handlers.

pub mod api;
pub mod api_docs;
pub mod auth_middleware;
pub mod db;
pub mod error;
pub mod extract;
pub mod jobs;
pub mod pagination;
pub mod rbac_middleware;
pub mod routes;
pub mod session_resolver;
pub mod typed_router;
pub mod validation;
pub mod version;

pub use api::{create_app_state, create_router, AppState};
pub use api_docs::ApiDoc;
pub use bugtrail_server_config::ServerConfig;
pub use error::ServerError;
pub use jobs::SessionCleanupJob;
pub use session_resolver::{ResolveError, ResolvedIdentity, SessionResolver};
pub use typed_router::{AuthedRouter, PublicRouter};
