// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP handlers, one module per resource.

pub mod auth;
pub mod bugs;
pub mod comments;
pub mod health;
pub mod test_cases;
pub mod users;

use bugtrail_bugs_core::{lifecycle::Actor, Bug, BugId};
use bugtrail_server_auth::CurrentUser;

use crate::{api::AppState, error::ServerError, validation::parse_id};

pub(crate) fn actor(current_user: &CurrentUser) -> Actor {
	Actor::new(current_user.id(), current_user.role(), current_user.display_name())
}

/// Parse a bug id from the path and load the bug, 404 if absent.
pub(crate) async fn load_bug(state: &AppState, raw_id: &str) -> Result<Bug, ServerError> {
	let bug_id: BugId = parse_id("id", raw_id)?;
	state
		.bug_repo
		.get_bug(&bug_id)
		.await?
		.ok_or_else(|| ServerError::NotFound(format!("Bug {bug_id} not found")))
}
