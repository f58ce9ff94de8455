// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Comments on bugs. Append-only.

use bugtrail_server_auth::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BugId, CommentId};

/// Maximum comment length in characters.
pub const MAX_COMMENT_LENGTH: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Comment {
	pub id: CommentId,
	pub bug_id: BugId,
	pub author_id: UserId,
	pub author_name: String,
	pub text: String,
	pub created_at: DateTime<Utc>,
}
