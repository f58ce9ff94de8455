// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use bugtrail_bugs_core::Comment;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateCommentRequest {
	pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
	pub id: String,
	pub bug_id: String,
	pub author_id: String,
	pub author_name: String,
	pub text: String,
	pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentResponse {
	fn from(comment: Comment) -> Self {
		Self {
			id: comment.id.to_string(),
			bug_id: comment.bug_id.to_string(),
			author_id: comment.author_id.to_string(),
			author_name: comment.author_name,
			text: comment.text,
			created_at: comment.created_at,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ListCommentsResponse {
	pub comments: Vec<CommentResponse>,
}
