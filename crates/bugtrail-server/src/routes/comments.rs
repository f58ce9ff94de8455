// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Comment handlers. Comments are append-only.

use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::IntoResponse,
	Json,
};
use bugtrail_bugs_core::{lifecycle::new_comment, CommentId};
use bugtrail_server_api::{CommentResponse, CreateCommentRequest, ErrorResponse, ListCommentsResponse};

use super::{actor, load_bug};
use crate::{
	api::AppState, auth_middleware::RequireAuth, error::ServerError, extract::JsonBody,
	validation::parse_id,
};

#[utoipa::path(
    get,
    path = "/bugs/{id}/comments",
    params(("id" = String, Path, description = "Bug ID")),
    responses(
        (status = 200, description = "Comments, oldest first", body = ListCommentsResponse),
        (status = 404, description = "Bug not found", body = ErrorResponse)
    ),
    tag = "comments"
)]
#[tracing::instrument(skip(state, _current_user))]
pub async fn list_comments(
	RequireAuth(_current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
	let bug = load_bug(&state, &id).await?;
	let comments = state.comment_repo.list_comments(&bug.id).await?;

	Ok(Json(ListCommentsResponse {
		comments: comments.into_iter().map(CommentResponse::from).collect(),
	}))
}

#[utoipa::path(
    post,
    path = "/bugs/{id}/comments",
    params(("id" = String, Path, description = "Bug ID")),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment added", body = CommentResponse),
        (status = 400, description = "Empty or oversized text", body = ErrorResponse),
        (status = 404, description = "Bug not found", body = ErrorResponse)
    ),
    tag = "comments"
)]
/// Add a comment. The parent bug's `last_updated` is bumped with it.
#[tracing::instrument(skip(state, current_user, body), fields(user_id = %current_user.id()))]
pub async fn create_comment(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
	JsonBody(body): JsonBody<CreateCommentRequest>,
) -> Result<impl IntoResponse, ServerError> {
	let bug = load_bug(&state, &id).await?;
	let comment = new_comment(&bug, &actor(&current_user), &body.text)?;
	state.comment_repo.create_comment(&comment).await?;
	tracing::info!(bug_id = %bug.id, comment_id = %comment.id, "comment added");

	Ok((StatusCode::CREATED, Json(CommentResponse::from(comment))))
}

#[utoipa::path(
    get,
    path = "/bugs/{id}/comments/{comment_id}",
    params(
        ("id" = String, Path, description = "Bug ID"),
        ("comment_id" = String, Path, description = "Comment ID")
    ),
    responses(
        (status = 200, description = "The comment", body = CommentResponse),
        (status = 404, description = "Bug or comment not found", body = ErrorResponse)
    ),
    tag = "comments"
)]
#[tracing::instrument(skip(state, _current_user))]
pub async fn get_comment(
	RequireAuth(_current_user): RequireAuth,
	State(state): State<AppState>,
	Path((id, comment_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ServerError> {
	let bug = load_bug(&state, &id).await?;
	let comment_id: CommentId = parse_id("commentId", &comment_id)?;

	let comment = state
		.comment_repo
		.get_comment(&bug.id, &comment_id)
		.await?
		.ok_or_else(|| ServerError::NotFound(format!("Comment {comment_id} not found")))?;

	Ok(Json(CommentResponse::from(comment)))
}
