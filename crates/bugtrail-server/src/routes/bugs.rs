// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bug handlers.
//!
//! Role and permission gates have already run by the time a handler here is
//! called. What remains are the rules that depend on the bug itself, which
//! live in [`bugtrail_bugs_core::lifecycle`].

use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::IntoResponse,
	Json,
};
use bugtrail_bugs_core::{
	lifecycle::{new_bug, plan_assign, plan_classify, plan_close, plan_update},
	BugFilter, BugSort, Classification,
};
use bugtrail_server_api::{
	AssignBugRequest, BugResponse, ClassifyBugRequest, CreateBugRequest, ErrorResponse,
	ListBugsParams, ListBugsResponse, UpdateBugRequest,
};
use bugtrail_server_auth::UserId;
use bugtrail_server_db::BugRelation;

use super::{actor, load_bug};
use crate::{
	api::AppState,
	auth_middleware::RequireAuth,
	error::ServerError,
	extract::{JsonBody, QueryParams},
	pagination::PaginationParams,
	validation::{parse_id, parse_value},
};

/// Upper bound for `minAge`/`maxAge`, in days.
const MAX_AGE_DAYS: u32 = 36_500;

fn bug_filter(params: &ListBugsParams) -> Result<BugFilter, ServerError> {
	for (field, age) in [("minAge", params.min_age), ("maxAge", params.max_age)] {
		if age.is_some_and(|days| days > MAX_AGE_DAYS) {
			return Err(ServerError::validation(
				field,
				format!("must be at most {MAX_AGE_DAYS} days"),
			));
		}
	}
	if let (Some(min), Some(max)) = (params.min_age, params.max_age) {
		if min > max {
			return Err(ServerError::validation("minAge", "must not exceed maxAge"));
		}
	}

	Ok(BugFilter {
		keywords: params
			.keywords
			.as_deref()
			.map(BugFilter::parse_keywords)
			.unwrap_or_default(),
		classification: params
			.classification
			.as_deref()
			.map(|c| parse_value::<Classification>("classification", c))
			.transpose()?,
		closed: params.closed,
		min_age_days: params.min_age,
		max_age_days: params.max_age,
		sort: params
			.sort_by
			.as_deref()
			.map(|s| parse_value::<BugSort>("sortBy", s))
			.transpose()?
			.unwrap_or_default(),
	})
}

#[utoipa::path(
    get,
    path = "/bugs",
    params(ListBugsParams),
    responses(
        (status = 200, description = "Bugs matching the filter", body = ListBugsResponse),
        (status = 400, description = "Invalid filter", body = ErrorResponse),
        (status = 403, description = "Missing canViewData", body = ErrorResponse)
    ),
    tag = "bugs"
)]
/// Search bugs by keyword, classification, closed state and age.
#[tracing::instrument(skip(state, current_user, params), fields(user_id = %current_user.id()))]
pub async fn list_bugs(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	QueryParams(params): QueryParams<ListBugsParams>,
) -> Result<impl IntoResponse, ServerError> {
	let filter = bug_filter(&params)?;
	let (limit, offset) = PaginationParams::new(params.limit, params.offset).resolve();

	let (bugs, total) = state.bug_repo.list_bugs(&filter, limit as i32, offset as i32).await?;
	tracing::debug!(count = bugs.len(), total, "listed bugs");

	Ok(Json(ListBugsResponse {
		bugs: bugs.into_iter().map(BugResponse::from).collect(),
		total,
		limit,
		offset,
	}))
}

#[utoipa::path(
    post,
    path = "/bugs",
    request_body = CreateBugRequest,
    responses(
        (status = 201, description = "Bug created", body = BugResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Missing canCreateBug", body = ErrorResponse)
    ),
    tag = "bugs"
)]
/// File a new bug. It starts `open` and `unset`, authored by the caller.
#[tracing::instrument(skip(state, current_user, body), fields(user_id = %current_user.id()))]
pub async fn create_bug(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	JsonBody(body): JsonBody<CreateBugRequest>,
) -> Result<impl IntoResponse, ServerError> {
	let bug = new_bug(body.into(), &actor(&current_user))?;
	state.bug_repo.create_bug(&bug).await?;
	tracing::info!(bug_id = %bug.id, "bug created");

	Ok((StatusCode::CREATED, Json(BugResponse::from(bug))))
}

#[utoipa::path(
    get,
    path = "/bugs/{id}",
    params(("id" = String, Path, description = "Bug ID")),
    responses(
        (status = 200, description = "The bug", body = BugResponse),
        (status = 404, description = "Bug not found", body = ErrorResponse)
    ),
    tag = "bugs"
)]
#[tracing::instrument(skip(state, _current_user))]
pub async fn get_bug(
	RequireAuth(_current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
	Ok(Json(BugResponse::from(load_bug(&state, &id).await?)))
}

#[utoipa::path(
    patch,
    path = "/bugs/{id}",
    params(("id" = String, Path, description = "Bug ID")),
    request_body = UpdateBugRequest,
    responses(
        (status = 200, description = "Bug updated", body = BugResponse),
        (status = 400, description = "Invalid input or status target", body = ErrorResponse),
        (status = 403, description = "Not allowed to change these fields", body = ErrorResponse),
        (status = 404, description = "Bug not found", body = ErrorResponse),
        (status = 409, description = "Bug is closed or transition not allowed", body = ErrorResponse)
    ),
    tag = "bugs"
)]
/// General update: free-text fields, status, priority and hours.
///
/// Free-text fields are limited to the author and the assignee. A business
/// analyst who is neither may only move an open bug to `resolved`.
#[tracing::instrument(skip(state, current_user, body), fields(user_id = %current_user.id()))]
pub async fn update_bug(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
	JsonBody(body): JsonBody<UpdateBugRequest>,
) -> Result<impl IntoResponse, ServerError> {
	let bug = load_bug(&state, &id).await?;
	let changes = plan_update(&bug, &actor(&current_user), body.into())?;
	let bug = changes.apply(bug);
	state.bug_repo.update_bug(&bug).await?;
	tracing::info!(bug_id = %bug.id, status = %bug.status_label, "bug updated");

	Ok(Json(BugResponse::from(bug)))
}

#[utoipa::path(
    patch,
    path = "/bugs/{id}/classify",
    params(("id" = String, Path, description = "Bug ID")),
    request_body = ClassifyBugRequest,
    responses(
        (status = 200, description = "Bug classified", body = BugResponse),
        (status = 403, description = "Triage roles only", body = ErrorResponse),
        (status = 404, description = "Bug not found", body = ErrorResponse),
        (status = 409, description = "Bug is closed", body = ErrorResponse)
    ),
    tag = "bugs"
)]
#[tracing::instrument(skip(state, current_user, body), fields(user_id = %current_user.id()))]
pub async fn classify_bug(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
	JsonBody(body): JsonBody<ClassifyBugRequest>,
) -> Result<impl IntoResponse, ServerError> {
	let bug = load_bug(&state, &id).await?;
	let bug = plan_classify(&bug, body.classification)?.apply(bug);
	state.bug_repo.update_bug(&bug).await?;
	tracing::info!(bug_id = %bug.id, classification = %bug.classification, "bug classified");

	Ok(Json(BugResponse::from(bug)))
}

#[utoipa::path(
    patch,
    path = "/bugs/{id}/assign",
    params(("id" = String, Path, description = "Bug ID")),
    request_body = AssignBugRequest,
    responses(
        (status = 200, description = "Bug assigned", body = BugResponse),
        (status = 403, description = "Triage roles only", body = ErrorResponse),
        (status = 404, description = "Bug or assignee not found", body = ErrorResponse),
        (status = 409, description = "Bug is closed", body = ErrorResponse)
    ),
    tag = "bugs"
)]
/// Assign a bug to a user.
///
/// The bug row is authoritative. The assignee's assigned-bug set is updated
/// afterwards; a failure there is logged and does not fail the request.
#[tracing::instrument(skip(state, current_user, body), fields(user_id = %current_user.id()))]
pub async fn assign_bug(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
	JsonBody(body): JsonBody<AssignBugRequest>,
) -> Result<impl IntoResponse, ServerError> {
	let assignee_id: UserId = parse_id("userId", &body.user_id)?;
	let bug = load_bug(&state, &id).await?;
	let assignee = state
		.user_repo
		.get_user_by_id(&assignee_id)
		.await?
		.ok_or_else(|| ServerError::NotFound(format!("User {assignee_id} not found")))?;

	let bug = plan_assign(&bug, assignee.id, &assignee.display_name)?.apply(bug);
	state.bug_repo.update_bug(&bug).await?;
	tracing::info!(bug_id = %bug.id, assignee_id = %assignee.id, "bug assigned");

	if let Err(e) = state
		.user_repo
		.add_bug_relation(&assignee.id, &bug.id, BugRelation::Assigned)
		.await
	{
		tracing::warn!(
			error = %e,
			bug_id = %bug.id,
			assignee_id = %assignee.id,
			"failed to record assigned bug on user"
		);
	}

	Ok(Json(BugResponse::from(bug)))
}

#[utoipa::path(
    patch,
    path = "/bugs/{id}/close",
    params(("id" = String, Path, description = "Bug ID")),
    responses(
        (status = 200, description = "Bug closed", body = BugResponse),
        (status = 403, description = "Business analysts only", body = ErrorResponse),
        (status = 404, description = "Bug not found", body = ErrorResponse),
        (status = 409, description = "Bug already closed", body = ErrorResponse)
    ),
    tag = "bugs"
)]
/// Close a bug. Closed is terminal.
#[tracing::instrument(skip(state, current_user), fields(user_id = %current_user.id()))]
pub async fn close_bug(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
	let bug = load_bug(&state, &id).await?;
	let bug = plan_close(&bug)?.apply(bug);
	state.bug_repo.update_bug(&bug).await?;
	tracing::info!(bug_id = %bug.id, "bug closed");

	Ok(Json(BugResponse::from(bug)))
}
