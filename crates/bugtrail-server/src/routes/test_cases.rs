// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Test case handlers.
//!
//! Writes re-check that the caller is a quality analyst even though the route
//! is already gated, so a misconfigured gate cannot open them up.

use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::IntoResponse,
	Json,
};
use bugtrail_bugs_core::{
	lifecycle::{check_test_case_author, new_test_case, update_test_case as plan_test_case_update},
	Bug, TestCase, TestCaseId,
};
use bugtrail_server_api::{
	CreateTestCaseRequest, ErrorResponse, ListTestCasesResponse, SuccessResponse, TestCaseResponse,
	UpdateTestCaseRequest,
};

use super::{actor, load_bug};
use crate::{
	api::AppState, auth_middleware::RequireAuth, error::ServerError, extract::JsonBody,
	validation::parse_id,
};

async fn load_test_case(state: &AppState, bug: &Bug, raw_id: &str) -> Result<TestCase, ServerError> {
	let test_id: TestCaseId = parse_id("testId", raw_id)?;
	state
		.test_case_repo
		.get_test_case(&bug.id, &test_id)
		.await?
		.ok_or_else(|| ServerError::NotFound(format!("Test case {test_id} not found")))
}

#[utoipa::path(
    get,
    path = "/bugs/{id}/tests",
    params(("id" = String, Path, description = "Bug ID")),
    responses(
        (status = 200, description = "Test cases for the bug", body = ListTestCasesResponse),
        (status = 404, description = "Bug not found", body = ErrorResponse)
    ),
    tag = "test-cases"
)]
#[tracing::instrument(skip(state, _current_user))]
pub async fn list_test_cases(
	RequireAuth(_current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
	let bug = load_bug(&state, &id).await?;
	let test_cases = state.test_case_repo.list_test_cases(&bug.id).await?;

	Ok(Json(ListTestCasesResponse {
		test_cases: test_cases.into_iter().map(TestCaseResponse::from).collect(),
	}))
}

#[utoipa::path(
    post,
    path = "/bugs/{id}/tests",
    params(("id" = String, Path, description = "Bug ID")),
    request_body = CreateTestCaseRequest,
    responses(
        (status = 201, description = "Test case created", body = TestCaseResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Quality analysts only", body = ErrorResponse),
        (status = 404, description = "Bug not found", body = ErrorResponse)
    ),
    tag = "test-cases"
)]
#[tracing::instrument(skip(state, current_user, body), fields(user_id = %current_user.id()))]
pub async fn create_test_case(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
	JsonBody(body): JsonBody<CreateTestCaseRequest>,
) -> Result<impl IntoResponse, ServerError> {
	check_test_case_author(current_user.role())?;
	let bug = load_bug(&state, &id).await?;

	let test_case = new_test_case(&bug, &actor(&current_user), body.into())?;
	state.test_case_repo.create_test_case(&test_case).await?;
	tracing::info!(bug_id = %bug.id, test_id = %test_case.id, "test case created");

	Ok((StatusCode::CREATED, Json(TestCaseResponse::from(test_case))))
}

#[utoipa::path(
    get,
    path = "/bugs/{id}/tests/{test_id}",
    params(
        ("id" = String, Path, description = "Bug ID"),
        ("test_id" = String, Path, description = "Test case ID")
    ),
    responses(
        (status = 200, description = "The test case", body = TestCaseResponse),
        (status = 404, description = "Bug or test case not found", body = ErrorResponse)
    ),
    tag = "test-cases"
)]
#[tracing::instrument(skip(state, _current_user))]
pub async fn get_test_case(
	RequireAuth(_current_user): RequireAuth,
	State(state): State<AppState>,
	Path((id, test_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ServerError> {
	let bug = load_bug(&state, &id).await?;
	let test_case = load_test_case(&state, &bug, &test_id).await?;
	Ok(Json(TestCaseResponse::from(test_case)))
}

#[utoipa::path(
    patch,
    path = "/bugs/{id}/tests/{test_id}",
    params(
        ("id" = String, Path, description = "Bug ID"),
        ("test_id" = String, Path, description = "Test case ID")
    ),
    request_body = UpdateTestCaseRequest,
    responses(
        (status = 200, description = "Test case updated", body = TestCaseResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Quality analysts only", body = ErrorResponse),
        (status = 404, description = "Bug or test case not found", body = ErrorResponse)
    ),
    tag = "test-cases"
)]
#[tracing::instrument(skip(state, current_user, body), fields(user_id = %current_user.id()))]
pub async fn update_test_case(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path((id, test_id)): Path<(String, String)>,
	JsonBody(body): JsonBody<UpdateTestCaseRequest>,
) -> Result<impl IntoResponse, ServerError> {
	check_test_case_author(current_user.role())?;
	let bug = load_bug(&state, &id).await?;
	let existing = load_test_case(&state, &bug, &test_id).await?;

	let updated = plan_test_case_update(&existing, &actor(&current_user), body.into())?;
	state.test_case_repo.update_test_case(&updated).await?;
	tracing::info!(bug_id = %bug.id, test_id = %updated.id, status = %updated.status, "test case updated");

	Ok(Json(TestCaseResponse::from(updated)))
}

#[utoipa::path(
    delete,
    path = "/bugs/{id}/tests/{test_id}",
    params(
        ("id" = String, Path, description = "Bug ID"),
        ("test_id" = String, Path, description = "Test case ID")
    ),
    responses(
        (status = 200, description = "Test case deleted", body = SuccessResponse),
        (status = 403, description = "Quality analysts only", body = ErrorResponse),
        (status = 404, description = "Bug or test case not found", body = ErrorResponse)
    ),
    tag = "test-cases"
)]
#[tracing::instrument(skip(state, current_user), fields(user_id = %current_user.id()))]
pub async fn delete_test_case(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path((id, test_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ServerError> {
	check_test_case_author(current_user.role())?;
	let bug = load_bug(&state, &id).await?;
	let test_id: TestCaseId = parse_id("testId", &test_id)?;

	if !state.test_case_repo.delete_test_case(&bug.id, &test_id).await? {
		return Err(ServerError::NotFound(format!("Test case {test_id} not found")));
	}

	tracing::info!(bug_id = %bug.id, test_id = %test_id, "test case deleted");
	Ok(Json(SuccessResponse {
		message: format!("Test case {test_id} deleted"),
	}))
}
