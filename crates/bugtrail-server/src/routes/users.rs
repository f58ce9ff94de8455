// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User profile and administration handlers.

use axum::{
	extract::{Path, State},
	response::IntoResponse,
	Json,
};
use bugtrail_server_api::{
	AdminUpdateUserRequest, ErrorResponse, ListUsersParams, ListUsersResponse, SuccessResponse,
	UpdateProfileRequest, UserDetailResponse, UserResponse,
};
use bugtrail_server_auth::{hash_password, Role, User, UserId};
use bugtrail_server_db::{BugRelation, UserFilter};

use crate::{
	api::AppState,
	auth_middleware::RequireAuth,
	error::ServerError,
	extract::{JsonBody, QueryParams},
	pagination::PaginationParams,
	validation::{parse_id, parse_value, validate_display_name, validate_email, validate_password},
};

async fn user_detail(state: &AppState, user: User) -> Result<UserDetailResponse, ServerError> {
	let assigned = state.user_repo.list_bug_ids(&user.id, BugRelation::Assigned).await?;
	let created = state.user_repo.list_bug_ids(&user.id, BugRelation::Created).await?;
	Ok(UserDetailResponse {
		user: user.into(),
		assigned_bugs: assigned.iter().map(ToString::to_string).collect(),
		created_bugs: created.iter().map(ToString::to_string).collect(),
	})
}

async fn load_user(state: &AppState, raw_id: &str) -> Result<User, ServerError> {
	let user_id: UserId = parse_id("id", raw_id)?;
	state
		.user_repo
		.get_user_by_id(&user_id)
		.await?
		.ok_or_else(|| ServerError::NotFound(format!("User {user_id} not found")))
}

#[utoipa::path(
    get,
    path = "/users",
    params(ListUsersParams),
    responses(
        (status = 200, description = "Users matching the filter", body = ListUsersResponse),
        (status = 400, description = "Unknown role filter", body = ErrorResponse),
        (status = 403, description = "Missing canViewData", body = ErrorResponse)
    ),
    tag = "users"
)]
/// List users, optionally filtered by a search term and role.
#[tracing::instrument(skip(state, current_user, params), fields(user_id = %current_user.id()))]
pub async fn list_users(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	QueryParams(params): QueryParams<ListUsersParams>,
) -> Result<impl IntoResponse, ServerError> {
	let filter = UserFilter {
		search: params.search.filter(|s| !s.trim().is_empty()),
		role: params.role.as_deref().map(|r| parse_value::<Role>("role", r)).transpose()?,
	};
	let (limit, offset) = PaginationParams::new(params.limit, params.offset).resolve();

	let (users, total) = state.user_repo.list_users(&filter, limit as i32, offset as i32).await?;
	tracing::debug!(count = users.len(), total, "listed users");

	Ok(Json(ListUsersResponse {
		users: users.into_iter().map(UserResponse::from).collect(),
		total,
		limit,
		offset,
	}))
}

#[utoipa::path(
    get,
    path = "/users/me",
    responses(
        (status = 200, description = "Own profile with bug sets", body = UserDetailResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn get_me(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
) -> Result<impl IntoResponse, ServerError> {
	Ok(Json(user_detail(&state, current_user.user).await?))
}

#[utoipa::path(
    patch,
    path = "/users/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 409, description = "Email already in use", body = ErrorResponse)
    ),
    tag = "users"
)]
/// Update the caller's own display name, email or password. The role cannot
/// be changed here.
#[tracing::instrument(skip(state, current_user, body), fields(user_id = %current_user.id()))]
pub async fn update_me(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	JsonBody(body): JsonBody<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ServerError> {
	if body.display_name.is_none() && body.email.is_none() && body.password.is_none() {
		return Err(ServerError::validation("body", "no fields to update"));
	}

	let mut user = current_user.user;
	if let Some(name) = body.display_name.as_deref() {
		user.display_name = validate_display_name(name)?;
	}
	if let Some(email) = body.email.as_deref() {
		user.email = validate_email(email)?;
	}
	let password_hash = match body.password {
		Some(password) => {
			validate_password(&password)?;
			let hash = tokio::task::spawn_blocking(move || hash_password(&password))
				.await
				.map_err(|e| ServerError::Internal(format!("password hashing task failed: {e}")))??;
			Some(hash)
		}
		None => None,
	};

	state.user_repo.update_profile(&user, password_hash.as_deref()).await?;
	tracing::info!(user_id = %user.id, "profile updated");

	let updated = state.user_repo.get_user_by_id(&user.id).await?.unwrap_or(user);
	Ok(Json(UserResponse::from(updated)))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User with bug sets", body = UserDetailResponse),
        (status = 400, description = "Invalid user ID", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "users"
)]
#[tracing::instrument(skip(state, _current_user))]
pub async fn get_user(
	RequireAuth(_current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
	let user = load_user(&state, &id).await?;
	Ok(Json(user_detail(&state, user).await?))
}

#[utoipa::path(
    patch,
    path = "/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    request_body = AdminUpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 403, description = "Technical managers only", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "users"
)]
/// Administrative update, including the user's role.
#[tracing::instrument(skip(state, current_user, body), fields(admin_id = %current_user.id()))]
pub async fn admin_update_user(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
	JsonBody(body): JsonBody<AdminUpdateUserRequest>,
) -> Result<impl IntoResponse, ServerError> {
	let mut user = load_user(&state, &id).await?;
	if body.display_name.is_none() && body.email.is_none() && body.role.is_none() {
		return Err(ServerError::validation("body", "no fields to update"));
	}

	if let Some(name) = body.display_name.as_deref() {
		user.display_name = validate_display_name(name)?;
	}
	if let Some(email) = body.email.as_deref() {
		user.email = validate_email(email)?;
	}
	if let Some(role) = body.role {
		if role != user.role {
			tracing::info!(user_id = %user.id, from = %user.role, to = %role, "role changed");
		}
		user.role = role;
	}

	state.user_repo.update_user(&user).await?;
	let updated = state.user_repo.get_user_by_id(&user.id).await?.unwrap_or(user);
	Ok(Json(UserResponse::from(updated)))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User and sessions deleted", body = SuccessResponse),
        (status = 403, description = "Technical managers only", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "users"
)]
/// Delete a user together with every session referring to them.
#[tracing::instrument(skip(state, current_user), fields(admin_id = %current_user.id()))]
pub async fn delete_user(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
	let user_id: UserId = parse_id("id", &id)?;
	if !state.user_repo.delete_user(&user_id).await? {
		return Err(ServerError::NotFound(format!("User {user_id} not found")));
	}

	tracing::info!(user_id = %user_id, "user deleted");
	Ok(Json(SuccessResponse {
		message: format!("User {user_id} deleted"),
	}))
}
