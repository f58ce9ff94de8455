// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Sign-up, sign-in and session handlers.
//!
//! Successful sign-up and sign-in mint a session and return the opaque token
//! only in `Set-Cookie`. The database stores the token's hash.

use axum::{
	extract::State,
	http::{header::SET_COOKIE, HeaderMap, StatusCode},
	response::IntoResponse,
	Json,
};
use bugtrail_server_api::{
	ErrorResponse, SessionUserResponse, SignInRequest, SignUpRequest, SuccessResponse,
};
use bugtrail_server_auth::{
	extract_session_cookie_with_name, generate_session_token, hash_password, hash_token,
	normalize_email, verify_password, Session, User,
};

use crate::{
	api::AppState,
	auth_middleware::RequireAuth,
	error::ServerError,
	extract::JsonBody,
	validation::{validate_display_name, validate_email, validate_password},
};

/// Create a session for `user` and return it with its `Set-Cookie` value.
async fn start_session(state: &AppState, user: &User) -> Result<(Session, String), ServerError> {
	let token = generate_session_token();
	let session = Session::new(user.id.to_string(), state.auth_config.session_ttl_chrono());
	state.session_repo.create_session(&session, &hash_token(&token)).await?;
	tracing::info!(user_id = %user.id, session_id = %session.id, "session started");
	Ok((session, state.auth_config.session_cookie(&token)))
}

#[utoipa::path(
    post,
    path = "/auth/sign-up",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Account created and signed in", body = SessionUserResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    ),
    tag = "auth"
)]
/// Register a new account with the configured default role.
#[tracing::instrument(skip(state, body))]
pub async fn sign_up(
	State(state): State<AppState>,
	JsonBody(body): JsonBody<SignUpRequest>,
) -> Result<impl IntoResponse, ServerError> {
	let email = validate_email(&body.email)?;
	let display_name = validate_display_name(&body.display_name)?;
	validate_password(&body.password)?;

	let password = body.password;
	let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
		.await
		.map_err(|e| ServerError::Internal(format!("password hashing task failed: {e}")))??;

	let user = User::new(email, display_name, state.auth_config.default_signup_role);
	state.user_repo.create_user(&user, Some(&password_hash)).await?;
	tracing::info!(user_id = %user.id, role = %user.role, "user signed up");

	let (session, cookie) = start_session(&state, &user).await?;
	Ok((
		StatusCode::CREATED,
		[(SET_COOKIE, cookie)],
		Json(SessionUserResponse {
			user: user.into(),
			expires_at: Some(session.expires_at),
		}),
	))
}

#[utoipa::path(
    post,
    path = "/auth/sign-in",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = SessionUserResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse)
    ),
    tag = "auth"
)]
/// Exchange email and password for a session cookie.
#[tracing::instrument(skip(state, body))]
pub async fn sign_in(
	State(state): State<AppState>,
	JsonBody(body): JsonBody<SignInRequest>,
) -> Result<impl IntoResponse, ServerError> {
	let credentials = state
		.user_repo
		.get_credentials_by_email(&normalize_email(&body.email))
		.await?;

	let Some((user, stored_hash)) =
		credentials.and_then(|c| c.password_hash.map(|h| (c.user, h)))
	else {
		tracing::info!("sign-in rejected: unknown email or no password set");
		return Err(ServerError::InvalidCredentials);
	};

	let password = body.password;
	let valid = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
		.await
		.map_err(|e| ServerError::Internal(format!("password verification task failed: {e}")))?;
	if !valid {
		tracing::info!(user_id = %user.id, "sign-in rejected: wrong password");
		return Err(ServerError::InvalidCredentials);
	}

	let (session, cookie) = start_session(&state, &user).await?;
	Ok((
		[(SET_COOKIE, cookie)],
		Json(SessionUserResponse {
			user: user.into(),
			expires_at: Some(session.expires_at),
		}),
	))
}

#[utoipa::path(
    post,
    path = "/auth/sign-out",
    responses(
        (status = 200, description = "Session ended", body = SuccessResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "auth"
)]
/// End the current session and clear the cookie.
#[tracing::instrument(skip(state, current_user), fields(user_id = %current_user.id()))]
pub async fn sign_out(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
) -> Result<impl IntoResponse, ServerError> {
	if let Some(session_id) = current_user.session_id {
		state.session_repo.delete_session(&session_id).await?;
	}

	Ok((
		[(SET_COOKIE, state.auth_config.clear_session_cookie())],
		Json(SuccessResponse {
			message: "Signed out".to_string(),
		}),
	))
}

#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current identity", body = SessionUserResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "auth"
)]
/// The identity behind the session cookie.
#[tracing::instrument(skip(state, headers, current_user), fields(user_id = %current_user.id()))]
pub async fn me(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<impl IntoResponse, ServerError> {
	let cookie_name = &state.auth_config.session_cookie_name;
	let expires_at = match extract_session_cookie_with_name(&headers, cookie_name) {
		Some(token) => state
			.session_repo
			.get_session_by_token_hash(&hash_token(&token))
			.await?
			.map(|s| s.expires_at),
		None => None,
	};

	Ok(Json(SessionUserResponse {
		user: current_user.user.into(),
		expires_at,
	}))
}
