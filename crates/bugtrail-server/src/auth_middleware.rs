// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication middleware.
//!
//! [`auth_layer`] resolves the session cookie on every request behind it and
//! attaches an [`AuthContext`] to the request extensions. [`require_auth_layer`]
//! then turns a missing identity into a 401 before any gate or handler runs.

use axum::{
	body::Body,
	extract::{FromRequestParts, State},
	http::{request::Parts, Request},
	middleware::Next,
	response::{IntoResponse, Response},
};
use bugtrail_server_auth::{extract_session_cookie_with_name, AuthContext, CurrentUser};
use tracing::instrument;

use crate::{api::AppState, error::ServerError, session_resolver::ResolveError};

/// Resolve the session cookie and attach an [`AuthContext`].
///
/// A store failure while resolving is answered with a 500 immediately.
#[instrument(
	name = "auth_layer",
	skip(state, request, next),
	fields(user_id = tracing::field::Empty, role = tracing::field::Empty)
)]
pub async fn auth_layer(
	State(state): State<AppState>,
	mut request: Request<Body>,
	next: Next,
) -> Response {
	let token =
		extract_session_cookie_with_name(request.headers(), &state.auth_config.session_cookie_name);

	let auth_ctx = match state.session_resolver.resolve(token.as_deref()).await {
		Ok(identity) => {
			let span = tracing::Span::current();
			span.record("user_id", tracing::field::display(identity.user.id));
			span.record("role", tracing::field::display(identity.user.role));
			AuthContext::authenticated(CurrentUser::from_session(identity.user, identity.session_id))
		}
		Err(ResolveError::SessionExpired) => AuthContext::expired(),
		Err(ResolveError::Unauthenticated) => AuthContext::unauthenticated(),
		Err(ResolveError::Store(e)) => {
			tracing::error!(error = %e, "Failed to resolve session");
			return ServerError::Db(e).into_response();
		}
	};

	request.extensions_mut().insert(auth_ctx);
	next.run(request).await
}

#[instrument(name = "require_auth_layer", skip(request, next), fields(authenticated = tracing::field::Empty))]
pub async fn require_auth_layer(request: Request<Body>, next: Next) -> Response {
	let auth_ctx = request
		.extensions()
		.get::<AuthContext>()
		.cloned()
		.unwrap_or_else(AuthContext::unauthenticated);

	if let Err(failure) = auth_ctx.require_user() {
		tracing::Span::current().record("authenticated", false);
		return ServerError::from(failure).into_response();
	}

	tracing::Span::current().record("authenticated", true);
	next.run(request).await
}

/// Extractor for the authenticated caller.
///
/// # Example
///
/// ```ignore
/// async fn handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}", user.display_name())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
	S: Send + Sync,
{
	type Rejection = ServerError;

	#[instrument(name = "RequireAuth::from_request_parts", skip_all)]
	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let auth_ctx = parts
			.extensions
			.get::<AuthContext>()
			.cloned()
			.unwrap_or_else(AuthContext::unauthenticated);

		match auth_ctx.require_user() {
			Ok(user) => Ok(RequireAuth(user.clone())),
			Err(failure) => {
				tracing::debug!(?failure, "Authentication required: no valid credentials");
				Err(failure.into())
			}
		}
	}
}
