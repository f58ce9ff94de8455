// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Route-level role and permission gates.
//!
//! # Architecture
//!
//! Every protected route declares two independent requirements:
//!
//! 1. [`RequireRole`] - the caller's role must satisfy a [`RoleRequirement`]
//! 2. [`RequirePermission`] - the caller's role must hold a [`Permission`] in
//!    the role permission table
//!
//! Both run after the auth middleware has attached an [`AuthContext`]. The role
//! gate is the outer layer; the permission gate only runs once the role check
//! passed, and the handler only runs once both passed.
//!
//! # Security Properties
//!
//! - No identity is a 401, whatever the route requires
//! - A denial is a 403 echoing `required` and `actual`
//! - A failed permission lookup is a 500, never an allow
//! - Decisions are logged with user id and role, never tokens
//!
//! # Example
//!
//! ```ignore
//! use bugtrail_server::rbac_middleware::{RequirePermission, RequireRole};
//!
//! Router::new().route(
//!     "/bugs/{id}/close",
//!     patch(close_bug)
//!         .route_layer(RequirePermission::new(Permission::CanCloseAnyBug, store))
//!         .route_layer(RequireRole::exactly(Role::BusinessAnalyst)),
//! );
//! ```

use std::{
	future::Future,
	pin::Pin,
	sync::Arc,
	task::{Context, Poll},
};

use axum::{
	body::Body,
	http::Request,
	response::{IntoResponse, Response},
};
use bugtrail_server_auth::{
	check_permission, AuthContext, CurrentUser, Permission, Role, RoleRequirement,
};
use bugtrail_server_db::RolePermissionStore;
use futures::future::BoxFuture;
use pin_project_lite::pin_project;
use tower::{Layer, Service};

use crate::error::ServerError;

fn current_user(req: &Request<Body>) -> Result<CurrentUser, ServerError> {
	let auth_ctx = req
		.extensions()
		.get::<AuthContext>()
		.cloned()
		.unwrap_or_else(AuthContext::unauthenticated);

	match auth_ctx.require_user() {
		Ok(user) => Ok(user.clone()),
		Err(failure) => Err(failure.into()),
	}
}

// =============================================================================
// Role gate
// =============================================================================

/// Route layer checking the caller's role against a [`RoleRequirement`].
#[derive(Clone)]
pub struct RequireRole {
	requirement: RoleRequirement,
}

impl RequireRole {
	pub fn new(requirement: RoleRequirement) -> Self {
		Self { requirement }
	}

	/// Caller's role must be one of `roles`.
	pub fn one_of(roles: &'static [Role]) -> Self {
		Self::new(RoleRequirement::OneOf(roles))
	}

	/// Caller's role must be exactly `role`.
	pub fn exactly(role: Role) -> Self {
		Self::new(RoleRequirement::Exactly(role))
	}

	/// Any authenticated caller with a role.
	pub fn any() -> Self {
		Self::one_of(Role::all())
	}
}

impl<S> Layer<S> for RequireRole {
	type Service = RequireRoleService<S>;

	fn layer(&self, inner: S) -> Self::Service {
		RequireRoleService {
			inner,
			requirement: self.requirement,
		}
	}
}

/// Service wrapper for [`RequireRole`] layer.
#[derive(Clone)]
pub struct RequireRoleService<S> {
	inner: S,
	requirement: RoleRequirement,
}

impl<S> Service<Request<Body>> for RequireRoleService<S>
where
	S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
	S::Future: Send,
{
	type Response = Response;
	type Error = S::Error;
	type Future = RequireRoleFuture<S::Future>;

	fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		self.inner.poll_ready(cx)
	}

	fn call(&mut self, req: Request<Body>) -> Self::Future {
		let current_user = match current_user(&req) {
			Ok(user) => user,
			Err(rejection) => {
				tracing::debug!(requirement = %self.requirement, "Role check denied: not authenticated");
				return RequireRoleFuture::Rejected {
					resp: Some(rejection.into_response()),
				};
			}
		};

		if let Err(denial) = self.requirement.check(Some(current_user.role())) {
			tracing::info!(
				user_id = %current_user.id(),
				role = %current_user.role(),
				requirement = %self.requirement,
				"Role check denied"
			);
			return RequireRoleFuture::Rejected {
				resp: Some(ServerError::role_denied(&denial).into_response()),
			};
		}

		tracing::debug!(
			user_id = %current_user.id(),
			role = %current_user.role(),
			"Role check passed"
		);

		RequireRoleFuture::Inner {
			fut: self.inner.call(req),
		}
	}
}

pin_project! {
	/// Future for [`RequireRoleService`].
	#[project = RequireRoleFutureProj]
	pub enum RequireRoleFuture<F> {
		Inner { #[pin] fut: F },
		Rejected { resp: Option<Response> },
	}
}

impl<F, E> Future for RequireRoleFuture<F>
where
	F: Future<Output = Result<Response, E>>,
{
	type Output = Result<Response, E>;

	fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		match self.project() {
			RequireRoleFutureProj::Inner { fut } => fut.poll(cx),
			RequireRoleFutureProj::Rejected { resp } => {
				Poll::Ready(Ok(resp.take().expect("polled after completion")))
			}
		}
	}
}

// =============================================================================
// Permission gate
// =============================================================================

/// Route layer checking a named permission in the role permission table.
///
/// The lookup is asynchronous, so unlike [`RequireRole`] the future is boxed.
#[derive(Clone)]
pub struct RequirePermission {
	permission: Permission,
	store: Arc<dyn RolePermissionStore>,
}

impl RequirePermission {
	pub fn new(permission: Permission, store: Arc<dyn RolePermissionStore>) -> Self {
		Self { permission, store }
	}
}

impl<S> Layer<S> for RequirePermission {
	type Service = RequirePermissionService<S>;

	fn layer(&self, inner: S) -> Self::Service {
		RequirePermissionService {
			inner,
			permission: self.permission,
			store: self.store.clone(),
		}
	}
}

/// Service wrapper for [`RequirePermission`] layer.
#[derive(Clone)]
pub struct RequirePermissionService<S> {
	inner: S,
	permission: Permission,
	store: Arc<dyn RolePermissionStore>,
}

impl<S> Service<Request<Body>> for RequirePermissionService<S>
where
	S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
	S::Future: Send + 'static,
	S::Error: Send + 'static,
{
	type Response = Response;
	type Error = S::Error;
	type Future = BoxFuture<'static, Result<Response, S::Error>>;

	fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		self.inner.poll_ready(cx)
	}

	fn call(&mut self, req: Request<Body>) -> Self::Future {
		// The readied service must handle this request; leave a fresh clone behind.
		let clone = self.inner.clone();
		let mut inner = std::mem::replace(&mut self.inner, clone);
		let permission = self.permission;
		let store = self.store.clone();

		Box::pin(async move {
			let current_user = match current_user(&req) {
				Ok(user) => user,
				Err(rejection) => {
					tracing::debug!(%permission, "Permission check denied: not authenticated");
					return Ok(rejection.into_response());
				}
			};
			let role = current_user.role();

			let record = match store.get_permissions_for_role(role).await {
				Ok(record) => record,
				Err(e) => {
					tracing::error!(error = %e, %role, %permission, "Failed to load role permissions");
					return Ok(ServerError::Db(e).into_response());
				}
			};

			if let Err(denial) = check_permission(record.as_ref(), permission, role) {
				tracing::info!(
					user_id = %current_user.id(),
					%role,
					%permission,
					reason = ?denial.reason,
					"Permission check denied"
				);
				return Ok(ServerError::permission_denied(&denial).into_response());
			}

			tracing::debug!(user_id = %current_user.id(), %role, %permission, "Permission check passed");
			inner.call(req).await
		})
	}
}
