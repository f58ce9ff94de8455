// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Application state and router assembly.
//!
//! Request pipeline for every authenticated route:
//!
//! ```text
//! auth_layer → require_auth_layer → RequireRole → RequirePermission → handler
//! ```

use std::sync::Arc;

use axum::{
	routing::{get, patch, post, MethodRouter},
	Router,
};
use bugtrail_server_auth::{AuthConfig, Permission, Role};
use bugtrail_server_config::ServerConfig;
use bugtrail_server_db::{
	BugRepository, BugStore, CommentRepository, CommentStore, RolePermissionRepository,
	RolePermissionStore, SessionRepository, SessionStore, TestCaseRepository, TestCaseStore,
	UserRepository, UserStore,
};
use sqlx::SqlitePool;

use crate::{
	api_docs,
	rbac_middleware::{RequirePermission, RequireRole},
	routes,
	session_resolver::SessionResolver,
	typed_router::{AuthedRouter, PublicRouter},
};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
	pub pool: SqlitePool,
	pub user_repo: Arc<dyn UserStore>,
	pub session_repo: Arc<dyn SessionStore>,
	pub role_permission_repo: Arc<dyn RolePermissionStore>,
	pub bug_repo: Arc<dyn BugStore>,
	pub comment_repo: Arc<dyn CommentStore>,
	pub test_case_repo: Arc<dyn TestCaseStore>,
	pub session_resolver: Arc<SessionResolver>,
	pub auth_config: AuthConfig,
}

/// Build the application state over an already migrated pool.
pub fn create_app_state(pool: SqlitePool, config: &ServerConfig) -> AppState {
	let user_repo: Arc<dyn UserStore> = Arc::new(UserRepository::new(pool.clone()));
	let session_repo: Arc<dyn SessionStore> = Arc::new(SessionRepository::new(pool.clone()));

	let auth_config = AuthConfig::new()
		.with_session_cookie_name(config.auth.session_cookie_name.clone())
		.with_session_ttl(config.auth.session_ttl)
		.with_secure_cookies(config.auth.secure_cookies)
		.with_default_signup_role(config.auth.default_signup_role);

	AppState {
		role_permission_repo: Arc::new(RolePermissionRepository::new(pool.clone())),
		bug_repo: Arc::new(BugRepository::new(pool.clone())),
		comment_repo: Arc::new(CommentRepository::new(pool.clone())),
		test_case_repo: Arc::new(TestCaseRepository::new(pool.clone())),
		session_resolver: Arc::new(SessionResolver::new(session_repo.clone(), user_repo.clone())),
		user_repo,
		session_repo,
		auth_config,
		pool,
	}
}

/// Apply the permission gate (inner) and the role gate (outer) to a route.
fn gated(
	route: MethodRouter<AppState>,
	role: RequireRole,
	permission: Option<Permission>,
	state: &AppState,
) -> MethodRouter<AppState> {
	let route = match permission {
		Some(permission) => {
			route.route_layer(RequirePermission::new(permission, state.role_permission_repo.clone()))
		}
		None => route,
	};
	route.route_layer(role)
}

pub fn create_router(state: AppState) -> Router {
	let public = PublicRouter::new()
		.route("/health", get(routes::health::health_check))
		.route("/api/openapi.json", get(api_docs::openapi_json))
		.route("/auth/sign-up", post(routes::auth::sign_up))
		.route("/auth/sign-in", post(routes::auth::sign_in))
		.build();

	let any = RequireRole::any;
	let s = &state;

	let authed = AuthedRouter::new()
		// Session
		.route("/auth/sign-out", post(routes::auth::sign_out))
		.route("/auth/me", get(routes::auth::me))
		// Bugs
		.route(
			"/bugs",
			gated(get(routes::bugs::list_bugs), any(), Some(Permission::CanViewData), s).merge(gated(
				post(routes::bugs::create_bug),
				any(),
				Some(Permission::CanCreateBug),
				s,
			)),
		)
		.route(
			"/bugs/{id}",
			gated(get(routes::bugs::get_bug), any(), Some(Permission::CanViewData), s).merge(gated(
				patch(routes::bugs::update_bug),
				RequireRole::one_of(Role::CONTRIBUTORS),
				Some(Permission::CanEditAnyBug),
				s,
			)),
		)
		.route(
			"/bugs/{id}/classify",
			gated(
				patch(routes::bugs::classify_bug),
				RequireRole::one_of(Role::TRIAGE),
				Some(Permission::CanClassifyAnyBug),
				s,
			),
		)
		.route(
			"/bugs/{id}/assign",
			gated(
				patch(routes::bugs::assign_bug),
				RequireRole::one_of(Role::TRIAGE),
				Some(Permission::CanReassignAnyBug),
				s,
			),
		)
		.route(
			"/bugs/{id}/close",
			gated(
				patch(routes::bugs::close_bug),
				RequireRole::exactly(Role::BusinessAnalyst),
				Some(Permission::CanCloseAnyBug),
				s,
			),
		)
		// Comments
		.route(
			"/bugs/{id}/comments",
			gated(get(routes::comments::list_comments), any(), Some(Permission::CanViewData), s)
				.merge(gated(
					post(routes::comments::create_comment),
					any(),
					Some(Permission::CanAddComment),
					s,
				)),
		)
		.route(
			"/bugs/{id}/comments/{comment_id}",
			gated(get(routes::comments::get_comment), any(), Some(Permission::CanViewData), s),
		)
		// Test cases
		.route(
			"/bugs/{id}/tests",
			gated(get(routes::test_cases::list_test_cases), any(), Some(Permission::CanViewData), s)
				.merge(gated(
					post(routes::test_cases::create_test_case),
					RequireRole::exactly(Role::QualityAnalyst),
					Some(Permission::CanAddTestCase),
					s,
				)),
		)
		.route(
			"/bugs/{id}/tests/{test_id}",
			gated(get(routes::test_cases::get_test_case), any(), Some(Permission::CanViewData), s)
				.merge(gated(
					patch(routes::test_cases::update_test_case),
					RequireRole::exactly(Role::QualityAnalyst),
					Some(Permission::CanEditTestCase),
					s,
				))
				.merge(gated(
					axum::routing::delete(routes::test_cases::delete_test_case),
					RequireRole::exactly(Role::QualityAnalyst),
					Some(Permission::CanDeleteTestCase),
					s,
				)),
		)
		// Users
		.route(
			"/users",
			gated(get(routes::users::list_users), any(), Some(Permission::CanViewData), s),
		)
		.route(
			"/users/me",
			get(routes::users::get_me).patch(routes::users::update_me),
		)
		.route(
			"/users/{id}",
			gated(get(routes::users::get_user), any(), Some(Permission::CanViewData), s)
				.merge(gated(
					patch(routes::users::admin_update_user),
					RequireRole::exactly(Role::TechnicalManager),
					None,
					s,
				))
				.merge(gated(
					axum::routing::delete(routes::users::delete_user),
					RequireRole::exactly(Role::TechnicalManager),
					None,
					s,
				)),
		)
		.build(state.clone());

	Router::new().merge(public).merge(authed).with_state(state)
}
