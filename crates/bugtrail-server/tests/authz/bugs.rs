// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization tests for bug routes.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use bugtrail_bugs_core::{BugId, Classification, StatusLabel};
use bugtrail_server::api::{create_router, AppState};
use bugtrail_server_auth::{Role, User, UserId};
use bugtrail_server_db::{BugRelation, DbError, UserCredentials, UserFilter, UserStore};
use serde_json::json;
use tower::ServiceExt;

use super::support::{body_json, build_request, role_matrix, run_authz_cases, AuthzCase, TestApp};

// ============================================================================
// Unauthenticated access
// ============================================================================

#[tokio::test]
async fn unauthenticated_requests_get_401_without_mutation() {
	let app = TestApp::new().await;
	let bug_id = app.create_bug(&app.fixtures.developer, "Login fails").await;
	let before = app.stored_bug(&bug_id).await;

	let cases = vec![
		AuthzCase {
			name: "list bugs",
			method: Method::GET,
			path: "/bugs".into(),
			user: None,
			body: None,
			expected_status: StatusCode::UNAUTHORIZED,
		},
		AuthzCase {
			name: "create bug",
			method: Method::POST,
			path: "/bugs".into(),
			user: None,
			body: Some(json!({"title": "t", "description": "d", "stepsToReproduce": "s"})),
			expected_status: StatusCode::UNAUTHORIZED,
		},
		AuthzCase {
			name: "update bug",
			method: Method::PATCH,
			path: format!("/bugs/{bug_id}"),
			user: None,
			body: Some(json!({"title": "hijacked"})),
			expected_status: StatusCode::UNAUTHORIZED,
		},
		AuthzCase {
			name: "classify bug",
			method: Method::PATCH,
			path: format!("/bugs/{bug_id}/classify"),
			user: None,
			body: Some(json!({"classification": "approved"})),
			expected_status: StatusCode::UNAUTHORIZED,
		},
		AuthzCase {
			name: "close bug",
			method: Method::PATCH,
			path: format!("/bugs/{bug_id}/close"),
			user: None,
			body: Some(json!({})),
			expected_status: StatusCode::UNAUTHORIZED,
		},
	];
	run_authz_cases(&app, &cases).await;

	let after = app.stored_bug(&bug_id).await;
	assert_eq!(before, after, "bug must not change on 401");

	let (_, total) = app
		.state
		.bug_repo
		.list_bugs(&Default::default(), 100, 0)
		.await
		.unwrap();
	assert_eq!(total, 1, "no bug may be created on 401");
}

#[tokio::test]
async fn expired_session_gets_401_without_mutation() {
	let app = TestApp::new().await;
	let bug_id = app.create_bug(&app.fixtures.developer, "Search is slow").await;
	let expired_ba = app.expired_user(Role::BusinessAnalyst).await;

	let response = app
		.patch(&format!("/bugs/{bug_id}/close"), Some(&expired_ba), json!({}))
		.await;
	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
	assert_eq!(body_json(response).await["error"], "session_expired");

	assert_eq!(app.stored_bug(&bug_id).await.status_label, StatusLabel::Open);
}

#[tokio::test]
async fn unknown_session_token_is_unauthenticated() {
	let app = TestApp::new().await;
	let mut forged = app.fixtures.developer.clone();
	forged.session_token = "0".repeat(64);

	let response = app.get("/bugs", Some(&forged)).await;
	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
	assert_eq!(body_json(response).await["error"], "unauthenticated");
}

// ============================================================================
// Role sets
// ============================================================================

#[tokio::test]
async fn every_role_can_view_and_file_bugs() {
	let app = TestApp::new().await;
	let bug_id = app.create_bug(&app.fixtures.developer, "Crash on save").await;

	let mut cases = role_matrix(
		&app.fixtures,
		"list bugs",
		Method::GET,
		"/bugs",
		None,
		Role::all(),
		StatusCode::OK,
	);
	cases.extend(role_matrix(
		&app.fixtures,
		"get bug",
		Method::GET,
		&format!("/bugs/{bug_id}"),
		None,
		Role::all(),
		StatusCode::OK,
	));
	cases.extend(role_matrix(
		&app.fixtures,
		"create bug",
		Method::POST,
		"/bugs",
		Some(json!({"title": "New", "description": "Broken", "stepsToReproduce": "Click"})),
		Role::all(),
		StatusCode::CREATED,
	));
	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn end_users_cannot_edit_bugs() {
	let app = TestApp::new().await;
	let bug_id = app.create_bug(&app.fixtures.end_user, "Typo on home page").await;

	// Even the author is refused when the role is outside the contributor set.
	let response = app
		.patch(&format!("/bugs/{bug_id}"), Some(&app.fixtures.end_user), json!({"priority": "high"}))
		.await;
	assert_eq!(response.status(), StatusCode::FORBIDDEN);
	let body = body_json(response).await;
	assert_eq!(body["error"], "forbidden");
	assert_eq!(body["actual"], "user");
}

#[tokio::test]
async fn classify_is_limited_to_triage_roles() {
	let app = TestApp::new().await;
	let bug_id = app.create_bug(&app.fixtures.developer, "Wrong totals").await;

	let cases = role_matrix(
		&app.fixtures,
		"classify bug",
		Method::PATCH,
		&format!("/bugs/{bug_id}/classify"),
		Some(json!({"classification": "approved"})),
		Role::TRIAGE,
		StatusCode::OK,
	);
	run_authz_cases(&app, &cases).await;

	assert_eq!(app.stored_bug(&bug_id).await.classification, Classification::Approved);
}

#[tokio::test]
async fn assign_is_limited_to_triage_roles() {
	let app = TestApp::new().await;
	let bug_id = app.create_bug(&app.fixtures.developer, "Export hangs").await;
	let assignee = app.fixtures.developer.id();

	let cases = role_matrix(
		&app.fixtures,
		"assign bug",
		Method::PATCH,
		&format!("/bugs/{bug_id}/assign"),
		Some(json!({"userId": assignee})),
		Role::TRIAGE,
		StatusCode::OK,
	);
	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn close_requires_business_analyst_even_with_permission() {
	let app = TestApp::new().await;
	let bug_id = app.create_bug(&app.fixtures.developer, "Flaky upload").await;

	// The technical manager holds canCloseAnyBug but is not a business analyst.
	for role in [
		Role::TechnicalManager,
		Role::ProductManager,
		Role::Developer,
		Role::QualityAnalyst,
		Role::User,
	] {
		let response = app
			.patch(&format!("/bugs/{bug_id}/close"), Some(app.fixtures.for_role(role)), json!({}))
			.await;
		assert_eq!(response.status(), StatusCode::FORBIDDEN, "{role} must not close");
	}
	assert_eq!(app.stored_bug(&bug_id).await.status_label, StatusLabel::Open);

	let response = app
		.patch(&format!("/bugs/{bug_id}/close"), Some(&app.fixtures.business_analyst), json!({}))
		.await;
	assert_eq!(response.status(), StatusCode::OK);
	let body = body_json(response).await;
	assert_eq!(body["statusLabel"], "closed");
	assert!(body["closedAt"].is_string());
}

// ============================================================================
// Lifecycle rules behind the gates
// ============================================================================

#[tokio::test]
async fn new_bugs_are_open_and_recorded_as_created() {
	let app = TestApp::new().await;
	let author = &app.fixtures.quality_analyst;
	let bug_id = app.create_bug(author, "Menu overlaps").await;

	let body = body_json(app.get(&format!("/bugs/{bug_id}"), Some(author)).await).await;
	assert_eq!(body["statusLabel"], "open");
	assert_eq!(body["classification"], "unset");
	assert_eq!(body["authorId"], author.id());

	let created = app
		.state
		.user_repo
		.list_bug_ids(&author.user.id, BugRelation::Created)
		.await
		.unwrap();
	assert_eq!(created.len(), 1);
	assert_eq!(created[0].to_string(), bug_id);
}

#[tokio::test]
async fn assigning_twice_leaves_one_entry() {
	let app = TestApp::new().await;
	let bug_id = app.create_bug(&app.fixtures.developer, "Memory leak").await;
	let assignee = &app.fixtures.quality_analyst;

	for _ in 0..2 {
		let response = app
			.patch(
				&format!("/bugs/{bug_id}/assign"),
				Some(&app.fixtures.product_manager),
				json!({"userId": assignee.id()}),
			)
			.await;
		assert_eq!(response.status(), StatusCode::OK);
	}

	let assigned = app
		.state
		.user_repo
		.list_bug_ids(&assignee.user.id, BugRelation::Assigned)
		.await
		.unwrap();
	assert_eq!(assigned.len(), 1);

	let bug = app.stored_bug(&bug_id).await;
	assert_eq!(bug.assigned_user_id, Some(assignee.user.id));
	assert_eq!(bug.assigned_user_name.as_deref(), Some("Quinn Tester"));
}

#[tokio::test]
async fn assigning_unknown_user_is_not_found() {
	let app = TestApp::new().await;
	let bug_id = app.create_bug(&app.fixtures.developer, "Broken link").await;

	let response = app
		.patch(
			&format!("/bugs/{bug_id}/assign"),
			Some(&app.fixtures.product_manager),
			json!({"userId": uuid::Uuid::new_v4().to_string()}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::NOT_FOUND);
	assert!(app.stored_bug(&bug_id).await.assigned_user_id.is_none());
}

#[tokio::test]
async fn free_text_edits_are_limited_to_author_and_assignee() {
	let app = TestApp::new().await;
	let bug_id = app.create_bug(&app.fixtures.developer, "Button misaligned").await;
	let path = format!("/bugs/{bug_id}");

	let response = app
		.patch(&path, Some(&app.fixtures.quality_analyst), json!({"title": "Rewritten"}))
		.await;
	assert_eq!(response.status(), StatusCode::FORBIDDEN);
	let body = body_json(response).await;
	assert_eq!(body["required"], json!(["owner"]));
	assert_eq!(body["actual"], "quality_analyst");

	// Non-owners may still change the status.
	let response = app
		.patch(&path, Some(&app.fixtures.quality_analyst), json!({"statusLabel": "resolved"}))
		.await;
	assert_eq!(response.status(), StatusCode::OK);

	let response = app
		.patch(&path, Some(&app.fixtures.developer), json!({"title": "Button misaligned on mobile"}))
		.await;
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(body_json(response).await["title"], "Button misaligned on mobile");
}

#[tokio::test]
async fn reviewing_business_analyst_may_only_resolve() {
	let app = TestApp::new().await;
	let bug_id = app.create_bug(&app.fixtures.developer, "Slow search").await;
	let path = format!("/bugs/{bug_id}");
	let ba = &app.fixtures.business_analyst;

	let response = app.patch(&path, Some(ba), json!({"priority": "high"})).await;
	assert_eq!(response.status(), StatusCode::FORBIDDEN);
	assert_eq!(body_json(response).await["actual"], "business_analyst");

	let response = app.patch(&path, Some(ba), json!({"statusLabel": "resolved"})).await;
	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn closed_bugs_reject_further_changes() {
	let app = TestApp::new().await;
	let bug_id = app.create_bug(&app.fixtures.developer, "Stale cache").await;
	let ba = &app.fixtures.business_analyst;

	let response = app.patch(&format!("/bugs/{bug_id}/close"), Some(ba), json!({})).await;
	assert_eq!(response.status(), StatusCode::OK);

	let response = app.patch(&format!("/bugs/{bug_id}/close"), Some(ba), json!({})).await;
	assert_eq!(response.status(), StatusCode::CONFLICT);

	let response = app
		.patch(
			&format!("/bugs/{bug_id}"),
			Some(&app.fixtures.developer),
			json!({"statusLabel": "open"}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::CONFLICT);

	let response = app
		.patch(
			&format!("/bugs/{bug_id}/classify"),
			Some(&app.fixtures.product_manager),
			json!({"classification": "duplicate"}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn status_cannot_be_set_to_closed_through_update() {
	let app = TestApp::new().await;
	let bug_id = app.create_bug(&app.fixtures.developer, "Bad redirect").await;

	let response = app
		.patch(
			&format!("/bugs/{bug_id}"),
			Some(&app.fixtures.developer),
			json!({"statusLabel": "closed"}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(body_json(response).await["fields"][0]["field"], "statusLabel");
}

// ============================================================================
// Input errors
// ============================================================================

#[tokio::test]
async fn malformed_ids_and_bodies_are_validation_errors() {
	let app = TestApp::new().await;
	let dev = &app.fixtures.developer;

	let response = app.get("/bugs/not-a-uuid", Some(dev)).await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(body_json(response).await["fields"][0]["field"], "id");

	let response = app.post("/bugs", Some(dev), json!({"title": "missing fields"})).await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(body_json(response).await["fields"][0]["field"], "body");

	let response = app.get(&format!("/bugs/{}", uuid::Uuid::new_v4()), Some(dev)).await;
	assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_filters_and_paginates() {
	let app = TestApp::new().await;
	let dev = &app.fixtures.developer;
	for title in ["Login crash", "Logout crash", "Slow login"] {
		app.create_bug(dev, title).await;
	}

	let body = body_json(app.get("/bugs?keywords=login%20crash", Some(dev)).await).await;
	assert_eq!(body["total"], 1);
	assert_eq!(body["bugs"][0]["title"], "Login crash");

	let body = body_json(app.get("/bugs?sortBy=title&limit=2", Some(dev)).await).await;
	assert_eq!(body["total"], 3);
	assert_eq!(body["limit"], 2);
	assert_eq!(body["bugs"].as_array().unwrap().len(), 2);
	assert_eq!(body["bugs"][0]["title"], "Login crash");

	let response = app.get("/bugs?sortBy=priority", Some(dev)).await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);

	let body = body_json(app.get("/bugs?closed=true", Some(dev)).await).await;
	assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn ages_out_of_range_are_rejected() {
	let app = TestApp::new().await;
	let dev = &app.fixtures.developer;
	app.create_bug(dev, "Old report").await;

	let response = app.get("/bugs?minAge=4000000000", Some(dev)).await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(body_json(response).await["fields"][0]["field"], "minAge");

	let response = app.get("/bugs?maxAge=4000000000", Some(dev)).await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(body_json(response).await["fields"][0]["field"], "maxAge");
}

// ============================================================================
// Assignment with a failing relation write
// ============================================================================

/// Delegates to the real store but refuses to record bug relations.
struct RelationWritesFail(Arc<dyn UserStore>);

#[async_trait]
impl UserStore for RelationWritesFail {
	async fn create_user(&self, user: &User, password_hash: Option<&str>) -> Result<(), DbError> {
		self.0.create_user(user, password_hash).await
	}

	async fn get_user_by_id(&self, id: &UserId) -> Result<Option<User>, DbError> {
		self.0.get_user_by_id(id).await
	}

	async fn get_user_by_external_id(&self, external_id: &str) -> Result<Option<User>, DbError> {
		self.0.get_user_by_external_id(external_id).await
	}

	async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
		self.0.get_user_by_email(email).await
	}

	async fn get_credentials_by_email(
		&self,
		email: &str,
	) -> Result<Option<UserCredentials>, DbError> {
		self.0.get_credentials_by_email(email).await
	}

	async fn list_users(
		&self,
		filter: &UserFilter,
		limit: i32,
		offset: i32,
	) -> Result<(Vec<User>, i64), DbError> {
		self.0.list_users(filter, limit, offset).await
	}

	async fn update_user(&self, user: &User) -> Result<(), DbError> {
		self.0.update_user(user).await
	}

	async fn update_profile(&self, user: &User, password_hash: Option<&str>) -> Result<(), DbError> {
		self.0.update_profile(user, password_hash).await
	}

	async fn delete_user(&self, id: &UserId) -> Result<bool, DbError> {
		self.0.delete_user(id).await
	}

	async fn add_bug_relation(
		&self,
		_user_id: &UserId,
		_bug_id: &BugId,
		_relation: BugRelation,
	) -> Result<bool, DbError> {
		Err(DbError::Internal("relation table unavailable".into()))
	}

	async fn list_bug_ids(
		&self,
		user_id: &UserId,
		relation: BugRelation,
	) -> Result<Vec<BugId>, DbError> {
		self.0.list_bug_ids(user_id, relation).await
	}
}

#[tokio::test]
async fn assignment_survives_a_failed_relation_write() {
	let app = TestApp::new().await;
	let bug_id = app.create_bug(&app.fixtures.developer, "Flaky upload").await;
	let assignee = &app.fixtures.quality_analyst;

	let state = AppState {
		user_repo: Arc::new(RelationWritesFail(app.state.user_repo.clone())),
		..app.state.clone()
	};
	let request = build_request(
		Method::PATCH,
		&format!("/bugs/{bug_id}/assign"),
		Some(&app.fixtures.product_manager),
		Some(json!({"userId": assignee.id()})),
	);
	let response = create_router(state).oneshot(request).await.unwrap();
	assert_eq!(response.status(), StatusCode::OK);
	let body = body_json(response).await;
	assert_eq!(body["assignedUserId"], assignee.id());
	assert_eq!(body["assignedUserName"], "Quinn Tester");

	let bug = app.stored_bug(&bug_id).await;
	assert_eq!(bug.assigned_user_id, Some(assignee.user.id));
	assert_eq!(bug.assigned_user_name.as_deref(), Some("Quinn Tester"));

	let assigned = app
		.state
		.user_repo
		.list_bug_ids(&assignee.user.id, BugRelation::Assigned)
		.await
		.unwrap();
	assert!(assigned.is_empty());
}
