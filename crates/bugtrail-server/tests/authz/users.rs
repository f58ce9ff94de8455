// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization tests for user routes.

use axum::http::{Method, StatusCode};
use bugtrail_server_auth::Role;
use serde_json::json;

use super::support::{body_json, role_matrix, run_authz_cases, AuthzCase, TestApp};

// ============================================================================
// Profiles
// ============================================================================

#[tokio::test]
async fn every_role_can_read_profiles() {
	let app = TestApp::new().await;
	let path = format!("/users/{}", app.fixtures.developer.id());

	let mut cases = role_matrix(
		&app.fixtures,
		"get user",
		Method::GET,
		&path,
		None,
		Role::all(),
		StatusCode::OK,
	);
	cases.extend(role_matrix(
		&app.fixtures,
		"list users",
		Method::GET,
		"/users",
		None,
		Role::all(),
		StatusCode::OK),
	);
	cases.push(AuthzCase {
		name: "anonymous list",
		method: Method::GET,
		path: "/users".into(),
		user: None,
		body: None,
		expected_status: StatusCode::UNAUTHORIZED,
	});
	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn own_profile_lists_created_and_assigned_bugs() {
	let app = TestApp::new().await;
	let dev = &app.fixtures.developer;
	let created = app.create_bug(dev, "Pagination skips rows").await;
	let other = app.create_bug(&app.fixtures.end_user, "Logo blurry").await;

	app.patch(
		&format!("/bugs/{other}/assign"),
		Some(&app.fixtures.technical_manager),
		json!({"userId": dev.id()}),
	)
	.await;

	let body = body_json(app.get("/users/me", Some(dev)).await).await;
	assert_eq!(body["id"], dev.id());
	assert_eq!(body["createdBugs"], json!([created]));
	assert_eq!(body["assignedBugs"], json!([other]));
}

#[tokio::test]
async fn users_update_their_own_profile_but_not_their_role() {
	let app = TestApp::new().await;
	let user = &app.fixtures.end_user;

	let response = app
		.patch(
			"/users/me",
			Some(user),
			json!({"displayName": "Uma Updated", "role": "technical_manager"}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::OK);
	let body = body_json(response).await;
	assert_eq!(body["displayName"], "Uma Updated");
	assert_eq!(body["role"], "user");

	let response = app.patch("/users/me", Some(user), json!({"email": "DEV@test.com"})).await;
	assert_eq!(response.status(), StatusCode::CONFLICT);

	let response = app.patch("/users/me", Some(user), json!({})).await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_users_filters_by_role_and_search() {
	let app = TestApp::new().await;
	let dev = &app.fixtures.developer;

	let body = body_json(app.get("/users?role=qa", Some(dev)).await).await;
	let users = body["users"].as_array().unwrap();
	assert_eq!(users.len(), 1);
	assert_eq!(users[0]["role"], "quality_analyst");
	assert_eq!(body["total"], 1);

	let body = body_json(app.get("/users?search=terry", Some(dev)).await).await;
	assert_eq!(body["users"][0]["displayName"], "Terry Manager");

	let response = app.get("/users?role=wizard", Some(dev)).await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(body_json(response).await["fields"][0]["field"], "role");
}

#[tokio::test]
async fn list_users_total_counts_past_the_page() {
	let app = TestApp::new().await;

	let body = body_json(app.get("/users?limit=2&offset=1", Some(&app.fixtures.end_user)).await).await;
	assert_eq!(body["users"].as_array().unwrap().len(), 2);
	assert_eq!(body["total"], 6);
	assert_eq!(body["limit"], 2);
	assert_eq!(body["offset"], 1);
}

// ============================================================================
// Administration
// ============================================================================

#[tokio::test]
async fn only_technical_managers_administer_users() {
	let app = TestApp::new().await;
	let target = format!("/users/{}", app.fixtures.end_user.id());

	let cases = role_matrix(
		&app.fixtures,
		"admin update user",
		Method::PATCH,
		&target,
		Some(json!({"displayName": "Renamed"})),
		&[Role::TechnicalManager],
		StatusCode::OK,
	);
	run_authz_cases(&app, &cases).await;

	for role in Role::all().iter().copied().filter(|r| *r != Role::TechnicalManager) {
		let response = app.delete(&target, Some(app.fixtures.for_role(role))).await;
		assert_eq!(response.status(), StatusCode::FORBIDDEN, "{role} deleted a user");
	}
}

#[tokio::test]
async fn technical_manager_changes_roles() {
	let app = TestApp::new().await;
	let target = &app.fixtures.end_user;

	let response = app
		.patch(
			&format!("/users/{}", target.id()),
			Some(&app.fixtures.technical_manager),
			json!({"role": "qa"}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(body_json(response).await["role"], "quality_analyst");

	// The session now resolves to the new role.
	let bug_id = app.create_bug(&app.fixtures.developer, "Role switch").await;
	let response = app
		.post(&format!("/bugs/{bug_id}/tests"), Some(target), json!({"title": "Now allowed"}))
		.await;
	assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn deleting_a_user_ends_their_sessions() {
	let app = TestApp::new().await;
	let victim = app.fixtures.developer.clone();

	let response = app
		.delete(&format!("/users/{}", victim.id()), Some(&app.fixtures.technical_manager))
		.await;
	assert_eq!(response.status(), StatusCode::OK);

	let response = app.get("/users/me", Some(&victim)).await;
	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

	let response = app
		.delete(&format!("/users/{}", victim.id()), Some(&app.fixtures.technical_manager))
		.await;
	assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
