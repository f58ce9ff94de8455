// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization tests for test case routes.

use axum::{
	http::{Method, StatusCode},
	middleware::{from_fn, from_fn_with_state},
	routing::{patch, post},
	Router,
};
use bugtrail_bugs_core::{lifecycle::new_test_case, Actor, TestCaseDraft};
use bugtrail_server::{
	auth_middleware::{auth_layer, require_auth_layer},
	routes::test_cases,
};
use bugtrail_server_auth::Role;
use serde_json::json;
use tower::ServiceExt;

use super::support::{body_json, build_request, role_matrix, run_authz_cases, TestApp};

#[tokio::test]
async fn only_quality_analysts_manage_test_cases_through_routes() {
	let app = TestApp::new().await;
	let bug_id = app.create_bug(&app.fixtures.developer, "Checkout fails").await;
	let qa = &app.fixtures.quality_analyst;

	let cases = role_matrix(
		&app.fixtures,
		"create test case",
		Method::POST,
		&format!("/bugs/{bug_id}/tests"),
		Some(json!({"title": "Pay with saved card"})),
		&[Role::QualityAnalyst],
		StatusCode::CREATED,
	);
	run_authz_cases(&app, &cases).await;

	let response = app
		.post(&format!("/bugs/{bug_id}/tests"), Some(qa), json!({"title": "Pay with new card"}))
		.await;
	let test_id = body_json(response).await["id"].as_str().unwrap().to_string();
	let path = format!("/bugs/{bug_id}/tests/{test_id}");

	let mut cases = role_matrix(
		&app.fixtures,
		"update test case",
		Method::PATCH,
		&path,
		Some(json!({"status": "passed"})),
		&[Role::QualityAnalyst],
		StatusCode::OK,
	);
	cases.extend(role_matrix(
		&app.fixtures,
		"read test case",
		Method::GET,
		&path,
		None,
		Role::all(),
		StatusCode::OK),
	);
	run_authz_cases(&app, &cases).await;

	// The technical manager holds every test case permission and is still refused.
	let response = app.delete(&path, Some(&app.fixtures.technical_manager)).await;
	assert_eq!(response.status(), StatusCode::FORBIDDEN);

	let response = app.delete(&path, Some(qa)).await;
	assert_eq!(response.status(), StatusCode::OK);
	let response = app.get(&path, Some(qa)).await;
	assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn new_test_cases_default_to_pending_and_list_under_their_bug() {
	let app = TestApp::new().await;
	let bug_id = app.create_bug(&app.fixtures.developer, "Coupon ignored").await;
	let qa = &app.fixtures.quality_analyst;

	let response = app
		.post(
			&format!("/bugs/{bug_id}/tests"),
			Some(qa),
			json!({"title": "Apply coupon at checkout", "description": "Use SAVE10"}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::CREATED);
	let created = body_json(response).await;
	assert_eq!(created["status"], "pending");
	assert_eq!(created["authorName"], "Quinn Tester");

	let response = app.get(&format!("/bugs/{bug_id}/tests"), Some(&app.fixtures.end_user)).await;
	let body = body_json(response).await;
	assert_eq!(body["testCases"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn deleting_unknown_test_case_is_not_found() {
	let app = TestApp::new().await;
	let bug_id = app.create_bug(&app.fixtures.developer, "Avatar upload").await;

	let response = app
		.delete(
			&format!("/bugs/{bug_id}/tests/{}", uuid::Uuid::new_v4()),
			Some(&app.fixtures.quality_analyst),
		)
		.await;
	assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Handlers mounted without any role or permission gate, as a misconfigured
/// router would.
fn ungated_router(app: &TestApp) -> Router {
	Router::new()
		.route("/bugs/{id}/tests", post(test_cases::create_test_case))
		.route(
			"/bugs/{id}/tests/{test_id}",
			patch(test_cases::update_test_case).delete(test_cases::delete_test_case),
		)
		.layer(from_fn(require_auth_layer))
		.layer(from_fn_with_state(app.state.clone(), auth_layer))
		.with_state(app.state.clone())
}

#[tokio::test]
async fn handlers_refuse_non_quality_analysts_without_gates() {
	let app = TestApp::new().await;
	let router = ungated_router(&app);
	let bug_id = app.create_bug(&app.fixtures.developer, "Cart total").await;
	let bug = app.stored_bug(&bug_id).await;

	let qa = &app.fixtures.quality_analyst.user;
	let existing = new_test_case(
		&bug,
		&Actor::new(qa.id, qa.role, qa.display_name.clone()),
		TestCaseDraft {
			title: "Add two items".into(),
			description: None,
			status: None,
		},
	)
	.unwrap();
	app.state.test_case_repo.create_test_case(&existing).await.unwrap();
	let item_path = format!("/bugs/{bug_id}/tests/{}", existing.id);

	for role in Role::all().iter().copied().filter(|r| *r != Role::QualityAnalyst) {
		let user = app.fixtures.for_role(role);

		let request = build_request(
			Method::POST,
			&format!("/bugs/{bug_id}/tests"),
			Some(user),
			Some(json!({"title": "sneaky"})),
		);
		let response = router.clone().oneshot(request).await.unwrap();
		assert_eq!(response.status(), StatusCode::FORBIDDEN, "{role} created a test case");
		let body = body_json(response).await;
		assert_eq!(body["required"][0], "quality_analyst");
		assert_eq!(body["actual"], role.to_string());

		let body = json!({"status": "failed"});
		let request = build_request(Method::PATCH, &item_path, Some(user), Some(body));
		let response = router.clone().oneshot(request).await.unwrap();
		assert_eq!(response.status(), StatusCode::FORBIDDEN, "{role} updated a test case");
		assert_eq!(body_json(response).await["actual"], role.to_string());

		let request = build_request(Method::DELETE, &item_path, Some(user), Option::<()>::None);
		let response = router.clone().oneshot(request).await.unwrap();
		assert_eq!(response.status(), StatusCode::FORBIDDEN, "{role} deleted a test case");
		assert_eq!(body_json(response).await["actual"], role.to_string());
	}

	let remaining = app.state.test_case_repo.list_test_cases(&bug.id).await.unwrap();
	assert_eq!(remaining.len(), 1);
	assert_eq!(remaining[0].id, existing.id);
	assert_eq!(remaining[0].status, existing.status);

	let request = build_request(
		Method::PATCH,
		&item_path,
		Some(&app.fixtures.quality_analyst),
		Some(json!({"status": "passed"})),
	);
	let response = router.oneshot(request).await.unwrap();
	assert_eq!(response.status(), StatusCode::OK);
}
