// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! End-to-end bug lifecycle across roles.

use axum::http::StatusCode;
use bugtrail_bugs_core::{Classification, StatusLabel};
use serde_json::json;

use super::support::{body_json, TestApp};

#[tokio::test]
async fn developer_files_triage_classifies_analyst_closes() {
	let app = TestApp::new().await;
	let f = &app.fixtures;

	// Developer files a bug.
	let response = app
		.post(
			"/bugs",
			Some(&f.developer),
			json!({
				"title": "Invoice PDF is blank",
				"description": "Downloading an invoice yields an empty page",
				"stepsToReproduce": "Open billing, click download"
			}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::CREATED);
	let bug = body_json(response).await;
	assert_eq!(bug["statusLabel"], "open");
	let bug_id = bug["id"].as_str().unwrap().to_string();

	// Developer may not classify.
	let response = app
		.patch(
			&format!("/bugs/{bug_id}/classify"),
			Some(&f.developer),
			json!({"classification": "approved"}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::FORBIDDEN);
	assert_eq!(app.stored_bug(&bug_id).await.classification, Classification::Unset);

	// Product manager classifies.
	let response = app
		.patch(
			&format!("/bugs/{bug_id}/classify"),
			Some(&f.product_manager),
			json!({"classification": "unapproved"}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(body_json(response).await["classification"], "unapproved");

	// Product manager may not close.
	let response = app
		.patch(&format!("/bugs/{bug_id}/close"), Some(&f.product_manager), json!({}))
		.await;
	assert_eq!(response.status(), StatusCode::FORBIDDEN);
	assert_eq!(app.stored_bug(&bug_id).await.status_label, StatusLabel::Open);

	// Business analyst closes.
	let response = app
		.patch(&format!("/bugs/{bug_id}/close"), Some(&f.business_analyst), json!({}))
		.await;
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(body_json(response).await["statusLabel"], "closed");

	let stored = app.stored_bug(&bug_id).await;
	assert_eq!(stored.status_label, StatusLabel::Closed);
	assert_eq!(stored.classification, Classification::Unapproved);
	assert!(stored.closed_at.is_some());
}

#[tokio::test]
async fn resolved_bug_can_be_closed_but_not_reopened() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let bug_id = app.create_bug(&f.developer, "Timezone shown as UTC").await;

	let response = app
		.patch(
			&format!("/bugs/{bug_id}"),
			Some(&f.developer),
			json!({"statusLabel": "resolved", "hoursWorked": 2.5}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::OK);

	let response = app
		.patch(&format!("/bugs/{bug_id}"), Some(&f.developer), json!({"statusLabel": "open"}))
		.await;
	assert_eq!(response.status(), StatusCode::CONFLICT);

	let response = app
		.patch(&format!("/bugs/{bug_id}/close"), Some(&f.business_analyst), json!({}))
		.await;
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(app.stored_bug(&bug_id).await.hours_worked, 2.5);
}
