// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Sign-up, sign-in and session lifecycle over HTTP.

use axum::{
	body::Body,
	http::{header::SET_COOKIE, Method, Request, StatusCode},
	response::Response,
};
use serde_json::json;
use tower::ServiceExt;

use super::support::{body_json, TestApp};

fn session_token(response: &Response<Body>) -> String {
	let cookie = response
		.headers()
		.get(SET_COOKIE)
		.expect("response should set a cookie")
		.to_str()
		.unwrap();
	assert!(cookie.contains("HttpOnly"));
	cookie
		.split(';')
		.next()
		.and_then(|pair| pair.strip_prefix("bugtrail_session="))
		.expect("cookie should carry the session token")
		.to_string()
}

async fn get_with_token(app: &TestApp, path: &str, token: &str) -> Response<Body> {
	let request = Request::builder()
		.method(Method::GET)
		.uri(path)
		.header("cookie", format!("bugtrail_session={token}"))
		.body(Body::empty())
		.unwrap();
	app.router.clone().oneshot(request).await.unwrap()
}

#[tokio::test]
async fn sign_up_sign_in_and_sign_out() {
	let app = TestApp::new().await;

	let response = app
		.post(
			"/auth/sign-up",
			None,
			json!({
				"email": "New.Person@Example.com",
				"displayName": "New Person",
				"password": "correct horse",
			}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::CREATED);
	let token = session_token(&response);
	let body = body_json(response).await;
	assert_eq!(body["user"]["email"], "new.person@example.com");
	assert_eq!(body["user"]["role"], "user");

	let me = get_with_token(&app, "/auth/me", &token).await;
	assert_eq!(me.status(), StatusCode::OK);
	assert_eq!(body_json(me).await["user"]["displayName"], "New Person");

	let response = app
		.post(
			"/auth/sign-in",
			None,
			json!({"email": "new.person@example.com", "password": "correct horse"}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::OK);
	let second_token = session_token(&response);
	assert_ne!(token, second_token);

	let request = Request::builder()
		.method(Method::POST)
		.uri("/auth/sign-out")
		.header("cookie", format!("bugtrail_session={second_token}"))
		.body(Body::empty())
		.unwrap();
	let response = app.router.clone().oneshot(request).await.unwrap();
	assert_eq!(response.status(), StatusCode::OK);
	let cleared = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
	assert!(cleared.contains("Max-Age=0"));

	let me = get_with_token(&app, "/auth/me", &second_token).await;
	assert_eq!(me.status(), StatusCode::UNAUTHORIZED);

	// The first session is independent of the one signed out.
	let me = get_with_token(&app, "/auth/me", &token).await;
	assert_eq!(me.status(), StatusCode::OK);
}

#[tokio::test]
async fn duplicate_email_conflicts() {
	let app = TestApp::new().await;

	let response = app
		.post(
			"/auth/sign-up",
			None,
			json!({"email": "DEV@test.com", "displayName": "Imposter", "password": "long enough"}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn sign_up_validates_fields() {
	let app = TestApp::new().await;

	let response = app
		.post(
			"/auth/sign-up",
			None,
			json!({"email": "not-an-email", "displayName": "X", "password": "long enough"}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(body_json(response).await["fields"][0]["field"], "email");

	let response = app
		.post(
			"/auth/sign-up",
			None,
			json!({"email": "a@b.com", "displayName": "X", "password": "short"}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(body_json(response).await["fields"][0]["field"], "password");
}

#[tokio::test]
async fn bad_credentials_are_rejected() {
	let app = TestApp::new().await;

	app.post(
		"/auth/sign-up",
		None,
		json!({"email": "carol@example.com", "displayName": "Carol", "password": "right password"}),
	)
	.await;

	let response = app
		.post(
			"/auth/sign-in",
			None,
			json!({"email": "carol@example.com", "password": "wrong password"}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
	assert_eq!(body_json(response).await["error"], "invalid_credentials");

	// Fixture users have no password and cannot sign in.
	let response = app
		.post("/auth/sign-in", None, json!({"email": "dev@test.com", "password": "anything at all"}))
		.await;
	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

	let response = app
		.post(
			"/auth/sign-in",
			None,
			json!({"email": "nobody@example.com", "password": "anything at all"}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn public_routes_need_no_session() {
	let app = TestApp::new().await;

	let response = app.get("/health", None).await;
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(body_json(response).await["status"], "healthy");

	let response = app.get("/api/openapi.json", None).await;
	assert_eq!(response.status(), StatusCode::OK);
	assert!(body_json(response).await["paths"]["/bugs"].is_object());
}

#[tokio::test]
async fn failed_profile_update_keeps_the_old_password() {
	let app = TestApp::new().await;

	let response = app
		.post(
			"/auth/sign-up",
			None,
			json!({"email": "pat@example.com", "displayName": "Pat", "password": "old-password-123"}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::CREATED);
	let token = session_token(&response);

	let request = Request::builder()
		.method(Method::PATCH)
		.uri("/users/me")
		.header("cookie", format!("bugtrail_session={token}"))
		.header("content-type", "application/json")
		.body(Body::from(
			json!({"email": "dev@test.com", "password": "new-password-456"}).to_string(),
		))
		.unwrap();
	let response = app.router.clone().oneshot(request).await.unwrap();
	assert_eq!(response.status(), StatusCode::CONFLICT);

	let old = app
		.post(
			"/auth/sign-in",
			None,
			json!({"email": "pat@example.com", "password": "old-password-123"}),
		)
		.await;
	assert_eq!(old.status(), StatusCode::OK);

	let new = app
		.post(
			"/auth/sign-in",
			None,
			json!({"email": "pat@example.com", "password": "new-password-456"}),
		)
		.await;
	assert_eq!(new.status(), StatusCode::UNAUTHORIZED);
}
