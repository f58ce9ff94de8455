// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::{
	body::Body,
	http::{header::HeaderName, header::HeaderValue, Method, Request, StatusCode},
	response::Response,
	Router,
};
use bugtrail_server_auth::{generate_session_token, hash_token, Role, Session, User};
use serde::Serialize;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use bugtrail_server::{
	api::{create_app_state, create_router, AppState},
	ServerConfig,
};

#[derive(Clone)]
pub struct TestUser {
	pub user: User,
	pub session_token: String,
}

impl TestUser {
	pub fn auth_header(&self) -> (HeaderName, HeaderValue) {
		(
			HeaderName::from_static("cookie"),
			HeaderValue::from_str(&format!("bugtrail_session={}", self.session_token)).unwrap(),
		)
	}

	pub fn id(&self) -> String {
		self.user.id.to_string()
	}
}

/// One signed-in user per role.
#[derive(Clone)]
pub struct Fixtures {
	pub developer: TestUser,
	pub business_analyst: TestUser,
	pub quality_analyst: TestUser,
	pub product_manager: TestUser,
	pub technical_manager: TestUser,
	pub end_user: TestUser,
}

impl Fixtures {
	pub fn for_role(&self, role: Role) -> &TestUser {
		match role {
			Role::Developer => &self.developer,
			Role::BusinessAnalyst => &self.business_analyst,
			Role::QualityAnalyst => &self.quality_analyst,
			Role::ProductManager => &self.product_manager,
			Role::TechnicalManager => &self.technical_manager,
			Role::User => &self.end_user,
		}
	}
}

pub struct TestApp {
	pub router: Router,
	pub fixtures: Fixtures,
	pub state: AppState,
	_temp_dir: TempDir,
}

impl TestApp {
	pub async fn new() -> Self {
		let temp_dir = tempfile::tempdir().unwrap();
		let db_path = temp_dir.path().join("test_authz.db");
		let db_url = format!("sqlite:{}?mode=rwc", db_path.display());
		let pool = bugtrail_server_db::create_pool(&db_url, 5).await.unwrap();
		bugtrail_server::db::run_migrations(&pool).await.unwrap();

		let config = ServerConfig::default();
		let state = create_app_state(pool, &config);
		let fixtures = create_fixtures(&state).await;
		let router = create_router(state.clone());

		Self {
			router,
			fixtures,
			state,
			_temp_dir: temp_dir,
		}
	}

	pub async fn get(&self, path: &str, user: Option<&TestUser>) -> Response<Body> {
		self.request(Method::GET, path, user, Option::<()>::None).await
	}

	pub async fn post(
		&self,
		path: &str,
		user: Option<&TestUser>,
		body: impl Serialize,
	) -> Response<Body> {
		self.request(Method::POST, path, user, Some(body)).await
	}

	pub async fn patch(
		&self,
		path: &str,
		user: Option<&TestUser>,
		body: impl Serialize,
	) -> Response<Body> {
		self.request(Method::PATCH, path, user, Some(body)).await
	}

	pub async fn delete(&self, path: &str, user: Option<&TestUser>) -> Response<Body> {
		self.request(Method::DELETE, path, user, Option::<()>::None).await
	}

	async fn request<T: Serialize>(
		&self,
		method: Method,
		path: &str,
		user: Option<&TestUser>,
		body: Option<T>,
	) -> Response<Body> {
		let request = build_request(method, path, user, body);
		self.router.clone().oneshot(request).await.unwrap()
	}

	/// Create a bug as `author` and return its id.
	pub async fn create_bug(&self, author: &TestUser, title: &str) -> String {
		let response = self
			.post(
				"/bugs",
				Some(author),
				json!({
					"title": title,
					"description": format!("{title} happens every time"),
					"stepsToReproduce": "Open the page"
				}),
			)
			.await;
		assert_eq!(response.status(), StatusCode::CREATED, "fixture bug creation failed");
		body_json(response).await["id"].as_str().unwrap().to_string()
	}

	/// Read a bug straight from the store, bypassing HTTP.
	pub async fn stored_bug(&self, id: &str) -> bugtrail_bugs_core::Bug {
		self.state
			.bug_repo
			.get_bug(&id.parse().unwrap())
			.await
			.unwrap()
			.expect("bug should exist")
	}

	/// Insert a user with an already expired session.
	pub async fn expired_user(&self, role: Role) -> TestUser {
		let user = User::new(format!("expired-{role}@test.com"), "Expired User", role);
		self.state.user_repo.create_user(&user, None).await.unwrap();

		let token = generate_session_token();
		let session = Session::new(user.id.to_string(), chrono::Duration::seconds(-60));
		self.state
			.session_repo
			.create_session(&session, &hash_token(&token))
			.await
			.unwrap();

		TestUser {
			user,
			session_token: token,
		}
	}
}

pub fn build_request<T: Serialize>(
	method: Method,
	path: &str,
	user: Option<&TestUser>,
	body: Option<T>,
) -> Request<Body> {
	let mut builder = Request::builder().method(method).uri(path);

	if let Some(test_user) = user {
		let (name, value) = test_user.auth_header();
		builder = builder.header(name, value);
	}

	let request_body = match body {
		Some(b) => {
			builder = builder.header("content-type", "application/json");
			Body::from(serde_json::to_string(&b).unwrap())
		}
		None => Body::empty(),
	};

	builder.body(request_body).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
	let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
	serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

pub struct AuthzCase {
	pub name: &'static str,
	pub method: Method,
	pub path: String,
	pub user: Option<TestUser>,
	pub body: Option<Value>,
	pub expected_status: StatusCode,
}

pub async fn run_authz_cases(app: &TestApp, cases: &[AuthzCase]) {
	for case in cases {
		let response = match (&case.method, &case.body) {
			(m, Some(body)) if *m == Method::POST => {
				app.post(&case.path, case.user.as_ref(), body.clone()).await
			}
			(m, Some(body)) if *m == Method::PATCH => {
				app.patch(&case.path, case.user.as_ref(), body.clone()).await
			}
			(m, _) if *m == Method::DELETE => app.delete(&case.path, case.user.as_ref()).await,
			_ => app.get(&case.path, case.user.as_ref()).await,
		};

		if response.status() != case.expected_status {
			let (parts, body) = response.into_parts();
			let body_bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
			let body_str = String::from_utf8_lossy(&body_bytes);
			panic!(
				"Case '{}': {} {} - expected {}, got {}\nResponse body: {}",
				case.name, case.method, case.path, case.expected_status, parts.status, body_str
			);
		}
	}
}

/// Every role outside `allowed` gets `denied`; every role inside gets `granted`.
pub fn role_matrix(
	fixtures: &Fixtures,
	name: &'static str,
	method: Method,
	path: &str,
	body: Option<Value>,
	allowed: &[Role],
	granted: StatusCode,
) -> Vec<AuthzCase> {
	Role::all()
		.iter()
		.map(|role| AuthzCase {
			name,
			method: method.clone(),
			path: path.to_string(),
			user: Some(fixtures.for_role(*role).clone()),
			body: body.clone(),
			expected_status: if allowed.contains(role) {
				granted
			} else {
				StatusCode::FORBIDDEN
			},
		})
		.collect()
}

async fn create_test_user(state: &AppState, email: &str, name: &str, role: Role) -> TestUser {
	let user = User::new(email, name, role);
	state.user_repo.create_user(&user, None).await.unwrap();

	let token = generate_session_token();
	let session = Session::new(user.id.to_string(), chrono::Duration::hours(1));
	state
		.session_repo
		.create_session(&session, &hash_token(&token))
		.await
		.unwrap();

	TestUser {
		user,
		session_token: token,
	}
}

async fn create_fixtures(state: &AppState) -> Fixtures {
	Fixtures {
		developer: create_test_user(state, "dev@test.com", "Dana Developer", Role::Developer).await,
		business_analyst: create_test_user(state, "ba@test.com", "Bo Analyst", Role::BusinessAnalyst)
			.await,
		quality_analyst: create_test_user(state, "qa@test.com", "Quinn Tester", Role::QualityAnalyst)
			.await,
		product_manager: create_test_user(state, "pm@test.com", "Pat Product", Role::ProductManager)
			.await,
		technical_manager: create_test_user(
			state,
			"tm@test.com",
			"Terry Manager",
			Role::TechnicalManager,
		)
		.await,
		end_user: create_test_user(state, "user@test.com", "Uma User", Role::User).await,
	}
}
