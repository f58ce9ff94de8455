// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Routers that fix the authentication requirement at the type level.
//!
//! Routes registered on an [`AuthedRouter`] can never be reached without an
//! identity; routes on a [`PublicRouter`] never see the auth middleware.

use axum::{
	middleware::{from_fn, from_fn_with_state},
	routing::MethodRouter,
	Router,
};

use crate::{
	api::AppState,
	auth_middleware::{auth_layer, require_auth_layer},
};

pub struct AuthedRouter(Router<AppState>);

impl AuthedRouter {
	pub fn new() -> Self {
		Self(Router::new())
	}

	pub fn route(self, path: &str, method_router: MethodRouter<AppState>) -> Self {
		Self(self.0.route(path, method_router))
	}

	pub fn build(self, state: AppState) -> Router<AppState> {
		self
			.0
			.layer(from_fn(require_auth_layer))
			.layer(from_fn_with_state(state, auth_layer))
	}
}

impl Default for AuthedRouter {
	fn default() -> Self {
		Self::new()
	}
}

pub struct PublicRouter(Router<AppState>);

impl PublicRouter {
	pub fn new() -> Self {
		Self(Router::new())
	}

	pub fn route(self, path: &str, method_router: MethodRouter<AppState>) -> Self {
		Self(self.0.route(path, method_router))
	}

	pub fn build(self) -> Router<AppState> {
		self.0
	}
}

impl Default for PublicRouter {
	fn default() -> Self {
		Self::new()
	}
}
