// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Body and query extractors whose rejections use the JSON error shape.

use axum::{
	extract::{FromRequest, FromRequestParts, Query, Request},
	http::request::Parts,
	Json,
};
use serde::de::DeserializeOwned;

use crate::error::ServerError;

/// `Json<T>` that rejects with a 400 on field `body`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
	T: DeserializeOwned,
	S: Send + Sync,
{
	type Rejection = ServerError;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		match Json::<T>::from_request(req, state).await {
			Ok(Json(value)) => Ok(JsonBody(value)),
			Err(rejection) => {
				tracing::debug!(error = %rejection.body_text(), "rejected request body");
				Err(ServerError::validation("body", rejection.body_text()))
			}
		}
	}
}

/// `Query<T>` that rejects with a 400 on field `query`.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryParams<T>(pub T);

impl<T, S> FromRequestParts<S> for QueryParams<T>
where
	T: DeserializeOwned,
	S: Send + Sync,
{
	type Rejection = ServerError;

	async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
		match Query::<T>::from_request_parts(parts, state).await {
			Ok(Query(value)) => Ok(QueryParams(value)),
			Err(rejection) => Err(ServerError::validation("query", rejection.body_text())),
		}
	}
}
