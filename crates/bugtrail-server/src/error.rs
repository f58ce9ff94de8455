// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Server error types and HTTP response conversions.

use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use bugtrail_bugs_core::LifecycleError;
use bugtrail_server_api::{ErrorResponse, FieldErrorResponse};
use bugtrail_server_auth::{AuthError, AuthFailure, PermissionDenial, Role, RoleDenial};
use bugtrail_server_db::DbError;

use crate::session_resolver::ResolveError;

/// `required` entry for rules that depend on authorship or assignment.
pub const OWNER: &str = "owner";

/// A single invalid input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
	pub field: String,
	pub message: String,
}

impl FieldError {
	pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			field: field.into(),
			message: message.into(),
		}
	}
}

/// Every failure a handler or gate can return.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	#[error("Validation failed")]
	Validation(Vec<FieldError>),

	#[error("Authentication required")]
	Unauthenticated,

	#[error("Session expired")]
	SessionExpired,

	#[error("Invalid email or password")]
	InvalidCredentials,

	#[error("Forbidden: {message}")]
	Forbidden {
		required: Vec<String>,
		actual: Option<String>,
		message: String,
	},

	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Conflict: {0}")]
	Conflict(String),

	#[error("Internal error: {0}")]
	Internal(String),

	/// Database error from bugtrail-server-db.
	#[error("Database error: {0}")]
	Db(DbError),
}

pub type Result<T> = std::result::Result<T, ServerError>;

impl ServerError {
	pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
		ServerError::Validation(vec![FieldError::new(field, message)])
	}

	pub fn role_denied(denial: &RoleDenial) -> Self {
		ServerError::Forbidden {
			required: denial.required.iter().map(|r| r.to_string()).collect(),
			actual: denial.actual.map(|r| r.to_string()),
			message: "Your role is not allowed to perform this action".to_string(),
		}
	}

	pub fn permission_denied(denial: &PermissionDenial) -> Self {
		ServerError::Forbidden {
			required: vec![denial.required.to_string()],
			actual: Some(denial.actual.to_string()),
			message: format!("Missing permission {}", denial.required),
		}
	}

	/// Forbidden for a rule tied to one role, echoing the caller's role.
	pub fn requires_role(required: Role, actual: Role, message: impl Into<String>) -> Self {
		ServerError::Forbidden {
			required: vec![required.to_string()],
			actual: Some(actual.to_string()),
			message: message.into(),
		}
	}

	/// Forbidden for an ownership rule: the caller's role alone is not enough.
	pub fn not_owner(actual: Role, message: impl Into<String>) -> Self {
		ServerError::Forbidden {
			required: vec![OWNER.to_string()],
			actual: Some(actual.to_string()),
			message: message.into(),
		}
	}

	pub fn status(&self) -> StatusCode {
		match self {
			ServerError::Validation(_) => StatusCode::BAD_REQUEST,
			ServerError::Unauthenticated
			| ServerError::SessionExpired
			| ServerError::InvalidCredentials => StatusCode::UNAUTHORIZED,
			ServerError::Forbidden { .. } => StatusCode::FORBIDDEN,
			ServerError::NotFound(_) => StatusCode::NOT_FOUND,
			ServerError::Conflict(_) => StatusCode::CONFLICT,
			ServerError::Internal(_) | ServerError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

impl From<DbError> for ServerError {
	fn from(e: DbError) -> Self {
		match e {
			DbError::NotFound(what) => ServerError::NotFound(what),
			DbError::Conflict(what) => ServerError::Conflict(what),
			other => ServerError::Db(other),
		}
	}
}

impl From<LifecycleError> for ServerError {
	fn from(e: LifecycleError) -> Self {
		match e {
			LifecycleError::Closed | LifecycleError::InvalidTransition { .. } => {
				ServerError::Conflict(e.to_string())
			}
			LifecycleError::CloseRequiresCloseAction => {
				ServerError::validation("statusLabel", e.to_string())
			}
			LifecycleError::NotOwner { actual, .. } => ServerError::not_owner(actual, e.to_string()),
			LifecycleError::ReviewerLimited => {
				ServerError::not_owner(Role::BusinessAnalyst, e.to_string())
			}
			LifecycleError::TestCaseRoleRequired { actual } => {
				ServerError::requires_role(Role::QualityAnalyst, actual, e.to_string())
			}
			LifecycleError::Validation { field, message } => ServerError::validation(field, message),
		}
	}
}

impl From<AuthError> for ServerError {
	fn from(e: AuthError) -> Self {
		match e {
			AuthError::PasswordHash(message) => ServerError::Internal(message),
		}
	}
}

impl From<AuthFailure> for ServerError {
	fn from(failure: AuthFailure) -> Self {
		match failure {
			AuthFailure::Unauthenticated => ServerError::Unauthenticated,
			AuthFailure::SessionExpired => ServerError::SessionExpired,
		}
	}
}

impl From<ResolveError> for ServerError {
	fn from(e: ResolveError) -> Self {
		match e {
			ResolveError::Unauthenticated => ServerError::Unauthenticated,
			ResolveError::SessionExpired => ServerError::SessionExpired,
			ResolveError::Store(db) => ServerError::Db(db),
		}
	}
}

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		let status = self.status();
		let body = match self {
			ServerError::Validation(fields) => {
				let message = match fields.as_slice() {
					[only] => format!("{}: {}", only.field, only.message),
					_ => "Request validation failed".to_string(),
				};
				ErrorResponse {
					fields: Some(
						fields
							.into_iter()
							.map(|f| FieldErrorResponse {
								field: f.field,
								message: f.message,
							})
							.collect(),
					),
					..ErrorResponse::new("validation_failed", message)
				}
			}
			ServerError::Unauthenticated => {
				ErrorResponse::new("unauthenticated", "Authentication required")
			}
			ServerError::SessionExpired => {
				ErrorResponse::new("session_expired", "Session expired, please sign in again")
			}
			ServerError::InvalidCredentials => {
				ErrorResponse::new("invalid_credentials", "Invalid email or password")
			}
			ServerError::Forbidden {
				required,
				actual,
				message,
			} => ErrorResponse {
				required: (!required.is_empty()).then_some(required),
				actual,
				..ErrorResponse::new("forbidden", message)
			},
			ServerError::NotFound(what) => ErrorResponse::new("not_found", what),
			ServerError::Conflict(what) => ErrorResponse::new("conflict", what),
			ServerError::Internal(detail) => {
				tracing::error!(error = %detail, "internal error");
				ErrorResponse::new("internal_error", "An internal error occurred")
			}
			ServerError::Db(e) => {
				tracing::error!(error = %e, "database error");
				ErrorResponse::new("internal_error", "An internal error occurred")
			}
		};

		(status, Json(body)).into_response()
	}
}
