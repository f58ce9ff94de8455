// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error body shared by every endpoint.

use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// One invalid input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct FieldErrorResponse {
	pub field: String,
	pub message: String,
}

/// JSON body of every non-2xx response.
///
/// `error` is a stable machine code (`validation_failed`, `forbidden`, ...).
/// `fields` is present for validation failures; `required` and `actual` for
/// role or permission denials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fields: Option<Vec<FieldErrorResponse>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub required: Option<Vec<String>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub actual: Option<String>,
}

impl ErrorResponse {
	pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			error: error.into(),
			message: message.into(),
			fields: None,
			required: None,
			actual: None,
		}
	}
}

/// Plain acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SuccessResponse {
	pub message: String,
}
