// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use bugtrail_bugs_core::{TestCase, TestCaseDraft, TestCaseStatus, TestCaseUpdate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateTestCaseRequest {
	pub title: String,
	#[serde(default)]
	pub description: Option<String>,
	/// Defaults to `pending`.
	#[serde(default)]
	pub status: Option<TestCaseStatus>,
}

impl From<CreateTestCaseRequest> for TestCaseDraft {
	fn from(req: CreateTestCaseRequest) -> Self {
		TestCaseDraft {
			title: req.title,
			description: req.description,
			status: req.status,
		}
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UpdateTestCaseRequest {
	pub title: Option<String>,
	pub description: Option<String>,
	pub status: Option<TestCaseStatus>,
}

impl From<UpdateTestCaseRequest> for TestCaseUpdate {
	fn from(req: UpdateTestCaseRequest) -> Self {
		TestCaseUpdate {
			title: req.title,
			description: req.description,
			status: req.status,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TestCaseResponse {
	pub id: String,
	pub bug_id: String,
	pub title: String,
	pub description: Option<String>,
	pub status: TestCaseStatus,
	pub author_id: String,
	pub author_name: String,
	pub created_at: DateTime<Utc>,
	pub last_updated: DateTime<Utc>,
}

impl From<TestCase> for TestCaseResponse {
	fn from(tc: TestCase) -> Self {
		Self {
			id: tc.id.to_string(),
			bug_id: tc.bug_id.to_string(),
			title: tc.title,
			description: tc.description,
			status: tc.status,
			author_id: tc.author_id.to_string(),
			author_name: tc.author_name,
			created_at: tc.created_at,
			last_updated: tc.last_updated,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ListTestCasesResponse {
	pub test_cases: Vec<TestCaseResponse>,
}
