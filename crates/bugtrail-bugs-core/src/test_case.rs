// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Test cases attached to bugs.

use bugtrail_server_auth::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{BugId, TestCaseId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum TestCaseStatus {
	#[default]
	Pending,
	Passed,
	Failed,
}

impl fmt::Display for TestCaseStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TestCaseStatus::Pending => write!(f, "pending"),
			TestCaseStatus::Passed => write!(f, "passed"),
			TestCaseStatus::Failed => write!(f, "failed"),
		}
	}
}

impl FromStr for TestCaseStatus {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"pending" => Ok(TestCaseStatus::Pending),
			"passed" => Ok(TestCaseStatus::Passed),
			"failed" => Ok(TestCaseStatus::Failed),
			_ => Err(format!("unknown test case status: {s}")),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TestCase {
	pub id: TestCaseId,
	pub bug_id: BugId,
	pub title: String,
	pub description: Option<String>,
	pub status: TestCaseStatus,
	pub author_id: UserId,
	pub author_name: String,
	pub created_at: DateTime<Utc>,
	pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestCaseDraft {
	pub title: String,
	pub description: Option<String>,
	pub status: Option<TestCaseStatus>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestCaseUpdate {
	pub title: Option<String>,
	pub description: Option<String>,
	pub status: Option<TestCaseStatus>,
}

impl TestCaseUpdate {
	pub fn is_empty(&self) -> bool {
		*self == TestCaseUpdate::default()
	}
}
