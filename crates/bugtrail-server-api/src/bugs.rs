// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bug request and response types.

use bugtrail_bugs_core::{Bug, BugDraft, BugUpdate, Classification, Priority, StatusLabel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreateBugRequest {
	pub title: String,
	pub description: String,
	pub steps_to_reproduce: String,
	#[serde(default)]
	pub priority: Option<Priority>,
}

impl From<CreateBugRequest> for BugDraft {
	fn from(req: CreateBugRequest) -> Self {
		BugDraft {
			title: req.title,
			description: req.description,
			steps_to_reproduce: req.steps_to_reproduce,
			priority: req.priority,
		}
	}
}

/// Partial update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UpdateBugRequest {
	pub title: Option<String>,
	pub description: Option<String>,
	pub steps_to_reproduce: Option<String>,
	pub status_label: Option<StatusLabel>,
	pub priority: Option<Priority>,
	pub hours_worked: Option<f64>,
}

impl From<UpdateBugRequest> for BugUpdate {
	fn from(req: UpdateBugRequest) -> Self {
		BugUpdate {
			title: req.title,
			description: req.description,
			steps_to_reproduce: req.steps_to_reproduce,
			status_label: req.status_label,
			priority: req.priority,
			hours_worked: req.hours_worked,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ClassifyBugRequest {
	pub classification: Classification,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AssignBugRequest {
	pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct BugResponse {
	pub id: String,
	pub title: String,
	pub description: String,
	pub steps_to_reproduce: String,
	pub author_id: String,
	pub author_name: String,
	pub assigned_user_id: Option<String>,
	pub assigned_user_name: Option<String>,
	pub status_label: StatusLabel,
	pub classification: Classification,
	pub priority: Priority,
	pub hours_worked: f64,
	pub created_at: DateTime<Utc>,
	pub last_updated: DateTime<Utc>,
	pub closed_at: Option<DateTime<Utc>>,
}

impl From<Bug> for BugResponse {
	fn from(bug: Bug) -> Self {
		Self {
			id: bug.id.to_string(),
			title: bug.title,
			description: bug.description,
			steps_to_reproduce: bug.steps_to_reproduce,
			author_id: bug.author_id.to_string(),
			author_name: bug.author_name,
			assigned_user_id: bug.assigned_user_id.map(|id| id.to_string()),
			assigned_user_name: bug.assigned_user_name,
			status_label: bug.status_label,
			classification: bug.classification,
			priority: bug.priority,
			hours_worked: bug.hours_worked,
			created_at: bug.created_at,
			last_updated: bug.last_updated,
			closed_at: bug.closed_at,
		}
	}
}

/// Query parameters for `GET /bugs`.
///
/// Enum-valued parameters arrive as strings so a bad value is reported as a
/// field error rather than a generic query rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(IntoParams), into_params(parameter_in = Query))]
#[serde(rename_all = "camelCase")]
pub struct ListBugsParams {
	/// Whitespace separated; every keyword must match title, description or steps.
	pub keywords: Option<String>,
	pub classification: Option<String>,
	pub closed: Option<bool>,
	/// Only bugs at least this many days old.
	pub min_age: Option<u32>,
	/// Only bugs at most this many days old.
	pub max_age: Option<u32>,
	/// `newest` (default), `oldest`, `title`, `classification`, `assignedTo`, `createdBy`.
	pub sort_by: Option<String>,
	pub limit: Option<u32>,
	pub offset: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ListBugsResponse {
	pub bugs: Vec<BugResponse>,
	pub total: i64,
	pub limit: u32,
	pub offset: u32,
}
