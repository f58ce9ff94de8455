// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bug types.

use bugtrail_server_auth::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! uuid_id {
	($name:ident) => {
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
		#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
		#[serde(transparent)]
		pub struct $name(pub Uuid);

		impl $name {
			pub fn new() -> Self {
				Self(Uuid::new_v4())
			}
		}

		impl Default for $name {
			fn default() -> Self {
				Self::new()
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl FromStr for $name {
			type Err = uuid::Error;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Ok(Self(Uuid::parse_str(s)?))
			}
		}
	};
}

uuid_id!(BugId);
uuid_id!(CommentId);
uuid_id!(TestCaseId);

/// Lifecycle status of a bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum StatusLabel {
	#[default]
	Open,
	Resolved,
	Closed,
}

impl fmt::Display for StatusLabel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			StatusLabel::Open => write!(f, "open"),
			StatusLabel::Resolved => write!(f, "resolved"),
			StatusLabel::Closed => write!(f, "closed"),
		}
	}
}

impl FromStr for StatusLabel {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"open" => Ok(StatusLabel::Open),
			"resolved" => Ok(StatusLabel::Resolved),
			"closed" => Ok(StatusLabel::Closed),
			_ => Err(format!("unknown status label: {s}")),
		}
	}
}

/// Triage classification, independent of status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum Classification {
	#[default]
	Unset,
	Approved,
	Unapproved,
	Duplicate,
}

impl fmt::Display for Classification {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Classification::Unset => write!(f, "unset"),
			Classification::Approved => write!(f, "approved"),
			Classification::Unapproved => write!(f, "unapproved"),
			Classification::Duplicate => write!(f, "duplicate"),
		}
	}
}

impl FromStr for Classification {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"unset" => Ok(Classification::Unset),
			"approved" => Ok(Classification::Approved),
			"unapproved" => Ok(Classification::Unapproved),
			"duplicate" => Ok(Classification::Duplicate),
			_ => Err(format!("unknown classification: {s}")),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum Priority {
	#[default]
	Normal,
	High,
}

impl fmt::Display for Priority {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Priority::Normal => write!(f, "normal"),
			Priority::High => write!(f, "high"),
		}
	}
}

impl FromStr for Priority {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"normal" => Ok(Priority::Normal),
			"high" => Ok(Priority::High),
			_ => Err(format!("unknown priority: {s}")),
		}
	}
}

/// A tracked bug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Bug {
	pub id: BugId,
	pub title: String,
	pub description: String,
	pub steps_to_reproduce: String,

	pub author_id: UserId,
	/// Display name cached at creation.
	pub author_name: String,
	pub assigned_user_id: Option<UserId>,
	/// Display name cached at assignment.
	pub assigned_user_name: Option<String>,

	pub status_label: StatusLabel,
	pub classification: Classification,
	pub priority: Priority,
	pub hours_worked: f64,

	pub created_at: DateTime<Utc>,
	pub last_updated: DateTime<Utc>,
	pub closed_at: Option<DateTime<Utc>>,
}

impl Bug {
	pub fn is_closed(&self) -> bool {
		self.status_label == StatusLabel::Closed
	}

	/// Author or current assignee.
	pub fn is_owned_by(&self, user_id: UserId) -> bool {
		self.author_id == user_id || self.assigned_user_id == Some(user_id)
	}
}

/// Input for creating a bug.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BugDraft {
	pub title: String,
	pub description: String,
	pub steps_to_reproduce: String,
	pub priority: Option<Priority>,
}

/// A general update request. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BugUpdate {
	pub title: Option<String>,
	pub description: Option<String>,
	pub steps_to_reproduce: Option<String>,
	pub status_label: Option<StatusLabel>,
	pub priority: Option<Priority>,
	pub hours_worked: Option<f64>,
}

impl BugUpdate {
	pub fn is_empty(&self) -> bool {
		*self == BugUpdate::default()
	}

	/// Field names that are present, in wire form.
	pub fn present_fields(&self) -> Vec<&'static str> {
		let mut fields = Vec::new();
		if self.title.is_some() {
			fields.push("title");
		}
		if self.description.is_some() {
			fields.push("description");
		}
		if self.steps_to_reproduce.is_some() {
			fields.push("stepsToReproduce");
		}
		if self.status_label.is_some() {
			fields.push("statusLabel");
		}
		if self.priority.is_some() {
			fields.push("priority");
		}
		if self.hours_worked.is_some() {
			fields.push("hoursWorked");
		}
		fields
	}
}
