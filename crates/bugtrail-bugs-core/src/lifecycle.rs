// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bug lifecycle rules.
//!
//! ```text
//!   open ──update──▶ resolved ──close──▶ closed
//!     └──────────────close──────────────────▲
//! ```
//!
//! Every function here is pure: it inspects the current bug and the acting
//! user and either returns a validated [`BugChanges`] or a [`LifecycleError`].
//! Role and permission gates run before these functions; the rules below are
//! the ones that depend on the bug itself (state, ownership).
//!
//! Closed is terminal. There is no transition back to `open` from `resolved`
//! or `closed`.

use bugtrail_server_auth::{Role, UserId};
use chrono::{DateTime, Utc};

use crate::{
	Bug, BugDraft, BugId, BugUpdate, Classification, Comment, CommentId, LifecycleError, Priority,
	Result, StatusLabel, TestCase, TestCaseDraft, TestCaseId, TestCaseStatus, TestCaseUpdate,
	MAX_COMMENT_LENGTH,
};

pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_TEXT_LENGTH: usize = 10_000;

/// The user performing a lifecycle action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
	pub id: UserId,
	pub role: Role,
	pub name: String,
}

impl Actor {
	pub fn new(id: UserId, role: Role, name: impl Into<String>) -> Self {
		Self {
			id,
			role,
			name: name.into(),
		}
	}
}

/// A validated set of field changes for a bug.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BugChanges {
	pub title: Option<String>,
	pub description: Option<String>,
	pub steps_to_reproduce: Option<String>,
	pub status_label: Option<StatusLabel>,
	pub classification: Option<Classification>,
	pub priority: Option<Priority>,
	pub hours_worked: Option<f64>,
	pub assigned_user: Option<(UserId, String)>,
	pub closed_at: Option<DateTime<Utc>>,
}

impl BugChanges {
	/// Apply the changes and bump `last_updated`.
	pub fn apply(self, mut bug: Bug) -> Bug {
		if let Some(title) = self.title {
			bug.title = title;
		}
		if let Some(description) = self.description {
			bug.description = description;
		}
		if let Some(steps) = self.steps_to_reproduce {
			bug.steps_to_reproduce = steps;
		}
		if let Some(status) = self.status_label {
			bug.status_label = status;
		}
		if let Some(classification) = self.classification {
			bug.classification = classification;
		}
		if let Some(priority) = self.priority {
			bug.priority = priority;
		}
		if let Some(hours) = self.hours_worked {
			bug.hours_worked = hours;
		}
		if let Some((id, name)) = self.assigned_user {
			bug.assigned_user_id = Some(id);
			bug.assigned_user_name = Some(name);
		}
		if self.closed_at.is_some() {
			bug.closed_at = self.closed_at;
		}
		bug.last_updated = Utc::now();
		bug
	}
}

fn required_text(field: &'static str, value: &str, max: usize) -> Result<String> {
	let trimmed = value.trim();
	if trimmed.is_empty() {
		return Err(LifecycleError::validation(field, "must not be empty"));
	}
	if trimmed.chars().count() > max {
		return Err(LifecycleError::validation(
			field,
			format!("must be at most {max} characters"),
		));
	}
	Ok(trimmed.to_string())
}

fn optional_text(field: &'static str, value: Option<String>, max: usize) -> Result<Option<String>> {
	value.map(|v| required_text(field, &v, max)).transpose()
}

/// Build a new bug. New bugs are always `open` and `unset`.
pub fn new_bug(draft: BugDraft, author: &Actor) -> Result<Bug> {
	let title = required_text("title", &draft.title, MAX_TITLE_LENGTH)?;
	let description = required_text("description", &draft.description, MAX_TEXT_LENGTH)?;
	let steps_to_reproduce =
		required_text("stepsToReproduce", &draft.steps_to_reproduce, MAX_TEXT_LENGTH)?;
	let now = Utc::now();

	Ok(Bug {
		id: BugId::new(),
		title,
		description,
		steps_to_reproduce,
		author_id: author.id,
		author_name: author.name.clone(),
		assigned_user_id: None,
		assigned_user_name: None,
		status_label: StatusLabel::Open,
		classification: Classification::Unset,
		priority: draft.priority.unwrap_or_default(),
		hours_worked: 0.0,
		created_at: now,
		last_updated: now,
		closed_at: None,
	})
}

fn check_status_target(from: StatusLabel, to: StatusLabel) -> Result<()> {
	match (from, to) {
		(_, StatusLabel::Closed) => Err(LifecycleError::CloseRequiresCloseAction),
		(StatusLabel::Resolved, StatusLabel::Open) => Err(LifecycleError::InvalidTransition {
			from: from.to_string(),
			to: to.to_string(),
		}),
		_ => Ok(()),
	}
}

fn first_free_text_field(update: &BugUpdate) -> Option<&'static str> {
	if update.title.is_some() {
		Some("title")
	} else if update.description.is_some() {
		Some("description")
	} else if update.steps_to_reproduce.is_some() {
		Some("stepsToReproduce")
	} else {
		None
	}
}

/// Validate a general update.
///
/// Checks run in order: closed, status target, reviewer limits, ownership of
/// free-text fields, then field values.
pub fn plan_update(bug: &Bug, actor: &Actor, update: BugUpdate) -> Result<BugChanges> {
	if bug.is_closed() {
		return Err(LifecycleError::Closed);
	}
	if update.is_empty() {
		return Err(LifecycleError::validation("body", "no fields to update"));
	}
	if let Some(target) = update.status_label {
		check_status_target(bug.status_label, target)?;
	}

	let owner = bug.is_owned_by(actor.id);

	if actor.role == Role::BusinessAnalyst && !owner {
		let resolves_only = update.present_fields() == ["statusLabel"]
			&& update.status_label == Some(StatusLabel::Resolved)
			&& bug.status_label == StatusLabel::Open;
		if !resolves_only {
			return Err(LifecycleError::ReviewerLimited);
		}
	}

	if !owner {
		if let Some(field) = first_free_text_field(&update) {
			return Err(LifecycleError::NotOwner {
				field,
				actual: actor.role,
			});
		}
	}

	if let Some(hours) = update.hours_worked {
		if !hours.is_finite() || hours < 0.0 {
			return Err(LifecycleError::validation(
				"hoursWorked",
				"must be a non-negative number",
			));
		}
	}

	Ok(BugChanges {
		title: optional_text("title", update.title, MAX_TITLE_LENGTH)?,
		description: optional_text("description", update.description, MAX_TEXT_LENGTH)?,
		steps_to_reproduce: optional_text(
			"stepsToReproduce",
			update.steps_to_reproduce,
			MAX_TEXT_LENGTH,
		)?,
		status_label: update.status_label,
		priority: update.priority,
		hours_worked: update.hours_worked,
		..Default::default()
	})
}

/// Close an open or resolved bug.
pub fn plan_close(bug: &Bug) -> Result<BugChanges> {
	if bug.is_closed() {
		return Err(LifecycleError::Closed);
	}
	Ok(BugChanges {
		status_label: Some(StatusLabel::Closed),
		closed_at: Some(Utc::now()),
		..Default::default()
	})
}

pub fn plan_classify(bug: &Bug, classification: Classification) -> Result<BugChanges> {
	if bug.is_closed() {
		return Err(LifecycleError::Closed);
	}
	Ok(BugChanges {
		classification: Some(classification),
		..Default::default()
	})
}

/// Assign a bug, caching the assignee's display name.
pub fn plan_assign(bug: &Bug, assignee_id: UserId, assignee_name: &str) -> Result<BugChanges> {
	if bug.is_closed() {
		return Err(LifecycleError::Closed);
	}
	Ok(BugChanges {
		assigned_user: Some((assignee_id, assignee_name.to_string())),
		..Default::default()
	})
}

pub fn new_comment(bug: &Bug, author: &Actor, text: &str) -> Result<Comment> {
	let text = required_text("text", text, MAX_COMMENT_LENGTH)?;
	Ok(Comment {
		id: CommentId::new(),
		bug_id: bug.id,
		author_id: author.id,
		author_name: author.name.clone(),
		text,
		created_at: Utc::now(),
	})
}

/// Test cases are written by quality analysts only, whatever the route allowed.
pub fn check_test_case_author(role: Role) -> Result<()> {
	if role == Role::QualityAnalyst {
		Ok(())
	} else {
		Err(LifecycleError::TestCaseRoleRequired { actual: role })
	}
}

pub fn new_test_case(bug: &Bug, author: &Actor, draft: TestCaseDraft) -> Result<TestCase> {
	check_test_case_author(author.role)?;
	let title = required_text("title", &draft.title, MAX_TITLE_LENGTH)?;
	let description = optional_text("description", draft.description, MAX_TEXT_LENGTH)?;
	let now = Utc::now();

	Ok(TestCase {
		id: TestCaseId::new(),
		bug_id: bug.id,
		title,
		description,
		status: draft.status.unwrap_or(TestCaseStatus::Pending),
		author_id: author.id,
		author_name: author.name.clone(),
		created_at: now,
		last_updated: now,
	})
}

/// Validate and apply a test case update.
pub fn update_test_case(
	test_case: &TestCase,
	actor: &Actor,
	update: TestCaseUpdate,
) -> Result<TestCase> {
	check_test_case_author(actor.role)?;
	if update.is_empty() {
		return Err(LifecycleError::validation("body", "no fields to update"));
	}

	let mut next = test_case.clone();
	if let Some(title) = update.title {
		next.title = required_text("title", &title, MAX_TITLE_LENGTH)?;
	}
	if let Some(description) = update.description {
		next.description = Some(required_text("description", &description, MAX_TEXT_LENGTH)?);
	}
	if let Some(status) = update.status {
		next.status = status;
	}
	next.last_updated = Utc::now();
	Ok(next)
}
