// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for bug lifecycle rules.

use bugtrail_server_auth::Role;
use thiserror::Error;

/// Result type for lifecycle operations.
pub type Result<T> = std::result::Result<T, LifecycleError>;

/// A rejected lifecycle change.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LifecycleError {
	/// The bug is closed; nothing may change.
	#[error("bug is closed")]
	Closed,

	#[error("cannot move bug from {from} to {to}")]
	InvalidTransition { from: String, to: String },

	/// `closed` may only be set through the close action.
	#[error("bugs can only be closed through the close action")]
	CloseRequiresCloseAction,

	/// Free-text fields are restricted to the author and assignee.
	#[error("only the author or assignee may edit {field}")]
	NotOwner { field: &'static str, actual: Role },

	/// A reviewing business analyst may only resolve an open bug.
	#[error("reviewers may only move an open bug to resolved")]
	ReviewerLimited,

	#[error("only quality analysts may manage test cases")]
	TestCaseRoleRequired { actual: Role },

	#[error("{field}: {message}")]
	Validation { field: &'static str, message: String },
}

impl LifecycleError {
	pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
		LifecycleError::Validation {
			field,
			message: message.into(),
		}
	}
}
