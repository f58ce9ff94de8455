// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for bug tracking: bugs, comments, test cases and the lifecycle rules.

pub mod bug;
pub mod comment;
pub mod error;
pub mod lifecycle;
pub mod query;
pub mod test_case;

pub use bug::{
	Bug, BugDraft, BugId, BugUpdate, Classification, CommentId, Priority, StatusLabel, TestCaseId,
};
pub use comment::{Comment, MAX_COMMENT_LENGTH};
pub use error::{LifecycleError, Result};
pub use lifecycle::{Actor, BugChanges};
pub use query::{BugFilter, BugSort};
pub use test_case::{TestCase, TestCaseDraft, TestCaseStatus, TestCaseUpdate};
