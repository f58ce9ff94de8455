// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Wire types for the bugtrail HTTP API. JSON field names are camelCase.

pub mod auth;
pub mod bugs;
pub mod comments;
pub mod errors;
pub mod health;
pub mod test_cases;
pub mod users;

pub use auth::{SessionUserResponse, SignInRequest, SignUpRequest};
pub use bugs::{
	AssignBugRequest, BugResponse, ClassifyBugRequest, CreateBugRequest, ListBugsParams,
	ListBugsResponse, UpdateBugRequest,
};
pub use comments::{CommentResponse, CreateCommentRequest, ListCommentsResponse};
pub use errors::{ErrorResponse, FieldErrorResponse, SuccessResponse};
pub use health::{HealthResponse, HealthStatus};
pub use test_cases::{
	CreateTestCaseRequest, ListTestCasesResponse, TestCaseResponse, UpdateTestCaseRequest,
};
pub use users::{
	AdminUpdateUserRequest, ListUsersParams, ListUsersResponse, UpdateProfileRequest,
	UserDetailResponse, UserResponse,
};
