// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! OpenAPI documentation for bugtrail-server.
//!
//! The document is generated from the handler annotations and the wire types
//! with utoipa and served as JSON at `/api/openapi.json`.

use axum::Json;
use utoipa::OpenApi;

/// Main OpenAPI documentation struct.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bugtrail Server API",
        version = "1.0.0",
        description = "Bug tracking with role-based access control. Every route except health, documentation, sign-up and sign-in requires a session cookie.",
        license(name = "Proprietary")
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    tags(
        (name = "health", description = "Health checks"),
        (name = "auth", description = "Sign-up, sign-in and session management"),
        (name = "bugs", description = "Bug filing, search and lifecycle"),
        (name = "comments", description = "Append-only bug comments"),
        (name = "test-cases", description = "Test cases attached to bugs (quality analysts only)"),
        (name = "users", description = "User profiles and administration")
    ),
    paths(
        // Health
        crate::routes::health::health_check,
        // Auth
        crate::routes::auth::sign_up,
        crate::routes::auth::sign_in,
        crate::routes::auth::sign_out,
        crate::routes::auth::me,
        // Bugs
        crate::routes::bugs::list_bugs,
        crate::routes::bugs::create_bug,
        crate::routes::bugs::get_bug,
        crate::routes::bugs::update_bug,
        crate::routes::bugs::classify_bug,
        crate::routes::bugs::assign_bug,
        crate::routes::bugs::close_bug,
        // Comments
        crate::routes::comments::list_comments,
        crate::routes::comments::create_comment,
        crate::routes::comments::get_comment,
        // Test cases
        crate::routes::test_cases::list_test_cases,
        crate::routes::test_cases::create_test_case,
        crate::routes::test_cases::get_test_case,
        crate::routes::test_cases::update_test_case,
        crate::routes::test_cases::delete_test_case,
        // Users
        crate::routes::users::list_users,
        crate::routes::users::get_me,
        crate::routes::users::update_me,
        crate::routes::users::get_user,
        crate::routes::users::admin_update_user,
        crate::routes::users::delete_user,
    ),
    components(
        schemas(
            bugtrail_server_api::HealthResponse,
            bugtrail_server_api::HealthStatus,
            bugtrail_server_api::SignUpRequest,
            bugtrail_server_api::SignInRequest,
            bugtrail_server_api::SessionUserResponse,
            bugtrail_server_api::CreateBugRequest,
            bugtrail_server_api::UpdateBugRequest,
            bugtrail_server_api::ClassifyBugRequest,
            bugtrail_server_api::AssignBugRequest,
            bugtrail_server_api::BugResponse,
            bugtrail_server_api::ListBugsResponse,
            bugtrail_server_api::CreateCommentRequest,
            bugtrail_server_api::CommentResponse,
            bugtrail_server_api::ListCommentsResponse,
            bugtrail_server_api::CreateTestCaseRequest,
            bugtrail_server_api::UpdateTestCaseRequest,
            bugtrail_server_api::TestCaseResponse,
            bugtrail_server_api::ListTestCasesResponse,
            bugtrail_server_api::UserResponse,
            bugtrail_server_api::UserDetailResponse,
            bugtrail_server_api::ListUsersResponse,
            bugtrail_server_api::UpdateProfileRequest,
            bugtrail_server_api::AdminUpdateUserRequest,
            bugtrail_server_api::ErrorResponse,
            bugtrail_server_api::FieldErrorResponse,
            bugtrail_server_api::SuccessResponse,
            bugtrail_bugs_core::StatusLabel,
            bugtrail_bugs_core::Classification,
            bugtrail_bugs_core::Priority,
            bugtrail_bugs_core::TestCaseStatus,
            bugtrail_server_auth::Role,
            bugtrail_server_auth::Permission,
        )
    )
)]
pub struct ApiDoc;

/// GET /api/openapi.json
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
	Json(ApiDoc::openapi())
}
