// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use bugtrail_server_auth::{Role, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::{IntoParams, ToSchema};

/// A user in API responses. Password hashes never appear here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
	pub id: String,
	pub email: String,
	pub display_name: String,
	pub role: Role,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
	fn from(user: User) -> Self {
		Self {
			id: user.id.to_string(),
			email: user.email,
			display_name: user.display_name,
			role: user.role,
			created_at: user.created_at,
			updated_at: user.updated_at,
		}
	}
}

/// A user together with the bugs they created and are assigned to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UserDetailResponse {
	#[serde(flatten)]
	pub user: UserResponse,
	pub assigned_bugs: Vec<String>,
	pub created_bugs: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(IntoParams), into_params(parameter_in = Query))]
pub struct ListUsersParams {
	/// Case-insensitive match on display name or email.
	pub search: Option<String>,
	/// Role name; aliases such as `qa` are accepted.
	pub role: Option<String>,
	pub limit: Option<u32>,
	pub offset: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ListUsersResponse {
	pub users: Vec<UserResponse>,
	pub total: i64,
	pub limit: u32,
	pub offset: u32,
}

/// Self-service profile update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
	pub display_name: Option<String>,
	pub email: Option<String>,
	pub password: Option<String>,
}

/// Administrative update; may change the role.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateUserRequest {
	pub display_name: Option<String>,
	pub email: Option<String>,
	pub role: Option<Role>,
}
