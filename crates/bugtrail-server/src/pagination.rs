// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared pagination utilities for API handlers.

pub const DEFAULT_LIMIT: u32 = 20;
pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, Default, serde::Deserialize)]
pub struct PaginationParams {
	pub limit: Option<u32>,
	pub offset: Option<u32>,
}

impl PaginationParams {
	pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
		Self { limit, offset }
	}

	pub fn limit_clamped(&self, default: u32, max: u32) -> u32 {
		self.limit.unwrap_or(default).min(max).max(1)
	}

	pub fn offset_or_default(&self) -> u32 {
		self.offset.unwrap_or(0).min(i32::MAX as u32)
	}

	/// `(limit, offset)` with the server defaults applied.
	pub fn resolve(&self) -> (u32, u32) {
		(self.limit_clamped(DEFAULT_LIMIT, MAX_LIMIT), self.offset_or_default())
	}
}
