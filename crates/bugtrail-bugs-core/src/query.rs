// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bug list filtering and ordering.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Classification;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub enum BugSort {
	#[default]
	Newest,
	Oldest,
	Title,
	Classification,
	AssignedTo,
	CreatedBy,
}

impl fmt::Display for BugSort {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			BugSort::Newest => "newest",
			BugSort::Oldest => "oldest",
			BugSort::Title => "title",
			BugSort::Classification => "classification",
			BugSort::AssignedTo => "assignedTo",
			BugSort::CreatedBy => "createdBy",
		};
		f.write_str(s)
	}
}

impl FromStr for BugSort {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"newest" => Ok(BugSort::Newest),
			"oldest" => Ok(BugSort::Oldest),
			"title" => Ok(BugSort::Title),
			"classification" => Ok(BugSort::Classification),
			"assignedTo" => Ok(BugSort::AssignedTo),
			"createdBy" => Ok(BugSort::CreatedBy),
			_ => Err(format!("unknown sort order: {s}")),
		}
	}
}

/// Filter for listing bugs. Empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BugFilter {
	/// Every keyword must appear in title, description or steps.
	pub keywords: Vec<String>,
	pub classification: Option<Classification>,
	/// `Some(true)` only closed bugs, `Some(false)` only not closed.
	pub closed: Option<bool>,
	/// Minimum age in days since creation.
	pub min_age_days: Option<u32>,
	/// Maximum age in days since creation.
	pub max_age_days: Option<u32>,
	pub sort: BugSort,
}

impl BugFilter {
	/// Split a whitespace separated keyword string.
	pub fn parse_keywords(raw: &str) -> Vec<String> {
		raw.split_whitespace().map(str::to_string).collect()
	}
}
