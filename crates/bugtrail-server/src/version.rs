// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Build information for bugtrail-server.

use std::sync::OnceLock;
use std::time::{Duration, Instant};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

static STARTED_AT: OnceLock<Instant> = OnceLock::new();

/// Record process start. Later calls are no-ops.
pub fn mark_started() {
	STARTED_AT.get_or_init(Instant::now);
}

pub fn uptime() -> Duration {
	STARTED_AT.get().map(Instant::elapsed).unwrap_or_default()
}

/// Format version info for display.
pub fn format_version_info() -> String {
	format!(
		"bugtrail-server version: {}\n\
         Platform:                {}-{}\n\
         Uptime:                  {}",
		VERSION,
		std::env::consts::OS,
		std::env::consts::ARCH,
		humantime::format_duration(Duration::from_secs(uptime().as_secs())),
	)
}
