// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::{sync::Arc, time::Duration};

use bugtrail_server_db::{DbError, SessionStore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Periodically deletes expired sessions.
pub struct SessionCleanupJob {
	session_repo: Arc<dyn SessionStore>,
}

impl SessionCleanupJob {
	pub fn new(session_repo: Arc<dyn SessionStore>) -> Self {
		Self { session_repo }
	}

	/// Delete expired sessions once and return how many were removed.
	#[instrument(skip(self), fields(job_id = "session-cleanup"))]
	pub async fn run_once(&self) -> Result<u64, DbError> {
		let sessions_deleted = self.session_repo.cleanup_expired_sessions().await?;
		tracing::info!(sessions_deleted, "Session cleanup completed");
		Ok(sessions_deleted)
	}

	/// Run every `interval` until `cancel` fires. A failed run is logged and
	/// retried on the next tick.
	pub fn spawn(self, interval: Duration, cancel: CancellationToken) -> JoinHandle<()> {
		tokio::spawn(async move {
			let mut ticker = tokio::time::interval(interval);
			loop {
				tokio::select! {
					_ = cancel.cancelled() => {
						tracing::debug!("session cleanup stopped");
						break;
					}
					_ = ticker.tick() => {
						if let Err(e) = self.run_once().await {
							tracing::warn!(error = %e, "session cleanup failed");
						}
					}
				}
			}
		})
	}
}
