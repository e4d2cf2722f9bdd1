// SPDX-License-Identifier: MIT

//! Audit log recorder.
//!
//! Every mutating admin action is recorded to `activityLog`. A failed
//! write must not fail the action that triggered it, so failures are
//! queued in memory and retried before the next write. Entries survive
//! transient store outages but not a process restart.

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::db::FirestoreDb;
use crate::models::{ActivityAction, ActivityLogEntry};

#[derive(Clone)]
pub struct ActivityRecorder {
    db: FirestoreDb,
    pending: Arc<Mutex<Vec<ActivityLogEntry>>>,
}

impl ActivityRecorder {
    pub fn new(db: FirestoreDb) -> Self {
        Self {
            db,
            pending: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Record one audit entry. Never returns an error; failures are
    /// queued and retried on the next call.
    pub async fn record(&self, action: ActivityAction, description: &str, admin_email: &str) {
        let mut entry = ActivityLogEntry::new(action, description.to_string(), admin_email.to_string());
        entry.timestamp = Some(chrono::Utc::now());

        let mut pending = self.pending.lock().await;

        // Retry anything stuck from earlier failures first, preserving
        // original order.
        while let Some(queued) = pending.first() {
            if let Err(e) = self.db.add_activity(queued).await {
                tracing::warn!(error = %e, queued = pending.len(), "Audit log retry failed");
                break;
            }
            pending.remove(0);
        }

        if pending.is_empty() {
            match self.db.add_activity(&entry).await {
                Ok(()) => return,
                Err(e) => {
                    tracing::warn!(error = %e, action = ?entry.action, "Audit log write failed, queueing");
                }
            }
        }

        pending.push(entry);
    }

    /// Number of entries awaiting retry.
    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_writes_queue_in_order() {
        let recorder = ActivityRecorder::new(FirestoreDb::new_mock());

        recorder
            .record(ActivityAction::Login, "Admin logged in", "admin@example.com")
            .await;
        recorder
            .record(ActivityAction::UserViewed, "Viewed user uid-1", "admin@example.com")
            .await;

        // The mock store rejects writes, so both entries stay queued.
        assert_eq!(recorder.pending_count().await, 2);
        let pending = recorder.pending.lock().await;
        assert_eq!(pending[0].action, ActivityAction::Login);
        assert_eq!(pending[1].action, ActivityAction::UserViewed);
        assert!(pending.iter().all(|e| e.timestamp.is_some()));
    }
}
