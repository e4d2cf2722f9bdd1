// SPDX-License-Identifier: MIT

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile storage)
//! - Assessments (per-user sub-collection)
//! - Activity log (append-only audit entries)
//! - Verification codes (one per user, keyed by UID)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{ActivityLogEntry, RawAssessment, UserRecord, VerificationCode};
use chrono::{DateTime, Utc};
use futures_util::{stream, StreamExt};

const MAX_CONCURRENT_DB_OPS: usize = 50;
// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // Use ExternalJwtFunctionSource to provide a dummy token without needing async-trait
        // or a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user profile by UID.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>, AppError> {
        let user: Option<UserRecord> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // Older documents predate the duplicated userId field.
        Ok(user.map(|mut u| {
            if u.user_id.is_empty() {
                u.user_id = user_id.to_string();
            }
            u
        }))
    }

    /// List all user profiles, with UIDs backfilled from document IDs.
    pub async fn list_users(&self) -> Result<Vec<UserRecord>, AppError> {
        let docs: Vec<firestore::FirestoreDocument> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut users = Vec::with_capacity(docs.len());
        for doc in &docs {
            let mut user: UserRecord = firestore::FirestoreDb::deserialize_doc_to(doc)
                .map_err(|e| AppError::Database(e.to_string()))?;
            if user.user_id.is_empty() {
                if let Some(id) = doc.name.rsplit('/').next() {
                    user.user_id = id.to_string();
                }
            }
            users.push(user);
        }

        Ok(users)
    }

    /// Create or update a user profile.
    pub async fn upsert_user(&self, user: &UserRecord) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.user_id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Assessment Operations ───────────────────────────────────

    /// List raw assessment documents for one user.
    pub async fn list_assessments_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<RawAssessment>, AppError> {
        let client = self.get_client()?;
        let parent_path = client
            .parent_path(collections::USERS, user_id)
            .map_err(|e| AppError::Database(e.to_string()))?;

        client
            .fluent()
            .select()
            .from(collections::ASSESSMENTS)
            .parent(&parent_path)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get one raw assessment document for a user.
    pub async fn get_assessment(
        &self,
        user_id: &str,
        assessment_id: &str,
    ) -> Result<Option<RawAssessment>, AppError> {
        let client = self.get_client()?;
        let parent_path = client
            .parent_path(collections::USERS, user_id)
            .map_err(|e| AppError::Database(e.to_string()))?;

        client
            .fluent()
            .select()
            .by_id_in(collections::ASSESSMENTS)
            .parent(&parent_path)
            .obj()
            .one(assessment_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete one assessment document for a user.
    pub async fn delete_assessment(
        &self,
        user_id: &str,
        assessment_id: &str,
    ) -> Result<(), AppError> {
        let client = self.get_client()?;
        let parent_path = client
            .parent_path(collections::USERS, user_id)
            .map_err(|e| AppError::Database(e.to_string()))?;

        client
            .fluent()
            .delete()
            .from(collections::ASSESSMENTS)
            .parent(&parent_path)
            .document_id(assessment_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Load every user together with their raw assessments.
    ///
    /// Sub-collections are fetched concurrently with a cap. The join is
    /// all-or-nothing: one failed fetch fails the whole call rather than
    /// returning a silently partial list.
    pub async fn list_users_with_assessments(
        &self,
    ) -> Result<Vec<(UserRecord, Vec<RawAssessment>)>, AppError> {
        let users = self.list_users().await?;

        stream::iter(users)
            .map(|user| async move {
                let raws = self.list_assessments_for_user(&user.user_id).await?;
                Ok::<_, AppError>((user, raws))
            })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<_, AppError>>>()
            .await
            .into_iter()
            .collect()
    }

    // ─── Activity Log Operations ─────────────────────────────────

    /// Append one audit entry with an auto-generated document ID.
    pub async fn add_activity(&self, entry: &ActivityLogEntry) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::ACTIVITY_LOG)
            .generate_document_id()
            .object(entry)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// List audit entries, newest first.
    pub async fn list_activities(&self) -> Result<Vec<ActivityLogEntry>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::ACTIVITY_LOG)
            .order_by([(
                "timestamp",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count audit entries at or after the cutoff, via a range filter so
    /// only the matching window is fetched.
    pub async fn count_activities_since(&self, cutoff: DateTime<Utc>) -> Result<usize, AppError> {
        let entries: Vec<ActivityLogEntry> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::ACTIVITY_LOG)
            .filter(move |q| {
                q.field("timestamp")
                    .greater_than_or_equal(firestore::FirestoreTimestamp(cutoff))
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(entries.len())
    }

    // ─── Verification Code Operations ────────────────────────────

    /// Get the pending verification code for a user, if any.
    pub async fn get_verification_code(
        &self,
        user_id: &str,
    ) -> Result<Option<VerificationCode>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::VERIFICATION_CODES)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store a verification code, replacing any previous one.
    pub async fn set_verification_code(
        &self,
        user_id: &str,
        code: &VerificationCode,
    ) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::VERIFICATION_CODES)
            .document_id(user_id)
            .object(code)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a user's verification code (consumed or expired).
    pub async fn delete_verification_code(&self, user_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::VERIFICATION_CODES)
            .document_id(user_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Helper Methods ────────────────────────────────────────────

    /// Batch delete assessment documents under one user, in transaction
    /// chunks sized under the Firestore write limit.
    async fn batch_delete_assessments(
        &self,
        user_id: &str,
        assessments: &[RawAssessment],
    ) -> Result<(), AppError> {
        let client = self.get_client()?;
        let parent_path = client
            .parent_path(collections::USERS, user_id)
            .map_err(|e| AppError::Database(e.to_string()))?;

        for chunk in assessments.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for assessment in chunk {
                client
                    .fluent()
                    .delete()
                    .from(collections::ASSESSMENTS)
                    .parent(&parent_path)
                    .document_id(&assessment.id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!("Failed to add deletion to transaction: {}", e))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }

    // ─── User Data Deletion ────────────────────────────────────────

    /// Delete ALL data for a user.
    ///
    /// Deletes, in order:
    /// - `users/{uid}/assessments/*`
    /// - `verificationCodes/{uid}`
    /// - `users/{uid}`
    ///
    /// Audit log entries are append-only history and survive the user.
    /// Returns the number of documents deleted.
    pub async fn delete_user_data(&self, user_id: &str) -> Result<usize, AppError> {
        let mut deleted_count = 0;

        // 1. Delete the assessment sub-collection; deleting the parent
        //    document does not cascade to it.
        let assessments = self.list_assessments_for_user(user_id).await?;
        let count = assessments.len();
        self.batch_delete_assessments(user_id, &assessments).await?;
        deleted_count += count;
        tracing::debug!(user_id, count, "Deleted assessments");

        // 2. Delete any pending verification code
        self.delete_verification_code(user_id).await?;
        deleted_count += 1;

        // 3. Delete the profile document
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::USERS)
            .document_id(user_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        deleted_count += 1;
        tracing::debug!(user_id, "Deleted user profile");

        tracing::info!(user_id, deleted_count, "User data deletion complete");

        Ok(deleted_count)
    }
}
