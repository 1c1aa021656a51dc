// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile + lifetime emission total)
//! - Emission logs (one document per user per day, activities embedded)

use crate::db::collections;
use crate::error::AppError;
use crate::models::emission_log::log_document_id;
use crate::models::{Activity, DailyEmissionLog, User};
use chrono::{DateTime, NaiveDate, Utc};
use firestore::errors::{BackoffError, FirestoreError};
use firestore::FirestoreQueryDirection;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Field-mask update of a user's lifetime total.
#[derive(Serialize, Deserialize)]
struct UserTotalUpdate {
    total_emission_kg: Decimal,
    updated_at: DateTime<Utc>,
}

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

        // Dummy token: the emulator does not check credentials.
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

    /// Get a user by external user ID.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or replace a user.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
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

    /// List every user (batch maintenance only).
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Users with a positive lifetime total, lowest total first (paginated).
    pub async fn list_users_with_emissions(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(|q| q.for_all([q.field("total_emission_kg").greater_than(0.0)]))
            .order_by([("total_emission_kg", FirestoreQueryDirection::Ascending)])
            .limit(limit)
            .offset(offset)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Overwrite only the lifetime total (and `updated_at`) of a user.
    pub async fn set_user_total(
        &self,
        user_id: &str,
        total: Decimal,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let update = UserTotalUpdate {
            total_emission_kg: total,
            updated_at: now,
        };

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(firestore::paths!(UserTotalUpdate::{total_emission_kg, updated_at}))
            .in_col(collections::USERS)
            .document_id(user_id)
            .object(&update)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Emission Log Operations ─────────────────────────────────

    /// Get a user's log for one day.
    pub async fn get_daily_log(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<DailyEmissionLog>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::EMISSION_LOGS)
            .obj()
            .one(&log_document_id(user_id, date))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Atomically append an activity to a user's log for `date`, creating the
    /// log if needed.
    ///
    /// Runs in a Firestore transaction: the read registers the document for
    /// conflict detection, so concurrent submissions for the same day are
    /// retried with fresh data instead of overwriting each other.
    pub async fn record_activity(
        &self,
        user_id: &str,
        user_name: &str,
        date: NaiveDate,
        activity: &Activity,
        now: DateTime<Utc>,
    ) -> Result<DailyEmissionLog, AppError> {
        let doc_id = log_document_id(user_id, date);

        let log = self
            .get_client()?
            .run_transaction(|db, transaction| {
                let doc_id = doc_id.clone();
                let user_id = user_id.to_string();
                let user_name = user_name.to_string();
                let activity = activity.clone();

                Box::pin(async move {
                    let existing: Option<DailyEmissionLog> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::EMISSION_LOGS)
                        .obj()
                        .one(&doc_id)
                        .await?;

                    let log = match existing {
                        Some(mut log) => {
                            log.append_activity(activity, &user_name, now);
                            log
                        }
                        None => DailyEmissionLog::new(user_id, user_name, date, activity, now),
                    };

                    db.fluent()
                        .update()
                        .in_col(collections::EMISSION_LOGS)
                        .document_id(&doc_id)
                        .object(&log)
                        .add_to_transaction(transaction)?;

                    Ok::<DailyEmissionLog, BackoffError<FirestoreError>>(log)
                })
            })
            .await
            .map_err(|e| AppError::Database(format!("Failed to record activity: {}", e)))?;

        tracing::debug!(
            user_id,
            date = %date,
            activities = log.activities.len(),
            total = %log.total_emission_kg,
            "Emission log written"
        );

        Ok(log)
    }

    /// All logs for a user, most recent day first.
    pub async fn get_logs_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<DailyEmissionLog>, AppError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::EMISSION_LOGS)
            .filter(move |q| q.for_all([q.field("user_id").eq(user_id.clone())]))
            .order_by([("date", FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Logs for a user within an inclusive day range, oldest first.
    ///
    /// Dates are stored as `YYYY-MM-DD`, so string comparison is date order.
    pub async fn get_logs_in_range(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyEmissionLog>, AppError> {
        let user_id = user_id.to_string();
        let start = start.format("%Y-%m-%d").to_string();
        let end = end.format("%Y-%m-%d").to_string();

        self.get_client()?
            .fluent()
            .select()
            .from(collections::EMISSION_LOGS)
            .filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id.clone()),
                    q.field("date").greater_than_or_equal(start.clone()),
                    q.field("date").less_than_or_equal(end.clone()),
                ])
            })
            .order_by([("date", FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
