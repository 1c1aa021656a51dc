// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily log aggregation.
//!
//! Every trip lands in the log for the (user, calendar day) it was submitted
//! on. A second trip the same day is appended to that log rather than
//! creating a new one.

use crate::db::Db;
use crate::error::Result;
use crate::models::{Activity, DailyEmissionLog};
use crate::time_utils::local_calendar_date;
use chrono::{DateTime, NaiveDate, Utc};

/// Merges submitted activities into per-day logs.
#[derive(Clone)]
pub struct DailyLogAggregator {
    db: Db,
}

impl DailyLogAggregator {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Record an activity submitted at `submitted_at`, keyed by its local
    /// calendar day.
    pub async fn record_activity(
        &self,
        user_id: &str,
        user_name: &str,
        submitted_at: DateTime<Utc>,
        activity: &Activity,
    ) -> Result<DailyEmissionLog> {
        let date = local_calendar_date(submitted_at);
        self.record_activity_on(user_id, user_name, date, activity, submitted_at)
            .await
    }

    /// Record an activity against an explicit calendar day.
    pub async fn record_activity_on(
        &self,
        user_id: &str,
        user_name: &str,
        date: NaiveDate,
        activity: &Activity,
        now: DateTime<Utc>,
    ) -> Result<DailyEmissionLog> {
        let log = self
            .db
            .record_activity(user_id, user_name, date, activity, now)
            .await?;

        tracing::info!(
            user_id,
            date = %date,
            emission_kg = %activity.emission_kg,
            daily_total = %log.total_emission_kg,
            activities = log.activities.len(),
            "Activity recorded"
        );

        Ok(log)
    }
}
