// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Lifetime emission totals.
//!
//! `User::total_emission_kg` is a cache over the user's daily logs. The logs
//! are the source of truth; this module is the only place that refreshes the
//! cached value.

use crate::db::Db;
use crate::error::{AppError, Result};
use crate::models::{checked_sum_kg, round_kg, DailyEmissionLog};
use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use rust_decimal::Decimal;
use serde::Serialize;

/// Maximum concurrent per-user recomputes during a backfill.
const BACKFILL_CONCURRENCY: usize = 50;

/// Sum of daily totals, rounded to 2 dp.
///
/// Fails instead of storing a clamped total when the sum overflows.
pub fn sum_daily_totals(logs: &[DailyEmissionLog]) -> Result<Decimal> {
    checked_sum_kg(logs.iter().map(|l| l.total_emission_kg))
        .map(round_kg)
        .ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "lifetime total overflowed over {} logs",
                logs.len()
            ))
        })
}

/// Outcome of a full backfill run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackfillReport {
    pub users_scanned: usize,
    /// Users whose stored total changed
    pub users_updated: usize,
    pub failures: usize,
}

enum RecomputeOutcome {
    Changed,
    Unchanged,
}

/// Recomputes cached lifetime totals from daily logs.
#[derive(Clone)]
pub struct UserTotalRecalculator {
    db: Db,
}

impl UserTotalRecalculator {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Recompute and store one user's lifetime total.
    ///
    /// If reading the logs fails, the stored total is left as it was.
    pub async fn recompute_total(&self, user_id: &str) -> Result<Decimal> {
        let logs = self.db.get_logs_for_user(user_id).await?;
        let total = sum_daily_totals(&logs)?;

        self.db.set_user_total(user_id, total, Utc::now()).await?;

        tracing::debug!(user_id, total = %total, logs = logs.len(), "User total recomputed");
        Ok(total)
    }

    /// Recompute only if the stored total is out of date.
    async fn refresh_if_stale(&self, user_id: &str, stored: Decimal) -> Result<RecomputeOutcome> {
        let logs = self.db.get_logs_for_user(user_id).await?;
        let total = sum_daily_totals(&logs)?;

        if total == stored {
            return Ok(RecomputeOutcome::Unchanged);
        }

        self.db.set_user_total(user_id, total, Utc::now()).await?;
        tracing::info!(
            user_id,
            previous = %stored,
            total = %total,
            "User total corrected"
        );
        Ok(RecomputeOutcome::Changed)
    }

    /// Recompute every user's total.
    ///
    /// Users are processed concurrently and in no particular order. A
    /// failure for one user is logged and counted, and does not stop the run.
    pub async fn backfill_all_user_totals(&self) -> Result<BackfillReport> {
        let users = self.db.list_users().await?;
        let users_scanned = users.len();

        tracing::info!(users = users_scanned, "Starting user total backfill");

        let outcomes: Vec<Result<RecomputeOutcome>> = stream::iter(users)
            .map(|user| async move {
                let result = self
                    .refresh_if_stale(&user.user_id, user.total_emission_kg)
                    .await;
                if let Err(e) = &result {
                    tracing::warn!(user_id = %user.user_id, error = %e, "Backfill failed for user");
                }
                result
            })
            .buffer_unordered(BACKFILL_CONCURRENCY)
            .collect()
            .await;

        let mut report = BackfillReport {
            users_scanned,
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome {
                Ok(RecomputeOutcome::Changed) => report.users_updated += 1,
                Ok(RecomputeOutcome::Unchanged) => {}
                Err(_) => report.failures += 1,
            }
        }

        tracing::info!(
            users_scanned = report.users_scanned,
            users_updated = report.users_updated,
            failures = report.failures,
            "User total backfill complete"
        );

        Ok(report)
    }
}
