// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process document store.
//!
//! Mirrors the Firestore backend's operations on `DashMap`s. Each daily log
//! is one map entry, and the entry lock gives the same per-document atomic
//! read-modify-write the Firestore transaction provides.

use crate::error::AppError;
use crate::models::emission_log::log_document_id;
use crate::models::{Activity, DailyEmissionLog, User};
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// In-memory database.
#[derive(Clone, Default)]
pub struct MemoryDb {
    users: Arc<DashMap<String, User>>,
    logs: Arc<DashMap<String, DailyEmissionLog>>,
    fail_log_queries: Arc<AtomicBool>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every multi-log query fail with a database error.
    ///
    /// Single-document reads and writes keep working, which is how a
    /// failing user-total recompute after a successful log write looks.
    pub fn set_fail_log_queries(&self, fail: bool) {
        self.fail_log_queries.store(fail, Ordering::SeqCst);
    }

    fn check_log_queries(&self) -> Result<(), AppError> {
        if self.fail_log_queries.load(Ordering::SeqCst) {
            return Err(AppError::Database(
                "Emission log query failed (injected)".to_string(),
            ));
        }
        Ok(())
    }

    // ─── User Operations ─────────────────────────────────────────

    pub fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.get(user_id).map(|u| u.value().clone()))
    }

    pub fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        self.users.insert(user.user_id.clone(), user.clone());
        Ok(())
    }

    pub fn list_users(&self) -> Result<Vec<User>, AppError> {
        let mut users: Vec<User> = self.users.iter().map(|u| u.value().clone()).collect();
        // DashMap iteration order is arbitrary; creation order stands in for
        // the store's natural order.
        users.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        Ok(users)
    }

    pub fn list_users_with_emissions(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<User>, AppError> {
        let mut users: Vec<User> = self
            .list_users()?
            .into_iter()
            .filter(|u| u.total_emission_kg > Decimal::ZERO)
            .collect();
        users.sort_by(|a, b| a.total_emission_kg.cmp(&b.total_emission_kg));
        Ok(users
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    pub fn set_user_total(
        &self,
        user_id: &str,
        total: Decimal,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        match self.users.get_mut(user_id) {
            Some(mut user) => {
                user.total_emission_kg = total;
                user.updated_at = now;
                Ok(())
            }
            None => Err(AppError::NotFound(format!("User {} not found", user_id))),
        }
    }

    // ─── Emission Log Operations ─────────────────────────────────

    pub fn get_daily_log(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<DailyEmissionLog>, AppError> {
        Ok(self
            .logs
            .get(&log_document_id(user_id, date))
            .map(|l| l.value().clone()))
    }

    pub fn record_activity(
        &self,
        user_id: &str,
        user_name: &str,
        date: NaiveDate,
        activity: &Activity,
        now: DateTime<Utc>,
    ) -> Result<DailyEmissionLog, AppError> {
        let log = match self.logs.entry(log_document_id(user_id, date)) {
            Entry::Occupied(mut entry) => {
                entry
                    .get_mut()
                    .append_activity(activity.clone(), user_name, now);
                entry.get().clone()
            }
            Entry::Vacant(entry) => entry
                .insert(DailyEmissionLog::new(
                    user_id,
                    user_name,
                    date,
                    activity.clone(),
                    now,
                ))
                .clone(),
        };
        Ok(log)
    }

    pub fn get_logs_for_user(&self, user_id: &str) -> Result<Vec<DailyEmissionLog>, AppError> {
        self.check_log_queries()?;
        let mut logs: Vec<DailyEmissionLog> = self
            .logs
            .iter()
            .filter(|l| l.user_id == user_id)
            .map(|l| l.value().clone())
            .collect();
        logs.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(logs)
    }

    pub fn get_logs_in_range(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyEmissionLog>, AppError> {
        self.check_log_queries()?;
        let mut logs: Vec<DailyEmissionLog> = self
            .logs
            .iter()
            .filter(|l| l.user_id == user_id && l.date >= start && l.date <= end)
            .map(|l| l.value().clone())
            .collect();
        logs.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(logs)
    }
}
