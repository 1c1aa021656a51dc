//! Database layer (Firestore, with an in-memory backend for tests).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::error::AppError;
use crate::models::{Activity, DailyEmissionLog, User};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

/// Collection names as constants.
pub mod collections {
    /// User profiles (keyed by external user ID)
    pub const USERS: &str = "users";
    /// Daily emission logs (keyed by `{user_id}_{YYYY-MM-DD}`)
    pub const EMISSION_LOGS: &str = "emission_logs";
}

/// Document store used by the services.
#[derive(Clone)]
pub enum Db {
    Firestore(FirestoreDb),
    Memory(MemoryDb),
}

impl Db {
    pub fn memory() -> Self {
        Db::Memory(MemoryDb::new())
    }

    /// The in-memory backend, if that is what this is.
    pub fn as_memory(&self) -> Option<&MemoryDb> {
        match self {
            Db::Memory(db) => Some(db),
            Db::Firestore(_) => None,
        }
    }

    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        match self {
            Db::Firestore(db) => db.get_user(user_id).await,
            Db::Memory(db) => db.get_user(user_id),
        }
    }

    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        match self {
            Db::Firestore(db) => db.upsert_user(user).await,
            Db::Memory(db) => db.upsert_user(user),
        }
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        match self {
            Db::Firestore(db) => db.list_users().await,
            Db::Memory(db) => db.list_users(),
        }
    }

    /// One page of users whose lifetime total is positive, ascending by total.
    pub async fn list_users_with_emissions(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<User>, AppError> {
        match self {
            Db::Firestore(db) => db.list_users_with_emissions(limit, offset).await,
            Db::Memory(db) => db.list_users_with_emissions(limit, offset),
        }
    }

    pub async fn set_user_total(
        &self,
        user_id: &str,
        total: Decimal,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        match self {
            Db::Firestore(db) => db.set_user_total(user_id, total, now).await,
            Db::Memory(db) => db.set_user_total(user_id, total, now),
        }
    }

    pub async fn get_daily_log(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<DailyEmissionLog>, AppError> {
        match self {
            Db::Firestore(db) => db.get_daily_log(user_id, date).await,
            Db::Memory(db) => db.get_daily_log(user_id, date),
        }
    }

    /// Append an activity to the (user, day) log in one atomic step.
    pub async fn record_activity(
        &self,
        user_id: &str,
        user_name: &str,
        date: NaiveDate,
        activity: &Activity,
        now: DateTime<Utc>,
    ) -> Result<DailyEmissionLog, AppError> {
        match self {
            Db::Firestore(db) => {
                db.record_activity(user_id, user_name, date, activity, now)
                    .await
            }
            Db::Memory(db) => db.record_activity(user_id, user_name, date, activity, now),
        }
    }

    pub async fn get_logs_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<DailyEmissionLog>, AppError> {
        match self {
            Db::Firestore(db) => db.get_logs_for_user(user_id).await,
            Db::Memory(db) => db.get_logs_for_user(user_id),
        }
    }

    pub async fn get_logs_in_range(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyEmissionLog>, AppError> {
        match self {
            Db::Firestore(db) => db.get_logs_in_range(user_id, start, end).await,
            Db::Memory(db) => db.get_logs_in_range(user_id, start, end),
        }
    }
}

impl From<FirestoreDb> for Db {
    fn from(db: FirestoreDb) -> Self {
        Db::Firestore(db)
    }
}

impl From<MemoryDb> for Db {
    fn from(db: MemoryDb) -> Self {
        Db::Memory(db)
    }
}
