// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily emission log model: one document per user per calendar day,
//! holding every trip (activity) submitted that day.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Round a kg CO2 quantity to 2 decimal places, half away from zero.
pub fn round_kg(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Sum kg quantities, or `None` if the sum leaves the `Decimal` range.
pub fn checked_sum_kg(values: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, value| acc.checked_add(value))
}

/// Fuel category of a vehicle.
///
/// Unrecognized strings are kept verbatim in `Other` so the stored activity
/// still shows what the user submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FuelCategory {
    Petrol,
    Diesel,
    Cng,
    Electric,
    Other(String),
}

impl FuelCategory {
    pub fn as_str(&self) -> &str {
        match self {
            FuelCategory::Petrol => "Petrol",
            FuelCategory::Diesel => "Diesel",
            FuelCategory::Cng => "CNG",
            FuelCategory::Electric => "Electric",
            FuelCategory::Other(raw) => raw,
        }
    }
}

impl From<String> for FuelCategory {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Petrol" => FuelCategory::Petrol,
            "Diesel" => FuelCategory::Diesel,
            "CNG" => FuelCategory::Cng,
            "Electric" => FuelCategory::Electric,
            _ => FuelCategory::Other(value),
        }
    }
}

impl From<&str> for FuelCategory {
    fn from(value: &str) -> Self {
        FuelCategory::from(value.to_string())
    }
}

impl From<FuelCategory> for String {
    fn from(value: FuelCategory) -> Self {
        match value {
            FuelCategory::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// A single trip, embedded in a daily log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub vehicle_name: String,
    /// Free-text vehicle category (Sedan, SUV, Scooter, ...)
    pub vehicle_type: String,
    pub fuel_category: FuelCategory,
    /// Distance traveled (km)
    pub distance_km: Decimal,
    /// km per liter, or km per kWh for electric vehicles
    pub fuel_efficiency: Decimal,
    /// Computed emission (kg CO2, 2 decimal places)
    pub emission_kg: Decimal,
}

/// Per-user, per-day aggregate of activities.
///
/// Stored at: `emission_logs/{user_id}_{YYYY-MM-DD}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyEmissionLog {
    pub user_id: String,
    /// Denormalized display name (last submission wins)
    pub user_name: String,
    /// Calendar day in server local time
    pub date: NaiveDate,
    /// Activities in submission order
    #[serde(default)]
    pub activities: Vec<Activity>,
    /// Sum of activity emissions (kg CO2, 2 decimal places)
    #[serde(default)]
    pub total_emission_kg: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Document ID for a user's log on a given day.
///
/// The ID encodes the (user, day) identity so a second log for the same
/// day cannot exist.
pub fn log_document_id(user_id: &str, date: NaiveDate) -> String {
    format!("{}_{}", urlencoding::encode(user_id), date.format("%Y-%m-%d"))
}

impl DailyEmissionLog {
    /// Start a new log with its first activity.
    pub fn new(
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        date: NaiveDate,
        activity: Activity,
        now: DateTime<Utc>,
    ) -> Self {
        let mut log = Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
            date,
            activities: vec![activity],
            total_emission_kg: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        };
        log.recompute_total();
        log
    }

    /// Append an activity and refresh the daily total.
    pub fn append_activity(&mut self, activity: Activity, user_name: &str, now: DateTime<Utc>) {
        self.activities.push(activity);
        self.user_name = user_name.to_string();
        self.updated_at = now;
        self.recompute_total();
    }

    /// Recompute the daily total from the activity list.
    ///
    /// Saturates at `Decimal::MAX` rather than overflowing.
    pub fn recompute_total(&mut self) {
        let sum = self
            .activities
            .iter()
            .fold(Decimal::ZERO, |acc, a| acc.saturating_add(a.emission_kg));
        self.total_emission_kg = round_kg(sum);
    }
}
