// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trip submission and per-user log retrieval.
//!
//! Handles the core workflow:
//! 1. Validate the submitted trip
//! 2. Compute its emission
//! 3. Merge it into the user's log for today
//! 4. Refresh the user's lifetime total (best effort)

use crate::db::Db;
use crate::error::{AppError, Result};
use crate::models::{Activity, DailyEmissionLog, FuelCategory};
use crate::services::emission::compute_emission;
use crate::services::{DailyLogAggregator, UserTotalRecalculator};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

/// Upper bound on a single trip's distance (km).
const MAX_DISTANCE_KM: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Smallest accepted positive fuel efficiency (km per liter or kWh).
///
/// Together with `MAX_DISTANCE_KM` this caps one trip at a few hundred
/// million kg, so daily and lifetime sums stay far inside `Decimal`.
const MIN_FUEL_EFFICIENCY: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Trip submission body.
///
/// Every field is optional at the serde level so a missing field is reported
/// as a validation error naming it, not as an opaque JSON error.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TripRequest {
    #[validate(required, length(min = 1, max = 128))]
    pub user_id: Option<String>,
    #[validate(required, length(min = 1, max = 100))]
    pub user_name: Option<String>,
    #[validate(required, length(min = 1, max = 100))]
    pub vehicle_name: Option<String>,
    #[validate(required, length(min = 1, max = 100))]
    pub vehicle_type: Option<String>,
    #[serde(alias = "vehicleCategory")]
    #[validate(required, length(min = 1, max = 100))]
    pub fuel_category: Option<String>,
    /// km per liter (or per kWh)
    #[validate(required)]
    pub fuel_efficiency: Option<Decimal>,
    /// km
    #[validate(required)]
    pub distance: Option<Decimal>,
}

/// A validated trip.
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    pub user_id: String,
    pub user_name: String,
    pub vehicle_name: String,
    pub vehicle_type: String,
    pub fuel_category: FuelCategory,
    pub fuel_efficiency: Decimal,
    pub distance_km: Decimal,
}

fn required<T>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| AppError::validation(field, format!("{} is required", field)))
}

impl TripRequest {
    /// Validate the request and turn it into a [`Trip`].
    pub fn into_trip(self) -> Result<Trip> {
        self.validate()?;

        let distance_km = required(self.distance, "distance")?;
        if distance_km <= Decimal::ZERO {
            return Err(AppError::validation(
                "distance",
                "distance must be greater than 0",
            ));
        }
        if distance_km > MAX_DISTANCE_KM {
            return Err(AppError::validation(
                "distance",
                "distance must be at most 1000000 km",
            ));
        }

        // Zero or negative still means "no emission"; only tiny positive
        // values are refused.
        let fuel_efficiency = required(self.fuel_efficiency, "fuelEfficiency")?;
        if fuel_efficiency > Decimal::ZERO && fuel_efficiency < MIN_FUEL_EFFICIENCY {
            return Err(AppError::validation(
                "fuelEfficiency",
                "fuelEfficiency must be at least 0.01 when positive",
            ));
        }

        Ok(Trip {
            user_id: required(self.user_id, "userId")?,
            user_name: required(self.user_name, "userName")?,
            vehicle_name: required(self.vehicle_name, "vehicleName")?,
            vehicle_type: required(self.vehicle_type, "vehicleType")?,
            fuel_category: FuelCategory::from(required(self.fuel_category, "fuelCategory")?),
            fuel_efficiency,
            distance_km,
        })
    }
}

/// Result of a trip submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitTripResult {
    /// Emission of this trip (kg CO2)
    pub emission_kg: Decimal,
    /// Today's total after this trip
    pub daily_total_kg: Decimal,
    /// Refreshed lifetime total; `None` if the refresh failed
    pub lifetime_total_kg: Option<Decimal>,
    /// Set when the trip was saved but the lifetime total refresh failed
    pub secondary_failure: Option<String>,
}

/// Trip submission workflow.
#[derive(Clone)]
pub struct TripService {
    db: Db,
    aggregator: DailyLogAggregator,
    totals: UserTotalRecalculator,
}

impl TripService {
    pub fn new(db: Db) -> Self {
        Self {
            aggregator: DailyLogAggregator::new(db.clone()),
            totals: UserTotalRecalculator::new(db.clone()),
            db,
        }
    }

    /// Record a trip for today.
    ///
    /// The log write and the lifetime total refresh are separate steps. If
    /// the refresh fails, the trip stays recorded and the failure is
    /// reported in `secondary_failure`.
    pub async fn submit_trip(&self, trip: Trip, now: DateTime<Utc>) -> Result<SubmitTripResult> {
        if self.db.get_user(&trip.user_id).await?.is_none() {
            return Err(AppError::NotFound(format!("User {} not found", trip.user_id)));
        }

        let emission_kg = compute_emission(&trip.fuel_category, trip.fuel_efficiency, trip.distance_km);

        let activity = Activity {
            vehicle_name: trip.vehicle_name,
            vehicle_type: trip.vehicle_type,
            fuel_category: trip.fuel_category,
            distance_km: trip.distance_km,
            fuel_efficiency: trip.fuel_efficiency,
            emission_kg,
        };

        let log = self
            .aggregator
            .record_activity(&trip.user_id, &trip.user_name, now, &activity)
            .await?;

        let (lifetime_total_kg, secondary_failure) =
            match self.totals.recompute_total(&trip.user_id).await {
                Ok(total) => (Some(total), None),
                Err(e) => {
                    tracing::error!(
                        user_id = %trip.user_id,
                        error = %e,
                        "Trip saved but lifetime total refresh failed"
                    );
                    (
                        None,
                        Some("Trip saved, but your lifetime total could not be updated yet".to_string()),
                    )
                }
            };

        Ok(SubmitTripResult {
            emission_kg,
            daily_total_kg: log.total_emission_kg,
            lifetime_total_kg,
            secondary_failure,
        })
    }

    /// All of a user's logs, most recent day first.
    pub async fn get_user_logs(&self, user_id: &str) -> Result<Vec<DailyEmissionLog>> {
        if self.db.get_user(user_id).await?.is_none() {
            return Err(AppError::NotFound(format!("User {} not found", user_id)));
        }
        self.db.get_logs_for_user(user_id).await
    }
}
