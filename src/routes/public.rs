// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Public routes: leaderboard, stateless estimator, air quality.

use crate::error::{AppError, Result};
use crate::models::{FuelCategory, LeaderboardEntry};
use crate::services::leaderboard::DEFAULT_LIMIT;
use crate::services::{compute_emission, AirQualityReport, LeaderboardRanker};
use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

const MAX_LEADERBOARD_LIMIT: usize = 100;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/leaderboard", get(get_leaderboard))
        .route("/api/vehicle", post(estimate_emission))
        .route("/api/aqi", get(get_air_quality))
}

// ─── Leaderboard ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LeaderboardParams {
    limit: Option<usize>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LeaderboardResponse {
    pub success: bool,
    pub leaderboard: Vec<LeaderboardEntry>,
}

async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    params: std::result::Result<Query<LeaderboardParams>, QueryRejection>,
) -> Result<Json<LeaderboardResponse>> {
    let Query(params) = params.map_err(|_| {
        AppError::validation("limit", "limit must be a positive integer")
    })?;

    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    if !(1..=MAX_LEADERBOARD_LIMIT).contains(&limit) {
        return Err(AppError::validation(
            "limit",
            format!("limit must be between 1 and {}", MAX_LEADERBOARD_LIMIT),
        ));
    }

    let leaderboard = LeaderboardRanker::new(state.db.clone())
        .top_users(limit)
        .await?;

    Ok(Json(LeaderboardResponse {
        success: true,
        leaderboard,
    }))
}

// ─── Stateless Estimator ─────────────────────────────────────

/// Estimate request. `vehicleType` carries the fuel category.
#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRequest {
    #[validate(required, length(min = 1, max = 100))]
    vehicle_type: Option<String>,
    #[validate(required)]
    fuel_efficiency: Option<Decimal>,
    #[validate(required)]
    distance: Option<Decimal>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct EstimateResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub emission: Decimal,
}

/// Compute a trip's emission without storing anything.
async fn estimate_emission(
    body: std::result::Result<Json<EstimateRequest>, JsonRejection>,
) -> Result<Json<EstimateResponse>> {
    let Json(request) = body.map_err(|e| AppError::validation("body", e.body_text()))?;
    request.validate()?;

    let (Some(vehicle_type), Some(fuel_efficiency), Some(distance)) =
        (request.vehicle_type, request.fuel_efficiency, request.distance)
    else {
        return Err(AppError::validation("body", "All fields are required"));
    };

    if fuel_efficiency <= Decimal::ZERO {
        return Err(AppError::validation(
            "fuelEfficiency",
            "Invalid fuel efficiency",
        ));
    }

    let emission = compute_emission(&FuelCategory::from(vehicle_type), fuel_efficiency, distance);
    Ok(Json(EstimateResponse { emission }))
}

// ─── Air Quality ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct AirQualityParams {
    location: Option<String>,
}

async fn get_air_quality(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AirQualityParams>,
) -> Result<Json<AirQualityReport>> {
    let location = params.location.unwrap_or_default();
    let report = state.air_quality.lookup(&location).await?;
    Ok(Json(report))
}
