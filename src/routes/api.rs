// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Activity, AuthProvider, AxisConfig, ChartPoint, DailyEmissionLog};
use crate::services::{ChartSeriesBuilder, TripRequest, TripService};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/emission-log", post(submit_trip))
        .route("/api/emission-log/{user_id}", get(get_user_logs))
        .route(
            "/api/emission-log/chart-data/{user_id}",
            get(get_chart_data),
        )
}

// ─── User Profile ────────────────────────────────────────────

/// Current user response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    pub user_id: String,
    pub name: String,
    pub email: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "\"google\" | \"email\""))]
    pub auth_provider: AuthProvider,
    pub badges: Vec<String>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_emission_kg: Decimal,
}

/// Get current user profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserResponse>> {
    let profile = state
        .db
        .get_user(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.user_id)))?;

    Ok(Json(UserResponse {
        user_id: profile.user_id,
        name: profile.name,
        email: profile.email,
        auth_provider: profile.auth_provider,
        badges: profile.badges,
        total_emission_kg: profile.total_emission_kg,
    }))
}

// ─── Trip Submission ─────────────────────────────────────────

/// Tag for a trip that was saved while the lifetime total refresh failed.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ResponseWarning {
    pub kind: String,
    pub message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SubmitTripResponse {
    pub success: bool,
    /// Emission of the submitted trip (kg CO2)
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub emission: Decimal,
    /// Today's total including this trip (kg CO2)
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_emission: Decimal,
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub lifetime_total: Option<Decimal>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "binding-generation", ts(optional))]
    pub warning: Option<ResponseWarning>,
}

async fn submit_trip(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    body: std::result::Result<Json<TripRequest>, JsonRejection>,
) -> Result<Json<SubmitTripResponse>> {
    let Json(request) = body.map_err(|e| AppError::validation("body", e.body_text()))?;
    let trip = request.into_trip()?;
    user.ensure_owns(&trip.user_id)?;

    let result = TripService::new(state.db.clone())
        .submit_trip(trip, Utc::now())
        .await?;

    Ok(Json(SubmitTripResponse {
        success: true,
        emission: result.emission_kg,
        total_emission: result.daily_total_kg,
        lifetime_total: result.lifetime_total_kg,
        message: "Emission data saved successfully".to_string(),
        warning: result.secondary_failure.map(|message| ResponseWarning {
            kind: "secondary_update_failure".to_string(),
            message,
        }),
    }))
}

// ─── Logs ────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityResponse {
    pub vehicle_name: String,
    pub vehicle_type: String,
    pub fuel_category: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub distance_km: Decimal,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub fuel_efficiency: Decimal,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub emission_kg: Decimal,
}

impl From<Activity> for ActivityResponse {
    fn from(a: Activity) -> Self {
        Self {
            vehicle_name: a.vehicle_name,
            vehicle_type: a.vehicle_type,
            fuel_category: a.fuel_category.into(),
            distance_km: a.distance_km,
            fuel_efficiency: a.fuel_efficiency,
            emission_kg: a.emission_kg,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DailyLogResponse {
    pub user_id: String,
    pub user_name: String,
    /// YYYY-MM-DD
    pub date: String,
    pub activities: Vec<ActivityResponse>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_emission_kg: Decimal,
}

impl From<DailyEmissionLog> for DailyLogResponse {
    fn from(log: DailyEmissionLog) -> Self {
        Self {
            date: log.date.format("%Y-%m-%d").to_string(),
            user_id: log.user_id,
            user_name: log.user_name,
            activities: log.activities.into_iter().map(Into::into).collect(),
            total_emission_kg: log.total_emission_kg,
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LogsResponse {
    pub success: bool,
    pub logs: Vec<DailyLogResponse>,
}

async fn get_user_logs(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<Json<LogsResponse>> {
    user.ensure_owns(&user_id)?;

    let logs = TripService::new(state.db.clone())
        .get_user_logs(&user_id)
        .await?;

    Ok(Json(LogsResponse {
        success: true,
        logs: logs.into_iter().map(Into::into).collect(),
    }))
}

// ─── Chart ───────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartParams {
    start_date: Option<String>,
    end_date: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ChartResponse {
    pub success: bool,
    pub data: Vec<ChartPoint>,
    pub chart_config: AxisConfig,
}

async fn get_chart_data(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(user_id): Path<String>,
    Query(params): Query<ChartParams>,
) -> Result<Json<ChartResponse>> {
    user.ensure_owns(&user_id)?;

    let series = ChartSeriesBuilder::new(state.db.clone())
        .series(
            &user_id,
            params.start_date.as_deref(),
            params.end_date.as_deref(),
        )
        .await?;

    Ok(Json(ChartResponse {
        success: true,
        data: series.points,
        chart_config: series.axis,
    }))
}
