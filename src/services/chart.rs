// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Emission history chart series.

use crate::db::Db;
use crate::error::{AppError, Result};
use crate::models::{AxisConfig, ChartPoint, ChartSeries, DailyEmissionLog};
use crate::time_utils::parse_calendar_date;
use chrono::NaiveDate;
use rust_decimal::Decimal;

const DEFAULT_Y_AXIS_MAX: Decimal = Decimal::ONE_HUNDRED;
const Y_AXIS_TICKS: Decimal = Decimal::TEN;

/// Round up to a multiple of 10. Near `Decimal::MAX`, where that multiple
/// is out of range, the plain ceiling is used.
fn ceil_to_ten(value: Decimal) -> Decimal {
    (value / Decimal::TEN)
        .ceil()
        .checked_mul(Decimal::TEN)
        .unwrap_or_else(|| value.ceil())
}

/// Axis scaling: max rounded up to a multiple of 10, ten ticks.
pub fn axis_config(points: &[ChartPoint]) -> AxisConfig {
    let y_axis_max = points
        .iter()
        .map(|p| p.emission)
        .max()
        .filter(|m| *m > Decimal::ZERO)
        .map(ceil_to_ten)
        .unwrap_or(DEFAULT_Y_AXIS_MAX);

    AxisConfig {
        y_axis_max,
        y_axis_step: (y_axis_max / Y_AXIS_TICKS).ceil(),
    }
}

/// One point per log, in the order given.
pub fn build_series(logs: &[DailyEmissionLog]) -> ChartSeries {
    let points: Vec<ChartPoint> = logs
        .iter()
        .map(|log| ChartPoint {
            date: log.date.format("%Y-%m-%d").to_string(),
            emission: log.total_emission_kg,
        })
        .collect();
    let axis = axis_config(&points);
    ChartSeries { points, axis }
}

fn parse_bound(field: &str, raw: Option<&str>) -> Result<NaiveDate> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::validation(field, format!("{} is required", field)))?;

    parse_calendar_date(raw).ok_or_else(|| {
        AppError::validation(field, format!("{} must be YYYY-MM-DD or RFC 3339", field))
    })
}

/// Builds chart series from a user's daily logs.
#[derive(Clone)]
pub struct ChartSeriesBuilder {
    db: Db,
}

impl ChartSeriesBuilder {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Daily totals for `user_id` between two inclusive calendar days.
    pub async fn series(
        &self,
        user_id: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<ChartSeries> {
        let start = parse_bound("startDate", start_date)?;
        let end = parse_bound("endDate", end_date)?;

        if self.db.get_user(user_id).await?.is_none() {
            return Err(AppError::NotFound(format!("User {} not found", user_id)));
        }

        if start > end {
            return Ok(build_series(&[]));
        }

        let logs = self.db.get_logs_in_range(user_id, start, end).await?;
        Ok(build_series(&logs))
    }
}
