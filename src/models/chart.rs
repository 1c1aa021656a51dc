// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Chart series projections of daily logs.

use rust_decimal::Decimal;
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// One point on the emission history chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ChartPoint {
    /// Calendar day (YYYY-MM-DD)
    pub date: String,
    /// Daily total (kg CO2)
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub emission: Decimal,
}

/// Y-axis scaling for the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AxisConfig {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub y_axis_max: Decimal,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub y_axis_step: Decimal,
}

/// Points plus the derived axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub points: Vec<ChartPoint>,
    pub axis: AxisConfig,
}
