// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod chart;
pub mod emission_log;
pub mod leaderboard;
pub mod user;

pub use chart::{AxisConfig, ChartPoint, ChartSeries};
pub use emission_log::{checked_sum_kg, round_kg, Activity, DailyEmissionLog, FuelCategory};
pub use leaderboard::LeaderboardEntry;
pub use user::{AuthProvider, User};
