// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod air_quality;
pub mod chart;
pub mod daily_log;
pub mod emission;
pub mod firebase_auth;
pub mod leaderboard;
pub mod totals;
pub mod trips;

pub use air_quality::{AirQualityClient, AirQualityReport};
pub use chart::ChartSeriesBuilder;
pub use daily_log::DailyLogAggregator;
pub use emission::compute_emission;
pub use firebase_auth::{FirebaseAuthError, FirebaseAuthVerifier, FirebaseIdentity};
pub use leaderboard::LeaderboardRanker;
pub use totals::{BackfillReport, UserTotalRecalculator};
pub use trips::{SubmitTripResult, Trip, TripRequest, TripService};
