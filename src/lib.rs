// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! EcoFootprint: personal transport carbon accounting
//!
//! This crate provides the backend API for logging trips, computing their
//! CO2 emissions, and aggregating them into daily logs, lifetime totals,
//! a leaderboard and chart series.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Db;
use services::{AirQualityClient, FirebaseAuthVerifier};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "ecofootprint=debug,info";

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Db,
    pub firebase_verifier: Arc<FirebaseAuthVerifier>,
    pub air_quality: AirQualityClient,
}

/// Initialize structured JSON logging (GCP-compliant).
///
/// `RUST_LOG` overrides the default filter.
pub fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
