// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! EcoFootprint API Server
//!
//! Records trips, computes their emissions and serves per-user history,
//! charts and the low-emission leaderboard.

use ecofootprint::{
    config::Config,
    db::{Db, FirestoreDb},
    init_logging,
    services::{AirQualityClient, FirebaseAuthVerifier},
    AppState,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting EcoFootprint API");

    // Initialize Firestore database
    let db = Db::from(FirestoreDb::new(&config.gcp_project_id).await?);

    let firebase_verifier = Arc::new(FirebaseAuthVerifier::new(&config)?);

    let air_quality = AirQualityClient::new(&config);
    if config.openweather_api_key.is_none() {
        tracing::warn!("OPENWEATHER_API_KEY not set; air quality lookups will fail");
    }

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        firebase_verifier,
        air_quality,
    });

    // Build router
    let app = ecofootprint::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
