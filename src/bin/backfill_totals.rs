// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Recompute every user's lifetime emission total from their daily logs.
//!
//! Safe to re-run: users whose stored total is already correct are not
//! written. Exits non-zero if any user failed.

use ecofootprint::{
    config::Config,
    db::{Db, FirestoreDb},
    init_logging,
    services::UserTotalRecalculator,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = Config::from_env()?;
    let db = Db::from(FirestoreDb::new(&config.gcp_project_id).await?);

    let report = UserTotalRecalculator::new(db)
        .backfill_all_user_totals()
        .await?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.failures > 0 {
        return Err(format!("{} user(s) could not be updated", report.failures).into());
    }
    Ok(())
}
