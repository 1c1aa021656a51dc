// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Leaderboard entry projection.

use rust_decimal::Decimal;
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::User;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub name: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_emission_kg: Decimal,
}

impl From<&User> for LeaderboardEntry {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id.clone(),
            name: user.name.clone(),
            total_emission_kg: user.total_emission_kg,
        }
    }
}
