// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Leaderboard ranking: lowest lifetime emissions first.

use crate::db::Db;
use crate::error::Result;
use crate::models::{LeaderboardEntry, User};
use rust_decimal::Decimal;

pub const DEFAULT_LIMIT: usize = 10;

/// Smallest page read from the store while building a leaderboard.
const MIN_PAGE_SIZE: u32 = 20;

/// Over-fetch so that a page usually still fills the board after users
/// without a display name are dropped.
fn page_size(limit: usize) -> u32 {
    u32::try_from(limit.saturating_mul(2))
        .unwrap_or(u32::MAX)
        .max(MIN_PAGE_SIZE)
}

/// Rank users for the leaderboard.
///
/// Users without emissions or without a display name are left out. Ties
/// keep the input order.
pub fn rank_users(users: &[User], limit: usize) -> Vec<LeaderboardEntry> {
    let mut eligible: Vec<&User> = users
        .iter()
        .filter(|u| u.total_emission_kg > Decimal::ZERO && !u.name.trim().is_empty())
        .collect();

    // sort_by is stable
    eligible.sort_by(|a, b| a.total_emission_kg.cmp(&b.total_emission_kg));

    eligible
        .into_iter()
        .take(limit)
        .map(LeaderboardEntry::from)
        .collect()
}

/// Read-only leaderboard over the user store.
#[derive(Clone)]
pub struct LeaderboardRanker {
    db: Db,
}

impl LeaderboardRanker {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Top `limit` users by lowest lifetime emissions.
    ///
    /// Reads the store one page at a time, stopping once the board is full
    /// or the store runs out of users with emissions.
    pub async fn top_users(&self, limit: usize) -> Result<Vec<LeaderboardEntry>> {
        let page_size = page_size(limit);
        let mut ranked = Vec::with_capacity(limit);
        let mut offset: u32 = 0;
        let mut candidates = 0;

        while ranked.len() < limit {
            let page = self.db.list_users_with_emissions(page_size, offset).await?;
            candidates += page.len();
            // Pages arrive in ascending order, so per-page ranking extends the board
            ranked.extend(rank_users(&page, limit - ranked.len()));

            if page.len() < page_size as usize {
                break;
            }
            offset = offset.saturating_add(page_size);
        }

        tracing::debug!(candidates, returned = ranked.len(), "Leaderboard built");
        Ok(ranked)
    }
}
