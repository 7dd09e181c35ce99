//! Per-user daily usage counters.
//!
//! Counts live in memory only and are keyed by the UTC day-of-month they
//! belong to. When the day changes the whole map is swapped for an empty
//! one under the write lock.

use chrono::{DateTime, Datelike, Utc};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

/// Pause taken under the write lock before comparing days, so that
/// overlapping timer fires near the boundary collapse into one reset.
pub const RESET_SETTLE_DELAY: Duration = Duration::from_secs(1);

/// UTC day-of-month (1-31) for `now`.
pub fn utc_day(now: DateTime<Utc>) -> u32 {
    now.day()
}

struct QuotaState {
    day: u32,
    counts: HashMap<String, u32>,
}

pub struct QuotaTracker {
    state: RwLock<QuotaState>,
}

impl QuotaTracker {
    /// Tracker for the current UTC day with no counts.
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            state: RwLock::new(QuotaState {
                day: utc_day(now),
                counts: HashMap::new(),
            }),
        }
    }

    /// Record one chargeable completion for `user`.
    pub async fn increment(&self, user: &str) {
        let mut state = self.state.write().await;
        *state.counts.entry(user.to_string()).or_insert(0) += 1;
    }

    /// Completions charged to `user` today.
    pub async fn get(&self, user: &str) -> u32 {
        let state = self.state.read().await;
        state.counts.get(user).copied().unwrap_or(0)
    }

    /// Day-of-month the current counts belong to.
    pub async fn day(&self) -> u32 {
        self.state.read().await.day
    }

    /// Number of users with at least one charged completion today.
    pub async fn tracked_users(&self) -> usize {
        self.state.read().await.counts.len()
    }

    /// Clear all counts if the UTC day has changed since the last reset.
    ///
    /// `on_rollover` runs only when a reset actually happens, while the
    /// write lock is still held. Returns whether a reset happened.
    pub async fn reset_if_new_day<F: FnOnce()>(&self, on_rollover: F) -> bool {
        self.reset_if_new_day_with(Utc::now, on_rollover).await
    }

    /// Same as [`reset_if_new_day`](Self::reset_if_new_day) against a fixed instant.
    pub async fn reset_if_new_day_at<F: FnOnce()>(
        &self,
        now: DateTime<Utc>,
        on_rollover: F,
    ) -> bool {
        self.reset_if_new_day_with(move || now, on_rollover).await
    }

    async fn reset_if_new_day_with<N, F>(&self, now: N, on_rollover: F) -> bool
    where
        N: FnOnce() -> DateTime<Utc>,
        F: FnOnce(),
    {
        let mut state = self.state.write().await;
        tokio::time::sleep(RESET_SETTLE_DELAY).await;

        // Sample the clock after the pause, not before.
        let today = utc_day(now());
        if state.day == today {
            return false;
        }

        let previous_day = state.day;
        let cleared_users = state.counts.len();
        state.day = today;
        state.counts = HashMap::new();
        on_rollover();

        tracing::info!(
            previous_day,
            day = today,
            cleared_users,
            "Daily quota reset"
        );
        true
    }
}

impl Default for QuotaTracker {
    fn default() -> Self {
        Self::new()
    }
}
