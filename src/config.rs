//! Tunable game parameters.
//!
//! The engine never reads these from ambient globals; a `GameConfig` value is
//! built once by the shell (usually `GameConfig::default()`) and handed to
//! [`ClickEngine::new`](crate::clicker::engine::ClickEngine::new).

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Minimum gap between two accepted manual clicks.
    pub debounce_ms: f64,
    /// Personal click count at which the auto-clicker unlocks.
    pub auto_clicker_threshold: u64,
    /// Auto-click cadence.
    pub auto_click_period_ms: f64,
    /// Lifetime of a TeamBoost written to the team row.
    pub team_boost_duration_ms: f64,
    /// How long the "activated" notice stays up after a purchase.
    pub activation_notice_ms: f64,
    /// Rows shown per team on the leaderboard.
    pub leaderboard_limit: usize,
    pub username_min_len: usize,
    pub username_max_len: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 100.0,
            auto_clicker_threshold: 10,
            auto_click_period_ms: 1000.0,
            team_boost_duration_ms: 60_000.0,
            activation_notice_ms: 3_000.0,
            leaderboard_limit: 10,
            username_min_len: 3,
            username_max_len: 15,
        }
    }
}
