//! Semantic action IDs for Team Clicker click targets.
//!
//! These IDs are registered during render and dispatched via `InputEvent::Click`.

// ── Team selection ──────────────────────────────────────────────
pub const SELECT_TEAM_BASE: u16 = 0; // + Team::index()
pub const EDIT_USERNAME: u16 = 5;
pub const SUBMIT_USERNAME: u16 = 6;

// ── Tab navigation ──────────────────────────────────────────────
pub const TAB_GAME: u16 = 10;
pub const TAB_SHOP: u16 = 11;
pub const TAB_LEADERBOARD: u16 = 12;

// ── Game screen ─────────────────────────────────────────────────
pub const CLICK_BUTTON: u16 = 20;
pub const CHANGE_TEAM: u16 = 21;
pub const CONFIRM_CHANGE_TEAM: u16 = 22;
pub const CANCEL_CHANGE_TEAM: u16 = 23;

// ── Shop (base + display index among available bonuses) ─────────
pub const BUY_BONUS_BASE: u16 = 100;

// ── Leaderboard team tabs (base + Team::index()) ────────────────
pub const RANK_TEAM_BASE: u16 = 200;
