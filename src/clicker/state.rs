/// Team Clicker state definitions.

use serde::{Deserialize, Serialize};

/// The two fixed teams.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    Red,
    Blue,
}

impl Team {
    /// All teams in display order.
    pub fn all() -> &'static [Team] {
        &[Team::Red, Team::Blue]
    }

    /// Document id on the shared ledger and value stored locally.
    pub fn id(&self) -> &'static str {
        match self {
            Team::Red => "Rouge",
            Team::Blue => "Bleu",
        }
    }

    pub fn from_id(id: &str) -> Option<Team> {
        match id {
            "Rouge" => Some(Team::Red),
            "Bleu" => Some(Team::Blue),
            _ => None,
        }
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            Team::Red => "赤チーム",
            Team::Blue => "青チーム",
        }
    }

    pub fn opponent(&self) -> Team {
        match self {
            Team::Red => Team::Blue,
            Team::Blue => Team::Red,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Team::Red => 0,
            Team::Blue => 1,
        }
    }
}

pub type BonusId = u32;

/// Named one-shot abilities. Closed set so every effect is matched exhaustively.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecialAbility {
    /// Debits the opposing team's counter by `effect`.
    ConversionRay,
    /// Credits the own team's counter by `2 × effect`.
    OrbitalStrike,
}

/// What a bonus does once owned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BonusCategory {
    /// Adds `effect` auto-clicks per tick.
    AutoClicker,
    /// Multiplies every click by `effect`.
    ClickMultiplier,
    /// Writes a temporary boost of `effect` to the own team row.
    TeamBoost,
    Special(SpecialAbility),
}

impl BonusCategory {
    /// Label used in the persisted bonus list.
    pub fn label(&self) -> &'static str {
        match self {
            BonusCategory::AutoClicker => "AutoClicker",
            BonusCategory::ClickMultiplier => "ClickMultiplier",
            BonusCategory::TeamBoost => "TeamBoost",
            BonusCategory::Special(_) => "SpecialAbility",
        }
    }
}

/// A purchasable shop entry. Immutable once the catalog is built.
#[derive(Clone, Debug, PartialEq)]
pub struct BonusDefinition {
    pub id: BonusId,
    pub name: String,
    pub cost: u64,
    pub effect: f64,
    pub category: BonusCategory,
    pub description: String,
}

impl BonusDefinition {
    /// Short effect summary for the shop list.
    pub fn effect_label(&self) -> String {
        match self.category {
            BonusCategory::AutoClicker => format!("+{} クリック/秒", self.effect),
            BonusCategory::ClickMultiplier => format!("クリック x{}", self.effect),
            BonusCategory::TeamBoost => format!("チームブースト +{}", self.effect),
            BonusCategory::Special(SpecialAbility::ConversionRay) => {
                format!("相手チーム -{}", self.effect)
            }
            BonusCategory::Special(SpecialAbility::OrbitalStrike) => {
                format!("自チーム +{}", self.effect * 2.0)
            }
        }
    }
}

/// Per-device progress. Mirrors what is kept in local storage.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PersonalProgress {
    pub team: Option<Team>,
    pub personal_clicks: u64,
    pub username: Option<String>,
    pub auto_clicker_unlocked: bool,
    /// Purchase order is preserved; each id appears at most once.
    pub purchased_bonuses: Vec<BonusId>,
}

impl PersonalProgress {
    pub fn owns(&self, id: BonusId) -> bool {
        self.purchased_bonuses.contains(&id)
    }
}

/// Whether gameplay is enabled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Unselected,
    Active,
}

/// Remote per-team document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TeamLedgerRow {
    pub clicks: i64,
    pub members: i64,
    pub temporary_boost: Option<i64>,
    /// Epoch milliseconds.
    pub boost_expiration: Option<f64>,
}

impl TeamLedgerRow {
    /// Boost still in effect at `now_ms`, 0 once expired.
    pub fn active_boost(&self, now_ms: f64) -> i64 {
        match (self.temporary_boost, self.boost_expiration) {
            (Some(boost), Some(until)) if now_ms < until => boost,
            _ => 0,
        }
    }

    /// Seconds of boost left at `now_ms`.
    pub fn boost_seconds_left(&self, now_ms: f64) -> u64 {
        match self.boost_expiration {
            Some(until) if now_ms < until && self.temporary_boost.is_some() => {
                ((until - now_ms) / 1000.0).ceil() as u64
            }
            _ => 0,
        }
    }
}

/// Remote per-player document, keyed by username.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerLedgerRow {
    pub name: String,
    pub team: Team,
    /// Epoch milliseconds.
    pub joined_at: Option<f64>,
    pub clicks: i64,
}

/// Snapshot of both team rows, replaced wholesale on every push.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TeamTotals {
    rows: [TeamLedgerRow; 2],
}

impl TeamTotals {
    pub fn new(red: TeamLedgerRow, blue: TeamLedgerRow) -> Self {
        Self { rows: [red, blue] }
    }

    pub fn get(&self, team: Team) -> &TeamLedgerRow {
        &self.rows[team.index()]
    }

    pub fn get_mut(&mut self, team: Team) -> &mut TeamLedgerRow {
        &mut self.rows[team.index()]
    }

    /// Team click count as shown to players (never negative).
    pub fn clicks(&self, team: Team) -> u64 {
        self.get(team).clicks.max(0) as u64
    }

    /// Percentage of all clicks held by `team`. 50/50 while nobody has clicked.
    pub fn share(&self, team: Team) -> f64 {
        let total = self.clicks(Team::Red) + self.clicks(Team::Blue);
        if total == 0 {
            50.0
        } else {
            self.clicks(team) as f64 / total as f64 * 100.0
        }
    }
}

/// One-time messages raised by the engine for the presentation layer.
#[derive(Clone, Debug, PartialEq)]
pub enum Notification {
    AutoClickerUnlocked,
    BonusPurchased { id: BonusId },
}

/// Transient "activated" banner shown after a purchase.
#[derive(Clone, Debug, PartialEq)]
pub struct ActivationNotice {
    pub bonus: BonusId,
    /// Epoch milliseconds.
    pub until: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_ids_roundtrip() {
        for team in Team::all() {
            assert_eq!(Team::from_id(team.id()), Some(*team));
        }
        assert_eq!(Team::from_id("Vert"), None);
    }

    #[test]
    fn opponent_is_the_other_team() {
        assert_eq!(Team::Red.opponent(), Team::Blue);
        assert_eq!(Team::Blue.opponent(), Team::Red);
    }

    #[test]
    fn share_defaults_to_even_split() {
        let totals = TeamTotals::default();
        assert!((totals.share(Team::Red) - 50.0).abs() < 0.001);
        assert!((totals.share(Team::Blue) - 50.0).abs() < 0.001);
    }

    #[test]
    fn share_is_proportional() {
        let mut totals = TeamTotals::default();
        totals.get_mut(Team::Red).clicks = 30;
        totals.get_mut(Team::Blue).clicks = 10;
        assert!((totals.share(Team::Red) - 75.0).abs() < 0.001);
        assert!((totals.share(Team::Blue) - 25.0).abs() < 0.001);
    }

    #[test]
    fn share_ignores_negative_counters() {
        let mut totals = TeamTotals::default();
        totals.get_mut(Team::Red).clicks = -20;
        totals.get_mut(Team::Blue).clicks = 10;
        assert_eq!(totals.clicks(Team::Red), 0);
        assert!((totals.share(Team::Blue) - 100.0).abs() < 0.001);
    }

    #[test]
    fn boost_only_active_before_expiration() {
        let row = TeamLedgerRow {
            temporary_boost: Some(10),
            boost_expiration: Some(60_000.0),
            ..Default::default()
        };
        assert_eq!(row.active_boost(0.0), 10);
        assert_eq!(row.boost_seconds_left(0.0), 60);
        assert_eq!(row.boost_seconds_left(59_500.0), 1);
        assert_eq!(row.active_boost(60_000.0), 0);
        assert_eq!(row.boost_seconds_left(60_000.0), 0);
    }

    #[test]
    fn owns_checks_purchased_list() {
        let progress = PersonalProgress {
            purchased_bonuses: vec![3, 1],
            ..Default::default()
        };
        assert!(progress.owns(1));
        assert!(!progress.owns(2));
    }
}
