//! Click reconciliation: turns taps, auto-click ticks, and purchases into
//! updates of local progress and the shared ledger.
//!
//! Local progress is the source of truth for everything the player owns.
//! Ledger writes are fire-and-forget: each one is attempted once, failures are
//! logged, and nothing downstream waits on them. Team totals shown on screen
//! come only from ledger snapshots, never from local arithmetic.

use std::rc::Rc;

use crate::config::GameConfig;
use crate::error::{PurchaseError, ValidationError};
use crate::ticker::Ticker;

use super::catalog::Catalog;
use super::effects::{self, EffectRates};
use super::ledger::{CounterField, DocRef, Ledger, LedgerWrite, Subscription, TimestampField};
use super::save::{KeyValueStore, ProgressStore};
use super::state::{
    ActivationNotice, BonusCategory, BonusDefinition, BonusId, Notification, PersonalProgress,
    Phase, SpecialAbility, Team, TeamTotals,
};

/// Result of a manual tap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClickOutcome {
    /// Credited `gained` clicks.
    Accepted { gained: u64 },
    /// Arrived inside the debounce window and was dropped.
    Debounced,
    /// No team chosen yet.
    Inactive,
}

pub struct ClickEngine {
    config: GameConfig,
    catalog: Catalog,
    store: ProgressStore,
    ledger: Rc<dyn Ledger>,
    progress: PersonalProgress,
    rates: EffectRates,
    last_click_ms: Option<f64>,
    ticker: Ticker,
    team_feed: Subscription<TeamTotals>,
    totals: TeamTotals,
    activation: Option<ActivationNotice>,
    notifications: Vec<Notification>,
}

impl ClickEngine {
    /// Load local progress and subscribe to team totals.
    pub fn new(
        config: GameConfig,
        catalog: Catalog,
        kv: Rc<dyn KeyValueStore>,
        ledger: Rc<dyn Ledger>,
    ) -> Self {
        let store = ProgressStore::new(kv);
        let progress = store.load(&catalog);
        let rates = effects::aggregate(catalog.resolve(&progress.purchased_bonuses));
        let team_feed = ledger.subscribe_teams();
        let ticker = Ticker::new(config.auto_click_period_ms);
        let mut engine = Self {
            config,
            catalog,
            store,
            ledger,
            progress,
            rates,
            last_click_ms: None,
            ticker,
            team_feed,
            totals: TeamTotals::default(),
            activation: None,
            notifications: Vec::new(),
        };
        engine.poll_remote();
        engine
    }

    // ── Queries ─────────────────────────────────────────────────

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn progress(&self) -> &PersonalProgress {
        &self.progress
    }

    pub fn rates(&self) -> EffectRates {
        self.rates
    }

    pub fn phase(&self) -> Phase {
        if self.progress.team.is_some() {
            Phase::Active
        } else {
            Phase::Unselected
        }
    }

    pub fn team(&self) -> Option<Team> {
        self.progress.team
    }

    /// Latest team totals pushed by the ledger.
    pub fn totals(&self) -> &TeamTotals {
        &self.totals
    }

    pub fn auto_clicker_running(&self) -> bool {
        self.ticker.is_armed()
    }

    /// `personal_clicks >= cost`. Unknown ids are never purchasable.
    pub fn can_purchase(&self, id: BonusId) -> bool {
        self.catalog
            .get(id)
            .is_some_and(|b| self.progress.personal_clicks >= b.cost)
    }

    /// Shop entries not yet owned, in catalog order.
    pub fn available_bonuses(&self) -> Vec<&BonusDefinition> {
        self.catalog
            .all()
            .iter()
            .filter(|b| !self.progress.owns(b.id))
            .collect()
    }

    /// Owned bonuses in purchase order.
    pub fn owned_bonuses(&self) -> Vec<&BonusDefinition> {
        self.catalog.resolve(&self.progress.purchased_bonuses).collect()
    }

    /// Whether any not-yet-owned bonus is affordable right now.
    pub fn has_affordable_bonus(&self) -> bool {
        self.available_bonuses()
            .iter()
            .any(|b| self.progress.personal_clicks >= b.cost)
    }

    /// The bonus whose "activated" banner is still up at `now_ms`.
    pub fn activation_notice(&self, now_ms: f64) -> Option<&BonusDefinition> {
        self.activation
            .as_ref()
            .filter(|n| now_ms < n.until)
            .and_then(|n| self.catalog.get(n.bonus))
    }

    /// Drain one-time notifications raised since the last call.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    // ── Team lifecycle ──────────────────────────────────────────

    /// Validate and persist the username.
    pub fn set_username(&mut self, raw: &str) -> Result<(), ValidationError> {
        let name = raw.trim();
        let len = name.chars().count();
        let (min, max) = (self.config.username_min_len, self.config.username_max_len);
        if len < min || len > max {
            return Err(ValidationError::UsernameLength { len, min, max });
        }
        self.store.save_username(name);
        self.progress.username = Some(name.to_string());
        Ok(())
    }

    /// `Unselected → Active`.
    ///
    /// The local write gates the transition; the ledger upsert is best-effort.
    pub fn select_team(&mut self, team: Team, now_ms: f64) -> Result<(), ValidationError> {
        if self.progress.team.is_some() {
            return Err(ValidationError::TeamAlreadySelected);
        }
        let Some(username) = self.progress.username.clone() else {
            return Err(ValidationError::MissingUsername);
        };

        self.store.save_team(Some(team));
        self.progress.team = Some(team);
        log::info!("{username} joined {}", team.id());

        match self.ledger.get_player(&username) {
            Ok(Some(_)) => {}
            Ok(None) => self.send(LedgerWrite::SetTimestamp {
                doc: DocRef::Player(username.clone()),
                field: TimestampField::JoinedAt,
                at_ms: now_ms,
            }),
            Err(e) => log::warn!("player lookup for {username} failed: {e}"),
        }
        self.send(LedgerWrite::SetTeam {
            player: username,
            team,
        });
        self.send(LedgerWrite::Increment {
            doc: DocRef::Team(team),
            field: CounterField::Members,
            delta: 1,
        });
        self.sync_ticker(now_ms);
        Ok(())
    }

    /// `Active → Unselected`. Clears local progress (but not the username)
    /// and calls `reset` so the shell can drop screen state. Ledger rows are
    /// left as they are.
    pub fn logout(&mut self, reset: impl FnOnce()) {
        self.store.clear_progress();
        self.progress = PersonalProgress {
            username: self.progress.username.take(),
            ..PersonalProgress::default()
        };
        self.rates = EffectRates::default();
        self.last_click_ms = None;
        self.activation = None;
        self.notifications.clear();
        self.ticker.stop();
        reset();
    }

    /// Re-read local progress, e.g. when a screen regains focus.
    pub fn reload(&mut self, now_ms: f64) {
        self.store.reload_into(&mut self.progress, &self.catalog);
        self.recompute_rates();
        self.sync_ticker(now_ms);
    }

    // ── Gameplay ────────────────────────────────────────────────

    /// A manual tap at `now_ms`.
    pub fn register_manual_click(&mut self, now_ms: f64) -> ClickOutcome {
        let Some(team) = self.progress.team else {
            return ClickOutcome::Inactive;
        };
        if let Some(last) = self.last_click_ms {
            if now_ms - last < self.config.debounce_ms {
                return ClickOutcome::Debounced;
            }
        }
        self.last_click_ms = Some(now_ms);

        let gained = self.rates.clicks_per_tap();
        self.progress.personal_clicks = self.progress.personal_clicks.saturating_add(gained);
        self.store.save_clicks(self.progress.personal_clicks);

        self.credit(team, gained);

        if !self.progress.auto_clicker_unlocked
            && self.progress.personal_clicks >= self.config.auto_clicker_threshold
        {
            self.progress.auto_clicker_unlocked = true;
            self.store.save_auto_clicker(true);
            self.notifications.push(Notification::AutoClickerUnlocked);
            log::info!("auto-clicker unlocked at {} clicks", self.progress.personal_clicks);
            self.sync_ticker(now_ms);
        }

        ClickOutcome::Accepted { gained }
    }

    /// One auto-click firing. Credits the ledgers only; personal clicks count
    /// manual taps alone. Returns the amount credited.
    pub fn auto_click_tick(&mut self) -> u64 {
        let Some(team) = self.progress.team else {
            return 0;
        };
        if !self.progress.auto_clicker_unlocked || self.rates.auto_click_rate <= 0.0 {
            return 0;
        }
        let amount = self.rates.clicks_per_tick();
        self.credit(team, amount);
        amount
    }

    /// Drive time-based work: ledger pushes, the auto-click schedule, and
    /// notice expiry. Call once per frame.
    pub fn advance(&mut self, now_ms: f64) {
        self.poll_remote();
        self.sync_ticker(now_ms);
        let fires = self.ticker.update(now_ms);
        for _ in 0..fires {
            self.auto_click_tick();
        }
        if self.activation.as_ref().is_some_and(|n| now_ms >= n.until) {
            self.activation = None;
        }
    }

    /// Buy a bonus. On any error nothing changes.
    pub fn purchase_bonus(
        &mut self,
        id: BonusId,
        now_ms: f64,
    ) -> Result<BonusDefinition, PurchaseError> {
        let bonus = self
            .catalog
            .get(id)
            .cloned()
            .ok_or(PurchaseError::UnknownBonus(id))?;
        if self.progress.owns(id) {
            return Err(PurchaseError::AlreadyOwned(id));
        }
        if self.progress.personal_clicks < bonus.cost {
            return Err(PurchaseError::InsufficientClicks {
                cost: bonus.cost,
                available: self.progress.personal_clicks,
            });
        }
        let Some(team) = self.progress.team else {
            return Err(PurchaseError::NoTeamSelected);
        };

        self.progress.personal_clicks -= bonus.cost;
        self.store.save_clicks(self.progress.personal_clicks);
        self.progress.purchased_bonuses.push(id);
        self.store
            .save_bonuses(&self.progress.purchased_bonuses, &self.catalog);
        self.recompute_rates();

        self.apply_one_shot(&bonus, team, now_ms);

        self.activation = Some(ActivationNotice {
            bonus: id,
            until: now_ms + self.config.activation_notice_ms,
        });
        self.notifications.push(Notification::BonusPurchased { id });
        self.sync_ticker(now_ms);
        log::info!("purchased bonus {} ({})", bonus.id, bonus.name);
        Ok(bonus)
    }

    // ── Internals ───────────────────────────────────────────────

    fn apply_one_shot(&self, bonus: &BonusDefinition, team: Team, now_ms: f64) {
        let effect = bonus.effect.floor() as i64;
        match bonus.category {
            // Realised through later taps and ticks.
            BonusCategory::AutoClicker | BonusCategory::ClickMultiplier => {}
            BonusCategory::TeamBoost => {
                self.send(LedgerWrite::Increment {
                    doc: DocRef::Team(team),
                    field: CounterField::TemporaryBoost,
                    delta: effect,
                });
                self.send(LedgerWrite::SetTimestamp {
                    doc: DocRef::Team(team),
                    field: TimestampField::BoostExpiration,
                    at_ms: now_ms + self.config.team_boost_duration_ms,
                });
            }
            BonusCategory::Special(SpecialAbility::ConversionRay) => {
                self.send(LedgerWrite::Increment {
                    doc: DocRef::Team(team.opponent()),
                    field: CounterField::Clicks,
                    delta: -effect,
                });
            }
            BonusCategory::Special(SpecialAbility::OrbitalStrike) => {
                self.send(LedgerWrite::Increment {
                    doc: DocRef::Team(team),
                    field: CounterField::Clicks,
                    delta: effect * 2,
                });
            }
        }
    }

    /// Add `amount` to the acting player's row and their team's row.
    fn credit(&self, team: Team, amount: u64) {
        if amount == 0 {
            return;
        }
        let delta = amount as i64;
        if let Some(username) = &self.progress.username {
            self.send(LedgerWrite::Increment {
                doc: DocRef::Player(username.clone()),
                field: CounterField::Clicks,
                delta,
            });
        }
        self.send(LedgerWrite::Increment {
            doc: DocRef::Team(team),
            field: CounterField::Clicks,
            delta,
        });
    }

    /// Fire-and-forget: attempted once, failures only logged.
    fn send(&self, write: LedgerWrite) {
        if let Err(e) = self.ledger.apply(&write) {
            log::warn!("ledger write dropped ({write:?}): {e}");
        }
    }

    fn poll_remote(&mut self) {
        if let Some(snapshot) = self.team_feed.poll() {
            self.totals = snapshot;
        }
    }

    fn recompute_rates(&mut self) {
        self.rates = effects::aggregate(self.catalog.resolve(&self.progress.purchased_bonuses));
    }

    /// Keep exactly one auto-click schedule alive while it should run, keyed
    /// by the current rate so a rate change re-creates it.
    fn sync_ticker(&mut self, now_ms: f64) {
        let should_run = self.progress.team.is_some()
            && self.progress.auto_clicker_unlocked
            && self.rates.auto_click_rate > 0.0;
        if should_run {
            if self.ticker.start(self.rates.auto_click_rate.to_bits(), now_ms) {
                log::info!("auto-clicker armed at {}/s", self.rates.auto_click_rate);
            }
        } else {
            self.ticker.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clicker::ledger::MemoryLedger;
    use crate::clicker::save::MemoryStorage;

    struct Fixture {
        kv: Rc<MemoryStorage>,
        ledger: Rc<MemoryLedger>,
        engine: ClickEngine,
    }

    fn fixture() -> Fixture {
        let kv = Rc::new(MemoryStorage::new());
        let ledger = Rc::new(MemoryLedger::new());
        let engine = ClickEngine::new(
            GameConfig::default(),
            Catalog::standard(),
            kv.clone(),
            ledger.clone(),
        );
        Fixture { kv, ledger, engine }
    }

    fn active(team: Team) -> Fixture {
        let mut fx = fixture();
        fx.engine.set_username("tester").unwrap();
        fx.engine.select_team(team, 0.0).unwrap();
        fx
    }

    /// Tap `n` times, far enough apart to clear the debounce window.
    fn tap(engine: &mut ClickEngine, n: u32, start_ms: f64) -> f64 {
        let mut t = start_ms;
        for _ in 0..n {
            engine.register_manual_click(t);
            t += 200.0;
        }
        t
    }

    #[test]
    fn fresh_engine_is_unselected() {
        let fx = fixture();
        assert_eq!(fx.engine.phase(), Phase::Unselected);
        assert_eq!(fx.engine.progress().personal_clicks, 0);
        assert_eq!(fx.engine.rates(), EffectRates::default());
    }

    #[test]
    fn username_length_validated() {
        let mut fx = fixture();
        assert!(matches!(
            fx.engine.set_username("ab"),
            Err(ValidationError::UsernameLength { len: 2, .. })
        ));
        assert!(fx.engine.set_username("a".repeat(16).as_str()).is_err());
        assert!(fx.engine.progress().username.is_none());
        assert!(fx.engine.set_username("  abc  ").is_ok());
        assert_eq!(fx.engine.progress().username.as_deref(), Some("abc"));
    }

    #[test]
    fn select_team_requires_username() {
        let mut fx = fixture();
        assert_eq!(
            fx.engine.select_team(Team::Red, 0.0),
            Err(ValidationError::MissingUsername)
        );
        assert_eq!(fx.engine.phase(), Phase::Unselected);
    }

    #[test]
    fn select_team_writes_local_and_remote() {
        let fx = active(Team::Blue);
        assert_eq!(fx.engine.phase(), Phase::Active);
        assert_eq!(fx.kv.raw("team_clicker_preference").as_deref(), Some("Bleu"));
        let player = fx.ledger.player("tester").unwrap();
        assert_eq!(player.team, Team::Blue);
        assert_eq!(player.joined_at, Some(0.0));
        assert_eq!(fx.ledger.team_row(Team::Blue).members, 1);
    }

    #[test]
    fn returning_player_keeps_join_time() {
        let mut fx = active(Team::Red);
        fx.engine.logout(|| {});
        fx.engine.select_team(Team::Blue, 5_000.0).unwrap();
        let player = fx.ledger.player("tester").unwrap();
        assert_eq!(player.joined_at, Some(0.0));
        assert_eq!(player.team, Team::Blue);
    }

    #[test]
    fn select_team_twice_rejected() {
        let mut fx = active(Team::Red);
        assert_eq!(
            fx.engine.select_team(Team::Blue, 0.0),
            Err(ValidationError::TeamAlreadySelected)
        );
        assert_eq!(fx.engine.team(), Some(Team::Red));
    }

    #[test]
    fn select_team_survives_remote_failure() {
        let mut fx = fixture();
        fx.engine.set_username("tester").unwrap();
        fx.ledger.set_failing(true);
        assert!(fx.engine.select_team(Team::Red, 0.0).is_ok());
        assert_eq!(fx.engine.phase(), Phase::Active);
    }

    #[test]
    fn click_before_team_is_inactive() {
        let mut fx = fixture();
        assert_eq!(fx.engine.register_manual_click(0.0), ClickOutcome::Inactive);
        assert_eq!(fx.engine.progress().personal_clicks, 0);
    }

    #[test]
    fn click_credits_local_and_both_rows() {
        let mut fx = active(Team::Red);
        assert_eq!(
            fx.engine.register_manual_click(1_000.0),
            ClickOutcome::Accepted { gained: 1 }
        );
        assert_eq!(fx.engine.progress().personal_clicks, 1);
        assert_eq!(fx.kv.raw("team_clicker_clicks").as_deref(), Some("1"));
        assert_eq!(fx.ledger.team_row(Team::Red).clicks, 1);
        assert_eq!(fx.ledger.player("tester").unwrap().clicks, 1);
    }

    #[test]
    fn debounce_drops_fast_clicks() {
        let mut fx = active(Team::Red);
        assert!(matches!(
            fx.engine.register_manual_click(1_000.0),
            ClickOutcome::Accepted { .. }
        ));
        assert_eq!(fx.engine.register_manual_click(1_050.0), ClickOutcome::Debounced);
        assert_eq!(fx.engine.register_manual_click(1_099.0), ClickOutcome::Debounced);
        assert!(matches!(
            fx.engine.register_manual_click(1_100.0),
            ClickOutcome::Accepted { .. }
        ));
        assert_eq!(fx.engine.progress().personal_clicks, 2);
    }

    #[test]
    fn multiplier_applies_at_click_time() {
        let mut fx = active(Team::Red);
        let t = tap(&mut fx.engine, 100, 1_000.0);
        fx.engine.purchase_bonus(4, t).unwrap(); // x2
        let before_team = fx.ledger.team_row(Team::Red).clicks;
        fx.engine.register_manual_click(t + 1_000.0);
        assert_eq!(fx.engine.progress().personal_clicks, 2);
        assert_eq!(fx.ledger.team_row(Team::Red).clicks, before_team + 2);
    }

    #[test]
    fn unlock_fires_once() {
        let mut fx = active(Team::Red);
        let t = tap(&mut fx.engine, 9, 1_000.0);
        assert!(!fx.engine.progress().auto_clicker_unlocked);
        assert!(fx.engine.take_notifications().is_empty());

        let t = tap(&mut fx.engine, 1, t);
        assert!(fx.engine.progress().auto_clicker_unlocked);
        assert_eq!(
            fx.engine.take_notifications(),
            vec![Notification::AutoClickerUnlocked]
        );
        assert_eq!(fx.kv.raw("team_clicker_autoclicker").as_deref(), Some("enabled"));

        tap(&mut fx.engine, 20, t);
        assert!(fx.engine.take_notifications().is_empty());
    }

    #[test]
    fn unlock_does_not_refire_after_spending() {
        let mut fx = active(Team::Red);
        let t = tap(&mut fx.engine, 50, 1_000.0);
        fx.engine.take_notifications();
        fx.engine.purchase_bonus(1, t).unwrap(); // 50 → 0
        fx.engine.take_notifications();
        tap(&mut fx.engine, 12, t + 1_000.0);
        assert!(fx.engine.take_notifications().is_empty());
    }

    #[test]
    fn ticker_needs_unlock_and_rate() {
        let mut fx = active(Team::Red);
        fx.engine.advance(0.0);
        assert!(!fx.engine.auto_clicker_running());

        let t = tap(&mut fx.engine, 60, 1_000.0);
        fx.engine.advance(t);
        // Unlocked but no auto-clicker bonus yet.
        assert!(!fx.engine.auto_clicker_running());

        fx.engine.purchase_bonus(1, t).unwrap();
        assert!(fx.engine.auto_clicker_running());
    }

    #[test]
    fn auto_ticks_credit_ledger_only() {
        let mut fx = active(Team::Red);
        let t = tap(&mut fx.engine, 200, 1_000.0);
        fx.engine.purchase_bonus(2, t).unwrap(); // +5/s
        let clicks = fx.engine.progress().personal_clicks;
        let team_before = fx.ledger.team_row(Team::Red).clicks;

        fx.engine.advance(t + 1_000.0);
        fx.engine.advance(t + 2_000.0);
        fx.engine.advance(t + 3_000.0);

        assert_eq!(fx.ledger.team_row(Team::Red).clicks, team_before + 15);
        assert_eq!(fx.engine.progress().personal_clicks, clicks);
    }

    #[test]
    fn logout_drops_pending_notifications() {
        let mut fx = active(Team::Red);
        let t = tap(&mut fx.engine, 60, 1_000.0);
        fx.engine.purchase_bonus(1, t).unwrap();

        fx.engine.logout(|| {});

        assert!(fx.engine.take_notifications().is_empty());
    }

    #[test]
    fn logout_stops_ticker_and_clears() {
        let mut fx = active(Team::Red);
        let t = tap(&mut fx.engine, 60, 1_000.0);
        fx.engine.purchase_bonus(1, t).unwrap();
        assert!(fx.engine.auto_clicker_running());

        let mut reset_called = false;
        fx.engine.logout(|| reset_called = true);
        assert!(reset_called);
        assert!(!fx.engine.auto_clicker_running());
        assert_eq!(fx.engine.phase(), Phase::Unselected);
        assert_eq!(fx.engine.progress().personal_clicks, 0);
        assert!(fx.engine.progress().purchased_bonuses.is_empty());
        assert!(!fx.engine.progress().auto_clicker_unlocked);
        assert_eq!(fx.engine.progress().username.as_deref(), Some("tester"));

        // Remote rows untouched.
        assert_eq!(fx.ledger.team_row(Team::Red).clicks, 60);
    }

    #[test]
    fn purchase_rejections_change_nothing() {
        let mut fx = active(Team::Red);
        let t = tap(&mut fx.engine, 40, 1_000.0);
        assert_eq!(
            fx.engine.purchase_bonus(99, t),
            Err(PurchaseError::UnknownBonus(99))
        );
        assert_eq!(
            fx.engine.purchase_bonus(1, t).map(|b| b.id),
            Err(PurchaseError::InsufficientClicks {
                cost: 50,
                available: 40
            })
        );
        assert_eq!(fx.engine.progress().personal_clicks, 40);
        assert!(fx.engine.progress().purchased_bonuses.is_empty());
    }

    #[test]
    fn repurchase_is_rejected() {
        let mut fx = active(Team::Red);
        let t = tap(&mut fx.engine, 120, 1_000.0);
        fx.engine.purchase_bonus(1, t).unwrap();
        assert_eq!(
            fx.engine.purchase_bonus(1, t),
            Err(PurchaseError::AlreadyOwned(1))
        );
        assert_eq!(fx.engine.progress().personal_clicks, 70);
        assert_eq!(fx.engine.progress().purchased_bonuses, vec![1]);
    }

    #[test]
    fn purchase_without_team_rejected() {
        let mut fx = fixture();
        fx.kv.set_item("team_clicker_clicks", "500").unwrap();
        fx.engine.reload(0.0);
        assert_eq!(
            fx.engine.purchase_bonus(1, 0.0),
            Err(PurchaseError::NoTeamSelected)
        );
        assert_eq!(fx.engine.progress().personal_clicks, 500);
    }

    #[test]
    fn team_boost_writes_expiring_boost() {
        let mut fx = active(Team::Blue);
        let t = tap(&mut fx.engine, 250, 1_000.0);
        fx.engine.purchase_bonus(6, t).unwrap();
        let row = fx.ledger.team_row(Team::Blue);
        assert_eq!(row.temporary_boost, Some(10));
        assert_eq!(row.boost_expiration, Some(t + 60_000.0));
        assert_eq!(row.active_boost(t + 59_000.0), 10);
        assert_eq!(row.active_boost(t + 60_000.0), 0);
    }

    #[test]
    fn orbital_strike_credits_own_team_double() {
        let mut fx = active(Team::Red);
        let t = tap(&mut fx.engine, 1_000, 1_000.0);
        let before = fx.ledger.team_row(Team::Red).clicks;
        fx.engine.purchase_bonus(9, t).unwrap();
        assert_eq!(fx.ledger.team_row(Team::Red).clicks, before + 100);
        assert_eq!(fx.ledger.team_row(Team::Blue).clicks, 0);
    }

    #[test]
    fn activation_notice_expires_after_three_seconds() {
        let mut fx = active(Team::Red);
        let t = tap(&mut fx.engine, 100, 1_000.0);
        fx.engine.purchase_bonus(4, t).unwrap();
        assert_eq!(fx.engine.activation_notice(t + 2_999.0).map(|b| b.id), Some(4));
        assert!(fx.engine.activation_notice(t + 3_000.0).is_none());
        fx.engine.advance(t + 3_000.0);
        assert!(fx.engine.activation_notice(t).is_none());
    }

    #[test]
    fn shop_views_hide_owned_bonuses() {
        let mut fx = active(Team::Red);
        let t = tap(&mut fx.engine, 100, 1_000.0);
        assert!(fx.engine.has_affordable_bonus());
        fx.engine.purchase_bonus(4, t).unwrap();
        assert_eq!(fx.engine.available_bonuses().len(), 8);
        assert!(fx.engine.available_bonuses().iter().all(|b| b.id != 4));
        assert_eq!(fx.engine.owned_bonuses()[0].id, 4);
        assert!(!fx.engine.has_affordable_bonus());
    }

    #[test]
    fn totals_follow_ledger_pushes() {
        let mut fx = active(Team::Red);
        tap(&mut fx.engine, 3, 1_000.0);
        // Another player's increment arrives through the subscription.
        fx.ledger
            .apply(&LedgerWrite::Increment {
                doc: DocRef::Team(Team::Blue),
                field: CounterField::Clicks,
                delta: 9,
            })
            .unwrap();
        fx.engine.advance(2_000.0);
        assert_eq!(fx.engine.totals().clicks(Team::Red), 3);
        assert_eq!(fx.engine.totals().clicks(Team::Blue), 9);
        assert!((fx.engine.totals().share(Team::Red) - 25.0).abs() < 0.001);
    }

    #[test]
    fn remote_failure_keeps_local_progress() {
        let mut fx = active(Team::Red);
        fx.ledger.set_failing(true);
        tap(&mut fx.engine, 5, 1_000.0);
        assert_eq!(fx.engine.progress().personal_clicks, 5);
        fx.ledger.set_failing(false);
        // Lost writes are not replayed.
        assert_eq!(fx.ledger.team_row(Team::Red).clicks, 0);
    }

    #[test]
    fn reload_picks_up_external_changes() {
        let mut fx = active(Team::Red);
        fx.kv.set_item("team_clicker_clicks", "77").unwrap();
        fx.kv
            .set_item("team_clicker_bonuses", r#"[{"id":5}]"#)
            .unwrap();
        fx.engine.reload(0.0);
        assert_eq!(fx.engine.progress().personal_clicks, 77);
        assert!((fx.engine.rates().click_multiplier - 3.0).abs() < 0.001);
    }

    #[test]
    fn reload_with_unreadable_storage_keeps_session() {
        let mut fx = active(Team::Red);
        let t = tap(&mut fx.engine, 60, 1_000.0);
        fx.engine.purchase_bonus(1, t).unwrap();
        let before = fx.engine.progress().clone();
        assert!(fx.engine.auto_clicker_running());

        fx.kv.set_failing(true);
        fx.engine.reload(t + 500.0);

        assert_eq!(fx.engine.phase(), Phase::Active);
        assert_eq!(fx.engine.progress(), &before);
        assert!(fx.engine.auto_clicker_running());
        assert!((fx.engine.rates().auto_click_rate - 1.0).abs() < 0.001);
    }

    #[test]
    fn progress_restored_on_restart() {
        let fx = active(Team::Blue);
        let mut engine = fx.engine;
        tap(&mut engine, 12, 1_000.0);
        drop(engine);

        let restarted = ClickEngine::new(
            GameConfig::default(),
            Catalog::standard(),
            fx.kv.clone(),
            fx.ledger.clone(),
        );
        assert_eq!(restarted.phase(), Phase::Active);
        assert_eq!(restarted.progress().personal_clicks, 12);
        assert!(restarted.progress().auto_clicker_unlocked);
        assert_eq!(restarted.totals().clicks(Team::Blue), 12);
    }
}
