//! Shared remote ledger: team and player documents visible to every player.
//!
//! The engine only talks to the [`Ledger`] trait. Writes are merge-style
//! upserts (a missing document is created on first write) and counters are
//! atomic increments, so concurrent writers never need to coordinate.
//!
//! Reads arrive through [`Subscription`]s: the store overwrites the slot with
//! a full snapshot after every change and the consumer polls it once per
//! frame. A snapshot always replaces the previous one wholesale.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use crate::error::RemoteError;

use super::state::{PlayerLedgerRow, Team, TeamLedgerRow, TeamTotals};

/// Which document a write targets.
#[derive(Clone, Debug, PartialEq)]
pub enum DocRef {
    Team(Team),
    /// Keyed by username.
    Player(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CounterField {
    Clicks,
    Members,
    TemporaryBoost,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimestampField {
    JoinedAt,
    BoostExpiration,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LedgerWrite {
    Increment {
        doc: DocRef,
        field: CounterField,
        delta: i64,
    },
    SetTimestamp {
        doc: DocRef,
        field: TimestampField,
        at_ms: f64,
    },
    /// Records the player's team affiliation.
    SetTeam { player: String, team: Team },
}

/// Latest-value slot written by the ledger, read by the consumer.
pub struct Subscription<T> {
    slot: Rc<RefCell<Option<T>>>,
}

impl<T> Subscription<T> {
    /// A subscription that starts with `initial` pending.
    pub fn new(initial: Option<T>) -> Self {
        Self {
            slot: Rc::new(RefCell::new(initial)),
        }
    }

    /// Take the newest snapshot pushed since the last poll.
    pub fn poll(&self) -> Option<T> {
        self.slot.borrow_mut().take()
    }

    /// Handle the ledger keeps to push into this slot.
    pub fn sender(&self) -> Weak<RefCell<Option<T>>> {
        Rc::downgrade(&self.slot)
    }
}

/// The remote store as consumed by the game.
pub trait Ledger {
    fn apply(&self, write: &LedgerWrite) -> Result<(), RemoteError>;
    fn get_player(&self, name: &str) -> Result<Option<PlayerLedgerRow>, RemoteError>;
    /// Players of `team`, most clicks first.
    fn top_players(&self, team: Team, limit: usize) -> Result<Vec<PlayerLedgerRow>, RemoteError>;
    fn subscribe_teams(&self) -> Subscription<TeamTotals>;
    /// Full, ordered player list of `team` on every change.
    fn subscribe_players(&self, team: Team) -> Subscription<Vec<PlayerLedgerRow>>;
}

#[derive(Default)]
struct LedgerData {
    teams: TeamTotals,
    players: BTreeMap<String, PlayerLedgerRow>,
}

impl LedgerData {
    fn players_of(&self, team: Team) -> Vec<PlayerLedgerRow> {
        let mut rows: Vec<PlayerLedgerRow> = self
            .players
            .values()
            .filter(|p| p.team == team)
            .cloned()
            .collect();
        // Stable sort keeps name order for ties.
        rows.sort_by(|a, b| b.clicks.cmp(&a.clicks));
        rows
    }

    fn player_mut(&mut self, name: &str) -> &mut PlayerLedgerRow {
        self.players
            .entry(name.to_string())
            .or_insert_with(|| PlayerLedgerRow {
                name: name.to_string(),
                // Overwritten by the SetTeam that accompanies a join.
                team: Team::Red,
                joined_at: None,
                clicks: 0,
            })
    }
}

type Senders<T> = RefCell<Vec<Weak<RefCell<Option<T>>>>>;

/// In-process ledger. Backs the browser build when no shared backend is
/// configured, and every test.
#[derive(Default)]
pub struct MemoryLedger {
    data: RefCell<LedgerData>,
    history: RefCell<Vec<LedgerWrite>>,
    team_senders: Senders<TeamTotals>,
    player_senders: RefCell<Vec<(Team, Weak<RefCell<Option<Vec<PlayerLedgerRow>>>>)>>,
    failing: Cell<bool>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// true の間、すべての書き込みとクエリが失敗する。
    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    /// Every write that was accepted, in order.
    pub fn history(&self) -> Vec<LedgerWrite> {
        self.history.borrow().clone()
    }

    pub fn team_row(&self, team: Team) -> TeamLedgerRow {
        self.data.borrow().teams.get(team).clone()
    }

    pub fn player(&self, name: &str) -> Option<PlayerLedgerRow> {
        self.data.borrow().players.get(name).cloned()
    }

    fn check(&self) -> Result<(), RemoteError> {
        if self.failing.get() {
            Err(RemoteError::Unavailable("injected failure".into()))
        } else {
            Ok(())
        }
    }

    fn notify(&self) {
        let data = self.data.borrow();

        let mut team_senders = self.team_senders.borrow_mut();
        team_senders.retain(|s| s.strong_count() > 0);
        for sender in team_senders.iter() {
            if let Some(slot) = sender.upgrade() {
                *slot.borrow_mut() = Some(data.teams.clone());
            }
        }

        let mut player_senders = self.player_senders.borrow_mut();
        player_senders.retain(|(_, s)| s.strong_count() > 0);
        for (team, sender) in player_senders.iter() {
            if let Some(slot) = sender.upgrade() {
                *slot.borrow_mut() = Some(data.players_of(*team));
            }
        }
    }
}

impl Ledger for MemoryLedger {
    fn apply(&self, write: &LedgerWrite) -> Result<(), RemoteError> {
        self.check()?;
        {
            let mut data = self.data.borrow_mut();
            match write {
                LedgerWrite::Increment { doc, field, delta } => match doc {
                    DocRef::Team(team) => {
                        let row = data.teams.get_mut(*team);
                        match field {
                            CounterField::Clicks => row.clicks += delta,
                            CounterField::Members => row.members += delta,
                            CounterField::TemporaryBoost => {
                                *row.temporary_boost.get_or_insert(0) += delta
                            }
                        }
                    }
                    DocRef::Player(name) => match field {
                        CounterField::Clicks => data.player_mut(name).clicks += delta,
                        other => {
                            return Err(RemoteError::Rejected(format!(
                                "player documents have no {other:?} counter"
                            )))
                        }
                    },
                },
                LedgerWrite::SetTimestamp { doc, field, at_ms } => match (doc, field) {
                    (DocRef::Team(team), TimestampField::BoostExpiration) => {
                        data.teams.get_mut(*team).boost_expiration = Some(*at_ms);
                    }
                    (DocRef::Player(name), TimestampField::JoinedAt) => {
                        data.player_mut(name).joined_at = Some(*at_ms);
                    }
                    (doc, field) => {
                        return Err(RemoteError::Rejected(format!(
                            "{doc:?} has no {field:?} field"
                        )))
                    }
                },
                LedgerWrite::SetTeam { player, team } => {
                    data.player_mut(player).team = *team;
                }
            }
        }
        self.history.borrow_mut().push(write.clone());
        self.notify();
        Ok(())
    }

    fn get_player(&self, name: &str) -> Result<Option<PlayerLedgerRow>, RemoteError> {
        self.check()?;
        Ok(self.player(name))
    }

    fn top_players(&self, team: Team, limit: usize) -> Result<Vec<PlayerLedgerRow>, RemoteError> {
        self.check()?;
        let mut rows = self.data.borrow().players_of(team);
        rows.truncate(limit);
        Ok(rows)
    }

    fn subscribe_teams(&self) -> Subscription<TeamTotals> {
        let sub = Subscription::new(Some(self.data.borrow().teams.clone()));
        self.team_senders.borrow_mut().push(sub.sender());
        sub
    }

    fn subscribe_players(&self, team: Team) -> Subscription<Vec<PlayerLedgerRow>> {
        let sub = Subscription::new(Some(self.data.borrow().players_of(team)));
        self.player_senders.borrow_mut().push((team, sub.sender()));
        sub
    }
}
