//! Per-team top-player rankings.

use std::rc::Rc;

use super::ledger::{Ledger, Subscription};
use super::state::{PlayerLedgerRow, Team};

/// One row of the ranking.
#[derive(Clone, Debug, PartialEq)]
pub struct RankEntry {
    pub name: String,
    pub clicks: u64,
}

impl From<PlayerLedgerRow> for RankEntry {
    fn from(row: PlayerLedgerRow) -> Self {
        Self {
            name: row.name,
            clicks: row.clicks.max(0) as u64,
        }
    }
}

/// One-shot query: up to `limit` players of `team`, most clicks first.
/// A failed query yields an empty list.
pub fn top_players(ledger: &dyn Ledger, team: Team, limit: usize) -> Vec<RankEntry> {
    match ledger.top_players(team, limit) {
        Ok(rows) => rows.into_iter().take(limit).map(RankEntry::from).collect(),
        Err(e) => {
            log::warn!("leaderboard query for {} failed: {e}", team.id());
            Vec::new()
        }
    }
}

/// Read-only view backing the leaderboard tab.
///
/// Loads with a one-shot query when a team tab is opened, then follows the
/// live player feed for that team until the tab changes.
pub struct Leaderboard {
    ledger: Rc<dyn Ledger>,
    limit: usize,
    team: Team,
    entries: Vec<RankEntry>,
    feed: Option<Subscription<Vec<PlayerLedgerRow>>>,
}

impl Leaderboard {
    pub fn new(ledger: Rc<dyn Ledger>, limit: usize, team: Team) -> Self {
        let mut board = Self {
            ledger,
            limit,
            team,
            entries: Vec::new(),
            feed: None,
        };
        board.load();
        board
    }

    pub fn team(&self) -> Team {
        self.team
    }

    pub fn entries(&self) -> &[RankEntry] {
        &self.entries
    }

    /// Show `team` instead. Re-queries even if it is already shown.
    pub fn switch_team(&mut self, team: Team) {
        self.team = team;
        self.load();
    }

    /// Re-run the one-shot query and re-subscribe.
    pub fn load(&mut self) {
        self.entries = top_players(self.ledger.as_ref(), self.team, self.limit);
        let feed = self.ledger.subscribe_players(self.team);
        // The initial snapshot duplicates the query above.
        let _ = feed.poll();
        self.feed = Some(feed);
    }

    /// Apply the latest pushed snapshot, if any.
    pub fn refresh(&mut self) {
        let Some(rows) = self.feed.as_ref().and_then(|f| f.poll()) else {
            return;
        };
        self.entries = rows
            .into_iter()
            .take(self.limit)
            .map(RankEntry::from)
            .collect();
    }

    /// Stop following updates (leaving the tab).
    pub fn close(&mut self) {
        self.feed = None;
    }
}
