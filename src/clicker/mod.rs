/// Team Clicker: two teams race to the highest shared click count.

pub mod actions;
pub mod catalog;
pub mod effects;
pub mod engine;
pub mod leaderboard;
pub mod ledger;
pub mod render;
pub mod save;
pub mod state;

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;

use crate::config::GameConfig;
use crate::error::{PurchaseError, ValidationError};
use crate::input::{ClickState, InputEvent};

use actions::*;
use catalog::Catalog;
use engine::ClickEngine;
use leaderboard::Leaderboard;
use ledger::Ledger;
use save::KeyValueStore;
use state::{Notification, Phase, Team};

/// Maximum number of log lines kept on screen.
const MAX_LOG: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tab {
    Game,
    Shop,
    Leaderboard,
}

#[derive(Clone, Debug)]
pub struct LogEntry {
    pub text: String,
    pub is_important: bool,
}

/// Username prompt shown before the first team selection.
#[derive(Clone, Debug, Default)]
pub struct UsernamePrompt {
    pub buffer: String,
    pub error: Option<String>,
    /// Team to join once a valid name is submitted.
    pub pending_team: Option<Team>,
}

pub struct ClickerGame {
    pub engine: ClickEngine,
    pub leaderboard: Leaderboard,
    pub tab: Tab,
    pub prompt: Option<UsernamePrompt>,
    pub confirm_change_team: bool,
    pub log: Vec<LogEntry>,
    /// Wall-clock time of the latest `tick`, in epoch milliseconds.
    pub now_ms: f64,
}

impl ClickerGame {
    pub fn new(
        config: GameConfig,
        catalog: Catalog,
        kv: Rc<dyn KeyValueStore>,
        ledger: Rc<dyn Ledger>,
        now_ms: f64,
    ) -> Self {
        let limit = config.leaderboard_limit;
        let engine = ClickEngine::new(config, catalog, kv, ledger.clone());
        let mut leaderboard = Leaderboard::new(ledger, limit, Team::Red);
        leaderboard.close();

        let mut game = Self {
            engine,
            leaderboard,
            tab: Tab::Game,
            prompt: None,
            confirm_change_team: false,
            log: Vec::new(),
            now_ms,
        };
        match (game.engine.team(), game.engine.progress().username.clone()) {
            (Some(team), Some(name)) => {
                game.add_log(&format!("おかえり、{}！（{}）", name, team.name()), false);
            }
            _ => game.add_log("チームを選んでクリックを始めよう。", false),
        }
        game.engine.advance(now_ms);
        game
    }

    pub fn add_log(&mut self, text: &str, is_important: bool) {
        self.log.push(LogEntry {
            text: text.to_string(),
            is_important,
        });
        if self.log.len() > MAX_LOG {
            self.log.remove(0);
        }
    }

    /// Feed wall-clock time. Call once per frame.
    pub fn tick(&mut self, now_ms: f64) {
        self.now_ms = now_ms;
        self.engine.advance(now_ms);
        self.drain_notifications();
        if self.tab == Tab::Leaderboard {
            self.leaderboard.refresh();
        }
    }

    /// Handle an input event. Returns true if the event was consumed.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        let consumed = if self.prompt.is_some() {
            self.handle_prompt(event)
        } else {
            match self.engine.phase() {
                Phase::Unselected => self.handle_unselected(event),
                Phase::Active => self.handle_active(event),
            }
        };
        self.drain_notifications();
        consumed
    }

    pub fn render(&self, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
        render::render(self, f, area, click_state);
    }

    // ── Team selection ──────────────────────────────────────────

    fn handle_unselected(&mut self, event: &InputEvent) -> bool {
        let team = match event {
            InputEvent::Key('1') => Team::Red,
            InputEvent::Key('2') => Team::Blue,
            InputEvent::Key('n') => {
                self.open_prompt(None);
                return true;
            }
            InputEvent::Click(EDIT_USERNAME) => {
                self.open_prompt(None);
                return true;
            }
            InputEvent::Click(id)
                if (SELECT_TEAM_BASE..SELECT_TEAM_BASE + Team::all().len() as u16)
                    .contains(id) =>
            {
                Team::all()[(id - SELECT_TEAM_BASE) as usize]
            }
            _ => return false,
        };
        self.choose_team(team);
        true
    }

    fn choose_team(&mut self, team: Team) {
        if self.engine.progress().username.is_none() {
            self.open_prompt(Some(team));
            return;
        }
        match self.engine.select_team(team, self.now_ms) {
            Ok(()) => {
                self.tab = Tab::Game;
                self.add_log(&format!("{}に参加した！", team.name()), true);
            }
            Err(e) => self.add_log(&validation_message(&e), false),
        }
    }

    fn open_prompt(&mut self, pending_team: Option<Team>) {
        self.prompt = Some(UsernamePrompt {
            buffer: self.engine.progress().username.clone().unwrap_or_default(),
            error: None,
            pending_team,
        });
    }

    fn handle_prompt(&mut self, event: &InputEvent) -> bool {
        let Some(prompt) = self.prompt.as_mut() else {
            return false;
        };
        let max = self.engine.config().username_max_len;
        match event {
            InputEvent::Key(c) if !c.is_control() => {
                if prompt.buffer.chars().count() < max {
                    prompt.buffer.push(*c);
                }
                prompt.error = None;
            }
            InputEvent::Backspace => {
                prompt.buffer.pop();
                prompt.error = None;
            }
            InputEvent::Escape => {
                self.prompt = None;
            }
            InputEvent::Enter | InputEvent::Click(SUBMIT_USERNAME) => self.submit_username(),
            _ => return false,
        }
        true
    }

    fn submit_username(&mut self) {
        let Some(prompt) = self.prompt.take() else {
            return;
        };
        match self.engine.set_username(&prompt.buffer) {
            Ok(()) => {
                if let Some(name) = self.engine.progress().username.clone() {
                    self.add_log(&format!("ユーザー名を「{}」に設定した。", name), false);
                }
                if let Some(team) = prompt.pending_team {
                    self.choose_team(team);
                }
            }
            Err(e) => {
                self.prompt = Some(UsernamePrompt {
                    error: Some(validation_message(&e)),
                    ..prompt
                });
            }
        }
    }

    // ── Active play ─────────────────────────────────────────────

    fn handle_active(&mut self, event: &InputEvent) -> bool {
        if self.confirm_change_team {
            return self.handle_confirm(event);
        }
        match event {
            InputEvent::Click(TAB_GAME) | InputEvent::Key('1') => self.switch_tab(Tab::Game),
            InputEvent::Click(TAB_SHOP) | InputEvent::Key('2') => self.switch_tab(Tab::Shop),
            InputEvent::Click(TAB_LEADERBOARD) | InputEvent::Key('3') => {
                self.switch_tab(Tab::Leaderboard)
            }
            _ => {
                return match self.tab {
                    Tab::Game => self.handle_game_tab(event),
                    Tab::Shop => self.handle_shop_tab(event),
                    Tab::Leaderboard => self.handle_leaderboard_tab(event),
                }
            }
        }
        true
    }

    fn switch_tab(&mut self, tab: Tab) {
        if self.tab == Tab::Leaderboard && tab != Tab::Leaderboard {
            self.leaderboard.close();
        }
        match tab {
            Tab::Shop => self.engine.reload(self.now_ms),
            Tab::Leaderboard => self.leaderboard.load(),
            Tab::Game => {}
        }
        self.tab = tab;
    }

    fn handle_game_tab(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::Click(CLICK_BUTTON) | InputEvent::Key('c') | InputEvent::Key(' ') => {
                self.engine.register_manual_click(self.now_ms);
                true
            }
            InputEvent::Click(CHANGE_TEAM) | InputEvent::Key('x') => {
                self.confirm_change_team = true;
                true
            }
            _ => false,
        }
    }

    fn handle_confirm(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::Click(CONFIRM_CHANGE_TEAM) | InputEvent::Key('y') => {
                self.change_team();
                true
            }
            InputEvent::Click(CANCEL_CHANGE_TEAM) | InputEvent::Key('n') | InputEvent::Escape => {
                self.confirm_change_team = false;
                true
            }
            _ => false,
        }
    }

    fn change_team(&mut self) {
        let tab = &mut self.tab;
        let confirm = &mut self.confirm_change_team;
        let leaderboard = &mut self.leaderboard;
        self.engine.logout(|| {
            *tab = Tab::Game;
            *confirm = false;
            leaderboard.close();
        });
        self.add_log("進行状況をリセットした。新しいチームを選ぼう。", true);
    }

    fn handle_shop_tab(&mut self, event: &InputEvent) -> bool {
        let index = match event {
            InputEvent::Key(c @ 'a'..='z') => (*c as u8 - b'a') as usize,
            InputEvent::Click(id) if *id >= BUY_BONUS_BASE => (id - BUY_BONUS_BASE) as usize,
            _ => return false,
        };
        let Some(id) = self.engine.available_bonuses().get(index).map(|b| b.id) else {
            return false;
        };
        if let Err(e) = self.engine.purchase_bonus(id, self.now_ms) {
            self.add_log(&purchase_message(&e), false);
        }
        true
    }

    fn handle_leaderboard_tab(&mut self, event: &InputEvent) -> bool {
        let team = match event {
            InputEvent::Key('r') => Team::Red,
            InputEvent::Key('b') => Team::Blue,
            InputEvent::Click(id)
                if (RANK_TEAM_BASE..RANK_TEAM_BASE + Team::all().len() as u16).contains(id) =>
            {
                Team::all()[(id - RANK_TEAM_BASE) as usize]
            }
            _ => return false,
        };
        self.leaderboard.switch_team(team);
        true
    }

    fn drain_notifications(&mut self) {
        for notification in self.engine.take_notifications() {
            match notification {
                Notification::AutoClickerUnlocked => {
                    self.add_log("オートクリッカーが解放された！ショップで入手しよう。", true);
                }
                Notification::BonusPurchased { id } => {
                    let name = self
                        .engine
                        .catalog()
                        .get(id)
                        .map(|b| b.name.clone())
                        .unwrap_or_default();
                    self.add_log(&format!("「{}」を購入した！", name), true);
                }
            }
        }
    }
}

fn validation_message(err: &ValidationError) -> String {
    match err {
        ValidationError::UsernameLength { min, max, .. } => {
            format!("ユーザー名は{}〜{}文字で入力してください。", min, max)
        }
        ValidationError::MissingUsername => "先にユーザー名を入力してください。".into(),
        ValidationError::TeamAlreadySelected => "すでにチームに参加している。".into(),
    }
}

fn purchase_message(err: &PurchaseError) -> String {
    match err {
        PurchaseError::UnknownBonus(_) => "そのボーナスは存在しない。".into(),
        PurchaseError::AlreadyOwned(_) => "すでに持っている。".into(),
        PurchaseError::InsufficientClicks { cost, available } => {
            format!("クリックが足りない（必要 {} / 所持 {}）。", cost, available)
        }
        PurchaseError::NoTeamSelected => "先にチームを選んでください。".into(),
    }
}
