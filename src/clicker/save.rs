//! ローカル進行データの保存/読み込み。
//!
//! ## 保存形式
//!
//! キーごとに文字列で保存する（値の形式は共有アプリと互換）:
//!
//! | キー | 値 |
//! |---|---|
//! | `team_clicker_preference` | チーム ID (`"Rouge"` / `"Bleu"`) |
//! | `team_clicker_clicks` | 個人クリック数（10進整数） |
//! | `team_clicker_username` | ユーザー名 |
//! | `team_clicker_autoclicker` | `"enabled"` または未設定 |
//! | `team_clicker_bonuses` | 購入済みボーナスの JSON 配列 |
//!
//! 読み込みは寛容に行う。壊れた値はデフォルト値に置き換え、ログに警告を残す。
//! 書き込み失敗もログに残すだけで呼び出し元には返さない。

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;

use super::catalog::Catalog;
use super::state::{BonusId, PersonalProgress, Team};

pub const TEAM_KEY: &str = "team_clicker_preference";
pub const CLICKS_KEY: &str = "team_clicker_clicks";
pub const USERNAME_KEY: &str = "team_clicker_username";
pub const AUTO_CLICKER_KEY: &str = "team_clicker_autoclicker";
pub const BONUSES_KEY: &str = "team_clicker_bonuses";

/// オートクリッカー解放済みを示す値。
const AUTO_CLICKER_ENABLED: &str = "enabled";

/// 文字列キー/値ストア。
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// ブラウザの localStorage。WASM 環境でのみ動作。
#[cfg(target_arch = "wasm32")]
pub struct BrowserStorage;

#[cfg(target_arch = "wasm32")]
impl BrowserStorage {
    fn storage() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or(StorageError::Unavailable)
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for BrowserStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::storage()?.get_item(key).map_err(|e| StorageError::Read {
            key: key.to_string(),
            reason: format!("{e:?}"),
        })
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::Write {
                key: key.to_string(),
                reason: format!("{e:?}"),
            })
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        Self::storage()?
            .remove_item(key)
            .map_err(|e| StorageError::Remove {
                key: key.to_string(),
                reason: format!("{e:?}"),
            })
    }
}

/// メモリ上のストア。テストとブラウザ外での実行用。
#[derive(Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
    failing: Cell<bool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// true の間、すべての操作が失敗する。
    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    /// 保存されている生の値（テスト用の覗き見）。
    pub fn raw(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.failing.get() {
            return Err(StorageError::Read {
                key: key.to_string(),
                reason: "injected failure".into(),
            });
        }
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.failing.get() {
            return Err(StorageError::Write {
                key: key.to_string(),
                reason: "injected failure".into(),
            });
        }
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        if self.failing.get() {
            return Err(StorageError::Remove {
                key: key.to_string(),
                reason: "injected failure".into(),
            });
        }
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

/// 購入済みボーナスの保存形式。id 以外は表示用で、欠けていても読める。
#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
struct StoredBonus {
    id: BonusId,
    name: String,
    cost: u64,
    effect: f64,
    category: String,
    description: String,
}

/// PersonalProgress の各フィールドを KeyValueStore に読み書きする。
#[derive(Clone)]
pub struct ProgressStore {
    kv: Rc<dyn KeyValueStore>,
}

impl ProgressStore {
    pub fn new(kv: Rc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// 全フィールドを読み込む。読めなかった値はデフォルトになる。
    pub fn load(&self, catalog: &Catalog) -> PersonalProgress {
        let mut progress = PersonalProgress::default();
        self.reload_into(&mut progress, catalog);
        progress
    }

    /// 読み込めたフィールドだけを `progress` に上書きする。
    /// ストレージ自体が読めないフィールドはメモリ上の値をそのまま残す。
    pub fn reload_into(&self, progress: &mut PersonalProgress, catalog: &Catalog) {
        if let Ok(team) = self.load_team() {
            progress.team = team;
        }
        if let Ok(clicks) = self.load_clicks() {
            progress.personal_clicks = clicks;
        }
        if let Ok(name) = self.read(USERNAME_KEY) {
            progress.username = name.filter(|name| !name.is_empty());
        }
        if let Ok(flag) = self.read(AUTO_CLICKER_KEY) {
            progress.auto_clicker_unlocked = flag.as_deref() == Some(AUTO_CLICKER_ENABLED);
        }
        if let Ok(ids) = self.load_bonuses(catalog) {
            progress.purchased_bonuses = ids;
        }
    }

    fn load_team(&self) -> Result<Option<Team>, StorageError> {
        let Some(id) = self.read(TEAM_KEY)? else {
            return Ok(None);
        };
        let team = Team::from_id(&id);
        if team.is_none() {
            log::warn!("unknown team id in local storage: {id:?}");
        }
        Ok(team)
    }

    fn load_clicks(&self) -> Result<u64, StorageError> {
        let Some(raw) = self.read(CLICKS_KEY)? else {
            return Ok(0);
        };
        Ok(match raw.trim().parse::<u64>() {
            Ok(n) => n,
            Err(_) => {
                log::warn!("invalid click count {raw:?}, resetting to 0");
                self.save_clicks(0);
                0
            }
        })
    }

    fn load_bonuses(&self, catalog: &Catalog) -> Result<Vec<BonusId>, StorageError> {
        let Some(json) = self.read(BONUSES_KEY)? else {
            return Ok(Vec::new());
        };
        let stored: Vec<StoredBonus> = match serde_json::from_str(&json) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("discarding unreadable bonus list: {e}");
                return Ok(Vec::new());
            }
        };

        let mut ids: Vec<BonusId> = Vec::with_capacity(stored.len());
        for bonus in stored {
            if catalog.get(bonus.id).is_none() {
                log::warn!("dropping unknown bonus id {}", bonus.id);
                continue;
            }
            if !ids.contains(&bonus.id) {
                ids.push(bonus.id);
            }
        }
        Ok(ids)
    }

    pub fn save_team(&self, team: Option<Team>) {
        match team {
            Some(t) => self.write(TEAM_KEY, t.id()),
            None => self.remove(TEAM_KEY),
        }
    }

    pub fn save_clicks(&self, clicks: u64) {
        self.write(CLICKS_KEY, &clicks.to_string());
    }

    pub fn save_username(&self, username: &str) {
        self.write(USERNAME_KEY, username);
    }

    pub fn save_auto_clicker(&self, unlocked: bool) {
        if unlocked {
            self.write(AUTO_CLICKER_KEY, AUTO_CLICKER_ENABLED);
        } else {
            self.remove(AUTO_CLICKER_KEY);
        }
    }

    pub fn save_bonuses(&self, ids: &[BonusId], catalog: &Catalog) {
        let stored: Vec<StoredBonus> = catalog
            .resolve(ids)
            .map(|b| StoredBonus {
                id: b.id,
                name: b.name.clone(),
                cost: b.cost,
                effect: b.effect,
                category: b.category.label().to_string(),
                description: b.description.clone(),
            })
            .collect();
        match serde_json::to_string(&stored) {
            Ok(json) => self.write(BONUSES_KEY, &json),
            Err(e) => log::warn!("failed to serialize bonus list: {e}"),
        }
    }

    /// チーム変更時のリセット。ユーザー名は残す。
    pub fn clear_progress(&self) {
        for key in [TEAM_KEY, CLICKS_KEY, AUTO_CLICKER_KEY, BONUSES_KEY] {
            self.remove(key);
        }
    }

    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.kv
            .get_item(key)
            .inspect_err(|e| log::warn!("local storage read failed: {e}"))
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.kv.set_item(key, value) {
            log::warn!("local storage write failed: {e}");
        }
    }

    fn remove(&self, key: &str) {
        if let Err(e) = self.kv.remove_item(key) {
            log::warn!("local storage remove failed: {e}");
        }
    }
}
