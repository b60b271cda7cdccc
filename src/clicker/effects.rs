//! Standing bonus effects: reduces the owned-bonus list into rates.
//!
//! Only AutoClicker and ClickMultiplier contribute. TeamBoost and special
//! abilities are one-shot effects applied at purchase time.

use super::state::{BonusCategory, BonusDefinition};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectRates {
    /// Sum of AutoClicker effects (clicks per tick).
    pub auto_click_rate: f64,
    /// Product of ClickMultiplier effects.
    pub click_multiplier: f64,
}

impl Default for EffectRates {
    fn default() -> Self {
        Self {
            auto_click_rate: 0.0,
            click_multiplier: 1.0,
        }
    }
}

impl EffectRates {
    /// Clicks credited for one accepted manual tap.
    pub fn clicks_per_tap(&self) -> u64 {
        self.click_multiplier.floor().max(0.0) as u64
    }

    /// Clicks credited to the ledgers for one auto-click tick.
    pub fn clicks_per_tick(&self) -> u64 {
        (self.auto_click_rate * self.click_multiplier).floor().max(0.0) as u64
    }
}

/// Aggregate owned bonuses. Empty input yields the defaults (0 and 1).
pub fn aggregate<'a>(owned: impl IntoIterator<Item = &'a BonusDefinition>) -> EffectRates {
    owned
        .into_iter()
        .fold(EffectRates::default(), |mut rates, bonus| {
            match bonus.category {
                BonusCategory::AutoClicker => rates.auto_click_rate += bonus.effect,
                BonusCategory::ClickMultiplier => rates.click_multiplier *= bonus.effect,
                BonusCategory::TeamBoost | BonusCategory::Special(_) => {}
            }
            rates
        })
}
