//! The fixed bonus shop.

use super::state::{BonusCategory, BonusDefinition, BonusId, SpecialAbility};

/// Read-only list of purchasable bonuses, built once and passed to the engine.
#[derive(Clone, Debug)]
pub struct Catalog {
    bonuses: Vec<BonusDefinition>,
}

impl Catalog {
    pub fn new(bonuses: Vec<BonusDefinition>) -> Self {
        Self { bonuses }
    }

    /// The nine bonuses shipped with the game.
    pub fn standard() -> Self {
        fn bonus(
            id: BonusId,
            name: &str,
            cost: u64,
            effect: f64,
            category: BonusCategory,
            description: &str,
        ) -> BonusDefinition {
            BonusDefinition {
                id,
                name: name.into(),
                cost,
                effect,
                category,
                description: description.into(),
            }
        }

        #[rustfmt::skip]
        let bonuses = vec![
            bonus(1, "クリックドローン", 50, 1.0, BonusCategory::AutoClicker,
                "毎秒 1 回自動でクリック"),
            bonus(2, "マイクロロボット群", 200, 5.0, BonusCategory::AutoClicker,
                "毎秒 5 回自動でクリック"),
            bonus(3, "高度クリックAI", 500, 15.0, BonusCategory::AutoClicker,
                "毎秒 15 回自動でクリック"),
            bonus(4, "クリック増幅器", 100, 2.0, BonusCategory::ClickMultiplier,
                "クリックの効果が 2 倍"),
            bonus(5, "量子ブースター", 300, 3.0, BonusCategory::ClickMultiplier,
                "クリックの効果が 3 倍"),
            bonus(6, "チームの士気", 250, 10.0, BonusCategory::TeamBoost,
                "60 秒間チームに +10 のブースト"),
            bonus(7, "同期シールド", 400, 25.0, BonusCategory::TeamBoost,
                "60 秒間チームに +25 のブースト"),
            bonus(8, "変換光線", 600, 30.0,
                BonusCategory::Special(SpecialAbility::ConversionRay),
                "相手チームのクリックを 30 奪う"),
            bonus(9, "軌道クリック砲", 1000, 50.0,
                BonusCategory::Special(SpecialAbility::OrbitalStrike),
                "自チームに 100 クリックを撃ち込む"),
        ];
        Self::new(bonuses)
    }

    pub fn get(&self, id: BonusId) -> Option<&BonusDefinition> {
        self.bonuses.iter().find(|b| b.id == id)
    }

    pub fn all(&self) -> &[BonusDefinition] {
        &self.bonuses
    }

    pub fn len(&self) -> usize {
        self.bonuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bonuses.is_empty()
    }

    /// Resolve owned ids to definitions, skipping ids the catalog doesn't know.
    pub fn resolve<'a>(&'a self, ids: &'a [BonusId]) -> impl Iterator<Item = &'a BonusDefinition> + 'a {
        ids.iter().filter_map(move |id| self.get(*id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn standard_has_nine_unique_ids() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.len(), 9);
        let ids: HashSet<_> = catalog.all().iter().map(|b| b.id).collect();
        assert_eq!(ids.len(), 9);
    }

    #[test]
    fn standard_costs_are_positive() {
        for b in Catalog::standard().all() {
            assert!(b.cost > 0, "{} has zero cost", b.name);
        }
    }

    #[test]
    fn standard_covers_every_category() {
        let catalog = Catalog::standard();
        let labels: HashSet<_> = catalog.all().iter().map(|b| b.category.label()).collect();
        assert_eq!(labels.len(), 4);
    }

    #[test]
    fn conversion_ray_matches_shop_listing() {
        let catalog = Catalog::standard();
        let ray = catalog.get(8).unwrap();
        assert_eq!(ray.cost, 600);
        assert!((ray.effect - 30.0).abs() < f64::EPSILON);
        assert_eq!(
            ray.category,
            BonusCategory::Special(SpecialAbility::ConversionRay)
        );
    }

    #[test]
    fn resolve_skips_unknown_ids() {
        let catalog = Catalog::standard();
        let names: Vec<_> = catalog.resolve(&[2, 42, 4]).map(|b| b.id).collect();
        assert_eq!(names, vec![2, 4]);
    }
}
