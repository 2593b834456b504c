//! Rarity tiers, distributions and the placeholder price table.

use crate::item::{Item, Rarity};
use serde::{Deserialize, Serialize};

/// One of six ordered rarity buckets, inferred from a rarity's display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RarityTier {
    Common,
    Uncommon,
    Rare,
    Legendary,
    Ancient,
    Contraband,
}

const TIER_KEYWORDS: &[(RarityTier, &[&str])] = &[
    (RarityTier::Common, &["consumer", "common"]),
    (RarityTier::Uncommon, &["industrial", "uncommon"]),
    (RarityTier::Rare, &["mil-spec", "rare"]),
    (RarityTier::Legendary, &["restricted", "legendary"]),
    (RarityTier::Ancient, &["classified", "ancient"]),
    (RarityTier::Contraband, &["covert", "contraband"]),
];

impl RarityTier {
    /// Match a rarity display name against the tier keywords, first hit wins.
    ///
    /// "Uncommon" contains "common" and so lands in [`RarityTier::Common`].
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        TIER_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
            .map(|(tier, _)| *tier)
    }

    /// Flat placeholder price for the tier.
    pub fn price(&self) -> f64 {
        match self {
            RarityTier::Common => 0.05,
            RarityTier::Uncommon => 0.15,
            RarityTier::Rare => 0.50,
            RarityTier::Legendary => 2.00,
            RarityTier::Ancient => 8.00,
            RarityTier::Contraband => 25.00,
        }
    }
}

const EXTRAORDINARY_PRICE: f64 = 100.00;

/// Tally of items per rarity tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RarityDistribution {
    pub common: u32,
    pub uncommon: u32,
    pub rare: u32,
    pub legendary: u32,
    pub ancient: u32,
    pub contraband: u32,
}

impl RarityDistribution {
    /// Tally every item with a recognisable rarity name; others are skipped.
    pub fn tally<'a>(items: impl IntoIterator<Item = &'a Item>) -> Self {
        let mut distribution = Self::default();
        for tier in items
            .into_iter()
            .filter_map(|item| item.rarity())
            .filter_map(|rarity| RarityTier::from_name(&rarity.name))
        {
            distribution.add(tier);
        }
        distribution
    }

    pub fn add(&mut self, tier: RarityTier) {
        let slot = match tier {
            RarityTier::Common => &mut self.common,
            RarityTier::Uncommon => &mut self.uncommon,
            RarityTier::Rare => &mut self.rare,
            RarityTier::Legendary => &mut self.legendary,
            RarityTier::Ancient => &mut self.ancient,
            RarityTier::Contraband => &mut self.contraband,
        };
        *slot += 1;
    }

    pub fn total(&self) -> u32 {
        self.common + self.uncommon + self.rare + self.legendary + self.ancient + self.contraband
    }
}

/// Estimated price of a rarity. Not a market quote.
pub fn estimate_price(rarity: Option<&Rarity>) -> f64 {
    let Some(rarity) = rarity else {
        return 0.0;
    };
    match RarityTier::from_name(&rarity.name) {
        Some(tier) => tier.price(),
        None if rarity.name.to_lowercase().contains("extraordinary") => EXTRAORDINARY_PRICE,
        None => 0.0,
    }
}

/// Whether a rarity is low enough to feed a trade-up contract.
///
/// Matches on the display name as given, so case matters.
pub fn can_trade_up(rarity: Option<&Rarity>) -> bool {
    rarity.is_some_and(|r| {
        ["Consumer", "Industrial", "Mil-Spec"]
            .iter()
            .any(|grade| r.name.contains(grade))
    })
}
