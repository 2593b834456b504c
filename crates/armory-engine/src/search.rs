//! Unscored filters over a catalog.
//!
//! Every filter is a linear scan in document order with a case-insensitive
//! substring test, stopping once `limit` matches are collected. A limit of 0
//! means no cap.

use armory_core::item::{Item, ItemKind, Skin};
use armory_core::rarity::estimate_price;
use armory_core::{Catalog, Error, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub const MIN_YEAR: i32 = 1999;
pub const MAX_YEAR: i32 = 2030;

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

fn opt_contains_ci(haystack: Option<&str>, needle_lower: &str) -> bool {
    haystack.is_some_and(|h| contains_ci(h, needle_lower))
}

/// Collect at most `limit` items (0 = all) from an iterator.
pub(crate) fn take_limit<T>(iter: impl Iterator<Item = T>, limit: usize) -> Vec<T> {
    if limit == 0 {
        iter.collect()
    } else {
        iter.take(limit).collect()
    }
}

/// Trim a required query string, rejecting blanks.
pub fn require_query(raw: Option<&str>, what: &str) -> Result<String> {
    match raw.map(str::trim) {
        Some(q) if !q.is_empty() => Ok(q.to_string()),
        _ => Err(Error::InvalidInput(format!("{} is required", what))),
    }
}

/// The skin attribute a single-field skin search looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkinField {
    Name,
    Weapon,
    Rarity,
    Collection,
    Crate,
    Wear,
}

impl SkinField {
    fn matches(&self, skin: &Skin, needle: &str) -> bool {
        match self {
            SkinField::Name => contains_ci(&skin.name, needle),
            SkinField::Weapon => opt_contains_ci(skin.weapon_name(), needle),
            SkinField::Rarity => opt_contains_ci(skin.rarity_name(), needle),
            SkinField::Collection => skin.collections.iter().any(|c| contains_ci(&c.name, needle)),
            SkinField::Crate => skin.crates.iter().any(|c| contains_ci(&c.name, needle)),
            SkinField::Wear => skin.wears.iter().any(|w| contains_ci(&w.name, needle)),
        }
    }
}

impl fmt::Display for SkinField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SkinField::Name => "name",
            SkinField::Weapon => "weapon",
            SkinField::Rarity => "rarity",
            SkinField::Collection => "collection",
            SkinField::Crate => "crate",
            SkinField::Wear => "wear",
        };
        f.write_str(name)
    }
}

fn skins(catalog: &Catalog) -> impl Iterator<Item = &Skin> {
    catalog.items().filter_map(Item::as_skin)
}

/// Skins whose `field` contains `query`, case-insensitively.
pub fn search_skins<'a>(catalog: &'a Catalog, field: SkinField, query: &str, limit: usize) -> Vec<&'a Skin> {
    let needle = query.to_lowercase();
    take_limit(skins(catalog).filter(|skin| field.matches(skin, &needle)), limit)
}

/// Conjunctive skin criteria; an absent criterion matches everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdvancedCriteria {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weapon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rarity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stattrak: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub souvenir: Option<bool>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AdvancedCriteria {
    /// Trim text criteria, drop blank ones and require at least one left.
    pub fn normalized(self) -> Result<Self> {
        let criteria = Self {
            name: non_blank(self.name),
            weapon: non_blank(self.weapon),
            rarity: non_blank(self.rarity),
            category: non_blank(self.category),
            pattern: non_blank(self.pattern),
            stattrak: self.stattrak,
            souvenir: self.souvenir,
        };
        if criteria == Self::default() {
            return Err(Error::InvalidInput(
                "At least one search criteria is required".to_string(),
            ));
        }
        Ok(criteria)
    }

    pub fn matches(&self, skin: &Skin) -> bool {
        fn text(criterion: &Option<String>, field: Option<&str>) -> bool {
            match criterion {
                Some(c) => opt_contains_ci(field, &c.to_lowercase()),
                None => true,
            }
        }

        text(&self.name, Some(&skin.name))
            && text(&self.weapon, skin.weapon_name())
            && text(&self.rarity, skin.rarity_name())
            && text(&self.category, skin.category_name())
            && text(&self.pattern, skin.pattern_name())
            && self.stattrak.is_none_or(|s| skin.stattrak == s)
            && self.souvenir.is_none_or(|s| skin.souvenir == s)
    }
}

/// Skins matching every supplied criterion.
pub fn advanced_search<'a>(catalog: &'a Catalog, criteria: &AdvancedCriteria, limit: usize) -> Vec<&'a Skin> {
    take_limit(skins(catalog).filter(|skin| criteria.matches(skin)), limit)
}

/// Which item kinds an item search is restricted to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemScope {
    #[default]
    All,
    Skins,
    Stickers,
    Agents,
    Highlights,
}

impl ItemScope {
    pub fn includes(&self, kind: ItemKind) -> bool {
        match self {
            ItemScope::All => true,
            ItemScope::Skins => kind == ItemKind::Skin,
            ItemScope::Stickers => kind == ItemKind::Sticker,
            ItemScope::Agents => kind == ItemKind::Agent,
            ItemScope::Highlights => kind == ItemKind::Highlight,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemScope::All => "all",
            ItemScope::Skins => "skins",
            ItemScope::Stickers => "stickers",
            ItemScope::Agents => "agents",
            ItemScope::Highlights => "highlights",
        }
    }
}

impl FromStr for ItemScope {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "all" => Ok(ItemScope::All),
            "skins" => Ok(ItemScope::Skins),
            "stickers" => Ok(ItemScope::Stickers),
            "agents" => Ok(ItemScope::Agents),
            "highlights" => Ok(ItemScope::Highlights),
            other => Err(Error::InvalidInput(format!("Unknown item type: {}", other))),
        }
    }
}

impl fmt::Display for ItemScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated cross-kind item filter.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemFilter {
    Price { min: f64, max: f64 },
    Team(String),
    Tournament(String),
    Year(i32),
    Pattern(String),
    Category(String),
}

impl ItemFilter {
    pub fn price(min: Option<f64>, max: Option<f64>) -> Result<Self> {
        let (Some(min), Some(max)) = (min, max) else {
            return Err(Error::InvalidInput("Min and max price are required".to_string()));
        };
        if !min.is_finite() || !max.is_finite() || min < 0.0 || max < 0.0 || min > max {
            return Err(Error::InvalidInput(
                "Invalid price range. Min and max must be positive numbers, and min must be less than max"
                    .to_string(),
            ));
        }
        Ok(ItemFilter::Price { min, max })
    }

    pub fn team(query: Option<&str>) -> Result<Self> {
        require_query(query, "Team name").map(ItemFilter::Team)
    }

    pub fn tournament(query: Option<&str>) -> Result<Self> {
        require_query(query, "Tournament name").map(ItemFilter::Tournament)
    }

    pub fn year(year: Option<i32>) -> Result<Self> {
        match year {
            Some(y) if (MIN_YEAR..=MAX_YEAR).contains(&y) => Ok(ItemFilter::Year(y)),
            _ => Err(Error::InvalidInput(format!(
                "Valid year between {} and {} is required",
                MIN_YEAR, MAX_YEAR
            ))),
        }
    }

    pub fn pattern(query: Option<&str>) -> Result<Self> {
        require_query(query, "Pattern name").map(ItemFilter::Pattern)
    }

    pub fn category(query: Option<&str>) -> Result<Self> {
        require_query(query, "Category name").map(ItemFilter::Category)
    }

    /// Scopes this filter accepts.
    pub fn allowed_scopes(&self) -> &'static [ItemScope] {
        match self {
            ItemFilter::Price { .. } | ItemFilter::Pattern(_) | ItemFilter::Category(_) => {
                &[ItemScope::Skins, ItemScope::Stickers, ItemScope::All]
            }
            ItemFilter::Team(_) => &[
                ItemScope::Skins,
                ItemScope::Stickers,
                ItemScope::Agents,
                ItemScope::All,
            ],
            ItemFilter::Tournament(_) | ItemFilter::Year(_) => {
                &[ItemScope::Stickers, ItemScope::Highlights, ItemScope::All]
            }
        }
    }

    pub fn check_scope(&self, scope: ItemScope) -> Result<()> {
        if self.allowed_scopes().contains(&scope) {
            Ok(())
        } else {
            let allowed: Vec<&str> = self.allowed_scopes().iter().map(ItemScope::as_str).collect();
            Err(Error::InvalidInput(format!(
                "Item type '{}' is not supported here, expected one of: {}",
                scope,
                allowed.join(", ")
            )))
        }
    }

    fn matches(&self, item: &Item, needle: &str) -> bool {
        match (self, item) {
            (ItemFilter::Price { min, max }, _) => {
                let price = estimate_price(item.rarity());
                price >= *min && price <= *max
            }
            (ItemFilter::Team(_), Item::Skin(s)) => opt_contains_ci(s.team_name(), needle),
            (ItemFilter::Team(_), Item::Sticker(s)) => opt_contains_ci(s.tournament_team.as_deref(), needle),
            (ItemFilter::Team(_), Item::Agent(a)) => {
                opt_contains_ci(a.team.as_ref().map(|t| t.name.as_str()), needle)
            }
            (ItemFilter::Tournament(_) | ItemFilter::Year(_), Item::Sticker(s)) => {
                opt_contains_ci(s.tournament_event.as_deref(), needle)
            }
            (ItemFilter::Tournament(_) | ItemFilter::Year(_), Item::Highlight(h)) => {
                opt_contains_ci(h.tournament_event.as_deref(), needle)
            }
            (ItemFilter::Pattern(_), Item::Skin(s)) => opt_contains_ci(s.pattern_name(), needle),
            (ItemFilter::Pattern(_), Item::Sticker(s)) => contains_ci(&s.name, needle),
            (ItemFilter::Category(_), Item::Skin(s)) => opt_contains_ci(s.category_name(), needle),
            (ItemFilter::Category(_), Item::Sticker(s)) => opt_contains_ci(s.sticker_type.as_deref(), needle),
            _ => false,
        }
    }

    fn needle(&self) -> String {
        match self {
            ItemFilter::Price { .. } => String::new(),
            ItemFilter::Year(year) => year.to_string(),
            ItemFilter::Team(q) | ItemFilter::Tournament(q) | ItemFilter::Pattern(q) | ItemFilter::Category(q) => {
                q.to_lowercase()
            }
        }
    }
}

/// Items in `scope` that pass `filter`. The scope must already be checked.
pub fn search_items<'a>(catalog: &'a Catalog, filter: &ItemFilter, scope: ItemScope, limit: usize) -> Vec<&'a Item> {
    let needle = filter.needle();
    take_limit(
        catalog
            .items()
            .filter(|item| scope.includes(item.kind()))
            .filter(|item| filter.matches(item, &needle)),
        limit,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use armory_core::{Document, Endpoint};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn catalog() -> Catalog {
        let data = json!({
            "skin-1": {
                "name": "AK-47 | Redline",
                "weapon": { "id": "weapon_ak47", "name": "AK-47" },
                "category": { "id": "rifles", "name": "Rifles" },
                "pattern": { "id": "redline", "name": "Redline" },
                "rarity": { "id": "rarity_legendary", "name": "Classified" },
                "stattrak": true,
                "souvenir": false,
                "wears": [{ "id": "mw", "name": "Minimal Wear" }],
                "collections": [{ "id": "col-phoenix", "name": "The Phoenix Collection" }],
                "crates": [{ "id": "crate-phoenix", "name": "Operation Phoenix Weapon Case" }],
                "team": { "id": "both", "name": "Both Teams" }
            },
            "skin-2": {
                "name": "AK-47 | Safari Mesh",
                "weapon": { "id": "weapon_ak47", "name": "AK-47" },
                "category": { "id": "rifles", "name": "Rifles" },
                "pattern": { "id": "safari", "name": "Safari Mesh" },
                "rarity": { "id": "rarity_common", "name": "Industrial Grade" },
                "stattrak": false,
                "souvenir": true
            },
            "skin-3": {
                "name": "AWP | Asiimov",
                "weapon": { "id": "weapon_awp", "name": "AWP" },
                "category": { "id": "snipers", "name": "Sniper Rifles" },
                "pattern": { "id": "asiimov", "name": "Asiimov" },
                "rarity": { "id": "rarity_ancient", "name": "Covert" },
                "stattrak": true,
                "team": { "id": "ct", "name": "Counter-Terrorist" }
            },
            "sticker-1": {
                "name": "Sticker | Natus Vincere | Katowice 2014",
                "tournament_event": "EMS One Katowice 2014",
                "tournament_team": "Natus Vincere",
                "type": "Team",
                "rarity": { "id": "rarity_rare", "name": "Mil-Spec" }
            },
            "highlight-1": {
                "name": "Austin 2025 Highlight",
                "tournament_event": "BLAST.tv Austin Major 2025",
                "map": "de_nuke"
            },
            "agent-1": {
                "name": "Sir Bloody Miami Darryl",
                "team": { "id": "t", "name": "Terrorist" },
                "collections": []
            }
        });
        Document::ingest(Endpoint::All, data).unwrap().catalog
    }

    fn names<T: AsRef<str>>(names: impl IntoIterator<Item = T>) -> Vec<String> {
        names.into_iter().map(|n| n.as_ref().to_string()).collect()
    }

    #[test]
    fn test_search_skins_by_field() {
        let catalog = catalog();
        let by_weapon = search_skins(&catalog, SkinField::Weapon, "ak", 0);
        assert_eq!(names(by_weapon.iter().map(|s| &s.name)), ["AK-47 | Redline", "AK-47 | Safari Mesh"]);

        let by_wear = search_skins(&catalog, SkinField::Wear, "minimal", 0);
        assert_eq!(by_wear.len(), 1);

        let by_crate = search_skins(&catalog, SkinField::Crate, "PHOENIX", 0);
        assert_eq!(by_crate[0].name, "AK-47 | Redline");

        let limited = search_skins(&catalog, SkinField::Name, "a", 1);
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn test_advanced_is_conjunctive() {
        let catalog = catalog();
        let criteria = AdvancedCriteria {
            weapon: Some("AK".to_string()),
            stattrak: Some(true),
            ..Default::default()
        }
        .normalized()
        .unwrap();

        let results = advanced_search(&catalog, &criteria, 50);
        assert_eq!(names(results.iter().map(|s| &s.name)), ["AK-47 | Redline"]);
    }

    #[test]
    fn test_advanced_requires_a_criterion() {
        let blank = AdvancedCriteria {
            name: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(matches!(blank.normalized(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_price_validation() {
        assert!(ItemFilter::price(Some(10.0), Some(-5.0)).is_err());
        assert!(ItemFilter::price(Some(10.0), Some(5.0)).is_err());
        assert!(ItemFilter::price(None, Some(5.0)).is_err());
        assert!(ItemFilter::price(Some(f64::NAN), Some(5.0)).is_err());
        assert!(ItemFilter::price(Some(0.0), Some(0.0)).is_ok());
    }

    #[test]
    fn test_price_search() {
        let catalog = catalog();
        let filter = ItemFilter::price(Some(1.0), Some(30.0)).unwrap();
        let all = search_items(&catalog, &filter, ItemScope::All, 0);
        assert_eq!(names(all.iter().map(|i| i.name())), ["AK-47 | Redline", "AWP | Asiimov"]);

        let stickers = search_items(&catalog, &ItemFilter::price(Some(0.5), Some(0.5)).unwrap(), ItemScope::Stickers, 0);
        assert_eq!(stickers.len(), 1);
    }

    #[test]
    fn test_team_search_spans_kinds() {
        let catalog = catalog();
        let filter = ItemFilter::team(Some("terror")).unwrap();
        let all = search_items(&catalog, &filter, ItemScope::All, 0);
        assert_eq!(names(all.iter().map(|i| i.name())), ["AWP | Asiimov", "Sir Bloody Miami Darryl"]);

        let agents = search_items(&catalog, &filter, ItemScope::Agents, 0);
        assert_eq!(agents.len(), 1);

        let navi = search_items(&catalog, &ItemFilter::team(Some("natus")).unwrap(), ItemScope::All, 0);
        assert_eq!(navi[0].kind(), ItemKind::Sticker);
    }

    #[test]
    fn test_tournament_and_year() {
        let catalog = catalog();
        let year = ItemFilter::year(Some(2025)).unwrap();
        let hits = search_items(&catalog, &year, ItemScope::All, 0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].kind(), ItemKind::Highlight);

        let katowice = ItemFilter::tournament(Some("katowice")).unwrap();
        assert!(search_items(&catalog, &katowice, ItemScope::Highlights, 0).is_empty());
        assert_eq!(search_items(&catalog, &katowice, ItemScope::Stickers, 0).len(), 1);

        assert!(ItemFilter::year(Some(1998)).is_err());
        assert!(ItemFilter::year(Some(2031)).is_err());
        assert!(ItemFilter::year(None).is_err());
    }

    #[test]
    fn test_pattern_and_category() {
        let catalog = catalog();
        let pattern = ItemFilter::pattern(Some("natus")).unwrap();
        assert_eq!(search_items(&catalog, &pattern, ItemScope::All, 0).len(), 1);

        let category = ItemFilter::category(Some("rifles")).unwrap();
        assert_eq!(search_items(&catalog, &category, ItemScope::Skins, 0).len(), 3);

        let team_type = ItemFilter::category(Some("team")).unwrap();
        assert_eq!(search_items(&catalog, &team_type, ItemScope::Stickers, 0).len(), 1);
    }

    #[test]
    fn test_scope_checks() {
        let tournament = ItemFilter::tournament(Some("major")).unwrap();
        assert!(tournament.check_scope(ItemScope::Skins).is_err());
        assert!(tournament.check_scope(ItemScope::Highlights).is_ok());
        assert!(ItemFilter::team(Some("t")).unwrap().check_scope(ItemScope::Agents).is_ok());
        assert!("weapons".parse::<ItemScope>().is_err());
    }

    #[test]
    fn test_require_query() {
        assert_eq!(require_query(Some("  ak "), "Search query").unwrap(), "ak");
        assert!(require_query(Some("   "), "Search query").is_err());
        assert!(require_query(None, "Search query").is_err());
    }
}
