//! Global search and scored comprehensive search.

use crate::search::take_limit;
use armory_core::item::{Item, ItemKind};
use armory_core::{Catalog, Error, Language, Result};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A field the comprehensive search can look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    Name,
    Description,
    Weapon,
    Pattern,
    Team,
    Tournament,
    Category,
    Rarity,
    Collections,
    Crates,
    MarketHashName,
}

impl SearchField {
    pub const ALL: &'static [SearchField] = &[
        SearchField::Name,
        SearchField::Description,
        SearchField::Weapon,
        SearchField::Pattern,
        SearchField::Team,
        SearchField::Tournament,
        SearchField::Category,
        SearchField::Rarity,
        SearchField::Collections,
        SearchField::Crates,
        SearchField::MarketHashName,
    ];

    /// Fields searched when the caller names none.
    pub const DEFAULTS: &'static [SearchField] = &[
        SearchField::Name,
        SearchField::Description,
        SearchField::Weapon,
        SearchField::Pattern,
        SearchField::Team,
        SearchField::Tournament,
        SearchField::Category,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchField::Name => "name",
            SearchField::Description => "description",
            SearchField::Weapon => "weapon",
            SearchField::Pattern => "pattern",
            SearchField::Team => "team",
            SearchField::Tournament => "tournament",
            SearchField::Category => "category",
            SearchField::Rarity => "rarity",
            SearchField::Collections => "collections",
            SearchField::Crates => "crates",
            SearchField::MarketHashName => "market_hash_name",
        }
    }

    pub fn weight(&self) -> u32 {
        match self {
            SearchField::Name => 100,
            SearchField::Weapon | SearchField::Pattern => 80,
            SearchField::Team | SearchField::Tournament => 60,
            SearchField::Description => 40,
            SearchField::Category | SearchField::Rarity => 30,
            SearchField::Collections | SearchField::Crates | SearchField::MarketHashName => 20,
        }
    }

    /// Whether this field of `item` contains the lowercased needle.
    ///
    /// Kind-specific fields are false for kinds that don't carry them.
    pub fn matches(&self, item: &Item, needle: &str) -> bool {
        let has = |value: Option<&str>| value.is_some_and(|v| v.to_lowercase().contains(needle));

        match (self, item) {
            (SearchField::Name, _) => has(Some(item.name())),
            (SearchField::Description, _) => has(item.description()),
            (SearchField::Rarity, _) => has(item.rarity().map(|r| r.name.as_str())),
            (SearchField::MarketHashName, _) => has(item.market_hash_name()),
            (SearchField::Weapon, Item::Skin(s)) => has(s.weapon_name()),
            (SearchField::Pattern, Item::Skin(s)) => has(s.pattern_name()),
            (SearchField::Team, Item::Skin(s)) => has(s.team_name()),
            (SearchField::Team, Item::Sticker(s)) => has(s.tournament_team.as_deref()),
            (SearchField::Team, Item::Agent(a)) => has(a.team.as_ref().map(|t| t.name.as_str())),
            (SearchField::Tournament, Item::Sticker(s)) => has(s.tournament_event.as_deref()),
            (SearchField::Tournament, Item::Highlight(h)) => has(h.tournament_event.as_deref()),
            (SearchField::Category, Item::Skin(s)) => has(s.category_name()),
            (SearchField::Category, Item::Sticker(s)) => has(s.sticker_type.as_deref()),
            (SearchField::Collections, Item::Skin(s)) => s.collections.iter().any(|c| has(Some(&c.name))),
            (SearchField::Crates, Item::Skin(s)) => s.crates.iter().any(|c| has(Some(&c.name))),
            _ => false,
        }
    }

    /// Parse a comma-separated field list.
    ///
    /// Unknown names are dropped. `None` yields [`Self::DEFAULTS`]; a list with
    /// nothing valid in it falls back to `name`.
    pub fn parse_list(raw: Option<&str>) -> Vec<SearchField> {
        let Some(raw) = raw else {
            return Self::DEFAULTS.to_vec();
        };
        let mut fields: Vec<SearchField> = Vec::new();
        for field in raw.split(',').filter_map(|f| f.parse().ok()) {
            if !fields.contains(&field) {
                fields.push(field);
            }
        }
        if fields.is_empty() {
            fields.push(SearchField::Name);
        }
        fields
    }
}

impl FromStr for SearchField {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        SearchField::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown search field: {}", s)))
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const EXACT_NAME_BONUS: u32 = 50;
const NAME_PREFIX_BONUS: u32 = 25;

/// Fields of `item` that match, and the summed score.
pub fn score(item: &Item, fields: &[SearchField], needle: &str) -> (Vec<SearchField>, u32) {
    let mut matched = Vec::new();
    let mut total = 0;

    for field in fields {
        if !field.matches(item, needle) {
            continue;
        }
        matched.push(*field);
        total += field.weight();

        if *field == SearchField::Name {
            let name = item.name().to_lowercase();
            if name == needle {
                total += EXACT_NAME_BONUS;
            }
            if name.starts_with(needle) {
                total += NAME_PREFIX_BONUS;
            }
        }
    }

    (matched, total)
}

/// Kinds the comprehensive search groups results under.
pub const COMPREHENSIVE_KINDS: &[ItemKind] = &[
    ItemKind::Skin,
    ItemKind::Sticker,
    ItemKind::Keychain,
    ItemKind::Collectible,
    ItemKind::Agent,
    ItemKind::Patch,
    ItemKind::Graffiti,
    ItemKind::MusicKit,
    ItemKind::Highlight,
    ItemKind::Crate,
    ItemKind::Collection,
];

/// Kinds a global search may be restricted to.
pub const GLOBAL_KINDS: &[ItemKind] = &[
    ItemKind::Skin,
    ItemKind::Sticker,
    ItemKind::Keychain,
    ItemKind::Collectible,
    ItemKind::Agent,
    ItemKind::Patch,
    ItemKind::Graffiti,
    ItemKind::MusicKit,
    ItemKind::Highlight,
];

/// An item with the fields it matched on and its score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredItem {
    #[serde(flatten)]
    pub item: Item,
    pub match_field: Vec<SearchField>,
    pub match_score: u32,
}

/// A scored item tagged with its bucket name.
#[derive(Debug, Clone, Serialize)]
pub struct RankedItem {
    #[serde(flatten)]
    pub scored: ScoredItem,
    pub item_type: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchStats {
    pub total_items_searched: usize,
    pub items_with_matches: usize,
    pub match_percentage: f64,
    pub fields_searched: Vec<SearchField>,
}

/// Results grouped per kind, in a fixed bucket order.
#[derive(Debug, Clone)]
pub struct Buckets<T> {
    buckets: Vec<(ItemKind, Vec<T>)>,
}

impl<T> Buckets<T> {
    fn new(kinds: &[ItemKind]) -> Self {
        Self {
            buckets: kinds.iter().map(|k| (*k, Vec::new())).collect(),
        }
    }

    fn slot(&mut self, kind: ItemKind) -> Option<&mut Vec<T>> {
        self.buckets.iter_mut().find(|(k, _)| *k == kind).map(|(_, v)| v)
    }

    pub fn get(&self, kind: ItemKind) -> Option<&[T]> {
        self.buckets.iter().find(|(k, _)| *k == kind).map(|(_, v)| v.as_slice())
    }

    pub fn kinds(&self) -> impl Iterator<Item = ItemKind> + '_ {
        self.buckets.iter().map(|(k, _)| *k)
    }

    pub fn counts(&self) -> impl Iterator<Item = (ItemKind, usize)> + '_ {
        self.buckets.iter().map(|(k, v)| (*k, v.len()))
    }

    pub fn total(&self) -> usize {
        self.buckets.iter().map(|(_, v)| v.len()).sum()
    }
}

impl<T: Serialize> Serialize for Buckets<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.buckets.len()))?;
        for (kind, items) in &self.buckets {
            map.serialize_entry(kind.bucket(), items)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComprehensiveResults {
    pub query: String,
    pub language: Language,
    pub total: usize,
    pub results_by_type: Buckets<ScoredItem>,
    pub results: Vec<RankedItem>,
    pub search_stats: SearchStats,
}

/// Score every classified item against `fields` and rank the matches.
///
/// The whole catalog is scanned; ties keep document order and the ranked list
/// is truncated to `limit` (0 = no cap) afterwards.
pub fn comprehensive_search(
    catalog: &Catalog,
    query: &str,
    language: Language,
    fields: &[SearchField],
    limit: usize,
) -> ComprehensiveResults {
    let needle = query.to_lowercase();

    let mut matches: Vec<RankedItem> = catalog
        .items()
        .filter(|item| COMPREHENSIVE_KINDS.contains(&item.kind()))
        .filter_map(|item| {
            let (match_field, match_score) = score(item, fields, &needle);
            if match_field.is_empty() {
                return None;
            }
            Some(RankedItem {
                item_type: item.kind().bucket(),
                scored: ScoredItem {
                    item: item.clone(),
                    match_field,
                    match_score,
                },
            })
        })
        .collect();

    let items_with_matches = matches.len();
    let total_items_searched = catalog.total_entries;

    // Stable: equal scores stay in document order.
    matches.sort_by(|a, b| b.scored.match_score.cmp(&a.scored.match_score));
    if limit > 0 {
        matches.truncate(limit);
    }

    let mut results_by_type = Buckets::new(COMPREHENSIVE_KINDS);
    for ranked in &matches {
        if let Some(slot) = results_by_type.slot(ranked.scored.item.kind()) {
            slot.push(ranked.scored.clone());
        }
    }

    let match_percentage = if total_items_searched > 0 {
        let pct = items_with_matches as f64 / total_items_searched as f64 * 100.0;
        (pct * 100.0).round() / 100.0
    } else {
        0.0
    };

    ComprehensiveResults {
        query: query.to_string(),
        language,
        total: matches.len(),
        results_by_type,
        results: matches,
        search_stats: SearchStats {
            total_items_searched,
            items_with_matches,
            match_percentage,
            fields_searched: fields.to_vec(),
        },
    }
}

/// Parse a comma-separated list of bucket names for global search.
///
/// Unknown names are dropped; an empty result falls back to skins.
pub fn parse_global_kinds(raw: Option<&str>) -> Vec<ItemKind> {
    let mut kinds: Vec<ItemKind> = Vec::new();
    for kind in raw
        .unwrap_or_default()
        .split(',')
        .filter_map(|t| ItemKind::from_bucket(t.trim()))
        .filter(|k| GLOBAL_KINDS.contains(k))
    {
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    if kinds.is_empty() {
        kinds.push(ItemKind::Skin);
    }
    kinds
}

pub type GlobalResults = Buckets<Item>;

fn global_match(item: &Item, needle: &str) -> bool {
    let has = |value: Option<&str>| value.is_some_and(|v| v.to_lowercase().contains(needle));
    has(Some(item.name()))
        || has(item.description())
        || item
            .as_skin()
            .is_some_and(|s| has(s.weapon_name()) || has(s.pattern_name()))
}

/// Unscored search over name, description and a skin's weapon and pattern,
/// bucketed by kind. `limit` caps the total across buckets (0 = no cap).
pub fn global_search(catalog: &Catalog, query: &str, kinds: &[ItemKind], limit: usize) -> GlobalResults {
    let needle = query.to_lowercase();
    let mut results = Buckets::new(kinds);

    let hits = take_limit(
        catalog
            .items()
            .filter(|item| kinds.contains(&item.kind()))
            .filter(|item| global_match(item, &needle)),
        limit,
    );
    for item in hits {
        if let Some(slot) = results.slot(item.kind()) {
            slot.push(item.clone());
        }
    }
    results
}
