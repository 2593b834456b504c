//! Structural classification of records from the heterogeneous "all items"
//! document.
//!
//! Upstream records carry no type tag. Kinds are told apart by which keys a
//! record has, and several kinds share optional keys, so the rules are tried
//! in a fixed order and the first match wins. A key present with a `null`
//! value still counts as present.

use crate::item::ItemKind;
use serde_json::{Map, Value};

struct Rule {
    kind: ItemKind,
    all_of: &'static [&'static str],
    none_of: &'static [&'static str],
}

const RULES: &[Rule] = &[
    Rule {
        kind: ItemKind::Skin,
        all_of: &["weapon", "category", "pattern", "rarity"],
        none_of: &[],
    },
    Rule {
        kind: ItemKind::Sticker,
        all_of: &["tournament_event", "type"],
        none_of: &[],
    },
    Rule {
        kind: ItemKind::Highlight,
        all_of: &["tournament_event", "map"],
        none_of: &[],
    },
    Rule {
        kind: ItemKind::Agent,
        all_of: &["team", "collections"],
        none_of: &[],
    },
    Rule {
        kind: ItemKind::Keychain,
        all_of: &["collections"],
        none_of: &["weapon"],
    },
    Rule {
        kind: ItemKind::Collectible,
        all_of: &["genuine"],
        none_of: &["weapon"],
    },
    // Broad fallback: nearly every tradable record has a market_hash_name.
    Rule {
        kind: ItemKind::Patch,
        all_of: &["market_hash_name"],
        none_of: &["weapon"],
    },
    Rule {
        kind: ItemKind::Graffiti,
        all_of: &["crates"],
        none_of: &["weapon"],
    },
    Rule {
        kind: ItemKind::MusicKit,
        all_of: &["exclusive"],
        none_of: &["weapon"],
    },
    Rule {
        kind: ItemKind::Crate,
        all_of: &["crate_id", "key"],
        none_of: &[],
    },
    Rule {
        kind: ItemKind::Collection,
        all_of: &["collection_id", "name"],
        none_of: &[],
    },
];

impl Rule {
    fn matches(&self, record: &Map<String, Value>) -> bool {
        self.all_of.iter().all(|key| record.contains_key(*key))
            && !self.none_of.iter().any(|key| record.contains_key(*key))
    }
}

/// Determine the kind of an untyped record, or `None` if no rule matches.
pub fn classify(value: &Value) -> Option<ItemKind> {
    let record = value.as_object()?;
    RULES
        .iter()
        .find(|rule| rule.matches(record))
        .map(|rule| rule.kind)
}
