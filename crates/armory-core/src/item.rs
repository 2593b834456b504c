//! Catalog item types.
//!
//! Upstream documents carry no discriminator field, so [`Item`] is only ever
//! produced by [`crate::classify`] or by decoding a type-specific endpoint.
//! Every field that upstream is known to leave out or set to `null` decodes to
//! `None`, an empty list or `false`.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Decode `null` as the type's default.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub weapon_id: Option<i64>,
    pub name: String,
}

/// A named reference record (category, pattern, wear, team).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    #[serde(default)]
    pub id: String,
    pub name: String,
}

pub type Category = NamedRef;
pub type Pattern = NamedRef;
pub type Wear = NamedRef;
pub type Team = NamedRef;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rarity {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// Embedded crate reference carried by skins, stickers, graffiti and keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrateRef {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Embedded collection reference carried by skins, agents and keychains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionRef {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skin {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub weapon: Option<Weapon>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub pattern: Option<Pattern>,
    #[serde(default)]
    pub min_float: Option<f64>,
    #[serde(default)]
    pub max_float: Option<f64>,
    #[serde(default)]
    pub rarity: Option<Rarity>,
    #[serde(default, deserialize_with = "null_default")]
    pub stattrak: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub souvenir: bool,
    #[serde(default)]
    pub paint_index: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub wears: Vec<Wear>,
    #[serde(default, deserialize_with = "null_default")]
    pub collections: Vec<CollectionRef>,
    #[serde(default, deserialize_with = "null_default")]
    pub crates: Vec<CrateRef>,
    #[serde(default)]
    pub team: Option<Team>,
    #[serde(default, deserialize_with = "null_default")]
    pub legacy_model: bool,
    #[serde(default)]
    pub market_hash_name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl Skin {
    pub fn weapon_name(&self) -> Option<&str> {
        self.weapon.as_ref().map(|w| w.name.as_str())
    }

    pub fn pattern_name(&self) -> Option<&str> {
        self.pattern.as_ref().map(|p| p.name.as_str())
    }

    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }

    pub fn rarity_name(&self) -> Option<&str> {
        self.rarity.as_ref().map(|r| r.name.as_str())
    }

    pub fn team_name(&self) -> Option<&str> {
        self.team.as_ref().map(|t| t.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinNotGrouped {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub skin_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub weapon: Option<Weapon>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub pattern: Option<Pattern>,
    #[serde(default)]
    pub min_float: Option<f64>,
    #[serde(default)]
    pub max_float: Option<f64>,
    #[serde(default)]
    pub wear: Option<Wear>,
    #[serde(default, deserialize_with = "null_default")]
    pub stattrak: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub souvenir: bool,
    #[serde(default)]
    pub paint_index: Option<String>,
    #[serde(default)]
    pub rarity: Option<Rarity>,
    #[serde(default)]
    pub market_hash_name: Option<String>,
    #[serde(default)]
    pub team: Option<Team>,
    #[serde(default)]
    pub style: Option<Style>,
    #[serde(default, deserialize_with = "null_default")]
    pub legacy_model: bool,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sticker {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rarity: Option<Rarity>,
    #[serde(default, deserialize_with = "null_default")]
    pub crates: Vec<CrateRef>,
    #[serde(default)]
    pub tournament_event: Option<String>,
    #[serde(default)]
    pub tournament_team: Option<String>,
    #[serde(rename = "type", default)]
    pub sticker_type: Option<String>,
    #[serde(default)]
    pub market_hash_name: Option<String>,
    #[serde(default)]
    pub effect: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keychain {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rarity: Option<Rarity>,
    #[serde(default, deserialize_with = "null_default")]
    pub collections: Vec<CollectionRef>,
    #[serde(default)]
    pub market_hash_name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rarity: Option<Rarity>,
    #[serde(rename = "type", default)]
    pub collectible_type: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub genuine: bool,
    #[serde(default)]
    pub market_hash_name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rarity: Option<Rarity>,
    #[serde(default, deserialize_with = "null_default")]
    pub collections: Vec<CollectionRef>,
    #[serde(default)]
    pub team: Option<Team>,
    #[serde(default)]
    pub market_hash_name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rarity: Option<Rarity>,
    #[serde(default)]
    pub market_hash_name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graffiti {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rarity: Option<Rarity>,
    #[serde(default, deserialize_with = "null_default")]
    pub crates: Vec<CrateRef>,
    #[serde(default)]
    pub market_hash_name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicKit {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rarity: Option<Rarity>,
    #[serde(default)]
    pub market_hash_name: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub exclusive: bool,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseWeapon {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub market_hash_name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tournament_event: Option<String>,
    #[serde(default)]
    pub team0: Option<String>,
    #[serde(default)]
    pub team1: Option<String>,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub map: Option<String>,
    #[serde(default)]
    pub market_hash_name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub video: Option<String>,
}

/// A full crate record from the crates collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crate {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub crate_type: Option<String>,
    #[serde(default)]
    pub first_sale_date: Option<String>,
    #[serde(default)]
    pub market_hash_name: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub rental: bool,
    #[serde(default)]
    pub image: Option<String>,
}

impl Crate {
    pub fn as_ref(&self) -> CrateRef {
        CrateRef {
            id: self.id.clone(),
            name: self.name.clone(),
            image: self.image.clone(),
        }
    }
}

/// A full collection record from the collections collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub crates: Vec<CrateRef>,
    #[serde(default)]
    pub market_hash_name: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub rental: bool,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Key {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub crates: Vec<CrateRef>,
    #[serde(default)]
    pub market_hash_name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Logical kind of a catalog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Skin,
    SkinNotGrouped,
    Sticker,
    Keychain,
    Collectible,
    Agent,
    Patch,
    Graffiti,
    MusicKit,
    BaseWeapon,
    Highlight,
    Crate,
    Collection,
    Key,
}

impl ItemKind {
    /// Plural bucket name used to group results by type.
    pub fn bucket(&self) -> &'static str {
        match self {
            ItemKind::Skin => "skins",
            ItemKind::SkinNotGrouped => "skins_not_grouped",
            ItemKind::Sticker => "stickers",
            ItemKind::Keychain => "keychains",
            ItemKind::Collectible => "collectibles",
            ItemKind::Agent => "agents",
            ItemKind::Patch => "patches",
            ItemKind::Graffiti => "graffiti",
            ItemKind::MusicKit => "music_kits",
            ItemKind::BaseWeapon => "base_weapons",
            ItemKind::Highlight => "highlights",
            ItemKind::Crate => "crates",
            ItemKind::Collection => "collections",
            ItemKind::Key => "keys",
        }
    }

    /// Parse a plural bucket name.
    pub fn from_bucket(name: &str) -> Option<Self> {
        ItemKind::ALL.iter().copied().find(|k| k.bucket() == name)
    }

    pub const ALL: &'static [ItemKind] = &[
        ItemKind::Skin,
        ItemKind::SkinNotGrouped,
        ItemKind::Sticker,
        ItemKind::Keychain,
        ItemKind::Collectible,
        ItemKind::Agent,
        ItemKind::Patch,
        ItemKind::Graffiti,
        ItemKind::MusicKit,
        ItemKind::BaseWeapon,
        ItemKind::Highlight,
        ItemKind::Crate,
        ItemKind::Collection,
        ItemKind::Key,
    ];
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ItemKind::Skin => "skin",
            ItemKind::SkinNotGrouped => "skin_not_grouped",
            ItemKind::Sticker => "sticker",
            ItemKind::Keychain => "keychain",
            ItemKind::Collectible => "collectible",
            ItemKind::Agent => "agent",
            ItemKind::Patch => "patch",
            ItemKind::Graffiti => "graffiti",
            ItemKind::MusicKit => "music_kit",
            ItemKind::BaseWeapon => "base_weapon",
            ItemKind::Highlight => "highlight",
            ItemKind::Crate => "crate",
            ItemKind::Collection => "collection",
            ItemKind::Key => "key",
        };
        f.write_str(label)
    }
}

/// A classified catalog item.
///
/// Serializes as the bare upstream-shaped record, without a tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Item {
    Skin(Skin),
    SkinNotGrouped(SkinNotGrouped),
    Sticker(Sticker),
    Keychain(Keychain),
    Collectible(Collectible),
    Agent(Agent),
    Patch(Patch),
    Graffiti(Graffiti),
    MusicKit(MusicKit),
    BaseWeapon(BaseWeapon),
    Highlight(Highlight),
    Crate(Crate),
    Collection(Collection),
    Key(Key),
}

macro_rules! each_variant {
    ($item:expr, $v:ident => $body:expr) => {
        match $item {
            Item::Skin($v) => $body,
            Item::SkinNotGrouped($v) => $body,
            Item::Sticker($v) => $body,
            Item::Keychain($v) => $body,
            Item::Collectible($v) => $body,
            Item::Agent($v) => $body,
            Item::Patch($v) => $body,
            Item::Graffiti($v) => $body,
            Item::MusicKit($v) => $body,
            Item::BaseWeapon($v) => $body,
            Item::Highlight($v) => $body,
            Item::Crate($v) => $body,
            Item::Collection($v) => $body,
            Item::Key($v) => $body,
        }
    };
}

impl Item {
    /// Decode a raw record as the given kind.
    pub fn decode(kind: ItemKind, value: &serde_json::Value) -> serde_json::Result<Self> {
        let item = match kind {
            ItemKind::Skin => Item::Skin(Skin::deserialize(value)?),
            ItemKind::SkinNotGrouped => Item::SkinNotGrouped(SkinNotGrouped::deserialize(value)?),
            ItemKind::Sticker => Item::Sticker(Sticker::deserialize(value)?),
            ItemKind::Keychain => Item::Keychain(Keychain::deserialize(value)?),
            ItemKind::Collectible => Item::Collectible(Collectible::deserialize(value)?),
            ItemKind::Agent => Item::Agent(Agent::deserialize(value)?),
            ItemKind::Patch => Item::Patch(Patch::deserialize(value)?),
            ItemKind::Graffiti => Item::Graffiti(Graffiti::deserialize(value)?),
            ItemKind::MusicKit => Item::MusicKit(MusicKit::deserialize(value)?),
            ItemKind::BaseWeapon => Item::BaseWeapon(BaseWeapon::deserialize(value)?),
            ItemKind::Highlight => Item::Highlight(Highlight::deserialize(value)?),
            ItemKind::Crate => Item::Crate(Crate::deserialize(value)?),
            ItemKind::Collection => Item::Collection(Collection::deserialize(value)?),
            ItemKind::Key => Item::Key(Key::deserialize(value)?),
        };
        Ok(item)
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            Item::Skin(_) => ItemKind::Skin,
            Item::SkinNotGrouped(_) => ItemKind::SkinNotGrouped,
            Item::Sticker(_) => ItemKind::Sticker,
            Item::Keychain(_) => ItemKind::Keychain,
            Item::Collectible(_) => ItemKind::Collectible,
            Item::Agent(_) => ItemKind::Agent,
            Item::Patch(_) => ItemKind::Patch,
            Item::Graffiti(_) => ItemKind::Graffiti,
            Item::MusicKit(_) => ItemKind::MusicKit,
            Item::BaseWeapon(_) => ItemKind::BaseWeapon,
            Item::Highlight(_) => ItemKind::Highlight,
            Item::Crate(_) => ItemKind::Crate,
            Item::Collection(_) => ItemKind::Collection,
            Item::Key(_) => ItemKind::Key,
        }
    }

    pub fn id(&self) -> &str {
        each_variant!(self, v => v.id.as_str())
    }

    pub fn name(&self) -> &str {
        each_variant!(self, v => v.name.as_str())
    }

    pub fn description(&self) -> Option<&str> {
        each_variant!(self, v => v.description.as_deref())
    }

    pub fn image(&self) -> Option<&str> {
        each_variant!(self, v => v.image.as_deref())
    }

    pub fn market_hash_name(&self) -> Option<&str> {
        each_variant!(self, v => v.market_hash_name.as_deref())
    }

    /// Fill in the catalog id from the document key when the record has none.
    pub(crate) fn set_id_if_empty(&mut self, key: &str) {
        each_variant!(self, v => {
            if v.id.is_empty() {
                v.id = key.to_string();
            }
        })
    }

    pub fn rarity(&self) -> Option<&Rarity> {
        match self {
            Item::Skin(v) => v.rarity.as_ref(),
            Item::SkinNotGrouped(v) => v.rarity.as_ref(),
            Item::Sticker(v) => v.rarity.as_ref(),
            Item::Keychain(v) => v.rarity.as_ref(),
            Item::Collectible(v) => v.rarity.as_ref(),
            Item::Agent(v) => v.rarity.as_ref(),
            Item::Patch(v) => v.rarity.as_ref(),
            Item::Graffiti(v) => v.rarity.as_ref(),
            Item::MusicKit(v) => v.rarity.as_ref(),
            Item::BaseWeapon(_)
            | Item::Highlight(_)
            | Item::Crate(_)
            | Item::Collection(_)
            | Item::Key(_) => None,
        }
    }

    pub fn as_skin(&self) -> Option<&Skin> {
        match self {
            Item::Skin(skin) => Some(skin),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_skin_tolerates_nulls() {
        let value = json!({
            "id": "skin-1",
            "name": "★ Karambit",
            "description": null,
            "weapon": { "id": "weapon_knife_karambit", "weapon_id": 507, "name": "Karambit" },
            "category": null,
            "pattern": null,
            "rarity": { "id": "rarity_ancient_weapon", "name": "Covert", "color": "#eb4b4b" },
            "stattrak": null,
            "wears": null,
            "collections": null,
            "crates": [{ "id": "crate-1", "name": "Chroma Case", "image": null }],
            "team": { "id": "both", "name": "Both Teams" }
        });

        let item = Item::decode(ItemKind::Skin, &value).unwrap();
        let skin = item.as_skin().unwrap();
        assert!(!skin.stattrak);
        assert!(skin.wears.is_empty());
        assert!(skin.pattern.is_none());
        assert_eq!(skin.crates.len(), 1);
        assert_eq!(skin.weapon_name(), Some("Karambit"));
    }

    #[test]
    fn test_serializes_untagged() {
        let value = json!({ "id": "patch-1", "name": "Patch | Crown", "market_hash_name": "Patch | Crown" });
        let item = Item::decode(ItemKind::Patch, &value).unwrap();
        let out = serde_json::to_value(&item).unwrap();
        assert_eq!(out["name"], "Patch | Crown");
        assert!(out.get("Patch").is_none());
    }

    #[test]
    fn test_bucket_roundtrip() {
        for kind in ItemKind::ALL {
            assert_eq!(ItemKind::from_bucket(kind.bucket()), Some(*kind));
        }
        assert_eq!(ItemKind::from_bucket("weapons"), None);
    }

    #[test]
    fn test_missing_name_fails_decode() {
        let value = json!({ "id": "x" });
        assert!(Item::decode(ItemKind::Sticker, &value).is_err());
    }
}
