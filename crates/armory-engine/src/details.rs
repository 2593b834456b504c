//! Skin detail views, related items and crate/collection contents.

use crate::ranking::global_search;
use crate::search::{SkinField, search_skins};
use crate::service::CatalogService;
use armory_core::item::{Collection, CollectionRef, Crate, CrateRef, Item, ItemKind, Rarity, Skin};
use armory_core::rarity::{RarityDistribution, can_trade_up};
use armory_core::{Catalog, Endpoint, Error, Language, Result};
use serde::Serialize;
use tracing::{debug, info};

const MAX_RELATED: usize = 10;
const LOOKUP_SEARCH_LIMIT: usize = 100;
const COLLECTION_DROP_SOURCE: &str = "Collection drop";

/// Items grouped by kind inside a crate or collection.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Contents {
    pub skins: Vec<Item>,
    pub stickers: Vec<Item>,
    pub keychains: Vec<Item>,
    pub collectibles: Vec<Item>,
    pub agents: Vec<Item>,
    pub patches: Vec<Item>,
    pub graffiti: Vec<Item>,
    pub music_kits: Vec<Item>,
}

impl Contents {
    /// Upstream publishes no per-crate or per-collection item lists, so
    /// contents are always empty.
    pub fn placeholder() -> Self {
        Self::default()
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.skins
            .iter()
            .chain(&self.stickers)
            .chain(&self.keychains)
            .chain(&self.collectibles)
            .chain(&self.agents)
            .chain(&self.patches)
            .chain(&self.graffiti)
            .chain(&self.music_kits)
    }

    pub fn rarity_distribution(&self) -> RarityDistribution {
        RarityDistribution::tally(self.items())
    }
}

/// The key that opens a crate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyInfo {
    pub id: String,
    pub name: String,
    pub market_hash_name: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CrateContents {
    #[serde(rename = "crate")]
    pub krate: Crate,
    pub contents: Contents,
    pub rarity_distribution: RarityDistribution,
    pub special_items: Vec<Item>,
    pub key_required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_info: Option<KeyInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionContents {
    pub collection: Collection,
    pub contents: Contents,
    pub rarity_distribution: RarityDistribution,
    pub special_items: Vec<Item>,
    pub drop_source: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CrateDetail {
    #[serde(rename = "crate")]
    pub krate: CrateRef,
    pub rarity_distribution: RarityDistribution,
    pub contains_items: Vec<Item>,
    pub special_items: Vec<Item>,
    pub key_required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_info: Option<KeyInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionDetail {
    pub collection: CollectionRef,
    pub rarity_distribution: RarityDistribution,
    pub contains_skins: Vec<Item>,
    pub special_items: Vec<Item>,
    pub drop_source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketInfo {
    pub market_hash_name: String,
    pub trade_up_contract: bool,
    pub souvenir_contract: bool,
}

impl MarketInfo {
    pub fn for_skin(skin: &Skin) -> Self {
        Self {
            market_hash_name: skin
                .market_hash_name
                .clone()
                .unwrap_or_else(|| skin.name.clone()),
            trade_up_contract: can_trade_up(skin.rarity.as_ref()),
            souvenir_contract: skin.souvenir,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    SameCollection,
    SameCrate,
    SameRarity,
    SameWeapon,
}

impl Relationship {
    /// Strongest relationship between two skins, if any.
    pub fn between(skin: &Skin, other: &Skin) -> Option<Self> {
        let shares = |a: &[String], b: &[String]| a.iter().any(|id| b.contains(id));
        let collection_ids = |s: &Skin| s.collections.iter().map(|c| c.id.clone()).collect::<Vec<_>>();
        let crate_ids = |s: &Skin| s.crates.iter().map(|c| c.id.clone()).collect::<Vec<_>>();

        if shares(&collection_ids(skin), &collection_ids(other)) {
            Some(Relationship::SameCollection)
        } else if shares(&crate_ids(skin), &crate_ids(other)) {
            Some(Relationship::SameCrate)
        } else if same_id(skin.rarity.as_ref().map(|r| &r.id), other.rarity.as_ref().map(|r| &r.id)) {
            Some(Relationship::SameRarity)
        } else if same_id(skin.weapon.as_ref().map(|w| &w.id), other.weapon.as_ref().map(|w| &w.id)) {
            Some(Relationship::SameWeapon)
        } else {
            None
        }
    }
}

fn same_id(a: Option<&String>, b: Option<&String>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a == b)
}

#[derive(Debug, Clone, Serialize)]
pub struct RelatedItem {
    #[serde(rename = "type")]
    pub item_type: ItemKind,
    pub id: String,
    pub name: String,
    pub rarity: Option<Rarity>,
    pub image: Option<String>,
    pub relationship: Relationship,
}

/// Up to ten other skins related to `skin`, in catalog order.
pub fn related_items(skin: &Skin, catalog: &Catalog) -> Vec<RelatedItem> {
    catalog
        .entries
        .iter()
        .filter(|entry| entry.key != skin.id)
        .filter_map(|entry| {
            let other = entry.item.as_skin()?;
            let relationship = Relationship::between(skin, other)?;
            Some(RelatedItem {
                item_type: ItemKind::Skin,
                id: other.id.clone(),
                name: other.name.clone(),
                rarity: other.rarity.clone(),
                image: other.image.clone(),
                relationship,
            })
        })
        .take(MAX_RELATED)
        .collect()
}

/// Gift packages and drops open without a key.
pub fn key_required(crate_name: &str) -> bool {
    let name = crate_name.to_lowercase();
    !["gift", "package", "drop"].iter().any(|w| name.contains(w))
}

/// The first key in `keys` that lists `crate_id` among the crates it opens.
pub fn find_key(keys: &Catalog, crate_id: &str) -> Option<KeyInfo> {
    keys.items().find_map(|item| match item {
        Item::Key(key) if key.crates.iter().any(|c| c.id == crate_id) => Some(KeyInfo {
            id: key.id.clone(),
            name: key.name.clone(),
            market_hash_name: key.market_hash_name.clone(),
            image: key.image.clone(),
        }),
        _ => None,
    })
}

/// A skin plus everything derived from it. Recomputed per request.
#[derive(Debug, Clone, Serialize)]
pub struct DetailedSkin {
    #[serde(flatten)]
    pub skin: Skin,
    pub collection_details: Vec<CollectionDetail>,
    pub crate_details: Vec<CrateDetail>,
    pub market_info: MarketInfo,
    pub related_items: Vec<RelatedItem>,
}

impl DetailedSkin {
    /// Assemble the view. `all_items` feeds related items and `keys` feeds
    /// key info; either may be missing.
    pub fn assemble(skin: Skin, all_items: Option<&Catalog>, keys: Option<&Catalog>) -> Self {
        let collection_details = skin
            .collections
            .iter()
            .map(|collection| {
                let contents = Contents::placeholder();
                CollectionDetail {
                    collection: collection.clone(),
                    rarity_distribution: contents.rarity_distribution(),
                    contains_skins: contents.skins,
                    special_items: Vec::new(),
                    drop_source: COLLECTION_DROP_SOURCE.to_string(),
                }
            })
            .collect();

        let crate_details = skin
            .crates
            .iter()
            .map(|krate| {
                let contents = Contents::placeholder();
                let key_required = key_required(&krate.name);
                CrateDetail {
                    krate: krate.clone(),
                    rarity_distribution: contents.rarity_distribution(),
                    contains_items: contents.skins,
                    special_items: Vec::new(),
                    key_required,
                    key_info: keys.filter(|_| key_required).and_then(|k| find_key(k, &krate.id)),
                }
            })
            .collect();

        let related_items = all_items
            .map(|catalog| related_items(&skin, catalog))
            .unwrap_or_default();

        Self {
            market_info: MarketInfo::for_skin(&skin),
            collection_details,
            crate_details,
            related_items,
            skin,
        }
    }
}

/// Places a skin id is looked up, in order. The first hit wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SkinLookup {
    AllItemsByKey,
    SkinsList,
    NameSearch,
    GlobalSearch,
}

const SKIN_LOOKUP_ORDER: [SkinLookup; 4] = [
    SkinLookup::AllItemsByKey,
    SkinLookup::SkinsList,
    SkinLookup::NameSearch,
    SkinLookup::GlobalSearch,
];

impl CatalogService {
    async fn lookup_skin(&self, strategy: SkinLookup, id: &str, language: Language) -> Result<Option<Skin>> {
        let found = match strategy {
            SkinLookup::AllItemsByKey => {
                let all = self.document(Endpoint::All, language).await?;
                all.catalog.get(id).and_then(Item::as_skin).cloned()
            }
            SkinLookup::SkinsList => {
                let skins = self.document(Endpoint::Skins, language).await?;
                skins
                    .catalog
                    .items()
                    .filter_map(Item::as_skin)
                    .find(|s| s.id == id)
                    .cloned()
            }
            SkinLookup::NameSearch => {
                let all = self.document(Endpoint::All, language).await?;
                search_skins(&all.catalog, SkinField::Name, id, LOOKUP_SEARCH_LIMIT)
                    .into_iter()
                    .find(|s| s.id == id)
                    .cloned()
            }
            SkinLookup::GlobalSearch => {
                let all = self.document(Endpoint::All, language).await?;
                let results = global_search(&all.catalog, id, &[ItemKind::Skin], LOOKUP_SEARCH_LIMIT);
                results
                    .get(ItemKind::Skin)
                    .unwrap_or_default()
                    .iter()
                    .filter_map(Item::as_skin)
                    .find(|s| s.id == id)
                    .cloned()
            }
        };
        Ok(found)
    }

    async fn find_skin(&self, id: &str, language: Language) -> Option<Skin> {
        for strategy in SKIN_LOOKUP_ORDER {
            match self.lookup_skin(strategy, id, language).await {
                Ok(Some(skin)) => return Some(skin),
                Ok(None) => debug!(skin_id = %id, ?strategy, "Skin not found, trying next source"),
                Err(e) => debug!(skin_id = %id, ?strategy, error = %e, "Skin lookup failed, trying next source"),
            }
        }
        None
    }

    /// A skin with collection/crate details, market info and related items.
    pub async fn skin_details(&self, id: &str, language: Language) -> Result<DetailedSkin> {
        let id = id.trim();
        if id.is_empty() {
            return Err(Error::InvalidInput("Skin ID is required".to_string()));
        }

        let skin = self
            .find_skin(id, language)
            .await
            .ok_or_else(|| Error::SkinNotFound(id.to_string()))?;

        // Related items and key info are best-effort.
        let all_items = match self.document(Endpoint::All, language).await {
            Ok(doc) => Some(doc),
            Err(e) => {
                debug!(skin_id = %id, error = %e, "Continuing without related items");
                None
            }
        };
        let keys = if skin.crates.iter().any(|c| key_required(&c.name)) {
            self.document(Endpoint::Keys, language)
                .await
                .inspect_err(|e| debug!(skin_id = %id, error = %e, "Continuing without key info"))
                .ok()
        } else {
            None
        };

        let details = DetailedSkin::assemble(
            skin,
            all_items.as_deref().map(|d| &d.catalog),
            keys.as_deref().map(|d| &d.catalog),
        );
        info!(skin_id = %id, related = details.related_items.len(), "Assembled skin details");
        Ok(details)
    }

    /// A crate record from the crates list.
    pub async fn crate_by_id(&self, id: &str, language: Language) -> Result<Crate> {
        let id = id.trim();
        if id.is_empty() {
            return Err(Error::InvalidInput("Crate ID is required".to_string()));
        }
        let crates = self.document(Endpoint::Crates, language).await?;
        crates
            .catalog
            .items()
            .find_map(|item| match item {
                Item::Crate(c) if c.id == id => Some(c.clone()),
                _ => None,
            })
            .ok_or_else(|| Error::CrateNotFound(id.to_string()))
    }

    pub async fn crate_contents(&self, id: &str, language: Language) -> Result<CrateContents> {
        let krate = self.crate_by_id(id, language).await?;
        let contents = Contents::placeholder();
        let key_required = key_required(&krate.name);

        let key_info = if key_required {
            match self.document(Endpoint::Keys, language).await {
                Ok(keys) => find_key(&keys.catalog, &krate.id),
                Err(e) => {
                    debug!(crate_id = %krate.id, error = %e, "Continuing without key info");
                    None
                }
            }
        } else {
            None
        };

        Ok(CrateContents {
            rarity_distribution: contents.rarity_distribution(),
            contents,
            special_items: Vec::new(),
            key_required,
            key_info,
            krate,
        })
    }

    pub async fn collection_contents(&self, id: &str, language: Language) -> Result<CollectionContents> {
        let id = id.trim();
        if id.is_empty() {
            return Err(Error::InvalidInput("Collection ID is required".to_string()));
        }
        let collections = self.document(Endpoint::Collections, language).await?;
        let collection = collections
            .catalog
            .items()
            .find_map(|item| match item {
                Item::Collection(c) if c.id == id => Some(c.clone()),
                _ => None,
            })
            .ok_or_else(|| Error::CollectionNotFound(id.to_string()))?;

        let contents = Contents::placeholder();
        Ok(CollectionContents {
            collection,
            rarity_distribution: contents.rarity_distribution(),
            contents,
            special_items: Vec::new(),
            drop_source: COLLECTION_DROP_SOURCE.to_string(),
        })
    }
}
