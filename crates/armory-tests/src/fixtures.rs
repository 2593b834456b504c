//! Test fixtures for creating sample catalog documents.

use crate::sources::StaticSource;
use armory_core::Endpoint;
use serde_json::{Map, Value, json};

/// Factory for upstream-shaped skin records.
pub struct SkinFixture;

impl SkinFixture {
    /// A skin with a weapon, a rarity and no collections or crates.
    pub fn new(id: &str, name: &str, weapon: &str, rarity: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "description": format!("{} finish", name),
            "weapon": { "id": slug(weapon), "weapon_id": 7, "name": weapon },
            "category": { "id": "sfui_invpanel_filter_rifle", "name": "Rifles" },
            "pattern": { "id": format!("{}-pattern", id), "name": "Plain" },
            "min_float": 0.0,
            "max_float": 1.0,
            "rarity": { "id": slug(rarity), "name": rarity, "color": "#eb4b4b" },
            "stattrak": false,
            "souvenir": false,
            "paint_index": "1",
            "wears": [{ "id": "SFUI_InvTooltip_Wear_Amount_0", "name": "Factory New" }],
            "collections": [],
            "crates": [],
            "team": { "id": "both", "name": "Both Teams" },
            "legacy_model": false,
            "image": format!("https://img.example/{}.png", id)
        })
    }

    pub fn stattrak(mut skin: Value) -> Value {
        skin["stattrak"] = json!(true);
        skin
    }

    pub fn in_collection(mut skin: Value, id: &str, name: &str) -> Value {
        skin["collections"] = json!([{ "id": id, "name": name, "image": null }]);
        skin
    }

    pub fn in_crate(mut skin: Value, id: &str, name: &str) -> Value {
        skin["crates"] = json!([{ "id": id, "name": name, "image": null }]);
        skin
    }

    /// `count` skins named `Skin 0`, `Skin 1`, ...
    pub fn numbered(count: usize) -> Vec<Value> {
        (0..count)
            .map(|i| Self::new(&format!("skin-{}", i), &format!("Skin {}", i), "P250", "Mil-Spec Grade"))
            .collect()
    }
}

fn slug(name: &str) -> String {
    name.to_lowercase().replace([' ', '|'], "_")
}

/// Factories for the other record kinds.
pub struct ItemFixture;

impl ItemFixture {
    pub fn sticker(id: &str, name: &str, event: &str, team: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "description": null,
            "rarity": { "id": "rarity_rare", "name": "High Grade" },
            "crates": [],
            "tournament_event": event,
            "tournament_team": team,
            "type": "Team",
            "market_hash_name": format!("Sticker | {}", name),
            "effect": null,
            "image": null
        })
    }

    pub fn agent(id: &str, name: &str, team: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "description": null,
            "rarity": { "id": "rarity_legendary", "name": "Superior" },
            "collections": [],
            "team": { "id": team.to_lowercase(), "name": team },
            "market_hash_name": name,
            "image": null
        })
    }

    pub fn highlight(id: &str, name: &str, event: &str, map: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "description": null,
            "tournament_event": event,
            "team0": "NAVI",
            "team1": "G2",
            "stage": "Final",
            "map": map,
            "market_hash_name": null,
            "image": null,
            "video": null
        })
    }

    pub fn graffiti(id: &str, name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "description": null,
            "rarity": { "id": "rarity_common", "name": "Base Grade" },
            "crates": [],
            "image": null
        })
    }

    pub fn crate_record(id: &str, name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "description": null,
            "type": "Case",
            "first_sale_date": "2014/07/01",
            "market_hash_name": name,
            "rental": false,
            "image": null
        })
    }

    pub fn collection_record(id: &str, name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "crates": [],
            "rental": false,
            "image": null
        })
    }

    pub fn key(id: &str, name: &str, crate_id: &str, crate_name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "description": null,
            "crates": [{ "id": crate_id, "name": crate_name, "image": null }],
            "market_hash_name": name,
            "image": null
        })
    }
}

/// A small but complete catalog.
pub struct CatalogFixture;

impl CatalogFixture {
    pub fn skins() -> Vec<Value> {
        vec![
            SkinFixture::in_crate(
                SkinFixture::in_collection(
                    SkinFixture::stattrak(SkinFixture::new(
                        "skin-redline",
                        "AK-47 | Redline",
                        "AK-47",
                        "Classified",
                    )),
                    "collection-set-phoenix",
                    "The Phoenix Collection",
                ),
                "crate-4001",
                "Operation Phoenix Weapon Case",
            ),
            SkinFixture::in_collection(
                SkinFixture::new("skin-vulcan", "AK-47 | Vulcan", "AK-47", "Covert"),
                "collection-set-phoenix",
                "The Phoenix Collection",
            ),
            SkinFixture::new("skin-howl", "M4A4 | Howl", "M4A4", "Contraband"),
            SkinFixture::stattrak(SkinFixture::new("skin-asiimov", "AWP | Asiimov", "AWP", "Covert")),
            SkinFixture::new("skin-sand", "P250 | Sand Dune", "P250", "Consumer Grade"),
        ]
    }

    pub fn stickers() -> Vec<Value> {
        vec![
            ItemFixture::sticker("sticker-navi-2019", "Natus Vincere | Katowice 2019", "2019 IEM Katowice", "Natus Vincere"),
            ItemFixture::sticker("sticker-g2-2021", "G2 Esports | Stockholm 2021", "2021 PGL Stockholm", "G2 Esports"),
        ]
    }

    /// The heterogeneous "all items" document, keyed by id.
    pub fn all_items() -> Value {
        let mut all = Map::new();
        let records = Self::skins()
            .into_iter()
            .chain(Self::stickers())
            .chain([
                ItemFixture::agent("agent-1", "Sir Bloody Darryl", "Terrorist"),
                ItemFixture::highlight("highlight-1", "s1mple ace", "2019 StarLadder Berlin", "de_dust2"),
                ItemFixture::graffiti("graffiti-1", "Sealed Graffiti | Recoil AK-47"),
            ]);
        for record in records {
            let key = record["id"].as_str().unwrap_or_default().to_string();
            all.insert(key, record);
        }
        Value::Object(all)
    }

    pub fn crates() -> Value {
        json!([
            ItemFixture::crate_record("crate-4001", "Operation Phoenix Weapon Case"),
            ItemFixture::crate_record("crate-gift", "Holiday Gift Package"),
        ])
    }

    pub fn collections() -> Value {
        json!([ItemFixture::collection_record("collection-set-phoenix", "The Phoenix Collection")])
    }

    pub fn keys() -> Value {
        json!([ItemFixture::key(
            "key-phoenix",
            "Operation Phoenix Case Key",
            "crate-4001",
            "Operation Phoenix Weapon Case",
        )])
    }

    /// A source serving every fixture document.
    pub fn source() -> StaticSource {
        StaticSource::new()
            .with_document(Endpoint::All, Self::all_items())
            .with_document(Endpoint::Skins, Value::Array(Self::skins()))
            .with_document(Endpoint::Stickers, Value::Array(Self::stickers()))
            .with_document(Endpoint::Crates, Self::crates())
            .with_document(Endpoint::Collections, Self::collections())
            .with_document(Endpoint::Keys, Self::keys())
    }
}
