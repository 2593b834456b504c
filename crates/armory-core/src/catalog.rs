//! Upstream endpoints, languages and ingested catalog documents.

use crate::classify::classify;
use crate::item::{Item, ItemKind};
use crate::{Error, Result};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

macro_rules! define_languages {
    ($($variant:ident => $code:expr),+ $(,)?) => {
        /// A catalog language supported upstream.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Language {
            $($variant),+
        }

        impl Language {
            /// Every supported language, in upstream order.
            pub const ALL: &'static [Language] = &[$(Language::$variant),+];

            /// The language code used in upstream paths and cache keys.
            pub fn code(&self) -> &'static str {
                match self {
                    $(Language::$variant => $code),+
                }
            }
        }

        impl FromStr for Language {
            type Err = Error;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s {
                    $($code => Ok(Language::$variant),)+
                    other => Err(Error::UnsupportedLanguage(other.to_string())),
                }
            }
        }
    };
}

define_languages! {
    Bg => "bg",
    Cs => "cs",
    Da => "da",
    De => "de",
    El => "el",
    En => "en",
    EsEs => "es-ES",
    EsMx => "es-MX",
    Fi => "fi",
    Fr => "fr",
    Hu => "hu",
    It => "it",
    Ja => "ja",
    Ko => "ko",
    Nl => "nl",
    No => "no",
    Pl => "pl",
    PtBr => "pt-BR",
    PtPt => "pt-PT",
    Ro => "ro",
    Ru => "ru",
    Sv => "sv",
    Th => "th",
    Tr => "tr",
    Uk => "uk",
    ZhCn => "zh-CN",
    ZhTw => "zh-TW",
    Vi => "vi",
}

impl Default for Language {
    fn default() -> Self {
        Language::En
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

macro_rules! define_endpoints {
    ($($variant:ident => ($key:expr, $stem:expr, $kind:expr)),+ $(,)?) => {
        /// A logical upstream collection.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Endpoint {
            $($variant),+
        }

        impl Endpoint {
            pub const ALL: &'static [Endpoint] = &[$(Endpoint::$variant),+];

            /// Identifier used as the cache key prefix.
            pub fn key_name(&self) -> &'static str {
                match self {
                    $(Endpoint::$variant => $key),+
                }
            }

            /// File stem of the upstream document.
            pub fn stem(&self) -> &'static str {
                match self {
                    $(Endpoint::$variant => $stem),+
                }
            }

            /// Kind every record of this endpoint decodes as. `None` means the
            /// records are heterogeneous and go through [`classify`].
            pub fn kind(&self) -> Option<ItemKind> {
                match self {
                    $(Endpoint::$variant => $kind),+
                }
            }
        }

        impl FromStr for Endpoint {
            type Err = Error;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s {
                    $($key | $stem => Ok(Endpoint::$variant),)+
                    other => Err(Error::UnknownEndpoint(other.to_string())),
                }
            }
        }
    };
}

define_endpoints! {
    All => ("ALL", "all", None),
    Skins => ("SKINS", "skins", Some(ItemKind::Skin)),
    SkinsNotGrouped => ("SKINS_NOT_GROUPED", "skins_not_grouped", Some(ItemKind::SkinNotGrouped)),
    Stickers => ("STICKERS", "stickers", Some(ItemKind::Sticker)),
    Keychains => ("KEYCHAINS", "keychains", Some(ItemKind::Keychain)),
    Collections => ("COLLECTIONS", "collections", Some(ItemKind::Collection)),
    Crates => ("CRATES", "crates", Some(ItemKind::Crate)),
    Keys => ("KEYS", "keys", Some(ItemKind::Key)),
    Collectibles => ("COLLECTIBLES", "collectibles", Some(ItemKind::Collectible)),
    Agents => ("AGENTS", "agents", Some(ItemKind::Agent)),
    Patches => ("PATCHES", "patches", Some(ItemKind::Patch)),
    Graffiti => ("GRAFFITI", "graffiti", Some(ItemKind::Graffiti)),
    MusicKits => ("MUSIC_KITS", "music_kits", Some(ItemKind::MusicKit)),
    BaseWeapons => ("BASE_WEAPONS", "base_weapons", Some(ItemKind::BaseWeapon)),
    Highlights => ("HIGHLIGHTS", "highlights", Some(ItemKind::Highlight)),
}

impl Endpoint {
    /// Relative upstream path, e.g. `skins.json`.
    pub fn path(&self) -> String {
        format!("{}.json", self.stem())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key_name())
    }
}

/// A classified record together with the key it was stored under upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub key: String,
    pub item: Item,
}

/// The typed view of a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    /// Records that classified (or decoded) successfully, in document order.
    pub entries: Vec<Entry>,
    /// Number of records in the document, including unknown ones.
    pub total_entries: usize,
}

impl Catalog {
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.entries.iter().map(|e| &e.item)
    }

    pub fn of_kind(&self, kind: ItemKind) -> impl Iterator<Item = &Item> {
        self.items().filter(move |item| item.kind() == kind)
    }

    pub fn get(&self, key: &str) -> Option<&Item> {
        self.entries.iter().find(|e| e.key == key).map(|e| &e.item)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A fetched upstream document.
///
/// `data` is exactly what upstream returned and is what gets fingerprinted and
/// served to pass-through callers. `catalog` is derived once at ingestion.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub data: Value,
    pub catalog: Catalog,
}

impl Document {
    /// Classify every record of a raw upstream document.
    ///
    /// Objects are keyed by their map keys; arrays by each record's `id`, or
    /// its position when it has none. Any other shape is rejected.
    pub fn ingest(endpoint: Endpoint, data: Value) -> Result<Self> {
        let records: Vec<(String, &Value)> = match &data {
            Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
            Value::Array(list) => list
                .iter()
                .enumerate()
                .map(|(idx, v)| {
                    let key = v
                        .get("id")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| idx.to_string());
                    (key, v)
                })
                .collect(),
            other => {
                return Err(Error::MalformedDocument(format!(
                    "{} document is a {}, expected an object or array",
                    endpoint,
                    value_type(other)
                )));
            }
        };

        let total_entries = records.len();
        let entries = records
            .into_iter()
            .filter_map(|(key, value)| {
                let kind = endpoint.kind().or_else(|| classify(value))?;
                let mut item = Item::decode(kind, value).ok()?;
                item.set_id_if_empty(&key);
                Some(Entry { key, item })
            })
            .collect();

        Ok(Self {
            data,
            catalog: Catalog {
                entries,
                total_entries,
            },
        })
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.data.serialize(serializer)
    }
}

fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::ALL.len(), 28);
        assert_eq!(Language::default(), Language::En);
        assert_eq!("pt-BR".parse::<Language>().unwrap(), Language::PtBr);
        assert_eq!(Language::ZhTw.to_string(), "zh-TW");
        assert!(matches!(
            "xx".parse::<Language>(),
            Err(Error::UnsupportedLanguage(code)) if code == "xx"
        ));
    }

    #[test]
    fn test_endpoint_names() {
        assert_eq!(Endpoint::ALL.len(), 15);
        assert_eq!(Endpoint::MusicKits.path(), "music_kits.json");
        assert_eq!(Endpoint::SkinsNotGrouped.key_name(), "SKINS_NOT_GROUPED");
        assert_eq!("skins".parse::<Endpoint>().unwrap(), Endpoint::Skins);
        assert_eq!("BASE_WEAPONS".parse::<Endpoint>().unwrap(), Endpoint::BaseWeapons);
        assert!("weapons".parse::<Endpoint>().is_err());
    }

    #[test]
    fn test_ingest_object_classifies_and_keeps_unknowns_out() {
        let data = json!({
            "skin-1": {
                "name": "AK-47 | Redline",
                "weapon": { "id": "weapon_ak47", "name": "AK-47" },
                "category": { "id": "csgo_inventory_weapon_category_rifles", "name": "Rifles" },
                "pattern": { "id": "redline", "name": "Redline" },
                "rarity": { "id": "rarity_legendary_weapon", "name": "Classified" }
            },
            "mystery": { "name": "Nothing in particular" }
        });

        let doc = Document::ingest(Endpoint::All, data.clone()).unwrap();
        assert_eq!(doc.catalog.total_entries, 2);
        assert_eq!(doc.catalog.len(), 1);
        let skin = doc.catalog.get("skin-1").unwrap();
        assert_eq!(skin.kind(), ItemKind::Skin);
        assert_eq!(skin.id(), "skin-1");
        assert_eq!(serde_json::to_value(&doc).unwrap(), data);
    }

    #[test]
    fn test_ingest_array_decodes_as_endpoint_kind() {
        let data = json!([
            { "id": "sticker-1", "name": "Sticker | Crown (Foil)", "type": null },
            { "name": "Sticker | Howl" }
        ]);

        let doc = Document::ingest(Endpoint::Stickers, data).unwrap();
        assert_eq!(doc.catalog.len(), 2);
        assert_eq!(doc.catalog.entries[0].key, "sticker-1");
        assert_eq!(doc.catalog.entries[1].key, "1");
        assert_eq!(doc.catalog.entries[1].item.id(), "1");
        assert!(doc.catalog.items().all(|i| i.kind() == ItemKind::Sticker));
    }

    #[test]
    fn test_ingest_rejects_scalars() {
        let err = Document::ingest(Endpoint::Skins, json!("oops")).unwrap_err();
        assert!(matches!(err, Error::MalformedDocument(_)));
    }
}
