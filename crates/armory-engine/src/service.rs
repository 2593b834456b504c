//! The catalog service: cached documents in, derived views out.

use crate::pagination::{PageRequest, Paginated, paginate};
use crate::ranking::{ComprehensiveResults, GlobalResults, SearchField, comprehensive_search, global_search};
use crate::search::{self, AdvancedCriteria, ItemFilter, ItemScope, SkinField, require_query};
use armory_cache::{CacheStats, CatalogCache, EntrySnapshot, IntegrityReport};
use armory_core::item::{Item, ItemKind, Skin};
use armory_core::{Document, Endpoint, Language, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Search and derivation over a [`CatalogCache`].
///
/// Every operation validates its input before touching the cache.
#[derive(Clone)]
pub struct CatalogService {
    cache: CatalogCache,
}

impl CatalogService {
    pub fn new(cache: CatalogCache) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &CatalogCache {
        &self.cache
    }

    /// The cached document for an endpoint.
    pub async fn document(&self, endpoint: Endpoint, language: Language) -> Result<Arc<Document>> {
        debug!(endpoint = %endpoint, language = %language, "Loading document");
        self.cache.fetch(endpoint, language).await
    }

    /// One page of the skins list.
    pub async fn skins_paginated(&self, language: Language, page: PageRequest) -> Result<Paginated<Item>> {
        let skins = self.document(Endpoint::Skins, language).await?;
        let items: Vec<Item> = skins.catalog.of_kind(ItemKind::Skin).cloned().collect();
        Ok(paginate(&items, page))
    }

    /// Skins whose `field` contains `query`.
    pub async fn search_skins(
        &self,
        field: SkinField,
        query: Option<&str>,
        language: Language,
        limit: usize,
    ) -> Result<Vec<Skin>> {
        let query = require_query(query, search_subject(field))?;
        let all = self.document(Endpoint::All, language).await?;
        let results: Vec<Skin> = search::search_skins(&all.catalog, field, &query, limit)
            .into_iter()
            .cloned()
            .collect();
        info!(field = %field, query = %query, results = results.len(), "Skin search");
        Ok(results)
    }

    /// Conjunctive skin search. Returns the normalized criteria with the hits.
    pub async fn advanced_search(
        &self,
        criteria: AdvancedCriteria,
        language: Language,
        limit: usize,
    ) -> Result<(AdvancedCriteria, Vec<Skin>)> {
        let criteria = criteria.normalized()?;
        let all = self.document(Endpoint::All, language).await?;
        let results: Vec<Skin> = search::advanced_search(&all.catalog, &criteria, limit)
            .into_iter()
            .cloned()
            .collect();
        info!(results = results.len(), "Advanced skin search");
        Ok((criteria, results))
    }

    /// Items in `scope` passing `filter`.
    pub async fn search_items(
        &self,
        filter: &ItemFilter,
        scope: ItemScope,
        language: Language,
        limit: usize,
    ) -> Result<Vec<Item>> {
        filter.check_scope(scope)?;
        let all = self.document(Endpoint::All, language).await?;
        let results: Vec<Item> = search::search_items(&all.catalog, filter, scope, limit)
            .into_iter()
            .cloned()
            .collect();
        info!(filter = ?filter, scope = %scope, results = results.len(), "Item search");
        Ok(results)
    }

    pub async fn global_search(
        &self,
        query: Option<&str>,
        kinds: &[ItemKind],
        language: Language,
        limit: usize,
    ) -> Result<GlobalResults> {
        let query = require_query(query, "Search query")?;
        let all = self.document(Endpoint::All, language).await?;
        let results = global_search(&all.catalog, &query, kinds, limit);
        info!(query = %query, results = results.total(), "Global search");
        Ok(results)
    }

    pub async fn comprehensive_search(
        &self,
        query: Option<&str>,
        fields: &[SearchField],
        language: Language,
        limit: usize,
    ) -> Result<ComprehensiveResults> {
        let query = require_query(query, "Search query")?;
        let all = self.document(Endpoint::All, language).await?;
        let results = comprehensive_search(&all.catalog, &query, language, fields, limit);
        info!(
            query = %query,
            matches = results.search_stats.items_with_matches,
            returned = results.total,
            "Comprehensive search"
        );
        Ok(results)
    }

    pub fn supported_languages(&self) -> &'static [Language] {
        Language::ALL
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    pub async fn cache_entry(&self, key: &str) -> Result<EntrySnapshot> {
        self.cache.get_entry(key).await
    }

    pub async fn validate_cache(&self) -> IntegrityReport {
        let report = self.cache.integrity_check().await;
        if !report.valid {
            warn!(invalid = ?report.invalid_entries, "Cache integrity check failed");
        }
        report
    }

    pub async fn clear_cache(&self) {
        self.cache.invalidate_all().await;
        info!("Cache cleared");
    }
}

fn search_subject(field: SkinField) -> &'static str {
    match field {
        SkinField::Name => "Search query",
        SkinField::Weapon => "Weapon name",
        SkinField::Rarity => "Rarity name",
        SkinField::Collection => "Collection name",
        SkinField::Crate => "Crate name",
        SkinField::Wear => "Wear name",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use armory_cache::CacheConfig;
    use armory_core::Error;
    use armory_core::ports::CatalogSource;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeSource {
        calls: AtomicUsize,
        fail_all: bool,
    }

    fn skin(id: &str, name: &str, weapon: &str, rarity: &str, crate_name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "weapon": { "id": weapon.to_lowercase(), "name": weapon },
            "category": { "id": "rifles", "name": "Rifles" },
            "pattern": { "id": "p", "name": "Plain" },
            "rarity": { "id": rarity.to_lowercase(), "name": rarity },
            "stattrak": true,
            "souvenir": false,
            "collections": [],
            "crates": [{ "id": "crate-1", "name": crate_name }]
        })
    }

    fn skins() -> Vec<Value> {
        vec![
            skin("skin-1", "AK-47 | Redline", "AK-47", "Classified", "Chroma Case"),
            skin("skin-2", "AK-47 | Vulcan", "AK-47", "Covert", "Chroma Case"),
            skin("skin-3", "M4A4 | Howl", "M4A4", "Contraband", "Chroma Case"),
        ]
    }

    #[async_trait]
    impl CatalogSource for FakeSource {
        async fn fetch(&self, endpoint: Endpoint, _language: Language) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_all && endpoint == Endpoint::All {
                return Err(Error::UpstreamFetchFailed {
                    url: "all.json".to_string(),
                    reason: "HTTP 500".to_string(),
                });
            }
            Ok(match endpoint {
                Endpoint::All => Value::Object(
                    skins()
                        .into_iter()
                        .map(|s| (s["id"].as_str().unwrap_or_default().to_string(), s))
                        .collect(),
                ),
                Endpoint::Skins => Value::Array(skins()),
                Endpoint::Crates => json!([{ "id": "crate-1", "name": "Chroma Case" }]),
                Endpoint::Collections => json!([{ "id": "col-1", "name": "The Chroma Collection" }]),
                Endpoint::Keys => json!([{
                    "id": "key-1",
                    "name": "Chroma Case Key",
                    "crates": [{ "id": "crate-1", "name": "Chroma Case" }]
                }]),
                _ => json!([]),
            })
        }
    }

    fn service_with(source: Arc<FakeSource>) -> CatalogService {
        CatalogService::new(CatalogCache::new(source, CacheConfig::default()))
    }

    #[tokio::test]
    async fn test_invalid_input_never_fetches() {
        let source = Arc::new(FakeSource::default());
        let service = service_with(source.clone());

        let err = service
            .search_skins(SkinField::Weapon, Some("  "), Language::En, 50)
            .await
            .unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.to_string().contains("Weapon name"));

        let filter = ItemFilter::team(Some("NaVi")).unwrap();
        assert!(service
            .search_items(&filter, ItemScope::Highlights, Language::En, 50)
            .await
            .is_err());
        assert!(service
            .advanced_search(AdvancedCriteria::default(), Language::En, 50)
            .await
            .is_err());

        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_search_skins_by_weapon() {
        let service = service_with(Arc::new(FakeSource::default()));
        let results = service
            .search_skins(SkinField::Weapon, Some("ak-47"), Language::En, 50)
            .await
            .unwrap();
        let ids: Vec<&str> = results.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["skin-1", "skin-2"]);
    }

    #[tokio::test]
    async fn test_skin_details_from_all_items() {
        let service = service_with(Arc::new(FakeSource::default()));
        let details = service.skin_details("skin-2", Language::En).await.unwrap();

        assert_eq!(details.skin.name, "AK-47 | Vulcan");
        assert_eq!(details.crate_details.len(), 1);
        assert!(details.crate_details[0].key_required);
        assert_eq!(
            details.crate_details[0].key_info.as_ref().map(|k| k.id.as_str()),
            Some("key-1")
        );
        // Every other skin shares the crate.
        assert_eq!(details.related_items.len(), 2);
        assert!(details.related_items.iter().all(|r| r.id != "skin-2"));
    }

    #[tokio::test]
    async fn test_skin_details_falls_back_to_skins_list() {
        let source = Arc::new(FakeSource {
            fail_all: true,
            ..Default::default()
        });
        let service = service_with(source);

        let details = service.skin_details("skin-3", Language::En).await.unwrap();
        assert_eq!(details.skin.name, "M4A4 | Howl");
        assert!(details.related_items.is_empty());
    }

    #[tokio::test]
    async fn test_skin_details_not_found() {
        let service = service_with(Arc::new(FakeSource::default()));
        let err = service.skin_details("skin-404", Language::En).await.unwrap_err();
        assert!(matches!(err, Error::SkinNotFound(ref id) if id == "skin-404"));
    }

    #[tokio::test]
    async fn test_crate_and_collection_contents() {
        let service = service_with(Arc::new(FakeSource::default()));

        let contents = service.crate_contents("crate-1", Language::En).await.unwrap();
        assert_eq!(contents.krate.name, "Chroma Case");
        assert!(contents.key_required);
        assert_eq!(contents.key_info.map(|k| k.name), Some("Chroma Case Key".to_string()));
        assert_eq!(contents.contents.items().count(), 0);

        let collection = service.collection_contents("col-1", Language::En).await.unwrap();
        assert_eq!(collection.drop_source, "Collection drop");

        assert!(matches!(
            service.crate_by_id("crate-9", Language::En).await,
            Err(Error::CrateNotFound(_))
        ));
        assert!(matches!(
            service.collection_contents("col-9", Language::En).await,
            Err(Error::CollectionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_skins_paginated_and_cache_reuse() {
        let source = Arc::new(FakeSource::default());
        let service = service_with(source.clone());

        let page = service
            .skins_paginated(Language::En, PageRequest::new(1, 2).unwrap())
            .await
            .unwrap();
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.pagination.total, 3);
        assert!(page.pagination.has_next);

        service
            .skins_paginated(Language::En, PageRequest::new(2, 2).unwrap())
            .await
            .unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        service.clear_cache().await;
        assert_eq!(service.cache_stats().await.size, 0);
    }
}
