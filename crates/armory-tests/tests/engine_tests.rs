//! Catalog service tests over in-memory infrastructure.
//!
//! Run with: `cargo test -p armory-tests --test engine_tests`

use armory_core::item::{Item, ItemKind};
use armory_core::rarity::RarityDistribution;
use armory_core::{Document, Endpoint, Error, Language};
use armory_engine::details::Relationship;
use armory_engine::{AdvancedCriteria, ItemFilter, ItemScope, PageRequest, SearchField, SkinField};
use armory_tests::{CatalogFixture, ItemFixture, SkinFixture, StaticSource, TestContext};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_cache_hit_then_expiry() {
    let ctx = TestContext::new();

    let first = ctx.service.document(Endpoint::Skins, Language::En).await.unwrap();
    ctx.clock.advance(Duration::from_secs(120));
    let second = ctx.service.document(Endpoint::Skins, Language::En).await.unwrap();
    assert_eq!(ctx.source.calls(Endpoint::Skins, Language::En), 1);
    assert_eq!(
        serde_json::to_vec(&first.data).unwrap(),
        serde_json::to_vec(&second.data).unwrap()
    );

    ctx.clock.advance(Duration::from_secs(181));
    ctx.service.document(Endpoint::Skins, Language::En).await.unwrap();
    assert_eq!(ctx.source.calls(Endpoint::Skins, Language::En), 2);
    assert_eq!(ctx.service.cache_stats().await.size, 1);
}

#[tokio::test]
async fn test_languages_are_cached_separately() {
    let ctx = TestContext::new();

    ctx.service.document(Endpoint::Stickers, Language::En).await.unwrap();
    ctx.service.document(Endpoint::Stickers, Language::PtBr).await.unwrap();

    let stats = ctx.service.cache_stats().await;
    assert_eq!(stats.keys, vec!["STICKERS_en".to_string(), "STICKERS_pt-BR".to_string()]);
    assert!(stats.hashes.iter().all(|h| h.len() == 11 && h.ends_with("...")));
}

#[tokio::test]
async fn test_untouched_cache_is_valid() {
    let ctx = TestContext::new();
    for endpoint in [Endpoint::All, Endpoint::Skins, Endpoint::Crates] {
        ctx.service.document(endpoint, Language::En).await.unwrap();
    }

    let report = ctx.service.validate_cache().await;
    assert!(report.valid);
    assert!(report.invalid_entries.is_empty());
}

#[tokio::test]
async fn test_failed_refetch_has_no_stale_fallback() {
    let ctx = TestContext::new();
    ctx.service.document(Endpoint::Crates, Language::En).await.unwrap();

    ctx.source.fail(Endpoint::Crates);
    ctx.clock.advance(Duration::from_secs(301));
    let err = ctx.service.document(Endpoint::Crates, Language::En).await.unwrap_err();
    assert!(err.is_upstream());

    ctx.source.recover(Endpoint::Crates);
    assert!(ctx.service.document(Endpoint::Crates, Language::En).await.is_ok());
}

#[tokio::test]
async fn test_concurrent_misses_share_one_fetch() {
    let ctx = TestContext::new();
    let service = Arc::new(ctx.service.clone());

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.document(Endpoint::All, Language::En).await })
        })
        .collect();
    for task in tasks {
        assert!(task.await.unwrap().is_ok());
    }

    assert_eq!(ctx.source.calls(Endpoint::All, Language::En), 1);
}

#[test]
fn test_rarity_distribution_example() {
    let doc = Document::ingest(
        Endpoint::Skins,
        json!([
            SkinFixture::new("a", "A", "AK-47", "Consumer Grade"),
            SkinFixture::new("b", "B", "AK-47", "Classified"),
            SkinFixture::new("c", "C", "AK-47", "Covert"),
        ]),
    )
    .unwrap();

    let distribution = RarityDistribution::tally(doc.catalog.items());
    assert_eq!(
        distribution,
        RarityDistribution {
            common: 1,
            ancient: 1,
            contraband: 1,
            ..Default::default()
        }
    );
}

#[test]
fn test_skin_rule_wins_over_graffiti() {
    let mut record = SkinFixture::new("x", "Skin with crates", "AK-47", "Covert");
    record["crates"] = json!([{ "id": "crate-1", "name": "Case" }]);
    let all = json!({ "x": record, "g": ItemFixture::graffiti("g", "Graffiti") });

    let doc = Document::ingest(Endpoint::All, all).unwrap();
    assert_eq!(doc.catalog.get("x").map(Item::kind), Some(ItemKind::Skin));
    assert_eq!(doc.catalog.get("g").map(Item::kind), Some(ItemKind::Graffiti));
}

#[tokio::test]
async fn test_comprehensive_exact_match_ranks_first() {
    let mut ak = SkinFixture::new("a", "AK", "Knife", "Covert");
    ak["description"] = Value::Null;
    let mut redline = SkinFixture::new("b", "AK Redline", "Knife", "Covert");
    redline["description"] = Value::Null;
    let source = StaticSource::new().with_document(Endpoint::All, json!({ "b": redline, "a": ak }));
    let ctx = TestContext::with_source(source);

    let results = ctx
        .service
        .comprehensive_search(Some("ak"), &[SearchField::Name], Language::En, 100)
        .await
        .unwrap();

    let ranked: Vec<(&str, u32)> = results
        .results
        .iter()
        .map(|r| (r.scored.item.name(), r.scored.match_score))
        .collect();
    assert_eq!(ranked, vec![("AK", 175), ("AK Redline", 125)]);
    assert_eq!(results.search_stats.items_with_matches, 2);
    assert_eq!(results.search_stats.match_percentage, 100.0);
}

#[tokio::test]
async fn test_second_page_of_25_skins() {
    let source = StaticSource::new().with_document(Endpoint::Skins, Value::Array(SkinFixture::numbered(25)));
    let ctx = TestContext::with_source(source);

    let page = ctx
        .service
        .skins_paginated(Language::En, PageRequest::new(2, 10).unwrap())
        .await
        .unwrap();

    let ids: Vec<&str> = page.data.iter().map(Item::id).collect();
    let expected: Vec<String> = (10..20).map(|i| format!("skin-{}", i)).collect();
    assert_eq!(ids, expected.iter().map(String::as_str).collect::<Vec<_>>());
    assert!(page.pagination.has_next);
    assert!(page.pagination.has_previous);
    assert_eq!(page.pagination.total_pages, 3);
}

#[tokio::test]
async fn test_advanced_search_is_conjunctive() {
    let ctx = TestContext::new();
    let criteria = AdvancedCriteria {
        stattrak: Some(true),
        weapon: Some("AK".to_string()),
        ..Default::default()
    };

    let (_, results) = ctx.service.advanced_search(criteria, Language::En, 50).await.unwrap();
    let ids: Vec<&str> = results.iter().map(|s| s.id.as_str()).collect();
    // Vulcan is an AK without StatTrak, Asiimov has StatTrak on an AWP.
    assert_eq!(ids, vec!["skin-redline"]);
}

#[tokio::test]
async fn test_inverted_price_range_rejected_before_fetch() {
    let ctx = TestContext::new();

    let err = ItemFilter::price(Some(10.0), Some(-5.0)).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    let filter = ItemFilter::tournament(Some("Katowice")).unwrap();
    let err = ctx
        .service
        .search_items(&filter, ItemScope::Skins, Language::En, 50)
        .await
        .unwrap_err();
    assert!(err.is_invalid_input());

    assert_eq!(ctx.source.total_calls(), 0);
}

#[tokio::test]
async fn test_item_searches() {
    let ctx = TestContext::new();

    // Covert and Contraband share the top price tier.
    let top_tier = ItemFilter::price(Some(20.0), Some(30.0)).unwrap();
    let results = ctx.service.search_items(&top_tier, ItemScope::Skins, Language::En, 50).await.unwrap();
    let ids: Vec<&str> = results.iter().map(Item::id).collect();
    assert_eq!(ids, vec!["skin-vulcan", "skin-howl", "skin-asiimov"]);

    let year = ItemFilter::year(Some(2019)).unwrap();
    let results = ctx.service.search_items(&year, ItemScope::All, Language::En, 50).await.unwrap();
    let kinds: Vec<ItemKind> = results.iter().map(Item::kind).collect();
    assert_eq!(kinds, vec![ItemKind::Sticker, ItemKind::Highlight]);

    let team = ItemFilter::team(Some("terror")).unwrap();
    let results = ctx.service.search_items(&team, ItemScope::Agents, Language::En, 50).await.unwrap();
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn test_search_skins_by_collection_and_limit() {
    let ctx = TestContext::new();

    let results = ctx
        .service
        .search_skins(SkinField::Collection, Some("phoenix"), Language::En, 1)
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "skin-redline");
}

#[tokio::test]
async fn test_skin_details_end_to_end() {
    let ctx = TestContext::new();

    let details = ctx.service.skin_details("skin-redline", Language::En).await.unwrap();

    assert_eq!(details.collection_details[0].collection.id, "collection-set-phoenix");
    assert_eq!(details.crate_details[0].krate.id, "crate-4001");
    assert_eq!(
        details.crate_details[0].key_info.as_ref().map(|k| k.id.as_str()),
        Some("key-phoenix")
    );
    assert!(!details.market_info.trade_up_contract);
    assert_eq!(details.market_info.market_hash_name, "AK-47 | Redline");

    let first = &details.related_items[0];
    assert_eq!(first.id, "skin-vulcan");
    assert_eq!(first.relationship, Relationship::SameCollection);
}

#[tokio::test]
async fn test_gift_package_needs_no_key() {
    let ctx = TestContext::new();

    let contents = ctx.service.crate_contents("crate-gift", Language::En).await.unwrap();
    assert!(!contents.key_required);
    assert!(contents.key_info.is_none());
    assert_eq!(ctx.source.calls(Endpoint::Keys, Language::En), 0);
}

#[tokio::test]
async fn test_global_search_buckets() {
    let ctx = TestContext::new();
    let kinds = armory_engine::ranking::parse_global_kinds(Some("skins,graffiti,bogus"));
    assert_eq!(kinds, vec![ItemKind::Skin, ItemKind::Graffiti]);

    let results = ctx.service.global_search(Some("ak-47"), &kinds, Language::En, 100).await.unwrap();
    assert_eq!(results.get(ItemKind::Skin).map(<[Item]>::len), Some(2));
    assert_eq!(results.get(ItemKind::Graffiti).map(<[Item]>::len), Some(1));
    assert_eq!(results.total(), 3);
}
