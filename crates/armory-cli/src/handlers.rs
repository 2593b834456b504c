//! Command handlers.

use crate::config::ServerConfig;
use armory_api::{AppState, create_router};
use armory_cache::{CatalogCache, HttpCatalogSource};
use armory_core::Language;
use armory_engine::{CatalogService, SearchField};
use console::style;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

fn build_service(config: &ServerConfig) -> Result<CatalogService, Box<dyn std::error::Error>> {
    let source = HttpCatalogSource::new(config.upstream())?;
    let cache = CatalogCache::new(Arc::new(source), config.cache());
    Ok(CatalogService::new(cache))
}

/// Run the HTTP gateway until Ctrl+C.
pub async fn serve(config: ServerConfig, bind: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let bind = bind.unwrap_or_else(|| config.bind.clone());
    let service = build_service(&config)?;
    let app = create_router(Arc::new(AppState::new(service)));

    let listener = TcpListener::bind(&bind).await?;
    info!(
        addr = %listener.local_addr()?,
        upstream = %config.upstream_url,
        cache_ttl_secs = config.cache_ttl_secs,
        "Armory gateway listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down");
        })
        .await?;
    Ok(())
}

/// Run a comprehensive search and print the ranked results.
pub async fn search(
    config: &ServerConfig,
    query: &str,
    lang: &str,
    fields: Option<&str>,
    limit: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let language: Language = lang.parse()?;
    let fields = SearchField::parse_list(fields);
    let service = build_service(config)?;

    let results = service
        .comprehensive_search(Some(query), &fields, language, limit)
        .await?;

    if results.results.is_empty() {
        println!("{} No matches for \"{}\"", style("i").blue(), query);
        return Ok(());
    }

    for ranked in &results.results {
        let matched: Vec<&str> = ranked.scored.match_field.iter().map(SearchField::as_str).collect();
        println!(
            "{:>5}  {}  {}  {}",
            style(ranked.scored.match_score).cyan(),
            style(ranked.item_type).dim(),
            style(ranked.scored.item.name()).bold(),
            style(matched.join(",")).dim()
        );
    }
    println!(
        "\n{} {} of {} items matched ({}%)",
        style("✓").green(),
        results.search_stats.items_with_matches,
        results.search_stats.total_items_searched,
        results.search_stats.match_percentage
    );
    Ok(())
}

/// Print every supported language code.
pub fn languages() {
    for language in Language::ALL {
        let marker = if *language == Language::default() {
            style(" (default)").dim().to_string()
        } else {
            String::new()
        };
        println!("  {}{}", language.code(), marker);
    }
}

/// Show configuration.
pub fn show_config(config: &ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("Current configuration:");
    println!("  bind: {}", config.bind);
    println!("  upstream_url: {}", config.upstream_url);
    println!("  cache_ttl_secs: {}", config.cache_ttl_secs);
    println!("  timeout_secs: {}", config.timeout_secs);
    println!("  max_retries: {}", config.max_retries);
    println!("  log_format: {:?}", config.log_format);

    if let Ok(path) = ServerConfig::config_path() {
        println!("\nConfig file: {}", path.display());
    }

    Ok(())
}

/// Set configuration.
pub fn set_config(key: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = ServerConfig::config_path()?;
    let mut config = ServerConfig::read(&path)?;
    config.set(key, value)?;
    config.save(&path)?;

    println!("{} Set {} = {}", style("✓").green(), key, value);
    Ok(())
}
