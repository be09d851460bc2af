//! Catalog demo - loads the mock catalog (and optionally the remote sale
//! API), runs a few filters through the coordinator, and exercises the
//! persisted favorites store.

use anyhow::Result;
use nestview::catalog::filter::parse_bound;
use nestview::catalog::ListingKind;
use nestview::{
    CatalogState, FavoritesStore, FileStore, ListingSource, MockCatalog, SaleApi, ViewCoordinator,
    ViewMode,
};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env();
    info!("configuration loaded");

    let mut coordinator = ViewCoordinator::new();

    // Step 1: load the catalog, preferring the remote API when configured.
    info!("Step 1/3: loading catalog...");
    let stats = match &config.sale_api_url {
        Some(url) => {
            let api = SaleApi::new(url.clone())?;
            let stats = coordinator.load(&api).await;
            if coordinator.state() == CatalogState::Failed {
                warn!("{} unavailable, falling back to mock catalog", api.source_name());
                coordinator.load(&MockCatalog::new()).await
            } else {
                stats
            }
        }
        None => coordinator.load(&MockCatalog::new()).await,
    };
    info!("✓ catalog loaded: {}", stats);

    // Step 2: run the session's filters.
    info!("Step 2/3: filtering...");
    let max_price = parse_bound("max price", &config.max_price_input, f64::MAX);
    coordinator.update_filter(|f| f.price_max = max_price);
    info!(
        "{} of {} listings under {}",
        coordinator.result_count(),
        coordinator.catalog_len(),
        max_price
    );

    coordinator.update_filter(|f| f.kinds = vec![ListingKind::Sale]);
    coordinator.set_view_mode(ViewMode::Grid);
    for property in coordinator.results() {
        println!(
            "{} - {} ({} {}) in {}",
            property.id, property.title, property.price, property.currency, property.location.city
        );
    }

    // Step 3: favorite the first match and persist it.
    info!("Step 3/3: favorites...");
    let mut favorites = FavoritesStore::load(FileStore::open(&config.store_path));
    if let Some(first) = coordinator.results().next().map(|p| p.id.clone()) {
        let now_favorite = favorites.toggle(&first);
        info!(
            "toggled {} (favorite: {}, total: {})",
            first,
            now_favorite,
            favorites.count()
        );
    }
    info!(
        "favorites view holds {} listings",
        coordinator.favorites_view(&favorites).len()
    );

    Ok(())
}

/// Configuration loaded from environment variables
#[derive(Debug, Clone)]
struct Config {
    /// Remote sale listings endpoint; mock-only when unset.
    sale_api_url: Option<String>,
    /// Durable client store location.
    store_path: PathBuf,
    /// Demo filter bound, deliberately taken as raw user input.
    max_price_input: String,
}

impl Config {
    fn from_env() -> Self {
        Config {
            sale_api_url: env::var("SALE_API_URL").ok(),
            store_path: env::var("NESTVIEW_STORE_PATH")
                .unwrap_or_else(|_| "nestview_store.json".to_string())
                .into(),
            max_price_input: env::var("MAX_PRICE").unwrap_or_else(|_| "500000".to_string()),
        }
    }
}
