//! Hits the real metadata services. Run with `cargo test -- --ignored`.

use quran_core::api::QuranApi;
use quran_core::catalog::{Catalog, CatalogOrigin};
use quran_core::config::ApiConfig;
use quran_core::player::AyahSource;

#[tokio::test]
#[ignore = "needs network access"]
async fn live_catalog_and_ayahs() {
    let config = ApiConfig::default();
    let api = QuranApi::new(&config, "quran-live-test").expect("client should initialize");

    let editions = api.fetch_editions().await;
    println!("editions: {}", editions.len());
    assert!(editions.iter().any(|e| e.identifier == config.default_edition));

    let catalog = Catalog::load(
        &api.chapter_sources(&config.default_edition),
        &config.ayahs,
        &config.default_edition,
    )
    .await;
    println!("catalog origin: {:?}", catalog.origin());
    assert_ne!(catalog.origin(), &CatalogOrigin::Builtin);
    assert_eq!(catalog.len(), 114);

    let ayahs = api
        .fetch_ayahs(112, &config.default_edition)
        .await
        .expect("chapter 112 should load");
    assert_eq!(ayahs.len(), 4);
    assert!(ayahs.iter().all(|a| a.audio_url.is_some()));
}
