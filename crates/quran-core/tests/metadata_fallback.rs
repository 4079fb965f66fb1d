mod common;

use std::time::Duration;

use common::{spawn_mock_api, RecordingSink};
use quran_core::api::QuranApi;
use quran_core::catalog::{Catalog, CatalogOrigin};
use quran_core::model::RevelationPlace;
use quran_core::player::{NowPlaying, Player};

#[tokio::test]
async fn catalog_falls_back_to_secondary_source() {
    let config = spawn_mock_api().await;
    let api = QuranApi::new(&config, "quran-test").expect("client");

    let catalog = Catalog::load(&api.chapter_sources("ar.alafasy"), &config.ayahs, "ar.alafasy").await;

    assert_eq!(catalog.origin(), &CatalogOrigin::Remote("alquran.cloud".to_string()));
    assert_eq!(catalog.len(), 2);
    let ikhlas = catalog.get(112).expect("chapter 112");
    assert_eq!(ikhlas.name, "Al-Ikhlaas");
    assert_eq!(ikhlas.revelation_place, RevelationPlace::Meccan);
}

#[tokio::test]
async fn unreachable_sources_give_builtin_table() {
    let mut config = spawn_mock_api().await;
    config.chapters_secondary = config.chapters_primary.clone();
    let api = QuranApi::new(&config, "quran-test").expect("client");

    let catalog = Catalog::load(&api.chapter_sources("ar.alafasy"), &config.ayahs, "ar.alafasy").await;

    assert_eq!(catalog.origin(), &CatalogOrigin::Builtin);
    assert_eq!(catalog.len(), 114);
}

#[tokio::test]
async fn edition_list_keeps_only_audio() {
    let config = spawn_mock_api().await;
    let api = QuranApi::new(&config, "quran-test").expect("client");

    let ids: Vec<String> = api
        .fetch_editions()
        .await
        .into_iter()
        .map(|e| e.identifier)
        .collect();
    assert_eq!(ids, vec!["ar.alafasy", "ar.husary"]);
}

#[tokio::test]
async fn missing_edition_list_falls_back_to_default() {
    let mut config = spawn_mock_api().await;
    config.editions = config.chapters_primary.clone();
    let api = QuranApi::new(&config, "quran-test").expect("client");

    let editions = api.fetch_editions().await;
    assert_eq!(editions.len(), 1);
    assert_eq!(editions[0].identifier, "ar.alafasy");
}

#[tokio::test]
async fn player_plays_verses_fetched_over_http() {
    let config = spawn_mock_api().await;
    let api = QuranApi::new(&config, "quran-test").expect("client");
    let catalog = Catalog::load(&api.chapter_sources("ar.husary"), &config.ayahs, "ar.husary").await;
    let chapter = catalog.get(112).cloned().expect("chapter 112");

    let mut player = Player::new(RecordingSink::default(), api, "ar.husary", Duration::from_secs(2));
    player.select_chapter(chapter).await.expect("open chapter");
    // the intro verse comes from chapter 1 and sits in front
    let seq = player.sequencer().ayahs();
    assert_eq!(seq.len(), 4);
    assert!(seq[0].is_intro);
    assert_eq!(seq[0].audio_url.as_deref(), Some("https://cdn.test/ar.husary/1/1.mp3"));

    player.play_at(1).await.expect("play verse");
    assert_eq!(player.sink().loads, vec!["https://cdn.test/ar.husary/112/1.mp3"]);
    assert_eq!(player.now_playing(), Some(&NowPlaying::Verse(1)));
}
