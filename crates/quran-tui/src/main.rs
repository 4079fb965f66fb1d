mod action;
mod app;
mod app_state;
mod component;
mod components;
mod core;
mod mpv;
mod theme;
mod widgets;

use std::time::Duration;

use tokio::sync::{broadcast, mpsc};

use quran_core::api::QuranApi;
use quran_core::catalog::Catalog;
use quran_core::config::Config;
use quran_core::favorites::{FileStore, Favorites};
use quran_core::player::Player;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = quran_core::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("tui.log");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // RUST_LOG wins; otherwise keep HTTP client internals quiet.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    eprintln!("quran log: {}", log_path.display());
    tracing::info!("quran starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let config = match Config::load() {
        Ok(config) => {
            tracing::info!("config loaded from {:?}", Config::config_path());
            config
        }
        Err(e) => {
            tracing::warn!("config unusable, falling back to defaults: {:#}", e);
            Config::default()
        }
    };

    // ── Metadata: editions, then chapters for the chosen edition ────────────
    let api = QuranApi::new(&config.api, &config.proxy.user_agent)?;
    let editions = api.fetch_editions().await;
    let edition = editions
        .iter()
        .find(|e| e.identifier == config.api.default_edition)
        .or_else(|| editions.first())
        .map(|e| e.identifier.clone())
        .unwrap_or_else(|| config.api.default_edition.clone());
    let catalog = Catalog::load(&api.chapter_sources(&edition), &config.api.ayahs, &edition).await;
    tracing::info!(
        "catalog ready: {} chapters, {} editions, edition={}",
        catalog.len(),
        editions.len(),
        edition
    );

    let favorites = Favorites::load(FileStore::new(config.paths.store_dir.clone()));

    // ── mpv events → PlayerCore ──────────────────────────────────────────────
    let (mpv_tx, mpv_rx) = broadcast::channel::<mpv::MpvEvent>(256);
    let sink = mpv::MpvSink::new(mpv_tx);

    // ── PlayerCore ───────────────────────────────────────────────────────────
    let (update_tx, update_rx) = broadcast::channel::<core::CoreUpdate>(256);
    let (event_tx, event_rx) = mpsc::channel::<core::CoreEvent>(256);
    let player = Player::new(
        sink,
        api.clone(),
        edition.clone(),
        Duration::from_secs(config.player.probe_timeout_secs),
    );
    let player_core = core::PlayerCore::new(
        player,
        Some(config.player.proxy_base_url.clone()),
        config.proxy.mirrors.clone(),
        update_tx,
    );
    let core_task = tokio::spawn(player_core.run(event_rx));
    core::forward_mpv_events(mpv_rx, event_tx.clone());

    // ── Run TUI ──────────────────────────────────────────────────────────────
    let state = app_state::AppState::new(catalog, editions, &edition, config.player.items_per_page);
    let app = app::App::new(state, favorites, event_tx);
    app.run(update_rx).await?;

    // let the core stop mpv before the runtime goes away
    let _ = tokio::time::timeout(Duration::from_secs(2), core_task).await;
    tracing::info!("quran exiting");
    Ok(())
}
