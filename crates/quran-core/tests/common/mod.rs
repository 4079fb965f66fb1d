//! A local stand-in for the metadata APIs, served on an ephemeral port.

use async_trait::async_trait;
use axum::{extract::Path, http::StatusCode, routing::get, Json, Router};
use quran_core::config::ApiConfig;
use quran_core::prober::{LoadedMedia, PlaybackSink};
use serde_json::{json, Value};

async fn cloud_chapters() -> Json<Value> {
    Json(json!({
        "code": 200,
        "status": "OK",
        "data": [
            {
                "number": 1,
                "name": "سُورَةُ ٱلْفَاتِحَةِ",
                "englishName": "Al-Faatiha",
                "englishNameTranslation": "The Opening",
                "numberOfAyahs": 3,
                "revelationType": "Meccan"
            },
            {
                "number": 112,
                "name": "سُورَةُ الإِخۡلَاصِ",
                "englishName": "Al-Ikhlaas",
                "englishNameTranslation": "Sincerity",
                "numberOfAyahs": 4,
                "revelationType": "Meccan"
            }
        ]
    }))
}

async fn editions() -> Json<Value> {
    Json(json!({
        "code": 200,
        "status": "OK",
        "data": [
            { "identifier": "ar.alafasy", "englishName": "Alafasy", "format": "audio" },
            { "identifier": "en.sahih", "englishName": "Saheeh International", "format": "text" },
            { "identifier": "ar.husary", "englishName": "Husary", "format": "audio" }
        ]
    }))
}

async fn ayahs(Path((chapter, edition)): Path<(u16, String)>) -> Json<Value> {
    let ayahs: Vec<Value> = (1..=3)
        .map(|n| {
            json!({
                "numberInSurah": n,
                "text": format!("verse {n}"),
                "audio": format!("https://cdn.test/{edition}/{chapter}/{n}.mp3"),
                "audioSecondary": [format!("https://mirror.test/{edition}/{chapter}/{n}.mp3")]
            })
        })
        .collect();
    Json(json!({ "code": 200, "status": "OK", "data": { "ayahs": ayahs } }))
}

/// Starts the mock and returns an `ApiConfig` pointing at it. The primary
/// chapter list always answers 500 so the secondary one has to be used.
pub async fn spawn_mock_api() -> ApiConfig {
    let app = Router::new()
        .route("/primary", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .route("/secondary", get(cloud_chapters))
        .route("/editions", get(editions))
        .route("/ayahs/:chapter/:edition", get(ayahs));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock api");
    let base = format!("http://{}", listener.local_addr().expect("local addr"));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    ApiConfig {
        chapters_primary: format!("{base}/primary"),
        chapters_secondary: format!("{base}/secondary"),
        editions: format!("{base}/editions"),
        ayahs: format!("{base}/ayahs"),
        default_edition: "ar.alafasy".to_string(),
        request_timeout_secs: 5,
    }
}

/// Accepts every URL and remembers what it was asked to load.
#[derive(Default)]
pub struct RecordingSink {
    pub loads: Vec<String>,
}

#[async_trait]
impl PlaybackSink for RecordingSink {
    async fn load(&mut self, url: &str) -> anyhow::Result<LoadedMedia> {
        self.loads.push(url.to_string());
        Ok(LoadedMedia { duration_secs: Some(4.0) })
    }

    async fn play(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn stop(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}
