//! Metadata API client (chapters, editions, ayahs).

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::catalog::ChapterSource;
use crate::config::ApiConfig;
use crate::error::PlayerError;
use crate::model::{AudioEdition, Ayah, Chapter, RevelationPlace};
use crate::player::AyahSource;
use crate::prober::DescriptorResolver;

// ── response shapes ───────────────────────────────────────────────────────────

/// `api.quran.com/api/v4/chapters`
#[derive(Debug, Deserialize)]
pub struct PrimaryChapters {
    pub chapters: Vec<PrimaryChapter>,
}

#[derive(Debug, Deserialize)]
pub struct PrimaryChapter {
    pub id: u16,
    pub name_simple: String,
    #[serde(default)]
    pub name_arabic: String,
    pub verses_count: u32,
    #[serde(default)]
    pub revelation_place: String,
    pub translated_name: Option<TranslatedName>,
}

#[derive(Debug, Deserialize)]
pub struct TranslatedName {
    pub name: String,
}

/// Envelope used by every `api.alquran.cloud` endpoint.
#[derive(Debug, Deserialize)]
pub struct CloudEnvelope<T> {
    pub code: u16,
    #[serde(default)]
    pub status: String,
    pub data: Option<T>,
}

impl<T> CloudEnvelope<T> {
    fn into_data(self, what: &str) -> std::result::Result<T, PlayerError> {
        if self.code != 200 && self.status != "OK" {
            return Err(PlayerError::MetadataShapeMismatch(format!(
                "{} returned code {} ({})",
                what, self.code, self.status
            )));
        }
        self.data
            .ok_or_else(|| PlayerError::MetadataShapeMismatch(format!("{} has no data", what)))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudChapter {
    pub number: u16,
    /// Arabic name.
    pub name: String,
    pub english_name: String,
    #[serde(default)]
    pub english_name_translation: String,
    pub number_of_ayahs: u32,
    #[serde(default)]
    pub revelation_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudEdition {
    pub identifier: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub english_name: Option<String>,
    #[serde(default)]
    pub format: String,
}

#[derive(Debug, Deserialize)]
pub struct CloudChapterAyahs {
    pub ayahs: Vec<CloudAyah>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudAyah {
    pub number_in_surah: u32,
    #[serde(default)]
    pub text: String,
    pub audio: Option<String>,
    #[serde(default)]
    pub audio_secondary: Vec<String>,
}

// ── conversions ───────────────────────────────────────────────────────────────

pub fn chapters_from_primary(resp: PrimaryChapters, ayahs_endpoint: &str, edition: &str) -> Vec<Chapter> {
    resp.chapters
        .into_iter()
        .map(|c| {
            let english = c
                .translated_name
                .map(|t| t.name)
                .unwrap_or_else(|| c.name_simple.clone());
            Chapter::new(
                c.id,
                c.name_simple,
                english,
                c.name_arabic,
                c.verses_count,
                RevelationPlace::parse(&c.revelation_place),
                ayahs_endpoint,
                edition,
            )
        })
        .collect()
}

pub fn chapters_from_cloud(data: Vec<CloudChapter>, ayahs_endpoint: &str, edition: &str) -> Vec<Chapter> {
    data.into_iter()
        .map(|c| {
            Chapter::new(
                c.number,
                c.english_name,
                c.english_name_translation,
                c.name,
                c.number_of_ayahs,
                RevelationPlace::parse(&c.revelation_type),
                ayahs_endpoint,
                edition,
            )
        })
        .collect()
}

pub fn editions_from_cloud(data: Vec<CloudEdition>) -> Vec<AudioEdition> {
    data.into_iter()
        .filter(|e| e.format == "audio")
        .map(|e| {
            let display = e
                .english_name
                .filter(|n| !n.is_empty())
                .or(e.name.filter(|n| !n.is_empty()))
                .unwrap_or_else(|| e.identifier.clone());
            AudioEdition::new(e.identifier, display)
        })
        .collect()
}

pub fn ayahs_from_cloud(data: CloudChapterAyahs) -> Vec<Ayah> {
    data.ayahs
        .into_iter()
        .map(|a| {
            let mut secondary = a.audio_secondary;
            let primary = match a.audio.filter(|u| !u.is_empty()) {
                Some(url) => Some(url),
                None if !secondary.is_empty() => Some(secondary.remove(0)),
                None => None,
            };
            Ayah {
                index_in_chapter: a.number_in_surah,
                text: a.text,
                audio_url: primary,
                secondary_audio_urls: secondary,
                is_intro: false,
            }
        })
        .collect()
}

// ── client ────────────────────────────────────────────────────────────────────

/// HTTP client for every metadata endpoint, sharing one connection pool.
#[derive(Clone)]
pub struct QuranApi {
    client: reqwest::Client,
    config: ApiConfig,
}

impl QuranApi {
    pub fn new(config: &ApiConfig, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("failed to build metadata client")?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("api: GET {}", url);
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("failed to fetch {}", url))?;

        if !response.status().is_success() {
            return Err(PlayerError::MetadataShapeMismatch(format!(
                "{} returned status {}",
                url,
                response.status()
            ))
            .into());
        }

        response.json::<T>().await.map_err(|e| {
            PlayerError::MetadataShapeMismatch(format!("unexpected payload from {}: {}", url, e))
                .into()
        })
    }

    pub async fn fetch_primary_chapters(&self, edition: &str) -> Result<Vec<Chapter>> {
        let resp: PrimaryChapters = self.get_json(&self.config.chapters_primary).await?;
        Ok(chapters_from_primary(resp, &self.config.ayahs, edition))
    }

    pub async fn fetch_secondary_chapters(&self, edition: &str) -> Result<Vec<Chapter>> {
        let resp: CloudEnvelope<Vec<CloudChapter>> =
            self.get_json(&self.config.chapters_secondary).await?;
        let data = resp.into_data("chapter list")?;
        Ok(chapters_from_cloud(data, &self.config.ayahs, edition))
    }

    /// Audio editions, or just the default edition if the list is unavailable.
    pub async fn fetch_editions(&self) -> Vec<AudioEdition> {
        let fetched = async {
            let resp: CloudEnvelope<Vec<CloudEdition>> =
                self.get_json(&self.config.editions).await?;
            Ok::<_, anyhow::Error>(editions_from_cloud(resp.into_data("edition list")?))
        }
        .await;

        match fetched {
            Ok(editions) if !editions.is_empty() => editions,
            Ok(_) => {
                warn!("api: edition list empty, using {}", self.config.default_edition);
                vec![self.default_edition()]
            }
            Err(e) => {
                warn!(
                    "api: edition list unavailable ({:#}), using {}",
                    e, self.config.default_edition
                );
                vec![self.default_edition()]
            }
        }
    }

    fn default_edition(&self) -> AudioEdition {
        AudioEdition::new(
            self.config.default_edition.clone(),
            self.config.default_edition.clone(),
        )
    }

    /// The two remote chapter sources in fallback order.
    pub fn chapter_sources(&self, edition: &str) -> Vec<Box<dyn ChapterSource>> {
        vec![
            Box::new(RemoteChapters {
                api: self.clone(),
                edition: edition.to_string(),
                kind: RemoteKind::Primary,
            }),
            Box::new(RemoteChapters {
                api: self.clone(),
                edition: edition.to_string(),
                kind: RemoteKind::Secondary,
            }),
        ]
    }
}

#[async_trait]
impl DescriptorResolver for QuranApi {
    async fn resolve_descriptor(&self, url: &str) -> Result<String> {
        let resp: CloudEnvelope<CloudChapterAyahs> = self.get_json(url).await?;
        let ayahs = resp.into_data("audio descriptor")?;
        ayahs
            .ayahs
            .into_iter()
            .next()
            .and_then(|a| a.audio)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                PlayerError::MetadataShapeMismatch(format!("no audio in descriptor {}", url)).into()
            })
    }
}

#[async_trait]
impl AyahSource for QuranApi {
    async fn fetch_ayahs(&self, chapter: u16, edition: &str) -> Result<Vec<Ayah>> {
        let url = self.descriptor_url(chapter, edition);
        let resp: CloudEnvelope<CloudChapterAyahs> = self.get_json(&url).await?;
        let ayahs = ayahs_from_cloud(resp.into_data("ayah list")?);
        if ayahs.is_empty() {
            return Err(PlayerError::MetadataShapeMismatch(format!("{} has no ayahs", url)).into());
        }
        Ok(ayahs)
    }

    fn descriptor_url(&self, chapter: u16, edition: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.ayahs.trim_end_matches('/'),
            chapter,
            edition
        )
    }
}

#[derive(Clone, Copy)]
enum RemoteKind {
    Primary,
    Secondary,
}

struct RemoteChapters {
    api: QuranApi,
    edition: String,
    kind: RemoteKind,
}

#[async_trait]
impl ChapterSource for RemoteChapters {
    fn name(&self) -> &str {
        match self.kind {
            RemoteKind::Primary => "quran.com",
            RemoteKind::Secondary => "alquran.cloud",
        }
    }

    async fn fetch_chapters(&self) -> Result<Vec<Chapter>> {
        match self.kind {
            RemoteKind::Primary => self.api.fetch_primary_chapters(&self.edition).await,
            RemoteKind::Secondary => self.api.fetch_secondary_chapters(&self.edition).await,
        }
    }
}
