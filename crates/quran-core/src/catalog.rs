//! In-memory chapter list: primary source, then secondary, then the
//! built-in table.

mod builtin;

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::PlayerError;
use crate::model::{is_valid_chapter, Chapter, RevelationPlace};
use crate::prober::probe_in_order;

/// A place the chapter list can be fetched from.
#[async_trait]
pub trait ChapterSource: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch_chapters(&self) -> anyhow::Result<Vec<Chapter>>;
}

/// Which source the catalog was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogOrigin {
    Remote(String),
    Builtin,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    chapters: Vec<Chapter>,
    origin: CatalogOrigin,
}

/// Reject lists that are empty or contain out-of-range or repeated numbers.
pub fn validate_chapters(chapters: &[Chapter]) -> Result<(), PlayerError> {
    if chapters.is_empty() {
        return Err(PlayerError::MetadataShapeMismatch(
            "chapter list is empty".to_string(),
        ));
    }
    let mut seen = HashSet::with_capacity(chapters.len());
    for c in chapters {
        if !is_valid_chapter(c.number) || !seen.insert(c.number) || c.verse_count == 0 {
            return Err(PlayerError::MetadataShapeMismatch(format!(
                "invalid chapter entry {} ({} verses)",
                c.number, c.verse_count
            )));
        }
    }
    Ok(())
}

impl Catalog {
    /// Try each source in order; fall back to the built-in table when all
    /// of them fail. Never fails.
    pub async fn load(
        sources: &[Box<dyn ChapterSource>],
        ayahs_endpoint: &str,
        edition: &str,
    ) -> Self {
        let attempt = probe_in_order(sources.iter().collect(), |_, source| async move {
            let mut chapters = source.fetch_chapters().await?;
            validate_chapters(&chapters)?;
            chapters.sort_by_key(|c| c.number);
            Ok::<_, anyhow::Error>((source.name().to_string(), chapters))
        })
        .await;

        match attempt {
            Ok(probed) => {
                let (name, chapters) = probed.value;
                info!("catalog: {} chapters from {}", chapters.len(), name);
                Self {
                    chapters,
                    origin: CatalogOrigin::Remote(name),
                }
            }
            Err(e) => {
                warn!(
                    "catalog: all {} sources failed (last: {}), using built-in table",
                    e.tried,
                    e.last_error.as_deref().unwrap_or("none")
                );
                Self::builtin(ayahs_endpoint, edition)
            }
        }
    }

    pub fn builtin(ayahs_endpoint: &str, edition: &str) -> Self {
        let chapters = builtin::CHAPTERS
            .iter()
            .map(|&(number, name, arabic, verses)| {
                Chapter::new(
                    number,
                    name,
                    name,
                    arabic,
                    verses,
                    RevelationPlace::Unknown,
                    ayahs_endpoint,
                    edition,
                )
            })
            .collect();
        Self {
            chapters,
            origin: CatalogOrigin::Builtin,
        }
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn origin(&self) -> &CatalogOrigin {
        &self.origin
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn get(&self, number: u16) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.number == number)
    }

    /// The chapter after `number`, if any.
    pub fn next(&self, number: u16) -> Option<&Chapter> {
        number.checked_add(1).and_then(|n| self.get(n))
    }

    /// The chapter before `number`, if any.
    pub fn previous(&self, number: u16) -> Option<&Chapter> {
        number.checked_sub(1).and_then(|n| self.get(n))
    }
}
