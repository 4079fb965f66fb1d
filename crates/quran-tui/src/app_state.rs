//! AppState: read-only data handed to components. Only `App` writes it.

use std::sync::Arc;

use quran_core::catalog::Catalog;
use quran_core::model::{reciter_name, AudioEdition, Favorite};
use quran_core::player::{NowPlaying, PlayerSnapshot};

use crate::widgets::status_bar::InputMode;

pub struct AppState {
    pub catalog: Catalog,
    /// Mirrored from the favorites store after each change, in insertion order.
    pub favorites: Vec<Favorite>,
    pub editions: Vec<AudioEdition>,
    pub player: Arc<PlayerSnapshot>,
    pub input_mode: InputMode,
    pub items_per_page: usize,
}

impl AppState {
    pub fn new(catalog: Catalog, editions: Vec<AudioEdition>, edition: &str, items_per_page: usize) -> Self {
        Self {
            catalog,
            favorites: Vec::new(),
            editions,
            player: Arc::new(PlayerSnapshot {
                edition: edition.to_string(),
                ..Default::default()
            }),
            input_mode: InputMode::Normal,
            items_per_page: items_per_page.max(1),
        }
    }

    pub fn is_favorite(&self, number: u16) -> bool {
        self.favorites.iter().any(|f| f.number == number)
    }

    pub fn open_chapter(&self) -> Option<u16> {
        self.player.chapter.as_ref().map(|c| c.number)
    }

    pub fn reciter(&self) -> &str {
        reciter_name(&self.editions, &self.player.edition)
    }

    /// The edition after the current one, wrapping around.
    pub fn next_edition(&self) -> Option<&AudioEdition> {
        if self.editions.len() < 2 {
            return None;
        }
        let pos = self
            .editions
            .iter()
            .position(|e| e.identifier == self.player.edition)
            .map_or(0, |p| (p + 1) % self.editions.len());
        self.editions.get(pos)
    }

    pub fn now_playing_text(&self) -> String {
        let Some(chapter) = self.player.chapter.as_ref() else {
            return "Nothing playing".to_string();
        };
        match self.player.now_playing.as_ref() {
            Some(NowPlaying::Verse(i)) => {
                let label = self
                    .player
                    .verses
                    .get(*i)
                    .map(|v| v.label.as_str())
                    .unwrap_or("");
                format!("Surah {} {} · {} · {}", chapter.number, chapter.name, label, self.reciter())
            }
            Some(NowPlaying::ChapterRecording { .. }) => format!(
                "Surah {} {} · full recording · {}",
                chapter.number,
                chapter.name,
                self.reciter()
            ),
            None => format!("Surah {} {} · stopped · {}", chapter.number, chapter.name, self.reciter()),
        }
    }
}
