//! Verse ordering and auto-advance.
//!
//! The sequencer holds no I/O: it only decides which verse is current and
//! which one should play next. [`crate::player::Player`] performs the loads.

use crate::error::{PlayerError, Result};
use crate::model::{Ayah, CHAPTER_COUNT};

/// Chapter that opens without the intro verse.
const NO_INTRO_CHAPTER: u16 = 9;

/// Whether the shared intro recitation is prepended to `chapter`.
///
/// Chapter 1 already begins with it; chapter 9 never carries it.
pub fn needs_intro(chapter: u16) -> bool {
    (2..=CHAPTER_COUNT).contains(&chapter) && chapter != NO_INTRO_CHAPTER
}

/// Build the playback order for a chapter, prepending `intro` when the
/// chapter takes one.
pub fn build_sequence(chapter: u16, ayahs: Vec<Ayah>, intro: Option<Ayah>) -> Vec<Ayah> {
    match intro {
        Some(mut intro) if needs_intro(chapter) => {
            intro.index_in_chapter = 0;
            intro.is_intro = true;
            let mut seq = Vec::with_capacity(ayahs.len() + 1);
            seq.push(intro);
            seq.extend(ayahs);
            seq
        }
        _ => ayahs,
    }
}

#[derive(Debug, Default)]
pub struct VerseSequencer {
    ayahs: Vec<Ayah>,
    current: usize,
    auto_advance: bool,
}

impl VerseSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the sequence and reset position and auto-advance.
    pub fn load(&mut self, ayahs: Vec<Ayah>) {
        self.ayahs = ayahs;
        self.current = 0;
        self.auto_advance = false;
    }

    pub fn reset(&mut self) {
        self.load(Vec::new());
    }

    pub fn ayahs(&self) -> &[Ayah] {
        &self.ayahs
    }

    pub fn len(&self) -> usize {
        self.ayahs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ayahs.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Option<&Ayah> {
        self.ayahs.get(self.current)
    }

    pub fn auto_advance(&self) -> bool {
        self.auto_advance
    }

    pub fn set_auto_advance(&mut self, on: bool) {
        self.auto_advance = on;
    }

    /// Make `index` current. Fails without touching state if the verse is
    /// missing or has no audio.
    pub fn play_at(&mut self, index: usize) -> Result<&Ayah> {
        match self.ayahs.get(index) {
            Some(ayah) if ayah.has_audio() => {
                self.current = index;
                Ok(&self.ayahs[index])
            }
            _ => Err(PlayerError::VerseUnavailable { index }),
        }
    }

    /// Advance one verse; `Ok(None)` at the last verse.
    pub fn step_next(&mut self) -> Result<Option<&Ayah>> {
        if self.ayahs.is_empty() || self.current + 1 >= self.ayahs.len() {
            return Ok(None);
        }
        self.play_at(self.current + 1).map(Some)
    }

    /// Go back one verse; `Ok(None)` at the first verse.
    pub fn step_previous(&mut self) -> Result<Option<&Ayah>> {
        if self.ayahs.is_empty() || self.current == 0 {
            return Ok(None);
        }
        self.play_at(self.current - 1).map(Some)
    }

    /// Enable auto-advance and start from the first verse.
    pub fn start_full_chapter(&mut self) -> Result<&Ayah> {
        self.auto_advance = true;
        self.play_at(0)
    }

    /// Called when the current verse finished playing. Returns the verse to
    /// play next when auto-advancing.
    ///
    /// Auto-advance is cleared once the last verse becomes current, so the
    /// final completion is always a no-op.
    pub fn on_completed(&mut self) -> Result<Option<&Ayah>> {
        if !self.auto_advance {
            return Ok(None);
        }
        let next = self.current + 1;
        if next >= self.ayahs.len() {
            self.auto_advance = false;
            return Ok(None);
        }
        if next + 1 == self.ayahs.len() {
            self.auto_advance = false;
        }
        self.play_at(next).map(Some)
    }
}
