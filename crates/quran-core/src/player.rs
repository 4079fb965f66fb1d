//! Playback controller: one open chapter, its verse sequence and the sink.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::display::{display_text, verse_label};
use crate::error::PlayerError;
use crate::model::{Ayah, Chapter};
use crate::prober::{
    chapter_candidates, resolve_and_play, AudioCandidate, DescriptorResolver, PlaybackSink,
};
use crate::sequencer::{build_sequence, needs_intro, VerseSequencer};

/// Where verse lists come from. The edition is always passed explicitly.
#[async_trait]
pub trait AyahSource: DescriptorResolver {
    async fn fetch_ayahs(&self, chapter: u16, edition: &str) -> anyhow::Result<Vec<Ayah>>;

    /// Descriptor URL whose first ayah names whole-chapter audio.
    fn descriptor_url(&self, chapter: u16, edition: &str) -> String;
}

/// What the sink is currently pointed at.
#[derive(Debug, Clone, PartialEq)]
pub enum NowPlaying {
    Verse(usize),
    ChapterRecording { url: String },
}

/// One row of the verse list as the UI shows it.
#[derive(Debug, Clone, PartialEq)]
pub struct VerseView {
    pub label: String,
    pub text: String,
    pub has_audio: bool,
}

/// Read-only view of the player for rendering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerSnapshot {
    pub chapter: Option<Chapter>,
    pub verses: Vec<VerseView>,
    pub current_index: usize,
    pub auto_advance: bool,
    pub edition: String,
    pub now_playing: Option<NowPlaying>,
    pub last_error: Option<String>,
}

fn into_player_error(e: anyhow::Error) -> PlayerError {
    match e.downcast::<PlayerError>() {
        Ok(p) => p,
        Err(e) => PlayerError::Transport(format!("{:#}", e)),
    }
}

pub struct Player<S, A> {
    sink: S,
    source: A,
    sequencer: VerseSequencer,
    chapter: Option<Chapter>,
    edition: String,
    probe_timeout: Duration,
    now_playing: Option<NowPlaying>,
    last_error: Option<String>,
}

impl<S: PlaybackSink, A: AyahSource> Player<S, A> {
    pub fn new(sink: S, source: A, edition: impl Into<String>, probe_timeout: Duration) -> Self {
        Self {
            sink,
            source,
            sequencer: VerseSequencer::new(),
            chapter: None,
            edition: edition.into(),
            probe_timeout,
            now_playing: None,
            last_error: None,
        }
    }

    pub fn edition(&self) -> &str {
        &self.edition
    }

    pub fn chapter(&self) -> Option<&Chapter> {
        self.chapter.as_ref()
    }

    pub fn sequencer(&self) -> &VerseSequencer {
        &self.sequencer
    }

    pub fn now_playing(&self) -> Option<&NowPlaying> {
        self.now_playing.as_ref()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Open `chapter`: fetch its verses under the current edition and, where
    /// the chapter takes one, the intro verse. Resets sequencing state.
    pub async fn select_chapter(&mut self, chapter: Chapter) -> Result<(), PlayerError> {
        info!("player: opening chapter {} ({})", chapter.number, self.edition);
        self.halt().await;
        self.sequencer.reset();
        self.chapter = None;
        self.last_error = None;

        let ayahs = match self.source.fetch_ayahs(chapter.number, &self.edition).await {
            Ok(ayahs) => ayahs,
            Err(e) => {
                let err = into_player_error(e);
                warn!("player: chapter {} unavailable: {}", chapter.number, err);
                self.last_error = Some(err.to_string());
                return Err(err);
            }
        };

        let intro = if needs_intro(chapter.number) {
            match self.source.fetch_ayahs(1, &self.edition).await {
                Ok(first) => first.into_iter().next(),
                Err(e) => {
                    warn!("player: intro verse unavailable: {:#}", e);
                    None
                }
            }
        } else {
            None
        };

        let sequence = build_sequence(chapter.number, ayahs, intro);
        debug!("player: chapter {} has {} entries", chapter.number, sequence.len());
        self.sequencer.load(sequence);
        self.chapter = Some(chapter);
        Ok(())
    }

    /// Switch recitation edition, re-opening the current chapter under it.
    pub async fn change_edition(&mut self, edition: impl Into<String>) -> Result<(), PlayerError> {
        self.edition = edition.into();
        info!("player: edition set to {}", self.edition);
        match self.chapter.clone() {
            Some(chapter) => self.select_chapter(chapter).await,
            None => Ok(()),
        }
    }

    pub async fn play_at(&mut self, index: usize) -> Result<(), PlayerError> {
        let ayah = match self.sequencer.play_at(index) {
            Ok(a) => a.clone(),
            Err(e) => return Err(self.fail(e)),
        };
        self.load_verse(index, &ayah).await
    }

    /// Step forward; a no-op at the last verse.
    pub async fn play_next(&mut self) -> Result<(), PlayerError> {
        let next = match self.sequencer.step_next() {
            Ok(next) => next.cloned(),
            Err(e) => return Err(self.fail(e)),
        };
        match next {
            Some(ayah) => {
                let index = self.sequencer.current_index();
                self.load_verse(index, &ayah).await
            }
            None => Ok(()),
        }
    }

    /// Step back; a no-op at the first verse.
    pub async fn play_previous(&mut self) -> Result<(), PlayerError> {
        let prev = match self.sequencer.step_previous() {
            Ok(prev) => prev.cloned(),
            Err(e) => return Err(self.fail(e)),
        };
        match prev {
            Some(ayah) => {
                let index = self.sequencer.current_index();
                self.load_verse(index, &ayah).await
            }
            None => Ok(()),
        }
    }

    /// Play every verse from the start, advancing on completion.
    pub async fn play_full_chapter(&mut self) -> Result<(), PlayerError> {
        let first = match self.sequencer.start_full_chapter() {
            Ok(a) => a.clone(),
            Err(e) => {
                self.sequencer.set_auto_advance(false);
                return Err(self.fail(e));
            }
        };
        let result = self.load_verse(0, &first).await;
        if result.is_err() {
            self.sequencer.set_auto_advance(false);
        }
        result
    }

    /// The sink finished the current recording.
    pub async fn on_playback_completed(&mut self) -> Result<(), PlayerError> {
        if matches!(self.now_playing, Some(NowPlaying::ChapterRecording { .. })) {
            self.now_playing = None;
            return Ok(());
        }
        let next = match self.sequencer.on_completed() {
            Ok(next) => next.cloned(),
            Err(e) => {
                self.sequencer.set_auto_advance(false);
                return Err(self.fail(e));
            }
        };
        match next {
            Some(ayah) => {
                let index = self.sequencer.current_index();
                let result = self.load_verse(index, &ayah).await;
                if result.is_err() {
                    self.sequencer.set_auto_advance(false);
                }
                result
            }
            None => {
                self.now_playing = None;
                Ok(())
            }
        }
    }

    /// Play the whole-chapter recording, trying the proxy, the API
    /// descriptor and every mirror in turn.
    pub async fn play_chapter_recording(
        &mut self,
        proxy_base: Option<&str>,
        mirrors: &[String],
    ) -> Result<(), PlayerError> {
        let Some(chapter) = self.chapter.clone() else {
            return Ok(());
        };
        self.sequencer.set_auto_advance(false);

        let mut chapter = chapter;
        chapter.alternate_audio_url = Some(self.source.descriptor_url(chapter.number, &self.edition));
        let candidates = chapter_candidates(&chapter, proxy_base, mirrors);
        let target = format!("Surah {}", chapter.number);

        match resolve_and_play(&target, candidates, &mut self.sink, &self.source, self.probe_timeout).await {
            Ok(url) => {
                self.now_playing = Some(NowPlaying::ChapterRecording { url });
                self.last_error = None;
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Stop the sink after an abandoned load. The open chapter stays.
    pub async fn interrupt(&mut self) {
        debug!("player: interrupted");
        self.halt().await;
    }

    /// Stop playback and forget the open chapter.
    pub async fn close(&mut self) {
        info!("player: closing");
        self.halt().await;
        self.sequencer.reset();
        self.chapter = None;
        self.last_error = None;
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        let ayahs = self.sequencer.ayahs();
        PlayerSnapshot {
            chapter: self.chapter.clone(),
            verses: ayahs
                .iter()
                .enumerate()
                .map(|(i, a)| VerseView {
                    label: verse_label(a),
                    text: display_text(ayahs, i).into_owned(),
                    has_audio: a.has_audio(),
                })
                .collect(),
            current_index: self.sequencer.current_index(),
            auto_advance: self.sequencer.auto_advance(),
            edition: self.edition.clone(),
            now_playing: self.now_playing.clone(),
            last_error: self.last_error.clone(),
        }
    }

    async fn halt(&mut self) {
        self.sequencer.set_auto_advance(false);
        self.now_playing = None;
        if let Err(e) = self.sink.stop().await {
            warn!("player: stop failed: {:#}", e);
        }
    }

    async fn load_verse(&mut self, index: usize, ayah: &Ayah) -> Result<(), PlayerError> {
        let number = self.chapter.as_ref().map(|c| c.number).unwrap_or_default();
        let target = if ayah.is_intro {
            format!("Surah {} intro", number)
        } else {
            format!("Surah {} verse {}", number, ayah.index_in_chapter)
        };
        let candidates: Vec<AudioCandidate> = ayah
            .audio_sources()
            .into_iter()
            .map(AudioCandidate::direct)
            .collect();

        match resolve_and_play(&target, candidates, &mut self.sink, &self.source, self.probe_timeout).await {
            Ok(_) => {
                self.now_playing = Some(NowPlaying::Verse(index));
                self.last_error = None;
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn fail(&mut self, e: PlayerError) -> PlayerError {
        self.last_error = Some(e.to_string());
        e
    }
}
