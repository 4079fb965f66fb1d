//! PlayerCore: single-owner event loop for the playback session.
//!
//! The UI never touches the `Player` directly. It sends `CoreEvent`s over an
//! mpsc channel; PlayerCore applies them one at a time (so audio probing is
//! never concurrent within the session) and broadcasts a fresh
//! `PlayerSnapshot` after every event.
//!
//! A command or `Shutdown` that arrives while a lookup is still resolving
//! abandons it. The pending load is dropped and the sink stopped before the
//! newer event runs. End-of-file reports arriving mid-lookup are stale.
//!
//! End-of-file from mpv arrives as `CoreEvent::PlaybackFinished`, forwarded
//! by [`forward_mpv_events`].
use std::sync::Arc;

use quran_core::error::PlayerError;
use quran_core::model::Chapter;
use quran_core::player::{AyahSource, Player, PlayerSnapshot};
use quran_core::prober::PlaybackSink;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::mpv::MpvEvent;

/// Requests from the UI.
#[derive(Debug, Clone)]
pub enum PlayerCommand {
    Open(Chapter),
    PlayVerse(usize),
    PlayFullChapter,
    NextVerse,
    PreviousVerse,
    PlayChapterRecording,
    ChangeEdition(String),
    Close,
}

/// All inputs into the PlayerCore loop.
#[derive(Debug)]
pub enum CoreEvent {
    Command(PlayerCommand),
    /// The sink played the current file to its end.
    PlaybackFinished,
    Shutdown,
}

/// What PlayerCore broadcasts.
#[derive(Debug, Clone)]
pub enum CoreUpdate {
    Snapshot(Arc<PlayerSnapshot>),
    /// A long operation started; cleared by the next snapshot.
    Busy(String),
    /// A user-visible failure.
    Error(String),
}

pub struct PlayerCore<S, A> {
    player: Player<S, A>,
    /// Absolute base of the local proxy, if one is configured.
    proxy_base: Option<String>,
    mirrors: Vec<String>,
    update_tx: broadcast::Sender<CoreUpdate>,
}

impl<S: PlaybackSink, A: AyahSource> PlayerCore<S, A> {
    pub fn new(
        player: Player<S, A>,
        proxy_base: Option<String>,
        mirrors: Vec<String>,
        update_tx: broadcast::Sender<CoreUpdate>,
    ) -> Self {
        Self {
            player,
            proxy_base: proxy_base.filter(|b| !b.trim().is_empty()),
            mirrors,
            update_tx,
        }
    }

    /// Run until `Shutdown` or until every sender is dropped.
    pub async fn run(mut self, mut event_rx: mpsc::Receiver<CoreEvent>) {
        info!("PlayerCore: starting event loop");
        self.publish();

        let mut pending: Option<CoreEvent> = None;
        loop {
            let evt = match pending.take() {
                Some(evt) => evt,
                None => match event_rx.recv().await {
                    Some(evt) => evt,
                    None => break,
                },
            };
            if let CoreEvent::Shutdown = evt {
                info!("PlayerCore: shutdown requested");
                break;
            }

            let superseded = {
                let work = self.apply(evt);
                tokio::pin!(work);
                loop {
                    tokio::select! {
                        _ = &mut work => break None,
                        incoming = event_rx.recv() => match incoming {
                            Some(CoreEvent::PlaybackFinished) => {
                                debug!("PlayerCore: stale playback-finished dropped");
                            }
                            Some(evt) => break Some(evt),
                            None => break Some(CoreEvent::Shutdown),
                        },
                    }
                }
            };
            if let Some(evt) = superseded {
                info!("PlayerCore: in-flight request abandoned for {:?}", evt);
                self.player.interrupt().await;
                pending = Some(evt);
            }
            self.publish();
        }

        self.player.close().await;
        info!("PlayerCore: stopped");
    }

    async fn apply(&mut self, evt: CoreEvent) {
        match evt {
            CoreEvent::Command(cmd) => {
                debug!("PlayerCore: command {:?}", cmd);
                self.handle_command(cmd).await;
            }
            CoreEvent::PlaybackFinished => {
                debug!("PlayerCore: playback finished");
                if let Err(e) = self.player.on_playback_completed().await {
                    self.report(e);
                }
            }
            CoreEvent::Shutdown => {}
        }
    }

    async fn handle_command(&mut self, cmd: PlayerCommand) {
        let result = match cmd {
            PlayerCommand::Open(chapter) => {
                self.busy(format!("Loading Surah {}…", chapter.number));
                self.player.select_chapter(chapter).await
            }
            PlayerCommand::PlayVerse(index) => self.player.play_at(index).await,
            PlayerCommand::PlayFullChapter => self.player.play_full_chapter().await,
            PlayerCommand::NextVerse => self.player.play_next().await,
            PlayerCommand::PreviousVerse => self.player.play_previous().await,
            PlayerCommand::PlayChapterRecording => {
                self.busy("Finding a recording…".to_string());
                self.player
                    .play_chapter_recording(self.proxy_base.as_deref(), &self.mirrors)
                    .await
            }
            PlayerCommand::ChangeEdition(edition) => {
                self.busy(format!("Switching to {}…", edition));
                self.player.change_edition(edition).await
            }
            PlayerCommand::Close => {
                self.player.close().await;
                Ok(())
            }
        };
        if let Err(e) = result {
            self.report(e);
        }
    }

    fn busy(&self, message: String) {
        let _ = self.update_tx.send(CoreUpdate::Busy(message));
    }

    fn report(&self, e: PlayerError) {
        warn!("PlayerCore: {}", e);
        let _ = self.update_tx.send(CoreUpdate::Error(e.to_string()));
    }

    fn publish(&self) {
        let _ = self
            .update_tx
            .send(CoreUpdate::Snapshot(Arc::new(self.player.snapshot())));
    }
}

/// Turn mpv end-of-file events into `PlaybackFinished`.
pub fn forward_mpv_events(
    mut mpv_rx: broadcast::Receiver<MpvEvent>,
    core_tx: mpsc::Sender<CoreEvent>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match mpv_rx.recv().await {
                Ok(evt) if evt.is_eof() => {
                    if core_tx.send(CoreEvent::PlaybackFinished).await.is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("mpv event forwarder lagged by {} messages", n);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use quran_core::model::{Ayah, RevelationPlace};
    use quran_core::prober::{DescriptorResolver, LoadedMedia};
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct RecordingSink {
        loads: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl PlaybackSink for RecordingSink {
        async fn load(&mut self, url: &str) -> anyhow::Result<LoadedMedia> {
            self.loads.lock().unwrap().push(url.to_string());
            if url.contains("broken") {
                anyhow::bail!("decode error");
            }
            Ok(LoadedMedia {
                duration_secs: Some(4.0),
            })
        }

        async fn play(&mut self) -> anyhow::Result<()> {
            Ok(())
        }

        async fn stop(&mut self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    /// A decoder that never reports ready.
    #[derive(Clone, Default)]
    struct StalledSink {
        stops: Arc<Mutex<usize>>,
    }

    #[async_trait]
    impl PlaybackSink for StalledSink {
        async fn load(&mut self, _url: &str) -> anyhow::Result<LoadedMedia> {
            std::future::pending().await
        }

        async fn play(&mut self) -> anyhow::Result<()> {
            Ok(())
        }

        async fn stop(&mut self) -> anyhow::Result<()> {
            *self.stops.lock().unwrap() += 1;
            Ok(())
        }
    }

    struct ThreeVerses;

    #[async_trait]
    impl DescriptorResolver for ThreeVerses {
        async fn resolve_descriptor(&self, _url: &str) -> anyhow::Result<String> {
            anyhow::bail!("no descriptors here")
        }
    }

    #[async_trait]
    impl AyahSource for ThreeVerses {
        async fn fetch_ayahs(&self, chapter: u16, edition: &str) -> anyhow::Result<Vec<Ayah>> {
            Ok((1..=3)
                .map(|n| Ayah {
                    index_in_chapter: n,
                    text: format!("verse {}", n),
                    audio_url: Some(if chapter == 113 && n == 2 {
                        "https://cdn/broken.mp3".to_string()
                    } else {
                        format!("https://cdn/{}/{}/{}.mp3", edition, chapter, n)
                    }),
                    ..Default::default()
                })
                .collect())
        }

        fn descriptor_url(&self, chapter: u16, edition: &str) -> String {
            format!("https://api/{}/{}", chapter, edition)
        }
    }

    fn chapter(n: u16) -> Chapter {
        Chapter::new(n, format!("C{}", n), "", "", 3, RevelationPlace::Unknown, "https://api", "ed")
    }

    async fn next_snapshot(rx: &mut broadcast::Receiver<CoreUpdate>) -> Arc<PlayerSnapshot> {
        loop {
            match tokio::time::timeout(Duration::from_secs(5), rx.recv()).await.unwrap().unwrap() {
                CoreUpdate::Snapshot(s) => return s,
                _ => continue,
            }
        }
    }

    fn spawn_core(sink: RecordingSink) -> (mpsc::Sender<CoreEvent>, broadcast::Receiver<CoreUpdate>) {
        let (update_tx, update_rx) = broadcast::channel(64);
        let (event_tx, event_rx) = mpsc::channel(16);
        let player = Player::new(sink, ThreeVerses, "ar.alafasy", Duration::from_secs(5));
        let core = PlayerCore::new(player, None, vec![], update_tx);
        tokio::spawn(core.run(event_rx));
        (event_tx, update_rx)
    }

    #[tokio::test]
    async fn full_chapter_advances_on_finished_events() {
        let sink = RecordingSink::default();
        let (tx, mut rx) = spawn_core(sink.clone());
        // initial snapshot
        next_snapshot(&mut rx).await;

        tx.send(CoreEvent::Command(PlayerCommand::Open(chapter(112)))).await.unwrap();
        let snap = next_snapshot(&mut rx).await;
        // intro + 3 verses
        assert_eq!(snap.verses.len(), 4);

        tx.send(CoreEvent::Command(PlayerCommand::PlayFullChapter)).await.unwrap();
        assert!(next_snapshot(&mut rx).await.auto_advance);

        for _ in 0..3 {
            tx.send(CoreEvent::PlaybackFinished).await.unwrap();
            next_snapshot(&mut rx).await;
        }
        tx.send(CoreEvent::PlaybackFinished).await.unwrap();
        let done = next_snapshot(&mut rx).await;
        assert_eq!(done.current_index, 3);
        assert!(!done.auto_advance);
        assert_eq!(sink.loads.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn failures_are_reported_and_stop_auto_advance() {
        let (tx, mut rx) = spawn_core(RecordingSink::default());
        next_snapshot(&mut rx).await;

        tx.send(CoreEvent::Command(PlayerCommand::Open(chapter(113)))).await.unwrap();
        next_snapshot(&mut rx).await;
        tx.send(CoreEvent::Command(PlayerCommand::PlayFullChapter)).await.unwrap();
        next_snapshot(&mut rx).await;
        tx.send(CoreEvent::PlaybackFinished).await.unwrap(); // intro → verse 1
        next_snapshot(&mut rx).await;
        tx.send(CoreEvent::PlaybackFinished).await.unwrap(); // verse 1 → broken verse 2

        let mut error = None;
        let snap = loop {
            match rx.recv().await.unwrap() {
                CoreUpdate::Error(e) => error = Some(e),
                CoreUpdate::Snapshot(s) => break s,
                CoreUpdate::Busy(_) => {}
            }
        };
        assert_eq!(
            error.as_deref(),
            Some("Audio not available for Surah 113 verse 2. Tried 1 sources.")
        );
        assert!(!snap.auto_advance);
        assert!(snap.last_error.is_some());
    }

    fn spawn_stalled_core(
        sink: StalledSink,
    ) -> (mpsc::Sender<CoreEvent>, broadcast::Receiver<CoreUpdate>, tokio::task::JoinHandle<()>) {
        let (update_tx, update_rx) = broadcast::channel(64);
        let (event_tx, event_rx) = mpsc::channel(16);
        // long enough that only an abandoned lookup can finish the test in time
        let player = Player::new(sink, ThreeVerses, "ar.alafasy", Duration::from_secs(30));
        let handle = tokio::spawn(PlayerCore::new(player, None, vec![], update_tx).run(event_rx));
        (event_tx, update_rx, handle)
    }

    #[tokio::test]
    async fn close_abandons_a_stalled_lookup() {
        let sink = StalledSink::default();
        let (tx, mut rx, _handle) = spawn_stalled_core(sink.clone());
        next_snapshot(&mut rx).await;
        tx.send(CoreEvent::Command(PlayerCommand::Open(chapter(9)))).await.unwrap();
        assert!(next_snapshot(&mut rx).await.chapter.is_some());

        tx.send(CoreEvent::Command(PlayerCommand::PlayVerse(0))).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        let started = tokio::time::Instant::now();
        tx.send(CoreEvent::Command(PlayerCommand::Close)).await.unwrap();

        let closed = tokio::time::timeout(Duration::from_secs(1), async {
            loop {
                if next_snapshot(&mut rx).await.chapter.is_none() {
                    break;
                }
            }
        })
        .await;
        assert!(closed.is_ok(), "close still pending after {:?}", started.elapsed());
        assert!(*sink.stops.lock().unwrap() >= 2);
    }

    #[tokio::test]
    async fn newer_command_replaces_a_stalled_lookup() {
        let (tx, mut rx, _handle) = spawn_stalled_core(StalledSink::default());
        next_snapshot(&mut rx).await;
        tx.send(CoreEvent::Command(PlayerCommand::Open(chapter(9)))).await.unwrap();
        next_snapshot(&mut rx).await;

        tx.send(CoreEvent::Command(PlayerCommand::PlayVerse(0))).await.unwrap();
        tx.send(CoreEvent::PlaybackFinished).await.unwrap();
        tx.send(CoreEvent::Command(PlayerCommand::Open(chapter(1)))).await.unwrap();

        let opened = tokio::time::timeout(Duration::from_secs(1), async {
            loop {
                let snap = next_snapshot(&mut rx).await;
                if snap.chapter.as_ref().map(|c| c.number) == Some(1) {
                    return snap;
                }
            }
        })
        .await
        .expect("open should not wait for the stalled load");
        assert_eq!(opened.now_playing, None);
        assert!(!opened.auto_advance);
    }

    #[tokio::test]
    async fn shutdown_abandons_a_stalled_lookup() {
        let (tx, mut rx, handle) = spawn_stalled_core(StalledSink::default());
        next_snapshot(&mut rx).await;
        tx.send(CoreEvent::Command(PlayerCommand::Open(chapter(1)))).await.unwrap();
        next_snapshot(&mut rx).await;
        tx.send(CoreEvent::Command(PlayerCommand::PlayFullChapter)).await.unwrap();
        tx.send(CoreEvent::Shutdown).await.unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn loop_ends_when_ui_goes_away() {
        let (update_tx, _update_rx) = broadcast::channel(8);
        let (event_tx, event_rx) = mpsc::channel(4);
        let player = Player::new(RecordingSink::default(), ThreeVerses, "ed", Duration::from_secs(1));
        let handle = tokio::spawn(PlayerCore::new(player, Some(" ".into()), vec![], update_tx).run(event_rx));
        drop(event_tx);
        tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
    }
}
