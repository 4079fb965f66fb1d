//! Ordered fallback over audio and metadata sources.
//!
//! Every fallback chain in the player goes through [`Prober`]: candidates are
//! tried strictly one at a time, in order, and the first success wins.
//! [`probe_in_order`] drives it with an async closure; [`resolve_and_play`]
//! drives it against a [`PlaybackSink`], which needs `&mut` access between
//! attempts.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::PlayerError;
use crate::model::Chapter;

/// Ordered list of candidates plus the failures collected so far.
pub struct Prober<C> {
    candidates: std::vec::IntoIter<C>,
    next_index: usize,
    last_error: Option<String>,
}

impl<C> Prober<C> {
    pub fn new(candidates: Vec<C>) -> Self {
        Self {
            candidates: candidates.into_iter(),
            next_index: 0,
            last_error: None,
        }
    }

    /// Next candidate to try, with its position in the original list.
    pub fn next_candidate(&mut self) -> Option<(usize, C)> {
        let c = self.candidates.next()?;
        let idx = self.next_index;
        self.next_index += 1;
        Some((idx, c))
    }

    pub fn record_failure(&mut self, index: usize, error: &anyhow::Error) {
        warn!("probe: candidate {} failed: {:#}", index, error);
        self.last_error = Some(format!("{:#}", error));
    }

    /// Number of candidates handed out so far.
    pub fn tried(&self) -> usize {
        self.next_index
    }

    pub fn exhausted(self) -> ProbeExhausted {
        ProbeExhausted {
            tried: self.next_index,
            last_error: self.last_error,
        }
    }
}

/// Successful probe result.
#[derive(Debug)]
pub struct Probed<T> {
    pub index: usize,
    pub value: T,
}

/// Every candidate failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeExhausted {
    pub tried: usize,
    pub last_error: Option<String>,
}

/// Try `attempt` on each candidate in order until one succeeds.
pub async fn probe_in_order<C, T, F, Fut>(
    candidates: Vec<C>,
    mut attempt: F,
) -> Result<Probed<T>, ProbeExhausted>
where
    F: FnMut(usize, C) -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let mut prober = Prober::new(candidates);
    while let Some((idx, candidate)) = prober.next_candidate() {
        match attempt(idx, candidate).await {
            Ok(value) => {
                debug!("probe: candidate {} succeeded", idx);
                return Ok(Probed { index: idx, value });
            }
            Err(e) => prober.record_failure(idx, &e),
        }
    }
    Err(prober.exhausted())
}

// ── client-side audio resolution ──────────────────────────────────────────────

/// One place a recording might be fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioCandidate {
    /// A URL the sink can load as is.
    Direct { url: String },
    /// A metadata descriptor whose first ayah names the audio URL.
    Api { name: String, url: String },
}

impl AudioCandidate {
    pub fn direct(url: impl Into<String>) -> Self {
        AudioCandidate::Direct { url: url.into() }
    }

    pub fn url(&self) -> &str {
        match self {
            AudioCandidate::Direct { url } | AudioCandidate::Api { url, .. } => url,
        }
    }
}

/// What the sink reports once a source is ready to play.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoadedMedia {
    pub duration_secs: Option<f64>,
}

impl LoadedMedia {
    /// A known duration of zero (or less) means an empty or broken response.
    pub fn is_playable(&self) -> bool {
        self.duration_secs.map_or(true, |d| d > 0.0)
    }
}

/// The platform media decoder.
#[async_trait]
pub trait PlaybackSink: Send {
    /// Point the decoder at `url` and wait until it is ready to play or fails.
    async fn load(&mut self, url: &str) -> anyhow::Result<LoadedMedia>;
    async fn play(&mut self) -> anyhow::Result<()>;
    async fn stop(&mut self) -> anyhow::Result<()>;
}

/// Turns an API descriptor URL into a playable audio URL.
#[async_trait]
pub trait DescriptorResolver: Send + Sync {
    async fn resolve_descriptor(&self, url: &str) -> anyhow::Result<String>;
}

/// Load candidates into `sink` one by one and start playing the first that
/// becomes ready within `timeout`. Returns the URL that is playing.
///
/// A candidate that times out is abandoned (its pending load is dropped)
/// before the next one starts, so only one load is ever in flight.
pub async fn resolve_and_play<S, R>(
    target: &str,
    candidates: Vec<AudioCandidate>,
    sink: &mut S,
    resolver: &R,
    timeout: Duration,
) -> Result<String, PlayerError>
where
    S: PlaybackSink + ?Sized,
    R: DescriptorResolver + ?Sized,
{
    info!("probe: resolving {} over {} candidates", target, candidates.len());
    let mut prober = Prober::new(candidates);
    while let Some((idx, candidate)) = prober.next_candidate() {
        debug!("probe: {} candidate {} {:?}", target, idx, candidate);
        let attempt = attempt_candidate(&candidate, sink, resolver);
        match tokio::time::timeout(timeout, attempt).await {
            Ok(Ok(url)) => {
                info!("probe: {} playing from {}", target, url);
                return Ok(url);
            }
            Ok(Err(e)) => prober.record_failure(idx, &e),
            Err(_) => prober.record_failure(
                idx,
                &anyhow::anyhow!("timed out after {:?} on {}", timeout, candidate.url()),
            ),
        }
    }
    let tried = prober.tried();
    tracing::error!("probe: all {} sources failed for {}", tried, target);
    Err(PlayerError::SourceUnavailable {
        target: target.to_string(),
        tried,
    })
}

async fn attempt_candidate<S, R>(
    candidate: &AudioCandidate,
    sink: &mut S,
    resolver: &R,
) -> anyhow::Result<String>
where
    S: PlaybackSink + ?Sized,
    R: DescriptorResolver + ?Sized,
{
    let url = match candidate {
        AudioCandidate::Direct { url } => url.clone(),
        AudioCandidate::Api { url, .. } => resolver.resolve_descriptor(url).await?,
    };
    let media = sink.load(&url).await?;
    if !media.is_playable() {
        anyhow::bail!("empty media from {}", url);
    }
    sink.play().await?;
    Ok(url)
}

// ── candidate lists ───────────────────────────────────────────────────────────

/// Substitute the zero-padded chapter number into a mirror template.
pub fn render_mirror(template: &str, chapter: u16) -> String {
    template.replace("{num}", &format!("{:03}", chapter))
}

/// Whole-chapter candidates in preference order: local proxy, API
/// descriptor, CDN mirror, then every configured mirror template.
///
/// `proxy_base` turns the chapter's relative proxy path into a full URL; with
/// no base the proxy candidate is skipped.
pub fn chapter_candidates(
    chapter: &Chapter,
    proxy_base: Option<&str>,
    mirrors: &[String],
) -> Vec<AudioCandidate> {
    let mut out: Vec<AudioCandidate> = Vec::new();
    let mut push = |c: AudioCandidate| {
        if !c.url().is_empty() && !out.iter().any(|o| o.url() == c.url()) {
            out.push(c);
        }
    };

    if let Some(path) = chapter.audio_url.as_deref() {
        if path.starts_with('/') {
            if let Some(base) = proxy_base.filter(|b| !b.is_empty()) {
                push(AudioCandidate::direct(format!(
                    "{}{}",
                    base.trim_end_matches('/'),
                    path
                )));
            }
        } else {
            push(AudioCandidate::direct(path));
        }
    }
    if let Some(api) = chapter.alternate_audio_url.as_deref() {
        push(AudioCandidate::Api {
            name: "alquran.cloud".to_string(),
            url: api.to_string(),
        });
    }
    if let Some(mirror) = chapter.mirror_audio_url.as_deref() {
        push(AudioCandidate::direct(mirror));
    }
    for template in mirrors {
        push(AudioCandidate::direct(render_mirror(template, chapter.number)));
    }
    out
}
