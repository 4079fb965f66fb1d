use thiserror::Error;

/// Failures surfaced by the player, the catalog and the proxy.
///
/// Most variants are absorbed by a fallback chain before they reach a user;
/// only exhaustion (`SourceUnavailable`, `ProxyExhausted`) is shown.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// `target` names what was being played, e.g. "Surah 2".
    #[error("Audio not available for {target}. Tried {tried} sources.")]
    SourceUnavailable { target: String, tried: usize },

    #[error("unexpected metadata response: {0}")]
    MetadataShapeMismatch(String),

    #[error("verse {index} is not available")]
    VerseUnavailable { index: usize },

    #[error("stored favorites are unreadable: {0}")]
    PersistenceCorrupt(String),

    #[error("All audio sources failed for Surah {chapter}")]
    ProxyExhausted { chapter: u16 },

    #[error("transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for PlayerError {
    fn from(e: reqwest::Error) -> Self {
        PlayerError::Transport(e.to_string())
    }
}

impl From<std::io::Error> for PlayerError {
    fn from(e: std::io::Error) -> Self {
        PlayerError::Transport(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PlayerError>;
