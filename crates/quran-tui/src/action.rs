//! Everything a key press can ask the app to do.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentId {
    ChapterList,
    VersePanel,
    FavoritesOverlay,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ── Chapters ─────────────────────────────────────────────────────────────
    OpenChapter(u16),
    OpenNextChapter,
    OpenPreviousChapter,
    ToggleFavorite(u16),
    RemoveFavorite(u16),
    ClearFavorites,

    // ── Playback ─────────────────────────────────────────────────────────────
    PlayVerse(usize),
    PlayFullChapter,
    NextVerse,
    PreviousVerse,
    PlayChapterRecording,
    CycleEdition,
    ClosePlayer,

    // ── UI ───────────────────────────────────────────────────────────────────
    FocusNext,
    FocusPane(ComponentId),
    ToggleFavoritesOverlay,
    /// A text input took or released the keyboard.
    InputMode(bool),
    Notify(String),
    Quit,
}
