use serde::{Deserialize, Serialize};

/// Number of chapters in the recited text.
pub const CHAPTER_COUNT: u16 = 114;

/// Path the proxy serves whole-chapter audio under.
pub const PROXY_AUDIO_PATH: &str = "/audio/surah";

/// CDN mirror used for a chapter's `mirror_audio_url`.
const CDN_MIRROR_BASE: &str = "https://cdn.islamic.network/quran/audio-surah";

pub fn is_valid_chapter(number: u16) -> bool {
    (1..=CHAPTER_COUNT).contains(&number)
}

/// Where a chapter was revealed, as reported by the metadata APIs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum RevelationPlace {
    Meccan,
    Medinan,
    #[default]
    Unknown,
}

impl RevelationPlace {
    /// Parses the loose spellings the APIs use ("makkah", "Meccan", "madinah", ...).
    pub fn parse(raw: &str) -> Self {
        let lower = raw.trim().to_lowercase();
        if lower.starts_with("mak") || lower.starts_with("mec") {
            RevelationPlace::Meccan
        } else if lower.starts_with("mad") || lower.starts_with("med") {
            RevelationPlace::Medinan
        } else {
            RevelationPlace::Unknown
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RevelationPlace::Meccan => "Meccan",
            RevelationPlace::Medinan => "Medinan",
            RevelationPlace::Unknown => "",
        }
    }
}

/// One of the 114 chapters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chapter {
    pub number: u16,
    /// Transliterated name, e.g. "Al-Fatiha".
    pub name: String,
    /// English meaning of the name, e.g. "The Opening".
    pub name_english: String,
    pub name_arabic: String,
    pub verse_count: u32,
    #[serde(default)]
    pub revelation_place: RevelationPlace,
    /// Proxy path serving the whole-chapter recording.
    pub audio_url: Option<String>,
    /// API descriptor whose first ayah carries an audio URL.
    pub alternate_audio_url: Option<String>,
    pub mirror_audio_url: Option<String>,
}

impl Chapter {
    /// Builds a chapter with the standard audio URLs filled in.
    ///
    /// `ayahs_endpoint` is the base of the per-chapter ayah API
    /// (e.g. `https://api.alquran.cloud/v1/surah`).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        number: u16,
        name: impl Into<String>,
        name_english: impl Into<String>,
        name_arabic: impl Into<String>,
        verse_count: u32,
        revelation_place: RevelationPlace,
        ayahs_endpoint: &str,
        edition: &str,
    ) -> Self {
        Self {
            number,
            name: name.into(),
            name_english: name_english.into(),
            name_arabic: name_arabic.into(),
            verse_count,
            revelation_place,
            audio_url: Some(format!("{}/{}", PROXY_AUDIO_PATH, number)),
            alternate_audio_url: Some(format!(
                "{}/{}/{}",
                ayahs_endpoint.trim_end_matches('/'),
                number,
                edition
            )),
            mirror_audio_url: Some(format!(
                "{}/{:03}/ar.alafasy.mp3",
                CDN_MIRROR_BASE, number
            )),
        }
    }
}

/// A single verse inside a playback sequence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Ayah {
    /// Position within the chapter; 0 only for the injected intro verse.
    pub index_in_chapter: u32,
    pub text: String,
    pub audio_url: Option<String>,
    /// Additional recordings of the same verse, tried after `audio_url`.
    #[serde(default)]
    pub secondary_audio_urls: Vec<String>,
    #[serde(default)]
    pub is_intro: bool,
}

impl Ayah {
    /// All audio URLs for this verse in preference order.
    pub fn audio_sources(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(1 + self.secondary_audio_urls.len());
        for url in self.audio_url.iter().chain(self.secondary_audio_urls.iter()) {
            if !url.is_empty() && !out.contains(url) {
                out.push(url.clone());
            }
        }
        out
    }

    pub fn has_audio(&self) -> bool {
        !self.audio_sources().is_empty()
    }
}

/// Persisted snapshot of a favourited chapter.
///
/// Field names match the storage format written by earlier versions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Favorite {
    pub number: u16,
    pub name: String,
    #[serde(default)]
    pub name_arabic: String,
    #[serde(rename = "verses_count", default)]
    pub verse_count: u32,
    #[serde(rename = "audioUrl", default)]
    pub audio_url: Option<String>,
}

impl From<&Chapter> for Favorite {
    fn from(c: &Chapter) -> Self {
        Self {
            number: c.number,
            name: c.name.clone(),
            name_arabic: c.name_arabic.clone(),
            verse_count: c.verse_count,
            audio_url: c.audio_url.clone(),
        }
    }
}

/// A recitation edition (reciter + audio source).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AudioEdition {
    pub identifier: String,
    pub display_name: String,
}

impl AudioEdition {
    pub fn new(identifier: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            display_name: display_name.into(),
        }
    }
}

/// Reciter name to show for the selected edition.
pub fn reciter_name<'a>(editions: &'a [AudioEdition], selected: &str) -> &'a str {
    editions
        .iter()
        .find(|e| e.identifier == selected)
        .map(|e| e.display_name.as_str())
        .unwrap_or("Mishari Al-Afasy")
}
