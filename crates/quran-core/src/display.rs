//! Display text for verses.
//!
//! Many editions repeat the intro recitation as a literal prefix of a
//! chapter's first verse. When the intro was injected as its own verse the
//! prefix is hidden from the first verse's displayed text. Stored text and
//! audio are never touched.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

use crate::model::Ayah;

fn diacritics() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new("[\u{0610}-\u{061A}\u{064B}-\u{065F}\u{06D6}-\u{06ED}]")
            .expect("diacritic class is a valid pattern")
    })
}

/// Strip Arabic diacritics, collapse whitespace and fold alef wasla into a
/// plain alef, for prefix comparison only.
pub fn normalize_arabic(text: &str) -> String {
    diacritics()
        .replace_all(text, "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('\u{0671}', "\u{0627}")
}

/// Remove a leading copy of `intro` from `text`, comparing normalized forms.
///
/// Returns `text` unchanged when it does not start with the intro.
pub fn strip_intro_prefix<'a>(text: &'a str, intro: &str) -> Cow<'a, str> {
    let norm_intro = normalize_arabic(intro);
    if norm_intro.is_empty() || !normalize_arabic(text).starts_with(&norm_intro) {
        return Cow::Borrowed(text);
    }

    let trimmed_intro = intro.trim();
    if let Some(rest) = text.trim_start().strip_prefix(trimmed_intro) {
        return Cow::Owned(rest.trim().to_string());
    }

    // Same words with different marks: drop as many leading words as match.
    let intro_words: Vec<String> = norm_intro.split(' ').map(str::to_string).collect();
    let words: Vec<&str> = text.split_whitespace().collect();
    let matched = words
        .iter()
        .zip(intro_words.iter())
        .take_while(|(w, iw)| normalize_arabic(w) == **iw)
        .count();
    Cow::Owned(words[matched..].join(" ").trim().to_string())
}

/// Text to show for `ayahs[index]`.
pub fn display_text(ayahs: &[Ayah], index: usize) -> Cow<'_, str> {
    let Some(ayah) = ayahs.get(index) else {
        return Cow::Borrowed("");
    };
    match ayahs.first() {
        Some(intro) if index == 1 && intro.is_intro => strip_intro_prefix(&ayah.text, &intro.text),
        _ => Cow::Borrowed(ayah.text.as_str()),
    }
}

pub fn verse_label(ayah: &Ayah) -> String {
    if ayah.is_intro {
        "Basmala".to_string()
    } else {
        format!("Verse {}", ayah.index_in_chapter)
    }
}
