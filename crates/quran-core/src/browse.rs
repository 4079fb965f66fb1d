//! Filter, sort and paginate the chapter catalog.

use crate::model::Chapter;

/// Verse-count buckets offered as quick filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthFilter {
    #[default]
    All,
    /// 40 verses or fewer.
    Short,
    /// 41 to 100 verses.
    Medium,
    /// More than 100 verses.
    Long,
}

impl LengthFilter {
    pub fn matches(&self, verses: u32) -> bool {
        match self {
            LengthFilter::All => true,
            LengthFilter::Short => verses <= 40,
            LengthFilter::Medium => verses > 40 && verses <= 100,
            LengthFilter::Long => verses > 100,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            LengthFilter::All => LengthFilter::Short,
            LengthFilter::Short => LengthFilter::Medium,
            LengthFilter::Medium => LengthFilter::Long,
            LengthFilter::Long => LengthFilter::All,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LengthFilter::All => "all",
            LengthFilter::Short => "short",
            LengthFilter::Medium => "medium",
            LengthFilter::Long => "long",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Number,
    Name,
    VersesAsc,
    VersesDesc,
}

impl SortMode {
    pub fn next(&self) -> Self {
        match self {
            SortMode::Number => SortMode::Name,
            SortMode::Name => SortMode::VersesAsc,
            SortMode::VersesAsc => SortMode::VersesDesc,
            SortMode::VersesDesc => SortMode::Number,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortMode::Number => "number",
            SortMode::Name => "name",
            SortMode::VersesAsc => "verses ↑",
            SortMode::VersesDesc => "verses ↓",
        }
    }
}

/// Everything the chapter list can be narrowed or ordered by.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrowseQuery {
    pub search: String,
    pub length: LengthFilter,
    pub min_verses: Option<u32>,
    pub max_verses: Option<u32>,
    pub favorites_only: bool,
    pub sort: SortMode,
}

impl BrowseQuery {
    /// Select a length bucket; choosing the active one again resets to `All`.
    pub fn toggle_length(&mut self, length: LengthFilter) {
        self.length = if self.length == length && length != LengthFilter::All {
            LengthFilter::All
        } else {
            length
        };
    }

    /// Verse bounds with values below 1 raised to 1 and reversed bounds
    /// swapped.
    pub fn verse_range(&self) -> (Option<u32>, Option<u32>) {
        let min = self.min_verses.map(|v| v.max(1));
        let max = self.max_verses.map(|v| v.max(1));
        match (min, max) {
            (Some(lo), Some(hi)) if lo > hi => (Some(hi), Some(lo)),
            other => other,
        }
    }

    pub fn is_default(&self) -> bool {
        *self == BrowseQuery {
            sort: self.sort,
            ..Default::default()
        }
    }

    pub fn matches(&self, chapter: &Chapter, is_favorite: bool) -> bool {
        if self.favorites_only && !is_favorite {
            return false;
        }
        if !self.length.matches(chapter.verse_count) {
            return false;
        }
        let (min, max) = self.verse_range();
        if min.is_some_and(|m| chapter.verse_count < m) || max.is_some_and(|m| chapter.verse_count > m) {
            return false;
        }
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        chapter.name.to_lowercase().contains(&needle)
            || chapter.name_english.to_lowercase().contains(&needle)
            || chapter.name_arabic.contains(needle.as_str())
            || chapter.revelation_place.label().to_lowercase().contains(&needle)
            || chapter.number.to_string().contains(&needle)
    }

    /// Filter and sort `chapters`. `is_favorite` answers for a chapter number.
    pub fn apply<'a>(
        &self,
        chapters: &'a [Chapter],
        is_favorite: impl Fn(u16) -> bool,
    ) -> Vec<&'a Chapter> {
        let mut out: Vec<&Chapter> = chapters
            .iter()
            .filter(|c| self.matches(c, is_favorite(c.number)))
            .collect();
        match self.sort {
            SortMode::Number => out.sort_by_key(|c| c.number),
            SortMode::Name => out.sort_by(|a, b| {
                a.name
                    .to_lowercase()
                    .cmp(&b.name.to_lowercase())
                    .then(a.number.cmp(&b.number))
            }),
            SortMode::VersesAsc => out.sort_by_key(|c| (c.verse_count, c.number)),
            SortMode::VersesDesc => {
                out.sort_by(|a, b| b.verse_count.cmp(&a.verse_count).then(a.number.cmp(&b.number)))
            }
        }
        out
    }

    /// One-line description of the result set, e.g.
    /// `3 surahs matching "al" • Filters: short, favorites`.
    pub fn summary(&self, count: usize) -> String {
        let search = self.search.trim();
        let mut text = if search.is_empty() {
            format!("{} surahs available", count)
        } else {
            format!("{} surahs matching \"{}\"", count, search)
        };

        let mut filters: Vec<String> = Vec::new();
        if self.length != LengthFilter::All {
            filters.push(self.length.label().to_string());
        }
        match self.verse_range() {
            (Some(lo), Some(hi)) => filters.push(format!("{}-{} verses", lo, hi)),
            (Some(lo), None) => filters.push(format!("≥{} verses", lo)),
            (None, Some(hi)) => filters.push(format!("≤{} verses", hi)),
            (None, None) => {}
        }
        if self.favorites_only {
            filters.push("favorites".to_string());
        }
        if !filters.is_empty() {
            text.push_str(" • Filters: ");
            text.push_str(&filters.join(", "));
        }
        text
    }
}

/// Parse a verse range typed as `min-max`, `min-` or `-max`.
pub fn parse_verse_range(input: &str) -> Option<(Option<u32>, Option<u32>)> {
    let input = input.trim();
    if input.is_empty() {
        return Some((None, None));
    }
    let (lo, hi) = input.split_once('-').unwrap_or((input, input));
    let parse = |s: &str| -> Option<Option<u32>> {
        let s = s.trim();
        if s.is_empty() {
            Some(None)
        } else {
            s.parse::<u32>().ok().map(Some)
        }
    };
    Some((parse(lo)?, parse(hi)?))
}

/// A page of results, 1-based.
#[derive(Debug, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub page: usize,
    pub pages: usize,
}

pub fn page_count(len: usize, per_page: usize) -> usize {
    if per_page == 0 {
        return 0;
    }
    len.div_ceil(per_page)
}

/// Slice out page `page` (clamped into range) of `items`.
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> Page<'_, T> {
    let pages = page_count(items.len(), per_page);
    if pages == 0 {
        return Page {
            items: &[],
            page: 1,
            pages: 0,
        };
    }
    let page = page.clamp(1, pages);
    let start = (page - 1) * per_page;
    let end = (start + per_page).min(items.len());
    Page {
        items: &items[start..end],
        page,
        pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::model::RevelationPlace;

    fn catalog() -> Catalog {
        Catalog::builtin("https://api.alquran.cloud/v1/surah", "ar.alafasy")
    }

    fn numbers(chapters: &[&Chapter]) -> Vec<u16> {
        chapters.iter().map(|c| c.number).collect()
    }

    #[test]
    fn search_matches_names_and_numbers() {
        let cat = catalog();
        let q = BrowseQuery {
            search: "BAQ".into(),
            ..Default::default()
        };
        assert_eq!(numbers(&q.apply(cat.chapters(), |_| false)), vec![2]);

        let q = BrowseQuery {
            search: "الناس".into(),
            ..Default::default()
        };
        assert_eq!(numbers(&q.apply(cat.chapters(), |_| false)), vec![114]);

        let q = BrowseQuery {
            search: "11".into(),
            ..Default::default()
        };
        let found = numbers(&q.apply(cat.chapters(), |_| false));
        assert!(found.contains(&11) && found.contains(&110) && found.contains(&114));
    }

    #[test]
    fn search_matches_revelation_place() {
        let chapters = vec![
            Chapter::new(1, "A", "", "", 7, RevelationPlace::Meccan, "x", "e"),
            Chapter::new(2, "B", "", "", 286, RevelationPlace::Medinan, "x", "e"),
        ];
        let q = BrowseQuery {
            search: "medin".into(),
            ..Default::default()
        };
        assert_eq!(numbers(&q.apply(&chapters, |_| false)), vec![2]);
    }

    #[test]
    fn length_buckets() {
        assert!(LengthFilter::Short.matches(40));
        assert!(!LengthFilter::Short.matches(41));
        assert!(LengthFilter::Medium.matches(41));
        assert!(LengthFilter::Medium.matches(100));
        assert!(LengthFilter::Long.matches(101));

        let cat = catalog();
        let q = BrowseQuery {
            length: LengthFilter::Long,
            ..Default::default()
        };
        assert!(q.apply(cat.chapters(), |_| false).iter().all(|c| c.verse_count > 100));
    }

    #[test]
    fn selecting_active_length_toggles_back_to_all() {
        let mut q = BrowseQuery::default();
        q.toggle_length(LengthFilter::Short);
        assert_eq!(q.length, LengthFilter::Short);
        q.toggle_length(LengthFilter::Short);
        assert_eq!(q.length, LengthFilter::All);
        q.toggle_length(LengthFilter::Medium);
        q.toggle_length(LengthFilter::Long);
        assert_eq!(q.length, LengthFilter::Long);
    }

    #[test]
    fn reversed_verse_range_is_swapped() {
        let cat = catalog();
        let reversed = BrowseQuery {
            min_verses: Some(100),
            max_verses: Some(10),
            ..Default::default()
        };
        let ordered = BrowseQuery {
            min_verses: Some(10),
            max_verses: Some(100),
            ..Default::default()
        };
        assert_eq!(reversed.verse_range(), (Some(10), Some(100)));
        assert_eq!(
            numbers(&reversed.apply(cat.chapters(), |_| false)),
            numbers(&ordered.apply(cat.chapters(), |_| false))
        );
    }

    #[test]
    fn zero_bounds_clamp_to_one() {
        let q = BrowseQuery {
            min_verses: Some(0),
            max_verses: Some(0),
            ..Default::default()
        };
        assert_eq!(q.verse_range(), (Some(1), Some(1)));
    }

    #[test]
    fn favorites_only() {
        let cat = catalog();
        let q = BrowseQuery {
            favorites_only: true,
            ..Default::default()
        };
        let found = numbers(&q.apply(cat.chapters(), |n| n == 36 || n == 67));
        assert_eq!(found, vec![36, 67]);
    }

    #[test]
    fn sort_modes() {
        let cat = catalog();
        let mut q = BrowseQuery {
            sort: SortMode::VersesDesc,
            ..Default::default()
        };
        assert_eq!(q.apply(cat.chapters(), |_| false)[0].number, 2);

        q.sort = SortMode::VersesAsc;
        let asc = q.apply(cat.chapters(), |_| false);
        assert_eq!(asc[0].verse_count, 3);
        assert!(asc.windows(2).all(|w| w[0].verse_count <= w[1].verse_count));

        q.sort = SortMode::Name;
        let by_name = q.apply(cat.chapters(), |_| false);
        assert!(by_name
            .windows(2)
            .all(|w| w[0].name.to_lowercase() <= w[1].name.to_lowercase()));
    }

    #[test]
    fn pagination() {
        let items: Vec<u32> = (1..=114).collect();
        assert_eq!(page_count(items.len(), 12), 10);

        let first = paginate(&items, 1, 12);
        assert_eq!(first.items, &items[0..12]);
        let last = paginate(&items, 10, 12);
        assert_eq!(last.items, &items[108..114]);
        assert_eq!(paginate(&items, 99, 12).page, 10);
        assert_eq!(paginate(&items, 0, 12).page, 1);

        let empty: Vec<u32> = vec![];
        let page = paginate(&empty, 3, 12);
        assert_eq!(page.pages, 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn summary_lists_active_filters() {
        let q = BrowseQuery {
            search: "al".into(),
            length: LengthFilter::Short,
            favorites_only: true,
            ..Default::default()
        };
        assert_eq!(
            q.summary(3),
            "3 surahs matching \"al\" • Filters: short, favorites"
        );
        assert_eq!(BrowseQuery::default().summary(114), "114 surahs available");
    }

    #[test]
    fn verse_range_input() {
        assert_eq!(parse_verse_range("10-50"), Some((Some(10), Some(50))));
        assert_eq!(parse_verse_range("10-"), Some((Some(10), None)));
        assert_eq!(parse_verse_range(" -50"), Some((None, Some(50))));
        assert_eq!(parse_verse_range("7"), Some((Some(7), Some(7))));
        assert_eq!(parse_verse_range(""), Some((None, None)));
        assert_eq!(parse_verse_range("a-b"), None);
    }
}
