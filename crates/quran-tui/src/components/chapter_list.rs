//! ChapterList: left pane: the catalog filtered, sorted and paginated.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

use quran_core::browse::{page_count, paginate, parse_verse_range, BrowseQuery, LengthFilter};
use quran_core::model::Chapter;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{
        style_muted, C_ARABIC, C_FAVORITE, C_MUTED, C_PLACE, C_PLAYING, C_PRIMARY, C_SECONDARY,
        C_SELECTION_BG,
    },
    widgets::{
        filter_input::{FilterInput, InputEvent},
        pane_chrome::{pane_chrome, Badge},
    },
};

pub struct ChapterList {
    query: BrowseQuery,
    /// 1-based.
    page: usize,
    /// Row within the current page.
    selected: usize,
    search: FilterInput,
    range: FilterInput,
}

impl ChapterList {
    pub fn new() -> Self {
        Self {
            query: BrowseQuery::default(),
            page: 1,
            selected: 0,
            search: FilterInput::new("/", "name, meaning, number…"),
            range: FilterInput::new("verses", "min-max, e.g. 10-50"),
        }
    }

    pub fn query(&self) -> &BrowseQuery {
        &self.query
    }

    fn matching<'a>(&self, state: &'a AppState) -> Vec<&'a Chapter> {
        self.query
            .apply(state.catalog.chapters(), |n| state.is_favorite(n))
    }

    fn current_page<'a>(&self, state: &'a AppState) -> (Vec<&'a Chapter>, usize, usize) {
        let all = self.matching(state);
        let page = paginate(&all, self.page, state.items_per_page);
        (page.items.to_vec(), page.page, page.pages)
    }

    pub fn selected_chapter<'a>(&self, state: &'a AppState) -> Option<&'a Chapter> {
        let (items, _, _) = self.current_page(state);
        items.get(self.selected.min(items.len().saturating_sub(1))).copied()
    }

    fn restart(&mut self) {
        self.page = 1;
        self.selected = 0;
    }

    fn move_page(&mut self, delta: isize, state: &AppState) {
        let pages = page_count(self.matching(state).len(), state.items_per_page).max(1);
        let page = (self.page as isize + delta).clamp(1, pages as isize) as usize;
        if page != self.page {
            self.page = page;
            self.selected = 0;
        }
    }

    fn move_selection(&mut self, delta: isize, state: &AppState) {
        let (items, _, _) = self.current_page(state);
        if items.is_empty() {
            return;
        }
        let last = items.len() as isize - 1;
        let next = self.selected as isize + delta;
        if next < 0 && self.page > 1 {
            self.move_page(-1, state);
            self.selected = state.items_per_page - 1;
        } else if next > last && self.page < page_count(self.matching(state).len(), state.items_per_page) {
            self.move_page(1, state);
        } else {
            self.selected = next.clamp(0, last) as usize;
        }
    }

    /// Move page and selection onto `number` if it is in the result set.
    fn reveal(&mut self, number: u16, state: &AppState) {
        if let Some(pos) = self.matching(state).iter().position(|c| c.number == number) {
            self.page = pos / state.items_per_page + 1;
            self.selected = pos % state.items_per_page;
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if self.search.is_active() {
            return match self.search.handle_key(key) {
                InputEvent::Changed(text) => {
                    self.query.search = text;
                    self.restart();
                    vec![]
                }
                InputEvent::Confirmed(_) => vec![Action::InputMode(false)],
                InputEvent::Cancelled => {
                    self.query.search.clear();
                    self.restart();
                    vec![Action::InputMode(false)]
                }
            };
        }
        match self.range.handle_key(key) {
            InputEvent::Changed(_) => vec![],
            InputEvent::Cancelled => vec![Action::InputMode(false)],
            InputEvent::Confirmed(text) => match parse_verse_range(&text) {
                Some((min, max)) => {
                    self.query.min_verses = min;
                    self.query.max_verses = max;
                    self.restart();
                    vec![Action::InputMode(false)]
                }
                None => vec![
                    Action::InputMode(false),
                    Action::Notify(format!("Not a verse range: {}", text.trim())),
                ],
            },
        }
    }

    fn render_row<'a>(chapter: &'a Chapter, selected: bool, state: &AppState) -> ListItem<'a> {
        let is_open = state.open_chapter() == Some(chapter.number);
        let marker = if state.is_favorite(chapter.number) { "★" } else { " " };
        let name_style = match (is_open, selected) {
            (true, _) => Style::default().fg(C_PLAYING).add_modifier(Modifier::BOLD),
            (false, true) => Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            (false, false) => Style::default().fg(C_SECONDARY),
        };

        let mut spans = vec![
            Span::styled(format!("{} ", marker), Style::default().fg(C_FAVORITE)),
            Span::styled(format!("{:>3} ", chapter.number), style_muted()),
            Span::styled(chapter.name.clone(), name_style),
        ];
        if !chapter.name_english.is_empty() && chapter.name_english != chapter.name {
            spans.push(Span::styled(
                format!("  {}", chapter.name_english),
                Style::default().fg(C_MUTED),
            ));
        }
        spans.push(Span::styled(
            format!("  {} verses", chapter.verse_count),
            Style::default().fg(C_SECONDARY),
        ));
        let place = chapter.revelation_place.label();
        if !place.is_empty() {
            spans.push(Span::styled(format!("  {}", place), Style::default().fg(C_PLACE)));
        }
        if !chapter.name_arabic.is_empty() {
            spans.push(Span::styled(
                format!("  {}", chapter.name_arabic),
                Style::default().fg(C_ARABIC),
            ));
        }

        let item = ListItem::new(Line::from(spans));
        if selected {
            item.style(Style::default().bg(C_SELECTION_BG))
        } else {
            item
        }
    }
}

impl Default for ChapterList {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for ChapterList {
    fn id(&self) -> ComponentId {
        ComponentId::ChapterList
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        if self.search.is_active() || self.range.is_active() {
            return self.handle_input_key(key);
        }

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1, state),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1, state),
            KeyCode::PageUp | KeyCode::Left => self.move_page(-1, state),
            KeyCode::PageDown | KeyCode::Right => self.move_page(1, state),
            KeyCode::Home | KeyCode::Char('g') => self.restart(),
            KeyCode::End | KeyCode::Char('G') => {
                let total = self.matching(state).len();
                if total > 0 {
                    self.page = page_count(total, state.items_per_page);
                    self.selected = (total - 1) % state.items_per_page;
                }
            }
            KeyCode::Enter => {
                if let Some(c) = self.selected_chapter(state) {
                    return vec![
                        Action::OpenChapter(c.number),
                        Action::FocusPane(ComponentId::VersePanel),
                    ];
                }
            }
            KeyCode::Char('/') => {
                self.search.set_value(&self.query.search);
                self.search.activate();
                return vec![Action::InputMode(true)];
            }
            KeyCode::Char('m') => {
                let current = match self.query.verse_range() {
                    (None, None) => String::new(),
                    (lo, hi) => format!(
                        "{}-{}",
                        lo.map(|v| v.to_string()).unwrap_or_default(),
                        hi.map(|v| v.to_string()).unwrap_or_default()
                    ),
                };
                self.range.set_value(&current);
                self.range.activate();
                return vec![Action::InputMode(true)];
            }
            KeyCode::Char('l') => {
                self.query.length = self.query.length.next();
                self.restart();
            }
            KeyCode::Char(c @ ('S' | 'M' | 'L')) => {
                self.query.toggle_length(match c {
                    'S' => LengthFilter::Short,
                    'M' => LengthFilter::Medium,
                    _ => LengthFilter::Long,
                });
                self.restart();
            }
            KeyCode::Char('F') => {
                self.query.favorites_only = !self.query.favorites_only;
                self.restart();
            }
            KeyCode::Char('s') => {
                self.query.sort = self.query.sort.next();
                self.restart();
            }
            KeyCode::Char('r') => {
                self.query = BrowseQuery::default();
                self.search.clear();
                self.range.clear();
                self.restart();
            }
            KeyCode::Char('f') => {
                if let Some(c) = self.selected_chapter(state) {
                    return vec![Action::ToggleFavorite(c.number)];
                }
            }
            _ => {}
        }
        vec![]
    }

    fn on_action(&mut self, action: &Action, state: &AppState) {
        if let Action::OpenChapter(number) = action {
            self.reveal(*number, state);
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let all = self.matching(state);
        let page = paginate(&all, self.page, state.items_per_page);
        self.page = page.page;
        if !page.items.is_empty() {
            self.selected = self.selected.min(page.items.len() - 1);
        }

        let badge = (page.pages > 1).then(|| Badge {
            text: format!("{}/{}", page.page, page.pages),
            color: C_SECONDARY,
        });
        let block = pane_chrome("surahs", Some('1'), focused, badge);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0), Constraint::Length(1)])
            .split(inner);

        let mut summary = self.query.summary(all.len());
        if self.query.sort != Default::default() {
            summary.push_str(&format!(" • sorted by {}", self.query.sort.label()));
        }
        frame.render_widget(
            Paragraph::new(Span::styled(summary, Style::default().fg(C_SECONDARY))),
            rows[0],
        );

        if page.items.is_empty() {
            let msg = if self.query.is_default() {
                "  no surahs loaded"
            } else {
                "  no surahs match the current filters (r resets)"
            };
            frame.render_widget(Paragraph::new(Span::styled(msg, style_muted())), rows[1]);
        } else {
            let items: Vec<ListItem> = page
                .items
                .iter()
                .enumerate()
                .map(|(i, c)| Self::render_row(c, i == self.selected, state))
                .collect();
            frame.render_widget(List::new(items), rows[1]);
        }

        if self.search.is_active() {
            self.search.draw(frame, rows[2]);
        } else if self.range.is_active() {
            self.range.draw(frame, rows[2]);
        }
    }
}
