//! VersePanel: right pane: the open chapter's verses and playback keys.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use quran_core::player::{NowPlaying, VerseView};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{
        style_muted, C_ACCENT, C_ARABIC, C_ERROR, C_PLAYING, C_PRIMARY, C_SECONDARY,
        C_SELECTION_BG,
    },
    widgets::pane_chrome::{pane_chrome, Badge},
};

/// Greedy word wrap by display width. A word wider than `width` gets its
/// own line.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let needed = if line.is_empty() {
            word.width()
        } else {
            line.width() + 1 + word.width()
        };
        if needed > width && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}

#[derive(Default)]
pub struct VersePanel {
    selected: usize,
    /// First verse drawn.
    offset: usize,
    chapter: Option<u16>,
    following: Option<usize>,
}

impl VersePanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Follow the player: reset on a new chapter, track the playing verse.
    pub fn sync(&mut self, state: &AppState) {
        let chapter = state.open_chapter();
        if chapter != self.chapter {
            self.chapter = chapter;
            self.selected = 0;
            self.offset = 0;
            self.following = None;
        }
        let playing = match state.player.now_playing {
            Some(NowPlaying::Verse(i)) => Some(i),
            _ => None,
        };
        if let Some(i) = playing.filter(|i| Some(*i) != self.following) {
            self.selected = i;
        }
        self.following = playing;
        self.selected = self.selected.min(state.player.verses.len().saturating_sub(1));
    }

    fn verse_item(verse: &VerseView, index: usize, selected: bool, state: &AppState, width: usize) -> ListItem<'static> {
        let playing = state.player.now_playing == Some(NowPlaying::Verse(index));
        let current = state.player.current_index == index && state.player.now_playing.is_some();
        let (marker, marker_color) = if playing {
            ("▶ ", C_PLAYING)
        } else if current {
            ("· ", C_ACCENT)
        } else {
            ("  ", C_SECONDARY)
        };
        let label_style = if playing {
            Style::default().fg(C_PLAYING).add_modifier(Modifier::BOLD)
        } else if selected {
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(C_SECONDARY)
        };

        let mut header = vec![
            Span::styled(marker, Style::default().fg(marker_color)),
            Span::styled(verse.label.clone(), label_style),
        ];
        if !verse.has_audio {
            header.push(Span::styled("  no audio", style_muted()));
        }

        let mut lines = vec![Line::from(header)];
        for l in wrap_text(&verse.text, width.saturating_sub(4)) {
            lines.push(Line::from(Span::styled(format!("  {}", l), Style::default().fg(C_ARABIC))));
        }
        let item = ListItem::new(lines);
        if selected {
            item.style(Style::default().bg(C_SELECTION_BG))
        } else {
            item
        }
    }

    fn playback_keys(&self, key: KeyCode, state: &AppState) -> Option<Vec<Action>> {
        let action = match key {
            KeyCode::Enter | KeyCode::Char('p') => Action::PlayVerse(self.selected),
            KeyCode::Char('a') => Action::PlayFullChapter,
            KeyCode::Char('n') => Action::NextVerse,
            KeyCode::Char('b') => Action::PreviousVerse,
            KeyCode::Char('N') => Action::OpenNextChapter,
            KeyCode::Char('B') => Action::OpenPreviousChapter,
            KeyCode::Char('c') => Action::PlayChapterRecording,
            KeyCode::Char('e') => Action::CycleEdition,
            _ => return None,
        };
        if state.player.chapter.is_none() {
            return Some(vec![Action::Notify("Open a surah first".to_string())]);
        }
        Some(vec![action])
    }
}

impl Component for VersePanel {
    fn id(&self) -> ComponentId {
        ComponentId::VersePanel
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let last = state.player.verses.len().saturating_sub(1);
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => self.selected = (self.selected + 1).min(last),
            KeyCode::PageUp => self.selected = self.selected.saturating_sub(10),
            KeyCode::PageDown => self.selected = (self.selected + 10).min(last),
            KeyCode::Home | KeyCode::Char('g') => self.selected = 0,
            KeyCode::End | KeyCode::Char('G') => self.selected = last,
            KeyCode::Char('x') | KeyCode::Esc => {
                return vec![Action::ClosePlayer, Action::FocusPane(ComponentId::ChapterList)];
            }
            code => {
                if let Some(actions) = self.playback_keys(code, state) {
                    return actions;
                }
            }
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let snapshot = &state.player;
        let title = match snapshot.chapter.as_ref() {
            Some(c) => format!("Surah {} · {}", c.number, c.name),
            None => "verses".to_string(),
        };
        let badge = if snapshot.auto_advance {
            Some(Badge {
                text: "AUTO".to_string(),
                color: C_PLAYING,
            })
        } else if !snapshot.verses.is_empty() {
            Some(Badge {
                text: format!("{}/{}", self.selected + 1, snapshot.verses.len()),
                color: C_SECONDARY,
            })
        } else {
            None
        };
        let block = pane_chrome(&title, Some('2'), focused, badge);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0), Constraint::Length(1)])
            .split(inner);

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("reciter ", style_muted()),
                Span::styled(state.reciter().to_string(), Style::default().fg(C_PRIMARY)),
                Span::styled(format!("  ({})", snapshot.edition), style_muted()),
            ])),
            rows[0],
        );

        if let Some(err) = snapshot.last_error.as_deref() {
            frame.render_widget(
                Paragraph::new(Span::styled(err.to_string(), Style::default().fg(C_ERROR))),
                rows[2],
            );
        }

        if snapshot.chapter.is_none() {
            frame.render_widget(
                Paragraph::new(Span::styled("  open a surah from the list (Enter)", style_muted())),
                rows[1],
            );
            return;
        }

        let width = rows[1].width as usize;
        let height = rows[1].height as usize;
        let heights: Vec<usize> = snapshot
            .verses
            .iter()
            .map(|v| 1 + wrap_text(&v.text, width.saturating_sub(4)).len())
            .collect();

        // keep the selected verse on screen
        self.selected = self.selected.min(heights.len().saturating_sub(1));
        if self.selected < self.offset {
            self.offset = self.selected;
        }
        while self.offset < self.selected
            && heights[self.offset..=self.selected].iter().sum::<usize>() > height
        {
            self.offset += 1;
        }

        let mut used = 0;
        let mut items = Vec::new();
        for (i, verse) in snapshot.verses.iter().enumerate().skip(self.offset) {
            if used >= height {
                break;
            }
            used += heights[i];
            items.push(Self::verse_item(verse, i, i == self.selected, state, width));
        }
        frame.render_widget(List::new(items), rows[1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quran_core::catalog::Catalog;
    use quran_core::model::{Chapter, RevelationPlace};
    use quran_core::player::PlayerSnapshot;
    use ratatui::crossterm::event::KeyModifiers;
    use std::sync::Arc;

    fn state_with(snapshot: PlayerSnapshot) -> AppState {
        let mut s = AppState::new(Catalog::builtin("https://api/surah", "ed"), vec![], "ed", 12);
        s.player = Arc::new(snapshot);
        s
    }

    fn open(now_playing: Option<NowPlaying>) -> PlayerSnapshot {
        PlayerSnapshot {
            chapter: Some(Chapter::new(112, "Al-Ikhlas", "", "", 4, RevelationPlace::Unknown, "https://api", "ed")),
            verses: (0..5)
                .map(|i| VerseView {
                    label: format!("Verse {}", i),
                    text: "قل هو الله أحد".to_string(),
                    has_audio: true,
                })
                .collect(),
            now_playing,
            ..Default::default()
        }
    }

    fn press(panel: &mut VersePanel, state: &AppState, code: KeyCode) -> Vec<Action> {
        panel.handle_key(KeyEvent::new(code, KeyModifiers::NONE), state)
    }

    #[test]
    fn wraps_on_display_width() {
        assert_eq!(wrap_text("aa bb cc", 5), vec!["aa bb", "cc"]);
        assert_eq!(wrap_text("", 5), vec![""]);
        assert_eq!(wrap_text("abcdefgh ij", 4), vec!["abcdefgh", "ij"]);
    }

    #[test]
    fn playback_keys_need_an_open_chapter() {
        let empty = state_with(PlayerSnapshot::default());
        let mut panel = VersePanel::new();
        assert!(matches!(
            press(&mut panel, &empty, KeyCode::Char('a')).as_slice(),
            [Action::Notify(_)]
        ));

        let s = state_with(open(None));
        press(&mut panel, &s, KeyCode::Down);
        press(&mut panel, &s, KeyCode::Down);
        assert_eq!(press(&mut panel, &s, KeyCode::Enter), vec![Action::PlayVerse(2)]);
        assert_eq!(press(&mut panel, &s, KeyCode::Char('N')), vec![Action::OpenNextChapter]);
        assert_eq!(
            press(&mut panel, &s, KeyCode::Esc),
            vec![Action::ClosePlayer, Action::FocusPane(ComponentId::ChapterList)]
        );
    }

    #[test]
    fn selection_follows_the_playing_verse() {
        let mut panel = VersePanel::new();
        panel.sync(&state_with(open(Some(NowPlaying::Verse(3)))));
        assert_eq!(panel.selected, 3);

        // user moves away; same verse still playing → stay put
        let s = state_with(open(Some(NowPlaying::Verse(3))));
        press(&mut panel, &s, KeyCode::Up);
        panel.sync(&s);
        assert_eq!(panel.selected, 2);

        panel.sync(&state_with(open(Some(NowPlaying::Verse(4)))));
        assert_eq!(panel.selected, 4);

        panel.sync(&state_with(PlayerSnapshot::default()));
        assert_eq!(panel.selected, 0);
    }
}
