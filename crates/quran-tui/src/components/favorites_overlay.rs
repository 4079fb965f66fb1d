//! Favorites popup: every saved chapter in the order it was added.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, List, ListItem, Paragraph},
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{style_muted, C_ARABIC, C_BG, C_FAVORITE, C_PRIMARY, C_SECONDARY, C_SELECTION_BG},
    widgets::pane_chrome::{pane_chrome, Badge},
};

#[derive(Default)]
pub struct FavoritesOverlay {
    selected: usize,
}

impl FavoritesOverlay {
    pub fn new() -> Self {
        Self::default()
    }
}

/// `percent_x` by `height` rectangle centred in `area`.
fn centered(area: Rect, percent_x: u16, height: u16) -> Rect {
    let width = (area.width * percent_x / 100).max(20).min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

impl Component for FavoritesOverlay {
    fn id(&self) -> ComponentId {
        ComponentId::FavoritesOverlay
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let last = state.favorites.len().saturating_sub(1);
        self.selected = self.selected.min(last);
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => self.selected = (self.selected + 1).min(last),
            KeyCode::Esc | KeyCode::Char('v') => return vec![Action::ToggleFavoritesOverlay],
            KeyCode::Enter => {
                if let Some(f) = state.favorites.get(self.selected) {
                    return vec![
                        Action::ToggleFavoritesOverlay,
                        Action::OpenChapter(f.number),
                        Action::FocusPane(ComponentId::VersePanel),
                    ];
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(f) = state.favorites.get(self.selected) {
                    return vec![Action::RemoveFavorite(f.number)];
                }
            }
            KeyCode::Char('C') if !state.favorites.is_empty() => return vec![Action::ClearFavorites],
            _ => {}
        }
        vec![]
    }

    fn on_action(&mut self, action: &Action, state: &AppState) {
        match action {
            Action::RemoveFavorite(_) => {
                self.selected = self.selected.min(state.favorites.len().saturating_sub(2));
            }
            Action::ClearFavorites => self.selected = 0,
            _ => {}
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let popup = centered(area, 60, state.favorites.len().max(1) as u16 + 2);
        frame.render_widget(Clear, popup);
        let block = pane_chrome(
            "favorites",
            None,
            focused,
            Some(Badge {
                text: state.favorites.len().to_string(),
                color: C_FAVORITE,
            }),
        )
        .style(Style::default().bg(C_BG));
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        if state.favorites.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled("  No favorite surahs yet (f adds one)", style_muted())),
                inner,
            );
            return;
        }

        let items: Vec<ListItem> = state
            .favorites
            .iter()
            .enumerate()
            .map(|(i, f)| {
                let selected = i == self.selected;
                let name_style = if selected {
                    Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(C_SECONDARY)
                };
                let item = ListItem::new(Line::from(vec![
                    Span::styled("★ ", Style::default().fg(C_FAVORITE)),
                    Span::styled(format!("{:>3} ", f.number), style_muted()),
                    Span::styled(f.name.clone(), name_style),
                    Span::styled(format!("  {}", f.name_arabic), Style::default().fg(C_ARABIC)),
                    Span::styled(format!("  {} verses", f.verse_count), style_muted()),
                ]));
                if selected {
                    item.style(Style::default().bg(C_SELECTION_BG))
                } else {
                    item
                }
            })
            .collect();
        frame.render_widget(List::new(items), inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quran_core::catalog::Catalog;
    use quran_core::model::Favorite;
    use ratatui::crossterm::event::KeyModifiers;

    fn press(o: &mut FavoritesOverlay, s: &AppState, code: KeyCode) -> Vec<Action> {
        o.handle_key(KeyEvent::new(code, KeyModifiers::NONE), s)
    }

    #[test]
    fn open_and_remove_selected_favorite() {
        let mut s = AppState::new(Catalog::builtin("https://api/surah", "ed"), vec![], "ed", 12);
        for n in [18, 67] {
            let c = s.catalog.get(n).cloned().unwrap();
            s.favorites.push(Favorite::from(&c));
        }
        let mut overlay = FavoritesOverlay::new();
        press(&mut overlay, &s, KeyCode::Down);
        assert_eq!(
            press(&mut overlay, &s, KeyCode::Enter),
            vec![
                Action::ToggleFavoritesOverlay,
                Action::OpenChapter(67),
                Action::FocusPane(ComponentId::VersePanel)
            ]
        );
        assert_eq!(press(&mut overlay, &s, KeyCode::Char('d')), vec![Action::RemoveFavorite(67)]);
        overlay.on_action(&Action::RemoveFavorite(67), &s);
        assert_eq!(press(&mut overlay, &s, KeyCode::Enter)[1], Action::OpenChapter(18));
    }

    #[test]
    fn clear_needs_something_to_clear() {
        let mut s = AppState::new(Catalog::builtin("https://api/surah", "ed"), vec![], "ed", 12);
        let mut overlay = FavoritesOverlay::new();
        assert!(press(&mut overlay, &s, KeyCode::Char('C')).is_empty());

        for n in [1, 2, 3] {
            let c = s.catalog.get(n).cloned().unwrap();
            s.favorites.push(Favorite::from(&c));
        }
        press(&mut overlay, &s, KeyCode::Down);
        press(&mut overlay, &s, KeyCode::Down);
        assert_eq!(press(&mut overlay, &s, KeyCode::Char('C')), vec![Action::ClearFavorites]);
        overlay.on_action(&Action::ClearFavorites, &s);
        assert_eq!(overlay.selected, 0);
    }

    #[test]
    fn centered_popup_fits() {
        let r = centered(Rect::new(0, 0, 100, 10), 60, 30);
        assert_eq!((r.width, r.height), (60, 10));
        assert_eq!(r.x, 20);
    }
}
