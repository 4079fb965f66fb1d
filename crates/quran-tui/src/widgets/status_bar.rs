//! Bottom rows: now-playing line and key hints.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::action::ComponentId;
use crate::theme::{C_MODE_INPUT, C_MODE_NORMAL, C_MUTED, C_PLAYING, C_SECONDARY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// A text input (search or verse range) owns the keyboard.
    Input,
}

impl InputMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Input => "INPUT",
        }
    }
}

/// One line describing what the player is doing.
pub fn draw_now_playing(frame: &mut Frame, area: Rect, text: &str, playing: bool) {
    let (dot, color) = if playing { ("●", C_PLAYING) } else { ("○", C_MUTED) };
    let spans = vec![
        Span::styled(format!(" {} ", dot), Style::default().fg(color)),
        Span::styled(text.to_string(), Style::default().fg(C_SECONDARY)),
    ];
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub fn draw_keys_bar(frame: &mut Frame, area: Rect, mode: InputMode, focus: ComponentId) {
    let color = match mode {
        InputMode::Normal => C_MODE_NORMAL,
        InputMode::Input => C_MODE_INPUT,
    };
    let keys = match (mode, focus) {
        (InputMode::Input, _) => " type  Enter apply  Esc clear/close",
        (InputMode::Normal, ComponentId::ChapterList) => {
            " ↑↓ select  Enter open  / search  l/S/M/L length  m verses  F favs only  s sort  f fav  v favorites  r reset  PgUp/PgDn page  Tab panes  q quit"
        }
        (InputMode::Normal, ComponentId::FavoritesOverlay) => " ↑↓ select  Enter open  d remove  C clear  Esc/v close",
        (InputMode::Normal, ComponentId::VersePanel) => {
            " ↑↓ select  Enter/p play  a all  n/b verse  N/B surah  c recording  e reciter  x close  Tab panes  q quit"
        }
    };
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", mode.label()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(keys, Style::default().fg(C_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
