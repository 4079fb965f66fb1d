//! Palette and shared styles.

use ratatui::style::{Color, Modifier, Style};

pub const C_BG: Color = Color::Rgb(16, 18, 20);
pub const C_ACCENT: Color = Color::Rgb(214, 170, 90);
pub const C_PLAYING: Color = Color::Rgb(90, 196, 140);
pub const C_ERROR: Color = Color::Rgb(240, 96, 96);
pub const C_MUTED: Color = Color::Rgb(74, 80, 88);
pub const C_SECONDARY: Color = Color::Rgb(120, 128, 140);
pub const C_PRIMARY: Color = Color::Rgb(214, 218, 224);
pub const C_ARABIC: Color = Color::Rgb(232, 224, 200);
pub const C_SELECTION_BG: Color = Color::Rgb(30, 34, 40);
pub const C_PANEL_BORDER: Color = Color::Rgb(42, 46, 54);
pub const C_PANEL_BORDER_FOCUSED: Color = Color::Rgb(70, 160, 150);
pub const C_NUMBER_HINT: Color = Color::Rgb(92, 98, 110);
pub const C_FILTER_BG: Color = Color::Rgb(22, 26, 32);
pub const C_FILTER_FG: Color = Color::Rgb(240, 200, 100);
pub const C_PLACE: Color = Color::Rgb(110, 160, 200);
pub const C_FAVORITE: Color = Color::Rgb(250, 204, 60);
pub const C_TOAST_INFO: Color = Color::Rgb(90, 160, 220);
pub const C_TOAST_SUCCESS: Color = Color::Rgb(90, 196, 140);
pub const C_TOAST_WARNING: Color = Color::Rgb(240, 184, 80);
pub const C_TOAST_ERROR: Color = Color::Rgb(240, 96, 96);
pub const C_MODE_NORMAL: Color = Color::Rgb(120, 128, 140);
pub const C_MODE_INPUT: Color = Color::Rgb(240, 200, 100);

pub fn style_focused_border() -> Style {
    Style::default().fg(C_PANEL_BORDER_FOCUSED)
}

pub fn style_unfocused_border() -> Style {
    Style::default().fg(C_PANEL_BORDER)
}

pub fn style_title(focused: bool) -> Style {
    if focused {
        Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(C_MUTED)
    }
}

pub fn style_muted() -> Style {
    Style::default().fg(C_MUTED)
}
