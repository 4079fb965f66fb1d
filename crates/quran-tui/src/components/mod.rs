pub mod chapter_list;
pub mod favorites_overlay;
pub mod verse_panel;
