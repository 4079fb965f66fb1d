//! App: component event loop.
//!
//! - Keyboard events and PlayerCore updates are funnelled into one mpsc
//!   channel of `AppMessage`s.
//! - The loop draws, then waits for the next message or the UI tick.
//! - Components turn keys into `Action`s; `dispatch` lets every component see
//!   an action before `apply_action` carries it out.
//! - Playback requests leave through `core_tx`; nothing here awaits network I/O.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::Style,
    widgets::Block,
    Terminal,
};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use quran_core::favorites::{Favorites, KeyValueStore};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    components::{
        chapter_list::ChapterList, favorites_overlay::FavoritesOverlay, verse_panel::VersePanel,
    },
    core::{CoreEvent, CoreUpdate, PlayerCommand},
    theme::C_BG,
    widgets::{
        status_bar::{self, InputMode},
        toast::ToastManager,
    },
};

enum AppMessage {
    Event(Event),
    Core(CoreUpdate),
}

pub struct App<S: KeyValueStore> {
    state: AppState,
    favorites: Favorites<S>,
    chapter_list: ChapterList,
    verse_panel: VersePanel,
    favorites_overlay: FavoritesOverlay,
    focus: ComponentId,
    show_favorites: bool,
    toast: ToastManager,
    core_tx: mpsc::Sender<CoreEvent>,
    should_quit: bool,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(mut state: AppState, favorites: Favorites<S>, core_tx: mpsc::Sender<CoreEvent>) -> Self {
        state.favorites = favorites.items().to_vec();
        Self {
            state,
            favorites,
            chapter_list: ChapterList::new(),
            verse_panel: VersePanel::new(),
            favorites_overlay: FavoritesOverlay::new(),
            focus: ComponentId::ChapterList,
            show_favorites: false,
            toast: ToastManager::default(),
            core_tx,
            should_quit: false,
        }
    }

    // ── Main run loop ─────────────────────────────────────────────────────────

    pub async fn run(mut self, mut core_rx: broadcast::Receiver<CoreUpdate>) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        debug!("run(): terminal ready, size={:?}", terminal.size());

        let (tx, mut rx) = mpsc::channel::<AppMessage>(256);

        // keyboard
        let event_tx = tx.clone();
        tokio::task::spawn_blocking(move || {
            while let Ok(ev) = event::read() {
                if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                    break;
                }
            }
        });

        // PlayerCore → AppMessage
        let core_msg_tx = tx.clone();
        tokio::spawn(async move {
            loop {
                match core_rx.recv().await {
                    Ok(update) => {
                        if core_msg_tx.send(AppMessage::Core(update)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("core update receiver lagged by {} messages", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        // toast expiry + spinner animation
        let mut ui_tick = tokio::time::interval(Duration::from_millis(100));
        ui_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
            }
            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(msg) = rx.recv() => {
                    needs_redraw = self.handle_message(msg).await;
                    while let Ok(next) = rx.try_recv() {
                        needs_redraw |= self.handle_message(next).await;
                    }
                }
                _ = ui_tick.tick() => {
                    let busy = !self.toast.is_empty();
                    self.toast.tick();
                    needs_redraw = busy;
                }
            }
        }

        // ── Teardown ──────────────────────────────────────────────────────────
        let _ = self.core_tx.send(CoreEvent::Shutdown).await;
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        info!("ui closed");
        Ok(())
    }

    async fn handle_message(&mut self, msg: AppMessage) -> bool {
        match msg {
            AppMessage::Event(Event::Key(key)) => {
                if key.kind == KeyEventKind::Release {
                    return false;
                }
                for action in self.handle_key(key) {
                    self.dispatch(action).await;
                }
                true
            }
            AppMessage::Event(Event::Resize(_, _)) => true,
            AppMessage::Event(_) => false,
            AppMessage::Core(update) => {
                self.on_core_update(update);
                true
            }
        }
    }

    fn on_core_update(&mut self, update: CoreUpdate) {
        match update {
            CoreUpdate::Snapshot(snapshot) => {
                self.state.player = snapshot;
                self.verse_panel.sync(&self.state);
                self.toast.dismiss_spinner();
            }
            CoreUpdate::Busy(message) => self.toast.spinner(message),
            CoreUpdate::Error(message) => {
                self.toast.dismiss_spinner();
                self.toast.error(message);
            }
        }
    }

    // ── Keys ──────────────────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return vec![Action::Quit];
        }
        if self.show_favorites {
            return self.favorites_overlay.handle_key(key, &self.state);
        }
        if self.state.input_mode == InputMode::Normal {
            match key.code {
                KeyCode::Char('q') => return vec![Action::Quit],
                KeyCode::Tab | KeyCode::BackTab => return vec![Action::FocusNext],
                KeyCode::Char('1') => return vec![Action::FocusPane(ComponentId::ChapterList)],
                KeyCode::Char('2') => return vec![Action::FocusPane(ComponentId::VersePanel)],
                KeyCode::Char('v') => return vec![Action::ToggleFavoritesOverlay],
                _ => {}
            }
        }
        if self.focus == self.verse_panel.id() {
            self.verse_panel.handle_key(key, &self.state)
        } else {
            self.chapter_list.handle_key(key, &self.state)
        }
    }

    // ── Actions ───────────────────────────────────────────────────────────────

    async fn dispatch(&mut self, action: Action) {
        let mut queue = VecDeque::from([action]);
        while let Some(action) = queue.pop_front() {
            self.chapter_list.on_action(&action, &self.state);
            self.verse_panel.on_action(&action, &self.state);
            self.favorites_overlay.on_action(&action, &self.state);
            queue.extend(self.apply_action(action).await);
        }
    }

    /// Carry out `action`; returns follow-up actions.
    async fn apply_action(&mut self, action: Action) -> Vec<Action> {
        debug!("apply_action: {:?}", action);
        match action {
            Action::OpenChapter(number) => match self.state.catalog.get(number) {
                Some(chapter) => self.send(PlayerCommand::Open(chapter.clone())).await,
                None => self.toast.warning(format!("Surah {} is not in the catalog", number)),
            },
            Action::OpenNextChapter | Action::OpenPreviousChapter => {
                let Some(current) = self.state.open_chapter() else {
                    return vec![];
                };
                let target = if action == Action::OpenNextChapter {
                    self.state.catalog.next(current)
                } else {
                    self.state.catalog.previous(current)
                };
                match target {
                    Some(chapter) => return vec![Action::OpenChapter(chapter.number)],
                    None if action == Action::OpenNextChapter => self.toast.info("Already at the last surah"),
                    None => self.toast.info("Already at the first surah"),
                }
            }
            Action::ToggleFavorite(number) => {
                let Some(chapter) = self.state.catalog.get(number).cloned() else {
                    return vec![];
                };
                match self.favorites.toggle(&chapter) {
                    Ok(true) => self.toast.success(format!("Added {} to favorites", chapter.name)),
                    Ok(false) => self.toast.info(format!("Removed {} from favorites", chapter.name)),
                    Err(e) => {
                        warn!("favorites: {:#}", e);
                        self.toast.error("Could not save favorites");
                    }
                }
                self.state.favorites = self.favorites.items().to_vec();
            }
            Action::RemoveFavorite(number) => {
                if let Err(e) = self.favorites.remove(number) {
                    warn!("favorites: {:#}", e);
                    self.toast.error("Could not save favorites");
                }
                self.state.favorites = self.favorites.items().to_vec();
            }
            Action::ClearFavorites => {
                let count = self.favorites.len();
                match self.favorites.clear() {
                    Ok(()) => self.toast.info(format!("Cleared {} favorites", count)),
                    Err(e) => {
                        warn!("favorites: {:#}", e);
                        self.toast.error("Could not save favorites");
                    }
                }
                self.state.favorites = self.favorites.items().to_vec();
            }
            Action::PlayVerse(index) => self.send(PlayerCommand::PlayVerse(index)).await,
            Action::PlayFullChapter => self.send(PlayerCommand::PlayFullChapter).await,
            Action::NextVerse => self.send(PlayerCommand::NextVerse).await,
            Action::PreviousVerse => self.send(PlayerCommand::PreviousVerse).await,
            Action::PlayChapterRecording => self.send(PlayerCommand::PlayChapterRecording).await,
            Action::CycleEdition => match self.state.next_edition() {
                Some(edition) => {
                    let id = edition.identifier.clone();
                    self.toast.info(format!("Reciter: {}", edition.display_name));
                    self.send(PlayerCommand::ChangeEdition(id)).await;
                }
                None => self.toast.info("Only one reciter available"),
            },
            Action::ClosePlayer => self.send(PlayerCommand::Close).await,
            Action::FocusNext => {
                self.focus = match self.focus {
                    ComponentId::ChapterList => ComponentId::VersePanel,
                    _ => ComponentId::ChapterList,
                };
            }
            Action::FocusPane(id) => self.focus = id,
            Action::ToggleFavoritesOverlay => self.show_favorites = !self.show_favorites,
            Action::InputMode(on) => {
                self.state.input_mode = if on { InputMode::Input } else { InputMode::Normal };
            }
            Action::Notify(message) => self.toast.warning(message),
            Action::Quit => self.should_quit = true,
        }
        vec![]
    }

    async fn send(&self, cmd: PlayerCommand) {
        if self.core_tx.send(CoreEvent::Command(cmd)).await.is_err() {
            warn!("player core is gone, command dropped");
        }
    }

    // ── Drawing ───────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut ratatui::Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(Style::default().bg(C_BG)), area);

        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1), Constraint::Length(1)])
            .split(area);
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(outer[0]);

        let focus = if self.show_favorites {
            ComponentId::FavoritesOverlay
        } else {
            self.focus
        };
        let list_focused = focus == self.chapter_list.id();
        let panel_focused = focus == self.verse_panel.id();
        self.chapter_list.draw(frame, body[0], list_focused, &self.state);
        self.verse_panel.draw(frame, body[1], panel_focused, &self.state);

        status_bar::draw_now_playing(
            frame,
            outer[1],
            &self.state.now_playing_text(),
            self.state.player.now_playing.is_some(),
        );
        status_bar::draw_keys_bar(frame, outer[2], self.state.input_mode, focus);

        if self.show_favorites {
            let overlay_focused = focus == self.favorites_overlay.id();
            self.favorites_overlay.draw(frame, outer[0], overlay_focused, &self.state);
        }
        self.toast.draw(frame, area);
    }
}
