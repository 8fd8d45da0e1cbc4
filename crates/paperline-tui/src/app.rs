//! Application state and update logic for the paperline TUI.

use crate::event::Action;
use crate::theme::Theme;
use crate::timeline::{TimelineState, SCROLL_SPEED};
use crate::ui;
use crate::widgets::StatusBarContent;
use paperline_engine::{
    format_cursor_date, ActiveChange, Catalog, CatalogError, Config, ConfigError, ItemKind,
    ItemSource, Layout, LayoutEngine, OrderingMode, TimelineItem,
};
use ratatui::layout::Rect;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Ticks a notification stays visible.
const NOTIFICATION_TICKS: usize = 60;

/// Application state.
#[derive(Debug)]
pub struct App {
    /// Whether the app should quit.
    pub should_quit: bool,

    /// Whether the help overlay is visible.
    pub show_help: bool,

    /// User preferences and layout options.
    pub config: Config,

    /// Where the mode preference is persisted.
    config_path: Option<PathBuf>,

    /// Catalog file to reload from (builtin catalog when unset).
    data_path: Option<PathBuf>,

    /// Items being displayed.
    pub catalog: Catalog,

    /// Layout engine and active-item tracker.
    pub engine: LayoutEngine,

    /// Current layout.
    pub layout: Layout,

    /// Scroll and crossing state of the timeline pane.
    pub timeline: TimelineState,

    /// Slide shown in the detail card.
    pub slide: usize,

    /// Color palette.
    pub theme: Theme,

    /// Tick counter.
    pub tick: usize,

    /// Notification message (cleared after some ticks).
    pub notification: Option<String>,

    /// Ticks remaining until notification is cleared.
    notification_ttl: usize,

    /// Terminal area last laid out, for mapping mouse clicks.
    area: Rect,

    /// When the catalog was last loaded.
    last_reload: Instant,
}

impl App {
    /// Create an app showing `catalog` in the configured mode.
    pub fn new(config: Config, catalog: Catalog) -> Result<Self, ConfigError> {
        let mut engine = LayoutEngine::new(config.layout)?;
        let items = catalog.list_items(config.mode);
        let layout = engine.layout(&items, config.mode);
        let timeline = TimelineState::new(&config.layout);

        let mut app = Self {
            should_quit: false,
            show_help: false,
            config,
            config_path: None,
            data_path: None,
            catalog,
            engine,
            layout,
            timeline,
            slide: 0,
            theme: Theme::default(),
            tick: 0,
            notification: None,
            notification_ttl: 0,
            area: Rect::default(),
            last_reload: Instant::now(),
        };
        app.sync(Instant::now());
        Ok(app)
    }

    /// Persist mode changes to `path`.
    #[must_use]
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    /// Reload the catalog from `path` instead of the builtin list.
    #[must_use]
    pub fn with_data_path(mut self, path: PathBuf) -> Self {
        self.data_path = Some(path);
        self
    }

    /// Use the high-contrast palette.
    #[must_use]
    pub fn with_high_contrast(mut self) -> Self {
        self.theme = Theme::high_contrast();
        self
    }

    /// Current ordering mode.
    pub fn mode(&self) -> OrderingMode {
        self.config.mode
    }

    /// The active paper, if any.
    pub fn active_item(&self) -> Option<&TimelineItem> {
        self.engine.active().and_then(|id| self.catalog.get(id))
    }

    /// Position of the active paper among placed papers (1-based) and the count.
    pub fn active_position(&self) -> Option<(usize, usize)> {
        let papers: Vec<_> = self
            .layout
            .placements
            .iter()
            .filter(|p| p.kind == ItemKind::Paper)
            .collect();
        let active = self.engine.active()?;
        let index = papers.iter().position(|p| &p.id == active)?;
        Some((index + 1, papers.len()))
    }

    /// Cursor date label for the current scroll position.
    pub fn cursor_label(&self) -> Option<String> {
        self.engine
            .cursor_date(&self.layout, self.timeline.scroll_units())
            .map(format_cursor_date)
    }

    /// Content for the status bar.
    pub fn status_content(&self) -> StatusBarContent {
        StatusBarContent {
            mode: self.mode().to_string(),
            cursor: self.cursor_label(),
            position: self
                .active_position()
                .map(|(i, n)| format!("paper {i}/{n}")),
            excluded: self.layout.excluded.len(),
            notification: self.notification.clone(),
            hint: Some("? help".into()),
        }
    }

    /// Fit the timeline to a terminal of the given size.
    pub fn resize_to_area(&mut self, area: Rect) {
        self.area = area;
        let (timeline, _, _) = ui::main_layout(area);
        let rows = usize::from(ui::inner(timeline).height);
        if rows != self.timeline.viewport_rows() {
            self.timeline.resize(rows, &self.layout);
            self.sync(Instant::now());
        }
    }

    /// Handle an action.
    pub fn handle_action(&mut self, action: Action) {
        self.handle_action_at(action, Instant::now());
    }

    /// Handle an action at a given time.
    pub fn handle_action_at(&mut self, action: Action, now: Instant) {
        // Global actions
        match action {
            Action::Quit => {
                if self.show_help {
                    self.show_help = false;
                } else {
                    self.should_quit = true;
                }
                return;
            }
            Action::Help => {
                self.show_help = !self.show_help;
                return;
            }
            _ => {}
        }

        // If help is showing, any key closes it
        if self.show_help {
            self.show_help = false;
            return;
        }

        match action {
            Action::Up => self.scroll(-1, now),
            Action::Down => self.scroll(1, now),
            Action::PageUp => self.scroll(-page(&self.timeline), now),
            Action::PageDown => self.scroll(page(&self.timeline), now),
            Action::Top => {
                self.timeline.scroll_to(0, &self.layout);
                self.sync(now);
            }
            Action::Bottom => {
                self.timeline
                    .scroll_to(self.timeline.max_scroll(&self.layout), &self.layout);
                self.sync(now);
            }
            Action::NextPaper => self.jump_paper(true, now),
            Action::PrevPaper => self.jump_paper(false, now),
            Action::NextSlide => self.cycle_slide(true),
            Action::PrevSlide => self.cycle_slide(false),
            Action::ToggleMode => self.toggle_mode(now),
            Action::CopyLink => self.copy_link(),
            Action::Reload => self.reload(now),
            Action::Quit | Action::Help | Action::Back | Action::None => {}
        }
    }

    /// Scroll for a mouse wheel tick.
    pub fn wheel(&mut self, down: bool) {
        #[allow(clippy::cast_possible_wrap)]
        let delta = SCROLL_SPEED as isize;
        self.scroll(if down { delta } else { -delta }, Instant::now());
    }

    /// Activate the paper on the clicked timeline row.
    pub fn click(&mut self, column: u16, row: u16) {
        self.click_at(column, row, Instant::now());
    }

    /// Handle a click at a given time.
    pub fn click_at(&mut self, column: u16, row: u16, now: Instant) {
        if self.show_help {
            self.show_help = false;
            return;
        }
        let (timeline, _, _) = ui::main_layout(self.area);
        let inner = ui::inner(timeline);
        let inside = column >= inner.x
            && column < inner.x + inner.width
            && row >= inner.y
            && row < inner.y + inner.height;
        if !inside {
            return;
        }
        let Some(offset) = self
            .timeline
            .paper_at(&self.layout, usize::from(row - inner.y))
            .map(|p| p.offset)
        else {
            return;
        };
        self.activate_offset(offset, now);
    }

    /// Periodic update: report crossings and flush debounced changes.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    /// Periodic update at a given time.
    pub fn tick_at(&mut self, now: Instant) {
        self.tick = self.tick.wrapping_add(1);
        if self.reload_due(now) {
            self.auto_reload(now);
        }
        self.sync(now);
        if let Some(change) = self.engine.poll_active(now) {
            self.on_active_change(&change);
        }

        if self.notification_ttl > 0 {
            self.notification_ttl -= 1;
            if self.notification_ttl == 0 {
                self.notification = None;
            }
        }
    }

    fn scroll(&mut self, delta: isize, now: Instant) {
        self.timeline.scroll_by(delta, &self.layout);
        self.sync(now);
    }

    fn sync(&mut self, now: Instant) {
        self.timeline
            .sync_crossings(&self.layout, &mut self.engine, now);
    }

    fn on_active_change(&mut self, change: &ActiveChange) {
        debug!(previous = ?change.previous, current = ?change.current, "active paper changed");
        self.slide = 0;
    }

    /// Scroll the next (or previous) paper to the trigger line, wrapping around.
    fn jump_paper(&mut self, forward: bool, now: Instant) {
        let papers: Vec<_> = self
            .layout
            .placements
            .iter()
            .filter(|p| p.kind == ItemKind::Paper)
            .map(|p| (p.id.clone(), p.offset))
            .collect();
        if papers.is_empty() {
            return;
        }

        let n = papers.len();
        let current = self
            .engine
            .active()
            .and_then(|active| papers.iter().position(|(id, _)| id == active));
        let target = match (current, forward) {
            (Some(i), true) => (i + 1) % n,
            (Some(i), false) => (i + n - 1) % n,
            (None, true) => 0,
            (None, false) => n - 1,
        };

        self.activate_offset(papers[target].1, now);
    }

    /// Scroll a paper's offset to the trigger line and activate it at once.
    fn activate_offset(&mut self, offset: f64, now: Instant) {
        self.timeline.scroll_to_offset(offset, &self.layout);
        self.sync(now);
        if let Some(change) = self.engine.flush_active() {
            self.on_active_change(&change);
        }
    }

    fn cycle_slide(&mut self, forward: bool) {
        let Some(total) = self.active_item().map(|item| item.detail.len()) else {
            return;
        };
        if total == 0 {
            return;
        }
        let current = self.slide % total;
        self.slide = if forward {
            (current + 1) % total
        } else {
            (current + total - 1) % total
        };
    }

    fn relayout(&mut self) {
        let mode = self.mode();
        let items = self.catalog.list_items(mode);
        self.layout = self.engine.layout(&items, mode);
        self.timeline.reset_crossings();
        self.timeline
            .resize(self.timeline.viewport_rows(), &self.layout);
        self.slide = 0;
    }

    fn toggle_mode(&mut self, now: Instant) {
        self.config.mode = self.config.mode.toggled();
        if let Some(path) = &self.config_path {
            if let Err(e) = self.config.save(path) {
                warn!(error = %e, path = %path.display(), "failed to save mode preference");
            }
        }
        self.relayout();
        self.timeline.scroll_to(0, &self.layout);
        self.sync(now);
        self.notify(format!("Mode: {}", self.mode()));
    }

    fn copy_link(&mut self) {
        let Some(link) = self.active_item().and_then(|item| item.link.clone()) else {
            self.notify("No link to copy");
            return;
        };
        let result = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(link.clone()));
        match result {
            Ok(()) => self.notify(format!("Copied {link}")),
            Err(e) => {
                warn!(error = %e, "clipboard unavailable");
                self.notify(format!("Clipboard unavailable: {e}"));
            }
        }
    }

    /// Replace the catalog from its source and lay it out from scratch.
    fn reload(&mut self, now: Instant) {
        self.last_reload = now;
        match self.load_catalog() {
            Ok(catalog) => {
                self.catalog = catalog;
                self.engine.reset();
                self.relayout();
                self.sync(now);
                self.notify(format!("Reloaded {} items", self.catalog.len()));
            }
            Err(e) => {
                warn!(error = %e, "catalog reload failed");
                self.notify(format!("Reload failed: {e}"));
            }
        }
    }

    fn load_catalog(&self) -> Result<Catalog, CatalogError> {
        match &self.data_path {
            Some(path) => Catalog::from_path(path),
            None => Catalog::builtin(),
        }
    }

    /// Whether a catalog file is due for its periodic reload.
    fn reload_due(&self, now: Instant) -> bool {
        match (&self.data_path, self.config.reload_interval()) {
            (Some(_), Some(interval)) => {
                now.saturating_duration_since(self.last_reload) >= interval
            }
            _ => false,
        }
    }

    /// Periodic reload: only a changed catalog replaces the current one, so
    /// the active paper and cached positions survive an unchanged file.
    fn auto_reload(&mut self, now: Instant) {
        self.last_reload = now;
        match self.load_catalog() {
            Ok(catalog) if catalog.items() == self.catalog.items() => {}
            Ok(catalog) => {
                info!(count = catalog.len(), "catalog changed on disk, reloading");
                self.catalog = catalog;
                self.relayout();
                self.sync(now);
            }
            Err(e) => {
                warn!(error = %e, "catalog reload failed");
                self.notify(format!("Reload failed: {e}"));
            }
        }
    }

    /// Show a notification message.
    pub fn notify(&mut self, message: impl Into<String>) {
        self.notification = Some(message.into());
        self.notification_ttl = NOTIFICATION_TICKS;
    }
}

#[allow(clippy::cast_possible_wrap)]
fn page(timeline: &TimelineState) -> isize {
    timeline.page_rows() as isize
}
