//! Timeline state management.
//!
//! Maps layout units to terminal rows, tracks the scroll position, and turns
//! scrolling into trigger line crossings for the engine's active-item tracker.

use paperline_engine::{
    Crossing, ItemId, ItemKind, Layout, LayoutConfig, LayoutEngine, Placement,
};
use std::collections::HashSet;
use std::time::Instant;

/// Rows scrolled per mouse wheel tick.
pub const SCROLL_SPEED: usize = 3;

/// Timeline pane state.
#[derive(Debug)]
pub struct TimelineState {
    /// Terminal rows per layout unit.
    rows_per_unit: f64,
    /// Trigger line as a fraction of the viewport height.
    trigger_fraction: f64,
    /// First visible row.
    scroll_row: usize,
    /// Visible rows in the timeline pane.
    viewport_rows: usize,
    /// Papers whose row is at or above the trigger line.
    above: HashSet<ItemId>,
}

impl TimelineState {
    /// Create a state for the given layout options.
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            rows_per_unit: config.rows_per_unit,
            trigger_fraction: config.trigger_line_offset,
            scroll_row: 0,
            viewport_rows: 0,
            above: HashSet::new(),
        }
    }

    /// First visible row.
    pub fn scroll_row(&self) -> usize {
        self.scroll_row
    }

    /// Visible rows.
    pub fn viewport_rows(&self) -> usize {
        self.viewport_rows
    }

    /// Row of a layout offset.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn row_of(&self, offset: f64) -> usize {
        (offset * self.rows_per_unit).round().max(0.0) as usize
    }

    /// Trigger line, relative to the top of the viewport.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn trigger_row(&self) -> usize {
        (self.viewport_rows as f64 * self.trigger_fraction).floor() as usize
    }

    /// Scroll position in layout units.
    pub fn scroll_units(&self) -> f64 {
        self.scroll_row as f64 / self.rows_per_unit
    }

    /// Furthest scroll position: the bottom of the content on the trigger line.
    pub fn max_scroll(&self, layout: &Layout) -> usize {
        self.row_of(layout.height).saturating_sub(self.trigger_row())
    }

    /// Update the viewport height, keeping the scroll position in range.
    pub fn resize(&mut self, viewport_rows: usize, layout: &Layout) {
        self.viewport_rows = viewport_rows;
        self.clamp(layout);
    }

    /// Scroll by a signed number of rows.
    pub fn scroll_by(&mut self, delta: isize, layout: &Layout) {
        self.scroll_row = self.scroll_row.saturating_add_signed(delta);
        self.clamp(layout);
    }

    /// Scroll to an absolute row.
    pub fn scroll_to(&mut self, row: usize, layout: &Layout) {
        self.scroll_row = row;
        self.clamp(layout);
    }

    /// Scroll so that `offset` sits on the trigger line.
    pub fn scroll_to_offset(&mut self, offset: f64, layout: &Layout) {
        let row = self.row_of(offset).saturating_sub(self.trigger_row());
        self.scroll_to(row, layout);
    }

    /// Rows moved by a page scroll.
    pub fn page_rows(&self) -> usize {
        self.viewport_rows.saturating_sub(2).max(1)
    }

    /// Paper drawn on a viewport row, if any.
    pub fn paper_at<'a>(&self, layout: &'a Layout, viewport_row: usize) -> Option<&'a Placement> {
        let row = self.scroll_row + viewport_row;
        layout
            .placements
            .iter()
            .find(|p| p.kind == ItemKind::Paper && self.row_of(p.offset) == row)
    }

    fn clamp(&mut self, layout: &Layout) {
        self.scroll_row = self.scroll_row.min(self.max_scroll(layout));
    }

    /// Forget crossing state after a new layout.
    ///
    /// The engine resets its tracker when the layout session changes, so
    /// every paper above the trigger line is reported again on the next sync.
    pub fn reset_crossings(&mut self) {
        self.above.clear();
    }

    /// Report papers that crossed the trigger line since the last sync.
    ///
    /// Returns the number of crossings reported.
    pub fn sync_crossings(
        &mut self,
        layout: &Layout,
        engine: &mut LayoutEngine,
        now: Instant,
    ) -> usize {
        let line = self.scroll_row + self.trigger_row();
        let mut reported = 0;
        for placement in layout.placements.iter().filter(|p| p.kind == ItemKind::Paper) {
            let is_above = self.row_of(placement.offset) <= line;
            let was_above = self.above.contains(&placement.id);
            if is_above == was_above {
                continue;
            }
            let crossing = if is_above {
                self.above.insert(placement.id.clone());
                Crossing::Entered
            } else {
                self.above.remove(&placement.id);
                Crossing::Exited
            };
            if engine.record_crossing(&placement.id, crossing, now) {
                reported += 1;
            }
        }
        reported
    }
}
