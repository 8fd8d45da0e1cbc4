//! Timeline widget: a vertical axis with dots for papers and point events,
//! bars for spanning events, year labels in a gutter, and a sticky cursor
//! date label.

use chrono::Datelike;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

use super::state::TimelineState;
use crate::text::truncate_to_width;
use crate::theme::Theme;
use paperline_engine::{Catalog, ItemId, ItemKind, Layout, Placement};

/// Columns reserved for year labels left of the axis.
const GUTTER_WIDTH: u16 = 6;

/// Timeline pane widget.
pub struct TimelineWidget<'a> {
    layout: &'a Layout,
    state: &'a TimelineState,
    catalog: &'a Catalog,
    theme: &'a Theme,
    active: Option<&'a ItemId>,
    cursor_label: Option<String>,
}

impl<'a> TimelineWidget<'a> {
    /// Create a new timeline widget.
    pub fn new(
        layout: &'a Layout,
        state: &'a TimelineState,
        catalog: &'a Catalog,
        theme: &'a Theme,
    ) -> Self {
        Self {
            layout,
            state,
            catalog,
            theme,
            active: None,
            cursor_label: None,
        }
    }

    /// Highlight the active paper.
    #[must_use]
    pub fn active(mut self, active: Option<&'a ItemId>) -> Self {
        self.active = active;
        self
    }

    /// Set the sticky cursor date label.
    #[must_use]
    pub fn cursor_label(mut self, label: Option<String>) -> Self {
        self.cursor_label = label;
        self
    }

    /// Screen row for a content row, if visible.
    fn visible_row(&self, row: usize, inner: Rect) -> Option<u16> {
        let rel = row.checked_sub(self.state.scroll_row())?;
        let rel = u16::try_from(rel).ok()?;
        (rel < inner.height).then(|| inner.y + rel)
    }

    fn label_for(&self, placement: &Placement) -> String {
        let Some(item) = self.catalog.get(&placement.id) else {
            return placement.id.to_string();
        };
        match (item.date, item.duration_end) {
            (Some(start), Some(end)) if placement.duration.is_some() => {
                format!("{} ({} - {})", item.title, start.year(), end.year())
            }
            _ => item.title.clone(),
        }
    }

    fn render_axis(&self, axis_x: u16, inner: Rect, buf: &mut Buffer) {
        let style = Style::default().fg(self.theme.muted);
        for y in inner.y..inner.y + inner.height {
            buf.set_string(axis_x, y, "│", style);
        }
    }

    fn render_years(&self, inner: Rect, buf: &mut Buffer) {
        let style = Style::default().fg(self.theme.subtext);
        for marker in self.layout.year_markers() {
            if let Some(y) = self.visible_row(self.state.row_of(marker.offset), inner) {
                buf.set_string(inner.x, y, marker.year.to_string(), style);
            }
        }
    }

    fn render_spans(&self, axis_x: u16, inner: Rect, buf: &mut Buffer) {
        let style = Style::default().fg(self.theme.span);
        for placement in &self.layout.placements {
            let Some(duration) = placement.duration else {
                continue;
            };
            let start = self.state.row_of(placement.offset);
            let end = self.state.row_of(placement.offset + duration);
            for row in start..=end {
                if let Some(y) = self.visible_row(row, inner) {
                    buf.set_string(axis_x, y, "┃", style);
                }
            }
        }
    }

    fn render_items(&self, axis_x: u16, inner: Rect, buf: &mut Buffer) {
        let label_x = axis_x + 2;
        let label_width = usize::from((inner.x + inner.width).saturating_sub(label_x));

        for placement in &self.layout.placements {
            let Some(y) = self.visible_row(self.state.row_of(placement.offset), inner) else {
                continue;
            };
            let is_active = self.active == Some(&placement.id);
            let (dot, dot_style, label_style) = match placement.kind {
                ItemKind::Paper if is_active => (
                    "◉",
                    Style::default().fg(self.theme.active),
                    Style::default()
                        .fg(self.theme.active)
                        .add_modifier(Modifier::BOLD),
                ),
                ItemKind::Paper => (
                    "●",
                    Style::default().fg(self.theme.paper),
                    Style::default().fg(self.theme.text),
                ),
                ItemKind::Event => (
                    "◆",
                    Style::default().fg(self.theme.event),
                    Style::default().fg(self.theme.event),
                ),
            };
            buf.set_string(axis_x, y, dot, dot_style);
            if label_width > 0 {
                let label = truncate_to_width(&self.label_for(placement), label_width);
                buf.set_string(label_x, y, label, label_style);
            }
        }
    }

    fn render_trigger(&self, axis_x: u16, inner: Rect, buf: &mut Buffer) {
        let Ok(trigger) = u16::try_from(self.state.trigger_row()) else {
            return;
        };
        if trigger < inner.height && axis_x > inner.x {
            let style = Style::default().fg(self.theme.cursor);
            buf.set_string(axis_x - 1, inner.y + trigger, "▶", style);
        }
    }
}

impl Widget for TimelineWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut block = Block::default()
            .title(format!(" Timeline · {} ", self.layout.mode))
            .title_style(Style::default().fg(self.theme.text))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border_focused))
            .style(Style::default().bg(self.theme.base));
        // The sticky cursor label lives in the top border, clear of item rows.
        if let Some(label) = &self.cursor_label {
            let style = Style::default()
                .fg(self.theme.cursor)
                .bg(self.theme.surface)
                .add_modifier(Modifier::BOLD);
            let title = Line::from(Span::styled(format!(" {label} "), style)).right_aligned();
            block = block.title_top(title);
        }
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height == 0 || inner.width <= GUTTER_WIDTH + 2 {
            return;
        }

        if self.layout.is_empty() {
            buf.set_string(
                inner.x + 2,
                inner.y + inner.height / 2,
                "No items to display",
                Style::default().fg(self.theme.muted),
            );
            return;
        }

        let axis_x = inner.x + GUTTER_WIDTH;
        self.render_axis(axis_x, inner, buf);
        self.render_years(inner, buf);
        self.render_spans(axis_x, inner, buf);
        self.render_items(axis_x, inner, buf);
        self.render_trigger(axis_x, inner, buf);
    }
}
