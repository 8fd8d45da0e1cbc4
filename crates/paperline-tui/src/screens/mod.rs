//! Screen definitions for the paperline TUI.

pub mod timeline;

use crate::app::App;
use crate::text::visual_width;
use crate::theme::Theme;
use crate::ui::centered_fixed;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

/// Trait for screens that can be rendered.
pub trait Screen {
    /// Render the screen to the buffer.
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
}

/// Render the help overlay.
pub fn render_help_overlay(area: Rect, buf: &mut Buffer, theme: &Theme) {
    let help_text = r"
  Timeline
    j/k or Up/Down    Scroll
    Space / PgUp      Page down / up
    g / G             Top / bottom
    n / p             Next / previous paper

  Paper
    l/h or Right/Left Next / previous slide
    y                 Copy link

  View
    m                 Toggle curated / chronological
    r                 Reload catalog
    q                 Quit
    ?                 Toggle this help

  [Press any key to close]
";

    // Fit the longest line plus borders and a margin.
    let text_width = help_text.lines().map(visual_width).max().unwrap_or(0) + 4;
    let text_height = help_text.lines().count() + 2;
    let width = u16::try_from(text_width)
        .unwrap_or(u16::MAX)
        .min(area.width.saturating_sub(4));
    let height = u16::try_from(text_height)
        .unwrap_or(u16::MAX)
        .min(area.height.saturating_sub(2));
    let overlay_area = centered_fixed(width, height, area);

    Clear.render(overlay_area, buf);

    let style = Style::default().fg(theme.text).bg(theme.surface);
    let block = Block::default()
        .title(" Help ")
        .title_style(Style::default().fg(theme.active))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focused))
        .style(style);

    Paragraph::new(help_text)
        .block(block)
        .style(style)
        .render(overlay_area, buf);
}
