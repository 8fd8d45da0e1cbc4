//! Status bar widget for the bottom of the TUI.
//!
//! Format: `● mode │ Aug 2017 │ paper 3/27 │ 2 excluded │ → hint`

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::theme::Theme;

/// Status bar content.
#[derive(Debug, Clone, Default)]
pub struct StatusBarContent {
    /// Ordering mode name.
    pub mode: String,
    /// Cursor date label.
    pub cursor: Option<String>,
    /// Active paper position (e.g., "paper 3/27").
    pub position: Option<String>,
    /// Number of items left out of the layout.
    pub excluded: usize,
    /// Transient notification, shown instead of the hint.
    pub notification: Option<String>,
    /// Next action hint.
    pub hint: Option<String>,
}

impl StatusBarContent {
    /// A "terminal too small" warning.
    pub fn too_small() -> Self {
        Self {
            mode: "Warning".into(),
            hint: Some("Resize to at least 40x12".into()),
            ..Self::default()
        }
    }
}

/// Status bar widget.
pub struct StatusBar<'a> {
    content: &'a StatusBarContent,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    /// Create a new status bar widget.
    pub fn new(content: &'a StatusBarContent, theme: &'a Theme) -> Self {
        Self { content, theme }
    }

    fn separator(&self) -> Span<'static> {
        Span::styled(" │ ", Style::default().fg(self.theme.muted))
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut spans = vec![
            Span::styled("● ", Style::default().fg(self.theme.active)),
            Span::styled(&self.content.mode, Style::default().fg(self.theme.text)),
        ];

        if let Some(ref cursor) = self.content.cursor {
            spans.push(self.separator());
            spans.push(Span::styled(cursor, Style::default().fg(self.theme.cursor)));
        }

        if let Some(ref position) = self.content.position {
            spans.push(self.separator());
            spans.push(Span::styled(position, Style::default().fg(self.theme.subtext)));
        }

        if self.content.excluded > 0 {
            spans.push(self.separator());
            spans.push(Span::styled(
                format!("{} excluded", self.content.excluded),
                Style::default().fg(self.theme.warning),
            ));
        }

        if let Some(ref notification) = self.content.notification {
            spans.push(self.separator());
            spans.push(Span::styled(notification, Style::default().fg(self.theme.info)));
        } else if let Some(ref hint) = self.content.hint {
            spans.push(self.separator());
            spans.push(Span::styled(
                format!("→ {hint}"),
                Style::default().fg(self.theme.event),
            ));
        }

        Paragraph::new(Line::from(spans))
            .style(Style::default().bg(self.theme.surface))
            .render(area, buf);
    }
}
