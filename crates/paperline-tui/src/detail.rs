//! Detail card for the active paper.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::text::{wrap_bullet, wrap_text};
use crate::theme::Theme;
use paperline_engine::{ContentBlock, TimelineItem};

/// Detail card widget.
pub struct DetailCard<'a> {
    item: Option<&'a TimelineItem>,
    slide: usize,
    theme: &'a Theme,
}

impl<'a> DetailCard<'a> {
    /// Create a card for `item` showing slide `slide`.
    pub fn new(item: Option<&'a TimelineItem>, slide: usize, theme: &'a Theme) -> Self {
        Self { item, slide, theme }
    }

    fn header_lines(&self, item: &TimelineItem, width: usize) -> Vec<Line<'static>> {
        let mut lines: Vec<Line<'static>> = wrap_text(&item.title, width)
            .into_iter()
            .map(|l| {
                Line::styled(
                    l,
                    Style::default()
                        .fg(self.theme.text)
                        .add_modifier(Modifier::BOLD),
                )
            })
            .collect();

        let subtext = Style::default().fg(self.theme.subtext);
        if let Some(authors) = &item.authors {
            lines.extend(
                wrap_text(authors, width)
                    .into_iter()
                    .map(|l| Line::styled(l, subtext)),
            );
        }
        if let Some(date) = item.date {
            lines.push(Line::styled(date.format("%d %b %Y").to_string(), subtext));
        }
        if let Some(link) = &item.link {
            lines.push(Line::styled(
                link.clone(),
                Style::default()
                    .fg(self.theme.info)
                    .add_modifier(Modifier::UNDERLINED),
            ));
        }
        lines
    }

    fn slide_lines(&self, item: &TimelineItem, width: usize) -> Vec<Line<'static>> {
        let total = item.detail.len();
        if total == 0 {
            return vec![Line::styled(
                "No notes for this paper",
                Style::default().fg(self.theme.muted),
            )];
        }
        let index = self.slide % total;
        let slide = &item.detail[index];

        let mut heading = vec![Span::styled(
            format!("[{}/{}] ", index + 1, total),
            Style::default().fg(self.theme.muted),
        )];
        if let Some(title) = &slide.title {
            heading.push(Span::styled(
                title.clone(),
                Style::default()
                    .fg(self.theme.paper)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        let mut lines = vec![Line::from(heading)];

        let text = Style::default().fg(self.theme.text);
        for block in &slide.blocks {
            lines.push(Line::default());
            match block {
                ContentBlock::Text(body) => {
                    lines.extend(wrap_text(body, width).into_iter().map(|l| Line::styled(l, text)));
                }
                ContentBlock::Bullets(items) => {
                    for bullet in items {
                        lines.extend(
                            wrap_bullet(bullet, width)
                                .into_iter()
                                .map(|l| Line::styled(l, text)),
                        );
                    }
                }
                ContentBlock::Image(src) => {
                    lines.push(Line::styled(
                        format!("[image: {src}]"),
                        Style::default().fg(self.theme.muted),
                    ));
                }
                ContentBlock::Video(src) => {
                    lines.push(Line::styled(
                        format!("[video: {src}]"),
                        Style::default().fg(self.theme.muted),
                    ));
                }
                ContentBlock::Intuition(note) => {
                    let style = Style::default()
                        .fg(self.theme.cursor)
                        .add_modifier(Modifier::ITALIC);
                    lines.extend(
                        wrap_text(&format!("Intuition: {note}"), width)
                            .into_iter()
                            .map(|l| Line::styled(l, style)),
                    );
                }
            }
        }
        lines
    }
}

impl Widget for DetailCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Paper ")
            .title_style(Style::default().fg(self.theme.text))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border))
            .style(Style::default().bg(self.theme.base));
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.width < 2 || inner.height == 0 {
            return;
        }

        let Some(item) = self.item else {
            Paragraph::new(Line::styled(
                "Scroll to a paper to see its details",
                Style::default().fg(self.theme.muted),
            ))
            .render(inner, buf);
            return;
        };

        let width = usize::from(inner.width.saturating_sub(1));
        let mut lines = self.header_lines(item, width);
        lines.push(Line::styled(
            "─".repeat(width),
            Style::default().fg(self.theme.border),
        ));
        lines.extend(self.slide_lines(item, width));

        Paragraph::new(lines).render(inner, buf);
    }
}
