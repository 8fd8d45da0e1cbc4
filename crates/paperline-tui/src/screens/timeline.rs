//! The main timeline screen: timeline pane, detail card, and status bar.

use super::Screen;
use crate::app::App;
use crate::detail::DetailCard;
use crate::timeline::TimelineWidget;
use crate::ui;
use crate::widgets::{StatusBar, StatusBarContent};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

/// Smallest usable terminal.
const MIN_WIDTH: u16 = 40;
const MIN_HEIGHT: u16 = 12;

/// Timeline screen.
pub struct TimelineScreen;

impl Screen for TimelineScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
            let content = StatusBarContent::too_small();
            StatusBar::new(&content, &app.theme).render(area, buf);
            return;
        }

        let (timeline_area, detail_area, status_area) = ui::main_layout(area);

        TimelineWidget::new(&app.layout, &app.timeline, &app.catalog, &app.theme)
            .active(app.engine.active())
            .cursor_label(app.cursor_label())
            .render(timeline_area, buf);

        DetailCard::new(app.active_item(), app.slide, &app.theme).render(detail_area, buf);

        let content = app.status_content();
        StatusBar::new(&content, &app.theme).render(status_area, buf);
    }
}
