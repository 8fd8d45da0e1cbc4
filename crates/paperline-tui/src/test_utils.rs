//! Test utilities for paperline-tui rendering and navigation tests.

use crate::app::App;
use crate::screens::Screen;
use paperline_engine::{Catalog, Config, TimelineItem};
use ratatui::{buffer::Buffer, layout::Rect};

/// Default terminal width for tests.
pub const TEST_WIDTH: u16 = 80;

/// Default terminal height for tests.
pub const TEST_HEIGHT: u16 = 24;

/// Create a test app over the builtin catalog, sized to the test terminal.
pub fn create_test_app() -> App {
    create_test_app_with(Catalog::builtin().expect("builtin catalog parses"), Config::default())
}

/// Create a test app over the given items.
pub fn create_test_app_with_items(items: Vec<TimelineItem>) -> App {
    create_test_app_with(Catalog::new(items), Config::default())
}

/// Create a test app over a catalog and configuration.
pub fn create_test_app_with(catalog: Catalog, config: Config) -> App {
    let mut app = App::new(config, catalog).expect("default layout config is valid");
    app.resize_to_area(Rect::new(0, 0, TEST_WIDTH, TEST_HEIGHT));
    app
}

/// Convert a buffer to a string, one line per row, trailing spaces trimmed.
pub fn buffer_to_string(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut lines = Vec::with_capacity(usize::from(area.height));
    for y in area.y..area.y + area.height {
        let line: String = (area.x..area.x + area.width)
            .map(|x| buffer.cell((x, y)).map_or(" ", |cell| cell.symbol()))
            .collect();
        lines.push(line.trim_end().to_string());
    }
    lines.join("\n")
}

/// Render a screen at the default test size and return it as a string.
pub fn render_screen_to_string<S: Screen>(screen: &S, app: &App) -> String {
    render_screen_to_string_sized(screen, app, TEST_WIDTH, TEST_HEIGHT)
}

/// Render a screen at a custom size and return it as a string.
pub fn render_screen_to_string_sized<S: Screen>(
    screen: &S,
    app: &App,
    width: u16,
    height: u16,
) -> String {
    let area = Rect::new(0, 0, width, height);
    let mut buffer = Buffer::empty(area);
    screen.render(app, area, &mut buffer);
    buffer_to_string(&buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_app() {
        let app = create_test_app();
        assert!(!app.layout.is_empty());
        assert_eq!(app.timeline.viewport_rows(), usize::from(TEST_HEIGHT) - 3);
    }

    #[test]
    fn test_buffer_to_string() {
        let area = Rect::new(0, 0, 10, 3);
        let mut buffer = Buffer::empty(area);
        buffer.set_string(0, 0, "Hello", ratatui::style::Style::default());
        buffer.set_string(0, 1, "World", ratatui::style::Style::default());

        assert_eq!(buffer_to_string(&buffer), "Hello\nWorld\n");
    }
}
