//! Catppuccin Mocha color palette for the TUI.

use ratatui::style::Color;

/// Theme color palette.
#[derive(Debug, Clone)]
pub struct Theme {
    // Backgrounds
    pub base: Color,
    pub surface: Color,

    // Foregrounds
    pub text: Color,
    pub subtext: Color,
    pub muted: Color,

    // Timeline roles
    pub active: Color,
    pub paper: Color,
    pub event: Color,
    pub span: Color,
    pub cursor: Color,

    // Semantic
    pub info: Color,
    pub warning: Color,

    // Borders
    pub border: Color,
    pub border_focused: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::mocha()
    }
}

impl Theme {
    /// Catppuccin Mocha theme (default dark theme).
    pub fn mocha() -> Self {
        Self {
            base: Color::Rgb(30, 30, 46),       // #1e1e2e
            surface: Color::Rgb(49, 50, 68),    // #313244

            text: Color::Rgb(205, 214, 244),    // #cdd6f4
            subtext: Color::Rgb(166, 173, 200), // #a6adc8
            muted: Color::Rgb(108, 112, 134),   // #6c7086

            active: Color::Rgb(137, 180, 250),  // #89b4fa (blue)
            paper: Color::Rgb(180, 190, 254),   // #b4befe (lavender)
            event: Color::Rgb(148, 226, 213),   // #94e2d5 (teal)
            span: Color::Rgb(250, 179, 135),    // #fab387 (peach)
            cursor: Color::Rgb(249, 226, 175),  // #f9e2af (yellow)

            info: Color::Rgb(137, 180, 250),    // #89b4fa (blue)
            warning: Color::Rgb(243, 139, 168), // #f38ba8 (red)

            border: Color::Rgb(69, 71, 90),            // #45475a
            border_focused: Color::Rgb(180, 190, 254), // #b4befe (lavender)
        }
    }

    /// High contrast theme for accessibility.
    pub fn high_contrast() -> Self {
        Self {
            base: Color::Black,
            surface: Color::Rgb(20, 20, 20),

            text: Color::White,
            subtext: Color::Rgb(200, 200, 200),
            muted: Color::Rgb(150, 150, 150),

            active: Color::Cyan,
            paper: Color::White,
            event: Color::Green,
            span: Color::Yellow,
            cursor: Color::Magenta,

            info: Color::Blue,
            warning: Color::Red,

            border: Color::White,
            border_focused: Color::Cyan,
        }
    }
}
