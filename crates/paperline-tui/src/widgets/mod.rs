//! UI widgets for the TUI.
//!
//! This module provides:
//! - [`StatusBar`] - Bottom status bar with mode, cursor date, and hints

mod status_bar;

pub use status_bar::{StatusBar, StatusBarContent};
