//! Timeline pane.
//!
//! This module provides:
//! - [`TimelineState`] - Scroll position, viewport, and trigger line crossings
//! - [`TimelineWidget`] - Widget for rendering the timeline pane

mod state;
mod widget;

pub use state::{TimelineState, SCROLL_SPEED};
pub use widget::TimelineWidget;
