//! paperline-engine: Headless layout engine for the AI paper timeline
//!
//! This crate provides the core logic for paperline, including:
//! - The paper and event catalog
//! - Chronological and curated layout with a per-session position cache
//! - Duration lengths for spanning events
//! - Active-item tracking with debounced change notification
//! - Configuration and reading list export

pub mod active;
pub mod calendar;
pub mod catalog;
pub mod config;
pub mod export;
pub mod item;
pub mod layout;

// Re-export commonly used types
pub use active::{ActiveChange, ActiveTracker, Crossing, SubscriptionId};
pub use catalog::{Catalog, CatalogError, ItemSource};
pub use config::{Config, ConfigError, DurationSpan, LayoutConfig};
pub use export::{export_csv, export_json, reading_list, write_export, ExportError, ExportFormat};
pub use item::{parse_date, ContentBlock, ItemId, ItemKind, OrderingMode, Slide, TimelineItem};
pub use layout::{
    arrange, format_cursor_date, Layout, LayoutEngine, Placement, UnorderableItem,
    UnorderableReason, YearMarker,
};

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
