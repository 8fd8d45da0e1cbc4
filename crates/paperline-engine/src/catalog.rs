//! The paper and event catalog.
//!
//! The catalog is the data provider for the timeline: a static, hand-authored
//! list embedded in the binary, or a JSON file with the same shape.

use crate::item::{ItemId, OrderingMode, TimelineItem};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Embedded reading list and AI history events.
const BUILTIN_CATALOG: &str = include_str!("../data/catalog.json");

/// Anything that can supply timeline items in a given order.
pub trait ItemSource {
    /// List items ordered for `mode`.
    fn list_items(&self, mode: OrderingMode) -> Vec<TimelineItem>;
}

/// An immutable collection of timeline items, unique by ID.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<TimelineItem>,
}

impl Catalog {
    /// Build a catalog, dropping duplicate IDs.
    ///
    /// A later entry with the same ID replaces the earlier one but keeps the
    /// earlier entry's position.
    pub fn new(items: Vec<TimelineItem>) -> Self {
        let mut index: HashMap<ItemId, usize> = HashMap::with_capacity(items.len());
        let mut unique: Vec<TimelineItem> = Vec::with_capacity(items.len());

        for item in items {
            if let Some(&pos) = index.get(&item.id) {
                warn!(id = %item.id, "duplicate item id, keeping the later entry");
                unique[pos] = item;
            } else {
                index.insert(item.id.clone(), unique.len());
                unique.push(item);
            }
        }

        Self { items: unique }
    }

    /// The catalog shipped with paperline.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Parse a catalog from a JSON array of items.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let items: Vec<TimelineItem> = serde_json::from_str(json)?;
        debug!(count = items.len(), "parsed catalog");
        Ok(Self::new(items))
    }

    /// Load a catalog from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// All items in catalog order.
    pub fn items(&self) -> &[TimelineItem] {
        &self.items
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the catalog has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up an item by ID.
    pub fn get(&self, id: &ItemId) -> Option<&TimelineItem> {
        self.items.iter().find(|item| &item.id == id)
    }
}

impl ItemSource for Catalog {
    fn list_items(&self, mode: OrderingMode) -> Vec<TimelineItem> {
        let mut items = self.items.clone();
        match mode {
            // Stable: same-date items keep catalog order, dateless items go last.
            OrderingMode::Chronological => items.sort_by_key(|item| (item.date.is_none(), item.date)),
            // Stable: unranked items go last in catalog order.
            OrderingMode::Curated => items.sort_by_key(|item| (item.rank.is_none(), item.rank)),
        }
        items
    }
}

/// Errors that can occur when loading a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// I/O error reading the catalog file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The catalog JSON is malformed.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
