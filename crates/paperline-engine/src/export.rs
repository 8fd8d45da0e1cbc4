//! Reading list export.
//!
//! Writes the curated paper list as pretty JSON or as CSV with the columns
//! `order,date,title,authors,link`.

use crate::item::{OrderingMode, TimelineItem};
use crate::catalog::ItemSource;
use std::path::Path;
use tracing::info;

/// Output format for an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Pretty-printed JSON array.
    Json,
    /// Comma-separated values with a header row.
    Csv,
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// Papers in curated order. Events are timeline context, not reading.
pub fn reading_list(source: &impl ItemSource) -> Vec<TimelineItem> {
    source
        .list_items(OrderingMode::Curated)
        .into_iter()
        .filter(TimelineItem::is_paper)
        .collect()
}

/// Render items as a pretty JSON array.
pub fn export_json(items: &[TimelineItem]) -> Result<String, ExportError> {
    serde_json::to_string_pretty(items).map_err(ExportError::Serialize)
}

/// Render items as CSV.
///
/// Title, authors and link are always quoted; order and date are written as-is.
pub fn export_csv(items: &[TimelineItem]) -> String {
    let mut out = String::from("order,date,title,authors,link\n");
    for item in items {
        let order = item.rank.map(|r| r.to_string()).unwrap_or_default();
        let date = item
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let title = quote(&item.title);
        let authors = quote(item.authors.as_deref().unwrap_or_default());
        let link = quote(item.link.as_deref().unwrap_or_default());
        out.push_str(&format!("{order},{date},{title},{authors},{link}\n"));
    }
    out
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Write an export to `path`, creating parent directories.
pub fn write_export(
    items: &[TimelineItem],
    format: ExportFormat,
    path: &Path,
) -> Result<(), ExportError> {
    let content = match format {
        ExportFormat::Json => export_json(items)?,
        ExportFormat::Csv => export_csv(items),
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(ExportError::Io)?;
    }
    std::fs::write(path, content).map_err(ExportError::Io)?;
    info!(%format, path = %path.display(), count = items.len(), "exported reading list");
    Ok(())
}

/// Errors that can occur when exporting.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// I/O error writing the export.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error serializing items to JSON.
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),
}
