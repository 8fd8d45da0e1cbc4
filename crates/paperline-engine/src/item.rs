//! Timeline item types.
//!
//! Items are the papers and historical events shown on the timeline. They are
//! built once when the catalog loads and never mutated afterwards; the layout
//! engine derives positions from them without touching the source list.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable, caller-supplied identity for a timeline item.
///
/// Used as the position-cache key and the dedup key. Titles are display-only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Create an item ID from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// What kind of entry an item is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// A research paper (or article, course, book) on the reading list.
    Paper,
    /// A historical event, optionally spanning an interval.
    Event,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Paper => write!(f, "paper"),
            Self::Event => write!(f, "event"),
        }
    }
}

/// How items are ordered on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderingMode {
    /// Ordered by date, spaced proportionally to elapsed time.
    Chronological,
    /// Ordered by curated rank, spaced evenly.
    #[default]
    Curated,
}

impl OrderingMode {
    /// The other mode.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Chronological => Self::Curated,
            Self::Curated => Self::Chronological,
        }
    }
}

impl fmt::Display for OrderingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chronological => write!(f, "chronological"),
            Self::Curated => write!(f, "curated"),
        }
    }
}

impl FromStr for OrderingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chronological" | "date" => Ok(Self::Chronological),
            "curated" | "rank" => Ok(Self::Curated),
            other => Err(format!(
                "unknown ordering mode '{other}' (expected 'chronological' or 'curated')"
            )),
        }
    }
}

/// A block of content inside a detail slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentBlock {
    /// Free text paragraph(s).
    Text(String),
    /// Bullet list.
    Bullets(Vec<String>),
    /// Image reference (URL).
    Image(String),
    /// Video reference (URL).
    Video(String),
    /// Personal note or intuition about the paper.
    Intuition(String),
}

/// One page of an item's expanded detail view.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Slide {
    /// Optional heading shown above the slide.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Content blocks, in display order.
    #[serde(default)]
    pub blocks: Vec<ContentBlock>,
}

impl Slide {
    /// A slide holding a single text block.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            title: None,
            blocks: vec![ContentBlock::Text(content.into())],
        }
    }
}

/// A paper or event on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineItem {
    /// Stable identity.
    pub id: ItemId,
    /// Paper or event.
    pub kind: ItemKind,
    /// Calendar date; `None` when missing or unparseable.
    #[serde(default, with = "date_format")]
    pub date: Option<NaiveDate>,
    /// Display title.
    pub title: String,
    /// Curated rank (1-based); defines curated order when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    /// End of the interval for spanning events.
    #[serde(
        default,
        with = "date_format",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration_end: Option<NaiveDate>,
    /// Author list as a display string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<String>,
    /// External link to the paper.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Expanded detail slides.
    #[serde(default, rename = "slides", skip_serializing_if = "Vec::is_empty")]
    pub detail: Vec<Slide>,
}

impl TimelineItem {
    /// Create a paper.
    pub fn paper(id: impl Into<ItemId>, title: impl Into<String>, date: Option<NaiveDate>) -> Self {
        Self::new(id.into(), ItemKind::Paper, title.into(), date)
    }

    /// Create an event.
    pub fn event(id: impl Into<ItemId>, title: impl Into<String>, date: Option<NaiveDate>) -> Self {
        Self::new(id.into(), ItemKind::Event, title.into(), date)
    }

    fn new(id: ItemId, kind: ItemKind, title: String, date: Option<NaiveDate>) -> Self {
        Self {
            id,
            kind,
            date,
            title,
            rank: None,
            duration_end: None,
            authors: None,
            link: None,
            detail: Vec::new(),
        }
    }

    /// Set the curated rank.
    #[must_use]
    pub fn with_rank(mut self, rank: u32) -> Self {
        self.rank = Some(rank);
        self
    }

    /// Set the end of the spanned interval.
    #[must_use]
    pub fn with_duration_end(mut self, end: NaiveDate) -> Self {
        self.duration_end = Some(end);
        self
    }

    /// Set the author line.
    #[must_use]
    pub fn with_authors(mut self, authors: impl Into<String>) -> Self {
        self.authors = Some(authors.into());
        self
    }

    /// Set the external link.
    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// Append a detail slide.
    #[must_use]
    pub fn with_slide(mut self, slide: Slide) -> Self {
        self.detail.push(slide);
        self
    }

    /// Whether this item is a paper.
    pub fn is_paper(&self) -> bool {
        self.kind == ItemKind::Paper
    }

    /// Whether this item is an event spanning an interval.
    pub fn is_span(&self) -> bool {
        self.kind == ItemKind::Event && self.duration_end.is_some()
    }
}

/// Parse a catalog date string.
///
/// Accepts ISO dates (`2017-08-01`) and the day-month-year form used by the
/// hand-authored reading list (`01 Aug 2017`, `01 June 2018`).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    ["%Y-%m-%d", "%d %b %Y", "%d %B %Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Lenient serde adapter for optional dates.
///
/// An unparseable date deserializes to `None` so the layout engine can
/// report the item instead of failing the whole catalog.
mod date_format {
    use super::parse_date;
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};
    use tracing::warn;

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => s.serialize_str(&d.format("%Y-%m-%d").to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        Ok(raw.and_then(|raw| {
            let parsed = parse_date(&raw);
            if parsed.is_none() {
                warn!(date = %raw, "unparseable item date");
            }
            parsed
        }))
    }
}
