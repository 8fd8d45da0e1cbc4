//! Timeline layout engine.
//!
//! Turns an item list and an ordering mode into vertical offsets:
//!
//! - Chronological: items sorted by date, each at least `minimum_gap` below
//!   the previous one and further apart when more time has elapsed
//!   (`months_scale` units per month).
//! - Curated: ranked items (then unranked papers) spaced exactly
//!   `minimum_gap` apart, with unranked events pinned next to the paper
//!   closest to them in time.
//!
//! Positions are memoized per `(item, mode)` for the current session so that
//! incremental re-layouts never move an item that was already placed.

use crate::active::{ActiveChange, ActiveTracker, Crossing, SubscriptionId};
use crate::calendar::{add_months_floor, months_between};
use crate::config::{ConfigError, DurationSpan, LayoutConfig};
use crate::item::{ItemId, ItemKind, OrderingMode, TimelineItem};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use tracing::{debug, warn};

/// Where an item landed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    /// The placed item.
    pub id: ItemId,
    /// Paper or event.
    pub kind: ItemKind,
    /// Item date, if any.
    pub date: Option<NaiveDate>,
    /// Offset from the top of the timeline, in layout units.
    pub offset: f64,
    /// Length of the duration indicator for spanning events.
    pub duration: Option<f64>,
}

impl Placement {
    /// Offset of the bottom of the item's extent.
    pub fn end(&self) -> f64 {
        self.offset + self.duration.unwrap_or(0.0)
    }
}

/// Why an item could not be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnorderableReason {
    /// Neither a date nor a rank.
    MissingDateAndRank,
    /// Chronological mode needs a date.
    MissingDate,
    /// An unranked event with no dated paper to pin it to.
    NoAnchor,
    /// Another item with the same ID was already placed.
    DuplicateId,
}

/// An item excluded from the layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnorderableItem {
    /// The excluded item.
    pub id: ItemId,
    /// Its title, for diagnostics.
    pub title: String,
    /// Why it was excluded.
    pub reason: UnorderableReason,
}

/// First offset of each calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearMarker {
    /// Calendar year.
    pub year: i32,
    /// Offset of the first item dated in that year.
    pub offset: f64,
}

/// Result of laying out an item list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    /// Mode the layout was computed for.
    pub mode: OrderingMode,
    /// Placed items in position order.
    pub placements: Vec<Placement>,
    /// Items that could not be placed.
    pub excluded: Vec<UnorderableItem>,
    /// Total height in layout units (zero when nothing was placed).
    pub height: f64,
    /// Earliest date among placed items.
    pub first_date: Option<NaiveDate>,
}

impl Layout {
    /// Whether nothing was placed.
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Placement for an item.
    pub fn placement(&self, id: &ItemId) -> Option<&Placement> {
        self.placements.iter().find(|p| &p.id == id)
    }

    /// Offset for an item.
    pub fn offset_of(&self, id: &ItemId) -> Option<f64> {
        self.placement(id).map(|p| p.offset)
    }

    /// Year gutter markers (chronological layouts only).
    pub fn year_markers(&self) -> Vec<YearMarker> {
        if self.mode != OrderingMode::Chronological {
            return Vec::new();
        }
        let mut markers: Vec<YearMarker> = Vec::new();
        for placement in &self.placements {
            let Some(date) = placement.date else { continue };
            if markers.last().is_some_and(|m| m.year == date.year()) {
                continue;
            }
            markers.push(YearMarker {
                year: date.year(),
                offset: placement.offset,
            });
        }
        markers
    }
}

/// Memoized positions keyed by item identity and mode.
#[derive(Debug, Default)]
pub struct PositionCache {
    positions: HashMap<(ItemId, OrderingMode), f64>,
}

impl PositionCache {
    /// Cached offset, if assigned.
    pub fn get(&self, id: &ItemId, mode: OrderingMode) -> Option<f64> {
        self.positions.get(&(id.clone(), mode)).copied()
    }

    /// Assign an offset. An existing assignment is never overwritten.
    pub fn insert(&mut self, id: &ItemId, mode: OrderingMode, offset: f64) -> f64 {
        *self.positions.entry((id.clone(), mode)).or_insert(offset)
    }

    /// Number of cached positions.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Drop every cached position.
    pub fn clear(&mut self) {
        self.positions.clear();
    }
}

/// Items in placement order plus the ones that could not be ordered.
#[derive(Debug)]
pub struct Arrangement<'a> {
    /// Items in position order.
    pub ordered: Vec<&'a TimelineItem>,
    /// Items left out.
    pub excluded: Vec<UnorderableItem>,
}

/// Order items for `mode` without assigning offsets.
pub fn arrange(items: &[TimelineItem], mode: OrderingMode) -> Arrangement<'_> {
    let mut excluded = Vec::new();
    let mut seen: HashSet<&ItemId> = HashSet::with_capacity(items.len());
    let mut candidates: Vec<&TimelineItem> = Vec::with_capacity(items.len());

    for item in items {
        if !seen.insert(&item.id) {
            excluded.push(unorderable(item, UnorderableReason::DuplicateId));
        } else if item.date.is_none() && item.rank.is_none() {
            excluded.push(unorderable(item, UnorderableReason::MissingDateAndRank));
        } else {
            candidates.push(item);
        }
    }

    let ordered = match mode {
        OrderingMode::Chronological => arrange_chronological(candidates, &mut excluded),
        OrderingMode::Curated => arrange_curated(candidates, &mut excluded),
    };

    Arrangement { ordered, excluded }
}

fn unorderable(item: &TimelineItem, reason: UnorderableReason) -> UnorderableItem {
    UnorderableItem {
        id: item.id.clone(),
        title: item.title.clone(),
        reason,
    }
}

fn arrange_chronological<'a>(
    candidates: Vec<&'a TimelineItem>,
    excluded: &mut Vec<UnorderableItem>,
) -> Vec<&'a TimelineItem> {
    let (mut dated, undated): (Vec<_>, Vec<_>) =
        candidates.into_iter().partition(|item| item.date.is_some());
    excluded.extend(
        undated
            .into_iter()
            .map(|item| unorderable(item, UnorderableReason::MissingDate)),
    );
    // Stable: ties keep input order.
    dated.sort_by_key(|item| item.date);
    dated
}

fn arrange_curated<'a>(
    candidates: Vec<&'a TimelineItem>,
    excluded: &mut Vec<UnorderableItem>,
) -> Vec<&'a TimelineItem> {
    let mut spine: Vec<&TimelineItem> = Vec::new();
    let mut annotations: Vec<&TimelineItem> = Vec::new();
    for item in candidates {
        if item.rank.is_none() && item.kind == ItemKind::Event {
            annotations.push(item);
        } else {
            spine.push(item);
        }
    }
    // Stable: unranked papers follow ranked items in input order.
    spine.sort_by_key(|item| (item.rank.is_none(), item.rank));
    annotations.sort_by_key(|item| item.date);

    let mut before: Vec<Vec<&TimelineItem>> = vec![Vec::new(); spine.len()];
    let mut after: Vec<Vec<&TimelineItem>> = vec![Vec::new(); spine.len()];

    for event in annotations {
        let Some(date) = event.date else {
            excluded.push(unorderable(event, UnorderableReason::NoAnchor));
            continue;
        };
        let Some((anchor, anchor_date)) = nearest_anchor(&spine, date) else {
            excluded.push(unorderable(event, UnorderableReason::NoAnchor));
            continue;
        };
        if date < anchor_date {
            before[anchor].push(event);
        } else {
            after[anchor].push(event);
        }
    }

    let mut ordered = Vec::new();
    for (i, item) in spine.into_iter().enumerate() {
        ordered.append(&mut before[i]);
        ordered.push(item);
        ordered.append(&mut after[i]);
    }
    ordered
}

/// Spine index of the paper whose date is closest to `date`; ties go to the
/// earlier index. Ranked events on the spine are never anchors.
fn nearest_anchor(spine: &[&TimelineItem], date: NaiveDate) -> Option<(usize, NaiveDate)> {
    let mut best: Option<(usize, NaiveDate, i64)> = None;
    for (i, item) in spine.iter().enumerate() {
        if item.kind != ItemKind::Paper {
            continue;
        }
        let Some(anchor_date) = item.date else { continue };
        let distance = (anchor_date - date).num_days().abs();
        let closer = match best {
            None => true,
            Some((_, _, best_distance)) => distance < best_distance,
        };
        if closer {
            best = Some((i, anchor_date, distance));
        }
    }
    best.map(|(i, d, _)| (i, d))
}

/// Fingerprint of everything in an item list that affects layout.
fn fingerprint(items: &[TimelineItem]) -> String {
    let mut hasher = Sha256::new();
    for item in items {
        hasher.update(item.id.as_str().as_bytes());
        hasher.update([0u8]);
        hasher.update(item.kind.to_string().as_bytes());
        hasher.update(format!("|{:?}|{:?}|{:?}\n", item.date, item.rank, item.duration_end));
    }
    let result = hasher.finalize();
    format!("{result:x}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Session {
    fingerprint: String,
    mode: OrderingMode,
}

/// Lays out timeline items and tracks the active one.
///
/// One engine instance owns one logical timeline view: its position cache,
/// the reference date, and the active-item tracker.
#[derive(Debug)]
pub struct LayoutEngine {
    config: LayoutConfig,
    cache: PositionCache,
    session: Option<Session>,
    tracker: ActiveTracker,
}

impl LayoutEngine {
    /// Create an engine, rejecting invalid configuration.
    pub fn new(config: LayoutConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            cache: PositionCache::default(),
            session: None,
            tracker: ActiveTracker::new(config.debounce()),
        })
    }

    /// The engine's configuration.
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// The position cache.
    pub fn cache(&self) -> &PositionCache {
        &self.cache
    }

    /// Clear cached positions, the session, and the active item.
    ///
    /// Subscriptions survive a reset.
    pub fn reset(&mut self) {
        self.cache.clear();
        self.session = None;
        self.tracker.reset();
    }

    /// Offset of `item` given the items before it in mode order.
    ///
    /// Returns the cached value when one exists. Otherwise walks forward from
    /// the nearest cached predecessor (or from zero), assigning and caching
    /// every position on the way.
    pub fn compute_position(
        &mut self,
        item: &TimelineItem,
        preceding: &[&TimelineItem],
        mode: OrderingMode,
    ) -> f64 {
        if let Some(offset) = self.cache.get(&item.id, mode) {
            return offset;
        }

        let resume = preceding
            .iter()
            .rposition(|p| self.cache.get(&p.id, mode).is_some());
        let mut prev: Option<(&TimelineItem, f64)> = resume.and_then(|i| {
            self.cache
                .get(&preceding[i].id, mode)
                .map(|offset| (preceding[i], offset))
        });
        let start = resume.map_or(0, |i| i + 1);

        for current in preceding[start..].iter().copied().chain(std::iter::once(item)) {
            let offset = match prev {
                None => 0.0,
                Some((p, p_offset)) => p_offset + self.step(p, current, mode),
            };
            let offset = self.cache.insert(&current.id, mode, offset);
            prev = Some((current, offset));
        }

        prev.map_or(0.0, |(_, offset)| offset)
    }

    /// Distance between consecutive items.
    fn step(&self, prev: &TimelineItem, current: &TimelineItem, mode: OrderingMode) -> f64 {
        let gap = self.config.minimum_gap;
        match mode {
            OrderingMode::Curated => gap,
            OrderingMode::Chronological => match (prev.date, current.date) {
                (Some(a), Some(b)) => gap.max(self.config.months_scale * months_between(a, b)),
                _ => gap,
            },
        }
    }

    /// Rendered length of a spanning event, clamped for invalid ranges.
    pub fn compute_duration_length(&self, item: &TimelineItem) -> Option<DurationSpan> {
        let span = self.config.duration_length(item)?;
        if span.invalid_range {
            debug!(id = %item.id, months = span.months, "invalid duration range, clamped");
        }
        Some(span)
    }

    /// Lay out `items` for `mode`.
    ///
    /// Data problems never fail the layout: invalid ranges are clamped and
    /// unorderable items are returned in [`Layout::excluded`]. A changed item
    /// list or mode starts a new session, invalidating cached positions and
    /// the active item.
    pub fn layout(&mut self, items: &[TimelineItem], mode: OrderingMode) -> Layout {
        let session_changed = self.begin_session(items, mode);

        let Arrangement { ordered, excluded } = arrange(items, mode);
        for item in &excluded {
            warn!(id = %item.id, reason = ?item.reason, %mode, "item excluded from layout");
        }

        let mut placements = Vec::with_capacity(ordered.len());
        for (i, item) in ordered.iter().enumerate() {
            let offset = self.compute_position(item, &ordered[..i], mode);
            placements.push(Placement {
                id: item.id.clone(),
                kind: item.kind,
                date: item.date,
                offset,
                duration: self.compute_duration_length(item).map(|span| span.length),
            });
        }

        let height = placements
            .iter()
            .map(Placement::end)
            .reduce(f64::max)
            .map_or(0.0, |bottom| bottom + self.config.minimum_gap);
        let first_date = ordered.iter().filter_map(|item| item.date).min();

        if session_changed {
            self.tracker.set_order(
                placements
                    .iter()
                    .filter(|p| p.kind == ItemKind::Paper)
                    .map(|p| p.id.clone()),
            );
        }

        Layout {
            mode,
            placements,
            excluded,
            height,
            first_date,
        }
    }

    /// Start a new session if the list or mode changed. Returns whether it did.
    fn begin_session(&mut self, items: &[TimelineItem], mode: OrderingMode) -> bool {
        let next = Session {
            fingerprint: fingerprint(items),
            mode,
        };
        if self.session.as_ref() == Some(&next) {
            return false;
        }
        debug!(%mode, cached = self.cache.len(), "new layout session, position cache invalidated");
        self.cache.clear();
        self.tracker.reset();
        self.session = Some(next);
        true
    }

    /// Record a trigger line crossing reported by the presentation layer.
    ///
    /// Returns `false` for items that cannot become active (events, unknown IDs).
    pub fn record_crossing(&mut self, id: &ItemId, crossing: Crossing, now: Instant) -> bool {
        self.tracker.record(id, crossing, now)
    }

    /// Report an active-item change once the debounce window has closed.
    pub fn poll_active(&mut self, now: Instant) -> Option<ActiveChange> {
        self.tracker.poll(now)
    }

    /// Report an active-item change immediately.
    pub fn flush_active(&mut self) -> Option<ActiveChange> {
        self.tracker.flush()
    }

    /// The current active item.
    pub fn active(&self) -> Option<&ItemId> {
        self.tracker.active()
    }

    /// Register an active-item callback.
    pub fn subscribe_active(
        &mut self,
        on_change: impl FnMut(&ActiveChange) + 'static,
    ) -> SubscriptionId {
        self.tracker.subscribe(on_change)
    }

    /// Remove an active-item callback.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.tracker.unsubscribe(id)
    }

    /// Date shown in the cursor label for a scroll position (layout units).
    ///
    /// Curated layouts show the active item's date (or the first dated item
    /// before anything is active). Chronological layouts interpolate from the
    /// first date at `months_scale` units per month.
    pub fn cursor_date(&self, layout: &Layout, scroll_offset: f64) -> Option<NaiveDate> {
        if layout.is_empty() {
            return None;
        }
        match layout.mode {
            OrderingMode::Curated => self
                .active()
                .and_then(|id| layout.placement(id))
                .and_then(|p| p.date)
                .or_else(|| layout.placements.iter().find_map(|p| p.date)),
            OrderingMode::Chronological => {
                let first = layout.first_date?;
                Some(add_months_floor(first, scroll_offset / self.config.months_scale))
            }
        }
    }
}

/// Format a cursor date as `Mon YYYY`.
pub fn format_cursor_date(date: NaiveDate) -> String {
    date.format("%b %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn engine(minimum_gap: f64, months_scale: f64) -> LayoutEngine {
        LayoutEngine::new(LayoutConfig {
            minimum_gap,
            months_scale,
            ..LayoutConfig::default()
        })
        .unwrap()
    }

    fn offsets(layout: &Layout) -> Vec<f64> {
        layout.placements.iter().map(|p| p.offset).collect()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let result = LayoutEngine::new(LayoutConfig {
            minimum_gap: -5.0,
            ..LayoutConfig::default()
        });
        assert!(matches!(result, Err(ConfigError::InvalidMinimumGap(_))));
    }

    #[test]
    fn test_empty_input() {
        let mut engine = engine(15.0, 1.0);
        let layout = engine.layout(&[], OrderingMode::Chronological);
        assert!(layout.is_empty());
        assert!(layout.excluded.is_empty());
        assert!(approx(layout.height, 0.0));
        assert!(engine.active().is_none());
        assert!(engine.cursor_date(&layout, 0.0).is_none());
    }

    #[test]
    fn test_same_date_cluster_uses_minimum_gap() {
        let g = 15.0;
        let mut engine = engine(g, 1.0);
        let items: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|id| TimelineItem::paper(*id, id.to_uppercase(), Some(date(2022, 1, 1))))
            .collect();
        let layout = engine.layout(&items, OrderingMode::Chronological);
        assert_eq!(offsets(&layout), vec![0.0, g, 2.0 * g]);
    }

    #[test]
    fn test_large_date_gap_is_proportional() {
        let mut engine = engine(5.0, 1.0);
        let items = vec![
            TimelineItem::paper("old", "Old", Some(date(2015, 1, 1))),
            TimelineItem::paper("new", "New", Some(date(2020, 1, 1))),
        ];
        let layout = engine.layout(&items, OrderingMode::Chronological);
        let o = offsets(&layout);
        assert!(approx(o[1] - o[0], 60.0));
    }

    #[test]
    fn test_curated_spacing_ignores_dates() {
        let mut engine = engine(15.0, 1.0);
        let items = vec![
            TimelineItem::paper("r3", "Three", Some(date(1993, 7, 1))).with_rank(3),
            TimelineItem::paper("r1", "One", Some(date(2017, 8, 1))).with_rank(1),
            TimelineItem::paper("r5", "Five", Some(date(2004, 6, 4))).with_rank(5),
            TimelineItem::paper("r2", "Two", Some(date(2011, 9, 23))).with_rank(2),
            TimelineItem::paper("r4", "Four", Some(date(2015, 5, 21))).with_rank(4),
        ];
        let layout = engine.layout(&items, OrderingMode::Curated);
        let ids: Vec<_> = layout.placements.iter().map(|p| p.id.to_string()).collect();
        assert_eq!(ids, vec!["r1", "r2", "r3", "r4", "r5"]);
        assert_eq!(offsets(&layout), vec![0.0, 15.0, 30.0, 45.0, 60.0]);
    }

    #[test]
    fn test_malformed_event_gets_minimum_length() {
        let mut engine = LayoutEngine::new(LayoutConfig {
            min_duration_length: 4.0,
            ..LayoutConfig::default()
        })
        .unwrap();
        let items = vec![TimelineItem::event("bad", "Backwards", Some(date(2020, 6, 1)))
            .with_duration_end(date(2020, 1, 1))];
        let layout = engine.layout(&items, OrderingMode::Chronological);
        assert_eq!(layout.placements[0].duration, Some(4.0));
        assert!(layout.excluded.is_empty());
    }

    #[test]
    fn test_chronological_monotonic_with_minimum_gap() {
        let g = 15.0;
        let mut engine = engine(g, 1.0);
        let catalog = crate::catalog::Catalog::builtin().unwrap();
        let layout = engine.layout(catalog.items(), OrderingMode::Chronological);

        assert_eq!(layout.placements.len(), catalog.len());
        for pair in layout.placements.windows(2) {
            assert!(pair[0].date <= pair[1].date);
            assert!(pair[1].offset - pair[0].offset >= g - 1e-9);
        }
    }

    #[test]
    fn test_curated_minimum_gap_with_annotations() {
        let g = 15.0;
        let mut engine = engine(g, 1.0);
        let catalog = crate::catalog::Catalog::builtin().unwrap();
        let layout = engine.layout(catalog.items(), OrderingMode::Curated);

        assert_eq!(layout.placements.len(), catalog.len());
        for pair in layout.placements.windows(2) {
            assert!(approx(pair[1].offset - pair[0].offset, g));
        }
        // Ranked papers keep rank order.
        let ranks: Vec<u32> = layout
            .placements
            .iter()
            .filter_map(|p| catalog.get(&p.id).and_then(|item| item.rank))
            .collect();
        assert!(ranks.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_events_pinned_to_nearest_paper() {
        let mut engine = engine(10.0, 1.0);
        let items = vec![
            TimelineItem::paper("p1", "P1", Some(date(2017, 8, 1))).with_rank(1),
            TimelineItem::paper("p2", "P2", Some(date(2011, 9, 23))).with_rank(2),
            TimelineItem::paper("p3", "P3", Some(date(2015, 5, 21))).with_rank(3),
            // Closest to p2, earlier than it.
            TimelineItem::event("e-watson", "Watson", Some(date(2011, 1, 1))),
            // Closest to p1, later than it.
            TimelineItem::event("e-gpt1", "GPT-1", Some(date(2018, 6, 1))),
            // Closest to p3, later than it.
            TimelineItem::event("e-alphago", "AlphaGo", Some(date(2016, 1, 1))),
        ];
        let layout = engine.layout(&items, OrderingMode::Curated);
        let ids: Vec<_> = layout.placements.iter().map(|p| p.id.to_string()).collect();
        assert_eq!(
            ids,
            vec!["p1", "e-gpt1", "e-watson", "p2", "p3", "e-alphago"]
        );
        assert_eq!(offsets(&layout), vec![0.0, 10.0, 20.0, 30.0, 40.0, 50.0]);
    }

    #[test]
    fn test_ranked_events_are_not_anchors() {
        let mut engine = engine(15.0, 1.0);
        let items = vec![
            TimelineItem::paper("p1", "P1", Some(date(2012, 1, 1))).with_rank(1),
            TimelineItem::event("ranked-ev", "Ranked event", Some(date(1990, 1, 1))).with_rank(2),
            TimelineItem::paper("p3", "P3", Some(date(2020, 1, 1))).with_rank(3),
            // Nearest to the ranked event, but pinned to the nearest paper.
            TimelineItem::event("loose", "Loose event", Some(date(1991, 1, 1))),
        ];
        let layout = engine.layout(&items, OrderingMode::Curated);
        let ids: Vec<_> = layout.placements.iter().map(|p| p.id.to_string()).collect();
        assert_eq!(ids, vec!["loose", "p1", "ranked-ev", "p3"]);
    }

    #[test]
    fn test_event_with_only_ranked_event_anchor_excluded() {
        let mut engine = engine(15.0, 1.0);
        let items = vec![
            TimelineItem::event("ranked-ev", "Ranked event", Some(date(1990, 1, 1))).with_rank(1),
            TimelineItem::event("loose", "Loose event", Some(date(1991, 1, 1))),
        ];
        let layout = engine.layout(&items, OrderingMode::Curated);
        assert_eq!(layout.placements.len(), 1);
        assert_eq!(layout.excluded[0].id, ItemId::new("loose"));
        assert_eq!(layout.excluded[0].reason, UnorderableReason::NoAnchor);
    }

    #[test]
    fn test_curated_span_length_stays_time_proportional() {
        let mut engine = engine(15.0, 1.0);
        let items = vec![
            TimelineItem::event("w", "Winter", Some(date(1974, 1, 1)))
                .with_rank(1)
                .with_duration_end(date(1980, 1, 1)),
            TimelineItem::paper("a", "A", Some(date(1975, 1, 1))).with_rank(2),
        ];
        let layout = engine.layout(&items, OrderingMode::Curated);
        let winter = layout.placement(&ItemId::new("w")).unwrap();
        assert!(approx(winter.duration.unwrap(), 72.0));
        assert!(approx(layout.offset_of(&ItemId::new("a")).unwrap(), 15.0));
        assert!(approx(layout.height, 72.0 + 15.0));
    }

    #[test]
    fn test_unorderable_items_reported() {
        let mut engine = engine(15.0, 1.0);
        let items = vec![
            TimelineItem::paper("ok", "Fine", Some(date(2020, 1, 1))).with_rank(1),
            TimelineItem::paper("lost", "No date or rank", None),
            TimelineItem::paper("ranked", "Rank only", None).with_rank(2),
            TimelineItem::event("floating", "Undated event", None).with_rank(3),
        ];

        let chrono = engine.layout(&items, OrderingMode::Chronological);
        assert_eq!(chrono.placements.len(), 1);
        let reasons: Vec<_> = chrono.excluded.iter().map(|e| (e.id.to_string(), e.reason)).collect();
        assert_eq!(
            reasons,
            vec![
                ("lost".to_string(), UnorderableReason::MissingDateAndRank),
                ("ranked".to_string(), UnorderableReason::MissingDate),
                ("floating".to_string(), UnorderableReason::MissingDate),
            ]
        );

        let curated = engine.layout(&items, OrderingMode::Curated);
        assert_eq!(curated.placements.len(), 3);
        assert_eq!(curated.excluded.len(), 1);
        assert_eq!(curated.excluded[0].reason, UnorderableReason::MissingDateAndRank);
    }

    #[test]
    fn test_event_without_anchor_excluded() {
        let mut engine = engine(15.0, 1.0);
        let items = vec![
            TimelineItem::paper("undated", "Undated", None).with_rank(1),
            TimelineItem::event("e", "Event", Some(date(2000, 1, 1))),
        ];
        let layout = engine.layout(&items, OrderingMode::Curated);
        assert_eq!(layout.placements.len(), 1);
        assert_eq!(layout.excluded[0].reason, UnorderableReason::NoAnchor);
    }

    #[test]
    fn test_duplicate_ids_excluded() {
        let mut engine = engine(15.0, 1.0);
        let items = vec![
            TimelineItem::paper("dup", "First", Some(date(2020, 1, 1))),
            TimelineItem::paper("dup", "Second", Some(date(2021, 1, 1))),
        ];
        let layout = engine.layout(&items, OrderingMode::Chronological);
        assert_eq!(layout.placements.len(), 1);
        assert_eq!(layout.excluded[0].title, "Second");
        assert_eq!(layout.excluded[0].reason, UnorderableReason::DuplicateId);
    }

    #[test]
    fn test_layout_is_idempotent() {
        let mut engine = engine(15.0, 1.0);
        let catalog = crate::catalog::Catalog::builtin().unwrap();
        for mode in [OrderingMode::Chronological, OrderingMode::Curated] {
            let first = engine.layout(catalog.items(), mode);
            let second = engine.layout(catalog.items(), mode);
            let a: Vec<u64> = first.placements.iter().map(|p| p.offset.to_bits()).collect();
            let b: Vec<u64> = second.placements.iter().map(|p| p.offset.to_bits()).collect();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_cached_positions_never_move() {
        let mut engine = engine(15.0, 1.0);
        let a = TimelineItem::paper("a", "A", Some(date(2020, 1, 1)));
        let b = TimelineItem::paper("b", "B", Some(date(2020, 2, 1)));
        let mode = OrderingMode::Chronological;

        let first = engine.compute_position(&b, &[&a], mode);
        assert!(approx(first, 15.0));
        assert_eq!(engine.cache().len(), 2);

        // Same identity, different predecessors: the memoized value wins.
        let c = TimelineItem::paper("c", "C", Some(date(2010, 1, 1)));
        assert!(approx(engine.compute_position(&b, &[&c, &a], mode), first));
    }

    #[test]
    fn test_compute_position_resumes_from_cache() {
        let mut engine = engine(15.0, 1.0);
        let items: Vec<_> = (0..4)
            .map(|i| TimelineItem::paper(format!("p{i}"), "P", Some(date(2020, 1, 1))).with_rank(i + 1))
            .collect();
        let refs: Vec<&TimelineItem> = items.iter().collect();
        let mode = OrderingMode::Curated;

        // Computing the last item fills in every predecessor.
        assert!(approx(engine.compute_position(refs[3], &refs[..3], mode), 45.0));
        assert!(approx(engine.compute_position(refs[1], &refs[..1], mode), 15.0));
        assert_eq!(engine.cache().len(), 4);
    }

    #[test]
    fn test_list_change_invalidates_cache() {
        let mut engine = engine(15.0, 1.0);
        let mode = OrderingMode::Chronological;
        let items = vec![
            TimelineItem::paper("a", "A", Some(date(2020, 1, 1))),
            TimelineItem::paper("b", "B", Some(date(2020, 2, 1))),
        ];
        engine.layout(&items, mode);

        // Same ID, new date: the old position must not survive.
        let moved = vec![
            TimelineItem::paper("a", "A", Some(date(2020, 1, 1))),
            TimelineItem::paper("b", "B", Some(date(2030, 1, 1))),
        ];
        let layout = engine.layout(&moved, mode);
        assert!(approx(layout.offset_of(&ItemId::new("b")).unwrap(), 120.0));
    }

    #[test]
    fn test_mode_switch_invalidates_active_item() {
        let mut engine = engine(15.0, 1.0);
        let items = vec![
            TimelineItem::paper("a", "A", Some(date(2020, 1, 1))).with_rank(1),
            TimelineItem::paper("b", "B", Some(date(2019, 1, 1))).with_rank(2),
        ];
        engine.layout(&items, OrderingMode::Curated);
        engine.record_crossing(&ItemId::new("a"), Crossing::Entered, Instant::now());
        engine.flush_active();
        assert_eq!(engine.active(), Some(&ItemId::new("a")));

        let layout = engine.layout(&items, OrderingMode::Chronological);
        assert!(engine.active().is_none());
        assert_eq!(layout.placements[0].id, ItemId::new("b"));
    }

    #[test]
    fn test_only_papers_are_activatable() {
        let mut engine = engine(15.0, 1.0);
        let items = vec![
            TimelineItem::event("e", "Event", Some(date(2019, 1, 1))),
            TimelineItem::paper("p", "Paper", Some(date(2020, 1, 1))),
        ];
        engine.layout(&items, OrderingMode::Chronological);
        assert!(!engine.record_crossing(&ItemId::new("e"), Crossing::Entered, Instant::now()));
        assert!(engine.record_crossing(&ItemId::new("p"), Crossing::Entered, Instant::now()));
    }

    #[test]
    fn test_subscription_fires_after_debounce() {
        let mut engine = engine(15.0, 1.0);
        let items = vec![TimelineItem::paper("p", "Paper", Some(date(2020, 1, 1)))];
        engine.layout(&items, OrderingMode::Chronological);

        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        engine.subscribe_active(move |_| counter.set(counter.get() + 1));

        let now = Instant::now();
        engine.record_crossing(&ItemId::new("p"), Crossing::Entered, now);
        assert!(engine.poll_active(now).is_none());
        assert_eq!(calls.get(), 0);

        let debounce = engine.config().debounce();
        assert!(engine.poll_active(now + debounce + Duration::from_millis(1)).is_some());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_spanning_event_height() {
        let mut engine = engine(15.0, 1.0);
        let items = vec![
            TimelineItem::event("winter", "AI winter", Some(date(1974, 1, 1)))
                .with_duration_end(date(1980, 1, 1)),
            TimelineItem::event("blue", "Deep Blue", Some(date(1975, 1, 1))),
        ];
        let layout = engine.layout(&items, OrderingMode::Chronological);
        assert_eq!(layout.placements[0].duration, Some(72.0));
        // The span (0..72) reaches past the next item at 15.
        assert!(approx(layout.height, 72.0 + 15.0));
    }

    #[test]
    fn test_year_markers() {
        let mut engine = engine(15.0, 1.0);
        let items = vec![
            TimelineItem::paper("a", "A", Some(date(2015, 1, 1))),
            TimelineItem::paper("b", "B", Some(date(2015, 6, 1))),
            TimelineItem::paper("c", "C", Some(date(2017, 1, 1))),
        ];
        let layout = engine.layout(&items, OrderingMode::Chronological);
        let markers = layout.year_markers();
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].year, 2015);
        assert!(approx(markers[0].offset, 0.0));
        assert_eq!(markers[1].year, 2017);
        assert_eq!(Some(markers[1].offset), layout.offset_of(&ItemId::new("c")));

        let curated = engine.layout(&items, OrderingMode::Curated);
        assert!(curated.year_markers().is_empty());
    }

    #[test]
    fn test_cursor_date_chronological_interpolates() {
        let mut engine = engine(15.0, 1.0);
        let items = vec![
            TimelineItem::paper("a", "A", Some(date(2017, 8, 1))),
            TimelineItem::paper("b", "B", Some(date(2020, 1, 1))),
        ];
        let layout = engine.layout(&items, OrderingMode::Chronological);
        assert_eq!(engine.cursor_date(&layout, 0.0), Some(date(2017, 8, 1)));
        assert_eq!(engine.cursor_date(&layout, 5.5), Some(date(2018, 1, 1)));
        assert_eq!(engine.cursor_date(&layout, -10.0), Some(date(2017, 8, 1)));
    }

    #[test]
    fn test_cursor_date_curated_follows_active() {
        let mut engine = engine(15.0, 1.0);
        let items = vec![
            TimelineItem::paper("a", "A", Some(date(2017, 8, 1))).with_rank(1),
            TimelineItem::paper("b", "B", Some(date(2011, 9, 23))).with_rank(2),
        ];
        let layout = engine.layout(&items, OrderingMode::Curated);
        assert_eq!(engine.cursor_date(&layout, 100.0), Some(date(2017, 8, 1)));

        let now = Instant::now();
        engine.record_crossing(&ItemId::new("a"), Crossing::Entered, now);
        engine.record_crossing(&ItemId::new("b"), Crossing::Entered, now);
        engine.flush_active();
        assert_eq!(engine.cursor_date(&layout, 0.0), Some(date(2011, 9, 23)));
    }

    #[test]
    fn test_format_cursor_date() {
        insta::assert_snapshot!(format_cursor_date(date(2017, 8, 12)), @"Aug 2017");
    }
}
