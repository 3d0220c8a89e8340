//! Grid model: cards, rectangles, and layouts.
//!
//! Coordinates are grid cells, origin at the top-left. Columns are bounded by
//! the column count handed to the compactor; rows are unbounded downward.
//!
//! `x`/`y` are signed so that dirty input (cards dragged past the left edge,
//! stale negative rows from an older layout) can be represented and cleaned up
//! instead of rejected.

use std::fmt;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};

/// An axis-aligned block of grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridRect {
    /// Left column (inclusive).
    pub x: i32,
    /// Top row (inclusive).
    pub y: i32,
    /// Width in columns.
    pub w: i32,
    /// Height in rows.
    pub h: i32,
}

impl GridRect {
    #[inline]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Right edge (exclusive), saturating at `i32::MAX`.
    #[inline]
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.w)
    }

    /// Bottom edge (exclusive), saturating at `i32::MAX`.
    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.h)
    }

    /// Area in cells; zero for degenerate rectangles.
    #[inline]
    pub const fn area(&self) -> i64 {
        if self.w <= 0 || self.h <= 0 {
            0
        } else {
            self.w as i64 * self.h as i64
        }
    }

    #[inline]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Whether the two rectangles share at least one cell.
    #[inline]
    pub const fn intersects(&self, other: &GridRect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// The same rectangle moved by `(dx, dy)`.
    #[inline]
    #[must_use]
    pub const fn shifted(self, dx: i32, dy: i32) -> Self {
        Self::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.w,
            self.h,
        )
    }

    #[inline]
    #[must_use]
    pub const fn with_x(self, x: i32) -> Self {
        Self::new(x, self.y, self.w, self.h)
    }

    /// Iterate every `(x, y)` cell, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + use<> {
        let GridRect { x, y, w, h } = *self;
        (y..y.saturating_add(h.max(0)))
            .flat_map(move |row| (x..x.saturating_add(w.max(0))).map(move |col| (col, row)))
    }
}

impl fmt::Display for GridRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{} {}x{})", self.x, self.y, self.w, self.h)
    }
}

/// One placed card.
///
/// Only `x`/`y` are ever changed by compaction. `min_w`/`max_w` travel with
/// the card for resize handles and column reflow; the compactor ignores them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayoutItem {
    #[serde(alias = "i")]
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    #[serde(default, rename = "minW", skip_serializing_if = "Option::is_none")]
    pub min_w: Option<i32>,
    #[serde(default, rename = "maxW", skip_serializing_if = "Option::is_none")]
    pub max_w: Option<i32>,
}

impl LayoutItem {
    #[must_use]
    pub fn new(id: impl Into<String>, x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            w,
            h,
            min_w: None,
            max_w: None,
        }
    }

    #[must_use]
    pub fn from_rect(id: impl Into<String>, rect: GridRect) -> Self {
        Self::new(id, rect.x, rect.y, rect.w, rect.h)
    }

    /// Attach resize bounds (builder pattern).
    #[must_use]
    pub fn with_width_bounds(mut self, min_w: Option<i32>, max_w: Option<i32>) -> Self {
        self.min_w = min_w;
        self.max_w = max_w;
        self
    }

    #[inline]
    pub const fn rect(&self) -> GridRect {
        GridRect::new(self.x, self.y, self.w, self.h)
    }

    #[inline]
    pub const fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Whether `w` lies outside the declared `minW..=maxW` range.
    pub fn violates_width_bounds(&self) -> bool {
        self.min_w.is_some_and(|min| self.w < min) || self.max_w.is_some_and(|max| self.w > max)
    }

    /// Deterministic ordering key: top-most first, then left-most, then id.
    #[inline]
    pub(crate) fn position_key(&self) -> (i32, i32, &str) {
        (self.y, self.x, self.id.as_str())
    }
}

/// A full set of card placements.
///
/// Item order carries no meaning for compaction but is preserved through it,
/// so callers can diff layouts positionally.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Layout {
    items: Vec<LayoutItem>,
}

impl Layout {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn items(&self) -> &[LayoutItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LayoutItem> {
        self.items.iter()
    }

    #[must_use]
    pub fn into_items(self) -> Vec<LayoutItem> {
        self.items
    }

    pub fn get(&self, id: &str) -> Option<&LayoutItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut LayoutItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn push(&mut self, item: LayoutItem) {
        self.items.push(item);
    }

    /// Remove a card, returning its last placement.
    pub fn remove(&mut self, id: &str) -> Option<LayoutItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    /// Ids in layout order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.id.as_str())
    }

    /// Sum of `w * h` over all cards.
    pub fn area(&self) -> i64 {
        self.items.iter().map(|item| item.rect().area()).sum()
    }

    /// First row below every card (0 for an empty layout).
    pub fn bottom(&self) -> i32 {
        self.items
            .iter()
            .map(|item| item.rect().bottom())
            .max()
            .unwrap_or(0)
            .max(0)
    }

    /// Sort cards top-to-bottom, left-to-right, for stable serialization.
    pub fn canonicalize(&mut self) {
        self.items.sort_by(|a, b| a.position_key().cmp(&b.position_key()));
    }

    /// Reject input that no placement on `columns` columns can satisfy.
    ///
    /// Rows are `i32`, so the cards stacked end to end (the tallest any
    /// compacted layout can get) must fit below `i32::MAX`.
    pub fn validate(&self, columns: u16) -> Result<()> {
        if columns == 0 {
            return Err(LayoutError::ZeroColumns);
        }
        let columns = i32::from(columns);
        let mut seen = FxHashSet::default();
        let mut stacked: i64 = 0;
        for item in &self.items {
            if item.id.is_empty() {
                return Err(LayoutError::invalid("", "id must not be empty"));
            }
            if item.w < 1 {
                return Err(LayoutError::invalid(
                    &item.id,
                    format!("width {} is below 1", item.w),
                ));
            }
            if item.w > columns {
                return Err(LayoutError::invalid(
                    &item.id,
                    format!("width {} exceeds {columns} columns", item.w),
                ));
            }
            if item.h < 1 {
                return Err(LayoutError::invalid(
                    &item.id,
                    format!("height {} is below 1", item.h),
                ));
            }
            stacked += i64::from(item.h);
            if stacked > i64::from(i32::MAX) {
                return Err(LayoutError::invalid(
                    &item.id,
                    format!("stacked height {stacked} exceeds {} rows", i32::MAX),
                ));
            }
            if !seen.insert(item.id.as_str()) {
                return Err(LayoutError::DuplicateId {
                    id: item.id.clone(),
                });
            }
        }
        Ok(())
    }
}

impl From<Vec<LayoutItem>> for Layout {
    fn from(items: Vec<LayoutItem>) -> Self {
        Self { items }
    }
}

impl FromIterator<LayoutItem> for Layout {
    fn from_iter<I: IntoIterator<Item = LayoutItem>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Layout {
    type Item = LayoutItem;
    type IntoIter = std::vec::IntoIter<LayoutItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Layout {
    type Item = &'a LayoutItem;
    type IntoIter = std::slice::Iter<'a, LayoutItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_edges_and_area() {
        let r = GridRect::new(1, 2, 3, 4);
        assert_eq!(r.right(), 4);
        assert_eq!(r.bottom(), 6);
        assert_eq!(r.area(), 12);
        assert!(r.contains(1, 2));
        assert!(!r.contains(4, 2)); // right edge is exclusive
        assert_eq!(GridRect::new(0, 0, 0, 5).area(), 0);
    }

    #[test]
    fn rect_intersection_is_cell_based() {
        let a = GridRect::new(0, 0, 2, 2);
        assert!(a.intersects(&GridRect::new(1, 1, 1, 1)));
        assert!(!a.intersects(&GridRect::new(2, 0, 1, 1))); // touching edges
        assert!(!a.intersects(&GridRect::new(0, 2, 2, 1)));
    }

    #[test]
    fn rect_cells_are_row_major() {
        let cells: Vec<_> = GridRect::new(1, 0, 2, 2).cells().collect();
        assert_eq!(cells, vec![(1, 0), (2, 0), (1, 1), (2, 1)]);
    }

    #[test]
    fn validate_accepts_dirty_positions() {
        let layout = Layout::from(vec![
            LayoutItem::new("a", -3, -1, 1, 1),
            LayoutItem::new("b", 7, 40, 2, 1),
            LayoutItem::new("c", 0, 0, 1, 1),
            LayoutItem::new("d", 0, 0, 1, 1),
        ]);
        assert_eq!(layout.validate(3), Ok(()));
    }

    #[test]
    fn validate_rejects_oversized_and_degenerate_items() {
        let wide = Layout::from(vec![LayoutItem::new("wide", 0, 0, 4, 1)]);
        assert!(matches!(
            wide.validate(3),
            Err(LayoutError::InvalidLayout { id, .. }) if id == "wide"
        ));

        let flat = Layout::from(vec![LayoutItem::new("flat", 0, 0, 1, 0)]);
        assert!(matches!(
            flat.validate(3),
            Err(LayoutError::InvalidLayout { .. })
        ));

        let thin = Layout::from(vec![LayoutItem::new("thin", 0, 0, 0, 1)]);
        assert!(thin.validate(3).is_err());
    }

    #[test]
    fn validate_rejects_duplicates_and_zero_columns() {
        let dup = Layout::from(vec![
            LayoutItem::new("x", 0, 0, 1, 1),
            LayoutItem::new("x", 1, 0, 1, 1),
        ]);
        assert_eq!(
            dup.validate(3),
            Err(LayoutError::DuplicateId { id: "x".into() })
        );
        assert_eq!(Layout::new().validate(0), Err(LayoutError::ZeroColumns));
    }

    #[test]
    fn rect_edges_saturate() {
        let r = GridRect::new(i32::MAX - 1, i32::MAX - 1, 5, 5);
        assert_eq!(r.right(), i32::MAX);
        assert_eq!(r.bottom(), i32::MAX);
        let moved = r.shifted(4, 4);
        assert_eq!((moved.x, moved.y), (i32::MAX, i32::MAX));
    }

    #[test]
    fn validate_caps_stacked_height() {
        let half = i32::MAX / 2 + 10;
        let tall = Layout::from(vec![
            LayoutItem::new("a", 0, 0, 1, half),
            LayoutItem::new("b", 0, 0, 1, half),
        ]);
        assert!(matches!(
            tall.validate(1),
            Err(LayoutError::InvalidLayout { id, .. }) if id == "b"
        ));

        let tower = Layout::from(vec![LayoutItem::new("t", 0, 0, 1, i32::MAX)]);
        assert_eq!(tower.validate(3), Ok(()));
    }

    #[test]
    fn layout_lookup_and_removal() {
        let mut layout = Layout::from(vec![
            LayoutItem::new("a", 0, 0, 1, 1),
            LayoutItem::new("b", 1, 0, 2, 3),
        ]);
        assert_eq!(layout.bottom(), 3);
        assert_eq!(layout.area(), 7);
        assert_eq!(layout.remove("a").map(|i| i.id), Some("a".to_string()));
        assert!(!layout.contains("a"));
        assert_eq!(layout.ids().collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn canonicalize_orders_by_row_then_column_then_id() {
        let mut layout = Layout::from(vec![
            LayoutItem::new("late", 0, 2, 1, 1),
            LayoutItem::new("right", 2, 0, 1, 1),
            LayoutItem::new("b", 0, 0, 1, 1),
            LayoutItem::new("a", 0, 0, 1, 1),
        ]);
        layout.canonicalize();
        assert_eq!(
            layout.ids().collect::<Vec<_>>(),
            vec!["a", "b", "right", "late"]
        );
    }

    #[test]
    fn serde_uses_dashboard_field_names() {
        let json = r#"[{"i":"chat","x":0,"y":1,"w":2,"h":3,"minW":1,"maxW":3}]"#;
        let layout: Layout = serde_json::from_str(json).unwrap();
        let item = &layout.items()[0];
        assert_eq!(item.id, "chat");
        assert_eq!(item.rect(), GridRect::new(0, 1, 2, 3));
        assert_eq!((item.min_w, item.max_w), (Some(1), Some(3)));

        let out = serde_json::to_value(&layout).unwrap();
        assert_eq!(out[0]["id"], "chat");
        assert_eq!(out[0]["minW"], 1);
        let bare = serde_json::to_value(LayoutItem::new("p", 0, 0, 1, 1)).unwrap();
        assert!(bare.get("minW").is_none());
    }

    #[test]
    fn width_bounds_violation() {
        let item = LayoutItem::new("a", 0, 0, 3, 1).with_width_bounds(Some(1), Some(2));
        assert!(item.violates_width_bounds());
        let item = LayoutItem::new("a", 0, 0, 2, 1).with_width_bounds(Some(1), Some(2));
        assert!(!item.violates_width_bounds());
    }
}
