//! Seeding layouts: default placements, column reflow, and visibility merges.
//!
//! The compactor accepts any layout. This module builds the ones a dashboard
//! actually feeds it:
//!
//! - [`PlacementTable`] holds the default rectangle of every card, per column
//!   count. Lookups for an unregistered column count inherit from the nearest
//!   smaller registered count.
//! - [`reflow`] fits an existing layout onto a new column count.
//! - [`merge_visible`] combines a saved layout with the set of cards the user
//!   currently has switched on.
//! - [`ColumnBreakpoints`] maps a viewport width to a column count.

use std::collections::BTreeMap;
use std::fmt;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::compact::Compactor;
use crate::error::Result;
use crate::model::{GridRect, Layout, LayoutItem};

// ---------------------------------------------------------------------------
// Breakpoints
// ---------------------------------------------------------------------------

/// Viewport size tier, smallest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    Xs = 0,
    Sm = 1,
    Md = 2,
    Lg = 3,
    Xl = 4,
}

impl Breakpoint {
    pub const ALL: [Breakpoint; 5] = [
        Breakpoint::Xs,
        Breakpoint::Sm,
        Breakpoint::Md,
        Breakpoint::Lg,
        Breakpoint::Xl,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Xs => "xs",
            Self::Sm => "sm",
            Self::Md => "md",
            Self::Lg => "lg",
            Self::Xl => "xl",
        }
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Width thresholds (in pixels) and the column count used at each tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnBreakpoints {
    /// Minimum width for `Sm`, `Md`, `Lg`, `Xl`; must be ascending.
    pub min_widths: [u32; 4],
    /// Column count per tier, indexed by `Breakpoint` ordinal.
    pub columns: [u16; 5],
}

impl Default for ColumnBreakpoints {
    fn default() -> Self {
        Self {
            min_widths: [640, 768, 1024, 1280],
            columns: [1, 1, 2, 3, 3],
        }
    }
}

impl ColumnBreakpoints {
    /// Override the column count for one tier (builder pattern).
    #[must_use]
    pub fn at(mut self, bp: Breakpoint, columns: u16) -> Self {
        self.columns[bp as usize] = columns.max(1);
        self
    }

    #[must_use]
    pub fn classify(&self, width: u32) -> Breakpoint {
        let tier = self
            .min_widths
            .iter()
            .take_while(|&&min| width >= min)
            .count();
        Breakpoint::ALL[tier]
    }

    /// Column count for a viewport `width`; never zero.
    #[must_use]
    pub fn columns_for_width(&self, width: u32) -> u16 {
        self.columns[self.classify(width) as usize].max(1)
    }
}

// ---------------------------------------------------------------------------
// Default placement tables
// ---------------------------------------------------------------------------

/// Default card rectangles keyed by column count, then card id.
///
/// Serializes as `{"3": {"portfolio": {"x":0,"y":0,"w":2,"h":2}}, ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlacementTable {
    tables: BTreeMap<u16, BTreeMap<String, GridRect>>,
}

impl PlacementTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a default placement (builder pattern).
    #[must_use]
    pub fn with(mut self, columns: u16, id: impl Into<String>, rect: GridRect) -> Self {
        self.insert(columns, id, rect);
        self
    }

    pub fn insert(&mut self, columns: u16, id: impl Into<String>, rect: GridRect) {
        self.tables
            .entry(columns)
            .or_default()
            .insert(id.into(), rect);
    }

    /// Column counts with a registered table, ascending.
    pub fn column_counts(&self) -> impl Iterator<Item = u16> + '_ {
        self.tables.keys().copied()
    }

    /// Every card id known to any table, sorted.
    #[must_use]
    pub fn card_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .tables
            .values()
            .flat_map(|table| table.keys().cloned())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Default rectangle for `id` on a `columns`-wide grid.
    ///
    /// Walks down from `columns` to the nearest smaller table that knows the
    /// card, then up to the nearest larger one. The width is clamped to fit.
    #[must_use]
    pub fn resolve(&self, columns: u16, id: &str) -> Option<GridRect> {
        let below = self
            .tables
            .range(..=columns)
            .rev()
            .find_map(|(_, table)| table.get(id));
        let rect = below.or_else(|| {
            self.tables
                .range(columns.saturating_add(1)..)
                .find_map(|(_, table)| table.get(id))
        })?;
        Some(fit_rect(*rect, columns))
    }

    /// Default layout for `ids`, in the given order.
    ///
    /// Cards without a default are stacked below everything as 1x1. The result
    /// is not compacted.
    pub fn default_layout<'a>(&self, columns: u16, ids: impl IntoIterator<Item = &'a str>) -> Layout {
        let mut layout = Layout::new();
        let mut unplaced = Vec::new();
        for id in ids {
            match self.resolve(columns, id) {
                Some(rect) => layout.push(LayoutItem::from_rect(id, rect)),
                None => unplaced.push(id),
            }
        }
        for id in unplaced {
            let y = layout.bottom();
            layout.push(LayoutItem::new(id, 0, y, 1, 1));
        }
        layout
    }
}

fn fit_rect(rect: GridRect, columns: u16) -> GridRect {
    let columns = i32::from(columns.max(1));
    let w = rect.w.clamp(1, columns);
    GridRect::new(rect.x.clamp(0, columns - w), rect.y.max(0), w, rect.h.max(1))
}

// ---------------------------------------------------------------------------
// Reflow and merge
// ---------------------------------------------------------------------------

/// Fit `layout` onto `columns` columns without compacting it.
///
/// Widths wider than the grid shrink to fit; widths below `minW` grow back
/// toward it when the grid allows. `maxW` is honoured. Positions are clamped
/// into range.
#[must_use]
pub fn reflow(layout: &Layout, columns: u16) -> Layout {
    let limit = i32::from(columns.max(1));
    layout
        .iter()
        .map(|item| {
            let mut item = item.clone();
            let mut w = item.w.max(1);
            if let Some(max) = item.max_w {
                w = w.min(max.max(1));
            }
            if let Some(min) = item.min_w {
                w = w.max(min);
            }
            item.w = w.min(limit);
            item.h = item.h.max(1);
            item.x = item.x.clamp(0, limit - item.w);
            item.y = item.y.max(0);
            item
        })
        .collect()
}

/// Merge a saved layout with the cards currently switched on, then compact.
///
/// - Saved cards that are still visible keep their placement (reflowed onto
///   `columns`).
/// - Saved cards that are no longer visible are dropped.
/// - Newly visible cards are seeded from `table`, shifted below the saved
///   cards so existing placements win any contest.
pub fn merge_visible<S: AsRef<str>>(
    saved: &Layout,
    visible: &[S],
    table: &PlacementTable,
    columns: u16,
    compactor: &Compactor,
) -> Result<Layout> {
    let wanted: FxHashSet<&str> = visible.iter().map(AsRef::as_ref).collect();
    let kept: Layout = saved
        .iter()
        .filter(|item| wanted.contains(item.id.as_str()))
        .cloned()
        .collect();
    let mut merged = reflow(&kept, columns);

    let base = merged.bottom();
    let fresh = visible
        .iter()
        .map(AsRef::as_ref)
        .filter(|id| !saved.contains(id));
    for mut item in table.default_layout(columns, fresh) {
        item.y = item.y.saturating_add(base);
        merged.push(item);
    }

    Ok(compactor.run(&merged, columns)?.layout)
}
