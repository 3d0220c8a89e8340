//! Gap-free compaction of a card grid.
//!
//! [`compact`] repositions cards so the layout has no overlap and no slack:
//! every card is pushed as far up and then as far left as it can slide.
//! Sizes never change; only `x` and `y` do.
//!
//! # Passes
//!
//! Each iteration runs three passes over a private working copy:
//!
//! 1. **Vertical**: skyline packing. Cards are visited in `(y, x, id)` order
//!    and dropped onto the highest "filled-to" row across their column span.
//! 2. **Horizontal**: each card slides left one column at a time while its
//!    full height span is free in the occupancy map.
//! 3. **Gap fill**: for every empty cell whose right neighbour is occupied,
//!    the first card (in `(y, x, id)` order) to the right of the gap that has
//!    a free rectangle at or left of the gap column jumps to the leftmost such
//!    column. This gets cards past neighbours that block a one-column slide.
//!
//! Iteration stops once a full iteration moves nothing, or after
//! [`Compactor::max_iterations`] iterations. A final vertical pass always runs.
//!
//! # Termination
//!
//! From the second iteration on the working layout is overlap-free. On such a
//! layout the vertical pass never moves a card down and the other two passes
//! only move cards left, so `Σx + Σy` strictly decreases on every iteration
//! that changes anything. The iteration cap bounds the cost on every input,
//! including the pathological ones.
//!
//! # Invariants (on convergence)
//!
//! 1. Same ids, same `w`/`h`, same item order as the input.
//! 2. No two cards share a cell; `0 <= x`, `x + w <= columns`, `0 <= y`.
//! 3. A card at `y > 0` has another card directly above one of its columns.
//! 4. No card can move to a smaller `x` in its rows without a collision.
//! 5. `compact(compact(l)) == compact(l)`.
//!
//! # Failure Modes
//!
//! Only invalid sizes, duplicate ids, zero columns, and layouts too tall to
//! stack in `i32` rows are rejected (see [`Layout::validate`]). Hitting the
//! iteration cap is logged and the best-effort layout is returned.

use serde::Serialize;

use crate::error::Result;
use crate::logging::{debug, debug_span, trace, warn};
use crate::model::{Layout, LayoutItem};
use crate::occupancy::Occupancy;

/// Iteration cap for the compaction loop.
///
/// Real dashboards settle in two or three iterations; the cap only exists so
/// that a call made on every drag frame has a hard upper bound.
pub const DEFAULT_MAX_ITERATIONS: usize = 64;

/// Compact `layout` onto `columns` columns with the default configuration.
///
/// ```
/// use dashgrid_layout::{Layout, LayoutItem, compact};
///
/// let layout = Layout::from(vec![LayoutItem::new("chat", 0, 5, 1, 2)]);
/// let packed = compact(&layout, 3).unwrap();
/// assert_eq!(packed.items()[0].position(), (0, 0));
/// ```
pub fn compact(layout: &Layout, columns: u16) -> Result<Layout> {
    Compactor::new()
        .run(layout, columns)
        .map(|compaction| compaction.layout)
}

/// Compaction configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compactor {
    max_iterations: usize,
}

impl Default for Compactor {
    fn default() -> Self {
        Self::new()
    }
}

/// Compacted layout together with how it was reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compaction {
    pub layout: Layout,
    pub report: CompactionReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CompactionReport {
    /// Iterations of the three-pass loop that ran.
    pub iterations: usize,
    /// Whether the last iteration moved nothing.
    pub converged: bool,
    /// Cards whose final position differs from the input.
    pub moved: usize,
}

impl Compactor {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Set the iteration cap (builder pattern).
    #[must_use]
    pub const fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    #[inline]
    pub const fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Compact `layout` onto `columns` columns.
    ///
    /// The input is never modified; the returned layout keeps its item order.
    pub fn run(&self, layout: &Layout, columns: u16) -> Result<Compaction> {
        layout.validate(columns)?;
        let _span = debug_span!("dashgrid.compact", items = layout.len(), columns).entered();

        if layout.is_empty() {
            return Ok(Compaction {
                layout: Layout::new(),
                report: CompactionReport {
                    iterations: 0,
                    converged: true,
                    moved: 0,
                },
            });
        }

        let mut items = layout.items().to_vec();
        normalize(&mut items, columns);

        let mut iterations = 0;
        let mut converged = false;
        while iterations < self.max_iterations {
            iterations += 1;
            let vertical = compact_vertical(&mut items, columns);
            let horizontal = compact_horizontal(&mut items, columns);
            let filled = fill_gaps(&mut items, columns);
            trace!(iterations, vertical, horizontal, filled, "compaction iteration");
            if !(vertical || horizontal || filled) {
                converged = true;
                break;
            }
        }
        if !converged {
            warn!(
                iterations,
                items = items.len(),
                columns,
                "compaction did not converge; returning best-effort layout"
            );
        }
        compact_vertical(&mut items, columns);

        let moved = layout
            .iter()
            .zip(&items)
            .filter(|(before, after)| before.position() != after.position())
            .count();
        debug!(iterations, converged, moved, "compaction finished");

        Ok(Compaction {
            layout: Layout::from(items),
            report: CompactionReport {
                iterations,
                converged,
                moved,
            },
        })
    }
}

/// Item indices in `(y, x, id)` order.
fn position_order(items: &[LayoutItem]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by(|&a, &b| items[a].position_key().cmp(&items[b].position_key()));
    order
}

/// Pull every card inside the column range and below row 0.
fn normalize(items: &mut [LayoutItem], columns: u16) {
    let columns = i32::from(columns);
    for item in items {
        item.x = item.x.clamp(0, columns - item.w);
        item.y = item.y.max(0);
    }
}

/// Skyline pass: drop each card onto the highest filled row of its span.
fn compact_vertical(items: &mut [LayoutItem], columns: u16) -> bool {
    let mut filled = vec![0_i32; usize::from(columns)];
    let mut changed = false;
    for index in position_order(items) {
        let item = &mut items[index];
        let span = item.x as usize..item.rect().right() as usize;
        let top = filled[span.clone()].iter().copied().max().unwrap_or(0);
        if item.y != top {
            item.y = top;
            changed = true;
        }
        filled[span].fill(item.rect().bottom());
    }
    changed
}

/// Slide each card left while the column it would enter is free.
fn compact_horizontal(items: &mut [LayoutItem], columns: u16) -> bool {
    let mut grid = Occupancy::from_items(columns, items);
    let mut changed = false;
    for index in position_order(items) {
        let from = items[index].rect();
        let mut to = from;
        while to.x > 0 && grid.is_free(to.shifted(-1, 0), Some(index)) {
            to.x -= 1;
        }
        if to != from {
            grid.relocate(index, to);
            items[index].x = to.x;
            changed = true;
        }
    }
    changed
}

/// Fill empty cells that have an occupied right neighbour.
///
/// Candidates are cards right of the gap that span its row. Each is tried at
/// every column up to the gap, and its whole rectangle must be free apart
/// from cells it already owns.
fn fill_gaps(items: &mut [LayoutItem], columns: u16) -> bool {
    let mut grid = Occupancy::from_items(columns, items);
    let last_column = grid.columns() - 1;
    let mut changed = false;
    for y in band_rows(items) {
        for gap_x in 0..last_column {
            if grid.is_occupied(gap_x, y) || !grid.is_occupied(gap_x + 1, y) {
                continue;
            }
            let jump = items
                .iter()
                .enumerate()
                .filter(|(_, item)| item.x > gap_x && item.y <= y && y < item.rect().bottom())
                .filter_map(|(index, item)| {
                    (0..=gap_x)
                        .map(|x| item.rect().with_x(x))
                        .find(|&to| grid.is_free(to, Some(index)))
                        .map(|to| (index, to))
                })
                .min_by(|(a, _), (b, _)| {
                    items[*a].position_key().cmp(&items[*b].position_key())
                });
            if let Some((index, to)) = jump {
                trace!(
                    id = %items[index].id,
                    from = %items[index].rect(),
                    to = %to,
                    "gap filled"
                );
                grid.relocate(index, to);
                items[index].x = to.x;
                changed = true;
            }
        }
    }
    changed
}

/// Rows where some card starts or ends.
///
/// Gap filling only changes `x`, so between two consecutive rows of this list
/// every row has the same occupancy and checking the first one is enough.
fn band_rows(items: &[LayoutItem]) -> Vec<i32> {
    let mut rows: Vec<i32> = items
        .iter()
        .flat_map(|item| [item.y, item.rect().bottom()])
        .collect();
    rows.sort_unstable();
    rows.dedup();
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    #[cfg(feature = "tracing")]
    use tracing_test::traced_test;

    fn layout(items: &[(&str, i32, i32, i32, i32)]) -> Layout {
        items
            .iter()
            .map(|&(id, x, y, w, h)| LayoutItem::new(id, x, y, w, h))
            .collect()
    }

    fn pos(layout: &Layout, id: &str) -> (i32, i32) {
        layout.get(id).map(LayoutItem::position).unwrap()
    }

    #[test]
    fn empty_layout_is_returned_unchanged() {
        let out = Compactor::new().run(&Layout::new(), 3).unwrap();
        assert!(out.layout.is_empty());
        assert!(out.report.converged);
        assert_eq!(out.report.iterations, 0);
    }

    #[test]
    fn lone_item_moves_to_origin() {
        let out = compact(&layout(&[("a", 2, 7, 1, 2)]), 3).unwrap();
        assert_eq!(pos(&out, "a"), (0, 0));
    }

    #[test]
    fn overlapping_items_are_separated() {
        let out = compact(&layout(&[("a", 0, 0, 1, 1), ("b", 0, 0, 1, 1)]), 3).unwrap();
        assert_eq!(pos(&out, "a"), (0, 0));
        assert_eq!(pos(&out, "b"), (0, 1));
    }

    #[test]
    fn removed_card_leaves_no_gap() {
        let out = compact(&layout(&[("b", 1, 0, 1, 1), ("c", 2, 0, 1, 1)]), 3).unwrap();
        assert_eq!(pos(&out, "b"), (0, 0));
        assert_eq!(pos(&out, "c"), (1, 0));
    }

    #[test]
    fn single_column_stacks_by_original_row() {
        let out = compact(
            &layout(&[
                ("e", 0, 40, 1, 1),
                ("a", 0, 1, 1, 1),
                ("c", 0, 9, 1, 1),
                ("b", 0, 3, 1, 1),
                ("d", 0, 20, 1, 1),
            ]),
            1,
        )
        .unwrap();
        for (row, id) in ["a", "b", "c", "d", "e"].iter().enumerate() {
            assert_eq!(pos(&out, id), (0, row as i32));
        }
    }

    #[test]
    fn gap_fill_jumps_past_blocking_card() {
        // "tail" cannot slide: "tall" blocks the column to its left.
        let out = compact(
            &layout(&[
                ("wide", 0, 0, 2, 1),
                ("tall", 2, 0, 1, 2),
                ("edge", 3, 0, 1, 1),
                ("tail", 3, 1, 1, 1),
            ]),
            4,
        )
        .unwrap();
        assert_eq!(pos(&out, "wide"), (0, 0));
        assert_eq!(pos(&out, "tall"), (2, 0));
        assert_eq!(pos(&out, "edge"), (3, 0));
        assert_eq!(pos(&out, "tail"), (0, 1));
    }

    #[test]
    fn out_of_range_positions_are_clamped() {
        let out = compact(&layout(&[("a", -4, -2, 2, 1), ("b", 9, 0, 2, 1)]), 3).unwrap();
        assert_eq!(pos(&out, "a"), (0, 0));
        assert_eq!(pos(&out, "b"), (0, 1));
    }

    #[test]
    fn sizes_and_order_are_preserved() {
        let input = layout(&[("z", 2, 3, 1, 2), ("a", 0, 0, 3, 1), ("m", 1, 1, 2, 2)]);
        let out = compact(&input, 3).unwrap();
        assert_eq!(out.ids().collect::<Vec<_>>(), vec!["z", "a", "m"]);
        for (before, after) in input.iter().zip(&out) {
            assert_eq!((before.w, before.h), (after.w, after.h));
        }
    }

    #[test]
    fn input_order_does_not_change_positions() {
        let forward = layout(&[("a", 0, 0, 1, 1), ("b", 0, 0, 1, 1), ("c", 1, 2, 2, 1)]);
        let mut reversed: Vec<_> = forward.clone().into_items();
        reversed.reverse();
        let a = compact(&forward, 3).unwrap();
        let b = compact(&Layout::from(reversed), 3).unwrap();
        for item in &a {
            assert_eq!(Some(item), b.get(&item.id));
        }
    }

    #[test]
    fn second_run_is_a_no_op() {
        let input = layout(&[
            ("a", 2, 5, 1, 3),
            ("b", 0, 0, 2, 2),
            ("c", 1, 1, 1, 1),
            ("d", 0, 9, 3, 1),
        ]);
        let once = Compactor::new().run(&input, 3).unwrap();
        let twice = Compactor::new().run(&once.layout, 3).unwrap();
        assert_eq!(once.layout, twice.layout);
        assert_eq!(twice.report.iterations, 1);
        assert_eq!(twice.report.moved, 0);
    }

    #[test]
    fn report_counts_moved_cards() {
        let input = layout(&[("a", 0, 0, 1, 1), ("b", 2, 4, 1, 1)]);
        let out = Compactor::new().run(&input, 3).unwrap();
        assert!(out.report.converged);
        assert_eq!(out.report.moved, 1);
    }

    #[test]
    fn invalid_input_is_rejected() {
        let err = compact(&layout(&[("big", 0, 0, 4, 1)]), 3).unwrap_err();
        assert!(matches!(err, crate::LayoutError::InvalidLayout { .. }));
    }

    #[test]
    fn vertical_pass_uses_highest_filled_row_of_span() {
        let mut items = vec![
            LayoutItem::new("left", 0, 0, 1, 3),
            LayoutItem::new("right", 1, 0, 1, 1),
            LayoutItem::new("bridge", 0, 8, 2, 1),
        ];
        assert!(compact_vertical(&mut items, 2));
        assert_eq!(items[2].position(), (0, 3));
    }

    #[test]
    fn horizontal_pass_sees_earlier_moves() {
        let mut items = vec![
            LayoutItem::new("a", 1, 0, 1, 1),
            LayoutItem::new("b", 2, 0, 1, 1),
        ];
        assert!(compact_horizontal(&mut items, 3));
        assert_eq!(items[0].x, 0);
        assert_eq!(items[1].x, 1);
    }

    #[test]
    fn gap_fill_prefers_earliest_candidate() {
        // Gap at (0, 0). "block" cannot jump ("floor" is in the way), "near"
        // and "far" both can; "near" sorts first and "far" then fills the hole
        // "near" left behind.
        let mut items = vec![
            LayoutItem::new("floor", 0, 1, 1, 1),
            LayoutItem::new("block", 1, 0, 1, 2),
            LayoutItem::new("near", 2, 0, 1, 1),
            LayoutItem::new("far", 3, 0, 1, 1),
        ];
        assert!(fill_gaps(&mut items, 4));
        assert_eq!(items[1].position(), (1, 0));
        assert_eq!(items[2].position(), (0, 0));
        assert_eq!(items[3].position(), (2, 0));
    }

    #[test]
    fn gap_fill_lands_wide_card_left_of_the_gap() {
        // After the first two passes "c3" sits at (3, 2) behind "c0" while
        // (0, 2) and (1, 2) are empty; it fits there but not at column 1.
        let out = compact(
            &layout(&[
                ("c0", 3, 5, 1, 3),
                ("c1", 6, 4, 1, 2),
                ("c2", 1, 3, 2, 2),
                ("c3", 4, 6, 2, 1),
                ("c4", 0, 6, 4, 1),
            ]),
            6,
        )
        .unwrap();
        assert_eq!(pos(&out, "c2"), (0, 0));
        assert_eq!(pos(&out, "c0"), (2, 0));
        assert_eq!(pos(&out, "c1"), (3, 0));
        assert_eq!(pos(&out, "c3"), (0, 2));
        assert_eq!(pos(&out, "c4"), (0, 3));
    }

    #[test]
    fn gap_fill_tries_every_column_up_to_the_gap() {
        // The gap at (1, 1) is too narrow for "wide" at column 1 ("post" is in
        // the way), but column 0 fits.
        let mut items = vec![
            LayoutItem::new("base", 0, 0, 2, 1),
            LayoutItem::new("post", 2, 0, 1, 2),
            LayoutItem::new("wide", 3, 1, 2, 1),
        ];
        assert!(fill_gaps(&mut items, 5));
        assert_eq!(items[1].position(), (2, 0));
        assert_eq!(items[2].position(), (0, 1));
    }

    #[test]
    fn band_rows_lists_tops_and_bottoms() {
        let items = vec![
            LayoutItem::new("a", 0, 0, 1, 3),
            LayoutItem::new("b", 1, 1, 1, 2),
            LayoutItem::new("c", 2, 0, 1, 1),
        ];
        assert_eq!(band_rows(&items), vec![0, 1, 3]);
    }

    #[test]
    fn very_tall_cards_compact_without_a_dense_grid() {
        let tall = 1 << 30;
        let out = compact(
            &layout(&[
                ("t", 0, 0, 1, tall),
                ("u", 2, 5, 1, tall),
                ("cap", 0, 9, 3, 1),
            ]),
            3,
        )
        .unwrap();
        assert_eq!(pos(&out, "t"), (0, 0));
        assert_eq!(pos(&out, "u"), (1, 0));
        assert_eq!(pos(&out, "cap"), (0, tall));
    }

    #[test]
    fn stacked_heights_up_to_the_row_limit_are_accepted() {
        let half = i32::MAX / 2;
        let out = compact(&layout(&[("a", 0, 0, 1, half), ("b", 0, 3, 1, half)]), 1).unwrap();
        assert_eq!(pos(&out, "b"), (0, half));
        assert_eq!(out.bottom(), half * 2);

        let over = i32::MAX / 2 + 10;
        let err = compact(&layout(&[("a", 0, 0, 1, over), ("b", 0, 0, 1, over)]), 1)
            .unwrap_err();
        assert!(matches!(err, crate::LayoutError::InvalidLayout { ref id, .. } if id == "b"));
    }

    #[test]
    #[cfg(feature = "tracing")]
    #[traced_test]
    fn iteration_cap_is_a_soft_limit() {
        let input = layout(&[("a", 2, 0, 1, 1), ("b", 2, 3, 1, 1)]);
        let out = Compactor::new()
            .with_max_iterations(0)
            .run(&input, 3)
            .unwrap();
        assert!(!out.report.converged);
        assert_eq!(out.report.iterations, 0);
        // The closing vertical pass still runs.
        assert_eq!(pos(&out.layout, "b"), (2, 1));
        assert!(logs_contain("did not converge"));
    }
}
