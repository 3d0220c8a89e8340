//! Ownership map used to test candidate moves.
//!
//! Each item index owns one rectangle; every column keeps the indices whose
//! rectangle spans it. Memory and query cost depend on the item count and the
//! column count only, never on card heights. The map is derived state:
//! rebuilt from the working layout at the start of a pass and patched in
//! place as items move, never persisted.
//!
//! # Invariants
//!
//! 1. Cells left of column 0, right of the last column, or above row 0 are
//!    never free.
//! 2. A cell covered by several rectangles belongs to the highest index.
//! 3. [`Occupancy::clear`] only releases the given index, so a stale clear can
//!    never erase another item.

use crate::model::{GridRect, LayoutItem};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupancy {
    columns: i32,
    rects: Vec<Option<GridRect>>,
    by_column: Vec<Vec<usize>>,
}

impl Occupancy {
    #[must_use]
    pub fn new(columns: u16) -> Self {
        Self {
            columns: i32::from(columns),
            rects: Vec::new(),
            by_column: vec![Vec::new(); usize::from(columns)],
        }
    }

    /// Build the map for `items`, keyed by slice index.
    ///
    /// Parts of a card outside the column range are ignored.
    #[must_use]
    pub fn from_items(columns: u16, items: &[LayoutItem]) -> Self {
        let mut grid = Self::new(columns);
        for (index, item) in items.iter().enumerate() {
            grid.place(item.rect(), index);
        }
        grid
    }

    #[inline]
    pub const fn columns(&self) -> i32 {
        self.columns
    }

    /// First row below every placed rectangle.
    pub fn rows(&self) -> i32 {
        self.rects
            .iter()
            .flatten()
            .map(GridRect::bottom)
            .max()
            .unwrap_or(0)
            .max(0)
    }

    /// Rectangle owned by `index`, if placed.
    #[inline]
    pub fn rect(&self, index: usize) -> Option<GridRect> {
        self.rects.get(index).copied().flatten()
    }

    /// Index of the item covering `(x, y)`, if any.
    pub fn owner(&self, x: i32, y: i32) -> Option<usize> {
        if y < 0 {
            return None;
        }
        self.column(x)?
            .iter()
            .copied()
            .filter(|&index| self.rect(index).is_some_and(|rect| rect.contains(x, y)))
            .max()
    }

    #[inline]
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        self.owner(x, y).is_some()
    }

    /// Whether `rect` is inside the grid and shares no cell with any placed
    /// rectangle other than `ignore`'s.
    pub fn is_free(&self, rect: GridRect, ignore: Option<usize>) -> bool {
        if rect.x < 0 || rect.y < 0 || rect.right() > self.columns {
            return false;
        }
        (rect.x..rect.right()).all(|x| {
            self.column(x).is_none_or(|owners| {
                owners.iter().all(|&index| {
                    Some(index) == ignore
                        || self.rect(index).is_none_or(|other| !other.intersects(&rect))
                })
            })
        })
    }

    /// Give `index` the rectangle `rect`, replacing any earlier one.
    pub fn place(&mut self, rect: GridRect, index: usize) {
        self.clear(index);
        if self.rects.len() <= index {
            self.rects.resize(index + 1, None);
        }
        self.rects[index] = Some(rect);
        let first = rect.x.max(0);
        let last = rect.right().min(self.columns);
        for x in first..last {
            self.by_column[x as usize].push(index);
        }
    }

    /// Release whatever `index` owns.
    pub fn clear(&mut self, index: usize) {
        let Some(rect) = self.rects.get_mut(index).and_then(Option::take) else {
            return;
        };
        let first = rect.x.max(0);
        let last = rect.right().min(self.columns);
        for x in first..last {
            self.by_column[x as usize].retain(|&owner| owner != index);
        }
    }

    pub fn relocate(&mut self, index: usize, to: GridRect) {
        self.place(to, index);
    }

    fn column(&self, x: i32) -> Option<&[usize]> {
        if x < 0 || x >= self.columns {
            return None;
        }
        Some(&self.by_column[x as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<LayoutItem> {
        vec![
            LayoutItem::new("wide", 0, 0, 2, 1),
            LayoutItem::new("tall", 2, 0, 1, 2),
        ]
    }

    #[test]
    fn from_items_marks_owners() {
        let grid = Occupancy::from_items(3, &items());
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.owner(0, 0), Some(0));
        assert_eq!(grid.owner(1, 0), Some(0));
        assert_eq!(grid.owner(2, 1), Some(1));
        assert_eq!(grid.owner(0, 1), None);
        assert!(!grid.is_occupied(5, 5));
        assert!(!grid.is_occupied(0, -1));
    }

    #[test]
    fn is_free_checks_full_span_and_bounds() {
        let grid = Occupancy::from_items(3, &items());
        assert!(grid.is_free(GridRect::new(0, 1, 2, 1), None));
        assert!(!grid.is_free(GridRect::new(1, 1, 2, 1), None)); // hits "tall"
        assert!(grid.is_free(GridRect::new(1, 1, 2, 1), Some(1)));
        assert!(!grid.is_free(GridRect::new(-1, 1, 1, 1), None));
        assert!(!grid.is_free(GridRect::new(2, 5, 2, 1), None));
        assert!(grid.is_free(GridRect::new(0, 9, 3, 4), None)); // below every card
    }

    #[test]
    fn relocate_moves_ownership() {
        let mut grid = Occupancy::from_items(3, &items());
        grid.relocate(1, GridRect::new(0, 2, 1, 2));
        assert_eq!(grid.rows(), 4);
        assert_eq!(grid.owner(2, 0), None);
        assert_eq!(grid.owner(0, 3), Some(1));
        assert_eq!(grid.rect(1), Some(GridRect::new(0, 2, 1, 2)));
    }

    #[test]
    fn clear_leaves_other_items_alone() {
        let mut grid = Occupancy::from_items(3, &items());
        grid.clear(1);
        assert_eq!(grid.owner(0, 0), Some(0));
        assert_eq!(grid.owner(2, 0), None);
        grid.clear(7);
        assert_eq!(grid.rows(), 1);
    }

    #[test]
    fn overlapping_cells_belong_to_the_later_index() {
        let grid = Occupancy::from_items(
            2,
            &[
                LayoutItem::new("under", 0, 0, 2, 2),
                LayoutItem::new("over", 1, 1, 1, 1),
            ],
        );
        assert_eq!(grid.owner(1, 1), Some(1));
        assert_eq!(grid.owner(0, 1), Some(0));
        // The earlier card still blocks a move that only ignores the later one.
        assert!(!grid.is_free(GridRect::new(1, 1, 1, 1), Some(1)));
    }

    #[test]
    fn tall_cards_cost_no_memory_per_row() {
        let grid = Occupancy::from_items(
            3,
            &[
                LayoutItem::new("tower", 0, 0, 1, 1 << 30),
                LayoutItem::new("next", 1, 0, 2, i32::MAX - 1),
            ],
        );
        assert_eq!(grid.rows(), i32::MAX - 1);
        assert_eq!(grid.owner(0, (1 << 30) - 1), Some(0));
        assert_eq!(grid.owner(0, 1 << 30), None);
        assert!(grid.is_free(GridRect::new(0, 1 << 30, 1, 1 << 20), None));
    }
}
