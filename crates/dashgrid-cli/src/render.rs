//! ASCII rendering of a layout.
//!
//! ```text
//! +---+
//! |AAB|
//! |AAB|
//! |CCC|
//! +---+
//! A  portfolio (0,0 2x2)
//! B  signals (2,0 1x2)
//! C  chat (0,2 3x1)
//! ```
//!
//! Cards get letters in layout order. Empty cells are `.`, cells claimed by
//! more than one card are `#`. Anything outside the grid is not drawn.

use std::fmt::Write as _;

use dashgrid_layout::Layout;

const GLYPHS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const EMPTY: char = '.';
const CLASH: char = '#';

fn glyph(index: usize) -> char {
    char::from(GLYPHS[index % GLYPHS.len()])
}

#[must_use]
pub fn render(layout: &Layout, columns: u16) -> String {
    let width = usize::from(columns);
    let rows = usize::try_from(layout.bottom().max(0)).unwrap_or(0);
    let mut grid = vec![EMPTY; width * rows];

    for (index, item) in layout.iter().enumerate() {
        for (x, y) in item.rect().cells() {
            let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
                continue;
            };
            if x >= width || y >= rows {
                continue;
            }
            let cell = &mut grid[y * width + x];
            *cell = if *cell == EMPTY { glyph(index) } else { CLASH };
        }
    }

    let border = format!("+{}+\n", "-".repeat(width));
    let mut out = border.clone();
    for row in grid.chunks(width.max(1)).take(rows) {
        out.push('|');
        out.extend(row.iter());
        out.push_str("|\n");
    }
    out.push_str(&border);
    for (index, item) in layout.iter().enumerate() {
        let _ = writeln!(out, "{}  {} {}", glyph(index), item.id, item.rect());
    }
    out
}
