//! Built-in placement table for the trading dashboard.

use dashgrid_layout::{GridRect, PlacementTable};

/// Card ids in catalogue order.
pub const TRADING_CARDS: [&str; 7] = [
    "portfolio",
    "watchlist",
    "signals",
    "order-flow",
    "liquidity",
    "sentiment",
    "chat",
];

/// Column count used when nothing else decides it.
pub const DEFAULT_COLUMNS: u16 = 3;

// (columns, id, x, y, w, h)
const TRADING_DEFAULTS: &[(u16, &str, i32, i32, i32, i32)] = &[
    (1, "portfolio", 0, 0, 1, 2),
    (1, "watchlist", 0, 2, 1, 2),
    (1, "signals", 0, 4, 1, 2),
    (1, "order-flow", 0, 6, 1, 2),
    (1, "liquidity", 0, 8, 1, 2),
    (1, "sentiment", 0, 10, 1, 1),
    (1, "chat", 0, 11, 1, 2),
    (2, "portfolio", 0, 0, 2, 2),
    (2, "watchlist", 0, 2, 1, 2),
    (2, "signals", 1, 2, 1, 2),
    (2, "order-flow", 0, 4, 1, 2),
    (2, "liquidity", 1, 4, 1, 2),
    (2, "sentiment", 0, 6, 1, 1),
    (2, "chat", 0, 7, 2, 2),
    (3, "portfolio", 0, 0, 2, 2),
    (3, "watchlist", 2, 0, 1, 2),
    (3, "signals", 0, 2, 1, 2),
    (3, "order-flow", 1, 2, 1, 2),
    (3, "liquidity", 2, 2, 1, 2),
    (3, "sentiment", 0, 4, 1, 1),
    (3, "chat", 1, 4, 2, 2),
];

#[must_use]
pub fn trading_placements() -> PlacementTable {
    let mut table = PlacementTable::new();
    for &(columns, id, x, y, w, h) in TRADING_DEFAULTS {
        table.insert(columns, id, GridRect::new(x, y, w, h));
    }
    table
}
