#![forbid(unsafe_code)]

//! Card grid model and compaction.
//!
//! # Role in dashgrid
//! `dashgrid-layout` owns the placement of dashboard cards on an integer grid
//! with a fixed column count and unbounded rows. It never renders anything and
//! never touches storage: callers hand it a [`Layout`], it hands back a new one.
//!
//! # Primary responsibilities
//! - **Model**: [`LayoutItem`], [`Layout`], [`GridRect`] and input validation.
//! - **Compaction**: [`compact`] / [`Compactor`] pack cards to the top and to
//!   the left with no overlap, converging to a fixed point.
//! - **Diagnostics**: [`invariants::check`] reports every packing property as
//!   a structured finding.
//! - **Placement**: default placement tables, column reflow, and merging newly
//!   visible cards into a saved layout.
//!
//! # Example
//!
//! ```
//! use dashgrid_layout::{Layout, LayoutItem, compact};
//!
//! let layout = Layout::from(vec![
//!     LayoutItem::new("prices", 1, 0, 1, 1),
//!     LayoutItem::new("signals", 2, 0, 1, 1),
//! ]);
//! let packed = compact(&layout, 3).unwrap();
//! assert_eq!(packed.get("prices").map(|i| (i.x, i.y)), Some((0, 0)));
//! assert_eq!(packed.get("signals").map(|i| (i.x, i.y)), Some((1, 0)));
//! ```

pub mod compact;
pub mod error;
pub mod invariants;
mod logging;
pub mod model;
pub mod occupancy;
pub mod placement;

pub use compact::{Compaction, CompactionReport, Compactor, DEFAULT_MAX_ITERATIONS, compact};
pub use error::{LayoutError, Result};
pub use invariants::{InvariantCode, InvariantIssue, InvariantReport, InvariantSeverity};
pub use model::{GridRect, Layout, LayoutItem};
pub use occupancy::Occupancy;
pub use placement::{Breakpoint, ColumnBreakpoints, PlacementTable, merge_visible, reflow};
