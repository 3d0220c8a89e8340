#![forbid(unsafe_code)]

//! Persisted dashboard layouts.
//!
//! `dashgrid-layout` is pure. This crate is the caller side of it: a
//! [`LayoutStore`] that keeps one [`LayoutSnapshot`] per namespaced
//! [`StoreKey`], and a [`Dashboard`] session that re-compacts after every edit
//! and saves the result.
//!
//! # Example
//!
//! ```
//! use dashgrid_layout::{GridRect, PlacementTable};
//! use dashgrid_store::{Dashboard, DashboardConfig, MemoryStore, StoreKey};
//!
//! let placements = PlacementTable::new()
//!     .with(2, "prices", GridRect::new(0, 0, 1, 1))
//!     .with(2, "news", GridRect::new(1, 0, 1, 1));
//! let mut dashboard = Dashboard::open(
//!     MemoryStore::new(),
//!     StoreKey::named("main")?,
//!     DashboardConfig::new(placements, 2),
//! )?;
//! dashboard.set_visible("prices", false)?;
//! assert_eq!(dashboard.layout().get("news").map(|i| (i.x, i.y)), Some((0, 0)));
//! # Ok::<(), dashgrid_store::StoreError>(())
//! ```

pub mod dashboard;
pub mod error;
pub mod snapshot;
pub mod store;

pub use dashboard::{Dashboard, DashboardConfig};
pub use error::{Result, StoreError};
pub use snapshot::{DEFAULT_NAMESPACE, LAYOUT_SCHEMA_VERSION, LayoutSnapshot, StoreKey};
pub use store::{JsonFileStore, LayoutStore, MemoryStore};
