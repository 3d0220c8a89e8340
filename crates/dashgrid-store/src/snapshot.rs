//! Persisted layout schema v1.
//!
//! A [`LayoutSnapshot`] is what a store keeps under one namespaced key: the
//! compacted layout, the column count it was compacted for, and when it was
//! saved.
//!
//! # Schema Versioning Policy
//!
//! - **Additive fields** must be `#[serde(default)]` and need no version bump.
//! - **Breaking changes** require incrementing [`LAYOUT_SCHEMA_VERSION`].
//! - Loaders reject unknown versions instead of guessing.

use std::fmt;

use chrono::{DateTime, Utc};
use dashgrid_layout::Layout;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Current snapshot schema version.
pub const LAYOUT_SCHEMA_VERSION: u16 = 1;

/// Namespace used when the caller does not pick one.
pub const DEFAULT_NAMESPACE: &str = "dashgrid";

/// Namespaced storage key, rendered as `namespace:name`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StoreKey {
    namespace: String,
    name: String,
}

impl StoreKey {
    /// Build a key; both parts must be non-empty and free of `:`.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let namespace = namespace.into();
        let name = name.into();
        for (part, value) in [("namespace", &namespace), ("name", &name)] {
            if value.is_empty() {
                return Err(StoreError::InvalidKey {
                    message: format!("{part} must not be empty"),
                });
            }
            if value.contains(':') {
                return Err(StoreError::InvalidKey {
                    message: format!("{part} {value:?} must not contain ':'"),
                });
            }
        }
        Ok(Self { namespace, name })
    }

    /// Key in the default namespace.
    pub fn named(name: impl Into<String>) -> Result<Self> {
        Self::new(DEFAULT_NAMESPACE, name)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// File-system safe stem: anything outside `[A-Za-z0-9._-]` becomes `_`.
    #[must_use]
    pub fn file_stem(&self) -> String {
        let sanitize = |value: &str| -> String {
            value
                .chars()
                .map(|c| {
                    if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                        c
                    } else {
                        '_'
                    }
                })
                .collect()
        };
        format!("{}--{}", sanitize(&self.namespace), sanitize(&self.name))
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)
    }
}

/// Persisted layout for one key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    /// Schema version for migration detection.
    #[serde(default = "default_schema_version")]
    pub schema_version: u16,
    /// Namespaced key (`namespace:name`) the snapshot was saved under.
    pub key: String,
    /// Column count the layout was compacted for.
    pub columns: u16,
    pub saved_at: DateTime<Utc>,
    pub items: Layout,
}

fn default_schema_version() -> u16 {
    LAYOUT_SCHEMA_VERSION
}

impl LayoutSnapshot {
    /// Snapshot `items` under `key`, stamped with the current time.
    #[must_use]
    pub fn new(key: &StoreKey, columns: u16, items: Layout) -> Self {
        Self::at(key, columns, items, Utc::now())
    }

    #[must_use]
    pub fn at(key: &StoreKey, columns: u16, items: Layout, saved_at: DateTime<Utc>) -> Self {
        Self {
            schema_version: LAYOUT_SCHEMA_VERSION,
            key: key.to_string(),
            columns,
            saved_at,
            items,
        }
    }

    /// Check the schema version and that the layout is usable on `columns`.
    pub fn validate(&self) -> Result<()> {
        if self.schema_version != LAYOUT_SCHEMA_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: self.schema_version,
                expected: LAYOUT_SCHEMA_VERSION,
            });
        }
        self.items.validate(self.columns)?;
        Ok(())
    }
}
