use thiserror::Error;

pub type Result<T> = std::result::Result<T, LayoutError>;

/// Input that no placement can satisfy.
///
/// Overlapping items, negative coordinates and items hanging past the last
/// column are not errors: compaction exists to clean those up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("grid must have at least one column")]
    ZeroColumns,

    #[error("invalid layout item {id:?}: {reason}")]
    InvalidLayout { id: String, reason: String },

    #[error("duplicate layout item id {id:?}")]
    DuplicateId { id: String },
}

impl LayoutError {
    #[must_use]
    pub fn invalid(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidLayout {
            id: id.into(),
            reason: reason.into(),
        }
    }
}
