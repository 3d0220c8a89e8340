//! Structured invariant report over a layout.
//!
//! [`check`] never fails: it inspects a layout against a column count and
//! lists every violated packing property as an [`InvariantIssue`]. Compacted
//! layouts should come back clean; anything else is a bug in the caller or
//! in the compactor.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::model::{GridRect, Layout, LayoutItem};

/// Severity for one invariant finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvariantSeverity {
    Error,
    Warning,
}

/// Stable code for invariant findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvariantCode {
    ZeroColumns,
    InvalidSize,
    DuplicateId,
    OutOfBounds,
    Overlap,
    /// The card could slide up one row.
    FloatingItem,
    /// The card fits at a smaller column in the same rows.
    LeftSlack,
    WidthBoundsViolated,
}

impl InvariantCode {
    #[must_use]
    pub const fn severity(self) -> InvariantSeverity {
        match self {
            Self::WidthBoundsViolated => InvariantSeverity::Warning,
            _ => InvariantSeverity::Error,
        }
    }
}

/// One actionable invariant finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvariantIssue {
    pub code: InvariantCode,
    pub severity: InvariantSeverity,
    pub item: Option<String>,
    pub related: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvariantReport {
    pub columns: u16,
    pub items: usize,
    pub issues: Vec<InvariantIssue>,
}

impl InvariantReport {
    /// Return true if any error-level finding exists.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.issues
            .iter()
            .any(|issue| issue.severity == InvariantSeverity::Error)
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    #[must_use]
    pub fn count(&self, code: InvariantCode) -> usize {
        self.issues.iter().filter(|issue| issue.code == code).count()
    }

    pub fn codes(&self) -> impl Iterator<Item = InvariantCode> + '_ {
        self.issues.iter().map(|issue| issue.code)
    }
}

/// Inspect `layout` on a `columns`-wide grid.
#[must_use]
pub fn check(layout: &Layout, columns: u16) -> InvariantReport {
    let mut report = InvariantReport {
        columns,
        items: layout.len(),
        issues: Vec::new(),
    };
    if columns == 0 {
        push_issue(
            &mut report,
            InvariantCode::ZeroColumns,
            None,
            None,
            "grid has zero columns".to_string(),
        );
        return report;
    }
    let width = i32::from(columns);
    let items = layout.items();

    let mut seen = FxHashSet::default();
    for item in items {
        if !seen.insert(item.id.as_str()) {
            push_issue(
                &mut report,
                InvariantCode::DuplicateId,
                Some(item),
                None,
                format!("id {:?} appears more than once", item.id),
            );
        }
        if item.w < 1 || item.h < 1 || item.w > width {
            push_issue(
                &mut report,
                InvariantCode::InvalidSize,
                Some(item),
                None,
                format!("size {}x{} cannot fit {columns} columns", item.w, item.h),
            );
        }
        if item.x < 0 || item.y < 0 || item.rect().right() > width {
            push_issue(
                &mut report,
                InvariantCode::OutOfBounds,
                Some(item),
                None,
                format!("{} lies outside 0..{columns}", item.rect()),
            );
        }
        if item.violates_width_bounds() {
            push_issue(
                &mut report,
                InvariantCode::WidthBoundsViolated,
                Some(item),
                None,
                format!(
                    "width {} outside [{:?}, {:?}]",
                    item.w, item.min_w, item.max_w
                ),
            );
        }
    }

    for (i, a) in items.iter().enumerate() {
        for b in &items[i + 1..] {
            if a.rect().intersects(&b.rect()) {
                push_issue(
                    &mut report,
                    InvariantCode::Overlap,
                    Some(a),
                    Some(b),
                    format!("{} overlaps {} at {}", a.id, b.id, b.rect()),
                );
            }
        }
    }

    for (index, item) in items.iter().enumerate() {
        let rect = item.rect();
        if rect.y > 0 && fits(items, index, rect.shifted(0, -1), width) {
            push_issue(
                &mut report,
                InvariantCode::FloatingItem,
                Some(item),
                None,
                format!("{} can move up to row {}", item.id, rect.y - 1),
            );
        }
        let limit = if rect.w < 1 {
            0
        } else {
            rect.x.min(width - rect.w + 1)
        };
        let leftmost = (0..limit).find(|&x| fits(items, index, rect.with_x(x), width));
        if let Some(x) = leftmost {
            push_issue(
                &mut report,
                InvariantCode::LeftSlack,
                Some(item),
                None,
                format!("{} can move left to column {x}", item.id),
            );
        }
    }

    report
}

/// Whether `target` is inside the grid and clear of every item but `index`.
fn fits(items: &[LayoutItem], index: usize, target: GridRect, width: i32) -> bool {
    if target.x < 0 || target.y < 0 || target.right() > width {
        return false;
    }
    items
        .iter()
        .enumerate()
        .all(|(other, item)| other == index || !item.rect().intersects(&target))
}

fn push_issue(
    report: &mut InvariantReport,
    code: InvariantCode,
    item: Option<&LayoutItem>,
    related: Option<&LayoutItem>,
    message: String,
) {
    report.issues.push(InvariantIssue {
        code,
        severity: code.severity(),
        item: item.map(|item| item.id.clone()),
        related: related.map(|item| item.id.clone()),
        message,
    });
}
