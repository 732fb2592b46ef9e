//! Count sheet domain models.
//!
//! A count sheet is one day's inventory reconciliation event. The sheet
//! header and list-row summary come from the backend; the aggregate pairs
//! the header with its owned line collection and computes every derived
//! counter from the lines, never caching them separately.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stocktake_core::{CountSheetId, SheetStatus, UserRef};

use super::count_line::CountLine;

/// Count sheet header: identity, calendar day, and creator.
///
/// The date is carried as the persisted timestamp; calendar-day semantics
/// (one sheet per day) are applied by the uniqueness guard, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountSheet {
    /// Backend-assigned identifier.
    pub id: CountSheetId,
    /// Count date as persisted by the backend.
    pub date: DateTime<Utc>,
    /// User who created the sheet.
    pub created_by: UserRef,
}

/// List-row view of a count sheet, with backend-reported progress counters.
///
/// The counters here are display data for sheets whose lines have not been
/// fetched. Once a sheet is opened, [`SheetAggregate`] recomputes progress
/// from the actual line collection and these numbers are not consulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountSheetSummary {
    /// Sheet header.
    #[serde(flatten)]
    pub sheet: CountSheet,
    /// Number of lines in the sheet.
    pub total_lines: u32,
    /// Number of lines already reconciled.
    pub checked_lines: u32,
}

impl CountSheetSummary {
    /// Derived sheet status: completed once every line is checked.
    #[must_use]
    pub const fn status(&self) -> SheetStatus {
        if self.total_lines > 0 && self.checked_lines >= self.total_lines {
            SheetStatus::Completed
        } else {
            SheetStatus::InProgress
        }
    }

    /// Completion percentage, rounded down; 0 for an empty sheet.
    #[must_use]
    pub const fn progress_percent(&self) -> u32 {
        if self.total_lines == 0 {
            0
        } else {
            self.checked_lines * 100 / self.total_lines
        }
    }

    /// True if any of the summary's searchable fields contains `query`
    /// (already lowercased). Matches sheet id, creator name, and the
    /// status label.
    #[must_use]
    pub fn matches_query(&self, query: &str) -> bool {
        self.sheet.id.to_string().contains(query)
            || self.sheet.created_by.display_name.to_lowercase().contains(query)
            || self.status().label().contains(query)
    }
}

/// Reconciliation progress derived from a sheet's line collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProgress {
    /// Number of lines in the sheet.
    pub total_lines: u32,
    /// Number of lines already reconciled.
    pub checked_lines: u32,
    /// Completion percentage, rounded down.
    pub percent: u32,
}

/// A count sheet together with its owned line collection.
///
/// This is the unit the service hands to callers after opening a sheet.
/// Status and progress are computed functions over `lines` so they can
/// never drift from the lines that produce them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetAggregate {
    /// Sheet header.
    pub sheet: CountSheet,
    /// Owned lines, deduplicated by material and sorted by material id.
    pub lines: Vec<CountLine>,
}

impl SheetAggregate {
    /// Build an aggregate from a backend detail response, deduplicating
    /// lines by material id (first occurrence wins) and sorting them by
    /// material id ascending.
    #[must_use]
    pub fn new(sheet: CountSheet, mut lines: Vec<CountLine>) -> Self {
        lines.sort_by_key(|l| l.material_id);
        lines.dedup_by_key(|l| l.material_id);
        Self { sheet, lines }
    }

    /// Number of lines in the sheet.
    #[must_use]
    pub fn total_lines(&self) -> u32 {
        u32::try_from(self.lines.len()).unwrap_or(u32::MAX)
    }

    /// Number of lines already reconciled.
    #[must_use]
    pub fn checked_lines(&self) -> u32 {
        u32::try_from(self.lines.iter().filter(|l| l.checked).count()).unwrap_or(u32::MAX)
    }

    /// Derived sheet status: in progress while any line is unchecked.
    #[must_use]
    pub fn status(&self) -> SheetStatus {
        if !self.lines.is_empty() && self.lines.iter().all(|l| l.checked) {
            SheetStatus::Completed
        } else {
            SheetStatus::InProgress
        }
    }

    /// Progress snapshot recomputed from the current line collection.
    #[must_use]
    pub fn progress(&self) -> SheetProgress {
        let total = self.total_lines();
        let checked = self.checked_lines();
        SheetProgress {
            total_lines: total,
            checked_lines: checked,
            percent: if total == 0 { 0 } else { checked * 100 / total },
        }
    }

    /// Look up a line by material id.
    #[must_use]
    pub fn line(&self, material_id: stocktake_core::MaterialId) -> Option<&CountLine> {
        self.lines.iter().find(|l| l.material_id == material_id)
    }

    /// Replace the line for `updated.material_id` with the backend's
    /// authoritative version. Returns false if the sheet has no such line.
    pub fn replace_line(&mut self, updated: CountLine) -> bool {
        match self
            .lines
            .iter_mut()
            .find(|l| l.material_id == updated.material_id)
        {
            Some(slot) => {
                *slot = updated;
                true
            }
            None => false,
        }
    }
}
