//! Unified error handling for the reconciliation engine.

use chrono::NaiveDate;
use thiserror::Error;

use stocktake_core::{CountSheetId, MaterialId};

/// Errors surfaced by the engine and its backend collaborator.
///
/// Validation errors (`OutOfRangeLoss`, `SubmissionInFlight`) are resolved
/// before any network call. Everything else is detected only after an
/// awaited collaborator call and reported verbatim - never swallowed, and
/// never retried automatically.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// Authentication token missing or invalid; the caller must force
    /// re-authentication. Not retried.
    #[error("Session expired, please sign in again")]
    SessionExpired,

    /// A count sheet already exists for the requested calendar day.
    /// Recovered by routing the caller to the existing sheet.
    #[error("A count sheet already exists for {date}")]
    Conflict {
        /// Calendar day that was requested.
        date: NaiveDate,
        /// The conflicting sheet, when the backend or guard identified it.
        existing_sheet_id: Option<CountSheetId>,
    },

    /// Submitted loss quantity falls outside `[0, base_actual_stock]`.
    /// Surfaced immediately; no submission is attempted.
    #[error("Loss quantity must be between 0 and {max} (got {loss})")]
    OutOfRangeLoss {
        /// Rejected loss quantity.
        loss: i64,
        /// Upper bound: the line's base actual stock.
        max: i64,
    },

    /// A submission for this `(sheet, material)` pair is already in
    /// flight; refused locally so last-write-wins stays deterministic.
    #[error("A reconciliation for material {material_id} on sheet {sheet_id} is already in flight")]
    SubmissionInFlight {
        /// Sheet being reconciled.
        sheet_id: CountSheetId,
        /// Material with an outstanding submission.
        material_id: MaterialId,
    },

    /// Sheet or line vanished server-side (e.g. deleted concurrently).
    /// The caller should refresh its list to reconcile.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Transport or server failure. Surfaced with a retry affordance;
    /// retrying is an explicit caller action, never automatic.
    #[error("Request failed: {0}")]
    NetworkOrServer(String),
}
