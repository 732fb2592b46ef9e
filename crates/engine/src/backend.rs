//! Backend collaborator interface.
//!
//! The engine owns no storage. Sheets, lines, the stock ledger, and the
//! loss-history records live in the external warehouse backend; the
//! engine reads and writes them exclusively through this trait. The
//! reqwest implementation lives in `stocktake-client`; tests substitute
//! an in-memory implementation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stocktake_core::{CountSheetId, MaterialId};

use crate::error::EngineError;
use crate::models::{CountLine, CountSheet, CountSheetSummary};

/// A count sheet detail response: header plus its owned lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetDetail {
    /// Sheet header.
    pub sheet: CountSheet,
    /// All lines of the sheet, as stored by the backend.
    pub lines: Vec<CountLine>,
}

/// External warehouse backend the engine collaborates with.
///
/// Contract notes:
/// - `create_count_sheet` fails with [`EngineError::Conflict`] when a
///   sheet already exists for that calendar day - the server-enforced
///   backstop behind the local uniqueness guard.
/// - `submit_reconciliation` is idempotent per `(sheet, material)` pair:
///   resubmitting overwrites the previous submission.
/// - `delete_count_sheet` cascades to the sheet's lines and history
///   records.
/// - Per-material write serialization on the ledger is the backend's
///   responsibility, not the engine's.
pub trait CountBackend {
    /// List all count sheets for the tenant, newest first.
    fn list_count_sheets(
        &self,
    ) -> impl Future<Output = Result<Vec<CountSheetSummary>, EngineError>> + Send;

    /// Create a sheet for `date`, materializing one line per active
    /// material with base stock copied from the ledger.
    fn create_count_sheet(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<CountSheetSummary, EngineError>> + Send;

    /// Fetch a sheet and all of its lines.
    fn get_count_sheet_detail(
        &self,
        sheet_id: CountSheetId,
    ) -> impl Future<Output = Result<SheetDetail, EngineError>> + Send;

    /// Record a reconciled loss for one line and persist the updated
    /// ledger state. Returns the authoritative updated line.
    fn submit_reconciliation(
        &self,
        sheet_id: CountSheetId,
        material_id: MaterialId,
        loss: i64,
        note: Option<String>,
    ) -> impl Future<Output = Result<CountLine, EngineError>> + Send;

    /// Delete a sheet and everything it owns.
    fn delete_count_sheet(
        &self,
        sheet_id: CountSheetId,
    ) -> impl Future<Output = Result<(), EngineError>> + Send;
}
