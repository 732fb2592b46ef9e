//! Count line domain model - one material's reconciliation record within a sheet.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stocktake_core::MaterialId;

/// One material's reconciliation record within a count sheet.
///
/// Created in bulk when the owning sheet is created (one per active
/// material known to the ledger at that moment), mutated only through
/// reconciliation submissions, and deleted together with the sheet.
///
/// Invariants held by the backend and re-checked locally before every
/// submission: `0 <= current_loss <= base_actual_stock`, and
/// `resulting_actual_stock == base_actual_stock - current_loss >= 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountLine {
    /// Material this line reconciles. Weak reference - the material
    /// entity (name, category, expiry) is owned externally.
    pub material_id: MaterialId,
    /// Material display name, cached for display and search.
    pub material_name: String,
    /// Material category identifier, when the backend supplies one.
    pub category: Option<String>,
    /// Unit of measure label (box, roll, piece, ...).
    pub unit: Option<String>,
    /// Material expiry date, if it has one.
    pub expiry_date: Option<NaiveDate>,
    /// Nominal warehouse stock, fixed for the life of the sheet.
    pub current_system_stock: i64,
    /// Actual stock inherited from the immediately preceding sheet, or
    /// the nominal stock if no prior sheet exists.
    pub base_actual_stock: i64,
    /// Sum of losses recorded in sheets strictly before this one.
    pub historical_loss_total: i64,
    /// Loss recorded in this sheet; zero until reconciled.
    pub current_loss: i64,
    /// `base_actual_stock - current_loss`; becomes the next sheet's
    /// `base_actual_stock` for the same material.
    pub resulting_actual_stock: i64,
    /// Free-text explanation for the recorded loss.
    pub note: Option<String>,
    /// False until a reconciliation has been submitted for this line.
    /// Resubmission overwrites values but keeps the flag set.
    pub checked: bool,
}

impl CountLine {
    /// Label for the line's checked state, used by the free-text search axis.
    #[must_use]
    pub const fn status_label(&self) -> &'static str {
        if self.checked { "checked" } else { "unchecked" }
    }

    /// Whether the line recorded a non-zero loss in this sheet.
    #[must_use]
    pub const fn has_loss(&self) -> bool {
        self.checked && self.current_loss > 0
    }
}
