//! Status and classification enums for count sheets and count lines.

use serde::{Deserialize, Serialize};

/// Count sheet lifecycle status.
///
/// Derived from the sheet's line collection: a sheet is `InProgress` while
/// any line is unchecked and `Completed` once every line is checked. It is
/// never settable independently of the lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SheetStatus {
    #[default]
    InProgress,
    Completed,
}

impl SheetStatus {
    /// Human-readable label, used by the free-text search axis.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::InProgress => "in progress",
            Self::Completed => "completed",
        }
    }
}

/// Stock-level classification for a count line.
///
/// Thresholds are domain constants (see `stocktake-engine`'s classifier),
/// not configurable per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum StockLevel {
    OutOfStock,
    LowStock,
    HighStock,
    #[default]
    Normal,
}

/// Expiry classification for a count line's material.
///
/// Materials without an expiry date are always `Normal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ExpiryStatus {
    Expired,
    NearExpiry,
    #[default]
    Normal,
}

/// Priority tier used for triage ordering in list displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum PriorityTier {
    Critical,
    Expired,
    NearExpiry,
    #[default]
    Normal,
}

/// Category bucket for a count line's material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum CategoryBucket {
    Consumable,
    Equipment,
    Medicine,
    #[default]
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_status_labels() {
        assert_eq!(SheetStatus::InProgress.label(), "in progress");
        assert_eq!(SheetStatus::Completed.label(), "completed");
    }

    #[test]
    fn test_stock_level_serde_names() {
        let json = serde_json::to_string(&StockLevel::OutOfStock).unwrap();
        assert_eq!(json, "\"outOfStock\"");
        let json = serde_json::to_string(&StockLevel::LowStock).unwrap();
        assert_eq!(json, "\"lowStock\"");
    }

    #[test]
    fn test_priority_default_is_normal() {
        assert_eq!(PriorityTier::default(), PriorityTier::Normal);
    }
}
