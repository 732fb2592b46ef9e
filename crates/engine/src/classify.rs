//! Line classifier: derives display-facing tags from a count line.
//!
//! All functions are pure and never mutate the line. Thresholds are
//! domain constants shared by every caller, not per-call knobs.

use chrono::NaiveDate;

use stocktake_core::{CategoryBucket, ExpiryStatus, PriorityTier, StockLevel};

use crate::models::CountLine;

/// Upper bound of the low-stock band (inclusive).
pub const LOW_STOCK_MAX: i64 = 10;
/// Lower bound of the high-stock band (exclusive).
pub const HIGH_STOCK_MIN: i64 = 50;
/// Stock at or below this, when out of or low on stock, is critical.
pub const CRITICAL_STOCK_MAX: i64 = 5;
/// Days-to-expiry window that counts as near expiry (inclusive).
pub const NEAR_EXPIRY_WINDOW_DAYS: i64 = 60;

/// Stock-level tag for an actual stock quantity.
#[must_use]
pub const fn stock_level(actual: i64) -> StockLevel {
    if actual <= 0 {
        StockLevel::OutOfStock
    } else if actual <= LOW_STOCK_MAX {
        StockLevel::LowStock
    } else if actual > HIGH_STOCK_MIN {
        StockLevel::HighStock
    } else {
        StockLevel::Normal
    }
}

/// Expiry tag relative to `today`.
///
/// Materials without an expiry date are excluded from both tags.
#[must_use]
pub fn expiry_status(expiry: Option<NaiveDate>, today: NaiveDate) -> ExpiryStatus {
    let Some(expiry) = expiry else {
        return ExpiryStatus::Normal;
    };
    if expiry < today {
        return ExpiryStatus::Expired;
    }
    let days_left = (expiry - today).num_days();
    if days_left <= NEAR_EXPIRY_WINDOW_DAYS {
        ExpiryStatus::NearExpiry
    } else {
        ExpiryStatus::Normal
    }
}

/// Priority tier for triage ordering, first match wins:
/// critically low stock, then expired, then near expiry, then normal.
#[must_use]
pub fn priority(line: &CountLine, today: NaiveDate) -> PriorityTier {
    let actual = line.resulting_actual_stock;
    let critical_stock = matches!(
        stock_level(actual),
        StockLevel::OutOfStock | StockLevel::LowStock
    ) && actual <= CRITICAL_STOCK_MAX;

    if critical_stock {
        PriorityTier::Critical
    } else {
        match expiry_status(line.expiry_date, today) {
            ExpiryStatus::Expired => PriorityTier::Expired,
            ExpiryStatus::NearExpiry => PriorityTier::NearExpiry,
            ExpiryStatus::Normal => PriorityTier::Normal,
        }
    }
}

/// Category bucket for a line.
///
/// The material's category identifier is the primary path. The keyword
/// heuristic over the display name is a degraded fallback for backends
/// that never assigned a category, and only runs when the identifier is
/// absent.
#[must_use]
pub fn category_bucket(category: Option<&str>, material_name: &str) -> CategoryBucket {
    category.map_or_else(
        || name_heuristic(material_name),
        |id| match id.trim().to_lowercase().as_str() {
            "consumable" => CategoryBucket::Consumable,
            "equipment" => CategoryBucket::Equipment,
            "medicine" => CategoryBucket::Medicine,
            _ => CategoryBucket::Other,
        },
    )
}

fn name_heuristic(material_name: &str) -> CategoryBucket {
    let name = material_name.to_lowercase();
    let contains_any = |keywords: &[&str]| keywords.iter().any(|k| name.contains(k));

    if contains_any(&["glove", "syringe", "mask", "gauze", "swab", "bandage"]) {
        CategoryBucket::Consumable
    } else if contains_any(&["machine", "monitor", "device", "analyzer", "scale"]) {
        CategoryBucket::Equipment
    } else if contains_any(&["reagent", "chemical", "vaccine", "solution", "serum"]) {
        CategoryBucket::Medicine
    } else {
        CategoryBucket::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stocktake_core::MaterialId;

    fn line(actual: i64, expiry: Option<NaiveDate>) -> CountLine {
        CountLine {
            material_id: MaterialId::new(1),
            material_name: "Test material".to_string(),
            category: None,
            unit: None,
            expiry_date: expiry,
            current_system_stock: actual,
            base_actual_stock: actual,
            historical_loss_total: 0,
            current_loss: 0,
            resulting_actual_stock: actual,
            note: None,
            checked: false,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_stock_level_bands() {
        assert_eq!(stock_level(0), StockLevel::OutOfStock);
        assert_eq!(stock_level(-2), StockLevel::OutOfStock);
        assert_eq!(stock_level(1), StockLevel::LowStock);
        assert_eq!(stock_level(10), StockLevel::LowStock);
        assert_eq!(stock_level(11), StockLevel::Normal);
        assert_eq!(stock_level(50), StockLevel::Normal);
        assert_eq!(stock_level(51), StockLevel::HighStock);
    }

    #[test]
    fn test_expiry_status_windows() {
        let today = day(2025, 1, 10);
        assert_eq!(expiry_status(None, today), ExpiryStatus::Normal);
        assert_eq!(
            expiry_status(Some(day(2025, 1, 9)), today),
            ExpiryStatus::Expired
        );
        assert_eq!(
            expiry_status(Some(day(2025, 1, 10)), today),
            ExpiryStatus::NearExpiry
        );
        assert_eq!(
            expiry_status(Some(day(2025, 3, 11)), today),
            ExpiryStatus::NearExpiry
        );
        assert_eq!(
            expiry_status(Some(day(2025, 3, 12)), today),
            ExpiryStatus::Normal
        );
    }

    #[test]
    fn test_priority_precedence() {
        let today = day(2025, 1, 10);
        let expired = Some(day(2025, 1, 1));

        // Critically low stock wins even when expired.
        assert_eq!(priority(&line(3, expired), today), PriorityTier::Critical);
        assert_eq!(priority(&line(0, None), today), PriorityTier::Critical);

        // Low stock above the critical threshold defers to expiry.
        assert_eq!(priority(&line(8, expired), today), PriorityTier::Expired);
        assert_eq!(
            priority(&line(8, Some(day(2025, 2, 1))), today),
            PriorityTier::NearExpiry
        );
        assert_eq!(priority(&line(8, None), today), PriorityTier::Normal);
        assert_eq!(priority(&line(100, None), today), PriorityTier::Normal);
    }

    #[test]
    fn test_category_identifier_is_primary() {
        assert_eq!(
            category_bucket(Some("consumable"), "Pulse monitor"),
            CategoryBucket::Consumable
        );
        assert_eq!(
            category_bucket(Some("Equipment"), "anything"),
            CategoryBucket::Equipment
        );
        assert_eq!(
            category_bucket(Some("stationery"), "Nitrile gloves"),
            CategoryBucket::Other
        );
    }

    #[test]
    fn test_name_heuristic_only_without_identifier() {
        assert_eq!(
            category_bucket(None, "Nitrile gloves size M"),
            CategoryBucket::Consumable
        );
        assert_eq!(
            category_bucket(None, "Blood pressure monitor"),
            CategoryBucket::Equipment
        );
        assert_eq!(
            category_bucket(None, "Saline solution 0.9%"),
            CategoryBucket::Medicine
        );
        assert_eq!(category_bucket(None, "Paper towels"), CategoryBucket::Other);
    }
}
