//! Filter pipeline for count-line listings.
//!
//! Stateless: every call takes a snapshot of lines plus a filter
//! combination and returns the matching subset, so it is safe to call
//! repeatedly with different combinations over the same snapshot.
//! Filter axes combine with AND; the free-text query matches with OR
//! across a line's searchable fields.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stocktake_core::{CategoryBucket, PriorityTier, StockLevel};

use crate::classify;
use crate::models::CountLine;

/// Status tab over a sheet's lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum StatusTab {
    #[default]
    All,
    Checked,
    Unchecked,
    /// Checked lines that recorded a non-zero loss.
    Loss,
}

/// Sort key for line listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    Name,
    Id,
    Stock,
    Expiry,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

/// A combination of filters over a line snapshot.
///
/// `None` on an axis means that axis is inactive. A blank or
/// whitespace-only query is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineFilter {
    /// Status tab.
    pub tab: StatusTab,
    /// Priority-tier axis.
    pub priority: Option<PriorityTier>,
    /// Category-bucket axis.
    pub category: Option<CategoryBucket>,
    /// Stock-level axis.
    pub stock: Option<StockLevel>,
    /// Free-text query across name, id, category, unit, and status label.
    pub query: Option<String>,
}

impl LineFilter {
    /// Number of active advanced-filter axes, for the filter badge.
    /// The status tab and the query are not counted.
    #[must_use]
    pub fn active_count(&self) -> usize {
        usize::from(self.priority.is_some())
            + usize::from(self.category.is_some())
            + usize::from(self.stock.is_some())
    }

    fn matches(&self, line: &CountLine, today: NaiveDate) -> bool {
        let tab_ok = match self.tab {
            StatusTab::All => true,
            StatusTab::Checked => line.checked,
            StatusTab::Unchecked => !line.checked,
            StatusTab::Loss => line.has_loss(),
        };
        if !tab_ok {
            return false;
        }

        if let Some(priority) = self.priority
            && classify::priority(line, today) != priority
        {
            return false;
        }
        if let Some(category) = self.category
            && classify::category_bucket(line.category.as_deref(), &line.material_name) != category
        {
            return false;
        }
        if let Some(stock) = self.stock
            && classify::stock_level(line.resulting_actual_stock) != stock
        {
            return false;
        }

        match normalized_query(self.query.as_deref()) {
            Some(query) => query_matches(line, &query),
            None => true,
        }
    }
}

/// Apply a filter combination to a snapshot of lines.
///
/// A line appears in the result iff it satisfies every active axis.
#[must_use]
pub fn apply<'a>(
    lines: &'a [CountLine],
    filter: &LineFilter,
    today: NaiveDate,
) -> Vec<&'a CountLine> {
    lines.iter().filter(|l| filter.matches(l, today)).collect()
}

/// Sort a filtered listing in place.
///
/// Lines without an expiry date always sort last under [`SortKey::Expiry`],
/// in both directions.
pub fn sort(lines: &mut [&CountLine], key: SortKey, dir: SortDir) {
    lines.sort_by(|a, b| {
        let ordering = match key {
            SortKey::Name => a.material_name.to_lowercase().cmp(&b.material_name.to_lowercase()),
            SortKey::Id => a.material_id.cmp(&b.material_id),
            SortKey::Stock => a.resulting_actual_stock.cmp(&b.resulting_actual_stock),
            SortKey::Expiry => {
                return expiry_ordering(a.expiry_date, b.expiry_date, dir);
            }
        };
        match dir {
            SortDir::Asc => ordering,
            SortDir::Desc => ordering.reverse(),
        }
    });
}

fn expiry_ordering(a: Option<NaiveDate>, b: Option<NaiveDate>, dir: SortDir) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match dir {
            SortDir::Asc => a.cmp(&b),
            SortDir::Desc => b.cmp(&a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn normalized_query(query: Option<&str>) -> Option<String> {
    let trimmed = query?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

fn query_matches(line: &CountLine, query: &str) -> bool {
    line.material_name.to_lowercase().contains(query)
        || line.material_id.to_string().contains(query)
        || line
            .category
            .as_deref()
            .is_some_and(|c| c.to_lowercase().contains(query))
        || line
            .unit
            .as_deref()
            .is_some_and(|u| u.to_lowercase().contains(query))
        || line.status_label().contains(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stocktake_core::MaterialId;

    fn line(id: i32, name: &str, actual: i64, checked: bool, loss: i64) -> CountLine {
        CountLine {
            material_id: MaterialId::new(id),
            material_name: name.to_string(),
            category: None,
            unit: Some("box".to_string()),
            expiry_date: None,
            current_system_stock: actual + loss,
            base_actual_stock: actual + loss,
            historical_loss_total: 0,
            current_loss: loss,
            resulting_actual_stock: actual,
            note: None,
            checked,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        day(2025, 1, 10)
    }

    #[test]
    fn test_status_tabs() {
        let lines = vec![
            line(1, "Gloves", 20, true, 0),
            line(2, "Gauze", 20, true, 3),
            line(3, "Masks", 20, false, 0),
        ];

        let checked = apply(
            &lines,
            &LineFilter {
                tab: StatusTab::Checked,
                ..LineFilter::default()
            },
            today(),
        );
        assert_eq!(checked.len(), 2);

        let unchecked = apply(
            &lines,
            &LineFilter {
                tab: StatusTab::Unchecked,
                ..LineFilter::default()
            },
            today(),
        );
        assert_eq!(unchecked.len(), 1);
        assert_eq!(unchecked[0].material_id, MaterialId::new(3));

        let loss = apply(
            &lines,
            &LineFilter {
                tab: StatusTab::Loss,
                ..LineFilter::default()
            },
            today(),
        );
        assert_eq!(loss.len(), 1);
        assert_eq!(loss[0].material_id, MaterialId::new(2));
    }

    #[test]
    fn test_axes_combine_with_and() {
        // Unchecked AND low stock: only lines satisfying both appear.
        let lines = vec![
            line(1, "A", 5, false, 0),  // unchecked, low
            line(2, "B", 5, true, 0),   // checked, low
            line(3, "C", 40, false, 0), // unchecked, normal
        ];
        let filter = LineFilter {
            tab: StatusTab::Unchecked,
            stock: Some(StockLevel::LowStock),
            ..LineFilter::default()
        };
        let result = apply(&lines, &filter, today());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].material_id, MaterialId::new(1));
    }

    #[test]
    fn test_query_is_or_across_fields() {
        let mut a = line(1, "Nitrile gloves", 20, false, 0);
        a.category = Some("consumable".to_string());
        let b = line(207, "Gauze roll", 20, false, 0);
        let lines = vec![a, b];

        let with_query = |q: &str| LineFilter {
            query: Some(q.to_string()),
            ..LineFilter::default()
        };

        // Name match.
        assert_eq!(apply(&lines, &with_query("gloves"), today()).len(), 1);
        // Id match.
        assert_eq!(apply(&lines, &with_query("207"), today()).len(), 1);
        // Category match.
        assert_eq!(apply(&lines, &with_query("consum"), today()).len(), 1);
        // Unit match (both lines share the unit).
        assert_eq!(apply(&lines, &with_query("box"), today()).len(), 2);
        // Status-label match.
        assert_eq!(apply(&lines, &with_query("unchecked"), today()).len(), 2);
    }

    #[test]
    fn test_blank_query_is_noop() {
        let lines = vec![line(1, "A", 20, false, 0), line(2, "B", 20, true, 0)];
        let filter = LineFilter {
            query: Some("   ".to_string()),
            ..LineFilter::default()
        };
        assert_eq!(apply(&lines, &filter, today()).len(), 2);
    }

    #[test]
    fn test_priority_axis() {
        let lines = vec![
            line(1, "A", 2, false, 0),  // critical (stock <= 5)
            line(2, "B", 20, false, 0), // normal
        ];
        let filter = LineFilter {
            priority: Some(PriorityTier::Critical),
            ..LineFilter::default()
        };
        let result = apply(&lines, &filter, today());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].material_id, MaterialId::new(1));
    }

    #[test]
    fn test_active_count_ignores_tab_and_query() {
        let filter = LineFilter {
            tab: StatusTab::Checked,
            priority: Some(PriorityTier::Normal),
            stock: Some(StockLevel::LowStock),
            query: Some("x".to_string()),
            ..LineFilter::default()
        };
        assert_eq!(filter.active_count(), 2);
    }

    #[test]
    fn test_sort_by_stock_desc() {
        let lines = vec![
            line(1, "A", 5, false, 0),
            line(2, "B", 50, false, 0),
            line(3, "C", 20, false, 0),
        ];
        let mut refs: Vec<&CountLine> = lines.iter().collect();
        sort(&mut refs, SortKey::Stock, SortDir::Desc);
        let stocks: Vec<i64> = refs.iter().map(|l| l.resulting_actual_stock).collect();
        assert_eq!(stocks, vec![50, 20, 5]);
    }

    #[test]
    fn test_sort_by_expiry_missing_dates_last() {
        let mut a = line(1, "A", 5, false, 0);
        a.expiry_date = Some(day(2025, 6, 1));
        let b = line(2, "B", 5, false, 0); // no expiry
        let mut c = line(3, "C", 5, false, 0);
        c.expiry_date = Some(day(2025, 2, 1));
        let lines = vec![a, b, c];

        let mut refs: Vec<&CountLine> = lines.iter().collect();
        sort(&mut refs, SortKey::Expiry, SortDir::Asc);
        let ids: Vec<i32> = refs.iter().map(|l| l.material_id.as_i32()).collect();
        assert_eq!(ids, vec![3, 1, 2]);

        sort(&mut refs, SortKey::Expiry, SortDir::Desc);
        let ids: Vec<i32> = refs.iter().map(|l| l.material_id.as_i32()).collect();
        assert_eq!(ids, vec![1, 3, 2]);
    }

    #[test]
    fn test_filtering_is_stateless_over_snapshot() {
        let lines = vec![line(1, "A", 5, false, 0), line(2, "B", 50, true, 0)];
        let f1 = LineFilter {
            tab: StatusTab::Checked,
            ..LineFilter::default()
        };
        let f2 = LineFilter {
            tab: StatusTab::Unchecked,
            ..LineFilter::default()
        };
        // Repeated calls with different combinations over the same
        // snapshot do not interfere.
        assert_eq!(apply(&lines, &f1, today()).len(), 1);
        assert_eq!(apply(&lines, &f2, today()).len(), 1);
        assert_eq!(apply(&lines, &f1, today()).len(), 1);
    }
}
