//! Daily uniqueness guard: at most one count sheet per calendar day.
//!
//! Sheet dates are persisted as timestamps, and older backend rows were
//! written as date-only strings whose day component shifts across the
//! UTC/local boundary. The warehouse-local offset is the canonical
//! calendar zone; the additional UTC-side comparison is a compatibility
//! shim for those legacy rows, so a match under *either* representation
//! counts as a conflict. Without it, two sheets could slip into the same
//! day near midnight.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use crate::models::CountSheetSummary;

/// Pure decision functions for the one-sheet-per-day rule.
///
/// Holds only the warehouse-local UTC offset; both operations are side
/// effect free over the supplied sheet list. The backend enforces the same
/// rule server-side as a backstop against racing clients, so a `Conflict`
/// response must be handled identically to a local refusal.
#[derive(Debug, Clone, Copy)]
pub struct DailyUniquenessGuard {
    local_offset: FixedOffset,
}

impl DailyUniquenessGuard {
    /// Create a guard for the given warehouse-local offset.
    #[must_use]
    pub const fn new(local_offset: FixedOffset) -> Self {
        Self { local_offset }
    }

    /// Whether a new sheet may be created for `date`.
    ///
    /// Returns false iff any existing sheet's timestamp, normalized to a
    /// calendar day under either UTC or the warehouse-local offset,
    /// equals `date`.
    #[must_use]
    pub fn can_create(&self, date: NaiveDate, existing: &[CountSheetSummary]) -> bool {
        self.find_for_date(date, existing).is_none()
    }

    /// The sheet conflicting with `date`, if any.
    ///
    /// Used to offer "open the existing sheet" instead of refusing
    /// silently.
    #[must_use]
    pub fn find_for_date<'a>(
        &self,
        date: NaiveDate,
        existing: &'a [CountSheetSummary],
    ) -> Option<&'a CountSheetSummary> {
        existing.iter().find(|summary| {
            let (utc_day, local_day) = self.calendar_days(summary.sheet.date);
            utc_day == date || local_day == date
        })
    }

    /// Today's calendar day in the warehouse-local zone.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.local_offset).date_naive()
    }

    /// A timestamp's calendar day under both normalizations.
    fn calendar_days(&self, ts: DateTime<Utc>) -> (NaiveDate, NaiveDate) {
        (ts.date_naive(), ts.with_timezone(&self.local_offset).date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use stocktake_core::{CountSheetId, UserId, UserRef};

    use crate::models::CountSheet;

    fn guard() -> DailyUniquenessGuard {
        // UTC+7, the warehouse deployment zone.
        DailyUniquenessGuard::new(FixedOffset::east_opt(7 * 3600).unwrap())
    }

    fn summary(id: i32, ts: DateTime<Utc>) -> CountSheetSummary {
        CountSheetSummary {
            sheet: CountSheet {
                id: CountSheetId::new(id),
                date: ts,
                created_by: UserRef {
                    id: UserId::new(1),
                    display_name: "Lan".to_string(),
                },
            },
            total_lines: 0,
            checked_lines: 0,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_can_create_on_empty_list() {
        assert!(guard().can_create(day(2025, 1, 10), &[]));
    }

    #[test]
    fn test_same_day_is_refused() {
        let existing = vec![summary(1, Utc.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap())];
        assert!(!guard().can_create(day(2025, 1, 10), &existing));
        assert!(guard().can_create(day(2025, 1, 11), &existing));
    }

    #[test]
    fn test_conflict_under_local_representation_only() {
        // 2025-01-10T20:00Z is already 2025-01-11 at UTC+7. A sheet
        // persisted that way must block both interpretations of its day.
        let existing = vec![summary(1, Utc.with_ymd_and_hms(2025, 1, 10, 20, 0, 0).unwrap())];
        assert!(!guard().can_create(day(2025, 1, 10), &existing));
        assert!(!guard().can_create(day(2025, 1, 11), &existing));
        assert!(guard().can_create(day(2025, 1, 12), &existing));
    }

    #[test]
    fn test_find_for_date_returns_conflicting_sheet() {
        let g = guard();
        let existing = vec![
            summary(1, Utc.with_ymd_and_hms(2025, 1, 9, 8, 0, 0).unwrap()),
            summary(2, Utc.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap()),
        ];
        let found = g.find_for_date(day(2025, 1, 10), &existing);
        assert_eq!(found.map(|s| s.sheet.id), Some(CountSheetId::new(2)));
        assert!(g.find_for_date(day(2025, 1, 12), &existing).is_none());
    }
}
