//! Domain models for count sheets and their lines.

pub mod count_line;
pub mod count_sheet;

pub use count_line::CountLine;
pub use count_sheet::{CountSheet, CountSheetSummary, SheetAggregate, SheetProgress};
