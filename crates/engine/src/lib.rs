//! Stocktake Engine - count-sheet reconciliation.
//!
//! The engine implements the rules around periodic physical stock
//! counting: one count sheet per calendar day, per-material loss
//! reconciliation with bounds validation, actual stock carried forward
//! across sequential sheets, and classification/filtering of count lines
//! for reporting.
//!
//! Storage belongs to the external warehouse backend, reached through
//! the [`backend::CountBackend`] trait. The engine's own pieces are
//! pure where they can be:
//!
//! - [`guard`] - the one-sheet-per-day decision functions
//! - [`reconcile`] - loss parsing, bounds validation, and derivation
//! - [`classify`] - stock/expiry/priority/category tags
//! - [`filter`] - the stateless filter-and-sort pipeline
//! - [`service`] - the command orchestrator over a backend
//!
//! # Example
//!
//! ```rust,ignore
//! use stocktake_engine::{CountService, SheetCreation};
//!
//! let service = CountService::new(backend, warehouse_offset);
//! match service.create_sheet_for_today().await? {
//!     SheetCreation::Created(sheet) | SheetCreation::Existing(sheet) => {
//!         let mut aggregate = service.open_sheet(sheet.sheet.id).await?;
//!         let progress = service
//!             .submit_line(&mut aggregate, sheet.sheet.id, material_id, "20", None)
//!             .await?;
//!     }
//! }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod classify;
pub mod error;
pub mod filter;
pub mod guard;
pub mod models;
pub mod reconcile;
pub mod service;

pub use backend::{CountBackend, SheetDetail};
pub use error::EngineError;
pub use filter::{LineFilter, SortDir, SortKey, StatusTab};
pub use guard::DailyUniquenessGuard;
pub use models::{CountLine, CountSheet, CountSheetSummary, SheetAggregate, SheetProgress};
pub use service::{CountService, SheetCreation};
