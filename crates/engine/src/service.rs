//! Count service: orchestrates sheet and line commands over a backend.
//!
//! This replaces screen-level mutable state with an explicit aggregate:
//! callers hold a [`SheetAggregate`] and issue commands against the
//! service, which awaits the backend to completion before any local
//! state changes. Reconciliation submissions are never applied
//! speculatively - the line is replaced from the backend's authoritative
//! response, so local state cannot diverge from the ledger.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate};
use tokio::sync::{Mutex, RwLock};
use tracing::{instrument, warn};

use stocktake_core::{CountSheetId, MaterialId};

use crate::backend::CountBackend;
use crate::error::EngineError;
use crate::guard::DailyUniquenessGuard;
use crate::models::{CountSheetSummary, SheetAggregate, SheetProgress};
use crate::reconcile;

/// Outcome of a guarded sheet-creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetCreation {
    /// A new sheet was created for the requested day.
    Created(CountSheetSummary),
    /// A sheet already existed for that day; the caller should open it.
    Existing(CountSheetSummary),
}

/// Orchestrator for count-sheet workflows.
///
/// Cheap to clone; all clones share the cached sheet list and the
/// in-flight submission set.
#[derive(Clone)]
pub struct CountService<B> {
    inner: Arc<Inner<B>>,
}

struct Inner<B> {
    backend: B,
    guard: DailyUniquenessGuard,
    /// Cached sheet list, refreshed after every mutation.
    sheets: RwLock<Vec<CountSheetSummary>>,
    /// `(sheet, material)` pairs with an outstanding submission.
    in_flight: Mutex<HashSet<(CountSheetId, MaterialId)>>,
}

impl<B: CountBackend> CountService<B> {
    /// Create a service over `backend`, with `local_offset` as the
    /// warehouse-local calendar zone.
    #[must_use]
    pub fn new(backend: B, local_offset: FixedOffset) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                guard: DailyUniquenessGuard::new(local_offset),
                sheets: RwLock::new(Vec::new()),
                in_flight: Mutex::new(HashSet::new()),
            }),
        }
    }

    /// Today's calendar day in the warehouse-local zone.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.inner.guard.today()
    }

    /// Snapshot of the cached sheet list.
    pub async fn sheets(&self) -> Vec<CountSheetSummary> {
        self.inner.sheets.read().await.clone()
    }

    /// Cached sheets whose id, creator name, or status label contains
    /// `query` (case-insensitive). A blank query returns everything.
    pub async fn search_sheets(&self, query: &str) -> Vec<CountSheetSummary> {
        let query = query.trim().to_lowercase();
        let sheets = self.inner.sheets.read().await;
        if query.is_empty() {
            sheets.clone()
        } else {
            sheets
                .iter()
                .filter(|s| s.matches_query(&query))
                .cloned()
                .collect()
        }
    }

    /// Refresh the sheet list from the backend.
    ///
    /// # Errors
    ///
    /// Propagates backend errors; the cache keeps its previous contents
    /// on failure.
    #[instrument(skip(self))]
    pub async fn refresh_sheets(&self) -> Result<Vec<CountSheetSummary>, EngineError> {
        let fresh = self.inner.backend.list_count_sheets().await?;
        *self.inner.sheets.write().await = fresh.clone();
        Ok(fresh)
    }

    /// Create a sheet for today (warehouse-local).
    ///
    /// # Errors
    ///
    /// See [`Self::create_sheet_for`].
    pub async fn create_sheet_for_today(&self) -> Result<SheetCreation, EngineError> {
        self.create_sheet_for(self.today()).await
    }

    /// Create a sheet for `date`, enforcing one sheet per calendar day.
    ///
    /// The local guard runs against a fresh sheet list first; if it
    /// finds a conflicting sheet the backend is never called. A
    /// `Conflict` from the backend (two clients racing) is handled the
    /// same way: refresh and route to the existing sheet.
    ///
    /// # Errors
    ///
    /// Propagates backend errors other than the recovered `Conflict`.
    #[instrument(skip(self), fields(date = %date))]
    pub async fn create_sheet_for(&self, date: NaiveDate) -> Result<SheetCreation, EngineError> {
        let sheets = self.refresh_sheets().await?;
        if let Some(existing) = self.inner.guard.find_for_date(date, &sheets) {
            return Ok(SheetCreation::Existing(existing.clone()));
        }

        match self.inner.backend.create_count_sheet(date).await {
            Ok(created) => {
                self.refresh_sheets().await?;
                Ok(SheetCreation::Created(created))
            }
            Err(EngineError::Conflict { .. }) => {
                // Another client won the race; the refreshed list must
                // now contain the conflicting sheet.
                warn!(%date, "sheet creation lost a race, rerouting to existing sheet");
                let sheets = self.refresh_sheets().await?;
                self.inner
                    .guard
                    .find_for_date(date, &sheets)
                    .cloned()
                    .map(SheetCreation::Existing)
                    .ok_or_else(|| {
                        EngineError::NotFound(format!("count sheet for {date}"))
                    })
            }
            Err(other) => Err(other),
        }
    }

    /// Open a sheet: fetch its detail and build the aggregate, with
    /// lines deduplicated by material and sorted by material id.
    ///
    /// # Errors
    ///
    /// Propagates backend errors, including `NotFound` for a sheet
    /// deleted concurrently.
    #[instrument(skip(self), fields(sheet_id = %sheet_id))]
    pub async fn open_sheet(&self, sheet_id: CountSheetId) -> Result<SheetAggregate, EngineError> {
        let detail = self.inner.backend.get_count_sheet_detail(sheet_id).await?;
        Ok(SheetAggregate::new(detail.sheet, detail.lines))
    }

    /// Submit a reconciliation for one line of an open sheet.
    ///
    /// The loss is parsed from free text (blank or non-numeric input
    /// counts as zero) and validated locally before any network call.
    /// On success the aggregate's line is replaced with the backend's
    /// authoritative version and the recomputed progress is returned.
    ///
    /// # Errors
    ///
    /// - [`EngineError::NotFound`] if the sheet has no line for
    ///   `material_id`.
    /// - [`EngineError::OutOfRangeLoss`] if the loss falls outside
    ///   `[0, base_actual_stock]`; the backend is not called.
    /// - [`EngineError::SubmissionInFlight`] if a submission for the
    ///   same `(sheet, material)` pair is still outstanding.
    /// - Backend errors from the awaited call, with no local mutation.
    #[instrument(skip(self, aggregate, note), fields(sheet_id = %sheet_id, material_id = %material_id))]
    pub async fn submit_line(
        &self,
        aggregate: &mut SheetAggregate,
        sheet_id: CountSheetId,
        material_id: MaterialId,
        raw_loss: &str,
        note: Option<String>,
    ) -> Result<SheetProgress, EngineError> {
        let line = aggregate
            .line(material_id)
            .ok_or_else(|| EngineError::NotFound(format!("line for material {material_id}")))?;

        let loss = reconcile::parse_loss(raw_loss);
        reconcile::check_loss(line.base_actual_stock, loss)?;

        let pair = (sheet_id, material_id);
        {
            let mut in_flight = self.inner.in_flight.lock().await;
            if !in_flight.insert(pair) {
                return Err(EngineError::SubmissionInFlight {
                    sheet_id,
                    material_id,
                });
            }
        }

        let result = self
            .inner
            .backend
            .submit_reconciliation(sheet_id, material_id, loss, note)
            .await;
        self.inner.in_flight.lock().await.remove(&pair);

        let updated = result?;
        if !aggregate.replace_line(updated) {
            return Err(EngineError::NotFound(format!(
                "line for material {material_id}"
            )));
        }
        Ok(aggregate.progress())
    }

    /// Delete a sheet (cascades to its lines and history) and refresh
    /// the sheet list.
    ///
    /// # Errors
    ///
    /// Propagates backend errors.
    #[instrument(skip(self), fields(sheet_id = %sheet_id))]
    pub async fn delete_sheet(&self, sheet_id: CountSheetId) -> Result<(), EngineError> {
        self.inner.backend.delete_count_sheet(sheet_id).await?;
        self.refresh_sheets().await?;
        Ok(())
    }
}
