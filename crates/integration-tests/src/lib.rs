//! Integration test harness for Stocktake.
//!
//! The engine talks to the warehouse backend exclusively through the
//! `CountBackend` trait, so the tests drive a real `CountService`
//! against [`InMemoryBackend`], which plays the server role: it owns
//! the stock ledger, materializes lines with carried-forward actual
//! stock when a sheet is created, keeps per-material loss history,
//! enforces the duplicate-day backstop with a `Conflict`, and cascades
//! sheet deletion.
//!
//! Run with: `cargo test -p stocktake-integration-tests`

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use chrono::NaiveDate;

use stocktake_core::{CountSheetId, MaterialId, UserId, UserRef};
use stocktake_engine::backend::{CountBackend, SheetDetail};
use stocktake_engine::error::EngineError;
use stocktake_engine::models::{CountLine, CountSheet, CountSheetSummary};
use stocktake_engine::reconcile;

/// Initialize tracing once for the whole test binary.
pub fn init_tracing() {
    static INIT: OnceLock<()> = OnceLock::new();
    INIT.get_or_init(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// A material known to the backend's ledger.
#[derive(Debug, Clone)]
pub struct MaterialSpec {
    pub id: MaterialId,
    pub name: String,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    /// Nominal ("current system") stock in the ledger.
    pub nominal_stock: i64,
}

impl MaterialSpec {
    /// A material with just an id, a name, and a nominal stock.
    #[must_use]
    pub fn basic(id: i32, name: &str, nominal_stock: i64) -> Self {
        Self {
            id: MaterialId::new(id),
            name: name.to_string(),
            category: None,
            unit: None,
            expiry_date: None,
            nominal_stock,
        }
    }
}

#[derive(Debug, Clone)]
struct SheetRecord {
    sheet: CountSheet,
    lines: Vec<CountLine>,
}

#[derive(Debug, Default)]
struct State {
    materials: Vec<MaterialSpec>,
    /// Sheets in creation order; creation order is also date order in
    /// every test, which is what carry-forward relies on.
    sheets: Vec<SheetRecord>,
    next_sheet_id: i32,
    /// Error injected into the next backend call, whichever it is.
    fail_next: Option<EngineError>,
}

/// In-memory stand-in for the warehouse backend.
#[derive(Clone)]
pub struct InMemoryBackend {
    state: Arc<Mutex<State>>,
    submit_calls: Arc<AtomicUsize>,
    /// Artificial latency for reconciliation submissions, used to force
    /// overlapping in-flight submissions in tests.
    submit_delay: Duration,
}

impl InMemoryBackend {
    #[must_use]
    pub fn new(materials: Vec<MaterialSpec>) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                materials,
                sheets: Vec::new(),
                next_sheet_id: 1,
                fail_next: None,
            })),
            submit_calls: Arc::new(AtomicUsize::new(0)),
            submit_delay: Duration::ZERO,
        }
    }

    /// Delay every reconciliation submission by `delay`.
    #[must_use]
    pub fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = delay;
        self
    }

    /// Make the next backend call (any operation) fail with `err`.
    pub fn fail_next_with(&self, err: EngineError) {
        self.state.lock().expect("state lock").fail_next = Some(err);
    }

    /// Number of reconciliation submissions the backend has received.
    #[must_use]
    pub fn submit_call_count(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    /// Remove a sheet behind the engine's back, simulating a concurrent
    /// delete from another client.
    pub fn drop_sheet(&self, sheet_id: CountSheetId) {
        let mut state = self.state.lock().expect("state lock");
        state.sheets.retain(|r| r.sheet.id != sheet_id);
    }

    fn take_injected_failure(state: &mut State) -> Option<EngineError> {
        state.fail_next.take()
    }

    /// Materialize one line per ledger material, inheriting actual stock
    /// from the most recent sheet and accumulating loss history.
    fn materialize_lines(state: &State) -> Vec<CountLine> {
        state
            .materials
            .iter()
            .map(|m| {
                let carried = state
                    .sheets
                    .iter()
                    .rev()
                    .find_map(|r| r.lines.iter().find(|l| l.material_id == m.id))
                    .map(|l| l.resulting_actual_stock);
                let historical_loss: i64 = state
                    .sheets
                    .iter()
                    .flat_map(|r| &r.lines)
                    .filter(|l| l.material_id == m.id)
                    .map(|l| l.current_loss)
                    .sum();
                let base = carried.unwrap_or(m.nominal_stock);
                CountLine {
                    material_id: m.id,
                    material_name: m.name.clone(),
                    category: m.category.clone(),
                    unit: m.unit.clone(),
                    expiry_date: m.expiry_date,
                    current_system_stock: m.nominal_stock,
                    base_actual_stock: base,
                    historical_loss_total: historical_loss,
                    current_loss: 0,
                    resulting_actual_stock: base,
                    note: None,
                    checked: false,
                }
            })
            .collect()
    }

    fn summarize(record: &SheetRecord) -> CountSheetSummary {
        CountSheetSummary {
            sheet: record.sheet.clone(),
            total_lines: u32::try_from(record.lines.len()).expect("line count fits u32"),
            checked_lines: u32::try_from(record.lines.iter().filter(|l| l.checked).count())
                .expect("line count fits u32"),
        }
    }
}

impl CountBackend for InMemoryBackend {
    async fn list_count_sheets(&self) -> Result<Vec<CountSheetSummary>, EngineError> {
        let mut state = self.state.lock().expect("state lock");
        if let Some(err) = Self::take_injected_failure(&mut state) {
            return Err(err);
        }
        Ok(state.sheets.iter().rev().map(Self::summarize).collect())
    }

    async fn create_count_sheet(&self, date: NaiveDate) -> Result<CountSheetSummary, EngineError> {
        let mut state = self.state.lock().expect("state lock");
        if let Some(err) = Self::take_injected_failure(&mut state) {
            return Err(err);
        }

        // Server-side backstop for the one-sheet-per-day rule.
        if let Some(existing) = state
            .sheets
            .iter()
            .find(|r| r.sheet.date.date_naive() == date)
        {
            return Err(EngineError::Conflict {
                date,
                existing_sheet_id: Some(existing.sheet.id),
            });
        }

        let id = CountSheetId::new(state.next_sheet_id);
        state.next_sheet_id += 1;
        let record = SheetRecord {
            sheet: CountSheet {
                id,
                date: date.and_hms_opt(0, 0, 0).expect("midnight exists").and_utc(),
                created_by: UserRef {
                    id: UserId::new(1),
                    display_name: "Test User".to_string(),
                },
            },
            lines: Self::materialize_lines(&state),
        };
        let summary = Self::summarize(&record);
        state.sheets.push(record);
        Ok(summary)
    }

    async fn get_count_sheet_detail(
        &self,
        sheet_id: CountSheetId,
    ) -> Result<SheetDetail, EngineError> {
        let mut state = self.state.lock().expect("state lock");
        if let Some(err) = Self::take_injected_failure(&mut state) {
            return Err(err);
        }
        state
            .sheets
            .iter()
            .find(|r| r.sheet.id == sheet_id)
            .map(|r| SheetDetail {
                sheet: r.sheet.clone(),
                lines: r.lines.clone(),
            })
            .ok_or_else(|| EngineError::NotFound(format!("count sheet {sheet_id}")))
    }

    async fn submit_reconciliation(
        &self,
        sheet_id: CountSheetId,
        material_id: MaterialId,
        loss: i64,
        note: Option<String>,
    ) -> Result<CountLine, EngineError> {
        if !self.submit_delay.is_zero() {
            tokio::time::sleep(self.submit_delay).await;
        }
        self.submit_calls.fetch_add(1, Ordering::SeqCst);

        let mut state = self.state.lock().expect("state lock");
        if let Some(err) = Self::take_injected_failure(&mut state) {
            return Err(err);
        }
        let record = state
            .sheets
            .iter_mut()
            .find(|r| r.sheet.id == sheet_id)
            .ok_or_else(|| EngineError::NotFound(format!("count sheet {sheet_id}")))?;
        let line = record
            .lines
            .iter_mut()
            .find(|l| l.material_id == material_id)
            .ok_or_else(|| EngineError::NotFound(format!("line for material {material_id}")))?;

        // Same rules as the real backend: bounds re-checked server-side,
        // resubmission overwrites.
        let updated = reconcile::apply(line, loss, note)?;
        *line = updated.clone();
        Ok(updated)
    }

    async fn delete_count_sheet(&self, sheet_id: CountSheetId) -> Result<(), EngineError> {
        let mut state = self.state.lock().expect("state lock");
        if let Some(err) = Self::take_injected_failure(&mut state) {
            return Err(err);
        }
        let before = state.sheets.len();
        state.sheets.retain(|r| r.sheet.id != sheet_id);
        if state.sheets.len() == before {
            return Err(EngineError::NotFound(format!("count sheet {sheet_id}")));
        }
        Ok(())
    }
}
