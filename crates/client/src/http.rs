//! Warehouse backend API client.
//!
//! JSON/REST over `reqwest`, authenticated with a bearer token. The
//! client is a thin transport layer: all reconciliation rules live in
//! `stocktake-engine`, which consumes this through the `CountBackend`
//! trait. HTTP failures are mapped onto the engine's error taxonomy
//! here; nothing is retried automatically.

use std::sync::Arc;

use chrono::NaiveDate;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::instrument;

use stocktake_core::{CountSheetId, MaterialId};
use stocktake_engine::backend::{CountBackend, SheetDetail};
use stocktake_engine::error::EngineError;
use stocktake_engine::models::{CountLine, CountSheetSummary};

use crate::config::StocktakeConfig;

/// Warehouse backend API client.
///
/// Cheap to clone; clones share the underlying HTTP connection pool.
#[derive(Clone)]
pub struct WarehouseClient {
    inner: Arc<WarehouseClientInner>,
}

struct WarehouseClientInner {
    http: reqwest::Client,
    base_url: String,
    api_token: SecretString,
}

/// Request body for creating a count sheet.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateSheetRequest {
    date: NaiveDate,
}

/// Request body for submitting a reconciliation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReconciliationRequest<'a> {
    material_id: MaterialId,
    loss: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<&'a str>,
}

/// Error body the backend attaches to a 409 response, when it can
/// identify the conflicting sheet.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConflictBody {
    existing_sheet_id: Option<CountSheetId>,
}

impl WarehouseClient {
    /// Create a client for the configured backend.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created. This should never
    /// happen under normal circumstances as we use standard TLS
    /// configuration.
    #[must_use]
    pub fn new(config: &StocktakeConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            inner: Arc::new(WarehouseClientInner {
                http,
                base_url: config.api_url.as_str().trim_end_matches('/').to_string(),
                api_token: config.api_token.clone(),
            }),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.bearer_auth(self.inner.api_token.expose_secret())
    }

    /// Check the response status and deserialize the body.
    ///
    /// `conflict_date` is the calendar day a 409 on this request refers
    /// to (only sheet creation can conflict).
    async fn parse<T: DeserializeOwned>(
        response: reqwest::Response,
        conflict_date: Option<NaiveDate>,
    ) -> Result<T, EngineError> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| EngineError::NetworkOrServer(e.to_string()));
        }
        let body = response.text().await.unwrap_or_default();
        Err(map_error_status(status, &body, conflict_date))
    }
}

impl CountBackend for WarehouseClient {
    #[instrument(skip(self))]
    async fn list_count_sheets(&self) -> Result<Vec<CountSheetSummary>, EngineError> {
        let response = self
            .authorized(self.inner.http.get(self.url("/api/count-sheets")))
            .send()
            .await
            .map_err(transport)?;
        Self::parse(response, None).await
    }

    #[instrument(skip(self), fields(date = %date))]
    async fn create_count_sheet(&self, date: NaiveDate) -> Result<CountSheetSummary, EngineError> {
        let response = self
            .authorized(self.inner.http.post(self.url("/api/count-sheets")))
            .json(&CreateSheetRequest { date })
            .send()
            .await
            .map_err(transport)?;
        Self::parse(response, Some(date)).await
    }

    #[instrument(skip(self), fields(sheet_id = %sheet_id))]
    async fn get_count_sheet_detail(
        &self,
        sheet_id: CountSheetId,
    ) -> Result<SheetDetail, EngineError> {
        let response = self
            .authorized(
                self.inner
                    .http
                    .get(self.url(&format!("/api/count-sheets/{sheet_id}"))),
            )
            .send()
            .await
            .map_err(transport)?;
        Self::parse(response, None).await
    }

    #[instrument(skip(self, note), fields(sheet_id = %sheet_id, material_id = %material_id))]
    async fn submit_reconciliation(
        &self,
        sheet_id: CountSheetId,
        material_id: MaterialId,
        loss: i64,
        note: Option<String>,
    ) -> Result<CountLine, EngineError> {
        let response = self
            .authorized(
                self.inner
                    .http
                    .post(self.url(&format!("/api/count-sheets/{sheet_id}/reconciliations"))),
            )
            .json(&ReconciliationRequest {
                material_id,
                loss,
                note: note.as_deref(),
            })
            .send()
            .await
            .map_err(transport)?;
        Self::parse(response, None).await
    }

    #[instrument(skip(self), fields(sheet_id = %sheet_id))]
    async fn delete_count_sheet(&self, sheet_id: CountSheetId) -> Result<(), EngineError> {
        let response = self
            .authorized(
                self.inner
                    .http
                    .delete(self.url(&format!("/api/count-sheets/{sheet_id}"))),
            )
            .send()
            .await
            .map_err(transport)?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(map_error_status(status, &body, None))
        }
    }
}

/// Transport-level failures (DNS, TLS, timeouts) have no taxonomy of
/// their own; they surface as retriable network errors.
fn transport(err: reqwest::Error) -> EngineError {
    EngineError::NetworkOrServer(err.to_string())
}

/// Map a non-success HTTP status onto the engine's error taxonomy.
fn map_error_status(
    status: StatusCode,
    body: &str,
    conflict_date: Option<NaiveDate>,
) -> EngineError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => EngineError::SessionExpired,
        StatusCode::NOT_FOUND => EngineError::NotFound(readable(body, "resource")),
        StatusCode::CONFLICT => match conflict_date {
            Some(date) => EngineError::Conflict {
                date,
                existing_sheet_id: serde_json::from_str::<ConflictBody>(body)
                    .ok()
                    .and_then(|b| b.existing_sheet_id),
            },
            None => EngineError::NetworkOrServer(readable(body, "conflict")),
        },
        _ => EngineError::NetworkOrServer(format!("{status}: {}", readable(body, "no details"))),
    }
}

/// Use the server's message verbatim when it sent one, otherwise a
/// human-readable fallback.
fn readable(body: &str, fallback: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}
