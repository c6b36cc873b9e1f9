//! High-level dashboard core built on a pluggable store
//!
//! `Dashboard` runs the ingest pipeline (normalize, schema check, record)
//! and exposes the read side the HTTP handlers use.

use crate::config::SocConfig;
use crate::error::{Result, SocError};
use crate::ingest::{IngestRequest, Normalizer};
use crate::rejected::{RejectedEvent, RejectedLog};
use crate::schema::{MemorySchemaRegistry, SchemaRegistry};
use crate::store::{EventStore, MemoryEventStore};
use crate::types::Severity;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

/// Outcome of a successful ingest
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReceipt {
    pub id: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_id: Option<String>,
}

/// Ingest pipeline plus the stores it feeds
///
/// Thread-safe; share it behind an `Arc`.
pub struct Dashboard {
    store: Arc<dyn EventStore>,
    schemas: Arc<dyn SchemaRegistry>,
    normalizer: Normalizer,
    rejected: RejectedLog,
}

impl Dashboard {
    /// Create a dashboard from explicit parts
    pub fn new(
        store: impl EventStore + 'static,
        schemas: impl SchemaRegistry + 'static,
        normalizer: Normalizer,
        rejected: RejectedLog,
    ) -> Self {
        Self {
            store: Arc::new(store),
            schemas: Arc::new(schemas),
            normalizer,
            rejected,
        }
    }

    /// In-memory dashboard with built-in schemas
    pub fn from_config(config: &SocConfig) -> Self {
        Self::new(
            MemoryEventStore::new(&config.store),
            MemorySchemaRegistry::with_builtins(),
            Normalizer::new(&config.ingest),
            RejectedLog::new(config.store.max_events),
        )
    }

    /// Get the store backend name
    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    pub fn store(&self) -> &dyn EventStore {
        self.store.as_ref()
    }

    pub fn schemas(&self) -> &dyn SchemaRegistry {
        self.schemas.as_ref()
    }

    pub fn rejected(&self) -> &RejectedLog {
        &self.rejected
    }

    /// Normalize, validate, and record one event
    ///
    /// Validation failures are also kept in the rejected log.
    pub async fn ingest(&self, req: IngestRequest) -> Result<IngestReceipt> {
        let body = serde_json::to_vec(&req)?;
        self.ingest_inner(req, &body).await
    }

    /// Parse a raw request body and ingest it
    ///
    /// A body that is not JSON is a processing failure, not a validation one.
    pub async fn ingest_json(&self, body: &[u8]) -> Result<IngestReceipt> {
        let req: IngestRequest = match serde_json::from_slice(body) {
            Ok(req) => req,
            Err(e) => {
                let err = SocError::from_json_body(e);
                self.rejected.push(RejectedEvent::new(err.to_string(), body)).await;
                return Err(err);
            }
        };
        self.ingest_inner(req, body).await
    }

    async fn ingest_inner(&self, req: IngestRequest, body: &[u8]) -> Result<IngestReceipt> {
        let checked = self
            .normalizer
            .normalize(req, Utc::now())
            .and_then(|n| self.schemas.validate(&n.event).map(|_| n));

        let normalized = match checked {
            Ok(n) => n,
            Err(e) => {
                self.rejected.push(RejectedEvent::new(e.to_string(), body)).await;
                return Err(e);
            }
        };

        let receipt = IngestReceipt {
            id: normalized.event.id.clone(),
            severity: normalized.event.severity,
            alert_id: normalized.alert.as_ref().map(|a| a.id.clone()),
        };

        tracing::debug!(
            event_id = %receipt.id,
            event_type = %normalized.event.event_type,
            source = %normalized.event.source,
            severity = %receipt.severity,
            "Event ingested"
        );

        self.store.record(normalized.event, normalized.alert).await?;
        Ok(receipt)
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::from_config(&SocConfig::default())
    }
}
