//! # a3s-soc
//!
//! Security-operations dashboard backend for the A3S ecosystem.
//!
//! ## Overview
//!
//! `a3s-soc` accepts security events from sensors, normalizes them, keeps a
//! bounded in-memory aggregation of events, alerts and per-minute series,
//! and serves the dashboard's JSON API on top of it.
//!
//! ## Quick Start
//!
//! ```rust
//! use a3s_soc::{Dashboard, IngestRequest};
//!
//! # async fn example() -> a3s_soc::Result<()> {
//! let dashboard = Dashboard::default();
//!
//! let receipt = dashboard
//!     .ingest(IngestRequest::new(
//!         "login_failure",
//!         "idp",
//!         serde_json::json!({"user": "alice", "src_ip": "10.0.0.7"}),
//!     ))
//!     .await?;
//!
//! println!("Ingested {} ({})", receipt.id, receipt.severity);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **Normalizer** — required fields, event-type cleanup, severity,
//!   category, timestamps, alert derivation
//! - **SchemaRegistry** — per-type required detail fields, versioned
//! - **EventStore** trait — aggregation backend; `MemoryEventStore` is bounded
//! - **Dashboard** — ingest pipeline over a store and schema registry
//! - **Query façade** — filters, pagination and series windows for the API
//! - **ComplianceEngine**, **PlaybookRunner**, **ResponseEngine** — the
//!   compliance, SOAR and containment endpoints

pub mod api;
pub mod cli;
pub mod compliance;
pub mod config;
pub mod dashboard;
pub mod dirs;
pub mod error;
pub mod ingest;
pub mod playbook;
pub mod query;
pub mod rejected;
pub mod response;
pub mod schema;
pub mod series;
pub mod server;
pub mod simulator;
pub mod store;
pub mod synthetic;
pub mod types;

// Re-export core types
pub use compliance::{ComplianceEngine, ComplianceStatus, Evaluation};
pub use config::SocConfig;
pub use dashboard::{Dashboard, IngestReceipt};
pub use error::{Result, SocError};
pub use ingest::{IngestRequest, Normalized, Normalizer};
pub use playbook::{Execution, ExecutionStatus, PlaybookRunner};
pub use query::{AlertQuery, EventQuery, Page};
pub use rejected::{RejectedEvent, RejectedLog};
pub use response::{ActionRequest, ActionResult, ResponseAction, ResponseEngine};
pub use schema::{Compatibility, DetailSchema, MemorySchemaRegistry, SchemaRegistry};
pub use store::{EventStore, MemoryEventStore, Summary};
pub use types::{Alert, AlertStatus, EventCategory, SecurityEvent, Severity};
