//! Detail schema registry: validate and version event details
//!
//! Sources attach free-form `details` to each event. A schema pins down the
//! top-level fields a given `(event_type, version)` must carry so the
//! aggregation store can rely on them (e.g. `bytes` on `network_flow`).

use crate::error::{Result, SocError};
use crate::types::SecurityEvent;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

/// Schema definition for an event type at a specific version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailSchema {
    pub event_type: String,
    pub version: u32,
    /// Required top-level fields in `details`
    pub required_fields: Vec<String>,
    #[serde(default)]
    pub description: String,
}

impl DetailSchema {
    pub fn new(event_type: &str, version: u32, required: &[&str], description: &str) -> Self {
        Self {
            event_type: event_type.to_string(),
            version,
            required_fields: required.iter().map(|f| f.to_string()).collect(),
            description: description.to_string(),
        }
    }
}

/// Compatibility mode for schema evolution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compatibility {
    /// New version may not add required fields
    #[default]
    Backward,
    /// New version may not drop required fields
    Forward,
    /// Required fields must be identical
    Full,
    None,
}

/// Trait for detail schema registries
pub trait SchemaRegistry: Send + Sync {
    /// Register a schema, replacing any existing one at the same version
    fn register(&self, schema: DetailSchema) -> Result<()>;

    /// Register a schema only if it is compatible with the previous version
    fn register_checked(&self, schema: DetailSchema, mode: Compatibility) -> Result<()>;

    fn get(&self, event_type: &str, version: u32) -> Result<Option<DetailSchema>>;

    fn latest_version(&self, event_type: &str) -> Result<Option<u32>>;

    /// Registered event types, sorted
    fn list_types(&self) -> Result<Vec<String>>;

    /// All registered schemas, sorted by type then version
    fn list(&self) -> Result<Vec<DetailSchema>>;

    /// Validate an event's details against its registered schema
    ///
    /// Events whose `(event_type, version)` has no schema pass.
    fn validate(&self, event: &SecurityEvent) -> Result<()>;
}

/// In-memory schema registry
pub struct MemorySchemaRegistry {
    /// (event_type, version) → schema
    schemas: RwLock<HashMap<(String, u32), DetailSchema>>,
}

impl MemorySchemaRegistry {
    pub fn new() -> Self {
        Self {
            schemas: RwLock::new(HashMap::new()),
        }
    }

    /// Registry preloaded with the schemas the aggregation store depends on
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        for schema in builtin_schemas() {
            // Built-ins are statically valid
            let key = (schema.event_type.clone(), schema.version);
            if let Ok(mut schemas) = registry.schemas.write() {
                schemas.insert(key, schema);
            }
        }
        registry
    }

    fn poisoned<E: std::fmt::Display>(e: E) -> SocError {
        SocError::Internal(format!("Schema registry lock poisoned: {}", e))
    }
}

impl Default for MemorySchemaRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// Schemas registered at startup
pub fn builtin_schemas() -> Vec<DetailSchema> {
    vec![
        DetailSchema::new(
            "network_flow",
            1,
            &["bytes"],
            "Flow record; bytes feed the throughput series",
        ),
        DetailSchema::new(
            "login_failure",
            1,
            &["user"],
            "Failed authentication attempt",
        ),
        DetailSchema::new(
            "malware_detected",
            1,
            &["host"],
            "Endpoint malware detection",
        ),
    ]
}

fn check_shape(schema: &DetailSchema) -> Result<()> {
    if schema.event_type.trim().is_empty() {
        return Err(SocError::invalid("event_type", "cannot be empty"));
    }
    if schema.version == 0 {
        return Err(SocError::invalid("version", "must be >= 1"));
    }
    Ok(())
}

/// Compare a candidate schema with its predecessor
fn check_compatibility(
    prev: &DetailSchema,
    new: &DetailSchema,
    mode: Compatibility,
) -> Result<()> {
    let incompatible = |reason: String| SocError::SchemaValidation {
        event_type: new.event_type.clone(),
        version: new.version,
        reason,
    };

    match mode {
        Compatibility::Backward => {
            if let Some(field) = new
                .required_fields
                .iter()
                .find(|f| !prev.required_fields.contains(f))
            {
                return Err(incompatible(format!(
                    "Backward incompatible: new required field '{}' not in v{}",
                    field, prev.version
                )));
            }
        }
        Compatibility::Forward => {
            if let Some(field) = prev
                .required_fields
                .iter()
                .find(|f| !new.required_fields.contains(f))
            {
                return Err(incompatible(format!(
                    "Forward incompatible: required field '{}' from v{} removed in v{}",
                    field, prev.version, new.version
                )));
            }
        }
        Compatibility::Full => {
            let a: BTreeSet<_> = prev.required_fields.iter().collect();
            let b: BTreeSet<_> = new.required_fields.iter().collect();
            if a != b {
                return Err(incompatible(format!(
                    "Full incompatible: required fields differ between v{} and v{}",
                    prev.version, new.version
                )));
            }
        }
        Compatibility::None => {}
    }
    Ok(())
}

impl SchemaRegistry for MemorySchemaRegistry {
    fn register(&self, schema: DetailSchema) -> Result<()> {
        check_shape(&schema)?;
        let key = (schema.event_type.clone(), schema.version);
        let mut schemas = self.schemas.write().map_err(Self::poisoned)?;
        schemas.insert(key, schema);
        Ok(())
    }

    fn register_checked(&self, schema: DetailSchema, mode: Compatibility) -> Result<()> {
        check_shape(&schema)?;
        let mut schemas = self.schemas.write().map_err(Self::poisoned)?;

        if mode != Compatibility::None && schema.version > 1 {
            let prev_key = (schema.event_type.clone(), schema.version - 1);
            if let Some(prev) = schemas.get(&prev_key) {
                check_compatibility(prev, &schema, mode)?;
            }
        }

        tracing::info!(
            event_type = %schema.event_type,
            version = schema.version,
            required = ?schema.required_fields,
            "Schema registered"
        );
        schemas.insert((schema.event_type.clone(), schema.version), schema);
        Ok(())
    }

    fn get(&self, event_type: &str, version: u32) -> Result<Option<DetailSchema>> {
        let schemas = self.schemas.read().map_err(Self::poisoned)?;
        Ok(schemas.get(&(event_type.to_string(), version)).cloned())
    }

    fn latest_version(&self, event_type: &str) -> Result<Option<u32>> {
        let schemas = self.schemas.read().map_err(Self::poisoned)?;
        Ok(schemas
            .keys()
            .filter(|(t, _)| t == event_type)
            .map(|(_, v)| *v)
            .max())
    }

    fn list_types(&self) -> Result<Vec<String>> {
        let schemas = self.schemas.read().map_err(Self::poisoned)?;
        let types: BTreeSet<String> = schemas.keys().map(|(t, _)| t.clone()).collect();
        Ok(types.into_iter().collect())
    }

    fn list(&self) -> Result<Vec<DetailSchema>> {
        let schemas = self.schemas.read().map_err(Self::poisoned)?;
        let mut all: Vec<DetailSchema> = schemas.values().cloned().collect();
        all.sort_by(|a, b| {
            a.event_type
                .cmp(&b.event_type)
                .then(a.version.cmp(&b.version))
        });
        Ok(all)
    }

    fn validate(&self, event: &SecurityEvent) -> Result<()> {
        let schemas = self.schemas.read().map_err(Self::poisoned)?;
        let schema = match schemas.get(&(event.event_type.clone(), event.version)) {
            Some(s) => s,
            None => return Ok(()),
        };

        // Normalizer guarantees details is an object
        let missing: Vec<&str> = schema
            .required_fields
            .iter()
            .filter(|f| event.details.get(f.as_str()).is_none())
            .map(String::as_str)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(SocError::SchemaValidation {
                event_type: event.event_type.clone(),
                version: event.version,
                reason: format!("Missing required detail fields: {}", missing.join(", ")),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EventCategory, Severity};
    use chrono::Utc;

    fn event(event_type: &str, version: u32, details: serde_json::Value) -> SecurityEvent {
        SecurityEvent {
            id: "evt-test".to_string(),
            event_type: event_type.to_string(),
            version,
            category: EventCategory::classify(event_type),
            severity: Severity::Low,
            source: "test".to_string(),
            summary: "test".to_string(),
            details,
            timestamp: Utc::now(),
            received_at: Utc::now(),
        }
    }

    #[test]
    fn test_builtins_loaded() {
        let reg = MemorySchemaRegistry::default();
        assert_eq!(
            reg.list_types().unwrap(),
            vec!["login_failure", "malware_detected", "network_flow"]
        );
        let flow = reg.get("network_flow", 1).unwrap().unwrap();
        assert_eq!(flow.required_fields, vec!["bytes"]);
    }

    #[test]
    fn test_register_rejects_bad_shape() {
        let reg = MemorySchemaRegistry::new();
        assert!(reg.register(DetailSchema::new("", 1, &[], "")).is_err());
        assert!(reg.register(DetailSchema::new("x", 0, &[], "")).is_err());
    }

    #[test]
    fn test_latest_version() {
        let reg = MemorySchemaRegistry::new();
        for v in 1..=3 {
            reg.register(DetailSchema::new("dns_query", v, &[], "")).unwrap();
        }
        assert_eq!(reg.latest_version("dns_query").unwrap(), Some(3));
        assert_eq!(reg.latest_version("nope").unwrap(), None);
    }

    #[test]
    fn test_validate_passes_without_schema() {
        let reg = MemorySchemaRegistry::default();
        assert!(reg.validate(&event("x", 1, serde_json::json!({}))).is_ok());
        // Only v1 of network_flow is registered
        assert!(reg
            .validate(&event("network_flow", 2, serde_json::json!({})))
            .is_ok());
    }

    #[test]
    fn test_validate_missing_field() {
        let reg = MemorySchemaRegistry::default();
        let err = reg
            .validate(&event("login_failure", 1, serde_json::json!({"ip": "10.0.0.1"})))
            .unwrap_err();
        assert!(err.to_string().contains("user"), "{}", err);

        assert!(reg
            .validate(&event("login_failure", 1, serde_json::json!({"user": "alice"})))
            .is_ok());
    }

    #[test]
    fn test_backward_compat_rejects_new_required_field() {
        let reg = MemorySchemaRegistry::new();
        reg.register(DetailSchema::new("dns_query", 1, &["domain"], ""))
            .unwrap();

        let err = reg
            .register_checked(
                DetailSchema::new("dns_query", 2, &["domain", "resolver"], ""),
                Compatibility::Backward,
            )
            .unwrap_err();
        assert!(err.to_string().contains("resolver"));
        // Rejected schema was not stored
        assert_eq!(reg.latest_version("dns_query").unwrap(), Some(1));
    }

    #[test]
    fn test_forward_compat_rejects_removed_field() {
        let reg = MemorySchemaRegistry::new();
        reg.register(DetailSchema::new("dns_query", 1, &["domain", "qtype"], ""))
            .unwrap();

        let err = reg
            .register_checked(
                DetailSchema::new("dns_query", 2, &["domain"], ""),
                Compatibility::Forward,
            )
            .unwrap_err();
        assert!(err.to_string().contains("qtype"));
    }

    #[test]
    fn test_full_compat_ignores_field_order() {
        let reg = MemorySchemaRegistry::new();
        reg.register(DetailSchema::new("dns_query", 1, &["a", "b"], ""))
            .unwrap();
        assert!(reg
            .register_checked(
                DetailSchema::new("dns_query", 2, &["b", "a"], ""),
                Compatibility::Full
            )
            .is_ok());
    }

    #[test]
    fn test_none_compat_always_registers() {
        let reg = MemorySchemaRegistry::new();
        reg.register(DetailSchema::new("dns_query", 1, &["a"], ""))
            .unwrap();
        assert!(reg
            .register_checked(
                DetailSchema::new("dns_query", 2, &["b"], ""),
                Compatibility::None
            )
            .is_ok());
    }

    #[test]
    fn test_compatibility_serde() {
        let mode: Compatibility = serde_json::from_str("\"forward\"").unwrap();
        assert_eq!(mode, Compatibility::Forward);
    }
}
