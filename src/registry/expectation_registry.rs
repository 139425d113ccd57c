//! # Expectation Registry
//!
//! Indexes bilateral-contract expectations between two named stakeholder
//! roles and validates cross-context relationships.
//!
//! ## Context derivation
//!
//! An expectation's bounded context is derived from its stakeholders, not
//! stored: if both roles resolve to the same declared context the expectation
//! is same-context; if they resolve to two different known contexts it is
//! cross-context and must be covered by a declared relationship between the
//! two. Roles whose context is not yet declared are accepted with a warning —
//! forward references are part of the design.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::errors::{RegistryError, RegistryResult};
use crate::identifiers::{is_valid_expectation_id, ComponentId};
use crate::metadata::ExpectationMetadata;

/// A registered expectation with its owning component identity.
#[derive(Debug, Clone, Serialize)]
pub struct ExpectationEntry {
    pub metadata: ExpectationMetadata,
    pub component: ComponentId,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct ExpectationIndices {
    by_id: HashMap<String, ExpectationEntry>,
    /// Stakeholder role to bounded context
    contexts: HashMap<String, String>,
    /// Declared cross-context relationships, stored with endpoints sorted
    relationships: HashSet<(String, String)>,
}

/// Statistics about registered expectations.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExpectationStats {
    pub total_expectations: usize,
    pub critical_path_expectations: usize,
    pub declared_contexts: usize,
    pub declared_relationships: usize,
}

/// Registry of bilateral expectations between stakeholder roles.
#[derive(Debug, Default)]
pub struct ExpectationRegistry {
    indices: Arc<RwLock<ExpectationIndices>>,
}

fn relationship_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

impl ExpectationRegistry {
    /// Create a new, empty expectation registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self, operation: &str) -> RegistryResult<RwLockReadGuard<'_, ExpectationIndices>> {
        self.indices.read().map_err(|_| RegistryError::LockPoisoned {
            operation: operation.to_string(),
        })
    }

    fn write(&self, operation: &str) -> RegistryResult<RwLockWriteGuard<'_, ExpectationIndices>> {
        self.indices.write().map_err(|_| RegistryError::LockPoisoned {
            operation: operation.to_string(),
        })
    }

    /// Declare the bounded context a stakeholder role belongs to.
    pub fn set_stakeholder_context(
        &self,
        role: impl Into<String>,
        context: impl Into<String>,
    ) -> RegistryResult<()> {
        self.write("set_stakeholder_context")?
            .contexts
            .insert(role.into(), context.into());
        Ok(())
    }

    /// Declare a permitted relationship between two bounded contexts.
    /// Symmetric: declaring (a, b) also covers (b, a).
    pub fn allow_context_relationship(&self, a: &str, b: &str) -> RegistryResult<()> {
        self.write("allow_context_relationship")?
            .relationships
            .insert(relationship_key(a, b));
        Ok(())
    }

    /// Register an expectation.
    ///
    /// The identifier must match `{2+ uppercase}-EXP-{3+ digits}`. When both
    /// stakeholders resolve to known but different bounded contexts, a
    /// declared relationship between those contexts is required. Duplicate
    /// identifiers warn and overwrite.
    pub fn register(
        &self,
        metadata: ExpectationMetadata,
        component: ComponentId,
    ) -> RegistryResult<()> {
        if !is_valid_expectation_id(&metadata.expectation_id) {
            return Err(RegistryError::InvalidIdentifier {
                id: metadata.expectation_id.clone(),
                reason: "expected {2+ uppercase}-EXP-{3+ digits}".to_string(),
            });
        }

        let mut indices = self.write("register")?;

        let expecting_context = indices.contexts.get(&metadata.expecting_stakeholder).cloned();
        let providing_context = indices.contexts.get(&metadata.providing_stakeholder).cloned();
        match (expecting_context, providing_context) {
            (Some(expecting), Some(providing)) if expecting != providing => {
                let key = relationship_key(&expecting, &providing);
                if !indices.relationships.contains(&key) {
                    return Err(RegistryError::ContextViolation {
                        expectation_id: metadata.expectation_id.clone(),
                        expecting: metadata.expecting_stakeholder.clone(),
                        providing: metadata.providing_stakeholder.clone(),
                        reason: format!(
                            "no declared relationship between contexts '{expecting}' and '{providing}'"
                        ),
                    });
                }
                debug!(
                    expectation = %metadata.expectation_id,
                    "Cross-context expectation covered by declared relationship"
                );
            }
            (None, _) | (_, None) => {
                warn!(
                    expectation = %metadata.expectation_id,
                    "Stakeholder context not declared yet, accepting expectation"
                );
            }
            _ => {} // same context
        }

        let id = metadata.expectation_id.clone();
        if indices.by_id.contains_key(&id) {
            warn!(expectation = %id, "Duplicate expectation registration, last write wins");
        }
        indices.by_id.insert(
            id.clone(),
            ExpectationEntry {
                metadata,
                component,
                registered_at: Utc::now(),
            },
        );

        info!(expectation = %id, "Registered expectation");
        Ok(())
    }

    /// Look up an expectation by identifier.
    pub fn get(&self, expectation_id: &str) -> RegistryResult<Option<ExpectationEntry>> {
        Ok(self.read("get")?.by_id.get(expectation_id).cloned())
    }

    /// Expectations where the role appears on either side.
    pub fn get_by_stakeholder(&self, role: &str) -> RegistryResult<Vec<ExpectationEntry>> {
        Ok(self
            .read("get_by_stakeholder")?
            .by_id
            .values()
            .filter(|entry| {
                entry.metadata.expecting_stakeholder == role
                    || entry.metadata.providing_stakeholder == role
            })
            .cloned()
            .collect())
    }

    /// Expectations flagged as critical path.
    pub fn get_critical_path(&self) -> RegistryResult<Vec<ExpectationEntry>> {
        Ok(self
            .read("get_critical_path")?
            .by_id
            .values()
            .filter(|entry| entry.metadata.critical_path == Some(true))
            .cloned()
            .collect())
    }

    /// All registered expectations.
    pub fn get_all(&self) -> RegistryResult<Vec<ExpectationEntry>> {
        Ok(self.read("get_all")?.by_id.values().cloned().collect())
    }

    /// Wipe the registry, including context declarations.
    pub fn clear(&self) -> RegistryResult<()> {
        let mut indices = self.write("clear")?;
        *indices = ExpectationIndices::default();
        debug!("Cleared expectation registry");
        Ok(())
    }

    /// Registry statistics.
    pub fn stats(&self) -> RegistryResult<ExpectationStats> {
        let indices = self.read("stats")?;
        Ok(ExpectationStats {
            total_expectations: indices.by_id.len(),
            critical_path_expectations: indices
                .by_id
                .values()
                .filter(|entry| entry.metadata.critical_path == Some(true))
                .count(),
            declared_contexts: indices
                .contexts
                .values()
                .collect::<HashSet<_>>()
                .len(),
            declared_relationships: indices.relationships.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_valid_id() {
        let registry = ExpectationRegistry::new();
        registry
            .register(
                ExpectationMetadata::new("PO-EXP-001", "product-owner", "warehouse"),
                ComponentId::new(),
            )
            .unwrap();

        assert!(registry.get("PO-EXP-001").unwrap().is_some());
    }

    #[test]
    fn test_malformed_id_is_fatal() {
        let registry = ExpectationRegistry::new();
        for bad in ["po-exp-1", "P-EXP-001", "PO-EXP-01", "POEXP001"] {
            let result = registry.register(
                ExpectationMetadata::new(bad, "a", "b"),
                ComponentId::new(),
            );
            assert!(
                matches!(result, Err(RegistryError::InvalidIdentifier { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_same_context_needs_no_relationship() {
        let registry = ExpectationRegistry::new();
        registry
            .set_stakeholder_context("product-owner", "ordering")
            .unwrap();
        registry
            .set_stakeholder_context("order-clerk", "ordering")
            .unwrap();

        registry
            .register(
                ExpectationMetadata::new("PO-EXP-001", "product-owner", "order-clerk"),
                ComponentId::new(),
            )
            .unwrap();
    }

    #[test]
    fn test_cross_context_requires_relationship() {
        let registry = ExpectationRegistry::new();
        registry
            .set_stakeholder_context("product-owner", "ordering")
            .unwrap();
        registry
            .set_stakeholder_context("warehouse", "fulfillment")
            .unwrap();

        let result = registry.register(
            ExpectationMetadata::new("PO-EXP-001", "product-owner", "warehouse"),
            ComponentId::new(),
        );
        assert!(matches!(result, Err(RegistryError::ContextViolation { .. })));

        // Declaring the relationship (in either direction) unblocks it.
        registry
            .allow_context_relationship("fulfillment", "ordering")
            .unwrap();
        registry
            .register(
                ExpectationMetadata::new("PO-EXP-001", "product-owner", "warehouse"),
                ComponentId::new(),
            )
            .unwrap();
    }

    #[test]
    fn test_unknown_context_is_accepted() {
        let registry = ExpectationRegistry::new();
        registry
            .set_stakeholder_context("product-owner", "ordering")
            .unwrap();

        // "warehouse" has no declared context yet: warn and proceed.
        registry
            .register(
                ExpectationMetadata::new("PO-EXP-001", "product-owner", "warehouse"),
                ComponentId::new(),
            )
            .unwrap();
    }

    #[test]
    fn test_stakeholder_query_covers_both_sides() {
        let registry = ExpectationRegistry::new();
        registry
            .register(
                ExpectationMetadata::new("PO-EXP-001", "product-owner", "warehouse"),
                ComponentId::new(),
            )
            .unwrap();
        registry
            .register(
                ExpectationMetadata::new("WH-EXP-001", "warehouse", "carrier"),
                ComponentId::new(),
            )
            .unwrap();

        assert_eq!(registry.get_by_stakeholder("warehouse").unwrap().len(), 2);
        assert_eq!(registry.get_by_stakeholder("carrier").unwrap().len(), 1);
    }

    #[test]
    fn test_critical_path_filter() {
        let registry = ExpectationRegistry::new();
        registry
            .register(
                ExpectationMetadata::new("PO-EXP-001", "a", "b").critical(),
                ComponentId::new(),
            )
            .unwrap();
        registry
            .register(
                ExpectationMetadata::new("PO-EXP-002", "a", "b"),
                ComponentId::new(),
            )
            .unwrap();

        let critical = registry.get_critical_path().unwrap();
        assert_eq!(critical.len(), 1);
        assert_eq!(critical[0].metadata.expectation_id, "PO-EXP-001");
    }

    #[test]
    fn test_clear_and_stats() {
        let registry = ExpectationRegistry::new();
        registry.set_stakeholder_context("a", "ctx-1").unwrap();
        registry.set_stakeholder_context("b", "ctx-2").unwrap();
        registry.allow_context_relationship("ctx-1", "ctx-2").unwrap();
        registry
            .register(
                ExpectationMetadata::new("PO-EXP-001", "a", "b").critical(),
                ComponentId::new(),
            )
            .unwrap();

        let stats = registry.stats().unwrap();
        assert_eq!(stats.total_expectations, 1);
        assert_eq!(stats.critical_path_expectations, 1);
        assert_eq!(stats.declared_contexts, 2);
        assert_eq!(stats.declared_relationships, 1);

        registry.clear().unwrap();
        assert_eq!(registry.stats().unwrap().total_expectations, 0);
        assert!(registry.get("PO-EXP-001").unwrap().is_none());
    }
}
