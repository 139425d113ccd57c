//! # Test Registry
//!
//! Generates stable test identifiers and tracks the deferred linkage between
//! a test and the expectation or behavior it belongs to.
//!
//! ## Two-phase resolution
//!
//! Declaration order between a reusable test and the behavior that references
//! it is not guaranteed. A test registered with an `expectation_id` gets its
//! identifier immediately (`{expectationId}-TEST-{N}`, N incrementing per
//! expectation). A test registered without one sits in an unresolved bucket
//! keyed by its owning component identity until `resolve` drains that bucket
//! on behalf of the referencing expectation or behavior. The transition is
//! one-way: `Unresolved → Resolved`, never back.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::errors::{RegistryError, RegistryResult};
use crate::identifiers::{format_test_id, ComponentId};
use crate::metadata::{TestMetadata, TestResolution};

/// A registered test with its resolution state.
#[derive(Debug, Clone, Serialize)]
pub struct TestEntry {
    pub metadata: TestMetadata,
    pub component: ComponentId,
    pub resolution: TestResolution,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct TestIndices {
    /// Resolved tests keyed by test identifier
    by_test_id: HashMap<String, TestEntry>,
    /// Deferred tests keyed by owning component identity
    unresolved: HashMap<ComponentId, Vec<TestEntry>>,
    /// Next sequence number per expectation identifier
    sequences: HashMap<String, u32>,
}

/// Statistics about registered tests.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TestStats {
    pub resolved_tests: usize,
    pub unresolved_tests: usize,
    pub distinct_expectations: usize,
}

/// Registry of annotated tests with deferred expectation linkage.
#[derive(Debug, Default)]
pub struct TestRegistry {
    indices: Arc<RwLock<TestIndices>>,
}

impl TestRegistry {
    /// Create a new, empty test registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self, operation: &str) -> RegistryResult<RwLockReadGuard<'_, TestIndices>> {
        self.indices.read().map_err(|_| RegistryError::LockPoisoned {
            operation: operation.to_string(),
        })
    }

    fn write(&self, operation: &str) -> RegistryResult<RwLockWriteGuard<'_, TestIndices>> {
        self.indices.write().map_err(|_| RegistryError::LockPoisoned {
            operation: operation.to_string(),
        })
    }

    fn next_test_id(indices: &mut TestIndices, expectation_id: &str) -> String {
        let sequence = indices
            .sequences
            .entry(expectation_id.to_string())
            .or_insert(0);
        *sequence += 1;
        format_test_id(expectation_id, *sequence)
    }

    /// Register a test.
    ///
    /// With an `expectation_id` the test identifier is generated immediately
    /// and the resolved entry is returned. Without one, the entry is parked
    /// in the unresolved bucket — a documented deferred state, not an error —
    /// and `None` is returned.
    pub fn register(
        &self,
        metadata: TestMetadata,
        component: ComponentId,
    ) -> RegistryResult<Option<String>> {
        let mut indices = self.write("register")?;

        match metadata.expectation_id.clone() {
            Some(expectation_id) => {
                let test_id = Self::next_test_id(&mut indices, &expectation_id);
                indices.by_test_id.insert(
                    test_id.clone(),
                    TestEntry {
                        metadata,
                        component,
                        resolution: TestResolution::Resolved {
                            test_id: test_id.clone(),
                        },
                        registered_at: Utc::now(),
                    },
                );
                info!(test_id = %test_id, "Registered test");
                Ok(Some(test_id))
            }
            None => {
                indices.unresolved.entry(component).or_default().push(TestEntry {
                    metadata,
                    component,
                    resolution: TestResolution::Unresolved,
                    registered_at: Utc::now(),
                });
                debug!(%component, "Registered test without expectation, resolution deferred");
                Ok(None)
            }
        }
    }

    /// Resolve every deferred test owned by `component` against an
    /// expectation, assigning sequential test identifiers.
    ///
    /// Called when an expectation or behavior registers a reference to the
    /// test component. Returns the assigned identifiers; an identity with
    /// nothing pending yields an empty list (the test may have been
    /// registered eagerly and resolved already).
    pub fn resolve(
        &self,
        component: ComponentId,
        expectation_id: &str,
        behavior_id: Option<&str>,
    ) -> RegistryResult<Vec<String>> {
        let mut indices = self.write("resolve")?;
        let Some(pending) = indices.unresolved.remove(&component) else {
            return Ok(Vec::new());
        };

        let mut assigned = Vec::with_capacity(pending.len());
        for mut entry in pending {
            let test_id = Self::next_test_id(&mut indices, expectation_id);
            entry.metadata.expectation_id = Some(expectation_id.to_string());
            if let Some(behavior_id) = behavior_id {
                entry.metadata.behavior_id = Some(behavior_id.to_string());
            }
            entry.resolution = TestResolution::Resolved {
                test_id: test_id.clone(),
            };
            indices.by_test_id.insert(test_id.clone(), entry);
            info!(test_id = %test_id, %component, "Resolved deferred test");
            assigned.push(test_id);
        }
        Ok(assigned)
    }

    /// Look up a resolved test by identifier.
    pub fn get(&self, test_id: &str) -> RegistryResult<Option<TestEntry>> {
        Ok(self.read("get")?.by_test_id.get(test_id).cloned())
    }

    /// Resolved tests belonging to an expectation, in test-ID order.
    pub fn get_by_expectation(&self, expectation_id: &str) -> RegistryResult<Vec<TestEntry>> {
        let indices = self.read("get_by_expectation")?;
        let mut entries: Vec<_> = indices
            .by_test_id
            .values()
            .filter(|entry| entry.metadata.expectation_id.as_deref() == Some(expectation_id))
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.resolution.test_id().cmp(&b.resolution.test_id()));
        Ok(entries)
    }

    /// Deferred tests still parked under a component identity.
    pub fn get_unresolved(&self, component: ComponentId) -> RegistryResult<Vec<TestEntry>> {
        Ok(self
            .read("get_unresolved")?
            .unresolved
            .get(&component)
            .cloned()
            .unwrap_or_default())
    }

    /// Number of tests still awaiting resolution.
    pub fn unresolved_count(&self) -> RegistryResult<usize> {
        Ok(self.read("unresolved_count")?.unresolved.values().map(Vec::len).sum())
    }

    /// Wipe the registry, including identifier sequences.
    pub fn clear(&self) -> RegistryResult<()> {
        let mut indices = self.write("clear")?;
        *indices = TestIndices::default();
        debug!("Cleared test registry");
        Ok(())
    }

    /// Registry statistics.
    pub fn stats(&self) -> RegistryResult<TestStats> {
        let indices = self.read("stats")?;
        Ok(TestStats {
            resolved_tests: indices.by_test_id.len(),
            unresolved_tests: indices.unresolved.values().map(Vec::len).sum(),
            distinct_expectations: indices.sequences.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::TestType;

    #[test]
    fn test_eager_registration_generates_id() {
        let registry = TestRegistry::new();
        let test_id = registry
            .register(
                TestMetadata::for_expectation(TestType::Unit, "PO-EXP-001"),
                ComponentId::new(),
            )
            .unwrap();

        assert_eq!(test_id.as_deref(), Some("PO-EXP-001-TEST-1"));
        let entry = registry.get("PO-EXP-001-TEST-1").unwrap().unwrap();
        assert!(entry.resolution.is_resolved());
    }

    #[test]
    fn test_sequence_increments_per_expectation() {
        let registry = TestRegistry::new();
        for _ in 0..2 {
            registry
                .register(
                    TestMetadata::for_expectation(TestType::Unit, "PO-EXP-001"),
                    ComponentId::new(),
                )
                .unwrap();
        }
        let other = registry
            .register(
                TestMetadata::for_expectation(TestType::Contract, "WH-EXP-002"),
                ComponentId::new(),
            )
            .unwrap();

        // Sequences are independent per expectation.
        assert_eq!(other.as_deref(), Some("WH-EXP-002-TEST-1"));
        assert_eq!(
            registry.get_by_expectation("PO-EXP-001").unwrap().len(),
            2
        );
        assert!(registry.get("PO-EXP-001-TEST-2").unwrap().is_some());
    }

    #[test]
    fn test_deferred_resolution() {
        let registry = TestRegistry::new();
        let component = ComponentId::new();

        let test_id = registry
            .register(TestMetadata::new(TestType::Integration), component)
            .unwrap();
        assert!(test_id.is_none());
        assert_eq!(registry.unresolved_count().unwrap(), 1);
        assert!(!registry.get_unresolved(component).unwrap()[0]
            .resolution
            .is_resolved());

        // A behavior referencing the test later drains the bucket.
        let assigned = registry
            .resolve(component, "PO-EXP-001", Some("place-order"))
            .unwrap();
        assert_eq!(assigned, vec!["PO-EXP-001-TEST-1".to_string()]);
        assert_eq!(registry.unresolved_count().unwrap(), 0);

        let entry = registry.get("PO-EXP-001-TEST-1").unwrap().unwrap();
        assert_eq!(entry.metadata.expectation_id.as_deref(), Some("PO-EXP-001"));
        assert_eq!(entry.metadata.behavior_id.as_deref(), Some("place-order"));
        assert_eq!(entry.resolution.test_id(), Some("PO-EXP-001-TEST-1"));
    }

    #[test]
    fn test_resolve_with_nothing_pending_is_noop() {
        let registry = TestRegistry::new();
        let assigned = registry
            .resolve(ComponentId::new(), "PO-EXP-001", None)
            .unwrap();
        assert!(assigned.is_empty());
    }

    #[test]
    fn test_deferred_and_eager_share_sequence() {
        let registry = TestRegistry::new();
        registry
            .register(
                TestMetadata::for_expectation(TestType::Unit, "PO-EXP-001"),
                ComponentId::new(),
            )
            .unwrap();

        let component = ComponentId::new();
        registry
            .register(TestMetadata::new(TestType::Unit), component)
            .unwrap();
        let assigned = registry.resolve(component, "PO-EXP-001", None).unwrap();

        assert_eq!(assigned, vec!["PO-EXP-001-TEST-2".to_string()]);
    }

    #[test]
    fn test_clear_resets_sequences() {
        let registry = TestRegistry::new();
        registry
            .register(
                TestMetadata::for_expectation(TestType::Unit, "PO-EXP-001"),
                ComponentId::new(),
            )
            .unwrap();
        registry.clear().unwrap();

        let stats = registry.stats().unwrap();
        assert_eq!(stats.resolved_tests, 0);
        assert_eq!(stats.distinct_expectations, 0);

        // Sequence restarts from 1 after a clear.
        let test_id = registry
            .register(
                TestMetadata::for_expectation(TestType::Unit, "PO-EXP-001"),
                ComponentId::new(),
            )
            .unwrap();
        assert_eq!(test_id.as_deref(), Some("PO-EXP-001-TEST-1"));
    }
}
