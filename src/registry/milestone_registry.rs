//! # Milestone Registry
//!
//! Indexes milestones by name, journey, and stakeholder, tracks prerequisite
//! edges between them, and answers ordering and dependency queries.
//!
//! ## Key Features
//!
//! - **Four indices** maintained together: by name, by journey membership,
//!   by stakeholder role, and by registration sequence
//! - **Warn-and-overwrite duplicates**: re-registering a name is a
//!   recoverable warning with last-write-wins semantics, so repeated
//!   declaration passes over the same model never crash a batch run
//! - **Prerequisite graph** queries with advisory depth-first cycle detection
//! - **Journey ordering**: `get_by_journey` sorts ascending by `order`, with
//!   unordered milestones after all ordered ones in registration order

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::errors::{RegistryError, RegistryResult};
use crate::identifiers::ComponentId;
use crate::metadata::{MilestoneMetadata, MilestoneScope};

/// A registered milestone with its owning component identity.
#[derive(Debug, Clone, Serialize)]
pub struct MilestoneEntry {
    pub metadata: MilestoneMetadata,
    pub component: ComponentId,
    pub registered_at: DateTime<Utc>,
    /// Monotonic registration sequence, used for stable ordering
    pub sequence: u64,
}

#[derive(Debug, Default)]
struct MilestoneIndices {
    by_name: HashMap<String, MilestoneEntry>,
    /// Journey slug to member milestone names, membership idempotent
    by_journey: HashMap<String, Vec<String>>,
    /// Stakeholder role to milestone names
    by_stakeholder: HashMap<String, Vec<String>>,
    next_sequence: u64,
}

/// Statistics about registered milestones.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MilestoneStats {
    pub total_milestones: usize,
    pub total_journeys: usize,
    pub total_stakeholders: usize,
    pub reusable_milestones: usize,
    pub stateful_milestones: usize,
}

/// Registry of milestones and their prerequisite graph.
#[derive(Debug, Default)]
pub struct MilestoneRegistry {
    indices: Arc<RwLock<MilestoneIndices>>,
}

impl MilestoneRegistry {
    /// Create a new, empty milestone registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self, operation: &str) -> RegistryResult<RwLockReadGuard<'_, MilestoneIndices>> {
        self.indices.read().map_err(|_| RegistryError::LockPoisoned {
            operation: operation.to_string(),
        })
    }

    fn write(&self, operation: &str) -> RegistryResult<RwLockWriteGuard<'_, MilestoneIndices>> {
        self.indices.write().map_err(|_| RegistryError::LockPoisoned {
            operation: operation.to_string(),
        })
    }

    /// Register a milestone, updating every index.
    ///
    /// A duplicate name warns and overwrites (the previous registration is
    /// removed from all indices first). An inline milestone without an
    /// `order` is a configuration error.
    pub fn register(
        &self,
        metadata: MilestoneMetadata,
        component: ComponentId,
        journey_slug: Option<&str>,
    ) -> RegistryResult<()> {
        if metadata.scope == MilestoneScope::Inline && metadata.order.is_none() {
            return Err(RegistryError::MissingRequiredField {
                component: metadata.milestone_name.clone(),
                field: "order".to_string(),
            });
        }

        let name = metadata.milestone_name.clone();
        let mut indices = self.write("register")?;

        if indices.by_name.contains_key(&name) {
            warn!(
                milestone = %name,
                "Duplicate milestone registration, last write wins"
            );
            Self::remove_from_indices(&mut indices, &name);
        }

        let sequence = indices.next_sequence;
        indices.next_sequence += 1;

        for slug in journey_slug
            .into_iter()
            .chain(metadata.journeys.iter().map(String::as_str))
        {
            let members = indices.by_journey.entry(slug.to_string()).or_default();
            if !members.contains(&name) {
                members.push(name.clone());
            }
        }

        let role_members = indices
            .by_stakeholder
            .entry(metadata.stakeholder.clone())
            .or_default();
        if !role_members.contains(&name) {
            role_members.push(name.clone());
        }

        let entry = MilestoneEntry {
            metadata,
            component,
            registered_at: Utc::now(),
            sequence,
        };
        indices.by_name.insert(name.clone(), entry);

        info!(milestone = %name, "Registered milestone");
        Ok(())
    }

    fn remove_from_indices(indices: &mut MilestoneIndices, name: &str) {
        for members in indices.by_journey.values_mut() {
            members.retain(|member| member != name);
        }
        for members in indices.by_stakeholder.values_mut() {
            members.retain(|member| member != name);
        }
        indices.by_name.remove(name);
        debug!(milestone = %name, "Removed stale milestone from indices");
    }

    /// Look up a milestone by name.
    pub fn get(&self, name: &str) -> RegistryResult<Option<MilestoneEntry>> {
        Ok(self.read("get")?.by_name.get(name).cloned())
    }

    /// All registered milestones, in registration order.
    pub fn get_all(&self) -> RegistryResult<Vec<MilestoneEntry>> {
        let indices = self.read("get_all")?;
        let mut entries: Vec<_> = indices.by_name.values().cloned().collect();
        entries.sort_by_key(|entry| entry.sequence);
        Ok(entries)
    }

    /// Members of a journey, ascending by `order`. Milestones without an
    /// order sort after all ordered ones, in registration order.
    pub fn get_by_journey(&self, slug: &str) -> RegistryResult<Vec<MilestoneEntry>> {
        let indices = self.read("get_by_journey")?;
        let mut entries: Vec<MilestoneEntry> = indices
            .by_journey
            .get(slug)
            .into_iter()
            .flatten()
            .filter_map(|name| indices.by_name.get(name).cloned())
            .collect();
        entries.sort_by_key(|entry| {
            (
                entry.metadata.order.is_none(),
                entry.metadata.order.unwrap_or(0),
                entry.sequence,
            )
        });
        Ok(entries)
    }

    /// Milestones indexed under a stakeholder role.
    pub fn get_by_stakeholder(&self, role: &str) -> RegistryResult<Vec<MilestoneEntry>> {
        let indices = self.read("get_by_stakeholder")?;
        Ok(indices
            .by_stakeholder
            .get(role)
            .into_iter()
            .flatten()
            .filter_map(|name| indices.by_name.get(name).cloned())
            .collect())
    }

    /// One-level resolution of a milestone's prerequisite names.
    ///
    /// Names that do not resolve are silently dropped: a prerequisite that
    /// has not been declared yet is a legitimate forward reference.
    pub fn get_prerequisites(&self, name: &str) -> RegistryResult<Vec<MilestoneEntry>> {
        let indices = self.read("get_prerequisites")?;
        let Some(entry) = indices.by_name.get(name) else {
            return Ok(Vec::new());
        };
        Ok(entry
            .metadata
            .prerequisites
            .iter()
            .filter_map(|prerequisite| indices.by_name.get(prerequisite).cloned())
            .collect())
    }

    /// Advisory check for a cycle in the prerequisite graph reachable from
    /// `name`.
    ///
    /// Depth-first traversal with an active-path set (a cycle is a revisit of
    /// a node already on the active path) and a fully-visited set memoizing
    /// acyclic subtrees. Pure: never mutates registry state, never errors on
    /// a cycle, and is not run automatically by `register`.
    pub fn has_circular_dependency(&self, name: &str) -> RegistryResult<bool> {
        let indices = self.read("has_circular_dependency")?;
        let mut path = HashSet::new();
        let mut visited = HashSet::new();
        Ok(Self::visit(&indices.by_name, name, &mut path, &mut visited))
    }

    fn visit(
        by_name: &HashMap<String, MilestoneEntry>,
        node: &str,
        path: &mut HashSet<String>,
        visited: &mut HashSet<String>,
    ) -> bool {
        if path.contains(node) {
            return true;
        }
        if visited.contains(node) {
            return false;
        }
        // Undeclared prerequisites contribute no edges.
        let Some(entry) = by_name.get(node) else {
            visited.insert(node.to_string());
            return false;
        };

        path.insert(node.to_string());
        for prerequisite in &entry.metadata.prerequisites {
            if Self::visit(by_name, prerequisite, path, visited) {
                return true;
            }
        }
        path.remove(node);
        visited.insert(node.to_string());
        false
    }

    /// Milestones declared reusable across journeys.
    pub fn get_reusable(&self) -> RegistryResult<Vec<MilestoneEntry>> {
        let indices = self.read("get_reusable")?;
        Ok(indices
            .by_name
            .values()
            .filter(|entry| entry.metadata.reusable)
            .cloned()
            .collect())
    }

    /// Milestones declared stateful.
    pub fn get_stateful(&self) -> RegistryResult<Vec<MilestoneEntry>> {
        let indices = self.read("get_stateful")?;
        Ok(indices
            .by_name
            .values()
            .filter(|entry| entry.metadata.stateful)
            .cloned()
            .collect())
    }

    /// Wipe all four indices. Used as an isolation boundary between
    /// independent processing passes.
    pub fn clear(&self) -> RegistryResult<()> {
        let mut indices = self.write("clear")?;
        *indices = MilestoneIndices::default();
        debug!("Cleared milestone registry");
        Ok(())
    }

    /// Registry statistics.
    pub fn stats(&self) -> RegistryResult<MilestoneStats> {
        let indices = self.read("stats")?;
        Ok(MilestoneStats {
            total_milestones: indices.by_name.len(),
            total_journeys: indices.by_journey.len(),
            total_stakeholders: indices.by_stakeholder.len(),
            reusable_milestones: indices
                .by_name
                .values()
                .filter(|entry| entry.metadata.reusable)
                .count(),
            stateful_milestones: indices
                .by_name
                .values()
                .filter(|entry| entry.metadata.stateful)
                .count(),
        })
    }
}
