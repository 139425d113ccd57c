//! # Logic Registry
//!
//! Central index of every executable-logic declaration regardless of which
//! semantic kind (rule, policy, specification, behavior, event handler)
//! produced it.
//!
//! ## Key Features
//!
//! - **Whole-registry name uniqueness**: a name collision across types is a
//!   caller-visible warning with last-write-wins, since it usually means two
//!   unrelated components share a name
//! - **Type index** for queries like "all policies"
//! - **Predicate queries** for global questions like "all cacheable pure
//!   logic"
//! - **Invocation graph**: dependency and dependent lookups derived from the
//!   `invokes` field; the call graph may legitimately contain cycles, so no
//!   cycle check exists here

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::errors::{RegistryError, RegistryResult};
use crate::identifiers::ComponentId;
use crate::metadata::{LogicMetadata, LogicType};

/// A registered logic declaration with its owning component identity.
#[derive(Debug, Clone, Serialize)]
pub struct LogicEntry {
    pub metadata: LogicMetadata,
    pub component: ComponentId,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct LogicIndices {
    by_name: HashMap<String, LogicEntry>,
    by_type: HashMap<LogicType, Vec<String>>,
}

/// Statistics about registered logic declarations.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LogicStats {
    pub total_logic: usize,
    pub pure_logic: usize,
    pub cacheable_logic: usize,
    pub types_in_use: usize,
}

/// Registry of executable-logic declarations.
#[derive(Debug, Default)]
pub struct LogicRegistry {
    indices: Arc<RwLock<LogicIndices>>,
}

impl LogicRegistry {
    /// Create a new, empty logic registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self, operation: &str) -> RegistryResult<RwLockReadGuard<'_, LogicIndices>> {
        self.indices.read().map_err(|_| RegistryError::LockPoisoned {
            operation: operation.to_string(),
        })
    }

    fn write(&self, operation: &str) -> RegistryResult<RwLockWriteGuard<'_, LogicIndices>> {
        self.indices.write().map_err(|_| RegistryError::LockPoisoned {
            operation: operation.to_string(),
        })
    }

    /// Register a logic declaration, indexed by name and by type.
    ///
    /// The type is fixed at registration; a duplicate name warns and replaces
    /// the previous entry wholesale (including its type-index membership).
    pub fn register(&self, metadata: LogicMetadata, component: ComponentId) -> RegistryResult<()> {
        let name = metadata.logic_name.clone();
        let mut indices = self.write("register")?;

        if let Some(previous) = indices.by_name.get(&name) {
            warn!(
                logic = %name,
                previous_type = ?previous.metadata.logic_type,
                "Duplicate logic name registration, last write wins"
            );
            let previous_type = previous.metadata.logic_type;
            if let Some(members) = indices.by_type.get_mut(&previous_type) {
                members.retain(|member| member != &name);
            }
        }

        indices
            .by_type
            .entry(metadata.logic_type)
            .or_default()
            .push(name.clone());
        indices.by_name.insert(
            name.clone(),
            LogicEntry {
                metadata,
                component,
                registered_at: Utc::now(),
            },
        );

        info!(logic = %name, "Registered logic declaration");
        Ok(())
    }

    /// Look up a declaration by name.
    pub fn get_by_name(&self, name: &str) -> RegistryResult<Option<LogicEntry>> {
        Ok(self.read("get_by_name")?.by_name.get(name).cloned())
    }

    /// All declarations of the given type.
    pub fn get_by_type(&self, logic_type: LogicType) -> RegistryResult<Vec<LogicEntry>> {
        let indices = self.read("get_by_type")?;
        Ok(indices
            .by_type
            .get(&logic_type)
            .into_iter()
            .flatten()
            .filter_map(|name| indices.by_name.get(name).cloned())
            .collect())
    }

    /// All registered declarations.
    pub fn get_all(&self) -> RegistryResult<Vec<LogicEntry>> {
        Ok(self.read("get_all")?.by_name.values().cloned().collect())
    }

    /// Declarations matching an arbitrary predicate.
    pub fn query<F>(&self, predicate: F) -> RegistryResult<Vec<LogicEntry>>
    where
        F: Fn(&LogicEntry) -> bool,
    {
        Ok(self
            .read("query")?
            .by_name
            .values()
            .filter(|entry| predicate(entry))
            .cloned()
            .collect())
    }

    /// Declarations this one invokes, one level deep.
    ///
    /// Unresolved names are dropped, matching the prerequisite policy:
    /// forward references are legal.
    pub fn get_dependencies(&self, name: &str) -> RegistryResult<Vec<LogicEntry>> {
        let indices = self.read("get_dependencies")?;
        let Some(entry) = indices.by_name.get(name) else {
            return Ok(Vec::new());
        };
        Ok(entry
            .metadata
            .invokes
            .iter()
            .filter_map(|invoked| indices.by_name.get(invoked).cloned())
            .collect())
    }

    /// Declarations that invoke this one.
    pub fn get_dependents(&self, name: &str) -> RegistryResult<Vec<LogicEntry>> {
        let indices = self.read("get_dependents")?;
        Ok(indices
            .by_name
            .values()
            .filter(|entry| entry.metadata.invokes.iter().any(|invoked| invoked == name))
            .cloned()
            .collect())
    }

    /// Wipe the registry.
    pub fn clear(&self) -> RegistryResult<()> {
        let mut indices = self.write("clear")?;
        *indices = LogicIndices::default();
        debug!("Cleared logic registry");
        Ok(())
    }

    /// Registry statistics.
    pub fn stats(&self) -> RegistryResult<LogicStats> {
        let indices = self.read("stats")?;
        Ok(LogicStats {
            total_logic: indices.by_name.len(),
            pure_logic: indices
                .by_name
                .values()
                .filter(|entry| entry.metadata.pure)
                .count(),
            cacheable_logic: indices
                .by_name
                .values()
                .filter(|entry| entry.metadata.cacheable)
                .count(),
            types_in_use: indices
                .by_type
                .values()
                .filter(|members| !members.is_empty())
                .count(),
        })
    }
}
