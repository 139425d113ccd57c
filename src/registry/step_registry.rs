//! # Step Registry
//!
//! Indexes ordered steps under a parent component (a milestone or a
//! behavior), enforcing that each `order` is used at most once per parent.
//!
//! ## Key Features
//!
//! - **Unique order per parent**: a collision is a configuration error, not a
//!   warning — unlike duplicate milestone names, two steps claiming the same
//!   position indicate an authored mistake
//! - **Ordered retrieval**: `get_by_parent` always returns steps sorted
//!   ascending by order
//! - **Standalone placeholders**: a reusable step class registers under its
//!   own identity, then `compose` copies it under each milestone that adopts
//!   it at a specific order, leaving the placeholder in place for further
//!   reuse

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::errors::{RegistryError, RegistryResult};
use crate::identifiers::ComponentId;
use crate::metadata::{ParentKind, StepMetadata};

/// A registered step with its owning component identity and parent.
#[derive(Debug, Clone, Serialize)]
pub struct StepEntry {
    pub metadata: StepMetadata,
    pub component: ComponentId,
    pub parent: ComponentId,
    pub parent_kind: ParentKind,
    pub registered_at: DateTime<Utc>,
}

/// Statistics about registered steps.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StepStats {
    pub total_steps: usize,
    pub total_parents: usize,
    pub standalone_steps: usize,
}

/// Registry of steps grouped by parent.
#[derive(Debug, Default)]
pub struct StepRegistry {
    by_parent: Arc<RwLock<HashMap<ComponentId, Vec<StepEntry>>>>,
}

impl StepRegistry {
    /// Create a new, empty step registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(
        &self,
        operation: &str,
    ) -> RegistryResult<RwLockReadGuard<'_, HashMap<ComponentId, Vec<StepEntry>>>> {
        self.by_parent
            .read()
            .map_err(|_| RegistryError::LockPoisoned {
                operation: operation.to_string(),
            })
    }

    fn write(
        &self,
        operation: &str,
    ) -> RegistryResult<RwLockWriteGuard<'_, HashMap<ComponentId, Vec<StepEntry>>>> {
        self.by_parent
            .write()
            .map_err(|_| RegistryError::LockPoisoned {
                operation: operation.to_string(),
            })
    }

    /// Register a step under a parent.
    ///
    /// An existing step with the same `order` under this parent is a fatal
    /// `Conflict`.
    pub fn register(
        &self,
        metadata: StepMetadata,
        component: ComponentId,
        parent: ComponentId,
        parent_kind: ParentKind,
    ) -> RegistryResult<()> {
        let mut by_parent = self.write("register")?;
        Self::insert(&mut by_parent, metadata, component, parent, parent_kind)
    }

    /// Register a step under its own identity as a placeholder parent.
    ///
    /// This is the first half of the composition handshake for reusable step
    /// classes: a later `compose` call resolves the placeholder into a
    /// milestone at a specific order.
    pub fn register_standalone(
        &self,
        metadata: StepMetadata,
        component: ComponentId,
    ) -> RegistryResult<()> {
        let mut by_parent = self.write("register_standalone")?;
        Self::insert(
            &mut by_parent,
            metadata,
            component,
            component,
            ParentKind::Milestone,
        )
    }

    /// Compose a previously registered standalone step into a parent at the
    /// given order.
    ///
    /// The placeholder's metadata is copied with `order` overridden; the
    /// placeholder itself stays registered so the same step class can be
    /// composed into any number of milestones. Fails with
    /// `UnresolvedReference` when no placeholder exists for `step`, and with
    /// `Conflict` when the order is already taken under `parent`.
    pub fn compose(
        &self,
        step: ComponentId,
        parent: ComponentId,
        parent_kind: ParentKind,
        order: u32,
    ) -> RegistryResult<()> {
        let mut by_parent = self.write("compose")?;

        let placeholder = by_parent
            .get(&step)
            .and_then(|steps| steps.iter().find(|entry| entry.component == step))
            .ok_or_else(|| RegistryError::UnresolvedReference {
                kind: "standalone step".to_string(),
                name: step.to_string(),
            })?;

        let metadata = placeholder.metadata.at_order(order);
        Self::insert(&mut by_parent, metadata, step, parent, parent_kind)
    }

    fn insert(
        by_parent: &mut HashMap<ComponentId, Vec<StepEntry>>,
        metadata: StepMetadata,
        component: ComponentId,
        parent: ComponentId,
        parent_kind: ParentKind,
    ) -> RegistryResult<()> {
        let steps = by_parent.entry(parent).or_default();
        if let Some(existing) = steps.iter().find(|entry| entry.metadata.order == metadata.order) {
            return Err(RegistryError::Conflict {
                key: format!("parent {parent} order {}", metadata.order),
                reason: format!(
                    "order already taken by step component {}",
                    existing.component
                ),
            });
        }

        let order = metadata.order;
        steps.push(StepEntry {
            metadata,
            component,
            parent,
            parent_kind,
            registered_at: Utc::now(),
        });
        info!(%parent, order, "Registered step");
        Ok(())
    }

    /// Steps under a parent, sorted ascending by order.
    pub fn get_by_parent(&self, parent: ComponentId) -> RegistryResult<Vec<StepEntry>> {
        let by_parent = self.read("get_by_parent")?;
        let mut steps = by_parent.get(&parent).cloned().unwrap_or_default();
        steps.sort_by_key(|entry| entry.metadata.order);
        Ok(steps)
    }

    /// Wipe the registry.
    pub fn clear(&self) -> RegistryResult<()> {
        self.write("clear")?.clear();
        debug!("Cleared step registry");
        Ok(())
    }

    /// Registry statistics.
    pub fn stats(&self) -> RegistryResult<StepStats> {
        let by_parent = self.read("stats")?;
        Ok(StepStats {
            total_steps: by_parent.values().map(Vec::len).sum(),
            total_parents: by_parent.len(),
            standalone_steps: by_parent
                .iter()
                .flat_map(|(parent, steps)| steps.iter().map(move |entry| (parent, entry)))
                .filter(|(parent, entry)| entry.component == **parent)
                .count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_register_and_get_sorted() {
        let registry = StepRegistry::new();
        let parent = ComponentId::new();

        for order in [30, 10, 20] {
            registry
                .register(
                    StepMetadata::new(format!("step-{order}"), order),
                    ComponentId::new(),
                    parent,
                    ParentKind::Milestone,
                )
                .unwrap();
        }

        let orders: Vec<_> = registry
            .get_by_parent(parent)
            .unwrap()
            .into_iter()
            .map(|entry| entry.metadata.order)
            .collect();
        assert_eq!(orders, vec![10, 20, 30]);
    }

    #[test]
    fn test_order_collision_is_fatal() {
        let registry = StepRegistry::new();
        let parent = ComponentId::new();

        registry
            .register(
                StepMetadata::new("validate", 1),
                ComponentId::new(),
                parent,
                ParentKind::Milestone,
            )
            .unwrap();
        let result = registry.register(
            StepMetadata::new("persist", 1),
            ComponentId::new(),
            parent,
            ParentKind::Milestone,
        );

        assert!(matches!(result, Err(RegistryError::Conflict { .. })));
        // Same order under a different parent is fine.
        registry
            .register(
                StepMetadata::new("persist", 1),
                ComponentId::new(),
                ComponentId::new(),
                ParentKind::Behavior,
            )
            .unwrap();
    }

    #[test]
    fn test_compose_handshake() {
        let registry = StepRegistry::new();
        let step = ComponentId::new();
        registry
            .register_standalone(StepMetadata::new("send-receipt", 0), step)
            .unwrap();

        let checkout = ComponentId::new();
        let refund = ComponentId::new();
        registry
            .compose(step, checkout, ParentKind::Milestone, 3)
            .unwrap();
        registry
            .compose(step, refund, ParentKind::Milestone, 1)
            .unwrap();

        let composed = registry.get_by_parent(checkout).unwrap();
        assert_eq!(composed.len(), 1);
        assert_eq!(composed[0].metadata.order, 3);
        assert_eq!(composed[0].component, step);

        assert_eq!(registry.get_by_parent(refund).unwrap()[0].metadata.order, 1);

        // The placeholder survives for further reuse.
        assert_eq!(registry.get_by_parent(step).unwrap().len(), 1);
    }

    #[test]
    fn test_compose_unknown_step() {
        let registry = StepRegistry::new();
        let result = registry.compose(
            ComponentId::new(),
            ComponentId::new(),
            ParentKind::Milestone,
            1,
        );
        assert!(matches!(
            result,
            Err(RegistryError::UnresolvedReference { .. })
        ));
    }

    #[test]
    fn test_clear_and_stats() {
        let registry = StepRegistry::new();
        let step = ComponentId::new();
        registry
            .register_standalone(StepMetadata::new("a", 0), step)
            .unwrap();
        registry
            .register(
                StepMetadata::new("b", 1),
                ComponentId::new(),
                ComponentId::new(),
                ParentKind::Behavior,
            )
            .unwrap();

        let stats = registry.stats().unwrap();
        assert_eq!(stats.total_steps, 2);
        assert_eq!(stats.total_parents, 2);
        assert_eq!(stats.standalone_steps, 1);

        registry.clear().unwrap();
        assert_eq!(registry.stats().unwrap().total_steps, 0);
        assert!(registry.get_by_parent(step).unwrap().is_empty());
    }

    proptest! {
        /// For any set of distinct orders, retrieval is strictly increasing.
        #[test]
        fn prop_get_by_parent_strictly_increasing(
            orders in proptest::collection::hash_set(0u32..1000, 1..20)
        ) {
            let registry = StepRegistry::new();
            let parent = ComponentId::new();
            for order in &orders {
                registry
                    .register(
                        StepMetadata::new(format!("step-{order}"), *order),
                        ComponentId::new(),
                        parent,
                        ParentKind::Milestone,
                    )
                    .unwrap();
            }

            let retrieved = registry.get_by_parent(parent).unwrap();
            prop_assert_eq!(retrieved.len(), orders.len());
            for window in retrieved.windows(2) {
                prop_assert!(window[0].metadata.order < window[1].metadata.order);
            }
        }
    }
}
