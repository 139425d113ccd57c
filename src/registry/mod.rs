//! # Registry Infrastructure
//!
//! Per-kind in-memory registries over annotated domain-model components.
//!
//! ## Overview
//!
//! Each registry is a single-responsibility index over one component kind.
//! Registries compose loosely through shared identifier strings (a journey
//! slug, a stakeholder role, an event-type string, an expectation ID) rather
//! than direct object references, so components may be declared in any order
//! and joins happen at query time.
//!
//! ## Available Registries
//!
//! - **MilestoneRegistry**: name/journey/stakeholder indices, prerequisite
//!   graph with advisory cycle detection
//! - **StepRegistry**: ordered steps per parent, unique order enforced,
//!   standalone/compose handshake for reusable steps
//! - **LogicRegistry**: all executable-logic declarations, typed and
//!   predicate queries, invocation graph
//! - **EventRegistry**: event declarations and priority-ordered handler
//!   subscriptions
//! - **AttributeRegistry**: inline and decorator attribute sources merged at
//!   read time
//! - **TestRegistry**: generated test IDs with deferred expectation linkage
//! - **ExpectationRegistry**: bilateral contracts with cross-context
//!   relationship validation
//!
//! ## Architecture
//!
//! ```text
//! RegistrySet
//! ├── MilestoneRegistry     (milestones, prerequisite graph)
//! ├── StepRegistry          (ordered steps per parent)
//! ├── LogicRegistry         (rules, policies, specifications, ...)
//! ├── EventRegistry         (event declarations + handlers)
//! ├── AttributeRegistry     (inline + decorator attribute sources)
//! ├── TestRegistry          (test IDs, deferred resolution)
//! └── ExpectationRegistry   (bilateral contracts, contexts)
//! ```

pub mod attribute_registry;
pub mod event_registry;
pub mod expectation_registry;
pub mod logic_registry;
pub mod milestone_registry;
pub mod step_registry;
pub mod test_registry;

pub use attribute_registry::{AttributeRegistry, AttributeStats};
pub use event_registry::{EventEntry, EventRegistry, EventStats, HandlerEntry};
pub use expectation_registry::{ExpectationEntry, ExpectationRegistry, ExpectationStats};
pub use logic_registry::{LogicEntry, LogicRegistry, LogicStats};
pub use milestone_registry::{MilestoneEntry, MilestoneRegistry, MilestoneStats};
pub use step_registry::{StepEntry, StepRegistry, StepStats};
pub use test_registry::{TestEntry, TestRegistry, TestStats};

use std::sync::Arc;

use serde::Serialize;

use crate::errors::RegistryResult;

/// Aggregate statistics across every registry.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RegistrySetStats {
    pub milestones: MilestoneStats,
    pub steps: StepStats,
    pub logic: LogicStats,
    pub events: EventStats,
    pub attributes: AttributeStats,
    pub tests: TestStats,
    pub expectations: ExpectationStats,
}

/// The full set of registries, constructed once at application start and
/// threaded through by explicit parameter passing.
///
/// There is no ambient global state: a fresh instance is a fully isolated
/// world, which makes test isolation a matter of construction rather than
/// cleanup. `clear_all` exists for hosts that reuse one instance across
/// independent model-loading passes.
#[derive(Debug, Clone, Default)]
pub struct RegistrySet {
    milestones: Arc<MilestoneRegistry>,
    steps: Arc<StepRegistry>,
    logic: Arc<LogicRegistry>,
    events: Arc<EventRegistry>,
    attributes: Arc<AttributeRegistry>,
    tests: Arc<TestRegistry>,
    expectations: Arc<ExpectationRegistry>,
}

impl RegistrySet {
    /// Create a fresh, empty set of registries.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn milestones(&self) -> &MilestoneRegistry {
        &self.milestones
    }

    pub fn steps(&self) -> &StepRegistry {
        &self.steps
    }

    pub fn logic(&self) -> &LogicRegistry {
        &self.logic
    }

    pub fn events(&self) -> &EventRegistry {
        &self.events
    }

    pub fn attributes(&self) -> &AttributeRegistry {
        &self.attributes
    }

    pub fn tests(&self) -> &TestRegistry {
        &self.tests
    }

    pub fn expectations(&self) -> &ExpectationRegistry {
        &self.expectations
    }

    /// Wipe every registry. Used as an isolation boundary between
    /// independent processing passes sharing one instance.
    pub fn clear_all(&self) -> RegistryResult<()> {
        self.milestones.clear()?;
        self.steps.clear()?;
        self.logic.clear()?;
        self.events.clear()?;
        self.attributes.clear()?;
        self.tests.clear()?;
        self.expectations.clear()?;
        Ok(())
    }

    /// Aggregate statistics across every registry.
    pub fn stats(&self) -> RegistryResult<RegistrySetStats> {
        Ok(RegistrySetStats {
            milestones: self.milestones.stats()?,
            steps: self.steps.stats()?,
            logic: self.logic.stats()?,
            events: self.events.stats()?,
            attributes: self.attributes.stats()?,
            tests: self.tests.stats()?,
            expectations: self.expectations.stats()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::ComponentId;
    use crate::metadata::{LogicMetadata, LogicType, MilestoneMetadata};

    #[test]
    fn test_fresh_set_is_empty() {
        let stats = RegistrySet::new().stats().unwrap();
        assert_eq!(stats.milestones.total_milestones, 0);
        assert_eq!(stats.tests.resolved_tests, 0);
    }

    #[test]
    fn test_clear_all_is_idempotent() {
        let registries = RegistrySet::new();
        registries
            .milestones()
            .register(
                MilestoneMetadata::new("order-placed", "customer"),
                ComponentId::new(),
                Some("checkout"),
            )
            .unwrap();
        registries
            .logic()
            .register(
                LogicMetadata::new("discount", LogicType::Policy),
                ComponentId::new(),
            )
            .unwrap();

        registries.clear_all().unwrap();
        registries.clear_all().unwrap();

        let stats = registries.stats().unwrap();
        assert_eq!(stats.milestones.total_milestones, 0);
        assert_eq!(stats.logic.total_logic, 0);
    }

    #[test]
    fn test_clone_shares_state() {
        let registries = RegistrySet::new();
        let view = registries.clone();
        registries
            .milestones()
            .register(
                MilestoneMetadata::new("order-placed", "customer"),
                ComponentId::new(),
                None,
            )
            .unwrap();

        assert_eq!(view.stats().unwrap().milestones.total_milestones, 1);
    }
}
