//! Milestone descriptor.

use serde::{Deserialize, Serialize};

use super::Descriptor;

/// How a milestone was declared.
///
/// Inline milestones are attached to a method within a journey definition and
/// must carry an explicit `order`; standalone milestones are declared as
/// their own type and may be ordered later by the journeys that reuse them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneScope {
    Standalone,
    Inline,
}

/// Descriptor for a business-significant waypoint within a journey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneMetadata {
    #[serde(flatten)]
    pub common: Descriptor,
    /// Unique name within the milestone registry
    pub milestone_name: String,
    /// Stakeholder role this milestone matters to
    pub stakeholder: String,
    /// Position within a journey; required for inline declarations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    /// Names of milestones that must complete first
    #[serde(default)]
    pub prerequisites: Vec<String>,
    /// Domain event emitted when the milestone is reached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_event: Option<String>,
    /// Whether the milestone carries state across visits
    #[serde(default)]
    pub stateful: bool,
    /// Whether the milestone may be composed into multiple journeys
    #[serde(default)]
    pub reusable: bool,
    /// Journey slugs this milestone belongs to, beyond the registration slug
    #[serde(default)]
    pub journeys: Vec<String>,
    #[serde(default = "default_scope")]
    pub scope: MilestoneScope,
}

fn default_scope() -> MilestoneScope {
    MilestoneScope::Standalone
}

impl MilestoneMetadata {
    /// Build a standalone milestone with the required fields; everything else
    /// defaults and can be set through the public fields.
    pub fn new(name: impl Into<String>, stakeholder: impl Into<String>) -> Self {
        Self {
            common: Descriptor::default(),
            milestone_name: name.into(),
            stakeholder: stakeholder.into(),
            order: None,
            prerequisites: Vec::new(),
            business_event: None,
            stateful: false,
            reusable: false,
            journeys: Vec::new(),
            scope: MilestoneScope::Standalone,
        }
    }

    /// Build an inline milestone, which always carries an order.
    pub fn inline(name: impl Into<String>, stakeholder: impl Into<String>, order: u32) -> Self {
        let mut metadata = Self::new(name, stakeholder);
        metadata.order = Some(order);
        metadata.scope = MilestoneScope::Inline;
        metadata
    }

    pub fn with_order(mut self, order: u32) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_prerequisites(mut self, prerequisites: Vec<String>) -> Self {
        self.prerequisites = prerequisites;
        self
    }

    pub fn reusable(mut self) -> Self {
        self.reusable = true;
        self
    }

    pub fn stateful(mut self) -> Self {
        self.stateful = true;
        self
    }
}
