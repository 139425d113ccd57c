//! Step descriptor.

use serde::{Deserialize, Serialize};

use super::Descriptor;

/// The kind of component a step is composed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentKind {
    Milestone,
    Behavior,
}

/// Descriptor for an ordered step under a milestone or behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepMetadata {
    #[serde(flatten)]
    pub common: Descriptor,
    /// Position among siblings; unique per parent
    pub order: u32,
}

impl StepMetadata {
    pub fn new(name: impl Into<String>, order: u32) -> Self {
        Self {
            common: Descriptor {
                name: Some(name.into()),
                ..Descriptor::default()
            },
            order,
        }
    }

    /// Copy of this step with its order replaced, used when a reusable step
    /// is composed into a milestone at a specific position.
    pub fn at_order(&self, order: u32) -> Self {
        let mut metadata = self.clone();
        metadata.order = order;
        metadata
    }
}
