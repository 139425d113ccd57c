//! Test descriptor and resolution state.

use serde::{Deserialize, Serialize};

use super::Descriptor;

/// Category of an annotated test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    Unit,
    Integration,
    E2e,
    Contract,
    Performance,
    Security,
}

/// Resolution state of a registered test.
///
/// A test declared before its parent expectation or behavior starts out
/// `Unresolved` and transitions to `Resolved` exactly once, when the parent
/// registers a reference to it. There is no transition back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TestResolution {
    Unresolved,
    Resolved { test_id: String },
}

impl TestResolution {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }

    pub fn test_id(&self) -> Option<&str> {
        match self {
            Self::Resolved { test_id } => Some(test_id),
            Self::Unresolved => None,
        }
    }
}

/// Descriptor for an annotated test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestMetadata {
    #[serde(flatten)]
    pub common: Descriptor,
    /// Parent expectation, when known at declaration time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expectation_id: Option<String>,
    /// Behavior this test exercises, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavior_id: Option<String>,
    #[serde(rename = "type")]
    pub test_type: TestType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl TestMetadata {
    pub fn new(test_type: TestType) -> Self {
        Self {
            common: Descriptor::default(),
            expectation_id: None,
            behavior_id: None,
            test_type,
            status: None,
        }
    }

    pub fn for_expectation(test_type: TestType, expectation_id: impl Into<String>) -> Self {
        let mut metadata = Self::new(test_type);
        metadata.expectation_id = Some(expectation_id.into());
        metadata
    }
}
