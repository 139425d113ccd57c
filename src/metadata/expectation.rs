//! Expectation descriptor.

use serde::{Deserialize, Serialize};

use super::Descriptor;

/// Descriptor for a bilateral contract between two stakeholder roles.
///
/// The bounded context an expectation lives in is derived at registration
/// time from the two stakeholders, not stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectationMetadata {
    #[serde(flatten)]
    pub common: Descriptor,
    /// Identifier in `{2+ uppercase}-EXP-{3+ digits}` form
    pub expectation_id: String,
    /// Role that holds the expectation
    pub expecting_stakeholder: String,
    /// Role that provides the capability
    pub providing_stakeholder: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_path: Option<bool>,
}

impl ExpectationMetadata {
    pub fn new(
        expectation_id: impl Into<String>,
        expecting: impl Into<String>,
        providing: impl Into<String>,
    ) -> Self {
        Self {
            common: Descriptor::default(),
            expectation_id: expectation_id.into(),
            expecting_stakeholder: expecting.into(),
            providing_stakeholder: providing.into(),
            priority: None,
            critical_path: None,
        }
    }

    pub fn critical(mut self) -> Self {
        self.critical_path = Some(true);
        self
    }
}
