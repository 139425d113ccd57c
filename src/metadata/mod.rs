//! Descriptor records passed into the registries.
//!
//! Every annotated component is described by a plain structured value built
//! by application code and handed to the matching registry's `register`
//! operation. The records carry only descriptive metadata; the registries
//! validate structural and graph invariants (order uniqueness, identifier
//! formats, cycle detection) but do not re-validate required fields already
//! enforced by these types.

pub mod attribute;
pub mod event;
pub mod expectation;
pub mod logic;
pub mod milestone;
pub mod step;
pub mod test;

pub use attribute::{AttributeDefinition, CustomPredicate, ValidationRule};
pub use event::{EventMetadata, HandlerMetadata};
pub use expectation::ExpectationMetadata;
pub use logic::{LogicMetadata, LogicType};
pub use milestone::{MilestoneMetadata, MilestoneScope};
pub use step::{ParentKind, StepMetadata};
pub use test::{TestMetadata, TestResolution, TestType};

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Source location of a declaration, informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

/// Common descriptive fields shared by every component kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    /// Caller-supplied identifier, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Human-readable name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Classification tags
    #[serde(default)]
    pub tags: HashSet<String>,
    /// Where the declaration appears; no invariant depends on it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceLocation>,
}
