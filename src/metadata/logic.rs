//! Executable-logic descriptor.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Descriptor;

/// Semantic kind of an executable-logic declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogicType {
    Specification,
    Policy,
    Rule,
    Behavior,
    Calculation,
    Transformation,
    Validation,
    Orchestration,
    Query,
    Command,
    EventHandler,
}

/// Descriptor for any executable business-rule component.
///
/// The type is fixed at registration; the registry offers no way to mutate it
/// afterwards (a re-registration replaces the entry wholesale).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicMetadata {
    #[serde(flatten)]
    pub common: Descriptor,
    /// Unique name across the whole logic registry
    pub logic_name: String,
    #[serde(rename = "type")]
    pub logic_type: LogicType,
    /// Input parameter names mapped to type strings
    #[serde(default)]
    pub inputs: BTreeMap<String, String>,
    /// Output names mapped to type strings
    #[serde(default)]
    pub outputs: BTreeMap<String, String>,
    #[serde(default)]
    pub pure: bool,
    #[serde(default)]
    pub idempotent: bool,
    #[serde(default)]
    pub cacheable: bool,
    /// Names of other logic components this one invokes. The resulting call
    /// graph is directed but not necessarily acyclic; recursion is legal.
    #[serde(default)]
    pub invokes: Vec<String>,
}

impl LogicMetadata {
    pub fn new(name: impl Into<String>, logic_type: LogicType) -> Self {
        Self {
            common: Descriptor::default(),
            logic_name: name.into(),
            logic_type,
            inputs: BTreeMap::new(),
            outputs: BTreeMap::new(),
            pure: false,
            idempotent: false,
            cacheable: false,
            invokes: Vec::new(),
        }
    }

    pub fn pure(mut self) -> Self {
        self.pure = true;
        self
    }

    pub fn cacheable(mut self) -> Self {
        self.cacheable = true;
        self
    }

    pub fn invokes(mut self, names: Vec<String>) -> Self {
        self.invokes = names;
        self
    }
}
