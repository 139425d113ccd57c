//! Attribute descriptor and validation rules.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declarative validation rule carried on an attribute definition.
///
/// The registries store these; nothing here evaluates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationRule {
    Min(f64),
    Max(f64),
    MinLength(usize),
    MaxLength(usize),
    Pattern(String),
    OneOf(Vec<Value>),
}

/// Caller-supplied validation predicate. Not serializable; carried alongside
/// the declarative rules for downstream tooling that chooses to evaluate it.
pub type CustomPredicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Structured property definition attached to a parent component.
#[derive(Clone, Serialize, Deserialize)]
pub struct AttributeDefinition {
    pub attribute_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub immutable: Option<bool>,
    #[serde(default)]
    pub rules: Vec<ValidationRule>,
    #[serde(skip)]
    pub custom: Option<CustomPredicate>,
}

impl AttributeDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            attribute_name: name.into(),
            type_name: None,
            required: None,
            default_value: None,
            immutable: None,
            rules: Vec::new(),
            custom: None,
        }
    }

    pub fn typed(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        let mut definition = Self::new(name);
        definition.type_name = Some(type_name.into());
        definition
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn with_rule(mut self, rule: ValidationRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_custom(mut self, predicate: CustomPredicate) -> Self {
        self.custom = Some(predicate);
        self
    }
}

impl fmt::Debug for AttributeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeDefinition")
            .field("attribute_name", &self.attribute_name)
            .field("type_name", &self.type_name)
            .field("required", &self.required)
            .field("default_value", &self.default_value)
            .field("immutable", &self.immutable)
            .field("rules", &self.rules)
            .field("custom", &self.custom.as_ref().map(|_| "<predicate>"))
            .finish()
    }
}

impl PartialEq for AttributeDefinition {
    fn eq(&self, other: &Self) -> bool {
        // Predicates are opaque; equality covers the declarative fields only.
        self.attribute_name == other.attribute_name
            && self.type_name == other.type_name
            && self.required == other.required
            && self.default_value == other.default_value
            && self.immutable == other.immutable
            && self.rules == other.rules
    }
}
