//! Domain-event and event-handler descriptors.

use serde::{Deserialize, Serialize};

use super::Descriptor;

/// Descriptor for a domain-event declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMetadata {
    #[serde(flatten)]
    pub common: Descriptor,
    /// Name of the declaring type, used to derive `event_type` when it is not
    /// given and to resolve type-reference subscriptions
    pub type_name: String,
    /// Canonical dot-delimited event type; derived from `type_name` if absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    /// Aggregate this event belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate_type: Option<String>,
}

impl EventMetadata {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            common: Descriptor::default(),
            type_name: type_name.into(),
            event_type: None,
            aggregate_type: None,
        }
    }

    pub fn with_event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    pub fn with_aggregate(mut self, aggregate_type: impl Into<String>) -> Self {
        self.aggregate_type = Some(aggregate_type.into());
        self
    }
}

/// Descriptor for an event-handler subscription.
///
/// Subscriptions name their event either by the literal `event_type` string
/// or by `event_class`, the declaring type name of an already-registered
/// event; the registry resolves the latter at registration time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerMetadata {
    #[serde(flatten)]
    pub common: Descriptor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_class: Option<String>,
    /// Dispatch priority, higher first
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub is_async: bool,
    #[serde(default = "default_true")]
    pub idempotent: bool,
    #[serde(default = "default_true")]
    pub retryable: bool,
}

fn default_true() -> bool {
    true
}

impl HandlerMetadata {
    pub fn for_event_type(event_type: impl Into<String>) -> Self {
        Self {
            common: Descriptor::default(),
            event_type: Some(event_type.into()),
            event_class: None,
            priority: 0,
            is_async: false,
            idempotent: true,
            retryable: true,
        }
    }

    pub fn for_event_class(event_class: impl Into<String>) -> Self {
        Self {
            event_class: Some(event_class.into()),
            event_type: None,
            ..Self::for_event_type("")
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}
