//! # Event Registry
//!
//! Maps domain-event types to their declarations and to the handlers
//! subscribed to them.
//!
//! ## Key Features
//!
//! - **Derived event types**: a declaration without an explicit `event_type`
//!   gets one derived from its type name (`OrderPlacedEvent` →
//!   `order.placed`)
//! - **Type-reference subscriptions**: a handler may subscribe via the
//!   declaring type's name instead of the literal event-type string; the
//!   registry resolves it through the declaration index
//! - **Priority ordering**: handler listing is descending by priority with a
//!   stable registration-order tie-break

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::errors::{RegistryError, RegistryResult};
use crate::identifiers::{derive_event_type, ComponentId};
use crate::metadata::{EventMetadata, HandlerMetadata};

/// A registered event declaration.
#[derive(Debug, Clone, Serialize)]
pub struct EventEntry {
    pub metadata: EventMetadata,
    /// Canonical event type, declared or derived
    pub event_type: String,
    pub component: ComponentId,
    pub registered_at: DateTime<Utc>,
}

/// A registered handler subscription.
#[derive(Debug, Clone, Serialize)]
pub struct HandlerEntry {
    pub metadata: HandlerMetadata,
    /// Resolved event type this handler is subscribed to
    pub event_type: String,
    pub component: ComponentId,
    pub registered_at: DateTime<Utc>,
    /// Monotonic registration sequence, used as the stable tie-break
    pub sequence: u64,
}

#[derive(Debug, Default)]
struct EventIndices {
    events: HashMap<String, EventEntry>,
    /// Declaring type name to canonical event type
    by_type_name: HashMap<String, String>,
    handlers: HashMap<String, Vec<HandlerEntry>>,
    next_sequence: u64,
}

/// Statistics about registered events and handlers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EventStats {
    pub total_events: usize,
    pub total_handlers: usize,
    pub event_types_with_handlers: usize,
}

/// Registry of domain-event declarations and handler subscriptions.
#[derive(Debug, Default)]
pub struct EventRegistry {
    indices: Arc<RwLock<EventIndices>>,
}

impl EventRegistry {
    /// Create a new, empty event registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self, operation: &str) -> RegistryResult<RwLockReadGuard<'_, EventIndices>> {
        self.indices.read().map_err(|_| RegistryError::LockPoisoned {
            operation: operation.to_string(),
        })
    }

    fn write(&self, operation: &str) -> RegistryResult<RwLockWriteGuard<'_, EventIndices>> {
        self.indices.write().map_err(|_| RegistryError::LockPoisoned {
            operation: operation.to_string(),
        })
    }

    /// Register an event declaration, keyed by its canonical event type.
    ///
    /// Returns the canonical type. A duplicate declaration for the same type
    /// warns and overwrites.
    pub fn register_event(
        &self,
        metadata: EventMetadata,
        component: ComponentId,
    ) -> RegistryResult<String> {
        let event_type = metadata
            .event_type
            .clone()
            .unwrap_or_else(|| derive_event_type(&metadata.type_name));

        let mut indices = self.write("register_event")?;
        if indices.events.contains_key(&event_type) {
            warn!(
                event_type = %event_type,
                "Duplicate event declaration, last write wins"
            );
        }

        indices
            .by_type_name
            .insert(metadata.type_name.clone(), event_type.clone());
        indices.events.insert(
            event_type.clone(),
            EventEntry {
                metadata,
                event_type: event_type.clone(),
                component,
                registered_at: Utc::now(),
            },
        );

        info!(event_type = %event_type, "Registered event declaration");
        Ok(event_type)
    }

    /// Register a handler subscription.
    ///
    /// The subscription key is resolved from `event_type` directly, or
    /// through the declaration index when the handler subscribes via
    /// `event_class`. A class reference that resolves to nothing is a fatal
    /// `UnresolvedReference`; a handler carrying neither key is missing a
    /// required field. Returns the resolved event type.
    pub fn register_handler(
        &self,
        metadata: HandlerMetadata,
        component: ComponentId,
    ) -> RegistryResult<String> {
        let mut indices = self.write("register_handler")?;

        let event_type = match (&metadata.event_type, &metadata.event_class) {
            (Some(event_type), _) => event_type.clone(),
            (None, Some(event_class)) => indices
                .by_type_name
                .get(event_class)
                .cloned()
                .ok_or_else(|| RegistryError::UnresolvedReference {
                    kind: "event class".to_string(),
                    name: event_class.clone(),
                })?,
            (None, None) => {
                return Err(RegistryError::MissingRequiredField {
                    component: component.to_string(),
                    field: "event_type".to_string(),
                })
            }
        };

        let sequence = indices.next_sequence;
        indices.next_sequence += 1;
        let priority = metadata.priority;
        indices
            .handlers
            .entry(event_type.clone())
            .or_default()
            .push(HandlerEntry {
                metadata,
                event_type: event_type.clone(),
                component,
                registered_at: Utc::now(),
                sequence,
            });

        info!(event_type = %event_type, priority, "Registered event handler");
        Ok(event_type)
    }

    /// Look up an event declaration by canonical type.
    pub fn get_event(&self, event_type: &str) -> RegistryResult<Option<EventEntry>> {
        Ok(self.read("get_event")?.events.get(event_type).cloned())
    }

    /// Fallback lookup by declaring type name, used when a subscription
    /// references the event by type instead of by string.
    pub fn get_event_by_name(&self, type_name: &str) -> RegistryResult<Option<EventEntry>> {
        let indices = self.read("get_event_by_name")?;
        Ok(indices
            .by_type_name
            .get(type_name)
            .and_then(|event_type| indices.events.get(event_type))
            .cloned())
    }

    /// Handlers subscribed to an event type, descending by priority with
    /// registration order breaking ties.
    pub fn get_handlers(&self, event_type: &str) -> RegistryResult<Vec<HandlerEntry>> {
        let indices = self.read("get_handlers")?;
        let mut handlers = indices
            .handlers
            .get(event_type)
            .cloned()
            .unwrap_or_default();
        handlers.sort_by_key(|entry| (-i64::from(entry.metadata.priority), entry.sequence));
        Ok(handlers)
    }

    /// All registered event declarations.
    pub fn get_all_events(&self) -> RegistryResult<Vec<EventEntry>> {
        Ok(self.read("get_all_events")?.events.values().cloned().collect())
    }

    /// Wipe the registry.
    pub fn clear(&self) -> RegistryResult<()> {
        let mut indices = self.write("clear")?;
        *indices = EventIndices::default();
        debug!("Cleared event registry");
        Ok(())
    }

    /// Registry statistics.
    pub fn stats(&self) -> RegistryResult<EventStats> {
        let indices = self.read("stats")?;
        Ok(EventStats {
            total_events: indices.events.len(),
            total_handlers: indices.handlers.values().map(Vec::len).sum(),
            event_types_with_handlers: indices
                .handlers
                .values()
                .filter(|handlers| !handlers.is_empty())
                .count(),
        })
    }
}
