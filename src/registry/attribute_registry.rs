//! # Attribute Registry
//!
//! Merges two attribute sources — definitions declared inline as part of a
//! parent component's own metadata, and definitions declared through a
//! dedicated attribute-level annotation — into one queryable view per
//! component.
//!
//! ## Merge-on-read
//!
//! The two sources are stored in independent maps and never merged at write
//! time; queries overlay decorator-sourced definitions on top of inline ones
//! by attribute name, decorator winning on collision. Registering in either
//! order therefore produces the same view, and neither annotation mechanism
//! depends on the other.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::errors::{RegistryError, RegistryResult};
use crate::identifiers::ComponentId;
use crate::metadata::AttributeDefinition;

#[derive(Debug, Default)]
struct AttributeMaps {
    inline: HashMap<ComponentId, Vec<AttributeDefinition>>,
    decorator: HashMap<ComponentId, Vec<AttributeDefinition>>,
}

/// Statistics about registered attribute definitions.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AttributeStats {
    pub inline_attributes: usize,
    pub decorator_attributes: usize,
    pub components_with_attributes: usize,
}

/// Registry of structured property definitions per component.
#[derive(Debug, Default)]
pub struct AttributeRegistry {
    maps: Arc<RwLock<AttributeMaps>>,
}

impl AttributeRegistry {
    /// Create a new, empty attribute registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self, operation: &str) -> RegistryResult<RwLockReadGuard<'_, AttributeMaps>> {
        self.maps.read().map_err(|_| RegistryError::LockPoisoned {
            operation: operation.to_string(),
        })
    }

    fn write(&self, operation: &str) -> RegistryResult<RwLockWriteGuard<'_, AttributeMaps>> {
        self.maps.write().map_err(|_| RegistryError::LockPoisoned {
            operation: operation.to_string(),
        })
    }

    /// Register an attribute declared inline in a parent's metadata.
    /// Re-declaring a name within this source replaces it here only.
    pub fn register_inline(
        &self,
        component: ComponentId,
        definition: AttributeDefinition,
    ) -> RegistryResult<()> {
        let mut maps = self.write("register_inline")?;
        Self::upsert(maps.inline.entry(component).or_default(), definition);
        debug!(%component, "Registered inline attribute");
        Ok(())
    }

    /// Register an attribute declared through the attribute-level annotation.
    pub fn register_decorator(
        &self,
        component: ComponentId,
        definition: AttributeDefinition,
    ) -> RegistryResult<()> {
        let mut maps = self.write("register_decorator")?;
        Self::upsert(maps.decorator.entry(component).or_default(), definition);
        debug!(%component, "Registered decorator attribute");
        Ok(())
    }

    fn upsert(definitions: &mut Vec<AttributeDefinition>, definition: AttributeDefinition) {
        definitions.retain(|existing| existing.attribute_name != definition.attribute_name);
        definitions.push(definition);
    }

    /// Merged attribute view for a component: inline definitions first,
    /// decorator definitions overlaid by name.
    pub fn query(&self, component: ComponentId) -> RegistryResult<Vec<AttributeDefinition>> {
        let maps = self.read("query")?;
        Ok(Self::merged_for(&maps, component))
    }

    fn merged_for(maps: &AttributeMaps, component: ComponentId) -> Vec<AttributeDefinition> {
        let mut merged: Vec<AttributeDefinition> =
            maps.inline.get(&component).cloned().unwrap_or_default();
        for definition in maps.decorator.get(&component).into_iter().flatten() {
            Self::upsert(&mut merged, definition.clone());
        }
        merged
    }

    /// Merged attributes across all components whose name matches `pattern`.
    ///
    /// An invalid regex is a fatal configuration error.
    pub fn query_by_name_pattern(
        &self,
        pattern: &str,
    ) -> RegistryResult<Vec<(ComponentId, AttributeDefinition)>> {
        let regex = Regex::new(pattern).map_err(|e| RegistryError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        let maps = self.read("query_by_name_pattern")?;
        let mut components: Vec<ComponentId> =
            maps.inline.keys().chain(maps.decorator.keys()).copied().collect();
        components.sort();
        components.dedup();

        Ok(components
            .into_iter()
            .flat_map(|component| {
                Self::merged_for(&maps, component)
                    .into_iter()
                    .map(move |definition| (component, definition))
            })
            .filter(|(_, definition)| regex.is_match(&definition.attribute_name))
            .collect())
    }

    /// Wipe both maps.
    pub fn clear(&self) -> RegistryResult<()> {
        let mut maps = self.write("clear")?;
        *maps = AttributeMaps::default();
        debug!("Cleared attribute registry");
        Ok(())
    }

    /// Registry statistics.
    pub fn stats(&self) -> RegistryResult<AttributeStats> {
        let maps = self.read("stats")?;
        let mut components: Vec<&ComponentId> =
            maps.inline.keys().chain(maps.decorator.keys()).collect();
        components.sort();
        components.dedup();
        Ok(AttributeStats {
            inline_attributes: maps.inline.values().map(Vec::len).sum(),
            decorator_attributes: maps.decorator.values().map(Vec::len).sum(),
            components_with_attributes: components.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_precedence_decorator_wins() {
        let registry = AttributeRegistry::new();
        let component = ComponentId::new();

        registry
            .register_inline(component, AttributeDefinition::new("age").required(false))
            .unwrap();
        registry
            .register_decorator(component, AttributeDefinition::new("age").required(true))
            .unwrap();

        let merged = registry.query(component).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].attribute_name, "age");
        assert_eq!(merged[0].required, Some(true));
    }

    #[test]
    fn test_merge_order_independent() {
        let registry = AttributeRegistry::new();
        let component = ComponentId::new();

        // Decorator first, inline second: decorator still wins.
        registry
            .register_decorator(component, AttributeDefinition::new("age").required(true))
            .unwrap();
        registry
            .register_inline(component, AttributeDefinition::new("age").required(false))
            .unwrap();

        let merged = registry.query(component).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].required, Some(true));
    }

    #[test]
    fn test_disjoint_names_union() {
        let registry = AttributeRegistry::new();
        let component = ComponentId::new();

        registry
            .register_inline(component, AttributeDefinition::typed("name", "string"))
            .unwrap();
        registry
            .register_decorator(component, AttributeDefinition::typed("email", "string"))
            .unwrap();

        let merged = registry.query(component).unwrap();
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_redeclaration_within_source_replaces() {
        let registry = AttributeRegistry::new();
        let component = ComponentId::new();

        registry
            .register_inline(component, AttributeDefinition::new("age").required(false))
            .unwrap();
        registry
            .register_inline(component, AttributeDefinition::new("age").required(true))
            .unwrap();

        let merged = registry.query(component).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].required, Some(true));
    }

    #[test]
    fn test_query_by_name_pattern() {
        let registry = AttributeRegistry::new();
        let a = ComponentId::new();
        let b = ComponentId::new();

        registry
            .register_inline(a, AttributeDefinition::new("customer_id"))
            .unwrap();
        registry
            .register_decorator(b, AttributeDefinition::new("order_id"))
            .unwrap();
        registry
            .register_inline(b, AttributeDefinition::new("total"))
            .unwrap();

        let matches = registry.query_by_name_pattern("_id$").unwrap();
        assert_eq!(matches.len(), 2);
        assert!(matches
            .iter()
            .all(|(_, definition)| definition.attribute_name.ends_with("_id")));
    }

    #[test]
    fn test_invalid_pattern_is_fatal() {
        let registry = AttributeRegistry::new();
        let result = registry.query_by_name_pattern("(unclosed");
        assert!(matches!(result, Err(RegistryError::InvalidPattern { .. })));
    }

    #[test]
    fn test_clear_and_stats() {
        let registry = AttributeRegistry::new();
        let component = ComponentId::new();
        registry
            .register_inline(component, AttributeDefinition::new("a"))
            .unwrap();
        registry
            .register_decorator(component, AttributeDefinition::new("b"))
            .unwrap();

        let stats = registry.stats().unwrap();
        assert_eq!(stats.inline_attributes, 1);
        assert_eq!(stats.decorator_attributes, 1);
        assert_eq!(stats.components_with_attributes, 1);

        registry.clear().unwrap();
        assert!(registry.query(component).unwrap().is_empty());
        assert_eq!(registry.stats().unwrap().components_with_attributes, 0);
    }
}
