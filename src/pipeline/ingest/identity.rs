use std::collections::HashMap;

use crate::models::EntityType;

/// A required reference that no earlier row of the run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
    pub entity: EntityType,
    pub legacy_id: String,
}

impl std::fmt::Display for Unresolved {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.legacy_id.is_empty() {
            write!(f, "missing {} reference", self.entity)
        } else {
            write!(f, "unknown {} reference {:?}", self.entity, self.legacy_id)
        }
    }
}

/// Run-scoped map from source-supplied legacy ids to store-assigned ids,
/// one namespace per entity type. Never persisted.
#[derive(Debug, Default)]
pub struct IdentityResolver {
    maps: HashMap<EntityType, HashMap<String, String>>,
}

impl IdentityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember where a legacy id landed. No-op when the row had no legacy id.
    pub fn record(&mut self, entity: EntityType, legacy_id: Option<&str>, assigned_id: &str) {
        let Some(legacy_id) = legacy_id.filter(|id| !id.is_empty()) else {
            return;
        };
        let previous = self
            .maps
            .entry(entity)
            .or_default()
            .insert(legacy_id.to_string(), assigned_id.to_string());
        if let Some(previous) = previous.filter(|p| p != assigned_id) {
            tracing::debug!(
                entity = entity.as_str(),
                legacy_id,
                previous = %previous,
                assigned = assigned_id,
                "Legacy id remapped to a different record"
            );
        }
    }

    pub fn resolve(&self, entity: EntityType, legacy_id: &str) -> Option<&str> {
        self.maps
            .get(&entity)
            .and_then(|m| m.get(legacy_id))
            .map(String::as_str)
    }

    /// Resolve a reference the row cannot do without.
    pub fn require(&self, entity: EntityType, legacy_id: &str) -> Result<String, Unresolved> {
        self.resolve(entity, legacy_id)
            .map(str::to_string)
            .ok_or_else(|| Unresolved {
                entity,
                legacy_id: legacy_id.to_string(),
            })
    }

    /// Number of legacy ids known for one entity type.
    pub fn len(&self, entity: EntityType) -> usize {
        self.maps.get(&entity).map_or(0, HashMap::len)
    }
}
