use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::EntityType;

/// Row outcomes for one entity type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EntityTally {
    pub inserted: u64,
    pub updated: u64,
    /// Rows dropped for an unresolvable reference or failed validation.
    pub skipped: u64,
}

/// Per-type counts for one run. Iterates and prints in stage order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationReport {
    entities: BTreeMap<EntityType, EntityTally>,
}

impl Default for ReconciliationReport {
    fn default() -> Self {
        Self::new()
    }
}

impl ReconciliationReport {
    pub fn new() -> Self {
        Self {
            entities: EntityType::ALL
                .into_iter()
                .map(|e| (e, EntityTally::default()))
                .collect(),
        }
    }

    pub fn record_upsert(&mut self, entity: EntityType, created: bool) {
        let tally = self.entities.entry(entity).or_default();
        if created {
            tally.inserted += 1;
        } else {
            tally.updated += 1;
        }
    }

    pub fn record_skip(&mut self, entity: EntityType) {
        self.entities.entry(entity).or_default().skipped += 1;
    }

    pub fn tally(&self, entity: EntityType) -> EntityTally {
        self.entities.get(&entity).copied().unwrap_or_default()
    }

    pub fn total_inserted(&self) -> u64 {
        self.entities.values().map(|t| t.inserted).sum()
    }

    /// Summary lines, `"<EntityType> inserted: <n>, updated: <n>"`.
    pub fn lines(&self) -> Vec<String> {
        self.entities
            .iter()
            .map(|(entity, t)| format!("{entity} inserted: {}, updated: {}", t.inserted, t.updated))
            .collect()
    }
}

impl std::fmt::Display for ReconciliationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.lines().join("\n"))
    }
}
