//! API snapshot: one version of an API surface.

use super::{EntityKind, EntityRecord};
use crate::error::{ApiDiffError, Result, SnapshotErrorKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use xxhash_rust::xxh3::xxh3_64;

/// Named, insertion-ordered collection of entity records.
///
/// Snapshots are read-only inputs to detection and evaluation. Entities go
/// in through [`ApiSnapshot::add_entity`], which rejects empty and duplicate
/// ids. Deserialization runs every entry through the same check and also
/// requires each map key to equal its entity id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "RawSnapshot")]
pub struct ApiSnapshot {
    /// Snapshot name, e.g. `mylib@1.2.0`
    pub name: String,
    entries: IndexMap<String, EntityRecord>,
}

/// Unchecked wire form of [`ApiSnapshot`].
#[derive(Deserialize)]
struct RawSnapshot {
    name: String,
    #[serde(default)]
    entries: IndexMap<String, EntityRecord>,
}

impl TryFrom<RawSnapshot> for ApiSnapshot {
    type Error = ApiDiffError;

    fn try_from(raw: RawSnapshot) -> Result<Self> {
        let mut snapshot = Self::new(raw.name);
        for (key, entity) in raw.entries {
            if key != entity.id {
                return Err(ApiDiffError::snapshot(
                    format!("loading {}", snapshot.name),
                    SnapshotErrorKind::KeyMismatch { key, id: entity.id },
                ));
            }
            snapshot.add_entity(entity)?;
        }
        Ok(snapshot)
    }
}

impl ApiSnapshot {
    /// Create an empty snapshot
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: IndexMap::new(),
        }
    }

    /// Add an entity, failing on an empty or duplicate id.
    pub fn add_entity(&mut self, entity: EntityRecord) -> Result<()> {
        if entity.id.is_empty() {
            return Err(ApiDiffError::snapshot(
                format!("adding {} to {}", entity.kind.label(), self.name),
                SnapshotErrorKind::EmptyId,
            ));
        }
        if self.entries.contains_key(&entity.id) {
            return Err(ApiDiffError::snapshot(
                format!("adding {} to {}", entity.kind.label(), self.name),
                SnapshotErrorKind::DuplicateEntity {
                    id: entity.id.clone(),
                },
            ));
        }
        self.entries.insert(entity.id.clone(), entity);
        Ok(())
    }

    /// Build a snapshot from a list of entities.
    pub fn from_entities(
        name: impl Into<String>,
        entities: impl IntoIterator<Item = EntityRecord>,
    ) -> Result<Self> {
        let mut snapshot = Self::new(name);
        for entity in entities {
            snapshot.add_entity(entity)?;
        }
        Ok(snapshot)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&EntityRecord> {
        self.entries.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate all entities in insertion order
    pub fn entities(&self) -> impl Iterator<Item = &EntityRecord> {
        self.entries.values()
    }

    /// Iterate entities of one kind in insertion order
    pub fn of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &EntityRecord> {
        self.entries.values().filter(move |e| e.kind == kind)
    }

    /// Entity kinds present in this snapshot
    #[must_use]
    pub fn kinds(&self) -> BTreeSet<EntityKind> {
        self.entries.values().map(|e| e.kind).collect()
    }

    /// Order-independent content hash over all entities.
    #[must_use]
    pub fn content_hash(&self) -> u64 {
        let mut ids: Vec<&String> = self.entries.keys().collect();
        ids.sort();

        let mut hasher_input = Vec::new();
        for id in ids {
            if let Some(entity) = self.entries.get(id) {
                if let Ok(json) = serde_json::to_vec(entity) {
                    hasher_input.extend(json);
                }
            }
        }
        xxh3_64(&hasher_input)
    }
}
