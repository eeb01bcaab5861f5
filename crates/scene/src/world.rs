use std::collections::{BTreeMap, HashMap};

use crate::entity::{EntityId, EntityKind, MapEntity, VisualOverride};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateEntity(pub EntityId);

impl std::fmt::Display for DuplicateEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "entity {} already loaded", self.0)
    }
}

impl std::error::Error for DuplicateEntity {}

/// Store of every currently loaded map entity.
///
/// Ordering contract:
/// - Iteration yields entities in discovery order: datasets in the order they
///   were loaded, rows in CSV order within a dataset.
/// - Reloading a kind drops its old entities and appends the new ones at the end.
#[derive(Debug, Default)]
pub struct World {
    entities: Vec<MapEntity>,
    index: HashMap<EntityId, usize>,
    overrides: BTreeMap<EntityId, VisualOverride>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity: MapEntity) -> Result<(), DuplicateEntity> {
        if self.index.contains_key(&entity.id) {
            return Err(DuplicateEntity(entity.id));
        }
        self.index.insert(entity.id.clone(), self.entities.len());
        self.entities.push(entity);
        Ok(())
    }

    /// Replaces every entity of `kind` with `entities`.
    ///
    /// Duplicates within `entities` keep the first occurrence. Returns the
    /// number of entities inserted.
    pub fn replace_kind(&mut self, kind: EntityKind, entities: Vec<MapEntity>) -> usize {
        self.remove_kind(kind);
        let mut inserted = 0usize;
        for entity in entities {
            if entity.kind() != kind {
                tracing::warn!(id = %entity.id, %kind, "entity kind mismatch; skipped");
                continue;
            }
            match self.insert(entity) {
                Ok(()) => inserted += 1,
                Err(dup) => tracing::warn!(id = %dup.0, "duplicate entity id; skipped"),
            }
        }
        inserted
    }

    /// Removes every entity of `kind` along with its overrides.
    pub fn remove_kind(&mut self, kind: EntityKind) -> usize {
        let before = self.entities.len();
        self.entities.retain(|e| e.kind() != kind);
        self.overrides.retain(|id, _| id.kind != kind);
        self.rebuild_index();
        before - self.entities.len()
    }

    pub fn get(&self, id: &EntityId) -> Option<&MapEntity> {
        self.index.get(id).and_then(|&i| self.entities.get(i))
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.entities.iter().filter(|e| e.kind() == kind).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MapEntity> {
        self.entities.iter()
    }

    pub fn iter_kind(&self, kind: EntityKind) -> impl Iterator<Item = &MapEntity> {
        self.entities.iter().filter(move |e| e.kind() == kind)
    }

    /// Sets a visual override; ignored for unknown entities.
    pub fn set_override(&mut self, id: &EntityId, ov: VisualOverride) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.overrides.insert(id.clone(), ov);
        true
    }

    pub fn clear_override(&mut self, id: &EntityId) -> Option<VisualOverride> {
        self.overrides.remove(id)
    }

    pub fn visual_override(&self, id: &EntityId) -> Option<VisualOverride> {
        self.overrides.get(id).copied()
    }

    pub fn overrides(&self) -> impl Iterator<Item = (&EntityId, &VisualOverride)> {
        self.overrides.iter()
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (i, e) in self.entities.iter().enumerate() {
            self.index.insert(e.id.clone(), i);
        }
    }
}
