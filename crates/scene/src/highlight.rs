use crate::World;
use crate::entity::{EntityId, EntityKind, VisualOverride};

/// Which interaction produced the current highlight.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HighlightSource {
    Click,
    Hover,
    Search,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Highlight {
    pub entity: EntityId,
    pub source: HighlightSource,
}

/// The single "currently highlighted entity" shared by every interaction.
///
/// Every mutator reverts the previous highlight before applying its own, so
/// at most one entity carries a highlight override at any time.
#[derive(Debug, Default)]
pub struct HighlightTracker {
    current: Option<Highlight>,
}

impl HighlightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&Highlight> {
        self.current.as_ref()
    }

    /// Highlights `entity`, reverting any previous highlight first.
    ///
    /// Returns the entity whose highlight was reverted, if any. Unknown
    /// entities leave the tracker cleared.
    pub fn highlight(
        &mut self,
        world: &mut World,
        entity: &EntityId,
        source: HighlightSource,
        style: VisualOverride,
    ) -> Option<EntityId> {
        let reverted = self.clear(world);
        if world.set_override(entity, style) {
            self.current = Some(Highlight {
                entity: entity.clone(),
                source,
            });
        }
        reverted
    }

    /// Reverts the current highlight, whatever its source.
    pub fn clear(&mut self, world: &mut World) -> Option<EntityId> {
        let prev = self.current.take()?;
        world.clear_override(&prev.entity);
        Some(prev.entity)
    }

    /// Reverts the current highlight only if it came from `source`.
    pub fn clear_from(&mut self, world: &mut World, source: HighlightSource) -> Option<EntityId> {
        match &self.current {
            Some(h) if h.source == source => self.clear(world),
            _ => None,
        }
    }

    /// Reverts the current highlight if it belongs to `kind`.
    pub fn clear_kind(&mut self, world: &mut World, kind: EntityKind) -> Option<EntityId> {
        match &self.current {
            Some(h) if h.entity.kind == kind => self.clear(world),
            _ => None,
        }
    }

    /// Forgets a highlight whose entity has been removed from the world.
    pub fn forget_missing(&mut self, world: &World) {
        if let Some(h) = &self.current
            && !world.contains(&h.entity)
        {
            self.current = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{HighlightSource, HighlightTracker};
    use crate::World;
    use crate::entity::{EntityId, EntityKind, MapEntity, VisualOverride};
    use foundation::geo::LonLat;

    const STYLE: VisualOverride = VisualOverride {
        color: [1.0, 1.0, 0.0, 1.0],
        scale: 1.4,
        font_size_px: None,
    };

    fn world_with(keys: &[&str]) -> World {
        let mut w = World::new();
        for k in keys {
            w.insert(MapEntity::new(
                EntityId::new(EntityKind::Building, *k),
                *k,
                LonLat::new(0.0, 0.0).unwrap(),
            ))
            .unwrap();
        }
        w
    }

    fn id(k: &str) -> EntityId {
        EntityId::new(EntityKind::Building, k)
    }

    #[test]
    fn new_highlight_reverts_previous() {
        let mut w = world_with(&["a", "b"]);
        let mut h = HighlightTracker::new();
        assert_eq!(h.highlight(&mut w, &id("a"), HighlightSource::Click, STYLE), None);
        let reverted = h.highlight(&mut w, &id("b"), HighlightSource::Hover, STYLE);
        assert_eq!(reverted, Some(id("a")));
        assert!(w.visual_override(&id("a")).is_none());
        assert!(w.visual_override(&id("b")).is_some());
        assert_eq!(w.overrides().count(), 1);
    }

    #[test]
    fn hover_out_does_not_clear_click_highlight() {
        let mut w = world_with(&["a"]);
        let mut h = HighlightTracker::new();
        h.highlight(&mut w, &id("a"), HighlightSource::Click, STYLE);
        assert_eq!(h.clear_from(&mut w, HighlightSource::Hover), None);
        assert!(w.visual_override(&id("a")).is_some());
        assert_eq!(h.clear_from(&mut w, HighlightSource::Click), Some(id("a")));
        assert!(h.current().is_none());
    }

    #[test]
    fn unknown_entity_leaves_tracker_cleared() {
        let mut w = world_with(&["a"]);
        let mut h = HighlightTracker::new();
        h.highlight(&mut w, &id("a"), HighlightSource::Search, STYLE);
        h.highlight(&mut w, &id("zzz"), HighlightSource::Search, STYLE);
        assert!(h.current().is_none());
        assert_eq!(w.overrides().count(), 0);
    }

    #[test]
    fn forget_missing_after_reload() {
        let mut w = world_with(&["a"]);
        let mut h = HighlightTracker::new();
        h.highlight(&mut w, &id("a"), HighlightSource::Click, STYLE);
        w.remove_kind(EntityKind::Building);
        h.forget_missing(&w);
        assert!(h.current().is_none());
    }
}
