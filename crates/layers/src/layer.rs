use std::collections::BTreeMap;

use scene::entity::EntityKind;

/// Sidebar state: open/closed plus one visibility checkbox per layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerPanel {
    sidebar_open: bool,
    visible: BTreeMap<EntityKind, bool>,
}

impl Default for LayerPanel {
    fn default() -> Self {
        Self {
            sidebar_open: false,
            visible: EntityKind::ALL.iter().map(|k| (*k, true)).collect(),
        }
    }
}

impl LayerPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self, kind: EntityKind) -> bool {
        self.visible.get(&kind).copied().unwrap_or(true)
    }

    /// Returns `true` if the checkbox changed.
    pub fn set_visible(&mut self, kind: EntityKind, visible: bool) -> bool {
        let prev = self.visible.insert(kind, visible).unwrap_or(true);
        prev != visible
    }

    pub fn toggle(&mut self, kind: EntityKind) -> bool {
        let next = !self.is_visible(kind);
        self.visible.insert(kind, next);
        next
    }

    pub fn sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    pub fn toggle_sidebar(&mut self) -> bool {
        self.sidebar_open = !self.sidebar_open;
        self.sidebar_open
    }
}
