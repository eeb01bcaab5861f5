use foundation::geo::LonLat;
use foundation::time::Millis;
use layers::Decorator;
use layers::LayerPanel;
use layers::terrain::{TerrainProvider, TerrainSelection, default_chain, select_terrain};
use runtime::{EventBus, kinds};
use scene::World;
use scene::camera::CameraDestination;
use scene::entity::{EntityId, EntityKind, MapEntity, VisualOverride};
use scene::highlight::{HighlightSource, HighlightTracker};
use streaming::{Progression, ProgressionConfig, ProgressionEvent};

use crate::config::{AppConfig, ViewerConfig};
use crate::viewer::{HeadlessViewer, Viewer, ViewerCommand, ViewerError, ViewerQuality};

/// Application state shared by the loader and every UI handler.
///
/// Owns the only viewer handle and the only highlight tracker, so every
/// visual mutation goes through here.
pub struct AppContext {
    pub config: ViewerConfig,
    pub world: World,
    pub layers: LayerPanel,
    pub events: EventBus,
    highlight: HighlightTracker,
    progression: Progression,
    viewer: Box<dyn Viewer>,
    decorator: Decorator,
    terrain: TerrainProvider,
}

impl AppContext {
    /// Boots the application around `viewer`.
    ///
    /// A viewer that failed to construct is replaced by a headless one after
    /// raising a fatal event; a tileset that fails to attach is reported the
    /// same way and loading continues without it.
    pub fn start(
        now: Millis,
        app: &AppConfig,
        viewer: Result<Box<dyn Viewer>, ViewerError>,
    ) -> Self {
        let mut events = EventBus::new();
        let viewer: Box<dyn Viewer> = match viewer {
            Ok(viewer) => viewer,
            Err(e) => {
                tracing::error!(error = %e, "viewer bootstrap failed; continuing headless");
                events.emit(now, kinds::FATAL, format!("Failed to initialize map: {e}"));
                Box::new(HeadlessViewer::new())
            }
        };

        let progression = Progression::new(
            now,
            ProgressionConfig {
                safety_timeout_ms: app.safety_timeout_ms,
                ..ProgressionConfig::default()
            },
        );

        let mut ctx = Self {
            config: ViewerConfig::default(),
            world: World::new(),
            layers: LayerPanel::new(),
            events,
            highlight: HighlightTracker::new(),
            progression,
            viewer,
            decorator: Decorator::new(),
            terrain: TerrainProvider::Ellipsoid,
        };

        let evs = ctx.progression.begin_basic_map();
        ctx.apply_progression(now, evs);

        let chain = default_chain(app.access_token.clone(), app.terrain_url.clone());
        ctx.terrain = match select_terrain(&chain) {
            Ok(TerrainSelection { provider, .. }) => provider,
            Err(e) => {
                tracing::warn!(error = %e, "falling back to ellipsoid terrain");
                TerrainProvider::Ellipsoid
            }
        };
        ctx.viewer.apply(ViewerCommand::SetTerrain {
            provider: ctx.terrain.clone(),
        });

        match ctx.viewer.attach_tileset() {
            Ok(()) => {
                let evs = ctx.progression.attach_tileset(now);
                ctx.viewer.apply(ViewerCommand::SetMaxScreenSpaceError(
                    ctx.progression.max_screen_space_error(),
                ));
                ctx.apply_progression(now, evs);
            }
            Err(e) => {
                tracing::error!(error = %e, "building tileset unavailable");
                ctx.events
                    .emit(now, kinds::FATAL, format!("Failed to load 3D buildings: {e}"));
            }
        }
        ctx
    }

    pub fn viewer(&self) -> &dyn Viewer {
        self.viewer.as_ref()
    }

    pub fn viewer_mut(&mut self) -> &mut dyn Viewer {
        self.viewer.as_mut()
    }

    pub fn terrain(&self) -> &TerrainProvider {
        &self.terrain
    }

    pub fn progression(&self) -> &Progression {
        &self.progression
    }

    pub fn highlighted(&self) -> Option<&EntityId> {
        self.highlight.current().map(|h| &h.entity)
    }

    pub fn highlight_source(&self) -> Option<HighlightSource> {
        self.highlight.current().map(|h| h.source)
    }

    /// Drives progression timers up to `now`.
    pub fn tick(&mut self, now: Millis) {
        let evs = self
            .progression
            .advance(now, &ViewerQuality(self.viewer.as_ref()));
        self.apply_progression(now, evs);
    }

    pub fn begin_data_loading(&mut self, now: Millis) {
        let evs = self.progression.begin_data_loading(now);
        self.apply_progression(now, evs);
    }

    pub fn dataset_loaded(&mut self, done: usize, total: usize) {
        self.progression.dataset_loaded(done, total);
        self.viewer
            .apply(ViewerCommand::Progress(self.progression.progress()));
    }

    pub fn begin_quality_wait(&mut self, now: Millis) {
        let evs = self.progression.begin_quality_wait(now);
        self.apply_progression(now, evs);
    }

    /// Decorates `entities` and replaces every loaded entity of `kind` with
    /// them. Returns how many made it into the world.
    pub fn install(&mut self, kind: EntityKind, mut entities: Vec<MapEntity>) -> usize {
        self.decorator.decorate_all(&mut entities);
        if let Some(id) = self.highlight.clear_kind(&mut self.world, kind) {
            self.viewer.apply(ViewerCommand::SetOverride {
                entity: id,
                style: None,
            });
        }
        let inserted = self.world.replace_kind(kind, entities);
        self.highlight.forget_missing(&self.world);
        let ids = self.world.iter_kind(kind).map(|e| e.id.clone()).collect();
        self.viewer.apply(ViewerCommand::ShowEntities { kind, ids });
        if !self.layers.is_visible(kind) {
            self.viewer.apply(ViewerCommand::SetLayerVisible {
                kind,
                visible: false,
            });
        }
        tracing::info!(%kind, count = inserted, "dataset installed");
        inserted
    }

    /// Campus centre: the first loaded building.
    pub fn home_position(&self) -> Option<LonLat> {
        self.world
            .iter_kind(EntityKind::Building)
            .next()
            .map(|e| e.position)
    }

    /// Flies to the home view. Returns `false` when nothing is loaded yet.
    pub fn fly_home(&mut self) -> bool {
        let Some(center) = self.home_position() else {
            return false;
        };
        self.fly_to(center, self.config.home_altitude_m);
        true
    }

    pub fn fly_to_entity(&mut self, id: &EntityId) -> bool {
        let Some(position) = self.world.get(id).map(|e| e.position) else {
            return false;
        };
        self.fly_to(position, self.config.entity_altitude_m);
        true
    }

    pub fn fly_to(&mut self, target: LonLat, altitude_m: f64) {
        let mut dest = CameraDestination::new(target, altitude_m);
        dest.duration_s = self.config.flight_duration_s;
        self.viewer.apply(ViewerCommand::FlyTo(dest));
    }

    /// Highlights `id`, reverting whatever was highlighted before.
    pub fn highlight(&mut self, id: &EntityId, source: HighlightSource, style: VisualOverride) -> bool {
        if let Some(prev) = self.highlight.highlight(&mut self.world, id, source, style) {
            self.viewer.apply(ViewerCommand::SetOverride {
                entity: prev,
                style: None,
            });
        }
        let applied = self.highlighted() == Some(id);
        if applied {
            self.viewer.apply(ViewerCommand::SetOverride {
                entity: id.clone(),
                style: Some(style),
            });
        }
        applied
    }

    /// Reverts the current highlight; with `source`, only if it came from there.
    pub fn clear_highlight(&mut self, source: Option<HighlightSource>) -> Option<EntityId> {
        let reverted = match source {
            Some(source) => self.highlight.clear_from(&mut self.world, source),
            None => self.highlight.clear(&mut self.world),
        }?;
        self.viewer.apply(ViewerCommand::SetOverride {
            entity: reverted.clone(),
            style: None,
        });
        Some(reverted)
    }

    /// Shows or hides a layer. Hiding the layer that holds the highlight
    /// clears it.
    pub fn set_layer_visible(&mut self, kind: EntityKind, visible: bool) -> bool {
        if !self.layers.set_visible(kind, visible) {
            return false;
        }
        if !visible
            && let Some(id) = self.highlight.clear_kind(&mut self.world, kind)
        {
            self.viewer.apply(ViewerCommand::SetOverride {
                entity: id,
                style: None,
            });
        }
        self.viewer
            .apply(ViewerCommand::SetLayerVisible { kind, visible });
        true
    }

    fn apply_progression(&mut self, now: Millis, evs: Vec<ProgressionEvent>) {
        if evs.is_empty() {
            return;
        }
        for ev in evs {
            match ev {
                ProgressionEvent::StageChanged { to, .. } => {
                    self.events.emit(now, kinds::NOTICE, to.message());
                }
                ProgressionEvent::DetailChanged {
                    max_screen_space_error,
                    ..
                } => {
                    self.viewer
                        .apply(ViewerCommand::SetMaxScreenSpaceError(max_screen_space_error));
                }
                ProgressionEvent::Ready(reason) => {
                    tracing::info!(?reason, %now, "map ready");
                    self.viewer.apply(ViewerCommand::HideLoadingOverlay);
                }
            }
        }
        self.viewer
            .apply(ViewerCommand::Progress(self.progression.progress()));
    }
}
