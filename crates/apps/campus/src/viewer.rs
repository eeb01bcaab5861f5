use foundation::geo::LonLat;
use layers::terrain::TerrainProvider;
use scene::camera::CameraDestination;
use scene::entity::{EntityId, EntityKind, VisualOverride};
use streaming::{LoadProgress, QualityProbe};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerError {
    /// The renderer itself could not be constructed.
    Init(String),
    /// A hosted asset (e.g. the building tileset) failed to load.
    Asset(String),
}

impl std::fmt::Display for ViewerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewerError::Init(msg) => write!(f, "viewer initialization failed: {msg}"),
            ViewerError::Asset(msg) => write!(f, "asset failed to load: {msg}"),
        }
    }
}

impl std::error::Error for ViewerError {}

/// Everything the application asks of the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerCommand {
    SetTerrain { provider: TerrainProvider },
    FlyTo(CameraDestination),
    /// Entities of `kind` were (re)loaded; the renderer draws them from the world.
    ShowEntities { kind: EntityKind, ids: Vec<EntityId> },
    SetLayerVisible { kind: EntityKind, visible: bool },
    /// `None` restores the decorated look.
    SetOverride {
        entity: EntityId,
        style: Option<VisualOverride>,
    },
    /// `None` hides the label.
    SetLabelSize {
        entity: EntityId,
        font_size_px: Option<f32>,
    },
    SetMaxScreenSpaceError(f64),
    Progress(LoadProgress),
    HideLoadingOverlay,
    PlaceUserMarker(LonLat),
    RemoveUserMarker,
}

/// The rendering engine seam.
pub trait Viewer {
    /// Attaches the building tileset at the current detail level.
    fn attach_tileset(&mut self) -> Result<(), ViewerError>;

    fn apply(&mut self, command: ViewerCommand);

    fn camera_height_m(&self) -> f64;

    /// See [`QualityProbe::screen_space_error`].
    fn screen_space_error(&self) -> Option<f64>;
}

/// Borrows a viewer as a quality probe for the progression controller.
pub struct ViewerQuality<'a>(pub &'a dyn Viewer);

impl QualityProbe for ViewerQuality<'_> {
    fn screen_space_error(&self) -> Option<f64> {
        self.0.screen_space_error()
    }
}

/// Renderer stand-in that records commands.
///
/// Tiles refine instantly: its reported screen-space error is whatever
/// maximum it was last told to use.
#[derive(Debug, Default)]
pub struct HeadlessViewer {
    commands: Vec<ViewerCommand>,
    tileset_attached: bool,
    fail_tileset: Option<String>,
    max_screen_space_error: Option<f64>,
    camera_height_m: f64,
    /// Overrides the reported screen-space error when set.
    stuck_error: Option<f64>,
}

impl HeadlessViewer {
    pub fn new() -> Self {
        Self {
            camera_height_m: 20_000_000.0,
            ..Self::default()
        }
    }

    /// Tileset attach will fail with `reason`.
    pub fn with_tileset_failure(mut self, reason: impl Into<String>) -> Self {
        self.fail_tileset = Some(reason.into());
        self
    }

    /// Reported screen-space error never drops below `error`.
    pub fn with_stuck_error(mut self, error: f64) -> Self {
        self.stuck_error = Some(error);
        self
    }

    pub fn commands(&self) -> &[ViewerCommand] {
        &self.commands
    }
}

impl Viewer for HeadlessViewer {
    fn attach_tileset(&mut self) -> Result<(), ViewerError> {
        if let Some(reason) = &self.fail_tileset {
            return Err(ViewerError::Asset(reason.clone()));
        }
        self.tileset_attached = true;
        Ok(())
    }

    fn apply(&mut self, command: ViewerCommand) {
        match &command {
            ViewerCommand::FlyTo(dest) => self.camera_height_m = dest.altitude_m,
            ViewerCommand::SetMaxScreenSpaceError(e) => self.max_screen_space_error = Some(*e),
            _ => {}
        }
        self.commands.push(command);
    }

    fn camera_height_m(&self) -> f64 {
        self.camera_height_m
    }

    fn screen_space_error(&self) -> Option<f64> {
        if !self.tileset_attached {
            return None;
        }
        match (self.stuck_error, self.max_screen_space_error) {
            (Some(stuck), Some(max)) => Some(stuck.max(max)),
            (Some(stuck), None) => Some(stuck),
            (None, max) => max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{HeadlessViewer, Viewer, ViewerCommand, ViewerError};
    use foundation::geo::LonLat;
    use scene::camera::CameraDestination;

    #[test]
    fn fly_to_moves_camera() {
        let mut v = HeadlessViewer::new();
        let target = LonLat::new(-117.0, 32.8).unwrap();
        v.apply(ViewerCommand::FlyTo(CameraDestination::new(target, 500.0)));
        assert_eq!(v.camera_height_m(), 500.0);
        assert_eq!(v.commands().len(), 1);
    }

    #[test]
    fn error_tracks_requested_detail_once_attached() {
        let mut v = HeadlessViewer::new();
        v.apply(ViewerCommand::SetMaxScreenSpaceError(16.0));
        assert_eq!(v.screen_space_error(), None);
        v.attach_tileset().unwrap();
        assert_eq!(v.screen_space_error(), Some(16.0));
        v.apply(ViewerCommand::SetMaxScreenSpaceError(2.0));
        assert_eq!(v.screen_space_error(), Some(2.0));
    }

    #[test]
    fn stuck_error_never_refines() {
        let mut v = HeadlessViewer::new().with_stuck_error(12.0);
        v.attach_tileset().unwrap();
        v.apply(ViewerCommand::SetMaxScreenSpaceError(2.0));
        assert_eq!(v.screen_space_error(), Some(12.0));
    }

    #[test]
    fn tileset_failure_is_reported() {
        let mut v = HeadlessViewer::new().with_tileset_failure("404");
        assert_eq!(v.attach_tileset(), Err(ViewerError::Asset("404".into())));
        assert_eq!(v.screen_space_error(), None);
    }
}
