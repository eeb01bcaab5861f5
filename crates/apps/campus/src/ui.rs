use foundation::geo::LonLat;
use foundation::time::Millis;
use layers::labels::label_updates;
use layers::symbology::{HOVER_HIGHLIGHT, SELECT_HIGHLIGHT};
use runtime::kinds;
use scene::entity::{EntityId, EntityKind};
use scene::highlight::HighlightSource;
use search::{KeyOutcome, SearchBox, SearchKey, SearchOptions, SearchResult};

use crate::context::AppContext;
use crate::tracking::{FixOutcome, GeolocationError, LocationTracker};
use crate::viewer::{Viewer, ViewerCommand};

pub const NOT_FOUND_ALERT: &str = "Location not found";

/// Event handlers for every on-screen control.
///
/// Handlers are thin: they translate input into calls on [`AppContext`]
/// and the search box. Time is passed in explicitly.
#[derive(Debug)]
pub struct UiController {
    search: SearchBox,
    tracker: LocationTracker,
}

impl UiController {
    pub fn new(search_debounce_ms: u64) -> Self {
        Self {
            search: SearchBox::new(search_debounce_ms, SearchOptions::default()),
            tracker: LocationTracker::new(),
        }
    }

    pub fn search(&self) -> &SearchBox {
        &self.search
    }

    pub fn tracker(&self) -> &LocationTracker {
        &self.tracker
    }

    /// Search box keystroke.
    pub fn search_input(&mut self, now: Millis, text: &str) {
        self.search.input(now, text);
    }

    /// Fires due timers: the debounced search and the loading progression.
    ///
    /// Returns the result count when a search ran.
    pub fn tick(&mut self, ctx: &mut AppContext, now: Millis) -> Option<usize> {
        let ran = self.search.poll(now, ctx.world.iter());
        ctx.tick(now);
        ran
    }

    /// Earliest pending timer across the search box and the loading progression.
    pub fn next_deadline(&self, ctx: &AppContext) -> Option<Millis> {
        [self.search.pending_deadline(), ctx.progression().next_deadline()]
            .into_iter()
            .flatten()
            .min()
    }

    pub fn search_key(&mut self, ctx: &mut AppContext, key: SearchKey) -> KeyOutcome {
        let outcome = self.search.key(key);
        if let KeyOutcome::Selected(result) = &outcome {
            select_result(ctx, result);
        }
        outcome
    }

    /// Click on a row of the result panel.
    pub fn choose_result(&mut self, ctx: &mut AppContext, index: usize) -> KeyOutcome {
        let outcome = self.search.choose(index);
        if let KeyOutcome::Selected(result) = &outcome {
            select_result(ctx, result);
        }
        outcome
    }

    /// Search button: runs the query now and jumps to the best match.
    pub fn search_button(&mut self, ctx: &mut AppContext, now: Millis) -> Option<SearchResult> {
        if self.search.query().trim().is_empty() {
            return None;
        }
        let Some(top) = self.search.search_now(ctx.world.iter()).first().cloned() else {
            ctx.events.emit(now, kinds::ALERT, NOT_FOUND_ALERT);
            return None;
        };
        select_result(ctx, &top);
        Some(top)
    }

    pub fn home_button(&mut self, ctx: &mut AppContext) -> bool {
        ctx.fly_home()
    }

    pub fn toggle_sidebar(&mut self, ctx: &mut AppContext) -> bool {
        ctx.layers.toggle_sidebar()
    }

    /// Layer checkbox. Returns the new visibility.
    pub fn toggle_layer(&mut self, ctx: &mut AppContext, kind: EntityKind) -> bool {
        let visible = !ctx.layers.is_visible(kind);
        ctx.set_layer_visible(kind, visible);
        visible
    }

    /// Left click on the globe; `None` is a click on empty space.
    pub fn click(&mut self, ctx: &mut AppContext, picked: Option<&EntityId>) {
        match picked {
            Some(id) => {
                ctx.highlight(id, HighlightSource::Click, SELECT_HIGHLIGHT);
            }
            None => {
                ctx.clear_highlight(None);
            }
        }
    }

    /// Pointer moved; `None` when it left every entity.
    pub fn hover(&mut self, ctx: &mut AppContext, picked: Option<&EntityId>) {
        match picked {
            Some(id) if ctx.highlighted() == Some(id) => {}
            Some(id) => {
                ctx.highlight(id, HighlightSource::Hover, HOVER_HIGHLIGHT);
            }
            None => {
                ctx.clear_highlight(Some(HighlightSource::Hover));
            }
        }
    }

    /// Camera stopped moving: rescale labels for the new height.
    pub fn camera_moved(&mut self, ctx: &mut AppContext) -> usize {
        let height = ctx.viewer().camera_height_m();
        let updates = label_updates(&ctx.world, &ctx.config.label_lod, height);
        let n = updates.len();
        for u in updates {
            ctx.viewer_mut().apply(ViewerCommand::SetLabelSize {
                entity: u.entity,
                font_size_px: u.font_size_px,
            });
        }
        n
    }

    /// Tracking button. Returns whether a watch is now active.
    pub fn toggle_tracking(&mut self, ctx: &mut AppContext) -> bool {
        let watching = self.tracker.toggle();
        if !watching {
            ctx.viewer_mut().apply(ViewerCommand::RemoveUserMarker);
        }
        watching
    }

    /// Geolocation watch callback.
    pub fn location_update(
        &mut self,
        ctx: &mut AppContext,
        now: Millis,
        update: Result<LonLat, GeolocationError>,
    ) {
        match update {
            Ok(position) => match self.tracker.on_fix(position) {
                FixOutcome::Ignored => {}
                FixOutcome::First(p) => {
                    ctx.viewer_mut().apply(ViewerCommand::PlaceUserMarker(p));
                    ctx.fly_to(p, ctx.config.entity_altitude_m);
                }
                FixOutcome::Moved(p) => {
                    ctx.viewer_mut().apply(ViewerCommand::PlaceUserMarker(p));
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "geolocation failed");
                ctx.events
                    .emit(now, kinds::ALERT, format!("Unable to get your location: {e}"));
                if self.tracker.is_watching() {
                    ctx.viewer_mut().apply(ViewerCommand::RemoveUserMarker);
                }
                self.tracker.reset();
            }
        }
    }
}

impl Default for UiController {
    fn default() -> Self {
        Self::new(search::DEFAULT_DEBOUNCE_MS)
    }
}

fn select_result(ctx: &mut AppContext, result: &SearchResult) {
    let id = &result.entity.id;
    ctx.highlight(id, HighlightSource::Search, SELECT_HIGHLIGHT);
    ctx.fly_to_entity(id);
}

#[cfg(test)]
mod tests {
    use super::{NOT_FOUND_ALERT, UiController};
    use crate::config::AppConfig;
    use crate::context::AppContext;
    use crate::tracking::GeolocationError;
    use crate::viewer::{HeadlessViewer, Viewer};
    use formats::seed::SEED_BUILDINGS_CSV;
    use formats::{BUILDINGS, adapt_rows, parse_rows};
    use foundation::geo::LonLat;
    use foundation::time::Millis;
    use pretty_assertions::assert_eq;
    use runtime::kinds;
    use scene::entity::{EntityId, EntityKind};
    use scene::highlight::HighlightSource;
    use search::{KeyOutcome, SearchKey};

    fn loaded() -> (AppContext, UiController) {
        let mut ctx = AppContext::start(
            Millis::ZERO,
            &AppConfig::default(),
            Ok(Box::new(HeadlessViewer::new())),
        );
        let rows = parse_rows(SEED_BUILDINGS_CSV).unwrap();
        ctx.install(EntityKind::Building, adapt_rows(&BUILDINGS, &rows).entities);
        (ctx, UiController::default())
    }

    fn names(ui: &UiController) -> Vec<String> {
        ui.search()
            .results()
            .iter()
            .map(|r| r.entity.name.clone())
            .collect()
    }

    #[test]
    fn typing_searches_after_debounce() {
        let (mut ctx, mut ui) = loaded();
        ui.search_input(Millis(0), "s");
        ui.search_input(Millis(100), "sc");
        ui.search_input(Millis(200), "sci");
        assert_eq!(ui.next_deadline(&ctx), Some(Millis(500)));
        assert_eq!(ui.tick(&mut ctx, Millis(499)), None);
        assert_eq!(ui.tick(&mut ctx, Millis(500)), Some(2));
        // Only the detail refinement timer is left.
        assert_eq!(ui.next_deadline(&ctx), Some(Millis(2_000)));
        // Substring beats subsequence.
        assert_eq!(names(&ui), vec!["Science Center", "Student Center"]);
        assert_eq!(ui.search().results()[0].score, 1.0);
        assert_eq!(ui.search().results()[1].score, 0.5);
        assert!(ui.search().panel_visible());
    }

    #[test]
    fn keyboard_enter_selects_first_and_flies() {
        let (mut ctx, mut ui) = loaded();
        ui.search_input(Millis(0), "library");
        ui.tick(&mut ctx, Millis(300));
        let KeyOutcome::Selected(r) = ui.search_key(&mut ctx, SearchKey::Enter) else {
            panic!("expected a selection");
        };
        assert_eq!(r.entity.name, "Library");
        assert_eq!(ctx.highlight_source(), Some(HighlightSource::Search));
        assert_eq!(ctx.viewer().camera_height_m(), 500.0);
        assert!(!ui.search().panel_visible());
        assert_eq!(ui.search().query(), "library");
    }

    #[test]
    fn escape_hides_panel_but_keeps_query() {
        let (mut ctx, mut ui) = loaded();
        ui.search_input(Millis(0), "center");
        ui.tick(&mut ctx, Millis(300));
        assert_eq!(ui.search_key(&mut ctx, SearchKey::Escape), KeyOutcome::PanelHidden);
        assert!(!ui.search().panel_visible());
        assert_eq!(ui.search().query(), "center");
    }

    #[test]
    fn search_button_alerts_when_nothing_matches() {
        let (mut ctx, mut ui) = loaded();
        ui.search_input(Millis(0), "zzz");
        assert_eq!(ui.search_button(&mut ctx, Millis(10)), None);
        let alerts: Vec<_> = ctx.events.of_kind(kinds::ALERT).collect();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].message, NOT_FOUND_ALERT);

        ui.search_input(Millis(20), "main");
        let top = ui.search_button(&mut ctx, Millis(30)).unwrap();
        assert_eq!(top.entity.name, "Main Building");
        // Immediate search leaves no pending timer.
        assert_eq!(ui.search().pending_deadline(), None);
    }

    #[test]
    fn hover_out_keeps_click_highlight() {
        let (mut ctx, mut ui) = loaded();
        let library = EntityId::new(EntityKind::Building, "Library");
        let main_building = EntityId::new(EntityKind::Building, "Main Building");

        ui.click(&mut ctx, Some(&library));
        ui.hover(&mut ctx, None);
        assert_eq!(ctx.highlighted(), Some(&library));

        ui.hover(&mut ctx, Some(&main_building));
        assert_eq!(ctx.highlighted(), Some(&main_building));
        assert_eq!(ctx.world.visual_override(&library), None);
        ui.hover(&mut ctx, None);
        assert_eq!(ctx.highlighted(), None);

        ui.click(&mut ctx, Some(&library));
        ui.click(&mut ctx, None);
        assert_eq!(ctx.world.overrides().count(), 0);
    }

    #[test]
    fn labels_shrink_with_height() {
        let (mut ctx, mut ui) = loaded();
        ctx.fly_to(LonLat::new(-118.14, 34.05).unwrap(), 200.0);
        assert_eq!(ui.camera_moved(&mut ctx), 4);
        ctx.fly_to(LonLat::new(-118.14, 34.05).unwrap(), 3_000.0);
        assert_eq!(ui.camera_moved(&mut ctx), 4);
    }

    #[test]
    fn layer_toggle_round_trip() {
        let (mut ctx, mut ui) = loaded();
        assert!(!ui.toggle_layer(&mut ctx, EntityKind::Building));
        assert!(!ctx.layers.is_visible(EntityKind::Building));
        assert!(ui.toggle_layer(&mut ctx, EntityKind::Building));
        assert!(ui.toggle_sidebar(&mut ctx));
        assert!(ui.home_button(&mut ctx));
    }

    #[test]
    fn geolocation_error_alerts_and_resets() {
        let (mut ctx, mut ui) = loaded();
        assert!(ui.toggle_tracking(&mut ctx));
        let here = LonLat::new(-118.1430, 34.0520).unwrap();
        ui.location_update(&mut ctx, Millis(5), Ok(here));
        assert_eq!(ui.tracker().last_fix(), Some(here));
        assert_eq!(ctx.viewer().camera_height_m(), 500.0);

        ui.location_update(&mut ctx, Millis(6), Err(GeolocationError::PermissionDenied));
        assert!(!ui.tracker().is_watching());
        assert_eq!(ctx.events.of_kind(kinds::ALERT).count(), 1);
    }
}
