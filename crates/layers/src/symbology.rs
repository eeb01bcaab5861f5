use scene::entity::{EntityKind, Marker, VisualOverride};

pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
pub const BLACK: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
pub const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
pub const YELLOW: [f32; 4] = [1.0, 1.0, 0.0, 1.0];
pub const CYAN: [f32; 4] = [0.0, 1.0, 1.0, 1.0];

/// Visual defaults for every entity of one kind.
#[derive(Debug, Clone, PartialEq)]
pub struct KindStyle {
    pub marker: Marker,
    /// `false` for kinds that only show an icon.
    pub show_label: bool,
    pub font_size_px: f32,
    pub fill_color: [f32; 4],
    pub outline_color: [f32; 4],
    pub outline_width_px: f32,
    pub pixel_offset_y: f32,
    pub max_display_distance_m: f64,
}

impl KindStyle {
    fn labeled(marker: Marker, max_display_distance_m: f64) -> Self {
        Self {
            marker,
            show_label: true,
            font_size_px: 14.0,
            fill_color: WHITE,
            outline_color: BLACK,
            outline_width_px: 2.0,
            pixel_offset_y: -20.0,
            max_display_distance_m,
        }
    }
}

fn icon(name: &str, scale: f32) -> Marker {
    Marker::Icon {
        name: name.to_string(),
        scale,
    }
}

pub fn style_for(kind: EntityKind) -> KindStyle {
    match kind {
        EntityKind::Building => KindStyle::labeled(
            Marker::Point {
                color: RED,
                pixel_size: 10.0,
            },
            5_000.0,
        ),
        EntityKind::ParkingLot => KindStyle::labeled(icon("parking", 0.5), 2_500.0),
        EntityKind::BusStop => KindStyle {
            show_label: false,
            ..KindStyle::labeled(icon("bus", 0.45), 1_500.0)
        },
        EntityKind::Service => KindStyle::labeled(icon("info", 0.45), 2_000.0),
    }
}

/// Applied by click and search selection.
pub const SELECT_HIGHLIGHT: VisualOverride = VisualOverride {
    color: YELLOW,
    scale: 1.5,
    font_size_px: Some(18.0),
};

/// Applied while the pointer rests on an entity.
pub const HOVER_HIGHLIGHT: VisualOverride = VisualOverride {
    color: CYAN,
    scale: 1.25,
    font_size_px: None,
};
