use scene::World;
use scene::entity::EntityId;

/// Level-of-detail rules for label font size by camera height.
///
/// Full size at or below `near_height_m`, `min_scale` at or above
/// `far_height_m`, linear in between. Labels are hidden once the camera is
/// higher than their own display distance.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LabelLod {
    pub near_height_m: f64,
    pub far_height_m: f64,
    pub min_scale: f32,
}

impl Default for LabelLod {
    fn default() -> Self {
        Self {
            near_height_m: 300.0,
            far_height_m: 3_000.0,
            min_scale: 0.6,
        }
    }
}

impl LabelLod {
    pub fn scale_for_height(&self, camera_height_m: f64) -> f32 {
        if camera_height_m <= self.near_height_m {
            return 1.0;
        }
        if camera_height_m >= self.far_height_m || self.far_height_m <= self.near_height_m {
            return self.min_scale;
        }
        let t = (camera_height_m - self.near_height_m) / (self.far_height_m - self.near_height_m);
        1.0 - (1.0 - self.min_scale) * t as f32
    }

    pub fn font_size(&self, base_px: f32, camera_height_m: f64) -> f32 {
        (base_px * self.scale_for_height(camera_height_m)).round().max(1.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelUpdate {
    pub entity: EntityId,
    /// `None` hides the label.
    pub font_size_px: Option<f32>,
}

/// Computes label sizes for every labeled entity at the given camera height.
///
/// A highlight override's font size wins over the LOD size.
pub fn label_updates(world: &World, lod: &LabelLod, camera_height_m: f64) -> Vec<LabelUpdate> {
    let mut out = Vec::new();
    for entity in world.iter() {
        let Some(label) = &entity.visual.label else {
            continue;
        };
        let font_size_px = if camera_height_m > label.max_display_distance_m {
            None
        } else if let Some(size) = world
            .visual_override(&entity.id)
            .and_then(|ov| ov.font_size_px)
        {
            Some(size)
        } else {
            Some(lod.font_size(label.font_size_px, camera_height_m))
        };
        out.push(LabelUpdate {
            entity: entity.id.clone(),
            font_size_px,
        });
    }
    out
}
