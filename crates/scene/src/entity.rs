use std::collections::BTreeMap;

use foundation::geo::LonLat;
use serde::{Deserialize, Serialize};

/// Dataset an entity came from. Also the unit of layer visibility.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Building,
    ParkingLot,
    BusStop,
    Service,
}

impl EntityKind {
    /// All kinds, in dataset load order.
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Building,
        EntityKind::ParkingLot,
        EntityKind::BusStop,
        EntityKind::Service,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Building => "building",
            EntityKind::ParkingLot => "parkingLot",
            EntityKind::BusStop => "busStop",
            EntityKind::Service => "service",
        }
    }

    /// Human-readable layer name as shown in the sidebar.
    pub fn display_name(self) -> &'static str {
        match self {
            EntityKind::Building => "Buildings",
            EntityKind::ParkingLot => "Parking Lots",
            EntityKind::BusStop => "Bus Stops",
            EntityKind::Service => "Student Services",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of an entity: unique within its kind.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId {
    pub kind: EntityKind,
    pub key: String,
}

impl EntityId {
    pub fn new(kind: EntityKind, key: impl Into<String>) -> Self {
        Self {
            kind,
            key: key.into(),
        }
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.key)
    }
}

/// Searchable text fields.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextField {
    Name,
    Number,
    Description,
    Location,
}

impl TextField {
    pub const ALL: [TextField; 4] = [
        TextField::Name,
        TextField::Number,
        TextField::Description,
        TextField::Location,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TextField::Name => "Name",
            TextField::Number => "Number",
            TextField::Description => "Description",
            TextField::Location => "Location",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum Marker {
    /// Billboard image, referenced by icon name.
    Icon { name: String, scale: f32 },
    /// Plain colored point.
    Point { color: [f32; 4], pixel_size: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelVisual {
    pub text: String,
    pub font_size_px: f32,
    pub fill_color: [f32; 4],
    pub outline_color: [f32; 4],
    pub outline_width_px: f32,
    /// Vertical pixel offset above the marker.
    pub pixel_offset_y: f32,
    /// Camera distance beyond which the label is not drawn.
    pub max_display_distance_m: f64,
}

/// How an entity is drawn and what its info popup shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visual {
    pub marker: Marker,
    pub label: Option<LabelVisual>,
    /// HTML body of the info popup.
    pub description: String,
}

impl Visual {
    /// Placeholder used between adaptation and decoration.
    pub fn undecorated() -> Self {
        Self {
            marker: Marker::Point {
                color: [1.0, 1.0, 1.0, 1.0],
                pixel_size: 8.0,
            },
            label: None,
            description: String::new(),
        }
    }
}

/// Temporary visual change applied on top of an entity's base [`Visual`].
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualOverride {
    pub color: [f32; 4],
    pub scale: f32,
    /// Font size replacing the label's base size, e.g. from LOD scaling.
    pub font_size_px: Option<f32>,
}

/// A positioned, styled map object.
///
/// Immutable after creation except for overrides, which live in the
/// [`crate::World`] rather than on the entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapEntity {
    pub id: EntityId,
    pub name: String,
    pub position: LonLat,
    pub text_fields: BTreeMap<TextField, String>,
    pub visual: Visual,
    pub extra: BTreeMap<String, String>,
}

impl MapEntity {
    pub fn new(id: EntityId, name: impl Into<String>, position: LonLat) -> Self {
        let name = name.into();
        let mut text_fields = BTreeMap::new();
        if !name.trim().is_empty() {
            text_fields.insert(TextField::Name, name.clone());
        }
        Self {
            id,
            name,
            position,
            text_fields,
            visual: Visual::undecorated(),
            extra: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.id.kind
    }

    /// Sets a text field; blank values are ignored.
    pub fn with_text(mut self, field: TextField, value: impl Into<String>) -> Self {
        let value = value.into();
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            self.text_fields.insert(field, trimmed.to_string());
        }
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn text(&self, field: TextField) -> Option<&str> {
        self.text_fields.get(&field).map(|s| s.as_str())
    }
}
