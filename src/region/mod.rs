//! Square map regions, the mandatory base region, and the hierarchy that
//! tracks selection and visibility over them.
//!
//! Regions nest through `parent_region_id`; unset environment properties are
//! resolved along that chain by [`inheritance`]. Geometry checks used when a
//! cell selection is turned into a region live in [`validation`].

mod hierarchy;
pub mod inheritance;
pub mod validation;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{CellBounds, Color, CoordinateConfig};

pub use hierarchy::RegionHierarchy;
pub use inheritance::{resolve_environment, MapEnvironment, PropertySource, ResolvedEnvironment};

pub const BASE_REGION_NAME: &str = "Base Region";

const REGION_COLOR_SATURATION: f64 = 0.65;
const REGION_COLOR_LIGHTNESS: f64 = 0.55;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionError {
    #[error("no coordinate config available for map {map_id}")]
    MissingCoordinateConfig { map_id: String },
    #[error("coordinate config for map {map_id} produces an empty grid")]
    EmptyGrid { map_id: String },
    #[error("no cell selection to turn into a region")]
    NoSelection,
    #[error("region must be square, got {width}x{height}")]
    NotSquare { width: u32, height: u32 },
    #[error("region {bounds:?} lies outside the {columns}x{rows} grid")]
    OutsideGrid {
        bounds: CellBounds,
        columns: u32,
        rows: u32,
    },
    #[error("parent region {parent_id} not found on map {map_id}")]
    UnknownParent { parent_id: String, map_id: String },
    #[error("region {id} not found")]
    NotFound { id: String },
    #[error("region {id} already exists")]
    AlreadyExists { id: String },
    #[error("base region {id} must keep covering the whole grid")]
    BaseRegionGeometry { id: String },
    #[error("cannot add {id} as a base region: map already has base region {base_id}")]
    BaseRegionExists { id: String, base_id: String },
    #[error("region {id} cannot gain or lose the base region name")]
    BaseRegionRenamed { id: String },
    #[error("region {id} belongs to map {region_map_id}, not {map_id}")]
    WrongMap {
        id: String,
        region_map_id: String,
        map_id: String,
    },
}

pub type RegionResult<T> = std::result::Result<T, RegionError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionStats {
    pub completed: u32,
    pub total: u32,
}

/// Optional per-region overrides. `None` means "inherit".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biome: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub climate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub danger_level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creatures: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion: Option<CompletionStats>,
}

impl RegionMetadata {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub id: String,
    pub map_id: String,
    #[serde(default)]
    pub parent_region_id: Option<String>,
    pub name: String,
    pub min_x: i32,
    pub min_y: i32,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub environment_id: Option<String>,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub metadata: RegionMetadata,
}

impl Region {
    pub fn new(
        id: impl Into<String>,
        map_id: impl Into<String>,
        name: impl Into<String>,
        min_x: i32,
        min_y: i32,
        size: u32,
    ) -> Self {
        let id = id.into();
        let color = region_color(&id);
        Self {
            id,
            map_id: map_id.into(),
            parent_region_id: None,
            name: name.into(),
            min_x,
            min_y,
            width: size,
            height: size,
            environment_id: None,
            color,
            metadata: RegionMetadata::default(),
        }
    }

    pub fn with_parent(mut self, parent_region_id: impl Into<String>) -> Self {
        self.parent_region_id = Some(parent_region_id.into());
        self
    }

    pub fn with_metadata(mut self, metadata: RegionMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn is_base(&self) -> bool {
        self.name == BASE_REGION_NAME
    }

    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    /// Inclusive cell bounds of the region's square.
    pub fn bounds(&self) -> CellBounds {
        CellBounds::square(self.min_x, self.min_y, self.width)
    }

    /// Recomputes `color` from the id so it is stable across reloads.
    pub(crate) fn normalize_color(&mut self) {
        self.color = region_color(&self.id);
    }
}

/// Deterministic display color for a region id.
pub fn region_color(id: &str) -> String {
    let hue = (fnv1a(id.as_bytes()) % 360) as f64;
    Color::from_hsl(hue, REGION_COLOR_SATURATION, REGION_COLOR_LIGHTNESS).to_hex()
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes.iter().fold(OFFSET, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(PRIME)
    })
}

/// Builds the base region covering the whole grid of `map_id`.
///
/// The grid may be wider than tall (or the reverse); the square takes the
/// longer side so every cell is covered.
pub fn synthesize_base_region(
    map_id: &str,
    config: Option<&CoordinateConfig>,
) -> RegionResult<Region> {
    let config = config.ok_or_else(|| RegionError::MissingCoordinateConfig {
        map_id: map_id.to_string(),
    })?;
    let grid = config.grid_size().ok_or_else(|| RegionError::EmptyGrid {
        map_id: map_id.to_string(),
    })?;
    let id = format!("region-{}", uuid::Uuid::new_v4());
    Ok(Region::new(
        id,
        map_id,
        BASE_REGION_NAME,
        0,
        0,
        grid.square_side(),
    ))
}
