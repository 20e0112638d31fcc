//! Point placements on a map and the in-memory repository that owns them.

mod clipboard;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{CoordinateConfig, MapPoint};

pub use clipboard::Clipboard;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("placement {id} already exists")]
    Duplicate { id: String },
    #[error("placement {id} not found")]
    NotFound { id: String },
}

pub type PlacementResult<T> = std::result::Result<T, PlacementError>;

/// What a placement points at in the CMS (an NPC, item, landmark, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementPayload {
    pub entity_type: String,
    pub entity_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub id: String,
    pub map_id: String,
    pub position: MapPoint,
    pub payload: PlacementPayload,
    #[serde(default)]
    pub label: Option<String>,
}

impl Placement {
    pub fn new(
        id: impl Into<String>,
        map_id: impl Into<String>,
        position: MapPoint,
        payload: PlacementPayload,
    ) -> Self {
        Self {
            id: id.into(),
            map_id: map_id.into(),
            position,
            payload,
            label: None,
        }
    }
}

/// Moves a placement by a pixel delta. Used by both move and paste.
pub trait CoordinateTransform: Send {
    fn apply_delta(
        &self,
        placement: &Placement,
        delta_x: i32,
        delta_y: i32,
        config: Option<&CoordinateConfig>,
    ) -> Placement;
}

/// Saturating translation, clamped into the map image when its size is known.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClampToImage;

impl CoordinateTransform for ClampToImage {
    fn apply_delta(
        &self,
        placement: &Placement,
        delta_x: i32,
        delta_y: i32,
        config: Option<&CoordinateConfig>,
    ) -> Placement {
        let mut x = placement.position.x.saturating_add(delta_x);
        let mut y = placement.position.y.saturating_add(delta_y);
        if let Some(config) = config {
            let max = config.max_point();
            x = x.clamp(0, max.x.max(0));
            y = y.clamp(0, max.y.max(0));
        }
        Placement {
            position: MapPoint::new(x, y),
            ..placement.clone()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementRepository {
    placements: Vec<Placement>,
}

impl PlacementRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> &[Placement] {
        &self.placements
    }

    pub fn get(&self, id: &str) -> Option<&Placement> {
        self.placements.iter().find(|placement| placement.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn snapshot(&self) -> Vec<Placement> {
        self.placements.clone()
    }

    pub fn add(&mut self, placement: Placement) -> PlacementResult<()> {
        if self.contains(&placement.id) {
            return Err(PlacementError::Duplicate { id: placement.id });
        }
        self.placements.push(placement);
        Ok(())
    }

    /// Returns the replaced version.
    pub fn update(&mut self, placement: Placement) -> PlacementResult<Placement> {
        let slot = self
            .placements
            .iter_mut()
            .find(|existing| existing.id == placement.id)
            .ok_or_else(|| PlacementError::NotFound {
                id: placement.id.clone(),
            })?;
        Ok(std::mem::replace(slot, placement))
    }

    pub fn remove(&mut self, id: &str) -> PlacementResult<Placement> {
        let index = self
            .placements
            .iter()
            .position(|placement| placement.id == id)
            .ok_or_else(|| PlacementError::NotFound { id: id.to_string() })?;
        Ok(self.placements.remove(index))
    }

    pub fn replace_all(&mut self, placements: Vec<Placement>) {
        self.placements = placements;
    }

    /// Applies `transform` to every placement named in `ids`; returns the moved versions.
    pub fn translate(
        &mut self,
        ids: &[String],
        delta_x: i32,
        delta_y: i32,
        transform: &dyn CoordinateTransform,
        config: Option<&CoordinateConfig>,
    ) -> Vec<Placement> {
        let mut moved = Vec::new();
        for placement in &mut self.placements {
            if ids.iter().any(|id| *id == placement.id) {
                *placement = transform.apply_delta(placement, delta_x, delta_y, config);
                moved.push(placement.clone());
            }
        }
        moved
    }
}

#[cfg(test)]
pub(crate) fn test_placement(id: &str, x: i32, y: i32) -> Placement {
    Placement::new(
        id,
        "map-1",
        MapPoint::new(x, y),
        PlacementPayload {
            entity_type: "npc".to_string(),
            entity_id: format!("npc-{id}"),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_rejects_duplicate_ids() {
        let mut repo = PlacementRepository::new();
        repo.add(test_placement("a", 0, 0)).expect("first insert");
        let err = repo
            .add(test_placement("a", 5, 5))
            .expect_err("duplicate should fail");
        assert_eq!(err, PlacementError::Duplicate { id: "a".to_string() });
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn update_and_remove_report_missing_ids() {
        let mut repo = PlacementRepository::new();
        repo.add(test_placement("a", 0, 0)).expect("insert");

        let previous = repo
            .update(test_placement("a", 3, 4))
            .expect("update existing");
        assert_eq!(previous.position, MapPoint::new(0, 0));
        assert_eq!(repo.get("a").map(|p| p.position), Some(MapPoint::new(3, 4)));

        assert!(matches!(
            repo.update(test_placement("b", 0, 0)),
            Err(PlacementError::NotFound { .. })
        ));
        assert!(repo.remove("a").is_ok());
        assert!(repo.remove("a").is_err());
        assert!(repo.is_empty());
    }

    #[test]
    fn clamp_transform_keeps_points_inside_image() {
        let config = CoordinateConfig::new(10.0, 100.0, 80.0);
        let moved = ClampToImage.apply_delta(&test_placement("a", 90, 10), 25, -30, Some(&config));
        assert_eq!(moved.position, MapPoint::new(100, 0));

        let free = ClampToImage.apply_delta(&test_placement("a", 90, 10), 25, -30, None);
        assert_eq!(free.position, MapPoint::new(115, -20));
    }

    #[test]
    fn translate_only_touches_named_placements() {
        let mut repo = PlacementRepository::new();
        repo.add(test_placement("a", 0, 0)).expect("insert a");
        repo.add(test_placement("b", 10, 10)).expect("insert b");

        let moved = repo.translate(&["b".to_string()], 5, 5, &ClampToImage, None);
        assert_eq!(moved.len(), 1);
        assert_eq!(repo.get("a").map(|p| p.position), Some(MapPoint::new(0, 0)));
        assert_eq!(repo.get("b").map(|p| p.position), Some(MapPoint::new(15, 15)));
    }
}
