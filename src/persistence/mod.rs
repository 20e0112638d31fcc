//! Boundary to the CMS that stores regions and placements.

use std::collections::HashMap;
use std::sync::Mutex;

use thiserror::Error;

use crate::placement::Placement;
use crate::region::Region;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    #[error("map {map_id} not found")]
    MapNotFound { map_id: String },
    #[error("region {id} already exists")]
    RegionExists { id: String },
    #[error("region {id} not found")]
    RegionNotFound { id: String },
    #[error("backend unavailable: {message}")]
    Unavailable { message: String },
    #[error("backend rejected {operation}: {message}")]
    Rejected {
        operation: &'static str,
        message: String,
    },
}

pub type PersistenceResult<T> = std::result::Result<T, PersistenceError>;

/// Called from a background worker thread, hence `Send + Sync`.
pub trait PersistenceAdapter: Send + Sync {
    fn list_regions(&self, map_id: &str) -> PersistenceResult<Vec<Region>>;
    fn create_region(&self, region: &Region) -> PersistenceResult<()>;
    fn update_region(&self, region: &Region) -> PersistenceResult<()>;
    fn list_placements(&self, map_id: &str) -> PersistenceResult<Vec<Placement>>;
}

#[derive(Debug, Default)]
struct InMemoryState {
    regions: HashMap<String, Vec<Region>>,
    placements: HashMap<String, Vec<Placement>>,
}

/// Process-local adapter used by the headless binary and tests.
#[derive(Debug, Default)]
pub struct InMemoryAdapter {
    state: Mutex<InMemoryState>,
}

impl InMemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_placements(mut self, map_id: &str, placements: Vec<Placement>) -> Self {
        if let Ok(state) = self.state.get_mut() {
            state.placements.insert(map_id.to_string(), placements);
        }
        self
    }

    fn with_state<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&mut InMemoryState) -> PersistenceResult<T>,
    ) -> PersistenceResult<T> {
        let mut state = self.state.lock().map_err(|_| PersistenceError::Unavailable {
            message: format!("{operation}: in-memory state poisoned"),
        })?;
        f(&mut state)
    }
}

impl PersistenceAdapter for InMemoryAdapter {
    fn list_regions(&self, map_id: &str) -> PersistenceResult<Vec<Region>> {
        self.with_state("list regions", |state| {
            Ok(state.regions.get(map_id).cloned().unwrap_or_default())
        })
    }

    fn create_region(&self, region: &Region) -> PersistenceResult<()> {
        self.with_state("create region", |state| {
            let regions = state.regions.entry(region.map_id.clone()).or_default();
            if regions.iter().any(|existing| existing.id == region.id) {
                return Err(PersistenceError::RegionExists {
                    id: region.id.clone(),
                });
            }
            regions.push(region.clone());
            Ok(())
        })
    }

    fn update_region(&self, region: &Region) -> PersistenceResult<()> {
        self.with_state("update region", |state| {
            let slot = state
                .regions
                .get_mut(&region.map_id)
                .and_then(|regions| regions.iter_mut().find(|existing| existing.id == region.id))
                .ok_or_else(|| PersistenceError::RegionNotFound {
                    id: region.id.clone(),
                })?;
            *slot = region.clone();
            Ok(())
        })
    }

    fn list_placements(&self, map_id: &str) -> PersistenceResult<Vec<Placement>> {
        self.with_state("list placements", |state| {
            Ok(state.placements.get(map_id).cloned().unwrap_or_default())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_regions_are_listed_per_map() {
        let adapter = InMemoryAdapter::new();
        adapter
            .create_region(&Region::new("a", "map-1", "A", 0, 0, 2))
            .expect("create a");
        adapter
            .create_region(&Region::new("b", "map-2", "B", 0, 0, 2))
            .expect("create b");

        let listed = adapter.list_regions("map-1").expect("list map-1");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "a");
        assert!(adapter.list_regions("map-3").expect("list empty").is_empty());
    }

    #[test]
    fn duplicate_create_and_missing_update_are_rejected() {
        let adapter = InMemoryAdapter::new();
        let region = Region::new("a", "map-1", "A", 0, 0, 2);
        adapter.create_region(&region).expect("first create");
        assert_eq!(
            adapter.create_region(&region),
            Err(PersistenceError::RegionExists {
                id: "a".to_string()
            })
        );

        let ghost = Region::new("ghost", "map-1", "Ghost", 0, 0, 2);
        assert!(matches!(
            adapter.update_region(&ghost),
            Err(PersistenceError::RegionNotFound { .. })
        ));
    }

    #[test]
    fn update_overwrites_stored_region() {
        let adapter = InMemoryAdapter::new();
        let mut region = Region::new("a", "map-1", "A", 0, 0, 2);
        adapter.create_region(&region).expect("create");
        region.name = "Renamed".to_string();
        adapter.update_region(&region).expect("update");
        assert_eq!(adapter.list_regions("map-1").expect("list")[0].name, "Renamed");
    }
}
