//! Cell and geometry checks applied when regions are created or edited.

use crate::geometry::{CellBounds, GridSize};

use super::{Region, RegionError, RegionResult};

pub fn ensure_square(width: u32, height: u32) -> RegionResult<()> {
    if width == height && width > 0 {
        Ok(())
    } else {
        Err(RegionError::NotSquare { width, height })
    }
}

/// A selection can become a region when it is square and, if the grid is
/// known, fully inside it.
pub fn validate_selection_square(bounds: &CellBounds, grid: Option<GridSize>) -> RegionResult<()> {
    ensure_square(bounds.width(), bounds.height())?;
    if let Some(grid) = grid {
        ensure_within_grid(bounds, grid)?;
    }
    Ok(())
}

pub fn ensure_within_grid(bounds: &CellBounds, grid: GridSize) -> RegionResult<()> {
    if grid.full_bounds().contains_bounds(bounds) {
        Ok(())
    } else {
        Err(RegionError::OutsideGrid {
            bounds: *bounds,
            columns: grid.columns,
            rows: grid.rows,
        })
    }
}

pub fn validate_parent(parent_id: &str, map_id: &str, regions: &[Region]) -> RegionResult<()> {
    let parent = regions
        .iter()
        .find(|region| region.id == parent_id)
        .ok_or_else(|| RegionError::UnknownParent {
            parent_id: parent_id.to_string(),
            map_id: map_id.to_string(),
        })?;
    if parent.map_id != map_id {
        return Err(RegionError::WrongMap {
            id: parent.id.clone(),
            region_map_id: parent.map_id.clone(),
            map_id: map_id.to_string(),
        });
    }
    Ok(())
}

/// Whether `child` lies inside its parent's square. Regions without a parent
/// (or with an unknown parent) are reported as nested.
pub fn is_nested_within_parent(child: &Region, regions: &[Region]) -> bool {
    let Some(parent_id) = child.parent_region_id.as_deref() else {
        return true;
    };
    regions
        .iter()
        .find(|region| region.id == parent_id)
        .is_none_or(|parent| parent.bounds().contains_bounds(&child.bounds()))
}
