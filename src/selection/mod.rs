//! Cell and placement selection models.

use serde::{Deserialize, Serialize};

use crate::geometry::{CellBounds, CellCoordinate, CellIter, CoordinateConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionMode {
    #[default]
    Placement,
    Cell,
}

/// Rectangular cell selection, kept as a bounding box until consumed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellSelection {
    bounds: Option<CellBounds>,
    drag_start: Option<CellCoordinate>,
    is_selecting: bool,
}

impl CellSelection {
    pub const fn new() -> Self {
        Self {
            bounds: None,
            drag_start: None,
            is_selecting: false,
        }
    }

    pub const fn bounds(&self) -> Option<CellBounds> {
        self.bounds
    }

    pub const fn is_selecting(&self) -> bool {
        self.is_selecting
    }

    pub fn set_bounds(&mut self, bounds: Option<CellBounds>) {
        self.bounds = bounds;
    }

    /// Additive selection unions into the bounding box; non-rectangular picks
    /// therefore collapse to their enclosing rectangle.
    pub fn select_cell(&mut self, cell: CellCoordinate, add_to_selection: bool) {
        if add_to_selection {
            if let Some(bounds) = self.bounds.as_mut() {
                bounds.expand_to(cell);
                return;
            }
        }
        self.bounds = Some(CellBounds::single(cell));
    }

    pub fn select_range(&mut self, start: CellCoordinate, end: CellCoordinate) {
        self.bounds = Some(CellBounds::spanning(start, end));
    }

    /// Grows toward +x/+y from the lower corner until both sides equal the longer one.
    pub fn select_square(&mut self, start: CellCoordinate, end: CellCoordinate) {
        let range = CellBounds::spanning(start, end);
        let size = range.width().max(range.height());
        self.bounds = Some(CellBounds::square(range.min_x, range.min_y, size));
    }

    pub fn start_drag(&mut self, cell: CellCoordinate) {
        self.is_selecting = true;
        self.drag_start = Some(cell);
        self.bounds = Some(CellBounds::single(cell));
    }

    pub fn update_drag(&mut self, cell: CellCoordinate) {
        if !self.is_selecting {
            return;
        }
        if let Some(start) = self.drag_start {
            self.select_range(start, cell);
        }
    }

    pub fn end_drag(&mut self) {
        self.is_selecting = false;
    }

    /// Returns `false` when there is no usable coordinate config.
    pub fn select_all(&mut self, config: Option<&CoordinateConfig>) -> bool {
        let Some(grid) = config.and_then(CoordinateConfig::grid_size) else {
            return false;
        };
        self.bounds = Some(grid.full_bounds());
        true
    }

    pub fn clear(&mut self) {
        self.bounds = None;
        self.drag_start = None;
        self.is_selecting = false;
    }

    pub fn cells(&self) -> Option<CellIter> {
        self.bounds.as_ref().map(CellBounds::cells)
    }
}

/// Ordered list of selected placement ids with set semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementSelection {
    ids: Vec<String>,
}

impl PlacementSelection {
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|selected| selected == id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn select(&mut self, id: &str, add_to_selection: bool) {
        if !add_to_selection {
            self.ids.clear();
        }
        if !self.contains(id) {
            self.ids.push(id.to_string());
        }
    }

    pub fn deselect(&mut self, id: &str) -> bool {
        let before = self.ids.len();
        self.ids.retain(|selected| selected != id);
        self.ids.len() != before
    }

    pub fn replace<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.ids.clear();
        for id in ids {
            if !self.contains(&id) {
                self.ids.push(id);
            }
        }
    }

    /// Drops ids for which `exists` returns false.
    pub fn retain_existing(&mut self, exists: impl Fn(&str) -> bool) {
        self.ids.retain(|id| exists(id));
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> CellBounds {
        CellBounds {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    #[test]
    fn select_cell_replaces_unless_additive() {
        let mut selection = CellSelection::new();
        selection.select_cell(CellCoordinate::new(2, 2), false);
        assert_eq!(selection.bounds(), Some(bounds(2, 2, 2, 2)));

        selection.select_cell(CellCoordinate::new(5, 0), true);
        assert_eq!(selection.bounds(), Some(bounds(2, 0, 5, 2)));

        selection.select_cell(CellCoordinate::new(9, 9), false);
        assert_eq!(selection.bounds(), Some(bounds(9, 9, 9, 9)));
    }

    #[test]
    fn additive_select_without_existing_bounds_starts_fresh() {
        let mut selection = CellSelection::new();
        selection.select_cell(CellCoordinate::new(1, 3), true);
        assert_eq!(selection.bounds(), Some(bounds(1, 3, 1, 3)));
    }

    #[test]
    fn select_square_uses_longer_side_from_lower_corner() {
        let mut selection = CellSelection::new();
        selection.select_square(CellCoordinate::new(0, 0), CellCoordinate::new(3, 1));
        assert_eq!(selection.bounds(), Some(bounds(0, 0, 3, 3)));

        selection.select_square(CellCoordinate::new(4, 6), CellCoordinate::new(2, 5));
        assert_eq!(selection.bounds(), Some(bounds(2, 5, 4, 7)));
    }

    #[test]
    fn drag_lifecycle_tracks_range_and_keeps_bounds_after_end() {
        let mut selection = CellSelection::new();
        selection.start_drag(CellCoordinate::new(3, 3));
        assert!(selection.is_selecting());
        assert_eq!(selection.bounds(), Some(bounds(3, 3, 3, 3)));

        selection.update_drag(CellCoordinate::new(1, 5));
        assert_eq!(selection.bounds(), Some(bounds(1, 3, 3, 5)));

        selection.end_drag();
        assert!(!selection.is_selecting());
        assert_eq!(selection.bounds(), Some(bounds(1, 3, 3, 5)));

        selection.update_drag(CellCoordinate::new(8, 8));
        assert_eq!(selection.bounds(), Some(bounds(1, 3, 3, 5)));
    }

    #[test]
    fn select_all_covers_full_grid_or_does_nothing() {
        let mut selection = CellSelection::new();
        assert!(!selection.select_all(None));
        assert_eq!(selection.bounds(), None);

        let config = CoordinateConfig::new(100.0, 1000.0, 1000.0);
        assert!(selection.select_all(Some(&config)));
        assert_eq!(selection.bounds(), Some(bounds(0, 0, 9, 9)));
    }

    #[test]
    fn clear_resets_bounds_and_drag_state() {
        let mut selection = CellSelection::new();
        selection.start_drag(CellCoordinate::new(0, 0));
        selection.clear();
        assert_eq!(selection, CellSelection::new());
        assert!(selection.cells().is_none());
    }

    #[test]
    fn placement_selection_keeps_set_semantics_in_order() {
        let mut selection = PlacementSelection::default();
        selection.select("a", false);
        selection.select("b", true);
        selection.select("a", true);
        assert_eq!(selection.ids(), ["a".to_string(), "b".to_string()]);

        assert!(selection.deselect("a"));
        assert!(!selection.deselect("a"));
        selection.select("c", false);
        assert_eq!(selection.ids(), ["c".to_string()]);

        selection.replace(["x".to_string(), "y".to_string(), "x".to_string()]);
        assert_eq!(selection.ids().len(), 2);
        selection.retain_existing(|id| id == "y");
        assert_eq!(selection.ids(), ["y".to_string()]);
    }
}
