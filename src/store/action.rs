use serde::Deserialize;

use crate::geometry::{CellCoordinate, CoordinateConfig};
use crate::placement::Placement;
use crate::region::{MapEnvironment, Region};
use crate::selection::SelectionMode;
use crate::tool::ToolKind;

use super::{EditorStore, StoreResult};

/// One editor action, as produced by shortcuts or read from an action log.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EditorAction {
    OpenMap {
        map_id: String,
        #[serde(default)]
        coordinate_config: Option<CoordinateConfig>,
    },
    SetCoordinateConfig {
        coordinate_config: Option<CoordinateConfig>,
    },
    SetMapEnvironment {
        environment: MapEnvironment,
    },

    SetZoom {
        zoom_percent: u16,
    },
    ZoomIn,
    ZoomOut,
    SetPan {
        x: i32,
        y: i32,
    },
    ToggleGrid,
    ToggleSnap,
    SetGridSize {
        grid_size: u32,
    },
    ResetViewport,

    SetTool {
        tool: ToolKind,
    },
    SetSelectionMode {
        mode: SelectionMode,
    },

    SelectCell {
        x: i32,
        y: i32,
        #[serde(default)]
        add_to_selection: bool,
    },
    SelectCellRange {
        start: CellCoordinate,
        end: CellCoordinate,
    },
    SelectCellSquare {
        start: CellCoordinate,
        end: CellCoordinate,
    },
    StartCellSelection {
        cell: CellCoordinate,
    },
    UpdateCellSelection {
        cell: CellCoordinate,
    },
    EndCellSelection,
    SelectAllCells,
    ClearCellSelection,

    LoadRegions {
        map_id: String,
    },
    AddRegion {
        region: Region,
    },
    UpdateRegion {
        region: Region,
    },
    CreateRegionFromSelection {
        name: String,
        #[serde(default)]
        parent_region_id: Option<String>,
    },
    SelectRegion {
        id: String,
    },
    ClearRegionSelection,
    ToggleRegionVisibility {
        id: String,
    },
    SetRegionVisibility {
        id: String,
        visible: bool,
    },

    LoadPlacements {
        map_id: String,
    },
    AddPlacement {
        placement: Placement,
    },
    UpdatePlacement {
        placement: Placement,
    },
    DeletePlacement {
        id: String,
    },
    DeleteSelectedPlacements,
    MovePlacements {
        ids: Vec<String>,
        delta_x: i32,
        delta_y: i32,
    },
    SelectPlacement {
        id: String,
        #[serde(default)]
        add_to_selection: bool,
    },
    DeselectPlacement {
        id: String,
    },
    SelectAllPlacements,
    ClearPlacementSelection,
    ClearAllSelections,

    Undo,
    Redo,

    CopySelected,
    CutSelected,
    Paste {
        offset_x: i32,
        offset_y: i32,
    },
    ClearClipboard,

    ProcessSync,
    RetryFailedSyncs,
    RollbackFailedSync {
        region_id: String,
    },
}

impl EditorStore {
    /// Applies one action. Only actions with a failure mode return `Err`;
    /// the rest are no-ops when they do not apply.
    pub fn dispatch(&mut self, action: EditorAction) -> StoreResult<()> {
        tracing::trace!(?action, "dispatch");
        match action {
            EditorAction::OpenMap {
                map_id,
                coordinate_config,
            } => self.open_map(&map_id, coordinate_config),
            EditorAction::SetCoordinateConfig { coordinate_config } => {
                self.set_coordinate_config(coordinate_config)
            }
            EditorAction::SetMapEnvironment { environment } => {
                self.set_map_environment(environment)
            }

            EditorAction::SetZoom { zoom_percent } => self.set_zoom(zoom_percent),
            EditorAction::ZoomIn => self.zoom_in(),
            EditorAction::ZoomOut => self.zoom_out(),
            EditorAction::SetPan { x, y } => self.set_pan(x, y),
            EditorAction::ToggleGrid => self.toggle_grid(),
            EditorAction::ToggleSnap => self.toggle_snap(),
            EditorAction::SetGridSize { grid_size } => self.set_grid_size(grid_size),
            EditorAction::ResetViewport => self.reset_viewport(),

            EditorAction::SetTool { tool } => self.set_tool(tool),
            EditorAction::SetSelectionMode { mode } => self.set_selection_mode(mode),

            EditorAction::SelectCell {
                x,
                y,
                add_to_selection,
            } => self.select_cell(x, y, add_to_selection),
            EditorAction::SelectCellRange { start, end } => self.select_cell_range(start, end),
            EditorAction::SelectCellSquare { start, end } => self.select_cell_square(start, end),
            EditorAction::StartCellSelection { cell } => self.start_cell_selection(cell),
            EditorAction::UpdateCellSelection { cell } => self.update_cell_selection(cell),
            EditorAction::EndCellSelection => self.end_cell_selection(),
            EditorAction::SelectAllCells => self.select_all_cells(),
            EditorAction::ClearCellSelection => self.clear_cell_selection(),

            EditorAction::LoadRegions { map_id } => self.load_regions(&map_id),
            EditorAction::AddRegion { region } => self.add_region(region)?,
            EditorAction::UpdateRegion { region } => self.update_region(region)?,
            EditorAction::CreateRegionFromSelection {
                name,
                parent_region_id,
            } => {
                self.create_region_from_selection(&name, parent_region_id.as_deref())?;
            }
            EditorAction::SelectRegion { id } => self.select_region(&id),
            EditorAction::ClearRegionSelection => self.clear_region_selection(),
            EditorAction::ToggleRegionVisibility { id } => self.toggle_region_visibility(&id),
            EditorAction::SetRegionVisibility { id, visible } => {
                self.set_region_visibility(&id, visible)
            }

            EditorAction::LoadPlacements { map_id } => self.load_placements(&map_id),
            EditorAction::AddPlacement { placement } => self.add_placement(placement)?,
            EditorAction::UpdatePlacement { placement } => self.update_placement(placement)?,
            EditorAction::DeletePlacement { id } => self.delete_placement(&id)?,
            EditorAction::DeleteSelectedPlacements => {
                self.delete_selected_placements();
            }
            EditorAction::MovePlacements {
                ids,
                delta_x,
                delta_y,
            } => {
                self.move_placements(&ids, delta_x, delta_y);
            }
            EditorAction::SelectPlacement {
                id,
                add_to_selection,
            } => self.select_placement(&id, add_to_selection),
            EditorAction::DeselectPlacement { id } => self.deselect_placement(&id),
            EditorAction::SelectAllPlacements => self.select_all_placements(),
            EditorAction::ClearPlacementSelection => self.clear_placement_selection(),
            EditorAction::ClearAllSelections => self.clear_all_selections(),

            EditorAction::Undo => {
                self.undo();
            }
            EditorAction::Redo => {
                self.redo();
            }

            EditorAction::CopySelected => {
                self.copy_selected();
            }
            EditorAction::CutSelected => {
                self.cut_selected();
            }
            EditorAction::Paste { offset_x, offset_y } => {
                self.paste(offset_x, offset_y);
            }
            EditorAction::ClearClipboard => self.clear_clipboard(),

            EditorAction::ProcessSync => {
                self.process_sync_messages();
            }
            EditorAction::RetryFailedSyncs => {
                self.retry_failed_syncs()?;
            }
            EditorAction::RollbackFailedSync { region_id } => {
                self.rollback_failed_sync(&region_id)?
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_parse_from_tagged_json() {
        let action: EditorAction =
            serde_json::from_str(r#"{"type":"selectCell","x":3,"y":4,"addToSelection":true}"#)
                .expect("valid action");
        assert_eq!(
            action,
            EditorAction::SelectCell {
                x: 3,
                y: 4,
                add_to_selection: true
            }
        );

        let action: EditorAction = serde_json::from_str(
            r#"{"type":"openMap","mapId":"m","coordinateConfig":{"baseCellSize":100,"imageWidth":1000,"imageHeight":800}}"#,
        )
        .expect("valid open map");
        match action {
            EditorAction::OpenMap {
                map_id,
                coordinate_config: Some(config),
            } => {
                assert_eq!(map_id, "m");
                assert_eq!(config.image_height, 800.0);
            }
            other => panic!("unexpected action {other:?}"),
        }

        let action: EditorAction =
            serde_json::from_str(r#"{"type":"setTool","tool":"region"}"#).expect("valid tool");
        assert_eq!(
            action,
            EditorAction::SetTool {
                tool: ToolKind::Region
            }
        );
    }

    #[test]
    fn unit_actions_need_only_a_type() {
        let action: EditorAction = serde_json::from_str(r#"{"type":"zoomIn"}"#).expect("zoom in");
        assert_eq!(action, EditorAction::ZoomIn);
        assert!(serde_json::from_str::<EditorAction>(r#"{"type":"teleport"}"#).is_err());
    }
}
