use std::collections::BTreeMap;

use serde::Serialize;

use crate::geometry::{CellBounds, CoordinateConfig};
use crate::history::HistoryKind;
use crate::placement::Placement;
use crate::region::Region;
use crate::selection::SelectionMode;
use crate::sync::SyncStatus;
use crate::tool::ToolKind;
use crate::viewport::Viewport;

use super::EditorStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    pub kinds: Vec<HistoryKind>,
    pub index: isize,
    pub can_undo: bool,
    pub can_redo: bool,
}

/// Serializable read-only view of the whole editor state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSnapshot {
    pub map_id: Option<String>,
    pub coordinate_config: Option<CoordinateConfig>,
    pub viewport: Viewport,
    pub tool: ToolKind,
    pub selection_mode: SelectionMode,
    pub selected_cell_bounds: Option<CellBounds>,
    pub regions: Vec<Region>,
    pub selected_region_id: Option<String>,
    pub visible_region_ids: Vec<String>,
    pub placements: Vec<Placement>,
    pub selected_placement_ids: Vec<String>,
    pub clipboard_size: usize,
    pub history: HistorySummary,
    pub sync: BTreeMap<String, SyncStatus>,
}

impl EditorStore {
    pub fn snapshot(&self) -> EditorSnapshot {
        let sync = self
            .regions
            .regions()
            .iter()
            .filter_map(|region| {
                self.ledger
                    .status(&region.id)
                    .map(|status| (region.id.clone(), status))
            })
            .collect();

        EditorSnapshot {
            map_id: self.map_id.clone(),
            coordinate_config: self.coordinate_config,
            viewport: self.viewport,
            tool: self.tool,
            selection_mode: self.selection_mode,
            selected_cell_bounds: self.cells.bounds(),
            regions: self.regions.regions().to_vec(),
            selected_region_id: self.regions.selected_region_id().map(str::to_string),
            visible_region_ids: self.regions.visible_region_ids().iter().cloned().collect(),
            placements: self.placements.snapshot(),
            selected_placement_ids: self.selected_placements.ids().to_vec(),
            clipboard_size: self.clipboard.entries().len(),
            history: HistorySummary {
                kinds: self.history.entries().iter().map(|entry| entry.kind).collect(),
                index: self.history.index(),
                can_undo: self.history.can_undo(),
                can_redo: self.history.can_redo(),
            },
            sync,
        }
    }
}
