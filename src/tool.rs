use serde::{Deserialize, Serialize};

use crate::selection::SelectionMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToolKind {
    #[default]
    Select,
    Place,
    Region,
    Pan,
}

impl ToolKind {
    /// Selection mode a tool switches the editor into.
    pub const fn selection_mode(self) -> SelectionMode {
        match self {
            Self::Region => SelectionMode::Cell,
            Self::Select | Self::Place | Self::Pan => SelectionMode::Placement,
        }
    }

    pub const fn edits_placements(self) -> bool {
        matches!(self, Self::Select | Self::Place)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_tool_selects_cells_and_others_select_placements() {
        assert_eq!(ToolKind::Region.selection_mode(), SelectionMode::Cell);
        for tool in [ToolKind::Select, ToolKind::Place, ToolKind::Pan] {
            assert_eq!(
                tool.selection_mode(),
                SelectionMode::Placement,
                "{tool:?} should select placements"
            );
        }
    }

    #[test]
    fn only_select_and_place_edit_placements() {
        assert!(ToolKind::Select.edits_placements());
        assert!(ToolKind::Place.edits_placements());
        assert!(!ToolKind::Region.edits_placements());
        assert!(!ToolKind::Pan.edits_placements());
    }
}
