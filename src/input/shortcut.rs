use crate::selection::SelectionMode;
use crate::store::EditorAction;
use crate::tool::ToolKind;

/// Pixel offset applied when pasting from the keyboard so copies do not
/// land exactly on their originals.
pub const KEYBOARD_PASTE_OFFSET: i32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutKey {
    Character(char),
    Escape,
    Delete,
    Backspace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShortcutModifiers {
    pub ctrl: bool,
    pub shift: bool,
}

impl ShortcutModifiers {
    pub const fn new(ctrl: bool, shift: bool) -> Self {
        Self { ctrl, shift }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputContext {
    /// A text field owns the keyboard; editor shortcuts stay inactive.
    pub text_input_active: bool,
    pub tool: ToolKind,
    pub selection_mode: SelectionMode,
}

impl InputContext {
    pub const fn new(tool: ToolKind, selection_mode: SelectionMode) -> Self {
        Self {
            text_input_active: false,
            tool,
            selection_mode,
        }
    }
}

fn resolve_tool_shortcut(key: ShortcutKey) -> Option<EditorAction> {
    let tool = match key {
        ShortcutKey::Character('v') => ToolKind::Select,
        ShortcutKey::Character('p') => ToolKind::Place,
        ShortcutKey::Character('r') => ToolKind::Region,
        ShortcutKey::Character('h') => ToolKind::Pan,
        _ => return None,
    };
    Some(EditorAction::SetTool { tool })
}

fn resolve_view_shortcut(key: ShortcutKey) -> Option<EditorAction> {
    match key {
        ShortcutKey::Character('+' | '=') => Some(EditorAction::ZoomIn),
        ShortcutKey::Character('-') => Some(EditorAction::ZoomOut),
        ShortcutKey::Character('0') => Some(EditorAction::ResetViewport),
        ShortcutKey::Character('g') => Some(EditorAction::ToggleGrid),
        ShortcutKey::Character('s') => Some(EditorAction::ToggleSnap),
        _ => resolve_tool_shortcut(key),
    }
}

fn resolve_command_shortcut(key: ShortcutKey, shift: bool, context: InputContext) -> Option<EditorAction> {
    match (key, shift) {
        (ShortcutKey::Character('z'), false) => Some(EditorAction::Undo),
        (ShortcutKey::Character('z'), true) | (ShortcutKey::Character('y'), false) => {
            Some(EditorAction::Redo)
        }
        (ShortcutKey::Character('c'), false) => Some(EditorAction::CopySelected),
        (ShortcutKey::Character('x'), false) => Some(EditorAction::CutSelected),
        (ShortcutKey::Character('v'), false) => Some(EditorAction::Paste {
            offset_x: KEYBOARD_PASTE_OFFSET,
            offset_y: KEYBOARD_PASTE_OFFSET,
        }),
        (ShortcutKey::Character('a'), false) => match context.selection_mode {
            SelectionMode::Cell => Some(EditorAction::SelectAllCells),
            SelectionMode::Placement => Some(EditorAction::SelectAllPlacements),
        },
        _ => None,
    }
}

pub fn resolve_shortcut(
    key: ShortcutKey,
    modifiers: ShortcutModifiers,
    context: InputContext,
) -> Option<EditorAction> {
    if context.text_input_active {
        return None;
    }

    let key = match key {
        ShortcutKey::Character(c) => ShortcutKey::Character(c.to_ascii_lowercase()),
        other => other,
    };

    if modifiers.ctrl {
        return resolve_command_shortcut(key, modifiers.shift, context);
    }

    match key {
        ShortcutKey::Escape => Some(EditorAction::ClearAllSelections),
        ShortcutKey::Delete | ShortcutKey::Backspace if context.tool.edits_placements() => {
            Some(EditorAction::DeleteSelectedPlacements)
        }
        ShortcutKey::Delete | ShortcutKey::Backspace => None,
        _ => resolve_view_shortcut(key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctrl() -> ShortcutModifiers {
        ShortcutModifiers::new(true, false)
    }

    fn ctrl_shift() -> ShortcutModifiers {
        ShortcutModifiers::new(true, true)
    }

    fn plain(c: char) -> Option<EditorAction> {
        resolve_shortcut(
            ShortcutKey::Character(c),
            ShortcutModifiers::default(),
            InputContext::default(),
        )
    }

    #[test]
    fn text_input_swallows_every_shortcut() {
        let context = InputContext {
            text_input_active: true,
            ..Default::default()
        };
        assert_eq!(
            resolve_shortcut(ShortcutKey::Character('z'), ctrl(), context),
            None
        );
        assert_eq!(
            resolve_shortcut(ShortcutKey::Delete, ShortcutModifiers::default(), context),
            None
        );
        assert_eq!(
            resolve_shortcut(ShortcutKey::Escape, ShortcutModifiers::default(), context),
            None
        );
    }

    #[test]
    fn resolve_shortcut_maps_history_and_clipboard() {
        let context = InputContext::default();
        assert_eq!(
            resolve_shortcut(ShortcutKey::Character('z'), ctrl(), context),
            Some(EditorAction::Undo)
        );
        assert_eq!(
            resolve_shortcut(ShortcutKey::Character('z'), ctrl_shift(), context),
            Some(EditorAction::Redo)
        );
        assert_eq!(
            resolve_shortcut(ShortcutKey::Character('Z'), ctrl_shift(), context),
            Some(EditorAction::Redo)
        );
        assert_eq!(
            resolve_shortcut(ShortcutKey::Character('y'), ctrl(), context),
            Some(EditorAction::Redo)
        );
        assert_eq!(
            resolve_shortcut(ShortcutKey::Character('c'), ctrl(), context),
            Some(EditorAction::CopySelected)
        );
        assert_eq!(
            resolve_shortcut(ShortcutKey::Character('x'), ctrl(), context),
            Some(EditorAction::CutSelected)
        );
        assert_eq!(
            resolve_shortcut(ShortcutKey::Character('v'), ctrl(), context),
            Some(EditorAction::Paste {
                offset_x: KEYBOARD_PASTE_OFFSET,
                offset_y: KEYBOARD_PASTE_OFFSET
            })
        );
        assert_eq!(
            resolve_shortcut(ShortcutKey::Character('q'), ctrl(), context),
            None
        );
    }

    #[test]
    fn select_all_follows_selection_mode() {
        let cells = InputContext::new(ToolKind::Region, SelectionMode::Cell);
        assert_eq!(
            resolve_shortcut(ShortcutKey::Character('a'), ctrl(), cells),
            Some(EditorAction::SelectAllCells)
        );
        let placements = InputContext::new(ToolKind::Select, SelectionMode::Placement);
        assert_eq!(
            resolve_shortcut(ShortcutKey::Character('a'), ctrl(), placements),
            Some(EditorAction::SelectAllPlacements)
        );
    }

    #[test]
    fn delete_only_applies_to_placement_tools() {
        let select = InputContext::new(ToolKind::Select, SelectionMode::Placement);
        assert_eq!(
            resolve_shortcut(ShortcutKey::Delete, ShortcutModifiers::default(), select),
            Some(EditorAction::DeleteSelectedPlacements)
        );
        assert_eq!(
            resolve_shortcut(ShortcutKey::Backspace, ShortcutModifiers::default(), select),
            Some(EditorAction::DeleteSelectedPlacements)
        );

        let pan = InputContext::new(ToolKind::Pan, SelectionMode::Placement);
        assert_eq!(
            resolve_shortcut(ShortcutKey::Delete, ShortcutModifiers::default(), pan),
            None
        );
    }

    #[test]
    fn escape_clears_selections() {
        assert_eq!(
            resolve_shortcut(
                ShortcutKey::Escape,
                ShortcutModifiers::default(),
                InputContext::default()
            ),
            Some(EditorAction::ClearAllSelections)
        );
    }

    #[test]
    fn resolve_shortcut_maps_view_and_tool_keys() {
        assert_eq!(plain('+'), Some(EditorAction::ZoomIn));
        assert_eq!(plain('='), Some(EditorAction::ZoomIn));
        assert_eq!(plain('-'), Some(EditorAction::ZoomOut));
        assert_eq!(plain('0'), Some(EditorAction::ResetViewport));
        assert_eq!(plain('g'), Some(EditorAction::ToggleGrid));
        assert_eq!(plain('s'), Some(EditorAction::ToggleSnap));
        assert_eq!(
            plain('v'),
            Some(EditorAction::SetTool {
                tool: ToolKind::Select
            })
        );
        assert_eq!(
            plain('p'),
            Some(EditorAction::SetTool {
                tool: ToolKind::Place
            })
        );
        assert_eq!(
            plain('r'),
            Some(EditorAction::SetTool {
                tool: ToolKind::Region
            })
        );
        assert_eq!(
            plain('h'),
            Some(EditorAction::SetTool { tool: ToolKind::Pan })
        );
        assert_eq!(plain('k'), None);
    }
}
