mod shortcut;

pub use shortcut::{
    resolve_shortcut, InputContext, ShortcutKey, ShortcutModifiers, KEYBOARD_PASTE_OFFSET,
};
