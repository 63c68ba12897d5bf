use std::collections::HashSet;

use winit::keyboard::KeyCode;

/// Logical movement actions sampled once per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub rotate_left: bool,
    pub rotate_right: bool,
}

impl InputState {
    /// Map the currently held keys (arrows or WASD) to actions.
    pub fn from_keys(keys_down: &HashSet<KeyCode>) -> Self {
        let held = |a: KeyCode, b: KeyCode| keys_down.contains(&a) || keys_down.contains(&b);
        Self {
            forward: held(KeyCode::ArrowUp, KeyCode::KeyW),
            backward: held(KeyCode::ArrowDown, KeyCode::KeyS),
            rotate_left: held(KeyCode::ArrowLeft, KeyCode::KeyA),
            rotate_right: held(KeyCode::ArrowRight, KeyCode::KeyD),
        }
    }

    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

/// One-shot commands triggered on key press rather than held state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ToggleRenderMode,
    Quit,
}

impl Command {
    pub fn from_key(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::Tab => Some(Command::ToggleRenderMode),
            KeyCode::Escape => Some(Command::Quit),
            _ => None,
        }
    }
}
