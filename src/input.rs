//! Keyboard state and discrete commands
//!
//! Movement keys are held and polled by the key tick; everything else maps to
//! an [`Action`] dispatched once on key press.

use winit::keyboard::KeyCode;

use crate::gfx::camera::MoveDirection;

/// Discrete commands bound to keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ToggleFreeMode,
    ToggleCircling,
    ToggleFlashlight,
    ToggleDaytime,
    PlaceBulb,
    ToggleRefreshRate,
    ToggleFullscreen,
    /// Zero-based camera slot
    SelectCamera(usize),
    ToggleFog,
    Quit,
}

impl Action {
    pub fn from_key(key: KeyCode) -> Option<Self> {
        Some(match key {
            KeyCode::F1 => Action::ToggleFreeMode,
            KeyCode::F2 => Action::ToggleCircling,
            KeyCode::F3 => Action::ToggleFlashlight,
            KeyCode::F4 => Action::ToggleDaytime,
            KeyCode::F5 => Action::PlaceBulb,
            KeyCode::F7 => Action::ToggleRefreshRate,
            KeyCode::F11 => Action::ToggleFullscreen,
            KeyCode::Digit1 => Action::SelectCamera(0),
            KeyCode::Digit2 => Action::SelectCamera(1),
            KeyCode::Digit3 => Action::SelectCamera(2),
            KeyCode::KeyG => Action::ToggleFog,
            KeyCode::Escape => Action::Quit,
            _ => return None,
        })
    }
}

fn movement_for(key: KeyCode) -> Option<MoveDirection> {
    match key {
        KeyCode::KeyW => Some(MoveDirection::Forward),
        KeyCode::KeyS => Some(MoveDirection::Backward),
        KeyCode::KeyA => Some(MoveDirection::Left),
        KeyCode::KeyD => Some(MoveDirection::Right),
        _ => None,
    }
}

/// Held movement keys
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InputState {
    forward: bool,
    backward: bool,
    left: bool,
    right: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a key transition. Returns the action for a fresh press of a
    /// command key; repeats and releases yield nothing.
    pub fn key_event(&mut self, key: KeyCode, pressed: bool, repeat: bool) -> Option<Action> {
        if let Some(direction) = movement_for(key) {
            *self.slot(direction) = pressed;
            return None;
        }
        if pressed && !repeat {
            Action::from_key(key)
        } else {
            None
        }
    }

    fn slot(&mut self, direction: MoveDirection) -> &mut bool {
        match direction {
            MoveDirection::Forward => &mut self.forward,
            MoveDirection::Backward => &mut self.backward,
            MoveDirection::Left => &mut self.left,
            MoveDirection::Right => &mut self.right,
        }
    }

    pub fn is_held(&self, direction: MoveDirection) -> bool {
        match direction {
            MoveDirection::Forward => self.forward,
            MoveDirection::Backward => self.backward,
            MoveDirection::Left => self.left,
            MoveDirection::Right => self.right,
        }
    }

    /// Held directions in the order the key tick applies them
    pub fn held(&self) -> impl Iterator<Item = MoveDirection> + '_ {
        [
            MoveDirection::Forward,
            MoveDirection::Backward,
            MoveDirection::Left,
            MoveDirection::Right,
        ]
        .into_iter()
        .filter(|direction| self.is_held(*direction))
    }

    /// Forgets every held key, e.g. when the window loses focus
    pub fn release_all(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_keys_are_held_until_release() {
        let mut input = InputState::new();
        assert_eq!(input.key_event(KeyCode::KeyW, true, false), None);
        assert_eq!(input.key_event(KeyCode::KeyD, true, false), None);
        assert_eq!(
            input.held().collect::<Vec<_>>(),
            vec![MoveDirection::Forward, MoveDirection::Right]
        );

        input.key_event(KeyCode::KeyW, false, false);
        assert!(!input.is_held(MoveDirection::Forward));
        assert!(input.is_held(MoveDirection::Right));

        input.release_all();
        assert_eq!(input.held().count(), 0);
    }

    #[test]
    fn test_command_keys_fire_once() {
        let mut input = InputState::new();
        assert_eq!(
            input.key_event(KeyCode::F1, true, false),
            Some(Action::ToggleFreeMode)
        );
        assert_eq!(input.key_event(KeyCode::F1, true, true), None);
        assert_eq!(input.key_event(KeyCode::F1, false, false), None);
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(Action::from_key(KeyCode::Digit2), Some(Action::SelectCamera(1)));
        assert_eq!(Action::from_key(KeyCode::KeyG), Some(Action::ToggleFog));
        assert_eq!(Action::from_key(KeyCode::F7), Some(Action::ToggleRefreshRate));
        assert_eq!(Action::from_key(KeyCode::Escape), Some(Action::Quit));
        assert_eq!(Action::from_key(KeyCode::KeyQ), None);
    }
}
