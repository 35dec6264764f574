use winit::{
    event::DeviceEvent,
    window::{CursorGrabMode, Window},
};

use super::navigation::NavigationContext;

/// Routes raw pointer motion to the navigation context and keeps the OS cursor
/// grabbed exactly while the active camera flies freely.
pub struct CameraController {
    cursor_grabbed: bool,
}

impl CameraController {
    pub fn new() -> Self {
        Self {
            cursor_grabbed: false,
        }
    }

    pub fn process_events(&mut self, event: &DeviceEvent, navigation: &mut NavigationContext) {
        if let DeviceEvent::MouseMotion { delta } = event {
            navigation.pointer_moved(delta.0 as f32, delta.1 as f32);
        }
    }

    /// Grabs or releases the cursor after a mode change
    pub fn sync_cursor(&mut self, window: &Window, navigation: &NavigationContext) {
        let wanted = navigation.pointer_captured();
        if wanted == self.cursor_grabbed {
            return;
        }

        if wanted {
            let grabbed = window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
            if let Err(err) = grabbed {
                log::warn!("could not grab cursor: {}", err);
            }
        } else if let Err(err) = window.set_cursor_grab(CursorGrabMode::None) {
            log::warn!("could not release cursor: {}", err);
        }
        window.set_cursor_visible(!wanted);
        self.cursor_grabbed = wanted;
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new()
    }
}
