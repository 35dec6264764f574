//! Camera ownership and the active-camera state machine
//!
//! [`NavigationContext`] owns every camera and tracks which one is active. All
//! transitions that touch more than one camera live here:
//!
//! - making a camera active forces a previously active, non-idle camera back
//!   to idle;
//! - a camera leaving idle remembers the camera that was active, and hands
//!   activity back to it once it is idle again.
//!
//! Side effects that belong to the world (particles on ceiling hits) are queued
//! as [`CameraEvent`]s and drained by the frame driver.

use std::time::Duration;

use cgmath::Vector3;

use super::camera::{Camera, MoveDirection, MoveOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CameraId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraEvent {
    CeilingHit { position: Vector3<f32> },
}

/// Degrees of rotation per pixel of pointer motion, before sensitivity
const POINTER_SCALE: f32 = 0.025;

#[derive(Debug)]
pub struct NavigationContext {
    cameras: Vec<Camera>,
    active: Option<CameraId>,
    refresh_rate: u32,
    events: Vec<CameraEvent>,
}

impl NavigationContext {
    pub fn new(refresh_rate: u32) -> Self {
        Self {
            cameras: Vec::new(),
            active: None,
            refresh_rate: refresh_rate.max(1),
            events: Vec::new(),
        }
    }

    pub fn add_camera(&mut self, camera: Camera) -> CameraId {
        self.cameras.push(camera);
        CameraId(self.cameras.len() - 1)
    }

    pub fn camera(&self, id: CameraId) -> Option<&Camera> {
        self.cameras.get(id.0)
    }

    pub fn camera_mut(&mut self, id: CameraId) -> Option<&mut Camera> {
        self.cameras.get_mut(id.0)
    }

    pub fn cameras(&self) -> impl Iterator<Item = (CameraId, &Camera)> {
        self.cameras.iter().enumerate().map(|(i, c)| (CameraId(i), c))
    }

    pub fn active_id(&self) -> Option<CameraId> {
        self.active
    }

    pub fn active_camera(&self) -> Option<&Camera> {
        self.active.and_then(|id| self.cameras.get(id.0))
    }

    pub fn active_camera_mut(&mut self) -> Option<&mut Camera> {
        self.active.and_then(|id| self.cameras.get_mut(id.0))
    }

    pub fn refresh_rate(&self) -> u32 {
        self.refresh_rate
    }

    /// Switches between 60 and 120 input ticks per second
    pub fn toggle_refresh_rate(&mut self) -> u32 {
        self.refresh_rate = if self.refresh_rate == 60 { 120 } else { 60 };
        log::info!("refresh rate set to {} Hz", self.refresh_rate);
        self.refresh_rate
    }

    /// Pointer motion drives the view while the active camera flies freely
    pub fn pointer_captured(&self) -> bool {
        self.active_camera().is_some_and(Camera::is_free)
    }

    /// Whether the orbit tick has anything to do
    pub fn is_orbiting(&self) -> bool {
        self.active_camera().is_some_and(Camera::is_circling)
    }

    pub fn make_active(&mut self, id: CameraId) -> bool {
        if self.camera(id).is_none() {
            log::warn!("ignoring activation of unknown camera {:?}", id);
            return false;
        }

        if let Some(current) = self.active.filter(|current| *current != id) {
            if let Some(camera) = self.cameras.get_mut(current.0) {
                if !camera.is_idle() {
                    log::debug!("camera '{}' forced idle", camera.name);
                    camera.free_mode = false;
                    camera.circling = false;
                    camera.last_active = None;
                }
            }
        }

        self.active = Some(id);
        true
    }

    pub fn toggle_free_mode(&mut self, id: CameraId) {
        let Some(camera) = self.camera(id) else {
            return;
        };
        if camera.is_locked() {
            return;
        }

        if camera.is_free() {
            self.leave_mode(id, |c| c.free_mode = false);
        } else {
            self.enter_mode(id, |c| c.free_mode = true);
        }
    }

    pub fn toggle_circling(&mut self, id: CameraId) {
        let Some(camera) = self.camera(id) else {
            return;
        };
        if camera.is_locked() {
            return;
        }

        if camera.is_circling() {
            self.leave_mode(id, |c| c.circling = false);
        } else {
            self.enter_mode(id, |c| c.circling = true);
        }
    }

    fn enter_mode(&mut self, id: CameraId, set: impl FnOnce(&mut Camera)) {
        let previous = self.active;
        let was_idle = self.camera(id).is_some_and(Camera::is_idle);

        self.make_active(id);
        if let Some(camera) = self.cameras.get_mut(id.0) {
            if was_idle {
                camera.last_active = previous;
            }
            set(camera);
            log::debug!("camera '{}' entered {:?}", camera.name, camera.mode());
        }
    }

    fn leave_mode(&mut self, id: CameraId, clear: impl FnOnce(&mut Camera)) {
        let Some(camera) = self.cameras.get_mut(id.0) else {
            return;
        };
        clear(camera);
        log::debug!("camera '{}' now {:?}", camera.name, camera.mode());

        if camera.is_idle() {
            let restore = camera.last_active.take();
            if self.active == Some(id) {
                self.active = restore;
            }
        }
    }

    pub fn rotate_active(&mut self, delta_yaw: f32, delta_pitch: f32) {
        if let Some(camera) = self.active_camera_mut() {
            camera.rotate_view(delta_yaw, delta_pitch);
        }
    }

    /// Applies a pointer delta in pixels; ignored unless the pointer is captured.
    pub fn pointer_moved(&mut self, dx: f32, dy: f32) {
        if !self.pointer_captured() {
            return;
        }
        if let Some(camera) = self.active_camera_mut() {
            let scale = POINTER_SCALE * camera.sensitivity;
            camera.rotate_view(-dx * scale, -dy * scale);
        }
    }

    pub fn move_active(&mut self, direction: MoveDirection) -> MoveOutcome {
        let refresh_rate = self.refresh_rate;
        let Some(camera) = self.active_camera_mut() else {
            return MoveOutcome::Ignored;
        };

        let outcome = camera.step(direction, refresh_rate);
        if let MoveOutcome::CeilingHit { at } = outcome {
            log::debug!("camera '{}' hit the ceiling at {:?}", camera.name, at);
            self.events.push(CameraEvent::CeilingHit { position: at });
        }
        outcome
    }

    /// Advances the orbiting camera; `elapsed` is time since start-up.
    pub fn orbit_tick(&mut self, elapsed: Duration) {
        if let Some(camera) = self.active_camera_mut().filter(|c| c.is_circling()) {
            camera.orbit_step(elapsed.as_secs_f32());
        }
    }

    pub fn update_matrices(&mut self, width: u32, height: u32) {
        if let Some(camera) = self.active_camera_mut() {
            camera.update_matrices(width, height);
        }
    }

    pub fn drain_events(&mut self) -> Vec<CameraEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        gfx::camera::{BoundaryVolume, CameraMode, Projection},
        terrain::HeightSampler,
    };
    use cgmath::Deg;
    use std::rc::Rc;

    fn projection() -> Projection {
        Projection {
            fov: Deg(80.0),
            near: 0.01,
            far: 150.0,
        }
    }

    /// dynamic camera (bounded, ceiling 80) plus one locked camera
    fn context() -> (NavigationContext, CameraId, CameraId) {
        let ground: Rc<dyn HeightSampler> = Rc::new(|_x: f32, _z: f32| 0.0f32);
        let boundary = BoundaryVolume::new(500.0, 500.0, 80.0, ground).unwrap();
        let mut nav = NavigationContext::new(60);
        let dynamic = nav.add_camera(Camera::dynamic(
            "dynamic",
            Vector3::new(0.0, 10.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            projection(),
            50.0,
            Some(boundary),
        ));
        let fixed = nav.add_camera(Camera::fixed(
            "static",
            Vector3::new(30.0, 20.0, -40.0),
            Vector3::new(-1.0, -0.5, 1.0),
            projection(),
        ));
        nav.make_active(dynamic);
        (nav, dynamic, fixed)
    }

    #[test]
    fn test_single_active_camera() {
        let (mut nav, dynamic, fixed) = context();
        assert_eq!(nav.active_id(), Some(dynamic));
        assert!(nav.make_active(fixed));
        assert_eq!(nav.active_id(), Some(fixed));
        assert!(!nav.make_active(CameraId(9)));
        assert_eq!(nav.active_id(), Some(fixed));
    }

    #[test]
    fn test_make_active_forces_previous_idle() {
        let (mut nav, dynamic, fixed) = context();
        nav.toggle_free_mode(dynamic);
        nav.toggle_circling(dynamic);
        assert!(nav.camera(dynamic).unwrap().is_circling());

        nav.make_active(fixed);
        let camera = nav.camera(dynamic).unwrap();
        assert!(camera.is_idle());
        assert_eq!(nav.active_id(), Some(fixed));
        assert!(!nav.pointer_captured());
    }

    #[test]
    fn test_locked_camera_ignores_toggles() {
        let (mut nav, _dynamic, fixed) = context();
        nav.make_active(fixed);
        nav.toggle_free_mode(fixed);
        nav.toggle_circling(fixed);
        assert_eq!(nav.camera(fixed).unwrap().mode(), CameraMode::Locked);
        assert_eq!(nav.move_active(MoveDirection::Forward), MoveOutcome::Ignored);
        assert_eq!(nav.camera(fixed).unwrap().position(), Vector3::new(30.0, 20.0, -40.0));
    }

    #[test]
    fn test_free_mode_enter_and_exit() {
        let (mut nav, dynamic, fixed) = context();
        nav.make_active(fixed);

        nav.toggle_free_mode(dynamic);
        assert_eq!(nav.active_id(), Some(dynamic));
        assert!(nav.pointer_captured());

        nav.toggle_free_mode(dynamic);
        assert_eq!(nav.active_id(), Some(fixed));
        assert!(!nav.pointer_captured());
    }

    #[test]
    fn test_circling_on_off_restores_state() {
        let (mut nav, dynamic, _fixed) = context();
        let before = nav.camera(dynamic).unwrap().position();
        let active = nav.active_id();

        nav.toggle_circling(dynamic);
        assert!(nav.is_orbiting());
        nav.toggle_circling(dynamic);

        assert_eq!(nav.camera(dynamic).unwrap().position(), before);
        assert_eq!(nav.active_id(), active);
        assert!(!nav.is_orbiting());
    }

    #[test]
    fn test_orbit_tick_only_while_circling() {
        let (mut nav, dynamic, _fixed) = context();
        nav.orbit_tick(Duration::from_millis(1500));
        assert_eq!(nav.camera(dynamic).unwrap().position(), Vector3::new(0.0, 10.0, 0.0));

        nav.toggle_circling(dynamic);
        nav.orbit_tick(Duration::ZERO);
        assert_eq!(nav.camera(dynamic).unwrap().position(), Vector3::new(0.0, 20.0, 40.0));

        nav.toggle_circling(dynamic);
        nav.orbit_tick(Duration::from_millis(1500));
        assert_eq!(nav.camera(dynamic).unwrap().position(), Vector3::new(0.0, 20.0, 40.0));
    }

    #[test]
    fn test_leaving_one_mode_keeps_the_other_active() {
        let (mut nav, dynamic, fixed) = context();
        nav.make_active(fixed);
        nav.toggle_free_mode(dynamic);
        nav.toggle_circling(dynamic);

        nav.toggle_free_mode(dynamic);
        assert_eq!(nav.active_id(), Some(dynamic));
        nav.toggle_circling(dynamic);
        assert_eq!(nav.active_id(), Some(fixed));
    }

    #[test]
    fn test_pointer_motion_requires_capture() {
        let (mut nav, dynamic, _fixed) = context();
        nav.pointer_moved(100.0, 0.0);
        assert_eq!(nav.camera(dynamic).unwrap().yaw(), 0.0);

        nav.toggle_free_mode(dynamic);
        nav.pointer_moved(-40.0, 8.0);
        let camera = nav.camera(dynamic).unwrap();
        assert!((camera.yaw() - 1.5).abs() < 1e-4);
        assert!((camera.pitch() + 0.3).abs() < 1e-4);
    }

    #[test]
    fn test_ceiling_hit_queues_one_event() {
        let (mut nav, dynamic, _fixed) = context();
        nav.toggle_free_mode(dynamic);
        nav.rotate_active(0.0, 90.0);

        let mut outcomes = Vec::new();
        for _ in 0..200 {
            outcomes.push(nav.move_active(MoveDirection::Forward));
            if matches!(outcomes.last(), Some(MoveOutcome::CeilingHit { .. })) {
                break;
            }
        }
        let position = nav.camera(dynamic).unwrap().position();
        assert!(position.y < 80.0);

        let events = nav.drain_events();
        assert_eq!(events, vec![CameraEvent::CeilingHit { position }]);
        assert!(nav.drain_events().is_empty());
    }

    #[test]
    fn test_leaving_the_volume_is_silent() {
        let (mut nav, dynamic, _fixed) = context();
        if let Some(camera) = nav.camera_mut(dynamic) {
            camera.rotate_view(90.0, 0.0);
        }
        nav.toggle_free_mode(dynamic);

        for _ in 0..400 {
            nav.move_active(MoveDirection::Forward);
        }
        let position = nav.camera(dynamic).unwrap().position();
        assert!(position.x < 250.0 && position.x > 249.0);
        assert!(nav.drain_events().is_empty());
    }

    #[test]
    fn test_refresh_rate_toggle_halves_step() {
        let (mut nav, dynamic, _fixed) = context();
        nav.toggle_free_mode(dynamic);
        assert_eq!(nav.toggle_refresh_rate(), 120);
        nav.move_active(MoveDirection::Forward);
        let z = nav.camera(dynamic).unwrap().position().z;
        assert!((z - 50.0 / 120.0).abs() < 1e-5);
        assert_eq!(nav.toggle_refresh_rate(), 60);
    }
}
