//! First-person camera with free-fly and orbit modes
//!
//! A camera is either locked (static viewpoint) or dynamic. Dynamic cameras can
//! fly freely under pointer/keyboard control and can circle a focus point; both
//! flags are independent, a camera with neither set is idle. Mode changes that
//! involve other cameras go through [`NavigationContext`].
//!
//! [`NavigationContext`]: super::navigation::NavigationContext

use cgmath::{perspective, Deg, InnerSpace, Matrix4, Point3, SquareMatrix, Vector3};

use super::{
    boundary::{BoundaryCheck, BoundaryVolume},
    camera_utils::{
        angles_from_direction, direction_from_angles, up_from_angles, wrap_degrees,
        OPENGL_TO_WGPU_MATRIX,
    },
    CameraId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    Locked,
    Idle,
    Free,
    Orbiting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Forward,
    Backward,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveOutcome {
    /// Camera is locked or not in free mode
    Ignored,
    Moved,
    /// Candidate left the boundary volume
    Rejected,
    /// Candidate hit the ceiling; `at` is the unchanged camera position
    CeilingHit { at: Vector3<f32> },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub fov: Deg<f32>,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov: Deg(80.0),
            near: 0.01,
            far: 150.0,
        }
    }
}

/// Circle followed while orbiting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitParams {
    pub focus: Vector3<f32>,
    pub elevation: f32,
    pub radius: f32,
}

impl Default for OrbitParams {
    fn default() -> Self {
        Self {
            focus: Vector3::new(0.0, 0.0, 0.0),
            elevation: 20.0,
            radius: 40.0,
        }
    }
}

impl OrbitParams {
    /// Orbit position for angle `alpha` in radians
    pub fn position_at(&self, alpha: f32) -> Vector3<f32> {
        let (sin, cos) = alpha.sin_cos();
        self.focus + Vector3::new(sin * self.radius, self.elevation, cos * self.radius)
    }
}

#[derive(Debug, Clone)]
pub struct Camera {
    pub name: String,
    position: Vector3<f32>,
    direction: Vector3<f32>,
    up: Vector3<f32>,
    /// Degrees, `[0, 360)`
    yaw: f32,
    /// Degrees, `[-90, 90]`
    pitch: f32,

    speed: f32,
    pub sensitivity: f32,
    projection_params: Projection,

    locked: bool,
    pub(super) free_mode: bool,
    pub(super) circling: bool,
    pub orbit: OrbitParams,
    boundary: Option<BoundaryVolume>,
    /// Camera to hand activity back to once this one is idle again
    pub(super) last_active: Option<CameraId>,

    view: Matrix4<f32>,
    projection: Matrix4<f32>,
}

impl Camera {
    /// A locked camera: fixed viewpoint, ignores every mode toggle and move
    pub fn fixed(
        name: &str,
        position: Vector3<f32>,
        direction: Vector3<f32>,
        projection: Projection,
    ) -> Self {
        let mut camera = Self::with_orientation(name, position, direction, projection);
        camera.locked = true;
        camera
    }

    /// An unlocked camera, optionally constrained by a boundary volume
    pub fn dynamic(
        name: &str,
        position: Vector3<f32>,
        direction: Vector3<f32>,
        projection: Projection,
        speed: f32,
        boundary: Option<BoundaryVolume>,
    ) -> Self {
        let mut camera = Self::with_orientation(name, position, direction, projection);
        camera.speed = speed;
        camera.boundary = boundary;
        camera
    }

    fn with_orientation(
        name: &str,
        position: Vector3<f32>,
        direction: Vector3<f32>,
        projection: Projection,
    ) -> Self {
        let (yaw, pitch) = if direction.magnitude2() > f32::EPSILON {
            angles_from_direction(direction)
        } else {
            (0.0, 0.0)
        };

        Self {
            name: name.to_string(),
            position,
            direction: direction_from_angles(yaw, pitch),
            up: up_from_angles(yaw, pitch),
            yaw,
            pitch,
            speed: 0.0,
            sensitivity: 1.5,
            projection_params: projection,
            locked: false,
            free_mode: false,
            circling: false,
            orbit: OrbitParams::default(),
            boundary: None,
            last_active: None,
            view: Matrix4::identity(),
            projection: Matrix4::identity(),
        }
    }

    pub fn mode(&self) -> CameraMode {
        if self.locked {
            CameraMode::Locked
        } else if self.free_mode {
            CameraMode::Free
        } else if self.circling {
            CameraMode::Orbiting
        } else {
            CameraMode::Idle
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_free(&self) -> bool {
        self.free_mode
    }

    pub fn is_circling(&self) -> bool {
        self.circling
    }

    /// Neither flying nor circling
    pub fn is_idle(&self) -> bool {
        !self.free_mode && !self.circling
    }

    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    pub fn direction(&self) -> Vector3<f32> {
        self.direction
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn boundary(&self) -> Option<&BoundaryVolume> {
        self.boundary.as_ref()
    }

    pub fn projection_parameters(&self) -> Projection {
        self.projection_params
    }

    pub fn set_projection_parameters(&mut self, fov: Deg<f32>, near: f32, far: f32) {
        self.projection_params = Projection { fov, near, far };
    }

    /// Rotates by yaw/pitch deltas in degrees; roll is not supported.
    pub fn rotate_view(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw = wrap_degrees(self.yaw + delta_yaw);
        self.pitch = (self.pitch + delta_pitch).clamp(-90.0, 90.0);
        self.direction = direction_from_angles(self.yaw, self.pitch);
        self.up = up_from_angles(self.yaw, self.pitch);
    }

    pub fn move_forward(&mut self, refresh_rate: u32) -> MoveOutcome {
        self.step(MoveDirection::Forward, refresh_rate)
    }

    pub fn move_backward(&mut self, refresh_rate: u32) -> MoveOutcome {
        self.step(MoveDirection::Backward, refresh_rate)
    }

    pub fn move_left(&mut self, refresh_rate: u32) -> MoveOutcome {
        self.step(MoveDirection::Left, refresh_rate)
    }

    pub fn move_right(&mut self, refresh_rate: u32) -> MoveOutcome {
        self.step(MoveDirection::Right, refresh_rate)
    }

    /// Moves one input tick worth of distance (`speed / refresh_rate`)
    pub fn step(&mut self, direction: MoveDirection, refresh_rate: u32) -> MoveOutcome {
        if !self.free_mode || self.locked {
            return MoveOutcome::Ignored;
        }

        let distance = self.speed / refresh_rate.max(1) as f32;
        let forward = self.direction.normalize();
        let right = forward.cross(self.up).normalize();
        let offset = match direction {
            MoveDirection::Forward => forward,
            MoveDirection::Backward => -forward,
            MoveDirection::Left => -right,
            MoveDirection::Right => right,
        } * distance;

        self.try_move_to(self.position + offset)
    }

    fn try_move_to(&mut self, candidate: Vector3<f32>) -> MoveOutcome {
        let check = self
            .boundary
            .as_ref()
            .map_or(BoundaryCheck::Inside, |b| b.check(candidate));

        match check {
            BoundaryCheck::Inside => {
                self.position = candidate;
                MoveOutcome::Moved
            }
            BoundaryCheck::Ceiling => MoveOutcome::CeilingHit { at: self.position },
            BoundaryCheck::Outside => MoveOutcome::Rejected,
        }
    }

    /// Places the camera on its orbit for angle `alpha` (radians).
    ///
    /// Unless flying freely at the same time, the camera also turns to face the
    /// focus point.
    pub fn orbit_step(&mut self, alpha: f32) {
        self.position = self.orbit.position_at(alpha);
        if self.free_mode {
            return;
        }

        let to_focus = self.orbit.focus - self.position;
        if to_focus.magnitude2() <= f32::EPSILON {
            return;
        }
        let direction = to_focus.normalize();
        let up = (-Vector3::unit_y()).cross(direction).cross(direction);
        if up.magnitude2() <= f32::EPSILON {
            return;
        }

        self.direction = direction;
        self.up = up.normalize();
        let (yaw, pitch) = angles_from_direction(direction);
        self.yaw = yaw;
        self.pitch = pitch;
    }

    /// Recomputes view and projection for the current viewport size.
    pub fn update_matrices(&mut self, width: u32, height: u32) {
        let eye = Point3::new(self.position.x, self.position.y, self.position.z);
        self.view = Matrix4::look_at_rh(eye, eye + self.direction, self.up);

        let aspect = width.max(1) as f32 / height.max(1) as f32;
        let Projection { fov, near, far } = self.projection_params;
        self.projection = OPENGL_TO_WGPU_MATRIX * perspective(fov, aspect, near, far);
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.view
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.projection
    }
}
