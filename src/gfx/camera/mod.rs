pub mod boundary;
pub mod camera;
pub mod camera_controller;
pub mod camera_utils;
pub mod navigation;

// Re-export main types
pub use boundary::{BoundaryCheck, BoundaryVolume};
pub use camera::{Camera, CameraMode, MoveDirection, MoveOutcome, OrbitParams, Projection};
pub use camera_controller::CameraController;
pub use camera_utils::OPENGL_TO_WGPU_MATRIX;
pub use navigation::{CameraEvent, CameraId, NavigationContext};
