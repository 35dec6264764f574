//! # Succuland prelude
//!
//! Commonly used types in one import:
//!
//! ```rust
//! use succuland::prelude::*;
//!
//! let ground = HeightField::new(DEFAULT_SEED, HeightFieldParams::default());
//! assert_eq!(ground.sample(3.0, 4.0), ground.sample(3.0, 4.0));
//! ```

pub use crate::app::SuccuApp;
pub use crate::config::{load_seed, FogParams, HeightFieldParams, WorldConfig, DEFAULT_SEED};
pub use crate::error::{WorldError, WorldResult};
pub use crate::world::{FrameReport, World};

pub use crate::gfx::camera::{BoundaryVolume, Camera, CameraId, MoveDirection, NavigationContext};
pub use crate::gfx::lighting::{Light, LightRegistry};
pub use crate::gfx::rendering::{DrawRequest, DrawStyle, RenderBackend, WgpuBackend};
pub use crate::gfx::scene::SceneNode;

pub use crate::input::{Action, InputState};
pub use crate::terrain::{HeightField, HeightSampler, TerrainGenerator, TerrainParams};
