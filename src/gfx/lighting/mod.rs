//! # Lighting
//!
//! [`Light`] values are reusable definitions without a placement. Each frame the
//! scene graph registers placed copies into the [`LightRegistry`], which is then
//! flattened into [`GpuLight`] records for the shading stage.

pub mod light;
pub mod registry;

pub use light::{Attenuation, GpuLight, Light, LightKind};
pub use registry::{LightRecord, LightRegistry};
