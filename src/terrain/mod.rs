//! # Procedural Terrain
//!
//! The ground is a seeded [`HeightField`] sampled over a regular grid by the
//! [`TerrainGenerator`]. The same height field also bounds camera motion, so it
//! is shared (`Rc`) between the terrain mesh and the camera boundary volume.

pub mod generator;
pub mod height_field;

pub use generator::{TerrainGenerator, TerrainMesh, TerrainParams};
pub use height_field::{HeightField, HeightSampler};
