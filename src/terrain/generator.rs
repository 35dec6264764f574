//! Terrain grid generation
//!
//! A `width x length` grid centered on the origin is lifted by a height sampler.
//! Rows are emitted as triangle strips: strip `i` interleaves row `i` with row
//! `i + 1`, so a grid yields `length - 1` strips of `2 * width` indices.

use cgmath::{InnerSpace, Vector3};

use crate::{
    config::WorldConfig,
    error::{WorldError, WorldResult},
    gfx::geometry::{GeometryData, Topology},
    terrain::HeightSampler,
};

const UP: [f32; 3] = [0.0, 1.0, 0.0];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainParams {
    /// Vertices along X
    pub width: u32,
    /// Vertices along Z
    pub length: u32,
    /// Finite-difference offset for normals
    pub normal_offset: f32,
    /// Texture coordinate step between neighbouring vertices
    pub tex_coord_spacing: f32,
}

impl TerrainParams {
    pub fn new(width: u32, length: u32) -> Self {
        Self {
            width,
            length,
            normal_offset: 0.2,
            tex_coord_spacing: 0.05,
        }
    }

    pub fn from_config(config: &WorldConfig) -> Self {
        Self {
            width: config.terrain_width,
            length: config.terrain_length,
            normal_offset: config.normal_offset,
            tex_coord_spacing: config.tex_coord_spacing,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.width as usize * self.length as usize
    }

    pub fn index_count(&self) -> usize {
        self.width as usize * 2 * (self.length as usize).saturating_sub(1)
    }
}

/// Generated terrain plus generation statistics
#[derive(Debug, Clone)]
pub struct TerrainMesh {
    pub geometry: GeometryData,
    /// Vertices whose normal fell back to straight up
    pub degenerate_normals: usize,
}

pub struct TerrainGenerator<'a> {
    ground: &'a dyn HeightSampler,
    params: TerrainParams,
}

impl<'a> TerrainGenerator<'a> {
    pub fn new(ground: &'a dyn HeightSampler, params: TerrainParams) -> WorldResult<Self> {
        if params.width < 2 || params.length < 2 {
            return Err(WorldError::configuration(format!(
                "terrain grid must be at least 2x2, got {}x{}",
                params.width, params.length
            )));
        }
        if !(params.normal_offset.is_finite() && params.normal_offset >= 0.0) {
            return Err(WorldError::configuration(format!(
                "invalid terrain normal offset {}",
                params.normal_offset
            )));
        }
        Ok(Self { ground, params })
    }

    pub fn params(&self) -> TerrainParams {
        self.params
    }

    pub fn generate(&self) -> TerrainMesh {
        let TerrainParams {
            width,
            length,
            tex_coord_spacing,
            ..
        } = self.params;
        let half_width = width as f32 / 2.0;
        let half_length = length as f32 / 2.0;

        let mut geometry = GeometryData::new();
        geometry.vertices.reserve(self.params.vertex_count());
        geometry.normals.reserve(self.params.vertex_count());
        geometry.tex_coords.reserve(self.params.vertex_count());
        let mut degenerate_normals = 0;

        let mut v = 0.0f32;
        for i in 0..length {
            let z = -half_length + i as f32;
            let mut u = 0.0f32;
            for j in 0..width {
                let x = -half_width + j as f32;
                geometry.vertices.push([x, self.ground.sample(x, z), z]);

                let normal = self.normal_at(x, z).unwrap_or_else(|| {
                    degenerate_normals += 1;
                    UP
                });
                geometry.normals.push(normal);

                geometry.tex_coords.push([u, v]);
                u += tex_coord_spacing;
            }
            v += tex_coord_spacing;
        }

        geometry.indices.reserve(self.params.index_count());
        for i in 0..length - 1 {
            for j in 0..width {
                geometry.indices.push(i * width + j);
                geometry.indices.push((i + 1) * width + j);
            }
        }
        geometry.topology = Topology::TriangleStrips {
            strips: length - 1,
            strip_len: 2 * width,
        };

        log::debug!(
            "generated terrain {}x{}: {} vertices, {} indices, {} degenerate normals",
            width,
            length,
            geometry.vertex_count(),
            geometry.index_count(),
            degenerate_normals
        );

        TerrainMesh {
            geometry,
            degenerate_normals,
        }
    }

    /// Finite-difference surface normal, `None` when the cross product is
    /// zero-length or not finite.
    pub fn normal_at(&self, x: f32, z: f32) -> Option<[f32; 3]> {
        let d = self.params.normal_offset;
        let point = |px: f32, pz: f32| Vector3::new(px, self.ground.sample(px, pz), pz);

        let up = point(x + d, z);
        let right = point(x, z + d);
        let down = point(x - d, z);
        let left = point(x, z - d);

        let n = (right - left).cross(up - down);
        let length = n.magnitude();
        if !length.is_finite() || length <= f32::EPSILON {
            return None;
        }
        let n = n / length;
        Some([n.x, n.y, n.z])
    }
}
