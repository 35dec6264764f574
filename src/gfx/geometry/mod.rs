//! # Geometry Generation
//!
//! Every mesh in the world is a single [`GeometryData`] value: flat attribute
//! arrays, an index buffer and a [`Topology`]. Where the data comes from is
//! decided by a [`MeshSource`]: procedural terrain, an imported OBJ asset or one
//! of the built-in primitives.
//!
//! ## Usage
//!
//! ```no_run
//! use succuland::gfx::geometry::{generate_cube, MeshSource};
//!
//! let cube = generate_cube();
//! assert_eq!(cube.vertex_count(), 24);
//!
//! let imported = MeshSource::Imported("objects/Cactus/Cactus.obj".into()).build();
//! ```

pub mod obj;
pub mod primitives;

use std::{ops::Range, path::PathBuf, rc::Rc};

use cgmath::{InnerSpace, Vector3, Zero};

pub use primitives::*;

use crate::{
    error::WorldResult,
    gfx::{picking::Aabb, scene::vertex::Vertex3D},
    terrain::{HeightSampler, TerrainGenerator, TerrainParams},
};

/// How the index buffer is assembled into primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    TriangleList,
    /// `strips` consecutive strips of `strip_len` indices each
    TriangleStrips { strips: u32, strip_len: u32 },
}

/// Which optional vertex attributes a mesh carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VertexLayout {
    pub normals: bool,
    pub tex_coords: bool,
}

impl VertexLayout {
    pub const POSITION_ONLY: Self = Self {
        normals: false,
        tex_coords: false,
    };

    pub const FULL: Self = Self {
        normals: true,
        tex_coords: true,
    };
}

/// Represents generated geometry data ready for GPU upload
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Texture coordinates (u, v), empty when the layout has none
    pub tex_coords: Vec<[f32; 2]>,
    /// Normal vectors (x, y, z), empty when the layout has none
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub topology: Topology,
}

impl GeometryData {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            tex_coords: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
            topology: Topology::TriangleList,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn layout(&self) -> VertexLayout {
        VertexLayout {
            normals: !self.normals.is_empty(),
            tex_coords: !self.tex_coords.is_empty(),
        }
    }

    /// Index ranges to issue one draw per primitive batch.
    ///
    /// A triangle list is a single range; terrain strips yield one range per row pair.
    pub fn draw_ranges(&self) -> Vec<Range<u32>> {
        match self.topology {
            Topology::TriangleList => vec![0..self.indices.len() as u32],
            Topology::TriangleStrips { strips, strip_len } => (0..strips)
                .map(|s| s * strip_len..(s + 1) * strip_len)
                .collect(),
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_vertices(&self.vertices)
    }

    /// Interleaves attributes into the renderer's vertex format.
    ///
    /// Missing normals default to +Y and missing texture coordinates to zero.
    pub fn to_vertices(&self) -> Vec<Vertex3D> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, position)| Vertex3D {
                position: *position,
                normal: self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                tex_coords: self.tex_coords.get(i).copied().unwrap_or([0.0, 0.0]),
            })
            .collect()
    }

    /// Appends another triangle list, rebasing its indices
    pub fn append(&mut self, other: &GeometryData) {
        let base = self.vertices.len() as u32;
        let layout = self.layout();
        let keep_normals = self.vertices.is_empty() || layout.normals;
        let keep_tex = self.vertices.is_empty() || layout.tex_coords;

        self.vertices.extend_from_slice(&other.vertices);
        if keep_normals && other.normals.len() == other.vertices.len() {
            self.normals.extend_from_slice(&other.normals);
        } else {
            self.normals.clear();
        }
        if keep_tex && other.tex_coords.len() == other.vertices.len() {
            self.tex_coords.extend_from_slice(&other.tex_coords);
        } else {
            self.tex_coords.clear();
        }
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }
}

impl Default for GeometryData {
    fn default() -> Self {
        Self::new()
    }
}

/// Averages face normals into per-vertex normals for an indexed triangle list
pub fn compute_vertex_normals(vertices: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut normals = vec![Vector3::zero(); vertices.len()];

    for triangle in indices.chunks_exact(3) {
        let [i0, i1, i2] = [
            triangle[0] as usize,
            triangle[1] as usize,
            triangle[2] as usize,
        ];
        if i0 >= vertices.len() || i1 >= vertices.len() || i2 >= vertices.len() {
            continue;
        }
        let v0 = Vector3::from(vertices[i0]);
        let face = (Vector3::from(vertices[i1]) - v0).cross(Vector3::from(vertices[i2]) - v0);
        for idx in [i0, i1, i2] {
            normals[idx] += face;
        }
    }

    normals
        .into_iter()
        .map(|normal: Vector3<f32>| {
            if normal.magnitude2() > f32::EPSILON * f32::EPSILON {
                normal.normalize().into()
            } else {
                [0.0, 1.0, 0.0]
            }
        })
        .collect()
}

/// Where a mesh's geometry comes from
#[derive(Clone)]
pub enum MeshSource {
    Terrain {
        ground: Rc<dyn HeightSampler>,
        params: TerrainParams,
    },
    Imported(PathBuf),
    Cube,
    Quad,
}

impl MeshSource {
    pub fn build(&self) -> WorldResult<GeometryData> {
        match self {
            MeshSource::Terrain { ground, params } => {
                let terrain = TerrainGenerator::new(ground.as_ref(), *params)?.generate();
                Ok(terrain.geometry)
            }
            MeshSource::Imported(path) => Ok(obj::import(path)?.geometry),
            MeshSource::Cube => Ok(generate_cube()),
            MeshSource::Quad => Ok(generate_quad()),
        }
    }

    pub fn label(&self) -> String {
        match self {
            MeshSource::Terrain { params, .. } => {
                format!("terrain {}x{}", params.width, params.length)
            }
            MeshSource::Imported(path) => path.display().to_string(),
            MeshSource::Cube => "cube".to_string(),
            MeshSource::Quad => "quad".to_string(),
        }
    }
}

impl std::fmt::Debug for MeshSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MeshSource({})", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_ranges_for_strips() {
        let mut data = GeometryData::new();
        data.indices = (0..24).collect();
        data.topology = Topology::TriangleStrips {
            strips: 2,
            strip_len: 12,
        };
        assert_eq!(data.draw_ranges(), vec![0..12, 12..24]);
    }

    #[test]
    fn test_layout_tracks_attributes() {
        let mut data = generate_cube();
        assert_eq!(data.layout(), VertexLayout::FULL);
        data.tex_coords.clear();
        assert!(data.layout().normals);
        assert!(!data.layout().tex_coords);
    }

    #[test]
    fn test_to_vertices_fills_missing_attributes() {
        let mut data = GeometryData::new();
        data.vertices = vec![[1.0, 2.0, 3.0]];
        let vertices = data.to_vertices();
        assert_eq!(vertices[0].normal, [0.0, 1.0, 0.0]);
        assert_eq!(vertices[0].tex_coords, [0.0, 0.0]);
    }

    #[test]
    fn test_vertex_normals_of_flat_triangle() {
        let vertices = [[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]];
        let normals = compute_vertex_normals(&vertices, &[0, 1, 2]);
        for n in normals {
            assert!((n[1] - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_vertex_normals_average_shared_edges() {
        // Two faces folded 90 degrees along the z axis
        let vertices = [
            [0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 0.0],
            [0.0, -1.0, 0.0],
            [5.0, 5.0, 5.0],
        ];
        let normals = compute_vertex_normals(&vertices, &[0, 1, 2, 0, 3, 1]);

        let half = std::f32::consts::FRAC_1_SQRT_2;
        assert!((normals[0][0] + half).abs() < 1e-5);
        assert!((normals[0][1] - half).abs() < 1e-5);
        assert!((normals[2][1] - 1.0).abs() < 1e-5);
        assert!((normals[3][0] + 1.0).abs() < 1e-5);
        assert_eq!(normals[4], [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_append_rebases_indices() {
        let mut merged = generate_quad();
        let quad = generate_quad();
        merged.append(&quad);
        assert_eq!(merged.vertex_count(), 8);
        assert_eq!(merged.indices[6..], [4, 5, 6, 6, 7, 4]);
        assert_eq!(merged.layout(), VertexLayout::FULL);
    }

    #[test]
    fn test_mesh_source_builds_terrain() {
        let ground: Rc<dyn HeightSampler> = Rc::new(|_x: f32, _z: f32| 0.0f32);
        let source = MeshSource::Terrain {
            ground,
            params: TerrainParams::new(4, 3),
        };
        let data = source.build().unwrap();
        assert_eq!(data.vertex_count(), 12);
        assert_eq!(data.index_count(), 16);
    }
}
