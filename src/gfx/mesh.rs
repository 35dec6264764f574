//! Mesh storage
//!
//! A [`Mesh`] is CPU-side geometry plus an optional material reference. Scene
//! nodes never own meshes; they hold a [`MeshId`] into the [`MeshLibrary`], and
//! the rendering backend keeps its GPU buffers under the same id.

use crate::{
    error::WorldResult,
    gfx::{
        geometry::{GeometryData, MeshSource},
        picking::Aabb,
        resources::material::MaterialId,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub usize);

#[derive(Debug, Clone)]
pub struct Mesh {
    pub label: String,
    pub geometry: GeometryData,
    pub material: Option<MaterialId>,
    pub bounds: Aabb,
}

impl Mesh {
    pub fn new(label: impl Into<String>, geometry: GeometryData) -> Self {
        let bounds = geometry.bounds();
        Self {
            label: label.into(),
            geometry,
            material: None,
            bounds,
        }
    }

    pub fn from_source(source: &MeshSource) -> WorldResult<Self> {
        Ok(Self::new(source.label(), source.build()?))
    }

    pub fn with_material(mut self, material: impl Into<MaterialId>) -> Self {
        self.material = Some(material.into());
        self
    }
}

#[derive(Debug, Default)]
pub struct MeshLibrary {
    meshes: Vec<Mesh>,
}

impl MeshLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, mesh: Mesh) -> MeshId {
        self.meshes.push(mesh);
        MeshId(self.meshes.len() - 1)
    }

    pub fn get(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MeshId, &Mesh)> {
        self.meshes.iter().enumerate().map(|(i, m)| (MeshId(i), m))
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    #[test]
    fn test_library_hands_out_sequential_ids() {
        let mut library = MeshLibrary::new();
        let cube = library.add(Mesh::from_source(&MeshSource::Cube).unwrap());
        let quad = library.add(Mesh::from_source(&MeshSource::Quad).unwrap().with_material("smoke"));

        assert_eq!(cube, MeshId(0));
        assert_eq!(quad, MeshId(1));
        assert_eq!(library.get(quad).unwrap().material.as_deref(), Some("smoke"));
        assert!(library.get(MeshId(2)).is_none());
        assert_eq!(library.iter().count(), 2);
    }

    #[test]
    fn test_bounds_follow_geometry() {
        let mesh = Mesh::from_source(&MeshSource::Cube).unwrap();
        assert_eq!(mesh.label, "cube");
        assert_eq!(mesh.bounds.min, Vector3::new(-0.5, -0.5, -0.5));
        assert_eq!(mesh.bounds.max, Vector3::new(0.5, 0.5, 0.5));
    }
}
