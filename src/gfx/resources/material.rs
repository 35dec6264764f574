//! Material definitions for Phong shading
//!
//! Materials are plain data stored in a [`MaterialLibrary`]; meshes reference
//! them by [`MaterialId`]. Texture map paths are carried through untouched for
//! the rendering backend to resolve.

use std::{collections::HashMap, path::PathBuf};

/// Material ID for referencing materials
pub type MaterialId = String;

pub const DEFAULT_MATERIAL: &str = "default";

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub shininess: f32,
    pub diffuse_map: Option<PathBuf>,
    pub specular_map: Option<PathBuf>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: DEFAULT_MATERIAL.to_string(),
            ambient: [0.2, 0.2, 0.2],
            diffuse: [0.8, 0.8, 0.8],
            specular: [0.3, 0.3, 0.3],
            shininess: 32.0,
            diffuse_map: None,
            specular_map: None,
        }
    }
}

impl Material {
    pub fn new(name: &str, diffuse: [f32; 3]) -> Self {
        Self {
            name: name.to_string(),
            ambient: diffuse.map(|c| c * 0.25),
            diffuse,
            ..Default::default()
        }
    }

    /// Converts an MTL entry; map paths are resolved against `base_dir`.
    pub fn from_mtl(mtl: &tobj::Material, fallback_name: &str, base_dir: Option<&std::path::Path>) -> Self {
        let defaults = Material::default();
        let resolve = |map: &Option<String>| {
            map.as_ref().map(|m| match base_dir {
                Some(dir) => dir.join(m),
                None => PathBuf::from(m),
            })
        };

        Self {
            name: if mtl.name.is_empty() {
                fallback_name.to_string()
            } else {
                mtl.name.clone()
            },
            ambient: mtl.ambient.unwrap_or(defaults.ambient),
            diffuse: mtl.diffuse.unwrap_or(defaults.diffuse),
            specular: mtl.specular.unwrap_or(defaults.specular),
            shininess: mtl.shininess.unwrap_or(defaults.shininess).max(1.0),
            diffuse_map: resolve(&mtl.diffuse_texture),
            specular_map: resolve(&mtl.specular_texture),
        }
    }
}

/// Centralized storage for all materials, always holding a default entry
pub struct MaterialLibrary {
    materials: HashMap<MaterialId, Material>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        let mut materials = HashMap::new();
        materials.insert(DEFAULT_MATERIAL.to_string(), Material::default());
        Self { materials }
    }

    /// Adds a material, keeping an existing entry with the same name
    pub fn add(&mut self, material: Material) -> MaterialId {
        let id = material.name.clone();
        self.materials.entry(id.clone()).or_insert(material);
        id
    }

    pub fn get(&self, id: &str) -> Option<&Material> {
        self.materials.get(id)
    }

    /// Material lookup with fallback to the default entry
    pub fn resolve(&self, id: Option<&str>) -> &Material {
        id.and_then(|id| self.materials.get(id))
            .or_else(|| self.materials.get(DEFAULT_MATERIAL))
            .unwrap_or(&FALLBACK)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl Default for MaterialLibrary {
    fn default() -> Self {
        Self::new()
    }
}

static FALLBACK: Material = Material {
    name: String::new(),
    ambient: [0.2, 0.2, 0.2],
    diffuse: [0.8, 0.8, 0.8],
    specular: [0.3, 0.3, 0.3],
    shininess: 32.0,
    diffuse_map: None,
    specular_map: None,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_starts_with_default() {
        let library = MaterialLibrary::new();
        assert_eq!(library.len(), 1);
        assert_eq!(library.resolve(None).name, DEFAULT_MATERIAL);
        assert_eq!(library.resolve(Some("missing")).name, DEFAULT_MATERIAL);
    }

    #[test]
    fn test_add_keeps_first_definition() {
        let mut library = MaterialLibrary::new();
        let id = library.add(Material::new("sand", [0.9, 0.8, 0.5]));
        library.add(Material::new("sand", [0.0, 0.0, 0.0]));
        assert_eq!(library.len(), 2);
        assert_eq!(library.get(&id).unwrap().diffuse, [0.9, 0.8, 0.5]);
    }

    #[test]
    fn test_from_mtl_fills_defaults() {
        let mtl = tobj::Material {
            diffuse: Some([0.1, 0.6, 0.2]),
            diffuse_texture: Some("cactus.png".to_string()),
            ..Default::default()
        };
        let material = Material::from_mtl(&mtl, "material_0", Some(std::path::Path::new("objects")));
        assert_eq!(material.name, "material_0");
        assert_eq!(material.diffuse, [0.1, 0.6, 0.2]);
        assert_eq!(material.shininess, 32.0);
        assert_eq!(
            material.diffuse_map,
            Some(PathBuf::from("objects").join("cactus.png"))
        );
        assert_eq!(material.specular_map, None);
    }
}
