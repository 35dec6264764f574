//! OBJ asset import
//!
//! All models in a file are merged into one triangle list. Normals missing
//! from the file are rebuilt by averaging face normals.

use std::path::Path;

use crate::{
    error::{WorldError, WorldResult},
    gfx::{
        geometry::{compute_vertex_normals, GeometryData},
        resources::material::Material,
    },
};

/// Geometry and the material of the first model that names one
#[derive(Debug, Clone)]
pub struct ImportedAsset {
    pub geometry: GeometryData,
    pub material: Option<Material>,
}

pub fn import(path: &Path) -> WorldResult<ImportedAsset> {
    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|source| WorldError::AssetImport {
        path: path.to_path_buf(),
        source,
    })?;

    let materials = materials.unwrap_or_else(|err| {
        log::warn!("no usable MTL for {}: {}", path.display(), err);
        Vec::new()
    });

    let mut geometry = GeometryData::new();
    for model in &models {
        geometry.append(&model_geometry(&model.mesh));
    }

    let material = models
        .iter()
        .find_map(|m| m.mesh.material_id)
        .and_then(|id| materials.get(id).map(|mtl| (id, mtl)))
        .map(|(id, mtl)| Material::from_mtl(mtl, &format!("material_{id}"), path.parent()));

    log::info!(
        "imported {}: {} models, {} vertices, {} indices",
        path.display(),
        models.len(),
        geometry.vertex_count(),
        geometry.index_count()
    );

    Ok(ImportedAsset { geometry, material })
}

fn model_geometry(mesh: &tobj::Mesh) -> GeometryData {
    let vertices: Vec<[f32; 3]> = mesh
        .positions
        .chunks_exact(3)
        .map(|p| [p[0], p[1], p[2]])
        .collect();

    let normals = if !mesh.normals.is_empty() && mesh.normals.len() == mesh.positions.len() {
        mesh.normals
            .chunks_exact(3)
            .map(|n| [n[0], n[1], n[2]])
            .collect()
    } else {
        compute_vertex_normals(&vertices, &mesh.indices)
    };

    // OBJ puts v = 0 at the bottom of the image, wgpu at the top
    let tex_coords = if mesh.texcoords.len() / 2 == vertices.len() {
        mesh.texcoords
            .chunks_exact(2)
            .map(|t| [t[0], 1.0 - t[1]])
            .collect()
    } else {
        Vec::new()
    };

    GeometryData {
        vertices,
        tex_coords,
        normals,
        indices: mesh.indices.clone(),
        ..GeometryData::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_import_error() {
        let result = import(Path::new("no/such/asset.obj"));
        assert!(matches!(result, Err(WorldError::AssetImport { .. })));
    }

    #[test]
    fn test_model_without_normals_gets_computed_ones() {
        let mesh = tobj::Mesh {
            positions: vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0],
            indices: vec![0, 1, 2],
            ..Default::default()
        };
        let geometry = model_geometry(&mesh);
        assert_eq!(geometry.vertex_count(), 3);
        assert!(geometry.tex_coords.is_empty());
        for normal in &geometry.normals {
            assert!((normal[1] - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_tex_coords_are_flipped() {
        let mesh = tobj::Mesh {
            positions: vec![0.0; 6],
            texcoords: vec![0.25, 0.0, 0.5, 1.0],
            indices: vec![],
            ..Default::default()
        };
        let geometry = model_geometry(&mesh);
        assert_eq!(geometry.tex_coords, vec![[0.25, 1.0], [0.5, 0.0]]);
    }
}
