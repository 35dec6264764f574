//! # Primitive Shape Generation
//!
//! Built-in shapes used where no asset is available: the cube stands in for
//! light bulbs and for missing OBJ files, the quad carries particle sprites.
//! Both come with outward normals and `[0, 1]` texture coordinates.

use super::GeometryData;

/// Corner offsets of one face in its own (u, v) basis, counter-clockwise
const FACE_CORNERS: [([f32; 2], [f32; 2]); 4] = [
    ([-0.5, -0.5], [0.0, 0.0]),
    ([0.5, -0.5], [1.0, 0.0]),
    ([0.5, 0.5], [1.0, 1.0]),
    ([-0.5, 0.5], [0.0, 1.0]),
];

const FACE_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

/// (normal, u axis, v axis) per cube face, with `u x v == normal`
const CUBE_FACES: [[[f32; 3]; 3]; 6] = [
    [[0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
    [[0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
    [[-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]],
    [[1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]],
    [[0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]],
    [[0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
];

fn push_face(data: &mut GeometryData, center: [f32; 3], normal: [f32; 3], u: [f32; 3], v: [f32; 3]) {
    let base = data.vertices.len() as u32;
    for (offset, uv) in FACE_CORNERS {
        let position = [
            center[0] + u[0] * offset[0] + v[0] * offset[1],
            center[1] + u[1] * offset[0] + v[1] * offset[1],
            center[2] + u[2] * offset[0] + v[2] * offset[1],
        ];
        data.vertices.push(position);
        data.normals.push(normal);
        data.tex_coords.push(uv);
    }
    data.indices.extend(FACE_INDICES.iter().map(|i| base + i));
}

/// Generate a unit cube centered at the origin
///
/// Returns 24 vertices (four per face, so normals stay flat) spanning -0.5 to 0.5.
pub fn generate_cube() -> GeometryData {
    let mut data = GeometryData::new();
    for [normal, u, v] in CUBE_FACES {
        let center = [normal[0] * 0.5, normal[1] * 0.5, normal[2] * 0.5];
        push_face(&mut data, center, normal, u, v);
    }
    data
}

/// Generate a unit quad in the XY plane facing +Z
pub fn generate_quad() -> GeometryData {
    let mut data = GeometryData::new();
    push_face(
        &mut data,
        [0.0, 0.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
    );
    data
}
