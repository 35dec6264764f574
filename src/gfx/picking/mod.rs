//! # Object Picking
//!
//! Mouse ray-casting against world-space bounding boxes.
//!
//! 1. **Mouse to Ray**: unproject the cursor through the inverse view-projection
//! 2. **Ray-Box Intersection**: slab test against each candidate's transformed [`Aabb`]
//! 3. **Selection**: the closest hit wins
//!
//! ```no_run
//! use cgmath::{Matrix4, SquareMatrix};
//! use succuland::gfx::picking::{pick_nearest, screen_to_ray, Aabb};
//!
//! let (view, projection) = (Matrix4::identity(), Matrix4::identity());
//! let ray = screen_to_ray((400.0, 300.0), (800.0, 600.0), &view, &projection);
//! let boxes = vec![(0usize, Aabb::unit())];
//! let hit = pick_nearest(&ray, boxes);
//! ```

use cgmath::{ElementWise, InnerSpace, Matrix4, SquareMatrix, Vector3, Vector4, Zero};

/// A 3D ray for intersection testing
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vector3<f32>,
    /// Normalized direction
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl Aabb {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Box spanning -0.5..0.5 on every axis
    pub fn unit() -> Self {
        Self::new(Vector3::new(-0.5, -0.5, -0.5), Vector3::new(0.5, 0.5, 0.5))
    }

    /// Bounds of a vertex set, a degenerate box at the origin when empty
    pub fn from_vertices(vertices: &[[f32; 3]]) -> Self {
        let Some(first) = vertices.first() else {
            return Self::new(Vector3::zero(), Vector3::zero());
        };

        let mut min = Vector3::from(*first);
        let mut max = min;
        for vertex in &vertices[1..] {
            let v = Vector3::from(*vertex);
            min = Vector3::new(min.x.min(v.x), min.y.min(v.y), min.z.min(v.z));
            max = Vector3::new(max.x.max(v.x), max.y.max(v.y), max.z.max(v.z));
        }
        Self::new(min, max)
    }

    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    /// Slab test; returns the distance along the ray to the first hit
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let inv_dir = Vector3::new(
            1.0 / ray.direction.x,
            1.0 / ray.direction.y,
            1.0 / ray.direction.z,
        );

        let t_min = (self.min - ray.origin).mul_element_wise(inv_dir);
        let t_max = (self.max - ray.origin).mul_element_wise(inv_dir);

        let t_near = t_min.x.min(t_max.x).max(t_min.y.min(t_max.y)).max(t_min.z.min(t_max.z));
        let t_far = t_min.x.max(t_max.x).min(t_min.y.max(t_max.y)).min(t_min.z.max(t_max.z));

        if t_near <= t_far && t_far >= 0.0 {
            Some(if t_near >= 0.0 { t_near } else { t_far })
        } else {
            None
        }
    }

    /// Bounds of all eight transformed corners
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Self {
        let mut corners = [[0.0f32; 3]; 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            let p = Vector4::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
                1.0,
            );
            let t = matrix * p;
            *corner = [t.x / t.w, t.y / t.w, t.z / t.w];
        }
        Self::from_vertices(&corners)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickResult<K> {
    pub key: K,
    pub distance: f32,
    pub intersection_point: Vector3<f32>,
}

/// Convert screen coordinates to a world-space ray.
///
/// `projection` uses wgpu clip space (depth 0..1).
pub fn screen_to_ray(
    screen_pos: (f32, f32),
    screen_size: (f32, f32),
    view: &Matrix4<f32>,
    projection: &Matrix4<f32>,
) -> Ray {
    let (mouse_x, mouse_y) = screen_pos;
    let (width, height) = (screen_size.0.max(1.0), screen_size.1.max(1.0));

    let ndc_x = (2.0 * mouse_x) / width - 1.0;
    let ndc_y = 1.0 - (2.0 * mouse_y) / height;

    let inv_view_proj = (projection * view)
        .invert()
        .unwrap_or_else(Matrix4::identity);

    let unproject = |depth: f32| {
        let p = inv_view_proj * Vector4::new(ndc_x, ndc_y, depth, 1.0);
        Vector3::new(p.x / p.w, p.y / p.w, p.z / p.w)
    };
    let near = unproject(0.0);
    let far = unproject(1.0);

    Ray::new(near, far - near)
}

/// Closest candidate box hit by the ray
pub fn pick_nearest<K>(ray: &Ray, candidates: impl IntoIterator<Item = (K, Aabb)>) -> Option<PickResult<K>> {
    let mut closest: Option<PickResult<K>> = None;
    for (key, aabb) in candidates {
        if let Some(distance) = aabb.intersect_ray(ray) {
            if closest.as_ref().map_or(true, |c| distance < c.distance) {
                closest = Some(PickResult {
                    key,
                    distance,
                    intersection_point: ray.point_at(distance),
                });
            }
        }
    }
    closest
}
