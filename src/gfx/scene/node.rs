//! Scene graph node
//!
//! Parents own their children. A node stores the transform accumulated from
//! its construction-time local transform and every delta applied to it since;
//! parent transforms reach a child once, when it is attached.

use std::time::Duration;

use cgmath::{Deg, EuclideanSpace, InnerSpace, Matrix3, Matrix4, Point3, SquareMatrix, Vector3};

use crate::{
    error::WorldResult,
    gfx::{
        camera::Camera,
        lighting::{Light, LightRegistry},
        mesh::MeshId,
        rendering::backend::{DrawRequest, DrawStyle, RenderBackend},
    },
};

/// Light carried by a node, placed at the node's world position
#[derive(Debug, Clone, Copy)]
pub struct LightAttachment {
    pub light: Light,
    pub direction: Vector3<f32>,
}

/// Circles a target while pointing at it
#[derive(Debug, Clone, Copy)]
pub struct OrbitAnimation {
    pub target: Option<Vector3<f32>>,
    pub elevation: f32,
    pub radius: f32,
    /// Applied before the orbit placement, orients the model
    pub initial: Matrix4<f32>,
}

impl OrbitAnimation {
    /// Milliseconds per radian of orbit
    pub const MS_PER_RADIAN: f32 = 100.0;

    pub fn new(elevation: f32, radius: f32, initial: Matrix4<f32>) -> Self {
        Self {
            target: None,
            elevation,
            radius,
            initial,
        }
    }

    /// World transform at `elapsed`, or `None` without a target
    pub fn transform_at(&self, elapsed: Duration) -> Option<Matrix4<f32>> {
        let target = self.target?;
        let alpha = elapsed.as_millis() as f32 / Self::MS_PER_RADIAN;
        let eye = target
            + Vector3::new(
                alpha.sin() * self.radius,
                self.elevation,
                alpha.cos() * self.radius,
            );
        let view = Matrix4::look_at_rh(
            Point3::from_vec(eye),
            Point3::from_vec(target),
            Vector3::unit_y(),
        );
        view.invert().map(|placement| placement * self.initial)
    }
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    name: String,
    local: Matrix4<f32>,
    world: Matrix4<f32>,
    position: Vector3<f32>,
    children: Vec<SceneNode>,
    mesh: Option<MeshId>,
    style: DrawStyle,
    light: Option<LightAttachment>,
    animation: Option<OrbitAnimation>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, local: Matrix4<f32>) -> Self {
        Self {
            name: name.into(),
            local,
            world: local,
            position: local.w.truncate(),
            children: Vec::new(),
            mesh: None,
            style: DrawStyle::Lit,
            light: None,
            animation: None,
        }
    }

    /// Grouping node at the origin
    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, Matrix4::identity())
    }

    pub fn with_mesh(mut self, mesh: MeshId) -> Self {
        self.mesh = Some(mesh);
        self
    }

    /// Point lights with geometry render it as an emissive source
    pub fn with_light(mut self, light: Light, direction: Vector3<f32>) -> Self {
        if light.has_visible_source() {
            self.style = DrawStyle::Emissive;
        }
        self.light = Some(LightAttachment { light, direction });
        self
    }

    pub fn with_animation(mut self, animation: OrbitAnimation) -> Self {
        self.animation = Some(animation);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn local_transform(&self) -> Matrix4<f32> {
        self.local
    }

    pub fn world_transform(&self) -> Matrix4<f32> {
        self.world
    }

    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    pub fn mesh(&self) -> Option<MeshId> {
        self.mesh
    }

    pub fn light(&self) -> Option<&LightAttachment> {
        self.light.as_ref()
    }

    pub fn animation(&self) -> Option<&OrbitAnimation> {
        self.animation.as_ref()
    }

    pub fn children(&self) -> &[SceneNode] {
        &self.children
    }

    /// Applies this node's current world transform to `child` once, then
    /// takes ownership of it.
    pub fn add_child(&mut self, mut child: SceneNode) {
        child.update(&self.world);
        self.children.push(child);
    }

    /// Pre-multiplies the world transform. Children are not touched.
    pub fn update(&mut self, delta: &Matrix4<f32>) {
        self.world = delta * self.world;
        self.position = self.world.w.truncate();
    }

    /// Rotates in place about `axis` through the node's position, for the
    /// whole subtree.
    pub fn rotate(&mut self, angle: Deg<f32>, axis: Vector3<f32>) {
        if axis.magnitude2() > f32::EPSILON {
            let linear = Matrix3::from_cols(
                self.world.x.truncate(),
                self.world.y.truncate(),
                self.world.z.truncate(),
            );
            self.world = Matrix4::from_translation(self.position)
                * Matrix4::from_axis_angle(axis.normalize(), angle)
                * Matrix4::from(linear);
        }

        for child in &mut self.children {
            child.rotate(angle, axis);
        }
    }

    /// Replaces the translation, keeping rotation and scale
    pub fn move_to(&mut self, position: Vector3<f32>) {
        self.world.w = position.extend(self.world.w.w);
        self.position = position;
    }

    /// Like [`move_to`](Self::move_to); light-bearing nodes also take the new facing.
    pub fn move_with_direction(&mut self, position: Vector3<f32>, direction: Vector3<f32>) {
        self.move_to(position);
        if let Some(attachment) = &mut self.light {
            attachment.direction = direction;
        }
    }

    /// Recomputes an animated node's transform. Returns whether it moved.
    pub fn animate(&mut self, elapsed: Duration) -> bool {
        let Some(transform) = self
            .animation
            .as_ref()
            .and_then(|animation| animation.transform_at(elapsed))
        else {
            return false;
        };

        self.world = transform;
        self.position = transform.w.truncate();
        true
    }

    /// Points an animated node at a new target; no-op for static nodes
    pub fn set_animation_target(&mut self, target: Option<Vector3<f32>>) {
        if let Some(animation) = &mut self.animation {
            animation.target = target;
        }
    }

    /// Registers this subtree's lights, depth first, parents before children.
    pub fn register_lights(&self, registry: &mut LightRegistry) -> WorldResult<()> {
        if let Some(attachment) = &self.light {
            registry.register(&attachment.light, self.position, attachment.direction)?;
        }
        for child in &self.children {
            child.register_lights(registry)?;
        }
        Ok(())
    }

    /// Spot and directional lights only shine; neither they nor their
    /// subtree are drawn.
    fn is_invisible_light(&self) -> bool {
        self.light
            .as_ref()
            .is_some_and(|attachment| !attachment.light.has_visible_source())
    }

    fn draws_self(&self) -> bool {
        if self.mesh.is_none() {
            return false;
        }
        if let Some(animation) = &self.animation {
            if animation.target.is_none() {
                return false;
            }
        }
        true
    }

    /// Draws children first, then this node's own mesh. Returns the number
    /// of draw requests issued.
    pub fn draw(&self, camera: &Camera, backend: &mut dyn RenderBackend) -> WorldResult<usize> {
        if self.is_invisible_light() {
            return Ok(0);
        }

        let mut issued = 0;
        for child in &self.children {
            issued += child.draw(camera, backend)?;
        }

        if let (true, Some(mesh)) = (self.draws_self(), self.mesh) {
            backend.draw(DrawRequest {
                mesh,
                model: self.world,
                view: camera.view_matrix(),
                projection: camera.projection_matrix(),
                style: self.style,
            })?;
            issued += 1;
        }
        Ok(issued)
    }
}
