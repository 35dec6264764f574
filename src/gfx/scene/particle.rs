//! Short-lived sprite effects
//!
//! Each particle is a quad hovering above its spawn point that steps through
//! a fixed number of animation frames, then disappears.

use std::time::Duration;

use cgmath::{Deg, Matrix4, Vector3};

use crate::{
    error::WorldResult,
    gfx::{
        camera::Camera,
        mesh::MeshId,
        rendering::backend::{DrawRequest, DrawStyle, RenderBackend},
    },
};

pub const FRAME_COUNT: u32 = 14;
pub const LIFETIME: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vector3<f32>,
    pub spawned: Duration,
}

impl Particle {
    /// Animation frame at `now`
    pub fn frame_at(&self, now: Duration) -> u32 {
        let elapsed = now.saturating_sub(self.spawned).as_millis();
        (elapsed * FRAME_COUNT as u128 / LIFETIME.as_millis()) as u32
    }

    pub fn is_expired(&self, now: Duration) -> bool {
        self.frame_at(now) >= FRAME_COUNT - 1
    }

    pub fn model(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position + Vector3::unit_y())
            * Matrix4::from_angle_x(Deg(90.0))
            * Matrix4::from_scale(10.0)
    }
}

#[derive(Debug, Default)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    mesh: Option<MeshId>,
}

impl ParticleSystem {
    pub fn new(mesh: Option<MeshId>) -> Self {
        Self {
            particles: Vec::new(),
            mesh,
        }
    }

    pub fn spawn(&mut self, position: Vector3<f32>, now: Duration) {
        log::trace!("particle spawned at {:?}", position);
        self.particles.push(Particle {
            position,
            spawned: now,
        });
    }

    /// Drops particles past their last frame
    pub fn expire(&mut self, now: Duration) {
        self.particles.retain(|p| !p.is_expired(now));
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn draw(
        &self,
        camera: &Camera,
        backend: &mut dyn RenderBackend,
        now: Duration,
    ) -> WorldResult<usize> {
        let Some(mesh) = self.mesh else {
            return Ok(0);
        };

        let mut issued = 0;
        for particle in self.particles.iter().filter(|p| !p.is_expired(now)) {
            let frame = particle.frame_at(now);
            backend.draw(DrawRequest {
                mesh,
                model: particle.model(),
                view: camera.view_matrix(),
                projection: camera.projection_matrix(),
                style: DrawStyle::Particle {
                    frame,
                    alpha: 1.0 - frame as f32 / FRAME_COUNT as f32,
                },
            })?;
            issued += 1;
        }
        Ok(issued)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{camera::Projection, rendering::backend::testing::RecordingBackend};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_frames_advance_over_lifetime() {
        let particle = Particle {
            position: Vector3::new(0.0, 0.0, 0.0),
            spawned: ms(100),
        };

        assert_eq!(particle.frame_at(ms(100)), 0);
        assert_eq!(particle.frame_at(ms(50)), 0);
        assert_eq!(particle.frame_at(ms(600)), 7);
        assert!(!particle.is_expired(ms(1000)));
        // 929 ms in is frame 13, the last one is never shown
        assert!(particle.is_expired(ms(1029)));
    }

    #[test]
    fn test_model_places_quad_above_spawn() {
        let particle = Particle {
            position: Vector3::new(3.0, 4.0, 5.0),
            spawned: Duration::ZERO,
        };
        let model = particle.model();
        assert_eq!(model.w.truncate(), Vector3::new(3.0, 5.0, 5.0));
        // quad normal (+Z) ends up pointing down after the X rotation
        let normal = model * Vector3::unit_z().extend(0.0);
        assert!((normal.y + 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_expire_and_draw() {
        let mut system = ParticleSystem::new(Some(MeshId(7)));
        system.spawn(Vector3::new(0.0, 80.0, 0.0), ms(0));
        system.spawn(Vector3::new(1.0, 80.0, 0.0), ms(500));

        let mut camera = Camera::fixed(
            "cam",
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::unit_z(),
            Projection::default(),
        );
        camera.update_matrices(64, 64);

        let mut backend = RecordingBackend::new();
        assert_eq!(system.draw(&camera, &mut backend, ms(950)).unwrap(), 1);
        assert!(matches!(
            backend.draws[0].style,
            DrawStyle::Particle { frame: 6, .. }
        ));

        system.expire(ms(950));
        assert_eq!(system.len(), 1);
        system.expire(ms(1500));
        assert!(system.is_empty());
    }

    #[test]
    fn test_no_mesh_draws_nothing() {
        let mut system = ParticleSystem::new(None);
        system.spawn(Vector3::new(0.0, 0.0, 0.0), ms(0));
        let camera = Camera::fixed("cam", Vector3::new(0.0, 0.0, 0.0), Vector3::unit_z(), Projection::default());
        let mut backend = RecordingBackend::new();
        assert_eq!(system.draw(&camera, &mut backend, ms(10)).unwrap(), 0);
    }
}
