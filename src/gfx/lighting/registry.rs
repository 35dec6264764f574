//! Per-frame light aggregation
//!
//! The registry is a fixed-capacity list: the shading stage's light buffer is
//! sized once, so an overflow is a content bug and is reported instead of
//! truncated. Call [`LightRegistry::reset`] exactly once per frame before the
//! scene graph registers anything.

use cgmath::Vector3;

use crate::{
    error::{WorldError, WorldResult},
    gfx::lighting::{GpuLight, Light},
};

/// A light definition placed in the world for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightRecord {
    pub light: Light,
    pub position: Vector3<f32>,
    pub direction: Vector3<f32>,
}

impl LightRecord {
    pub fn to_gpu(&self) -> GpuLight {
        self.light.to_gpu(self.position, self.direction)
    }
}

#[derive(Debug)]
pub struct LightRegistry {
    records: Vec<LightRecord>,
    capacity: usize,
}

impl LightRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn reset(&mut self) {
        self.records.clear();
    }

    pub fn register(
        &mut self,
        light: &Light,
        position: Vector3<f32>,
        direction: Vector3<f32>,
    ) -> WorldResult<()> {
        if self.records.len() >= self.capacity {
            log::error!(
                "light registry full ({} lights), refusing {:?} light",
                self.capacity,
                light.kind
            );
            return Err(WorldError::ResourceExhausted {
                capacity: self.capacity,
            });
        }

        self.records.push(LightRecord {
            light: *light,
            position,
            direction,
        });
        Ok(())
    }

    pub fn records(&self) -> &[LightRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records in registration order, ready for upload
    pub fn snapshot(&self) -> Vec<GpuLight> {
        self.records.iter().map(LightRecord::to_gpu).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bulb() -> Light {
        Light::point([0.0; 3], [1.0; 3], [1.0; 3])
    }

    fn at(x: f32) -> Vector3<f32> {
        Vector3::new(x, 0.0, 0.0)
    }

    #[test]
    fn test_overflow_is_resource_exhausted() {
        let mut registry = LightRegistry::new(3);
        for i in 0..3 {
            registry.register(&bulb(), at(i as f32), at(0.0)).unwrap();
        }

        let err = registry.register(&bulb(), at(9.0), at(0.0)).unwrap_err();
        assert!(matches!(err, WorldError::ResourceExhausted { capacity: 3 }));
        assert!(err.is_fatal());
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.records()[2].position, at(2.0));
    }

    #[test]
    fn test_reset_allows_full_capacity_again() {
        let mut registry = LightRegistry::new(50);
        for i in 0..50 {
            registry.register(&bulb(), at(i as f32), at(0.0)).unwrap();
        }
        assert!(registry.register(&bulb(), at(0.0), at(0.0)).is_err());

        registry.reset();
        assert!(registry.is_empty());
        for i in 0..50 {
            registry.register(&bulb(), at(i as f32), at(0.0)).unwrap();
        }
        assert_eq!(registry.len(), registry.capacity());
    }

    #[test]
    fn test_snapshot_keeps_registration_order() {
        let mut registry = LightRegistry::new(4);
        let sun = Light::directional([1.0; 3], [2.0; 3], [2.0; 3]);
        registry.register(&sun, at(0.0), Vector3::new(2.0, 2.0, 3.0)).unwrap();
        registry.register(&bulb(), at(5.0), at(0.0)).unwrap();

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].is_point, 0);
        assert_eq!(snapshot[0].direction, [2.0, 2.0, 3.0]);
        assert_eq!(snapshot[1].is_point, 1);
        assert_eq!(snapshot[1].position, [5.0, 0.0, 0.0]);
    }

    #[test]
    fn test_same_definition_placed_twice() {
        let mut registry = LightRegistry::new(2);
        let shared = bulb();
        registry.register(&shared, at(1.0), at(0.0)).unwrap();
        registry.register(&shared, at(-1.0), at(0.0)).unwrap();
        assert_eq!(registry.records()[0].light, registry.records()[1].light);
        assert_ne!(registry.records()[0].position, registry.records()[1].position);
    }
}
