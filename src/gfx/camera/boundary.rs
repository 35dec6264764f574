//! Camera boundary volume
//!
//! A box centered on the origin horizontally, capped by a fixed ceiling and
//! floored by the terrain height plus a small clearance.

use std::rc::Rc;

use cgmath::Vector3;

use crate::{
    error::{WorldError, WorldResult},
    terrain::HeightSampler,
};

/// Outcome of testing a candidate camera position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryCheck {
    Inside,
    /// Rejected, silently
    Outside,
    /// Rejected only because the candidate is at or above the ceiling
    Ceiling,
}

#[derive(Clone)]
pub struct BoundaryVolume {
    width: f32,
    length: f32,
    upper_limit: f32,
    margin: f32,
    ground: Rc<dyn HeightSampler>,
}

impl BoundaryVolume {
    pub const DEFAULT_MARGIN: f32 = 0.1;

    pub fn new(
        width: f32,
        length: f32,
        upper_limit: f32,
        ground: Rc<dyn HeightSampler>,
    ) -> WorldResult<Self> {
        if !(width > 0.0 && length > 0.0) || !width.is_finite() || !length.is_finite() {
            return Err(WorldError::configuration(format!(
                "camera boundary extents must be positive, got {width}x{length}"
            )));
        }
        if !upper_limit.is_finite() {
            return Err(WorldError::configuration(format!(
                "camera upper limit must be finite, got {upper_limit}"
            )));
        }

        Ok(Self {
            width,
            length,
            upper_limit,
            margin: Self::DEFAULT_MARGIN,
            ground,
        })
    }

    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    pub fn upper_limit(&self) -> f32 {
        self.upper_limit
    }

    /// Lowest allowed elevation at `(x, z)` (exclusive)
    pub fn floor_at(&self, x: f32, z: f32) -> f32 {
        self.ground.sample(x, z) + self.margin
    }

    pub fn check(&self, candidate: Vector3<f32>) -> BoundaryCheck {
        let within_width = candidate.x.abs() < self.width / 2.0;
        let within_length = candidate.z.abs() < self.length / 2.0;
        let above_ground = candidate.y > self.floor_at(candidate.x, candidate.z);
        let below_ceiling = candidate.y < self.upper_limit;

        match (within_width && within_length && above_ground, below_ceiling) {
            (true, true) => BoundaryCheck::Inside,
            (true, false) => BoundaryCheck::Ceiling,
            _ => BoundaryCheck::Outside,
        }
    }
}

impl std::fmt::Debug for BoundaryVolume {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundaryVolume")
            .field("width", &self.width)
            .field("length", &self.length)
            .field("upper_limit", &self.upper_limit)
            .field("margin", &self.margin)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn volume() -> BoundaryVolume {
        let ground: Rc<dyn HeightSampler> = Rc::new(|x: f32, _z: f32| x * 0.1);
        BoundaryVolume::new(100.0, 50.0, 80.0, ground).unwrap()
    }

    #[test]
    fn test_inside() {
        assert_eq!(volume().check(Vector3::new(0.0, 10.0, 0.0)), BoundaryCheck::Inside);
        assert_eq!(volume().check(Vector3::new(-49.9, 0.0, 24.9)), BoundaryCheck::Inside);
    }

    #[test]
    fn test_horizontal_limits_are_exclusive() {
        let v = volume();
        assert_eq!(v.check(Vector3::new(50.0, 10.0, 0.0)), BoundaryCheck::Outside);
        assert_eq!(v.check(Vector3::new(0.0, 10.0, -25.0)), BoundaryCheck::Outside);
    }

    #[test]
    fn test_ground_clearance() {
        let v = volume();
        // ground at x=10 is 1.0, floor is 1.1
        assert_eq!(v.check(Vector3::new(10.0, 1.05, 0.0)), BoundaryCheck::Outside);
        assert_eq!(v.check(Vector3::new(10.0, 1.15, 0.0)), BoundaryCheck::Inside);
    }

    #[test]
    fn test_ceiling_only_when_sole_failure() {
        let v = volume();
        assert_eq!(v.check(Vector3::new(0.0, 80.0, 0.0)), BoundaryCheck::Ceiling);
        assert_eq!(v.check(Vector3::new(0.0, 95.0, 0.0)), BoundaryCheck::Ceiling);
        // above the ceiling and outside horizontally: plain rejection
        assert_eq!(v.check(Vector3::new(60.0, 95.0, 0.0)), BoundaryCheck::Outside);
    }

    #[test]
    fn test_rejects_non_positive_extents() {
        let ground: Rc<dyn HeightSampler> = Rc::new(|_x: f32, _z: f32| 0.0f32);
        assert!(BoundaryVolume::new(0.0, 10.0, 80.0, ground.clone()).is_err());
        assert!(BoundaryVolume::new(10.0, -1.0, 80.0, ground.clone()).is_err());
        assert!(BoundaryVolume::new(f32::NAN, 10.0, 80.0, ground.clone()).is_err());
        assert!(BoundaryVolume::new(10.0, 10.0, f32::INFINITY, ground).is_err());
    }
}
