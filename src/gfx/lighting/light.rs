//! Light definitions and their GPU layout

use cgmath::Vector3;

/// Distance falloff `1 / (constant + linear * d + quadratic * d^2)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Attenuation {
    pub const POINT: Self = Self {
        constant: 1.0,
        linear: 0.01,
        quadratic: 0.005,
    };

    pub const SPOTLIGHT: Self = Self {
        constant: 1.0,
        linear: 0.00001,
        quadratic: 0.00008,
    };

    pub const NONE: Self = Self {
        constant: 1.0,
        linear: 0.0,
        quadratic: 0.0,
    };
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Directional,
    Point(Attenuation),
    Spotlight {
        /// Half-angle of the cone in degrees
        cutoff: f32,
        exponent: f32,
        attenuation: Attenuation,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub kind: LightKind,
}

impl Light {
    pub fn directional(ambient: [f32; 3], diffuse: [f32; 3], specular: [f32; 3]) -> Self {
        Self {
            ambient,
            diffuse,
            specular,
            kind: LightKind::Directional,
        }
    }

    pub fn point(ambient: [f32; 3], diffuse: [f32; 3], specular: [f32; 3]) -> Self {
        Self {
            ambient,
            diffuse,
            specular,
            kind: LightKind::Point(Attenuation::POINT),
        }
    }

    pub fn spotlight(
        ambient: [f32; 3],
        diffuse: [f32; 3],
        specular: [f32; 3],
        cutoff: f32,
        exponent: f32,
    ) -> Self {
        Self {
            ambient,
            diffuse,
            specular,
            kind: LightKind::Spotlight {
                cutoff,
                exponent,
                attenuation: Attenuation::SPOTLIGHT,
            },
        }
    }

    /// Replaces the falloff of point and spot lights; directional lights have none
    pub fn with_attenuation(mut self, attenuation: Attenuation) -> Self {
        match &mut self.kind {
            LightKind::Directional => {}
            LightKind::Point(a) => *a = attenuation,
            LightKind::Spotlight { attenuation: a, .. } => *a = attenuation,
        }
        self
    }

    pub fn is_directional(&self) -> bool {
        matches!(self.kind, LightKind::Directional)
    }

    pub fn is_point(&self) -> bool {
        matches!(self.kind, LightKind::Point(_))
    }

    pub fn is_spotlight(&self) -> bool {
        matches!(self.kind, LightKind::Spotlight { .. })
    }

    /// Whether a node carrying this light draws its own geometry
    pub fn has_visible_source(&self) -> bool {
        self.is_point()
    }

    pub fn to_gpu(&self, position: Vector3<f32>, direction: Vector3<f32>) -> GpuLight {
        let (attenuation, cut_off, exponent) = match self.kind {
            LightKind::Directional => (Attenuation::NONE, 0.0, 0.0),
            LightKind::Point(a) => (a, 0.0, 0.0),
            LightKind::Spotlight {
                cutoff,
                exponent,
                attenuation,
            } => (attenuation, cutoff.to_radians().cos(), exponent),
        };

        GpuLight {
            ambient: self.ambient,
            is_point: self.is_point() as u32,
            diffuse: self.diffuse,
            is_spot: self.is_spotlight() as u32,
            specular: self.specular,
            cut_off,
            position: position.into(),
            exponent,
            direction: direction.into(),
            constant: attenuation.constant,
            linear: attenuation.linear,
            quadratic: attenuation.quadratic,
            _padding: [0.0; 2],
        }
    }
}

/// One light as laid out in the shader's storage buffer.
///
/// Every `vec3` is followed by a scalar so the struct packs to 16-byte rows
/// under WGSL layout rules.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuLight {
    pub ambient: [f32; 3],
    pub is_point: u32,
    pub diffuse: [f32; 3],
    pub is_spot: u32,
    pub specular: [f32; 3],
    /// Cosine of the cone half-angle
    pub cut_off: f32,
    pub position: [f32; 3],
    pub exponent: f32,
    pub direction: [f32; 3],
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
    _padding: [f32; 2],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpu_light_layout() {
        assert_eq!(std::mem::size_of::<GpuLight>(), 96);
        assert_eq!(std::mem::size_of::<GpuLight>() % 16, 0);
    }

    #[test]
    fn test_point_light_flags_and_falloff() {
        let bulb = Light::point([0.0; 3], [1.0; 3], [1.0; 3]);
        let gpu = bulb.to_gpu(Vector3::new(1.0, 2.0, 3.0), Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(gpu.is_point, 1);
        assert_eq!(gpu.is_spot, 0);
        assert_eq!(gpu.position, [1.0, 2.0, 3.0]);
        assert_eq!(gpu.linear, 0.01);
        assert_eq!(gpu.quadratic, 0.005);
    }

    #[test]
    fn test_spotlight_cutoff_is_cosine() {
        let flashlight = Light::spotlight([0.0; 3], [1.0; 3], [1.0; 3], 60.0, 20.0);
        let gpu = flashlight.to_gpu(Vector3::new(0.0, 0.0, 0.0), -Vector3::unit_y());
        assert_eq!(gpu.is_spot, 1);
        assert!((gpu.cut_off - 0.5).abs() < 1e-6);
        assert_eq!(gpu.exponent, 20.0);
        assert_eq!(gpu.direction, [0.0, -1.0, 0.0]);
        assert_eq!(gpu.quadratic, 0.00008);
    }

    #[test]
    fn test_only_point_lights_have_visible_sources() {
        let sun = Light::directional([1.0; 3], [2.0; 3], [2.0; 3]);
        let spot = Light::spotlight([0.0; 3], [1.0; 3], [1.0; 3], 30.0, 2.0);
        let bulb = Light::point([0.0; 3], [1.0; 3], [1.0; 3]);
        assert!(!sun.has_visible_source());
        assert!(!spot.has_visible_source());
        assert!(bulb.has_visible_source());
    }

    #[test]
    fn test_with_attenuation_skips_directional() {
        let custom = Attenuation {
            constant: 2.0,
            linear: 0.5,
            quadratic: 0.25,
        };
        let sun = Light::directional([1.0; 3], [1.0; 3], [1.0; 3]).with_attenuation(custom);
        assert_eq!(sun.kind, LightKind::Directional);
        let bulb = Light::point([0.0; 3], [1.0; 3], [1.0; 3]).with_attenuation(custom);
        assert_eq!(bulb.kind, LightKind::Point(custom));
    }
}
