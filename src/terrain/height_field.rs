//! Deterministic terrain elevation
//!
//! [`HeightField`] wraps a seeded fractal Perlin noise. Sampling is a pure
//! function of `(x, z)` and the seed: two fields built from the same seed and
//! parameters return bit-identical elevations, across calls and across runs.

use noise::{Fbm, MultiFractal, NoiseFn, Perlin, Seedable};

use crate::config::HeightFieldParams;

/// Anything that can answer "how high is the ground here".
///
/// Implemented by [`HeightField`] and by plain closures, which keeps boundary
/// and terrain tests independent from the noise function.
pub trait HeightSampler {
    fn sample(&self, x: f32, z: f32) -> f32;
}

impl<F> HeightSampler for F
where
    F: Fn(f32, f32) -> f32,
{
    fn sample(&self, x: f32, z: f32) -> f32 {
        self(x, z)
    }
}

#[derive(Clone)]
pub struct HeightField {
    seed: u32,
    params: HeightFieldParams,
    noise: Fbm<Perlin>,
}

impl HeightField {
    pub fn new(seed: u32, params: HeightFieldParams) -> Self {
        // Octave `i` is seeded with `seed + i`, wrapping near `u32::MAX`.
        let octaves = params.octaves.clamp(1, Fbm::<Perlin>::MAX_OCTAVES);
        let sources = (0..octaves)
            .map(|octave| Perlin::default().set_seed(seed.wrapping_add(octave as u32)))
            .collect();
        let noise = Fbm::<Perlin>::default()
            .set_octaves(octaves)
            .set_frequency(params.frequency)
            .set_sources(sources);

        Self {
            seed,
            params,
            noise,
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn params(&self) -> &HeightFieldParams {
        &self.params
    }
}

impl std::fmt::Debug for HeightField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeightField")
            .field("seed", &self.seed)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl HeightSampler for HeightField {
    fn sample(&self, x: f32, z: f32) -> f32 {
        let value = self.noise.get([f64::from(x), f64::from(z)]);
        value as f32 * self.params.amplitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn test_sampling_is_repeatable() {
        let field = HeightField::new(42, HeightFieldParams::default());
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let x = rng.random_range(-250.0..250.0);
            let z = rng.random_range(-250.0..250.0);
            let first = field.sample(x, z);
            assert_eq!(first.to_bits(), field.sample(x, z).to_bits());
        }
    }

    #[test]
    fn test_same_seed_same_field() {
        let params = HeightFieldParams::default();
        let mut rng = StdRng::seed_from_u64(99);

        for seed in [0u32, 1, 1337, u32::MAX] {
            let a = HeightField::new(seed, params);
            let b = HeightField::new(seed, params);
            for _ in 0..50 {
                let x = rng.random_range(-100.0..100.0);
                let z = rng.random_range(-100.0..100.0);
                assert_eq!(a.sample(x, z).to_bits(), b.sample(x, z).to_bits());
            }
        }
    }

    #[test]
    fn test_seeds_near_u32_max_wrap() {
        let params = HeightFieldParams {
            octaves: 6,
            ..HeightFieldParams::default()
        };
        for seed in [u32::MAX - 5, u32::MAX - 1, u32::MAX] {
            let field = HeightField::new(seed, params);
            let value = field.sample(12.5, -40.25);
            assert!(value.is_finite());
            assert_eq!(value.to_bits(), HeightField::new(seed, params).sample(12.5, -40.25).to_bits());
        }
    }

    #[test]
    fn test_different_seeds_differ_somewhere() {
        let params = HeightFieldParams::default();
        let a = HeightField::new(1, params);
        let b = HeightField::new(2, params);

        let differs = (0..100).any(|i| {
            let x = i as f32 * 3.7 - 150.0;
            let z = i as f32 * -2.3 + 60.0;
            a.sample(x, z) != b.sample(x, z)
        });
        assert!(differs);
    }

    #[test]
    fn test_elevation_scaled_by_amplitude() {
        let params = HeightFieldParams::default();
        let field = HeightField::new(5, params);
        // Fbm output stays well inside [-2, 2] for two octaves.
        for i in 0..100 {
            let h = field.sample(i as f32 * 5.1, i as f32 * -4.3);
            assert!(h.is_finite());
            assert!(h.abs() <= params.amplitude * 2.0);
        }
    }

    #[test]
    fn test_closure_sampler() {
        let ramp = |x: f32, _z: f32| x * 0.5;
        assert_eq!(ramp.sample(4.0, 100.0), 2.0);
    }
}
