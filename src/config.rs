//! World configuration
//!
//! All tunable demo parameters live in [`WorldConfig`]. Defaults reproduce the
//! shipped desert scene; [`WorldConfig::validate`] rejects values that would
//! otherwise surface later as silent misbehaviour (e.g. a camera that can never
//! move because its boundary has zero width).

use std::{fs, io::ErrorKind, path::Path, time::Duration};

use cgmath::Vector3;

use crate::{
    error::{WorldError, WorldResult},
    schedule::period_for_rate,
};

/// Seed used when no seed file is present
pub const DEFAULT_SEED: u32 = 1337;

/// Upper bound on scattered cacti, picking ids are stored in a byte
pub const MAX_CACTUS_COUNT: u32 = 255;

/// Noise parameters for the terrain height field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightFieldParams {
    pub octaves: usize,
    pub frequency: f64,
    pub amplitude: f32,
}

impl Default for HeightFieldParams {
    fn default() -> Self {
        Self {
            octaves: 2,
            frequency: 0.012,
            amplitude: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FogParams {
    pub color: [f32; 3],
    pub density: f32,
    pub gradient: f32,
}

impl Default for FogParams {
    fn default() -> Self {
        Self {
            color: [0.6, 0.6, 0.6],
            density: 0.025,
            gradient: 4.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorldConfig {
    pub window_width: u32,
    pub window_height: u32,
    pub window_title: String,

    /// Input and animation ticks per second
    pub refresh_rate: u32,

    pub near_plane: f32,
    pub far_plane: f32,
    /// Vertical field of view in degrees
    pub camera_fov: f32,
    pub camera_speed: f32,
    pub camera_upper_boundary: f32,
    /// Minimum clearance between the camera and the ground
    pub ground_margin: f32,
    pub pointer_sensitivity: f32,
    pub orbit_tick: Duration,

    pub terrain_width: u32,
    pub terrain_length: u32,
    pub height_field: HeightFieldParams,
    /// Finite-difference offset used for terrain normals
    pub normal_offset: f32,
    pub tex_coord_spacing: f32,

    pub sun_direction: Vector3<f32>,
    pub light_capacity: usize,

    pub cactus_count: u32,
    pub cactus_scale: f32,
    pub cactus_path: String,

    pub arrow_path: String,
    pub arrow_elevation: f32,
    pub arrow_radius: f32,
    pub arrow_scale: f32,

    pub fog: FogParams,
    pub night_sky_color: [f32; 3],
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            window_width: 800,
            window_height: 800,
            window_title: "Succuland".to_string(),
            refresh_rate: 60,
            near_plane: 0.01,
            far_plane: 150.0,
            camera_fov: 80.0,
            camera_speed: 50.0,
            camera_upper_boundary: 80.0,
            ground_margin: 0.1,
            pointer_sensitivity: 1.5,
            orbit_tick: Duration::from_millis(15),
            terrain_width: 500,
            terrain_length: 500,
            height_field: HeightFieldParams::default(),
            normal_offset: 0.2,
            tex_coord_spacing: 0.05,
            sun_direction: Vector3::new(2.0, 2.0, 3.0),
            light_capacity: 50,
            cactus_count: 150,
            cactus_scale: 1.0,
            cactus_path: "objects/Cactus/Cactus.obj".to_string(),
            arrow_path: "objects/arrow/Arrow5.obj".to_string(),
            arrow_elevation: 13.0,
            arrow_radius: 7.0,
            arrow_scale: 0.2,
            fog: FogParams::default(),
            night_sky_color: [0.0, 0.0, 0.1],
        }
    }
}

impl WorldConfig {
    /// Period between input/animation ticks
    pub fn refresh_period(&self) -> Duration {
        period_for_rate(self.refresh_rate)
    }

    pub fn validate(&self) -> WorldResult<()> {
        if self.terrain_width < 2 || self.terrain_length < 2 {
            return Err(WorldError::configuration(format!(
                "terrain must be at least 2x2, got {}x{}",
                self.terrain_width, self.terrain_length
            )));
        }
        if self.refresh_rate == 0 {
            return Err(WorldError::configuration("refresh rate must be positive"));
        }
        if self.light_capacity == 0 {
            return Err(WorldError::configuration("light capacity must be positive"));
        }
        if self.cactus_count > MAX_CACTUS_COUNT {
            return Err(WorldError::configuration(format!(
                "exceeded maximum number of cacti ({} > {})",
                self.cactus_count, MAX_CACTUS_COUNT
            )));
        }
        if !(self.near_plane > 0.0 && self.far_plane > self.near_plane) {
            return Err(WorldError::configuration(format!(
                "invalid clip planes near={} far={}",
                self.near_plane, self.far_plane
            )));
        }
        if !(self.camera_fov > 0.0 && self.camera_fov < 180.0) {
            return Err(WorldError::configuration(format!(
                "field of view must be within (0, 180), got {}",
                self.camera_fov
            )));
        }
        if self.height_field.octaves == 0 {
            return Err(WorldError::configuration("height field needs at least one octave"));
        }
        Ok(())
    }
}

/// Reads the world seed from the first token of a seed file.
///
/// A missing file falls back to [`DEFAULT_SEED`].
pub fn load_seed(path: impl AsRef<Path>) -> WorldResult<u32> {
    let path = path.as_ref();
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            log::warn!(
                "seed file {} not found, using default seed {}",
                path.display(),
                DEFAULT_SEED
            );
            return Ok(DEFAULT_SEED);
        }
        Err(err) => return Err(err.into()),
    };
    parse_seed(&contents)
}

pub fn parse_seed(text: &str) -> WorldResult<u32> {
    let token = text
        .split_whitespace()
        .next()
        .ok_or_else(|| WorldError::InvalidSeed("seed file is empty".to_string()))?;

    // Wider seeds are accepted and folded into the noise seed range.
    token
        .parse::<u64>()
        .map(|seed| (seed ^ (seed >> 32)) as u32)
        .map_err(|err| WorldError::InvalidSeed(format!("{token:?}: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(WorldConfig::default().validate().is_ok());
    }

    #[test]
    fn test_refresh_period() {
        let mut config = WorldConfig::default();
        assert_eq!(config.refresh_period(), Duration::from_millis(16));
        config.refresh_rate = 120;
        assert_eq!(config.refresh_period(), Duration::from_millis(8));
    }

    #[test]
    fn test_validate_rejects_too_many_cacti() {
        let config = WorldConfig {
            cactus_count: 256,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(WorldError::Configuration(_))
        ));
    }

    #[test]
    fn test_validate_rejects_degenerate_terrain() {
        let config = WorldConfig {
            terrain_width: 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_seed() {
        assert_eq!(parse_seed("42\n").unwrap(), 42);
        assert_eq!(parse_seed("  7 trailing words").unwrap(), 7);
        assert!(matches!(parse_seed(""), Err(WorldError::InvalidSeed(_))));
        assert!(matches!(parse_seed("abc"), Err(WorldError::InvalidSeed(_))));
    }

    #[test]
    fn test_missing_seed_file_falls_back() {
        let seed = load_seed("definitely/not/a/seed/file.txt").unwrap();
        assert_eq!(seed, DEFAULT_SEED);
    }
}
