//! Desert world and its frame driver
//!
//! [`World`] owns the whole scene: terrain, scattered cacti, cameras, lights,
//! the arrow indicator, particles and fog. The window layer feeds it input and
//! elapsed time, then asks it to render through a [`RenderBackend`].

use std::{path::Path, rc::Rc, time::Duration};

use cgmath::{Deg, Matrix4, Vector3};
use rand::{rngs::StdRng, Rng, SeedableRng};
use winit::keyboard::KeyCode;

use crate::{
    config::WorldConfig,
    error::{WorldError, WorldResult},
    gfx::{
        camera::{BoundaryVolume, Camera, CameraEvent, CameraId, NavigationContext, Projection},
        fog::Fog,
        geometry::{generate_cube, generate_quad, obj, MeshSource},
        lighting::{Light, LightRegistry},
        mesh::{Mesh, MeshId, MeshLibrary},
        picking::{pick_nearest, screen_to_ray},
        rendering::backend::{FogState, FrameGlobals, RenderBackend},
        resources::material::{Material, MaterialLibrary},
        scene::{OrbitAnimation, ParticleSystem, SceneNode},
    },
    input::{Action, InputState},
    schedule::{period_for_rate, Ticker},
    terrain::{HeightField, HeightSampler, TerrainParams},
};

/// Name of the spotlight attached to a picked cactus
const PICK_LIGHT: &str = "pick light";
/// Height of the pick spotlight above its cactus
const PICK_LIGHT_HEIGHT: f32 = 30.0;
const STATIC_CAMERA_ELEVATION: f32 = 20.0;
const BULB_SCALE: f32 = 0.2;
const FLASHLIGHT_CUTOFF: f32 = 120.0;
const FLASHLIGHT_EXPONENT: f32 = 20.0;

/// What one rendered frame cost
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub draw_calls: usize,
    pub lights: usize,
}

pub struct World {
    config: WorldConfig,
    seed: u32,
    ground: Rc<HeightField>,
    meshes: MeshLibrary,
    materials: MaterialLibrary,

    navigation: NavigationContext,
    /// Static camera 1, static camera 2, dynamic camera
    camera_slots: [CameraId; 3],
    input: InputState,

    terrain: SceneNode,
    cacti: Vec<SceneNode>,
    sun: SceneNode,
    flashlight: SceneNode,
    bulbs: Vec<SceneNode>,
    bulb_mesh: MeshId,
    arrow: SceneNode,
    arrow_target: Option<usize>,
    particles: ParticleSystem,
    fog: Fog,
    lights: LightRegistry,

    daytime: bool,
    flashlight_on: bool,

    key_ticker: Ticker,
    orbit_ticker: Ticker,
    arrow_ticker: Ticker,
    fog_ticker: Ticker,
}

impl World {
    pub fn new(config: WorldConfig, seed: u32) -> WorldResult<Self> {
        config.validate()?;
        log::info!("building world with seed {}", seed);

        let ground = Rc::new(HeightField::new(seed, config.height_field));
        let mut meshes = MeshLibrary::new();
        let mut materials = MaterialLibrary::new();

        let sand = materials.add(sand_material());
        let terrain_mesh = Mesh::from_source(&MeshSource::Terrain {
            ground: ground.clone(),
            params: TerrainParams::from_config(&config),
        })?
        .with_material(sand);
        let terrain = SceneNode::group("terrain").with_mesh(meshes.add(terrain_mesh));

        let cactus_mesh = load_model(
            &config.cactus_path,
            Material::new("cactus", [0.25, 0.55, 0.2]),
            &mut meshes,
            &mut materials,
        );
        let arrow_mesh = load_model(
            &config.arrow_path,
            Material::new("arrow", [0.9, 0.15, 0.1]),
            &mut meshes,
            &mut materials,
        );
        let bulb_mesh = meshes.add(
            Mesh::new("bulb", generate_cube()).with_material(materials.add(Material::new("bulb", [1.0; 3]))),
        );
        let particle_mesh = meshes.add(
            Mesh::new("smoke", generate_quad())
                .with_material(materials.add(Material::new("smoke", [0.9, 0.85, 0.75]))),
        );

        let mut rng = StdRng::seed_from_u64(u64::from(seed));
        let cacti = scatter_cacti(&config, ground.as_ref(), cactus_mesh, &mut rng);

        let projection = Projection {
            fov: Deg(config.camera_fov),
            near: config.near_plane,
            far: config.far_plane,
        };
        let boundary = BoundaryVolume::new(
            config.terrain_width as f32,
            config.terrain_length as f32,
            config.camera_upper_boundary,
            ground.clone(),
        )?
        .with_margin(config.ground_margin);

        let mut navigation = NavigationContext::new(config.refresh_rate);
        let static_one = navigation.add_camera(Camera::fixed(
            "static 1",
            random_ground_point(&config, &mut rng, STATIC_CAMERA_ELEVATION),
            Vector3::new(-0.45, -0.15, 0.87),
            projection,
        ));
        let static_two = navigation.add_camera(Camera::fixed(
            "static 2",
            random_ground_point(&config, &mut rng, STATIC_CAMERA_ELEVATION),
            Vector3::new(-1.0, -0.5, 1.0),
            projection,
        ));
        let mut main = Camera::dynamic(
            "main",
            Vector3::new(0.0, 10.0, 0.0),
            Vector3::new(0.0, -1.0, 1.0),
            projection,
            config.camera_speed,
            Some(boundary),
        );
        main.sensitivity = config.pointer_sensitivity;
        let main = navigation.add_camera(main);
        navigation.make_active(main);

        let sun = SceneNode::group("sun").with_light(
            Light::directional([1.0; 3], [2.0; 3], [2.0; 3]),
            config.sun_direction,
        );
        let flashlight = SceneNode::new(
            "flashlight",
            Matrix4::from_translation(Vector3::new(0.0, 10.0, 0.0)),
        )
        .with_light(flashlight_light(), Vector3::new(0.0, -1.0, 1.0));

        let arrow_initial = Matrix4::from_angle_y(Deg(90.0))
            * Matrix4::from_angle_x(Deg(90.0))
            * Matrix4::from_scale(config.arrow_scale);
        let arrow = SceneNode::group("arrow")
            .with_mesh(arrow_mesh)
            .with_animation(OrbitAnimation::new(
                config.arrow_elevation,
                config.arrow_radius,
                arrow_initial,
            ));

        let period = config.refresh_period();
        let start = Duration::ZERO;
        Ok(Self {
            seed,
            ground,
            meshes,
            materials,
            navigation,
            camera_slots: [static_one, static_two, main],
            input: InputState::new(),
            terrain,
            cacti,
            sun,
            flashlight,
            bulbs: Vec::new(),
            bulb_mesh,
            arrow,
            arrow_target: None,
            particles: ParticleSystem::new(Some(particle_mesh)),
            fog: Fog::new(config.fog),
            lights: LightRegistry::new(config.light_capacity),
            daytime: true,
            flashlight_on: false,
            key_ticker: Ticker::new(period, start),
            orbit_ticker: Ticker::new(config.orbit_tick, start),
            arrow_ticker: Ticker::new(period, start),
            fog_ticker: Ticker::new(period, start),
            config,
        })
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn ground(&self) -> &HeightField {
        &self.ground
    }

    pub fn navigation(&self) -> &NavigationContext {
        &self.navigation
    }

    pub fn navigation_mut(&mut self) -> &mut NavigationContext {
        &mut self.navigation
    }

    pub fn cacti(&self) -> &[SceneNode] {
        &self.cacti
    }

    pub fn bulbs(&self) -> &[SceneNode] {
        &self.bulbs
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn fog(&self) -> &Fog {
        &self.fog
    }

    pub fn is_daytime(&self) -> bool {
        self.daytime
    }

    pub fn is_flashlight_on(&self) -> bool {
        self.flashlight_on
    }

    pub fn arrow_target(&self) -> Option<usize> {
        self.arrow_target
    }

    /// Sends every mesh with its resolved material to the backend
    pub fn upload_meshes(&self, backend: &mut dyn RenderBackend) -> WorldResult<()> {
        for (id, mesh) in self.meshes.iter() {
            let material = self.materials.resolve(mesh.material.as_deref());
            backend.upload_mesh(id, mesh, Some(material))?;
        }
        log::info!(
            "uploaded {} meshes, {} materials",
            self.meshes.len(),
            self.materials.len()
        );
        Ok(())
    }

    /// Records a key transition, returning the command it triggers
    pub fn key_event(&mut self, key: KeyCode, pressed: bool, repeat: bool) -> Option<Action> {
        self.input.key_event(key, pressed, repeat)
    }

    pub fn release_keys(&mut self) {
        self.input.release_all();
    }

    /// Applies a world command. Window commands (quit, fullscreen) are
    /// handled by the window owner and ignored here.
    pub fn handle_action(&mut self, action: Action, now: Duration) {
        match action {
            Action::ToggleFreeMode => {
                if let Some(id) = self.navigation.active_id() {
                    self.navigation.toggle_free_mode(id);
                }
            }
            Action::ToggleCircling => {
                if let Some(id) = self.navigation.active_id() {
                    self.navigation.toggle_circling(id);
                    self.orbit_ticker.reset(now);
                }
            }
            Action::ToggleFlashlight => {
                self.flashlight_on = !self.flashlight_on;
                log::info!("flashlight {}", on_off(self.flashlight_on));
            }
            Action::ToggleDaytime => {
                self.daytime = !self.daytime;
                log::info!("{}", if self.daytime { "day" } else { "night" });
            }
            Action::PlaceBulb => self.place_bulb(),
            Action::ToggleRefreshRate => {
                let period = period_for_rate(self.navigation.toggle_refresh_rate());
                for ticker in [
                    &mut self.key_ticker,
                    &mut self.arrow_ticker,
                    &mut self.fog_ticker,
                ] {
                    ticker.set_period(period);
                }
                log::debug!("input tick every {:?}", period);
            }
            Action::SelectCamera(slot) => match self.camera_slots.get(slot) {
                Some(id) => {
                    self.navigation.make_active(*id);
                }
                None => log::warn!("no camera in slot {}", slot),
            },
            Action::ToggleFog => {
                self.fog.toggle(now);
                self.fog_ticker.reset(now);
                log::info!("fog {}", on_off(self.fog.is_enabled()));
            }
            Action::ToggleFullscreen | Action::Quit => {}
        }
    }

    /// Pointer motion in pixels
    pub fn pointer_moved(&mut self, dx: f32, dy: f32) {
        self.navigation.pointer_moved(dx, dy);
    }

    fn place_bulb(&mut self) {
        let Some(position) = self.navigation.active_camera().map(Camera::position) else {
            return;
        };
        let bulb = SceneNode::new(
            "bulb",
            Matrix4::from_translation(position) * Matrix4::from_scale(BULB_SCALE),
        )
        .with_mesh(self.bulb_mesh)
        .with_light(
            Light::point([0.0; 3], [1.0; 3], [1.0; 3]),
            -Vector3::unit_y(),
        );
        self.bulbs.push(bulb);
        log::info!("placed bulb {} at {:?}", self.bulbs.len(), position);
    }

    /// Runs every due tick up to `now` (time since start-up).
    pub fn update(&mut self, now: Duration) {
        for _ in 0..self.key_ticker.due(now) {
            for direction in self.input.held() {
                self.navigation.move_active(direction);
            }
        }

        if self.navigation.is_orbiting() {
            if self.orbit_ticker.due(now) > 0 {
                self.navigation.orbit_tick(now);
            }
        } else {
            self.orbit_ticker.reset(now);
        }

        if self.arrow_target.is_some() {
            if self.arrow_ticker.due(now) > 0 {
                self.arrow.animate(now);
            }
        } else {
            self.arrow_ticker.reset(now);
        }

        if self.fog.is_animating() {
            if self.fog_ticker.due(now) > 0 {
                self.fog.tick(now);
            }
        } else {
            self.fog_ticker.reset(now);
        }

        for event in self.navigation.drain_events() {
            match event {
                CameraEvent::CeilingHit { position } => self.particles.spawn(position, now),
            }
        }
        self.particles.expire(now);
    }

    /// Picks the nearest cactus under the cursor. The cactus gets a spotlight
    /// above it and becomes the arrow's target.
    pub fn pick(&mut self, cursor: (f32, f32), viewport: (u32, u32), now: Duration) -> Option<usize> {
        let camera = self.navigation.active_camera()?;
        let ray = screen_to_ray(
            cursor,
            (viewport.0 as f32, viewport.1 as f32),
            &camera.view_matrix(),
            &camera.projection_matrix(),
        );

        let meshes = &self.meshes;
        let candidates = self.cacti.iter().enumerate().filter_map(|(index, cactus)| {
            let mesh = meshes.get(cactus.mesh()?)?;
            Some((index, mesh.bounds.transform(&cactus.world_transform())))
        });
        let hit = pick_nearest(&ray, candidates)?;

        let cactus = self.cacti.get_mut(hit.key)?;
        if !cactus.children().iter().any(|child| child.name() == PICK_LIGHT) {
            cactus.add_child(
                SceneNode::new(
                    PICK_LIGHT,
                    Matrix4::from_translation(Vector3::new(0.0, PICK_LIGHT_HEIGHT, 0.0)),
                )
                .with_light(flashlight_light(), -Vector3::unit_y()),
            );
        }
        let target = cactus.position();

        self.arrow.set_animation_target(Some(target));
        if self.arrow_target.is_none() {
            self.arrow_ticker.reset(now);
        }
        self.arrow_target = Some(hit.key);
        self.arrow.animate(now);

        log::info!("picked cactus {} at {:?}", hit.key, target);
        Some(hit.key)
    }

    /// Renders one frame. A light registry overflow aborts the frame with
    /// [`WorldError::ResourceExhausted`].
    pub fn render_frame(
        &mut self,
        backend: &mut dyn RenderBackend,
        viewport: (u32, u32),
        now: Duration,
    ) -> WorldResult<FrameReport> {
        self.lights.reset();
        self.navigation.update_matrices(viewport.0, viewport.1);

        let camera = self
            .navigation
            .active_camera()
            .ok_or_else(|| WorldError::render("no active camera"))?;
        if self.flashlight_on {
            self.flashlight
                .move_with_direction(camera.position(), camera.direction());
        }

        if self.daytime {
            self.sun.register_lights(&mut self.lights)?;
        }
        for bulb in &self.bulbs {
            bulb.register_lights(&mut self.lights)?;
        }
        if self.flashlight_on {
            self.flashlight.register_lights(&mut self.lights)?;
        }
        for cactus in &self.cacti {
            cactus.register_lights(&mut self.lights)?;
        }
        self.terrain.register_lights(&mut self.lights)?;

        let clear_color = if !self.daytime && !self.fog.is_visible() {
            self.config.night_sky_color
        } else {
            self.fog.color
        };
        backend.begin_frame(&FrameGlobals {
            clear_color,
            camera_position: camera.position().into(),
            fog: FogState {
                color: self.fog.color,
                density: self.fog.current_density(),
                gradient: self.fog.gradient,
                visible: self.fog.is_visible(),
            },
            time: now.as_secs_f32(),
        })?;
        backend.upload_lights(&self.lights.snapshot())?;

        let mut draw_calls = 0;
        for bulb in &self.bulbs {
            draw_calls += bulb.draw(camera, backend)?;
        }
        if self.flashlight_on {
            draw_calls += self.flashlight.draw(camera, backend)?;
        }
        for cactus in &self.cacti {
            draw_calls += cactus.draw(camera, backend)?;
        }
        draw_calls += self.terrain.draw(camera, backend)?;
        draw_calls += self.particles.draw(camera, backend, now)?;
        draw_calls += self.arrow.draw(camera, backend)?;

        backend.present()?;
        Ok(FrameReport {
            draw_calls,
            lights: self.lights.len(),
        })
    }
}

fn on_off(on: bool) -> &'static str {
    if on {
        "on"
    } else {
        "off"
    }
}

fn sand_material() -> Material {
    Material {
        name: "sand".to_string(),
        ambient: [0.05, 0.05, 0.0],
        diffuse: [0.81, 0.81, 0.8],
        specular: [0.05; 3],
        shininess: 23.0,
        diffuse_map: Some("textures/sand/diffuse.jpg".into()),
        specular_map: Some("textures/sand/specular.png".into()),
    }
}

fn flashlight_light() -> Light {
    Light::spotlight(
        [0.0; 3],
        [1.0; 3],
        [1.0; 3],
        FLASHLIGHT_CUTOFF,
        FLASHLIGHT_EXPONENT,
    )
}

/// Imports an OBJ model, falling back to a unit cube when it cannot be read.
fn load_model(
    path: &str,
    fallback: Material,
    meshes: &mut MeshLibrary,
    materials: &mut MaterialLibrary,
) -> MeshId {
    match obj::import(Path::new(path)) {
        Ok(asset) => {
            let material = materials.add(asset.material.unwrap_or(fallback));
            meshes.add(Mesh::new(path, asset.geometry).with_material(material))
        }
        Err(err) => {
            log::warn!("{}, drawing a cube instead", err);
            let material = materials.add(fallback);
            meshes.add(Mesh::new(format!("{path} (cube)"), generate_cube()).with_material(material))
        }
    }
}

/// Random integer grid point inside the terrain at a fixed elevation
fn random_ground_point(config: &WorldConfig, rng: &mut StdRng, elevation: f32) -> Vector3<f32> {
    let x = rng.random_range(0..config.terrain_width) as f32 - config.terrain_width as f32 / 2.0;
    let z = rng.random_range(0..config.terrain_length) as f32 - config.terrain_length as f32 / 2.0;
    Vector3::new(x, elevation, z)
}

fn scatter_cacti(
    config: &WorldConfig,
    ground: &dyn HeightSampler,
    mesh: MeshId,
    rng: &mut StdRng,
) -> Vec<SceneNode> {
    (0..config.cactus_count)
        .map(|index| {
            let mut position = random_ground_point(config, rng, 0.0);
            position.y = ground.sample(position.x, position.z);
            let yaw = rng.random_range(0..360) as f32;

            let local = Matrix4::from_translation(position)
                * Matrix4::from_angle_y(Deg(yaw))
                * Matrix4::from_scale(config.cactus_scale);
            SceneNode::new(format!("cactus {index}"), local).with_mesh(mesh)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::HeightFieldParams,
        gfx::{
            camera::MoveDirection,
            rendering::backend::{
                testing::{Call, RecordingBackend},
                DrawStyle,
            },
        },
    };
    use cgmath::InnerSpace;

    const VIEWPORT: (u32, u32) = (800, 800);

    fn test_config() -> WorldConfig {
        WorldConfig {
            terrain_width: 16,
            terrain_length: 16,
            height_field: HeightFieldParams {
                amplitude: 0.5,
                ..Default::default()
            },
            camera_upper_boundary: 10.2,
            cactus_count: 5,
            cactus_path: "missing/cactus.obj".to_string(),
            arrow_path: "missing/arrow.obj".to_string(),
            light_capacity: 4,
            ..Default::default()
        }
    }

    fn world() -> World {
        World::new(test_config(), 7).expect("world builds")
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_cacti_placement_follows_seed() {
        let a = World::new(test_config(), 7).expect("world");
        let b = World::new(test_config(), 7).expect("world");
        let c = World::new(test_config(), 8).expect("world");

        let positions = |w: &World| w.cacti().iter().map(SceneNode::position).collect::<Vec<_>>();
        assert_eq!(a.cacti().len(), 5);
        assert_eq!(positions(&a), positions(&b));
        assert_ne!(positions(&a), positions(&c));

        for cactus in a.cacti() {
            let p = cactus.position();
            assert!(p.x >= -8.0 && p.x < 8.0 && p.z >= -8.0 && p.z < 8.0);
            assert!((p.y - a.ground().sample(p.x, p.z)).abs() < 1e-4);
        }
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = WorldConfig {
            cactus_count: 300,
            ..test_config()
        };
        assert!(matches!(
            World::new(config, 1),
            Err(WorldError::Configuration(_))
        ));
    }

    #[test]
    fn test_frame_runs_in_order() {
        let mut world = world();
        let mut backend = RecordingBackend::new();
        world.upload_meshes(&mut backend).expect("upload");
        let uploads = backend.calls.len();

        let report = world
            .render_frame(&mut backend, VIEWPORT, ms(0))
            .expect("frame");

        // Five cacti and the terrain; the arrow waits for a target.
        assert_eq!(report.draw_calls, 6);
        assert_eq!(report.lights, 1);

        let frame = &backend.calls[uploads..];
        assert_eq!(frame[0], Call::BeginFrame);
        assert_eq!(frame[1], Call::UploadLights(1));
        assert_eq!(frame.last(), Some(&Call::Present));
        assert_eq!(backend.frames, 1);
    }

    #[test]
    fn test_night_sky_without_fog() {
        let mut world = world();
        let mut backend = RecordingBackend::new();

        world.render_frame(&mut backend, VIEWPORT, ms(0)).expect("frame");
        assert_eq!(
            backend.globals.map(|g| g.clear_color),
            Some(world.fog().color)
        );

        world.handle_action(Action::ToggleDaytime, ms(0));
        backend.clear_frame();
        let report = world.render_frame(&mut backend, VIEWPORT, ms(10)).expect("frame");
        assert_eq!(report.lights, 0);
        assert_eq!(
            backend.globals.map(|g| g.clear_color),
            Some(world.config().night_sky_color)
        );

        world.handle_action(Action::ToggleFog, ms(20));
        backend.clear_frame();
        world.render_frame(&mut backend, VIEWPORT, ms(30)).expect("frame");
        let globals = backend.globals.expect("globals");
        assert_eq!(globals.clear_color, world.fog().color);
        assert!(globals.fog.visible);
    }

    #[test]
    fn test_bulbs_are_lit_and_drawn() {
        let mut world = world();
        let mut backend = RecordingBackend::new();

        world.handle_action(Action::PlaceBulb, ms(0));
        let report = world.render_frame(&mut backend, VIEWPORT, ms(0)).expect("frame");

        assert_eq!(report.lights, 2);
        assert_eq!(report.draw_calls, 7);
        assert_eq!(backend.draws[0].style, DrawStyle::Emissive);
        assert_eq!(backend.draws[0].mesh, world.bulb_mesh);
        let bulb_position = world.bulbs()[0].position();
        assert!((bulb_position - Vector3::new(0.0, 10.0, 0.0)).magnitude() < 1e-4);
    }

    #[test]
    fn test_flashlight_follows_camera() {
        let mut world = world();
        let mut backend = RecordingBackend::new();
        world.handle_action(Action::ToggleFlashlight, ms(0));

        let report = world.render_frame(&mut backend, VIEWPORT, ms(0)).expect("frame");
        assert_eq!(report.lights, 2);

        let camera = world.navigation().active_camera().expect("camera");
        let spot = backend.lights[1];
        assert_eq!(spot.is_spot, 1);
        let position: [f32; 3] = camera.position().into();
        let direction: [f32; 3] = camera.direction().into();
        assert_eq!(spot.position, position);
        assert_eq!(spot.direction, direction);
    }

    #[test]
    fn test_light_overflow_is_fatal() {
        let mut world = world();
        let mut backend = RecordingBackend::new();
        for _ in 0..4 {
            world.handle_action(Action::PlaceBulb, ms(0));
        }

        let err = world
            .render_frame(&mut backend, VIEWPORT, ms(0))
            .expect_err("sun plus four bulbs exceed four slots");
        assert!(matches!(err, WorldError::ResourceExhausted { capacity: 4 }));
        assert!(err.is_fatal());
        assert!(!backend.calls.contains(&Call::Present));
    }

    #[test]
    fn test_ceiling_hit_spawns_particle() {
        let mut world = world();
        world.handle_action(Action::ToggleFreeMode, ms(0));
        assert_eq!(world.key_event(KeyCode::KeyS, true, false), None);

        let start = world.navigation().active_camera().expect("camera").position();
        world.update(ms(20));

        assert_eq!(world.particles().len(), 1);
        assert_eq!(world.particles().particles()[0].position, start);
        assert_eq!(
            world.navigation().active_camera().map(Camera::position),
            Some(start)
        );

        world.release_keys();
        world.update(ms(2000));
        assert!(world.particles().is_empty());
    }

    #[test]
    fn test_movement_needs_free_mode() {
        let mut world = world();
        world.key_event(KeyCode::KeyW, true, false);
        let start = world.navigation().active_camera().expect("camera").position();

        world.update(ms(50));
        assert_eq!(
            world.navigation().active_camera().map(Camera::position),
            Some(start)
        );

        world.handle_action(Action::ToggleFreeMode, ms(50));
        world.update(ms(100));
        let moved = world.navigation().active_camera().expect("camera").position();
        assert!(moved != start);
        assert!(moved.y < start.y);
        assert!(matches!(
            world.navigation_mut().move_active(MoveDirection::Left),
            crate::gfx::camera::MoveOutcome::Moved
        ));
    }

    #[test]
    fn test_refresh_rate_keeps_ground_speed() {
        let distance_in_one_second = |toggle_rate: bool| {
            let config = WorldConfig {
                camera_speed: 4.0,
                ..test_config()
            };
            let mut world = World::new(config, 7).expect("world");
            if toggle_rate {
                world.handle_action(Action::ToggleRefreshRate, ms(0));
                assert_eq!(world.key_ticker.period(), ms(8));
            }
            world.handle_action(Action::ToggleFreeMode, ms(0));
            world.key_event(KeyCode::KeyA, true, false);

            let start = world.navigation().active_camera().expect("camera").position();
            for t in (4..=1000).step_by(4) {
                world.update(ms(t));
            }
            let end = world.navigation().active_camera().expect("camera").position();
            (end - start).magnitude()
        };

        let at_60 = distance_in_one_second(false);
        let at_120 = distance_in_one_second(true);
        assert!(at_60 > 4.0, "moved {at_60}");
        assert!((at_60 - at_120).abs() < 0.1, "60 Hz {at_60}, 120 Hz {at_120}");
    }

    #[test]
    fn test_camera_slots() {
        let mut world = world();
        let main = world.navigation().active_id();

        world.handle_action(Action::SelectCamera(0), ms(0));
        let active = world.navigation().active_camera().expect("camera");
        assert_eq!(active.name, "static 1");
        assert_eq!(active.position().y, STATIC_CAMERA_ELEVATION);

        world.handle_action(Action::SelectCamera(7), ms(0));
        world.handle_action(Action::SelectCamera(2), ms(0));
        assert_eq!(world.navigation().active_id(), main);
    }

    #[test]
    fn test_pick_attaches_light_and_targets_arrow() {
        let mut world = world();
        let mut backend = RecordingBackend::new();

        // The main camera looks down (0, -1, 1) from (0, 10, 0), so (0, 0, 10)
        // sits in the middle of the viewport.
        world.cacti[0].move_to(Vector3::new(0.0, 0.0, 10.0));
        for cactus in &mut world.cacti[1..] {
            cactus.move_to(Vector3::new(100.0, 0.0, -100.0));
        }
        world.render_frame(&mut backend, VIEWPORT, ms(0)).expect("frame");

        let picked = world.pick((400.0, 400.0), VIEWPORT, ms(10));
        assert_eq!(picked, Some(0));
        assert_eq!(world.arrow_target(), Some(0));
        assert_eq!(world.cacti()[0].children().len(), 1);

        // Picking again does not stack lights.
        world.pick((400.0, 400.0), VIEWPORT, ms(20));
        assert_eq!(world.cacti()[0].children().len(), 1);

        backend.clear_frame();
        let report = world.render_frame(&mut backend, VIEWPORT, ms(30)).expect("frame");
        assert_eq!(report.lights, 2);
        assert_eq!(report.draw_calls, 7);

        let spot = backend.lights[1];
        assert_eq!(spot.position, [0.0, PICK_LIGHT_HEIGHT, 10.0]);
        assert_eq!(spot.direction, [0.0, -1.0, 0.0]);
        assert_eq!(world.pick((0.0, 0.0), VIEWPORT, ms(40)), None);
    }

    #[test]
    fn test_fog_fades_in_over_ticks() {
        let mut world = world();
        world.handle_action(Action::ToggleFog, ms(0));
        assert!(world.fog().is_visible());

        world.update(ms(500));
        let halfway = world.fog().current_density();
        assert!(halfway > Fog::MIN_DENSITY && halfway < world.config().fog.density);

        world.update(ms(1100));
        assert!(!world.fog().is_animating());
        assert_eq!(world.fog().current_density(), world.config().fog.density);
    }
}
