//! Window and event loop
//!
//! [`SuccuApp`] owns the winit event loop; the [`ApplicationHandler`] state
//! creates the window and the wgpu backend on resume, feeds input and elapsed
//! time to the [`World`], and renders on every redraw.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalPosition, PhysicalSize},
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Fullscreen, Window, WindowAttributes, WindowId},
};

use crate::{
    config::WorldConfig,
    error::{WorldError, WorldResult},
    gfx::{camera::CameraController, rendering::WgpuBackend},
    input::Action,
    performance::FrameStats,
    world::World,
};

pub struct SuccuApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    window: Option<Arc<Window>>,
    backend: Option<WgpuBackend>,
    world: World,
    controller: CameraController,
    stats: FrameStats,
    start: Instant,
    last_frame: Option<Instant>,
    cursor: Option<PhysicalPosition<f64>>,
    /// Error that ended the run loop
    fatal: Option<WorldError>,
}

impl SuccuApp {
    /// Builds the world; the window opens once [`run`](Self::run) starts the loop.
    pub fn new(config: WorldConfig, seed: u32) -> WorldResult<Self> {
        let event_loop = EventLoop::new()
            .map_err(|e| WorldError::render(format!("cannot create event loop: {e}")))?;
        let world = World::new(config, seed)?;

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                window: None,
                backend: None,
                world,
                controller: CameraController::new(),
                stats: FrameStats::new(),
                start: Instant::now(),
                last_frame: None,
                cursor: None,
                fatal: None,
            },
        })
    }

    pub fn world(&self) -> &World {
        &self.app_state.world
    }

    /// Runs until the window closes. Returns the error that stopped it, if any.
    pub fn run(mut self) -> WorldResult<()> {
        let event_loop = self
            .event_loop
            .take()
            .ok_or_else(|| WorldError::render("event loop already consumed"))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        event_loop
            .run_app(&mut self.app_state)
            .map_err(|e| WorldError::render(format!("event loop failed: {e}")))?;

        match self.app_state.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: WorldError) {
        log::error!("{}", err);
        self.fatal = Some(err);
        event_loop.exit();
    }

    fn create_backend(&mut self, window: Arc<Window>) -> WorldResult<WgpuBackend> {
        let PhysicalSize { width, height } = window.inner_size();
        let mut backend = pollster::block_on(WgpuBackend::new(
            window,
            width,
            height,
            self.world.config().light_capacity,
        ))?;
        self.world.upload_meshes(&mut backend)?;
        Ok(backend)
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, window: &Window, event: &KeyEvent) {
        let PhysicalKey::Code(key) = event.physical_key else {
            return;
        };
        let pressed = event.state == ElementState::Pressed;
        let Some(action) = self.world.key_event(key, pressed, event.repeat) else {
            return;
        };

        match action {
            Action::Quit => event_loop.exit(),
            Action::ToggleFullscreen => {
                let fullscreen = match window.fullscreen() {
                    Some(_) => None,
                    None => Some(Fullscreen::Borderless(None)),
                };
                window.set_fullscreen(fullscreen);
            }
            action => {
                let now = self.elapsed();
                self.world.handle_action(action, now);
            }
        }
        self.controller.sync_cursor(window, self.world.navigation());
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let now = self.elapsed();
        self.world.update(now);

        let Some(backend) = self.backend.as_mut() else {
            return;
        };
        let viewport = backend.surface_size();
        match self.world.render_frame(backend, viewport, now) {
            Ok(report) => {
                let frame_start = Instant::now();
                let frame_time = self
                    .last_frame
                    .map_or(Duration::ZERO, |last| frame_start.duration_since(last));
                self.last_frame = Some(frame_start);
                self.stats.record(frame_time, report, now);
            }
            Err(err) if err.is_fatal() => self.fail(event_loop, err),
            Err(err) => log::warn!("frame dropped: {}", err),
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let config = self.world.config();
        let attributes = WindowAttributes::default()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(config.window_width, config.window_height));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail(event_loop, WorldError::render(format!("cannot create window: {e}")));
                return;
            }
        };

        match self.create_backend(window.clone()) {
            Ok(backend) => {
                self.backend = Some(backend);
                self.window = Some(window);
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.clone() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let Some(backend) = self.backend.as_mut() {
                    backend.resize(width, height);
                }
            }
            WindowEvent::Focused(false) => self.world.release_keys(),
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(event_loop, &window, &event),
            WindowEvent::CursorMoved { position, .. } => self.cursor = Some(position),
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                let (Some(cursor), Some(backend)) = (self.cursor, self.backend.as_ref()) else {
                    return;
                };
                let viewport = backend.surface_size();
                let now = self.elapsed();
                self.world
                    .pick((cursor.x as f32, cursor.y as f32), viewport, now);
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => (),
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        self.controller
            .process_events(&event, self.world.navigation_mut());
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}
