//! Distance fog with animated fade in/out
//!
//! Enabling or disabling fog does not switch it instantly: the density is
//! interpolated between [`Fog::MIN_DENSITY`] and the configured density over
//! [`Fog::FADE_TIME`]. Fog stays visible until a fade-out completes.

use std::time::Duration;

use crate::config::FogParams;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Fade {
    from: f32,
    to: f32,
    started: Duration,
}

#[derive(Debug, Clone)]
pub struct Fog {
    pub color: [f32; 3],
    /// Density once fully faded in
    pub density: f32,
    pub gradient: f32,
    current_density: f32,
    enabled: bool,
    visible: bool,
    fade: Option<Fade>,
}

impl Fog {
    pub const MIN_DENSITY: f32 = 0.001;
    pub const FADE_TIME: Duration = Duration::from_millis(1000);

    pub fn new(params: FogParams) -> Self {
        Self {
            color: params.color,
            density: params.density,
            gradient: params.gradient,
            current_density: Self::MIN_DENSITY,
            enabled: false,
            visible: false,
            fade: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_animating(&self) -> bool {
        self.fade.is_some()
    }

    pub fn current_density(&self) -> f32 {
        self.current_density
    }

    pub fn enable(&mut self, now: Duration) {
        if self.enabled {
            return;
        }
        self.enabled = true;
        self.visible = true;
        self.start_fade(self.density, now);
    }

    pub fn disable(&mut self, now: Duration) {
        if !self.enabled {
            return;
        }
        self.enabled = false;
        self.start_fade(Self::MIN_DENSITY, now);
    }

    pub fn toggle(&mut self, now: Duration) {
        if self.enabled {
            self.disable(now);
        } else {
            self.enable(now);
        }
    }

    fn start_fade(&mut self, to: f32, now: Duration) {
        self.fade = Some(Fade {
            from: self.current_density,
            to,
            started: now,
        });
    }

    /// Advances the fade to `now`
    pub fn tick(&mut self, now: Duration) {
        let Some(fade) = self.fade else {
            return;
        };

        let t = now.saturating_sub(fade.started).as_secs_f32() / Self::FADE_TIME.as_secs_f32();
        if t >= 1.0 {
            self.current_density = fade.to;
            self.fade = None;
            if !self.enabled {
                self.visible = false;
            }
            log::debug!("fog fade finished, visible: {}", self.visible);
        } else {
            self.current_density = fade.from + (fade.to - fade.from) * t;
        }
    }
}
