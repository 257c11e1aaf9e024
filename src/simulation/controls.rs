//! Per-scenario control handles
//!
//! A scenario may register one [`ScenarioControl`] when it is built. The
//! world drives it every tick, forwards the scenario-action trigger to it,
//! and calls `teardown` exactly once before the next scenario replaces it.
//! After teardown a control must never act again.

use tracing::{debug, warn};

use crate::simulation::states::{BodyId, NVec3, System};

/// Camera move requested by a control
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraDirective {
    pub position: NVec3,
    pub look_at: NVec3,
}

pub trait ScenarioControl: Send {
    fn name(&self) -> &'static str;

    /// Advance timers and animations by `dt` seconds of wall time
    fn update(&mut self, _dt: f64, _sys: &mut System) {}

    /// Scenario action key. May return a camera move.
    fn trigger(&mut self, _sys: &mut System) -> Option<CameraDirective> {
        None
    }

    /// Ambient light level the scene wants, if the control animates it
    fn ambient_intensity(&self) -> Option<f64> {
        None
    }

    /// Cancel everything this control scheduled
    fn teardown(&mut self);

    fn is_active(&self) -> bool;
}

/// Linear ramp of a scalar over `duration` seconds
#[derive(Debug, Clone, Copy, PartialEq)]
struct Fade {
    from: f64,
    to: f64,
    duration: f64,
    elapsed: f64,
}

impl Fade {
    fn value(&self) -> f64 {
        let progress = if self.duration > 0.0 {
            (self.elapsed / self.duration).min(1.0)
        } else {
            1.0
        };
        self.from + (self.to - self.from) * progress
    }

    fn done(&self) -> bool {
        self.elapsed >= self.duration
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EclipseKind {
    Solar,
    Lunar,
}

pub const ECLIPSE_FADE_OUT: f64 = 12.0;
pub const ECLIPSE_FADE_IN: f64 = 3.0;
pub const ECLIPSE_DIM_LEVEL: f64 = 0.1;
pub const MOON_SPEED: f64 = 0.5;
pub const MOON_TRAVEL: f64 = 6.0;
pub const MOON_START_X: f64 = 5.0;

/// Eclipse playback: slide the Moon across the Sun-Earth line while the
/// ambient light dims, then bring the light back.
pub struct EclipseControl {
    kind: EclipseKind,
    sun: BodyId,
    earth: BodyId,
    moon: BodyId,
    active: bool,
    playing: bool,
    ambient: f64,
    fade: Option<Fade>,
    restore_in: Option<f64>,
}

impl EclipseControl {
    pub fn new(kind: EclipseKind, sun: BodyId, earth: BodyId, moon: BodyId) -> Self {
        Self {
            kind,
            sun,
            earth,
            moon,
            active: true,
            playing: false,
            ambient: 1.0,
            fade: None,
            restore_in: None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    fn start_fade(&mut self, to: f64, duration: f64) {
        self.fade = Some(Fade {
            from: self.ambient,
            to,
            duration,
            elapsed: 0.0,
        });
    }
}

impl ScenarioControl for EclipseControl {
    fn name(&self) -> &'static str {
        match self.kind {
            EclipseKind::Solar => "solar_eclipse",
            EclipseKind::Lunar => "lunar_eclipse",
        }
    }

    fn update(&mut self, dt: f64, _sys: &mut System) {
        if !self.active {
            return;
        }

        if let Some(fade) = self.fade.as_mut() {
            fade.elapsed += dt;
            self.ambient = fade.value();
            if fade.done() {
                self.fade = None;
            }
        }

        if let Some(remaining) = self.restore_in.as_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.restore_in = None;
                self.start_fade(1.0, ECLIPSE_FADE_IN);
                self.playing = false;
                debug!(control = self.name(), "eclipse finished; restoring light");
            }
        }
    }

    fn trigger(&mut self, sys: &mut System) -> Option<CameraDirective> {
        if !self.active || self.playing {
            return None;
        }

        let (Some(earth), Some(sun)) = (sys.get(self.earth), sys.get(self.sun)) else {
            warn!(control = self.name(), "eclipse bodies missing; ignoring trigger");
            return None;
        };
        let (earth_x, sun_x) = (earth.x, sun.x);

        let Some(moon) = sys.get_mut(self.moon) else {
            warn!(control = self.name(), "moon missing; ignoring trigger");
            return None;
        };
        moon.x = NVec3::new(MOON_START_X, 0.0, moon.x.z);
        moon.v = NVec3::new(-MOON_SPEED, 0.0, 0.0);
        let moon_x = moon.x;

        self.playing = true;
        self.start_fade(ECLIPSE_DIM_LEVEL, ECLIPSE_FADE_OUT);
        self.restore_in = Some(MOON_TRAVEL / MOON_SPEED + ECLIPSE_FADE_OUT);
        debug!(control = self.name(), "eclipse playback started");

        let look_at = match self.kind {
            EclipseKind::Solar => sun_x,
            EclipseKind::Lunar => moon_x,
        };
        Some(CameraDirective {
            position: earth_x,
            look_at,
        })
    }

    fn ambient_intensity(&self) -> Option<f64> {
        self.active.then_some(self.ambient)
    }

    fn teardown(&mut self) {
        self.active = false;
        self.playing = false;
        self.fade = None;
        self.restore_in = None;
        debug!(control = self.name(), "control torn down");
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
