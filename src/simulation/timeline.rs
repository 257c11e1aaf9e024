//! Giant-impact cinematic timeline
//!
//! Three phases keyed on elapsed (unscaled) scenario time:
//!
//! | elapsed       | phase      | time-scale | camera                              |
//! |---------------|------------|------------|-------------------------------------|
//! | `t < 4`       | Approach   | 0.7        | ease to (0, 35, 260), look at origin |
//! | `4 <= t < 8`  | SlowMotion | 0.3        | ease to (0, 20, 120)                |
//! | `t >= 8`      | Orbit      | 0.5        | circle r=150, h=25, w=0.2 rad/s      |
//!
//! The timeline never stops on its own. It lives until the scenario is
//! replaced or reset.

use crate::simulation::camera::CameraRig;
use crate::simulation::states::NVec3;

pub const APPROACH_END: f64 = 4.0;
pub const SLOW_MOTION_END: f64 = 8.0;

/// Velocity given to the impactor when the timeline starts
pub const IMPACTOR_LAUNCH_VELOCITY: [f64; 3] = [-8.0, 0.0, 0.0];

const ORBIT_RADIUS: f64 = 150.0;
const ORBIT_HEIGHT: f64 = 25.0;
const ORBIT_SPEED: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelinePhase {
    Approach,
    SlowMotion,
    Orbit,
}

impl TimelinePhase {
    pub fn at(elapsed: f64) -> Self {
        if elapsed < APPROACH_END {
            Self::Approach
        } else if elapsed < SLOW_MOTION_END {
            Self::SlowMotion
        } else {
            Self::Orbit
        }
    }

    pub fn time_scale(self) -> f64 {
        match self {
            Self::Approach => 0.7,
            Self::SlowMotion => 0.3,
            Self::Orbit => 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GiantImpactTimeline {
    pub elapsed: f64,
    pub playing: bool,
    pub impact_occurred: bool,
    pub time_scale: f64,
}

impl Default for GiantImpactTimeline {
    fn default() -> Self {
        Self::new()
    }
}

impl GiantImpactTimeline {
    pub fn new() -> Self {
        Self {
            elapsed: 0.0,
            playing: false,
            impact_occurred: false,
            time_scale: 1.0,
        }
    }

    /// Fresh, playing timeline
    pub fn started() -> Self {
        Self {
            playing: true,
            ..Self::new()
        }
    }

    pub fn phase(&self) -> TimelinePhase {
        TimelinePhase::at(self.elapsed)
    }

    /// Add `raw_dt` of wall time, steer the camera and return the time-scale
    /// for this tick. A stopped timeline runs at 1.0 and leaves the camera.
    pub fn advance(&mut self, raw_dt: f64, camera: &mut CameraRig) -> f64 {
        if !self.playing {
            self.time_scale = 1.0;
            return self.time_scale;
        }
        if raw_dt.is_finite() && raw_dt > 0.0 {
            self.elapsed += raw_dt;
        }

        let phase = self.phase();
        self.time_scale = phase.time_scale();

        match phase {
            TimelinePhase::Approach => {
                camera.ease_position(NVec3::new(0.0, 35.0, 260.0), 0.03);
                camera.ease_look_at(NVec3::zeros(), 0.1);
            }
            TimelinePhase::SlowMotion => {
                camera.ease_position(NVec3::new(0.0, 20.0, 120.0), 0.05);
            }
            TimelinePhase::Orbit => {
                let t = self.elapsed - SLOW_MOTION_END;
                let angle = ORBIT_SPEED * t;
                let target = NVec3::new(angle.cos() * ORBIT_RADIUS, ORBIT_HEIGHT, angle.sin() * ORBIT_RADIUS);
                camera.ease_position(target, 0.08);
                camera.look_at = NVec3::zeros();
            }
        }
        self.time_scale
    }
}
