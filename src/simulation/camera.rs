//! Camera rig state exposed to the presentation layer
//!
//! The core never renders. It only keeps where the camera should be and
//! what it should look at, easing both toward targets set by scenarios,
//! the giant-impact timeline, or a followed body.

use crate::simulation::states::{BodyId, NVec3};

pub const DEFAULT_CAMERA_POSITION: [f64; 3] = [0.0, 50.0, 150.0];

#[derive(Debug, Clone, PartialEq)]
pub struct CameraRig {
    pub position: NVec3,
    pub look_at: NVec3,
    pub follow: Option<BodyId>,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            position: NVec3::from(DEFAULT_CAMERA_POSITION),
            look_at: NVec3::zeros(),
            follow: None,
        }
    }
}

/// Replace non-finite components with the matching component of `fallback`
pub fn sanitize_or(v: NVec3, fallback: NVec3) -> NVec3 {
    NVec3::new(
        if v.x.is_finite() { v.x } else { fallback.x },
        if v.y.is_finite() { v.y } else { fallback.y },
        if v.z.is_finite() { v.z } else { fallback.z },
    )
}

impl CameraRig {
    /// Snap to a scenario-provided vantage. Missing or non-finite values
    /// fall back to the default camera and the origin.
    pub fn apply_scenario(&mut self, position: Option<NVec3>, look_at: Option<NVec3>) {
        let default_pos = NVec3::from(DEFAULT_CAMERA_POSITION);
        self.position = sanitize_or(position.unwrap_or(default_pos), default_pos);
        self.look_at = sanitize_or(look_at.unwrap_or_else(NVec3::zeros), NVec3::zeros());
    }

    pub fn ease_position(&mut self, target: NVec3, alpha: f64) {
        self.position += (target - self.position) * alpha;
    }

    pub fn ease_look_at(&mut self, target: NVec3, alpha: f64) {
        self.look_at += (target - self.look_at) * alpha;
    }

    /// One follow step toward `target`: look-at eases in, and the camera
    /// closes in until it is `standoff` away.
    pub fn follow_step(&mut self, target: NVec3, standoff: f64) {
        self.ease_look_at(target, 0.05);

        let offset = self.position - target;
        let dist = offset.norm();
        if dist > standoff {
            let anchor = target + offset / dist * standoff;
            self.ease_position(anchor, 0.05);
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
