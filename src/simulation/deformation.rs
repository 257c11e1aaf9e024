//! Proximity squash/stretch for the giant-impact scene
//!
//! Purely a visual signal. Each tick every body's target direction is
//! rebuilt from scratch out of all nearby pairs, then `deform_amount` eases
//! toward the length of that target.

use crate::simulation::params::Parameters;
use crate::simulation::scenario::ScenarioType;
use crate::simulation::states::{NVec3, System};

/// Proximity factor for a pair at distance `dist` with summed radii `sum_r`.
///
/// 0 at or beyond `reach * sum_r`, rising linearly to 1 at `core * sum_r`.
pub fn proximity_factor(dist: f64, sum_r: f64, reach: f64, core: f64) -> f64 {
    if dist > sum_r * reach {
        return 0.0;
    }
    let core_r = sum_r * core;
    (1.0 - (dist - core_r) / core_r).clamp(0.0, 1.0)
}

/// Rebuild deformation targets and ease the amounts. Returns the number of
/// pairs that contributed.
pub fn apply_mutual_deformation(kind: ScenarioType, sys: &mut System, params: &Parameters, dt: f64) -> usize {
    if !kind.deformation_enabled() || sys.active_count() < 2 {
        return 0;
    }

    for b in sys.bodies.iter_mut() {
        b.deform_target = NVec3::zeros();
    }

    let n = sys.bodies.len();
    let mut pairs = 0;
    for i in 0..n {
        for j in (i + 1)..n {
            let (a, b) = (&sys.bodies[i], &sys.bodies[j]);
            if !a.is_active() || !b.is_active() {
                continue;
            }

            let d = b.x - a.x;
            let dist = d.norm();
            let t = proximity_factor(dist, a.radius + b.radius, params.deform_reach, params.deform_core);
            if t <= 0.0 || dist == 0.0 {
                continue;
            }

            // a leans toward b, b away from a
            let dir_ab = d / dist;
            sys.bodies[i].deform_target += dir_ab * t;
            sys.bodies[j].deform_target -= dir_ab * t;
            pairs += 1;
        }
    }

    let alpha = (params.deform_ease * dt).clamp(0.0, 1.0);
    for b in sys.bodies.iter_mut().filter(|b| b.is_active()) {
        let target = b.deform_target.norm().min(1.0);
        b.deform_amount = (b.deform_amount + (target - b.deform_amount) * alpha).clamp(0.0, 1.0);
    }
    pairs
}
