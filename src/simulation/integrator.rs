//! Fixed-step time integration for the body set
//!
//! A tick hands over a scaled frame delta. The stepper accumulates it and
//! advances the system in fixed `params.h0` substeps using semi-implicit
//! (symplectic) Euler, capped at `params.max_substeps` per tick.

use tracing::warn;

use super::params::Parameters;
use super::states::{is_finite_vec, NVec3, System};

/// Advance every live body by one step of `dt` under constant `forces`.
/// Kick first (v += F/m dt), then drift with the new velocity (x += v dt).
///
/// A body whose new state is not finite keeps its previous state.
pub fn symplectic_euler_step(sys: &mut System, forces: &[NVec3], dt: f64) {
    for (b, f) in sys.bodies.iter_mut().zip(forces.iter()) {
        if !b.is_active() {
            continue;
        }

        let v_new = b.v + *f * (dt / b.m);
        let x_new = b.x + v_new * dt;

        if is_finite_vec(&v_new) && is_finite_vec(&x_new) {
            b.v = v_new;
            b.x = x_new;
        } else {
            warn!(body = %b.name, "non-finite state after integration; holding last good state");
        }
    }
    sys.t += dt;
}

/// Time accumulator driving fixed substeps
#[derive(Debug, Clone, Default)]
pub struct FixedStepper {
    accumulator: f64,
}

impl FixedStepper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed `dt` of scaled time and run as many fixed substeps as fit.
    /// Time beyond the substep cap is discarded. Returns the substep count.
    pub fn advance(&mut self, sys: &mut System, forces: &[NVec3], dt: f64, params: &Parameters) -> u32 {
        if !dt.is_finite() || dt <= 0.0 || params.h0 <= 0.0 {
            return 0;
        }

        self.accumulator += dt;
        let mut steps = 0;
        while self.accumulator >= params.h0 && steps < params.max_substeps {
            symplectic_euler_step(sys, forces, params.h0);
            self.accumulator -= params.h0;
            steps += 1;
        }

        // cap hit: drop the backlog instead of spiralling
        if steps == params.max_substeps {
            self.accumulator = self.accumulator.min(params.h0);
        }
        steps
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
