//! Force contributors for the scenario engine
//!
//! Forces are recomputed from scratch every tick. Nothing persists between
//! ticks: the buffer is zeroed, each term adds its share, and the
//! integrator consumes it.

use crate::simulation::scenario::ScenarioType;
use crate::simulation::states::{NVec3, System};

/// Collection of force terms (gravity, drag, etc.)
/// Contributions are summed into one force vector per body index
pub struct ForceSet {
    terms: Vec<Box<dyn ForceTerm + Send + Sync>>,
}

impl Default for ForceSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ForceSet {
    /// Create an empty force set
    pub fn new() -> Self {
        Self {
            terms: Vec::new(),
        }
    }

    /// Add a force term
    pub fn with(mut self, term: impl ForceTerm + Send + Sync + 'static) -> Self {
        self.terms.push(Box::new(term));
        self
    }

    /// Compute total forces for all bodies in `sys` under scenario `kind`
    /// - `out[i]` is set to the sum of contributions for `sys.bodies[i]`
    pub fn accumulate_forces(&self, kind: ScenarioType, sys: &System, out: &mut [NVec3]) {
        // Zero buffer
        for f in out.iter_mut() {
            *f = NVec3::zeros();
        }
        for term in &self.terms {
            term.force(kind, sys, out);
        }
    }
}

/// Trait for force sources operating on [`System`]
/// Implementations add their contribution into `out[i]` for each body
pub trait ForceTerm {
    fn force(&self, kind: ScenarioType, sys: &System, out: &mut [NVec3]);
}

/// Star-centred Newtonian gravity
///
/// The heaviest live body is the star. Every other live body is pulled
/// toward it with `F = G * m_star * m_body / r^2`. Body-body attraction
/// between non-star bodies is not modelled.
#[allow(non_snake_case)]
pub struct StarGravity {
    pub G: f64, // gravitational constant
    pub min_r2: f64, // pairs with r^2 below this are skipped
}

impl StarGravity {
    /// Indices of live bodies sorted by mass, heaviest first.
    /// Equal masses keep their list order.
    pub fn ranked(sys: &System) -> Vec<usize> {
        let mut idx: Vec<usize> = (0..sys.bodies.len())
            .filter(|&i| sys.bodies[i].is_active())
            .collect();
        idx.sort_by(|&a, &b| sys.bodies[b].m.total_cmp(&sys.bodies[a].m));
        idx
    }
}

impl ForceTerm for StarGravity {
    fn force(&self, kind: ScenarioType, sys: &System, out: &mut [NVec3]) {
        if !kind.gravity_enabled() {
            return;
        }

        let ranked = Self::ranked(sys);
        if ranked.len() < 2 {
            return;
        }

        let star = &sys.bodies[ranked[0]];
        for &i in &ranked[1..] {
            let body = &sys.bodies[i];

            // points from the body to the star
            let r = star.x - body.x;
            let r2 = r.norm_squared();
            if r2 < self.min_r2 {
                continue;
            }

            let magnitude = self.G * star.m * body.m / r2;
            out[i] += r / r2.sqrt() * magnitude;
        }
    }
}
