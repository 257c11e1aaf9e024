//! Core state types for the scenario simulation.
//!
//! Defines the 3D body and the body set it lives in:
//! - `Body`   a single celestial object using `NVec3`
//! - `System` the owned, ordered list of bodies plus the simulation clock
//!
//! Bodies are never removed the moment they die. A dead body stays in the
//! list, flagged, until the cleanup phase of the following tick so that one
//! frame can still observe it.

use nalgebra::Vector3;

use crate::error::{SimError, SimResult};

pub type NVec3 = Vector3<f64>;
pub type BodyId = u64;

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub id: BodyId,
    pub name: String,
    pub texture_key: String,
    pub x: NVec3, // position
    pub v: NVec3, // velocity
    pub m: f64, // mass
    pub radius: f64, // collision/visual radius
    pub alive: bool,
    pub died_at: Option<u64>, // tick the body was marked dead
    pub deform_target: NVec3, // accumulated squash direction for this tick
    pub deform_amount: f64, // eased intensity in [0, 1]
}

impl Body {
    /// Build a body at rest at the origin.
    ///
    /// Mass and radius must be finite and strictly positive.
    pub fn new(
        id: BodyId,
        name: impl Into<String>,
        texture_key: impl Into<String>,
        m: f64,
        radius: f64,
    ) -> SimResult<Self> {
        let name = name.into();
        if !m.is_finite() || m <= 0.0 {
            return Err(SimError::invalid_body(name, format!("mass must be > 0, got {m}")));
        }
        if !radius.is_finite() || radius <= 0.0 {
            return Err(SimError::invalid_body(name, format!("radius must be > 0, got {radius}")));
        }

        Ok(Self {
            id,
            name,
            texture_key: texture_key.into(),
            x: NVec3::zeros(),
            v: NVec3::zeros(),
            m,
            radius,
            alive: true,
            died_at: None,
            deform_target: NVec3::zeros(),
            deform_amount: 0.0,
        })
    }

    pub fn with_position(mut self, x: NVec3) -> Self {
        self.x = sanitize_vec(x);
        self
    }

    pub fn with_velocity(mut self, v: NVec3) -> Self {
        self.v = sanitize_vec(v);
        self
    }

    /// Alive bodies take part in gravity, collisions and deformation
    pub fn is_active(&self) -> bool {
        self.alive
    }

    pub fn kill(&mut self, tick: u64) {
        if self.alive {
            self.alive = false;
            self.died_at = Some(tick);
        }
    }

    /// Case-insensitive substring match on the body name
    pub fn name_contains(&self, marker: &str) -> bool {
        self.name.to_lowercase().contains(&marker.to_lowercase())
    }

    pub fn momentum(&self) -> NVec3 {
        self.v * self.m
    }
}

/// Replace non-finite components with zero
pub fn sanitize_vec(v: NVec3) -> NVec3 {
    v.map(|c| if c.is_finite() { c } else { 0.0 })
}

pub fn is_finite_vec(v: &NVec3) -> bool {
    v.iter().all(|c| c.is_finite())
}

#[derive(Debug, Clone, Default)]
pub struct System {
    pub bodies: Vec<Body>, // collection of bodies, dead ones included until cleanup
    pub t: f64, // scaled simulation time
    next_id: BodyId,
}

impl System {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out a fresh id. Ids are never reused within one `System`.
    pub fn next_id(&mut self) -> BodyId {
        self.next_id += 1;
        self.next_id
    }

    pub fn push(&mut self, body: Body) {
        self.next_id = self.next_id.max(body.id);
        self.bodies.push(body);
    }

    pub fn active(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter().filter(|b| b.is_active())
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id == id)
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.iter_mut().find(|b| b.id == id)
    }

    /// Drop every body that died before `tick`, returning them.
    ///
    /// Bodies killed during `tick` itself are kept for one more frame.
    pub fn remove_dead(&mut self, tick: u64) -> Vec<Body> {
        let (gone, kept): (Vec<Body>, Vec<Body>) = std::mem::take(&mut self.bodies)
            .into_iter()
            .partition(|b| matches!(b.died_at, Some(d) if d < tick));
        self.bodies = kept;
        gone
    }

    /// Dispose of all bodies and rewind the clock
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.t = 0.0;
    }

    pub fn total_mass(&self) -> f64 {
        self.active().map(|b| b.m).sum()
    }

    pub fn total_momentum(&self) -> NVec3 {
        self.active().fold(NVec3::zeros(), |acc, b| acc + b.momentum())
    }
}
