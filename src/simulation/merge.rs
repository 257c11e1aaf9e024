//! Inelastic mergers between touching bodies
//!
//! A merge kills both parents on the spot and produces one child that
//! conserves mass and momentum. The child does not enter the body set
//! immediately: it waits in a [`MergeQueue`] for a short delay so the merge
//! effect can play, and a scenario reset cancels whatever is still waiting.

use tracing::{debug, warn};

use crate::simulation::collision::Contact;
use crate::simulation::scenario::ScenarioType;
use crate::simulation::states::{Body, BodyId, NVec3, System};

/// Name fragment marking the giant-impact impactor
pub const IMPACTOR_MARKER: &str = "theia";
pub const MOLTEN_NAME: &str = "Molten-Earth";
pub const MOLTEN_TEXTURE: &str = "MoltenEarth";

/// Visual effect the presentation layer should play for a merge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeEffect {
    Explosion,
    ImpactFlash,
}

/// Conserved quantities of a merged pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeKinematics {
    pub m: f64,
    pub radius: f64,
    pub x: NVec3,
    pub v: NVec3,
}

/// Combine two bodies.
///
/// - mass adds
/// - volume adds, so `radius = cbrt(r1^3 + r2^3)`
/// - momentum is conserved
/// - position is `p1 * ratio + p2 * (1 - ratio)` with `ratio = m1 / m`,
///   evaluated in exactly that form
pub fn merge_kinematics(p1: &Body, p2: &Body) -> MergeKinematics {
    let m = p1.m + p2.m;
    let radius = (p1.radius.powi(3) + p2.radius.powi(3)).cbrt();
    let ratio = p1.m / m;
    let x = p1.x * ratio + p2.x * (1.0 - ratio);
    let v = (p1.v * p1.m + p2.v * p2.m) / m;
    MergeKinematics { m, radius, x, v }
}

/// A child body waiting to enter the body set
#[derive(Debug, Clone, PartialEq)]
pub struct MergedBody {
    pub body: Body,
    pub parents: (BodyId, BodyId),
    pub special: bool,
}

impl MergedBody {
    pub fn effect(&self) -> MergeEffect {
        if self.special {
            MergeEffect::ImpactFlash
        } else {
            MergeEffect::Explosion
        }
    }
}

pub struct MergeResolver {
    pub marker: String,
}

impl Default for MergeResolver {
    fn default() -> Self {
        Self {
            marker: IMPACTOR_MARKER.to_string(),
        }
    }
}

impl MergeResolver {
    /// Resolve the contact between `sys.bodies[c.a]` and `sys.bodies[c.b]`.
    ///
    /// Returns `None` without touching anything when either parent is
    /// already dead, or when the scenario is `giant_impact` and its impact
    /// latch has already fired. Every merge inside a giant-impact scenario
    /// closes the latch.
    pub fn resolve(
        &self,
        kind: ScenarioType,
        impact_latch: Option<&mut bool>,
        sys: &mut System,
        c: Contact,
        tick: u64,
    ) -> Option<MergedBody> {
        let (p1, p2) = (&sys.bodies[c.a], &sys.bodies[c.b]);
        if !p1.is_active() || !p2.is_active() {
            return None;
        }

        let special = kind == ScenarioType::GiantImpact
            && (p1.name_contains(&self.marker) || p2.name_contains(&self.marker));

        if kind == ScenarioType::GiantImpact {
            if let Some(latch) = impact_latch {
                if *latch {
                    return None;
                }
                *latch = true;
            }
        }

        let k = merge_kinematics(p1, p2);
        let (name, texture_key) = if special {
            (MOLTEN_NAME.to_string(), MOLTEN_TEXTURE.to_string())
        } else {
            let heavier = if p1.m > p2.m { p1 } else { p2 };
            (format!("Merged-{}", p1.name), heavier.texture_key.clone())
        };
        let parents = (p1.id, p2.id);

        let id = sys.next_id();
        let body = match Body::new(id, name, texture_key, k.m, k.radius) {
            Ok(b) => b.with_position(k.x).with_velocity(k.v),
            Err(e) => {
                warn!(error = %e, "merge produced an invalid body; skipping");
                return None;
            }
        };

        sys.bodies[c.a].kill(tick);
        sys.bodies[c.b].kill(tick);
        debug!(a = parents.0, b = parents.1, child = id, special, "bodies merged");

        Some(MergedBody {
            body,
            parents,
            special,
        })
    }
}

#[derive(Debug, Clone)]
struct PendingMerge {
    merged: MergedBody,
    remaining: f64,
    fresh: bool, // scheduled during the current tick; not counted down yet
}

/// Deferred merge completions, drained at a fixed point of the tick
#[derive(Debug, Clone, Default)]
pub struct MergeQueue {
    pending: Vec<PendingMerge>,
}

impl MergeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, merged: MergedBody, delay: f64) {
        self.pending.push(PendingMerge {
            merged,
            remaining: delay.max(0.0),
            fresh: true,
        });
    }

    /// Count down by `dt` and return the merges whose delay has run out,
    /// in scheduling order. Merges scheduled since the previous drain only
    /// start counting on the next one, so a child never shows up in the
    /// tick its parents died.
    pub fn drain_ready(&mut self, dt: f64) -> Vec<MergedBody> {
        let mut ready = Vec::new();
        let mut waiting = Vec::with_capacity(self.pending.len());
        for mut p in self.pending.drain(..) {
            if p.fresh {
                p.fresh = false;
                waiting.push(p);
                continue;
            }
            p.remaining -= dt;
            if p.remaining <= 0.0 {
                ready.push(p.merged);
            } else {
                waiting.push(p);
            }
        }
        self.pending = waiting;
        ready
    }

    /// Drop everything still waiting. Returns how many were cancelled.
    pub fn cancel_all(&mut self) -> usize {
        let n = self.pending.len();
        self.pending.clear();
        n
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
