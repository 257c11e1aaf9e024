//! Pairwise contact detection
//!
//! Two live bodies touch when their centres are closer than
//! `tolerance * (r_a + r_b)`. Eclipse scenarios never report contacts.

use crate::simulation::scenario::ScenarioType;
use crate::simulation::states::{Body, System};

/// An overlapping pair, indices into `System::bodies` with `a < b`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub a: usize,
    pub b: usize,
}

pub struct CollisionDetector {
    pub tolerance: f64,
}

impl CollisionDetector {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    pub fn overlaps(&self, a: &Body, b: &Body) -> bool {
        let dist = (a.x - b.x).norm();
        dist < self.tolerance * (a.radius + b.radius)
    }

    /// Snapshot of every overlapping pair, without resolving anything
    pub fn find_contacts(&self, kind: ScenarioType, sys: &System) -> Vec<Contact> {
        let mut contacts = Vec::new();
        if !kind.collisions_enabled() {
            return contacts;
        }

        let n = sys.bodies.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = (&sys.bodies[i], &sys.bodies[j]);
                if a.is_active() && b.is_active() && self.overlaps(a, b) {
                    contacts.push(Contact { a: i, b: j });
                }
            }
        }
        contacts
    }

    /// Walk pairs in order and hand each overlap to `on_contact`.
    ///
    /// Liveness is rechecked before every pair, so a body killed by an
    /// earlier contact in the same pass is never matched again. Returns the
    /// number of contacts reported.
    pub fn resolve_contacts<F>(&self, kind: ScenarioType, sys: &mut System, mut on_contact: F) -> usize
    where
        F: FnMut(&mut System, Contact),
    {
        if !kind.collisions_enabled() {
            return 0;
        }

        let n = sys.bodies.len();
        let mut reported = 0;
        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = (&sys.bodies[i], &sys.bodies[j]);
                if !a.is_active() || !b.is_active() {
                    continue;
                }
                if self.overlaps(a, b) {
                    on_contact(sys, Contact { a: i, b: j });
                    reported += 1;
                }
            }
        }
        reported
    }
}
