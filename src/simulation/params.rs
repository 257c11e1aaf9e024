//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - gravitational constant and the r^2 floor that skips near-singular pairs,
//! - collision tolerance and deformation reach,
//! - fixed integration step and substep cap,
//! - merge materialization delay and camera follow distance

#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub G: f64, // gravitational constant
    pub min_r2: f64, // star-body pairs closer than this (squared) are skipped
    pub collision_tolerance: f64, // fraction of summed radii that counts as contact
    pub deform_reach: f64, // pairs beyond reach * sumR are not deformed
    pub deform_core: f64, // t reaches 1 at core * sumR
    pub deform_ease: f64, // per-second easing rate of deform_amount
    pub merge_delay: f64, // seconds before a merged body appears
    pub h0: f64, // fixed internal step
    pub max_substeps: u32, // substep cap per tick
    pub follow_distance: f64, // camera follow standoff
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            G: 10.0,
            min_r2: 1.0,
            collision_tolerance: 0.9,
            deform_reach: 1.4,
            deform_core: 0.7,
            deform_ease: 6.0,
            merge_delay: 0.05,
            h0: 1.0 / 60.0,
            max_substeps: 10,
            follow_distance: 40.0,
        }
    }
}
