use cosmosim::simulation::deformation::proximity_factor;
use cosmosim::simulation::merge::{MOLTEN_NAME, MOLTEN_TEXTURE};
use cosmosim::{apply_mutual_deformation, merge_kinematics, symplectic_euler_step};
use cosmosim::{Body, CollisionDetector, Contact, FixedStepper, ForceSet, NVec3, Parameters, StarGravity, System};
use cosmosim::{MergeEffect, MergeQueue, MergeResolver, ScenarioType};

use test_case::test_case;

/// Push a body and return its index
pub fn add_body(sys: &mut System, name: &str, m: f64, radius: f64, x: [f64; 3]) -> usize {
    let id = sys.next_id();
    let body = Body::new(id, name, "Earth", m, radius).expect("valid body").with_position(NVec3::from(x));
    sys.push(body);
    sys.bodies.len() - 1
}

/// Heavy star at the origin plus one light planet on +x
pub fn star_and_planet(dist: f64) -> System {
    let mut sys = System::new();
    add_body(&mut sys, "Sun", 100.0, 1.0, [0.0, 0.0, 0.0]);
    add_body(&mut sys, "Earth", 1.0, 1.0, [dist, 0.0, 0.0]);
    sys
}

pub fn gravity_set(p: &Parameters) -> ForceSet {
    ForceSet::new().with(StarGravity {
        G: p.G,
        min_r2: p.min_r2,
    })
}

fn forces_for(kind: ScenarioType, sys: &System) -> Vec<NVec3> {
    let forces = gravity_set(&Parameters::default());
    let mut out = vec![NVec3::zeros(); sys.bodies.len()];
    forces.accumulate_forces(kind, sys, &mut out);
    out
}

// ==================================================================================
// Body model tests
// ==================================================================================

#[test]
fn body_rejects_non_positive_or_non_finite_dimensions() {
    assert!(Body::new(1, "a", "Earth", 0.0, 1.0).is_err());
    assert!(Body::new(1, "a", "Earth", -3.0, 1.0).is_err());
    assert!(Body::new(1, "a", "Earth", 1.0, f64::NAN).is_err());
    assert!(Body::new(1, "a", "Earth", f64::INFINITY, 1.0).is_err());
    assert!(Body::new(1, "a", "Earth", 1.0, 1.0).is_ok());
}

#[test]
fn body_sanitizes_non_finite_vectors() {
    let b = Body::new(1, "a", "Earth", 1.0, 1.0)
        .unwrap()
        .with_position(NVec3::new(f64::NAN, 2.0, f64::INFINITY))
        .with_velocity(NVec3::new(1.0, f64::NEG_INFINITY, 3.0));
    assert_eq!(b.x, NVec3::new(0.0, 2.0, 0.0));
    assert_eq!(b.v, NVec3::new(1.0, 0.0, 3.0));
}

#[test]
fn dead_body_survives_exactly_one_more_tick() {
    let mut sys = star_and_planet(10.0);
    sys.bodies[1].kill(3);

    assert!(sys.remove_dead(3).is_empty(), "body removed in the tick it died");
    assert_eq!(sys.bodies.len(), 2);

    let gone = sys.remove_dead(4);
    assert_eq!(gone.len(), 1);
    assert_eq!(gone[0].name, "Earth");
    assert_eq!(sys.bodies.len(), 1);
}

#[test]
fn ids_are_not_reused_after_removal() {
    let mut sys = star_and_planet(10.0);
    let last = sys.bodies[1].id;
    sys.bodies[1].kill(1);
    sys.remove_dead(2);
    assert!(sys.next_id() > last);
}

// ==================================================================================
// Gravity tests
// ==================================================================================

#[test]
fn gravity_pulls_planet_toward_star() {
    let sys = star_and_planet(10.0);
    let out = forces_for(ScenarioType::Orbit, &sys);

    // G * M * m / r^2 = 10 * 100 * 1 / 100
    assert!((out[1] - NVec3::new(-10.0, 0.0, 0.0)).norm() < 1e-12, "got {:?}", out[1]);
    assert_eq!(out[0], NVec3::zeros(), "star must not be pulled");
}

#[test]
fn gravity_inverse_square_law() {
    let near = forces_for(ScenarioType::Orbit, &star_and_planet(5.0));
    let far = forces_for(ScenarioType::Orbit, &star_and_planet(10.0));

    let ratio = near[1].norm() / far[1].norm();
    assert!((ratio - 4.0).abs() < 1e-9, "Expected 4x, got {}", ratio);
}

#[test_case(ScenarioType::Collision ; "collision")]
#[test_case(ScenarioType::PlanetBirth ; "planet birth")]
fn gravity_disabled_for_impact_scenarios(kind: ScenarioType) {
    let out = forces_for(kind, &star_and_planet(10.0));
    assert!(out.iter().all(|f| *f == NVec3::zeros()));
}

#[test]
fn gravity_needs_two_live_bodies() {
    let mut sys = star_and_planet(10.0);
    sys.bodies[0].kill(1);
    let out = forces_for(ScenarioType::Orbit, &sys);
    assert!(out.iter().all(|f| *f == NVec3::zeros()));
}

#[test]
fn gravity_skips_pairs_inside_r2_floor() {
    let sys = star_and_planet(0.5);
    let out = forces_for(ScenarioType::Orbit, &sys);
    assert_eq!(out[1], NVec3::zeros());
}

#[test]
fn gravity_ignores_planet_planet_attraction() {
    let mut sys = star_and_planet(10.0);
    // heavy-ish neighbour right above the planet
    add_body(&mut sys, "Jupiter", 50.0, 1.0, [10.0, 2.0, 0.0]);
    let out = forces_for(ScenarioType::Orbit, &sys);

    assert_eq!(out[1].y, 0.0, "planet felt its neighbour");
    assert!(out[2].x < 0.0);
}

#[test]
fn dead_star_hands_over_to_next_heaviest() {
    let mut sys = star_and_planet(10.0);
    add_body(&mut sys, "Jupiter", 50.0, 1.0, [0.0, 10.0, 0.0]);
    sys.bodies[0].kill(1);

    let out = forces_for(ScenarioType::Orbit, &sys);
    assert_eq!(out[2], NVec3::zeros(), "new star must not be pulled");
    assert!(out[1].x < 0.0 && out[1].y > 0.0, "planet not pulled toward new star: {:?}", out[1]);
}

#[test]
fn ranked_is_stable_for_equal_masses() {
    let mut sys = System::new();
    add_body(&mut sys, "a", 5.0, 1.0, [0.0, 0.0, 0.0]);
    add_body(&mut sys, "b", 5.0, 1.0, [10.0, 0.0, 0.0]);
    add_body(&mut sys, "c", 9.0, 1.0, [20.0, 0.0, 0.0]);
    assert_eq!(StarGravity::ranked(&sys), vec![2, 0, 1]);
}

// ==================================================================================
// Integrator tests
// ==================================================================================

#[test]
fn euler_kicks_before_drifting() {
    let mut sys = System::new();
    add_body(&mut sys, "a", 1.0, 1.0, [0.0, 0.0, 0.0]);
    symplectic_euler_step(&mut sys, &[NVec3::new(1.0, 0.0, 0.0)], 1.0);

    assert_eq!(sys.bodies[0].v, NVec3::new(1.0, 0.0, 0.0));
    assert_eq!(sys.bodies[0].x, NVec3::new(1.0, 0.0, 0.0), "drift must use the updated velocity");
}

#[test]
fn euler_leaves_dead_bodies_alone() {
    let mut sys = star_and_planet(10.0);
    sys.bodies[1].v = NVec3::new(3.0, 0.0, 0.0);
    sys.bodies[1].kill(1);
    let before = sys.bodies[1].clone();

    symplectic_euler_step(&mut sys, &[NVec3::zeros(), NVec3::new(5.0, 0.0, 0.0)], 0.1);
    assert_eq!(sys.bodies[1], before);
}

#[test]
fn euler_holds_last_good_state_on_non_finite_force() {
    let mut sys = star_and_planet(10.0);
    let before = sys.bodies[1].clone();
    symplectic_euler_step(&mut sys, &[NVec3::zeros(), NVec3::new(f64::NAN, 0.0, 0.0)], 0.1);
    assert_eq!(sys.bodies[1].x, before.x);
    assert_eq!(sys.bodies[1].v, before.v);
}

#[test]
fn stepper_accumulates_partial_steps() {
    let p = Parameters::default();
    let mut sys = star_and_planet(10.0);
    let forces = vec![NVec3::zeros(); 2];
    let mut stepper = FixedStepper::new();

    assert_eq!(stepper.advance(&mut sys, &forces, p.h0 / 2.0, &p), 0);
    assert_eq!(stepper.advance(&mut sys, &forces, p.h0 / 2.0, &p), 1);
}

#[test]
fn stepper_caps_substeps() {
    let p = Parameters::default();
    let mut sys = star_and_planet(10.0);
    let forces = vec![NVec3::zeros(); 2];
    let mut stepper = FixedStepper::new();

    assert_eq!(stepper.advance(&mut sys, &forces, 1.0, &p), p.max_substeps);
    // backlog dropped, so a tiny follow-up step cannot run another 10
    assert!(stepper.advance(&mut sys, &forces, 1e-6, &p) <= 1);
}

#[test]
fn stepper_ignores_bad_deltas() {
    let p = Parameters::default();
    let mut sys = star_and_planet(10.0);
    let forces = vec![NVec3::zeros(); 2];
    let mut stepper = FixedStepper::new();

    assert_eq!(stepper.advance(&mut sys, &forces, f64::NAN, &p), 0);
    assert_eq!(stepper.advance(&mut sys, &forces, -1.0, &p), 0);
}

// ==================================================================================
// Collision tests
// ==================================================================================

#[test]
fn contact_uses_tolerance_of_summed_radii() {
    let detector = CollisionDetector::new(0.9);
    let mut sys = System::new();
    add_body(&mut sys, "a", 1.0, 1.0, [0.0, 0.0, 0.0]);
    add_body(&mut sys, "b", 1.0, 1.0, [1.7, 0.0, 0.0]);
    add_body(&mut sys, "c", 1.0, 1.0, [50.0, 0.0, 0.0]);

    assert_eq!(detector.find_contacts(ScenarioType::Collision, &sys), vec![Contact { a: 0, b: 1 }]);

    // just outside 0.9 * 2
    sys.bodies[1].x = NVec3::new(1.81, 0.0, 0.0);
    assert!(detector.find_contacts(ScenarioType::Collision, &sys).is_empty());
}

#[test_case(ScenarioType::SolarEclipse ; "solar eclipse")]
#[test_case(ScenarioType::LunarEclipse ; "lunar eclipse")]
fn eclipses_never_collide(kind: ScenarioType) {
    let detector = CollisionDetector::new(0.9);
    let mut sys = System::new();
    add_body(&mut sys, "a", 1.0, 2.0, [0.0, 0.0, 0.0]);
    add_body(&mut sys, "b", 1.0, 2.0, [0.5, 0.0, 0.0]);

    assert!(detector.find_contacts(kind, &sys).is_empty());
    assert_eq!(detector.resolve_contacts(kind, &mut sys, |_, _| panic!("contact reported")), 0);
}

#[test]
fn dead_bodies_are_not_matched_again_in_the_same_pass() {
    let detector = CollisionDetector::new(0.9);
    let resolver = MergeResolver::default();
    let mut sys = System::new();
    add_body(&mut sys, "a", 1.0, 2.0, [0.0, 0.0, 0.0]);
    add_body(&mut sys, "b", 1.0, 2.0, [1.0, 0.0, 0.0]);
    add_body(&mut sys, "c", 1.0, 2.0, [0.5, 1.0, 0.0]);

    let mut merged = Vec::new();
    let reported = detector.resolve_contacts(ScenarioType::Collision, &mut sys, |sys, c| {
        merged.extend(resolver.resolve(ScenarioType::Collision, None, sys, c, 1));
    });

    assert_eq!(reported, 1);
    assert_eq!(merged.len(), 1);
    assert!(sys.bodies[2].alive, "third body must wait for the next tick");
}

// ==================================================================================
// Merge tests
// ==================================================================================

fn merge_pair() -> System {
    let mut sys = System::new();
    let a = add_body(&mut sys, "Alpha", 3.0, 2.0, [0.0, 0.0, 0.0]);
    let b = add_body(&mut sys, "Beta", 1.0, 1.0, [4.0, 0.0, 0.0]);
    sys.bodies[a].v = NVec3::new(1.0, 0.0, 0.0);
    sys.bodies[b].v = NVec3::new(-1.0, 2.0, 0.0);
    sys.bodies[b].texture_key = "Mars".to_string();
    sys
}

#[test_case(3.0, [1.0, 0.0, 0.0], 1.0, [-1.0, 2.0, 0.0] ; "small pair")]
#[test_case(1.0, [5.0, -3.0, 2.0], 1.0, [-5.0, 3.0, -2.0] ; "equal and opposite")]
#[test_case(1.0e6, [0.0, 0.0, 0.0], 1.0, [400.0, 0.0, -250.0] ; "large mass ratio")]
#[test_case(0.25, [-12.0, 7.5, 0.1], 80.0, [0.3, -0.2, 9.0] ; "light fast into heavy slow")]
#[test_case(729.0, [0.0, 0.0, 0.0], 91.125, [-8.0, 0.0, 0.0] ; "giant impact sizes")]
fn merge_conserves_mass_momentum_and_volume(m1: f64, v1: [f64; 3], m2: f64, v2: [f64; 3]) {
    let mut sys = System::new();
    let a = add_body(&mut sys, "a", m1, m1.cbrt(), [0.0, 0.0, 0.0]);
    let b = add_body(&mut sys, "b", m2, m2.cbrt(), [3.0, -1.0, 2.0]);
    sys.bodies[a].v = NVec3::from(v1);
    sys.bodies[b].v = NVec3::from(v2);
    let (p1, p2) = (&sys.bodies[a], &sys.bodies[b]);

    let k = merge_kinematics(p1, p2);

    assert_eq!(k.m, m1 + m2);
    let volume = p1.radius.powi(3) + p2.radius.powi(3);
    assert!((k.radius.powi(3) - volume).abs() <= 1e-9 * volume, "volume not additive");
    let p_before = p1.momentum() + p2.momentum();
    let scale = p1.momentum().norm() + p2.momentum().norm() + 1.0;
    assert!((k.v * k.m - p_before).norm() <= 1e-12 * scale, "momentum not conserved: {:?} vs {:?}", k.v * k.m, p_before);
}

#[test]
fn merge_position_blend_is_pinned() {
    let sys = merge_pair();
    let (p1, p2) = (&sys.bodies[0], &sys.bodies[1]);
    let k = merge_kinematics(p1, p2);

    // p1 * (m1 / M) + p2 * (1 - m1 / M) = 0 * 0.75 + 4 * 0.25
    assert!((k.x - NVec3::new(1.0, 0.0, 0.0)).norm() < 1e-12, "got {:?}", k.x);

    let swapped = merge_kinematics(p2, p1);
    assert!((swapped.x - k.x).norm() < 1e-12);
}

#[test]
fn resolver_kills_parents_and_names_child() {
    let mut sys = merge_pair();
    let resolver = MergeResolver::default();
    let merged = resolver
        .resolve(ScenarioType::Collision, None, &mut sys, Contact { a: 0, b: 1 }, 7)
        .expect("merge");

    assert!(!sys.bodies[0].alive && !sys.bodies[1].alive);
    assert_eq!(sys.bodies[0].died_at, Some(7));
    assert_eq!(merged.body.name, "Merged-Alpha");
    assert_eq!(merged.body.texture_key, "Earth", "heavier parent's texture");
    assert_eq!(merged.parents, (sys.bodies[0].id, sys.bodies[1].id));
    assert!(!merged.special);
    assert_eq!(merged.effect(), MergeEffect::Explosion);
    assert_eq!(sys.bodies.len(), 2, "child must not enter the set yet");
}

#[test]
fn resolver_tie_takes_second_texture() {
    let mut sys = merge_pair();
    sys.bodies[0].m = 1.0;
    let merged = MergeResolver::default()
        .resolve(ScenarioType::Collision, None, &mut sys, Contact { a: 0, b: 1 }, 1)
        .expect("merge");
    assert_eq!(merged.body.texture_key, "Mars");
}

#[test]
fn resolver_is_a_no_op_on_dead_parents() {
    let mut sys = merge_pair();
    sys.bodies[1].kill(1);
    let before = sys.bodies.clone();

    let out = MergeResolver::default().resolve(ScenarioType::Collision, None, &mut sys, Contact { a: 0, b: 1 }, 2);
    assert!(out.is_none());
    assert_eq!(sys.bodies, before);
}

#[test]
fn impactor_merge_is_special_and_closes_latch() {
    let mut sys = merge_pair();
    sys.bodies[1].name = "THEIA".to_string();
    let mut latch = false;

    let merged = MergeResolver::default()
        .resolve(ScenarioType::GiantImpact, Some(&mut latch), &mut sys, Contact { a: 0, b: 1 }, 1)
        .expect("merge");

    assert!(latch);
    assert!(merged.special);
    assert_eq!(merged.body.name, MOLTEN_NAME);
    assert_eq!(merged.body.texture_key, MOLTEN_TEXTURE);
    assert_eq!(merged.effect(), MergeEffect::ImpactFlash);
}

#[test]
fn impactor_name_outside_giant_impact_is_ordinary() {
    let mut sys = merge_pair();
    sys.bodies[1].name = "Theia".to_string();
    let merged = MergeResolver::default()
        .resolve(ScenarioType::Collision, None, &mut sys, Contact { a: 0, b: 1 }, 1)
        .expect("merge");
    assert!(!merged.special);
    assert_eq!(merged.body.name, "Merged-Alpha");
}

#[test]
fn closed_latch_blocks_every_giant_impact_merge() {
    let mut sys = merge_pair();
    let mut latch = true;
    let before = sys.bodies.clone();

    let out = MergeResolver::default().resolve(
        ScenarioType::GiantImpact,
        Some(&mut latch),
        &mut sys,
        Contact { a: 0, b: 1 },
        1,
    );
    assert!(out.is_none());
    assert_eq!(sys.bodies, before);
}

#[test]
fn merge_queue_waits_one_drain_before_counting() {
    let mut sys = merge_pair();
    let merged = MergeResolver::default()
        .resolve(ScenarioType::Collision, None, &mut sys, Contact { a: 0, b: 1 }, 1)
        .expect("merge");

    let mut queue = MergeQueue::new();
    queue.schedule(merged, 0.05);

    assert!(queue.drain_ready(1.0).is_empty(), "materialized in the tick it was scheduled");
    assert!(queue.drain_ready(0.02).is_empty());
    let ready = queue.drain_ready(0.04);
    assert_eq!(ready.len(), 1);
    assert!(queue.is_empty());
}

#[test]
fn merge_queue_cancel_drops_pending() {
    let mut sys = merge_pair();
    let merged = MergeResolver::default()
        .resolve(ScenarioType::Collision, None, &mut sys, Contact { a: 0, b: 1 }, 1)
        .expect("merge");

    let mut queue = MergeQueue::new();
    queue.schedule(merged, 0.0);
    assert_eq!(queue.cancel_all(), 1);
    queue.drain_ready(1.0);
    assert!(queue.drain_ready(1.0).is_empty());
}

// ==================================================================================
// Deformation tests
// ==================================================================================

#[test_case(7.0, 1.0 ; "at core distance")]
#[test_case(10.5, 0.5 ; "halfway out")]
#[test_case(14.0, 0.0 ; "at reach")]
#[test_case(20.0, 0.0 ; "beyond reach")]
#[test_case(1.0, 1.0 ; "deep overlap clamps")]
fn proximity_factor_profile(dist: f64, expected: f64) {
    let t = proximity_factor(dist, 10.0, 1.4, 0.7);
    assert!((t - expected).abs() < 1e-12, "dist {dist}: got {t}");
}

#[test]
fn deformation_pushes_pair_in_opposite_directions() {
    let mut p = Parameters::default();
    p.deform_ease = 1.0;
    let mut sys = System::new();
    add_body(&mut sys, "a", 1.0, 5.0, [0.0, 0.0, 0.0]);
    add_body(&mut sys, "b", 1.0, 5.0, [10.5, 0.0, 0.0]);

    let pairs = apply_mutual_deformation(ScenarioType::GiantImpact, &mut sys, &p, 1.0);

    assert_eq!(pairs, 1);
    assert!((sys.bodies[0].deform_target - NVec3::new(0.5, 0.0, 0.0)).norm() < 1e-12);
    assert!((sys.bodies[1].deform_target + NVec3::new(0.5, 0.0, 0.0)).norm() < 1e-12);
    assert!((sys.bodies[0].deform_amount - 0.5).abs() < 1e-12);
}

#[test]
fn deformation_ignores_dead_bodies() {
    let p = Parameters::default();
    let mut sys = System::new();
    add_body(&mut sys, "a", 1.0, 5.0, [0.0, 0.0, 0.0]);
    add_body(&mut sys, "b", 1.0, 5.0, [7.0, 0.0, 0.0]);
    add_body(&mut sys, "c", 1.0, 5.0, [3.5, 1.0, 0.0]);
    sys.bodies[2].kill(1);

    let pairs = apply_mutual_deformation(ScenarioType::GiantImpact, &mut sys, &p, 1.0);

    assert_eq!(pairs, 1);
    assert_eq!(sys.bodies[2].deform_target, NVec3::zeros());
    assert_eq!(sys.bodies[2].deform_amount, 0.0);
    // a and b only see each other, so the push stays on the x axis
    assert!((sys.bodies[0].deform_target - NVec3::new(1.0, 0.0, 0.0)).norm() < 1e-12);
}

#[test]
fn deformation_only_runs_for_giant_impact() {
    let p = Parameters::default();
    let mut sys = System::new();
    add_body(&mut sys, "a", 1.0, 5.0, [0.0, 0.0, 0.0]);
    add_body(&mut sys, "b", 1.0, 5.0, [8.0, 0.0, 0.0]);

    for kind in ScenarioType::ALL.into_iter().filter(|k| *k != ScenarioType::GiantImpact) {
        assert_eq!(apply_mutual_deformation(kind, &mut sys, &p, 1.0), 0, "{kind}");
    }
    assert_eq!(sys.bodies[0].deform_amount, 0.0);
}

#[test]
fn deformation_eases_back_when_bodies_separate() {
    let p = Parameters::default();
    let mut sys = System::new();
    add_body(&mut sys, "a", 1.0, 5.0, [0.0, 0.0, 0.0]);
    add_body(&mut sys, "b", 1.0, 5.0, [7.0, 0.0, 0.0]);

    apply_mutual_deformation(ScenarioType::GiantImpact, &mut sys, &p, 1.0);
    assert_eq!(sys.bodies[0].deform_amount, 1.0);

    sys.bodies[1].x = NVec3::new(100.0, 0.0, 0.0);
    apply_mutual_deformation(ScenarioType::GiantImpact, &mut sys, &p, 0.1);
    let amount = sys.bodies[0].deform_amount;
    assert!(amount < 1.0 && amount > 0.0, "got {amount}");
    assert_eq!(sys.bodies[0].deform_target, NVec3::zeros());
}
