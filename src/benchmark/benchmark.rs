use std::time::Instant;

use crate::configuration::validation::{BodySpec, SceneDef, ScenarioDef};
use crate::simulation::forces::{ForceTerm, StarGravity};
use crate::simulation::params::Parameters;
use crate::simulation::scenario::ScenarioType;
use crate::simulation::states::{Body, NVec3, System};
use crate::simulation::world::SimulationWorld;

/// Deterministic scatter, no rand needed
fn scatter(i: usize) -> NVec3 {
    let i_f = i as f64;
    NVec3::new(
        (i_f * 0.37).sin() * 500.0,
        (i_f * 0.13).cos() * 500.0,
        (i_f * 0.07).sin() * 500.0,
    )
}

/// Helper to build a manual System of size `n`
fn make_system(n: usize) -> System {
    let mut sys = System::new();
    for i in 0..n {
        let id = sys.next_id();
        // mass grows with index so the star is well defined
        if let Ok(b) = Body::new(id, format!("body-{i}"), "Moon", 1.0 + i as f64, 0.03) {
            sys.push(b.with_position(scatter(i)));
        }
    }
    sys
}

fn make_scene(n: usize, kind: ScenarioType) -> ScenarioDef {
    let bodies = (0..n)
        .map(|i| BodySpec::new(format!("body-{i}"), "Moon").at(scatter(i)).sized(0.01).weighing(1.0 + i as f64))
        .collect();
    ScenarioDef::Scene(SceneDef::new(kind, bodies))
}

/// Time one star-gravity evaluation for a range of n
pub fn bench_gravity() {
    let ns = [200, 400, 800, 1600, 3200, 6400, 12800];
    let params = Parameters::default();

    for n in ns {
        let sys = make_system(n);
        let mut out = vec![NVec3::zeros(); n];

        let gravity = StarGravity {
            G: params.G,
            min_r2: params.min_r2,
        };

        // Warm up
        gravity.force(ScenarioType::Orbit, &sys, &mut out);

        let t0 = Instant::now();
        gravity.force(ScenarioType::Orbit, &sys, &mut out);
        let dt = t0.elapsed().as_secs_f64();

        println!("N = {n:5}, star gravity = {:8.6} s", dt);
    }
}

/// Full world tick (gravity, O(n^2) contacts, integration, cleanup) for a
/// range of n. Prints CSV so it can be graphed directly.
pub fn bench_world_tick() {
    println!("N,orbit_ms,collision_ms");

    for n in (100..=1600).step_by(100) {
        let steps = if n <= 400 { 5 } else { 1 };
        let mut timings = [0.0; 2];

        for (slot, kind) in [ScenarioType::Orbit, ScenarioType::Collision].into_iter().enumerate() {
            let mut world = SimulationWorld::new(Parameters::default());
            if world.request_scenario(make_scene(n, kind)).is_err() {
                continue;
            }

            // Warm-up one tick
            world.step(1.0 / 60.0);

            let t0 = Instant::now();
            for _ in 0..steps {
                world.step(1.0 / 60.0);
            }
            timings[slot] = t0.elapsed().as_secs_f64() * 1000.0 / steps as f64;
        }

        println!("{},{:.6},{:.6}", n, timings[0], timings[1]);
    }
}
