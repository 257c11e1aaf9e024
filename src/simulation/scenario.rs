//! Scenario types and the builders that turn a validated scene into bodies
//!
//! `ScenarioType` is a closed set. Every per-phase rule (gravity, contact
//! detection, deformation) is an exhaustive match on it, so a new type has
//! to decide its physics explicitly.
//!
//! Builders push bodies straight into the world's `System` (already
//! cleared by the reset that precedes every build) and return a
//! [`ScenarioSetup`] with the camera hints, the optional control handle and,
//! for the giant impact, the impactor id.

use std::fmt;

use tracing::warn;

use crate::configuration::validation::{BodySpec, SceneDef};
use crate::error::SimResult;
use crate::simulation::forces::StarGravity;
use crate::simulation::controls::{EclipseControl, EclipseKind, ScenarioControl};
use crate::simulation::merge::IMPACTOR_MARKER;
use crate::simulation::params::Parameters;
use crate::simulation::states::{is_finite_vec, Body, BodyId, NVec3, System};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioType {
    Collision,
    Orbit,
    SolarEclipse,
    LunarEclipse,
    PlanetBirth,
    GiantImpact,
    Sequence,
    Unknown,
}

impl ScenarioType {
    pub const ALL: [ScenarioType; 8] = [
        Self::Collision,
        Self::Orbit,
        Self::SolarEclipse,
        Self::LunarEclipse,
        Self::PlanetBirth,
        Self::GiantImpact,
        Self::Sequence,
        Self::Unknown,
    ];

    /// Case- and whitespace-insensitive parse. `solar_system` is an alias
    /// for `orbit`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "collision" => Some(Self::Collision),
            "orbit" | "solar_system" => Some(Self::Orbit),
            "solar_eclipse" => Some(Self::SolarEclipse),
            "lunar_eclipse" => Some(Self::LunarEclipse),
            "planet_birth" => Some(Self::PlanetBirth),
            "giant_impact" => Some(Self::GiantImpact),
            "sequence" => Some(Self::Sequence),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Collision => "collision",
            Self::Orbit => "orbit",
            Self::SolarEclipse => "solar_eclipse",
            Self::LunarEclipse => "lunar_eclipse",
            Self::PlanetBirth => "planet_birth",
            Self::GiantImpact => "giant_impact",
            Self::Sequence => "sequence",
            Self::Unknown => "unknown",
        }
    }

    pub fn gravity_enabled(self) -> bool {
        match self {
            Self::Collision | Self::PlanetBirth | Self::Sequence => false,
            Self::Orbit | Self::SolarEclipse | Self::LunarEclipse | Self::GiantImpact | Self::Unknown => true,
        }
    }

    /// Eclipses model deliberate close alignment, not impacts
    pub fn collisions_enabled(self) -> bool {
        match self {
            Self::SolarEclipse | Self::LunarEclipse | Self::Sequence => false,
            Self::Collision | Self::Orbit | Self::PlanetBirth | Self::GiantImpact | Self::Unknown => true,
        }
    }

    pub fn deformation_enabled(self) -> bool {
        match self {
            Self::GiantImpact => true,
            Self::Collision
            | Self::Orbit
            | Self::SolarEclipse
            | Self::LunarEclipse
            | Self::PlanetBirth
            | Self::Sequence
            | Self::Unknown => false,
        }
    }
}

impl fmt::Display for ScenarioType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visual size to physical radius
pub const SIZE_TO_RADIUS: f64 = 3.0;
/// Spacing between bodies placed by the default layout
pub const LAYOUT_GAP: f64 = 10.0;
/// Default impactor start when the scene gives no position
pub const IMPACTOR_START: [f64; 3] = [80.0, 0.0, 0.0];

const ECLIPSE_SUN_DISTANCE: f64 = 300.0;
const ECLIPSE_MOON_OFFSET: f64 = 5.0;
const ECLIPSE_CAMERA: [f64; 3] = [0.0, 10.0, 90.0];

/// What a builder hands back besides the bodies it pushed
pub struct ScenarioSetup {
    pub kind: ScenarioType,
    pub camera_position: Option<NVec3>,
    pub camera_look_at: Option<NVec3>,
    pub control: Option<Box<dyn ScenarioControl>>,
    pub impactor: Option<BodyId>,
}

impl ScenarioSetup {
    fn plain(kind: ScenarioType, scene: &SceneDef) -> Self {
        Self {
            kind,
            camera_position: scene.camera_position,
            camera_look_at: scene.camera_look_at,
            control: None,
            impactor: None,
        }
    }
}

/// Build `scene` as a `kind` scenario into `sys`.
///
/// `kind` is the resolved type (see [`SceneDef::resolved_kind`]).
pub fn build_scenario(scene: &SceneDef, kind: ScenarioType, params: &Parameters, sys: &mut System) -> SimResult<ScenarioSetup> {
    debug_assert!(sys.bodies.is_empty(), "builders expect a cleared system");
    match kind {
        ScenarioType::SolarEclipse => build_eclipse(EclipseKind::Solar, sys),
        ScenarioType::LunarEclipse => build_eclipse(EclipseKind::Lunar, sys),
        ScenarioType::GiantImpact => build_giant_impact(scene, sys),
        ScenarioType::Orbit => {
            let explicit = build_bodies(&scene.bodies, sys)?;
            assign_circular_velocities(sys, &explicit, params);
            Ok(ScenarioSetup::plain(kind, scene))
        }
        ScenarioType::Collision | ScenarioType::PlanetBirth | ScenarioType::Unknown => {
            build_bodies(&scene.bodies, sys)?;
            Ok(ScenarioSetup::plain(kind, scene))
        }
        // sequences are unpacked by the orchestrator and never built directly
        ScenarioType::Sequence => Ok(ScenarioSetup::plain(ScenarioType::Unknown, scene)),
    }
}

/// Radius and mass for a spec: `radius = size * 3`, mass defaults to
/// `radius^3` (uniform density).
pub fn body_dimensions(spec: &BodySpec) -> (f64, f64) {
    let radius = spec.size.unwrap_or(1.0) * SIZE_TO_RADIUS;
    let mass = spec.mass.unwrap_or_else(|| radius.powi(3));
    (radius, mass)
}

/// Push one body per `BodySpec`. Bodies without a position are laid out along +x.
/// Returns, per pushed body, whether it came with an explicit velocity.
fn build_bodies(specs: &[BodySpec], sys: &mut System) -> SimResult<Vec<bool>> {
    let mut cursor = 0.0;
    let mut explicit_velocity = Vec::with_capacity(specs.len());
    for spec in specs {
        let (radius, mass) = body_dimensions(spec);
        let x = spec.position.unwrap_or_else(|| {
            let centre = cursor + radius;
            cursor = centre + radius + LAYOUT_GAP;
            NVec3::new(centre, 0.0, 0.0)
        });

        let velocity = spec.velocity.unwrap_or_else(NVec3::zeros);
        if !is_finite_vec(&x) || !is_finite_vec(&velocity) {
            warn!(body = %spec.name, "non-finite position or velocity; components replaced with 0");
        }

        let id = sys.next_id();
        let body = Body::new(id, spec.name.clone(), spec.texture_key.clone(), mass, radius)?
            .with_position(x)
            .with_velocity(velocity);
        sys.push(body);
        explicit_velocity.push(spec.velocity.is_some());
    }
    Ok(explicit_velocity)
}

/// Give every non-star body without an explicit velocity the circular
/// speed `sqrt(G * M / r)` about the heaviest body, tangent in the xz plane.
fn assign_circular_velocities(sys: &mut System, explicit: &[bool], params: &Parameters) {
    let Some(&star_idx) = StarGravity::ranked(sys).first() else {
        return;
    };
    let (star_x, star_v, star_m) = {
        let s = &sys.bodies[star_idx];
        (s.x, s.v, s.m)
    };

    for (i, body) in sys.bodies.iter_mut().enumerate() {
        if i == star_idx || explicit.get(i).copied().unwrap_or(true) {
            continue;
        }
        let r = body.x - star_x;
        let r2 = r.norm_squared();
        if r2 < params.min_r2 {
            continue;
        }
        let tangent = NVec3::y().cross(&r);
        if tangent.norm_squared() == 0.0 {
            continue;
        }
        let speed = (params.G * star_m / r2.sqrt()).sqrt();
        body.v = star_v + tangent.normalize() * speed;
    }
}

fn build_giant_impact(scene: &SceneDef, sys: &mut System) -> SimResult<ScenarioSetup> {
    build_bodies(&scene.bodies, sys)?;

    let impactor_idx = scene
        .bodies
        .iter()
        .position(|b| b.name.to_lowercase().contains(IMPACTOR_MARKER));
    let target_idx = (0..sys.bodies.len())
        .filter(|&i| Some(i) != impactor_idx)
        .max_by(|&a, &b| sys.bodies[a].m.total_cmp(&sys.bodies[b].m));

    if let Some(i) = impactor_idx {
        if scene.bodies[i].position.is_none() {
            sys.bodies[i].x = NVec3::from(IMPACTOR_START);
        }
    }
    if let Some(i) = target_idx {
        if scene.bodies[i].position.is_none() {
            sys.bodies[i].x = NVec3::zeros();
        }
    }

    let mut setup = ScenarioSetup::plain(ScenarioType::GiantImpact, scene);
    setup.impactor = impactor_idx.map(|i| sys.bodies[i].id);
    Ok(setup)
}

/// Fixed Sun / Earth / Moon alignment. The scene's own objects are not
/// used. Masses are token values so gravity cannot pull the line apart
/// during playback.
fn build_eclipse(kind: EclipseKind, sys: &mut System) -> SimResult<ScenarioSetup> {
    let moon_z = match kind {
        EclipseKind::Solar => -ECLIPSE_MOON_OFFSET,
        EclipseKind::Lunar => ECLIPSE_MOON_OFFSET,
    };

    let sun_id = sys.next_id();
    let sun = Body::new(sun_id, "Sun", "Sun", 1.0, 20.0 * SIZE_TO_RADIUS)?
        .with_position(NVec3::new(0.0, 0.0, -ECLIPSE_SUN_DISTANCE));
    sys.push(sun);

    let earth_id = sys.next_id();
    sys.push(Body::new(earth_id, "Earth", "Earth", 0.5, 1.5 * SIZE_TO_RADIUS)?);

    let moon_id = sys.next_id();
    let moon = Body::new(moon_id, "Moon", "Moon", 0.1, 0.5 * SIZE_TO_RADIUS)?.with_position(NVec3::new(0.0, 0.0, moon_z));
    sys.push(moon);

    let scenario_kind = match kind {
        EclipseKind::Solar => ScenarioType::SolarEclipse,
        EclipseKind::Lunar => ScenarioType::LunarEclipse,
    };
    Ok(ScenarioSetup {
        kind: scenario_kind,
        camera_position: Some(NVec3::from(ECLIPSE_CAMERA)),
        camera_look_at: None,
        control: Some(Box::new(EclipseControl::new(kind, sun_id, earth_id, moon_id))),
        impactor: None,
    })
}
