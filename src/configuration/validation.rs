//! Scenario validation: raw [`ScenarioConfig`] into trusted definitions.
//!
//! Rules:
//! - `scenarioType` must be present and one of the known types
//! - `sequence` needs a non-empty `steps`, every step valid on its own;
//!   nested sequences are flattened into the parent's step list
//! - other types need `objects`; entries whose `textureKey` is not in
//!   [`TEXTURE_WHITELIST`] are dropped, and an empty result is an error
//!   unless the type is `unknown`
//! - non-finite body coordinates become 0, bad sizes/masses fall back to
//!   defaults

use tracing::warn;

use crate::configuration::config::{ObjectConfig, ScenarioConfig};
use crate::error::{SimError, SimResult};
use crate::simulation::scenario::{body_dimensions, ScenarioType};
use crate::simulation::states::{is_finite_vec, sanitize_vec, NVec3};

pub const TEXTURE_WHITELIST: [&str; 10] = [
    "Sun", "Mercury", "Venus", "Earth", "Moon", "Mars", "Jupiter", "Saturn", "Uranus", "Neptune",
];

pub fn is_known_texture(key: &str) -> bool {
    TEXTURE_WHITELIST.contains(&key)
}

/// Validated description of one body
#[derive(Debug, Clone, PartialEq)]
pub struct BodySpec {
    pub name: String,
    pub texture_key: String,
    pub position: Option<NVec3>,
    pub velocity: Option<NVec3>,
    pub size: Option<f64>,
    pub mass: Option<f64>,
}

impl BodySpec {
    pub fn new(name: impl Into<String>, texture_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            texture_key: texture_key.into(),
            position: None,
            velocity: None,
            size: None,
            mass: None,
        }
    }

    pub fn at(mut self, position: NVec3) -> Self {
        self.position = Some(position);
        self
    }

    pub fn moving(mut self, velocity: NVec3) -> Self {
        self.velocity = Some(velocity);
        self
    }

    pub fn sized(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn weighing(mut self, mass: f64) -> Self {
        self.mass = Some(mass);
        self
    }
}

/// A single, non-sequence scene
#[derive(Debug, Clone, PartialEq)]
pub struct SceneDef {
    pub kind: ScenarioType,
    pub bodies: Vec<BodySpec>,
    pub camera_position: Option<NVec3>,
    pub camera_look_at: Option<NVec3>,
    pub duration: Option<f64>,
}

impl SceneDef {
    pub fn new(kind: ScenarioType, bodies: Vec<BodySpec>) -> Self {
        Self {
            kind,
            bodies,
            camera_position: None,
            camera_look_at: None,
            duration: None,
        }
    }

    /// Invariants every scene handed to the world must satisfy
    pub fn check(&self) -> SimResult<()> {
        if self.kind == ScenarioType::Sequence {
            return Err(SimError::malformed("a scene cannot be of type sequence"));
        }
        if self.bodies.is_empty() && self.kind != ScenarioType::Unknown {
            return Err(SimError::malformed(format!("{} scene has no bodies", self.kind)));
        }
        for spec in &self.bodies {
            let (radius, mass) = body_dimensions(spec);
            if !(radius.is_finite() && radius > 0.0 && mass.is_finite() && mass > 0.0) {
                return Err(SimError::invalid_body(
                    spec.name.clone(),
                    format!("unusable dimensions: radius {radius}, mass {mass}"),
                ));
            }
        }
        Ok(())
    }

    /// Declared type, unless a body carries `marker` in its name, in which
    /// case the scene is always a giant impact.
    pub fn resolved_kind(&self, marker: &str) -> ScenarioType {
        let marker = marker.to_lowercase();
        if self.bodies.iter().any(|b| b.name.to_lowercase().contains(&marker)) {
            ScenarioType::GiantImpact
        } else {
            self.kind
        }
    }
}

/// Trusted scenario: either one scene or an ordered playlist of scenes
#[derive(Debug, Clone, PartialEq)]
pub enum ScenarioDef {
    Scene(SceneDef),
    Sequence(Vec<SceneDef>),
}

impl ScenarioDef {
    pub fn kind(&self) -> ScenarioType {
        match self {
            Self::Scene(scene) => scene.kind,
            Self::Sequence(_) => ScenarioType::Sequence,
        }
    }

    pub fn check(&self) -> SimResult<()> {
        match self {
            Self::Scene(scene) => scene.check(),
            Self::Sequence(steps) if steps.is_empty() => Err(SimError::malformed("sequence has no steps")),
            Self::Sequence(steps) => steps.iter().try_for_each(SceneDef::check),
        }
    }
}

/// Validate a raw scenario
pub fn validate_scenario(cfg: &ScenarioConfig) -> SimResult<ScenarioDef> {
    let kind = parse_kind(cfg)?;
    if kind == ScenarioType::Sequence {
        let steps = validate_steps(cfg, "steps")?;
        return Ok(ScenarioDef::Sequence(steps));
    }
    Ok(ScenarioDef::Scene(validate_scene(cfg, kind)?))
}

fn parse_kind(cfg: &ScenarioConfig) -> SimResult<ScenarioType> {
    let raw = cfg
        .scenario_type
        .as_deref()
        .ok_or_else(|| SimError::malformed("scenarioType is missing"))?;
    ScenarioType::parse(raw).ok_or_else(|| SimError::malformed(format!("unknown scenarioType: {raw}")))
}

fn validate_steps(cfg: &ScenarioConfig, path: &str) -> SimResult<Vec<SceneDef>> {
    let steps = match cfg.steps.as_deref() {
        Some(steps) if !steps.is_empty() => steps,
        _ => return Err(SimError::malformed(format!("{path}: sequence needs a non-empty steps array"))),
    };

    let mut out = Vec::with_capacity(steps.len());
    for (i, step) in steps.iter().enumerate() {
        let step_path = format!("{path}[{i}]");
        let kind = parse_kind(step).map_err(|e| SimError::malformed(format!("{step_path}: {e}")))?;
        if kind == ScenarioType::Sequence {
            out.extend(validate_steps(step, &format!("{step_path}.steps"))?);
        } else {
            let scene = validate_scene(step, kind).map_err(|e| SimError::malformed(format!("{step_path}: {e}")))?;
            out.push(scene);
        }
    }
    Ok(out)
}

fn validate_scene(cfg: &ScenarioConfig, kind: ScenarioType) -> SimResult<SceneDef> {
    let objects = cfg
        .objects
        .as_deref()
        .ok_or_else(|| SimError::malformed("objects array is missing"))?;

    let bodies: Vec<BodySpec> = objects.iter().filter_map(validate_object).collect();
    if bodies.is_empty() && kind != ScenarioType::Unknown {
        return Err(SimError::malformed("no object has a valid textureKey"));
    }

    Ok(SceneDef {
        kind,
        bodies,
        camera_position: cfg.camera_position.map(|c| c.to_nvec()),
        camera_look_at: cfg.camera_look_at.map(|c| c.to_nvec()),
        duration: cfg.duration.filter(|d| d.is_finite() && *d >= 0.0),
    })
}

fn validate_object(obj: &ObjectConfig) -> Option<BodySpec> {
    let texture_key = match obj.texture_key.as_deref() {
        Some(key) if is_known_texture(key) => key.to_string(),
        other => {
            warn!(texture = ?other, name = ?obj.name, "dropping object with unknown textureKey");
            return None;
        }
    };
    let name = obj
        .name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| texture_key.clone());

    Some(BodySpec {
        position: obj.position.map(|p| finite_or_zero(p.to_nvec(), &name, "position")),
        velocity: obj.velocity.map(|v| finite_or_zero(v.to_nvec(), &name, "velocity")),
        size: positive_or_none(obj.size, &name, "size"),
        mass: positive_or_none(obj.mass, &name, "mass"),
        name,
        texture_key,
    })
}

fn finite_or_zero(v: NVec3, name: &str, field: &str) -> NVec3 {
    if !is_finite_vec(&v) {
        warn!(body = name, field, "non-finite components replaced with 0");
    }
    sanitize_vec(v)
}

fn positive_or_none(value: Option<f64>, name: &str, field: &str) -> Option<f64> {
    match value {
        Some(x) if x.is_finite() && x > 0.0 => Some(x),
        Some(x) => {
            warn!(body = name, field, value = x, "ignoring non-positive value; default used");
            None
        }
        None => None,
    }
}
