//! Configuration types for loading scenarios and engine settings.
//!
//! Two inputs are read through `serde`:
//!
//! - [`ScenarioConfig`] – the scenario JSON produced by the AI-ingestion
//!   collaborator (camelCase keys, recursive `steps` for sequences)
//! - [`EngineConfig`]   – optional YAML tuning of the physics constants,
//!   checked for finite values when turned into [`Parameters`]
//!
//! # Scenario JSON
//!
//! ```json
//! {
//!   "scenarioType": "orbit",
//!   "objects": [
//!     { "name": "Sun",   "textureKey": "Sun",   "size": 5.0, "mass": 1000.0 },
//!     { "name": "Earth", "textureKey": "Earth", "position": { "x": 60, "y": 0, "z": 0 } }
//!   ],
//!   "cameraPosition": { "x": 0, "y": 80, "z": 200 }
//! }
//! ```
//!
//! # Engine YAML
//!
//! ```yaml
//! parameters:
//!   G: 10.0                 # gravitational constant
//!   min_r2: 1.0             # r^2 floor for star-body pairs
//!   collision_tolerance: 0.9
//!   merge_delay: 0.05       # seconds
//!   h0: 0.016666            # fixed internal step
//!   max_substeps: 10
//! ```
//!
//! Raw configs are untrusted. They become runtime definitions only through
//! [`crate::configuration::validation::validate_scenario`].

use serde::Deserialize;

use crate::error::{SimError, SimResult};
use crate::simulation::params::Parameters;
use crate::simulation::states::NVec3;

/// `{x, y, z}` as sent by the AI collaborator. Missing components are
/// reported as NaN so that later sanitizing can substitute defaults.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3Config {
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub z: Option<f64>,
}

impl Vec3Config {
    pub fn to_nvec(self) -> NVec3 {
        NVec3::new(
            self.x.unwrap_or(f64::NAN),
            self.y.unwrap_or(f64::NAN),
            self.z.unwrap_or(f64::NAN),
        )
    }
}

/// One entry of `objects`
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectConfig {
    pub name: Option<String>,
    pub texture_key: Option<String>,
    pub position: Option<Vec3Config>,
    pub velocity: Option<Vec3Config>,
    pub size: Option<f64>, // visual size, radius = size * 3
    pub mass: Option<f64>,
}

/// Top-level scenario as received from the ingestion collaborator
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioConfig {
    #[serde(alias = "type")]
    pub scenario_type: Option<String>,
    pub objects: Option<Vec<ObjectConfig>>,
    pub steps: Option<Vec<ScenarioConfig>>,
    pub camera_position: Option<Vec3Config>,
    pub camera_look_at: Option<Vec3Config>,
    pub duration: Option<f64>, // advisory step length in ms, not acted on
}

impl ScenarioConfig {
    pub fn from_json(text: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse a free-form model reply: strip markdown fences and keep the
    /// outermost `{ ... }` block before decoding.
    pub fn from_ai_text(text: &str) -> SimResult<Self> {
        Self::from_json(&extract_json_block(text))
    }
}

/// Pull the JSON object out of a model reply
pub fn extract_json_block(text: &str) -> String {
    let clean = text.replace("```json", "").replace("```", "");
    match (clean.find('{'), clean.rfind('}')) {
        (Some(start), Some(end)) if start < end => clean[start..=end].to_string(),
        _ => clean.trim().to_string(),
    }
}

/// Physics tuning; every field falls back to the reference value
#[allow(non_snake_case)]
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ParametersConfig {
    pub G: Option<f64>,
    pub min_r2: Option<f64>,
    pub collision_tolerance: Option<f64>,
    pub deform_reach: Option<f64>,
    pub deform_core: Option<f64>,
    pub deform_ease: Option<f64>,
    pub merge_delay: Option<f64>,
    pub h0: Option<f64>,
    pub max_substeps: Option<u32>,
    pub follow_distance: Option<f64>,
}

/// Top-level engine configuration loaded from YAML
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub parameters: ParametersConfig,
}

impl EngineConfig {
    pub fn from_yaml(text: &str) -> SimResult<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Merge over the defaults. Non-finite values are rejected, and so is a
    /// non-positive fixed step.
    pub fn build_parameters(&self) -> SimResult<Parameters> {
        let d = Parameters::default();
        let p = &self.parameters;
        let params = Parameters {
            G: p.G.unwrap_or(d.G),
            min_r2: p.min_r2.unwrap_or(d.min_r2),
            collision_tolerance: p.collision_tolerance.unwrap_or(d.collision_tolerance),
            deform_reach: p.deform_reach.unwrap_or(d.deform_reach),
            deform_core: p.deform_core.unwrap_or(d.deform_core),
            deform_ease: p.deform_ease.unwrap_or(d.deform_ease),
            merge_delay: p.merge_delay.unwrap_or(d.merge_delay),
            h0: p.h0.unwrap_or(d.h0),
            max_substeps: p.max_substeps.unwrap_or(d.max_substeps),
            follow_distance: p.follow_distance.unwrap_or(d.follow_distance),
        };

        let fields = [
            ("G", params.G),
            ("min_r2", params.min_r2),
            ("collision_tolerance", params.collision_tolerance),
            ("deform_reach", params.deform_reach),
            ("deform_core", params.deform_core),
            ("deform_ease", params.deform_ease),
            ("merge_delay", params.merge_delay),
            ("h0", params.h0),
            ("follow_distance", params.follow_distance),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, value)| !value.is_finite()) {
            return Err(SimError::non_finite(format!("parameters.{name}")));
        }
        if params.h0 <= 0.0 {
            return Err(SimError::malformed(format!("parameters.h0 must be > 0, got {}", params.h0)));
        }
        Ok(params)
    }
}
