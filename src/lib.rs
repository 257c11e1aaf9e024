pub mod error;
pub mod simulation;
pub mod configuration;
pub mod visualization;
pub mod benchmark;

pub use error::{SimError, SimResult};

pub use simulation::states::{Body, BodyId, System, NVec3};
pub use simulation::params::Parameters;
pub use simulation::forces::{ForceSet, ForceTerm, StarGravity};
pub use simulation::integrator::{symplectic_euler_step, FixedStepper};
pub use simulation::collision::{CollisionDetector, Contact};
pub use simulation::merge::{merge_kinematics, MergeEffect, MergeQueue, MergeResolver, MergedBody};
pub use simulation::deformation::apply_mutual_deformation;
pub use simulation::camera::CameraRig;
pub use simulation::timeline::{GiantImpactTimeline, TimelinePhase};
pub use simulation::controls::{CameraDirective, EclipseControl, EclipseKind, ScenarioControl};
pub use simulation::scenario::{build_scenario, ScenarioSetup, ScenarioType};
pub use simulation::sequence::{SequenceAdvance, SequenceOrchestrator};
pub use simulation::events::SimEvent;
pub use simulation::world::{BodyView, FrameView, SimulationWorld, TickStats};

pub use configuration::config::{extract_json_block, EngineConfig, ObjectConfig, ParametersConfig, ScenarioConfig, Vec3Config};
pub use configuration::validation::{validate_scenario, BodySpec, SceneDef, ScenarioDef, TEXTURE_WHITELIST};

pub use visualization::headless::{run_headless, RunOptions, RunSummary};

pub use benchmark::benchmark::{bench_gravity, bench_world_tick};
