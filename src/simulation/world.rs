//! The simulation world: scenario state machine plus the per-tick pipeline.
//!
//! `SimulationWorld` owns every piece of mutable state: the body set, the
//! giant-impact timeline, the merge queue, the scenario control handle, the
//! camera rig and the sequence orchestrator. Callers drive it through three
//! kinds of entry points:
//!
//! - triggers between ticks: [`SimulationWorld::request_scenario`],
//!   [`SimulationWorld::advance_sequence_step`],
//!   [`SimulationWorld::reset_active_scenario`], picking and the scenario
//!   action key
//! - [`SimulationWorld::step`], one frame
//! - read-out: [`SimulationWorld::snapshot`] and
//!   [`SimulationWorld::drain_events`]
//!
//! A tick always runs the phases in this order:
//!
//! 1. time-scale (giant-impact timeline, else 1.0)
//! 2. gravity
//! 3. contact detection and merge resolution
//! 4. integration
//! 5. death cleanup, then deferred merge materialization
//! 6. deformation
//! 7. scenario control update
//! 8. camera follow

use tracing::{debug, info, warn};

use crate::configuration::config::ScenarioConfig;
use crate::configuration::validation::{validate_scenario, SceneDef, ScenarioDef};
use crate::error::{SimError, SimResult};
use crate::simulation::camera::{sanitize_or, CameraRig, DEFAULT_CAMERA_POSITION};
use crate::simulation::collision::CollisionDetector;
use crate::simulation::controls::ScenarioControl;
use crate::simulation::deformation::apply_mutual_deformation;
use crate::simulation::events::SimEvent;
use crate::simulation::forces::{ForceSet, StarGravity};
use crate::simulation::integrator::FixedStepper;
use crate::simulation::merge::{MergeQueue, MergeResolver};
use crate::simulation::params::Parameters;
use crate::simulation::scenario::{build_scenario, ScenarioType};
use crate::simulation::sequence::{SequenceAdvance, SequenceOrchestrator};
use crate::simulation::states::{Body, BodyId, NVec3, System};
use crate::simulation::timeline::{GiantImpactTimeline, TimelinePhase, IMPACTOR_LAUNCH_VELOCITY};

/// Per-tick counters, mostly for logs and benchmarks
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickStats {
    pub tick: u64,
    pub time_scale: f64,
    pub substeps: u32,
    pub contacts: usize,
    pub merges_scheduled: usize,
    pub bodies_removed: usize,
    pub bodies_materialized: usize,
    pub deformed_pairs: usize,
}

/// What the presentation layer needs to draw one body
#[derive(Debug, Clone, PartialEq)]
pub struct BodyView {
    pub id: BodyId,
    pub name: String,
    pub texture_key: String,
    pub position: NVec3,
    pub radius: f64,
    pub alive: bool,
    pub deform_amount: f64,
    pub deform_direction: NVec3,
}

impl From<&Body> for BodyView {
    fn from(b: &Body) -> Self {
        let dir_len = b.deform_target.norm();
        Self {
            id: b.id,
            name: b.name.clone(),
            texture_key: b.texture_key.clone(),
            position: b.x,
            radius: b.radius,
            alive: b.alive,
            deform_amount: b.deform_amount,
            deform_direction: if dir_len > 0.0 { b.deform_target / dir_len } else { NVec3::zeros() },
        }
    }
}

/// Read-only view of one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameView {
    pub tick: u64,
    pub kind: ScenarioType,
    pub time_scale: f64,
    /// Live bodies, plus bodies that died this tick (flagged `alive = false`)
    pub bodies: Vec<BodyView>,
    /// `(index, total)` while a sequence plays
    pub sequence: Option<(usize, usize)>,
    pub camera_position: NVec3,
    pub camera_look_at: NVec3,
    pub ambient_intensity: f64,
    pub timeline_phase: Option<TimelinePhase>,
}

pub struct SimulationWorld {
    params: Parameters,
    system: System,
    forces: ForceSet,
    detector: CollisionDetector,
    resolver: MergeResolver,
    merges: MergeQueue,
    stepper: FixedStepper,
    kind: ScenarioType,
    timeline: Option<GiantImpactTimeline>,
    impactor: Option<BodyId>,
    time_scale: f64,
    camera: CameraRig,
    control: Option<Box<dyn ScenarioControl>>,
    sequence: Option<SequenceOrchestrator>,
    events: Vec<SimEvent>,
    tick: u64,
    force_buf: Vec<NVec3>,
}

impl Default for SimulationWorld {
    fn default() -> Self {
        Self::new(Parameters::default())
    }
}

impl SimulationWorld {
    pub fn new(params: Parameters) -> Self {
        let forces = ForceSet::new().with(StarGravity {
            G: params.G,
            min_r2: params.min_r2,
        });
        let detector = CollisionDetector::new(params.collision_tolerance);

        Self {
            params,
            system: System::new(),
            forces,
            detector,
            resolver: MergeResolver::default(),
            merges: MergeQueue::new(),
            stepper: FixedStepper::new(),
            kind: ScenarioType::Unknown,
            timeline: None,
            impactor: None,
            time_scale: 1.0,
            camera: CameraRig::default(),
            control: None,
            sequence: None,
            events: Vec::new(),
            tick: 0,
            force_buf: Vec::new(),
        }
    }

    // =====================================================================
    // Triggers
    // =====================================================================

    /// Validate a raw config and hand it to [`Self::request_scenario`]
    pub fn request_scenario_config(&mut self, cfg: &ScenarioConfig) -> SimResult<()> {
        match validate_scenario(cfg) {
            Ok(def) => self.request_scenario(def),
            Err(e) => {
                warn!(error = %e, "rejected scenario; keeping current state");
                Err(e)
            }
        }
    }

    /// Replace whatever is running with `def`.
    ///
    /// A malformed definition is rejected before anything is torn down. A
    /// plain scene stops any running sequence. A sequence replaces any
    /// running sequence and plays its first step.
    pub fn request_scenario(&mut self, def: ScenarioDef) -> SimResult<()> {
        if let Err(e) = def.check() {
            warn!(error = %e, "rejected scenario; keeping current state");
            return Err(e);
        }

        match def {
            ScenarioDef::Scene(scene) => {
                if self.sequence.take().is_some() {
                    info!("sequence interrupted by a new request");
                }
                self.apply_scene(&scene)
            }
            ScenarioDef::Sequence(steps) => {
                let mut orchestrator = SequenceOrchestrator::new();
                let first = orchestrator
                    .start(steps)
                    .ok_or_else(|| SimError::malformed("sequence has no steps"))?;
                let total = orchestrator.progress().map_or(0, |(_, total)| total);

                info!(total, "sequence started");
                self.sequence = Some(orchestrator);
                self.events.push(SimEvent::SequenceStarted { total });
                self.play_step(0, total, &first)
            }
        }
    }

    /// Move a running sequence one step forward. No-op without a sequence.
    pub fn advance_sequence_step(&mut self) -> SimResult<()> {
        let Some(orchestrator) = self.sequence.as_mut() else {
            return Ok(());
        };

        match orchestrator.advance() {
            SequenceAdvance::Step { index, scene } => {
                let total = orchestrator.progress().map_or(0, |(_, total)| total);
                self.play_step(index, total, &scene)
            }
            SequenceAdvance::Ended => {
                info!("sequence finished");
                self.sequence = None;
                self.events.push(SimEvent::SequenceEnded);
                Ok(())
            }
            SequenceAdvance::Inactive => {
                self.sequence = None;
                Ok(())
            }
        }
    }

    /// Clear the active scene: no bodies, no timeline, time-scale 1.0.
    /// A running sequence stays where it is.
    pub fn reset_active_scenario(&mut self) {
        self.reset();
        self.kind = ScenarioType::Unknown;
        self.camera.reset();
    }

    /// Follow a body with the camera, or stop following with `None`.
    /// Ignored while the giant-impact timeline owns the camera.
    pub fn focus_body(&mut self, id: Option<BodyId>) -> bool {
        if self.timeline_playing() {
            return false;
        }
        match id {
            None => {
                self.camera.follow = None;
                true
            }
            Some(id) if self.system.get(id).is_some_and(Body::is_active) => {
                self.camera.follow = Some(id);
                true
            }
            Some(_) => false,
        }
    }

    /// Scenario action key, forwarded to the active control
    pub fn trigger_scenario_action(&mut self) -> bool {
        let Some(control) = self.control.as_mut() else {
            return false;
        };
        match control.trigger(&mut self.system) {
            Some(directive) => {
                let fallback = NVec3::from(DEFAULT_CAMERA_POSITION);
                self.camera.position = sanitize_or(directive.position, fallback);
                self.camera.look_at = sanitize_or(directive.look_at, NVec3::zeros());
                true
            }
            None => false,
        }
    }

    // =====================================================================
    // Frame
    // =====================================================================

    /// Run one tick with `raw_dt` seconds of wall time
    pub fn step(&mut self, raw_dt: f64) -> TickStats {
        let raw_dt = if raw_dt.is_finite() && raw_dt > 0.0 { raw_dt } else { 0.0 };
        self.tick += 1;
        let tick = self.tick;
        let kind = self.kind;
        let mut stats = TickStats {
            tick,
            ..TickStats::default()
        };

        // 1. time-scale
        self.time_scale = match self.timeline.as_mut() {
            Some(timeline) if kind == ScenarioType::GiantImpact && timeline.playing => {
                timeline.advance(raw_dt, &mut self.camera)
            }
            _ => 1.0,
        };
        stats.time_scale = self.time_scale;
        let dt = raw_dt * self.time_scale;

        // 2. gravity
        self.force_buf.resize(self.system.bodies.len(), NVec3::zeros());
        self.forces.accumulate_forces(kind, &self.system, &mut self.force_buf);

        // 3. contacts
        let resolver = &self.resolver;
        let merges = &mut self.merges;
        let delay = self.params.merge_delay;
        let mut latch = self.timeline.as_mut().map(|t| &mut t.impact_occurred);
        stats.contacts = self.detector.resolve_contacts(kind, &mut self.system, |sys, contact| {
            if let Some(merged) = resolver.resolve(kind, latch.as_deref_mut(), sys, contact, tick) {
                merges.schedule(merged, delay);
                stats.merges_scheduled += 1;
            }
        });

        // 4. integration
        stats.substeps = self.stepper.advance(&mut self.system, &self.force_buf, dt, &self.params);

        // 5. cleanup + deferred merges
        for gone in self.system.remove_dead(tick) {
            if self.camera.follow == Some(gone.id) {
                self.camera.follow = None;
            }
            self.events.push(SimEvent::BodyDestroyed { id: gone.id });
            stats.bodies_removed += 1;
        }
        for merged in self.merges.drain_ready(raw_dt) {
            debug!(id = merged.body.id, name = %merged.body.name, "merged body materialized");
            self.events.push(SimEvent::BodyMerged {
                id: merged.body.id,
                name: merged.body.name.clone(),
                position: merged.body.x,
                special: merged.special,
                effect: merged.effect(),
            });
            self.system.push(merged.body);
            stats.bodies_materialized += 1;
        }

        // 6. deformation
        stats.deformed_pairs = apply_mutual_deformation(kind, &mut self.system, &self.params, dt);

        // 7. scenario control
        if let Some(control) = self.control.as_mut() {
            control.update(raw_dt, &mut self.system);
        }

        // 8. camera follow
        if !self.timeline_playing() {
            if let Some(id) = self.camera.follow {
                match self.system.get(id).filter(|b| b.is_active()) {
                    Some(target) => {
                        let target_x = target.x;
                        self.camera.follow_step(target_x, self.params.follow_distance);
                    }
                    None => self.camera.follow = None,
                }
            }
        }

        stats
    }

    // =====================================================================
    // Read-out
    // =====================================================================

    pub fn snapshot(&self) -> FrameView {
        FrameView {
            tick: self.tick,
            kind: self.kind,
            time_scale: self.time_scale,
            bodies: self.system.bodies.iter().map(BodyView::from).collect(),
            sequence: self.sequence_progress(),
            camera_position: sanitize_or(self.camera.position, NVec3::from(DEFAULT_CAMERA_POSITION)),
            camera_look_at: sanitize_or(self.camera.look_at, NVec3::zeros()),
            ambient_intensity: self.control.as_ref().and_then(|c| c.ambient_intensity()).unwrap_or(1.0),
            timeline_phase: self.timeline.as_ref().filter(|t| t.playing).map(|t| t.phase()),
        }
    }

    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn kind(&self) -> ScenarioType {
        self.kind
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn system(&self) -> &System {
        &self.system
    }

    /// Direct access for tooling and tests; bypasses no invariants that the
    /// next tick does not re-establish.
    pub fn system_mut(&mut self) -> &mut System {
        &mut self.system
    }

    pub fn active_bodies(&self) -> impl Iterator<Item = &Body> {
        self.system.active()
    }

    pub fn timeline(&self) -> Option<&GiantImpactTimeline> {
        self.timeline.as_ref()
    }

    pub fn impactor(&self) -> Option<BodyId> {
        self.impactor
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn sequence_progress(&self) -> Option<(usize, usize)> {
        self.sequence.as_ref().and_then(SequenceOrchestrator::progress)
    }

    pub fn pending_merges(&self) -> usize {
        self.merges.len()
    }

    pub fn has_control(&self) -> bool {
        self.control.is_some()
    }

    // =====================================================================
    // Internals
    // =====================================================================

    fn timeline_playing(&self) -> bool {
        self.timeline.as_ref().is_some_and(|t| t.playing)
    }

    fn play_step(&mut self, index: usize, total: usize, scene: &SceneDef) -> SimResult<()> {
        info!(step = index + 1, total, kind = %scene.kind, "sequence step");
        if scene.bodies.is_empty() {
            warn!(step = index + 1, "sequence step has no objects");
        }
        self.apply_scene(scene)?;
        self.events.push(SimEvent::SequenceStepChanged {
            index,
            total,
            kind: self.kind,
            duration: scene.duration,
        });
        Ok(())
    }

    /// Tear down the current scene and build `scene` in its place
    fn apply_scene(&mut self, scene: &SceneDef) -> SimResult<()> {
        if let Err(e) = scene.check() {
            warn!(error = %e, "rejected scene; keeping current state");
            return Err(e);
        }

        self.reset();

        let kind = scene.resolved_kind(&self.resolver.marker);
        if kind != scene.kind {
            info!(declared = %scene.kind, resolved = %kind, "impactor present; scene reclassified");
        }

        let setup = match build_scenario(scene, kind, &self.params, &mut self.system) {
            Ok(setup) => setup,
            Err(e) => {
                warn!(error = %e, "scene build failed; world left empty");
                self.system.clear();
                self.kind = ScenarioType::Unknown;
                return Err(e);
            }
        };

        self.kind = setup.kind;
        self.control = setup.control;
        self.impactor = setup.impactor;

        if self.kind == ScenarioType::GiantImpact {
            self.start_giant_impact();
        }
        if !self.timeline_playing() {
            self.camera.apply_scenario(setup.camera_position, setup.camera_look_at);
        }

        info!(kind = %self.kind, bodies = self.system.bodies.len(), "scenario applied");
        self.events.push(SimEvent::ScenarioApplied {
            kind: self.kind,
            bodies: self.system.bodies.len(),
        });
        Ok(())
    }

    fn start_giant_impact(&mut self) {
        self.timeline = Some(GiantImpactTimeline::started());
        self.camera.follow = None;

        match self.impactor.and_then(|id| self.system.get_mut(id)) {
            Some(impactor) => impactor.v = NVec3::from(IMPACTOR_LAUNCH_VELOCITY),
            None => warn!("giant impact without an impactor body"),
        }
    }

    /// Dispose of everything the current scene owns. The control handle is
    /// torn down first and dropped, so it cannot fire twice.
    fn reset(&mut self) {
        if let Some(mut control) = self.control.take() {
            control.teardown();
        }
        let cancelled = self.merges.cancel_all();
        if cancelled > 0 {
            debug!(cancelled, "pending merges cancelled by reset");
        }

        self.system.clear();
        self.stepper.reset();
        self.force_buf.clear();
        self.timeline = None;
        self.impactor = None;
        self.time_scale = 1.0;
        self.camera.follow = None;
        self.camera.look_at = NVec3::zeros();

        self.events.push(SimEvent::ScenarioReset);
    }
}
