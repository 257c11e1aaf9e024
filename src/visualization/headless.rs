//! Headless frame loop
//!
//! Stands in for a windowed viewer: drives a [`SimulationWorld`] at a fixed
//! frame delta, fires the user triggers on a schedule, and reports what a
//! renderer would have shown through `tracing`.

use tracing::{debug, info, warn};

use crate::simulation::events::SimEvent;
use crate::simulation::world::{FrameView, SimulationWorld};

#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub ticks: u64, // frames to run
    pub dt: f64, // wall seconds per frame
    pub advance_every: Option<u64>, // advance the sequence every N frames
    pub action_at: Option<u64>, // fire the scenario action on this frame
    pub report_every: u64, // log a frame summary every N frames, 0 = never
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            ticks: 600,
            dt: 1.0 / 60.0,
            advance_every: None,
            action_at: None,
            report_every: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub merges: usize,
    pub special_merges: usize,
    pub steps_played: usize,
    pub sequence_ended: bool,
    pub final_frame: FrameView,
}

/// Run `opts.ticks` frames of `world`
pub fn run_headless(world: &mut SimulationWorld, opts: &RunOptions) -> RunSummary {
    info!(ticks = opts.ticks, dt = opts.dt, kind = %world.kind(), "headless run starting");

    let mut summary = RunSummary {
        ticks: 0,
        merges: 0,
        special_merges: 0,
        steps_played: 0,
        sequence_ended: false,
        final_frame: world.snapshot(),
    };
    // steps applied before the loop (a sequence's first step) count too
    tally(world.drain_events(), &mut summary);

    for frame in 1..=opts.ticks {
        if let Some(every) = opts.advance_every.filter(|&n| n > 0) {
            if frame % every == 0 {
                if let Err(e) = world.advance_sequence_step() {
                    warn!(error = %e, "sequence step failed");
                }
            }
        }
        if opts.action_at == Some(frame) && !world.trigger_scenario_action() {
            debug!(frame, "scenario action had no effect");
        }

        let stats = world.step(opts.dt);
        tally(world.drain_events(), &mut summary);
        summary.ticks += 1;

        if opts.report_every > 0 && frame % opts.report_every == 0 {
            let view = world.snapshot();
            info!(
                tick = stats.tick,
                kind = %view.kind,
                bodies = view.bodies.iter().filter(|b| b.alive).count(),
                time_scale = view.time_scale,
                sequence = ?view.sequence,
                camera = ?view.camera_position.as_slice(),
                "frame"
            );
        }
    }

    summary.final_frame = world.snapshot();
    info!(
        ticks = summary.ticks,
        merges = summary.merges,
        special = summary.special_merges,
        "headless run finished"
    );
    summary
}

fn tally(events: Vec<SimEvent>, summary: &mut RunSummary) {
    for event in events {
        match &event {
            SimEvent::BodyMerged { special, name, .. } => {
                summary.merges += 1;
                if *special {
                    summary.special_merges += 1;
                }
                info!(name = %name, special, "merge");
            }
            SimEvent::SequenceStepChanged { index, total, kind, .. } => {
                summary.steps_played += 1;
                info!(step = index + 1, total, kind = %kind, "step");
            }
            SimEvent::SequenceEnded => {
                summary.sequence_ended = true;
                info!("all scenarios played");
            }
            SimEvent::ScenarioApplied { .. }
            | SimEvent::ScenarioReset
            | SimEvent::BodyDestroyed { .. }
            | SimEvent::SequenceStarted { .. } => debug!(?event, "event"),
        }
    }
}
