//! Discrete notifications for the presentation layer.
//!
//! The world queues these as they happen; the caller drains them between
//! ticks.

use crate::simulation::merge::MergeEffect;
use crate::simulation::scenario::ScenarioType;
use crate::simulation::states::{BodyId, NVec3};

#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    /// A new scene was built and is now active
    ScenarioApplied { kind: ScenarioType, bodies: usize },
    /// All bodies, timers and controls of the previous scene are gone
    ScenarioReset,
    /// A merged body entered the body set
    BodyMerged {
        id: BodyId,
        name: String,
        position: NVec3,
        special: bool,
        effect: MergeEffect,
    },
    /// A dead body was removed from the set
    BodyDestroyed { id: BodyId },
    SequenceStarted { total: usize },
    SequenceStepChanged {
        index: usize,
        total: usize,
        kind: ScenarioType,
        duration: Option<f64>,
    },
    SequenceEnded,
}
