//! Linear scenario playlist advanced by an external trigger

use crate::configuration::validation::SceneDef;

/// Result of one advance
#[derive(Debug, Clone, PartialEq)]
pub enum SequenceAdvance {
    /// Play this step next
    Step { index: usize, scene: SceneDef },
    /// The last step was already playing; the sequence is over
    Ended,
    /// No sequence is running
    Inactive,
}

#[derive(Debug, Clone, Default)]
pub struct SequenceOrchestrator {
    steps: Vec<SceneDef>,
    index: usize,
    active: bool,
}

impl SequenceOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `steps` and return step 0. An empty list starts nothing.
    pub fn start(&mut self, steps: Vec<SceneDef>) -> Option<SceneDef> {
        let first = steps.first().cloned()?;
        self.steps = steps;
        self.index = 0;
        self.active = true;
        Some(first)
    }

    /// One trigger, one step forward
    pub fn advance(&mut self) -> SequenceAdvance {
        if !self.active {
            return SequenceAdvance::Inactive;
        }

        let next = self.index + 1;
        match self.steps.get(next).cloned() {
            Some(scene) => {
                self.index = next;
                SequenceAdvance::Step { index: next, scene }
            }
            None => {
                self.deactivate();
                SequenceAdvance::Ended
            }
        }
    }

    /// Stop without playing the remaining steps
    pub fn deactivate(&mut self) {
        self.active = false;
        self.steps.clear();
        self.index = 0;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// `(index, total)` while running
    pub fn progress(&self) -> Option<(usize, usize)> {
        self.active.then_some((self.index, self.steps.len()))
    }

    pub fn current(&self) -> Option<&SceneDef> {
        if self.active {
            self.steps.get(self.index)
        } else {
            None
        }
    }
}
