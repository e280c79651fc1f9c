//! Clock Adapter
//!
//! Implements the `Clock` port with a manually driven step counter.

use crate::domain::Step;
use crate::ports::outbound::Clock;
use parking_lot::RwLock;

/// Step counter advanced by hand, like mining blocks on a dev chain.
#[derive(Debug, Default)]
pub struct ManualClock {
    step: RwLock<Step>,
}

impl ManualClock {
    /// Create a clock at `step`.
    pub fn new(step: Step) -> Self {
        Self {
            step: RwLock::new(step),
        }
    }

    /// Set the current step.
    pub fn set(&self, step: Step) {
        *self.step.write() = step;
    }

    /// Advance by one step.
    pub fn advance(&self) -> Step {
        self.mine(1)
    }

    /// Advance by `blocks` steps and return the new step.
    pub fn mine(&self, blocks: Step) -> Step {
        let mut step = self.step.write();
        *step = step.saturating_add(blocks);
        *step
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Step {
        *self.step.read()
    }
}
