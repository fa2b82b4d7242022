//! Random policy for testing and baselines.

use rand::{Rng, RngCore};

use super::trait_::HunterPolicy;
use crate::observation::{Decision, Observation};
use crate::types::Action;

/// Uniformly random move, ignoring the observation.
///
/// Used for sanity checks and as a lower-bound baseline.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPolicy;

impl RandomPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl HunterPolicy for RandomPolicy {
    fn decide(&mut self, _observation: &Observation, rng: &mut dyn RngCore) -> Decision {
        Decision::action(Action::all()[rng.gen_range(0..Action::COUNT)])
    }

    fn name(&self) -> &str {
        "random"
    }
}
