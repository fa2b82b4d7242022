//! Policy trait for hunters.

use rand::RngCore;

use crate::observation::{Decision, Observation};
use crate::types::Action;

/// A policy that picks one hunter's move from its observation.
///
/// Decisions are computed from the pre-step state; the driver applies
/// every hunter's action together afterwards.
pub trait HunterPolicy: Send {
    /// Decides this tick's move.
    ///
    /// # Arguments
    ///
    /// * `observation` - The hunter's view of the world (see [`Observation`])
    /// * `rng` - The episode's random stream; use it for every draw so the
    ///   episode can be replayed from its seed
    fn decide(&mut self, observation: &Observation, rng: &mut dyn RngCore) -> Decision;

    /// Like [`HunterPolicy::decide`], keeping only the action.
    fn select_action(&mut self, observation: &Observation, rng: &mut dyn RngCore) -> Action {
        self.decide(observation, rng).action
    }

    /// Returns a human-readable name for this policy.
    fn name(&self) -> &str;
}
