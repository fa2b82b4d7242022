//! Hand-coded chase baseline.
//!
//! Heads for the nearest uncaptured prey (torus Manhattan distance) and
//! closes the shortest delta one axis at a time. No table is consulted.

use rand::RngCore;

use super::trait_::HunterPolicy;
use crate::arbitration::greedy_step;
use crate::grid::Grid;
use crate::observation::{Decision, Observation};

/// Greedy chase of the closest prey.
#[derive(Debug, Clone, Copy)]
pub struct GreedyChasePolicy {
    grid: Grid,
}

impl GreedyChasePolicy {
    pub fn new(grid: Grid) -> Self {
        Self { grid }
    }

    /// Nearest uncaptured prey, or the nearest prey if all are captured.
    /// Equal distances go to the lower index.
    fn nearest(&self, observation: &Observation) -> Option<usize> {
        let me = observation.self_position;
        let distance = |i: usize| self.grid.manhattan(me, observation.prey_positions[i]);
        let indices = 0..observation.prey_positions.len();
        let free = indices
            .clone()
            .filter(|i| !observation.prey_captured.get(*i).copied().unwrap_or(false))
            .min_by_key(|i| (distance(*i), *i));
        free.or_else(|| indices.min_by_key(|i| (distance(*i), *i)))
    }
}

impl HunterPolicy for GreedyChasePolicy {
    fn decide(&mut self, observation: &Observation, _rng: &mut dyn RngCore) -> Decision {
        match self.nearest(observation) {
            Some(target) => {
                let prey = observation.prey_positions[target];
                Decision::action(greedy_step(&self.grid, observation.self_position, prey))
                    .with_target(target)
            }
            None => Decision::stay(),
        }
    }

    fn name(&self) -> &str {
        "greedy_chase"
    }
}
