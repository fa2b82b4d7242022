//! Two-hunter policy built on [`TargetArbiter`].

use std::sync::Arc;

use rand::RngCore;

use super::trait_::HunterPolicy;
use crate::arbitration::{ArbiterConfig, TargetArbiter};
use crate::grid::Grid;
use crate::observation::{Decision, Observation};
use crate::q_table::QTable;

/// Picks a target each tick with a [`TargetArbiter`] over this hunter's
/// table and its partner's, then moves toward it.
#[derive(Debug, Clone)]
pub struct ArbitratedPolicy {
    grid: Grid,
    own: Arc<QTable>,
    partner: Arc<QTable>,
    config: ArbiterConfig,
}

impl ArbitratedPolicy {
    pub fn new(grid: Grid, own: Arc<QTable>, partner: Arc<QTable>, config: ArbiterConfig) -> Self {
        Self {
            grid,
            own,
            partner,
            config,
        }
    }

    pub fn config(&self) -> ArbiterConfig {
        self.config
    }
}

impl HunterPolicy for ArbitratedPolicy {
    fn decide(&mut self, observation: &Observation, rng: &mut dyn RngCore) -> Decision {
        let arbiter = TargetArbiter::new(self.grid, &self.own, &self.partner, self.config);
        match arbiter.decide(
            observation.self_position,
            observation.partner(),
            &observation.prey_positions,
            rng,
        ) {
            Some(d) => Decision {
                action: d.action,
                target: Some(d.target),
                estimated_other_target: d.estimated_other_target,
                rationale: None,
            },
            None => Decision::stay(),
        }
    }

    fn name(&self) -> &str {
        match self.config.level.depth() {
            0 => "arbitrated_level0",
            _ => "arbitrated_level1",
        }
    }
}
