//! Configuration for the hunter environment, the learner and the reward.
//!
//! The named options here replace what used to be separate scripts:
//! state encoding, reward policy, prey motion and capture semantics are
//! all fields of one [`HunterConfig`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::environment::CaptureRule;
use crate::error::{HunterError, Result};
use crate::grid::{Grid, Position};
use crate::prey::PreyMotion;
use crate::reward::RewardConfig;
use crate::types::StateEncoding;

/// How entities are placed at the start of each episode.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Placement {
    /// Uniformly random, non-overlapping cells.
    #[default]
    Random,
    /// The same cells every episode.
    Fixed {
        hunters: Vec<Position>,
        prey: Vec<Position>,
    },
}

/// Hyperparameters of the tabular Q-learner.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AgentConfig {
    /// Learning rate α in (0, 1].
    pub learning_rate: f64,
    /// Discount factor γ in [0, 1).
    pub discount: f64,
    /// Initial exploration rate.
    pub epsilon_start: f64,
    /// Floor below which ε is no longer decayed.
    pub epsilon_min: f64,
    /// Multiplicative decay applied on every update while ε > floor.
    pub epsilon_decay: f64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.25,
            discount: 0.95,
            epsilon_start: 1.0,
            epsilon_min: 0.05,
            epsilon_decay: 0.999,
        }
    }
}

impl AgentConfig {
    /// Checks the ranges documented on each field.
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(invalid("learning_rate", "must lie in (0, 1]"));
        }
        if !(self.discount >= 0.0 && self.discount < 1.0) {
            return Err(invalid("discount", "must lie in [0, 1)"));
        }
        if !(self.epsilon_decay > 0.0 && self.epsilon_decay <= 1.0) {
            return Err(invalid("epsilon_decay", "must lie in (0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.epsilon_start) || !(0.0..=1.0).contains(&self.epsilon_min) {
            return Err(invalid("epsilon", "exploration rates must lie in [0, 1]"));
        }
        if self.epsilon_min > self.epsilon_start {
            return Err(invalid("epsilon_min", "must not exceed epsilon_start"));
        }
        Ok(())
    }
}

/// Configuration for a hunter-task run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HunterConfig {
    // --- World ---
    /// Toroidal grid dimensions.
    pub grid: Grid,
    /// Number of hunters.
    pub n_hunters: usize,
    /// Number of prey.
    pub n_prey: usize,
    /// Start-of-episode placement.
    pub placement: Placement,

    // --- Episode ---
    /// Step ceiling; an episode ends here even without a full capture.
    pub max_steps: u32,
    /// Whether a capture persists until reset or is re-evaluated each step.
    pub capture: CaptureRule,
    /// Prey movement policy.
    pub prey_motion: PreyMotion,

    // --- Learning ---
    /// Q-table key encoding.
    pub encoding: StateEncoding,
    /// Learner hyperparameters.
    pub agent: AgentConfig,
    /// Reward policy and constants.
    pub reward: RewardConfig,
}

impl Default for HunterConfig {
    fn default() -> Self {
        Self::training()
    }
}

impl HunterConfig {
    /// Single hunter, single prey, sticky capture, relative state.
    pub fn training() -> Self {
        Self {
            grid: Grid::default(),
            n_hunters: 1,
            n_prey: 1,
            placement: Placement::Random,
            max_steps: 1000,
            capture: CaptureRule::Sticky,
            prey_motion: PreyMotion::BiasedAfter { episode: 500 },
            encoding: StateEncoding::Relative,
            agent: AgentConfig::default(),
            reward: RewardConfig::default(),
        }
    }

    /// Two hunters, two prey, capture re-evaluated every step.
    ///
    /// Uses the absolute encoding of the pretrained deployment tables.
    pub fn pursuit() -> Self {
        Self {
            n_hunters: 2,
            n_prey: 2,
            capture: CaptureRule::Recomputed,
            prey_motion: PreyMotion::Biased,
            encoding: StateEncoding::Absolute,
            ..Self::training()
        }
    }

    /// Total number of entities placed on the grid.
    pub fn entity_count(&self) -> usize {
        self.n_hunters + self.n_prey
    }

    /// Rejects inconsistent or out-of-range settings.
    pub fn validate(&self) -> Result<()> {
        Grid::new(self.grid.width, self.grid.height)?;
        if self.n_hunters == 0 || self.n_prey == 0 {
            return Err(invalid("entities", "need at least one hunter and one prey"));
        }
        if self.entity_count() > self.grid.cells() {
            return Err(HunterError::TooManyEntities {
                requested: self.entity_count(),
                cells: self.grid.cells(),
            });
        }
        if self.max_steps == 0 {
            return Err(invalid("max_steps", "must be positive"));
        }
        if let Placement::Fixed { hunters, prey } = &self.placement {
            if hunters.len() != self.n_hunters || prey.len() != self.n_prey {
                return Err(invalid(
                    "placement",
                    format!(
                        "expected {} hunters and {} prey, got {} and {}",
                        self.n_hunters,
                        self.n_prey,
                        hunters.len(),
                        prey.len()
                    ),
                ));
            }
            let mut cells: Vec<Position> = hunters
                .iter()
                .chain(prey.iter())
                .map(|p| self.grid.wrap_position(*p))
                .collect();
            cells.sort();
            cells.dedup();
            if cells.len() != self.entity_count() {
                return Err(invalid("placement", "fixed positions overlap"));
            }
        }
        self.agent.validate()?;
        self.reward.validate()?;
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> HunterError {
    HunterError::InvalidConfig {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = HunterConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.grid, Grid::default());
        assert_eq!(cfg.entity_count(), 2);
    }

    #[test]
    fn pursuit_config_is_valid() {
        let cfg = HunterConfig::pursuit();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.capture, CaptureRule::Recomputed);
        assert_eq!(cfg.entity_count(), 4);
    }

    #[test]
    fn bad_learning_rate_rejected() {
        let mut cfg = HunterConfig::default();
        cfg.agent.learning_rate = 0.0;
        assert!(cfg.validate().is_err());
        cfg.agent.learning_rate = 1.0;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn bad_discount_rejected() {
        let mut cfg = HunterConfig::default();
        cfg.agent.discount = 1.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn epsilon_floor_above_start_rejected() {
        let mut cfg = HunterConfig::default();
        cfg.agent.epsilon_start = 0.01;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn overfull_grid_rejected() {
        let cfg = HunterConfig {
            grid: Grid {
                width: 1,
                height: 1,
            },
            ..HunterConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(HunterError::TooManyEntities { .. })
        ));
    }

    #[test]
    fn fixed_placement_must_match_counts() {
        let cfg = HunterConfig {
            placement: Placement::Fixed {
                hunters: vec![Position::new(0, 0), Position::new(1, 1)],
                prey: vec![Position::new(5, 0)],
            },
            ..HunterConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn fixed_placement_must_not_overlap() {
        let cfg = HunterConfig {
            placement: Placement::Fixed {
                hunters: vec![Position::new(0, 0)],
                prey: vec![Position::new(20, 20)],
            },
            ..HunterConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn config_json_roundtrip() {
        let cfg = HunterConfig::pursuit();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: HunterConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_config_json_uses_defaults() {
        let cfg: HunterConfig = serde_json::from_str(r#"{"max_steps": 50}"#).unwrap();
        assert_eq!(cfg.max_steps, 50);
        assert_eq!(cfg.n_hunters, 1);
    }
}
