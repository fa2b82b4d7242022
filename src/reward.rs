//! Per-step reward for a single hunter chasing a single prey.
//!
//! Combines the capture reward, the step penalty and, under the shaped
//! policy, an asymmetric distance-change term.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{HunterError, Result};
use crate::grid::{Grid, Position};

/// Which reward components are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RewardPolicy {
    /// Capture reward or step penalty only.
    #[default]
    Sparse,
    /// Step penalty plus approach bonus / retreat penalty.
    Shaped,
}

/// Distance used by the shaping term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ShapingMetric {
    #[default]
    Euclidean,
    Manhattan,
}

impl ShapingMetric {
    /// Torus distance between `a` and `b` under this metric.
    pub fn distance(&self, grid: &Grid, a: Position, b: Position) -> f64 {
        match self {
            ShapingMetric::Euclidean => grid.euclidean(a, b),
            ShapingMetric::Manhattan => f64::from(grid.manhattan(a, b)),
        }
    }
}

/// Reward policy and its constants.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RewardConfig {
    pub policy: RewardPolicy,
    /// Reward on capture (replaces every other term).
    pub capture_reward: f64,
    /// Subtracted on every non-capturing step.
    pub step_penalty: f64,
    /// Added when the distance strictly decreased (shaped only).
    pub approach_bonus: f64,
    /// Subtracted when the distance strictly increased (shaped only).
    pub retreat_penalty: f64,
    pub shaping_metric: ShapingMetric,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            policy: RewardPolicy::Sparse,
            capture_reward: 10.0,
            step_penalty: 0.1,
            approach_bonus: 0.2,
            retreat_penalty: 0.3,
            shaping_metric: ShapingMetric::Euclidean,
        }
    }
}

impl RewardConfig {
    /// Shaped policy with the default constants.
    pub fn shaped() -> Self {
        Self {
            policy: RewardPolicy::Shaped,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        let values = [
            self.capture_reward,
            self.step_penalty,
            self.approach_bonus,
            self.retreat_penalty,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(HunterError::InvalidConfig {
                field: "reward",
                reason: "reward constants must be finite".to_string(),
            });
        }
        Ok(())
    }
}

/// Computes rewards for the hunter environment.
pub struct RewardComputer;

impl RewardComputer {
    /// Reward for one transition of a hunter toward one prey.
    ///
    /// `before` and `after` are `(hunter, prey)` positions at the start and
    /// end of the step.
    pub fn compute(
        config: &RewardConfig,
        grid: &Grid,
        captured: bool,
        before: (Position, Position),
        after: (Position, Position),
    ) -> f64 {
        if captured {
            return config.capture_reward;
        }
        let mut reward = -config.step_penalty;
        if config.policy == RewardPolicy::Shaped {
            let d_before = config.shaping_metric.distance(grid, before.0, before.1);
            let d_after = config.shaping_metric.distance(grid, after.0, after.1);
            if d_after < d_before {
                reward += config.approach_bonus;
            } else if d_after > d_before {
                reward -= config.retreat_penalty;
            }
        }
        reward
    }
}
