//! Target arbitration between two hunters with independently trained tables.
//!
//! Each hunter scores every prey by the maximal action value of its own
//! table in the state "me chasing that prey" and pursues the best one
//! (level 0). A level-1 hunter first estimates which prey its partner is
//! after, then takes the best prey *other* than that one.
//!
//! The partner's table is only ever read.

use rand::seq::SliceRandom;
use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::grid::{Grid, Position};
use crate::q_table::QTable;
use crate::types::Action;

/// Reasoning depth of a hunter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PolicyLevel {
    /// Level 0: pursue the prey with the highest own value.
    #[default]
    Independent,
    /// Level 1: pursue the best prey the partner is not presumed to pursue.
    TheoryOfMind,
}

impl PolicyLevel {
    /// `0` or `1`.
    pub fn depth(&self) -> u8 {
        match self {
            PolicyLevel::Independent => 0,
            PolicyLevel::TheoryOfMind => 1,
        }
    }

    pub fn from_depth(depth: u8) -> Option<Self> {
        match depth {
            0 => Some(PolicyLevel::Independent),
            1 => Some(PolicyLevel::TheoryOfMind),
            _ => None,
        }
    }
}

/// How a level-1 hunter estimates its partner's target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OpponentModel {
    /// The partner's own table, evaluated from the partner's position.
    #[default]
    OpponentTable,
    /// This hunter's table, evaluated from the partner's position.
    SelfProjection,
}

/// How a hunter moves once it has a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MovementStrategy {
    /// Greedy action of the own table in the target's state.
    #[default]
    Table,
    /// Close the torus-shortest delta one axis at a time, ignoring the table.
    Greedy,
}

/// Arbitration options for one hunter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ArbiterConfig {
    pub level: PolicyLevel,
    pub opponent_model: OpponentModel,
    pub movement: MovementStrategy,
}

/// Outcome of arbitration for one hunter and one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetDecision {
    /// Index of the pursued prey.
    pub target: usize,
    pub action: Action,
    /// Presumed partner target; only set at level 1.
    pub estimated_other_target: Option<usize>,
}

/// Picks a target prey and a move for one hunter.
#[derive(Debug, Clone, Copy)]
pub struct TargetArbiter<'a> {
    grid: Grid,
    own: &'a QTable,
    other: &'a QTable,
    config: ArbiterConfig,
}

impl<'a> TargetArbiter<'a> {
    /// `own` is this hunter's table, `other` its partner's.
    pub fn new(grid: Grid, own: &'a QTable, other: &'a QTable, config: ArbiterConfig) -> Self {
        Self {
            grid,
            own,
            other,
            config,
        }
    }

    pub fn config(&self) -> ArbiterConfig {
        self.config
    }

    /// Value of each prey as seen by `table` from `from`.
    pub fn prey_values(&self, table: &QTable, from: Position, prey: &[Position]) -> Vec<f64> {
        let encoding = table.encoding();
        prey.iter()
            .map(|p| table.max_value(&encoding.encode(&self.grid, from, *p)))
            .collect()
    }

    /// Presumed target of the partner standing at `partner`.
    pub fn estimate_partner_target<R: Rng + ?Sized>(
        &self,
        partner: Position,
        prey: &[Position],
        rng: &mut R,
    ) -> Option<usize> {
        let table = match self.config.opponent_model {
            OpponentModel::OpponentTable => self.other,
            OpponentModel::SelfProjection => self.own,
        };
        let values = self.prey_values(table, partner, prey);
        best_index(&values, None, rng)
    }

    /// Chooses the target prey. Returns `(target, estimated partner target)`.
    ///
    /// Returns `None` when `prey` is empty. A level-1 hunter without a
    /// partner, or facing a single prey, falls back to level 0.
    pub fn choose_target<R: Rng + ?Sized>(
        &self,
        me: Position,
        partner: Option<Position>,
        prey: &[Position],
        rng: &mut R,
    ) -> Option<(usize, Option<usize>)> {
        let own_values = self.prey_values(self.own, me, prey);
        let estimate = match (self.config.level, partner) {
            (PolicyLevel::TheoryOfMind, Some(partner)) => {
                self.estimate_partner_target(partner, prey, rng)
            }
            _ => None,
        };
        let target = match estimate {
            Some(excluded) if prey.len() > 1 => best_index(&own_values, Some(excluded), rng),
            _ => best_index(&own_values, None, rng),
        }?;
        Some((target, estimate))
    }

    /// Move toward prey `target` under the configured strategy.
    pub fn movement<R: Rng + ?Sized>(&self, me: Position, target: Position, rng: &mut R) -> Action {
        match self.config.movement {
            MovementStrategy::Table => {
                let state = self.own.encoding().encode(&self.grid, me, target);
                self.own.best_action(&state, rng)
            }
            MovementStrategy::Greedy => greedy_step(&self.grid, me, target),
        }
    }

    /// Full decision for one tick.
    pub fn decide<R: Rng + ?Sized>(
        &self,
        me: Position,
        partner: Option<Position>,
        prey: &[Position],
        rng: &mut R,
    ) -> Option<TargetDecision> {
        let (target, estimated_other_target) = self.choose_target(me, partner, prey, rng)?;
        let action = self.movement(me, prey[target], rng);
        Some(TargetDecision {
            target,
            action,
            estimated_other_target,
        })
    }
}

/// Index of the largest value, skipping `exclude`; exact ties are broken
/// uniformly at random.
fn best_index<R: Rng + ?Sized>(values: &[f64], exclude: Option<usize>, rng: &mut R) -> Option<usize> {
    let max = values
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != exclude)
        .map(|(_, v)| *v)
        .fold(f64::NEG_INFINITY, f64::max);
    let tied: Vec<usize> = values
        .iter()
        .enumerate()
        .filter(|(i, v)| Some(*i) != exclude && **v == max)
        .map(|(i, _)| i)
        .collect();
    tied.choose(rng).copied()
}

/// One step that shrinks the torus-shortest delta, x axis first.
pub fn greedy_step(grid: &Grid, from: Position, to: Position) -> Action {
    let (dx, dy) = grid.relative_offset(from, to);
    if dx > 0 {
        Action::Right
    } else if dx < 0 {
        Action::Left
    } else if dy > 0 {
        Action::Down
    } else if dy < 0 {
        Action::Up
    } else {
        Action::Stay
    }
}
