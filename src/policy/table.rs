//! Greedy play from a learned table against one fixed prey.

use std::sync::Arc;

use rand::RngCore;

use super::trait_::HunterPolicy;
use crate::grid::Grid;
use crate::observation::{Decision, Observation};
use crate::q_table::QTable;

/// Follows `table`'s greedy action toward prey `target`.
///
/// Exploration is off and the table is shared read-only.
#[derive(Debug, Clone)]
pub struct TablePolicy {
    grid: Grid,
    table: Arc<QTable>,
    target: usize,
}

impl TablePolicy {
    /// Chases prey 0.
    pub fn new(grid: Grid, table: Arc<QTable>) -> Self {
        Self::chasing(grid, table, 0)
    }

    pub fn chasing(grid: Grid, table: Arc<QTable>, target: usize) -> Self {
        Self {
            grid,
            table,
            target,
        }
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }
}

impl HunterPolicy for TablePolicy {
    fn decide(&mut self, observation: &Observation, rng: &mut dyn RngCore) -> Decision {
        let Some(prey) = observation.prey_positions.get(self.target) else {
            return Decision::stay();
        };
        let state = self
            .table
            .encoding()
            .encode(&self.grid, observation.self_position, *prey);
        Decision::action(self.table.best_action(&state, rng)).with_target(self.target)
    }

    fn name(&self) -> &str {
        "table"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Position;
    use crate::types::{Action, StateEncoding, StateKey};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn follows_greedy_value_without_growing_table() {
        let mut table = QTable::new(StateEncoding::Relative);
        table.set(StateKey::Relative { dx: 0, dy: 2 }, Action::Down, 3.0);
        let table = Arc::new(table);
        let mut policy = TablePolicy::chasing(Grid::default(), Arc::clone(&table), 1);
        let obs = Observation {
            self_position: Position::new(4, 4),
            other_positions: vec![],
            prey_positions: vec![Position::new(9, 9), Position::new(4, 6)],
            prey_captured: vec![false, false],
        };
        let mut rng = StdRng::seed_from_u64(0);
        let d = policy.decide(&obs, &mut rng);
        assert_eq!(d.action, Action::Down);
        assert_eq!(d.target, Some(1));
        assert_eq!(policy.table().len(), 1);
    }

    #[test]
    fn missing_target_stays() {
        let table = Arc::new(QTable::new(StateEncoding::Relative));
        let mut policy = TablePolicy::chasing(Grid::default(), table, 3);
        let obs = Observation {
            self_position: Position::new(0, 0),
            other_positions: vec![],
            prey_positions: vec![Position::new(1, 0)],
            prey_captured: vec![false],
        };
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(policy.select_action(&obs, &mut rng), Action::Stay);
    }
}
