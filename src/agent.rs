//! Tabular Q-learning agent.

use rand::Rng;

use crate::config::AgentConfig;
use crate::q_table::QTable;
use crate::types::{Action, StateEncoding, StateKey};

/// Off-policy TD learner with ε-greedy exploration.
///
/// Owns exactly one [`QTable`]. Exploration decays multiplicatively on
/// every [`QLearningAgent::update`] call while ε is above its floor; action
/// selection never changes ε.
#[derive(Debug, Clone)]
pub struct QLearningAgent {
    table: QTable,
    learning_rate: f64,
    discount: f64,
    epsilon: f64,
    epsilon_min: f64,
    epsilon_decay: f64,
    updates: u64,
}

impl QLearningAgent {
    /// Creates an agent with an empty table.
    pub fn new(encoding: StateEncoding, config: &AgentConfig) -> Self {
        Self::with_table(QTable::new(encoding), config)
    }

    /// Creates an agent that continues from an existing table.
    pub fn with_table(table: QTable, config: &AgentConfig) -> Self {
        Self {
            table,
            learning_rate: config.learning_rate,
            discount: config.discount,
            epsilon: config.epsilon_start,
            epsilon_min: config.epsilon_min,
            epsilon_decay: config.epsilon_decay,
            updates: 0,
        }
    }

    /// ε-greedy action selection.
    ///
    /// Initialises the state's row if it has not been seen before.
    pub fn select_action<R: Rng + ?Sized>(&mut self, state: StateKey, rng: &mut R) -> Action {
        self.table.get_or_init(state);
        if rng.gen::<f64>() < self.epsilon {
            let all = Action::all();
            all[rng.gen_range(0..Action::COUNT)]
        } else {
            self.table.best_action(&state, rng)
        }
    }

    /// Greedy action without exploration. Does not touch the table.
    pub fn greedy_action<R: Rng + ?Sized>(&self, state: &StateKey, rng: &mut R) -> Action {
        self.table.best_action(state, rng)
    }

    /// Q-learning update followed by ε decay.
    ///
    /// `Q(s,a) += α · (r + γ · max_a' Q(s',a') − Q(s,a))`
    pub fn update(&mut self, state: StateKey, action: Action, reward: f64, next_state: StateKey) {
        self.table.get_or_init(state);
        let max_next = self.table.get_or_init(next_state).max();
        let target = reward + self.discount * max_next;
        let q = &mut self.table.get_or_init(state)[action];
        *q += self.learning_rate * (target - *q);
        self.updates += 1;

        if self.epsilon > self.epsilon_min {
            self.epsilon *= self.epsilon_decay;
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Overrides the current exploration rate, e.g. `0.0` for evaluation.
    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon;
    }

    /// Number of updates applied so far.
    pub fn updates(&self) -> u64 {
        self.updates
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn into_table(self) -> QTable {
        self.table
    }

    pub fn encoding(&self) -> StateEncoding {
        self.table.encoding()
    }
}
