//! Tabular action-value store.
//!
//! A two-level map `StateKey -> ActionValues`. Every row is a dense
//! array over the fixed action set, so a row can never be partially
//! populated: it either does not exist or holds a value for every action.
//! Rows are created on demand with all values at `0.0` and are never
//! removed.

use std::collections::HashMap;
use std::ops::{Index, IndexMut};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::types::{Action, StateEncoding, StateKey};

/// Value estimates for every action in one state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ActionValues([f64; Action::COUNT]);

impl ActionValues {
    /// A row with every action at `0.0`.
    pub fn zeros() -> Self {
        Self([0.0; Action::COUNT])
    }

    /// Builds a row from values in [`Action::all`] order.
    pub fn from_array(values: [f64; Action::COUNT]) -> Self {
        Self(values)
    }

    pub fn as_array(&self) -> &[f64; Action::COUNT] {
        &self.0
    }

    /// Largest value in the row.
    pub fn max(&self) -> f64 {
        self.0.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Every action whose value equals the row maximum.
    pub fn argmax_all(&self) -> Vec<Action> {
        let max = self.max();
        Action::all()
            .into_iter()
            .filter(|a| self.0[a.index()] == max)
            .collect()
    }

    /// Greedy action, breaking ties uniformly at random.
    pub fn best<R: Rng + ?Sized>(&self, rng: &mut R) -> Action {
        let tied = self.argmax_all();
        // A NaN row has no maximum; fall back to staying put.
        tied.choose(rng).copied().unwrap_or(Action::Stay)
    }

    /// `(action, value)` pairs in action order.
    pub fn iter(&self) -> impl Iterator<Item = (Action, f64)> + '_ {
        Action::all().into_iter().map(move |a| (a, self.0[a.index()]))
    }
}

impl Index<Action> for ActionValues {
    type Output = f64;

    fn index(&self, action: Action) -> &f64 {
        &self.0[action.index()]
    }
}

impl IndexMut<Action> for ActionValues {
    fn index_mut(&mut self, action: Action) -> &mut f64 {
        &mut self.0[action.index()]
    }
}

/// Q-table for a single state encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    encoding: StateEncoding,
    rows: HashMap<StateKey, ActionValues>,
}

impl QTable {
    /// Creates an empty table.
    pub fn new(encoding: StateEncoding) -> Self {
        Self {
            encoding,
            rows: HashMap::new(),
        }
    }

    /// Encoding of every key in this table.
    pub fn encoding(&self) -> StateEncoding {
        self.encoding
    }

    /// Number of known states.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, state: &StateKey) -> bool {
        self.rows.contains_key(state)
    }

    /// Returns the row for `state`, creating it at all zeros if absent.
    pub fn get_or_init(&mut self, state: StateKey) -> &mut ActionValues {
        debug_assert_eq!(state.encoding(), self.encoding, "key encoding mismatch");
        self.rows.entry(state).or_insert_with(ActionValues::zeros)
    }

    /// Existing row for `state`, if any. Never inserts.
    pub fn row(&self, state: &StateKey) -> Option<&ActionValues> {
        self.rows.get(state)
    }

    /// Row for `state`, reading an unseen state as all zeros. Never inserts.
    pub fn values(&self, state: &StateKey) -> ActionValues {
        self.rows.get(state).copied().unwrap_or_default()
    }

    /// Single value lookup. Unseen states read as `0.0`.
    pub fn get(&self, state: &StateKey, action: Action) -> f64 {
        self.values(state)[action]
    }

    /// Overwrites one value, creating the row if needed.
    pub fn set(&mut self, state: StateKey, action: Action, value: f64) {
        self.get_or_init(state)[action] = value;
    }

    /// Greedy action for `state`; ties are broken uniformly at random.
    pub fn best_action<R: Rng + ?Sized>(&self, state: &StateKey, rng: &mut R) -> Action {
        self.values(state).best(rng)
    }

    /// Maximum value over actions; `0.0` for a never-seen state.
    pub fn max_value(&self, state: &StateKey) -> f64 {
        self.values(state).max()
    }

    /// Iterates over rows in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, &ActionValues)> {
        self.rows.iter()
    }

    /// Rows sorted by key, for stable output.
    pub fn sorted_rows(&self) -> Vec<(StateKey, ActionValues)> {
        let mut rows: Vec<_> = self.rows.iter().map(|(k, v)| (*k, *v)).collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows
    }

    /// Inserts a full row, replacing any previous one.
    pub(crate) fn insert_row(&mut self, state: StateKey, values: ActionValues) {
        self.rows.insert(state, values);
    }
}
