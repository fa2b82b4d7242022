//! Core types shared by the learner, the environment and the arbiter.
//!
//! Defines the fixed action set and the two state encodings used as
//! Q-table keys.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::grid::{Grid, Position};

/// A hunter's move for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    Stay,
}

impl Action {
    /// Size of the action set.
    pub const COUNT: usize = 5;

    /// Returns all actions in index order.
    pub fn all() -> [Action; Self::COUNT] {
        [
            Action::Up,
            Action::Down,
            Action::Left,
            Action::Right,
            Action::Stay,
        ]
    }

    /// Returns the index of this action (0=Up .. 4=Stay).
    pub fn index(&self) -> usize {
        match self {
            Action::Up => 0,
            Action::Down => 1,
            Action::Left => 2,
            Action::Right => 3,
            Action::Stay => 4,
        }
    }

    /// Inverse of [`Action::index`].
    pub fn from_index(index: usize) -> Option<Action> {
        Self::all().get(index).copied()
    }

    /// Unit displacement `(dx, dy)`. `y` grows downward.
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Action::Up => (0, -1),
            Action::Down => (0, 1),
            Action::Left => (-1, 0),
            Action::Right => (1, 0),
            Action::Stay => (0, 0),
        }
    }

    /// Applies this action to `from` with wraparound.
    pub fn apply(&self, grid: &Grid, from: Position) -> Position {
        let (dx, dy) = self.delta();
        grid.wrap(from.x + dx, from.y + dy)
    }

    /// Canonical upper-case name, as used in persisted tables.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Up => "UP",
            Action::Down => "DOWN",
            Action::Left => "LEFT",
            Action::Right => "RIGHT",
            Action::Stay => "STAY",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string names no known action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseActionError(pub String);

impl fmt::Display for ParseActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown action '{}'", self.0)
    }
}

impl std::error::Error for ParseActionError {}

impl FromStr for Action {
    type Err = ParseActionError;

    /// Case-insensitive; accepts a few common aliases for `STAY`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UP" | "NORTH" => Ok(Action::Up),
            "DOWN" | "SOUTH" => Ok(Action::Down),
            "LEFT" | "WEST" => Ok(Action::Left),
            "RIGHT" | "EAST" => Ok(Action::Right),
            "STAY" | "WAIT" | "NONE" | "NOOP" => Ok(Action::Stay),
            _ => Err(ParseActionError(s.to_string())),
        }
    }
}

/// How a (hunter, prey) pair is turned into a Q-table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StateEncoding {
    /// `(hunter_x, hunter_y, prey_x, prey_y)`. Translation-variant.
    Absolute,
    /// Torus-shortest `(dx, dy)` from hunter to prey. Translation-invariant.
    #[default]
    Relative,
}

impl StateEncoding {
    /// Builds the key for `hunter` chasing `prey`.
    pub fn encode(&self, grid: &Grid, hunter: Position, prey: Position) -> StateKey {
        match self {
            StateEncoding::Absolute => StateKey::Absolute {
                hunter: grid.wrap_position(hunter),
                prey: grid.wrap_position(prey),
            },
            StateEncoding::Relative => {
                let (dx, dy) = grid.relative_offset(hunter, prey);
                StateKey::Relative { dx, dy }
            }
        }
    }

    /// Number of integers in a key of this encoding.
    pub fn arity(&self) -> usize {
        match self {
            StateEncoding::Absolute => 4,
            StateEncoding::Relative => 2,
        }
    }
}

impl fmt::Display for StateEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateEncoding::Absolute => write!(f, "absolute"),
            StateEncoding::Relative => write!(f, "relative"),
        }
    }
}

/// A Q-table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StateKey {
    Absolute { hunter: Position, prey: Position },
    Relative { dx: i32, dy: i32 },
}

impl StateKey {
    /// Flattens the key into its integer tuple.
    pub fn to_vec(&self) -> Vec<i32> {
        match *self {
            StateKey::Absolute { hunter, prey } => vec![hunter.x, hunter.y, prey.x, prey.y],
            StateKey::Relative { dx, dy } => vec![dx, dy],
        }
    }

    /// Rebuilds a key from its integer tuple; the length selects the encoding.
    pub fn from_slice(values: &[i32]) -> Option<StateKey> {
        match *values {
            [dx, dy] => Some(StateKey::Relative { dx, dy }),
            [hx, hy, px, py] => Some(StateKey::Absolute {
                hunter: Position::new(hx, hy),
                prey: Position::new(px, py),
            }),
            _ => None,
        }
    }

    /// Encoding this key belongs to.
    pub fn encoding(&self) -> StateEncoding {
        match self {
            StateKey::Absolute { .. } => StateEncoding::Absolute,
            StateKey::Relative { .. } => StateEncoding::Relative,
        }
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateKey::Absolute { hunter, prey } => write!(f, "{hunter}->{prey}"),
            StateKey::Relative { dx, dy } => write!(f, "d({dx}, {dy})"),
        }
    }
}
