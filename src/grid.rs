//! Toroidal grid geometry.
//!
//! Pure coordinate arithmetic on a `W × H` grid whose edges wrap on both
//! axes. Nothing here holds state; every function is total.

use std::fmt;

use rand::seq::index;
use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{HunterError, Result};

/// A cell on the grid, `0 <= x < W`, `0 <= y < H` once wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position. No wrapping is applied.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Origin position (0, 0).
    pub const fn origin() -> Self {
        Self { x: 0, y: 0 }
    }

    /// Component-wise sum without wrapping.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Fixed grid dimensions. Immutable for the lifetime of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Grid {
    pub width: i32,
    pub height: i32,
}

impl Grid {
    /// Creates a grid of the given size.
    ///
    /// Returns an error if either dimension is not strictly positive.
    pub fn new(width: i32, height: i32) -> Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(HunterError::InvalidConfig {
                field: "grid",
                reason: format!("dimensions must be positive, got {width}x{height}"),
            });
        }
        Ok(Self { width, height })
    }

    /// Number of distinct cells.
    pub fn cells(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Reduces any integer pair modulo `(W, H)`.
    pub fn wrap(&self, x: i32, y: i32) -> Position {
        Position {
            x: x.rem_euclid(self.width),
            y: y.rem_euclid(self.height),
        }
    }

    /// Wraps an existing position.
    pub fn wrap_position(&self, p: Position) -> Position {
        self.wrap(p.x, p.y)
    }

    /// Signed shortest offset from `from` to `to` on both axes.
    ///
    /// Each component lies in `(-size/2, size/2]`.
    pub fn relative_offset(&self, from: Position, to: Position) -> (i32, i32) {
        (
            torus_delta(from.x, to.x, self.width),
            torus_delta(from.y, to.y, self.height),
        )
    }

    /// Sum of absolute shortest-path deltas.
    pub fn manhattan(&self, p: Position, q: Position) -> i32 {
        let (dx, dy) = self.relative_offset(p, q);
        dx.abs() + dy.abs()
    }

    /// Euclidean length of the shortest-path offset.
    pub fn euclidean(&self, p: Position, q: Position) -> f64 {
        let (dx, dy) = self.relative_offset(p, q);
        f64::from(dx).hypot(f64::from(dy))
    }

    /// Largest possible Manhattan distance on this grid.
    pub fn max_manhattan(&self) -> i32 {
        self.width / 2 + self.height / 2
    }

    /// Draws `n` distinct cells uniformly at random.
    ///
    /// Fails when more entities are requested than the grid has cells.
    pub fn sample_distinct<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<Vec<Position>> {
        let cells = self.cells();
        if n > cells {
            return Err(HunterError::TooManyEntities {
                requested: n,
                cells,
            });
        }
        let width = self.width as usize;
        Ok(index::sample(rng, cells, n)
            .into_iter()
            .map(|i| Position::new((i % width) as i32, (i / width) as i32))
            .collect())
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            width: 20,
            height: 20,
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Signed shortest displacement from `a` to `b` on a cycle of length `size`.
///
/// The result lies in `(-size/2, size/2]`.
pub fn torus_delta(a: i32, b: i32, size: i32) -> i32 {
    let d = (b - a).rem_euclid(size);
    if d > size / 2 {
        d - size
    } else {
        d
    }
}

/// Free-function form of [`Grid::wrap`].
pub fn wrap(grid: &Grid, x: i32, y: i32) -> Position {
    grid.wrap(x, y)
}

/// Free-function form of [`Grid::manhattan`].
pub fn manhattan_torus(grid: &Grid, p: Position, q: Position) -> i32 {
    grid.manhattan(p, q)
}

/// Free-function form of [`Grid::euclidean`].
pub fn euclidean_torus(grid: &Grid, p: Position, q: Position) -> f64 {
    grid.euclidean(p, q)
}
