//! Prey movement policies.

use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::grid::{Grid, Position};
use crate::types::Action;

/// Probability of moving up under the biased policy.
pub const PREY_UP_PROBABILITY: f64 = 0.2;
/// Cumulative threshold below which the prey moves right.
pub const PREY_RIGHT_THRESHOLD: f64 = 0.6;

/// How an uncaptured prey moves each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PreyMotion {
    /// Never moves.
    Static,
    /// `r < 0.2` up, `r < 0.6` right, otherwise stay.
    #[default]
    Biased,
    /// Stationary until the episode index reaches `episode`, then biased.
    BiasedAfter { episode: u64 },
}

impl PreyMotion {
    /// Draws the prey's move for this tick.
    ///
    /// The biased variants always consume exactly one uniform draw, even
    /// while [`PreyMotion::BiasedAfter`] is still holding the prey still.
    pub fn choose<R: Rng + ?Sized>(&self, episode: u64, rng: &mut R) -> Action {
        match *self {
            PreyMotion::Static => Action::Stay,
            PreyMotion::Biased => biased_move(rng.gen::<f64>()),
            PreyMotion::BiasedAfter { episode: threshold } => {
                let r = rng.gen::<f64>();
                if episode >= threshold {
                    biased_move(r)
                } else {
                    Action::Stay
                }
            }
        }
    }

    /// Moves a prey at `from` one tick with wraparound.
    pub fn step<R: Rng + ?Sized>(
        &self,
        grid: &Grid,
        from: Position,
        episode: u64,
        rng: &mut R,
    ) -> Position {
        self.choose(episode, rng).apply(grid, from)
    }
}

fn biased_move(r: f64) -> Action {
    if r < PREY_UP_PROBABILITY {
        Action::Up
    } else if r < PREY_RIGHT_THRESHOLD {
        Action::Right
    } else {
        Action::Stay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn biased_thresholds() {
        assert_eq!(biased_move(0.0), Action::Up);
        assert_eq!(biased_move(0.1999), Action::Up);
        assert_eq!(biased_move(0.2), Action::Right);
        assert_eq!(biased_move(0.5999), Action::Right);
        assert_eq!(biased_move(0.6), Action::Stay);
        assert_eq!(biased_move(0.99), Action::Stay);
    }

    #[test]
    fn static_prey_never_moves() {
        let mut rng = StdRng::seed_from_u64(3);
        let g = Grid::default();
        let p = Position::new(4, 4);
        for _ in 0..100 {
            assert_eq!(PreyMotion::Static.step(&g, p, 0, &mut rng), p);
        }
    }

    #[test]
    fn delayed_prey_waits_for_threshold() {
        let mut rng = StdRng::seed_from_u64(11);
        let motion = PreyMotion::BiasedAfter { episode: 10 };
        for _ in 0..200 {
            assert_eq!(motion.choose(9, &mut rng), Action::Stay);
        }
        let moved = (0..200).any(|_| motion.choose(10, &mut rng) != Action::Stay);
        assert!(moved);
    }

    #[test]
    fn biased_frequencies_roughly_match() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut counts = [0usize; Action::COUNT];
        let n = 20_000;
        for _ in 0..n {
            counts[PreyMotion::Biased.choose(0, &mut rng).index()] += 1;
        }
        let frac = |a: Action| counts[a.index()] as f64 / n as f64;
        assert!((frac(Action::Up) - 0.2).abs() < 0.02);
        assert!((frac(Action::Right) - 0.4).abs() < 0.02);
        assert!((frac(Action::Stay) - 0.4).abs() < 0.02);
        assert_eq!(counts[Action::Down.index()], 0);
        assert_eq!(counts[Action::Left.index()], 0);
    }

    #[test]
    fn prey_wraps_at_edges() {
        let g = Grid::default();
        assert_eq!(Action::Up.apply(&g, Position::new(0, 0)), Position::new(0, 19));
        assert_eq!(Action::Right.apply(&g, Position::new(19, 0)), Position::new(0, 0));
    }
}
